//! Pubflow - monorepo publication workflow
//!
//! Usage:
//!   pubflow check                 # Classify packages against the registry
//!   pubflow publish               # Build and publish unpublished packages
//!   pubflow publish --interactive # Confirm each package first
//!   pubflow list                  # List packages
//!   pubflow create <name>         # Scaffold a new package
//!   pubflow verify                # Are all packages built and published?

mod output;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use dialoguer::{Confirm, theme::ColorfulTheme};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pubflow_core::commands::{
    CheckCommand, CheckOptions, ConvertProtocolCommand, CreateCommand, DeleteCommand, LinkCommand,
    ListCommand, PackCommand, PublishCommand, RenameOptions, RenameScopeCommand, VerifyCommand,
};
use pubflow_core::config::{CheckMode, ConfigStore, PubflowConfig};
use pubflow_core::context::WorkspaceContext;
use pubflow_core::publish::LinePrompter;

#[derive(Parser)]
#[command(name = "pubflow")]
#[command(about = "Publication workflow for multi-package monorepos", long_about = None)]
struct Cli {
    /// Workspace root (defaults to the current directory)
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List packages, split into primitives and shared packages
    List {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Check every package against the registry and write the status file
    Check {
        /// How a package counts as published (overrides pubflow.toml)
        #[arg(long)]
        mode: Option<CheckModeArg>,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Build and publish the packages the last check found unpublished
    Publish {
        /// Ask before each package
        #[arg(short, long)]
        interactive: bool,
    },

    /// Move every manifest to a new scope
    RenameScope {
        /// New scope, e.g. @acme
        new_scope: String,

        /// Scope to move from (defaults to rename.from_scope)
        #[arg(long)]
        from: Option<String>,

        /// Show what would change without writing
        #[arg(long)]
        dry_run: bool,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Replace `workspace:*` dependency versions with `*`
    ConvertProtocol,

    /// Link every package globally
    Link,

    /// Build and pack every package into a directory
    Pack {
        /// Output directory (defaults to publish.pack_dir)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Scaffold a new package under the packages directory
    Create {
        /// Directory name, lowercase words joined by hyphens
        name: String,
    },

    /// Delete a package directory
    Delete {
        /// Directory name under the packages directory
        name: String,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Check that every package is built and published
    Verify {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Write a pubflow.toml with the default settings
    Init {
        /// Overwrite an existing pubflow.toml
        #[arg(long, short)]
        force: bool,
    },
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum CheckModeArg {
    /// The package name exists in the registry
    Name,
    /// The exact local version exists in the registry
    ExactVersion,
}

impl From<CheckModeArg> for CheckMode {
    fn from(arg: CheckModeArg) -> Self {
        match arg {
            CheckModeArg::Name => CheckMode::Name,
            CheckModeArg::ExactVersion => CheckMode::ExactVersion,
        }
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pubflow=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let code = run_cli(cli.root, cli.command)?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

/// Run one command and return the process exit code.
fn run_cli(root: PathBuf, command: Commands) -> Result<i32> {
    match command {
        Commands::Init { force } => run_init(&root, force),
        Commands::List { format } => run_list(&workspace(&root)?, format),
        Commands::Check { mode, format } => run_check(&workspace(&root)?, mode, format),
        Commands::Publish { interactive } => run_publish(&workspace(&root)?, interactive),
        Commands::RenameScope {
            new_scope,
            from,
            dry_run,
            yes,
        } => run_rename(&workspace(&root)?, new_scope, from, dry_run, yes),
        Commands::ConvertProtocol => run_convert(&workspace(&root)?),
        Commands::Link => run_link(&workspace(&root)?),
        Commands::Pack { out } => run_pack(&workspace(&root)?, out),
        Commands::Create { name } => run_create(&workspace(&root)?, &name),
        Commands::Delete { name, yes } => run_delete(&workspace(&root)?, &name, yes),
        Commands::Verify { format } => run_verify(&workspace(&root)?, format),
    }
}

fn workspace(root: &Path) -> Result<WorkspaceContext> {
    let ctx = WorkspaceContext::load(root)?;
    tracing::debug!(root = %ctx.root().display(), "workspace loaded");
    Ok(ctx)
}

fn run_init(root: &Path, force: bool) -> Result<i32> {
    let store = ConfigStore::for_root(root);
    if store.config_path().exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            store.config_path().display()
        );
    }
    store.save(&PubflowConfig::default())?;
    println!(
        "{} Wrote {}",
        style("✓").green(),
        store.config_path().display()
    );
    Ok(0)
}

fn run_list(ctx: &WorkspaceContext, format: OutputFormat) -> Result<i32> {
    let report = ListCommand::new(ctx).execute()?;
    match format {
        OutputFormat::Table => output::print_list_table(&report),
        OutputFormat::Json => output::print_json(&report)?,
    }
    Ok(0)
}

fn run_check(
    ctx: &WorkspaceContext,
    mode: Option<CheckModeArg>,
    format: OutputFormat,
) -> Result<i32> {
    let runner = ctx.process_runner();
    let registry = ctx.registry(runner)?;

    let mut options = CheckOptions::new();
    if let Some(mode) = mode {
        options = options.with_mode(mode.into());
    }
    let report = CheckCommand::new(ctx, registry.as_ref()).execute(&options)?;

    match format {
        OutputFormat::Table => output::print_check_table(&report),
        OutputFormat::Json => output::print_json(&report.artifact)?,
    }
    Ok(0)
}

fn run_publish(ctx: &WorkspaceContext, interactive: bool) -> Result<i32> {
    let runner = ctx.process_runner();
    let command = PublishCommand::new(ctx, runner.as_ref());

    let report = if interactive {
        let mut prompter = LinePrompter::stdio();
        command.execute_interactive(&mut prompter)?
    } else {
        command.execute_batch()?
    };

    output::print_publish_summary(&report);
    Ok(report.exit_code())
}

fn run_rename(
    ctx: &WorkspaceContext,
    new_scope: String,
    from: Option<String>,
    dry_run: bool,
    yes: bool,
) -> Result<i32> {
    let command = RenameScopeCommand::new(ctx);
    let mut options = RenameOptions::new(new_scope).with_dry_run(dry_run);
    if let Some(from) = from {
        options = options.with_from(from);
    }

    if !dry_run && !yes {
        let from = options
            .from_scope
            .as_deref()
            .unwrap_or_else(|| command.default_from());
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(
                "Rename {} to {} in every manifest under {}?",
                from,
                options.new_scope,
                ctx.root().display()
            ))
            .default(false)
            .interact()
            .context("Failed to read confirmation")?;
        if !confirmed {
            println!("Aborted.");
            return Ok(0);
        }
    }

    let report = command.execute(&options)?;
    output::print_rename_summary(&report);
    Ok(if report.verified() { 0 } else { 1 })
}

fn run_convert(ctx: &WorkspaceContext) -> Result<i32> {
    let report = ConvertProtocolCommand::new(ctx).execute()?;
    output::print_convert_summary(&report);
    Ok(0)
}

fn run_link(ctx: &WorkspaceContext) -> Result<i32> {
    let runner = ctx.process_runner();
    let report = LinkCommand::new(ctx, runner.as_ref()).execute()?;
    output::print_task_summary("Linked", &report);
    Ok(if report.has_failures() { 1 } else { 0 })
}

fn run_pack(ctx: &WorkspaceContext, out: Option<PathBuf>) -> Result<i32> {
    let runner = ctx.process_runner();
    let report = PackCommand::new(ctx, runner.as_ref()).execute(out)?;
    output::print_pack_summary(&report);
    Ok(if report.task.has_failures() { 1 } else { 0 })
}

fn run_create(ctx: &WorkspaceContext, name: &str) -> Result<i32> {
    let report = CreateCommand::new(ctx).execute(name)?;
    output::print_create_summary(&report);
    Ok(0)
}

fn run_delete(ctx: &WorkspaceContext, name: &str, yes: bool) -> Result<i32> {
    let command = DeleteCommand::new(ctx);
    let target = command.inspect(name)?;
    output::print_delete_target(&target);

    if !yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(
                "Delete {}? This cannot be undone",
                target.dir.display()
            ))
            .default(false)
            .interact()
            .context("Failed to read confirmation")?;
        if !confirmed {
            println!("Deletion cancelled.");
            return Ok(0);
        }
    }

    command.execute(&target)?;
    println!(
        "{} Deleted {}. Run `pnpm install` to update the workspace.",
        style("✓").green(),
        target.dir.display()
    );
    Ok(0)
}

fn run_verify(ctx: &WorkspaceContext, format: OutputFormat) -> Result<i32> {
    let runner = ctx.process_runner();
    let registry = ctx.registry(runner)?;
    let report = VerifyCommand::new(ctx, registry.as_ref()).execute()?;

    match format {
        OutputFormat::Table => output::print_verify_summary(&report),
        OutputFormat::Json => output::print_json(&report)?,
    }
    Ok(report.exit_code())
}

//! Terminal summaries for each command.

use anyhow::Result;
use console::style;
use serde::Serialize;

use pubflow_core::artifact::{OutcomeResult, PublicationStatus, StatusEntry};
use pubflow_core::commands::{
    CheckReport, ConvertReport, CreateReport, DeleteTarget, ListReport, ListedPackage,
    PackReport, PublishReport, RenameReport, TaskReport, VerifyReport,
};
use pubflow_core::publish::PublishMode;

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_list_table(report: &ListReport) {
    println!("{}", style("Primitives").green().bold());
    print_listed(&report.core);
    println!("Total: {} primitives\n", report.core.len());

    println!("{}", style("Shared packages").yellow().bold());
    print_listed(&report.shared);
    println!("Total: {} shared packages\n", report.shared.len());

    println!("Packages: {}", report.total());
}

fn print_listed(packages: &[ListedPackage]) {
    println!("{}", "-".repeat(70));
    for (index, package) in packages.iter().enumerate() {
        println!(
            "{:>2}. {:<20} v{:<10} {}",
            index + 1,
            package.dir,
            package.version.as_deref().unwrap_or("unknown"),
            package.description.as_deref().unwrap_or("")
        );
    }
    println!("{}", "-".repeat(70));
}

pub fn print_check_table(report: &CheckReport) {
    let artifact = &report.artifact;
    if artifact.total() == 0 {
        println!("No packages found.");
        return;
    }

    println!(
        "{:<3} {:<36} {:<12} {:<12} State",
        "", "Package", "Local", "Registry"
    );
    println!("{}", "-".repeat(80));
    for entry in artifact.published.iter().chain(&artifact.unpublished) {
        print_status_row(entry);
    }
    println!("{}", "-".repeat(80));

    let unknown = report.unknown_count();
    println!(
        "Published: {}  Unpublished: {}  Unknown: {}",
        style(artifact.published.len()).green(),
        style(artifact.unpublished.len() - unknown).yellow(),
        style(unknown).red()
    );
    println!("Status written to {}", report.path.display());
    if !artifact.unpublished.is_empty() {
        println!("Run `pubflow publish` to publish the pending packages.");
    }
}

fn print_status_row(entry: &StatusEntry) {
    let (symbol, registry, state) = match &entry.status {
        PublicationStatus::Published { registry_version } => {
            (style("✓").green(), registry_version.as_str(), "published".to_string())
        }
        PublicationStatus::Unpublished { registry_version } => {
            (style("○").yellow(), registry_version.as_str(), "unpublished".to_string())
        }
        PublicationStatus::Unknown { error } => {
            (style("?").red(), "-", format!("unknown: {}", truncate(error, 40)))
        }
    };
    println!(
        "{:<3} {:<36} {:<12} {:<12} {}",
        symbol,
        truncate(&entry.name, 36),
        entry.local_version,
        registry,
        state
    );
}

pub fn print_publish_summary(report: &PublishReport) {
    if report.nothing_to_publish() {
        println!("{} All packages are already published.", style("✓").green());
        return;
    }

    let run = &report.run;
    println!("\n{}", "=".repeat(60));
    for outcome in &run.outcomes {
        match &outcome.result {
            OutcomeResult::Succeeded => println!("  {} {}", style("✓").green(), outcome.package),
            OutcomeResult::Skipped => println!("  {} {} (skipped)", style("-").dim(), outcome.package),
            OutcomeResult::Failed { error } => {
                println!("  {} {}: {}", style("✗").red(), outcome.package, error)
            }
        }
    }
    println!("{}", "=".repeat(60));

    match run.mode {
        PublishMode::Batch => println!(
            "Succeeded: {}  Failed: {}",
            style(run.succeeded()).green(),
            style(run.failed()).red()
        ),
        PublishMode::Interactive => println!(
            "Published: {}  Skipped: {}  Failed: {}",
            style(run.succeeded()).green(),
            run.skipped(),
            style(run.failed()).red()
        ),
    }
    if run.aborted {
        let visited = run.outcomes.len();
        println!(
            "Stopped early; {} of {} packages not visited.",
            report.pending - visited,
            report.pending
        );
    }
    if let Some(path) = &report.results_path {
        println!("Results written to {}", path.display());
    }
}

pub fn print_rename_summary(report: &RenameReport) {
    println!("Scope: {} -> {}", report.from, style(&report.to).green());
    if report.dry_run {
        println!("{}", style("Dry run: no files were modified").yellow());
    }

    for path in report.manifests.iter().chain(&report.text_files) {
        println!("  {} {}", style("✓").green(), path.display());
    }
    for dir in &report.skipped {
        println!("  {} {} (unreadable manifest)", style("!").yellow(), dir);
    }
    println!(
        "Manifests: {}  Text files: {}",
        report.manifests.len(),
        report.text_files.len()
    );

    if report.dry_run {
        return;
    }
    if report.verified() {
        println!("{} No old scope references found.", style("✓").green());
    } else {
        for dir in &report.leftovers {
            println!(
                "  {} {}/package.json still mentions {}",
                style("✗").red(),
                dir,
                report.from
            );
        }
    }
}

pub fn print_convert_summary(report: &ConvertReport) {
    for (dir, count) in &report.changed {
        println!("  {} {}/package.json ({} values)", style("✓").green(), dir, count);
    }
    println!(
        "Converted {} of {} packages.",
        report.changed.len(),
        report.scanned
    );
}

pub fn print_task_summary(verb: &str, report: &TaskReport) {
    for name in &report.succeeded {
        println!("  {} {}", style("✓").green(), name);
    }
    for (name, error) in &report.failed {
        println!("  {} {}: {}", style("✗").red(), name, error);
    }
    println!(
        "{}: {}  Failed: {}",
        verb,
        style(report.succeeded.len()).green(),
        style(report.failed.len()).red()
    );
}

pub fn print_pack_summary(report: &PackReport) {
    print_task_summary("Packed", &report.task);
    println!("\nOutput directory: {}", report.out_dir.display());
    println!("Total .tgz files: {}", report.archives.len());
    for (index, archive) in report.archives.iter().enumerate() {
        println!(
            "  {:>2}. {} ({:.2} KB)",
            index + 1,
            archive.file_name,
            archive.size_kb
        );
    }
}

pub fn print_create_summary(report: &CreateReport) {
    println!("{} Created {}", style("✓").green(), style(&report.name).bold());
    for path in &report.files {
        println!("  {}", path.display());
    }
    println!("\nNext steps:");
    println!("  1. pnpm install");
    println!("  2. Add sources under {}", report.dir.join("src").display());
}

pub fn print_delete_target(target: &DeleteTarget) {
    println!("{}", style("About to delete a package").yellow().bold());
    println!("{}", "-".repeat(50));
    println!("Name:        {}", target.name.as_deref().unwrap_or("unknown"));
    println!("Version:     {}", target.version.as_deref().unwrap_or("unknown"));
    println!("Description: {}", target.description.as_deref().unwrap_or("N/A"));
    println!("Path:        {}", target.dir.display());
    println!("{}", "-".repeat(50));
}

pub fn print_verify_summary(report: &VerifyReport) {
    if report.all_built() {
        println!("{} All {} packages are built", style("✓").green(), report.built.len());
    } else {
        println!("{} Some packages are not built:", style("✗").red());
        for dir in &report.unbuilt {
            println!("  - {}", dir);
        }
        println!(
            "  {}/{} packages built. Run: pnpm build",
            report.built.len(),
            report.built.len() + report.unbuilt.len()
        );
    }

    for entry in &report.published {
        println!(
            "  {} {}@{}",
            style("✓").green(),
            entry.name,
            entry.status.registry_version().unwrap_or("?")
        );
    }
    if report.all_published() {
        println!("{} All {} packages are published", style("✓").green(), report.published.len());
    } else {
        println!("{} {} packages not published:", style("✗").red(), report.unpublished.len());
        for entry in &report.unpublished {
            match entry.status.error() {
                Some(error) => println!("  - {} (lookup failed: {})", entry.name, truncate(error, 40)),
                None => println!("  - {}", entry.name),
            }
        }
        println!("  Run: pubflow check && pubflow publish");
    }

    if !report.ready() {
        return;
    }
    println!("\n{}", style("Install commands").cyan().bold());
    println!("{}", style("Primitives:").green());
    for name in &report.core {
        println!("  npm install {}", name);
    }
    println!("{}", style("Shared packages:").yellow());
    for name in &report.shared {
        println!("  npm install {}", name);
    }
    let all: Vec<&str> = report
        .core
        .iter()
        .chain(&report.shared)
        .map(String::as_str)
        .collect();
    println!("\nAll at once:\n  npm install {}", all.join(" "));
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

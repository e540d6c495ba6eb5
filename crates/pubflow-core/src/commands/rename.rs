//! Rename-scope command: move every manifest from one scope to another.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};

use crate::context::WorkspaceContext;
use crate::workspace::{
    Manifest, apply_metadata, rename_manifest_scope, replace_scope_in_text, validate_scope,
};

/// Options for the rename-scope command
#[derive(Debug, Clone)]
pub struct RenameOptions {
    /// Scope to move to, e.g. `@acme`
    pub new_scope: String,
    /// Scope to move from (None = configured `rename.from_scope`)
    pub from_scope: Option<String>,
    /// Report what would change without writing
    pub dry_run: bool,
}

impl RenameOptions {
    pub fn new(new_scope: impl Into<String>) -> Self {
        Self {
            new_scope: new_scope.into(),
            from_scope: None,
            dry_run: false,
        }
    }

    pub fn with_from(mut self, from_scope: impl Into<String>) -> Self {
        self.from_scope = Some(from_scope.into());
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Result of a rename-scope run
#[derive(Debug, Clone, Default)]
pub struct RenameReport {
    pub from: String,
    pub to: String,
    pub dry_run: bool,
    /// Manifests rewritten (or that would be), relative to the root
    pub manifests: Vec<PathBuf>,
    /// Text files rewritten (or that would be), relative to the root
    pub text_files: Vec<PathBuf>,
    /// Package directories skipped because their manifest was unusable
    pub skipped: Vec<String>,
    /// Package manifests still mentioning the old scope after the rewrite
    pub leftovers: Vec<String>,
}

impl RenameReport {
    pub fn verified(&self) -> bool {
        self.leftovers.is_empty()
    }
}

pub struct RenameScopeCommand<'a> {
    ctx: &'a WorkspaceContext,
}

impl<'a> RenameScopeCommand<'a> {
    pub fn new(ctx: &'a WorkspaceContext) -> Self {
        Self { ctx }
    }

    /// The scope a run without `--from` would move away from.
    pub fn default_from(&self) -> &str {
        &self.ctx.config().rename.from_scope
    }

    pub fn execute(&self, options: &RenameOptions) -> anyhow::Result<RenameReport> {
        let from = options
            .from_scope
            .clone()
            .unwrap_or_else(|| self.default_from().to_string());
        let to = options.new_scope.clone();
        validate_scope(&to)?;
        validate_scope(&from).context("Invalid source scope")?;
        if from == to {
            bail!("Source and target scope are both {}", to);
        }

        tracing::info!(%from, %to, dry_run = options.dry_run, "renaming scope");
        let mut report = RenameReport {
            from,
            to,
            dry_run: options.dry_run,
            ..RenameReport::default()
        };

        let root_manifest = self.ctx.root_manifest();
        if self.ctx.store().exists(&root_manifest) {
            let manifest = Manifest::read(self.ctx.store(), &root_manifest)?;
            self.rewrite(manifest, None, &mut report)?;
        }

        let scanner = self.ctx.scanner();
        for dir in scanner.package_dirs()? {
            let path = scanner.manifest_path(&dir);
            if !self.ctx.store().exists(&path) {
                continue;
            }
            match Manifest::read(self.ctx.store(), &path) {
                Ok(manifest) => self.rewrite(manifest, Some(&dir), &mut report)?,
                Err(err) => {
                    tracing::warn!(dir = %dir, "skipping: {}", err);
                    report.skipped.push(dir);
                }
            }
        }

        self.rewrite_text_files(&mut report)?;

        if !options.dry_run {
            report.leftovers = self.leftovers(&report.from)?;
            for dir in &report.leftovers {
                tracing::warn!(dir = %dir, scope = %report.from, "old scope still present");
            }
        }

        Ok(report)
    }

    fn rewrite(
        &self,
        mut manifest: Manifest,
        package_dir: Option<&str>,
        report: &mut RenameReport,
    ) -> anyhow::Result<()> {
        let original = manifest.fields().clone();
        rename_manifest_scope(manifest.fields_mut(), &report.from, &report.to);
        apply_metadata(manifest.fields_mut(), &self.ctx.config().rename, package_dir);

        if manifest.fields() == &original {
            return Ok(());
        }
        if !report.dry_run {
            manifest.save(self.ctx.store())?;
        }
        tracing::info!(path = %manifest.path().display(), "manifest updated");
        report.manifests.push(self.relative(manifest.path()));
        Ok(())
    }

    fn rewrite_text_files(&self, report: &mut RenameReport) -> anyhow::Result<()> {
        for file in &self.ctx.config().rename.text_files {
            let path = self.ctx.root().join(file);
            if !self.ctx.store().exists(&path) {
                continue;
            }
            let content = self
                .ctx
                .store()
                .read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let Some(updated) = replace_scope_in_text(&content, &report.from, &report.to) else {
                continue;
            };
            if !report.dry_run {
                self.ctx
                    .store()
                    .write_atomic(&path, &updated)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
            }
            tracing::info!(path = %path.display(), "text file updated");
            report.text_files.push(file.clone());
        }
        Ok(())
    }

    /// Package directories whose manifest text still names the old scope.
    fn leftovers(&self, from: &str) -> anyhow::Result<Vec<String>> {
        let needle = format!("\"{}/", from);
        let scanner = self.ctx.scanner();
        let mut leftovers = Vec::new();
        for dir in scanner.package_dirs()? {
            let path = scanner.manifest_path(&dir);
            if let Ok(content) = self.ctx.store().read_to_string(&path)
                && content.contains(&needle)
            {
                leftovers.push(dir);
            }
        }
        Ok(leftovers)
    }

    fn relative(&self, path: &Path) -> PathBuf {
        path.strip_prefix(self.ctx.root())
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

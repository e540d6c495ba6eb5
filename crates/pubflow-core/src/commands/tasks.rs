//! Per-package maintenance tasks: protocol conversion, linking, packing.

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::context::{WorkspaceContext, runtime};
use crate::fs::FileStore;
use crate::runner::CommandRunner;
use crate::types::PackageDescriptor;
use crate::workspace::{Manifest, convert_workspace_protocol};

/// Per-package success/failure of a task run over all packages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskReport {
    pub succeeded: Vec<String>,
    /// Package name and error message
    pub failed: Vec<(String, String)>,
}

impl TaskReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Packages whose manifests had `workspace:*` values rewritten.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertReport {
    /// Package directory and number of values converted
    pub changed: Vec<(String, usize)>,
    pub scanned: usize,
}

pub struct ConvertProtocolCommand<'a> {
    ctx: &'a WorkspaceContext,
}

impl<'a> ConvertProtocolCommand<'a> {
    pub fn new(ctx: &'a WorkspaceContext) -> Self {
        Self { ctx }
    }

    pub fn execute(&self) -> anyhow::Result<ConvertReport> {
        let scanner = self.ctx.scanner();
        let mut report = ConvertReport::default();

        for dir in scanner.package_dirs()? {
            let path = scanner.manifest_path(&dir);
            if !self.ctx.store().exists(&path) {
                continue;
            }
            let mut manifest = match Manifest::read(self.ctx.store(), &path) {
                Ok(manifest) => manifest,
                Err(err) => {
                    tracing::warn!(dir = %dir, "skipping: {}", err);
                    continue;
                }
            };
            report.scanned += 1;

            let converted = convert_workspace_protocol(manifest.fields_mut());
            if converted > 0 {
                manifest.save(self.ctx.store())?;
                tracing::info!(dir = %dir, converted, "converted workspace protocol");
                report.changed.push((dir, converted));
            }
        }

        Ok(report)
    }
}

pub struct LinkCommand<'a> {
    ctx: &'a WorkspaceContext,
    runner: &'a dyn CommandRunner,
}

impl<'a> LinkCommand<'a> {
    pub fn new(ctx: &'a WorkspaceContext, runner: &'a dyn CommandRunner) -> Self {
        Self { ctx, runner }
    }

    /// Link every package globally; failures do not stop the run.
    pub fn execute(&self) -> anyhow::Result<TaskReport> {
        let packages = self.ctx.scanner().scan()?;
        let packages_dir = self.ctx.packages_dir();
        let mut report = TaskReport::default();

        runtime()?.block_on(async {
            for package in &packages {
                tracing::info!(package = %package.name, "linking");
                match self.runner.link(&packages_dir.join(&package.directory)).await {
                    Ok(_) => report.succeeded.push(package.name.clone()),
                    Err(err) => {
                        tracing::warn!(package = %package.name, "link failed: {}", err);
                        report.failed.push((package.name.clone(), err.to_string()));
                    }
                }
            }
        });

        Ok(report)
    }
}

/// A packed archive in the output directory.
#[derive(Debug, Clone, PartialEq)]
pub struct PackedArchive {
    pub file_name: String,
    pub size_kb: f64,
}

#[derive(Debug, Clone, Default)]
pub struct PackReport {
    pub task: TaskReport,
    pub out_dir: PathBuf,
    /// Every `.tgz` in the output directory after the run, sorted by name
    pub archives: Vec<PackedArchive>,
}

pub struct PackCommand<'a> {
    ctx: &'a WorkspaceContext,
    runner: &'a dyn CommandRunner,
}

impl<'a> PackCommand<'a> {
    pub fn new(ctx: &'a WorkspaceContext, runner: &'a dyn CommandRunner) -> Self {
        Self { ctx, runner }
    }

    /// Build and pack every package into `out_dir` (None = configured dir).
    pub fn execute(&self, out_dir: Option<PathBuf>) -> anyhow::Result<PackReport> {
        let out_dir = out_dir
            .map(|dir| self.ctx.root().join(dir))
            .unwrap_or_else(|| self.ctx.pack_dir());
        self.ctx
            .store()
            .create_dir_all(&out_dir)
            .with_context(|| format!("Failed to create {}", out_dir.display()))?;

        let packages = self.ctx.scanner().scan()?;
        let mut task = TaskReport::default();

        runtime()?.block_on(async {
            for package in &packages {
                tracing::info!(package = %package.name, "packing");
                match self.pack_one(package, &out_dir).await {
                    Ok(()) => task.succeeded.push(package.name.clone()),
                    Err(err) => {
                        tracing::warn!(package = %package.name, "pack failed: {}", err);
                        task.failed.push((package.name.clone(), err));
                    }
                }
            }
        });

        let archives = list_archives(self.ctx.store(), &out_dir)?;
        Ok(PackReport {
            task,
            out_dir,
            archives,
        })
    }

    async fn pack_one(&self, package: &PackageDescriptor, out_dir: &Path) -> Result<(), String> {
        let dir = self.ctx.packages_dir().join(&package.directory);
        self.runner
            .build(&dir)
            .await
            .map_err(|e| format!("build failed: {}", e))?;
        self.runner
            .pack(&dir, out_dir)
            .await
            .map_err(|e| format!("pack failed: {}", e))?;
        Ok(())
    }
}

fn list_archives(store: &dyn FileStore, dir: &Path) -> anyhow::Result<Vec<PackedArchive>> {
    let files = store
        .list_files(dir)
        .with_context(|| format!("Failed to read {}", dir.display()))?;
    Ok(files
        .into_iter()
        .filter(|(name, _)| name.ends_with(".tgz"))
        .map(|(file_name, size)| PackedArchive {
            file_name,
            size_kb: size as f64 / 1024.0,
        })
        .collect())
}

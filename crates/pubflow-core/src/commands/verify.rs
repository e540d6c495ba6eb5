//! Verify command: are all packages built and published?

use serde::Serialize;

use crate::artifact::StatusEntry;
use crate::config::CheckMode;
use crate::context::{WorkspaceContext, runtime};
use crate::registry::{RegistryQuery, StatusChecker};

/// Build output every package must have before publishing.
pub const BUILD_OUTPUT_DIR: &str = "dist";

#[derive(Debug, Clone, Default, Serialize)]
pub struct VerifyReport {
    /// Package directories with a build output directory
    pub built: Vec<String>,
    pub unbuilt: Vec<String>,
    /// Packages whose name exists in the registry
    pub published: Vec<StatusEntry>,
    /// Packages missing from the registry or whose lookup failed
    pub unpublished: Vec<StatusEntry>,
    /// Package names to install, primitives first
    pub core: Vec<String>,
    pub shared: Vec<String>,
}

impl VerifyReport {
    pub fn all_built(&self) -> bool {
        self.unbuilt.is_empty()
    }

    pub fn all_published(&self) -> bool {
        self.unpublished.is_empty()
    }

    pub fn ready(&self) -> bool {
        self.all_built() && self.all_published()
    }

    pub fn exit_code(&self) -> i32 {
        if self.ready() { 0 } else { 1 }
    }
}

pub struct VerifyCommand<'a> {
    ctx: &'a WorkspaceContext,
    registry: &'a dyn RegistryQuery,
}

impl<'a> VerifyCommand<'a> {
    pub fn new(ctx: &'a WorkspaceContext, registry: &'a dyn RegistryQuery) -> Self {
        Self { ctx, registry }
    }

    /// Check build output for every package directory, then look every
    /// scanned package up by name. Nothing is written.
    pub fn execute(&self) -> anyhow::Result<VerifyReport> {
        let scanner = self.ctx.scanner();
        let mut report = VerifyReport::default();

        for dir in scanner.package_dirs()? {
            let output = scanner.packages_dir().join(&dir).join(BUILD_OUTPUT_DIR);
            if self.ctx.store().exists(&output) {
                report.built.push(dir);
            } else {
                tracing::warn!(dir = %dir, "not built");
                report.unbuilt.push(dir);
            }
        }

        let packages = scanner.scan()?;
        let checker = StatusChecker::new(self.registry, CheckMode::Name)
            .with_delay(self.ctx.config().registry.query_delay());
        let entries = runtime()?.block_on(checker.check(&packages));
        (report.published, report.unpublished) = entries
            .into_iter()
            .partition(|entry| entry.status.is_published());

        let shared_dirs = &self.ctx.config().shared_packages;
        for package in &packages {
            let shared = package
                .directory
                .to_str()
                .is_some_and(|dir| shared_dirs.iter().any(|s| s == dir));
            if shared {
                report.shared.push(package.name.clone());
            } else {
                report.core.push(package.name.clone());
            }
        }

        tracing::info!(
            built = report.built.len(),
            unbuilt = report.unbuilt.len(),
            published = report.published.len(),
            unpublished = report.unpublished.len(),
            "verification finished"
        );
        Ok(report)
    }
}

//! List command: packages grouped into primitives and shared packages.

use serde::Serialize;

use crate::context::WorkspaceContext;
use crate::workspace::Manifest;

/// One listed package directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListedPackage {
    pub dir: String,
    pub name: Option<String>,
    /// `None` when the manifest is missing, unreadable or has no version.
    pub version: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ListReport {
    pub core: Vec<ListedPackage>,
    pub shared: Vec<ListedPackage>,
}

impl ListReport {
    pub fn total(&self) -> usize {
        self.core.len() + self.shared.len()
    }
}

pub struct ListCommand<'a> {
    ctx: &'a WorkspaceContext,
}

impl<'a> ListCommand<'a> {
    pub fn new(ctx: &'a WorkspaceContext) -> Self {
        Self { ctx }
    }

    pub fn execute(&self) -> anyhow::Result<ListReport> {
        let scanner = self.ctx.scanner();
        let dirs = scanner.package_dirs()?;
        let shared_names = &self.ctx.config().shared_packages;

        let mut report = ListReport::default();
        for dir in dirs.iter().filter(|d| !shared_names.contains(d)) {
            report.core.push(self.describe(dir));
        }
        // shared packages keep their configured order
        for dir in shared_names.iter().filter(|d| dirs.contains(d)) {
            report.shared.push(self.describe(dir));
        }
        Ok(report)
    }

    fn describe(&self, dir: &str) -> ListedPackage {
        let path = self.ctx.scanner().manifest_path(dir);
        let manifest = match Manifest::read(self.ctx.store(), &path) {
            Ok(manifest) => Some(manifest),
            Err(err) => {
                tracing::debug!(dir = %dir, "no usable manifest: {}", err);
                None
            }
        };
        let field = |get: fn(&Manifest) -> Option<&str>| {
            manifest.as_ref().and_then(get).map(str::to_string)
        };

        ListedPackage {
            dir: dir.to_string(),
            name: field(Manifest::name),
            version: field(Manifest::version),
            description: field(Manifest::description),
        }
    }
}

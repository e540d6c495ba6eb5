//! Create and delete packages under the packages directory.

use std::path::PathBuf;

use anyhow::{Context, bail};
use serde::Serialize;

use crate::context::WorkspaceContext;
use crate::workspace::{MANIFEST_FILE, Manifest, scaffold, validate_package_name};

/// Files written by [`CreateCommand`].
#[derive(Debug, Clone, Serialize)]
pub struct CreateReport {
    pub name: String,
    pub dir: PathBuf,
    pub files: Vec<PathBuf>,
}

pub struct CreateCommand<'a> {
    ctx: &'a WorkspaceContext,
}

impl<'a> CreateCommand<'a> {
    pub fn new(ctx: &'a WorkspaceContext) -> Self {
        Self { ctx }
    }

    /// Scaffold `packages/<dir>` with a manifest, tsconfig and changelog.
    ///
    /// Refuses to touch an existing directory.
    pub fn execute(&self, dir: &str) -> anyhow::Result<CreateReport> {
        validate_package_name(dir)?;
        let store = self.ctx.store();
        let package_dir = self.ctx.packages_dir().join(dir);
        if store.exists(&package_dir) {
            bail!(
                "Package '{}' already exists at {}",
                dir,
                package_dir.display()
            );
        }

        let settings = &self.ctx.config().scaffold;
        let manifest = Manifest::new(
            package_dir.join(MANIFEST_FILE),
            scaffold::package_manifest(dir, settings),
        );
        let name = manifest.name().unwrap_or(dir).to_string();

        store
            .create_dir_all(&package_dir.join("src"))
            .with_context(|| format!("Failed to create {}", package_dir.display()))?;
        manifest.save(store)?;

        let mut files = vec![manifest.path().to_path_buf()];
        for (file, contents) in [
            ("tsconfig.json", scaffold::tsconfig()),
            ("CHANGELOG.md", scaffold::changelog(&name, &settings.version)),
        ] {
            let path = package_dir.join(file);
            store
                .write_atomic(&path, &contents)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            files.push(path);
        }

        tracing::info!(package = %name, dir = %package_dir.display(), "package created");
        Ok(CreateReport {
            name,
            dir: package_dir,
            files,
        })
    }
}

/// What [`DeleteCommand::inspect`] found for a package directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteTarget {
    pub dir: PathBuf,
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
}

pub struct DeleteCommand<'a> {
    ctx: &'a WorkspaceContext,
}

impl<'a> DeleteCommand<'a> {
    pub fn new(ctx: &'a WorkspaceContext) -> Self {
        Self { ctx }
    }

    /// Describe `packages/<dir>` so the caller can confirm the removal.
    pub fn inspect(&self, dir: &str) -> anyhow::Result<DeleteTarget> {
        let package_dir = self.ctx.packages_dir().join(dir);
        if dir.is_empty() || dir.contains(['/', '\\']) || dir == "." || dir == ".." {
            bail!("Invalid package directory '{}'", dir);
        }
        if !self.ctx.store().exists(&package_dir) {
            bail!(
                "Package '{}' does not exist at {}",
                dir,
                package_dir.display()
            );
        }

        let manifest = match Manifest::read(self.ctx.store(), package_dir.join(MANIFEST_FILE)) {
            Ok(manifest) => Some(manifest),
            Err(err) => {
                tracing::warn!(dir = %dir, "could not read manifest: {}", err);
                None
            }
        };
        let field = |get: fn(&Manifest) -> Option<&str>| {
            manifest.as_ref().and_then(get).map(str::to_string)
        };

        Ok(DeleteTarget {
            dir: package_dir,
            name: field(Manifest::name),
            version: field(Manifest::version),
            description: field(Manifest::description),
        })
    }

    /// Remove the inspected directory and everything in it.
    pub fn execute(&self, target: &DeleteTarget) -> anyhow::Result<()> {
        self.ctx
            .store()
            .remove_dir_all(&target.dir)
            .with_context(|| format!("Failed to delete {}", target.dir.display()))?;
        tracing::info!(dir = %target.dir.display(), "package deleted");
        Ok(())
    }
}

//! Inventory of the publishable packages under the packages directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};

use super::manifest::{MANIFEST_FILE, Manifest};
use crate::fs::FileStore;
use crate::types::PackageDescriptor;

pub struct Scanner<'a> {
    store: &'a dyn FileStore,
    packages_dir: PathBuf,
    exclude: Vec<String>,
}

impl<'a> Scanner<'a> {
    pub fn new(store: &'a dyn FileStore, packages_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            packages_dir: packages_dir.into(),
            exclude: Vec::new(),
        }
    }

    /// Skip packages whose name starts with any of `prefixes`.
    pub fn with_exclude(mut self, prefixes: Vec<String>) -> Self {
        self.exclude = prefixes;
        self
    }

    pub fn packages_dir(&self) -> &Path {
        &self.packages_dir
    }

    /// Directories directly under the packages directory, sorted.
    pub fn package_dirs(&self) -> anyhow::Result<Vec<String>> {
        if !self.store.exists(&self.packages_dir) {
            bail!(
                "Packages directory not found: {}",
                self.packages_dir.display()
            );
        }
        self.store
            .list_dirs(&self.packages_dir)
            .with_context(|| format!("Failed to list {}", self.packages_dir.display()))
    }

    pub fn manifest_path(&self, dir: &str) -> PathBuf {
        self.packages_dir.join(dir).join(MANIFEST_FILE)
    }

    /// One descriptor per usable manifest, in directory order.
    ///
    /// Missing, unreadable or malformed manifests are logged and skipped.
    pub fn scan(&self) -> anyhow::Result<Vec<PackageDescriptor>> {
        let mut packages = Vec::new();

        for dir in self.package_dirs()? {
            let path = self.manifest_path(&dir);
            if !self.store.exists(&path) {
                tracing::warn!(dir = %dir, "no {} found, skipping", MANIFEST_FILE);
                continue;
            }

            let manifest = match Manifest::read(self.store, &path) {
                Ok(manifest) => manifest,
                Err(err) => {
                    tracing::warn!(dir = %dir, "skipping: {}", err);
                    continue;
                }
            };
            let (name, version) = match manifest.identity() {
                Ok(identity) => identity,
                Err(err) => {
                    tracing::warn!(dir = %dir, "skipping: {}", err);
                    continue;
                }
            };

            if self.is_excluded(name) {
                tracing::debug!(package = %name, "excluded");
                continue;
            }

            packages.push(PackageDescriptor::new(name, version, dir.as_str()));
        }

        tracing::info!(count = packages.len(), "found packages");
        Ok(packages)
    }

    fn is_excluded(&self, name: &str) -> bool {
        self.exclude.iter().any(|prefix| name.starts_with(prefix))
    }
}

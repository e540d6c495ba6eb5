//! Classification of local packages against the registry.

use std::time::Duration;

use super::{RegistryQuery, RegistryRecord};
use crate::artifact::{PublicationStatus, StatusEntry};
use crate::config::CheckMode;
use crate::types::PackageDescriptor;

/// Queries the registry for each descriptor, one at a time.
pub struct StatusChecker<'a> {
    registry: &'a dyn RegistryQuery,
    mode: CheckMode,
    delay: Duration,
}

impl<'a> StatusChecker<'a> {
    pub fn new(registry: &'a dyn RegistryQuery, mode: CheckMode) -> Self {
        Self {
            registry,
            mode,
            delay: Duration::ZERO,
        }
    }

    /// Pause between consecutive queries.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn mode(&self) -> CheckMode {
        self.mode
    }

    /// Classify every descriptor in order. Query failures become Unknown
    /// entries; this never fails as a whole.
    pub async fn check(&self, packages: &[PackageDescriptor]) -> Vec<StatusEntry> {
        let mut entries = Vec::with_capacity(packages.len());

        for (index, package) in packages.iter().enumerate() {
            if index > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            let entry = self.classify(package).await;
            match &entry.status {
                PublicationStatus::Published { registry_version } => {
                    tracing::info!(
                        package = %package.name,
                        local = %package.local_version,
                        registry = %registry_version,
                        "published"
                    );
                }
                PublicationStatus::Unpublished { registry_version } => {
                    tracing::info!(
                        package = %package.name,
                        local = %package.local_version,
                        registry = %registry_version,
                        "not published"
                    );
                }
                PublicationStatus::Unknown { error } => {
                    tracing::warn!(package = %package.name, %error, "registry query failed");
                }
            }
            entries.push(entry);
        }

        entries
    }

    /// Classify a single descriptor.
    pub async fn classify(&self, package: &PackageDescriptor) -> StatusEntry {
        let record = match self.registry.lookup(&package.name).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                return StatusEntry::new(package, PublicationStatus::never_published());
            }
            Err(err) => {
                return StatusEntry::new(package, PublicationStatus::unknown(err.to_string()));
            }
        };

        let versions = record.versions.clone().unwrap_or_default();
        let status = match self.mode {
            CheckMode::Name => PublicationStatus::published(record.latest_version()),
            CheckMode::ExactVersion => match self.version_exists(package, &record).await {
                Ok(true) => PublicationStatus::published(record.latest_version()),
                Ok(false) => PublicationStatus::unpublished(record.latest_version()),
                Err(error) => PublicationStatus::unknown(error),
            },
        };

        StatusEntry::new(package, status).with_versions(versions)
    }

    async fn version_exists(
        &self,
        package: &PackageDescriptor,
        record: &RegistryRecord,
    ) -> Result<bool, String> {
        if let Some(found) = record.knows_version(&package.local_version) {
            return Ok(found);
        }
        self.registry
            .has_version(&package.name, &package.local_version)
            .await
            .map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{NEVER_PUBLISHED, PublicationState};
    use crate::registry::RegistryError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Scripted registry: known packages map to their version list, names in
    /// `failing` return a status error.
    #[derive(Default)]
    struct FakeRegistry {
        packages: HashMap<String, Vec<String>>,
        failing: Vec<String>,
        enumerates: bool,
        calls: Mutex<Vec<(String, tokio::time::Instant)>>,
    }

    impl FakeRegistry {
        fn new() -> Self {
            Self {
                enumerates: true,
                ..Self::default()
            }
        }

        fn with(mut self, name: &str, versions: &[&str]) -> Self {
            self.packages.insert(
                name.to_string(),
                versions.iter().map(|v| v.to_string()).collect(),
            );
            self
        }

        fn failing(mut self, name: &str) -> Self {
            self.failing.push(name.to_string());
            self
        }
    }

    #[async_trait]
    impl RegistryQuery for FakeRegistry {
        async fn lookup(&self, name: &str) -> Result<Option<RegistryRecord>, RegistryError> {
            self.calls
                .lock()
                .unwrap()
                .push((name.to_string(), tokio::time::Instant::now()));
            if self.failing.iter().any(|n| n == name) {
                return Err(RegistryError::Status {
                    url: format!("http://registry.test/{name}"),
                    status: 503,
                });
            }
            Ok(self.packages.get(name).map(|versions| RegistryRecord {
                latest: versions.last().cloned(),
                versions: self.enumerates.then(|| versions.clone()),
            }))
        }

        async fn has_version(&self, name: &str, version: &str) -> Result<bool, RegistryError> {
            Ok(self
                .packages
                .get(name)
                .is_some_and(|versions| versions.iter().any(|v| v == version)))
        }
    }

    fn descriptor(name: &str, version: &str) -> PackageDescriptor {
        PackageDescriptor::new(name, version, name.trim_start_matches("@acme/"))
    }

    #[tokio::test]
    async fn exact_mode_classifies_each_case() {
        let registry = FakeRegistry::new()
            .with("@acme/released", &["1.0.0"])
            .with("@acme/bumped", &["1.0.0"])
            .failing("@acme/flaky");
        let checker = StatusChecker::new(&registry, CheckMode::ExactVersion);

        let entries = checker
            .check(&[
                descriptor("@acme/released", "1.0.0"),
                descriptor("@acme/bumped", "1.1.0"),
                descriptor("@acme/fresh", "0.1.0"),
                descriptor("@acme/flaky", "1.0.0"),
            ])
            .await;

        let statuses: Vec<_> = entries.iter().map(|e| e.status.clone()).collect();
        assert_eq!(
            statuses,
            vec![
                PublicationStatus::published("1.0.0"),
                PublicationStatus::unpublished("1.0.0"),
                PublicationStatus::unpublished(NEVER_PUBLISHED),
                PublicationStatus::unknown(
                    "registry returned HTTP 503 for http://registry.test/@acme/flaky"
                ),
            ]
        );
        assert_eq!(entries[0].all_versions, vec!["1.0.0"]);
    }

    #[tokio::test]
    async fn name_mode_ignores_local_version() {
        let registry = FakeRegistry::new().with("@acme/bumped", &["1.0.0"]);
        let checker = StatusChecker::new(&registry, CheckMode::Name);

        let entry = checker.classify(&descriptor("@acme/bumped", "2.0.0")).await;

        assert_eq!(entry.status, PublicationStatus::published("1.0.0"));
    }

    #[tokio::test]
    async fn exact_mode_asks_registry_when_versions_are_not_listed() {
        let mut registry = FakeRegistry::new().with("@acme/released", &["1.0.0", "1.1.0"]);
        registry.enumerates = false;
        let checker = StatusChecker::new(&registry, CheckMode::ExactVersion);

        let entry = checker
            .classify(&descriptor("@acme/released", "1.0.0"))
            .await;

        assert_eq!(entry.status, PublicationStatus::published("1.1.0"));
        assert!(entry.all_versions.is_empty());
    }

    #[tokio::test]
    async fn unknown_carries_error_and_no_version() {
        let registry = FakeRegistry::new().failing("@acme/flaky");
        let checker = StatusChecker::new(&registry, CheckMode::ExactVersion);

        let entry = checker.classify(&descriptor("@acme/flaky", "1.0.0")).await;

        assert_eq!(entry.status.state(), PublicationState::Unknown);
        assert!(entry.status.registry_version().is_none());
        assert!(entry.status.error().is_some());
    }

    #[tokio::test]
    async fn repeated_checks_agree() {
        let registry = FakeRegistry::new()
            .with("@acme/a", &["1.0.0"])
            .failing("@acme/c");
        let checker = StatusChecker::new(&registry, CheckMode::ExactVersion);
        let packages = [
            descriptor("@acme/a", "1.0.0"),
            descriptor("@acme/b", "1.0.0"),
            descriptor("@acme/c", "1.0.0"),
        ];

        let first = checker.check(&packages).await;
        let second = checker.check(&packages).await;

        assert_eq!(first, second);
    }

    #[tokio::test(start_paused = true)]
    async fn queries_are_paced_and_sequential() {
        let registry = FakeRegistry::new();
        let checker = StatusChecker::new(&registry, CheckMode::ExactVersion)
            .with_delay(Duration::from_millis(100));

        let start = tokio::time::Instant::now();
        checker
            .check(&[
                descriptor("@acme/a", "1.0.0"),
                descriptor("@acme/b", "1.0.0"),
                descriptor("@acme/c", "1.0.0"),
            ])
            .await;

        let calls = registry.calls.lock().unwrap();
        let names: Vec<_> = calls.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["@acme/a", "@acme/b", "@acme/c"]);
        assert_eq!(calls[0].1 - start, Duration::ZERO);
        assert_eq!(calls[1].1 - calls[0].1, Duration::from_millis(100));
        assert_eq!(calls[2].1 - calls[1].1, Duration::from_millis(100));
    }
}

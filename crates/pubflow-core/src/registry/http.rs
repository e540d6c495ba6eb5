//! Registry access over the HTTP package-document endpoint.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use url::Url;

use super::{RegistryError, RegistryQuery, RegistryRecord};

const USER_AGENT: &str = concat!("pubflow/", env!("CARGO_PKG_VERSION"));

/// Queries `GET {base}/{name}` and reads `dist-tags` and `versions`.
#[derive(Debug, Clone)]
pub struct HttpRegistry {
    client: reqwest::Client,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct PackageDocument {
    #[serde(rename = "dist-tags", default)]
    dist_tags: HashMap<String, String>,
    #[serde(default)]
    versions: Map<String, Value>,
}

impl HttpRegistry {
    pub fn new(base_url: Url) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, base_url })
    }

    /// Document URL for a package; the scope separator is encoded.
    pub fn document_url(&self, name: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            name.replace('/', "%2F")
        )
    }
}

#[async_trait]
impl RegistryQuery for HttpRegistry {
    async fn lookup(&self, name: &str) -> Result<Option<RegistryRecord>, RegistryError> {
        let url = self.document_url(name);
        tracing::debug!(%url, "querying registry");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|source| RegistryError::Transport {
                url: url.clone(),
                source,
            })?;

        match response.status().as_u16() {
            200 => {}
            404 => return Ok(None),
            status => return Err(RegistryError::Status { url, status }),
        }

        let body = response
            .text()
            .await
            .map_err(|source| RegistryError::Transport {
                url: url.clone(),
                source,
            })?;

        let document: PackageDocument =
            serde_json::from_str(&body).map_err(|e| RegistryError::Malformed {
                name: name.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Some(RegistryRecord {
            latest: document.dist_tags.get("latest").cloned(),
            versions: Some(document.versions.keys().cloned().collect()),
        }))
    }
}

use log::debug;
use serde::Deserialize;

use crate::error::{RemoteError, UpdateError, response_snippet};

pub const DEFAULT_API_BASE: &str = "https://api.github.com";

#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub browser_download_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

impl Release {
    #[must_use]
    pub fn asset(&self, name: &str) -> Option<&ReleaseAsset> {
        self.assets.iter().find(|asset| asset.name == name)
    }
}

/// Tag and platform asset URL of the newest published release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestRelease {
    pub tag: String,
    pub download_url: String,
}

/// Queries a GitHub-compatible release index.
#[derive(Debug, Clone)]
pub struct ReleaseLocator {
    client: reqwest::Client,
    api_base: String,
    owner: String,
    repo: String,
}

impl ReleaseLocator {
    pub fn new(
        client: reqwest::Client,
        api_base: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    #[must_use]
    pub fn latest_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/releases/latest",
            self.api_base.trim_end_matches('/'),
            self.owner,
            self.repo
        )
    }

    /// Fetch the latest release and pick the asset named `asset_name`.
    ///
    /// # Errors
    /// Returns [`UpdateError::Network`] when the index is unreachable, and
    /// [`UpdateError::Remote`] for a non-success status, an undecodable body,
    /// or a release without a matching asset.
    pub async fn latest_release(&self, asset_name: &str) -> Result<LatestRelease, UpdateError> {
        let url = self.latest_url();
        debug!("Querying latest release: {url}");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|error| UpdateError::network("failed to query latest release", error))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_snippet = response
                .text()
                .await
                .ok()
                .map(|body| response_snippet(&body, 160))
                .unwrap_or_default();
            return Err(RemoteError::HttpStatus {
                status,
                body_snippet,
            }
            .into());
        }

        let release: Release = response.json().await.map_err(RemoteError::MalformedBody)?;

        match release.asset(asset_name) {
            Some(asset) => Ok(LatestRelease {
                tag: release.tag_name.clone(),
                download_url: asset.browser_download_url.clone(),
            }),
            None => Err(RemoteError::AssetNotFound {
                asset: asset_name.to_string(),
                tag: release.tag_name,
            }
            .into()),
        }
    }
}

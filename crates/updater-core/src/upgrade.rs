//! Startup upgrade pass: locate, decide, download, replace.
//!
//! [`Upgrader::run`] never fails. Every error is folded into
//! [`UpgradeOutcome::Failed`] so the caller keeps serving on the current
//! binary; only [`UpgradeOutcome::Upgraded`] asks the caller to exit.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use log::{debug, info, warn};
use thiserror::Error;

use crate::download::{discard_staged, download, staging_path};
use crate::error::UpdateError;
use crate::release::ReleaseLocator;
use crate::replace::replace_executable;
use crate::version::Version;

#[derive(Debug, Clone)]
pub struct UpgradeConfig {
    /// Version compiled into the running binary.
    pub current_version: String,
    pub api_base: String,
    pub owner: String,
    pub repo: String,
    pub asset_name: String,
    /// Live executable path; the staging file is created next to it.
    pub executable: PathBuf,
    pub enabled: bool,
    pub download_timeout: Option<Duration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeState {
    Idle,
    CheckingRemote,
    Downloading,
    Replacing,
}

impl fmt::Display for UpgradeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::CheckingRemote => write!(f, "checking remote"),
            Self::Downloading => write!(f, "downloading"),
            Self::Replacing => write!(f, "replacing"),
        }
    }
}

#[derive(Debug, Error)]
#[error("upgrade failed while {stage}{}: {source}", tag_suffix(.remote_tag.as_deref()))]
pub struct UpgradeFailure {
    pub stage: UpgradeState,
    pub remote_tag: Option<String>,
    #[source]
    pub source: UpdateError,
}

fn tag_suffix(tag: Option<&str>) -> String {
    tag.map(|tag| format!(" (remote {tag})")).unwrap_or_default()
}

#[derive(Debug)]
pub enum UpgradeOutcome {
    /// Checking was disabled by configuration.
    Skipped,
    UpToDate { local: String, remote: String },
    Failed(UpgradeFailure),
    /// The executable was replaced; the process must exit to be restarted.
    Upgraded { from: String, to: String },
}

impl UpgradeOutcome {
    #[must_use]
    pub fn requires_restart(&self) -> bool {
        matches!(self, Self::Upgraded { .. })
    }
}

/// Only a strictly newer final release is installed. Prereleases are never
/// picked up automatically, whatever their core version.
#[must_use]
pub fn should_upgrade(local: &Version, remote: &Version) -> bool {
    !remote.is_prerelease() && remote.is_newer_than(local)
}

pub struct Upgrader {
    config: UpgradeConfig,
    client: reqwest::Client,
    locator: ReleaseLocator,
}

impl Upgrader {
    #[must_use]
    pub fn new(client: reqwest::Client, config: UpgradeConfig) -> Self {
        let locator = ReleaseLocator::new(
            client.clone(),
            config.api_base.clone(),
            config.owner.clone(),
            config.repo.clone(),
        );
        Self {
            config,
            client,
            locator,
        }
    }

    #[must_use]
    pub fn config(&self) -> &UpgradeConfig {
        &self.config
    }

    pub async fn run(&self) -> UpgradeOutcome {
        let current = self.config.current_version.as_str();
        enter(UpgradeState::Idle);
        if !self.config.enabled {
            info!("Upgrade check disabled, staying on {current}");
            return UpgradeOutcome::Skipped;
        }

        enter(UpgradeState::CheckingRemote);
        let latest = match self.locator.latest_release(&self.config.asset_name).await {
            Ok(latest) => latest,
            Err(error) => return fail(UpgradeState::CheckingRemote, None, error),
        };

        let local = Version::parse(current);
        let remote = Version::parse(&latest.tag);
        if !should_upgrade(&local, &remote) {
            if let Err(error) = remote.compare(&local) {
                debug!("Cannot order versions: {error}");
            } else if remote.is_prerelease() {
                debug!("Ignoring prerelease {remote}");
            }
            info!("No newer release available (current={local} remote={remote})");
            return UpgradeOutcome::UpToDate {
                local: local.original().to_string(),
                remote: remote.original().to_string(),
            };
        }

        info!("New version {remote} available (current={local}), downloading");
        enter(UpgradeState::Downloading);
        let staged = staging_path(&self.config.executable);
        if let Err(error) = download(
            &self.client,
            &latest.download_url,
            &staged,
            self.config.download_timeout,
        )
        .await
        {
            discard_staged(&staged);
            return fail(UpgradeState::Downloading, Some(latest.tag), error);
        }

        enter(UpgradeState::Replacing);
        if let Err(error) = replace_executable(&staged, &self.config.executable) {
            discard_staged(&staged);
            return fail(UpgradeState::Replacing, Some(latest.tag), error);
        }

        info!("Upgrade to {remote} succeeded, exiting for supervisor restart");
        UpgradeOutcome::Upgraded {
            from: local.original().to_string(),
            to: latest.tag,
        }
    }
}

fn enter(state: UpgradeState) {
    debug!("Upgrade state: {state}");
}

fn fail(stage: UpgradeState, remote_tag: Option<String>, source: UpdateError) -> UpgradeOutcome {
    let remote_tag = remote_tag.or_else(|| source.release_tag().map(str::to_string));
    let failure = UpgradeFailure {
        stage,
        remote_tag,
        source,
    };
    if failure.source.is_asset_not_found() {
        warn!("No release asset published for this platform, {failure}");
    } else {
        warn!("{failure}");
    }
    UpgradeOutcome::Failed(failure)
}

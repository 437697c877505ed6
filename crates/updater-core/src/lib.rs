//! Self-update core for the updater daemon.
//!
//! - Version identifiers and their total order.
//! - Release lookup against a GitHub-compatible index.
//! - Staged download and atomic replacement of the running executable.
//! - The startup upgrade pass tying them together.

mod download;
mod error;
mod release;
mod replace;
mod upgrade;
pub mod version;

pub use download::{STAGING_FILE_NAME, discard_staged, download, staging_path};
pub use error::{RemoteError, UpdateError};
pub use release::{DEFAULT_API_BASE, LatestRelease, Release, ReleaseAsset, ReleaseLocator};
pub use replace::{replace_executable, replace_self};
pub use upgrade::{
    UpgradeConfig, UpgradeFailure, UpgradeOutcome, UpgradeState, Upgrader, should_upgrade,
};
pub use version::{Channel, Prerelease, Version, VersionError};

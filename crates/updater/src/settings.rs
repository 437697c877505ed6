use std::path::Path;

use serde::{Deserialize, Serialize};
use updater_core::DEFAULT_API_BASE;
use updater_platform::AppPaths;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_release_owner")]
    pub release_owner: String,

    #[serde(default = "default_release_repo")]
    pub release_repo: String,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default)]
    pub skip_upgrade: bool,

    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    #[serde(default = "default_download_timeout")]
    pub download_timeout_secs: u64,

    #[serde(default)]
    pub debug_logging: bool,

    #[serde(default = "default_max_log_size_bytes")]
    pub max_log_size_bytes: u64,
}

fn default_release_owner() -> String {
    "msmania".to_string()
}

fn default_release_repo() -> String {
    "updater".to_string()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_http_timeout() -> u64 {
    10
}

fn default_download_timeout() -> u64 {
    300
}

fn default_max_log_size_bytes() -> u64 {
    5 * 1024 * 1024
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            release_owner: default_release_owner(),
            release_repo: default_release_repo(),
            api_base: default_api_base(),
            listen_addr: default_listen_addr(),
            skip_upgrade: false,
            http_timeout_secs: default_http_timeout(),
            download_timeout_secs: default_download_timeout(),
            debug_logging: false,
            max_log_size_bytes: default_max_log_size_bytes(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, or from the platform config directory.
    ///
    /// A missing file yields defaults. Unreadable or invalid files also yield
    /// defaults; the problem is returned as a warning to log once logging is
    /// up.
    #[must_use]
    pub fn load(path: Option<&Path>) -> (Self, Option<String>) {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match AppPaths::new() {
                Ok(paths) => paths.settings_file(),
                Err(error) => return (Self::default(), Some(format!("{error}, using defaults"))),
            },
        };

        if !path.exists() {
            return (Self::default(), None);
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(settings) => (settings, None),
                Err(error) => (
                    Self::default(),
                    Some(format!("Ignoring invalid settings file {}: {error}", path.display())),
                ),
            },
            Err(error) => (
                Self::default(),
                Some(format!("Could not read settings file {}: {error}", path.display())),
            ),
        }
    }
}

mod cli;
mod error;
mod logging;
mod server;
mod settings;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use log::{error, info, warn};
use updater_core::{
    UpdateError, UpgradeConfig, UpgradeFailure, UpgradeOutcome, UpgradeState, Upgrader,
};

use crate::cli::Cli;
use crate::settings::Settings;

/// Version baked in at build time; release builds set `UPDATER_VERSION` to
/// the release tag.
const VERSION: &str = match option_env!("UPDATER_VERSION") {
    Some(version) => version,
    None => concat!("v", env!("CARGO_PKG_VERSION")),
};

/// Exit status after a successful self-replacement. The supervisor
/// (`Restart=on-failure`) restarts the process on the new binary.
const RESTART_EXIT_CODE: u8 = 1;
const SERVER_FAILURE_EXIT_CODE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.version {
        println!("{VERSION}");
        return ExitCode::SUCCESS;
    }

    let (mut settings, settings_warning) = Settings::load(cli.config.as_deref());
    cli.apply(&mut settings);

    logging::init_logging(settings.debug_logging, settings.max_log_size_bytes);
    if let Some(message) = settings_warning {
        warn!("{message}");
    }
    info!("updater {VERSION} starting");

    let outcome = upgrade(&settings).await;
    if outcome.requires_restart() {
        return ExitCode::from(RESTART_EXIT_CODE);
    }

    match server::serve(&settings.listen_addr, VERSION).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!("{error}");
            ExitCode::from(SERVER_FAILURE_EXIT_CODE)
        }
    }
}

async fn upgrade(settings: &Settings) -> UpgradeOutcome {
    // Not consulted when checking is disabled.
    let executable = if settings.skip_upgrade {
        PathBuf::new()
    } else {
        match updater_platform::current_executable() {
            Ok(path) => path,
            Err(source) => {
                return failed_before_check(UpdateError::Io {
                    context: "failed to get current executable",
                    source,
                });
            }
        }
    };

    let client = match http_client(settings) {
        Ok(client) => client,
        Err(source) => {
            return failed_before_check(UpdateError::Network {
                context: "failed to build HTTP client",
                source,
            });
        }
    };

    Upgrader::new(client, upgrade_config(settings, executable)).run().await
}

fn http_client(settings: &Settings) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.http_timeout_secs))
        .connect_timeout(Duration::from_secs(settings.http_timeout_secs))
        .user_agent(format!("updater/{VERSION}"))
        .build()
}

fn failed_before_check(source: UpdateError) -> UpgradeOutcome {
    let failure = UpgradeFailure {
        stage: UpgradeState::Idle,
        remote_tag: None,
        source,
    };
    warn!("{failure}");
    UpgradeOutcome::Failed(failure)
}

fn upgrade_config(settings: &Settings, executable: PathBuf) -> UpgradeConfig {
    UpgradeConfig {
        current_version: VERSION.to_string(),
        api_base: settings.api_base.clone(),
        owner: settings.release_owner.clone(),
        repo: settings.release_repo.clone(),
        asset_name: updater_platform::asset_name(),
        executable,
        enabled: !settings.skip_upgrade,
        download_timeout: Some(Duration::from_secs(settings.download_timeout_secs)),
    }
}

use std::path::PathBuf;

use clap::Parser;

use crate::settings::Settings;

/// Self-updating hello-world daemon.
#[derive(Debug, Parser)]
#[command(name = "updater", disable_version_flag = true)]
pub struct Cli {
    /// Print version and exit
    #[arg(long)]
    pub version: bool,

    /// Do not check for newer releases
    #[arg(long)]
    pub skip_upgrade: bool,

    /// Settings file (defaults to the platform config directory)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Address to serve on, overriding the settings file
    #[arg(long, value_name = "ADDR")]
    pub listen: Option<String>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Flags win over the settings file; absent flags leave it untouched.
    pub fn apply(&self, settings: &mut Settings) {
        if self.skip_upgrade {
            settings.skip_upgrade = true;
        }
        if self.debug {
            settings.debug_logging = true;
        }
        if let Some(listen) = &self.listen {
            settings.listen_addr.clone_from(listen);
        }
    }
}

use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use updater_platform::AppPaths;

fn open_for_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Log file that is reopened on the next write once logrotate or an operator
/// has removed it.
struct ReopeningLogFile {
    path: PathBuf,
    file: File,
}

impl ReopeningLogFile {
    fn open(path: PathBuf) -> io::Result<Self> {
        let file = open_for_append(&path)?;
        Ok(Self { path, file })
    }

    fn reopen_if_removed(&mut self) -> io::Result<()> {
        if self.path.exists() {
            return Ok(());
        }
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        self.file = open_for_append(&self.path)?;
        Ok(())
    }
}

impl Write for ReopeningLogFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.reopen_if_removed()?;
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Drop the older half of `log_path` once it exceeds `max_len` bytes. The cut
/// lands just after a newline so the first kept line is whole.
fn drop_older_half(log_path: &Path, max_len: u64) -> io::Result<()> {
    if std::fs::metadata(log_path)?.len() <= max_len {
        return Ok(());
    }
    let contents = std::fs::read(log_path)?;
    let middle = contents.len() / 2;
    let cut = match contents[middle..].iter().position(|&byte| byte == b'\n') {
        Some(offset) => middle + offset + 1,
        None => middle,
    };
    std::fs::write(log_path, &contents[cut..])
}

fn level_for(debug_enabled: bool) -> LevelFilter {
    if debug_enabled {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Log to stderr, which the supervisor captures, and to the data directory
/// log file when it is writable.
pub fn init_logging(debug_enabled: bool, max_log_size: u64) {
    let level = level_for(debug_enabled);
    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .add_filter_allow_str("updater")
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];

    let log_path = AppPaths::new()
        .ok()
        .filter(|paths| paths.ensure_dirs().is_ok())
        .map(|paths| paths.log_file());

    let mut trim_error = None;
    if let Some(log_path) = &log_path {
        trim_error = drop_older_half(log_path, max_log_size)
            .err()
            .filter(|error| error.kind() != io::ErrorKind::NotFound);
        if let Ok(writer) = ReopeningLogFile::open(log_path.clone()) {
            loggers.push(WriteLogger::new(level, config, writer));
        }
    }

    if let Err(error) = CombinedLogger::init(loggers) {
        eprintln!("logger already initialized: {error}");
        return;
    }

    if let Some(log_path) = log_path {
        log::debug!("Logging initialized, log file: {}", log_path.display());
    }
    if let Some(error) = trim_error {
        log::warn!("Could not trim log file: {error}");
    }
}

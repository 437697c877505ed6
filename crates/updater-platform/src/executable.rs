use std::path::PathBuf;

use log::debug;

const DELETED_SUFFIX: &str = " (deleted)";

/// Resolve the path of the running executable.
///
/// On Linux, once the file behind `/proc/self/exe` has been renamed over,
/// `current_exe()` reports the old inode with a ` (deleted)` suffix. The
/// suffix is stripped so callers get the path the live binary now occupies.
///
/// # Errors
/// Returns an error when the platform cannot report the executable path.
pub fn current_executable() -> std::io::Result<PathBuf> {
    let exe = std::env::current_exe()?;
    Ok(strip_deleted_suffix(exe))
}

fn strip_deleted_suffix(exe: PathBuf) -> PathBuf {
    if !cfg!(target_os = "linux") {
        return exe;
    }

    let fixed = exe
        .to_str()
        .and_then(|path| path.strip_suffix(DELETED_SUFFIX))
        .map(PathBuf::from);
    match fixed {
        Some(fixed) => {
            debug!("Adjusted exe path from deleted inode: {}", fixed.display());
            fixed
        }
        None => exe,
    }
}

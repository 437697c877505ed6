use std::path::Path;

use log::info;

#[cfg(windows)]
use crate::download::discard_staged;
use crate::error::UpdateError;

/// Atomically move `staged` onto `target`.
///
/// Both paths must live in the same directory (or at least on the same
/// filesystem): a rename is the only operation that leaves either the old or
/// the new file at `target` at every instant.
///
/// # Errors
/// Returns [`UpdateError::Io`] when the rename is refused, for example across
/// devices or without write permission on the directory. `target` is left as
/// it was.
pub fn replace_executable(staged: &Path, target: &Path) -> Result<(), UpdateError> {
    info!("Replacing {} with {}", target.display(), staged.display());

    match std::fs::rename(staged, target) {
        Ok(()) => Ok(()),
        #[cfg(windows)]
        Err(error)
            if error.kind() == std::io::ErrorKind::PermissionDenied && is_running_image(target) =>
        {
            // A mapped image cannot be renamed over on Windows.
            self_replace::self_replace(staged).map_err(|source| {
                UpdateError::io_with_path("failed to replace running executable", target, &source)
            })?;
            discard_staged(staged);
            Ok(())
        }
        Err(error) => Err(UpdateError::io_with_path(
            "failed to rename staged binary",
            target,
            &error,
        )),
    }
}

/// Replace the running executable with `staged`.
///
/// Convenience entry point for callers that do not track the executable path
/// themselves. [`crate::Upgrader`] takes the path from its config and calls
/// [`replace_executable`] directly.
///
/// # Errors
/// Returns [`UpdateError::Io`] when the executable path cannot be resolved or
/// the rename fails.
pub fn replace_self(staged: &Path) -> Result<(), UpdateError> {
    let exe = updater_platform::current_executable()
        .map_err(|error| UpdateError::io("failed to get current executable", error))?;
    replace_executable(staged, &exe)
}

#[cfg(windows)]
fn is_running_image(target: &Path) -> bool {
    updater_platform::current_executable().is_ok_and(|exe| exe == target)
}

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use log::{debug, info};
use tokio::io::AsyncWriteExt;

use crate::error::{RemoteError, UpdateError, response_snippet};

/// File name of the staged binary, always created next to the live one so the
/// final rename stays on one filesystem.
pub const STAGING_FILE_NAME: &str = "updater.new";

#[cfg(unix)]
const EXECUTABLE_MODE: u32 = 0o755;

/// Staging path for `executable`: a sibling named [`STAGING_FILE_NAME`].
#[must_use]
pub fn staging_path(executable: &Path) -> PathBuf {
    executable
        .parent()
        .map_or_else(|| PathBuf::from(STAGING_FILE_NAME), |dir| dir.join(STAGING_FILE_NAME))
}

/// Stream `url` into `dest`, replacing any previous content, and mark the
/// result executable. Returns the number of bytes written.
///
/// # Errors
/// Returns [`UpdateError::Network`] for transport failures (including a body
/// stream that breaks mid-way), [`UpdateError::Remote`] for a non-success
/// status and [`UpdateError::Io`] when the destination cannot be written.
pub async fn download(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    timeout: Option<Duration>,
) -> Result<u64, UpdateError> {
    let mut request = client.get(url);
    if let Some(timeout) = timeout {
        request = request.timeout(timeout);
    }

    let response = request
        .send()
        .await
        .map_err(|error| UpdateError::network("download request failed", error))?;

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

    let mut file = create_executable(dest).await?;
    let mut written: u64 = 0;

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|error| UpdateError::network("download stream error", error))?;
        file.write_all(&chunk).await.map_err(|error| {
            UpdateError::io_with_path("failed to write download data", dest, &error)
        })?;
        written += chunk.len() as u64;
    }

    file.flush().await.map_err(|error| {
        UpdateError::io_with_path("failed to flush download file", dest, &error)
    })?;
    file.sync_all().await.map_err(|error| {
        UpdateError::io_with_path("failed to sync download file", dest, &error)
    })?;
    drop(file);

    mark_executable(dest).await?;

    info!("Download complete: {written} bytes to {}", dest.display());
    Ok(written)
}

async fn create_executable(dest: &Path) -> Result<tokio::fs::File, UpdateError> {
    let mut options = tokio::fs::OpenOptions::new();
    options.create(true).write(true).truncate(true);
    #[cfg(unix)]
    options.mode(EXECUTABLE_MODE);

    options.open(dest).await.map_err(|error| {
        UpdateError::io_with_path("failed to create download file", dest, &error)
    })
}

// `mode` only applies when the file is created; a leftover staging file keeps
// whatever permissions it had.
#[cfg(unix)]
async fn mark_executable(dest: &Path) -> Result<(), UpdateError> {
    use std::os::unix::fs::PermissionsExt;

    tokio::fs::set_permissions(dest, std::fs::Permissions::from_mode(EXECUTABLE_MODE))
        .await
        .map_err(|error| {
            UpdateError::io_with_path("failed to mark download executable", dest, &error)
        })?;
    debug!("Marked {} executable", dest.display());
    Ok(())
}

#[cfg(not(unix))]
#[allow(clippy::unused_async)]
async fn mark_executable(_dest: &Path) -> Result<(), UpdateError> {
    Ok(())
}

/// Best-effort removal of a staging file left behind by a failed attempt.
pub fn discard_staged(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!("Removed staged file {}", path.display()),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
        Err(error) => debug!("Could not remove staged file {}: {error}", path.display()),
    }
}

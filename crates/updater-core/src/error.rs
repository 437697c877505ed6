use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("{context}: {source}")]
    Network {
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("release server returned HTTP {status}{body_snippet}")]
    HttpStatus {
        status: reqwest::StatusCode,
        body_snippet: String,
    },
    #[error("failed to decode release metadata: {0}")]
    MalformedBody(#[source] reqwest::Error),
    #[error("asset {asset} not found in release {tag}")]
    AssetNotFound { asset: String, tag: String },
}

impl UpdateError {
    pub(crate) fn network(context: &'static str, source: reqwest::Error) -> Self {
        Self::Network { context, source }
    }

    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn io_with_path(context: &'static str, path: &Path, source: &std::io::Error) -> Self {
        Self::io(
            context,
            std::io::Error::new(source.kind(), format!("{}: {source}", path.display())),
        )
    }

    /// The latest release exists but carries no build for this platform.
    #[must_use]
    pub fn is_asset_not_found(&self) -> bool {
        matches!(self, Self::Remote(RemoteError::AssetNotFound { .. }))
    }

    /// Release tag named by the error itself, if any.
    #[must_use]
    pub fn release_tag(&self) -> Option<&str> {
        match self {
            Self::Remote(RemoteError::AssetNotFound { tag, .. }) => Some(tag),
            _ => None,
        }
    }
}

pub(crate) fn response_snippet(body: &str, max_chars: usize) -> String {
    let snippet: String = body.chars().take(max_chars).collect();
    if snippet.is_empty() {
        String::new()
    } else {
        format!(": {snippet}")
    }
}

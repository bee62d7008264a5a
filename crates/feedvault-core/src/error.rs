//! Error taxonomy shared by capture, download and assembly.
//!
//! Every error carries an [`ErrorKind`] for logging and task reports. Only
//! session errors abort the current profile.

use std::path::PathBuf;
use thiserror::Error;

/// High-level classification used for logging and disposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or mislabeled encoding, malformed text or JSON. Exchange is skipped.
    Decode,
    /// Network error, non-success status or disk I/O error on a single file.
    Download,
    /// Playlist unreachable, unparseable or empty.
    Playlist,
    /// Fewer local segments than the playlist declared after the pool drained.
    IncompleteAssembly,
    /// Browser session unusable; aborts the current profile.
    Session,
}

/// Failure to turn captured response bytes into a feed envelope.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("response body is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("response body is not a feed envelope: {0}")]
    Json(#[from] serde_json::Error),
}

impl DecodeError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Decode
    }
}

/// Failure of a single-file fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection, etc.).
    #[error("transfer failed: {0}")]
    Curl(#[from] curl::Error),
    /// HTTP response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// Writing or finalizing the destination failed.
    #[error("storage error on {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Download
    }

    pub(crate) fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FetchError::Storage {
            path: path.into(),
            source,
        }
    }
}

/// Failure to obtain an ordered segment list from a playlist URL.
#[derive(Debug, Error)]
pub enum PlaylistError {
    #[error("playlist fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("invalid playlist URL {url}: {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("playlist could not be parsed: {0}")]
    Parse(String),
    #[error("master playlist has no variants")]
    NoVariants,
    #[error("playlist contains no segments")]
    Empty,
}

impl PlaylistError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Playlist
    }
}

/// Failure of a segmented assembly.
#[derive(Debug, Error)]
pub enum AssembleError {
    #[error(transparent)]
    Playlist(#[from] PlaylistError),
    #[error("only {found} of {expected} segments downloaded")]
    Incomplete { expected: usize, found: usize },
    #[error("assembly I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AssembleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AssembleError::Playlist(_) => ErrorKind::Playlist,
            AssembleError::Incomplete { .. } => ErrorKind::IncompleteAssembly,
            AssembleError::Io { .. } => ErrorKind::Download,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AssembleError::Io {
            path: path.into(),
            source,
        }
    }
}

/// The browser session itself failed.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("navigation to {url} failed: {reason}")]
    Navigate { url: String, reason: String },
    #[error("script execution failed: {0}")]
    Script(String),
    #[error("session closed")]
    Closed,
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Session
    }
}

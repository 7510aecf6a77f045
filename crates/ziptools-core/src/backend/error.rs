//! Errors reported by archive backends.

use super::Feature;
use thiserror::Error;

/// Result type alias for backend calls.
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Failure reported by an [`ArchiveBackend`](super::ArchiveBackend) or one of
/// its sessions.
///
/// The handle layer wraps these into
/// [`ArchiveError::Backend`](crate::ArchiveError::Backend) together with the
/// archive path and the operation that failed.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Exclusive create was requested but the file exists.
    #[error("file already exists")]
    Exists,

    /// The archive file does not exist and creation was not requested.
    #[error("no such file")]
    NoSuchFile,

    /// No entry at the given index.
    #[error("invalid entry index {0}")]
    InvalidIndex(usize),

    /// The entry at the given index was deleted in this session.
    #[error("entry {0} has been deleted")]
    Deleted(usize),

    /// The backend build does not offer this capability.
    #[error("{0} not supported by this backend")]
    Unsupported(Feature),

    /// The archive failed a consistency check.
    #[error("archive is inconsistent: {0}")]
    Inconsistent(String),

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP codec failure.
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Any other backend-specific failure.
    #[error("{0}")]
    Other(String),
}

impl BackendError {
    /// Returns `true` if the failure means the entry or archive is missing.
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::NoSuchFile | Self::InvalidIndex(_) | Self::Deleted(_))
    }
}

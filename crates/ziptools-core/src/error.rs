//! Error types for ZIP handle operations.

use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

use crate::backend::BackendError;
use crate::backend::Feature;

/// Result type alias using `ArchiveError`.
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Broad category of an [`ArchiveError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Archive file is missing and creation was not requested.
    NotFound,
    /// Exclusive create collided with an existing file.
    AlreadyExists,
    /// The backend reported a failure.
    Backend,
    /// An entry yielded fewer bytes than its declared size.
    TruncatedRead,
    /// An optional backend capability is missing.
    UnsupportedFeature,
    /// Configuration was rejected.
    InvalidConfig,
}

/// Errors that can occur while working with a ZIP handle.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// Archive file does not exist and creation was not requested.
    #[error("archive not found: {}", path.display())]
    NotFound {
        /// Absolute archive path.
        path: PathBuf,
    },

    /// Exclusive create found an existing file.
    #[error("archive already exists: {}", path.display())]
    AlreadyExists {
        /// Absolute archive path.
        path: PathBuf,
    },

    /// The archive backend failed.
    #[error("({}) {operation}: {source}", path.display())]
    Backend {
        /// Absolute archive path.
        path: PathBuf,
        /// Operation that failed, e.g. `"add"` or `"reopen"`.
        operation: &'static str,
        /// Backend failure.
        #[source]
        source: BackendError,
    },

    /// The entry stream ended before its declared size was read.
    #[error(
        "({}) truncated read of '{entry}': expected {expected} bytes, got {read}",
        path.display()
    )]
    TruncatedRead {
        /// Absolute archive path.
        path: PathBuf,
        /// Entry name.
        entry: String,
        /// Declared uncompressed size.
        expected: u64,
        /// Bytes actually read.
        read: u64,
    },

    /// The backend build lacks an optional capability.
    ///
    /// Operations log this as a warning and carry on; it is never returned
    /// from an entry operation.
    #[error("({}) {feature} not supported by the archive backend", path.display())]
    UnsupportedFeature {
        /// Absolute archive path.
        path: PathBuf,
        /// Missing capability.
        feature: Feature,
    },

    /// Compression level outside 1-9.
    #[error("invalid compression level {level}, must be 1-9")]
    InvalidCompressionLevel {
        /// The rejected level.
        level: u8,
    },
}

impl ArchiveError {
    pub(crate) fn backend(path: &Path, operation: &'static str, source: BackendError) -> Self {
        Self::Backend {
            path: path.to_path_buf(),
            operation,
            source,
        }
    }

    /// Returns the category of this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use ziptools_core::ArchiveError;
    /// use ziptools_core::ErrorKind;
    /// use std::path::PathBuf;
    ///
    /// let err = ArchiveError::NotFound {
    ///     path: PathBuf::from("/tmp/missing.zip"),
    /// };
    /// assert_eq!(err.kind(), ErrorKind::NotFound);
    /// ```
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::Backend { .. } => ErrorKind::Backend,
            Self::TruncatedRead { .. } => ErrorKind::TruncatedRead,
            Self::UnsupportedFeature { .. } => ErrorKind::UnsupportedFeature,
            Self::InvalidCompressionLevel { .. } => ErrorKind::InvalidConfig,
        }
    }

    /// Returns the archive path this error refers to, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::NotFound { path }
            | Self::AlreadyExists { path }
            | Self::Backend { path, .. }
            | Self::TruncatedRead { path, .. }
            | Self::UnsupportedFeature { path, .. } => Some(path),
            Self::InvalidCompressionLevel { .. } => None,
        }
    }

    /// Returns the backend failure, if this error wraps one.
    #[must_use]
    pub const fn backend_error(&self) -> Option<&BackendError> {
        match self {
            Self::Backend { source, .. } => Some(source),
            _ => None,
        }
    }
}

//! Error conversion utilities for CLI.
//!
//! Converts ziptools-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use std::path::Path;
use ziptools_core::ArchiveError;
use ziptools_core::backend::BackendError;

/// Converts `ArchiveError` to user-friendly anyhow error with context
pub fn convert_archive_error(err: ArchiveError, archive: &Path) -> anyhow::Error {
    match err {
        ArchiveError::NotFound { path } => {
            anyhow!(
                "Archive not found: {}\n\
                 HINT: Pass --create to create it, or use 'ziptools make'.",
                path.display()
            )
        }
        ArchiveError::AlreadyExists { path } => {
            anyhow!(
                "Archive already exists: {}\n\
                 HINT: Use 'ziptools add --create' to modify an existing archive.",
                path.display()
            )
        }
        ArchiveError::Backend {
            path,
            operation,
            source: BackendError::Zip(zip_err),
        } => {
            anyhow!(
                "Invalid archive '{}' during {operation}: {zip_err}\n\
                 HINT: The file may be corrupted or not a ZIP archive.",
                path.display()
            )
        }
        ArchiveError::Backend {
            path,
            operation,
            source: BackendError::Inconsistent(reason),
        } => {
            anyhow!(
                "Inconsistent archive '{}' during {operation}: {reason}\n\
                 HINT: Repair the archive with another tool before editing it.",
                path.display()
            )
        }
        ArchiveError::Backend {
            path,
            operation,
            source,
        } if source.is_missing() => {
            anyhow!(
                "Archive '{}' changed during {operation}: {source}\n\
                 HINT: Another process may have moved or deleted it.",
                path.display()
            )
        }
        ArchiveError::TruncatedRead {
            entry,
            expected,
            read,
            ..
        } => {
            anyhow!(
                "Entry '{entry}' in '{}' is truncated: expected {expected} bytes, got {read}\n\
                 HINT: The archive may be corrupted.",
                archive.display()
            )
        }
        _ => anyhow::Error::from(err)
            .context(format!("Error processing archive '{}'", archive.display())),
    }
}

/// Adds context to a generic error about archive operations
pub fn add_archive_context<T>(
    result: Result<T, ArchiveError>,
    archive: &Path,
) -> anyhow::Result<T> {
    result.map_err(|e| convert_archive_error(e, archive))
}

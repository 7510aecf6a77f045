//! High-level entry points using the bundled [`ZipBackend`].

use std::path::Path;

use crate::Result;
use crate::ZipBackendConfig;
use crate::ZipHandle;
use crate::backend::ArchiveBackend;
use crate::backend::FeatureSet;
use crate::backend::ZipBackend;

/// Opens the ZIP archive at `path` with the default backend settings.
///
/// With `create` set, a missing file is created on open.
///
/// # Errors
///
/// Returns [`ArchiveError::NotFound`](crate::ArchiveError::NotFound) if the
/// file is missing and `create` is false, or
/// [`ArchiveError::Backend`](crate::ArchiveError::Backend) if the file is not
/// a readable ZIP archive.
///
/// # Examples
///
/// ```no_run
/// use ziptools_core::ReadMode;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let handle = ziptools_core::open("site.zip", false)?;
/// for name in handle.list_entries()? {
///     println!("{name}");
/// }
/// let index = handle.get_entry("index.html", ReadMode::Auto)?;
/// # Ok(())
/// # }
/// ```
pub fn open<P: AsRef<Path>>(path: P, create: bool) -> Result<ZipHandle<ZipBackend>> {
    ZipHandle::open(ZipBackend::new(), path, create)
}

/// Opens the ZIP archive at `path` with explicit backend settings.
///
/// # Errors
///
/// Returns [`ArchiveError::InvalidCompressionLevel`](crate::ArchiveError::InvalidCompressionLevel)
/// if `config` is rejected, otherwise the same errors as [`open`].
pub fn open_with_config<P: AsRef<Path>>(
    path: P,
    create: bool,
    config: ZipBackendConfig,
) -> Result<ZipHandle<ZipBackend>> {
    config.validate()?;
    ZipHandle::open(ZipBackend::with_config(config), path, create)
}

/// Creates a new, empty ZIP archive at `path`.
///
/// The empty archive is on disk when this returns, so a second exclusive
/// create of the same path fails.
///
/// # Errors
///
/// Returns [`ArchiveError::AlreadyExists`](crate::ArchiveError::AlreadyExists)
/// if the file exists, or [`ArchiveError::Backend`](crate::ArchiveError::Backend)
/// for any other failure.
pub fn create_exclusive<P: AsRef<Path>>(path: P) -> Result<ZipHandle<ZipBackend>> {
    ZipHandle::create_exclusive(ZipBackend::new(), path)
}

/// Same as [`create_exclusive`], with explicit backend settings.
///
/// # Errors
///
/// Returns [`ArchiveError::InvalidCompressionLevel`](crate::ArchiveError::InvalidCompressionLevel)
/// if `config` is rejected, otherwise the same errors as [`create_exclusive`].
pub fn create_exclusive_with_config<P: AsRef<Path>>(
    path: P,
    config: ZipBackendConfig,
) -> Result<ZipHandle<ZipBackend>> {
    config.validate()?;
    ZipHandle::create_exclusive(ZipBackend::with_config(config), path)
}

/// Returns the optional capabilities of the bundled backend.
#[must_use]
pub fn features() -> FeatureSet {
    ZipBackend::new().features()
}

//! Configuration for the ZIP backend and for entry writes.

use crate::ArchiveError;
use crate::Result;

/// Configuration for [`ZipBackend`](crate::backend::ZipBackend).
///
/// # Examples
///
/// ```
/// use ziptools_core::ZipBackendConfig;
///
/// let config = ZipBackendConfig::default().with_compression_level(9);
/// assert_eq!(config.compression_level, Some(9));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipBackendConfig {
    /// Deflate level (1-9) for compressed entries.
    ///
    /// `None` uses the codec default.
    ///
    /// Default: `Some(6)`.
    pub compression_level: Option<u8>,
}

impl Default for ZipBackendConfig {
    fn default() -> Self {
        Self {
            compression_level: Some(6),
        }
    }
}

impl ZipBackendConfig {
    /// Creates a new `ZipBackendConfig` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the compression level.
    ///
    /// # Panics
    ///
    /// Panics if the compression level is not in the range 1-9.
    /// Use `validate()` for non-panicking validation.
    #[must_use]
    pub fn with_compression_level(mut self, level: u8) -> Self {
        assert!((1..=9).contains(&level), "compression level must be 1-9");
        self.compression_level = Some(level);
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the compression level is set but not in range 1-9.
    pub fn validate(&self) -> Result<()> {
        if let Some(level) = self.compression_level
            && !(1..=9).contains(&level)
        {
            return Err(ArchiveError::InvalidCompressionLevel { level });
        }
        Ok(())
    }
}

/// Options for [`ZipHandle::add_or_replace`](crate::ZipHandle::add_or_replace).
///
/// # Examples
///
/// ```
/// use ziptools_core::AddOptions;
///
/// let options = AddOptions::new().with_comment("generated").with_compress(false);
/// assert_eq!(options.comment.as_deref(), Some(&b"generated"[..]));
/// assert!(!options.compress);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOptions {
    /// Comment to attach to the entry.
    ///
    /// Default: `None`.
    pub comment: Option<Vec<u8>>,

    /// Compress the entry. `false` requests store-only.
    ///
    /// Default: `true`.
    pub compress: bool,
}

impl Default for AddOptions {
    fn default() -> Self {
        Self {
            comment: None,
            compress: true,
        }
    }
}

impl AddOptions {
    /// Creates a new `AddOptions` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the entry comment.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<Vec<u8>>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Sets whether the entry is compressed.
    #[must_use]
    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }
}

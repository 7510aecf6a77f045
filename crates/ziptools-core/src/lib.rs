//! Thread-safe handles for reading and editing ZIP archives in place.
//!
//! `ziptools-core` wraps one ZIP file on disk in a [`ZipHandle`]. Entries can
//! be listed, read, added, replaced, and deleted by name. Changes are staged
//! and written out atomically when the handle is closed; a closed handle
//! transparently reopens the next time it is used.
//!
//! # Examples
//!
//! ```no_run
//! use ziptools_core::AddOptions;
//! use ziptools_core::ReadMode;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let handle = ziptools_core::open("bundle.zip", true)?;
//! handle.add_or_replace("./config.json", r#"{"debug":true}"#, &AddOptions::default())?;
//! handle.close()?;
//!
//! let config = handle.get_entry("config.json", ReadMode::Auto)?;
//! assert!(config.is_some_and(|c| c.is_text()));
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod backend;
pub mod config;
pub mod content;
pub mod error;
pub mod handle;
mod operations;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod types;

// Re-export main API types
pub use api::create_exclusive;
pub use api::create_exclusive_with_config;
pub use api::features;
pub use api::open;
pub use api::open_with_config;
pub use backend::EntryStat;
pub use backend::Feature;
pub use backend::FeatureSet;
pub use config::AddOptions;
pub use config::ZipBackendConfig;
pub use content::Content;
pub use content::ContentKind;
pub use content::ReadMode;
pub use content::classify;
pub use error::ArchiveError;
pub use error::ErrorKind;
pub use error::Result;
pub use handle::ZipHandle;
pub use types::normalize;

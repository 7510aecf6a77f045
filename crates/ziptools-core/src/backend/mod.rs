//! Archive backends.
//!
//! A backend is the codec that actually reads and writes ZIP containers.
//! [`ZipHandle`](crate::ZipHandle) only talks to it through the
//! [`ArchiveBackend`] and [`ArchiveSession`] traits.

mod datetime;
pub mod error;
pub mod features;
pub mod traits;
pub mod zip;

pub use error::BackendError;
pub use error::BackendResult;
pub use features::Feature;
pub use features::FeatureSet;
pub use traits::ArchiveBackend;
pub use traits::ArchiveSession;
pub use traits::Compression;
pub use traits::EntryStat;
pub use traits::OpenFlags;
pub use self::zip::ZipBackend;
pub use self::zip::ZipSession;

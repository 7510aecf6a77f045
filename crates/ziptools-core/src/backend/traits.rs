//! Capability traits implemented by archive backends.

use std::io::Read;
use std::path::Path;
use std::time::SystemTime;

use super::BackendResult;
use super::FeatureSet;

/// Flags used when opening a backend session.
///
/// A handle reopens a closed session with the same flags minus `create`
/// and `exclusive`, so reopening only ever reads an existing file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenFlags {
    /// Create the archive if it does not exist.
    pub create: bool,
    /// Fail if the archive already exists. Only meaningful with `create`.
    pub exclusive: bool,
    /// Run extra consistency checks on an existing archive.
    pub check_consistency: bool,
}

impl OpenFlags {
    /// Flags for opening an existing archive, optionally creating it.
    #[must_use]
    pub const fn open(create: bool) -> Self {
        Self {
            create,
            exclusive: false,
            check_consistency: true,
        }
    }

    /// Flags for creating a new archive that must not exist yet.
    #[must_use]
    pub const fn create_exclusive() -> Self {
        Self {
            create: true,
            exclusive: true,
            check_consistency: false,
        }
    }

    /// Flags without create or check bits, used to reopen a handle
    /// obtained by [`OpenFlags::create_exclusive`].
    #[must_use]
    pub const fn plain() -> Self {
        Self {
            create: false,
            exclusive: false,
            check_consistency: false,
        }
    }
}

/// Compression requested for a single entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Compression {
    /// Whatever the backend compresses with by default.
    #[default]
    Default,
    /// Store the entry without compression.
    Store,
}

/// Metadata for a single archive entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryStat {
    /// Position of the entry in the archive.
    pub index: usize,
    /// Entry name.
    pub name: String,
    /// Uncompressed size in bytes.
    pub size: u64,
    /// Compressed size in bytes, if the entry has been written out.
    pub compressed_size: Option<u64>,
    /// Last modification time, if recorded.
    pub modified: Option<SystemTime>,
}

/// Factory for archive sessions.
///
/// Callers construct a backend and hand it to
/// [`ZipHandle::open`](crate::ZipHandle::open); there is no global registry.
pub trait ArchiveBackend: Send + Sync {
    /// Session type produced by this backend.
    type Session: ArchiveSession;

    /// Opens (or creates, depending on `flags`) the archive at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Exists`](super::BackendError::Exists) when an
    /// exclusive create collides with an existing file, and any other
    /// backend error when the archive cannot be opened.
    fn open(&self, path: &Path, flags: OpenFlags) -> BackendResult<Self::Session>;

    /// Returns the optional capabilities of this backend build.
    fn features(&self) -> FeatureSet;
}

/// One open archive.
///
/// Entry indices run over `0..len()`. Deleted entries keep their slot until
/// the session is closed, so `name_at` may return `None` for an index below
/// `len()`.
pub trait ArchiveSession: Send {
    /// Number of entry slots, including deleted ones.
    fn len(&self) -> usize;

    /// Returns `true` if the archive has no entry slots.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Finds a live entry by exact, case-sensitive name.
    fn locate(&self, name: &str) -> Option<usize>;

    /// Returns the name at `index`, or `None` if it cannot be retrieved.
    fn name_at(&self, index: usize) -> Option<&str>;

    /// Returns the metadata of the entry at `index`.
    fn stat(&mut self, index: usize) -> BackendResult<EntryStat>;

    /// Appends a new entry and returns its index.
    fn add(&mut self, name: &str, data: Vec<u8>) -> BackendResult<usize>;

    /// Replaces the content of the entry at `index`.
    fn replace(&mut self, index: usize, data: Vec<u8>) -> BackendResult<()>;

    /// Deletes the entry at `index`.
    fn delete(&mut self, index: usize) -> BackendResult<()>;

    /// Attaches a comment to the entry at `index`.
    fn set_comment(&mut self, index: usize, comment: &[u8]) -> BackendResult<()>;

    /// Selects the compression for the entry at `index`.
    fn set_compression(&mut self, index: usize, compression: Compression) -> BackendResult<()>;

    /// Opens a stream over the uncompressed content of the entry at `index`.
    fn open_entry(&mut self, index: usize) -> BackendResult<Box<dyn Read + '_>>;

    /// Flushes pending changes to disk.
    ///
    /// On failure the session must stay usable so that the close can be
    /// retried. After a successful close the session is dropped.
    fn close(&mut self) -> BackendResult<()>;
}

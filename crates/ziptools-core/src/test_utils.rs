//! Test utilities: in-memory archives and a fault-injecting backend.
//!
//! Compiled for this crate's own tests, and for other crates with the
//! `test-utils` feature.
//!
//! # Panics
//!
//! Functions in this module may panic on I/O errors since they are designed
//! for test use only where panics are acceptable.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::io::Cursor;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::SystemTime;

use crate::backend::ArchiveBackend;
use crate::backend::ArchiveSession;
use crate::backend::BackendError;
use crate::backend::BackendResult;
use crate::backend::Compression;
use crate::backend::EntryStat;
use crate::backend::Feature;
use crate::backend::FeatureSet;
use crate::backend::OpenFlags;

/// Creates an in-memory ZIP archive from a list of entries.
///
/// Each entry is a tuple of (path, content). Entries are stored
/// uncompressed.
///
/// # Examples
///
/// ```
/// use ziptools_core::test_utils::create_test_zip;
///
/// let zip_data = create_test_zip(vec![("file.txt", b"hello"), ("dir/nested.txt", b"world")]);
/// ```
#[must_use]
pub fn create_test_zip(entries: Vec<(&str, &[u8])>) -> Vec<u8> {
    use zip::write::SimpleFileOptions;
    use zip::write::ZipWriter;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored)
        .unix_permissions(0o644);

    for (path, data) in entries {
        zip.start_file(path, options).unwrap();
        zip.write_all(data).unwrap();
    }

    zip.finish().unwrap().into_inner()
}

/// One committed entry of a [`MemoryBackend`] archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryEntry {
    /// Entry name.
    pub name: String,
    /// Entry content.
    pub data: Vec<u8>,
    /// Modification time.
    pub modified: SystemTime,
    /// Attached comment.
    pub comment: Option<Vec<u8>>,
    /// Requested compression.
    pub compression: Compression,
}

#[derive(Debug, Default)]
struct Faults {
    failing_opens: AtomicUsize,
    failing_closes: AtomicUsize,
    failing_comments: AtomicUsize,
    /// Streams stop after this many bytes (0 = disabled).
    truncate_reads_at: AtomicUsize,
    /// Streams yield at most this many bytes per `read` call (0 = disabled).
    read_chunk: AtomicUsize,
    /// Streams yield this many extra zero bytes (0 = disabled).
    pad_reads_with: AtomicUsize,
    opens: AtomicUsize,
}

fn take_one(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

type Store = HashMap<PathBuf, Vec<MemoryEntry>>;

/// Backend keeping archives in memory, with injectable failures.
///
/// Clones share the same store and fault settings, so a test can keep a
/// clone to inspect what a handle committed.
///
/// # Examples
///
/// ```
/// use ziptools_core::ZipHandle;
/// use ziptools_core::test_utils::MemoryBackend;
///
/// let backend = MemoryBackend::new();
/// let handle = ZipHandle::create_exclusive(backend.clone(), "/mem/a.zip").unwrap();
/// handle.add_or_replace("x", "1", &Default::default()).unwrap();
/// handle.close().unwrap();
/// assert_eq!(backend.entries("/mem/a.zip").unwrap().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    store: Arc<Mutex<Store>>,
    faults: Arc<Faults>,
    features: FeatureSet,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// Creates a backend supporting every optional feature.
    #[must_use]
    pub fn new() -> Self {
        Self::with_features(FeatureSet::all())
    }

    /// Creates a backend supporting only `features`.
    #[must_use]
    pub fn with_features(features: FeatureSet) -> Self {
        Self {
            store: Arc::new(Mutex::new(HashMap::new())),
            faults: Arc::new(Faults::default()),
            features,
        }
    }

    fn store(&self) -> std::sync::MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the committed entries of the archive at `path`.
    #[must_use]
    pub fn entries(&self, path: impl AsRef<Path>) -> Option<Vec<MemoryEntry>> {
        self.store().get(path.as_ref()).cloned()
    }

    /// Returns the committed entry `name` of the archive at `path`.
    #[must_use]
    pub fn entry(&self, path: impl AsRef<Path>, name: &str) -> Option<MemoryEntry> {
        self.entries(path)?.into_iter().find(|e| e.name == name)
    }

    /// Number of times a session has been opened.
    #[must_use]
    pub fn opens(&self) -> usize {
        self.faults.opens.load(Ordering::SeqCst)
    }

    /// Makes the next `count` opens fail.
    pub fn fail_opens(&self, count: usize) {
        self.faults.failing_opens.store(count, Ordering::SeqCst);
    }

    /// Makes the next `count` closes fail.
    pub fn fail_closes(&self, count: usize) {
        self.faults.failing_closes.store(count, Ordering::SeqCst);
    }

    /// Makes the next `count` comment calls fail.
    pub fn fail_comments(&self, count: usize) {
        self.faults.failing_comments.store(count, Ordering::SeqCst);
    }

    /// Makes entry streams end after `bytes` bytes.
    pub fn truncate_reads_at(&self, bytes: usize) {
        self.faults.truncate_reads_at.store(bytes, Ordering::SeqCst);
    }

    /// Makes entry streams yield `bytes` zero bytes past the entry's end.
    pub fn pad_reads_with(&self, bytes: usize) {
        self.faults.pad_reads_with.store(bytes, Ordering::SeqCst);
    }

    /// Deletes the archive at `path`, as if removed from disk.
    pub fn remove_archive(&self, path: impl AsRef<Path>) {
        self.store().remove(path.as_ref());
    }

    /// Makes entry streams yield at most `bytes` bytes per read.
    pub fn read_in_chunks_of(&self, bytes: usize) {
        self.faults.read_chunk.store(bytes, Ordering::SeqCst);
    }
}

impl ArchiveBackend for MemoryBackend {
    type Session = MemorySession;

    fn open(&self, path: &Path, flags: OpenFlags) -> BackendResult<MemorySession> {
        self.faults.opens.fetch_add(1, Ordering::SeqCst);
        if take_one(&self.faults.failing_opens) {
            return Err(BackendError::Other("injected open failure".into()));
        }

        let mut store = self.store();
        let entries = match store.get(path) {
            Some(_) if flags.create && flags.exclusive => return Err(BackendError::Exists),
            Some(entries) => entries.clone(),
            None if flags.create => {
                store.insert(path.to_path_buf(), Vec::new());
                Vec::new()
            }
            None => return Err(BackendError::NoSuchFile),
        };

        Ok(MemorySession {
            path: path.to_path_buf(),
            slots: entries.into_iter().map(Some).collect(),
            store: Arc::clone(&self.store),
            faults: Arc::clone(&self.faults),
        })
    }

    fn features(&self) -> FeatureSet {
        self.features
    }
}

/// Session of a [`MemoryBackend`] archive. Changes commit on close.
#[derive(Debug)]
pub struct MemorySession {
    path: PathBuf,
    slots: Vec<Option<MemoryEntry>>,
    store: Arc<Mutex<Store>>,
    faults: Arc<Faults>,
}

impl MemorySession {
    fn live(&mut self, index: usize) -> BackendResult<&mut MemoryEntry> {
        self.slots
            .get_mut(index)
            .ok_or(BackendError::InvalidIndex(index))?
            .as_mut()
            .ok_or(BackendError::Deleted(index))
    }
}

/// Reader handing out at most `chunk` bytes per call.
struct Trickle<'a> {
    data: &'a [u8],
    chunk: usize,
}

impl Read for Trickle<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = buf.len().min(self.chunk).min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

impl ArchiveSession for MemorySession {
    fn len(&self) -> usize {
        self.slots.len()
    }

    fn locate(&self, name: &str) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|e| e.name == name))
    }

    fn name_at(&self, index: usize) -> Option<&str> {
        self.slots.get(index)?.as_ref().map(|e| e.name.as_str())
    }

    fn stat(&mut self, index: usize) -> BackendResult<EntryStat> {
        let entry = self.live(index)?;
        Ok(EntryStat {
            index,
            name: entry.name.clone(),
            size: entry.data.len() as u64,
            compressed_size: None,
            modified: Some(entry.modified),
        })
    }

    fn add(&mut self, name: &str, data: Vec<u8>) -> BackendResult<usize> {
        self.slots.push(Some(MemoryEntry {
            name: name.to_string(),
            data,
            modified: SystemTime::now(),
            comment: None,
            compression: Compression::Default,
        }));
        Ok(self.slots.len() - 1)
    }

    fn replace(&mut self, index: usize, data: Vec<u8>) -> BackendResult<()> {
        let entry = self.live(index)?;
        entry.data = data;
        entry.modified = SystemTime::now();
        Ok(())
    }

    fn delete(&mut self, index: usize) -> BackendResult<()> {
        self.live(index)?;
        self.slots[index] = None;
        Ok(())
    }

    fn set_comment(&mut self, index: usize, comment: &[u8]) -> BackendResult<()> {
        if take_one(&self.faults.failing_comments) {
            return Err(BackendError::Other("injected comment failure".into()));
        }
        self.live(index)?.comment = Some(comment.to_vec());
        Ok(())
    }

    fn set_compression(&mut self, index: usize, compression: Compression) -> BackendResult<()> {
        self.live(index)?.compression = compression;
        Ok(())
    }

    fn open_entry(&mut self, index: usize) -> BackendResult<Box<dyn Read + '_>> {
        let truncate = self.faults.truncate_reads_at.load(Ordering::SeqCst);
        let chunk = self.faults.read_chunk.load(Ordering::SeqCst);
        let pad = self.faults.pad_reads_with.load(Ordering::SeqCst) as u64;
        let data = self.live(index)?.data.as_slice();

        let data = if truncate > 0 {
            &data[..truncate.min(data.len())]
        } else {
            data
        };
        let stream = Trickle {
            data,
            chunk: if chunk > 0 { chunk } else { usize::MAX },
        };
        Ok(Box::new(stream.chain(std::io::repeat(0).take(pad))))
    }

    fn close(&mut self) -> BackendResult<()> {
        if take_one(&self.faults.failing_closes) {
            return Err(BackendError::Other("injected close failure".into()));
        }
        let committed = self.slots.iter().flatten().cloned().collect();
        self.store
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(self.path.clone(), committed);
        Ok(())
    }
}

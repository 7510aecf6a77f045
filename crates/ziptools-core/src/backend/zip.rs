//! ZIP backend built on the `zip` crate.
//!
//! The `zip` crate reads and writes whole archives; it has no in-place
//! update. A [`ZipSession`] therefore keeps every change staged in memory
//! and rewrites the archive when the session is closed. Unchanged entries
//! are raw-copied so they are never decompressed and recompressed.

use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::fs::OpenOptions;
use std::io::Cursor;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;

use tempfile::NamedTempFile;
use zip::CompressionMethod;
use zip::ZipArchive;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use super::ArchiveBackend;
use super::ArchiveSession;
use super::BackendError;
use super::BackendResult;
use super::Compression;
use super::EntryStat;
use super::Feature;
use super::FeatureSet;
use super::OpenFlags;
use super::datetime;
use crate::ZipBackendConfig;

/// [`ArchiveBackend`] over on-disk ZIP files.
///
/// Supports store-only entries ([`Feature::Compression`]). Entry comments and
/// extra fields are not offered.
///
/// # Examples
///
/// ```no_run
/// use ziptools_core::ZipHandle;
/// use ziptools_core::backend::ZipBackend;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let handle = ZipHandle::open(ZipBackend::new(), "bundle.zip", true)?;
/// handle.add_or_replace("readme.txt", "hello", &Default::default())?;
/// handle.close()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ZipBackend {
    config: ZipBackendConfig,
}

impl ZipBackend {
    /// Creates a backend with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend with the given configuration.
    #[must_use]
    pub fn with_config(config: ZipBackendConfig) -> Self {
        Self { config }
    }

    /// Returns the backend configuration.
    #[must_use]
    pub fn config(&self) -> &ZipBackendConfig {
        &self.config
    }
}

impl ArchiveBackend for ZipBackend {
    type Session = ZipSession;

    fn open(&self, path: &Path, flags: OpenFlags) -> BackendResult<ZipSession> {
        let source = match std::fs::metadata(path) {
            Ok(_) if flags.create && flags.exclusive => return Err(BackendError::Exists),
            Ok(meta) if meta.len() == 0 && flags.create => {
                write_empty_archive(path, false)?;
                None
            }
            Ok(_) => Some(read_archive(path, flags.check_consistency)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if !flags.create {
                    return Err(BackendError::NoSuchFile);
                }
                write_empty_archive(path, flags.exclusive)?;
                None
            }
            Err(e) => return Err(e.into()),
        };

        Ok(ZipSession::new(path, source, self.config.compression_level))
    }

    fn features(&self) -> FeatureSet {
        FeatureSet::empty().with(Feature::Compression)
    }
}

fn read_archive(path: &Path, check_consistency: bool) -> BackendResult<ZipArchive<File>> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file)?;
    if check_consistency {
        check_entries(&mut archive)?;
    }
    Ok(archive)
}

/// Reads every entry header and rejects duplicate names.
fn check_entries(archive: &mut ZipArchive<File>) -> BackendResult<()> {
    let mut seen = HashSet::with_capacity(archive.len());
    for i in 0..archive.len() {
        let entry = archive.by_index_raw(i)?;
        if !seen.insert(entry.name().to_string()) {
            return Err(BackendError::Inconsistent(format!(
                "duplicate entry name '{}'",
                entry.name()
            )));
        }
    }
    Ok(())
}

/// Writes an archive with no entries, reserving the path on disk.
fn write_empty_archive(path: &Path, exclusive: bool) -> BackendResult<()> {
    let mut options = OpenOptions::new();
    options.write(true);
    if exclusive {
        options.create_new(true);
    } else {
        options.create(true).truncate(true);
    }

    let file = options.open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::AlreadyExists {
            BackendError::Exists
        } else {
            BackendError::Io(e)
        }
    })?;
    ZipWriter::new(file).finish()?;
    Ok(())
}

enum SlotState {
    /// Unchanged entry at this index of the on-disk archive.
    Original(usize),
    Staged(StagedEntry),
    Deleted,
}

struct StagedEntry {
    data: Vec<u8>,
    modified: SystemTime,
    compression: Compression,
}

struct Slot {
    name: String,
    state: SlotState,
}

impl Slot {
    const fn is_deleted(&self) -> bool {
        matches!(self.state, SlotState::Deleted)
    }
}

/// An open ZIP archive with staged, uncommitted changes.
pub struct ZipSession {
    path: PathBuf,
    source: Option<ZipArchive<File>>,
    slots: Vec<Slot>,
    dirty: bool,
    compression_level: Option<u8>,
}

impl fmt::Debug for ZipSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZipSession")
            .field("path", &self.path)
            .field("slots", &self.slots.len())
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}

impl ZipSession {
    fn new(path: &Path, source: Option<ZipArchive<File>>, compression_level: Option<u8>) -> Self {
        let slots = source
            .as_ref()
            .map(|archive| {
                (0..archive.len())
                    .map(|i| Slot {
                        name: archive.name_for_index(i).unwrap_or_default().to_string(),
                        state: SlotState::Original(i),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            path: path.to_path_buf(),
            source,
            slots,
            dirty: false,
            compression_level,
        }
    }

    /// Returns `true` if there are changes not yet written to disk.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn live_slot_mut(&mut self, index: usize) -> BackendResult<&mut Slot> {
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(BackendError::InvalidIndex(index))?;
        if slot.is_deleted() {
            return Err(BackendError::Deleted(index));
        }
        Ok(slot)
    }

    /// Turns an original entry into a staged one so its options can change.
    fn materialize(&mut self, index: usize) -> BackendResult<&mut StagedEntry> {
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(BackendError::InvalidIndex(index))?;

        if let SlotState::Original(source_index) = slot.state {
            let archive = self.source.as_mut().ok_or(BackendError::InvalidIndex(index))?;
            let mut file = archive.by_index(source_index)?;
            let modified = file
                .last_modified()
                .and_then(datetime::to_system_time)
                .unwrap_or_else(SystemTime::now);
            let mut data = Vec::new();
            file.read_to_end(&mut data)?;
            slot.state = SlotState::Staged(StagedEntry {
                data,
                modified,
                compression: Compression::Default,
            });
        }

        match &mut slot.state {
            SlotState::Staged(entry) => Ok(entry),
            SlotState::Deleted => Err(BackendError::Deleted(index)),
            SlotState::Original(_) => Err(BackendError::Other(format!(
                "entry {index} could not be staged"
            ))),
        }
    }

    fn write_archive(&mut self, file: &mut File) -> BackendResult<()> {
        let mut writer = ZipWriter::new(file);

        for slot in &self.slots {
            match &slot.state {
                SlotState::Deleted => {}
                SlotState::Original(source_index) => {
                    let archive = self
                        .source
                        .as_mut()
                        .ok_or(BackendError::InvalidIndex(*source_index))?;
                    writer.raw_copy_file(archive.by_index_raw(*source_index)?)?;
                }
                SlotState::Staged(entry) => {
                    writer.start_file(
                        slot.name.as_str(),
                        entry_options(entry, self.compression_level),
                    )?;
                    writer.write_all(&entry.data)?;
                }
            }
        }

        writer.finish()?;
        Ok(())
    }
}

fn entry_options(entry: &StagedEntry, level: Option<u8>) -> SimpleFileOptions {
    let options = SimpleFileOptions::default()
        .last_modified_time(datetime::from_system_time(entry.modified))
        .large_file(entry.data.len() as u64 >= u64::from(u32::MAX));

    match entry.compression {
        Compression::Store => options.compression_method(CompressionMethod::Stored),
        Compression::Default => options
            .compression_method(CompressionMethod::Deflated)
            .compression_level(level.map(i64::from)),
    }
}

impl ArchiveSession for ZipSession {
    fn len(&self) -> usize {
        self.slots.len()
    }

    fn locate(&self, name: &str) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| !slot.is_deleted() && slot.name == name)
    }

    fn name_at(&self, index: usize) -> Option<&str> {
        self.slots
            .get(index)
            .filter(|slot| !slot.is_deleted())
            .map(|slot| slot.name.as_str())
    }

    fn stat(&mut self, index: usize) -> BackendResult<EntryStat> {
        let slot = self
            .slots
            .get(index)
            .ok_or(BackendError::InvalidIndex(index))?;

        match &slot.state {
            SlotState::Deleted => Err(BackendError::Deleted(index)),
            SlotState::Staged(entry) => Ok(EntryStat {
                index,
                name: slot.name.clone(),
                size: entry.data.len() as u64,
                compressed_size: None,
                modified: Some(entry.modified),
            }),
            SlotState::Original(source_index) => {
                let archive = self
                    .source
                    .as_mut()
                    .ok_or(BackendError::InvalidIndex(index))?;
                let file = archive.by_index_raw(*source_index)?;
                Ok(EntryStat {
                    index,
                    name: slot.name.clone(),
                    size: file.size(),
                    compressed_size: Some(file.compressed_size()),
                    modified: file.last_modified().and_then(datetime::to_system_time),
                })
            }
        }
    }

    fn add(&mut self, name: &str, data: Vec<u8>) -> BackendResult<usize> {
        self.slots.push(Slot {
            name: name.to_string(),
            state: SlotState::Staged(StagedEntry {
                data,
                modified: SystemTime::now(),
                compression: Compression::Default,
            }),
        });
        self.dirty = true;
        Ok(self.slots.len() - 1)
    }

    fn replace(&mut self, index: usize, data: Vec<u8>) -> BackendResult<()> {
        let slot = self.live_slot_mut(index)?;
        slot.state = SlotState::Staged(StagedEntry {
            data,
            modified: SystemTime::now(),
            compression: Compression::Default,
        });
        self.dirty = true;
        Ok(())
    }

    fn delete(&mut self, index: usize) -> BackendResult<()> {
        let slot = self.live_slot_mut(index)?;
        slot.state = SlotState::Deleted;
        self.dirty = true;
        Ok(())
    }

    fn set_comment(&mut self, _index: usize, _comment: &[u8]) -> BackendResult<()> {
        Err(BackendError::Unsupported(Feature::Comment))
    }

    fn set_compression(&mut self, index: usize, compression: Compression) -> BackendResult<()> {
        self.live_slot_mut(index)?;
        let entry = self.materialize(index)?;
        if entry.compression != compression {
            entry.compression = compression;
            self.dirty = true;
        }
        Ok(())
    }

    fn open_entry(&mut self, index: usize) -> BackendResult<Box<dyn Read + '_>> {
        let slot = self
            .slots
            .get(index)
            .ok_or(BackendError::InvalidIndex(index))?;

        match &slot.state {
            SlotState::Deleted => Err(BackendError::Deleted(index)),
            SlotState::Staged(entry) => Ok(Box::new(Cursor::new(entry.data.as_slice()))),
            SlotState::Original(source_index) => {
                let archive = self
                    .source
                    .as_mut()
                    .ok_or(BackendError::InvalidIndex(index))?;
                Ok(Box::new(archive.by_index(*source_index)?))
            }
        }
    }

    fn close(&mut self) -> BackendResult<()> {
        if !self.dirty {
            return Ok(());
        }

        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut temp = NamedTempFile::new_in(dir)?;
        self.write_archive(temp.as_file_mut())?;

        if let Ok(meta) = std::fs::metadata(&self.path) {
            temp.as_file().set_permissions(meta.permissions())?;
        }
        temp.persist(&self.path).map_err(|e| BackendError::Io(e.error))?;

        log::debug!(
            "committed {} entries to {}",
            self.slots.iter().filter(|s| !s.is_deleted()).count(),
            self.path.display()
        );
        self.dirty = false;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_zip;
    use tempfile::TempDir;

    fn read_all(session: &mut ZipSession, index: usize) -> Vec<u8> {
        let mut buf = Vec::new();
        session
            .open_entry(index)
            .unwrap()
            .read_to_end(&mut buf)
            .unwrap();
        buf
    }

    #[test]
    fn test_open_missing_without_create() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.zip");
        let result = ZipBackend::new().open(&path, OpenFlags::open(false));
        assert!(matches!(result, Err(BackendError::NoSuchFile)));
        assert!(!path.exists());
    }

    #[test]
    fn test_create_writes_empty_archive() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("new.zip");
        let session = ZipBackend::new().open(&path, OpenFlags::open(true)).unwrap();
        assert!(session.is_empty());
        assert!(path.exists());

        let archive = ZipArchive::new(File::open(&path).unwrap()).unwrap();
        assert_eq!(archive.len(), 0);
    }

    #[test]
    fn test_exclusive_create_collides() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("new.zip");
        let backend = ZipBackend::new();
        backend.open(&path, OpenFlags::create_exclusive()).unwrap();
        let second = backend.open(&path, OpenFlags::create_exclusive());
        assert!(matches!(second, Err(BackendError::Exists)));
    }

    #[test]
    fn test_zero_length_file_with_create() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("empty.zip");
        std::fs::write(&path, b"").unwrap();

        let session = ZipBackend::new().open(&path, OpenFlags::open(true)).unwrap();
        assert!(session.is_empty());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_not_a_zip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("text.zip");
        std::fs::write(&path, b"this is not a zip archive").unwrap();

        let result = ZipBackend::new().open(&path, OpenFlags::open(false));
        assert!(matches!(result, Err(BackendError::Zip(_))));
    }

    #[test]
    fn test_reads_existing_entries() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("existing.zip");
        std::fs::write(
            &path,
            create_test_zip(vec![("a.txt", b"alpha"), ("dir/b.bin", b"\x00\x01")]),
        )
        .unwrap();

        let mut session = ZipBackend::new().open(&path, OpenFlags::open(false)).unwrap();
        assert_eq!(session.len(), 2);
        assert_eq!(session.locate("dir/b.bin"), Some(1));
        assert_eq!(session.name_at(0), Some("a.txt"));
        assert_eq!(read_all(&mut session, 0), b"alpha");

        let stat = session.stat(1).unwrap();
        assert_eq!(stat.name, "dir/b.bin");
        assert_eq!(stat.size, 2);
        assert_eq!(stat.compressed_size, Some(2));
    }

    #[test]
    fn test_staged_changes_commit_on_close() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("commit.zip");
        std::fs::write(
            &path,
            create_test_zip(vec![("keep.txt", b"keep"), ("gone.txt", b"gone")]),
        )
        .unwrap();

        let backend = ZipBackend::new();
        let mut session = backend.open(&path, OpenFlags::open(false)).unwrap();
        let gone = session.locate("gone.txt").unwrap();
        session.delete(gone).unwrap();
        assert_eq!(session.name_at(gone), None);
        assert_eq!(session.locate("gone.txt"), None);
        session.add("new.txt", b"fresh".to_vec()).unwrap();
        assert!(session.is_dirty());
        session.close().unwrap();
        assert!(!session.is_dirty());

        let archive = ZipArchive::new(File::open(&path).unwrap()).unwrap();
        let mut names: Vec<&str> = archive.file_names().collect();
        names.sort_unstable();
        assert_eq!(names, vec!["keep.txt", "new.txt"]);

        let mut reopened = backend.open(&path, OpenFlags::open(false)).unwrap();
        let index = reopened.locate("new.txt").unwrap();
        assert_eq!(read_all(&mut reopened, index), b"fresh");
    }

    #[test]
    fn test_store_only_entry() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("stored.zip");
        let backend = ZipBackend::new();

        let mut session = backend.open(&path, OpenFlags::open(true)).unwrap();
        let data = vec![b'a'; 4096];
        let index = session.add("plain.txt", data.clone()).unwrap();
        session.set_compression(index, Compression::Store).unwrap();
        session.close().unwrap();

        let mut archive = ZipArchive::new(File::open(&path).unwrap()).unwrap();
        let entry = archive.by_name("plain.txt").unwrap();
        assert_eq!(entry.compression(), CompressionMethod::Stored);
        assert_eq!(entry.compressed_size(), 4096);
    }

    #[test]
    fn test_store_only_on_original_entry() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("restore.zip");
        std::fs::write(&path, create_test_zip(vec![("x.txt", b"xxxx")])).unwrap();

        let mut session = ZipBackend::new().open(&path, OpenFlags::open(false)).unwrap();
        session.set_compression(0, Compression::Store).unwrap();
        // Stored already on disk, but the entry is now staged.
        assert!(session.is_dirty());
        assert_eq!(read_all(&mut session, 0), b"xxxx");
    }

    #[test]
    fn test_comment_unsupported() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("c.zip");
        let mut session = ZipBackend::new().open(&path, OpenFlags::open(true)).unwrap();
        let index = session.add("a", b"a".to_vec()).unwrap();
        assert!(matches!(
            session.set_comment(index, b"note"),
            Err(BackendError::Unsupported(Feature::Comment))
        ));
        assert!(!ZipBackend::new().features().contains(Feature::Comment));
    }

    #[test]
    fn test_invalid_and_deleted_indices() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("idx.zip");
        let mut session = ZipBackend::new().open(&path, OpenFlags::open(true)).unwrap();
        assert!(matches!(session.stat(7), Err(BackendError::InvalidIndex(7))));

        let index = session.add("a", b"a".to_vec()).unwrap();
        session.delete(index).unwrap();
        assert!(matches!(session.stat(index), Err(BackendError::Deleted(_))));
        assert!(matches!(session.delete(index), Err(BackendError::Deleted(_))));
        assert!(session.open_entry(index).is_err());
    }

    #[test]
    fn test_clean_close_does_not_rewrite() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("clean.zip");
        let bytes = create_test_zip(vec![("a.txt", b"a")]);
        std::fs::write(&path, &bytes).unwrap();

        let mut session = ZipBackend::new().open(&path, OpenFlags::open(false)).unwrap();
        session.close().unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), bytes);
    }
}

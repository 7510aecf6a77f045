//! Entry operations on a [`ZipHandle`].
//!
//! Each operation normalizes the entry name, then runs inside one critical
//! section of the handle (see [`crate::handle`]).

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::io::Read;
use std::path::Path;
use std::time::SystemTime;

use crate::AddOptions;
use crate::ArchiveError;
use crate::Content;
use crate::ReadMode;
use crate::Result;
use crate::ZipHandle;
use crate::backend::ArchiveBackend;
use crate::backend::ArchiveSession;
use crate::backend::BackendError;
use crate::backend::Compression;
use crate::backend::EntryStat;
use crate::backend::Feature;
use crate::types::normalize;

impl<B: ArchiveBackend> ZipHandle<B> {
    /// Adds an entry, or replaces the content of an existing entry of the
    /// same name.
    ///
    /// Names are matched exactly (case-sensitive) after normalization; the
    /// last write wins. Returns the entry index, which stays valid until the
    /// next structural change to the archive.
    ///
    /// A comment or store-only request the backend cannot honour is logged
    /// as a warning and otherwise ignored. A backend that supports the
    /// capability but fails the call fails the whole operation.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Backend`] if reopening, adding, replacing,
    /// or setting the comment or compression fails.
    pub fn add_or_replace(
        &self,
        name: &str,
        content: impl Into<Vec<u8>>,
        options: &AddOptions,
    ) -> Result<usize> {
        let name = normalize(name);
        let data = content.into();
        let path = self.path();
        let features = self.features();

        self.with_open_session(|session| {
            let index = match session.locate(name) {
                Some(index) => {
                    session
                        .replace(index, data)
                        .map_err(|e| ArchiveError::backend(path, "replace", e))?;
                    index
                }
                None => session
                    .add(name, data)
                    .map_err(|e| ArchiveError::backend(path, "add", e))?,
            };

            if let Some(comment) = &options.comment {
                if features.contains(Feature::Comment) {
                    session
                        .set_comment(index, comment)
                        .map_err(|e| ArchiveError::backend(path, "set comment", e))?;
                } else {
                    warn_unsupported(path, Feature::Comment);
                }
            }

            if !options.compress {
                if features.contains(Feature::Compression) {
                    session
                        .set_compression(index, Compression::Store)
                        .map_err(|e| ArchiveError::backend(path, "set compression", e))?;
                } else {
                    warn_unsupported(path, Feature::Compression);
                }
            }

            Ok(index)
        })
    }

    /// Deletes an entry.
    ///
    /// Returns `false` if there is no such entry.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Backend`] if reopening or deleting fails.
    pub fn drop_entry(&self, name: &str) -> Result<bool> {
        let name = normalize(name);
        let path = self.path();

        self.with_open_session(|session| {
            let Some(index) = session.locate(name) else {
                return Ok(false);
            };
            session
                .delete(index)
                .map_err(|e| ArchiveError::backend(path, "delete", e))?;
            Ok(true)
        })
    }

    /// Reads an entry's content.
    ///
    /// Returns `None` if there is no such entry. With [`ReadMode::Auto`] the
    /// content is labelled by [`classify`](crate::classify).
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Backend`] if reopening, stat or reading fails,
    /// and [`ArchiveError::TruncatedRead`] if the entry yields fewer bytes
    /// than its declared size.
    pub fn get_entry(&self, name: &str, mode: ReadMode) -> Result<Option<Content>> {
        let name = normalize(name);
        let path = self.path();

        self.with_open_session(|session| {
            let Some(index) = session.locate(name) else {
                return Ok(None);
            };
            let stat = session
                .stat(index)
                .map_err(|e| ArchiveError::backend(path, "stat", e))?;
            let bytes = read_declared(session, path, name, index, stat.size)?;
            Ok(Some(Content::new(bytes, mode)))
        })
    }

    /// Returns `true` if an entry exists. Never reads content.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Backend`] if reopening fails.
    pub fn exists(&self, name: &str) -> Result<bool> {
        let name = normalize(name);
        self.with_open_session(|session| Ok(session.locate(name).is_some()))
    }

    /// Returns the metadata of an entry, or `None` if there is no such entry.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Backend`] if reopening or stat fails.
    pub fn stat(&self, name: &str) -> Result<Option<EntryStat>> {
        let name = normalize(name);
        let path = self.path();

        self.with_open_session(|session| {
            session
                .locate(name)
                .map(|index| {
                    session
                        .stat(index)
                        .map_err(|e| ArchiveError::backend(path, "stat", e))
                })
                .transpose()
        })
    }

    /// Returns the modification time of an entry.
    ///
    /// `None` if there is no such entry or it records no usable time.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Backend`] if reopening or stat fails.
    pub fn stat_mtime(&self, name: &str) -> Result<Option<SystemTime>> {
        Ok(self.stat(name)?.and_then(|stat| stat.modified))
    }

    /// Returns the uncompressed size of an entry, or `None` if there is no
    /// such entry.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Backend`] if reopening or stat fails.
    pub fn stat_size(&self, name: &str) -> Result<Option<u64>> {
        Ok(self.stat(name)?.map(|stat| stat.size))
    }

    /// Returns the names of all entries.
    ///
    /// Positions whose name cannot be retrieved (for example entries deleted
    /// in this session) are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Backend`] if reopening fails.
    pub fn list_entries(&self) -> Result<BTreeSet<String>> {
        self.with_open_session(|session| {
            Ok((0..session.len())
                .filter_map(|i| session.name_at(i).map(str::to_owned))
                .collect())
        })
    }

    /// Returns the metadata of every retrievable entry, in index order.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Backend`] if reopening or any stat fails.
    pub fn list_stats(&self) -> Result<Vec<EntryStat>> {
        let path = self.path();

        self.with_open_session(|session| {
            let live: Vec<usize> = (0..session.len())
                .filter(|i| session.name_at(*i).is_some())
                .collect();
            live.into_iter()
                .map(|i| {
                    session
                        .stat(i)
                        .map_err(|e| ArchiveError::backend(path, "stat", e))
                })
                .collect()
        })
    }
}

fn warn_unsupported(path: &Path, feature: Feature) {
    let warning = ArchiveError::UnsupportedFeature {
        path: path.to_path_buf(),
        feature,
    };
    log::warn!("{warning}");
}

/// Reads exactly `size` bytes of entry `index`, then drains the stream to
/// its end so data past the declared size or a bad checksum is reported.
fn read_declared<S: ArchiveSession>(
    session: &mut S,
    path: &Path,
    name: &str,
    index: usize,
    size: u64,
) -> Result<Vec<u8>> {
    let len = usize::try_from(size).map_err(|_| {
        ArchiveError::backend(
            path,
            "read",
            BackendError::Other(format!("entry '{name}' is too large to load ({size} bytes)")),
        )
    })?;
    let mut stream = session
        .open_entry(index)
        .map_err(|e| ArchiveError::backend(path, "open entry", e))?;

    let mut buf = vec![0u8; len];
    let mut filled = 0;
    while filled < len {
        match stream.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(ArchiveError::TruncatedRead {
                    path: path.to_path_buf(),
                    entry: name.to_string(),
                    expected: size,
                    read: filled as u64,
                });
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(ArchiveError::backend(path, "read", BackendError::Io(e))),
        }
    }

    // Checksums are only verified once the stream reports its end.
    let mut scratch = [0u8; 1];
    loop {
        match stream.read(&mut scratch) {
            Ok(0) => return Ok(buf),
            Ok(_) => {
                return Err(ArchiveError::backend(
                    path,
                    "read",
                    BackendError::Other(format!(
                        "entry '{name}' holds more than its declared {size} bytes"
                    )),
                ));
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(ArchiveError::backend(path, "read", BackendError::Io(e))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ContentKind;
    use crate::ErrorKind as ArchiveErrorKind;
    use crate::backend::FeatureSet;
    use crate::test_utils::MemoryBackend;

    const PATH: &str = "/mem/ops.zip";

    fn handle() -> (MemoryBackend, ZipHandle<MemoryBackend>) {
        let backend = MemoryBackend::new();
        let handle = ZipHandle::open(backend.clone(), PATH, true).unwrap();
        (backend, handle)
    }

    #[test]
    fn test_add_then_get_text() {
        let (_, h) = handle();
        h.add_or_replace("a.txt", "hello", &AddOptions::default())
            .unwrap();
        let content = h.get_entry("a.txt", ReadMode::Auto).unwrap().unwrap();
        assert_eq!(content.bytes, b"hello");
        assert_eq!(content.kind, ContentKind::Text);
    }

    #[test]
    fn test_get_missing_is_none() {
        let (_, h) = handle();
        assert!(h.get_entry("nope", ReadMode::Auto).unwrap().is_none());
        assert!(h.stat("nope").unwrap().is_none());
        assert!(h.stat_size("nope").unwrap().is_none());
        assert!(h.stat_mtime("nope").unwrap().is_none());
    }

    #[test]
    fn test_replace_keeps_index_and_count() {
        let (_, h) = handle();
        let first = h.add_or_replace("dup", "one", &AddOptions::default()).unwrap();
        h.add_or_replace("other", "x", &AddOptions::default()).unwrap();
        let before = h.list_entries().unwrap().len();

        let second = h.add_or_replace("dup", "two", &AddOptions::default()).unwrap();
        assert_eq!(first, second);
        assert_eq!(h.list_entries().unwrap().len(), before);
        let content = h.get_entry("dup", ReadMode::Auto).unwrap().unwrap();
        assert_eq!(content.bytes, b"two");
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let (_, h) = handle();
        h.add_or_replace("Readme", "a", &AddOptions::default()).unwrap();
        h.add_or_replace("README", "b", &AddOptions::default()).unwrap();
        assert_eq!(h.list_entries().unwrap().len(), 2);
    }

    #[test]
    fn test_normalized_names_are_equivalent() {
        let (_, h) = handle();
        h.add_or_replace("./x", vec![1u8, 2, 3], &AddOptions::default())
            .unwrap();
        assert!(h.exists("x").unwrap());
        assert_eq!(
            h.get_entry("./x", ReadMode::Auto).unwrap(),
            h.get_entry("x", ReadMode::Auto).unwrap()
        );
        assert!(h.list_entries().unwrap().contains("x"));
    }

    #[test]
    fn test_drop_entry() {
        let (_, h) = handle();
        assert!(!h.drop_entry("missing").unwrap());

        h.add_or_replace("a", "1", &AddOptions::default()).unwrap();
        h.add_or_replace("b", "2", &AddOptions::default()).unwrap();
        assert!(h.drop_entry("./a").unwrap());
        assert!(!h.exists("a").unwrap());
        assert!(!h.drop_entry("a").unwrap());

        let names = h.list_entries().unwrap();
        assert_eq!(names.into_iter().collect::<Vec<_>>(), vec!["b".to_string()]);
    }

    #[test]
    fn test_forced_read_modes() {
        let (_, h) = handle();
        h.add_or_replace("bin", vec![0xFF, 0x00, 0x10], &AddOptions::default())
            .unwrap();

        let auto = h.get_entry("bin", ReadMode::Auto).unwrap().unwrap();
        assert_eq!(auto.kind, ContentKind::Binary);
        let text = h.get_entry("bin", ReadMode::Text).unwrap().unwrap();
        assert_eq!(text.kind, ContentKind::Text);
        assert_eq!(text.bytes, auto.bytes);
    }

    #[test]
    fn test_stat_size_and_mtime() {
        let (_, h) = handle();
        let before = SystemTime::now();
        h.add_or_replace("s", vec![0u8; 1234], &AddOptions::default())
            .unwrap();
        assert_eq!(h.stat_size("s").unwrap(), Some(1234));
        let mtime = h.stat_mtime("./s").unwrap().unwrap();
        assert!(mtime >= before);
    }

    #[test]
    fn test_comment_and_store_with_support() {
        let (backend, h) = handle();
        let options = AddOptions::new().with_comment("note").with_compress(false);
        h.add_or_replace("c", "data", &options).unwrap();
        h.close().unwrap();

        let entry = backend.entry(PATH, "c").unwrap();
        assert_eq!(entry.comment.as_deref(), Some(&b"note"[..]));
        assert_eq!(entry.compression, Compression::Store);
    }

    #[test]
    fn test_missing_features_only_warn() {
        let backend = MemoryBackend::with_features(FeatureSet::empty());
        let h = ZipHandle::open(backend.clone(), PATH, true).unwrap();
        let options = AddOptions::new().with_comment("note").with_compress(false);
        h.add_or_replace("c", "data", &options).unwrap();
        h.close().unwrap();

        let entry = backend.entry(PATH, "c").unwrap();
        assert_eq!(entry.comment, None);
        assert_eq!(entry.compression, Compression::Default);
    }

    #[test]
    fn test_overlong_entry_stream_is_an_error() {
        let (backend, h) = handle();
        h.add_or_replace("long", "abc", &AddOptions::default()).unwrap();
        backend.pad_reads_with(4);

        let err = h.get_entry("long", ReadMode::Auto).unwrap_err();
        assert_eq!(err.kind(), ArchiveErrorKind::Backend);
        assert!(err.to_string().contains("declared 3 bytes"));
    }

    #[test]
    fn test_comment_failure_is_fatal() {
        let (backend, h) = handle();
        backend.fail_comments(1);
        let options = AddOptions::new().with_comment("note");
        let err = h.add_or_replace("c", "data", &options).unwrap_err();
        assert_eq!(err.kind(), ArchiveErrorKind::Backend);
        assert!(err.to_string().contains("set comment"));
    }

    #[test]
    fn test_partial_reads_are_retried() {
        let (backend, h) = handle();
        let data: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
        h.add_or_replace("chunky", data.clone(), &AddOptions::default())
            .unwrap();
        backend.read_in_chunks_of(7);

        let content = h.get_entry("chunky", ReadMode::Binary).unwrap().unwrap();
        assert_eq!(content.bytes, data);
    }

    #[test]
    fn test_truncated_read() {
        let (backend, h) = handle();
        h.add_or_replace("short", vec![b'a'; 100], &AddOptions::default())
            .unwrap();
        backend.truncate_reads_at(40);

        let err = h.get_entry("short", ReadMode::Auto).unwrap_err();
        match err {
            ArchiveError::TruncatedRead {
                entry,
                expected,
                read,
                ..
            } => {
                assert_eq!(entry, "short");
                assert_eq!(expected, 100);
                assert_eq!(read, 40);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_entry() {
        let (_, h) = handle();
        h.add_or_replace("empty", Vec::new(), &AddOptions::default())
            .unwrap();
        let content = h.get_entry("empty", ReadMode::Auto).unwrap().unwrap();
        assert!(content.is_empty());
        assert!(content.is_text());
    }

    #[test]
    fn test_operations_reopen_closed_handle() {
        let (backend, h) = handle();
        h.add_or_replace("a", "1", &AddOptions::default()).unwrap();
        assert!(h.close().unwrap());

        assert!(h.exists("a").unwrap());
        assert!(h.is_open());
        assert_eq!(backend.opens(), 2);
        assert!(h.close().unwrap());
        assert!(!h.close().unwrap());
    }

    #[test]
    fn test_list_stats_skips_deleted() {
        let (_, h) = handle();
        h.add_or_replace("a", "1", &AddOptions::default()).unwrap();
        h.add_or_replace("b", "22", &AddOptions::default()).unwrap();
        h.drop_entry("a").unwrap();

        let stats = h.list_stats().unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].name, "b");
        assert_eq!(stats[0].size, 2);
    }
}

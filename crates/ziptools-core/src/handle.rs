//! The ZIP handle: one archive path, its lock and its open/closed state.
//!
//! Every public operation runs as a single critical section:
//!
//! 1. lock the handle state,
//! 2. reopen the backend session if the handle was closed,
//! 3. make zero or more backend calls,
//! 4. release the lock when the guard drops.
//!
//! A closed handle stays usable; the next operation that needs the archive
//! reopens it with the flags the handle was created with.

use std::fmt;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use crate::ArchiveError;
use crate::Result;
use crate::backend::ArchiveBackend;
use crate::backend::ArchiveSession;
use crate::backend::BackendError;
use crate::backend::FeatureSet;
use crate::backend::OpenFlags;

/// Open/closed state of a handle.
///
/// The session is present exactly when the handle is open.
#[derive(Debug)]
pub(crate) enum HandleState<S> {
    Open(S),
    Closed,
}

impl<S> HandleState<S> {
    const fn is_open(&self) -> bool {
        matches!(self, Self::Open(_))
    }

    /// Returns the session, first reopening it with `reopen` if closed.
    ///
    /// If `reopen` fails the state stays `Closed`.
    fn ensure_open<E>(
        &mut self,
        reopen: impl FnOnce() -> std::result::Result<S, E>,
    ) -> std::result::Result<&mut S, E> {
        if let Self::Closed = self {
            *self = Self::Open(reopen()?);
        }
        match self {
            Self::Open(session) => Ok(session),
            Self::Closed => unreachable!("handle state was reopened above"),
        }
    }
}

/// A logical handle on one ZIP archive.
///
/// The handle owns its backend session exclusively and guards it with a
/// mutex, so a `ZipHandle` can be shared between threads through an `Arc`.
/// Operations on one handle are totally ordered by lock acquisition.
///
/// Dropping the handle closes (commits) the session if it is still open.
///
/// # Examples
///
/// ```no_run
/// use ziptools_core::AddOptions;
/// use ziptools_core::ReadMode;
/// use ziptools_core::ZipHandle;
/// use ziptools_core::backend::ZipBackend;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let handle = ZipHandle::open(ZipBackend::new(), "site.zip", true)?;
/// handle.add_or_replace("./index.html", "<h1>hi</h1>", &AddOptions::default())?;
/// handle.close()?;
///
/// // Closed handles reopen on demand.
/// let page = handle.get_entry("index.html", ReadMode::Auto)?;
/// assert!(page.is_some_and(|c| c.is_text()));
/// # Ok(())
/// # }
/// ```
pub struct ZipHandle<B: ArchiveBackend> {
    path: PathBuf,
    flags: OpenFlags,
    backend: B,
    features: FeatureSet,
    state: Mutex<HandleState<B::Session>>,
}

impl<B: ArchiveBackend> ZipHandle<B> {
    /// Opens the archive at `path`, creating it if `create` is set.
    ///
    /// `path` is resolved to an absolute path first. Without `create`, a
    /// missing file fails with [`ArchiveError::NotFound`] before the backend
    /// is touched.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::NotFound`] if the file is missing and `create`
    /// is false, or [`ArchiveError::Backend`] if the backend cannot open it.
    pub fn open<P: AsRef<Path>>(backend: B, path: P, create: bool) -> Result<Self> {
        let path = resolve(path.as_ref())?;
        if !create && !path.exists() {
            return Err(ArchiveError::NotFound { path });
        }
        // Reopens never carry the create bit; a vanished file stays gone.
        Self::with_session(backend, path, OpenFlags::open(create), OpenFlags::open(false))
    }

    /// Creates a new archive at `path`, failing if the file exists.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::AlreadyExists`] if the file exists, or
    /// [`ArchiveError::Backend`] for any other backend failure.
    pub fn create_exclusive<P: AsRef<Path>>(backend: B, path: P) -> Result<Self> {
        let path = resolve(path.as_ref())?;
        Self::with_session(backend, path, OpenFlags::create_exclusive(), OpenFlags::plain())
    }

    fn with_session(
        backend: B,
        path: PathBuf,
        flags: OpenFlags,
        reopen_flags: OpenFlags,
    ) -> Result<Self> {
        let session = backend.open(&path, flags).map_err(|e| match e {
            BackendError::Exists => ArchiveError::AlreadyExists { path: path.clone() },
            other => ArchiveError::backend(&path, "open", other),
        })?;
        log::debug!("opened archive {}", path.display());

        let features = backend.features();
        Ok(Self {
            path,
            flags: reopen_flags,
            backend,
            features,
            state: Mutex::new(HandleState::Open(session)),
        })
    }

    /// Returns the absolute path of the archive.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the backend capabilities captured when the handle was opened.
    #[must_use]
    pub const fn features(&self) -> FeatureSet {
        self.features
    }

    /// Returns `true` if the backend session is currently open.
    pub fn is_open(&self) -> bool {
        self.lock().is_open()
    }

    /// Closes the backend session, writing out pending changes.
    ///
    /// Returns `false` if the handle was already closed. If the backend fails
    /// to close, the handle stays open and the close can be retried.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Backend`] if the backend fails to close.
    pub fn close(&self) -> Result<bool> {
        let mut state = self.lock();
        let HandleState::Open(session) = &mut *state else {
            return Ok(false);
        };
        session
            .close()
            .map_err(|e| ArchiveError::backend(&self.path, "close", e))?;
        *state = HandleState::Closed;
        log::debug!("closed archive {}", self.path.display());
        Ok(true)
    }

    /// Alias for [`close`](Self::close).
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Backend`] if the backend fails to close.
    pub fn commit(&self) -> Result<bool> {
        self.close()
    }

    fn lock(&self) -> MutexGuard<'_, HandleState<B::Session>> {
        // State changes are single assignments, so a panic elsewhere cannot
        // leave the state half-updated.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `op` against the open session inside one critical section.
    pub(crate) fn with_open_session<T>(
        &self,
        op: impl FnOnce(&mut B::Session) -> Result<T>,
    ) -> Result<T> {
        let mut state = self.lock();
        let session = state.ensure_open(|| {
            let session = self
                .backend
                .open(&self.path, self.flags)
                .map_err(|e| ArchiveError::backend(&self.path, "reopen", e))?;
            log::debug!("reopened archive {}", self.path.display());
            Ok(session)
        })?;
        op(session)
    }
}

impl<B: ArchiveBackend> Drop for ZipHandle<B> {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let HandleState::Open(session) = state
            && let Err(e) = session.close()
        {
            log::warn!("failed to close archive {} on drop: {e}", self.path.display());
        }
    }
}

impl<B: ArchiveBackend> fmt::Display for ZipHandle<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ZipHandle('{}')", self.path.display())?;
        if !self.is_open() {
            f.write_str(" closed")?;
        }
        Ok(())
    }
}

impl<B: ArchiveBackend> fmt::Debug for ZipHandle<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZipHandle")
            .field("path", &self.path)
            .field("flags", &self.flags)
            .field("features", &self.features)
            .field("open", &self.is_open())
            .finish_non_exhaustive()
    }
}

fn resolve(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path)
        .map_err(|e| ArchiveError::backend(path, "resolve path", BackendError::Io(e)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::test_utils::MemoryBackend;

    const PATH: &str = "/mem/handle.zip";

    #[test]
    fn test_state_ensure_open_reopens_once() {
        let mut state: HandleState<u32> = HandleState::Closed;
        let mut calls = 0;
        let value = state
            .ensure_open(|| {
                calls += 1;
                Ok::<_, ()>(7)
            })
            .unwrap();
        assert_eq!(*value, 7);
        assert!(state.is_open());

        state.ensure_open(|| Ok::<_, ()>(9)).unwrap();
        assert_eq!(calls, 1);
        assert!(matches!(state, HandleState::Open(7)));
    }

    #[test]
    fn test_state_failed_reopen_stays_closed() {
        let mut state: HandleState<u32> = HandleState::Closed;
        assert!(state.ensure_open(|| Err("boom")).is_err());
        assert!(!state.is_open());
    }

    #[test]
    fn test_open_missing_never_touches_backend() {
        let backend = MemoryBackend::new();
        let err = ZipHandle::open(backend.clone(), "/definitely/not/here.zip", false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(backend.opens(), 0);
    }

    #[test]
    fn test_create_exclusive_twice() {
        let backend = MemoryBackend::new();
        let first = ZipHandle::create_exclusive(backend.clone(), PATH).unwrap();
        assert!(first.is_open());
        let err = ZipHandle::create_exclusive(backend, PATH).unwrap_err();
        assert!(matches!(err, ArchiveError::AlreadyExists { .. }));
    }

    #[test]
    fn test_open_failure_is_backend_error() {
        let backend = MemoryBackend::new();
        backend.fail_opens(1);
        let err = ZipHandle::open(backend, PATH, true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Backend);
        assert_eq!(err.path(), Some(Path::new(PATH)));
    }

    #[test]
    fn test_close_then_close_again() {
        let handle = ZipHandle::open(MemoryBackend::new(), PATH, true).unwrap();
        assert!(handle.close().unwrap());
        assert!(!handle.is_open());
        assert!(!handle.close().unwrap());
    }

    #[test]
    fn test_failed_close_is_retryable() {
        let backend = MemoryBackend::new();
        let handle = ZipHandle::open(backend.clone(), PATH, true).unwrap();
        backend.fail_closes(1);

        let err = handle.close().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Backend);
        assert!(handle.is_open());

        assert!(handle.commit().unwrap());
        assert!(!handle.is_open());
    }

    #[test]
    fn test_reopen_on_demand() {
        let backend = MemoryBackend::new();
        let handle = ZipHandle::open(backend.clone(), PATH, true).unwrap();
        handle.close().unwrap();
        assert_eq!(backend.opens(), 1);

        handle.with_open_session(|_| Ok(())).unwrap();
        assert!(handle.is_open());
        assert_eq!(backend.opens(), 2);

        // Already open: no further reopen.
        handle.with_open_session(|_| Ok(())).unwrap();
        assert_eq!(backend.opens(), 2);
    }

    #[test]
    fn test_reopen_does_not_recreate_removed_archive() {
        let backend = MemoryBackend::new();
        let handle = ZipHandle::open(backend.clone(), PATH, true).unwrap();
        handle.close().unwrap();
        backend.remove_archive(PATH);

        let err = handle.with_open_session(|_| Ok(())).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Backend);
        assert!(matches!(err.backend_error(), Some(BackendError::NoSuchFile)));
        assert!(!handle.is_open());
        assert!(backend.entries(PATH).is_none());
    }

    #[test]
    fn test_failed_reopen_leaves_handle_closed() {
        let backend = MemoryBackend::new();
        let handle = ZipHandle::open(backend.clone(), PATH, true).unwrap();
        handle.close().unwrap();
        backend.fail_opens(1);

        let err = handle.with_open_session(|_| Ok(())).unwrap_err();
        assert!(err.to_string().contains("reopen"));
        assert!(!handle.is_open());

        handle.with_open_session(|_| Ok(())).unwrap();
        assert!(handle.is_open());
    }

    #[test]
    fn test_display() {
        let handle = ZipHandle::open(MemoryBackend::new(), PATH, true).unwrap();
        assert_eq!(handle.to_string(), format!("ZipHandle('{PATH}')"));
        handle.close().unwrap();
        assert_eq!(handle.to_string(), format!("ZipHandle('{PATH}') closed"));
    }

    #[test]
    fn test_relative_path_is_resolved() {
        let handle = ZipHandle::open(MemoryBackend::new(), "relative.zip", true).unwrap();
        assert!(handle.path().is_absolute());
        assert!(handle.path().ends_with("relative.zip"));
    }

    #[test]
    fn test_drop_commits_open_session() {
        let backend = MemoryBackend::new();
        {
            let handle = ZipHandle::open(backend.clone(), PATH, true).unwrap();
            handle
                .with_open_session(|session| {
                    session
                        .add("kept", b"v".to_vec())
                        .map_err(|e| ArchiveError::backend(Path::new(PATH), "add", e))
                })
                .unwrap();
        }
        assert!(backend.entry(PATH, "kept").is_some());
    }
}

//! Entry content and text/binary classification.

use std::fmt;

/// Whether entry content is text or binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    /// ASCII, or UTF-8 from the first non-ASCII byte on.
    Text,
    /// Anything else.
    Binary,
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Binary => f.write_str("binary"),
        }
    }
}

/// How [`ZipHandle::get_entry`](crate::ZipHandle::get_entry) labels content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadMode {
    /// Decide with [`classify`].
    #[default]
    Auto,
    /// Always label the content as text.
    Text,
    /// Always label the content as binary.
    Binary,
}

impl ReadMode {
    fn resolve(self, bytes: &[u8]) -> ContentKind {
        match self {
            Self::Auto => classify(bytes),
            Self::Text => ContentKind::Text,
            Self::Binary => ContentKind::Binary,
        }
    }
}

/// Content of one archive entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    /// Raw entry bytes.
    pub bytes: Vec<u8>,
    /// Text/binary label.
    pub kind: ContentKind,
}

impl Content {
    /// Labels `bytes` according to `mode`.
    #[must_use]
    pub fn new(bytes: Vec<u8>, mode: ReadMode) -> Self {
        let kind = mode.resolve(&bytes);
        Self { bytes, kind }
    }

    /// Returns `true` if the content is labelled text.
    #[must_use]
    pub fn is_text(&self) -> bool {
        self.kind == ContentKind::Text
    }

    /// Returns the content as `&str` if it is valid UTF-8.
    ///
    /// Content forced to [`ContentKind::Text`] may still fail here.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }

    /// Returns the number of content bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the entry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Consumes the content, returning the raw bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Guesses whether `buf` is text.
///
/// Scans for the first byte with the high bit set. If there is none the
/// buffer is text. Otherwise the buffer is text only if everything from
/// that byte to the end is valid UTF-8. This is a best-effort heuristic;
/// callers that know better pass [`ReadMode::Text`] or [`ReadMode::Binary`].
///
/// # Examples
///
/// ```
/// use ziptools_core::ContentKind;
/// use ziptools_core::classify;
///
/// assert_eq!(classify(b"plain ascii"), ContentKind::Text);
/// assert_eq!(classify("naïve".as_bytes()), ContentKind::Text);
/// assert_eq!(classify(&[0xFF, 0x00, 0x12]), ContentKind::Binary);
/// ```
#[must_use]
pub fn classify(buf: &[u8]) -> ContentKind {
    match buf.iter().position(|b| *b >= 0x80) {
        None => ContentKind::Text,
        Some(start) if std::str::from_utf8(&buf[start..]).is_ok() => ContentKind::Text,
        Some(_) => ContentKind::Binary,
    }
}

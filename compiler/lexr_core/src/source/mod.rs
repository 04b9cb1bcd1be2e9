//! Source buffers.
//!
//! A [`Source`] is the read-only byte buffer a lexer scans, plus an optional
//! display name used in diagnostics. The engine never decodes it: patterns
//! run over raw bytes and every position is a byte offset.

use std::sync::Arc;

/// Placeholder used in diagnostics for sources without a name.
const ANONYMOUS: &str = "<input>";

/// Byte buffer being lexed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Source {
    bytes: Box<[u8]>,
    name: Option<Arc<str>>,
}

impl Source {
    /// Create an anonymous source from raw bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Source {
            bytes: bytes.into().into_boxed_slice(),
            name: None,
        }
    }

    /// Create a source with a display name (typically a file path).
    pub fn named(name: impl Into<Arc<str>>, bytes: impl Into<Vec<u8>>) -> Self {
        Source {
            bytes: bytes.into().into_boxed_slice(),
            name: Some(name.into()),
        }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Display name, if one was given.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Display name, or `<input>` for anonymous sources.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(ANONYMOUS)
    }

    /// Bytes in `start..end`, if the range lies inside the buffer.
    pub fn excerpt(&self, start: usize, end: usize) -> Option<&[u8]> {
        self.bytes.get(start..end)
    }

    /// 1-based `(line, column)` of a byte offset.
    ///
    /// Columns count bytes from the start of the line; offsets past the end
    /// of the buffer are clamped to its length.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.bytes.len());
        let prefix = &self.bytes[..offset];
        let line = memchr::memchr_iter(b'\n', prefix).count() + 1;
        let line_start = memchr::memrchr(b'\n', prefix).map_or(0, |pos| pos + 1);
        (line, offset - line_start + 1)
    }
}

impl From<&str> for Source {
    fn from(text: &str) -> Self {
        Source::new(text.as_bytes())
    }
}

impl From<String> for Source {
    fn from(text: String) -> Self {
        Source::new(text.into_bytes())
    }
}

impl From<&[u8]> for Source {
    fn from(bytes: &[u8]) -> Self {
        Source::new(bytes)
    }
}

impl From<Vec<u8>> for Source {
    fn from(bytes: Vec<u8>) -> Self {
        Source::new(bytes)
    }
}

#[cfg(test)]
mod tests;

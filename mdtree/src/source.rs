use std::ops::Range;

/// A half-open byte range into a [`Source`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Segment {
    pub start: usize,
    pub stop: usize,
}

impl Segment {
    pub fn new(start: usize, stop: usize) -> Self {
        Segment { start, stop }
    }

    pub fn len(&self) -> usize {
        self.stop - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.stop
    }

    /// The bytes this segment covers. Empty if the segment lies outside the buffer.
    pub fn value<'a>(&self, source: &'a Source) -> &'a [u8] {
        source.bytes().get(self.start..self.stop).unwrap_or(&[])
    }

    /// Lossy UTF-8 view of [`Segment::value`].
    pub fn text<'a>(&self, source: &'a Source) -> std::borrow::Cow<'a, str> {
        String::from_utf8_lossy(self.value(source))
    }
}

impl From<Range<usize>> for Segment {
    fn from(range: Range<usize>) -> Self {
        Segment::new(range.start, range.end)
    }
}

impl From<Segment> for Range<usize> {
    fn from(segment: Segment) -> Self {
        segment.start..segment.stop
    }
}

/// The document text plus anything appended while editing the tree.
///
/// Bytes are never rewritten in place, only extended, so every [`Segment`] cut from a
/// buffer stays valid for that buffer for the rest of its life.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Source {
    bytes: Vec<u8>,
}

impl Source {
    pub fn new(text: impl Into<Vec<u8>>) -> Self {
        Source { bytes: text.into() }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Append `text` to the end of the buffer and return the segment covering it.
    pub fn append(&mut self, text: impl AsRef<[u8]>) -> Segment {
        let text = text.as_ref();
        let start = self.bytes.len();
        self.bytes.extend_from_slice(text);
        Segment::new(start, self.bytes.len())
    }

    /// The original (or extended) text, lossily decoded.
    pub fn as_str_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

impl From<&str> for Source {
    fn from(text: &str) -> Self {
        Source::new(text)
    }
}

impl From<String> for Source {
    fn from(text: String) -> Self {
        Source::new(text)
    }
}

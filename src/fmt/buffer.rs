use std::ops::Range;

/// Output of one format call: the bytes plus the sub-range a color sink may paint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatBuffer {
    bytes: Vec<u8>,
    color_range: Range<usize>,
}

impl FormatBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops previous content and resets the color markers to an empty range.
    pub fn clear(&mut self) {
        self.bytes.clear();
        self.color_range = 0..0;
    }

    pub fn push_str(&mut self, s: &str) {
        self.bytes.extend_from_slice(s.as_bytes());
    }

    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    /// Marks the current end of the buffer as the start of the color range.
    pub fn mark_color_start(&mut self) {
        self.color_range.start = self.bytes.len();
    }

    /// Marks the current end of the buffer as the end of the color range.
    pub fn mark_color_end(&mut self) {
        self.color_range.end = self.bytes.len();
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Clamped to the buffer so a formatter that set only one marker can't cause out-of-bounds slicing.
    #[must_use]
    pub fn color_range(&self) -> Range<usize> {
        let end = self.color_range.end.min(self.bytes.len());
        let start = self.color_range.start.min(end);
        start..end
    }

    #[must_use]
    pub fn has_color_range(&self) -> bool {
        !self.color_range().is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Write for FormatBuffer {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        self.push_str(s);
        Ok(())
    }
}

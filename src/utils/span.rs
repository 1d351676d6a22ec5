//! Source location tracking

/// A span represents a byte range in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize)]
pub struct Span {
    /// Start byte offset
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start {} past end {}", start, end);
        Self { start, end }
    }

    /// Merge two spans
    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Get the length of the span
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if the span is empty
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Slice the covered text out of `source`
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }

    /// 1-based (line, column) of the span start; column counts chars
    pub fn line_col(&self, source: &str) -> (u32, u32) {
        let before = &source[..self.start.min(source.len())];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() + 1;
        (line as u32, column as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_and_len() {
        let a = Span::new(2, 5);
        let b = Span::new(7, 9);
        let merged = a.merge(&b);
        assert_eq!(merged, Span::new(2, 9));
        assert_eq!(merged.len(), 7);
        assert!(Span::new(3, 3).is_empty());
    }

    #[test]
    fn test_line_col() {
        let source = "module main\n\tpush u8 1";
        let span = Span::new(13, 17);
        assert_eq!(span.text(source), "push");
        assert_eq!(span.line_col(source), (2, 2));
        assert_eq!(Span::new(0, 6).line_col(source), (1, 1));
    }
}

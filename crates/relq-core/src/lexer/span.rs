//! Byte ranges into the source text.

/// A half-open byte range in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

impl Span {
    /// Creates a new span.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns the length of the span in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true if the span covers no input.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns true if `other` starts exactly where this span ends.
    #[must_use]
    pub const fn touches(&self, other: Self) -> bool {
        self.end == other.start
    }

    /// Merges two spans into one that covers both.
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        let start = if self.start < other.start {
            self.start
        } else {
            other.start
        };
        let end = if self.end > other.end {
            self.end
        } else {
            other.end
        };
        Self { start, end }
    }

    /// Returns the unconsumed input starting at this span.
    #[must_use]
    pub fn remainder<'a>(&self, input: &'a str) -> &'a str {
        input.get(self.start..).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_len() {
        let span = Span::new(5, 10);
        assert_eq!(span.len(), 5);
        assert!(!span.is_empty());
        assert!(Span::new(3, 3).is_empty());
    }

    #[test]
    fn test_span_touches() {
        assert!(Span::new(0, 1).touches(Span::new(1, 3)));
        assert!(!Span::new(0, 1).touches(Span::new(2, 3)));
    }

    #[test]
    fn test_span_merge() {
        let merged = Span::new(5, 10).merge(Span::new(8, 15));
        assert_eq!(merged, Span::new(5, 15));
    }

    #[test]
    fn test_span_remainder() {
        let input = "letters where";
        assert_eq!(Span::new(8, 13).remainder(input), "where");
        assert_eq!(Span::new(13, 13).remainder(input), "");
        assert_eq!(Span::new(40, 40).remainder(input), "");
    }
}

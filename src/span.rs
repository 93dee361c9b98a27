//! Half-open ranges into document text.

use serde::{Deserialize, Serialize};

use crate::{SpanBoundsError, SpanBoundsReason};

/// A half-open range `[start, end)` into a document's text.
///
/// Offsets index the document `&str` directly, so they must land on
/// character boundaries. For ASCII text they are plain character offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// True when both spans share at least one character.
    ///
    /// Empty spans share nothing, so they never overlap anything.
    pub fn overlaps(&self, other: &Span) -> bool {
        !self.is_empty() && !other.is_empty() && self.start < other.end && other.start < self.end
    }

    /// True when `other` lies entirely inside this span.
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Number of characters covered in `text`.
    ///
    /// Falls back to the byte length when the span does not slice `text`.
    pub fn char_len(&self, text: &str) -> usize {
        self.text(text)
            .map(|covered| covered.chars().count())
            .unwrap_or_else(|| self.len())
    }

    /// The substring this span denotes, if it is a valid slice of `text`.
    pub fn text<'t>(&self, text: &'t str) -> Option<&'t str> {
        if self.start > self.end {
            return None;
        }
        text.get(self.start..self.end)
    }

    /// Check that this span is a non-empty, in-range slice of `text`.
    pub fn validate(&self, text: &str) -> Result<(), SpanBoundsError> {
        let reason = if self.start > self.end {
            Some(SpanBoundsReason::Inverted)
        } else if self.end > text.len() {
            Some(SpanBoundsReason::OutOfRange)
        } else if self.start == self.end {
            Some(SpanBoundsReason::Empty)
        } else if !text.is_char_boundary(self.start) || !text.is_char_boundary(self.end) {
            Some(SpanBoundsReason::NotCharBoundary)
        } else {
            None
        };

        match reason {
            Some(reason) => Err(SpanBoundsError {
                span: *self,
                text_len: text.len(),
                reason,
            }),
            None => Ok(()),
        }
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlaps_is_half_open() {
        let a = Span::new(0, 5);
        assert!(a.overlaps(&Span::new(4, 8)));
        assert!(!a.overlaps(&Span::new(5, 8)));
        assert!(!Span::new(5, 8).overlaps(&a));
        assert!(a.overlaps(&Span::new(1, 2)));
    }

    #[test]
    fn test_empty_span_never_overlaps() {
        let empty = Span::new(3, 3);
        assert!(!empty.overlaps(&Span::new(0, 10)));
        assert!(!Span::new(0, 10).overlaps(&empty));
    }

    #[test]
    fn test_validate() {
        let text = "chest pain";
        assert!(Span::new(0, 5).validate(text).is_ok());
        assert!(Span::new(0, 10).validate(text).is_ok());

        let err = Span::new(6, 11).validate(text).unwrap_err();
        assert_eq!(err.reason, SpanBoundsReason::OutOfRange);

        let err = Span::new(6, 2).validate(text).unwrap_err();
        assert_eq!(err.reason, SpanBoundsReason::Inverted);

        let err = Span::new(4, 4).validate(text).unwrap_err();
        assert_eq!(err.reason, SpanBoundsReason::Empty);
    }

    #[test]
    fn test_validate_rejects_split_characters() {
        let text = "temp 38°C";
        // '°' occupies bytes 7..9
        let err = Span::new(5, 8).validate(text).unwrap_err();
        assert_eq!(err.reason, SpanBoundsReason::NotCharBoundary);
        assert!(Span::new(5, 9).validate(text).is_ok());
    }

    #[test]
    fn test_char_len_counts_characters() {
        let text = "temp 38°C";
        assert_eq!(Span::new(5, 10).len(), 5);
        assert_eq!(Span::new(5, 10).char_len(text), 4);
        assert_eq!(Span::new(5, 10).text(text), Some("38°C"));
    }
}

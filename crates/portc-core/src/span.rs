//! Source location tracking for diagnostics.
//!
//! A [`Span`] records where a token or construct starts, which source file it
//! came from, and (when the token was produced by a macro) which expansion
//! produced it. Expansions are recorded in a [`SourceMap`](crate::SourceMap).

use std::fmt;
use std::num::NonZeroU32;

/// Index of a source file registered in a [`SourceMap`](crate::SourceMap).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct SourceId(pub u32);

/// Identifies one macro expansion recorded in a [`SourceMap`](crate::SourceMap).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExpansionId(NonZeroU32);

impl ExpansionId {
    /// Create an id for the expansion stored at `index`.
    #[inline]
    pub fn from_index(index: usize) -> Self {
        Self(NonZeroU32::MIN.saturating_add(index as u32))
    }

    /// Position of the expansion in its source map.
    #[inline]
    pub fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

/// A span of source code, represented by its starting position.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// File the span points into.
    pub source: SourceId,
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, byte-based).
    pub col: u32,
    /// Length in bytes.
    pub len: u32,
    /// Macro expansion that produced this span, if any.
    pub expansion: Option<ExpansionId>,
}

impl Span {
    /// Create a span in the first registered source.
    #[inline]
    pub fn new(line: u32, col: u32, len: u32) -> Self {
        Self {
            source: SourceId(0),
            line,
            col,
            len,
            expansion: None,
        }
    }

    /// Create a span inside a specific source file.
    #[inline]
    pub fn in_source(source: SourceId, line: u32, col: u32, len: u32) -> Self {
        Self {
            source,
            line,
            col,
            len,
            expansion: None,
        }
    }

    /// Create a zero-length span at a position.
    #[inline]
    pub fn point(line: u32, col: u32) -> Self {
        Self::new(line, col, 0)
    }

    /// The same location, attributed to a macro expansion.
    #[inline]
    pub fn with_expansion(self, expansion: ExpansionId) -> Self {
        Self {
            expansion: Some(expansion),
            ..self
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Merge two spans into one that starts at `self` and extends to cover `other`.
    ///
    /// Spans on different lines keep the first position and sum the lengths.
    #[inline]
    pub fn merge(self, other: Span) -> Span {
        if self.line == other.line && self.source == other.source {
            let start_col = self.col.min(other.col);
            let end_col = (other.col + other.len).max(self.col + self.len);
            Span {
                col: start_col,
                len: end_col - start_col,
                ..self
            }
        } else {
            Span {
                len: self.len + other.len,
                ..self
            }
        }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_basics() {
        let span = Span::new(1, 5, 10);
        assert_eq!(span.len(), 10);
        assert!(!span.is_empty());
        assert!(Span::point(1, 5).is_empty());
    }

    #[test]
    fn span_display() {
        assert_eq!(format!("{}", Span::new(3, 15, 5)), "3:15");
    }

    #[test]
    fn span_merge_same_line() {
        let merged = Span::new(1, 5, 3).merge(Span::new(1, 10, 3));
        assert_eq!(merged.col, 5);
        assert_eq!(merged.len, 8);
    }

    #[test]
    fn span_merge_keeps_expansion_of_first() {
        let id = ExpansionId::from_index(2);
        let merged = Span::new(1, 1, 2)
            .with_expansion(id)
            .merge(Span::new(1, 4, 1));
        assert_eq!(merged.expansion, Some(id));
    }

    #[test]
    fn span_merge_different_sources_sums_length() {
        let a = Span::in_source(SourceId(0), 1, 5, 2);
        let b = Span::in_source(SourceId(1), 1, 9, 3);
        let merged = a.merge(b);
        assert_eq!(merged.source, SourceId(0));
        assert_eq!(merged.len, 5);
    }

    #[test]
    fn expansion_id_round_trips_index() {
        assert_eq!(ExpansionId::from_index(0).index(), 0);
        assert_eq!(ExpansionId::from_index(41).index(), 41);
    }
}

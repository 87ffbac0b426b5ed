//! Half-open ranges and the cells built from them.

use std::fmt;
use std::ops::Range;

use serde::Serialize;
use smallvec::SmallVec;

/// Half-open interval `[lo, hi)` over some coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Span {
    pub lo: usize,
    pub hi: usize,
}

impl Span {
    pub fn new(lo: usize, hi: usize) -> Self {
        Span { lo, hi }
    }

    pub fn len(&self) -> usize {
        self.hi.saturating_sub(self.lo)
    }

    /// True when the span covers no index at all.
    pub fn is_empty(&self) -> bool {
        self.lo >= self.hi
    }

    pub fn contains(&self, index: usize) -> bool {
        self.lo <= index && index < self.hi
    }
}

impl From<Range<usize>> for Span {
    fn from(r: Range<usize>) -> Self {
        Span::new(r.start, r.end)
    }
}

impl From<(usize, usize)> for Span {
    fn from((lo, hi): (usize, usize)) -> Self {
        Span::new(lo, hi)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.lo, self.hi)
    }
}

/// Spans stored inline; most cells are contiguous.
pub type Spans = SmallVec<[Span; 2]>;

/// One cell of a frame: ascending, disjoint, non-touching spans.
///
/// A cell holding a single span is contiguous; more spans mean the cell
/// selects a region with gaps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Cell {
    spans: Spans,
}

/// Reason a span could not be appended to a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PushError {
    Degenerate,
    Overlap,
}

impl Cell {
    /// Cell covering the single contiguous span `[lo, hi)`.
    pub fn single(lo: usize, hi: usize) -> Self {
        let mut spans = Spans::new();
        spans.push(Span::new(lo, hi));
        Cell { spans }
    }

    pub(crate) fn empty() -> Self {
        Cell { spans: Spans::new() }
    }

    /// Build a cell from spans, coalescing touching neighbours.
    ///
    /// Returns `None` if the spans are empty, degenerate, unsorted or overlapping.
    pub fn from_spans<I, S>(spans: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<Span>,
    {
        let mut cell = Cell::empty();
        for s in spans {
            cell.push_merge(s.into()).ok()?;
        }
        if cell.spans.is_empty() {
            None
        } else {
            Some(cell)
        }
    }

    /// Append a span, extending the last span when it starts exactly where
    /// the last one ends.
    pub(crate) fn push_merge(&mut self, span: Span) -> Result<(), PushError> {
        if span.is_empty() {
            return Err(PushError::Degenerate);
        }
        match self.spans.last_mut() {
            Some(last) if last.hi == span.lo => {
                last.hi = span.hi;
                Ok(())
            }
            Some(last) if span.lo < last.hi => Err(PushError::Overlap),
            _ => {
                self.spans.push(span);
                Ok(())
            }
        }
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Lowest index covered by the cell.
    pub fn lo(&self) -> usize {
        self.spans.first().map(|s| s.lo).unwrap_or(0)
    }

    /// One past the highest index covered by the cell.
    pub fn hi(&self) -> usize {
        self.spans.last().map(|s| s.hi).unwrap_or(0)
    }

    pub fn is_contiguous(&self) -> bool {
        self.spans.len() == 1
    }

    /// Number of indices covered, gaps excluded.
    pub fn width(&self) -> usize {
        self.spans.iter().map(Span::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.spans.iter().any(|s| s.contains(index))
    }
}

impl From<Span> for Cell {
    fn from(span: Span) -> Self {
        Cell::single(span.lo, span.hi)
    }
}

impl From<Range<usize>> for Cell {
    fn from(r: Range<usize>) -> Self {
        Cell::single(r.start, r.end)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, s) in self.spans.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", s)?;
        }
        Ok(())
    }
}

/// A cell as given to `new_frame`: spans over the viewpoint's cell indices.
///
/// Unlike [`Cell`], a relative cell is not validated or merged until the
/// frame is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelCell(pub Spans);

impl RelCell {
    pub fn spans(&self) -> &[Span] {
        &self.0
    }
}

impl From<Range<usize>> for RelCell {
    fn from(r: Range<usize>) -> Self {
        let mut spans = Spans::new();
        spans.push(r.into());
        RelCell(spans)
    }
}

impl From<(usize, usize)> for RelCell {
    fn from(t: (usize, usize)) -> Self {
        let mut spans = Spans::new();
        spans.push(t.into());
        RelCell(spans)
    }
}

impl From<Span> for RelCell {
    fn from(s: Span) -> Self {
        let mut spans = Spans::new();
        spans.push(s);
        RelCell(spans)
    }
}

impl From<Vec<Range<usize>>> for RelCell {
    fn from(v: Vec<Range<usize>>) -> Self {
        RelCell(v.into_iter().map(Span::from).collect())
    }
}

impl From<&[Range<usize>]> for RelCell {
    fn from(v: &[Range<usize>]) -> Self {
        RelCell(v.iter().cloned().map(Span::from).collect())
    }
}

impl<const N: usize> From<[Range<usize>; N]> for RelCell {
    fn from(v: [Range<usize>; N]) -> Self {
        RelCell(v.into_iter().map(Span::from).collect())
    }
}

impl From<Vec<(usize, usize)>> for RelCell {
    fn from(v: Vec<(usize, usize)>) -> Self {
        RelCell(v.into_iter().map(Span::from).collect())
    }
}

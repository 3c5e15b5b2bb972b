//! Buffer segments: range metadata with a base style and sparse overrides.

use crate::style::Style;
use std::collections::HashMap;
use std::ops::Range;

/// Handle addressing the segment created by one append.
///
/// Handles stay valid across trims for as long as any part of their segment
/// survives; a write through a handle whose segment was fully trimmed away
/// is silently discarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SegmentHandle(pub(crate) u64);

/// One segment of the buffer: a byte range with a base style and sparse
/// per-byte style overrides.
///
/// Segments are disjoint, contiguous, and ascending; their lengths sum to
/// the total buffer length. Overrides are keyed relative to the segment
/// start so shifting the whole segment never rekeys them.
#[derive(Clone, Debug)]
pub(crate) struct Segment {
    pub(crate) id: u64,
    pub(crate) start: usize,
    pub(crate) len: usize,
    pub(crate) base: Style,
    overrides: HashMap<usize, Style>,
}

impl Segment {
    pub(crate) fn new(id: u64, start: usize, len: usize, base: Style) -> Self {
        Self {
            id,
            start,
            len,
            base,
            overrides: HashMap::new(),
        }
    }

    pub(crate) fn handle(&self) -> SegmentHandle {
        SegmentHandle(self.id)
    }

    pub(crate) fn range(&self) -> Range<usize> {
        self.start..self.start + self.len
    }

    pub(crate) fn contains(&self, offset: usize) -> bool {
        self.range().contains(&offset)
    }

    /// Override at an absolute offset, else the base style.
    pub(crate) fn style_at(&self, offset: usize) -> Style {
        debug_assert!(self.contains(offset));
        self.overrides
            .get(&(offset - self.start))
            .copied()
            .unwrap_or(self.base)
    }

    /// Store an override at an absolute offset inside this segment.
    pub(crate) fn set_override(&mut self, offset: usize, style: Style) {
        debug_assert!(self.contains(offset));
        self.overrides.insert(offset - self.start, style);
    }

    /// Shift the whole segment left by `n` bytes (trim happened before it).
    pub(crate) fn shift_left(&mut self, n: usize) {
        debug_assert!(self.start >= n);
        self.start -= n;
    }

    /// Drop the first `cut` bytes of this segment (trim landed inside it).
    /// Overrides before the cut are dropped, the rest rekeyed.
    pub(crate) fn cut_prefix(&mut self, cut: usize) {
        debug_assert!(cut < self.len);
        self.len -= cut;
        self.overrides = self
            .overrides
            .drain()
            .filter_map(|(rel, style)| rel.checked_sub(cut).map(|rel| (rel, style)))
            .collect();
    }
}

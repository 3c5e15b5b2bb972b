//! Segmented style buffer for an append-only text stream.
//!
//! [`StyleBuffer`] owns the console's text bytes and a list of [`Segment`]
//! metadata records over them. The append path creates one segment per
//! chunk; asynchronous highlighting jobs later write per-byte overrides
//! through the [`SegmentHandle`] they were given. A trim racing such a write
//! is resolved by the stale-write check in [`StyleBuffer::apply_override`],
//! never by blocking the writer against the whole pipeline.
//!
//! All methods take `&self`: structural state lives behind one internal
//! mutex, which is the single mutual-exclusion boundary for append, trim,
//! clear, and override writes.

use std::sync::{Mutex, MutexGuard};
use tracing::trace;

use super::segment::{Segment, SegmentHandle};
use crate::style::Style;

/// Everything guarded by the buffer mutex.
#[derive(Debug, Default)]
pub(crate) struct BufferState {
    pub(crate) content: Vec<u8>,
    pub(crate) segments: Vec<Segment>,
    next_id: u64,
    pub(crate) revision: u64,
}

impl BufferState {
    /// Index of the segment containing `offset`, if any.
    fn segment_index_at(&self, offset: usize) -> Option<usize> {
        let idx = self
            .segments
            .partition_point(|seg| seg.start + seg.len <= offset);
        self.segments.get(idx).filter(|seg| seg.contains(offset))?;
        Some(idx)
    }

    /// Index of the segment with the given id, if it still exists.
    /// Ids are monotonically increasing across the segment list.
    fn segment_index_by_id(&self, id: u64) -> Option<usize> {
        self.segments
            .binary_search_by_key(&id, |seg| seg.id)
            .ok()
    }

    /// Style at an offset: override, else segment base, else `default`.
    pub(crate) fn style_at(&self, offset: usize, default: Style) -> Style {
        self.segment_index_at(offset)
            .map_or(default, |idx| self.segments[idx].style_at(offset))
    }
}

/// Append-only ordered collection of styled segments over one text buffer.
#[derive(Debug)]
pub struct StyleBuffer {
    default_style: Style,
    state: Mutex<BufferState>,
}

impl StyleBuffer {
    /// Create an empty buffer with the given default style.
    #[must_use]
    pub fn new(default_style: Style) -> Self {
        Self {
            default_style,
            state: Mutex::new(BufferState::default()),
        }
    }

    /// Append a chunk, creating the new trailing segment.
    ///
    /// Returns the segment handle (for later asynchronous restyling) and the
    /// absolute byte offset the chunk starts at. Content order is exactly
    /// append call order.
    pub fn append(&self, text: &str, base_style: Style) -> (SegmentHandle, usize) {
        let mut state = self.lock();
        let start = state.content.len();
        state.content.extend_from_slice(text.as_bytes());

        let id = state.next_id;
        state.next_id += 1;
        let segment = Segment::new(id, start, text.len(), base_style);
        let handle = segment.handle();
        state.segments.push(segment);
        state.revision += 1;
        (handle, start)
    }

    /// Write a per-byte style override into the segment `handle` addresses.
    ///
    /// The write lands only if that segment still exists and `offset` still
    /// falls inside it; otherwise it is silently discarded. This is the
    /// stale-write protection that makes trim/highlight races benign.
    pub fn apply_override(&self, handle: SegmentHandle, offset: usize, style: Style) {
        let mut state = self.lock();
        match state.segment_index_by_id(handle.0) {
            Some(idx) if state.segments[idx].contains(offset) => {
                state.segments[idx].set_override(offset, style);
            }
            _ => trace!("discarding stale override at offset {offset}"),
        }
    }

    /// Remove the first `n` bytes of content.
    ///
    /// Segments entirely before the cut are dropped; a segment straddling it
    /// loses its prefix (and the overrides stored there); everything shifts
    /// down by `n`. `n` is clamped to the buffer length.
    pub fn trim_front(&self, n: usize) {
        let mut state = self.lock();
        let n = n.min(state.content.len());
        if n == 0 {
            return;
        }

        state.content.drain(..n);
        state.segments.retain(|seg| seg.start + seg.len > n);
        for seg in &mut state.segments {
            if seg.start < n {
                seg.cut_prefix(n - seg.start);
                seg.start = n;
            }
            seg.shift_left(n);
        }
        state.revision += 1;
    }

    /// Style at an offset: the segment's override if present, else its base
    /// style, else the buffer default.
    #[must_use]
    pub fn resolve_style_at(&self, offset: usize) -> Style {
        let state = self.lock();
        state.style_at(offset, self.default_style)
    }

    /// Drop all content and segments in O(1).
    pub fn clear(&self) {
        let mut state = self.lock();
        state.content = Vec::new();
        state.segments = Vec::new();
        state.revision += 1;
    }

    /// Total content length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().content.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().content.is_empty()
    }

    /// Number of live segments.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.lock().segments.len()
    }

    /// Structural revision; bumps on append, trim, and clear.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.lock().revision
    }

    /// Snapshot of the current content for a rendering collaborator.
    #[must_use]
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.lock().content).into_owned()
    }

    /// The style applied where no segment or override claims an offset.
    #[must_use]
    pub fn default_style(&self) -> Style {
        self.default_style
    }

    /// Hold the buffer lock across a multi-step read (e.g. a search scan)
    /// so no structural mutation can tear it.
    pub(crate) fn lock(&self) -> MutexGuard<'_, BufferState> {
        self.state.lock().expect("style buffer lock")
    }
}

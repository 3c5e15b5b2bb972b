//! Segmented style storage for the append-only console stream.
//!
//! Key types:
//!
//! - [`StyleBuffer`]: owns the text bytes and the segment metadata; supports
//!   append, front trimming, per-byte style overrides, and style lookup
//! - [`SegmentHandle`]: addresses the segment one append created, for the
//!   asynchronous highlighter to write back through
//! - [`SearchOverlayIndex`]: reversible search-highlight overlay
//!
//! # Examples
//!
//! ```
//! use logtint::{Style, StyleBuffer, Rgba};
//!
//! let buffer = StyleBuffer::new(Style::fg(Rgba::WHITE));
//! let (handle, start) = buffer.append("ERROR: boom\n", Style::fg(Rgba::LIGHT_GRAY));
//! buffer.apply_override(handle, start, Style::fg(Rgba::RED).with_bold());
//! assert_eq!(buffer.resolve_style_at(0).fg, Some(Rgba::RED));
//! assert_eq!(buffer.resolve_style_at(1).fg, Some(Rgba::LIGHT_GRAY));
//! ```

mod buffer;
mod search;
mod segment;

pub use buffer::StyleBuffer;
pub use search::SearchOverlayIndex;
pub use segment::SegmentHandle;

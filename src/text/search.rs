//! Search-highlight overlay over the style buffer.
//!
//! The overlay is a view-layer composition: it never writes into segment
//! data, so clearing it (or any structural buffer mutation, detected by a
//! revision mismatch) restores [`StyleBuffer::resolve_style_at`] exactly.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::buffer::StyleBuffer;
use crate::color::Rgba;
use crate::style::Style;

#[derive(Debug, Default)]
struct OverlayState {
    term: String,
    case_sensitive: bool,
    matches: Vec<usize>,
    current: usize,
    overlay: HashMap<usize, Style>,
    /// Buffer revision observed during the scan; a mismatch later means the
    /// overlay is stale and treated as cleared.
    revision: u64,
    active: bool,
}

/// Finds substring matches in current buffer content and overlays a combined
/// highlight style, fully reversibly.
pub struct SearchOverlayIndex {
    buffer: Arc<StyleBuffer>,
    highlight_bg: Rgba,
    state: Mutex<OverlayState>,
}

impl SearchOverlayIndex {
    /// Create an index over a buffer with the default highlight color.
    #[must_use]
    pub fn new(buffer: Arc<StyleBuffer>) -> Self {
        Self {
            buffer,
            highlight_bg: Rgba::YELLOW,
            state: Mutex::new(OverlayState::default()),
        }
    }

    /// Builder-style highlight background setter.
    #[must_use]
    pub fn with_highlight_color(mut self, color: Rgba) -> Self {
        self.highlight_bg = color;
        self
    }

    /// Scan for `term` and overlay every match.
    ///
    /// Matches are leftmost-first and non-overlapping: the scan advances
    /// past the full matched term, mirroring "find next" behavior. The scan
    /// holds the buffer lock so a concurrent trim or clear can never tear
    /// it. Case-insensitive mode folds ASCII case only, which keeps byte
    /// offsets exact. Returns the match offsets.
    pub fn search(&self, term: &str, case_sensitive: bool) -> Vec<usize> {
        let mut overlay = self.state.lock().expect("search overlay lock");
        *overlay = OverlayState::default();
        if term.is_empty() {
            return Vec::new();
        }

        let state = self.buffer.lock();
        let content = &state.content;
        let needle = term.as_bytes();

        let mut matches = Vec::new();
        let mut styles = HashMap::new();
        let mut i = 0;
        while i + needle.len() <= content.len() {
            let window = &content[i..i + needle.len()];
            let hit = if case_sensitive {
                window == needle
            } else {
                window.eq_ignore_ascii_case(needle)
            };
            if hit {
                matches.push(i);
                for offset in i..i + needle.len() {
                    let base = state.style_at(offset, self.buffer.default_style());
                    styles.insert(offset, self.combine(base));
                }
                i += needle.len();
            } else {
                i += 1;
            }
        }

        *overlay = OverlayState {
            term: term.to_string(),
            case_sensitive,
            matches: matches.clone(),
            current: 0,
            overlay: styles,
            revision: state.revision,
            active: true,
        };
        matches
    }

    /// Style at an offset with the overlay composed in.
    ///
    /// Falls back to the buffer's own resolution when the offset is not
    /// overlaid or the overlay went stale.
    #[must_use]
    pub fn style_at(&self, offset: usize) -> Style {
        let overlay = self.state.lock().expect("search overlay lock");
        if overlay.active {
            let state = self.buffer.lock();
            if state.revision == overlay.revision {
                if let Some(&style) = overlay.overlay.get(&offset) {
                    return style;
                }
            }
            return state.style_at(offset, self.buffer.default_style());
        }
        drop(overlay);
        self.buffer.resolve_style_at(offset)
    }

    /// Remove all overlays; every position resolves through the buffer again.
    pub fn clear(&self) {
        let mut overlay = self.state.lock().expect("search overlay lock");
        *overlay = OverlayState::default();
    }

    /// Number of matches in the current (non-stale) overlay.
    #[must_use]
    pub fn match_count(&self) -> usize {
        let overlay = self.state.lock().expect("search overlay lock");
        if self.is_fresh(&overlay) {
            overlay.matches.len()
        } else {
            0
        }
    }

    /// Offset of the currently selected match.
    #[must_use]
    pub fn current(&self) -> Option<usize> {
        let overlay = self.state.lock().expect("search overlay lock");
        if self.is_fresh(&overlay) {
            overlay.matches.get(overlay.current).copied()
        } else {
            None
        }
    }

    /// Advance to the next match, wrapping around.
    pub fn next_match(&self) -> Option<usize> {
        let mut overlay = self.state.lock().expect("search overlay lock");
        if !self.is_fresh(&overlay) || overlay.matches.is_empty() {
            return None;
        }
        overlay.current = (overlay.current + 1) % overlay.matches.len();
        Some(overlay.matches[overlay.current])
    }

    /// Step back to the previous match, wrapping around.
    pub fn prev_match(&self) -> Option<usize> {
        let mut overlay = self.state.lock().expect("search overlay lock");
        if !self.is_fresh(&overlay) || overlay.matches.is_empty() {
            return None;
        }
        let len = overlay.matches.len();
        overlay.current = (overlay.current + len - 1) % len;
        Some(overlay.matches[overlay.current])
    }

    /// Repeating a search advances through its matches; a changed term (or a
    /// stale overlay) triggers a fresh scan and selects the first match.
    pub fn find_next(&self, term: &str, case_sensitive: bool) -> Option<usize> {
        let same_search = {
            let overlay = self.state.lock().expect("search overlay lock");
            self.is_fresh(&overlay)
                && overlay.term == term
                && overlay.case_sensitive == case_sensitive
                && !overlay.matches.is_empty()
        };

        if same_search {
            self.next_match()
        } else {
            self.search(term, case_sensitive).first().copied()
        }
    }

    fn combine(&self, base: Style) -> Style {
        // Background forced to the highlight color; foreground and font
        // attributes preserved from the underlying style.
        let fg = base.fg.or(self.buffer.default_style().fg);
        Style {
            fg,
            bg: Some(self.highlight_bg),
            attributes: base.attributes,
        }
    }

    fn is_fresh(&self, overlay: &OverlayState) -> bool {
        overlay.active && self.buffer.revision() == overlay.revision
    }
}

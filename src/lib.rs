//! `logtint` - Grammar-driven incremental text styling engine
//!
//! Assigns visual style attributes to character ranges of an append-only
//! text stream (a live log console): lexical rules from a grammar document
//! are matched per chunk, scopes resolve to styles through a theme document,
//! and a segmented style buffer tolerates streaming append/trim while an
//! asynchronous worker pool restyles each chunk in the background. A search
//! overlay highlights matches without ever destroying the underlying
//! styling.
//!
//! The crate never renders; it issues style assignments over absolute
//! offsets for a rendering collaborator to consume.

// Crate-level lint configuration
#![allow(clippy::missing_errors_doc)] // Error conditions described in prose
#![allow(clippy::missing_panics_doc)] // Lock poisoning is the only panic source
#![allow(clippy::module_name_repetitions)] // Allow StyleBuffer, StyleResolver etc
#![allow(clippy::doc_markdown)] // Allow technical names without backticks
#![allow(clippy::items_after_statements)] // Common pattern in tests
#![allow(clippy::redundant_clone)] // Clones in tests for clarity are fine
#![allow(clippy::semicolon_if_nothing_returned)] // Style preference

pub mod color;
pub mod error;
pub mod grammar;
pub mod highlight;
pub mod style;
pub mod text;

// Re-export core types at crate root
pub use color::Rgba;
pub use error::{Error, Result};
pub use grammar::{CompiledPattern, GrammarContext, PatternCache};
pub use highlight::{HighlightScheduler, LineTokenizer, MatchSpan, StyleResolver};
pub use style::{Style, TextAttributes};
pub use text::{SearchOverlayIndex, SegmentHandle, StyleBuffer};

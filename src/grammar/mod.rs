//! Grammar definitions: document loading, pattern compilation, rule flattening.

mod context;
mod pattern;

pub use context::{GrammarContext, RawRule, ThemeTable};
pub use pattern::{CompiledPattern, FlatRule, PatternCache, RuleMatcher, clean_pattern};

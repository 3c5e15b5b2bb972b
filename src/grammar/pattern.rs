//! Pattern compilation cache and rule-tree flattening.
//!
//! Grammar documents reference regular expressions in many places, often
//! repeating the same pattern text. [`PatternCache`] compiles each distinct
//! pattern once and hands out shared [`Regex`] handles. A pattern that fails
//! to compile is cached as a permanent [`CompiledPattern::Skip`] sentinel so
//! the failure is logged once and recompilation is never retried.
//!
//! The nested rule tree is flattened exactly once at load time into a single
//! depth-first ordered [`FlatRule`] list, so per-chunk scanning never walks
//! the tree. Flattened position is matching priority: earlier rules win.

use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use super::context::RawRule;

/// Result of compiling one raw pattern string.
#[derive(Clone, Debug)]
pub enum CompiledPattern {
    /// Successfully compiled, shared across all rules using this pattern.
    Compiled(Arc<Regex>),
    /// Compilation failed; the rule referencing it is permanently skipped.
    Skip,
}

/// Rewrite legacy escape tokens into forms the `regex` crate accepts.
///
/// Grammars authored against other regex dialects use a bare `\p` to mean
/// "any Unicode letter". A `\p` not followed by a word character or `{` is
/// rewritten to `\p{L}`, as is the degenerate `\p{}`. Everything else
/// (`\pL`, `\p{Lu}`, ...) passes through untouched. Must run before every
/// cache lookup, compilation, and insertion so deduplication sees one form.
#[must_use]
pub fn clean_pattern(raw: &str) -> String {
    let mut cleaned = String::with_capacity(raw.len());
    let bytes = raw.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 1 < bytes.len() && bytes[i + 1] == b'p' {
            let next = bytes.get(i + 2);
            let qualified = matches!(
                next,
                Some(c) if c.is_ascii_alphanumeric() || *c == b'_' || *c == b'{'
            );
            if qualified {
                cleaned.push_str("\\p");
            } else {
                cleaned.push_str("\\p{L}");
            }
            i += 2;
        } else {
            let ch = raw[i..].chars().next().unwrap_or('\u{FFFD}');
            cleaned.push(ch);
            i += ch.len_utf8();
        }
    }

    cleaned.replace("\\p{}", "\\p{L}")
}

/// Compiles and deduplicates patterns by cleaned pattern text.
#[derive(Debug, Default)]
pub struct PatternCache {
    cache: HashMap<String, CompiledPattern>,
}

impl PatternCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile a raw pattern, deduplicating by its cleaned form.
    ///
    /// A failed compilation is logged once and cached as [`CompiledPattern::Skip`];
    /// later lookups of the same pattern return the sentinel without retrying.
    pub fn compile(&mut self, raw: &str) -> CompiledPattern {
        let cleaned = clean_pattern(raw);
        if let Some(hit) = self.cache.get(&cleaned) {
            return hit.clone();
        }

        let compiled = match Regex::new(&cleaned) {
            Ok(re) => CompiledPattern::Compiled(Arc::new(re)),
            Err(e) => {
                warn!("invalid regex {raw:?}: {e}");
                CompiledPattern::Skip
            }
        };
        self.cache.insert(cleaned, compiled.clone());
        compiled
    }

    /// Number of distinct cleaned patterns seen so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

/// Matcher for one flattened rule.
#[derive(Clone, Debug)]
pub enum RuleMatcher {
    /// Simple match rule: every non-overlapping occurrence claims a span.
    Simple(Arc<Regex>),
    /// Range rule: a span runs from a begin match through the first end
    /// match after it, within one chunk.
    Range {
        begin: Arc<Regex>,
        end: Arc<Regex>,
    },
    /// Pattern failed to compile; the tokenizer ignores this rule.
    Skip,
}

/// One rule in flattened depth-first order. Position is priority.
#[derive(Clone, Debug)]
pub struct FlatRule {
    /// Scope name bound to spans this rule claims (may be empty).
    pub scope: String,
    /// The compiled matcher, or a skip sentinel.
    pub matcher: RuleMatcher,
}

/// Flatten a rule tree depth-first into `out`, compiling patterns as we go.
///
/// Nested children fold into their parent's traversal position, directly
/// after the parent itself. Pure grouping nodes contribute no matcher of
/// their own. A node declaring both `match` and `begin`/`end` violates the
/// grammar invariant and is rejected with a warning; its children are still
/// traversed.
pub fn flatten_rules(rules: &[RawRule], cache: &mut PatternCache, out: &mut Vec<FlatRule>) {
    for rule in rules {
        let scope = rule.name.clone().unwrap_or_default();
        let has_match = rule.match_pattern.is_some();
        let has_range = rule.begin.is_some() || rule.end.is_some();

        if has_match && has_range {
            warn!("rule {scope:?} declares both match and begin/end; rule rejected");
        } else if let Some(pattern) = &rule.match_pattern {
            let matcher = match cache.compile(pattern) {
                CompiledPattern::Compiled(re) => RuleMatcher::Simple(re),
                CompiledPattern::Skip => RuleMatcher::Skip,
            };
            out.push(FlatRule { scope, matcher });
        } else if let (Some(begin), Some(end)) = (&rule.begin, &rule.end) {
            let matcher = match (cache.compile(begin), cache.compile(end)) {
                (CompiledPattern::Compiled(begin), CompiledPattern::Compiled(end)) => {
                    RuleMatcher::Range { begin, end }
                }
                _ => RuleMatcher::Skip,
            };
            out.push(FlatRule { scope, matcher });
        } else if has_range {
            warn!("rule {scope:?} declares begin or end without its pair; rule rejected");
        }

        if let Some(children) = &rule.patterns {
            flatten_rules(children, cache, out);
        }
    }
}

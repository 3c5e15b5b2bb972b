//! Grammar and theme document loading.
//!
//! A [`GrammarContext`] is built once at startup from two JSON documents and
//! treated as immutable process-wide state thereafter (shared via `Arc`, no
//! global singleton, no reload):
//!
//! - the **grammar**: an ordered rule tree, `{"patterns": [...]}`, where each
//!   node has a `match` pattern or a `begin`/`end` pair plus a scope `name`,
//!   with optional nested `patterns` in any node;
//! - the **theme**: `{"tokenColors": [...]}` entries binding one scope string
//!   or an array of scope strings to foreground/background colors and a
//!   `fontStyle`.
//!
//! Missing or malformed input degrades to an empty context (default-style
//! operation); the failure is logged, never propagated as fatal.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{error, info, warn};

use super::pattern::{FlatRule, PatternCache, RuleMatcher, flatten_rules};
use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::style::{Style, TextAttributes};

/// One node of the raw grammar rule tree, as authored in the document.
#[derive(Clone, Debug, Deserialize)]
pub struct RawRule {
    /// Scope name bound to spans this rule claims.
    #[serde(default)]
    pub name: Option<String>,
    /// Simple-match pattern. Mutually exclusive with `begin`/`end`.
    #[serde(default, rename = "match")]
    pub match_pattern: Option<String>,
    /// Range-rule begin pattern.
    #[serde(default)]
    pub begin: Option<String>,
    /// Range-rule end pattern.
    #[serde(default)]
    pub end: Option<String>,
    /// Nested child rules, flattened into this node's traversal position.
    #[serde(default)]
    pub patterns: Option<Vec<RawRule>>,
}

#[derive(Debug, Deserialize)]
struct RawGrammar {
    #[serde(default)]
    patterns: Vec<RawRule>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawScope {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    #[serde(default)]
    foreground: Option<String>,
    #[serde(default)]
    background: Option<String>,
    #[serde(default, rename = "fontStyle")]
    font_style: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTokenColor {
    #[serde(default)]
    scope: Option<RawScope>,
    #[serde(default)]
    settings: RawSettings,
}

#[derive(Debug, Deserialize)]
struct RawTheme {
    #[serde(default, rename = "tokenColors")]
    token_colors: Vec<RawTokenColor>,
}

/// Scope-to-style table with exact lookup plus an ordered fallback list.
///
/// The declaration order of theme entries is preserved so the resolver's
/// containment fallback is deterministic. Re-binding a scope overwrites the
/// earlier entry in place.
#[derive(Debug, Default)]
pub struct ThemeTable {
    entries: Vec<(String, Style)>,
    exact: HashMap<String, usize>,
}

impl ThemeTable {
    /// Exact lookup of a full scope string.
    #[must_use]
    pub fn get_exact(&self, scope: &str) -> Option<Style> {
        self.exact.get(scope).map(|&idx| self.entries[idx].1)
    }

    /// Iterate entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Style)> {
        self.entries.iter().map(|(scope, style)| (scope.as_str(), *style))
    }

    /// Number of bound scopes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, scope: String, style: Style) {
        if let Some(&idx) = self.exact.get(&scope) {
            self.entries[idx].1 = style;
        } else {
            self.exact.insert(scope.clone(), self.entries.len());
            self.entries.push((scope, style));
        }
    }
}

/// Immutable grammar + theme state: the flattened rule list and scope table.
#[derive(Debug)]
pub struct GrammarContext {
    rules: Vec<FlatRule>,
    theme: ThemeTable,
    default_style: Style,
}

impl GrammarContext {
    /// Load from document text, degrading to an empty context on failure.
    ///
    /// The two documents parse independently: a malformed grammar still
    /// leaves the theme usable and vice versa. Failures are logged.
    #[must_use]
    pub fn load(grammar_json: &str, theme_json: &str) -> Self {
        let rules = match parse_grammar(grammar_json) {
            Ok(rules) => {
                info!("loaded grammar with {} rules", rules.len());
                rules
            }
            Err(e) => {
                error!("error loading grammar: {e}");
                Vec::new()
            }
        };

        let theme = match parse_theme(theme_json) {
            Ok(theme) => {
                info!("built scope map with {} entries", theme.len());
                theme
            }
            Err(e) => {
                error!("error loading theme: {e}");
                ThemeTable::default()
            }
        };

        Self {
            rules,
            theme,
            default_style: Style::fg(Rgba::WHITE),
        }
    }

    /// Load from files, degrading to an empty context on failure.
    #[must_use]
    pub fn load_files(grammar_path: &Path, theme_path: &Path) -> Self {
        let grammar = match std::fs::read_to_string(grammar_path) {
            Ok(text) => text,
            Err(e) => {
                error!("could not read grammar {}: {e}", grammar_path.display());
                String::new()
            }
        };
        let theme = match std::fs::read_to_string(theme_path) {
            Ok(text) => text,
            Err(e) => {
                error!("could not read theme {}: {e}", theme_path.display());
                String::new()
            }
        };
        Self::load(&grammar, &theme)
    }

    /// Strict variant of [`GrammarContext::load`]: any parse failure is
    /// returned instead of degraded.
    pub fn try_load(grammar_json: &str, theme_json: &str) -> Result<Self> {
        Ok(Self {
            rules: parse_grammar(grammar_json)?,
            theme: parse_theme(theme_json)?,
            default_style: Style::fg(Rgba::WHITE),
        })
    }

    /// A context with no rules and no theme: every scope resolves to the
    /// default style and nothing tokenizes.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            rules: Vec::new(),
            theme: ThemeTable::default(),
            default_style: Style::fg(Rgba::WHITE),
        }
    }

    /// The flattened rule list in priority order.
    #[must_use]
    pub fn rules(&self) -> &[FlatRule] {
        &self.rules
    }

    /// The scope-to-style table.
    #[must_use]
    pub fn theme(&self) -> &ThemeTable {
        &self.theme
    }

    /// Style applied to text no rule or theme entry claims.
    #[must_use]
    pub fn default_style(&self) -> Style {
        self.default_style
    }

    /// True if at least one rule has a usable matcher.
    ///
    /// A context that degraded at load time (or whose every pattern was
    /// skipped) reports `false`; callers then fall back to level-scan
    /// styling instead of enqueueing tokenize jobs.
    #[must_use]
    pub fn has_rules(&self) -> bool {
        self.rules
            .iter()
            .any(|rule| !matches!(rule.matcher, RuleMatcher::Skip))
    }
}

fn parse_grammar(grammar_json: &str) -> Result<Vec<FlatRule>> {
    let raw: RawGrammar =
        serde_json::from_str(grammar_json).map_err(|e| Error::Grammar(e.to_string()))?;

    let mut cache = PatternCache::new();
    let mut rules = Vec::new();
    flatten_rules(&raw.patterns, &mut cache, &mut rules);
    info!("cached {} regex patterns", cache.len());
    Ok(rules)
}

fn parse_theme(theme_json: &str) -> Result<ThemeTable> {
    let raw: RawTheme =
        serde_json::from_str(theme_json).map_err(|e| Error::Theme(e.to_string()))?;

    let mut table = ThemeTable::default();
    for entry in raw.token_colors {
        let style = settings_to_style(&entry.settings);
        match entry.scope {
            Some(RawScope::One(scope)) => table.insert(scope, style),
            Some(RawScope::Many(scopes)) => {
                for scope in scopes {
                    table.insert(scope, style);
                }
            }
            // Entries without a scope carry editor-wide settings; the
            // styling engine only consumes scoped bindings.
            None => {}
        }
    }
    Ok(table)
}

fn settings_to_style(settings: &RawSettings) -> Style {
    let mut style = Style::NONE;

    if let Some(hex) = &settings.foreground {
        match Rgba::from_hex(hex) {
            Ok(color) => style.fg = Some(color),
            Err(_) => warn!("invalid hex color {hex:?}"),
        }
    }
    if let Some(hex) = &settings.background {
        match Rgba::from_hex(hex) {
            Ok(color) => style.bg = Some(color),
            Err(_) => warn!("invalid hex color {hex:?}"),
        }
    }
    if let Some(font_style) = &settings.font_style {
        if font_style.contains("bold") {
            style.attributes |= TextAttributes::BOLD;
        }
        if font_style.contains("italic") {
            style.attributes |= TextAttributes::ITALIC;
        }
        if font_style.contains("underline") {
            style.attributes |= TextAttributes::UNDERLINE;
        }
    }

    style
}

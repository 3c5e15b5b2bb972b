//! Scope-to-style resolution with fallback rules.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::grammar::GrammarContext;
use crate::style::Style;

/// Resolves a scope name to concrete style attributes.
///
/// Resolution order:
///
/// 1. exact lookup of the full scope string;
/// 2. split on commas, exact lookup of each trimmed part in order;
/// 3. per part, scan the theme table in declaration order for bidirectional
///    substring containment (key in part or part in key), first hit wins;
/// 4. otherwise the grammar's default style.
///
/// A scope containing `strong` is forced bold and one containing `emphasis`
/// forced italic, additively on top of whatever the theme entry specifies.
///
/// Results are memoized per distinct scope string for the lifetime of the
/// resolver; the grammar never reloads, so the cache is never invalidated.
pub struct StyleResolver {
    context: Arc<GrammarContext>,
    cache: Mutex<HashMap<String, Style>>,
}

impl StyleResolver {
    /// Create a resolver over a loaded grammar context.
    #[must_use]
    pub fn new(context: Arc<GrammarContext>) -> Self {
        Self {
            context,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// The style for text no scope claims.
    #[must_use]
    pub fn default_style(&self) -> Style {
        self.context.default_style()
    }

    /// Resolve a scope name to a style.
    #[must_use]
    pub fn resolve(&self, scope: &str) -> Style {
        if scope.is_empty() {
            return self.context.default_style();
        }

        if let Ok(cache) = self.cache.lock() {
            if let Some(&style) = cache.get(scope) {
                return style;
            }
        }

        let style = self.resolve_uncached(scope);

        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(scope.to_string(), style);
        }
        style
    }

    fn resolve_uncached(&self, scope: &str) -> Style {
        let theme = self.context.theme();

        let mut found = theme.get_exact(scope);

        if found.is_none() {
            'parts: for part in scope.split(',').map(str::trim) {
                if let Some(style) = theme.get_exact(part) {
                    found = Some(style);
                    break;
                }
                for (key, style) in theme.iter() {
                    if part.contains(key) || key.contains(part) {
                        found = Some(style);
                        break 'parts;
                    }
                }
            }
        }

        let Some(mut style) = found else {
            return self.context.default_style();
        };

        // Markup emphasis scopes style themselves even when the theme entry
        // carries no fontStyle. Additive only.
        if scope.contains("strong") {
            style = style.with_bold();
        }
        if scope.contains("emphasis") {
            style = style.with_italic();
        }

        style
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;
    use crate::style::TextAttributes;

    fn resolver(theme: &str) -> StyleResolver {
        let ctx = GrammarContext::load("{\"patterns\": []}", theme);
        StyleResolver::new(Arc::new(ctx))
    }

    const THEME: &str = r#"{
        "tokenColors": [
            {"scope": "keyword.control", "settings": {"foreground": "#FF0000", "fontStyle": "bold"}},
            {"scope": "string", "settings": {"foreground": "#00FF00"}},
            {"scope": "comment.line.double-slash", "settings": {"foreground": "#888888", "fontStyle": "italic"}}
        ]
    }"#;

    #[test]
    fn test_exact_lookup() {
        let resolver = resolver(THEME);
        let style = resolver.resolve("keyword.control");
        assert_eq!(style.fg, Some(Rgba::RED));
        assert!(style.attributes.contains(TextAttributes::BOLD));
    }

    #[test]
    fn test_comma_separated_parts_resolve_in_order() {
        let resolver = resolver(THEME);
        let style = resolver.resolve("nonexistent.scope, string");
        assert_eq!(style.fg, Some(Rgba::new(0, 255, 0)));
    }

    #[test]
    fn test_containment_fallback_part_in_key() {
        let resolver = resolver(THEME);
        // "comment.line" is a substring of the declared key.
        let style = resolver.resolve("comment.line");
        assert_eq!(style.fg, Some(Rgba::new(0x88, 0x88, 0x88)));
    }

    #[test]
    fn test_containment_fallback_key_in_part() {
        let resolver = resolver(THEME);
        // The declared key "string" is a substring of the queried scope.
        let style = resolver.resolve("string.quoted.double");
        assert_eq!(style.fg, Some(Rgba::new(0, 255, 0)));
    }

    #[test]
    fn test_containment_uses_declaration_order() {
        let resolver = resolver(
            r#"{
                "tokenColors": [
                    {"scope": "meta.tag", "settings": {"foreground": "#111111"}},
                    {"scope": "meta", "settings": {"foreground": "#222222"}}
                ]
            }"#,
        );
        // Both keys contain-match; the first declared entry wins.
        let style = resolver.resolve("meta.tag.inline");
        assert_eq!(style.fg, Some(Rgba::new(0x11, 0x11, 0x11)));
    }

    #[test]
    fn test_unknown_scope_falls_back_to_default() {
        let resolver = resolver(THEME);
        assert_eq!(resolver.resolve("zzz.unknown"), resolver.default_style());
        assert_eq!(resolver.resolve(""), resolver.default_style());
    }

    #[test]
    fn test_strong_and_emphasis_keywords_force_attributes() {
        let resolver = resolver(
            r#"{
                "tokenColors": [
                    {"scope": "markup.strong", "settings": {"foreground": "#AAAAAA"}},
                    {"scope": "markup.emphasis", "settings": {"foreground": "#BBBBBB"}}
                ]
            }"#,
        );
        assert!(
            resolver
                .resolve("markup.strong")
                .attributes
                .contains(TextAttributes::BOLD)
        );
        assert!(
            resolver
                .resolve("markup.emphasis")
                .attributes
                .contains(TextAttributes::ITALIC)
        );
    }

    #[test]
    fn test_keyword_forcing_is_additive_to_font_style() {
        let resolver = resolver(
            r#"{
                "tokenColors": [
                    {"scope": "markup.strong", "settings": {"fontStyle": "underline"}}
                ]
            }"#,
        );
        let style = resolver.resolve("markup.strong");
        assert!(style.attributes.contains(TextAttributes::UNDERLINE));
        assert!(style.attributes.contains(TextAttributes::BOLD));
    }

    #[test]
    fn test_resolution_is_memoized() {
        let resolver = resolver(THEME);
        let first = resolver.resolve("keyword.control");
        let second = resolver.resolve("keyword.control");
        assert_eq!(first, second);
        assert_eq!(resolver.cache.lock().unwrap().len(), 1);
    }
}

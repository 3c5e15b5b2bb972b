//! Per-chunk tokenizer scanning the flattened rule list.

use crate::grammar::{FlatRule, GrammarContext, RuleMatcher};

/// A scope-tagged match produced by [`LineTokenizer::tokenize`].
///
/// Spans are transient: they borrow their scope from the grammar and are
/// consumed immediately to restyle a segment, never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchSpan<'g> {
    /// Byte offset of the span within the tokenized chunk.
    pub start: usize,
    /// Span length in bytes.
    pub len: usize,
    /// Scope name of the rule that claimed the span.
    pub scope: &'g str,
}

impl MatchSpan<'_> {
    /// Exclusive end offset.
    #[must_use]
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Scans one text chunk against the flattened rule list.
///
/// Rules are tried in flattened (declaration) order and the first rule to
/// claim a region wins: no later rule may claim any overlapping region, even
/// partially. Range rules must find their end pattern within the same chunk
/// or they produce nothing for that begin occurrence.
#[derive(Clone, Copy, Debug)]
pub struct LineTokenizer<'g> {
    rules: &'g [FlatRule],
}

impl<'g> LineTokenizer<'g> {
    /// Create a tokenizer over a grammar's flattened rules.
    #[must_use]
    pub fn new(context: &'g GrammarContext) -> Self {
        Self {
            rules: context.rules(),
        }
    }

    /// Tokenize a chunk into non-overlapping scope-tagged spans, sorted by
    /// start offset. Identical input always yields identical spans.
    #[must_use]
    pub fn tokenize(&self, text: &str) -> Vec<MatchSpan<'g>> {
        let mut spans: Vec<MatchSpan<'g>> = Vec::new();
        let mut claimed: Vec<(usize, usize)> = Vec::new();

        for rule in self.rules {
            match &rule.matcher {
                RuleMatcher::Simple(re) => {
                    for m in re.find_iter(text) {
                        accept(&mut spans, &mut claimed, m.start(), m.end(), &rule.scope);
                    }
                }
                RuleMatcher::Range { begin, end } => {
                    for m in begin.find_iter(text) {
                        let begin_end = m.end();
                        // End pattern searches strictly after the begin match;
                        // no end within the chunk means no span (no carry-over).
                        if let Some(em) = end.find(&text[begin_end..]) {
                            let span_end = begin_end + em.end();
                            accept(&mut spans, &mut claimed, m.start(), span_end, &rule.scope);
                        }
                    }
                }
                RuleMatcher::Skip => {}
            }
        }

        spans.sort_by_key(|span| span.start);
        spans
    }
}

fn accept<'g>(
    spans: &mut Vec<MatchSpan<'g>>,
    claimed: &mut Vec<(usize, usize)>,
    start: usize,
    end: usize,
    scope: &'g str,
) {
    if start >= end {
        return;
    }
    if claimed.iter().any(|&(s, e)| start < e && end > s) {
        return;
    }
    claimed.push((start, end));
    spans.push(MatchSpan {
        start,
        len: end - start,
        scope,
    });
}

//! Fuzz target for the line tokenizer.
//!
//! Tokenizes arbitrary text against a representative grammar and checks the
//! non-overlap invariant.

#![no_main]

use libfuzzer_sys::fuzz_target;
use logtint::{GrammarContext, LineTokenizer};
use std::sync::OnceLock;

const GRAMMAR: &str = r#"{
    "patterns": [
        {"match": "\\b(ERROR|FATAL)\\b", "name": "log.error"},
        {"begin": "\"", "end": "\"", "name": "string.quoted"},
        {"begin": "\\[", "end": "\\]", "name": "meta.bracket"},
        {"match": "\\d+", "name": "constant.numeric"}
    ]
}"#;

fn context() -> &'static GrammarContext {
    static CONTEXT: OnceLock<GrammarContext> = OnceLock::new();
    CONTEXT.get_or_init(|| GrammarContext::load(GRAMMAR, "{\"tokenColors\": []}"))
}

fuzz_target!(|data: &str| {
    let tokenizer = LineTokenizer::new(context());
    let spans = tokenizer.tokenize(data);

    // Spans are sorted, non-empty, in-bounds, and pairwise disjoint.
    let mut last_end = 0usize;
    for span in &spans {
        assert!(span.len > 0);
        assert!(span.start >= last_end);
        assert!(span.end() <= data.len());
        last_end = span.end();
    }
});

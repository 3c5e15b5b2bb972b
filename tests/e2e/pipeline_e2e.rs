//! E2E tests for the streaming highlight pipeline.
//!
//! Run with:
//!   cargo test --test `pipeline_e2e` -- --nocapture
//! With logging:
//!   `RUST_LOG=debug` cargo test --test `pipeline_e2e` -- --nocapture
//!
//! CI: runs under the default `cargo test` job.

use std::sync::Arc;
use std::time::Duration;

use logtint::{
    GrammarContext, HighlightScheduler, LineTokenizer, Rgba, SearchOverlayIndex, Style,
    StyleBuffer, StyleResolver, TextAttributes,
};
use tracing::Level;

const LOG_GRAMMAR: &str = include_str!("fixtures/log_grammar.json");
const DARK_THEME: &str = include_str!("fixtures/dark_theme.json");

const SETTLE: Duration = Duration::from_secs(10);

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_target(true)
        .with_test_writer()
        .try_init();
}

fn pipeline(workers: usize) -> (Arc<StyleBuffer>, HighlightScheduler) {
    let context = Arc::new(GrammarContext::load(LOG_GRAMMAR, DARK_THEME));
    let buffer = Arc::new(StyleBuffer::new(context.default_style()));
    let scheduler = HighlightScheduler::new(context, Arc::clone(&buffer), workers);
    (buffer, scheduler)
}

fn fg_at(buffer: &StyleBuffer, offset: usize) -> Option<Rgba> {
    buffer.resolve_style_at(offset).fg
}

#[test]
fn e2e_error_line_styles_red_bold() {
    init_logging();
    let (buffer, scheduler) = pipeline(2);

    scheduler.on_append("ERROR: failure");
    assert!(scheduler.wait_idle(SETTLE));

    for offset in 0..5 {
        let style = buffer.resolve_style_at(offset);
        assert_eq!(style.fg, Some(Rgba::from_hex("#F44747").unwrap()));
        assert!(style.attributes.contains(TextAttributes::BOLD));
    }
    // Past the keyword the base style shows through.
    assert_eq!(fg_at(&buffer, 6), Some(Rgba::WHITE));
}

#[test]
fn e2e_full_log_line_spans() {
    init_logging();
    let (buffer, scheduler) = pipeline(2);

    //           0         1         2         3         4
    //           0123456789012345678901234567890123456789012345678
    let line = r#"2024-06-01 12:30:45 INFO server "started" [main]"#;
    scheduler.on_append(line);
    assert!(scheduler.wait_idle(SETTLE));

    let date = Rgba::from_hex("#B5CEA8").unwrap();
    let info = Rgba::from_hex("#6A9955").unwrap();
    let string = Rgba::from_hex("#CE9178").unwrap();
    let thread = Rgba::from_hex("#9CDCFE").unwrap();

    assert_eq!(fg_at(&buffer, 0), Some(date)); // date
    assert_eq!(fg_at(&buffer, 11), Some(date)); // time
    assert_eq!(fg_at(&buffer, 20), Some(info)); // INFO
    assert_eq!(fg_at(&buffer, 33), Some(string)); // inside quotes
    assert_eq!(fg_at(&buffer, 42), Some(thread)); // bracket section
    assert_eq!(fg_at(&buffer, 25), Some(Rgba::WHITE)); // "server" unclaimed
}

#[test]
fn e2e_nested_rule_flattens_into_priority_sequence() {
    init_logging();
    let (buffer, scheduler) = pipeline(1);

    // The exception rule is nested under the bracket rule in the grammar,
    // but flattening makes it a plain lower-priority sibling: it can match
    // anywhere the bracket rule has not already claimed.
    scheduler.on_append("caught NullPointerException here");
    assert!(scheduler.wait_idle(SETTLE));

    let exception = Rgba::from_hex("#4EC9B0").unwrap();
    let style = buffer.resolve_style_at(7);
    assert_eq!(style.fg, Some(exception));
    assert!(style.attributes.contains(TextAttributes::UNDERLINE));
}

#[test]
fn e2e_bracket_claims_before_nested_exception() {
    init_logging();
    let (buffer, scheduler) = pipeline(1);

    scheduler.on_append("[NullPointerException]");
    assert!(scheduler.wait_idle(SETTLE));

    // The whole span belongs to the bracket rule; the nested exception rule
    // lost the overlap to its earlier-flattened parent.
    let thread = Rgba::from_hex("#9CDCFE").unwrap();
    assert_eq!(fg_at(&buffer, 1), Some(thread));
}

#[test]
fn e2e_unterminated_string_produces_no_span() {
    init_logging();
    let (buffer, scheduler) = pipeline(1);

    scheduler.on_append("message \"unterminated until EOF");
    assert!(scheduler.wait_idle(SETTLE));

    // The quote never closes within the chunk, so nothing gets string color.
    let string = Rgba::from_hex("#CE9178").unwrap();
    for offset in 0..buffer.len() {
        assert_ne!(fg_at(&buffer, offset), Some(string));
    }
}

#[test]
fn e2e_trim_preserves_surviving_styles() {
    init_logging();
    let (buffer, scheduler) = pipeline(2);

    scheduler.on_append("ERROR first\n");
    scheduler.on_append("WARN second\n");
    scheduler.on_append("INFO third\n");
    assert!(scheduler.wait_idle(SETTLE));

    let n = 12; // drop the first line
    let expected: Vec<Style> = (n..buffer.len())
        .map(|offset| buffer.resolve_style_at(offset))
        .collect();

    buffer.trim_front(n);

    let actual: Vec<Style> = (0..buffer.len())
        .map(|offset| buffer.resolve_style_at(offset))
        .collect();
    assert_eq!(expected, actual);
    assert_eq!(buffer.contents(), "WARN second\nINFO third\n");
}

#[test]
fn e2e_search_overlay_and_clear_round_trip() {
    init_logging();
    let (buffer, scheduler) = pipeline(2);

    scheduler.on_append("ERROR alpha\n");
    scheduler.on_append("ERROR beta\n");
    assert!(scheduler.wait_idle(SETTLE));

    let index = SearchOverlayIndex::new(Arc::clone(&buffer));
    let before: Vec<Style> = (0..buffer.len())
        .map(|offset| buffer.resolve_style_at(offset))
        .collect();

    let matches = index.search("error", false);
    assert_eq!(matches, vec![0, 12]);

    // Overlay composes highlight background over the syntax foreground.
    let overlaid = index.style_at(0);
    assert_eq!(overlaid.bg, Some(Rgba::YELLOW));
    assert_eq!(overlaid.fg, Some(Rgba::from_hex("#F44747").unwrap()));
    assert!(overlaid.attributes.contains(TextAttributes::BOLD));

    index.clear();
    let after: Vec<Style> = (0..buffer.len())
        .map(|offset| buffer.resolve_style_at(offset))
        .collect();
    assert_eq!(before, after);
}

#[test]
fn e2e_search_is_torn_read_safe_under_trim() {
    init_logging();
    let (buffer, scheduler) = pipeline(2);
    for _ in 0..100 {
        scheduler.on_append("ERROR needle line\n");
    }

    let index = SearchOverlayIndex::new(Arc::clone(&buffer));
    let trimmer = {
        let buffer = Arc::clone(&buffer);
        std::thread::spawn(move || {
            for _ in 0..50 {
                buffer.trim_front(18);
            }
        })
    };

    for _ in 0..50 {
        for &offset in &index.search("needle", true) {
            // Every reported match must resolve without panicking, stale
            // overlays behave as cleared.
            let _ = index.style_at(offset);
        }
    }
    trimmer.join().expect("trimmer thread");
    assert!(scheduler.wait_idle(SETTLE));
}

#[test]
fn e2e_degraded_grammar_still_styles_levels() {
    init_logging();
    let context = Arc::new(GrammarContext::load("definitely not json", DARK_THEME));
    assert!(!context.has_rules());

    let buffer = Arc::new(StyleBuffer::new(context.default_style()));
    let scheduler = HighlightScheduler::new(context, Arc::clone(&buffer), 1);

    scheduler.on_append("ERROR: kaboom\n");
    assert_eq!(fg_at(&buffer, 0), Some(Rgba::RED));
}

#[test]
fn e2e_tokenize_matches_async_result() {
    init_logging();
    let context = Arc::new(GrammarContext::load(LOG_GRAMMAR, DARK_THEME));
    let resolver = StyleResolver::new(Arc::clone(&context));
    let tokenizer = LineTokenizer::new(&context);

    let line = "2024-06-01 ERROR worker \"died\" [pool-1] 0xdead 42";

    // Synchronous reference result.
    let buffer = Arc::new(StyleBuffer::new(context.default_style()));
    let scheduler = HighlightScheduler::new(Arc::clone(&context), Arc::clone(&buffer), 4);
    scheduler.on_append(line);
    assert!(scheduler.wait_idle(SETTLE));

    let mut expected = vec![context.default_style(); line.len()];
    for span in tokenizer.tokenize(line) {
        let style = resolver.resolve(span.scope);
        for slot in &mut expected[span.start..span.end()] {
            *slot = style;
        }
    }

    let actual: Vec<Style> = (0..line.len())
        .map(|offset| buffer.resolve_style_at(offset))
        .collect();
    assert_eq!(expected, actual);
}

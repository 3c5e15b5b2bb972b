//! Fuzz target for the legacy pattern-clean shim.
//!
//! Tests that clean_pattern never panics, always returns valid UTF-8, and
//! is idempotent on its own output.

#![no_main]

use libfuzzer_sys::fuzz_target;
use logtint::grammar::clean_pattern;

fuzz_target!(|data: &str| {
    let cleaned = clean_pattern(data);
    // Cleaning is a fixpoint: a cleaned pattern has no bare \p left.
    assert_eq!(clean_pattern(&cleaned), cleaned);
});

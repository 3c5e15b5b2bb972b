//! Entry point for E2E streaming-highlight pipeline tests.
//!
//! Run with:
//!   cargo test --test `pipeline_e2e` -- --nocapture
//!
//! CI: included in the default `cargo test` run.

#[path = "e2e/pipeline_e2e.rs"]
mod pipeline_e2e;

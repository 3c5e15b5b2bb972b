//! Asynchronous highlighting pipeline.
//!
//! One synchronous producer (the append path) feeds a bounded pool of worker
//! threads over an `mpsc` channel. Appends insert text with a base style
//! immediately — content order is always append call order — and the
//! tokenize-and-restyle work happens later on a worker, writing back through
//! the stale-write-checked [`StyleBuffer::apply_override`]. There is exactly
//! one job per segment, so no segment is ever highlighted concurrently with
//! itself; highlighting completion order across segments is unspecified.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::error;

use super::resolver::StyleResolver;
use super::tokenizer::LineTokenizer;
use crate::color::Rgba;
use crate::grammar::GrammarContext;
use crate::style::Style;
use crate::text::{SegmentHandle, StyleBuffer};

/// One queued tokenize-and-restyle unit of work.
struct Job {
    handle: SegmentHandle,
    base_offset: usize,
    text: String,
}

/// Shared pending-job counter, used to wait for quiescence.
#[derive(Default)]
struct Pending {
    count: Mutex<usize>,
    idle: Condvar,
}

/// Orchestrates synchronous appends and asynchronous per-segment restyling.
pub struct HighlightScheduler {
    context: Arc<GrammarContext>,
    buffer: Arc<StyleBuffer>,
    sender: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
    discard: Arc<AtomicBool>,
    pending: Arc<Pending>,
}

impl HighlightScheduler {
    /// Create a scheduler with `worker_count` highlighting threads (min 1).
    #[must_use]
    pub fn new(
        context: Arc<GrammarContext>,
        buffer: Arc<StyleBuffer>,
        worker_count: usize,
    ) -> Self {
        let (sender, receiver) = channel::<Job>();
        let receiver = Arc::new(Mutex::new(receiver));
        let resolver = Arc::new(StyleResolver::new(Arc::clone(&context)));
        let discard = Arc::new(AtomicBool::new(false));
        let pending = Arc::new(Pending::default());

        let workers = (0..worker_count.max(1))
            .map(|_| {
                let receiver = Arc::clone(&receiver);
                let context = Arc::clone(&context);
                let resolver = Arc::clone(&resolver);
                let buffer = Arc::clone(&buffer);
                let discard = Arc::clone(&discard);
                let pending = Arc::clone(&pending);
                thread::spawn(move || {
                    worker_loop(&receiver, &context, &resolver, &buffer, &discard, &pending);
                })
            })
            .collect();

        Self {
            context,
            buffer,
            sender: Some(sender),
            workers,
            discard,
            pending,
        }
    }

    /// Append a chunk and enqueue its highlighting job.
    ///
    /// The append itself is synchronous and determines final content order.
    /// With a usable grammar the chunk starts at the default style and a
    /// worker restyles it later; without one (load-failure degradation) the
    /// chunk keeps a level-scan base style and no job is enqueued.
    pub fn on_append(&self, text: &str) {
        if !self.context.has_rules() {
            let style = level_style(text, self.context.default_style());
            self.buffer.append(text, style);
            return;
        }

        let (handle, base_offset) = self.buffer.append(text, self.context.default_style());
        if let Some(sender) = &self.sender {
            self.pending_add(1);
            let job = Job {
                handle,
                base_offset,
                text: text.to_string(),
            };
            if sender.send(job).is_err() {
                self.pending_sub();
            }
        }
    }

    /// Clear the buffer. Jobs still queued for the old content discard
    /// harmlessly through the stale-write check.
    pub fn clear(&self) {
        self.buffer.clear();
    }

    /// The shared buffer this scheduler appends into.
    #[must_use]
    pub fn buffer(&self) -> &Arc<StyleBuffer> {
        &self.buffer
    }

    /// Block until every enqueued job has finished, or `timeout` elapses.
    /// Returns true if the pipeline went idle.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = std::time::Instant::now() + timeout;
        let mut count = self.pending.count.lock().expect("pending lock");
        while *count > 0 {
            let Some(remaining) = deadline.checked_duration_since(std::time::Instant::now())
            else {
                return false;
            };
            let (guard, result) = self
                .pending
                .idle
                .wait_timeout(count, remaining)
                .expect("pending lock");
            count = guard;
            if result.timed_out() && *count > 0 {
                return false;
            }
        }
        true
    }

    fn pending_add(&self, n: usize) {
        let mut count = self.pending.count.lock().expect("pending lock");
        *count += n;
    }

    fn pending_sub(&self) {
        let mut count = self.pending.count.lock().expect("pending lock");
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.pending.idle.notify_all();
        }
    }
}

impl Drop for HighlightScheduler {
    /// Shutdown discards queued jobs within a bounded wait: the discard flag
    /// makes remaining jobs no-ops, closing the channel stops the workers.
    fn drop(&mut self) {
        self.discard.store(true, Ordering::SeqCst);
        drop(self.sender.take());
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

fn worker_loop(
    receiver: &Mutex<Receiver<Job>>,
    context: &Arc<GrammarContext>,
    resolver: &StyleResolver,
    buffer: &StyleBuffer,
    discard: &AtomicBool,
    pending: &Pending,
) {
    loop {
        let message = receiver.lock().expect("job receiver lock").recv();
        let Ok(job) = message else {
            // Channel closed: scheduler dropped, nothing more will arrive.
            break;
        };

        if !discard.load(Ordering::SeqCst) {
            // A panic in one job must not take down the pool or reach other
            // jobs; the segment just stays at its base style.
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                run_job(context, resolver, buffer, &job);
            }));
            if outcome.is_err() {
                error!(
                    "highlighting job for offset {} failed; segment left unstyled",
                    job.base_offset
                );
            }
        }

        let mut count = pending.count.lock().expect("pending lock");
        *count = count.saturating_sub(1);
        if *count == 0 {
            pending.idle.notify_all();
        }
    }
}

fn run_job(
    context: &Arc<GrammarContext>,
    resolver: &StyleResolver,
    buffer: &StyleBuffer,
    job: &Job,
) {
    let tokenizer = LineTokenizer::new(context);
    for span in tokenizer.tokenize(&job.text) {
        let style = resolver.resolve(span.scope);
        for offset in span.start..span.end() {
            buffer.apply_override(job.handle, job.base_offset + offset, style);
        }
    }
}

/// Base style for a chunk when no grammar is available: scan for the log
/// level keyword, most severe first.
fn level_style(text: &str, default: Style) -> Style {
    if text.contains("ERROR") {
        Style::fg(Rgba::RED)
    } else if text.contains("WARN") {
        Style::fg(Rgba::YELLOW)
    } else if text.contains("INFO") {
        Style::fg(Rgba::LIGHT_GRAY)
    } else {
        default
    }
}

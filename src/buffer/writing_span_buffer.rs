//! The thread-safe registry of pending traces.
//!
//! Mirrors the shape of the handler that owns a DNS server's in-flight span
//! table: one mutex-guarded map keyed by trace id, mutated by
//! register/finish calls from arbitrary threads, with the completed batch
//! handed off to a writer exactly once per trace.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::instrument;

use super::finisher;
use super::pending_trace::{PendingTrace, PrioritySource};
use crate::collaborators::{Clock, LogLevel, Logger, Writer};
use crate::metrics::{self, SpanDropReason};
use crate::sampling::RulesSampler;
use crate::span::{SamplingPriority, SpanContext, SpanData};

/// Static buffer configuration, assembled by the configuration loader (see
/// `config::BufferOptions`) and fixed for the buffer's lifetime.
pub struct BufferOptions {
    pub hostname: String,
    /// NaN means absent.
    pub analytics_rate: f64,
    /// When false, completed traces are dropped instead of written; the
    /// buffer still cleans up its internal state.
    pub enabled: bool,
}

impl Default for BufferOptions {
    fn default() -> Self {
        Self {
            hostname: String::new(),
            analytics_rate: f64::NAN,
            enabled: true,
        }
    }
}

/// The registry of in-flight traces. One instance is shared (typically
/// behind an `Arc`) across every thread producing spans.
pub struct WritingSpanBuffer {
    traces: Mutex<HashMap<u64, PendingTrace>>,
    options: BufferOptions,
    rules_sampler: RulesSampler,
    writer: Arc<dyn Writer>,
    logger: Arc<dyn Logger>,
    clock: Arc<dyn Clock>,
}

impl WritingSpanBuffer {
    pub fn new(
        options: BufferOptions,
        rules_sampler: RulesSampler,
        writer: Arc<dyn Writer>,
        logger: Arc<dyn Logger>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            traces: Mutex::new(HashMap::new()),
            options,
            rules_sampler,
            writer,
            logger,
            clock,
        }
    }

    /// Registers a span's arrival. Creates the trace entry on first sight of
    /// `context.trace_id`, seeding it from the propagated context. Idempotent
    /// per (trace, span): registering the same pair twice only inserts once.
    #[instrument(skip(self, context), fields(trace_id = context.trace_id, span_id = context.span_id))]
    pub fn register_span(&self, context: SpanContext) {
        let mut traces = self.traces.lock();
        let is_new_trace = !traces.contains_key(&context.trace_id);
        let trace = traces.entry(context.trace_id).or_insert_with(|| {
            let mut trace = PendingTrace::new(self.options.hostname.clone(), self.options.analytics_rate);
            trace.set_propagated_sampling_priority(context.propagated_sampling_priority);
            trace.origin = context.origin.clone();
            trace
        });
        trace.all_spans.insert(context.span_id);
        if is_new_trace {
            tracing::trace!(trace_id = context.trace_id, "pending trace created");
        }
    }

    /// Accepts a completed span. Logs and drops it if its trace or span id
    /// was never registered. Once every registered span for the trace has
    /// finished, assigns a final sampling priority if needed, decorates
    /// roots, and hands the batch to the writer (unless the buffer is
    /// disabled, in which case the batch is discarded but the trace entry
    /// is still removed).
    #[instrument(skip(self, span), fields(trace_id = span.trace_id, span_id = span.span_id))]
    pub fn finish_span(&self, span: SpanData) {
        let trace_id = span.trace_id;
        let mut traces = self.traces.lock();

        let is_complete = {
            let Some(trace) = traces.get_mut(&trace_id) else {
                tracing::error!(trace_id, "finish_span: unknown trace_id");
                self.logger.log(LogLevel::Error, &format!("finish_span: unknown trace_id {trace_id}"));
                metrics::record_span_dropped(SpanDropReason::UnknownTrace);
                return;
            };
            if !trace.all_spans.contains(&span.span_id) {
                tracing::error!(trace_id, span_id = span.span_id, "finish_span: span not registered on trace");
                self.logger.log(
                    LogLevel::Error,
                    &format!("finish_span: span {} not registered on trace {trace_id}", span.span_id),
                );
                metrics::record_span_dropped(SpanDropReason::UnregisteredSpan);
                return;
            }
            trace.finished_spans.push(span);
            trace.is_complete()
        };

        if !is_complete {
            return;
        }

        let mut trace = traces.remove(&trace_id).expect("trace present");
        drop(traces);

        if let Some(last) = trace.finished_spans.last().cloned() {
            self.assign_sampling_priority(&mut trace, &last);
        }

        let mut spans = std::mem::take(&mut trace.finished_spans);
        finisher::finish_all(&trace, &mut spans);

        if self.options.enabled {
            tracing::debug!(trace_id, span_count = spans.len(), "emitting trace batch");
            self.writer.write(spans);
            metrics::record_trace_emitted();
        } else {
            tracing::debug!(trace_id, "buffer disabled, dropping completed trace");
            metrics::record_trace_dropped_disabled();
        }
    }

    /// Returns a copy of the trace's currently stored sampling priority.
    #[instrument(skip(self))]
    pub fn get_sampling_priority(&self, trace_id: u64) -> Option<SamplingPriority> {
        self.traces.lock().get(&trace_id).and_then(|t| t.sampling_priority)
    }

    /// Attempts to set `trace_id`'s sampling priority. Rejected once the
    /// trace is locked; logs at trace level only when `source` is
    /// `External` (the sampler's own retry must not spam the log). Returns
    /// the priority actually in effect afterwards.
    #[instrument(skip(self))]
    pub fn set_sampling_priority(
        &self,
        trace_id: u64,
        priority: Option<SamplingPriority>,
        source: PrioritySource,
    ) -> Option<SamplingPriority> {
        let mut traces = self.traces.lock();
        let Some(trace) = traces.get_mut(&trace_id) else {
            return None;
        };
        if trace.sampling_priority_locked {
            if source == PrioritySource::External {
                tracing::debug!(trace_id, "sampling priority reassignment ignored, trace is locked");
                self.logger.trace(trace_id, "sampling priority reassignment ignored, trace is locked");
            }
            return trace.sampling_priority;
        }
        trace.try_set_sampling_priority(priority);
        trace.sampling_priority
    }

    /// Invokes the rules sampler if the trace doesn't already have a
    /// sampling priority, recording its rates onto the trace's
    /// `sample_result`. Returns the priority in effect.
    #[instrument(skip(self, trace, span), fields(trace_id = span.trace_id))]
    fn assign_sampling_priority(&self, trace: &mut PendingTrace, span: &SpanData) -> Option<SamplingPriority> {
        if trace.sampling_priority.is_some() {
            return trace.sampling_priority;
        }
        let now = self.clock.now().mono;
        let result = self.rules_sampler.sample(&span.env(), &span.service, &span.name, span.trace_id, now);
        tracing::trace!(trace_id = span.trace_id, priority = ?result.sampling_priority, "sampler assigned priority");
        trace.sample_result = result;
        if trace.sampling_priority_locked {
            return trace.sampling_priority;
        }
        trace.try_set_sampling_priority(result.sampling_priority);
        trace.sampling_priority
    }

    /// Delegates to the writer's flush.
    pub fn flush(&self, timeout: Duration) -> bool {
        self.writer.flush(timeout)
    }
}

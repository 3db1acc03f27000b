//! Internal Prometheus diagnostics for the core's own health.
//!
//! Purely a local observability surface - distinct from the `_dd.*` span
//! tags stamped by `buffer::finisher`, and never consulted by a sampling
//! decision.

use lazy_static::lazy_static;
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

lazy_static! {
    /// Traces successfully handed to the writer.
    pub static ref TRACES_EMITTED: IntCounter = register_int_counter!(
        "trace_sampling_core_traces_emitted_total",
        "Traces handed to the writer"
    )
    .unwrap();

    /// Traces completed while the buffer was disabled and therefore dropped
    /// instead of written.
    pub static ref TRACES_DROPPED_DISABLED: IntCounter = register_int_counter!(
        "trace_sampling_core_traces_dropped_disabled_total",
        "Traces dropped because the buffer was disabled"
    )
    .unwrap();

    /// Spans dropped on `finish_span`, labelled by the reason.
    pub static ref SPANS_DROPPED: IntCounterVec = register_int_counter_vec!(
        "trace_sampling_core_spans_dropped_total",
        "Spans dropped by finish_span",
        &["reason"]
    )
    .unwrap();
}

/// Reasons a span may be dropped on `finish_span`, matching the labels
/// registered against `SPANS_DROPPED`.
#[derive(Debug, Clone, Copy)]
pub enum SpanDropReason {
    UnknownTrace,
    UnregisteredSpan,
}

impl SpanDropReason {
    fn label(self) -> &'static str {
        match self {
            SpanDropReason::UnknownTrace => "unknown_trace",
            SpanDropReason::UnregisteredSpan => "unregistered_span",
        }
    }
}

pub fn record_span_dropped(reason: SpanDropReason) {
    SPANS_DROPPED.with_label_values(&[reason.label()]).inc();
}

pub fn record_trace_emitted() {
    TRACES_EMITTED.inc();
}

pub fn record_trace_dropped_disabled() {
    TRACES_DROPPED_DISABLED.inc();
}

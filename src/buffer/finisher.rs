//! Per-span finishing: root detection and metadata/metric stamping.
//!
//! Grounded in the top-level-span computation used to decide which spans in
//! a trace chunk carry trace-level metadata before the chunk leaves a
//! process: a span is a root of the *locally observed* trace either because
//! it truly has no parent, or because its parent was never registered here
//! (the real root lives in another process).

use super::pending_trace::PendingTrace;
use crate::span::SpanData;

/// Whether `span` is a local root: no parent, or a parent this process never
/// saw registered (the real parent lives in another process).
pub fn is_root(span: &SpanData, all_spans: &std::collections::HashSet<u64>) -> bool {
    span.parent_id == 0 || !all_spans.contains(&span.parent_id)
}

/// Stamps metadata common to every span in the trace, root or not.
pub fn finish_span(trace: &PendingTrace, span: &mut SpanData) {
    if !trace.origin.is_empty() {
        span.meta.insert("_dd.origin".to_string(), trace.origin.clone());
    }
}

/// Stamps the additional metadata/metrics that only the root span(s) carry.
/// Callers must also call `finish_span` for the same span; this function
/// does not duplicate that work.
pub fn finish_root_span(trace: &PendingTrace, span: &mut SpanData) {
    if let Some(priority) = trace.sampling_priority {
        span.metrics.insert("_sampling_priority_v1".to_string(), f64::from(priority));
    }
    if !trace.hostname.is_empty() {
        span.meta.insert("_dd.hostname".to_string(), trace.hostname.clone());
    }
    if !trace.analytics_rate.is_nan() && !span.metrics.contains_key("_dd1.sr.eausr") {
        span.metrics.insert("_dd1.sr.eausr".to_string(), trace.analytics_rate);
    }
    let result = trace.sample_result;
    if !result.rule_rate.is_nan() {
        span.metrics.insert("_dd.rule_psr".to_string(), result.rule_rate);
    }
    if !result.limiter_rate.is_nan() {
        span.metrics.insert("_dd.limit_psr".to_string(), result.limiter_rate);
    }
    if !result.priority_rate.is_nan() {
        span.metrics.insert("_dd.agent_psr".to_string(), result.priority_rate);
    }
}

/// Runs `finish_span` on every span in `spans`, plus `finish_root_span` on
/// exactly the local roots, as determined against `all_spans`.
pub fn finish_all(trace: &PendingTrace, spans: &mut [SpanData]) {
    for span in spans.iter_mut() {
        finish_span(trace, span);
        if is_root(span, &trace.all_spans) {
            finish_root_span(trace, span);
        }
    }
}

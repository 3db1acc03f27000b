//! Span and span-context data types.
//!
//! These types are deliberately thin: the core neither encodes them onto the
//! wire nor owns the public tracer API. `SpanData` is what `finish_span`
//! consumes and mutates; `SpanContext` is what context propagation produces
//! and `register_span` consumes.

use std::collections::HashMap;

/// Sampling priority assigned to a trace.
///
/// The sign encodes "keep if >= 1"; the `User*` vs `Sampler*` distinction
/// records *who* set the value and is load-bearing for the precedence/lock
/// rule in `buffer::pending_trace`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(i8)]
pub enum SamplingPriority {
    /// A user rule (or explicit tracer API call) decided to drop the trace.
    UserDrop = -1,
    /// The priority sampler decided to drop the trace.
    SamplerDrop = 0,
    /// The priority sampler decided to keep the trace.
    SamplerKeep = 1,
    /// A user rule (or explicit tracer API call) decided to keep the trace.
    UserKeep = 2,
}

impl SamplingPriority {
    /// Whether this priority means the trace should be reported.
    pub fn should_keep(self) -> bool {
        (self as i8) >= 1
    }

    /// Whether this priority was set by a user rule/override, as opposed to
    /// the priority sampler.
    pub fn is_user_set(self) -> bool {
        matches!(self, SamplingPriority::UserDrop | SamplingPriority::UserKeep)
    }
}

impl From<SamplingPriority> for f64 {
    fn from(p: SamplingPriority) -> f64 {
        p as i8 as f64
    }
}

/// Span context produced by context propagation / header codecs and consumed
/// by `WritingSpanBuffer::register_span`.
#[derive(Debug, Clone)]
pub struct SpanContext {
    pub trace_id: u64,
    pub span_id: u64,
    /// Sampling priority carried by an incoming distributed-trace header, if
    /// any. Presence locks the trace's sampling priority immediately.
    pub propagated_sampling_priority: Option<SamplingPriority>,
    /// Origin tag (e.g. `"synthetics"`), empty string when absent.
    pub origin: String,
}

impl SpanContext {
    pub fn new(trace_id: u64, span_id: u64) -> Self {
        Self {
            trace_id,
            span_id,
            propagated_sampling_priority: None,
            origin: String::new(),
        }
    }

    pub fn with_propagated_priority(mut self, priority: SamplingPriority) -> Self {
        self.propagated_sampling_priority = Some(priority);
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }
}

/// A completed span, as produced by the public tracer and handed to
/// `WritingSpanBuffer::finish_span`. The buffer mutates only `meta` and
/// `metrics`; everything else is read-only from its perspective.
#[derive(Debug, Clone, Default)]
pub struct SpanData {
    pub trace_id: u64,
    pub span_id: u64,
    /// `0` means "no parent".
    pub parent_id: u64,
    pub service: String,
    pub name: String,
    pub meta: HashMap<String, String>,
    pub metrics: HashMap<String, f64>,
}

impl SpanData {
    pub fn new(trace_id: u64, span_id: u64, parent_id: u64, service: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            trace_id,
            span_id,
            parent_id,
            service: service.into(),
            name: name.into(),
            meta: HashMap::new(),
            metrics: HashMap::new(),
        }
    }

    /// The span's environment, derived from `meta["env"]`, empty when absent.
    pub fn env(&self) -> String {
        self.meta.get("env").cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sampling_priority_should_keep() {
        assert!(!SamplingPriority::UserDrop.should_keep());
        assert!(!SamplingPriority::SamplerDrop.should_keep());
        assert!(SamplingPriority::SamplerKeep.should_keep());
        assert!(SamplingPriority::UserKeep.should_keep());
    }

    #[test]
    fn sampling_priority_is_user_set() {
        assert!(SamplingPriority::UserDrop.is_user_set());
        assert!(SamplingPriority::UserKeep.is_user_set());
        assert!(!SamplingPriority::SamplerDrop.is_user_set());
        assert!(!SamplingPriority::SamplerKeep.is_user_set());
    }

    #[test]
    fn span_env_defaults_empty() {
        let span = SpanData::new(1, 1, 0, "svc", "op");
        assert_eq!(span.env(), "");
    }

    #[test]
    fn span_env_reads_meta() {
        let mut span = SpanData::new(1, 1, 0, "svc", "op");
        span.meta.insert("env".to_string(), "prod".to_string());
        assert_eq!(span.env(), "prod");
    }
}

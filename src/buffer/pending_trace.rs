//! Per-trace aggregation state held by the writing span buffer.

use std::collections::HashSet;

use crate::sampling::SampleResult;
use crate::span::{SamplingPriority, SpanData};

/// Who is attempting to set a trace's sampling priority.
///
/// Drives whether a rejected reassignment (the trace is already locked) is
/// logged: an `External` caller (the public tracer API, on a user's behalf)
/// gets a trace-level log; the sampler retrying its own assignment does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrioritySource {
    External,
    Sampler,
}

/// Everything the buffer tracks for one in-flight trace.
pub struct PendingTrace {
    pub all_spans: HashSet<u64>,
    pub finished_spans: Vec<SpanData>,
    pub sampling_priority: Option<SamplingPriority>,
    pub sampling_priority_locked: bool,
    pub origin: String,
    pub hostname: String,
    /// NaN means absent.
    pub analytics_rate: f64,
    pub sample_result: SampleResult,
}

impl PendingTrace {
    pub fn new(hostname: String, analytics_rate: f64) -> Self {
        Self {
            all_spans: HashSet::new(),
            finished_spans: Vec::new(),
            sampling_priority: None,
            sampling_priority_locked: false,
            origin: String::new(),
            hostname,
            analytics_rate,
            sample_result: SampleResult::new(),
        }
    }

    /// Whether every registered span has finished, i.e. the trace is ready
    /// to be handed to the writer.
    pub fn is_complete(&self) -> bool {
        self.finished_spans.len() == self.all_spans.len()
    }

    /// Applies the precedence rule from the sampling-priority assignment
    /// model: a locked trace rejects everything except a propagated value
    /// arriving through the same path that locked it in the first place
    /// (callers never re-lock with `External` after the fact - the lock
    /// itself is the guard). Returns `true` if the value was accepted.
    pub fn try_set_sampling_priority(&mut self, priority: Option<SamplingPriority>) -> bool {
        if self.sampling_priority_locked {
            return false;
        }
        self.sampling_priority = priority;
        if matches!(priority, Some(p) if !p.is_user_set()) {
            self.sampling_priority_locked = true;
        }
        true
    }

    /// Locks immediately, used for priorities carried by an incoming
    /// propagated context.
    pub fn set_propagated_sampling_priority(&mut self, priority: Option<SamplingPriority>) {
        self.sampling_priority = priority;
        self.sampling_priority_locked = priority.is_some();
    }
}

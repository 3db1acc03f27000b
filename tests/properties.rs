//! Property tests for the quantified invariants in the sampling/buffering
//! design: selector self-agreement, exactly-one-batch-per-trace, and exact
//! root decoration.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant, SystemTime};

use proptest::prelude::*;

use trace_sampling_core::buffer::{BufferOptions, WritingSpanBuffer};
use trace_sampling_core::collaborators::{Clock, LogLevel, Logger, TimePoint, Writer};
use trace_sampling_core::sampling::{selector, PrioritySampler, Rule, RulesSampler, TokenBucketLimiter};
use trace_sampling_core::{SpanContext, SpanData};

struct CollectingWriter {
    batches: Mutex<Vec<Vec<SpanData>>>,
}

impl Writer for CollectingWriter {
    fn write(&self, batch: Vec<SpanData>) {
        self.batches.lock().unwrap().push(batch);
    }
    fn flush(&self, _timeout: Duration) -> bool {
        true
    }
}

struct NullLogger;
impl Logger for NullLogger {
    fn log(&self, _level: LogLevel, _message: &str) {}
    fn trace(&self, _trace_id: u64, _message: &str) {}
}

struct FrozenClock(Instant);
impl Clock for FrozenClock {
    fn now(&self) -> TimePoint {
        TimePoint { wall: SystemTime::now(), mono: self.0 }
    }
}

proptest! {
    #[test]
    fn selector_agrees_with_itself(trace_id: u64, rate in 0.0f64..=1.0) {
        let first = selector::keep(trace_id, rate);
        let second = selector::keep(trace_id, rate);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn selector_is_monotone_in_rate(trace_id: u64, low in 0.0f64..=1.0, delta in 0.0f64..=1.0) {
        let high = (low + delta).min(1.0);
        if selector::keep(trace_id, low) {
            prop_assert!(selector::keep(trace_id, high));
        }
    }

    #[test]
    fn trace_emits_exactly_one_batch_regardless_of_span_count(span_count in 1usize..20) {
        let rules_sampler = RulesSampler::new(
            vec![Rule::new(None, None, 1.0)],
            PrioritySampler::new(),
            TokenBucketLimiter::new(1_000, Duration::from_secs(1), 1_000),
        );
        let writer = Arc::new(CollectingWriter { batches: Mutex::new(Vec::new()) });
        let buffer = WritingSpanBuffer::new(
            BufferOptions::default(),
            rules_sampler,
            writer.clone(),
            Arc::new(NullLogger),
            Arc::new(FrozenClock(Instant::now())),
        );

        let trace_id = 1;
        for span_id in 1..=span_count as u64 {
            buffer.register_span(SpanContext::new(trace_id, span_id));
        }
        for span_id in 1..=span_count as u64 {
            let parent = if span_id == 1 { 0 } else { span_id - 1 };
            buffer.finish_span(SpanData::new(trace_id, span_id, parent, "svc", "op"));
        }

        let batches = writer.batches.lock().unwrap();
        prop_assert_eq!(batches.len(), 1);
        prop_assert_eq!(batches[0].len(), span_count);
    }

    #[test]
    fn exactly_the_roots_receive_sampling_priority_metric(
        non_root_count in 0usize..10,
    ) {
        let rules_sampler = RulesSampler::new(
            vec![Rule::new(None, None, 1.0)],
            PrioritySampler::new(),
            TokenBucketLimiter::new(1_000, Duration::from_secs(1), 1_000),
        );
        let writer = Arc::new(CollectingWriter { batches: Mutex::new(Vec::new()) });
        let buffer = WritingSpanBuffer::new(
            BufferOptions::default(),
            rules_sampler,
            writer.clone(),
            Arc::new(NullLogger),
            Arc::new(FrozenClock(Instant::now())),
        );

        let trace_id = 1;
        buffer.register_span(SpanContext::new(trace_id, 1));
        for span_id in 2..=(non_root_count as u64 + 1) {
            buffer.register_span(SpanContext::new(trace_id, span_id));
        }
        for span_id in 2..=(non_root_count as u64 + 1) {
            buffer.finish_span(SpanData::new(trace_id, span_id, 1, "svc", "child"));
        }
        buffer.finish_span(SpanData::new(trace_id, 1, 0, "svc", "root"));

        let batches = writer.batches.lock().unwrap();
        let batch = &batches[0];
        let roots = batch.iter().filter(|s| s.metrics.contains_key("_sampling_priority_v1")).count();
        prop_assert_eq!(roots, 1);
        prop_assert_eq!(batch.len(), non_root_count + 1);
    }
}

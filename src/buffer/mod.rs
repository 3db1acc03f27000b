//! The concurrent pending-trace registry: aggregates a trace's spans until
//! all of them have finished, then stamps sampling metadata and hands the
//! batch to the writer exactly once.

pub mod finisher;
pub mod pending_trace;
pub mod writing_span_buffer;

pub use pending_trace::{PendingTrace, PrioritySource};
pub use writing_span_buffer::{BufferOptions, WritingSpanBuffer};

//! Trace sampling and span-buffering core
//!
//! This crate implements the part of a distributed-tracing client that decides,
//! per trace, whether a trace is reported to a collector and at what priority,
//! and that aggregates the spans of a trace so the decision can be stamped onto
//! it exactly once before it leaves the process.
//!
//! # Architecture
//!
//! * `span` - wire-agnostic span/context data types and the sampling priority enum
//! * `sampling` - the three-layer sampling policy: selector, limiter, priority
//!   sampler, rules sampler
//! * `buffer` - the concurrent pending-trace registry and the writing span buffer
//! * `collaborators` - the `Writer`, `Logger` and `Clock` capability traits and
//!   their default implementations
//! * `config` - parsing of sampling rules and agent priority tables
//! * `metrics` - internal Prometheus diagnostics for the core itself
//! * `error` - the crate-wide error type

/// Crate-wide error type and `Result` alias
pub mod error;

/// Span and span-context data types shared by every other module
pub mod span;

/// The sampling policy: consistent selector, token-bucket limiter, priority
/// sampler and rules sampler
pub mod sampling;

/// The pending-trace aggregator and the writing span buffer
pub mod buffer;

/// External collaborator traits: `Writer`, `Logger`, `Clock`
pub mod collaborators;

/// Configuration parsing for sampling rules, the agent priority table and
/// buffer options
pub mod config;

/// Internal Prometheus metrics for the core's own health
pub mod metrics;

pub use error::{Error, Result};
pub use span::{SamplingPriority, SpanContext, SpanData};
pub use buffer::WritingSpanBuffer;

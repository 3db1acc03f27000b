//! Crate-wide error type.
//!
//! The core itself never returns an error from the hot path (register/finish
//! are infallible by design, see `buffer::writing_span_buffer`); this type is
//! reserved for the configuration loader, which runs off the hot path and is
//! explicitly allowed to fail loudly.

use derive_more::{Display, Error, From};

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, crate::Error>;

/// Errors surfaced by configuration parsing.
///
/// Never constructed by `buffer` or `sampling` once a `Config` has been
/// loaded successfully; those modules work with already-validated types.
#[derive(Debug, Display, From, Error)]
pub enum Error {
    /// A `sampling_rules` or agent-priority-table entry failed JSON parsing.
    Json(serde_json::Error),
    /// A rule's `name`/`service` pattern is not a valid regular expression.
    InvalidPattern(regex::Error),
    /// A rule's `sample_rate` (or a configured priority-sampler rate) is
    /// outside `[0, 1]`.
    #[display(fmt = "sample rate {_0} outside [0, 1]")]
    RateOutOfRange(#[error(ignore)] f64),
    /// The agent priority table or rules list was not the shape the loader
    /// expects (e.g. not a JSON object/array).
    #[display(fmt = "malformed config: {_0}")]
    Config(#[error(ignore)] String),
}

//! The sampler-result shape threaded from samplers into the pending-trace
//! finisher, carrying the rates that get stamped onto the root span.

use crate::span::SamplingPriority;

/// Rates and the resulting priority from a single sampling pass. A field
/// value of `NaN` means "not applicable" (e.g. `limiter_rate` is `NaN` when
/// a rule dropped the trace before the limiter was ever consulted) and such
/// fields are skipped when stamping span metrics.
#[derive(Debug, Clone, Copy)]
pub struct SampleResult {
    pub rule_rate: f64,
    pub limiter_rate: f64,
    pub priority_rate: f64,
    pub sampling_priority: Option<SamplingPriority>,
}

impl Default for SampleResult {
    fn default() -> Self {
        Self {
            rule_rate: f64::NAN,
            limiter_rate: f64::NAN,
            priority_rate: f64::NAN,
            sampling_priority: None,
        }
    }
}

impl SampleResult {
    pub fn new() -> Self {
        Self::default()
    }
}

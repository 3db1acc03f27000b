//! User rule evaluation, layered over the priority sampler and limiter.

use std::time::Instant;

use regex::Regex;

use super::limiter::TokenBucketLimiter;
use super::priority_sampler::PrioritySampler;
use super::result::SampleResult;
use super::selector;
use crate::span::SamplingPriority;

/// A single user-authored sampling rule. Absent patterns match anything;
/// present patterns are compiled once at construction, never at match time.
pub struct Rule {
    name_pattern: Option<Regex>,
    service_pattern: Option<Regex>,
    rate: f64,
}

impl Rule {
    pub fn new(name_pattern: Option<Regex>, service_pattern: Option<Regex>, rate: f64) -> Self {
        Self { name_pattern, service_pattern, rate }
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    fn matches(&self, service: &str, name: &str) -> bool {
        let name_ok = self.name_pattern.as_ref().map_or(true, |p| p.is_match(name));
        let service_ok = self.service_pattern.as_ref().map_or(true, |p| p.is_match(service));
        name_ok && service_ok
    }
}

/// Evaluates user rules first, falling through to the priority sampler when
/// none match. Owns the limiter that paces rule-matched keeps.
pub struct RulesSampler {
    rules: Vec<Rule>,
    priority_sampler: PrioritySampler,
    limiter: TokenBucketLimiter,
}

impl RulesSampler {
    pub fn new(rules: Vec<Rule>, priority_sampler: PrioritySampler, limiter: TokenBucketLimiter) -> Self {
        Self { rules, priority_sampler, limiter }
    }

    /// Returns the rate of the first rule whose patterns both match, in
    /// declaration order, or `None` if no rule matches.
    pub fn match_rule(&self, service: &str, name: &str) -> Option<f64> {
        self.rules.iter().find(|rule| rule.matches(service, name)).map(Rule::rate)
    }

    pub fn sample(&self, env: &str, service: &str, name: &str, trace_id: u64, now: Instant) -> SampleResult {
        let Some(rate) = self.match_rule(service, name) else {
            return self.priority_sampler.sample(env, service, trace_id);
        };

        if !selector::keep(trace_id, rate) {
            return SampleResult {
                rule_rate: rate,
                sampling_priority: Some(SamplingPriority::UserDrop),
                ..SampleResult::new()
            };
        }

        let admission = self.limiter.allow(now);
        let sampling_priority = if admission.admitted {
            SamplingPriority::UserKeep
        } else {
            SamplingPriority::UserDrop
        };

        SampleResult {
            rule_rate: rate,
            limiter_rate: admission.effective_rate,
            sampling_priority: Some(sampling_priority),
            ..SampleResult::new()
        }
    }
}

//! Three-layer sampling: user rules, a token-bucket limiter, and a
//! dynamically reconfigured per-(service,env) priority sampler.

pub mod limiter;
pub mod priority_sampler;
pub mod result;
pub mod rules_sampler;
pub mod selector;

pub use limiter::{LimiterResult, TokenBucketLimiter};
pub use priority_sampler::PrioritySampler;
pub use result::SampleResult;
pub use rules_sampler::{Rule, RulesSampler};

//! Priority sampler: a `(service,env) -> rate` table refreshed asynchronously
//! from the agent, consulted whenever no user rule matched.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::result::SampleResult;
use super::selector;
use crate::span::SamplingPriority;

/// Sentinel key under which the default (fallback) rate is configured.
const DEFAULT_RATE_KEY: &str = "service:,env:";

struct Table {
    rates: HashMap<String, f64>,
    default_rate: f64,
}

/// Holds the `(service,env) -> rate` mapping reported by the agent and
/// samples traces against it.
///
/// `configure` swaps the whole table behind an `Arc`, so a `sample` call in
/// flight on another thread always sees either the entirely-old or the
/// entirely-new table, never a partial update.
pub struct PrioritySampler {
    table: RwLock<Arc<Table>>,
}

impl Default for PrioritySampler {
    fn default() -> Self {
        Self::new()
    }
}

impl PrioritySampler {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Arc::new(Table {
                rates: HashMap::new(),
                default_rate: 1.0,
            })),
        }
    }

    /// Atomically replaces the `(service,env) -> rate` mapping. The sentinel
    /// key `"service:,env:"` sets the default rate rather than being stored
    /// as a per-key entry.
    pub fn configure(&self, map: &HashMap<String, f64>) {
        let mut rates = HashMap::with_capacity(map.len());
        let mut default_rate = self.table.read().default_rate;
        for (key, &rate) in map {
            if key == DEFAULT_RATE_KEY {
                default_rate = rate;
            } else {
                rates.insert(key.clone(), rate);
            }
        }
        *self.table.write() = Arc::new(Table { rates, default_rate });
    }

    /// Samples `trace_id` against the rate configured for `(service, env)`,
    /// falling back to the default rate when the key is unconfigured.
    pub fn sample(&self, env: &str, service: &str, trace_id: u64) -> SampleResult {
        let table = self.table.read().clone();
        let key = format!("service:{service},env:{env}");
        let rate = table.rates.get(&key).copied().unwrap_or(table.default_rate);

        let sampling_priority = if selector::keep(trace_id, rate) {
            SamplingPriority::SamplerKeep
        } else {
            SamplingPriority::SamplerDrop
        };

        SampleResult {
            priority_rate: rate,
            sampling_priority: Some(sampling_priority),
            ..SampleResult::new()
        }
    }
}

//! Token-bucket limiter.
//!
//! Paces the rate at which "kept" decisions from the rules sampler are
//! admitted, independent of the hash-based keep/drop decision itself. Tokens
//! refill lazily - there is no background thread - based on elapsed
//! monotonic time since the last refill.

use std::time::Instant;

use parking_lot::Mutex;

/// Result of a single `TokenBucketLimiter::allow` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LimiterResult {
    pub admitted: bool,
    /// Admit/attempt ratio over the trailing window. Not used for control,
    /// only reported as the `_dd.limit_psr` span metric.
    pub effective_rate: f64,
}

struct State {
    tokens: f64,
    last_refill: Instant,
    /// Trailing window of recent `(admitted, count)` buckets, one bucket per
    /// refresh interval, used only to compute `effective_rate`.
    window: Vec<(u64, u64)>,
    window_cursor: usize,
    window_started: Instant,
}

/// Paces admission at `tokens_per_refresh` tokens every `refresh_interval`,
/// capped at `max_tokens`. Thread-safe via an internal mutex - callers never
/// need external synchronisation.
pub struct TokenBucketLimiter {
    max_tokens: f64,
    refresh_interval: std::time::Duration,
    tokens_per_refresh: f64,
    /// Number of refresh intervals folded into the effective-rate window.
    /// Fixed at 10, satisfying ">= one refresh interval" while smoothing
    /// short bursts (see DESIGN.md for the rationale).
    window_buckets: usize,
    state: Mutex<State>,
}

impl TokenBucketLimiter {
    pub fn new(max_tokens: u32, refresh_interval: std::time::Duration, tokens_per_refresh: u32) -> Self {
        let now = Instant::now();
        let window_buckets = 10;
        Self {
            max_tokens: max_tokens as f64,
            refresh_interval,
            tokens_per_refresh: tokens_per_refresh as f64,
            window_buckets,
            state: Mutex::new(State {
                tokens: max_tokens as f64,
                last_refill: now,
                window: vec![(0, 0); window_buckets],
                window_cursor: 0,
                window_started: now,
            }),
        }
    }

    /// Attempts to consume one token at `now`. `now` must come from a
    /// monotonic clock; a `now` earlier than the last call is treated as "no
    /// time passed" rather than refilling negatively.
    pub fn allow(&self, now: Instant) -> LimiterResult {
        let mut state = self.state.lock();
        self.refill(&mut state, now);
        self.roll_window(&mut state, now);

        let admitted = state.tokens >= 1.0;
        if admitted {
            state.tokens -= 1.0;
        }

        let cursor = state.window_cursor;
        state.window[cursor].1 += 1;
        if admitted {
            state.window[cursor].0 += 1;
        }

        let (admitted_total, attempted_total) = state
            .window
            .iter()
            .fold((0u64, 0u64), |(a, b), &(x, y)| (a + x, b + y));
        let effective_rate = if attempted_total == 0 {
            1.0
        } else {
            admitted_total as f64 / attempted_total as f64
        };

        LimiterResult { admitted, effective_rate }
    }

    fn refill(&self, state: &mut State, now: Instant) {
        if now <= state.last_refill {
            // Clock went backwards (or didn't move): no refill, no panic.
            return;
        }
        let elapsed = now.duration_since(state.last_refill);
        let refills = elapsed.as_secs_f64() / self.refresh_interval.as_secs_f64();
        if refills > 0.0 {
            state.tokens = (state.tokens + refills * self.tokens_per_refresh).min(self.max_tokens);
            state.last_refill = now;
        }
    }

    fn roll_window(&self, state: &mut State, now: Instant) {
        let elapsed = now.saturating_duration_since(state.window_started);
        let buckets_elapsed = (elapsed.as_secs_f64() / self.refresh_interval.as_secs_f64()) as usize;
        if buckets_elapsed == 0 {
            return;
        }
        let to_clear = buckets_elapsed.min(self.window_buckets);
        for step in 1..=to_clear {
            let idx = (state.window_cursor + step) % self.window_buckets;
            state.window[idx] = (0, 0);
        }
        state.window_cursor = (state.window_cursor + to_clear) % self.window_buckets;
        state.window_started = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn admits_up_to_capacity_then_blocks() {
        let limiter = TokenBucketLimiter::new(1, Duration::from_secs(1), 1);
        let now = Instant::now();
        assert!(limiter.allow(now).admitted);
        assert!(!limiter.allow(now).admitted);
    }

    #[test]
    fn refills_after_interval() {
        let limiter = TokenBucketLimiter::new(1, Duration::from_millis(50), 1);
        let t0 = Instant::now();
        assert!(limiter.allow(t0).admitted);
        assert!(!limiter.allow(t0).admitted);
        let t1 = t0 + Duration::from_millis(60);
        assert!(limiter.allow(t1).admitted);
    }

    #[test]
    fn capped_at_max_tokens() {
        let limiter = TokenBucketLimiter::new(2, Duration::from_millis(10), 5);
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_secs(10);
        // Even though refill math would produce far more than 2 tokens,
        // the bucket caps at max_tokens.
        assert!(limiter.allow(t1).admitted);
        assert!(limiter.allow(t1).admitted);
        assert!(!limiter.allow(t1).admitted);
    }

    #[test]
    fn clock_going_backwards_does_not_refill() {
        let limiter = TokenBucketLimiter::new(1, Duration::from_millis(10), 1);
        let t0 = Instant::now();
        assert!(limiter.allow(t0).admitted);
        assert!(!limiter.allow(t0).admitted);
        // Same instant again ("backwards" relative to internal state after
        // rounding) must not admit a second time.
        assert!(!limiter.allow(t0).admitted);
    }

    #[test]
    fn effective_rate_reflects_admit_ratio() {
        let limiter = TokenBucketLimiter::new(1, Duration::from_secs(1), 1);
        let now = Instant::now();
        let first = limiter.allow(now);
        assert!(first.admitted);
        assert_eq!(first.effective_rate, 1.0);
        let second = limiter.allow(now);
        assert!(!second.admitted);
        assert!(second.effective_rate < 1.0);
    }
}

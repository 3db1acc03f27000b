//! Consistent trace selector.
//!
//! Maps a trace id and a rate to a keep/drop decision via a fixed
//! multiplicative hash, so independent processes that see the same trace id
//! agree on the decision without coordinating. The hash and the comparison
//! must stay bit-for-bit stable across library versions: changing either
//! would silently flip sampling outcomes for traces already in flight across
//! a fleet running mixed versions.

/// Multiplicative hash constant. Chosen to spread trace ids uniformly across
/// `u64` space; this exact constant is part of the wire-level agreement
/// between peers and must never change.
const KNUTH_FACTOR: u64 = 1_111_111_111_111_111_111;

/// Returns `true` ("keep") for a fraction `rate` of trace ids, deterministically.
///
/// `rate` is clamped to `[0.0, 1.0]`; values outside that range are treated
/// as the nearest boundary rather than panicking, since this sits on every
/// sampling hot path.
pub fn keep(trace_id: u64, rate: f64) -> bool {
    if rate >= 1.0 {
        return true;
    }
    if rate <= 0.0 {
        return false;
    }
    let hashed = trace_id.wrapping_mul(KNUTH_FACTOR);
    let threshold = (rate * (u64::MAX as f64)) as u64;
    hashed < threshold
}

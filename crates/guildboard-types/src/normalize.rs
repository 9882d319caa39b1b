//! Normalization rules for values crossing from the data store into JSON.
//!
//! Entity identifiers are snowflakes: 64-bit integers that do not survive a
//! round trip through a JSON number. They travel as strings, always.
//! Counters stay numeric but are clamped to the 53-bit safe-integer range,
//! and derived floats get explicit two-decimal rounding.

use tracing::warn;

/// Largest integer a JSON number can carry without precision loss (2^53 - 1).
pub const MAX_SAFE_COUNT: i64 = (1 << 53) - 1;

/// Fallback label for a user row whose profile is missing from the store.
pub const UNKNOWN_USER: &str = "Unknown User";

/// Fallback label for a channel row whose metadata is missing.
pub const UNKNOWN_CHANNEL: &str = "Unknown Channel";

/// Generic fallback for missing labels (activity names, types, prizes).
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Clamp an additive counter into the JSON-safe integer range. Negative
/// counts never occur upstream and clamp to zero; overflow past 2^53 is a
/// store defect, clamped rather than emitted lossy.
pub fn safe_count(n: i64) -> i64 {
    if n > MAX_SAFE_COUNT {
        warn!(value = n, "counter exceeds JSON safe-integer range, clamping");
    }
    n.clamp(0, MAX_SAFE_COUNT)
}

/// Round a derived float (hours, minutes, averages) to two decimals.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_clamp_to_the_safe_range() {
        assert_eq!(safe_count(42), 42);
        assert_eq!(safe_count(-3), 0);
        assert_eq!(safe_count(i64::MAX), MAX_SAFE_COUNT);
        assert_eq!(safe_count(MAX_SAFE_COUNT), MAX_SAFE_COUNT);
    }

    #[test]
    fn rounding_is_two_decimals() {
        assert_eq!(round2(1.005), 1.0); // binary representation of 1.005 is just under
        assert_eq!(round2(2.675_4), 2.68);
        assert_eq!(round2(0.0), 0.0);
        assert_eq!(round2(123.456_789), 123.46);
    }
}

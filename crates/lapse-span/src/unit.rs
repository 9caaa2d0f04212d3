use std::fmt;

/// Granularity of a [`TimeSpan`](crate::TimeSpan) or a clock reading.
///
/// Variants are declared finest first, so the derived ordering matches
/// granularity: `Nanoseconds < Microseconds < ... < Days`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum TimeUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// All units, finest to coarsest.
    pub const ALL: [TimeUnit; 7] = [
        TimeUnit::Nanoseconds,
        TimeUnit::Microseconds,
        TimeUnit::Milliseconds,
        TimeUnit::Seconds,
        TimeUnit::Minutes,
        TimeUnit::Hours,
        TimeUnit::Days,
    ];

    /// Length of one unit in nanoseconds. Fits comfortably in `i64` for `Days`.
    #[inline]
    pub const fn nanos_per_unit(self) -> i64 {
        match self {
            TimeUnit::Nanoseconds => 1,
            TimeUnit::Microseconds => 1_000,
            TimeUnit::Milliseconds => 1_000_000,
            TimeUnit::Seconds => 1_000_000_000,
            TimeUnit::Minutes => 60_000_000_000,
            TimeUnit::Hours => 3_600_000_000_000,
            TimeUnit::Days => 86_400_000_000_000,
        }
    }

    /// Short suffix used by the simple text format (`45s`, `2d`).
    pub const fn suffix(self) -> &'static str {
        match self {
            TimeUnit::Nanoseconds => "ns",
            TimeUnit::Microseconds => "us",
            TimeUnit::Milliseconds => "ms",
            TimeUnit::Seconds => "s",
            TimeUnit::Minutes => "min",
            TimeUnit::Hours => "h",
            TimeUnit::Days => "d",
        }
    }

    /// Resolves a unit word as accepted by the text format.
    pub fn from_token(token: &str) -> Option<TimeUnit> {
        Some(match token {
            "ns" | "nanos" | "nanosecond" | "nanoseconds" => TimeUnit::Nanoseconds,
            "us" | "µs" | "micros" | "microsecond" | "microseconds" => TimeUnit::Microseconds,
            "ms" | "millis" | "millisecond" | "milliseconds" => TimeUnit::Milliseconds,
            "s" | "sec" | "secs" | "second" | "seconds" => TimeUnit::Seconds,
            "m" | "min" | "mins" | "minute" | "minutes" => TimeUnit::Minutes,
            "h" | "hour" | "hours" => TimeUnit::Hours,
            "d" | "day" | "days" => TimeUnit::Days,
            _ => return None,
        })
    }

    /// The next coarser unit, if any.
    pub fn coarser(self) -> Option<TimeUnit> {
        TimeUnit::ALL.get(self as usize + 1).copied()
    }

    /// The next finer unit, if any.
    pub fn finer(self) -> Option<TimeUnit> {
        (self as usize).checked_sub(1).map(|i| TimeUnit::ALL[i])
    }

    /// `self` followed by every coarser unit, in order.
    ///
    /// This is the search sequence for overflow escalation.
    pub fn and_coarser(self) -> impl Iterator<Item = TimeUnit> {
        TimeUnit::ALL.into_iter().skip(self as usize)
    }

    /// Converts `value` from `self` to `target`.
    ///
    /// Returns `None` if a conversion to a finer unit overflows. Conversions to
    /// a coarser unit truncate toward zero and never fail.
    pub fn convert_checked(self, value: i64, target: TimeUnit) -> Option<i64> {
        if target < self {
            value.checked_mul(self.nanos_per_unit() / target.nanos_per_unit())
        } else {
            Some(value / (target.nanos_per_unit() / self.nanos_per_unit()))
        }
    }

    /// Like [`convert_checked`](Self::convert_checked), clamping to
    /// `i64::MIN`/`i64::MAX` instead of failing.
    pub fn convert_saturated(self, value: i64, target: TimeUnit) -> i64 {
        self.convert_checked(value, target)
            .unwrap_or(if value < 0 { i64::MIN } else { i64::MAX })
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── ordering ──────────────────────────────────────────────────────────

    #[test]
    fn units_ordered_finest_first() {
        for pair in TimeUnit::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].nanos_per_unit() < pair[1].nanos_per_unit());
        }
    }

    #[test]
    fn coarser_and_finer_are_inverse() {
        assert_eq!(TimeUnit::Seconds.coarser(), Some(TimeUnit::Minutes));
        assert_eq!(TimeUnit::Minutes.finer(), Some(TimeUnit::Seconds));
        assert_eq!(TimeUnit::Days.coarser(), None);
        assert_eq!(TimeUnit::Nanoseconds.finer(), None);
    }

    #[test]
    fn and_coarser_starts_at_self() {
        let units: Vec<_> = TimeUnit::Hours.and_coarser().collect();
        assert_eq!(units, vec![TimeUnit::Hours, TimeUnit::Days]);
    }

    // ── conversion ────────────────────────────────────────────────────────

    #[test]
    fn convert_to_finer_multiplies() {
        assert_eq!(TimeUnit::Minutes.convert_checked(2, TimeUnit::Seconds), Some(120));
        assert_eq!(TimeUnit::Days.convert_checked(1, TimeUnit::Hours), Some(24));
    }

    #[test]
    fn convert_to_coarser_truncates_toward_zero() {
        assert_eq!(TimeUnit::Seconds.convert_checked(119, TimeUnit::Minutes), Some(1));
        assert_eq!(TimeUnit::Seconds.convert_checked(-119, TimeUnit::Minutes), Some(-1));
    }

    #[test]
    fn convert_overflow_detected() {
        assert_eq!(TimeUnit::Days.convert_checked(i64::MAX, TimeUnit::Nanoseconds), None);
        assert_eq!(TimeUnit::Days.convert_saturated(i64::MAX, TimeUnit::Nanoseconds), i64::MAX);
        assert_eq!(TimeUnit::Days.convert_saturated(i64::MIN, TimeUnit::Nanoseconds), i64::MIN);
    }

    #[test]
    fn tokens_resolve() {
        assert_eq!(TimeUnit::from_token("min"), Some(TimeUnit::Minutes));
        assert_eq!(TimeUnit::from_token("m"), Some(TimeUnit::Minutes));
        assert_eq!(TimeUnit::from_token("days"), Some(TimeUnit::Days));
        assert_eq!(TimeUnit::from_token("fortnight"), None);
    }
}

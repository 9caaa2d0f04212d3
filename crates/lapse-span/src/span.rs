use core::cmp::Ordering;
use core::hash::{Hash, Hasher};
use std::time::Duration;

use crate::error::SpanError;
use crate::unit::TimeUnit;

/// An immutable elapsed-time value: a signed magnitude in some [`TimeUnit`].
///
/// Equality, ordering and hashing are unit-independent:
/// `TimeSpan::of(60, Seconds) == TimeSpan::of(1, Minutes)`.
///
/// Arithmetic is carried out in the finer of the operands' units. When a
/// result does not fit an `i64` there, the operation is repeated in the next
/// coarser unit (losing the finer digits) until it fits; only when even
/// [`TimeUnit::Days`] overflows does it fail with [`SpanError::Overflow`].
#[derive(Debug, Copy, Clone)]
pub struct TimeSpan {
    span: i64,
    unit: TimeUnit,
}

impl TimeSpan {
    #[inline]
    pub const fn of(span: i64, unit: TimeUnit) -> Self {
        Self { span, unit }
    }

    /// The zero span.
    ///
    /// Stored in the coarsest unit so that summing with it never forces a
    /// finer unit onto the other operand.
    #[inline]
    pub const fn empty() -> Self {
        Self::of(0, TimeUnit::Days)
    }

    pub const fn of_nanos(n: i64) -> Self { Self::of(n, TimeUnit::Nanoseconds) }
    pub const fn of_micros(n: i64) -> Self { Self::of(n, TimeUnit::Microseconds) }
    pub const fn of_millis(n: i64) -> Self { Self::of(n, TimeUnit::Milliseconds) }
    pub const fn of_seconds(n: i64) -> Self { Self::of(n, TimeUnit::Seconds) }
    pub const fn of_minutes(n: i64) -> Self { Self::of(n, TimeUnit::Minutes) }
    pub const fn of_hours(n: i64) -> Self { Self::of(n, TimeUnit::Hours) }
    pub const fn of_days(n: i64) -> Self { Self::of(n, TimeUnit::Days) }

    /// Stored magnitude, in [`unit`](Self::unit).
    #[inline]
    pub const fn magnitude(&self) -> i64 {
        self.span
    }

    #[inline]
    pub const fn unit(&self) -> TimeUnit {
        self.unit
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.span == 0
    }

    // ── conversion ────────────────────────────────────────────────────────

    #[inline]
    fn checked_in(&self, unit: TimeUnit) -> Option<i64> {
        self.unit.convert_checked(self.span, unit)
    }

    /// The value in `unit`, failing if it does not fit an `i64`.
    pub fn get_checked(&self, unit: TimeUnit) -> Result<i64, SpanError> {
        self.checked_in(unit)
            .ok_or(SpanError::Overflow { operation: "conversion" })
    }

    /// The value in `unit`, clamped to the `i64` range.
    pub fn get_saturated(&self, unit: TimeUnit) -> i64 {
        self.unit.convert_saturated(self.span, unit)
    }

    pub fn to_checked(&self, unit: TimeUnit) -> Result<TimeSpan, SpanError> {
        self.get_checked(unit).map(|v| Self::of(v, unit))
    }

    pub fn to_saturated(&self, unit: TimeUnit) -> TimeSpan {
        Self::of(self.get_saturated(unit), unit)
    }

    /// Converts to `unit`, or to the finest coarser unit the value fits in.
    ///
    /// The result unit is never coarser than the stored unit, since a
    /// conversion to the stored unit itself always succeeds.
    pub fn to_if_possible(&self, unit: TimeUnit) -> TimeSpan {
        escalate("conversion", unit, |u| self.checked_in(u)).unwrap_or(*self)
    }

    // ── arithmetic ────────────────────────────────────────────────────────

    /// `a + b`, escalating to coarser units on overflow.
    pub fn sum(a: TimeSpan, b: TimeSpan) -> Result<TimeSpan, SpanError> {
        escalate("sum", a.unit.min(b.unit), |u| {
            a.checked_in(u)?.checked_add(b.checked_in(u)?)
        })
    }

    /// Sums all spans left to right with [`sum`](Self::sum). An empty
    /// iterator yields [`empty`](Self::empty).
    pub fn sum_all<I>(spans: I) -> Result<TimeSpan, SpanError>
    where
        I: IntoIterator<Item = TimeSpan>,
    {
        spans.into_iter().try_fold(Self::empty(), Self::sum)
    }

    /// `a - b`, escalating to coarser units on overflow.
    pub fn difference(a: TimeSpan, b: TimeSpan) -> Result<TimeSpan, SpanError> {
        escalate("difference", a.unit.min(b.unit), |u| {
            a.checked_in(u)?.checked_sub(b.checked_in(u)?)
        })
    }

    /// Scales by a non-negative factor, escalating to coarser units on overflow.
    pub fn multiply(&self, factor: i64) -> Result<TimeSpan, SpanError> {
        if factor < 0 {
            return Err(SpanError::InvalidArgument(format!("negative factor {factor}")));
        }
        escalate("multiplication", self.unit, |u| self.checked_in(u)?.checked_mul(factor))
    }

    /// Integer division (toward zero) in the stored unit.
    pub fn divide(&self, divisor: i64) -> Result<TimeSpan, SpanError> {
        if divisor < 0 {
            return Err(SpanError::InvalidArgument(format!("negative divisor {divisor}")));
        }
        if divisor == 0 {
            return Err(SpanError::InvalidArgument("division by zero".into()));
        }
        Ok(Self::of(self.span / divisor, self.unit))
    }

    // ── std interop ───────────────────────────────────────────────────────

    /// Converts to a [`Duration`]; `None` for negative spans or spans beyond
    /// `Duration::MAX`.
    pub fn to_std(&self) -> Option<Duration> {
        if self.span < 0 {
            return None;
        }
        let nanos = i128::from(self.span) * i128::from(self.unit.nanos_per_unit());
        let secs = u64::try_from(nanos / 1_000_000_000).ok()?;
        Some(Duration::new(secs, (nanos % 1_000_000_000) as u32))
    }
}

/// Runs `op` in `start`, then in each coarser unit, until it yields a value.
fn escalate<F>(operation: &'static str, start: TimeUnit, mut op: F) -> Result<TimeSpan, SpanError>
where
    F: FnMut(TimeUnit) -> Option<i64>,
{
    for unit in start.and_coarser() {
        if let Some(v) = op(unit) {
            if unit != start {
                log::trace!("time span {operation} escalated from {start} to {unit}");
            }
            return Ok(TimeSpan::of(v, unit));
        }
    }
    Err(SpanError::Overflow { operation })
}

impl From<Duration> for TimeSpan {
    /// Picks the finest unit the duration fits in.
    fn from(d: Duration) -> Self {
        let nanos = d.as_nanos();
        for unit in TimeUnit::ALL {
            if let Ok(v) = i64::try_from(nanos / unit.nanos_per_unit() as u128) {
                return TimeSpan::of(v, unit);
            }
        }
        // u64 seconds always fit in i64 days.
        TimeSpan::of((d.as_secs() / 86_400) as i64, TimeUnit::Days)
    }
}

impl Default for TimeSpan {
    fn default() -> Self {
        Self::empty()
    }
}

// ── unit-independent comparison ───────────────────────────────────────────

impl PartialEq for TimeSpan {
    fn eq(&self, other: &Self) -> bool {
        let unit = self.unit.min(other.unit);
        match (self.checked_in(unit), other.checked_in(unit)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for TimeSpan {}

impl Ord for TimeSpan {
    fn cmp(&self, other: &Self) -> Ordering {
        let unit = self.unit.min(other.unit);
        match (self.checked_in(unit), other.checked_in(unit)) {
            (Some(a), Some(b)) => a.cmp(&b),
            // Overflowing in the finer unit means a strictly larger magnitude,
            // so the sign of the overflowing operand decides.
            (None, _) => 0.cmp(&self.span).reverse(),
            (_, None) => other.span.cmp(&0).reverse(),
        }
    }
}

impl PartialOrd for TimeSpan {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for TimeSpan {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Equal spans truncate to the same number of days.
        self.get_saturated(TimeUnit::Days).hash(state);
    }
}

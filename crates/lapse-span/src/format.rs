//! Text rendering of [`TimeSpan`] values and selection of the process-wide
//! default display format.

use std::fmt::{self, Write as _};
use std::str::FromStr;
use std::sync::Once;

use state::InitCell;

use crate::error::SpanError;
use crate::span::TimeSpan;
use crate::unit::TimeUnit;

/// Environment variable consulted when no format was configured explicitly.
pub const FORMAT_ENV_VAR: &str = "LAPSE_SPAN_FORMAT";

/// How `Display` renders a [`TimeSpan`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum DisplayFormat {
    /// `<magnitude><suffix>` in the stored unit, e.g. `45s`.
    #[default]
    Simple,
    /// Cascading years/days/hours/minutes/seconds, e.g. `1d 02h 05min`.
    HumanReadableLarge,
}

impl FromStr for DisplayFormat {
    type Err = SpanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SIMPLE" => Ok(DisplayFormat::Simple),
            "HUMAN_READABLE_LARGE" => Ok(DisplayFormat::HumanReadableLarge),
            _ => Err(SpanError::Config(format!("unknown time span format {s:?}"))),
        }
    }
}

impl fmt::Display for DisplayFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DisplayFormat::Simple => "SIMPLE",
            DisplayFormat::HumanReadableLarge => "HUMAN_READABLE_LARGE",
        })
    }
}

// ── default format ────────────────────────────────────────────────────────

static DEFAULT_FORMAT: InitCell<Result<DisplayFormat, SpanError>> = InitCell::new();
static WARN_ONCE: Once = Once::new();

/// Fixes the process-wide default format.
///
/// Only the first configuration (explicit or from the environment) takes
/// effect; returns `false` if the default was already fixed.
pub fn set_default_format(format: DisplayFormat) -> bool {
    DEFAULT_FORMAT.set(Ok(format))
}

/// Like [`set_default_format`], but takes the raw selector string.
///
/// An unrecognized selector is stored as-is and surfaces as a configuration
/// error from [`try_default_format`].
pub fn configure_default_format(selector: &str) -> bool {
    DEFAULT_FORMAT.set(selector.parse())
}

/// The process-wide default format, initializing it from
/// [`FORMAT_ENV_VAR`] on first use.
pub fn try_default_format() -> Result<DisplayFormat, SpanError> {
    DEFAULT_FORMAT
        .get_or_init(|| match std::env::var(FORMAT_ENV_VAR) {
            Ok(selector) => selector.parse(),
            Err(_) => Ok(DisplayFormat::default()),
        })
        .clone()
}

/// The default format, or [`DisplayFormat::Simple`] if the configured
/// selector is invalid.
pub fn default_format() -> DisplayFormat {
    try_default_format().unwrap_or_else(|e| {
        WARN_ONCE.call_once(|| log::warn!("{e}; falling back to {}", DisplayFormat::Simple));
        DisplayFormat::Simple
    })
}

// ── rendering ─────────────────────────────────────────────────────────────

/// Components of the large human-readable format, coarsest first, with their
/// length in seconds.
const LARGE_COMPONENTS: [(&str, u64); 5] = [
    ("y", 365 * 86_400),
    ("d", 86_400),
    ("h", 3_600),
    ("min", 60),
    ("s", 1),
];

impl TimeSpan {
    /// `<magnitude><suffix>` in the stored unit.
    pub fn format_simple(&self) -> String {
        format!("{}{}", self.magnitude(), self.unit().suffix())
    }

    /// Simple format after converting to `unit`, escalating to a coarser
    /// unit if the value does not fit.
    pub fn format_as(&self, unit: TimeUnit) -> String {
        self.to_if_possible(unit).format_simple()
    }

    /// Years, days, hours, minutes and seconds, down to the stored
    /// granularity (never finer than seconds).
    ///
    /// The leading non-zero component is unpadded; later ones are padded to
    /// two digits.
    pub fn format_human_readable_large(&self) -> String {
        let finest = self.unit().max(TimeUnit::Seconds);
        let finest_secs = (finest.nanos_per_unit() / TimeUnit::Seconds.nanos_per_unit()) as u64;
        let value = self.get_saturated(finest);

        let mut rest = value.unsigned_abs();
        let mut out = String::new();
        if value < 0 {
            out.push('-');
        }

        let components: Vec<_> = LARGE_COMPONENTS
            .iter()
            .filter(|(_, secs)| *secs >= finest_secs)
            .map(|&(suffix, secs)| (suffix, secs / finest_secs))
            .collect();

        let mut started = false;
        for (i, &(suffix, per)) in components.iter().enumerate() {
            let n = rest / per;
            rest %= per;
            let last = i + 1 == components.len();
            if started {
                let _ = write!(out, " {n:02}{suffix}");
            } else if n != 0 || last {
                let _ = write!(out, "{n}{suffix}");
                started = true;
            }
        }
        out
    }

    pub fn format(&self, format: DisplayFormat) -> String {
        match format {
            DisplayFormat::Simple => self.format_simple(),
            DisplayFormat::HumanReadableLarge => self.format_human_readable_large(),
        }
    }
}

impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(default_format()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_str;
    use TimeUnit::*;

    // ── simple ────────────────────────────────────────────────────────────

    #[test]
    fn simple_uses_stored_unit() {
        assert_eq!(TimeSpan::of(45, Seconds).format_simple(), "45s");
        assert_eq!(TimeSpan::of(2, Days).format_simple(), "2d");
        assert_eq!(TimeSpan::of(13, Minutes).format_simple(), "13min");
        assert_eq!(TimeSpan::of(-4, Milliseconds).format_simple(), "-4ms");
    }

    #[test]
    fn simple_round_trips_through_parser() {
        for unit in TimeUnit::ALL {
            for value in [0, 1, 59, 1_000, i64::MAX] {
                let span = TimeSpan::of(value, unit);
                assert_eq!(parse_str(&span.format_simple()).unwrap(), span, "{span:?}");
            }
        }
    }

    #[test]
    fn format_as_converts_then_escalates() {
        assert_eq!(TimeSpan::of(2, Minutes).format_as(Seconds), "120s");
        assert_eq!(TimeSpan::of(90, Seconds).format_as(Minutes), "1min");
        assert_eq!(TimeSpan::of(i64::MAX, Hours).format_as(Seconds), format!("{}h", i64::MAX));
    }

    // ── human readable ────────────────────────────────────────────────────

    #[test]
    fn large_cascades_components() {
        let span = TimeSpan::of(86_400 + 2 * 3_600 + 5 * 60 + 7, Seconds);
        assert_eq!(span.format_human_readable_large(), "1d 02h 05min 07s");
    }

    #[test]
    fn large_includes_years() {
        let span = TimeSpan::of(366, Days);
        assert_eq!(span.format_human_readable_large(), "1y 01d");
    }

    #[test]
    fn large_stops_at_stored_granularity() {
        assert_eq!(TimeSpan::of(125, Minutes).format_human_readable_large(), "2h 05min");
        assert_eq!(TimeSpan::of(26, Hours).format_human_readable_large(), "1d 02h");
    }

    #[test]
    fn large_sub_second_units_show_seconds() {
        assert_eq!(TimeSpan::of(61_500, Milliseconds).format_human_readable_large(), "1min 01s");
    }

    #[test]
    fn large_zero_and_negative() {
        assert_eq!(TimeSpan::of(0, Seconds).format_human_readable_large(), "0s");
        assert_eq!(TimeSpan::of(0, Minutes).format_human_readable_large(), "0min");
        assert_eq!(TimeSpan::of(-3_661, Seconds).format_human_readable_large(), "-1h 01min 01s");
    }

    // ── selector ──────────────────────────────────────────────────────────

    #[test]
    fn format_selector_parses() {
        assert_eq!("SIMPLE".parse::<DisplayFormat>(), Ok(DisplayFormat::Simple));
        assert_eq!(
            "human_readable_large".parse::<DisplayFormat>(),
            Ok(DisplayFormat::HumanReadableLarge)
        );
        assert!(matches!("FANCY".parse::<DisplayFormat>(), Err(SpanError::Config(_))));
    }

    #[test]
    fn explicit_format_ignores_default() {
        let span = TimeSpan::of(3_600, Seconds);
        assert_eq!(span.format(DisplayFormat::Simple), "3600s");
        assert_eq!(span.format(DisplayFormat::HumanReadableLarge), "1h 00min 00s");
    }
}

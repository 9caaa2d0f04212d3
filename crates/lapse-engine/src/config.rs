//! Process-wide timing configuration.
//!
//! Two selectors are read once and never change afterwards: the default
//! ticker used by [`Timer::new`](crate::time::Timer::new) and the default
//! display format of [`TimeSpan`](lapse_span::TimeSpan). Each is taken from
//! [`init_timing`] if it runs first, otherwise from the environment.

use std::sync::{Arc, Once};

use state::InitCell;

use crate::error::TimingError;
use crate::time::{Ticker, TickerKind, ticker_for};

/// Environment variable naming the default ticker (e.g. `WALLTIME_NANOS`).
pub const TICKER_ENV_VAR: &str = "LAPSE_TICKER";

pub use lapse_span::format::FORMAT_ENV_VAR;

/// Timing configuration.
///
/// Selectors are raw strings so that a bad value is reported where the
/// default is first needed, not here.
#[derive(Debug, Clone, Default)]
pub struct TimingConfig {
    /// One of `WALLTIME_MILLIS`, `WALLTIME_NANOS`, `THREAD_CPUTIME`,
    /// `PROCESS_CPUTIME`, `NONE`.
    pub ticker: Option<String>,
    /// One of `SIMPLE`, `HUMAN_READABLE_LARGE`.
    pub span_format: Option<String>,
}

static DEFAULT_TICKER: InitCell<Result<TickerKind, TimingError>> = InitCell::new();
static INIT: Once = Once::new();

/// Fixes the default ticker and display format.
///
/// Idempotent; only the first call has an effect, and only for selectors
/// that have not been read yet. Unset fields fall back to the environment.
pub fn init_timing(config: TimingConfig) {
    INIT.call_once(|| {
        if let Some(selector) = config.ticker {
            if !DEFAULT_TICKER.set(selector.parse()) {
                log::warn!("default ticker already in use; ignoring {selector:?}");
            }
        }
        if let Some(selector) = config.span_format {
            if !lapse_span::format::configure_default_format(&selector) {
                log::warn!("default span format already in use; ignoring {selector:?}");
            }
        }
        log::debug!(
            "timing configured: ticker={:?}, span format={:?}",
            default_ticker_kind(),
            lapse_span::format::try_default_format(),
        );
    });
}

/// The configured default ticker kind.
pub fn default_ticker_kind() -> Result<TickerKind, TimingError> {
    DEFAULT_TICKER
        .get_or_init(|| match std::env::var(TICKER_ENV_VAR) {
            Ok(selector) => selector.parse(),
            Err(_) => Ok(TickerKind::default()),
        })
        .clone()
}

/// The shared instance of the default ticker.
pub fn default_ticker() -> Result<Arc<dyn Ticker>, TimingError> {
    ticker_for(default_ticker_kind()?)
}

/// Reports any configuration problem up front instead of at first use.
pub fn check_config() -> Result<(), TimingError> {
    default_ticker()?;
    lapse_span::format::try_default_format()?;
    Ok(())
}

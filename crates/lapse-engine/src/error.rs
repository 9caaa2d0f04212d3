use std::fmt;

use lapse_span::SpanError;

use crate::time::TickerKind;

/// Errors raised by tickers, timers and timing configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimingError {
    /// Unrecognized ticker selector. Only affects timers that rely on the
    /// default ticker.
    Config(String),
    /// The platform cannot provide the requested clock.
    Unsupported { ticker: TickerKind, reason: String },
    /// Operation not valid in the timer's current state.
    IllegalState(&'static str),
    Span(SpanError),
}

impl fmt::Display for TimingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimingError::Config(msg) => write!(f, "timing configuration error: {msg}"),
            TimingError::Unsupported { ticker, reason } => {
                write!(f, "ticker {ticker} is not supported on this platform: {reason}")
            }
            TimingError::IllegalState(msg) => write!(f, "illegal timer state: {msg}"),
            TimingError::Span(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for TimingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TimingError::Span(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SpanError> for TimingError {
    fn from(e: SpanError) -> Self {
        TimingError::Span(e)
    }
}

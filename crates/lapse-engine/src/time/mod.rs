//! Clocks and stopwatches.
//!
//! Intended usage:
//! - pick a ticker with [`ticker_for`] (or rely on the configured default)
//! - measure with a [`Timer`], or split time with a [`NestedTimer`]
//! - read statistics as [`TimeSpan`](lapse_span::TimeSpan) values

mod cpu;
mod nested;
mod ticker;
mod timer;

pub use nested::{NestedPhase, NestedTimer};
pub use ticker::{
    ManualTicker, NullTicker, ProcessCpuTime, ThreadCpuTime, Ticker, TickerKind, WalltimeMillis,
    WalltimeNanos, ticker_for,
};
pub use timer::{RunningWatch, Timer};

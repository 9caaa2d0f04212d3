//! Lapse engine crate.
//!
//! Clocks ([`time::Ticker`]), stopwatches ([`time::Timer`]) and nested
//! stopwatches ([`time::NestedTimer`]) reporting [`TimeSpan`] statistics.
//!
//! ```rust
//! use std::sync::Arc;
//! use lapse_engine::time::{ManualTicker, NestedTimer};
//! use lapse_engine::TimeUnit;
//!
//! let ticker = Arc::new(ManualTicker::new(TimeUnit::Milliseconds));
//! let mut timer = NestedTimer::with_ticker(ticker.clone());
//!
//! timer.start_outer().unwrap();
//! ticker.advance(3);
//! timer.current_inner_timer().unwrap().start().unwrap();
//! ticker.advance(7);
//! timer.stop_both().unwrap();
//!
//! assert_eq!(timer.inner_sum_time().magnitude(), 7);
//! assert_eq!(timer.outer_sum_time().magnitude(), 3);
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod time;

pub use error::TimingError;
pub use lapse_span::{DisplayFormat, SpanError, TimeSpan, TimeUnit};

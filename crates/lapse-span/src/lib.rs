//! Overflow-aware time spans for **lapse**.
//!
//! A [`TimeSpan`] is an immutable `(magnitude, unit)` pair whose equality and
//! ordering do not depend on the stored unit. Arithmetic and conversions
//! escalate to coarser units instead of overflowing whenever possible.
//!
//! This crate only depends on the logging facade and a set-once cell, so it
//! can be used to parse configuration values without pulling in any clock or
//! timer code.
//!
//! # Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`unit`] | `TimeUnit` |
//! | [`span`] | `TimeSpan` conversion, arithmetic, comparison |
//! | [`format`] | text rendering, default `DisplayFormat` |
//! | [`error`] | `SpanError`, `ParseError` |
//! | [`lexer`] | character-class scanner |
//! | [`parser`] | `parse_str` entry point |
//!
//! # Quick start
//!
//! ```rust
//! use lapse_span::{parse_str, TimeSpan, TimeUnit};
//!
//! let span = parse_str("2h 22s").unwrap();
//! assert_eq!(span, TimeSpan::of(7_222, TimeUnit::Seconds));
//! assert_eq!(span.format_as(TimeUnit::Minutes), "120min");
//! ```

pub mod error;
pub mod format;
pub mod lexer;
pub mod parser;
pub mod span;
pub mod unit;

pub use error::{ParseError, SpanError};
pub use format::DisplayFormat;
pub use parser::parse_str;
pub use span::TimeSpan;
pub use unit::TimeUnit;

impl std::str::FromStr for TimeSpan {
    type Err = SpanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_str(s)
    }
}

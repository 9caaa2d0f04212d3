use std::fmt;

/// A malformed time span string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    /// Byte offset into the input where the offending token starts.
    pub offset: usize,
}

impl ParseError {
    pub(crate) fn new(msg: impl Into<String>, offset: usize) -> Self {
        Self { message: msg.into(), offset }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "time span parse error at offset {}: {}", self.offset, self.message)
    }
}

impl std::error::Error for ParseError {}

/// Errors raised by [`TimeSpan`](crate::TimeSpan) conversion, arithmetic,
/// parsing and format selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanError {
    /// The result does not fit an `i64` in any admissible unit.
    Overflow { operation: &'static str },
    /// A negative factor/divisor, or division by zero.
    InvalidArgument(String),
    Parse(ParseError),
    /// Unrecognized display format selector.
    Config(String),
}

impl fmt::Display for SpanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpanError::Overflow { operation } => {
                write!(f, "time span {operation} overflows even in the coarsest unit")
            }
            SpanError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            SpanError::Parse(e) => fmt::Display::fmt(e, f),
            SpanError::Config(msg) => write!(f, "configuration error: {msg}"),
        }
    }
}

impl std::error::Error for SpanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SpanError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParseError> for SpanError {
    fn from(e: ParseError) -> Self {
        SpanError::Parse(e)
    }
}

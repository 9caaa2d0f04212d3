use crate::error::{ParseError, SpanError};
use crate::lexer::{Lexer, Token, TokenWithPos};
use crate::span::TimeSpan;
use crate::unit::TimeUnit;

// ── Parser ────────────────────────────────────────────────────────────────

/// Parses a time span string.
///
/// Accepted forms:
/// - a bare non-negative integer, read as seconds (`"214"`)
/// - one or more `<integer><unit>` pairs, optionally separated by whitespace
///   (`"2h 22s"`, `"4d2h13min22s"`); each unit at most once
///
/// Components are combined with [`TimeSpan::sum`].
pub fn parse_str(src: &str) -> Result<TimeSpan, SpanError> {
    if !src.is_empty() && src.bytes().all(|b| b.is_ascii_digit()) {
        let seconds = parse_number(src, 0)?;
        return Ok(TimeSpan::of_seconds(seconds));
    }

    let tokens = Lexer::new(src).tokenize()?;
    if tokens.is_empty() {
        return Err(ParseError::new("empty time span", 0).into());
    }
    Parser::new(tokens).parse_components()
}

fn parse_number(digits: &str, offset: usize) -> Result<i64, ParseError> {
    digits
        .parse::<i64>()
        .map_err(|_| ParseError::new(format!("number {digits} is out of range"), offset))
}

struct Parser {
    tokens: Vec<TokenWithPos>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<TokenWithPos>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn advance(&mut self) -> Option<TokenWithPos> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expect_number(&self, tok: TokenWithPos) -> Result<i64, ParseError> {
        match tok.token {
            Token::Number(digits) => parse_number(&digits, tok.offset),
            Token::Word(word) => Err(ParseError::new(
                format!("expected a number before unit {word:?}"),
                tok.offset,
            )),
        }
    }

    fn expect_unit(&mut self, value: i64, value_offset: usize) -> Result<(TimeUnit, usize), ParseError> {
        match self.advance() {
            None => Err(ParseError::new(format!("value {value} has no unit"), value_offset)),
            Some(TokenWithPos { token: Token::Number(digits), offset }) => Err(ParseError::new(
                format!("expected a unit after {value}, got number {digits}"),
                offset,
            )),
            Some(TokenWithPos { token: Token::Word(word), offset }) => TimeUnit::from_token(&word)
                .map(|unit| (unit, offset))
                .ok_or_else(|| ParseError::new(format!("unknown time unit {word:?}"), offset)),
        }
    }

    fn parse_components(&mut self) -> Result<TimeSpan, SpanError> {
        let mut seen = [false; TimeUnit::ALL.len()];
        let mut result = TimeSpan::empty();

        while let Some(tok) = self.advance() {
            let value_offset = tok.offset;
            let value = self.expect_number(tok)?;
            let (unit, unit_offset) = self.expect_unit(value, value_offset)?;

            if std::mem::replace(&mut seen[unit as usize], true) {
                return Err(ParseError::new(
                    format!("duplicate unit {unit}"),
                    unit_offset,
                ).into());
            }
            result = TimeSpan::sum(result, TimeSpan::of(value, unit))?;
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TimeUnit::*;

    fn parse_err(src: &str) -> ParseError {
        match parse_str(src) {
            Err(SpanError::Parse(e)) => e,
            other => panic!("expected parse error for {src:?}, got {other:?}"),
        }
    }

    #[test]
    fn bare_number_is_seconds() {
        assert_eq!(parse_str("214").unwrap(), TimeSpan::of(214, Seconds));
        assert_eq!(parse_str("214").unwrap().unit(), Seconds);
    }

    #[test]
    fn zero_is_empty() {
        assert_eq!(parse_str("0").unwrap(), TimeSpan::empty());
        assert!(parse_str("0").unwrap().is_empty());
    }

    #[test]
    fn compound_equals_sum_of_components() {
        let expected = TimeSpan::sum_all([
            TimeSpan::of(4, Days),
            TimeSpan::of(2, Hours),
            TimeSpan::of(13, Minutes),
            TimeSpan::of(22, Seconds),
        ])
        .unwrap();
        assert_eq!(parse_str("4d2h13min22s").unwrap(), expected);
    }

    #[test]
    fn whitespace_between_components() {
        assert_eq!(parse_str("2h 22s").unwrap(), TimeSpan::of(7_222, Seconds));
        assert_eq!(parse_str(" 3 days 4 hours ").unwrap(), TimeSpan::of(76, Hours));
    }

    #[test]
    fn unit_aliases() {
        assert_eq!(parse_str("5m").unwrap(), TimeSpan::of(5, Minutes));
        assert_eq!(parse_str("1day").unwrap(), TimeSpan::of(1, Days));
        assert_eq!(parse_str("250ms").unwrap(), TimeSpan::of(250, Milliseconds));
    }

    #[test]
    fn result_uses_finest_component_unit() {
        assert_eq!(parse_str("1h30min").unwrap().unit(), Minutes);
    }

    #[test]
    fn err_duplicate_unit() {
        let e = parse_err("77s314s");
        assert_eq!(e.offset, 6);
        parse_err("1m 2min");
    }

    #[test]
    fn err_garbage() {
        parse_err("1asdflkajsd1");
    }

    #[test]
    fn err_missing_unit() {
        parse_err("5h 3");
        parse_err("12 34");
    }

    #[test]
    fn err_unit_without_number() {
        parse_err("h");
        parse_err("5h min");
    }

    #[test]
    fn err_bad_character() {
        parse_err("-5s");
        parse_err("1.5h");
    }

    #[test]
    fn err_empty_input() {
        parse_err("");
        parse_err("   ");
    }

    #[test]
    fn err_number_out_of_range() {
        parse_err("99999999999999999999");
        parse_err("99999999999999999999s");
    }

    #[test]
    fn overflow_in_sum_is_reported() {
        let src = format!("{}d {}h", i64::MAX, i64::MAX);
        assert!(matches!(parse_str(&src), Err(SpanError::Overflow { .. })));
    }
}

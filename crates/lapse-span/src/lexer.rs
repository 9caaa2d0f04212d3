use crate::error::ParseError;

// ── Token ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A run of ASCII digits, not yet range-checked.
    Number(String),
    /// A run of letters; a candidate unit word.
    Word(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenWithPos {
    pub token: Token,
    /// Byte offset of the first character of the token.
    pub offset: usize,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum CharClass {
    Digit,
    Letter,
    Whitespace,
}

impl CharClass {
    fn of(c: char) -> Option<CharClass> {
        if c.is_ascii_digit() {
            Some(CharClass::Digit)
        } else if c.is_alphabetic() {
            Some(CharClass::Letter)
        } else if c.is_whitespace() {
            Some(CharClass::Whitespace)
        } else {
            None
        }
    }
}

// ── Lexer ─────────────────────────────────────────────────────────────────

/// Character-class scanner for the time span format.
///
/// Consecutive characters of the same class merge into one token. Whitespace
/// only separates tokens and never produces one; any character that is not a
/// digit, letter or whitespace is rejected.
pub struct Lexer<'s> {
    src: &'s str,
    pos: usize,
}

impl<'s> Lexer<'s> {
    pub fn new(src: &'s str) -> Self {
        Self { src, pos: 0 }
    }

    pub fn tokenize(mut self) -> Result<Vec<TokenWithPos>, ParseError> {
        let mut tokens = Vec::new();
        while let Some(tok) = self.next_token()? {
            tokens.push(tok);
        }
        Ok(tokens)
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.src[self.pos..].chars().next()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn classify(&self, c: char) -> Result<CharClass, ParseError> {
        CharClass::of(c)
            .ok_or_else(|| ParseError::new(format!("unexpected character {:?}", c), self.pos))
    }

    fn next_token(&mut self) -> Result<Option<TokenWithPos>, ParseError> {
        loop {
            let Some(c) = self.peek() else {
                return Ok(None);
            };
            let class = self.classify(c)?;
            if class == CharClass::Whitespace {
                self.advance();
                continue;
            }

            let start = self.pos;
            while let Some(c) = self.peek() {
                if self.classify(c)? != class {
                    break;
                }
                self.advance();
            }
            let text = self.src[start..self.pos].to_string();
            let token = match class {
                CharClass::Digit => Token::Number(text),
                _ => Token::Word(text),
            };
            return Ok(Some(TokenWithPos { token, offset: start }));
        }
    }
}

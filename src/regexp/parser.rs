//! Recursive-descent parser for the integer regular-expression dialect.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! regex  := term ('|' regex)?
//! term   := factor*
//! factor := base ('*' | '+' | '{' INT (',' INT)? '}')*
//! base   := '(' regex ')' | DIGIT | '.' | '<' INT '>'
//! ```
//!
//! A single digit is the symbol it spells; `<N>` spells any `i64`,
//! negative included. `.` matches any symbol. There is no `?`; use
//! `{0,1}`.

use std::fmt;

/// Syntax tree of a parsed expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegExp {
    /// Matches the empty word.
    Epsilon,
    /// Matches any single symbol.
    Any,
    /// Matches exactly one symbol.
    Symbol(i64),
    Sequence(Box<RegExp>, Box<RegExp>),
    Alternation(Box<RegExp>, Box<RegExp>),
    Star(Box<RegExp>),
    Plus(Box<RegExp>),
    /// Between `min` and `max` repetitions of `inner`, inclusive.
    Repeat {
        inner: Box<RegExp>,
        min: u32,
        max: u32,
    },
}

impl RegExp {
    fn is_atom(&self) -> bool {
        matches!(self, RegExp::Epsilon | RegExp::Any | RegExp::Symbol(_))
    }

    fn fmt_grouped(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_atom() {
            write!(f, "{}", self)
        } else {
            write!(f, "({})", self)
        }
    }
}

impl fmt::Display for RegExp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegExp::Epsilon => Ok(()),
            RegExp::Any => write!(f, "."),
            RegExp::Symbol(v) if (0..=9).contains(v) => write!(f, "{}", v),
            RegExp::Symbol(v) => write!(f, "<{}>", v),
            RegExp::Sequence(l, r) => {
                for side in [l, r] {
                    if matches!(**side, RegExp::Alternation(_, _)) {
                        write!(f, "({})", side)?;
                    } else {
                        write!(f, "{}", side)?;
                    }
                }
                Ok(())
            }
            RegExp::Alternation(l, r) => write!(f, "{}|{}", l, r),
            RegExp::Star(inner) => {
                inner.fmt_grouped(f)?;
                write!(f, "*")
            }
            RegExp::Plus(inner) => {
                inner.fmt_grouped(f)?;
                write!(f, "+")
            }
            RegExp::Repeat { inner, min, max } => {
                inner.fmt_grouped(f)?;
                if min == max {
                    write!(f, "{{{}}}", min)
                } else {
                    write!(f, "{{{},{}}}", min, max)
                }
            }
        }
    }
}

/// A syntax error, with the byte offset where parsing stopped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegexpError {
    pub message: String,
    pub offset: usize,
}

impl RegexpError {
    fn new(message: impl Into<String>, offset: usize) -> Self {
        RegexpError {
            message: message.into(),
            offset,
        }
    }
}

impl fmt::Display for RegexpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at offset {}", self.message, self.offset)
    }
}

impl std::error::Error for RegexpError {}

/// Parse a pattern into its syntax tree.
///
/// The whole input must be consumed; trailing characters (including a
/// stray `)`) are an error, never silently ignored.
pub fn parse(pattern: &str) -> Result<RegExp, RegexpError> {
    let mut p = Parser {
        input: pattern.as_bytes(),
        pos: 0,
    };
    let re = p.regex()?;
    if p.pos != p.input.len() {
        return Err(RegexpError::new("unexpected character", p.pos));
    }
    Ok(re)
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn eat(&mut self, c: u8) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn regex(&mut self) -> Result<RegExp, RegexpError> {
        let left = self.term()?;
        if self.eat(b'|') {
            let right = self.regex()?;
            return Ok(RegExp::Alternation(Box::new(left), Box::new(right)));
        }
        Ok(left)
    }

    fn term(&mut self) -> Result<RegExp, RegexpError> {
        let mut parts: Vec<RegExp> = Vec::new();
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == b'(' || c == b'.' || c == b'<')
        {
            parts.push(self.factor()?);
        }
        let mut iter = parts.into_iter();
        let Some(first) = iter.next() else {
            return Ok(RegExp::Epsilon);
        };
        Ok(iter.fold(first, |acc, next| {
            RegExp::Sequence(Box::new(acc), Box::new(next))
        }))
    }

    fn factor(&mut self) -> Result<RegExp, RegexpError> {
        let mut re = self.base()?;
        loop {
            match self.peek() {
                Some(b'*') => {
                    self.pos += 1;
                    re = RegExp::Star(Box::new(re));
                }
                Some(b'+') => {
                    self.pos += 1;
                    re = RegExp::Plus(Box::new(re));
                }
                Some(b'{') => {
                    self.pos += 1;
                    re = self.bounds(re)?;
                }
                _ => return Ok(re),
            }
        }
    }

    fn bounds(&mut self, inner: RegExp) -> Result<RegExp, RegexpError> {
        let min = self.unsigned()?;
        let max = if self.eat(b',') { self.unsigned()? } else { min };
        if !self.eat(b'}') {
            return Err(RegexpError::new("expected '}'", self.pos));
        }
        if max < min {
            return Err(RegexpError::new(
                format!("repetition bounds reversed: {{{},{}}}", min, max),
                self.pos,
            ));
        }
        Ok(RegExp::Repeat {
            inner: Box::new(inner),
            min,
            max,
        })
    }

    fn base(&mut self) -> Result<RegExp, RegexpError> {
        let start = self.pos;
        match self.bump() {
            Some(b'(') => {
                let re = self.regex()?;
                if !self.eat(b')') {
                    return Err(RegexpError::new("unclosed group", self.pos));
                }
                Ok(re)
            }
            Some(b'.') => Ok(RegExp::Any),
            Some(c) if c.is_ascii_digit() => Ok(RegExp::Symbol(i64::from(c - b'0'))),
            Some(b'<') => {
                let value = self.signed()?;
                if !self.eat(b'>') {
                    return Err(RegexpError::new("unterminated '<'", self.pos));
                }
                Ok(RegExp::Symbol(value))
            }
            Some(_) => Err(RegexpError::new("unexpected character", start)),
            None => Err(RegexpError::new("unexpected end of pattern", start)),
        }
    }

    fn unsigned(&mut self) -> Result<u32, RegexpError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        std::str::from_utf8(&self.input[start..self.pos])
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| RegexpError::new("expected a repetition count", start))
    }

    fn signed(&mut self) -> Result<i64, RegexpError> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        std::str::from_utf8(&self.input[start..self.pos])
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| RegexpError::new("expected an integer symbol", start))
    }
}

//! Pattern tokenizer.
//!
//! Commands and routes are registered with a space-delimited pattern:
//!
//! | Token      | Kind                  | Matches                                   |
//! |------------|-----------------------|-------------------------------------------|
//! | `word`     | Literal               | exactly `word`                            |
//! | `:name`    | Parameter             | any value accepted by the `name` validator |
//! | `:[name]`  | Optional parameter    | same, but may be absent                   |
//! | `*`        | Wildcard              | everything that remains (must be last)    |
//!
//! Tokens may never start with `-`: anything dash-prefixed on the command line
//! belongs to the option resolver.

use std::fmt;
use std::str::FromStr;

use crate::error::PatternError;

/// The wildcard sentinel. A command registered with exactly this pattern
/// becomes the default command of its route.
pub const WILDCARD: &str = "*";

/// The kind of a pattern token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Must equal the input word.
    Literal,
    /// Binds one required input word.
    Parameter,
    /// Binds one input word when present.
    OptionalParameter,
    /// Matches any remaining input.
    Wildcard,
}

/// A single typed token of a [`Pattern`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub name: String,
    pub kind: TokenKind,
}

impl Token {
    pub fn literal(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TokenKind::Literal,
        }
    }

    pub fn parameter(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TokenKind::Parameter,
        }
    }

    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TokenKind::OptionalParameter,
        }
    }

    pub fn wildcard() -> Self {
        Self {
            name: WILDCARD.to_string(),
            kind: TokenKind::Wildcard,
        }
    }

    /// Returns true if an input word must be present for this token.
    pub fn is_required(&self) -> bool {
        matches!(self.kind, TokenKind::Literal | TokenKind::Parameter)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Literal | TokenKind::Wildcard => write!(f, "{}", self.name),
            TokenKind::Parameter => write!(f, ":{}", self.name),
            TokenKind::OptionalParameter => write!(f, ":[{}]", self.name),
        }
    }
}

/// A tokenized pattern.
///
/// Patterns are parsed once, at registration time, and matched many times.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Pattern {
    tokens: Vec<Token>,
}

impl Pattern {
    /// Parses a pattern string.
    ///
    /// Whitespace is trimmed and collapsed before splitting, so
    /// `"hello    :param  "` and `"hello :param"` are the same pattern.
    pub fn parse(source: &str) -> Result<Self, PatternError> {
        tokenize(source).map(|tokens| Self { tokens })
    }

    /// The pattern matching anything: a lone wildcard.
    pub fn wildcard() -> Self {
        Self {
            tokens: vec![Token::wildcard()],
        }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Returns true if this pattern is exactly the wildcard sentinel.
    pub fn is_wildcard(&self) -> bool {
        matches!(self.tokens.as_slice(), [token] if token.kind == TokenKind::Wildcard)
    }

    /// Returns true if the final token is a wildcard.
    pub fn ends_with_wildcard(&self) -> bool {
        self.tokens
            .last()
            .is_some_and(|token| token.kind == TokenKind::Wildcard)
    }

    /// Names of every parameter (required or optional) in declaration order.
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.tokens
            .iter()
            .filter(|token| {
                matches!(
                    token.kind,
                    TokenKind::Parameter | TokenKind::OptionalParameter
                )
            })
            .map(|token| token.name.as_str())
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, token) in self.tokens.iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{token}")?;
        }
        Ok(())
    }
}

impl FromStr for Pattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Splits a pattern string into typed tokens.
pub fn tokenize(source: &str) -> Result<Vec<Token>, PatternError> {
    let raw: Vec<&str> = source.split_whitespace().collect();
    let mut tokens = Vec::with_capacity(raw.len());

    for (index, word) in raw.iter().enumerate() {
        let token = parse_token(source, word)?;
        if token.kind == TokenKind::Wildcard && index + 1 != raw.len() {
            return Err(PatternError::WildcardNotLast {
                pattern: source.trim().to_string(),
            });
        }
        tokens.push(token);
    }

    Ok(tokens)
}

fn parse_token(source: &str, word: &str) -> Result<Token, PatternError> {
    if word.starts_with('-') {
        return Err(PatternError::LeadingDash {
            pattern: source.trim().to_string(),
            token: word.to_string(),
        });
    }

    if word == WILDCARD {
        return Ok(Token::wildcard());
    }

    let Some(rest) = word.strip_prefix(':') else {
        return Ok(Token::literal(word));
    };

    let (name, optional) = match rest.strip_prefix('[') {
        Some(inner) => {
            let name = inner
                .strip_suffix(']')
                .ok_or_else(|| PatternError::UnclosedOptional {
                    pattern: source.trim().to_string(),
                    token: word.to_string(),
                })?;
            (name, true)
        }
        None => (rest, false),
    };

    if name.is_empty() {
        return Err(PatternError::EmptyParameterName {
            pattern: source.trim().to_string(),
            token: word.to_string(),
        });
    }

    Ok(if optional {
        Token::optional(name)
    } else {
        Token::parameter(name)
    })
}

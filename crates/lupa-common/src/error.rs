use std::fmt;

use serde::Serialize;

use crate::span::Span;

/// A lexer error with location information.
///
/// Errors are collected during lexing rather than aborting immediately;
/// the lexer always produces a complete token stream and the parser turns
/// these into parse diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

impl LexError {
    /// Create a new lexer error.
    pub fn new(kind: LexErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The specific kind of lexer error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LexErrorKind {
    /// An unexpected byte was encountered.
    UnexpectedCharacter(char),
    /// A quoted string ran into a newline or end of input.
    UnterminatedString,
    /// A long-bracket string was not closed before end of input.
    UnterminatedLongString,
    /// A long-bracket comment was not closed before end of input.
    UnterminatedComment,
    /// A backtick string was not closed before end of input.
    UnterminatedInterpolatedString,
    /// `--[` opened a long bracket with mismatched levels.
    MalformedLongBracket,
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedCharacter(c) => write!(f, "unexpected character: {c:?}"),
            Self::UnterminatedString => write!(f, "unterminated string literal"),
            Self::UnterminatedLongString => write!(f, "unterminated long string"),
            Self::UnterminatedComment => write!(f, "unterminated comment"),
            Self::UnterminatedInterpolatedString => {
                write!(f, "unterminated interpolated string")
            }
            Self::MalformedLongBracket => write!(f, "malformed long bracket"),
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for LexError {}

/// A parse error with location information.
///
/// Parse errors never abort parsing: the parser records the error,
/// synchronizes to the next statement keyword, and keeps going. Every
/// error corresponds to an `Error*` placeholder node in the AST.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseError {
    /// Human-readable description of what went wrong.
    pub message: String,
    /// Source location where the error was detected.
    pub span: Span,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseError {}

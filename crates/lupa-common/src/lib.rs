// Lupa common -- shared types for the Luau analyzer.
//
// Everything here is consumed by the lexer, parser, and type checker:
// source positions and spans, the token vocabulary, lex/parse error
// types, and the diagnostic model with its stable code table.

pub mod diagnostic;
pub mod error;
pub mod span;
pub mod token;

pub use diagnostic::{Diagnostic, DiagnosticCode, DiagnosticTag, Severity};
pub use error::{LexError, LexErrorKind, ParseError};
pub use span::{Position, Span};
pub use token::{keyword_from_str, Token, TokenKind};

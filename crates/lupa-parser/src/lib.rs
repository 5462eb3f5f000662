// Lupa parser -- recursive-descent Luau parser with error recovery.
//
// The parser consumes the lexer's lossless token stream and produces a
// typed AST. Syntax errors never abort: each one yields a `ParseError`
// plus a well-formed `Error*` placeholder node, and parsing resumes at
// the next statement keyword. The chunk also carries the file's comment
// stream so the checker can scan for directives and doc comments stay
// attached to declarations.

pub mod ast;
pub mod docs;
pub mod outline;
mod parser;
pub mod visit;

use lupa_common::error::ParseError;
use lupa_common::span::{Position, Span};
use lupa_common::token::TokenKind;
use lupa_lexer::Lexer;

use crate::ast::{Chunk, Comment};

/// The outcome of parsing one source file.
///
/// `chunk` is always a complete tree; `errors` holds lexical and
/// syntactic diagnostics in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseResult {
    pub chunk: Chunk,
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    /// Whether the source parsed without any errors.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parse Luau source text into a chunk.
pub fn parse(source: &str) -> ParseResult {
    let (tokens, lex_errors) = Lexer::tokenize(source);

    let comments: Vec<Comment> = tokens
        .iter()
        .filter(|t| t.kind == TokenKind::Comment)
        .map(|t| Comment {
            text: t.text(source).to_string(),
            span: t.span,
        })
        .collect();

    let end = tokens
        .last()
        .map(|t| t.span.end)
        .unwrap_or_else(Position::start);

    let mut errors: Vec<ParseError> = lex_errors
        .into_iter()
        .map(|e| ParseError::new(e.to_string(), e.span))
        .collect();

    let mut p = parser::Parser::new(tokens, source);
    let block = parser::stats::parse_chunk(&mut p);
    errors.extend(p.into_errors());
    errors.sort_by_key(|e| (e.span.start.offset, e.span.end.offset));

    ParseResult {
        chunk: Chunk {
            block,
            comments,
            span: Span::new(Position::start(), end),
        },
        errors,
    }
}

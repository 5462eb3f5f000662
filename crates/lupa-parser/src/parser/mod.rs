//! Recursive-descent parser infrastructure.
//!
//! The parser owns the full token stream (trivia included) and a cursor
//! over it. Lookahead methods skip trivia transparently; `advance`
//! consumes through it. Keeping trivia in the stream lets the parser
//! scan backwards for `---` doc comments when a declaration begins.
//!
//! Error handling is panic-mode recovery: on an unexpected token the
//! parser records a `ParseError`, produces a well-formed `Error*` node,
//! and skips ahead to the next statement-starting keyword. Parsing
//! always yields a complete chunk; it never unwinds past the top level.

pub(crate) mod exprs;
pub(crate) mod stats;
pub(crate) mod types;

use lupa_common::error::ParseError;
use lupa_common::span::{Position, Span};
use lupa_common::token::{Token, TokenKind};

use crate::ast::Name;
use crate::docs::{parse_doc_comment, DocComment};

/// Tokens that can begin a statement; the panic-mode synchronization set.
const SYNC_SET: &[TokenKind] = &[
    TokenKind::End,
    TokenKind::Local,
    TokenKind::Function,
    TokenKind::If,
    TokenKind::While,
    TokenKind::For,
    TokenKind::Repeat,
    TokenKind::Return,
    TokenKind::Do,
    TokenKind::Type,
    TokenKind::Export,
    TokenKind::Eof,
];

pub(crate) struct Parser<'src> {
    /// All tokens from the lexer, trivia included, ending with `Eof`.
    tokens: Vec<Token>,
    /// Index of the next unconsumed token (may point at trivia).
    pos: usize,
    /// Original source text, for slicing lexemes.
    source: &'src str,
    /// Collected parse errors, in discovery order.
    errors: Vec<ParseError>,
}

impl<'src> Parser<'src> {
    pub(crate) fn new(tokens: Vec<Token>, source: &'src str) -> Self {
        Self {
            tokens,
            pos: 0,
            source,
            errors: Vec::new(),
        }
    }

    pub(crate) fn into_errors(self) -> Vec<ParseError> {
        self.errors
    }

    // ── Lookahead ──────────────────────────────────────────────────────

    /// Index of the next significant (non-trivia) token.
    pub(crate) fn current_index(&self) -> usize {
        let mut i = self.pos;
        while i < self.tokens.len() && self.tokens[i].is_trivia() {
            i += 1;
        }
        i.min(self.tokens.len() - 1)
    }

    /// Kind of the current significant token.
    pub(crate) fn current(&self) -> TokenKind {
        self.nth(0)
    }

    /// Kind of the Nth significant token ahead (`nth(0)` == `current`).
    pub(crate) fn nth(&self, n: usize) -> TokenKind {
        let mut i = self.pos;
        let mut remaining = n;
        while i < self.tokens.len() {
            if self.tokens[i].is_trivia() {
                i += 1;
                continue;
            }
            if remaining == 0 {
                return self.tokens[i].kind;
            }
            remaining -= 1;
            i += 1;
        }
        TokenKind::Eof
    }

    /// Span of the current significant token.
    pub(crate) fn current_span(&self) -> Span {
        self.tokens[self.current_index()].span
    }

    /// Lexeme of the current significant token.
    pub(crate) fn current_text(&self) -> &'src str {
        self.tokens[self.current_index()].text(self.source)
    }

    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.current() == kind
    }

    pub(crate) fn at_any(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.current())
    }

    /// A zero-length span at the current token's start, for synthesized
    /// nodes.
    pub(crate) fn here(&self) -> Span {
        Span::at(self.current_span().start)
    }

    /// The end position of the last consumed significant token, for
    /// closing node spans. Falls back to the current position when
    /// nothing has been consumed yet.
    pub(crate) fn prev_end(&self) -> Position {
        let mut i = self.pos;
        while i > 0 {
            i -= 1;
            if !self.tokens[i].is_trivia() {
                return self.tokens[i].span.end;
            }
        }
        self.current_span().start
    }

    /// Span from a node's start to the end of the last consumed token.
    /// Falls back to `start` itself when nothing has been consumed past it.
    pub(crate) fn span_from(&self, start: Span) -> Span {
        let end = self.prev_end();
        if end.offset < start.start.offset {
            start
        } else {
            Span::new(start.start, end)
        }
    }

    // ── Consumption ────────────────────────────────────────────────────

    /// Consume the current significant token (and any trivia before it),
    /// returning it.
    pub(crate) fn advance(&mut self) -> Token {
        let idx = self.current_index();
        let token = self.tokens[idx].clone();
        if self.tokens[idx].kind != TokenKind::Eof {
            self.pos = idx + 1;
        } else {
            self.pos = idx;
        }
        token
    }

    /// Consume the current token if it matches, without error otherwise.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume a token of the given kind, or record an error and return
    /// false without consuming.
    pub(crate) fn expect(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            self.error(format!(
                "expected {}, found {}",
                kind.describe(),
                self.current().describe()
            ));
            false
        }
    }

    // ── Errors and recovery ────────────────────────────────────────────

    /// Record a parse error at the current token.
    pub(crate) fn error(&mut self, message: impl Into<String>) {
        let span = self.current_span();
        self.errors.push(ParseError::new(message, span));
    }

    /// Record a parse error at a specific span.
    pub(crate) fn error_at(&mut self, message: impl Into<String>, span: Span) {
        self.errors.push(ParseError::new(message, span));
    }

    /// Panic-mode recovery: skip tokens until one that can start a
    /// statement (or `Eof`). Block terminators also stop the skip so an
    /// error inside a branch cannot swallow its `else`/`until`.
    pub(crate) fn sync(&mut self) {
        while !self.at_any(SYNC_SET)
            && !self.at_any(&[TokenKind::Else, TokenKind::Elseif, TokenKind::Until])
        {
            self.advance();
        }
    }

    /// Whether the current token is in the synchronization set.
    pub(crate) fn at_sync_point(&self) -> bool {
        self.at_any(SYNC_SET)
    }

    // ── Identifier-like tokens ─────────────────────────────────────────

    /// Accept an identifier or one of Luau's soft keywords (`type`,
    /// `typeof`, `export`, `continue`) as a name. Used for binding names
    /// and expression identifiers.
    pub(crate) fn name(&mut self, what: &str) -> Option<Name> {
        match self.current() {
            TokenKind::Identifier
            | TokenKind::Type
            | TokenKind::Typeof
            | TokenKind::Export
            | TokenKind::Continue => {
                let text = self.current_text().to_string();
                let token = self.advance();
                Some(Name::new(text, token.span))
            }
            _ => {
                self.error(format!(
                    "expected {}, found {}",
                    what,
                    self.current().describe()
                ));
                None
            }
        }
    }

    /// Accept an identifier or *any* keyword as a name. Used where the
    /// grammar treats keywords as plain identifiers: table field names
    /// and member/method access.
    pub(crate) fn member_name(&mut self, what: &str) -> Option<Name> {
        let kind = self.current();
        if kind == TokenKind::Identifier || kind.is_keyword() {
            let text = self.current_text().to_string();
            let token = self.advance();
            Some(Name::new(text, token.span))
        } else {
            self.error(format!(
                "expected {}, found {}",
                what,
                self.current().describe()
            ));
            None
        }
    }

    /// Whether the current token could serve as a member name.
    pub(crate) fn at_member_name(&self) -> bool {
        let kind = self.current();
        kind == TokenKind::Identifier || kind.is_keyword()
    }

    // ── Doc comments ───────────────────────────────────────────────────

    /// Collect the doc comment attached to the upcoming declaration.
    ///
    /// Scans the trivia stream backwards from the current token and
    /// gathers the maximal run of `---` comment lines separated only by
    /// whitespace and newlines. Returns `None` when there is no such run
    /// or the parsed comment is empty.
    pub(crate) fn doc_comment_before(&self) -> Option<DocComment> {
        let mut lines: Vec<&str> = Vec::new();
        let mut i = self.current_index();
        while i > 0 {
            i -= 1;
            let token = &self.tokens[i];
            match token.kind {
                TokenKind::Whitespace | TokenKind::Newline => continue,
                TokenKind::Comment => {
                    let text = token.text(self.source);
                    match text.strip_prefix("---") {
                        Some(content) => {
                            lines.push(content.strip_prefix(' ').unwrap_or(content))
                        }
                        None => break,
                    }
                }
                _ => break,
            }
        }
        if lines.is_empty() {
            return None;
        }
        lines.reverse();
        let doc = parse_doc_comment(lines);
        if doc.is_empty() {
            None
        } else {
            Some(doc)
        }
    }
}

// ── Literal decoding ───────────────────────────────────────────────────

/// Parse a number lexeme into its `f64` value.
///
/// Underscore separators are stripped; `0x`/`0X` and `0b`/`0B` prefixes
/// select hex and binary. A malformed literal decodes to 0.0 -- the
/// lexer has already guaranteed the shape, so this is a backstop, not a
/// validation layer.
pub(crate) fn decode_number(lexeme: &str) -> f64 {
    let cleaned: String = lexeme.chars().filter(|&c| c != '_').collect();
    if let Some(hex) = cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
    {
        return u64::from_str_radix(hex, 16).map(|v| v as f64).unwrap_or(0.0);
    }
    if let Some(bin) = cleaned
        .strip_prefix("0b")
        .or_else(|| cleaned.strip_prefix("0B"))
    {
        return u64::from_str_radix(bin, 2).map(|v| v as f64).unwrap_or(0.0);
    }
    cleaned.parse::<f64>().unwrap_or(0.0)
}

/// Decode a string lexeme into its value.
///
/// Handles quoted strings (escape processing, possibly missing the
/// closing quote after lexer recovery) and long-bracket strings (raw,
/// with the Lua rule of dropping one leading newline).
pub(crate) fn decode_string(lexeme: &str) -> String {
    let mut chars = lexeme.chars();
    match chars.next() {
        Some(quote @ ('"' | '\'')) => {
            let mut out = String::with_capacity(lexeme.len());
            let mut iter = chars.peekable();
            while let Some(c) = iter.next() {
                if c == quote && iter.peek().is_none() {
                    break; // closing quote
                }
                if c == '\\' {
                    match iter.next() {
                        Some('n') => out.push('\n'),
                        Some('t') => out.push('\t'),
                        Some('r') => out.push('\r'),
                        Some('a') => out.push('\x07'),
                        Some('b') => out.push('\x08'),
                        Some('f') => out.push('\x0C'),
                        Some('v') => out.push('\x0B'),
                        Some('0') => out.push('\0'),
                        Some(other) => out.push(other),
                        None => {}
                    }
                } else {
                    out.push(c);
                }
            }
            out
        }
        Some('[') => {
            // Long bracket: strip `[=*[` and the matching `]=*]`.
            let level = lexeme[1..].chars().take_while(|&c| c == '=').count();
            let open = level + 2;
            let close = level + 2;
            let mut inner = if lexeme.len() >= open + close
                && lexeme.ends_with(&format!("]{}]", "=".repeat(level)))
            {
                &lexeme[open..lexeme.len() - close]
            } else {
                // Unterminated: everything after the opening bracket.
                &lexeme[open.min(lexeme.len())..]
            };
            if let Some(stripped) = inner.strip_prefix('\n') {
                inner = stripped;
            }
            inner.to_string()
        }
        _ => lexeme.to_string(),
    }
}

/// Extract the verbatim inner text of an interpolated-string lexeme
/// (backticks stripped).
pub(crate) fn interpolated_inner(lexeme: &str) -> &str {
    let inner = lexeme.strip_prefix('`').unwrap_or(lexeme);
    inner.strip_suffix('`').unwrap_or(inner)
}

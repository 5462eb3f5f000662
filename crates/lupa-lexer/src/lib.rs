// Lupa lexer -- tokenizer for Luau source text.
//
// The token stream is lossless: trivia (whitespace, newlines, comments)
// is emitted as ordinary tokens, and concatenating the lexemes of every
// token reproduces the source exactly. Lexing never fails; invalid input
// becomes `Error` tokens plus collected `LexError` values.

mod cursor;

use cursor::Cursor;
use lupa_common::error::{LexError, LexErrorKind};
use lupa_common::span::{Position, Span};
use lupa_common::token::{keyword_from_str, Token, TokenKind};

/// The Lupa lexer. Converts source text into a stream of tokens.
///
/// Implements `Iterator<Item = Token>` so callers can consume tokens
/// lazily or collect them into a `Vec`. Errors encountered along the way
/// (unterminated strings, stray bytes) are collected rather than raised;
/// the parser converts them into diagnostics.
pub struct Lexer<'src> {
    cursor: Cursor<'src>,
    /// Whether we have already emitted the `Eof` token.
    emitted_eof: bool,
    /// Errors collected during lexing.
    errors: Vec<LexError>,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source text.
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
            emitted_eof: false,
            errors: Vec::new(),
        }
    }

    /// Convenience: tokenize the entire source.
    ///
    /// The returned vector includes the final `Eof` token. The second
    /// element holds any lexical errors in source order.
    pub fn tokenize(source: &str) -> (Vec<Token>, Vec<LexError>) {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        for token in lexer.by_ref() {
            tokens.push(token);
        }
        (tokens, lexer.errors)
    }

    /// Errors collected so far.
    pub fn errors(&self) -> &[LexError] {
        &self.errors
    }

    // ── Dispatch ───────────────────────────────────────────────────────

    fn next_token(&mut self) -> Token {
        let start = self.cursor.pos();

        let Some(c) = self.cursor.peek() else {
            return Token::new(TokenKind::Eof, Span::at(start));
        };

        match c {
            '\n' => {
                self.cursor.advance();
                self.token(TokenKind::Newline, start)
            }
            ' ' | '\t' | '\r' => {
                self.cursor.advance_while(|c| matches!(c, ' ' | '\t' | '\r'));
                self.token(TokenKind::Whitespace, start)
            }

            '-' => self.lex_minus(start),
            '0'..='9' => self.lex_number(start),
            '.' => self.lex_dot(start),
            '"' | '\'' => self.lex_quoted_string(start, c),
            '`' => self.lex_interpolated_string(start),
            '[' => self.lex_bracket(start),

            '=' => self.two_char(start, '=', TokenKind::Eq, TokenKind::Assign),
            '<' => self.two_char(start, '=', TokenKind::LtEq, TokenKind::Lt),
            '>' => self.two_char(start, '=', TokenKind::GtEq, TokenKind::Gt),
            ':' => self.two_char(start, ':', TokenKind::DoubleColon, TokenKind::Colon),
            '+' => self.two_char(start, '=', TokenKind::PlusAssign, TokenKind::Plus),
            '*' => self.two_char(start, '=', TokenKind::StarAssign, TokenKind::Star),
            '%' => self.two_char(start, '=', TokenKind::PercentAssign, TokenKind::Percent),
            '^' => self.two_char(start, '=', TokenKind::CaretAssign, TokenKind::Caret),
            '/' => self.lex_slash(start),
            '~' => {
                self.cursor.advance();
                if self.cursor.peek() == Some('=') {
                    self.cursor.advance();
                    self.token(TokenKind::NotEq, start)
                } else {
                    self.errors.push(LexError::new(
                        LexErrorKind::UnexpectedCharacter('~'),
                        Span::new(start, self.cursor.pos()),
                    ));
                    self.token(TokenKind::Error, start)
                }
            }

            '#' => self.single_char(TokenKind::Hash, start),
            '(' => self.single_char(TokenKind::LParen, start),
            ')' => self.single_char(TokenKind::RParen, start),
            '{' => self.single_char(TokenKind::LBrace, start),
            '}' => self.single_char(TokenKind::RBrace, start),
            ']' => self.single_char(TokenKind::RBracket, start),
            ',' => self.single_char(TokenKind::Comma, start),
            ';' => self.single_char(TokenKind::Semicolon, start),
            '|' => self.single_char(TokenKind::Pipe, start),
            '&' => self.single_char(TokenKind::Ampersand, start),
            '?' => self.single_char(TokenKind::Question, start),

            c if is_ident_start(c) => self.lex_ident(start),

            c => {
                self.cursor.advance();
                self.errors.push(LexError::new(
                    LexErrorKind::UnexpectedCharacter(c),
                    Span::new(start, self.cursor.pos()),
                ));
                self.token(TokenKind::Error, start)
            }
        }
    }

    // ── Helpers ────────────────────────────────────────────────────────

    /// Build a token spanning from `start` to the current position.
    fn token(&self, kind: TokenKind, start: Position) -> Token {
        Token::new(kind, Span::new(start, self.cursor.pos()))
    }

    /// Consume one character and return a token of the given kind.
    fn single_char(&mut self, kind: TokenKind, start: Position) -> Token {
        self.cursor.advance();
        self.token(kind, start)
    }

    /// Consume one character, then `follow` if present, picking the kind.
    fn two_char(
        &mut self,
        start: Position,
        follow: char,
        matched: TokenKind,
        single: TokenKind,
    ) -> Token {
        self.cursor.advance();
        if self.cursor.peek() == Some(follow) {
            self.cursor.advance();
            self.token(matched, start)
        } else {
            self.token(single, start)
        }
    }

    // ── Comments and minus ─────────────────────────────────────────────

    /// `-` -> `Minus`, `-=` -> `MinusAssign`, `->` -> `Arrow`, `--` -> comment.
    fn lex_minus(&mut self, start: Position) -> Token {
        self.cursor.advance(); // consume '-'
        match self.cursor.peek() {
            Some('=') => {
                self.cursor.advance();
                self.token(TokenKind::MinusAssign, start)
            }
            Some('>') => {
                self.cursor.advance();
                self.token(TokenKind::Arrow, start)
            }
            Some('-') => {
                self.cursor.advance();
                self.lex_comment_body(start)
            }
            _ => self.token(TokenKind::Minus, start),
        }
    }

    /// Scan a comment after `--` has been consumed.
    ///
    /// `--[` followed by `=*[` opens a long-bracket comment of the matching
    /// level; anything else is a line comment running to end-of-line.
    /// Unterminated long comments consume to end of input without aborting.
    fn lex_comment_body(&mut self, start: Position) -> Token {
        if self.cursor.peek() == Some('[') {
            if let Some(level) = self.long_bracket_level() {
                if !self.scan_long_bracket(level) {
                    self.errors.push(LexError::new(
                        LexErrorKind::UnterminatedComment,
                        Span::new(start, self.cursor.pos()),
                    ));
                }
                return self.token(TokenKind::Comment, start);
            }
        }
        self.cursor.advance_while(|c| c != '\n');
        self.token(TokenKind::Comment, start)
    }

    // ── Long brackets ──────────────────────────────────────────────────

    /// If the cursor sits on `[=*[`, return the `=` count without consuming.
    fn long_bracket_level(&self) -> Option<u32> {
        if self.cursor.peek() != Some('[') {
            return None;
        }
        let mut n = 1;
        let mut level = 0u32;
        while self.cursor.peek_nth(n) == Some('=') {
            level += 1;
            n += 1;
        }
        if self.cursor.peek_nth(n) == Some('[') {
            Some(level)
        } else {
            None
        }
    }

    /// Consume `[=*[ ... ]=*]` at the given level. Returns whether the
    /// closing bracket was found; on `false` everything up to end of
    /// input has been consumed.
    fn scan_long_bracket(&mut self, level: u32) -> bool {
        // Opening bracket: '[' '='* '['.
        for _ in 0..level + 2 {
            self.cursor.advance();
        }
        loop {
            match self.cursor.peek() {
                None => return false,
                Some(']') => {
                    let mut n = 1;
                    let mut closes = true;
                    for _ in 0..level {
                        if self.cursor.peek_nth(n) != Some('=') {
                            closes = false;
                            break;
                        }
                        n += 1;
                    }
                    if closes && self.cursor.peek_nth(n) == Some(']') {
                        for _ in 0..level + 2 {
                            self.cursor.advance();
                        }
                        return true;
                    }
                    self.cursor.advance();
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    /// `[` -> long-bracket string if `[=*[` follows, else `LBracket`.
    fn lex_bracket(&mut self, start: Position) -> Token {
        if let Some(level) = self.long_bracket_level() {
            if !self.scan_long_bracket(level) {
                self.errors.push(LexError::new(
                    LexErrorKind::UnterminatedLongString,
                    Span::new(start, self.cursor.pos()),
                ));
            }
            return self.token(TokenKind::Str, start);
        }
        self.single_char(TokenKind::LBracket, start)
    }

    // ── Numbers ────────────────────────────────────────────────────────

    /// Lex a number literal starting with a digit.
    ///
    /// Handles decimal, hex (`0x`), binary (`0b`), fractions, and
    /// scientific notation. Underscore separators are allowed anywhere
    /// between digits.
    fn lex_number(&mut self, start: Position) -> Token {
        let first = self.cursor.advance().unwrap();

        if first == '0' {
            match self.cursor.peek() {
                Some('x' | 'X') => {
                    self.cursor.advance();
                    self.cursor
                        .advance_while(|c| c.is_ascii_hexdigit() || c == '_');
                    return self.token(TokenKind::Number, start);
                }
                Some('b' | 'B') => {
                    self.cursor.advance();
                    self.cursor
                        .advance_while(|c| c == '0' || c == '1' || c == '_');
                    return self.token(TokenKind::Number, start);
                }
                _ => {}
            }
        }

        self.cursor.advance_while(|c| c.is_ascii_digit() || c == '_');

        // Fraction: `.` followed by a digit (not `..` concatenation).
        if self.cursor.peek() == Some('.')
            && self.cursor.peek_next().is_some_and(|c| c.is_ascii_digit())
        {
            self.cursor.advance(); // '.'
            self.cursor.advance_while(|c| c.is_ascii_digit() || c == '_');
        }

        if matches!(self.cursor.peek(), Some('e' | 'E')) {
            self.lex_exponent();
        }

        self.token(TokenKind::Number, start)
    }

    /// Lex the exponent part: `e`/`E`, optional sign, digits.
    fn lex_exponent(&mut self) {
        self.cursor.advance(); // 'e'/'E'
        if matches!(self.cursor.peek(), Some('+' | '-')) {
            self.cursor.advance();
        }
        self.cursor.advance_while(|c| c.is_ascii_digit() || c == '_');
    }

    /// `.` -> `Dot`, `..` -> `Concat`, `..=` -> `ConcatAssign`,
    /// `...` -> `Vararg`, `.5` -> `Number`.
    fn lex_dot(&mut self, start: Position) -> Token {
        if self.cursor.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            // Dot-prefixed number literal.
            self.cursor.advance(); // '.'
            self.cursor.advance_while(|c| c.is_ascii_digit() || c == '_');
            if matches!(self.cursor.peek(), Some('e' | 'E')) {
                self.lex_exponent();
            }
            return self.token(TokenKind::Number, start);
        }

        self.cursor.advance(); // '.'
        if self.cursor.peek() == Some('.') {
            self.cursor.advance();
            match self.cursor.peek() {
                Some('.') => {
                    self.cursor.advance();
                    self.token(TokenKind::Vararg, start)
                }
                Some('=') => {
                    self.cursor.advance();
                    self.token(TokenKind::ConcatAssign, start)
                }
                _ => self.token(TokenKind::Concat, start),
            }
        } else {
            self.token(TokenKind::Dot, start)
        }
    }

    /// `/` -> `Slash`, `/=` -> `SlashAssign`, `//` -> `DoubleSlash`,
    /// `//=` -> `DoubleSlashAssign`.
    fn lex_slash(&mut self, start: Position) -> Token {
        self.cursor.advance(); // '/'
        match self.cursor.peek() {
            Some('/') => {
                self.cursor.advance();
                if self.cursor.peek() == Some('=') {
                    self.cursor.advance();
                    self.token(TokenKind::DoubleSlashAssign, start)
                } else {
                    self.token(TokenKind::DoubleSlash, start)
                }
            }
            Some('=') => {
                self.cursor.advance();
                self.token(TokenKind::SlashAssign, start)
            }
            _ => self.token(TokenKind::Slash, start),
        }
    }

    // ── Strings ────────────────────────────────────────────────────────

    /// Lex a single- or double-quoted string.
    ///
    /// Terminates on the matching quote or on an unescaped newline; the
    /// newline is not consumed, so the next token starts on it.
    fn lex_quoted_string(&mut self, start: Position, quote: char) -> Token {
        self.cursor.advance(); // opening quote
        loop {
            match self.cursor.peek() {
                None => {
                    self.errors.push(LexError::new(
                        LexErrorKind::UnterminatedString,
                        Span::new(start, self.cursor.pos()),
                    ));
                    return self.token(TokenKind::Str, start);
                }
                Some('\n') => {
                    self.errors.push(LexError::new(
                        LexErrorKind::UnterminatedString,
                        Span::new(start, self.cursor.pos()),
                    ));
                    return self.token(TokenKind::Str, start);
                }
                Some(c) if c == quote => {
                    self.cursor.advance();
                    return self.token(TokenKind::Str, start);
                }
                Some('\\') => {
                    self.cursor.advance();
                    if self.cursor.peek().is_some() {
                        self.cursor.advance();
                    }
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    /// Lex a backtick-delimited interpolated string.
    ///
    /// `{...}` spans are scanned with brace-depth counting and included
    /// verbatim in the token; their substructure is recovered later by
    /// re-lexing.
    fn lex_interpolated_string(&mut self, start: Position) -> Token {
        self.cursor.advance(); // '`'
        let mut brace_depth = 0u32;
        loop {
            match self.cursor.peek() {
                None => {
                    self.errors.push(LexError::new(
                        LexErrorKind::UnterminatedInterpolatedString,
                        Span::new(start, self.cursor.pos()),
                    ));
                    return self.token(TokenKind::InterpolatedString, start);
                }
                Some('`') if brace_depth == 0 => {
                    self.cursor.advance();
                    return self.token(TokenKind::InterpolatedString, start);
                }
                Some('{') => {
                    brace_depth += 1;
                    self.cursor.advance();
                }
                Some('}') => {
                    brace_depth = brace_depth.saturating_sub(1);
                    self.cursor.advance();
                }
                Some('\\') => {
                    self.cursor.advance();
                    if self.cursor.peek().is_some() {
                        self.cursor.advance();
                    }
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    // ── Identifiers and keywords ───────────────────────────────────────

    /// Lex an identifier or keyword.
    fn lex_ident(&mut self, start: Position) -> Token {
        self.cursor.advance();
        self.cursor.advance_while(is_ident_continue);
        let text = self.cursor.text_from(start);
        let kind = keyword_from_str(text).unwrap_or(TokenKind::Identifier);
        self.token(kind, start)
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.emitted_eof {
            return None;
        }
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            self.emitted_eof = true;
        }
        Some(token)
    }
}

/// Whether a character can start an identifier.
fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Whether a character can continue an identifier.
fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let (tokens, _) = Lexer::tokenize(source);
        tokens.iter().map(|t| t.kind).collect()
    }

    fn kinds_no_trivia(source: &str) -> Vec<TokenKind> {
        let (tokens, _) = Lexer::tokenize(source);
        tokens
            .iter()
            .filter(|t| !t.is_trivia())
            .map(|t| t.kind)
            .collect()
    }

    /// Concatenating every lexeme must reproduce the source exactly.
    fn assert_lossless(source: &str) {
        let (tokens, _) = Lexer::tokenize(source);
        let rebuilt: String = tokens.iter().map(|t| t.text(source)).collect();
        assert_eq!(rebuilt, source, "lossless round-trip failed");
    }

    #[test]
    fn lex_local_declaration() {
        assert_eq!(
            kinds_no_trivia("local x = 42"),
            vec![
                TokenKind::Local,
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::Number,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn trivia_is_preserved() {
        assert_eq!(
            kinds("x -- hi\ny"),
            vec![
                TokenKind::Identifier,
                TokenKind::Whitespace,
                TokenKind::Comment,
                TokenKind::Newline,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lossless_round_trip() {
        for src in [
            "local x = 1 + 2\nprint(x)",
            "-- comment\nlocal s = 'a\\'b'",
            "while true do\n\tbreak\nend",
            "local t = { a = 1; b = 2, [k] = v }",
            "x += 1 y ..= 'z'",
            "--[[ block\ncomment ]] local y",
            "local v = `a{1 + 2}b`",
            "if x ~= nil then return x end",
        ] {
            assert_lossless(src);
        }
    }

    #[test]
    fn long_comment_levels() {
        // Level 2 comment containing a level-0 closer: stays one comment.
        assert_eq!(
            kinds_no_trivia("--[==[ a ]] b ]==] x"),
            vec![TokenKind::Identifier, TokenKind::Eof]
        );
        // Mismatched level never closes; consumes to EOF with an error.
        let (tokens, errors) = Lexer::tokenize("--[==[ never closed ]=]");
        assert_eq!(tokens[0].kind, TokenKind::Comment);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, LexErrorKind::UnterminatedComment);
    }

    #[test]
    fn long_string_literal() {
        assert_eq!(
            kinds_no_trivia("local s = [[multi\nline]]"),
            vec![
                TokenKind::Local,
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::Str,
                TokenKind::Eof,
            ]
        );
        assert_lossless("local s = [=[ has ]] inside ]=]");
    }

    #[test]
    fn number_forms() {
        for src in ["42", ".5", "1_000_000.5e+2", "0xFF", "0b1010", "3e-4", "1.5E2"] {
            let (tokens, errors) = Lexer::tokenize(src);
            assert_eq!(tokens[0].kind, TokenKind::Number, "source: {src}");
            assert_eq!(tokens[0].text(src), src, "source: {src}");
            assert!(errors.is_empty(), "source: {src}");
        }
    }

    #[test]
    fn unterminated_string_leaves_newline() {
        let src = "local s = \"oops\nx";
        let (tokens, errors) = Lexer::tokenize(src);
        let significant: Vec<_> = tokens.iter().filter(|t| !t.is_trivia()).collect();
        assert_eq!(significant[3].kind, TokenKind::Str);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, LexErrorKind::UnterminatedString);
        // The newline is not consumed by the string.
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Newline));
        assert_lossless(src);
    }

    #[test]
    fn interpolated_string_with_nested_braces() {
        let src = "`value: {f({1, 2})}!`";
        let (tokens, errors) = Lexer::tokenize(src);
        assert_eq!(tokens[0].kind, TokenKind::InterpolatedString);
        assert_eq!(tokens[0].text(src), src);
        assert!(errors.is_empty());
    }

    #[test]
    fn compound_operators_longest_match() {
        assert_eq!(
            kinds_no_trivia("a //= b"),
            vec![
                TokenKind::Identifier,
                TokenKind::DoubleSlashAssign,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            kinds_no_trivia("a ..= b .. c"),
            vec![
                TokenKind::Identifier,
                TokenKind::ConcatAssign,
                TokenKind::Identifier,
                TokenKind::Concat,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            kinds_no_trivia("f(...)"),
            vec![
                TokenKind::Identifier,
                TokenKind::LParen,
                TokenKind::Vararg,
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn type_annotation_tokens() {
        assert_eq!(
            kinds_no_trivia("local x: number? = nil"),
            vec![
                TokenKind::Local,
                TokenKind::Identifier,
                TokenKind::Colon,
                TokenKind::Identifier,
                TokenKind::Question,
                TokenKind::Assign,
                TokenKind::Nil,
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            kinds_no_trivia("x :: T | U"),
            vec![
                TokenKind::Identifier,
                TokenKind::DoubleColon,
                TokenKind::Identifier,
                TokenKind::Pipe,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn unrecognized_byte_is_one_error_token() {
        let (tokens, errors) = Lexer::tokenize("a $ b");
        let significant: Vec<_> = tokens
            .iter()
            .filter(|t| !t.is_trivia())
            .map(|t| t.kind)
            .collect();
        assert_eq!(
            significant,
            vec![
                TokenKind::Identifier,
                TokenKind::Error,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, LexErrorKind::UnexpectedCharacter('$'));
    }

    #[test]
    fn positions_track_lines() {
        let (tokens, _) = Lexer::tokenize("x\ny");
        // y starts at line 2, column 1.
        let y = &tokens[2];
        assert_eq!(y.kind, TokenKind::Identifier);
        assert_eq!(y.span.start.line, 2);
        assert_eq!(y.span.start.column, 1);
        assert_eq!(y.span.start.offset, 2);
    }
}

//! Typed AST for Luau.
//!
//! Statements, expressions, and type annotations are three disjoint
//! tagged enums (`Stat`, `Expr`, `TypeAnnot`), one struct per variant.
//! Every node carries a `Span` exposed via `span()`. Error variants are
//! well-formed placeholders: an `ErrorExpr` is a legal expression, an
//! `ErrorStat` a legal statement, so downstream passes never special-case
//! missing data.

pub mod expr;
pub mod stat;
pub mod types;

use serde::Serialize;

use lupa_common::span::Span;

pub use expr::*;
pub use stat::*;
pub use types::*;

use crate::docs::DocComment;

/// An identifier with its source span.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Name {
    pub text: String,
    pub span: Span,
}

impl Name {
    pub fn new(text: impl Into<String>, span: Span) -> Self {
        Self {
            text: text.into(),
            span,
        }
    }
}

/// A comment preserved from the token stream, `--` prefix included.
///
/// The chunk keeps its comments in source order so the checker can scan
/// them for ignore directives without re-lexing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comment {
    pub text: String,
    pub span: Span,
}

impl Comment {
    /// The comment content with the `--` prefix (and one leading space)
    /// stripped. Long-bracket comments are returned unchanged past `--`.
    pub fn content(&self) -> &str {
        let rest = self.text.strip_prefix("--").unwrap_or(&self.text);
        rest.strip_prefix(' ').unwrap_or(rest)
    }

    /// The 1-based line this comment starts on.
    pub fn line(&self) -> u32 {
        self.span.start.line
    }
}

/// The root of a parsed file: a statement block plus the comment stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chunk {
    pub block: Block,
    pub comments: Vec<Comment>,
    pub span: Span,
}

/// A sequence of statements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub stats: Vec<Stat>,
    pub span: Span,
}

/// A generic type parameter: `T` or `T = string`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenericParam {
    pub name: Name,
    pub default: Option<TypeAnnot>,
    pub span: Span,
}

/// A function parameter with an optional type annotation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Param {
    pub name: Name,
    pub annotation: Option<TypeAnnot>,
    pub span: Span,
}

/// A declared name with an optional type annotation, as in `local` and
/// `for` bindings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Binding {
    pub name: Name,
    pub annotation: Option<TypeAnnot>,
    pub span: Span,
}

/// A function literal body, shared by function expressions, `local
/// function`, and `function` declarations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionExpr {
    pub generics: Vec<GenericParam>,
    pub params: Vec<Param>,
    /// Whether the parameter list ends in `...`.
    pub vararg: bool,
    /// The annotation on `...`, if any (`...: string`).
    pub vararg_annotation: Option<TypeAnnot>,
    pub return_annotation: Option<TypeAnnot>,
    pub body: Block,
    pub span: Span,
}

/// The dotted name path of a `function` declaration, with an optional
/// `:method` suffix: `a.b.c:m`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionName {
    pub path: Vec<Name>,
    pub method: Option<Name>,
    pub span: Span,
}

/// Attachable documentation, stored on declaration statements.
pub type Doc = Option<DocComment>;

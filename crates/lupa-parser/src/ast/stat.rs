//! Statement nodes.

use serde::Serialize;

use lupa_common::span::Span;

use super::{Binding, Block, Doc, Expr, FunctionExpr, FunctionName, GenericParam, Name, TypeAnnot};
use crate::ast::expr::BinaryOp;

/// A Luau statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Stat {
    Local(LocalStat),
    LocalFunction(LocalFunctionStat),
    FunctionDecl(FunctionDeclStat),
    Assign(AssignStat),
    CompoundAssign(CompoundAssignStat),
    If(IfStat),
    While(WhileStat),
    Repeat(RepeatStat),
    NumericFor(NumericForStat),
    GenericFor(GenericForStat),
    Do(DoStat),
    Return(ReturnStat),
    Break(BreakStat),
    Continue(ContinueStat),
    TypeAlias(TypeAliasStat),
    Export(ExportStat),
    Call(CallStat),
    Error(ErrorStat),
}

impl Stat {
    /// The source span of this statement.
    pub fn span(&self) -> Span {
        match self {
            Stat::Local(s) => s.span,
            Stat::LocalFunction(s) => s.span,
            Stat::FunctionDecl(s) => s.span,
            Stat::Assign(s) => s.span,
            Stat::CompoundAssign(s) => s.span,
            Stat::If(s) => s.span,
            Stat::While(s) => s.span,
            Stat::Repeat(s) => s.span,
            Stat::NumericFor(s) => s.span,
            Stat::GenericFor(s) => s.span,
            Stat::Do(s) => s.span,
            Stat::Return(s) => s.span,
            Stat::Break(s) => s.span,
            Stat::Continue(s) => s.span,
            Stat::TypeAlias(s) => s.span,
            Stat::Export(s) => s.span,
            Stat::Call(s) => s.span,
            Stat::Error(s) => s.span,
        }
    }
}

/// `local a, b: T = x, y`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalStat {
    pub bindings: Vec<Binding>,
    pub values: Vec<Expr>,
    pub doc: Doc,
    pub span: Span,
}

/// `local function name(...) ... end`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalFunctionStat {
    pub name: Name,
    pub func: FunctionExpr,
    pub doc: Doc,
    pub span: Span,
}

/// `function a.b:m(...) ... end`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDeclStat {
    pub name: FunctionName,
    pub func: FunctionExpr,
    /// Whether the declared name resolves to a local binding.
    pub is_local: bool,
    pub doc: Doc,
    pub span: Span,
}

/// `a, b = x, y`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignStat {
    pub targets: Vec<Expr>,
    pub values: Vec<Expr>,
    pub span: Span,
}

/// `a += x` and friends.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompoundAssignStat {
    pub target: Expr,
    /// The underlying binary operator (`+` for `+=`, `..` for `..=`, ...).
    pub op: BinaryOp,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IfStat {
    pub condition: Expr,
    pub then_block: Block,
    pub elseif_clauses: Vec<ElseifClause>,
    pub else_block: Option<Block>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElseifClause {
    pub condition: Expr,
    pub block: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WhileStat {
    pub condition: Expr,
    pub body: Block,
    pub span: Span,
}

/// `repeat ... until cond`. The condition sees the body's scope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepeatStat {
    pub body: Block,
    pub condition: Expr,
    pub span: Span,
}

/// `for i = from, to [, step] do ... end`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericForStat {
    pub var: Binding,
    pub from: Expr,
    pub to: Expr,
    pub step: Option<Expr>,
    pub body: Block,
    pub span: Span,
}

/// `for k, v in exprs do ... end`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenericForStat {
    pub vars: Vec<Binding>,
    pub exprs: Vec<Expr>,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoStat {
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnStat {
    pub values: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakStat {
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContinueStat {
    pub span: Span,
}

/// `type Name<T> = body`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeAliasStat {
    pub name: Name,
    pub generics: Vec<GenericParam>,
    pub ty: TypeAnnot,
    pub doc: Doc,
    pub span: Span,
}

/// `export type Name = body`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportStat {
    pub alias: TypeAliasStat,
    pub span: Span,
}

/// A call expression in statement position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallStat {
    /// Always an `Expr::Call` or `Expr::MethodCall`.
    pub call: Expr,
    pub span: Span,
}

/// Placeholder produced by error recovery; a legal statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorStat {
    pub message: String,
    pub span: Span,
}

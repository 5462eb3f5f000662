//! Expression nodes.

use serde::Serialize;

use lupa_common::span::Span;

use super::{FunctionExpr, Name, TypeAnnot};

/// Binary operators, in the surface syntax's spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    Or,
    And,
    Lt,
    Gt,
    LtEq,
    GtEq,
    NotEq,
    Eq,
    Concat,
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
}

impl BinaryOp {
    /// The source spelling of this operator.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Or => "or",
            BinaryOp::And => "and",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::LtEq => "<=",
            BinaryOp::GtEq => ">=",
            BinaryOp::NotEq => "~=",
            BinaryOp::Eq => "==",
            BinaryOp::Concat => "..",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::FloorDiv => "//",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "^",
        }
    }

    /// Whether this is an arithmetic operator (`+ - * / // % ^`).
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOp::Add
                | BinaryOp::Sub
                | BinaryOp::Mul
                | BinaryOp::Div
                | BinaryOp::FloorDiv
                | BinaryOp::Mod
                | BinaryOp::Pow
        )
    }

    /// Whether this is a comparison operator.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Lt
                | BinaryOp::Gt
                | BinaryOp::LtEq
                | BinaryOp::GtEq
                | BinaryOp::NotEq
                | BinaryOp::Eq
        )
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    /// `-`
    Neg,
    /// `not`
    Not,
    /// `#`
    Len,
}

/// A Luau expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    Name(NameExpr),
    Nil(NilLiteral),
    Boolean(BooleanLiteral),
    Number(NumberLiteral),
    Str(StringLiteral),
    Vararg(VarargExpr),
    Function(FunctionExpr),
    Table(TableExpr),
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    Call(CallExpr),
    MethodCall(MethodCallExpr),
    Index(IndexExpr),
    Member(MemberExpr),
    IfElse(IfElseExpr),
    Cast(CastExpr),
    Interpolated(InterpolatedExpr),
    Paren(ParenExpr),
    Error(ErrorExpr),
}

impl Expr {
    /// The source span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Expr::Name(e) => e.span,
            Expr::Nil(e) => e.span,
            Expr::Boolean(e) => e.span,
            Expr::Number(e) => e.span,
            Expr::Str(e) => e.span,
            Expr::Vararg(e) => e.span,
            Expr::Function(e) => e.span,
            Expr::Table(e) => e.span,
            Expr::Binary(e) => e.span,
            Expr::Unary(e) => e.span,
            Expr::Call(e) => e.span,
            Expr::MethodCall(e) => e.span,
            Expr::Index(e) => e.span,
            Expr::Member(e) => e.span,
            Expr::IfElse(e) => e.span,
            Expr::Cast(e) => e.span,
            Expr::Interpolated(e) => e.span,
            Expr::Paren(e) => e.span,
            Expr::Error(e) => e.span,
        }
    }
}

/// A bare identifier reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NameExpr {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NilLiteral {
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BooleanLiteral {
    pub value: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberLiteral {
    pub value: f64,
    pub span: Span,
}

/// A string literal with its decoded value (escapes processed, quotes
/// and long brackets stripped).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StringLiteral {
    pub value: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarargExpr {
    pub span: Span,
}

/// A table constructor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableExpr {
    pub fields: Vec<TableField>,
    pub span: Span,
}

/// One field of a table constructor, in source order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TableField {
    /// `name = value`
    Named { key: Name, value: Expr },
    /// `[key] = value`
    Computed { key: Expr, value: Expr },
    /// A positional array item.
    Item(Expr),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
    /// Span of the operator token itself, for precise diagnostics.
    pub op_span: Span,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub operand: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    pub args: Vec<Expr>,
    pub span: Span,
}

/// `object:method(args)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodCallExpr {
    pub object: Box<Expr>,
    pub method: Name,
    pub args: Vec<Expr>,
    pub span: Span,
}

/// `object[index]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexExpr {
    pub object: Box<Expr>,
    pub index: Box<Expr>,
    pub span: Span,
}

/// `object.member`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberExpr {
    pub object: Box<Expr>,
    pub member: Name,
    pub span: Span,
}

/// `if c then a elseif c2 then b else d` in expression position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IfElseExpr {
    pub condition: Box<Expr>,
    pub then_expr: Box<Expr>,
    /// `(condition, value)` pairs for each `elseif` arm.
    pub elseif_arms: Vec<(Expr, Expr)>,
    pub else_expr: Box<Expr>,
    pub span: Span,
}

/// A type cast: `expr :: T`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CastExpr {
    pub expr: Box<Expr>,
    pub ty: TypeAnnot,
    pub span: Span,
}

/// A backtick-delimited interpolated string.
///
/// The part list accommodates full `{expr}` sub-expression parsing; the
/// parser currently stores the whole content as a single `Str` part.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterpolatedExpr {
    pub parts: Vec<InterpolatedPart>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum InterpolatedPart {
    Str(StringLiteral),
    Expr(Expr),
}

/// A parenthesized expression. Kept as a node because parentheses
/// truncate multiple values in Lua.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParenExpr {
    pub expr: Box<Expr>,
    pub span: Span,
}

/// Placeholder produced by error recovery; a legal expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorExpr {
    pub message: String,
    pub span: Span,
}

//! Pratt expression parser.
//!
//! Binary operators use binding-power pairs; `(l, r)` with `l < r` is
//! left-associative, `l > r` right-associative. Concatenation and `^`
//! are the two right-associative operators; `^` binds tighter than the
//! unary operators so `-2^2` parses as `-(2^2)`.

use lupa_common::token::TokenKind;

use crate::ast::*;

use super::{decode_number, decode_string, interpolated_inner, Parser};
use super::{stats, types};

/// Binding power of the unary operators (`-`, `not`, `#`).
const UNARY_BP: u8 = 13;

/// Binding powers for infix operators, mirroring Luau precedence.
fn binary_power(kind: TokenKind) -> Option<(u8, u8, BinaryOp)> {
    match kind {
        TokenKind::Or => Some((1, 2, BinaryOp::Or)),
        TokenKind::And => Some((3, 4, BinaryOp::And)),
        TokenKind::Lt => Some((5, 6, BinaryOp::Lt)),
        TokenKind::Gt => Some((5, 6, BinaryOp::Gt)),
        TokenKind::LtEq => Some((5, 6, BinaryOp::LtEq)),
        TokenKind::GtEq => Some((5, 6, BinaryOp::GtEq)),
        TokenKind::NotEq => Some((5, 6, BinaryOp::NotEq)),
        TokenKind::Eq => Some((5, 6, BinaryOp::Eq)),
        // Right-associative.
        TokenKind::Concat => Some((8, 7, BinaryOp::Concat)),
        TokenKind::Plus => Some((9, 10, BinaryOp::Add)),
        TokenKind::Minus => Some((9, 10, BinaryOp::Sub)),
        TokenKind::Star => Some((11, 12, BinaryOp::Mul)),
        TokenKind::Slash => Some((11, 12, BinaryOp::Div)),
        TokenKind::DoubleSlash => Some((11, 12, BinaryOp::FloorDiv)),
        TokenKind::Percent => Some((11, 12, BinaryOp::Mod)),
        // Right-associative, tighter than unary.
        TokenKind::Caret => Some((16, 15, BinaryOp::Pow)),
        _ => None,
    }
}

/// Parse an expression at the lowest precedence.
pub(crate) fn parse_expr(p: &mut Parser) -> Expr {
    parse_binary(p, 0)
}

fn parse_binary(p: &mut Parser, min_bp: u8) -> Expr {
    let mut lhs = parse_unary(p);

    loop {
        let Some((lbp, rbp, op)) = binary_power(p.current()) else {
            break;
        };
        if lbp < min_bp {
            break;
        }
        let op_span = p.current_span();
        p.advance();
        let rhs = parse_binary(p, rbp);
        let span = lhs.span().merge(rhs.span());
        lhs = Expr::Binary(BinaryExpr {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            op_span,
            span,
        });
    }

    lhs
}

fn parse_unary(p: &mut Parser) -> Expr {
    let op = match p.current() {
        TokenKind::Minus => UnaryOp::Neg,
        TokenKind::Not => UnaryOp::Not,
        TokenKind::Hash => UnaryOp::Len,
        _ => return parse_suffixed(p),
    };
    let start = p.current_span();
    p.advance();
    let operand = parse_binary(p, UNARY_BP);
    let span = start.merge(operand.span());
    Expr::Unary(UnaryExpr {
        op,
        operand: Box::new(operand),
        span,
    })
}

/// Whether suffix operations (calls, member access, indexing) may attach
/// to this expression. Mirrors Lua's prefix-expression restriction:
/// `"s":upper()` needs parentheses, `f().x` does not.
fn is_prefix_expr(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Name(_)
            | Expr::Paren(_)
            | Expr::Call(_)
            | Expr::MethodCall(_)
            | Expr::Index(_)
            | Expr::Member(_)
            | Expr::Error(_)
    )
}

/// Parse a primary expression followed by its suffix chain:
/// `.name`, `[index]`, `(args)`, `:method(args)`, string/table call
/// sugar, and `:: T` casts.
pub(crate) fn parse_suffixed(p: &mut Parser) -> Expr {
    let mut expr = parse_primary(p);

    loop {
        match p.current() {
            TokenKind::DoubleColon => {
                p.advance();
                let ty = types::parse_type(p);
                let span = expr.span().merge(ty.span());
                expr = Expr::Cast(CastExpr {
                    expr: Box::new(expr),
                    ty,
                    span,
                });
            }
            TokenKind::Dot if is_prefix_expr(&expr) => {
                p.advance();
                let Some(member) = p.member_name("member name") else {
                    break;
                };
                let span = expr.span().merge(member.span);
                expr = Expr::Member(MemberExpr {
                    object: Box::new(expr),
                    member,
                    span,
                });
            }
            TokenKind::LBracket if is_prefix_expr(&expr) => {
                p.advance();
                let index = parse_expr(p);
                p.expect(TokenKind::RBracket);
                let span = p.span_from(expr.span());
                expr = Expr::Index(IndexExpr {
                    object: Box::new(expr),
                    index: Box::new(index),
                    span,
                });
            }
            TokenKind::Colon if is_prefix_expr(&expr) => {
                p.advance();
                let Some(method) = p.member_name("method name") else {
                    break;
                };
                let args = if p.at_any(&[TokenKind::LParen, TokenKind::Str, TokenKind::LBrace]) {
                    parse_call_args(p)
                } else {
                    p.error("expected arguments after method name");
                    Vec::new()
                };
                let span = p.span_from(expr.span());
                expr = Expr::MethodCall(MethodCallExpr {
                    object: Box::new(expr),
                    method,
                    args,
                    span,
                });
            }
            TokenKind::LParen | TokenKind::Str | TokenKind::LBrace if is_prefix_expr(&expr) => {
                let args = parse_call_args(p);
                let span = p.span_from(expr.span());
                expr = Expr::Call(CallExpr {
                    callee: Box::new(expr),
                    args,
                    span,
                });
            }
            _ => break,
        }
    }

    expr
}

/// Parse call arguments: `(a, b)`, or the single-argument sugar forms
/// `f "string"` and `f { table }`.
fn parse_call_args(p: &mut Parser) -> Vec<Expr> {
    match p.current() {
        TokenKind::Str => {
            let text = p.current_text().to_string();
            let token = p.advance();
            vec![Expr::Str(StringLiteral {
                value: decode_string(&text),
                span: token.span,
            })]
        }
        TokenKind::LBrace => vec![parse_table(p)],
        _ => {
            p.expect(TokenKind::LParen);
            let mut args = Vec::new();
            if !p.at(TokenKind::RParen) && !p.at(TokenKind::Eof) {
                args = parse_expr_list(p);
            }
            p.expect(TokenKind::RParen);
            args
        }
    }
}

/// Parse a comma-separated expression list (at least one expression).
pub(crate) fn parse_expr_list(p: &mut Parser) -> Vec<Expr> {
    let mut exprs = vec![parse_expr(p)];
    while p.eat(TokenKind::Comma) {
        exprs.push(parse_expr(p));
    }
    exprs
}

fn parse_primary(p: &mut Parser) -> Expr {
    match p.current() {
        TokenKind::Nil => {
            let token = p.advance();
            Expr::Nil(NilLiteral { span: token.span })
        }
        TokenKind::True | TokenKind::False => {
            let value = p.at(TokenKind::True);
            let token = p.advance();
            Expr::Boolean(BooleanLiteral {
                value,
                span: token.span,
            })
        }
        TokenKind::Number => {
            let text = p.current_text().to_string();
            let token = p.advance();
            Expr::Number(NumberLiteral {
                value: decode_number(&text),
                span: token.span,
            })
        }
        TokenKind::Str => {
            let text = p.current_text().to_string();
            let token = p.advance();
            Expr::Str(StringLiteral {
                value: decode_string(&text),
                span: token.span,
            })
        }
        TokenKind::InterpolatedString => {
            let text = p.current_text().to_string();
            let token = p.advance();
            // The whole content is kept as a single literal part; the
            // part list already accommodates future `{expr}` re-lexing.
            Expr::Interpolated(InterpolatedExpr {
                parts: vec![InterpolatedPart::Str(StringLiteral {
                    value: interpolated_inner(&text).to_string(),
                    span: token.span,
                })],
                span: token.span,
            })
        }
        TokenKind::Vararg => {
            let token = p.advance();
            Expr::Vararg(VarargExpr { span: token.span })
        }
        TokenKind::Function => {
            let start = p.current_span();
            p.advance();
            Expr::Function(parse_function_body(p, start))
        }
        TokenKind::LBrace => parse_table(p),
        TokenKind::If => parse_if_else_expr(p),
        TokenKind::LParen => {
            let start = p.current_span();
            p.advance();
            let inner = parse_expr(p);
            p.expect(TokenKind::RParen);
            Expr::Paren(ParenExpr {
                expr: Box::new(inner),
                span: p.span_from(start),
            })
        }
        TokenKind::Identifier
        | TokenKind::Type
        | TokenKind::Typeof
        | TokenKind::Export
        | TokenKind::Continue => {
            let text = p.current_text().to_string();
            let token = p.advance();
            Expr::Name(NameExpr {
                name: text,
                span: token.span,
            })
        }
        found => {
            let message = format!("expected expression, found {}", found.describe());
            p.error(message.clone());
            Expr::Error(ErrorExpr {
                message,
                span: p.current_span(),
            })
        }
    }
}

/// Parse a table constructor. The opening `{` is the current token.
pub(crate) fn parse_table(p: &mut Parser) -> Expr {
    let start = p.current_span();
    p.advance(); // {

    let mut fields = Vec::new();
    while !p.at(TokenKind::RBrace) && !p.at(TokenKind::Eof) {
        let before = p.current_index();
        if p.at(TokenKind::LBracket) {
            p.advance();
            let key = parse_expr(p);
            p.expect(TokenKind::RBracket);
            p.expect(TokenKind::Assign);
            let value = parse_expr(p);
            fields.push(TableField::Computed { key, value });
        } else if p.at_member_name() && p.nth(1) == TokenKind::Assign {
            let key = p.member_name("field name").expect("checked name token");
            p.advance(); // =
            let value = parse_expr(p);
            fields.push(TableField::Named { key, value });
        } else {
            let item = parse_expr(p);
            let errored = matches!(item, Expr::Error(_));
            fields.push(TableField::Item(item));
            if errored && p.current_index() == before {
                break;
            }
        }
        if !p.eat(TokenKind::Comma) && !p.eat(TokenKind::Semicolon) {
            break;
        }
    }
    p.expect(TokenKind::RBrace);

    Expr::Table(TableExpr {
        fields,
        span: p.span_from(start),
    })
}

/// Parse `if c then a [elseif c2 then b]* else d` in expression position.
/// The `if` keyword is the current token.
fn parse_if_else_expr(p: &mut Parser) -> Expr {
    let start = p.current_span();
    p.advance(); // if
    let condition = parse_expr(p);
    p.expect(TokenKind::Then);
    let then_expr = parse_expr(p);

    let mut elseif_arms = Vec::new();
    while p.eat(TokenKind::Elseif) {
        let cond = parse_expr(p);
        p.expect(TokenKind::Then);
        let value = parse_expr(p);
        elseif_arms.push((cond, value));
    }

    p.expect(TokenKind::Else);
    let else_expr = parse_expr(p);

    let span = p.span_from(start);
    Expr::IfElse(IfElseExpr {
        condition: Box::new(condition),
        then_expr: Box::new(then_expr),
        elseif_arms,
        else_expr: Box::new(else_expr),
        span,
    })
}

/// Parse a function body after the `function` keyword (or after the name
/// of a function declaration): optional generics, parameter list,
/// optional return annotation, block, `end`.
pub(crate) fn parse_function_body(p: &mut Parser, start: lupa_common::span::Span) -> FunctionExpr {
    let generics = if p.at(TokenKind::Lt) {
        types::parse_generic_params(p)
    } else {
        Vec::new()
    };

    p.expect(TokenKind::LParen);
    let mut params = Vec::new();
    let mut vararg = false;
    let mut vararg_annotation = None;

    if !p.at(TokenKind::RParen) && !p.at(TokenKind::Eof) {
        loop {
            if p.at(TokenKind::Vararg) {
                p.advance();
                vararg = true;
                if p.eat(TokenKind::Colon) {
                    vararg_annotation = Some(types::parse_type(p));
                }
                break;
            }
            let Some(name) = p.name("parameter name") else {
                break;
            };
            let annotation = if p.eat(TokenKind::Colon) {
                Some(types::parse_type(p))
            } else {
                None
            };
            let span = match &annotation {
                Some(ty) => name.span.merge(ty.span()),
                None => name.span,
            };
            params.push(Param {
                name,
                annotation,
                span,
            });
            if !p.eat(TokenKind::Comma) {
                break;
            }
        }
    }
    p.expect(TokenKind::RParen);

    let return_annotation = if p.eat(TokenKind::Colon) {
        Some(types::parse_type(p))
    } else {
        None
    };

    let body = stats::parse_block(p);
    p.expect(TokenKind::End);

    FunctionExpr {
        generics,
        params,
        vararg,
        vararg_annotation,
        return_annotation,
        body,
        span: p.span_from(start),
    }
}

//! Statement parsing.
//!
//! Statements dispatch on the leading token; the fallback is "expression
//! statement", which becomes an assignment, a compound assignment, or a
//! call statement depending on what follows. Anything else becomes an
//! `ErrorStat` and the parser synchronizes to the next statement keyword.

use lupa_common::span::Span;
use lupa_common::token::TokenKind;

use crate::ast::*;

use super::{exprs, types, Parser};

/// Tokens that terminate a block.
const BLOCK_END: &[TokenKind] = &[
    TokenKind::End,
    TokenKind::Else,
    TokenKind::Elseif,
    TokenKind::Until,
    TokenKind::Eof,
];

fn error_stat(message: impl Into<String>, span: Span) -> Stat {
    Stat::Error(ErrorStat {
        message: message.into(),
        span,
    })
}

fn kind_is_namelike(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Identifier
            | TokenKind::Type
            | TokenKind::Typeof
            | TokenKind::Export
            | TokenKind::Continue
    )
}

/// Parse a whole file: statements until `Eof`, tolerating stray block
/// terminators so the parser never gives up before the end of input.
pub(crate) fn parse_chunk(p: &mut Parser) -> Block {
    let start = p.here();
    let mut stats = Vec::new();

    loop {
        let mut block = parse_block(p);
        stats.append(&mut block.stats);
        if p.at(TokenKind::Eof) {
            break;
        }
        // A dangling `end`/`else`/`until` at the top level.
        let kind = p.current();
        let span = p.current_span();
        let message = format!("unexpected {}", kind.describe());
        p.error(message.clone());
        p.advance();
        stats.push(error_stat(message, span));
    }

    let span = p.span_from(start);
    Block { stats, span }
}

/// Parse statements until a block terminator.
pub(crate) fn parse_block(p: &mut Parser) -> Block {
    let start = p.here();
    let mut stats = Vec::new();

    loop {
        while p.eat(TokenKind::Semicolon) {}
        if p.at_any(BLOCK_END) {
            break;
        }

        let before = p.current_index();
        let stat = parse_stat(p);
        let errored = matches!(stat, Stat::Error(_));
        stats.push(stat);

        if errored {
            // Panic mode: make sure we consume something, then skip to
            // the next statement-starting keyword.
            if p.current_index() == before && !p.at_any(BLOCK_END) {
                p.advance();
            }
            if !p.at_any(BLOCK_END) {
                p.sync();
            }
        }
    }

    let span = p.span_from(start);
    Block { stats, span }
}

fn parse_stat(p: &mut Parser) -> Stat {
    match p.current() {
        TokenKind::Local => parse_local(p),
        TokenKind::If => parse_if(p),
        TokenKind::While => parse_while(p),
        TokenKind::Repeat => parse_repeat(p),
        TokenKind::For => parse_for(p),
        TokenKind::Do => parse_do(p),
        TokenKind::Return => parse_return(p),
        TokenKind::Break => {
            let token = p.advance();
            Stat::Break(BreakStat { span: token.span })
        }
        TokenKind::Function => parse_function_decl(p),
        TokenKind::Export => parse_export(p),
        TokenKind::Type if at_type_alias(p) => {
            let doc = p.doc_comment_before();
            match parse_type_alias_stat(p, doc) {
                Some(alias) => Stat::TypeAlias(alias),
                None => error_stat("malformed type alias", p.here()),
            }
        }
        TokenKind::Continue if !continues_expression(p.nth(1)) => {
            let token = p.advance();
            Stat::Continue(ContinueStat { span: token.span })
        }
        _ => parse_expr_stat(p),
    }
}

/// Whether `type` here starts a type alias rather than a call to the
/// `type` builtin: `type Name =` or `type Name<`.
fn at_type_alias(p: &Parser) -> bool {
    kind_is_namelike(p.nth(1)) && matches!(p.nth(2), TokenKind::Assign | TokenKind::Lt)
}

/// Whether a token after `continue` turns it into an expression
/// statement head (`continue = 1`, `continue.field`, `continue(...)`).
fn continues_expression(kind: TokenKind) -> bool {
    kind.is_compound_assign()
        || matches!(
            kind,
            TokenKind::Assign
                | TokenKind::Comma
                | TokenKind::Dot
                | TokenKind::LBracket
                | TokenKind::Colon
                | TokenKind::DoubleColon
                | TokenKind::LParen
                | TokenKind::Str
                | TokenKind::LBrace
        )
}

// ── Declarations ───────────────────────────────────────────────────────

fn parse_local(p: &mut Parser) -> Stat {
    let doc = p.doc_comment_before();
    let start = p.current_span();
    p.advance(); // local

    if p.at(TokenKind::Function) {
        p.advance();
        let Some(name) = p.name("function name") else {
            return error_stat("expected function name", p.here());
        };
        let func = exprs::parse_function_body(p, start);
        return Stat::LocalFunction(LocalFunctionStat {
            name,
            func,
            doc,
            span: p.span_from(start),
        });
    }

    let mut bindings = Vec::new();
    loop {
        let Some(binding) = parse_binding(p) else {
            return error_stat("expected binding name after `local`", p.here());
        };
        bindings.push(binding);
        if !p.eat(TokenKind::Comma) {
            break;
        }
    }

    let values = if p.eat(TokenKind::Assign) {
        exprs::parse_expr_list(p)
    } else {
        Vec::new()
    };

    Stat::Local(LocalStat {
        bindings,
        values,
        doc,
        span: p.span_from(start),
    })
}

fn parse_binding(p: &mut Parser) -> Option<Binding> {
    let name = p.name("binding name")?;
    let annotation = if p.eat(TokenKind::Colon) {
        Some(types::parse_type(p))
    } else {
        None
    };
    let span = match &annotation {
        Some(ty) => name.span.merge(ty.span()),
        None => name.span,
    };
    Some(Binding {
        name,
        annotation,
        span,
    })
}

fn parse_function_decl(p: &mut Parser) -> Stat {
    let doc = p.doc_comment_before();
    let start = p.current_span();
    p.advance(); // function

    let Some(first) = p.name("function name") else {
        return error_stat("expected function name", p.here());
    };
    let mut path = vec![first];
    while p.eat(TokenKind::Dot) {
        match p.member_name("member name") {
            Some(name) => path.push(name),
            None => break,
        }
    }
    let method = if p.eat(TokenKind::Colon) {
        p.member_name("method name")
    } else {
        None
    };
    let name_span = {
        let first_span = path[0].span;
        let last = method.as_ref().map(|m| m.span).unwrap_or_else(|| {
            path.last().map(|n| n.span).unwrap_or(first_span)
        });
        first_span.merge(last)
    };

    let func = exprs::parse_function_body(p, start);
    Stat::FunctionDecl(FunctionDeclStat {
        name: FunctionName {
            path,
            method,
            span: name_span,
        },
        func,
        is_local: false,
        doc,
        span: p.span_from(start),
    })
}

fn parse_type_alias_stat(p: &mut Parser, doc: Doc) -> Option<TypeAliasStat> {
    let start = p.current_span();
    p.advance(); // type
    let name = p.name("type alias name")?;
    let generics = if p.at(TokenKind::Lt) {
        types::parse_generic_params(p)
    } else {
        Vec::new()
    };
    if !p.expect(TokenKind::Assign) {
        return None;
    }
    let ty = types::parse_type(p);
    Some(TypeAliasStat {
        name,
        generics,
        ty,
        doc,
        span: p.span_from(start),
    })
}

fn parse_export(p: &mut Parser) -> Stat {
    let doc = p.doc_comment_before();
    let start = p.current_span();
    p.advance(); // export

    if !p.at(TokenKind::Type) {
        p.error("expected `type` after `export`");
        return error_stat("expected `type` after `export`", p.here());
    }
    match parse_type_alias_stat(p, doc) {
        Some(alias) => Stat::Export(ExportStat {
            span: p.span_from(start),
            alias,
        }),
        None => error_stat("malformed exported type alias", p.here()),
    }
}

// ── Control flow ───────────────────────────────────────────────────────

fn parse_if(p: &mut Parser) -> Stat {
    let start = p.current_span();
    p.advance(); // if
    let condition = exprs::parse_expr(p);
    p.expect(TokenKind::Then);
    let then_block = parse_block(p);

    let mut elseif_clauses = Vec::new();
    let mut else_block = None;
    loop {
        if p.at(TokenKind::Elseif) {
            let clause_start = p.current_span();
            p.advance();
            let cond = exprs::parse_expr(p);
            p.expect(TokenKind::Then);
            let block = parse_block(p);
            elseif_clauses.push(ElseifClause {
                condition: cond,
                block,
                span: p.span_from(clause_start),
            });
        } else if p.eat(TokenKind::Else) {
            else_block = Some(parse_block(p));
            break;
        } else {
            break;
        }
    }
    p.expect(TokenKind::End);

    Stat::If(IfStat {
        condition,
        then_block,
        elseif_clauses,
        else_block,
        span: p.span_from(start),
    })
}

fn parse_while(p: &mut Parser) -> Stat {
    let start = p.current_span();
    p.advance(); // while
    let condition = exprs::parse_expr(p);
    p.expect(TokenKind::Do);
    let body = parse_block(p);
    p.expect(TokenKind::End);
    Stat::While(WhileStat {
        condition,
        body,
        span: p.span_from(start),
    })
}

fn parse_repeat(p: &mut Parser) -> Stat {
    let start = p.current_span();
    p.advance(); // repeat
    let body = parse_block(p);
    p.expect(TokenKind::Until);
    let condition = exprs::parse_expr(p);
    Stat::Repeat(RepeatStat {
        body,
        condition,
        span: p.span_from(start),
    })
}

fn parse_for(p: &mut Parser) -> Stat {
    let start = p.current_span();
    p.advance(); // for

    let Some(first) = parse_binding(p) else {
        return error_stat("expected loop variable after `for`", p.here());
    };

    if p.at(TokenKind::Assign) {
        p.advance();
        let from = exprs::parse_expr(p);
        p.expect(TokenKind::Comma);
        let to = exprs::parse_expr(p);
        let step = if p.eat(TokenKind::Comma) {
            Some(exprs::parse_expr(p))
        } else {
            None
        };
        p.expect(TokenKind::Do);
        let body = parse_block(p);
        p.expect(TokenKind::End);
        return Stat::NumericFor(NumericForStat {
            var: first,
            from,
            to,
            step,
            body,
            span: p.span_from(start),
        });
    }

    let mut vars = vec![first];
    while p.eat(TokenKind::Comma) {
        match parse_binding(p) {
            Some(binding) => vars.push(binding),
            None => break,
        }
    }
    p.expect(TokenKind::In);
    let exprs_list = exprs::parse_expr_list(p);
    p.expect(TokenKind::Do);
    let body = parse_block(p);
    p.expect(TokenKind::End);
    Stat::GenericFor(GenericForStat {
        vars,
        exprs: exprs_list,
        body,
        span: p.span_from(start),
    })
}

fn parse_do(p: &mut Parser) -> Stat {
    let start = p.current_span();
    p.advance(); // do
    let body = parse_block(p);
    p.expect(TokenKind::End);
    Stat::Do(DoStat {
        body,
        span: p.span_from(start),
    })
}

fn parse_return(p: &mut Parser) -> Stat {
    let start = p.current_span();
    p.advance(); // return
    let values = if p.at_any(BLOCK_END) || p.at(TokenKind::Semicolon) {
        Vec::new()
    } else {
        exprs::parse_expr_list(p)
    };
    Stat::Return(ReturnStat {
        values,
        span: p.span_from(start),
    })
}

// ── Expression statements ──────────────────────────────────────────────

/// The statement fallback: parse a suffixed expression, then decide
/// between assignment, compound assignment, and call statement.
fn parse_expr_stat(p: &mut Parser) -> Stat {
    let start = p.current_span();
    let first = exprs::parse_suffixed(p);

    match p.current() {
        TokenKind::Assign | TokenKind::Comma => {
            let mut targets = vec![first];
            while p.eat(TokenKind::Comma) {
                targets.push(exprs::parse_suffixed(p));
            }
            if !p.expect(TokenKind::Assign) {
                return error_stat("malformed assignment", p.span_from(start));
            }
            let values = exprs::parse_expr_list(p);
            Stat::Assign(AssignStat {
                targets,
                values,
                span: p.span_from(start),
            })
        }
        kind if kind.is_compound_assign() => {
            let op = compound_op(kind);
            p.advance();
            let value = exprs::parse_expr(p);
            Stat::CompoundAssign(CompoundAssignStat {
                target: first,
                op,
                value,
                span: p.span_from(start),
            })
        }
        _ => match first {
            Expr::Call(_) | Expr::MethodCall(_) => {
                let span = first.span();
                Stat::Call(CallStat { call: first, span })
            }
            Expr::Error(e) => error_stat(e.message, e.span),
            other => {
                p.error_at("expression cannot be used as a statement", other.span());
                error_stat("expression cannot be used as a statement", other.span())
            }
        },
    }
}

/// The binary operator underlying a compound-assignment token.
fn compound_op(kind: TokenKind) -> BinaryOp {
    match kind {
        TokenKind::PlusAssign => BinaryOp::Add,
        TokenKind::MinusAssign => BinaryOp::Sub,
        TokenKind::StarAssign => BinaryOp::Mul,
        TokenKind::SlashAssign => BinaryOp::Div,
        TokenKind::DoubleSlashAssign => BinaryOp::FloorDiv,
        TokenKind::PercentAssign => BinaryOp::Mod,
        TokenKind::CaretAssign => BinaryOp::Pow,
        TokenKind::ConcatAssign => BinaryOp::Concat,
        _ => unreachable!("not a compound assignment token: {kind:?}"),
    }
}

//! Type annotation parsing.
//!
//! Grammar: `union := intersection ("|" intersection)*`,
//! `intersection := postfix ("&" postfix)*`, where `postfix` applies
//! trailing `?` to a primary. A parenthesized form followed by `->` is a
//! function type; otherwise it must hold exactly one anonymous type.

use lupa_common::span::Span;
use lupa_common::token::TokenKind;

use crate::ast::*;

use super::{decode_number, decode_string, exprs, Parser};

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

fn error_type(message: impl Into<String>, span: Span) -> TypeAnnot {
    TypeAnnot::Error(ErrorTypeAnnot {
        message: message.into(),
        span,
    })
}

/// Parse a type annotation at the lowest precedence (union).
pub(crate) fn parse_type(p: &mut Parser) -> TypeAnnot {
    let first = parse_intersection(p);
    if !p.at(TokenKind::Pipe) {
        return first;
    }
    let mut members = vec![first];
    while p.eat(TokenKind::Pipe) {
        members.push(parse_intersection(p));
    }
    let span = members
        .first()
        .map(|t| t.span())
        .unwrap_or_else(|| p.here())
        .merge(members.last().map(|t| t.span()).unwrap_or_else(|| p.here()));
    TypeAnnot::Union(UnionTypeAnnot { members, span })
}

fn parse_intersection(p: &mut Parser) -> TypeAnnot {
    let first = parse_postfix(p);
    if !p.at(TokenKind::Ampersand) {
        return first;
    }
    let mut members = vec![first];
    while p.eat(TokenKind::Ampersand) {
        members.push(parse_postfix(p));
    }
    let span = members
        .first()
        .map(|t| t.span())
        .unwrap_or_else(|| p.here())
        .merge(members.last().map(|t| t.span()).unwrap_or_else(|| p.here()));
    TypeAnnot::Intersection(IntersectionTypeAnnot { members, span })
}

/// Apply trailing `?` marks to a primary type.
fn parse_postfix(p: &mut Parser) -> TypeAnnot {
    let mut ty = parse_primary(p);
    while p.at(TokenKind::Question) {
        let q = p.advance();
        let span = ty.span().merge(q.span);
        ty = TypeAnnot::Optional(OptionalTypeAnnot {
            inner: Box::new(ty),
            span,
        });
    }
    ty
}

fn parse_primary(p: &mut Parser) -> TypeAnnot {
    match p.current() {
        TokenKind::Typeof => parse_typeof(p),
        TokenKind::Lt => {
            // Generic function type: `<T>(x: T) -> T`.
            let start = p.current_span();
            let generics = parse_generic_params(p);
            if !p.at(TokenKind::LParen) {
                p.error("expected `(` after generic parameters");
                return error_type("expected `(` after generic parameters", p.span_from(start));
            }
            parse_paren_or_function(p, generics, start)
        }
        TokenKind::LParen => {
            let start = p.current_span();
            parse_paren_or_function(p, Vec::new(), start)
        }
        TokenKind::LBrace => parse_table_type(p),
        TokenKind::Str => {
            let text = p.current_text().to_string();
            let token = p.advance();
            TypeAnnot::Literal(LiteralTypeAnnot {
                value: LiteralTypeValue::Str(decode_string(&text)),
                span: token.span,
            })
        }
        TokenKind::True | TokenKind::False => {
            let value = p.at(TokenKind::True);
            let token = p.advance();
            TypeAnnot::Literal(LiteralTypeAnnot {
                value: LiteralTypeValue::Bool(value),
                span: token.span,
            })
        }
        TokenKind::Number => {
            let text = p.current_text().to_string();
            let token = p.advance();
            TypeAnnot::Literal(LiteralTypeAnnot {
                value: LiteralTypeValue::Number(decode_number(&text)),
                span: token.span,
            })
        }
        TokenKind::Vararg => {
            let start = p.current_span();
            p.advance();
            let inner = parse_type(p);
            let span = start.merge(inner.span());
            TypeAnnot::Variadic(VariadicTypeAnnot {
                inner: Box::new(inner),
                span,
            })
        }
        TokenKind::Nil => {
            let token = p.advance();
            TypeAnnot::Reference(TypeReference {
                module: None,
                name: Name::new("nil", token.span),
                args: Vec::new(),
                span: token.span,
            })
        }
        kind if kind_is_namelike(kind) => parse_reference(p),
        found => {
            let message = format!("expected type, found {}", found.describe());
            p.error(message.clone());
            error_type(message, p.current_span())
        }
    }
}

fn parse_typeof(p: &mut Parser) -> TypeAnnot {
    let start = p.current_span();
    p.advance(); // typeof
    if !p.at(TokenKind::LParen) {
        // `typeof` used as a plain type name.
        return TypeAnnot::Reference(TypeReference {
            module: None,
            name: Name::new("typeof", start),
            args: Vec::new(),
            span: start,
        });
    }
    p.advance(); // (
    let expr = exprs::parse_expr(p);
    p.expect(TokenKind::RParen);
    TypeAnnot::Typeof(TypeofAnnot {
        expr: Box::new(expr),
        span: p.span_from(start),
    })
}

/// Parse `Name`, `Mod.Name`, and `Name<args>` references.
fn parse_reference(p: &mut Parser) -> TypeAnnot {
    let Some(first) = p.name("type name") else {
        return error_type("expected type name", p.here());
    };
    let start = first.span;

    let (module, name) = if p.at(TokenKind::Dot) {
        p.advance();
        match p.member_name("type name") {
            Some(second) => (Some(first), second),
            None => (None, first),
        }
    } else {
        (None, first)
    };

    let mut args = Vec::new();
    if p.at(TokenKind::Lt) {
        p.advance();
        loop {
            let before = p.current_index();
            let arg = parse_type(p);
            let errored = matches!(arg, TypeAnnot::Error(_));
            args.push(arg);
            if errored && p.current_index() == before {
                break;
            }
            if !p.eat(TokenKind::Comma) {
                break;
            }
        }
        p.expect(TokenKind::Gt);
    }

    TypeAnnot::Reference(TypeReference {
        module,
        name,
        args,
        span: p.span_from(start),
    })
}

/// After `(`: either a function type (when `->` follows the closing
/// paren) or a single parenthesized type.
fn parse_paren_or_function(
    p: &mut Parser,
    generics: Vec<GenericParam>,
    start: Span,
) -> TypeAnnot {
    p.advance(); // (

    let mut params: Vec<TypeParam> = Vec::new();
    let mut vararg = false;
    if !p.at(TokenKind::RParen) && !p.at(TokenKind::Eof) {
        loop {
            if p.at(TokenKind::Vararg) {
                p.advance();
                vararg = true;
                if !p.at(TokenKind::RParen) {
                    // The variadic element type; recorded via the flag.
                    parse_type(p);
                }
                break;
            }
            let named = kind_is_namelike(p.current()) && p.nth(1) == TokenKind::Colon;
            let name = if named {
                let n = p.name("parameter name");
                p.expect(TokenKind::Colon);
                n
            } else {
                None
            };
            let before = p.current_index();
            let ty = parse_type(p);
            let errored = matches!(ty, TypeAnnot::Error(_));
            let optional = matches!(ty, TypeAnnot::Optional(_));
            params.push(TypeParam { name, ty, optional });
            if errored && p.current_index() == before {
                break;
            }
            if !p.eat(TokenKind::Comma) {
                break;
            }
        }
    }
    p.expect(TokenKind::RParen);

    if p.at(TokenKind::Arrow) {
        p.advance();
        let ret = parse_type(p);
        return TypeAnnot::Function(FunctionTypeAnnot {
            generics,
            params,
            ret: Box::new(ret),
            vararg,
            span: p.span_from(start),
        });
    }

    if params.len() == 1 && params[0].name.is_none() && !vararg && generics.is_empty() {
        let inner = params.into_iter().next().expect("one param").ty;
        return TypeAnnot::Paren(ParenTypeAnnot {
            inner: Box::new(inner),
            span: p.span_from(start),
        });
    }

    p.error("expected `->` after function type parameters");
    error_type(
        "expected `->` after function type parameters",
        p.span_from(start),
    )
}

/// Parse a table type: `{}`, `{T}` (array), `{ a: T, read b: U, [K]: V }`.
fn parse_table_type(p: &mut Parser) -> TypeAnnot {
    let start = p.current_span();
    p.advance(); // {

    let mut props = Vec::new();
    let mut indexer: Option<Box<TableTypeIndexer>> = None;
    let mut is_array = false;

    while !p.at(TokenKind::RBrace) && !p.at(TokenKind::Eof) {
        if p.at(TokenKind::LBracket) {
            p.advance();
            let key = parse_type(p);
            p.expect(TokenKind::RBracket);
            p.expect(TokenKind::Colon);
            let value = parse_type(p);
            indexer = Some(Box::new(TableTypeIndexer { key, value }));
        } else if at_prop_modifier(p) {
            let readonly = p.current_text() == "read";
            p.advance(); // read/write
            let name = p.member_name("property name").expect("checked name token");
            p.expect(TokenKind::Colon);
            let ty = parse_type(p);
            props.push(TableTypeProp { name, ty, readonly });
        } else if p.at_member_name() && p.nth(1) == TokenKind::Colon {
            let name = p.member_name("property name").expect("checked name token");
            p.advance(); // :
            let ty = parse_type(p);
            props.push(TableTypeProp {
                name,
                ty,
                readonly: false,
            });
        } else {
            // Array shorthand `{T}`.
            let before = p.current_index();
            let item = parse_type(p);
            let errored = matches!(item, TypeAnnot::Error(_));
            let key_span = Span::at(item.span().start);
            is_array = true;
            indexer = Some(Box::new(TableTypeIndexer {
                key: TypeAnnot::Reference(TypeReference {
                    module: None,
                    name: Name::new("number", key_span),
                    args: Vec::new(),
                    span: key_span,
                }),
                value: item,
            }));
            if errored && p.current_index() == before {
                break;
            }
        }
        if !p.eat(TokenKind::Comma) && !p.eat(TokenKind::Semicolon) {
            break;
        }
    }
    p.expect(TokenKind::RBrace);

    TypeAnnot::Table(TableTypeAnnot {
        props,
        indexer,
        is_array,
        span: p.span_from(start),
    })
}

/// Whether the cursor sits on a `read`/`write` property modifier.
fn at_prop_modifier(p: &Parser) -> bool {
    p.at(TokenKind::Identifier)
        && matches!(p.current_text(), "read" | "write")
        && kind_is_namelike_or_keyword(p.nth(1))
        && p.nth(2) == TokenKind::Colon
}

fn kind_is_namelike_or_keyword(kind: TokenKind) -> bool {
    kind == TokenKind::Identifier || kind.is_keyword()
}

/// Parse `<T, U = Default>` generic parameter lists. The `<` is the
/// current token. Generic packs (`T...`) are accepted and treated as
/// plain parameters.
pub(crate) fn parse_generic_params(p: &mut Parser) -> Vec<GenericParam> {
    p.advance(); // <
    let mut generics = Vec::new();
    loop {
        let Some(name) = p.name("generic parameter name") else {
            break;
        };
        p.eat(TokenKind::Vararg); // tolerate generic packs
        let default = if p.eat(TokenKind::Assign) {
            Some(parse_type(p))
        } else {
            None
        };
        let span = match &default {
            Some(ty) => name.span.merge(ty.span()),
            None => name.span,
        };
        generics.push(GenericParam {
            name,
            default,
            span,
        });
        if !p.eat(TokenKind::Comma) {
            break;
        }
    }
    p.expect(TokenKind::Gt);
    generics
}

//! Parser integration tests: statement forms, precedence, suffix chains,
//! contextual keywords, type annotations, doc-comment attachment, and
//! error recovery.

use lupa_parser::ast::*;
use lupa_parser::{parse, ParseResult};

// ── Helpers ────────────────────────────────────────────────────────────

/// Parse and assert there are no errors.
fn parse_ok(src: &str) -> Chunk {
    let result = parse(src);
    assert!(
        result.errors.is_empty(),
        "expected clean parse of {src:?}, got errors: {:?}",
        result.errors
    );
    result.chunk
}

/// Parse source expected to contain errors.
fn parse_err(src: &str) -> ParseResult {
    let result = parse(src);
    assert!(
        !result.errors.is_empty(),
        "expected errors for {src:?}, parse was clean"
    );
    result
}

/// The single top-level statement of a clean parse.
fn single_stat(src: &str) -> Stat {
    let chunk = parse_ok(src);
    assert_eq!(
        chunk.block.stats.len(),
        1,
        "expected one statement in {src:?}, got {:?}",
        chunk.block.stats
    );
    chunk.block.stats.into_iter().next().unwrap()
}

/// The initializer of `local x = <expr>`.
fn init_expr(src: &str) -> Expr {
    match single_stat(src) {
        Stat::Local(local) => local.values.into_iter().next().expect("initializer"),
        other => panic!("expected local statement, got {other:?}"),
    }
}

// ── Statements ─────────────────────────────────────────────────────────

#[test]
fn local_with_annotations_and_multiple_bindings() {
    let Stat::Local(local) = single_stat("local a: number, b = 1, 2") else {
        panic!("expected local");
    };
    assert_eq!(local.bindings.len(), 2);
    assert_eq!(local.bindings[0].name.text, "a");
    assert!(matches!(
        local.bindings[0].annotation,
        Some(TypeAnnot::Reference(_))
    ));
    assert!(local.bindings[1].annotation.is_none());
    assert_eq!(local.values.len(), 2);
}

#[test]
fn local_function_statement() {
    let Stat::LocalFunction(f) = single_stat("local function id(x) return x end") else {
        panic!("expected local function");
    };
    assert_eq!(f.name.text, "id");
    assert_eq!(f.func.params.len(), 1);
    assert_eq!(f.func.body.stats.len(), 1);
}

#[test]
fn function_declaration_with_path_and_method() {
    let Stat::FunctionDecl(f) = single_stat("function M.util:reset(a, b) end") else {
        panic!("expected function declaration");
    };
    let path: Vec<_> = f.name.path.iter().map(|n| n.text.as_str()).collect();
    assert_eq!(path, vec!["M", "util"]);
    assert_eq!(f.name.method.as_ref().unwrap().text, "reset");
    assert!(!f.is_local);
    assert_eq!(f.func.params.len(), 2);
}

#[test]
fn assignment_and_compound_assignment() {
    let Stat::Assign(assign) = single_stat("a, b.c = 1, 2") else {
        panic!("expected assignment");
    };
    assert_eq!(assign.targets.len(), 2);
    assert!(matches!(assign.targets[1], Expr::Member(_)));
    assert_eq!(assign.values.len(), 2);

    let Stat::CompoundAssign(comp) = single_stat("x += 1") else {
        panic!("expected compound assignment");
    };
    assert_eq!(comp.op, BinaryOp::Add);

    let Stat::CompoundAssign(comp) = single_stat("s ..= \"tail\"") else {
        panic!("expected compound assignment");
    };
    assert_eq!(comp.op, BinaryOp::Concat);
}

#[test]
fn control_flow_statements() {
    let Stat::If(if_stat) =
        single_stat("if a then x() elseif b then y() elseif c then z() else w() end")
    else {
        panic!("expected if");
    };
    assert_eq!(if_stat.elseif_clauses.len(), 2);
    assert!(if_stat.else_block.is_some());

    assert!(matches!(
        single_stat("while true do break end"),
        Stat::While(_)
    ));
    assert!(matches!(
        single_stat("repeat x() until done"),
        Stat::Repeat(_)
    ));
    assert!(matches!(single_stat("do x() end"), Stat::Do(_)));
}

#[test]
fn for_statements() {
    let Stat::NumericFor(nf) = single_stat("for i = 1, 10, 2 do end") else {
        panic!("expected numeric for");
    };
    assert_eq!(nf.var.name.text, "i");
    assert!(nf.step.is_some());

    let Stat::GenericFor(gf) = single_stat("for k, v in pairs(t) do end") else {
        panic!("expected generic for");
    };
    assert_eq!(gf.vars.len(), 2);
    assert_eq!(gf.exprs.len(), 1);
}

#[test]
fn return_with_and_without_values() {
    let Stat::Return(ret) = single_stat("return") else {
        panic!("expected return");
    };
    assert!(ret.values.is_empty());

    let Stat::Return(ret) = single_stat("return x, y") else {
        panic!("expected return");
    };
    assert_eq!(ret.values.len(), 2);
}

#[test]
fn break_and_continue() {
    let chunk = parse_ok("while true do break end\nwhile true do continue end");
    assert_eq!(chunk.block.stats.len(), 2);
}

#[test]
fn type_alias_and_export() {
    let Stat::TypeAlias(alias) = single_stat("type Point = { x: number, y: number }") else {
        panic!("expected type alias");
    };
    assert_eq!(alias.name.text, "Point");
    assert!(matches!(alias.ty, TypeAnnot::Table(_)));

    let Stat::Export(export) = single_stat("export type Id<T = string> = T") else {
        panic!("expected export");
    };
    assert_eq!(export.alias.name.text, "Id");
    assert_eq!(export.alias.generics.len(), 1);
    assert!(export.alias.generics[0].default.is_some());
}

#[test]
fn call_statement() {
    let Stat::Call(call) = single_stat("print(\"hi\")") else {
        panic!("expected call statement");
    };
    assert!(matches!(call.call, Expr::Call(_)));

    let Stat::Call(call) = single_stat("obj:update(dt)") else {
        panic!("expected call statement");
    };
    assert!(matches!(call.call, Expr::MethodCall(_)));
}

// ── Expressions ────────────────────────────────────────────────────────

#[test]
fn precedence_mul_over_add() {
    let Expr::Binary(add) = init_expr("local v = 1 + 2 * 3") else {
        panic!("expected binary");
    };
    assert_eq!(add.op, BinaryOp::Add);
    let Expr::Binary(mul) = *add.rhs else {
        panic!("expected rhs to be the multiplication");
    };
    assert_eq!(mul.op, BinaryOp::Mul);
}

#[test]
fn concat_is_right_associative() {
    let Expr::Binary(outer) = init_expr("local v = a .. b .. c") else {
        panic!("expected binary");
    };
    assert_eq!(outer.op, BinaryOp::Concat);
    assert!(matches!(*outer.lhs, Expr::Name(_)));
    assert!(matches!(*outer.rhs, Expr::Binary(_)));
}

#[test]
fn unary_minus_binds_looser_than_pow() {
    // -2^2 parses as -(2^2)
    let Expr::Unary(neg) = init_expr("local v = -2^2") else {
        panic!("expected unary");
    };
    assert_eq!(neg.op, UnaryOp::Neg);
    assert!(matches!(*neg.operand, Expr::Binary(b) if b.op == BinaryOp::Pow));
}

#[test]
fn comparison_and_logic_precedence() {
    // a < b and c parses as (a < b) and c
    let Expr::Binary(and) = init_expr("local v = a < b and c") else {
        panic!("expected binary");
    };
    assert_eq!(and.op, BinaryOp::And);
    assert!(matches!(*and.lhs, Expr::Binary(b) if b.op == BinaryOp::Lt));
}

#[test]
fn suffix_chain() {
    let expr = init_expr("local v = a.b.c(1):m(2)[k]");
    let Expr::Index(index) = expr else {
        panic!("expected index at chain end");
    };
    let Expr::MethodCall(method) = *index.object else {
        panic!("expected method call");
    };
    assert_eq!(method.method.text, "m");
    assert!(matches!(*method.object, Expr::Call(_)));
}

#[test]
fn call_sugar_string_and_table() {
    let Expr::Call(call) = init_expr("local v = require \"module\"") else {
        panic!("expected call");
    };
    assert_eq!(call.args.len(), 1);
    assert!(matches!(&call.args[0], Expr::Str(s) if s.value == "module"));

    let Expr::Call(call) = init_expr("local v = setmetatable { x = 1 }") else {
        panic!("expected call");
    };
    assert!(matches!(call.args[0], Expr::Table(_)));
}

#[test]
fn table_constructor_field_forms() {
    let Expr::Table(table) = init_expr("local t = { 1, x = 2, [k] = 3; 4 }") else {
        panic!("expected table");
    };
    assert_eq!(table.fields.len(), 4);
    assert!(matches!(table.fields[0], TableField::Item(_)));
    assert!(matches!(table.fields[1], TableField::Named { .. }));
    assert!(matches!(table.fields[2], TableField::Computed { .. }));
    assert!(matches!(table.fields[3], TableField::Item(_)));
}

#[test]
fn keywords_as_member_and_field_names() {
    // `type` and `end` are usable as table keys and member names.
    let chunk = parse_ok("local t = { type = 1, [\"x\"] = 2 }\nlocal u = t.type");
    assert_eq!(chunk.block.stats.len(), 2);

    let Expr::Member(member) = init_expr("local v = x.end") else {
        panic!("expected member access");
    };
    assert_eq!(member.member.text, "end");
}

#[test]
fn type_as_call_is_expression_statement() {
    // `type(x)` must not be mistaken for a type alias.
    let Stat::Call(call) = single_stat("type(x)") else {
        panic!("expected call statement");
    };
    let Expr::Call(c) = call.call else {
        panic!("expected call expr");
    };
    assert!(matches!(&*c.callee, Expr::Name(n) if n.name == "type"));
}

#[test]
fn if_else_expression() {
    let Expr::IfElse(ife) = init_expr("local v = if x then 1 elseif y then 2 else 3") else {
        panic!("expected if-else expression");
    };
    assert_eq!(ife.elseif_arms.len(), 1);
    assert!(matches!(*ife.else_expr, Expr::Number(_)));
}

#[test]
fn cast_expression() {
    let Expr::Cast(cast) = init_expr("local v = x :: number?") else {
        panic!("expected cast");
    };
    assert!(matches!(cast.ty, TypeAnnot::Optional(_)));

    // Casts chain: (x :: any) :: number is also one suffix chain.
    let Expr::Cast(outer) = init_expr("local v = x :: any :: number") else {
        panic!("expected cast");
    };
    assert!(matches!(*outer.expr, Expr::Cast(_)));
}

#[test]
fn interpolated_string_expression() {
    let Expr::Interpolated(interp) = init_expr("local v = `x = {x}`") else {
        panic!("expected interpolated string");
    };
    assert_eq!(interp.parts.len(), 1);
    assert!(matches!(&interp.parts[0], InterpolatedPart::Str(s) if s.value == "x = {x}"));
}

#[test]
fn number_literal_values() {
    assert!(matches!(
        init_expr("local v = 1_000_000.5e+2"),
        Expr::Number(n) if n.value == 100_000_050.0
    ));
    assert!(matches!(
        init_expr("local v = 0xFF"),
        Expr::Number(n) if n.value == 255.0
    ));
    assert!(matches!(
        init_expr("local v = .5"),
        Expr::Number(n) if n.value == 0.5
    ));
}

#[test]
fn vararg_in_function_and_expression() {
    let Stat::LocalFunction(f) = single_stat("local function f(a, ...) return ... end") else {
        panic!("expected local function");
    };
    assert!(f.func.vararg);
    assert_eq!(f.func.params.len(), 1);
}

// ── Type annotations ───────────────────────────────────────────────────

/// The annotation of `local x: <ty>`.
fn annotation(src: &str) -> TypeAnnot {
    match single_stat(src) {
        Stat::Local(local) => local
            .bindings
            .into_iter()
            .next()
            .unwrap()
            .annotation
            .expect("annotation"),
        other => panic!("expected local, got {other:?}"),
    }
}

#[test]
fn union_intersection_optional_types() {
    let TypeAnnot::Union(union) = annotation("local x: number | string | nil") else {
        panic!("expected union");
    };
    assert_eq!(union.members.len(), 3);

    let TypeAnnot::Intersection(inter) = annotation("local x: A & B") else {
        panic!("expected intersection");
    };
    assert_eq!(inter.members.len(), 2);

    let TypeAnnot::Optional(opt) = annotation("local x: number?") else {
        panic!("expected optional");
    };
    assert!(matches!(*opt.inner, TypeAnnot::Reference(_)));
}

#[test]
fn union_binds_looser_than_intersection() {
    let TypeAnnot::Union(union) = annotation("local x: A & B | C") else {
        panic!("expected union at top");
    };
    assert_eq!(union.members.len(), 2);
    assert!(matches!(union.members[0], TypeAnnot::Intersection(_)));
}

#[test]
fn function_type_annotations() {
    let TypeAnnot::Function(f) = annotation("local x: (number, s: string) -> boolean") else {
        panic!("expected function type");
    };
    assert_eq!(f.params.len(), 2);
    assert!(f.params[0].name.is_none());
    assert_eq!(f.params[1].name.as_ref().unwrap().text, "s");
    assert!(!f.vararg);

    let TypeAnnot::Function(f) = annotation("local x: (...number) -> nil") else {
        panic!("expected function type");
    };
    assert!(f.vararg);

    let TypeAnnot::Function(f) = annotation("local x: <T>(T) -> T") else {
        panic!("expected generic function type");
    };
    assert_eq!(f.generics.len(), 1);
}

#[test]
fn paren_type_is_not_a_function() {
    let TypeAnnot::Paren(paren) = annotation("local x: (number)") else {
        panic!("expected paren type");
    };
    assert!(matches!(*paren.inner, TypeAnnot::Reference(_)));
}

#[test]
fn table_type_annotations() {
    let TypeAnnot::Table(t) = annotation("local x: { a: number, read b: string }") else {
        panic!("expected table type");
    };
    assert_eq!(t.props.len(), 2);
    assert!(!t.props[0].readonly);
    assert!(t.props[1].readonly);
    assert!(!t.is_array);

    let TypeAnnot::Table(t) = annotation("local x: { [string]: number }") else {
        panic!("expected table type");
    };
    assert!(t.indexer.is_some());
    assert!(t.props.is_empty());

    let TypeAnnot::Table(t) = annotation("local x: { number }") else {
        panic!("expected array table type");
    };
    assert!(t.is_array);
    assert!(t.indexer.is_some());
}

#[test]
fn typeof_and_generic_reference_types() {
    assert!(matches!(
        annotation("local x: typeof(game)"),
        TypeAnnot::Typeof(_)
    ));

    let TypeAnnot::Reference(r) = annotation("local x: Map<string, number>") else {
        panic!("expected reference");
    };
    assert_eq!(r.name.text, "Map");
    assert_eq!(r.args.len(), 2);

    let TypeAnnot::Reference(r) = annotation("local x: Types.Handler") else {
        panic!("expected reference");
    };
    assert_eq!(r.module.as_ref().unwrap().text, "Types");
    assert_eq!(r.name.text, "Handler");
}

#[test]
fn literal_type_annotations() {
    let TypeAnnot::Union(u) = annotation("local x: \"up\" | \"down\"") else {
        panic!("expected union of literals");
    };
    assert!(matches!(
        &u.members[0],
        TypeAnnot::Literal(l) if l.value == LiteralTypeValue::Str("up".into())
    ));
}

// ── Doc comments ───────────────────────────────────────────────────────

#[test]
fn doc_comment_attaches_to_local() {
    let src = "--- The player's health.\n--- @type number\nlocal health = 100";
    let Stat::Local(local) = single_stat(src) else {
        panic!("expected local");
    };
    let doc = local.doc.expect("doc comment");
    assert_eq!(doc.description, "The player's health.");
    assert_eq!(doc.type_tag.as_deref(), Some("number"));
}

#[test]
fn doc_comment_attaches_to_function_and_alias() {
    let src = "\
--- Greets a player.
--- @param name string who to greet
--- @return string the greeting
local function greet(name) return name end

--- A 2D point.
type Point = { x: number, y: number }
";
    let chunk = parse_ok(src);
    let Stat::LocalFunction(f) = &chunk.block.stats[0] else {
        panic!("expected local function");
    };
    let doc = f.doc.as_ref().expect("doc");
    assert_eq!(doc.params.len(), 1);
    assert_eq!(doc.params[0].name, "name");
    assert_eq!(doc.returns.len(), 1);

    let Stat::TypeAlias(alias) = &chunk.block.stats[1] else {
        panic!("expected alias");
    };
    assert_eq!(alias.doc.as_ref().unwrap().description, "A 2D point.");
}

#[test]
fn plain_comment_breaks_doc_run() {
    let src = "--- stale doc\n-- separator\nlocal x = 1";
    let Stat::Local(local) = single_stat(src) else {
        panic!("expected local");
    };
    assert!(local.doc.is_none());
}

// ── Error recovery ─────────────────────────────────────────────────────

#[test]
fn recovers_after_garbage_statement() {
    let result = parse_err("local x = 1\n$$$\nlocal y = 2");
    let stats = &result.chunk.block.stats;
    // Both locals survive around the error.
    let locals = stats
        .iter()
        .filter(|s| matches!(s, Stat::Local(_)))
        .count();
    assert_eq!(locals, 2, "stats: {stats:?}");
    assert!(stats.iter().any(|s| matches!(s, Stat::Error(_))));
}

#[test]
fn missing_end_recovers_at_next_keyword() {
    let result = parse_err("while true do\nlocal inner = 1\nlocal after = 2");
    // The while body swallows the rest, but parsing completes and the
    // inner statements survive.
    assert!(!result.chunk.block.stats.is_empty());
    let Stat::While(w) = &result.chunk.block.stats[0] else {
        panic!("expected while");
    };
    assert_eq!(w.body.stats.len(), 2);
}

#[test]
fn stray_end_at_top_level() {
    let result = parse_err("local x = 1\nend\nlocal y = 2");
    let locals = result
        .chunk
        .block
        .stats
        .iter()
        .filter(|s| matches!(s, Stat::Local(_)))
        .count();
    assert_eq!(locals, 2);
}

#[test]
fn missing_expression_yields_error_node() {
    let result = parse_err("local x = ");
    let Stat::Local(local) = &result.chunk.block.stats[0] else {
        panic!("expected local");
    };
    assert!(matches!(local.values[0], Expr::Error(_)));
}

#[test]
fn unterminated_string_surfaces_as_error() {
    let result = parse_err("local s = \"oops\nlocal t = 1");
    assert!(result
        .errors
        .iter()
        .any(|e| e.message.contains("unterminated string")));
    // The next statement still parses.
    let locals = result
        .chunk
        .block
        .stats
        .iter()
        .filter(|s| matches!(s, Stat::Local(_)))
        .count();
    assert_eq!(locals, 2);
}

#[test]
fn parser_always_produces_a_chunk() {
    for src in ["", ";;;", "end end end", "((((", "local", "= = =", "\n\n\n"] {
        let result = parse(src);
        // No panic and spans are sane.
        assert!(result.chunk.span.start.offset <= result.chunk.span.end.offset);
    }
}

#[test]
fn ranges_are_non_decreasing() {
    let chunk = parse_ok("local x = 1\nif x then print(x) end");
    for stat in &chunk.block.stats {
        let span = stat.span();
        assert!(span.start.offset <= span.end.offset);
    }
    // Second statement starts after the first ends.
    let first = chunk.block.stats[0].span();
    let second = chunk.block.stats[1].span();
    assert!(first.end.offset <= second.start.offset);
}

#[test]
fn comments_are_collected_on_chunk() {
    let chunk = parse_ok("-- one\nlocal x = 1 -- two\n--[[ three ]]");
    assert_eq!(chunk.comments.len(), 3);
    assert_eq!(chunk.comments[0].content(), "one");
    assert_eq!(chunk.comments[0].line(), 1);
    assert_eq!(chunk.comments[1].line(), 2);
}

// ── Visitor ────────────────────────────────────────────────────────────

#[test]
fn visitor_sees_nodes_in_source_order() {
    use lupa_parser::visit::{walk_chunk, Visitor};

    #[derive(Default)]
    struct NameCollector {
        names: Vec<String>,
        calls: usize,
    }

    impl Visitor for NameCollector {
        fn visit_name_expr(&mut self, expr: &NameExpr) {
            self.names.push(expr.name.clone());
        }
        fn visit_call_expr(&mut self, _expr: &CallExpr) {
            self.calls += 1;
        }
    }

    let chunk = parse_ok("local a = f(x, y)\nlocal b = a + z");
    let mut collector = NameCollector::default();
    walk_chunk(&mut collector, &chunk);
    assert_eq!(collector.names, vec!["f", "x", "y", "a", "z"]);
    assert_eq!(collector.calls, 1);
}

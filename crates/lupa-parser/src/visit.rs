//! Visitor API over the AST.
//!
//! `Visitor` has one no-op-default callback per node kind; the `walk_*`
//! functions drive the traversal and recurse in a fixed order:
//!
//! - statements visit their expressions left to right;
//! - table fields are visited in source order;
//! - function bodies are visited after parameter and return annotations;
//! - `repeat` visits its body before the condition (matching scoping).
//!
//! Implementors override only the callbacks they care about and call
//! [`walk_chunk`] (or a narrower walk) to start.

use crate::ast::*;

/// One callback per AST node kind. All callbacks default to no-ops.
pub trait Visitor {
    fn visit_chunk(&mut self, _chunk: &Chunk) {}
    fn visit_block(&mut self, _block: &Block) {}

    // ── Statements ─────────────────────────────────────────────────────
    fn visit_local_stat(&mut self, _stat: &LocalStat) {}
    fn visit_local_function_stat(&mut self, _stat: &LocalFunctionStat) {}
    fn visit_function_decl_stat(&mut self, _stat: &FunctionDeclStat) {}
    fn visit_assign_stat(&mut self, _stat: &AssignStat) {}
    fn visit_compound_assign_stat(&mut self, _stat: &CompoundAssignStat) {}
    fn visit_if_stat(&mut self, _stat: &IfStat) {}
    fn visit_while_stat(&mut self, _stat: &WhileStat) {}
    fn visit_repeat_stat(&mut self, _stat: &RepeatStat) {}
    fn visit_numeric_for_stat(&mut self, _stat: &NumericForStat) {}
    fn visit_generic_for_stat(&mut self, _stat: &GenericForStat) {}
    fn visit_do_stat(&mut self, _stat: &DoStat) {}
    fn visit_return_stat(&mut self, _stat: &ReturnStat) {}
    fn visit_break_stat(&mut self, _stat: &BreakStat) {}
    fn visit_continue_stat(&mut self, _stat: &ContinueStat) {}
    fn visit_type_alias_stat(&mut self, _stat: &TypeAliasStat) {}
    fn visit_export_stat(&mut self, _stat: &ExportStat) {}
    fn visit_call_stat(&mut self, _stat: &CallStat) {}
    fn visit_error_stat(&mut self, _stat: &ErrorStat) {}

    // ── Expressions ────────────────────────────────────────────────────
    fn visit_name_expr(&mut self, _expr: &NameExpr) {}
    fn visit_nil_literal(&mut self, _expr: &NilLiteral) {}
    fn visit_boolean_literal(&mut self, _expr: &BooleanLiteral) {}
    fn visit_number_literal(&mut self, _expr: &NumberLiteral) {}
    fn visit_string_literal(&mut self, _expr: &StringLiteral) {}
    fn visit_vararg_expr(&mut self, _expr: &VarargExpr) {}
    fn visit_function_expr(&mut self, _expr: &FunctionExpr) {}
    fn visit_table_expr(&mut self, _expr: &TableExpr) {}
    fn visit_binary_expr(&mut self, _expr: &BinaryExpr) {}
    fn visit_unary_expr(&mut self, _expr: &UnaryExpr) {}
    fn visit_call_expr(&mut self, _expr: &CallExpr) {}
    fn visit_method_call_expr(&mut self, _expr: &MethodCallExpr) {}
    fn visit_index_expr(&mut self, _expr: &IndexExpr) {}
    fn visit_member_expr(&mut self, _expr: &MemberExpr) {}
    fn visit_if_else_expr(&mut self, _expr: &IfElseExpr) {}
    fn visit_cast_expr(&mut self, _expr: &CastExpr) {}
    fn visit_interpolated_expr(&mut self, _expr: &InterpolatedExpr) {}
    fn visit_paren_expr(&mut self, _expr: &ParenExpr) {}
    fn visit_error_expr(&mut self, _expr: &ErrorExpr) {}

    // ── Type annotations ───────────────────────────────────────────────
    fn visit_type_reference(&mut self, _ty: &TypeReference) {}
    fn visit_literal_type(&mut self, _ty: &LiteralTypeAnnot) {}
    fn visit_function_type(&mut self, _ty: &FunctionTypeAnnot) {}
    fn visit_table_type(&mut self, _ty: &TableTypeAnnot) {}
    fn visit_union_type(&mut self, _ty: &UnionTypeAnnot) {}
    fn visit_intersection_type(&mut self, _ty: &IntersectionTypeAnnot) {}
    fn visit_optional_type(&mut self, _ty: &OptionalTypeAnnot) {}
    fn visit_typeof_type(&mut self, _ty: &TypeofAnnot) {}
    fn visit_variadic_type(&mut self, _ty: &VariadicTypeAnnot) {}
    fn visit_paren_type(&mut self, _ty: &ParenTypeAnnot) {}
    fn visit_error_type(&mut self, _ty: &ErrorTypeAnnot) {}
}

/// Walk a whole chunk.
pub fn walk_chunk<V: Visitor>(v: &mut V, chunk: &Chunk) {
    v.visit_chunk(chunk);
    walk_block(v, &chunk.block);
}

/// Walk a block's statements in order.
pub fn walk_block<V: Visitor>(v: &mut V, block: &Block) {
    v.visit_block(block);
    for stat in &block.stats {
        walk_stat(v, stat);
    }
}

fn walk_binding<V: Visitor>(v: &mut V, binding: &Binding) {
    if let Some(annotation) = &binding.annotation {
        walk_type(v, annotation);
    }
}

fn walk_function<V: Visitor>(v: &mut V, func: &FunctionExpr) {
    v.visit_function_expr(func);
    for generic in &func.generics {
        if let Some(default) = &generic.default {
            walk_type(v, default);
        }
    }
    for param in &func.params {
        if let Some(annotation) = &param.annotation {
            walk_type(v, annotation);
        }
    }
    if let Some(annotation) = &func.vararg_annotation {
        walk_type(v, annotation);
    }
    if let Some(ret) = &func.return_annotation {
        walk_type(v, ret);
    }
    walk_block(v, &func.body);
}

fn walk_type_alias<V: Visitor>(v: &mut V, alias: &TypeAliasStat) {
    v.visit_type_alias_stat(alias);
    for generic in &alias.generics {
        if let Some(default) = &generic.default {
            walk_type(v, default);
        }
    }
    walk_type(v, &alias.ty);
}

/// Walk a statement and its children.
pub fn walk_stat<V: Visitor>(v: &mut V, stat: &Stat) {
    match stat {
        Stat::Local(s) => {
            v.visit_local_stat(s);
            for binding in &s.bindings {
                walk_binding(v, binding);
            }
            for value in &s.values {
                walk_expr(v, value);
            }
        }
        Stat::LocalFunction(s) => {
            v.visit_local_function_stat(s);
            walk_function(v, &s.func);
        }
        Stat::FunctionDecl(s) => {
            v.visit_function_decl_stat(s);
            walk_function(v, &s.func);
        }
        Stat::Assign(s) => {
            v.visit_assign_stat(s);
            for target in &s.targets {
                walk_expr(v, target);
            }
            for value in &s.values {
                walk_expr(v, value);
            }
        }
        Stat::CompoundAssign(s) => {
            v.visit_compound_assign_stat(s);
            walk_expr(v, &s.target);
            walk_expr(v, &s.value);
        }
        Stat::If(s) => {
            v.visit_if_stat(s);
            walk_expr(v, &s.condition);
            walk_block(v, &s.then_block);
            for clause in &s.elseif_clauses {
                walk_expr(v, &clause.condition);
                walk_block(v, &clause.block);
            }
            if let Some(else_block) = &s.else_block {
                walk_block(v, else_block);
            }
        }
        Stat::While(s) => {
            v.visit_while_stat(s);
            walk_expr(v, &s.condition);
            walk_block(v, &s.body);
        }
        Stat::Repeat(s) => {
            v.visit_repeat_stat(s);
            walk_block(v, &s.body);
            walk_expr(v, &s.condition);
        }
        Stat::NumericFor(s) => {
            v.visit_numeric_for_stat(s);
            walk_binding(v, &s.var);
            walk_expr(v, &s.from);
            walk_expr(v, &s.to);
            if let Some(step) = &s.step {
                walk_expr(v, step);
            }
            walk_block(v, &s.body);
        }
        Stat::GenericFor(s) => {
            v.visit_generic_for_stat(s);
            for var in &s.vars {
                walk_binding(v, var);
            }
            for expr in &s.exprs {
                walk_expr(v, expr);
            }
            walk_block(v, &s.body);
        }
        Stat::Do(s) => {
            v.visit_do_stat(s);
            walk_block(v, &s.body);
        }
        Stat::Return(s) => {
            v.visit_return_stat(s);
            for value in &s.values {
                walk_expr(v, value);
            }
        }
        Stat::Break(s) => v.visit_break_stat(s),
        Stat::Continue(s) => v.visit_continue_stat(s),
        Stat::TypeAlias(s) => walk_type_alias(v, s),
        Stat::Export(s) => {
            v.visit_export_stat(s);
            walk_type_alias(v, &s.alias);
        }
        Stat::Call(s) => {
            v.visit_call_stat(s);
            walk_expr(v, &s.call);
        }
        Stat::Error(s) => v.visit_error_stat(s),
    }
}

/// Walk an expression and its children, left to right.
pub fn walk_expr<V: Visitor>(v: &mut V, expr: &Expr) {
    match expr {
        Expr::Name(e) => v.visit_name_expr(e),
        Expr::Nil(e) => v.visit_nil_literal(e),
        Expr::Boolean(e) => v.visit_boolean_literal(e),
        Expr::Number(e) => v.visit_number_literal(e),
        Expr::Str(e) => v.visit_string_literal(e),
        Expr::Vararg(e) => v.visit_vararg_expr(e),
        Expr::Function(e) => walk_function(v, e),
        Expr::Table(e) => {
            v.visit_table_expr(e);
            for field in &e.fields {
                match field {
                    TableField::Named { value, .. } => walk_expr(v, value),
                    TableField::Computed { key, value } => {
                        walk_expr(v, key);
                        walk_expr(v, value);
                    }
                    TableField::Item(item) => walk_expr(v, item),
                }
            }
        }
        Expr::Binary(e) => {
            v.visit_binary_expr(e);
            walk_expr(v, &e.lhs);
            walk_expr(v, &e.rhs);
        }
        Expr::Unary(e) => {
            v.visit_unary_expr(e);
            walk_expr(v, &e.operand);
        }
        Expr::Call(e) => {
            v.visit_call_expr(e);
            walk_expr(v, &e.callee);
            for arg in &e.args {
                walk_expr(v, arg);
            }
        }
        Expr::MethodCall(e) => {
            v.visit_method_call_expr(e);
            walk_expr(v, &e.object);
            for arg in &e.args {
                walk_expr(v, arg);
            }
        }
        Expr::Index(e) => {
            v.visit_index_expr(e);
            walk_expr(v, &e.object);
            walk_expr(v, &e.index);
        }
        Expr::Member(e) => {
            v.visit_member_expr(e);
            walk_expr(v, &e.object);
        }
        Expr::IfElse(e) => {
            v.visit_if_else_expr(e);
            walk_expr(v, &e.condition);
            walk_expr(v, &e.then_expr);
            for (cond, value) in &e.elseif_arms {
                walk_expr(v, cond);
                walk_expr(v, value);
            }
            walk_expr(v, &e.else_expr);
        }
        Expr::Cast(e) => {
            v.visit_cast_expr(e);
            walk_expr(v, &e.expr);
            walk_type(v, &e.ty);
        }
        Expr::Interpolated(e) => {
            v.visit_interpolated_expr(e);
            for part in &e.parts {
                match part {
                    InterpolatedPart::Str(s) => v.visit_string_literal(s),
                    InterpolatedPart::Expr(inner) => walk_expr(v, inner),
                }
            }
        }
        Expr::Paren(e) => {
            v.visit_paren_expr(e);
            walk_expr(v, &e.expr);
        }
        Expr::Error(e) => v.visit_error_expr(e),
    }
}

/// Walk a type annotation and its children.
pub fn walk_type<V: Visitor>(v: &mut V, ty: &TypeAnnot) {
    match ty {
        TypeAnnot::Reference(t) => {
            v.visit_type_reference(t);
            for arg in &t.args {
                walk_type(v, arg);
            }
        }
        TypeAnnot::Literal(t) => v.visit_literal_type(t),
        TypeAnnot::Function(t) => {
            v.visit_function_type(t);
            for generic in &t.generics {
                if let Some(default) = &generic.default {
                    walk_type(v, default);
                }
            }
            for param in &t.params {
                walk_type(v, &param.ty);
            }
            walk_type(v, &t.ret);
        }
        TypeAnnot::Table(t) => {
            v.visit_table_type(t);
            for prop in &t.props {
                walk_type(v, &prop.ty);
            }
            if let Some(indexer) = &t.indexer {
                walk_type(v, &indexer.key);
                walk_type(v, &indexer.value);
            }
        }
        TypeAnnot::Union(t) => {
            v.visit_union_type(t);
            for member in &t.members {
                walk_type(v, member);
            }
        }
        TypeAnnot::Intersection(t) => {
            v.visit_intersection_type(t);
            for member in &t.members {
                walk_type(v, member);
            }
        }
        TypeAnnot::Optional(t) => {
            v.visit_optional_type(t);
            walk_type(v, &t.inner);
        }
        TypeAnnot::Typeof(t) => {
            v.visit_typeof_type(t);
            walk_expr(v, &t.expr);
        }
        TypeAnnot::Variadic(t) => {
            v.visit_variadic_type(t);
            walk_type(v, &t.inner);
        }
        TypeAnnot::Paren(t) => {
            v.visit_paren_type(t);
            walk_type(v, &t.inner);
        }
        TypeAnnot::Error(t) => v.visit_error_type(t),
    }
}

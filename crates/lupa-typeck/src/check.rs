//! The type-checker walk.
//!
//! Visits statements in order, entering and exiting scopes to match
//! block structure; expressions are inferred bottom-up and diagnostics
//! fire during inference even when the result is ignored. Values whose
//! type is already `Error` stay silent so one mistake does not cascade.

use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use lupa_common::diagnostic::Diagnostic;
use lupa_common::span::Span;
use lupa_parser::ast::{self, Binding, Block, Chunk, Expr, FunctionExpr, Name, Stat, TypeAnnot};
use lupa_parser::docs::DocComment;

use crate::builtins;
use crate::directives::{parse_ignore_directives, IgnoredLines};
use crate::env::{ScopeKind, Symbol, SymbolKind, TypeAlias, TypeEnvironment};
use crate::error::TypeError;
use crate::subtype::{self, CheckMode, SubtypeCtx};
use crate::ty::{
    ClassTy, FunctionTy, GenericTyParam, LiteralValue, ParamTy, TableIndexer, TableProp, TableTy,
    Ty, TypeRef,
};
use crate::universe::{BuiltinBundles, TypeUniverse};
use crate::{CheckOptions, CheckResult};

/// Nominal math types whose values participate in arithmetic.
const MATH_TYPES: &[&str] = &["Vector3", "Vector2", "CFrame", "UDim", "UDim2", "Color3"];

/// Canonical spellings of well-known Roblox API names, used for the
/// case-sensitivity hint: a miss whose lowercase form matches one of
/// these resolves to the canonical member and emits W002.
const CANONICAL_NAMES: &[&str] = &[
    "Anchored",
    "BrickColor",
    "CanCollide",
    "CFrame",
    "Changed",
    "ClassName",
    "Clone",
    "Color",
    "Connect",
    "Destroy",
    "Disconnect",
    "Enabled",
    "FindFirstAncestor",
    "FindFirstAncestorOfClass",
    "FindFirstAncestorWhichIsA",
    "FindFirstChild",
    "FindFirstChildOfClass",
    "FindFirstChildWhichIsA",
    "GetAttribute",
    "GetChildren",
    "GetDescendants",
    "GetPropertyChangedSignal",
    "GetService",
    "IsA",
    "Material",
    "Name",
    "Orientation",
    "Parent",
    "Position",
    "Rotation",
    "SetAttribute",
    "Size",
    "Text",
    "Touched",
    "Transparency",
    "Value",
    "Velocity",
    "Visible",
    "WaitForChild",
];

/// The canonical spelling for a miss, if it differs only by case.
fn canonical_correction(name: &str) -> Option<&'static str> {
    CANONICAL_NAMES
        .iter()
        .copied()
        .find(|c| *c != name && c.eq_ignore_ascii_case(name))
}

/// Widen a literal to its base primitive.
fn widen_literal(ty: Ty) -> Ty {
    match ty {
        Ty::Literal(value) => value.base_ty(),
        other => other,
    }
}

/// Widening applied when a literal is bound to a mutable, unannotated
/// slot: literals widen to their base, `nil` widens to `any` (so the
/// `local x = nil; x = value` pattern checks).
fn widen_for_binding(ty: Ty) -> Ty {
    match ty {
        Ty::Literal(value) => value.base_ty(),
        Ty::Nil => Ty::Any,
        other => other,
    }
}

/// The first string-literal argument at the given position.
fn string_arg(args: &[Expr], index: usize) -> Option<String> {
    match args.get(index) {
        Some(Expr::Str(s)) => Some(s.value.clone()),
        _ => None,
    }
}

/// Per-function return tracking.
struct FunctionReturns {
    declared: Option<Ty>,
    inferred: Vec<Ty>,
}

pub(crate) struct Checker {
    env: TypeEnvironment,
    mode: CheckMode,
    universe: TypeUniverse,
    bundles: BuiltinBundles,
    diagnostics: Vec<Diagnostic>,
    ignored: IgnoredLines,
    ignored_supplied: bool,
    return_stack: Vec<FunctionReturns>,
    cancel: Option<Arc<AtomicBool>>,
    cancelled: bool,
}

impl Checker {
    pub(crate) fn new(options: CheckOptions) -> Self {
        let ignored_supplied = options.ignored.is_some();
        Checker {
            env: TypeEnvironment::new(),
            mode: options.mode,
            universe: options.universe,
            bundles: options.bundles,
            diagnostics: Vec::new(),
            ignored: options.ignored.unwrap_or_default(),
            ignored_supplied,
            return_stack: Vec::new(),
            cancel: options.cancel,
            cancelled: false,
        }
    }

    pub(crate) fn check_chunk(mut self, chunk: &Chunk) -> CheckResult {
        if !self.ignored_supplied {
            self.ignored = parse_ignore_directives(&chunk.comments, chunk.span.end.line);
        }
        builtins::seed_environment(&mut self.env, &self.universe, self.bundles);

        self.env.enter_scope(ScopeKind::Module);
        if self.mode != CheckMode::Nocheck {
            self.check_block_stats(&chunk.block);
        }
        self.env.exit_scope();

        let mut env = self.env;
        CheckResult {
            diagnostics: self.diagnostics,
            all_symbols: env.take_symbols(),
            env,
        }
    }

    // ── Reporting and helpers ──────────────────────────────────────────

    fn report(&mut self, error: TypeError, span: Span) {
        if self.mode == CheckMode::Nocheck {
            return;
        }
        if self.ignored.contains(span.start.line) {
            return;
        }
        self.diagnostics.push(error.into_diagnostic(span));
    }

    fn assignable(&self, source: &Ty, target: &Ty) -> bool {
        let mut ctx = SubtypeCtx::new(self.mode, &self.env);
        subtype::is_assignable(source, target, &mut ctx)
    }

    fn common(&self, a: Ty, b: Ty) -> Ty {
        let mut ctx = SubtypeCtx::new(self.mode, &self.env);
        subtype::common_type(&a, &b, &mut ctx)
    }

    /// Resolve one level of reference indirection for inspection.
    fn resolve_shallow(&self, ty: &Ty) -> Ty {
        let mut current = ty.clone();
        let mut hops = 0;
        while let Ty::Reference(r) = &current {
            match subtype::resolve_reference(r, &self.env) {
                Some(resolved) => current = resolved,
                None => break,
            }
            hops += 1;
            if hops > 16 {
                break;
            }
        }
        current
    }

    fn cancellation_requested(&mut self) -> bool {
        if self.cancelled {
            return true;
        }
        if let Some(flag) = &self.cancel {
            if flag.load(Ordering::Relaxed) {
                self.cancelled = true;
            }
        }
        self.cancelled
    }

    // ── Statements ─────────────────────────────────────────────────────

    /// Check the statements of an already-entered block.
    fn check_block_stats(&mut self, block: &Block) {
        for stat in &block.stats {
            if self.cancellation_requested() {
                break;
            }
            self.check_stat(stat);
        }
    }

    /// Enter a scope of the given kind, check the block, exit.
    fn check_scoped_block(&mut self, block: &Block, kind: ScopeKind) {
        self.env.enter_scope(kind);
        self.check_block_stats(block);
        self.env.exit_scope();
    }

    fn check_stat(&mut self, stat: &Stat) {
        match stat {
            Stat::Local(s) => self.check_local(s),
            Stat::LocalFunction(s) => self.check_local_function(s),
            Stat::FunctionDecl(s) => self.check_function_decl(s),
            Stat::Assign(s) => self.check_assign(s),
            Stat::CompoundAssign(s) => self.check_compound_assign(s),
            Stat::If(s) => self.check_if(s),
            Stat::While(s) => {
                self.infer_expr(&s.condition);
                self.check_scoped_block(&s.body, ScopeKind::Loop);
            }
            Stat::Repeat(s) => {
                // The until-condition sees the body's scope.
                self.env.enter_scope(ScopeKind::Loop);
                self.check_block_stats(&s.body);
                self.infer_expr(&s.condition);
                self.env.exit_scope();
            }
            Stat::NumericFor(s) => self.check_numeric_for(s),
            Stat::GenericFor(s) => self.check_generic_for(s),
            Stat::Do(s) => self.check_scoped_block(&s.body, ScopeKind::Block),
            Stat::Return(s) => self.check_return(s),
            Stat::Break(s) => {
                if !self.env.is_in_loop_scope() {
                    self.report(TypeError::OutsideLoop { keyword: "break" }, s.span);
                }
            }
            Stat::Continue(s) => {
                if !self.env.is_in_loop_scope() {
                    self.report(TypeError::OutsideLoop { keyword: "continue" }, s.span);
                }
            }
            Stat::TypeAlias(s) => self.check_type_alias(s, false),
            Stat::Export(s) => self.check_type_alias(&s.alias, true),
            Stat::Call(s) => {
                self.infer_expr(&s.call);
            }
            Stat::Error(_) => {}
        }
    }

    fn check_local(&mut self, s: &ast::LocalStat) {
        let value_tys: Vec<Ty> = s.values.iter().map(|v| self.infer_expr(v)).collect();

        for (i, binding) in s.bindings.iter().enumerate() {
            let doc = if i == 0 { s.doc.clone() } else { None };
            let value_ty = value_tys.get(i).cloned();
            self.define_binding(binding, value_ty, doc);
        }
    }

    /// Define one `local`/loop binding, honoring annotations, doc
    /// `@type` overrides, and literal widening.
    fn define_binding(&mut self, binding: &Binding, value_ty: Option<Ty>, doc: Option<DocComment>) {
        let doc_ty = doc
            .as_ref()
            .and_then(|d| d.type_tag.clone())
            .and_then(|s| self.resolve_doc_type(&s));

        let (ty, annotated) = if let Some(annot) = &binding.annotation {
            let target = self.resolve_annotation(annot);
            if let Some(value) = &value_ty {
                if !self.assignable(value, &target) {
                    self.report(
                        TypeError::AssignMismatch {
                            expected: target.clone(),
                            found: value.clone(),
                        },
                        binding.name.span,
                    );
                }
            }
            (target, true)
        } else if let Some(doc_ty) = doc_ty {
            (doc_ty, true)
        } else {
            (
                widen_for_binding(value_ty.unwrap_or(Ty::Nil)),
                false,
            )
        };

        self.env.define_symbol(Symbol {
            name: binding.name.text.clone(),
            ty,
            kind: SymbolKind::Variable,
            mutable: true,
            annotated,
            decl_span: Some(binding.name.span),
            doc,
        });
    }

    fn check_local_function(&mut self, s: &ast::LocalFunctionStat) {
        // Bind the name first so the body can recurse into it.
        self.env.define_symbol(Symbol {
            name: s.name.text.clone(),
            ty: Ty::Any,
            kind: SymbolKind::Function,
            mutable: false,
            annotated: false,
            decl_span: Some(s.name.span),
            doc: s.doc.clone(),
        });
        let fty = self.check_function(&s.func, None, s.doc.as_ref());
        self.env.update_symbol_type(&s.name.text, fty);
    }

    fn check_function_decl(&mut self, s: &ast::FunctionDeclStat) {
        let head = &s.name.path[0];
        let head_symbol = self.env.lookup_symbol(&head.text).cloned();

        if s.name.path.len() == 1 && s.name.method.is_none() {
            // Plain `function foo()` -- declares (or re-types) a binding.
            let is_local = head_symbol.is_some();
            if !is_local {
                self.env.define_symbol(Symbol {
                    name: head.text.clone(),
                    ty: Ty::Any,
                    kind: SymbolKind::Function,
                    mutable: false,
                    annotated: false,
                    decl_span: Some(head.span),
                    doc: s.doc.clone(),
                });
            }
            let fty = self.check_function(&s.func, None, s.doc.as_ref());
            self.env.update_symbol_type(&head.text, fty);
            return;
        }

        // Dotted path: resolve the base for `self` typing; a missing
        // base is an unknown identifier in strict mode.
        let base_ty = match head_symbol {
            Some(symbol) => symbol.ty,
            None => {
                if self.mode == CheckMode::Strict {
                    self.report(
                        TypeError::UnknownIdentifier {
                            name: head.text.clone(),
                        },
                        head.span,
                    );
                }
                Ty::Any
            }
        };
        let mut object_ty = base_ty;
        for segment in &s.name.path[1..] {
            object_ty = self.member_access_quiet(&object_ty, &segment.text);
        }
        let this = s.name.method.as_ref().map(|_| object_ty);
        self.check_function(&s.func, this, s.doc.as_ref());
    }

    fn check_assign(&mut self, s: &ast::AssignStat) {
        let value_tys: Vec<Ty> = s.values.iter().map(|v| self.infer_expr(v)).collect();
        for (i, target) in s.targets.iter().enumerate() {
            let value_ty = value_tys.get(i).cloned().unwrap_or(Ty::Nil);
            self.check_assign_target(target, &value_ty);
        }
    }

    fn check_assign_target(&mut self, target: &Expr, value_ty: &Ty) {
        match target {
            Expr::Name(n) => {
                let existing = self.env.lookup_symbol(&n.name).cloned();
                match existing {
                    Some(symbol) => {
                        if symbol.annotated {
                            if !self.assignable(value_ty, &symbol.ty) {
                                self.report(
                                    TypeError::AssignMismatch {
                                        expected: symbol.ty.clone(),
                                        found: value_ty.clone(),
                                    },
                                    n.span,
                                );
                            }
                        } else {
                            // Unannotated mutable binding: track the
                            // assigned value.
                            self.env
                                .update_symbol_type(&n.name, widen_for_binding(value_ty.clone()));
                        }
                    }
                    None => {
                        if self.mode == CheckMode::Strict {
                            self.report(
                                TypeError::UnknownIdentifier {
                                    name: n.name.clone(),
                                },
                                n.span,
                            );
                        }
                        // Implicit global.
                        self.env.define_global(Symbol {
                            name: n.name.clone(),
                            ty: widen_for_binding(value_ty.clone()),
                            kind: SymbolKind::Global,
                            mutable: true,
                            annotated: false,
                            decl_span: Some(n.span),
                            doc: None,
                        });
                    }
                }
            }
            Expr::Member(m) => {
                let object_ty = self.infer_expr(&m.object);
                self.check_member_assign(&object_ty, &m.member, value_ty);
            }
            Expr::Index(ix) => {
                self.infer_expr(&ix.object);
                self.infer_expr(&ix.index);
            }
            other => {
                self.infer_expr(other);
            }
        }
    }

    fn check_member_assign(&mut self, object_ty: &Ty, member: &Name, value_ty: &Ty) {
        let object_ty = self.resolve_shallow(object_ty);
        match &object_ty {
            Ty::Class(class) => {
                let found = self.env.class_member(class, &member.text).or_else(|| {
                    canonical_correction(&member.text).and_then(|canonical| {
                        let corrected = self.env.class_member(class, canonical);
                        if corrected.is_some() {
                            self.report(
                                TypeError::CaseSensitivity {
                                    found: member.text.clone(),
                                    expected: canonical.to_string(),
                                },
                                member.span,
                            );
                        }
                        corrected
                    })
                });
                match found {
                    Some(class_member) => {
                        if let Some(message) = &class_member.deprecated {
                            self.report(
                                TypeError::DeprecatedMember {
                                    name: member.text.clone(),
                                    message: message.clone(),
                                },
                                member.span,
                            );
                        }
                        if !self.assignable(value_ty, &class_member.ty) {
                            self.report(
                                TypeError::AssignMismatch {
                                    expected: class_member.ty.clone(),
                                    found: value_ty.clone(),
                                },
                                member.span,
                            );
                        }
                    }
                    None => {
                        self.report(
                            TypeError::PropertyNotFound {
                                ty: object_ty.clone(),
                                name: member.text.clone(),
                            },
                            member.span,
                        );
                    }
                }
            }
            Ty::Table(table) => {
                if let Some(prop) = table.prop(&member.text) {
                    if self.mode == CheckMode::Strict && !self.assignable(value_ty, &prop.ty) {
                        self.report(
                            TypeError::AssignMismatch {
                                expected: prop.ty.clone(),
                                found: value_ty.clone(),
                            },
                            member.span,
                        );
                    }
                }
                // Adding a new property to a table is ordinary Lua.
            }
            _ => {}
        }
    }

    fn check_compound_assign(&mut self, s: &ast::CompoundAssignStat) {
        let target_ty = self.infer_expr(&s.target);
        let value_ty = self.infer_expr(&s.value);
        let op = s.op.symbol();

        if s.op == ast::BinaryOp::Concat {
            // String concatenation accepts strings and numbers.
            for (ty, span) in [(&target_ty, s.target.span()), (&value_ty, s.value.span())] {
                if !self.concat_compatible(ty) {
                    self.report(
                        TypeError::CompoundAssignMismatch {
                            op,
                            found: ty.clone(),
                        },
                        span,
                    );
                }
            }
            return;
        }

        for (ty, span) in [(&target_ty, s.target.span()), (&value_ty, s.value.span())] {
            if !self.numeric_compatible(ty) {
                self.report(
                    TypeError::CompoundAssignMismatch {
                        op,
                        found: ty.clone(),
                    },
                    span,
                );
            }
        }
    }

    fn check_if(&mut self, s: &ast::IfStat) {
        self.infer_expr(&s.condition);
        let narrowing = self.find_isa_narrowing(&s.condition);

        self.env.enter_scope(ScopeKind::Conditional);
        if let Some((name, class)) = narrowing {
            self.env.set_narrowing(name, Ty::Class(class));
        }
        self.check_block_stats(&s.then_block);
        self.env.exit_scope();

        // elseif/else branches run with the parent narrowings only.
        for clause in &s.elseif_clauses {
            self.infer_expr(&clause.condition);
            self.check_scoped_block(&clause.block, ScopeKind::Conditional);
        }
        if let Some(else_block) = &s.else_block {
            self.check_scoped_block(else_block, ScopeKind::Conditional);
        }
    }

    /// Recognize `x:IsA("ClassName")` -- possibly parenthesized,
    /// possibly one side of an `and` -- when `ClassName` is registered.
    fn find_isa_narrowing(&self, cond: &Expr) -> Option<(String, Rc<ClassTy>)> {
        match cond {
            Expr::Paren(p) => self.find_isa_narrowing(&p.expr),
            Expr::Binary(b) if b.op == ast::BinaryOp::And => self
                .find_isa_narrowing(&b.lhs)
                .or_else(|| self.find_isa_narrowing(&b.rhs)),
            Expr::MethodCall(m) if m.method.text == "IsA" => {
                let mut object = &*m.object;
                while let Expr::Paren(p) = object {
                    object = &p.expr;
                }
                let Expr::Name(n) = object else {
                    return None;
                };
                let class_name = string_arg(&m.args, 0)?;
                let class = self.env.lookup_class(&class_name)?;
                Some((n.name.clone(), class))
            }
            _ => None,
        }
    }

    fn check_numeric_for(&mut self, s: &ast::NumericForStat) {
        for bound in [Some(&s.from), Some(&s.to), s.step.as_ref()].into_iter().flatten() {
            let ty = self.infer_expr(bound);
            if !self.numeric_compatible(&ty) {
                self.report(TypeError::ForBoundNotNumeric { found: ty }, bound.span());
            }
        }

        self.env.enter_scope(ScopeKind::Loop);
        self.define_binding(&s.var, Some(Ty::Number), None);
        self.check_block_stats(&s.body);
        self.env.exit_scope();
    }

    fn check_generic_for(&mut self, s: &ast::GenericForStat) {
        // `for k, v in pairs(t)` / `ipairs(t)`: recover element types
        // from the table's indexer when it has one.
        let mut var_tys = (Ty::Any, Ty::Any);
        let mut handled_first = false;
        if let Some(Expr::Call(call)) = s.exprs.first() {
            if let Expr::Name(callee) = &*call.callee {
                if (callee.name == "pairs" || callee.name == "ipairs") && call.args.len() == 1 {
                    let arg_ty = self.infer_expr(&call.args[0]);
                    handled_first = true;
                    if let Ty::Table(table) = self.resolve_shallow(&arg_ty) {
                        if let Some(indexer) = &table.indexer {
                            var_tys = if callee.name == "ipairs" {
                                (Ty::Number, indexer.value.clone())
                            } else {
                                (indexer.key.clone(), indexer.value.clone())
                            };
                        } else if !table.props.is_empty() {
                            var_tys = (Ty::String, Ty::Any);
                        }
                    }
                }
            }
        }
        for (i, expr) in s.exprs.iter().enumerate() {
            if i == 0 && handled_first {
                continue;
            }
            self.infer_expr(expr);
        }

        self.env.enter_scope(ScopeKind::Loop);
        for (i, var) in s.vars.iter().enumerate() {
            let inferred = match i {
                0 => var_tys.0.clone(),
                1 => var_tys.1.clone(),
                _ => Ty::Any,
            };
            self.define_binding(var, Some(inferred), None);
        }
        self.check_block_stats(&s.body);
        self.env.exit_scope();
    }

    fn check_return(&mut self, s: &ast::ReturnStat) {
        let value_tys: Vec<Ty> = s.values.iter().map(|v| self.infer_expr(v)).collect();
        let first = value_tys.into_iter().next().unwrap_or(Ty::Nil);

        if let Some(frame) = self.return_stack.last() {
            if let Some(declared) = frame.declared.clone() {
                if !self.assignable(&first, &declared) {
                    self.report(
                        TypeError::ReturnMismatch {
                            expected: declared,
                            found: first.clone(),
                        },
                        s.span,
                    );
                }
            }
        }
        if let Some(frame) = self.return_stack.last_mut() {
            frame.inferred.push(widen_literal(first));
        }
    }

    fn check_type_alias(&mut self, alias: &ast::TypeAliasStat, exported: bool) {
        let name = alias.name.text.clone();
        let generics: Vec<String> = alias.generics.iter().map(|g| g.name.text.clone()).collect();

        // Phase one: bind the name to a self-referential placeholder so
        // the body can mention the alias.
        self.env.define_type_alias(TypeAlias {
            name: name.clone(),
            generics: generics.clone(),
            ty: Ty::reference(&name),
            exported,
        });

        // Resolve the body with the generic parameters in scope.
        self.env.enter_scope(ScopeKind::Block);
        for generic in &alias.generics {
            self.env.define_type_alias(TypeAlias {
                name: generic.name.text.clone(),
                generics: Vec::new(),
                ty: Ty::reference(&generic.name.text),
                exported: false,
            });
            if let Some(default) = &generic.default {
                self.resolve_annotation(default);
            }
        }
        let body = self.resolve_annotation(&alias.ty);
        self.env.exit_scope();

        // Phase two: rebind with the resolved body.
        let type_repr = body.to_string();
        self.env.define_type_alias(TypeAlias {
            name: name.clone(),
            generics,
            ty: body,
            exported,
        });

        self.env.record_symbol(crate::env::SymbolRecord {
            name,
            kind: SymbolKind::TypeAlias,
            type_repr,
            span: Some(alias.name.span),
            doc: alias
                .doc
                .as_ref()
                .map(|d| d.description.clone())
                .filter(|d| !d.is_empty()),
        });
    }

    // ── Functions ──────────────────────────────────────────────────────

    fn check_function(
        &mut self,
        func: &FunctionExpr,
        this: Option<Ty>,
        doc: Option<&DocComment>,
    ) -> Ty {
        self.env.enter_scope(ScopeKind::Function);

        let mut generics = Vec::new();
        for generic in &func.generics {
            self.env.define_type_alias(TypeAlias {
                name: generic.name.text.clone(),
                generics: Vec::new(),
                ty: Ty::reference(&generic.name.text),
                exported: false,
            });
            let default = generic
                .default
                .as_ref()
                .map(|d| self.resolve_annotation(d));
            generics.push(GenericTyParam {
                name: generic.name.text.clone(),
                constraint: None,
                default,
            });
        }

        if let Some(this_ty) = &this {
            self.env.define_symbol(Symbol {
                name: "self".to_string(),
                ty: this_ty.clone(),
                kind: SymbolKind::Parameter,
                mutable: false,
                annotated: true,
                decl_span: None,
                doc: None,
            });
        }

        let mut params = Vec::new();
        for param in &func.params {
            let (ty, annotated) = match &param.annotation {
                Some(annot) => (self.resolve_annotation(annot), true),
                None => {
                    // Fall back to a `@param` doc type when present.
                    let doc_ty = doc
                        .and_then(|d| d.param(&param.name.text))
                        .and_then(|p| self.resolve_doc_type(&p.ty));
                    match doc_ty {
                        Some(ty) => (ty, true),
                        None => (Ty::Any, false),
                    }
                }
            };
            let optional = matches!(ty, Ty::Optional(_));
            self.env.define_symbol(Symbol {
                name: param.name.text.clone(),
                ty: ty.clone(),
                kind: SymbolKind::Parameter,
                mutable: true,
                annotated,
                decl_span: Some(param.name.span),
                doc: None,
            });
            params.push(ParamTy {
                name: Some(param.name.text.clone()),
                ty,
                optional,
            });
        }

        if let Some(annot) = &func.vararg_annotation {
            self.resolve_annotation(annot);
        }

        let declared_ret = match &func.return_annotation {
            Some(annot) => Some(self.resolve_annotation(annot)),
            None => doc
                .and_then(|d| d.returns.first())
                .and_then(|r| self.resolve_doc_type(&r.ty)),
        };

        self.return_stack.push(FunctionReturns {
            declared: declared_ret.clone(),
            inferred: Vec::new(),
        });
        self.check_block_stats(&func.body);
        let returns = self.return_stack.pop().expect("return frame");
        self.env.exit_scope();

        let ret = match declared_ret {
            Some(declared) => declared,
            None => {
                let mut inferred = returns.inferred.into_iter();
                match inferred.next() {
                    None => Ty::Nil,
                    Some(first) => inferred.fold(first, |acc, ty| self.common(acc, ty)),
                }
            }
        };

        Ty::Function(Rc::new(FunctionTy {
            generics,
            this,
            params,
            ret,
            vararg: func.vararg,
            description: doc
                .map(|d| d.description.clone())
                .filter(|d| !d.is_empty()),
            example: None,
        }))
    }

    // ── Expressions ────────────────────────────────────────────────────

    fn infer_expr(&mut self, expr: &Expr) -> Ty {
        match expr {
            Expr::Name(n) => self.infer_name(n),
            Expr::Nil(_) => Ty::Nil,
            Expr::Boolean(b) => self.literal(LiteralValue::Bool(b.value)),
            Expr::Number(n) => self.literal(LiteralValue::Number(n.value)),
            Expr::Str(s) => self.literal(LiteralValue::Str(s.value.clone())),
            Expr::Vararg(_) => Ty::Any,
            Expr::Function(f) => self.check_function(f, None, None),
            Expr::Table(t) => self.infer_table(t),
            Expr::Binary(b) => self.infer_binary(b),
            Expr::Unary(u) => self.infer_unary(u),
            Expr::Call(c) => self.infer_call(c),
            Expr::MethodCall(m) => self.infer_method_call(m),
            Expr::Index(ix) => self.infer_index(ix),
            Expr::Member(m) => {
                let object_ty = self.infer_expr(&m.object);
                self.member_access(&object_ty, &m.member.text, m.member.span, false)
            }
            Expr::IfElse(e) => {
                self.infer_expr(&e.condition);
                let mut result = self.infer_expr(&e.then_expr);
                for (cond, value) in &e.elseif_arms {
                    self.infer_expr(cond);
                    let arm = self.infer_expr(value);
                    result = self.common(result, arm);
                }
                let else_ty = self.infer_expr(&e.else_expr);
                self.common(result, else_ty)
            }
            Expr::Cast(c) => {
                self.infer_expr(&c.expr);
                self.resolve_annotation(&c.ty)
            }
            Expr::Interpolated(i) => {
                for part in &i.parts {
                    if let ast::InterpolatedPart::Expr(inner) = part {
                        self.infer_expr(inner);
                    }
                }
                Ty::String
            }
            Expr::Paren(p) => self.infer_expr(&p.expr),
            Expr::Error(e) => Ty::error(e.message.clone()),
        }
    }

    /// Literals keep their singleton types in strict mode and widen to
    /// their base otherwise.
    fn literal(&self, value: LiteralValue) -> Ty {
        if self.mode == CheckMode::Strict {
            Ty::Literal(value)
        } else {
            value.base_ty()
        }
    }

    fn infer_name(&mut self, n: &ast::NameExpr) -> Ty {
        if let Some(narrowed) = self.env.narrowed(&n.name) {
            return narrowed.clone();
        }
        match self.env.lookup_symbol(&n.name) {
            Some(symbol) => symbol.ty.clone(),
            None => {
                if self.mode == CheckMode::Strict {
                    self.report(
                        TypeError::UnknownIdentifier {
                            name: n.name.clone(),
                        },
                        n.span,
                    );
                    Ty::error(format!("unknown identifier `{}`", n.name))
                } else {
                    Ty::Any
                }
            }
        }
    }

    fn infer_table(&mut self, table: &ast::TableExpr) -> Ty {
        let mut props: Vec<TableProp> = Vec::new();
        let mut items: Vec<Ty> = Vec::new();
        let mut computed: Option<TableIndexer> = None;

        for field in &table.fields {
            match field {
                ast::TableField::Named { key, value } => {
                    let ty = widen_literal(self.infer_expr(value));
                    props.push(TableProp::new(key.text.clone(), ty));
                }
                ast::TableField::Computed { key, value } => {
                    // String-literal keys behave like named fields.
                    if let Expr::Str(s) = key {
                        let ty = widen_literal(self.infer_expr(value));
                        props.push(TableProp::new(s.value.clone(), ty));
                    } else {
                        let key_ty = widen_literal(self.infer_expr(key));
                        let value_ty = widen_literal(self.infer_expr(value));
                        computed = Some(match computed.take() {
                            None => TableIndexer {
                                key: key_ty,
                                value: value_ty,
                            },
                            Some(prev) => TableIndexer {
                                key: self.common(prev.key, key_ty),
                                value: self.common(prev.value, value_ty),
                            },
                        });
                    }
                }
                ast::TableField::Item(item) => {
                    items.push(widen_literal(self.infer_expr(item)));
                }
            }
        }

        let mut indexer = None;
        let mut is_array = false;
        if !items.is_empty() {
            let mut iter = items.into_iter();
            let first = iter.next().expect("non-empty items");
            let item_ty = iter.fold(first, |acc, ty| self.common(acc, ty));
            is_array = props.is_empty() && computed.is_none();
            indexer = Some(TableIndexer {
                key: Ty::Number,
                value: item_ty,
            });
        }
        if computed.is_some() {
            indexer = computed;
        }

        Ty::Table(Rc::new(TableTy {
            props,
            indexer,
            metatable: None,
            is_array,
        }))
    }

    // ── Binary and unary operators ─────────────────────────────────────

    /// Whether a type can participate in arithmetic: numbers, number
    /// literals, `any`/`error`, the native vector type, the named math
    /// types, tables with a math-type shape, and (in non-strict mode)
    /// unions containing at least one numeric-compatible member.
    fn numeric_compatible(&self, ty: &Ty) -> bool {
        match ty {
            Ty::Number
            | Ty::Literal(LiteralValue::Number(_))
            | Ty::Any
            | Ty::Error(_)
            | Ty::Vector => true,
            Ty::Class(c) => MATH_TYPES.contains(&c.name.as_str()),
            Ty::Reference(r) => r.module.is_none() && MATH_TYPES.contains(&r.name.as_str()),
            Ty::Table(t) => {
                (t.prop("X").is_some() && t.prop("Y").is_some())
                    || (t.prop("Width").is_some() && t.prop("Height").is_some())
                    || (t.prop("Scale").is_some() && t.prop("Offset").is_some())
            }
            Ty::Union(members) => {
                self.mode == CheckMode::Nonstrict
                    && members.iter().any(|m| self.numeric_compatible(m))
            }
            Ty::Optional(inner) => {
                self.mode == CheckMode::Nonstrict && self.numeric_compatible(inner)
            }
            _ => false,
        }
    }

    /// Whether a type is a named math type (drives the result type of
    /// mixed arithmetic like `cframe * vector`).
    fn math_type(&self, ty: &Ty) -> bool {
        match ty {
            Ty::Vector => true,
            Ty::Class(c) => MATH_TYPES.contains(&c.name.as_str()),
            Ty::Reference(r) => r.module.is_none() && MATH_TYPES.contains(&r.name.as_str()),
            Ty::Table(t) => {
                (t.prop("X").is_some() && t.prop("Y").is_some())
                    || (t.prop("Width").is_some() && t.prop("Height").is_some())
                    || (t.prop("Scale").is_some() && t.prop("Offset").is_some())
            }
            _ => false,
        }
    }

    fn concat_compatible(&self, ty: &Ty) -> bool {
        matches!(
            ty,
            Ty::String
                | Ty::Number
                | Ty::Literal(LiteralValue::Str(_))
                | Ty::Literal(LiteralValue::Number(_))
                | Ty::Any
                | Ty::Error(_)
        )
    }

    fn infer_binary(&mut self, b: &ast::BinaryExpr) -> Ty {
        let lhs = self.infer_expr(&b.lhs);
        let rhs = self.infer_expr(&b.rhs);
        let op = b.op.symbol();

        if b.op.is_arithmetic() {
            for (ty, span) in [(&lhs, b.lhs.span()), (&rhs, b.rhs.span())] {
                if !self.numeric_compatible(ty) {
                    self.report(
                        TypeError::ArithmeticMismatch {
                            op,
                            found: ty.clone(),
                        },
                        span,
                    );
                }
            }
            // Result: the first math-type operand, else number.
            if self.math_type(&lhs) {
                return lhs;
            }
            if self.math_type(&rhs) {
                return rhs;
            }
            return Ty::Number;
        }

        match b.op {
            ast::BinaryOp::Concat => Ty::String,
            ast::BinaryOp::And => subtype::make_union(vec![
                rhs,
                Ty::Literal(LiteralValue::Bool(false)),
                Ty::Nil,
            ]),
            ast::BinaryOp::Or => subtype::make_union(vec![lhs, rhs]),
            // Comparisons.
            _ => Ty::Boolean,
        }
    }

    fn infer_unary(&mut self, u: &ast::UnaryExpr) -> Ty {
        let operand = self.infer_expr(&u.operand);
        match u.op {
            ast::UnaryOp::Neg => {
                if !self.numeric_compatible(&operand) {
                    self.report(
                        TypeError::ArithmeticMismatch {
                            op: "-",
                            found: operand.clone(),
                        },
                        u.operand.span(),
                    );
                }
                if self.math_type(&operand) {
                    operand
                } else {
                    Ty::Number
                }
            }
            ast::UnaryOp::Not => Ty::Boolean,
            ast::UnaryOp::Len => Ty::Number,
        }
    }

    // ── Calls ──────────────────────────────────────────────────────────

    fn infer_call(&mut self, call: &ast::CallExpr) -> Ty {
        // `Instance.new("ClassName")` -> the named class, falling back
        // to the generic Instance class when unknown.
        if let Expr::Member(member) = &*call.callee {
            if let Expr::Name(object) = &*member.object {
                if object.name == "Instance" && member.member.text == "new" {
                    if let Some(class_name) = string_arg(&call.args, 0) {
                        for arg in call.args.iter().skip(1) {
                            self.infer_expr(arg);
                        }
                        if let Some(class) = self.env.lookup_class(&class_name) {
                            return Ty::Class(class);
                        }
                        if let Some(instance) = self.env.lookup_class("Instance") {
                            return Ty::Class(instance);
                        }
                        return Ty::Any;
                    }
                }
            }
        }

        let callee_ty = self.infer_expr(&call.callee);
        for arg in &call.args {
            self.infer_expr(arg);
        }

        match self.resolve_shallow(&callee_ty) {
            Ty::Function(f) => f.ret.clone(),
            Ty::Any | Ty::Unknown => Ty::Any,
            Ty::Error(_) => callee_ty,
            Ty::Intersection(members) => members
                .iter()
                .find_map(|m| match m {
                    Ty::Function(f) => Some(f.ret.clone()),
                    _ => None,
                })
                .unwrap_or(Ty::Any),
            other => {
                self.report(TypeError::NotCallable { ty: other }, call.callee.span());
                Ty::error("callee is not callable")
            }
        }
    }

    fn infer_method_call(&mut self, call: &ast::MethodCallExpr) -> Ty {
        let object_ty = self.infer_expr(&call.object);
        for arg in &call.args {
            self.infer_expr(arg);
        }

        if object_ty.is_error() {
            return object_ty;
        }
        if matches!(object_ty, Ty::Any | Ty::Unknown) {
            return Ty::Any;
        }
        // Annotated values carry late-bound references; the special
        // forms below match on the resolved shape.
        let object_ty = self.resolve_shallow(&object_ty);

        // Special forms run before generic member lookup.
        match call.method.text.as_str() {
            "GetService" => {
                if let Some(service) = string_arg(&call.args, 0) {
                    if let Some(class) = self.env.lookup_class(&service) {
                        return Ty::Class(class);
                    }
                    return Ty::Any;
                }
            }
            "Clone" => {
                if matches!(object_ty, Ty::Class(_)) {
                    return object_ty;
                }
            }
            "IsA" => {
                if matches!(object_ty, Ty::Class(_)) {
                    return Ty::Boolean;
                }
            }
            "FindFirstChildOfClass"
            | "FindFirstChildWhichIsA"
            | "FindFirstAncestorOfClass"
            | "FindFirstAncestorWhichIsA" => {
                if let Some(class_name) = string_arg(&call.args, 0) {
                    if let Some(class) = self.env.lookup_class(&class_name) {
                        return Ty::optional(Ty::Class(class));
                    }
                }
            }
            "Wait" => {
                if let Some(payload) = self.signal_wait_type(&object_ty) {
                    return payload;
                }
            }
            _ => {}
        }

        let member_ty = self.member_access(&object_ty, &call.method.text, call.method.span, true);
        match self.resolve_shallow(&member_ty) {
            Ty::Function(f) => f.ret.clone(),
            Ty::Any | Ty::Unknown => Ty::Any,
            Ty::Error(_) => member_ty,
            other => {
                self.report(TypeError::NotCallable { ty: other }, call.method.span);
                Ty::error("method is not callable")
            }
        }
    }

    /// `signal:Wait()` on an event-signal table (one whose `Connect`
    /// takes a callback) yields the callback's first parameter type.
    fn signal_wait_type(&self, object_ty: &Ty) -> Option<Ty> {
        let Ty::Table(table) = self.resolve_shallow(object_ty) else {
            return None;
        };
        let connect = table.prop("Connect")?;
        let Ty::Function(connect_fn) = &connect.ty else {
            return None;
        };
        let callback = connect_fn.params.first()?;
        let Ty::Function(callback_fn) = &callback.ty else {
            return None;
        };
        Some(
            callback_fn
                .params
                .first()
                .map(|p| p.ty.clone())
                .unwrap_or(Ty::Nil),
        )
    }

    fn infer_index(&mut self, ix: &ast::IndexExpr) -> Ty {
        let object_ty = self.infer_expr(&ix.object);
        let _key_ty = self.infer_expr(&ix.index);

        match self.resolve_shallow(&object_ty) {
            Ty::Table(table) => {
                if let Expr::Str(s) = &*ix.index {
                    if let Some(prop) = table.prop(&s.value) {
                        return prop.ty.clone();
                    }
                }
                if let Some(indexer) = &table.indexer {
                    return indexer.value.clone();
                }
                if self.mode == CheckMode::Strict {
                    if let Expr::Str(s) = &*ix.index {
                        self.report(
                            TypeError::PropertyNotFound {
                                ty: object_ty.clone(),
                                name: s.value.clone(),
                            },
                            ix.index.span(),
                        );
                        return Ty::error("property not found");
                    }
                }
                Ty::Any
            }
            Ty::Class(class) => {
                if let Expr::Str(s) = &*ix.index {
                    return self.class_member_access(&class, &s.value, ix.index.span(), false);
                }
                Ty::Any
            }
            Ty::Error(_) => object_ty,
            _ => Ty::Any,
        }
    }

    // ── Member access ──────────────────────────────────────────────────

    /// Member lookup with no diagnostics, for lvalue paths like
    /// `function M.util:reset()`.
    fn member_access_quiet(&mut self, object_ty: &Ty, name: &str) -> Ty {
        match self.resolve_shallow(object_ty) {
            Ty::Table(table) => table
                .prop(name)
                .map(|p| p.ty.clone())
                .unwrap_or(Ty::Any),
            Ty::Class(class) => self
                .env
                .class_member(&class, name)
                .map(|m| m.ty)
                .unwrap_or(Ty::Any),
            _ => Ty::Any,
        }
    }

    fn member_access(&mut self, object_ty: &Ty, name: &str, span: Span, method_call: bool) -> Ty {
        match object_ty {
            Ty::Any | Ty::Unknown => Ty::Any,
            Ty::Error(_) => object_ty.clone(),

            // The `Enum` namespace resolves against the enum registry.
            Ty::Reference(r) if r.name == "Enum" && r.module.is_none() && r.args.is_empty() => {
                match self.env.lookup_enum(name) {
                    Some(e) => Ty::Enum(e),
                    None => {
                        self.report(
                            TypeError::PropertyNotFound {
                                ty: object_ty.clone(),
                                name: name.to_string(),
                            },
                            span,
                        );
                        Ty::error("unknown enum")
                    }
                }
            }

            Ty::Enum(e) => {
                if e.items.iter().any(|item| item == name) {
                    Ty::Reference(Rc::new(TypeRef {
                        name: e.name.clone(),
                        module: Some("Enum".to_string()),
                        args: Vec::new(),
                    }))
                } else if name == "GetEnumItems" {
                    Ty::function(vec![], Ty::array(Ty::Any))
                } else {
                    self.report(
                        TypeError::PropertyNotFound {
                            ty: object_ty.clone(),
                            name: name.to_string(),
                        },
                        span,
                    );
                    Ty::error("unknown enum item")
                }
            }

            Ty::Class(class) => {
                let class = class.clone();
                self.class_member_access(&class, name, span, method_call)
            }

            Ty::Table(table) => {
                if let Some(prop) = table.prop(name) {
                    let ty = prop.ty.clone();
                    if let Some(message) = prop.deprecated.clone() {
                        self.report(
                            TypeError::DeprecatedMember {
                                name: name.to_string(),
                                message,
                            },
                            span,
                        );
                    }
                    return ty;
                }
                if let Some(indexer) = &table.indexer {
                    if matches!(indexer.key, Ty::String | Ty::Any) {
                        return indexer.value.clone();
                    }
                }
                if self.mode == CheckMode::Strict {
                    self.report(
                        TypeError::PropertyNotFound {
                            ty: object_ty.clone(),
                            name: name.to_string(),
                        },
                        span,
                    );
                    Ty::error("property not found")
                } else {
                    Ty::Any
                }
            }

            Ty::Reference(r) => match subtype::resolve_reference(r, &self.env) {
                Some(resolved) => self.member_access(&resolved, name, span, method_call),
                // Unresolved datatype references stay permissive.
                None => Ty::Any,
            },

            Ty::Optional(inner) => {
                let inner = (**inner).clone();
                self.member_access(&inner, name, span, method_call)
            }
            Ty::Union(members) => {
                let non_nil: Vec<Ty> = members
                    .iter()
                    .filter(|m| !matches!(m, Ty::Nil))
                    .cloned()
                    .collect();
                if non_nil.len() == 1 {
                    self.member_access(&non_nil[0], name, span, method_call)
                } else {
                    Ty::Any
                }
            }

            // String methods arrive through the string metatable, which
            // the universe supplies as the `string` global table.
            Ty::String | Ty::Literal(LiteralValue::Str(_)) => Ty::Any,

            _ => {
                if self.mode == CheckMode::Strict {
                    self.report(
                        TypeError::PropertyNotFound {
                            ty: object_ty.clone(),
                            name: name.to_string(),
                        },
                        span,
                    );
                    Ty::error("property not found")
                } else {
                    Ty::Any
                }
            }
        }
    }

    fn class_member_access(
        &mut self,
        class: &Rc<ClassTy>,
        name: &str,
        span: Span,
        method_call: bool,
    ) -> Ty {
        if let Some(member) = self.env.class_member(class, name) {
            if let Some(message) = member.deprecated.clone() {
                self.report(
                    TypeError::DeprecatedMember {
                        name: name.to_string(),
                        message,
                    },
                    span,
                );
            }
            return member.ty;
        }

        // Case-sensitivity hint: resolve as the canonical member so one
        // typo does not cascade.
        if let Some(canonical) = canonical_correction(name) {
            if let Some(member) = self.env.class_member(class, canonical) {
                self.report(
                    TypeError::CaseSensitivity {
                        found: name.to_string(),
                        expected: canonical.to_string(),
                    },
                    span,
                );
                return member.ty;
            }
        }

        // Well-known child instances (`workspace.Baseplate`).
        if !method_call {
            if let Some(child_class) = self.universe.common_child_type(&class.name, name) {
                if let Some(child) = self.env.lookup_class(&child_class) {
                    return Ty::Class(child);
                }
            }
        }

        let error = if method_call {
            TypeError::MethodNotFound {
                ty: Ty::Class(class.clone()),
                name: name.to_string(),
            }
        } else {
            TypeError::PropertyNotFound {
                ty: Ty::Class(class.clone()),
                name: name.to_string(),
            }
        };
        self.report(error, span);
        Ty::error("member not found")
    }

    // ── Annotation resolution ──────────────────────────────────────────

    /// Resolve a syntactic type annotation into a `Ty`.
    ///
    /// Named references stay late-bound (`Ty::Reference`) so recursive
    /// aliases work, but the name must exist now: unknown names are
    /// E010 and poison to `Error`.
    fn resolve_annotation(&mut self, annot: &TypeAnnot) -> Ty {
        match annot {
            TypeAnnot::Reference(r) => {
                let args: Vec<Ty> = r.args.iter().map(|a| self.resolve_annotation(a)).collect();
                if r.module.is_none() && args.is_empty() {
                    if let Some(primitive) = Ty::primitive_from_name(&r.name.text) {
                        return primitive;
                    }
                }
                if let Some(module) = &r.module {
                    // Foreign-module reference; resolved by the caller's
                    // document manager, opaque here.
                    return Ty::Reference(Rc::new(TypeRef {
                        name: r.name.text.clone(),
                        module: Some(module.text.clone()),
                        args,
                    }));
                }
                let name = &r.name.text;
                let known = self.env.lookup_type_alias(name).is_some()
                    || self.env.lookup_class(name).is_some()
                    || self.env.lookup_enum(name).is_some();
                if !known {
                    self.report(
                        TypeError::UnknownTypeName { name: name.clone() },
                        r.span,
                    );
                    return Ty::error(format!("unknown type `{name}`"));
                }
                Ty::Reference(Rc::new(TypeRef {
                    name: name.clone(),
                    module: None,
                    args,
                }))
            }
            TypeAnnot::Literal(l) => Ty::Literal(match &l.value {
                ast::LiteralTypeValue::Str(s) => LiteralValue::Str(s.clone()),
                ast::LiteralTypeValue::Bool(b) => LiteralValue::Bool(*b),
                ast::LiteralTypeValue::Number(n) => LiteralValue::Number(*n),
            }),
            TypeAnnot::Function(f) => {
                self.env.enter_scope(ScopeKind::Block);
                let mut generics = Vec::new();
                for generic in &f.generics {
                    self.env.define_type_alias(TypeAlias {
                        name: generic.name.text.clone(),
                        generics: Vec::new(),
                        ty: Ty::reference(&generic.name.text),
                        exported: false,
                    });
                    generics.push(GenericTyParam {
                        name: generic.name.text.clone(),
                        constraint: None,
                        default: None,
                    });
                }
                let params = f
                    .params
                    .iter()
                    .map(|p| ParamTy {
                        name: p.name.as_ref().map(|n| n.text.clone()),
                        ty: self.resolve_annotation(&p.ty),
                        optional: p.optional,
                    })
                    .collect();
                let ret = self.resolve_annotation(&f.ret);
                self.env.exit_scope();
                Ty::Function(Rc::new(FunctionTy {
                    generics,
                    this: None,
                    params,
                    ret,
                    vararg: f.vararg,
                    description: None,
                    example: None,
                }))
            }
            TypeAnnot::Table(t) => {
                let props = t
                    .props
                    .iter()
                    .map(|p| {
                        let ty = self.resolve_annotation(&p.ty);
                        TableProp {
                            name: p.name.text.clone(),
                            optional: matches!(ty, Ty::Optional(_)),
                            ty,
                            readonly: p.readonly,
                            deprecated: None,
                        }
                    })
                    .collect();
                let indexer = t.indexer.as_ref().map(|ix| TableIndexer {
                    key: self.resolve_annotation(&ix.key),
                    value: self.resolve_annotation(&ix.value),
                });
                Ty::Table(Rc::new(TableTy {
                    props,
                    indexer,
                    metatable: None,
                    is_array: t.is_array,
                }))
            }
            TypeAnnot::Union(u) => {
                let members = u.members.iter().map(|m| self.resolve_annotation(m)).collect();
                subtype::make_union(members)
            }
            TypeAnnot::Intersection(i) => {
                let members = i.members.iter().map(|m| self.resolve_annotation(m)).collect();
                subtype::make_intersection(members)
            }
            TypeAnnot::Optional(o) => Ty::optional(self.resolve_annotation(&o.inner)),
            TypeAnnot::Typeof(t) => self.infer_expr(&t.expr),
            TypeAnnot::Variadic(v) => {
                Ty::Variadic(Box::new(self.resolve_annotation(&v.inner)))
            }
            TypeAnnot::Paren(p) => self.resolve_annotation(&p.inner),
            TypeAnnot::Error(e) => Ty::error(e.message.clone()),
        }
    }

    /// Resolve a doc-comment type string through the small doc grammar:
    /// trailing `?` for optional, `|` for unions, trailing `[]` for
    /// arrays, then primitive, type alias, or class lookup. Unresolved
    /// strings yield `None` and the caller falls back to inference.
    fn resolve_doc_type(&self, text: &str) -> Option<Ty> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if let Some(inner) = text.strip_suffix('?') {
            return self.resolve_doc_type(inner).map(Ty::optional);
        }
        if text.contains('|') {
            let mut members = Vec::new();
            for part in text.split('|') {
                members.push(self.resolve_doc_type(part)?);
            }
            return Some(subtype::make_union(members));
        }
        if let Some(inner) = text.strip_suffix("[]") {
            return self.resolve_doc_type(inner).map(Ty::array);
        }
        if let Some(primitive) = Ty::primitive_from_name(text) {
            return Some(primitive);
        }
        if self.env.lookup_type_alias(text).is_some() {
            return Some(Ty::reference(text));
        }
        if let Some(class) = self.env.lookup_class(text) {
            return Some(Ty::Class(class));
        }
        None
    }
}

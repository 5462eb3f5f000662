//! Type environment: lexical scope tree, symbol table, type-alias table,
//! and the class/enum registries.
//!
//! Scopes live in an arena indexed by position; `current` tracks the
//! active scope and exited scopes stay in the arena so callers can
//! inspect the full tree after a check. Class and enum registries are
//! environment-global: class resolution is not scoped.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use serde::Serialize;

use lupa_common::span::Span;
use lupa_parser::docs::DocComment;

use crate::ty::{ClassMember, ClassTy, EnumTy, Ty, TyVar};

/// What kind of block a scope models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScopeKind {
    Global,
    Module,
    Function,
    Block,
    Loop,
    Conditional,
}

/// What kind of thing a symbol names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SymbolKind {
    Variable,
    Function,
    Parameter,
    TypeAlias,
    TypeParameter,
    Global,
    Class,
    Enum,
}

/// A named binding in a scope.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub ty: Ty,
    pub kind: SymbolKind,
    pub mutable: bool,
    /// Whether the declaration carried an explicit type annotation.
    /// Unannotated mutable locals track their assigned values instead of
    /// being checked against a fixed type.
    pub annotated: bool,
    pub decl_span: Option<Span>,
    pub doc: Option<DocComment>,
}

/// A registered type alias with its generic parameter names.
#[derive(Debug, Clone)]
pub struct TypeAlias {
    pub name: String,
    pub generics: Vec<String>,
    pub ty: Ty,
    pub exported: bool,
}

/// One scope in the tree.
#[derive(Debug)]
pub struct Scope {
    pub id: u32,
    pub kind: ScopeKind,
    pub parent: Option<usize>,
    symbols: FxHashMap<String, Symbol>,
    type_aliases: FxHashMap<String, TypeAlias>,
    /// Flow-sensitive replacement types installed by narrowing.
    narrowings: FxHashMap<String, Ty>,
}

/// A flat, serializable record of a defined symbol, for editor
/// collaborators (outline, hover, completion seeds).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolRecord {
    pub name: String,
    pub kind: SymbolKind,
    pub type_repr: String,
    pub span: Option<Span>,
    pub doc: Option<String>,
}

/// The environment for one check: scope tree plus global registries.
pub struct TypeEnvironment {
    scopes: Vec<Scope>,
    current: usize,
    classes: FxHashMap<String, Rc<ClassTy>>,
    enums: FxHashMap<String, Rc<EnumTy>>,
    next_ty_var: u32,
    all_symbols: Vec<SymbolRecord>,
}

impl TypeEnvironment {
    /// Create an environment with a single global scope.
    pub fn new() -> Self {
        TypeEnvironment {
            scopes: vec![Scope {
                id: 0,
                kind: ScopeKind::Global,
                parent: None,
                symbols: FxHashMap::default(),
                type_aliases: FxHashMap::default(),
                narrowings: FxHashMap::default(),
            }],
            current: 0,
            classes: FxHashMap::default(),
            enums: FxHashMap::default(),
            next_ty_var: 0,
            all_symbols: Vec::new(),
        }
    }

    // ── Scopes ─────────────────────────────────────────────────────────

    /// Push a fresh child scope and make it current.
    pub fn enter_scope(&mut self, kind: ScopeKind) {
        let id = self.scopes.len() as u32;
        self.scopes.push(Scope {
            id,
            kind,
            parent: Some(self.current),
            symbols: FxHashMap::default(),
            type_aliases: FxHashMap::default(),
            narrowings: FxHashMap::default(),
        });
        self.current = self.scopes.len() - 1;
    }

    /// Pop back to the parent scope.
    ///
    /// # Panics
    ///
    /// Panics when called on the global scope; that is a checker bug,
    /// not bad user input.
    pub fn exit_scope(&mut self) {
        let parent = self.scopes[self.current]
            .parent
            .expect("cannot exit the global scope");
        self.current = parent;
    }

    /// Kind of the current scope.
    pub fn current_kind(&self) -> ScopeKind {
        self.scopes[self.current].kind
    }

    /// Number of scopes created so far (including exited ones).
    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    /// Whether the current scope chain sits inside a loop, stopping at
    /// function boundaries. This is the validity contract for
    /// `break`/`continue`.
    pub fn is_in_loop_scope(&self) -> bool {
        let mut idx = Some(self.current);
        while let Some(i) = idx {
            match self.scopes[i].kind {
                ScopeKind::Loop => return true,
                ScopeKind::Function => return false,
                _ => {}
            }
            idx = self.scopes[i].parent;
        }
        false
    }

    // ── Symbols ────────────────────────────────────────────────────────

    /// Define a symbol in the current scope. A later write with the same
    /// name in the same scope silently replaces the earlier one.
    pub fn define_symbol(&mut self, symbol: Symbol) {
        self.all_symbols.push(SymbolRecord {
            name: symbol.name.clone(),
            kind: symbol.kind,
            type_repr: symbol.ty.to_string(),
            span: symbol.decl_span,
            doc: symbol
                .doc
                .as_ref()
                .map(|d| d.description.clone())
                .filter(|d| !d.is_empty()),
        });
        self.scopes[self.current]
            .symbols
            .insert(symbol.name.clone(), symbol);
    }

    /// Look a name up from the current scope to the root; first hit wins.
    pub fn lookup_symbol(&self, name: &str) -> Option<&Symbol> {
        let mut idx = Some(self.current);
        while let Some(i) = idx {
            if let Some(symbol) = self.scopes[i].symbols.get(name) {
                return Some(symbol);
            }
            idx = self.scopes[i].parent;
        }
        None
    }

    /// Define a symbol directly in the global scope (implicit globals
    /// from unqualified assignment).
    pub fn define_global(&mut self, symbol: Symbol) {
        self.all_symbols.push(SymbolRecord {
            name: symbol.name.clone(),
            kind: symbol.kind,
            type_repr: symbol.ty.to_string(),
            span: symbol.decl_span,
            doc: None,
        });
        self.scopes[0].symbols.insert(symbol.name.clone(), symbol);
    }

    /// Append a symbol record without touching any scope's bindings
    /// (used for type aliases, which live in a separate namespace).
    pub fn record_symbol(&mut self, record: SymbolRecord) {
        self.all_symbols.push(record);
    }

    /// Replace the recorded type of an existing symbol, wherever it is
    /// on the scope chain. Returns false when the name is unbound.
    pub fn update_symbol_type(&mut self, name: &str, ty: Ty) -> bool {
        let mut idx = Some(self.current);
        while let Some(i) = idx {
            if let Some(symbol) = self.scopes[i].symbols.get_mut(name) {
                symbol.ty = ty;
                return true;
            }
            idx = self.scopes[i].parent;
        }
        false
    }

    /// Count of symbols in the global scope.
    pub fn global_symbol_count(&self) -> usize {
        self.scopes[0].symbols.len()
    }

    /// Every symbol defined during the check, in definition order.
    pub fn all_symbols(&self) -> &[SymbolRecord] {
        &self.all_symbols
    }

    pub fn take_symbols(&mut self) -> Vec<SymbolRecord> {
        std::mem::take(&mut self.all_symbols)
    }

    // ── Type aliases ───────────────────────────────────────────────────

    /// Define a type alias in the current scope.
    pub fn define_type_alias(&mut self, alias: TypeAlias) {
        self.scopes[self.current]
            .type_aliases
            .insert(alias.name.clone(), alias);
    }

    /// Look an alias up from the current scope to the root.
    pub fn lookup_type_alias(&self, name: &str) -> Option<&TypeAlias> {
        let mut idx = Some(self.current);
        while let Some(i) = idx {
            if let Some(alias) = self.scopes[i].type_aliases.get(name) {
                return Some(alias);
            }
            idx = self.scopes[i].parent;
        }
        None
    }

    // ── Narrowings ─────────────────────────────────────────────────────

    /// Install a flow-sensitive replacement type for a name in the
    /// current scope. Cleared automatically when the scope is exited.
    pub fn set_narrowing(&mut self, name: impl Into<String>, ty: Ty) {
        self.scopes[self.current].narrowings.insert(name.into(), ty);
    }

    /// The innermost narrowing for a name, if any.
    pub fn narrowed(&self, name: &str) -> Option<&Ty> {
        let mut idx = Some(self.current);
        while let Some(i) = idx {
            if let Some(ty) = self.scopes[i].narrowings.get(name) {
                return Some(ty);
            }
            idx = self.scopes[i].parent;
        }
        None
    }

    // ── Classes and enums ──────────────────────────────────────────────

    /// Register a class in the environment-global registry.
    pub fn define_class(&mut self, class: Rc<ClassTy>) {
        self.classes.insert(class.name.clone(), class);
    }

    pub fn lookup_class(&self, name: &str) -> Option<Rc<ClassTy>> {
        self.classes.get(name).cloned()
    }

    /// Register an enum in the environment-global registry.
    pub fn define_enum(&mut self, e: Rc<EnumTy>) {
        self.enums.insert(e.name.clone(), e);
    }

    pub fn lookup_enum(&self, name: &str) -> Option<Rc<EnumTy>> {
        self.enums.get(name).cloned()
    }

    pub fn enums(&self) -> impl Iterator<Item = &Rc<EnumTy>> {
        self.enums.values()
    }

    pub fn has_classes(&self) -> bool {
        !self.classes.is_empty()
    }

    /// Whether `sub`'s inheritance chain reaches `sup_name` (by class
    /// identity). Bounded to guard against malformed cyclic registries.
    pub fn class_has_ancestor(&self, sub: &ClassTy, sup_name: &str) -> bool {
        if sub.name == sup_name {
            return true;
        }
        let mut cursor = sub.superclass.clone();
        let mut hops = 0;
        while let Some(name) = cursor {
            if name == sup_name {
                return true;
            }
            hops += 1;
            if hops > 64 {
                break;
            }
            cursor = self
                .classes
                .get(&name)
                .and_then(|c| c.superclass.clone());
        }
        false
    }

    /// Look a member up on a class, walking the inheritance chain.
    pub fn class_member(&self, class: &ClassTy, name: &str) -> Option<ClassMember> {
        if let Some(member) = class.member(name) {
            return Some(member.clone());
        }
        let mut cursor = class.superclass.clone();
        let mut hops = 0;
        while let Some(super_name) = cursor {
            let Some(superclass) = self.classes.get(&super_name) else {
                break;
            };
            if let Some(member) = superclass.member(name) {
                return Some(member.clone());
            }
            hops += 1;
            if hops > 64 {
                break;
            }
            cursor = superclass.superclass.clone();
        }
        None
    }

    // ── Type variables ─────────────────────────────────────────────────

    /// Allocate a fresh type variable.
    pub fn fresh_var(&mut self) -> Ty {
        let var = TyVar(self.next_ty_var);
        self.next_ty_var += 1;
        Ty::Var(var)
    }
}

impl Default for TypeEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

/// Shorthand for defining a global symbol during environment seeding.
pub(crate) fn global_symbol(name: &str, ty: Ty) -> Symbol {
    Symbol {
        name: name.to_string(),
        ty,
        kind: SymbolKind::Global,
        mutable: false,
        annotated: true,
        decl_span: None,
        doc: None,
    }
}

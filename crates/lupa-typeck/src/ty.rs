//! Type representation for the Lupa checker.
//!
//! `Ty` is a tagged enum covering primitives, literal types, functions,
//! tables, classes, enums, compositions, and the `Any`/`Unknown`/`Never`
//! sentinels. Function, table, and class payloads sit behind `Rc` so
//! types are cheap to share; the class registry owns class instances and
//! the superclass link is by name, keeping ownership tree-shaped.
//!
//! Equality is structural except for classes and enums (nominal by name)
//! and references (name + module + argument types). `Error` types compare
//! equal regardless of message.

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

/// A fresh type variable with a unique id (reserved for generics work).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TyVar(pub u32);

/// The value of a literal type, with its base primitive derivable.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Str(String),
    Number(f64),
    Bool(bool),
}

impl LiteralValue {
    /// The primitive this literal belongs to.
    pub fn base_ty(&self) -> Ty {
        match self {
            LiteralValue::Str(_) => Ty::String,
            LiteralValue::Number(_) => Ty::Number,
            LiteralValue::Bool(_) => Ty::Boolean,
        }
    }
}

/// A Luau type.
#[derive(Debug, Clone)]
pub enum Ty {
    // ── Primitives ─────────────────────────────────────────────────────
    Nil,
    Boolean,
    Number,
    String,
    Thread,
    Buffer,
    Vector,

    /// A singleton literal type (`"up"`, `42`, `true`).
    Literal(LiteralValue),

    Function(Rc<FunctionTy>),
    Table(Rc<TableTy>),
    /// Nominal class from the type universe; shared by reference.
    Class(Rc<ClassTy>),
    /// Nominal enum from the type universe.
    Enum(Rc<EnumTy>),

    // ── Compositions ───────────────────────────────────────────────────
    Union(Vec<Ty>),
    Intersection(Vec<Ty>),
    /// `T?` -- sugar for `T | nil` kept as its own variant.
    Optional(Box<Ty>),
    /// `...T` in return or parameter position.
    Variadic(Box<Ty>),

    /// An inference variable.
    Var(TyVar),
    /// A named reference resolved late through the environment.
    Reference(Rc<TypeRef>),

    // ── Sentinels ──────────────────────────────────────────────────────
    Any,
    Unknown,
    Never,
    /// Poison type carrying the message of the error that produced it.
    /// Operations on it stay silent to avoid diagnostic cascades.
    Error(String),
}

/// A generic parameter of a function type. Constraints and defaults are
/// carried but not yet enforced through subtyping.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericTyParam {
    pub name: String,
    pub constraint: Option<Ty>,
    pub default: Option<Ty>,
}

/// One parameter of a function type.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamTy {
    pub name: Option<String>,
    pub ty: Ty,
    pub optional: bool,
}

/// A function type.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionTy {
    pub generics: Vec<GenericTyParam>,
    /// Explicit `self` parameter for method-style functions.
    pub this: Option<Ty>,
    pub params: Vec<ParamTy>,
    pub ret: Ty,
    pub vararg: bool,
    pub description: Option<String>,
    pub example: Option<String>,
}

impl FunctionTy {
    /// A plain function type from required positional parameters.
    pub fn new(params: Vec<Ty>, ret: Ty) -> Self {
        FunctionTy {
            generics: Vec::new(),
            this: None,
            params: params
                .into_iter()
                .map(|ty| ParamTy {
                    name: None,
                    ty,
                    optional: false,
                })
                .collect(),
            ret,
            vararg: false,
            description: None,
            example: None,
        }
    }

    /// Same as [`FunctionTy::new`] but accepting any number of extra
    /// arguments past the listed ones.
    pub fn with_vararg(params: Vec<Ty>, ret: Ty) -> Self {
        let mut f = Self::new(params, ret);
        f.vararg = true;
        f
    }
}

/// A named property of a table type.
#[derive(Debug, Clone, PartialEq)]
pub struct TableProp {
    pub name: String,
    pub ty: Ty,
    pub readonly: bool,
    pub optional: bool,
    pub deprecated: Option<String>,
}

impl TableProp {
    pub fn new(name: impl Into<String>, ty: Ty) -> Self {
        TableProp {
            name: name.into(),
            ty,
            readonly: false,
            optional: false,
            deprecated: None,
        }
    }
}

/// `[K]: V` indexer of a table type.
#[derive(Debug, Clone, PartialEq)]
pub struct TableIndexer {
    pub key: Ty,
    pub value: Ty,
}

/// A structural table type. Properties keep insertion order so hover and
/// diagnostics render fields the way the source declared them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableTy {
    pub props: Vec<TableProp>,
    pub indexer: Option<TableIndexer>,
    pub metatable: Option<Ty>,
    /// Whether this table was written/inferred as an array (`{T}`).
    pub is_array: bool,
}

impl TableTy {
    /// Look up a property by name.
    pub fn prop(&self, name: &str) -> Option<&TableProp> {
        self.props.iter().find(|p| p.name == name)
    }
}

/// A member of a class: property, method, or event.
#[derive(Debug, Clone)]
pub struct ClassMember {
    pub ty: Ty,
    pub deprecated: Option<String>,
}

impl ClassMember {
    pub fn new(ty: Ty) -> Self {
        ClassMember {
            ty,
            deprecated: None,
        }
    }
}

/// A nominal class (Roblox instance class or datatype).
///
/// The superclass link is by name; resolution goes through the class
/// registry so the registry stays the sole owner of class instances.
#[derive(Debug, Clone, Default)]
pub struct ClassTy {
    pub name: String,
    pub superclass: Option<String>,
    pub properties: FxHashMap<String, ClassMember>,
    pub methods: FxHashMap<String, ClassMember>,
    pub events: FxHashMap<String, ClassMember>,
    pub tags: Vec<String>,
}

impl ClassTy {
    pub fn new(name: impl Into<String>) -> Self {
        ClassTy {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Look up a member in this class only: properties, then methods,
    /// then events.
    pub fn member(&self, name: &str) -> Option<&ClassMember> {
        self.properties
            .get(name)
            .or_else(|| self.methods.get(name))
            .or_else(|| self.events.get(name))
    }

    /// Whether this class (not its ancestors) defines the member.
    pub fn has_member(&self, name: &str) -> bool {
        self.member(name).is_some()
    }
}

/// A nominal enum with its item names.
#[derive(Debug, Clone)]
pub struct EnumTy {
    pub name: String,
    pub items: Vec<String>,
}

impl EnumTy {
    pub fn new(name: impl Into<String>, items: Vec<String>) -> Self {
        EnumTy {
            name: name.into(),
            items,
        }
    }
}

/// A late-resolved named type: alias, class, or enum reference.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeRef {
    pub name: String,
    pub module: Option<String>,
    pub args: Vec<Ty>,
}

impl Ty {
    /// The primitive or sentinel named by a type string, if any.
    pub fn primitive_from_name(name: &str) -> Option<Ty> {
        match name {
            "nil" => Some(Ty::Nil),
            "boolean" => Some(Ty::Boolean),
            "number" => Some(Ty::Number),
            "string" => Some(Ty::String),
            "thread" => Some(Ty::Thread),
            "buffer" => Some(Ty::Buffer),
            "vector" => Some(Ty::Vector),
            "any" => Some(Ty::Any),
            "unknown" => Some(Ty::Unknown),
            "never" => Some(Ty::Never),
            _ => None,
        }
    }

    /// A function type from required positional parameters.
    pub fn function(params: Vec<Ty>, ret: Ty) -> Ty {
        Ty::Function(Rc::new(FunctionTy::new(params, ret)))
    }

    /// A table type from named properties.
    pub fn table(props: Vec<TableProp>) -> Ty {
        Ty::Table(Rc::new(TableTy {
            props,
            ..Default::default()
        }))
    }

    /// An array table `{T}`.
    pub fn array(item: Ty) -> Ty {
        Ty::Table(Rc::new(TableTy {
            props: Vec::new(),
            indexer: Some(TableIndexer {
                key: Ty::Number,
                value: item,
            }),
            metatable: None,
            is_array: true,
        }))
    }

    /// A bare named reference.
    pub fn reference(name: impl Into<String>) -> Ty {
        Ty::Reference(Rc::new(TypeRef {
            name: name.into(),
            module: None,
            args: Vec::new(),
        }))
    }

    /// `T?`
    pub fn optional(inner: Ty) -> Ty {
        match inner {
            Ty::Optional(_) => inner,
            other => Ty::Optional(Box::new(other)),
        }
    }

    pub fn string_literal(value: impl Into<String>) -> Ty {
        Ty::Literal(LiteralValue::Str(value.into()))
    }

    pub fn number_literal(value: f64) -> Ty {
        Ty::Literal(LiteralValue::Number(value))
    }

    pub fn error(message: impl Into<String>) -> Ty {
        Ty::Error(message.into())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Ty::Error(_))
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Ty::Any)
    }

    /// Whether diagnostics about this value should be suppressed
    /// (`any`/`unknown`/`error` silence follow-on complaints).
    pub fn silences_errors(&self) -> bool {
        matches!(self, Ty::Any | Ty::Unknown | Ty::Error(_))
    }

    /// The name of a class, enum, or reference type, if nominal.
    pub fn nominal_name(&self) -> Option<&str> {
        match self {
            Ty::Class(c) => Some(&c.name),
            Ty::Enum(e) => Some(&e.name),
            Ty::Reference(r) => Some(&r.name),
            _ => None,
        }
    }
}

impl PartialEq for Ty {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Ty::Nil, Ty::Nil)
            | (Ty::Boolean, Ty::Boolean)
            | (Ty::Number, Ty::Number)
            | (Ty::String, Ty::String)
            | (Ty::Thread, Ty::Thread)
            | (Ty::Buffer, Ty::Buffer)
            | (Ty::Vector, Ty::Vector)
            | (Ty::Any, Ty::Any)
            | (Ty::Unknown, Ty::Unknown)
            | (Ty::Never, Ty::Never) => true,
            // Error types compare equal regardless of message.
            (Ty::Error(_), Ty::Error(_)) => true,
            (Ty::Literal(a), Ty::Literal(b)) => a == b,
            (Ty::Function(a), Ty::Function(b)) => a == b,
            (Ty::Table(a), Ty::Table(b)) => a == b,
            // Nominal comparisons.
            (Ty::Class(a), Ty::Class(b)) => a.name == b.name,
            (Ty::Enum(a), Ty::Enum(b)) => a.name == b.name,
            (Ty::Union(a), Ty::Union(b)) | (Ty::Intersection(a), Ty::Intersection(b)) => a == b,
            (Ty::Optional(a), Ty::Optional(b)) => a == b,
            (Ty::Variadic(a), Ty::Variadic(b)) => a == b,
            (Ty::Var(a), Ty::Var(b)) => a == b,
            (Ty::Reference(a), Ty::Reference(b)) => {
                a.name == b.name && a.module == b.module && a.args == b.args
            }
            _ => false,
        }
    }
}

// ── Display ────────────────────────────────────────────────────────────

/// Format a number the way Luau prints it: integers without a fraction.
fn fmt_number(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        write!(f, "{}", value as i64)
    } else {
        write!(f, "{value}")
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Nil => write!(f, "nil"),
            Ty::Boolean => write!(f, "boolean"),
            Ty::Number => write!(f, "number"),
            Ty::String => write!(f, "string"),
            Ty::Thread => write!(f, "thread"),
            Ty::Buffer => write!(f, "buffer"),
            Ty::Vector => write!(f, "vector"),
            Ty::Literal(LiteralValue::Str(s)) => write!(f, "{s:?}"),
            Ty::Literal(LiteralValue::Number(n)) => fmt_number(f, *n),
            Ty::Literal(LiteralValue::Bool(b)) => write!(f, "{b}"),
            Ty::Function(func) => {
                write!(f, "(")?;
                for (i, param) in func.params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    if let Some(name) = &param.name {
                        write!(f, "{name}: ")?;
                    }
                    write!(f, "{}", param.ty)?;
                    if param.optional {
                        write!(f, "?")?;
                    }
                }
                if func.vararg {
                    if !func.params.is_empty() {
                        write!(f, ", ")?;
                    }
                    write!(f, "...")?;
                }
                write!(f, ") -> {}", func.ret)
            }
            Ty::Table(table) => {
                if table.is_array {
                    let item = table
                        .indexer
                        .as_ref()
                        .map(|ix| ix.value.clone())
                        .unwrap_or(Ty::Any);
                    return write!(f, "{{{item}}}");
                }
                write!(f, "{{ ")?;
                let mut first = true;
                for prop in &table.props {
                    if !first {
                        write!(f, ", ")?;
                    }
                    first = false;
                    write!(f, "{}: {}", prop.name, prop.ty)?;
                }
                if let Some(indexer) = &table.indexer {
                    if !first {
                        write!(f, ", ")?;
                    }
                    write!(f, "[{}]: {}", indexer.key, indexer.value)?;
                }
                write!(f, " }}")
            }
            Ty::Class(class) => write!(f, "{}", class.name),
            Ty::Enum(e) => write!(f, "Enum.{}", e.name),
            Ty::Union(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{member}")?;
                }
                Ok(())
            }
            Ty::Intersection(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, " & ")?;
                    }
                    write!(f, "{member}")?;
                }
                Ok(())
            }
            Ty::Optional(inner) => match inner.as_ref() {
                Ty::Union(_) | Ty::Function(_) => write!(f, "({inner})?"),
                _ => write!(f, "{inner}?"),
            },
            Ty::Variadic(inner) => write!(f, "...{inner}"),
            Ty::Var(v) => write!(f, "?{}", v.0),
            Ty::Reference(r) => {
                if let Some(module) = &r.module {
                    write!(f, "{module}.")?;
                }
                write!(f, "{}", r.name)?;
                if !r.args.is_empty() {
                    write!(f, "<")?;
                    for (i, arg) in r.args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
            Ty::Any => write!(f, "any"),
            Ty::Unknown => write!(f, "unknown"),
            Ty::Never => write!(f, "never"),
            Ty::Error(_) => write!(f, "*error*"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_display() {
        assert_eq!(Ty::Number.to_string(), "number");
        assert_eq!(Ty::Nil.to_string(), "nil");
        assert_eq!(Ty::Any.to_string(), "any");
    }

    #[test]
    fn literal_display_and_base() {
        assert_eq!(Ty::string_literal("up").to_string(), "\"up\"");
        assert_eq!(Ty::number_literal(3.0).to_string(), "3");
        assert_eq!(Ty::number_literal(3.5).to_string(), "3.5");
        assert_eq!(
            LiteralValue::Str("x".into()).base_ty(),
            Ty::String
        );
        assert_eq!(LiteralValue::Number(1.0).base_ty(), Ty::Number);
    }

    #[test]
    fn function_display() {
        let f = Ty::function(vec![Ty::Number, Ty::String], Ty::Boolean);
        assert_eq!(f.to_string(), "(number, string) -> boolean");
    }

    #[test]
    fn table_display_preserves_order() {
        let t = Ty::table(vec![
            TableProp::new("b", Ty::Number),
            TableProp::new("a", Ty::String),
        ]);
        assert_eq!(t.to_string(), "{ b: number, a: string }");
    }

    #[test]
    fn array_display() {
        assert_eq!(Ty::array(Ty::Number).to_string(), "{number}");
        let mixed = Ty::array(Ty::Union(vec![Ty::Number, Ty::String]));
        assert_eq!(mixed.to_string(), "{number | string}");
    }

    #[test]
    fn union_and_optional_display() {
        let u = Ty::Union(vec![Ty::Number, Ty::String, Ty::Nil]);
        assert_eq!(u.to_string(), "number | string | nil");
        assert_eq!(Ty::optional(Ty::Number).to_string(), "number?");
    }

    #[test]
    fn structural_equality() {
        assert_eq!(
            Ty::function(vec![Ty::Number], Ty::Nil),
            Ty::function(vec![Ty::Number], Ty::Nil)
        );
        assert_ne!(
            Ty::function(vec![Ty::Number], Ty::Nil),
            Ty::function(vec![Ty::String], Ty::Nil)
        );
        assert_eq!(
            Ty::table(vec![TableProp::new("x", Ty::Number)]),
            Ty::table(vec![TableProp::new("x", Ty::Number)])
        );
    }

    #[test]
    fn class_equality_is_nominal() {
        let mut a = ClassTy::new("Part");
        a.properties
            .insert("Position".into(), ClassMember::new(Ty::reference("Vector3")));
        let b = ClassTy::new("Part");
        // Same name, different members: still equal (nominal).
        assert_eq!(Ty::Class(Rc::new(a)), Ty::Class(Rc::new(b)));
        assert_ne!(
            Ty::Class(Rc::new(ClassTy::new("Part"))),
            Ty::Class(Rc::new(ClassTy::new("Model")))
        );
    }

    #[test]
    fn reference_equality_includes_args() {
        let a = Ty::Reference(Rc::new(TypeRef {
            name: "List".into(),
            module: None,
            args: vec![Ty::Number],
        }));
        let b = Ty::Reference(Rc::new(TypeRef {
            name: "List".into(),
            module: None,
            args: vec![Ty::Number],
        }));
        let c = Ty::Reference(Rc::new(TypeRef {
            name: "List".into(),
            module: None,
            args: vec![Ty::String],
        }));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn error_types_compare_equal() {
        assert_eq!(Ty::error("one"), Ty::error("two"));
        assert!(Ty::error("x").is_error());
        assert!(Ty::error("x").silences_errors());
    }

    #[test]
    fn optional_constructor_collapses() {
        let t = Ty::optional(Ty::optional(Ty::Number));
        assert_eq!(t, Ty::optional(Ty::Number));
    }
}

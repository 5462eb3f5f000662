//! The pluggable type universe.
//!
//! The checker does not define the Roblox API surface; the caller
//! assembles class, enum, stdlib-global, and common-children tables
//! (typically bulk-loaded from dumps) and hands them over in a
//! `TypeUniverse`. The universe is read-only during a check.
//!
//! [`TypeUniverse::from_json`] loads the compact dump format used by
//! definition-table collaborators; see the test at the bottom of this
//! file for the shape.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::ty::{ClassMember, ClassTy, EnumTy, TableProp, Ty};

/// Which built-in bundles to seed into a fresh environment, beyond the
/// always-present Luau standard globals.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinBundles {
    /// Roblox datatype constructor namespaces (Vector3, CFrame, ...).
    pub roblox_datatypes: bool,
    /// Executor-extension globals (crypt, getgenv, hookfunction, ...).
    pub executor_globals: bool,
}

impl Default for BuiltinBundles {
    fn default() -> Self {
        BuiltinBundles {
            roblox_datatypes: true,
            executor_globals: true,
        }
    }
}

/// Externally supplied definition tables consumed during a check.
#[derive(Debug, Clone, Default)]
pub struct TypeUniverse {
    /// Instance classes, keyed by name, carrying superclass links.
    pub classes: FxHashMap<String, Rc<ClassTy>>,
    /// Enums, keyed by name.
    pub enums: FxHashMap<String, Rc<EnumTy>>,
    /// Standard-library tables and any extra globals (math, string,
    /// table, task, os, coroutine, bit32, utf8, buffer, debug, ...).
    pub globals: FxHashMap<String, Ty>,
    /// Structural "common children": parent class -> child name ->
    /// child class. Consulted during member access on class values
    /// (`workspace.Baseplate`).
    pub common_children: FxHashMap<String, FxHashMap<String, String>>,
}

impl TypeUniverse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class, taking ownership.
    pub fn add_class(&mut self, class: ClassTy) {
        self.classes.insert(class.name.clone(), Rc::new(class));
    }

    /// Register an enum, taking ownership.
    pub fn add_enum(&mut self, e: EnumTy) {
        self.enums.insert(e.name.clone(), Rc::new(e));
    }

    /// Register a global value type.
    pub fn add_global(&mut self, name: impl Into<String>, ty: Ty) {
        self.globals.insert(name.into(), ty);
    }

    /// Register a well-known child of a class (`Workspace` ->
    /// `Terrain` -> `Terrain`).
    pub fn add_common_child(
        &mut self,
        parent: impl Into<String>,
        child: impl Into<String>,
        child_class: impl Into<String>,
    ) {
        self.common_children
            .entry(parent.into())
            .or_default()
            .insert(child.into(), child_class.into());
    }

    /// The class name of a well-known child, consulting the parent's
    /// whole inheritance chain.
    pub fn common_child_type(&self, parent_class: &str, child_name: &str) -> Option<String> {
        let mut cursor = Some(parent_class.to_string());
        let mut hops = 0;
        while let Some(name) = cursor {
            if let Some(children) = self.common_children.get(&name) {
                if let Some(child_class) = children.get(child_name) {
                    return Some(child_class.clone());
                }
            }
            hops += 1;
            if hops > 64 {
                break;
            }
            cursor = self.classes.get(&name).and_then(|c| c.superclass.clone());
        }
        None
    }

    /// Load a universe from the compact JSON dump format.
    ///
    /// Member types are written as type strings (`"number"`,
    /// `"Vector3"`, `"Instance?"`, `"{string}"`, `"number | string"`);
    /// unknown names become late-bound references resolved against the
    /// class registry at check time. Event parameters produce signal
    /// tables whose `Connect` takes a callback, so `:Connect` and
    /// `:Wait()` work on dumped events.
    pub fn from_json(text: &str) -> serde_json::Result<TypeUniverse> {
        let dump: UniverseDump = serde_json::from_str(text)?;
        let mut universe = TypeUniverse::new();

        for class_dump in dump.classes {
            let mut class = ClassTy::new(class_dump.name);
            class.superclass = class_dump.superclass;
            class.tags = class_dump.tags;
            for (name, member) in class_dump.properties {
                class.properties.insert(name, member.into_class_member());
            }
            for (name, method) in class_dump.methods {
                class.methods.insert(name, method.into_class_member());
            }
            for (name, event) in class_dump.events {
                let params: Vec<Ty> =
                    event.params.iter().map(|p| parse_type_str(p)).collect();
                class
                    .events
                    .insert(name, ClassMember::new(signal_type(params)));
            }
            universe.add_class(class);
        }

        for enum_dump in dump.enums {
            universe.add_enum(EnumTy::new(enum_dump.name, enum_dump.items));
        }

        for (name, ty) in dump.globals {
            universe.add_global(name, parse_type_str(&ty));
        }
        universe.common_children = dump.common_children;

        Ok(universe)
    }
}

// ── Dump format ────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct UniverseDump {
    #[serde(default)]
    classes: Vec<ClassDump>,
    #[serde(default)]
    enums: Vec<EnumDump>,
    #[serde(default)]
    globals: FxHashMap<String, String>,
    #[serde(default)]
    common_children: FxHashMap<String, FxHashMap<String, String>>,
}

#[derive(Deserialize)]
struct ClassDump {
    name: String,
    #[serde(default)]
    superclass: Option<String>,
    #[serde(default)]
    properties: FxHashMap<String, MemberDump>,
    #[serde(default)]
    methods: FxHashMap<String, MethodDump>,
    #[serde(default)]
    events: FxHashMap<String, EventDump>,
    #[serde(default)]
    tags: Vec<String>,
}

/// A property entry: either a bare type string or an object carrying a
/// deprecation message.
#[derive(Deserialize)]
#[serde(untagged)]
enum MemberDump {
    Ty(String),
    Full {
        #[serde(rename = "type")]
        ty: String,
        #[serde(default)]
        deprecated: Option<String>,
    },
}

impl MemberDump {
    fn into_class_member(self) -> ClassMember {
        match self {
            MemberDump::Ty(ty) => ClassMember::new(parse_type_str(&ty)),
            MemberDump::Full { ty, deprecated } => ClassMember {
                ty: parse_type_str(&ty),
                deprecated,
            },
        }
    }
}

#[derive(Deserialize)]
struct MethodDump {
    #[serde(default)]
    params: Vec<String>,
    #[serde(default)]
    returns: Option<String>,
    #[serde(default)]
    deprecated: Option<String>,
}

impl MethodDump {
    fn into_class_member(self) -> ClassMember {
        let params: Vec<Ty> = self.params.iter().map(|p| parse_type_str(p)).collect();
        let ret = self
            .returns
            .as_deref()
            .map(parse_type_str)
            .unwrap_or(Ty::Nil);
        ClassMember {
            ty: Ty::function(params, ret),
            deprecated: self.deprecated,
        }
    }
}

#[derive(Deserialize)]
struct EventDump {
    #[serde(default)]
    params: Vec<String>,
}

#[derive(Deserialize)]
struct EnumDump {
    name: String,
    #[serde(default)]
    items: Vec<String>,
}

/// An event-signal table: `Connect` takes a callback over the event's
/// payload, `Wait` is recognized structurally by the checker.
fn signal_type(params: Vec<Ty>) -> Ty {
    let callback = Ty::function(params, Ty::Nil);
    Ty::table(vec![
        TableProp::new("Connect", Ty::function(vec![callback], Ty::Nil)),
        TableProp::new("Once", Ty::function(vec![Ty::Any], Ty::Nil)),
    ])
}

/// Parse a dump type string: trailing `?` for optional, `|` for unions,
/// `{T}` for arrays, primitive names, and references for everything else.
fn parse_type_str(text: &str) -> Ty {
    let text = text.trim();
    if text.is_empty() {
        return Ty::Any;
    }
    if let Some(inner) = text.strip_suffix('?') {
        return Ty::optional(parse_type_str(inner));
    }
    if text.contains('|') {
        let members = text.split('|').map(parse_type_str).collect();
        return crate::subtype::make_union(members);
    }
    if let Some(inner) = text
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
    {
        return Ty::array(parse_type_str(inner));
    }
    Ty::primitive_from_name(text).unwrap_or_else(|| Ty::reference(text))
}

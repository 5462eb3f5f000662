//! Built-in environment seeding.
//!
//! Registers the Luau standard globals, the Roblox datatype constructor
//! namespaces, and the executor-extension bundle into a fresh
//! environment, then pours in whatever the caller's type universe
//! supplies (stdlib tables, classes, enums). Which bundles are included
//! is controlled by [`BuiltinBundles`].

use std::rc::Rc;

use crate::env::{global_symbol, TypeEnvironment};
use crate::ty::{FunctionTy, TableIndexer, TableProp, TableTy, Ty};
use crate::universe::{BuiltinBundles, TypeUniverse};

/// Seed a fresh environment from the universe and bundle configuration.
pub fn seed_environment(
    env: &mut TypeEnvironment,
    universe: &TypeUniverse,
    bundles: BuiltinBundles,
) {
    register_standard_globals(env);

    for (name, ty) in &universe.globals {
        env.define_symbol(global_symbol(name, ty.clone()));
    }

    if bundles.roblox_datatypes {
        register_datatype_constructors(env);
    }
    if bundles.executor_globals {
        register_executor_globals(env);
    }

    for class in universe.classes.values() {
        env.define_class(class.clone());
    }
    for e in universe.enums.values() {
        env.define_enum(e.clone());
    }

    register_instance_globals(env);
}

/// An open table: no fixed properties, `[string]: any` indexer.
fn open_table() -> Ty {
    Ty::Table(Rc::new(TableTy {
        props: Vec::new(),
        indexer: Some(TableIndexer {
            key: Ty::String,
            value: Ty::Any,
        }),
        metatable: None,
        is_array: false,
    }))
}

fn func(params: Vec<Ty>, ret: Ty) -> Ty {
    Ty::Function(Rc::new(FunctionTy::new(params, ret)))
}

fn vararg_func(params: Vec<Ty>, ret: Ty) -> Ty {
    Ty::Function(Rc::new(FunctionTy::with_vararg(params, ret)))
}

fn described(ty: Ty, description: &str) -> Ty {
    match ty {
        Ty::Function(f) => {
            let mut f = FunctionTy::clone(&f);
            f.description = Some(description.to_string());
            Ty::Function(Rc::new(f))
        }
        other => other,
    }
}

// ── Standard globals ───────────────────────────────────────────────────

/// The always-present Luau standard globals.
fn register_standard_globals(env: &mut TypeEnvironment) {
    env.define_symbol(global_symbol(
        "print",
        described(
            vararg_func(vec![], Ty::Nil),
            "Prints its arguments to the output.",
        ),
    ));
    env.define_symbol(global_symbol(
        "warn",
        described(
            vararg_func(vec![], Ty::Nil),
            "Prints its arguments as a warning.",
        ),
    ));
    env.define_symbol(global_symbol(
        "error",
        vararg_func(vec![Ty::Any], Ty::Never),
    ));
    env.define_symbol(global_symbol(
        "assert",
        vararg_func(vec![Ty::Any], Ty::Any),
    ));
    env.define_symbol(global_symbol("type", func(vec![Ty::Any], Ty::String)));
    env.define_symbol(global_symbol("typeof", func(vec![Ty::Any], Ty::String)));
    env.define_symbol(global_symbol("tostring", func(vec![Ty::Any], Ty::String)));
    env.define_symbol(global_symbol(
        "tonumber",
        vararg_func(vec![Ty::Any], Ty::optional(Ty::Number)),
    ));
    env.define_symbol(global_symbol(
        "pcall",
        vararg_func(vec![Ty::Any], Ty::Boolean),
    ));
    env.define_symbol(global_symbol(
        "xpcall",
        vararg_func(vec![Ty::Any, Ty::Any], Ty::Boolean),
    ));
    env.define_symbol(global_symbol(
        "select",
        vararg_func(vec![Ty::Any], Ty::Any),
    ));
    env.define_symbol(global_symbol("pairs", func(vec![Ty::Any], Ty::Any)));
    env.define_symbol(global_symbol("ipairs", func(vec![Ty::Any], Ty::Any)));
    env.define_symbol(global_symbol(
        "next",
        vararg_func(vec![Ty::Any], Ty::Any),
    ));
    env.define_symbol(global_symbol("unpack", vararg_func(vec![Ty::Any], Ty::Any)));
    env.define_symbol(global_symbol(
        "rawget",
        func(vec![Ty::Any, Ty::Any], Ty::Any),
    ));
    env.define_symbol(global_symbol(
        "rawset",
        func(vec![Ty::Any, Ty::Any, Ty::Any], Ty::Any),
    ));
    env.define_symbol(global_symbol(
        "rawequal",
        func(vec![Ty::Any, Ty::Any], Ty::Boolean),
    ));
    env.define_symbol(global_symbol("rawlen", func(vec![Ty::Any], Ty::Number)));
    env.define_symbol(global_symbol(
        "setmetatable",
        func(vec![Ty::Any, Ty::Any], Ty::Any),
    ));
    env.define_symbol(global_symbol("getmetatable", func(vec![Ty::Any], Ty::Any)));
    env.define_symbol(global_symbol("require", func(vec![Ty::Any], Ty::Any)));
    env.define_symbol(global_symbol("getfenv", vararg_func(vec![], Ty::Any)));
    env.define_symbol(global_symbol(
        "setfenv",
        vararg_func(vec![Ty::Any], Ty::Any),
    ));
    env.define_symbol(global_symbol("newproxy", vararg_func(vec![], Ty::Any)));
    env.define_symbol(global_symbol("_G", open_table()));
    env.define_symbol(global_symbol("_VERSION", Ty::String));
    env.define_symbol(global_symbol("shared", open_table()));
}

// ── Roblox datatype constructors ───────────────────────────────────────

/// Datatypes whose namespace only carries `new`.
const PLAIN_DATATYPES: &[&str] = &[
    "CFrame",
    "UDim",
    "Rect",
    "Region3",
    "Ray",
    "TweenInfo",
    "NumberSequence",
    "ColorSequence",
    "NumberSequenceKeypoint",
    "ColorSequenceKeypoint",
    "Random",
    "Axes",
    "Faces",
    "Font",
    "PhysicalProperties",
    "OverlapParams",
    "RaycastParams",
    "Vector2int16",
    "Vector3int16",
    "Region3int16",
    "PathWaypoint",
    "CatalogSearchParams",
    "BrickColor",
];

/// A constructor namespace table: `new` plus any extra members.
fn datatype_namespace(name: &str, extras: Vec<TableProp>) -> Ty {
    let mut props = vec![TableProp::new(
        "new",
        vararg_func(vec![], Ty::reference(name)),
    )];
    props.extend(extras);
    Ty::table(props)
}

fn register_datatype_constructors(env: &mut TypeEnvironment) {
    for name in PLAIN_DATATYPES {
        env.define_symbol(global_symbol(name, datatype_namespace(name, vec![])));
    }

    for name in ["Vector2", "Vector3"] {
        env.define_symbol(global_symbol(
            name,
            datatype_namespace(
                name,
                vec![
                    TableProp::new("zero", Ty::reference(name)),
                    TableProp::new("one", Ty::reference(name)),
                ],
            ),
        ));
    }

    env.define_symbol(global_symbol(
        "Color3",
        datatype_namespace(
            "Color3",
            vec![
                TableProp::new(
                    "fromRGB",
                    func(vec![Ty::Number, Ty::Number, Ty::Number], Ty::reference("Color3")),
                ),
                TableProp::new(
                    "fromHSV",
                    func(vec![Ty::Number, Ty::Number, Ty::Number], Ty::reference("Color3")),
                ),
            ],
        ),
    ));

    env.define_symbol(global_symbol(
        "UDim2",
        datatype_namespace(
            "UDim2",
            vec![
                TableProp::new(
                    "fromScale",
                    func(vec![Ty::Number, Ty::Number], Ty::reference("UDim2")),
                ),
                TableProp::new(
                    "fromOffset",
                    func(vec![Ty::Number, Ty::Number], Ty::reference("UDim2")),
                ),
            ],
        ),
    ));

    env.define_symbol(global_symbol(
        "DateTime",
        Ty::table(vec![
            TableProp::new("now", func(vec![], Ty::reference("DateTime"))),
            TableProp::new(
                "fromUnixTimestamp",
                func(vec![Ty::Number], Ty::reference("DateTime")),
            ),
        ]),
    ));

    // The Luau-native vector library.
    env.define_symbol(global_symbol(
        "vector",
        Ty::table(vec![
            TableProp::new(
                "create",
                func(vec![Ty::Number, Ty::Number, Ty::Number], Ty::Vector),
            ),
            TableProp::new("zero", Ty::Vector),
            TableProp::new("one", Ty::Vector),
            TableProp::new("magnitude", func(vec![Ty::Vector], Ty::Number)),
            TableProp::new("normalize", func(vec![Ty::Vector], Ty::Vector)),
            TableProp::new("dot", func(vec![Ty::Vector, Ty::Vector], Ty::Number)),
            TableProp::new("cross", func(vec![Ty::Vector, Ty::Vector], Ty::Vector)),
        ]),
    ));
}

// ── Executor extensions ────────────────────────────────────────────────

fn register_executor_globals(env: &mut TypeEnvironment) {
    env.define_symbol(global_symbol(
        "crypt",
        Ty::table(vec![
            TableProp::new("encrypt", vararg_func(vec![Ty::String], Ty::String)),
            TableProp::new("decrypt", vararg_func(vec![Ty::String], Ty::String)),
            TableProp::new("hash", vararg_func(vec![Ty::String], Ty::String)),
            TableProp::new("base64encode", func(vec![Ty::String], Ty::String)),
            TableProp::new("base64decode", func(vec![Ty::String], Ty::String)),
            TableProp::new("generatekey", vararg_func(vec![], Ty::String)),
        ]),
    ));
    env.define_symbol(global_symbol("syn", open_table()));
    env.define_symbol(global_symbol("getgenv", func(vec![], open_table())));
    env.define_symbol(global_symbol(
        "hookfunction",
        func(vec![Ty::Any, Ty::Any], Ty::Any),
    ));

    // Filesystem helpers.
    env.define_symbol(global_symbol("readfile", func(vec![Ty::String], Ty::String)));
    env.define_symbol(global_symbol(
        "writefile",
        func(vec![Ty::String, Ty::String], Ty::Nil),
    ));
    env.define_symbol(global_symbol("isfile", func(vec![Ty::String], Ty::Boolean)));
    env.define_symbol(global_symbol(
        "isfolder",
        func(vec![Ty::String], Ty::Boolean),
    ));
    env.define_symbol(global_symbol(
        "listfiles",
        func(vec![Ty::String], Ty::array(Ty::String)),
    ));
    env.define_symbol(global_symbol("makefolder", func(vec![Ty::String], Ty::Nil)));
    env.define_symbol(global_symbol("delfile", func(vec![Ty::String], Ty::Nil)));
    env.define_symbol(global_symbol("delfolder", func(vec![Ty::String], Ty::Nil)));

    // Clipboard and console.
    env.define_symbol(global_symbol(
        "setclipboard",
        func(vec![Ty::String], Ty::Nil),
    ));
    env.define_symbol(global_symbol(
        "rconsoleprint",
        func(vec![Ty::String], Ty::Nil),
    ));
    env.define_symbol(global_symbol("rconsoleclear", func(vec![], Ty::Nil)));
    env.define_symbol(global_symbol(
        "rconsolecreate",
        func(vec![], Ty::Nil),
    ));

    // Mouse and keyboard.
    env.define_symbol(global_symbol("mouse1click", func(vec![], Ty::Nil)));
    env.define_symbol(global_symbol("mouse1press", func(vec![], Ty::Nil)));
    env.define_symbol(global_symbol("mouse1release", func(vec![], Ty::Nil)));
    env.define_symbol(global_symbol(
        "mousemoverel",
        func(vec![Ty::Number, Ty::Number], Ty::Nil),
    ));
    env.define_symbol(global_symbol("keypress", func(vec![Ty::Number], Ty::Nil)));
    env.define_symbol(global_symbol("keyrelease", func(vec![Ty::Number], Ty::Nil)));

    // HTTP.
    env.define_symbol(global_symbol(
        "request",
        func(vec![open_table()], open_table()),
    ));
    env.define_symbol(global_symbol(
        "identifyexecutor",
        func(vec![], Ty::String),
    ));
}

// ── Instance globals ───────────────────────────────────────────────────

/// `game`, `workspace`, `script`, the `Instance` namespace, and the
/// `Enum` namespace -- defined only when the universe carries the
/// corresponding classes so a classless check stays lean.
fn register_instance_globals(env: &mut TypeEnvironment) {
    for (global, class_names) in [
        ("game", &["DataModel", "Instance"][..]),
        ("workspace", &["Workspace", "Instance"][..]),
        ("script", &["Script", "LuaSourceContainer", "Instance"][..]),
    ] {
        for class_name in class_names {
            if let Some(class) = env.lookup_class(class_name) {
                env.define_symbol(global_symbol(global, Ty::Class(class)));
                break;
            }
        }
    }

    if env.has_classes() {
        env.define_symbol(global_symbol(
            "Instance",
            Ty::table(vec![TableProp::new(
                "new",
                vararg_func(vec![Ty::String], Ty::reference("Instance")),
            )]),
        ));
    }

    // The Enum namespace resolves member accesses against the enum
    // registry; its own type is a marker reference.
    env.define_symbol(global_symbol("Enum", Ty::reference("Enum")));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::ClassTy;

    #[test]
    fn standard_globals_are_seeded() {
        let mut env = TypeEnvironment::new();
        seed_environment(&mut env, &TypeUniverse::new(), BuiltinBundles::default());
        for name in ["print", "pcall", "setmetatable", "_G", "shared", "typeof"] {
            assert!(env.lookup_symbol(name).is_some(), "missing global {name}");
        }
    }

    #[test]
    fn bundles_can_be_disabled() {
        let mut env = TypeEnvironment::new();
        let bundles = BuiltinBundles {
            roblox_datatypes: false,
            executor_globals: false,
        };
        seed_environment(&mut env, &TypeUniverse::new(), bundles);
        assert!(env.lookup_symbol("print").is_some());
        assert!(env.lookup_symbol("Vector3").is_none());
        assert!(env.lookup_symbol("crypt").is_none());
    }

    #[test]
    fn datatype_namespaces_have_constructors() {
        let mut env = TypeEnvironment::new();
        seed_environment(&mut env, &TypeUniverse::new(), BuiltinBundles::default());
        let vector3 = env.lookup_symbol("Vector3").expect("Vector3");
        let Ty::Table(table) = &vector3.ty else {
            panic!("expected namespace table");
        };
        assert!(table.prop("new").is_some());
        assert!(table.prop("zero").is_some());
    }

    #[test]
    fn instance_globals_require_classes() {
        let mut env = TypeEnvironment::new();
        seed_environment(&mut env, &TypeUniverse::new(), BuiltinBundles::default());
        assert!(env.lookup_symbol("game").is_none());
        assert!(env.lookup_symbol("Instance").is_none());

        let mut universe = TypeUniverse::new();
        universe.add_class(ClassTy::new("DataModel"));
        universe.add_class(ClassTy::new("Instance"));
        let mut env = TypeEnvironment::new();
        seed_environment(&mut env, &universe, BuiltinBundles::default());
        assert!(env.lookup_symbol("game").is_some());
        assert!(env.lookup_symbol("Instance").is_some());
    }

    #[test]
    fn universe_globals_are_poured_in() {
        let mut universe = TypeUniverse::new();
        universe.add_global("math", Ty::table(vec![TableProp::new(
            "floor",
            func(vec![Ty::Number], Ty::Number),
        )]));
        let mut env = TypeEnvironment::new();
        seed_environment(&mut env, &universe, BuiltinBundles::default());
        assert!(env.lookup_symbol("math").is_some());
    }
}

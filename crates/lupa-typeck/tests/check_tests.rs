//! Checker integration tests: the diagnostic taxonomy, narrowing,
//! special forms, ignore directives, and the documented end-to-end
//! scenarios.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use lupa_common::diagnostic::{DiagnosticCode, DiagnosticTag, Severity};
use lupa_typeck::ty::{ClassMember, ClassTy, EnumTy, Ty};
use lupa_typeck::universe::TypeUniverse;
use lupa_typeck::{analyze, CheckMode, CheckOptions, CheckResult};

// ── Helpers ────────────────────────────────────────────────────────────

/// A small Roblox-flavored universe: an Instance hierarchy with Part,
/// a couple of services, an enum, and a deprecated member.
fn roblox_universe() -> TypeUniverse {
    let mut universe = TypeUniverse::new();

    let mut instance = ClassTy::new("Instance");
    instance
        .properties
        .insert("Name".into(), ClassMember::new(Ty::String));
    instance
        .properties
        .insert("Parent".into(), ClassMember::new(Ty::optional(Ty::reference("Instance"))));
    instance.methods.insert(
        "GetChildren".into(),
        ClassMember::new(Ty::function(vec![], Ty::array(Ty::reference("Instance")))),
    );
    instance.methods.insert(
        "Destroy".into(),
        ClassMember::new(Ty::function(vec![], Ty::Nil)),
    );
    universe.add_class(instance);

    let mut base_part = ClassTy::new("BasePart");
    base_part.superclass = Some("Instance".into());
    base_part
        .properties
        .insert("Position".into(), ClassMember::new(Ty::reference("Vector3")));
    base_part
        .properties
        .insert("Anchored".into(), ClassMember::new(Ty::Boolean));
    base_part.properties.insert(
        "Velocity".into(),
        ClassMember {
            ty: Ty::reference("Vector3"),
            deprecated: Some("use AssemblyLinearVelocity".into()),
        },
    );
    universe.add_class(base_part);

    let mut part = ClassTy::new("Part");
    part.superclass = Some("BasePart".into());
    universe.add_class(part);

    let mut workspace = ClassTy::new("Workspace");
    workspace.superclass = Some("Instance".into());
    universe.add_class(workspace);

    let mut data_model = ClassTy::new("DataModel");
    data_model.superclass = Some("Instance".into());
    universe.add_class(data_model);

    universe.add_enum(EnumTy::new(
        "Material",
        vec!["Plastic".into(), "Wood".into()],
    ));

    universe.add_common_child("Workspace", "Baseplate", "Part");

    universe
}

fn check_with(src: &str, mode: CheckMode, universe: TypeUniverse) -> CheckResult {
    let options = CheckOptions {
        mode,
        universe,
        ..Default::default()
    };
    let (parse, result) = analyze(src, options);
    assert!(
        parse.errors.is_empty(),
        "unexpected parse errors in {src:?}: {:?}",
        parse.errors
    );
    result
}

fn check_src(src: &str, mode: CheckMode) -> CheckResult {
    check_with(src, mode, TypeUniverse::new())
}

fn check_roblox(src: &str) -> CheckResult {
    check_with(src, CheckMode::Nonstrict, roblox_universe())
}

fn codes(result: &CheckResult) -> Vec<&'static str> {
    result.diagnostics.iter().map(|d| d.code.as_str()).collect()
}

fn assert_clean(result: &CheckResult) {
    assert!(
        result.diagnostics.is_empty(),
        "expected no diagnostics, got: {:?}",
        result.diagnostics
    );
}

// ── Scenario 1: annotated local mismatch ───────────────────────────────

#[test]
fn annotated_local_mismatch_is_e002_at_the_name() {
    let result = check_src("local x: number = \"hi\"", CheckMode::Strict);
    assert_eq!(codes(&result), vec!["E002"]);
    let diagnostic = &result.diagnostics[0];
    // The range points at `x`.
    assert_eq!(diagnostic.span.start.offset, 6);
    assert_eq!(diagnostic.span.end.offset, 7);
    assert_eq!(diagnostic.severity, Severity::Error);
}

#[test]
fn matching_annotation_is_clean() {
    assert_clean(&check_src("local x: number = 42", CheckMode::Strict));
    assert_clean(&check_src(
        "local x: number | string = \"hi\"",
        CheckMode::Strict,
    ));
    assert_clean(&check_src("local x: number? = nil", CheckMode::Strict));
}

// ── Scenario 2: break/continue placement ───────────────────────────────

#[test]
fn break_at_top_level_is_e001() {
    let result = check_src("break", CheckMode::Nonstrict);
    assert_eq!(codes(&result), vec!["E001"]);

    assert_clean(&check_src("while true do break end", CheckMode::Nonstrict));
    assert_clean(&check_src(
        "for i = 1, 10 do continue end",
        CheckMode::Nonstrict,
    ));
}

#[test]
fn break_inside_function_nested_in_loop_is_invalid() {
    let src = "while true do\n\tlocal function f() break end\nend";
    let result = check_src(src, CheckMode::Nonstrict);
    assert_eq!(codes(&result), vec!["E001"]);
}

// ── Scenario 3: Instance.new and case-sensitivity ──────────────────────

#[test]
fn instance_new_resolves_class_members() {
    let src = "local part = Instance.new(\"Part\")\nprint(part.Position)";
    assert_clean(&check_roblox(src));
}

#[test]
fn lowercase_member_is_w002_not_e009() {
    let src = "local part = Instance.new(\"Part\")\nprint(part.position)";
    let result = check_roblox(src);
    assert_eq!(codes(&result), vec!["W002"]);
    assert!(result.diagnostics[0].message.contains("should be `Position`"));
    assert_eq!(result.diagnostics[0].severity, Severity::Warning);
}

#[test]
fn unknown_instance_class_falls_back_to_instance() {
    let src = "local thing = Instance.new(\"Blob\")\nprint(thing.Name)";
    assert_clean(&check_roblox(src));
}

// ── Scenario 4: table inference ────────────────────────────────────────

#[test]
fn array_literal_infers_number_array() {
    let result = check_src("local t = {1, 2, 3}", CheckMode::Strict);
    assert_clean(&result);
    let t = result
        .all_symbols
        .iter()
        .find(|s| s.name == "t")
        .expect("symbol t");
    assert_eq!(t.type_repr, "{number}");
}

#[test]
fn reassignment_retracks_unannotated_local() {
    // While t is {number}, it satisfies a {number} annotation.
    assert_clean(&check_src(
        "local t = {1, 2, 3}\nlocal u: {number} = t",
        CheckMode::Strict,
    ));

    // After t = {1, "x"} the tracked type is {number | string}.
    let result = check_src(
        "local t = {1, 2, 3}\nt = {1, \"x\"}\nlocal u: {number} = t",
        CheckMode::Strict,
    );
    assert_eq!(codes(&result), vec!["E002"]);
}

// ── Scenario 5: ignore directives ──────────────────────────────────────

#[test]
fn ignore_directive_suppresses_next_line() {
    let src = "--@rbxls-ignore\nlocal x: number = \"hi\"";
    assert_clean(&check_src(src, CheckMode::Strict));

    // Without the pragma the same line reports.
    let result = check_src("local x: number = \"hi\"", CheckMode::Strict);
    assert_eq!(codes(&result), vec!["E002"]);
}

#[test]
fn disable_enable_suppresses_the_range_inclusive() {
    let src = "\
--@rbxls-disable
local a: number = \"one\"
local b: number = \"two\"
--@rbxls-enable
local c: number = \"three\"
";
    let result = check_src(src, CheckMode::Strict);
    assert_eq!(codes(&result), vec!["E002"]);
    assert_eq!(result.diagnostics[0].span.start.line, 5);
}

#[test]
fn unmatched_disable_runs_to_end_of_file() {
    let src = "--@rbxls-disable\nlocal a: number = \"one\"\nlocal b: number = \"two\"";
    assert_clean(&check_src(src, CheckMode::Strict));
}

// ── Scenario 6: recursive aliases ──────────────────────────────────────

#[test]
fn recursive_alias_checks_without_overflow() {
    let src = "\
type List<T> = { value: T, next: List<T>? }
local a: List<number> = { value = 1 }
local b: List<number> = a
";
    assert_clean(&check_src(src, CheckMode::Strict));
}

#[test]
fn recursive_alias_distinguishes_arguments() {
    let src = "\
type List<T> = { value: T, next: List<T>? }
local a: List<number> = { value = 1 }
local b: List<string> = a
";
    let result = check_src(src, CheckMode::Strict);
    assert_eq!(codes(&result), vec!["E002"]);
}

// ── Remaining diagnostic taxonomy ──────────────────────────────────────

#[test]
fn compound_assign_mismatch_is_e003() {
    let result = check_src("local s = \"a\"\ns += 1", CheckMode::Strict);
    assert_eq!(codes(&result), vec!["E003"]);

    assert_clean(&check_src("local n = 1\nn += 2", CheckMode::Strict));
    assert_clean(&check_src("local s = \"a\"\ns ..= \"b\"", CheckMode::Strict));
}

#[test]
fn non_numeric_for_bound_is_e004() {
    let result = check_src("for i = 1, \"x\" do end", CheckMode::Strict);
    assert_eq!(codes(&result), vec!["E004"]);
}

#[test]
fn return_mismatch_is_e005() {
    let result = check_src(
        "local function f(): number return \"s\" end",
        CheckMode::Strict,
    );
    assert_eq!(codes(&result), vec!["E005"]);

    assert_clean(&check_src(
        "local function f(): number return 1 end",
        CheckMode::Strict,
    ));
}

#[test]
fn unknown_identifier_is_e006_in_strict_only() {
    let result = check_src("print(zzz)", CheckMode::Strict);
    assert_eq!(codes(&result), vec!["E006"]);

    assert_clean(&check_src("print(zzz)", CheckMode::Nonstrict));
}

#[test]
fn calling_a_number_is_e007() {
    let result = check_src("local x = 5\nx()", CheckMode::Nonstrict);
    assert_eq!(codes(&result), vec!["E007"]);
}

#[test]
fn method_miss_is_e008_and_property_miss_is_e009() {
    let result = check_roblox("local p = Instance.new(\"Part\")\np:Vanish()");
    assert_eq!(codes(&result), vec!["E008"]);

    let result = check_roblox("local p = Instance.new(\"Part\")\nprint(p.Missing)");
    assert_eq!(codes(&result), vec!["E009"]);
}

#[test]
fn unknown_type_name_is_e010() {
    let result = check_src("local x: Mystery = nil", CheckMode::Strict);
    assert_eq!(codes(&result), vec!["E010"]);
}

#[test]
fn arithmetic_on_boolean_is_e011() {
    let result = check_src("local x = true + 1", CheckMode::Strict);
    assert_eq!(codes(&result), vec!["E011"]);
}

#[test]
fn deprecated_member_is_w001_with_tag() {
    let result = check_roblox("local p = Instance.new(\"Part\")\nprint(p.Velocity)");
    assert_eq!(codes(&result), vec!["W001"]);
    assert_eq!(result.diagnostics[0].tags, vec![DiagnosticTag::Deprecated]);
    assert!(result.diagnostics[0]
        .message
        .contains("use AssemblyLinearVelocity"));
}

// ── Error suppression ──────────────────────────────────────────────────

#[test]
fn cascading_errors_are_suppressed() {
    // zzz is unknown (one E006); everything downstream of the error
    // value stays silent.
    let src = "local a = zzz\nlocal b = a.field\nlocal c = b + 1\nb:method()";
    let result = check_src(src, CheckMode::Strict);
    assert_eq!(codes(&result), vec!["E006"]);
}

// ── Narrowing ──────────────────────────────────────────────────────────

#[test]
fn isa_narrows_in_then_branch() {
    let src = "\
local x: Instance = Instance.new(\"Part\")
if x:IsA(\"Part\") then
    print(x.Position)
end
";
    assert_clean(&check_roblox(src));
}

#[test]
fn without_narrowing_the_member_misses() {
    let src = "local x: Instance = Instance.new(\"Part\")\nprint(x.Position)";
    let result = check_roblox(src);
    assert_eq!(codes(&result), vec!["E009"]);
}

#[test]
fn narrowing_clears_after_the_branch() {
    let src = "\
local x: Instance = Instance.new(\"Part\")
if x:IsA(\"Part\") then
    print(x.Position)
end
print(x.Position)
";
    let result = check_roblox(src);
    assert_eq!(codes(&result), vec!["E009"]);
    assert_eq!(result.diagnostics[0].span.start.line, 5);
}

#[test]
fn narrowing_applies_through_and_conditions() {
    let src = "\
local x: Instance = Instance.new(\"Part\")
local ready = true
if ready and x:IsA(\"Part\") then
    print(x.Position)
end
";
    assert_clean(&check_roblox(src));
}

// ── Special forms ──────────────────────────────────────────────────────

#[test]
fn get_service_returns_the_named_class() {
    let src = "\
local ws = game:GetService(\"Workspace\")
local again: Workspace = ws
";
    assert_clean(&check_roblox(src));
}

#[test]
fn clone_preserves_the_class() {
    let src = "\
local p = Instance.new(\"Part\")
local q: Part = p:Clone()
print(q.Position)
";
    assert_clean(&check_roblox(src));
}

#[test]
fn find_first_child_of_class_is_optional_class() {
    let src = "\
local p = Instance.new(\"Part\")
local child: Part? = p:FindFirstChildOfClass(\"Part\")
";
    assert_clean(&check_roblox(src));
}

#[test]
fn signal_wait_returns_the_callback_payload() {
    let src = "\
local signal: { Connect: ((Part) -> nil) -> nil } = nil :: any
local hit = signal:Wait()
local p: Part = hit
";
    assert_clean(&check_roblox(src));
}

#[test]
fn common_children_resolve_on_classes() {
    let src = "print(workspace.Baseplate.Position)";
    assert_clean(&check_roblox(src));
}

#[test]
fn enum_items_resolve() {
    assert_clean(&check_roblox("local m = Enum.Material.Plastic"));

    let result = check_roblox("local m = Enum.Material.Steel");
    assert_eq!(codes(&result), vec!["E009"]);

    let result = check_roblox("local m = Enum.Fabric.Cloth");
    assert_eq!(codes(&result), vec!["E009"]);
}

#[test]
fn number_coerces_to_enum_in_nonstrict() {
    let src = "local m: Material = 1";
    assert_clean(&check_with(src, CheckMode::Nonstrict, roblox_universe()));

    let result = check_with(src, CheckMode::Strict, roblox_universe());
    assert_eq!(codes(&result), vec!["E002"]);
}

// ── Modes ──────────────────────────────────────────────────────────────

#[test]
fn nocheck_mode_reports_nothing() {
    let src = "local x: number = \"hi\"\nbreak\ntrue + 1";
    let options = CheckOptions::with_mode(CheckMode::Nocheck);
    let (_, result) = analyze(src, options);
    // Only parse-level errors could surface; the type errors must not.
    assert!(result
        .diagnostics
        .iter()
        .all(|d| d.code == DiagnosticCode::E000));
}

#[test]
fn nonstrict_allows_number_to_string() {
    assert_clean(&check_src("local s: string = 42", CheckMode::Nonstrict));
    let result = check_src("local s: string = 42", CheckMode::Strict);
    assert_eq!(codes(&result), vec!["E002"]);
}

// ── Functions and returns ──────────────────────────────────────────────

#[test]
fn well_typed_program_is_clean_in_strict_mode() {
    let src = "\
local total = 0
for i = 1, 10 do
    total += i
end

local function describe(count: number): string
    if count > 5 then
        return \"big\"
    end
    return \"small\"
end

print(describe(total))
";
    assert_clean(&check_src(src, CheckMode::Strict));
}

#[test]
fn doc_param_types_apply_when_annotations_are_absent() {
    let src = "\
--- Doubles a value.
--- @param n number the input
--- @return number twice the input
local function double(n)
    return n + n
end
local d: number = double(2)
";
    assert_clean(&check_src(src, CheckMode::Strict));
}

#[test]
fn doc_type_tag_annotates_a_local() {
    let src = "--- @type number\nlocal x = nil\nx = \"s\"";
    let result = check_src(src, CheckMode::Strict);
    assert_eq!(codes(&result), vec!["E002"]);
}

#[test]
fn recursion_through_local_function_checks() {
    let src = "\
local function count(n: number): number
    if n > 0 then
        return count(n - 1)
    end
    return 0
end
";
    assert_clean(&check_src(src, CheckMode::Strict));
}

// ── Parse-error integration ────────────────────────────────────────────

#[test]
fn parse_errors_surface_as_e000_before_type_errors() {
    let src = "local x = \nlocal y: number = \"hi\"";
    let options = CheckOptions::with_mode(CheckMode::Strict);
    let (parse, result) = analyze(src, options);
    assert!(!parse.errors.is_empty());
    let codes = codes(&result);
    assert!(codes.contains(&"E000"), "codes: {codes:?}");
    assert!(codes.contains(&"E002"), "codes: {codes:?}");
    assert_eq!(codes.first(), Some(&"E000"));
}

// ── Infrastructure ─────────────────────────────────────────────────────

#[test]
fn cancellation_stops_the_walk() {
    let flag = Arc::new(AtomicBool::new(true));
    flag.store(true, Ordering::Relaxed);
    let options = CheckOptions {
        mode: CheckMode::Strict,
        cancel: Some(flag),
        ..Default::default()
    };
    let (_, result) = analyze("local x: number = \"hi\"", options);
    // Cancelled before the first statement: no type diagnostics.
    assert!(result.diagnostics.is_empty());
}

#[test]
fn results_serialize_to_json() {
    let result = check_src("local x: number = \"hi\"\nlocal ok = 1", CheckMode::Strict);
    let diagnostics = result.diagnostics_json().expect("diagnostics json");
    let parsed: serde_json::Value = serde_json::from_str(&diagnostics).expect("valid json");
    assert!(parsed.as_array().is_some());

    let symbols = result.symbols_json().expect("symbols json");
    let parsed: serde_json::Value = serde_json::from_str(&symbols).expect("valid json");
    assert!(parsed
        .as_array()
        .is_some_and(|symbols| symbols.iter().any(|s| s["name"] == "ok")));
}

#[test]
fn rendering_includes_codes() {
    let src = "local x: number = \"hi\"";
    let result = check_src(src, CheckMode::Strict);
    let rendered = result.render(
        src,
        &lupa_typeck::diagnostics::DiagnosticOptions::colorless(),
    );
    assert_eq!(rendered.len(), 1);
    assert!(rendered[0].contains("E002"));
}

#[test]
fn environment_is_returned_for_introspection() {
    let result = check_src("local x = 1\nlocal y = \"s\"", CheckMode::Strict);
    // Scope tree survives the check; global scope holds the builtins.
    assert!(result.env.global_symbol_count() > 10);
    assert!(result.env.scope_count() >= 2);
    let names: Vec<&str> = result
        .all_symbols
        .iter()
        .map(|s| s.name.as_str())
        .collect();
    assert!(names.contains(&"x"));
    assert!(names.contains(&"y"));
}

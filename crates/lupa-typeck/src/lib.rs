//! Lupa type checker: bidirectional checking for Luau.
//!
//! Builds on the parser's AST to assign types to expressions, validate
//! statements, and report diagnostics with stable codes. Supports:
//!
//! - nominal + structural subtyping with union/intersection algebra
//! - scope trees with symbol, alias, class, and enum tables
//! - flow-sensitive narrowing (`x:IsA("ClassName")`)
//! - pragma-based suppression (`@rbxls-ignore` and friends)
//! - a pluggable type universe for the Roblox API surface
//!
//! # Architecture
//!
//! - [`ty`]: core type representation
//! - [`subtype`]: subtyping, assignability, union/intersection algebra
//! - [`env`]: scope tree, symbol table, class/enum registries
//! - [`builtins`]: built-in global seeding
//! - [`universe`]: caller-supplied definition tables
//! - [`directives`]: ignore-pragma parsing
//! - [`check`]: the checker walk
//! - [`diagnostics`]: ariadne rendering

pub mod builtins;
mod check;
pub mod diagnostics;
pub mod directives;
pub mod env;
pub mod error;
pub mod subtype;
pub mod ty;
pub mod universe;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use lupa_common::diagnostic::{Diagnostic, Severity};
use lupa_parser::ast::Chunk;
use lupa_parser::ParseResult;

use crate::directives::{parse_ignore_directives, IgnoredLines};
use crate::env::{SymbolRecord, TypeEnvironment};
use crate::universe::{BuiltinBundles, TypeUniverse};

pub use crate::subtype::CheckMode;

/// Options for one check.
pub struct CheckOptions {
    pub mode: CheckMode,
    /// Externally supplied class/enum/stdlib tables.
    pub universe: TypeUniverse,
    /// Which built-in bundles to seed.
    pub bundles: BuiltinBundles,
    /// Pre-computed ignored lines; when `None` the checker scans the
    /// chunk's comments itself.
    pub ignored: Option<IgnoredLines>,
    /// Cooperative cancellation flag, polled at statement boundaries.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for CheckOptions {
    fn default() -> Self {
        CheckOptions {
            mode: CheckMode::Nonstrict,
            universe: TypeUniverse::default(),
            bundles: BuiltinBundles::default(),
            ignored: None,
            cancel: None,
        }
    }
}

impl CheckOptions {
    /// Options with the given mode and everything else defaulted.
    pub fn with_mode(mode: CheckMode) -> Self {
        CheckOptions {
            mode,
            ..Default::default()
        }
    }
}

/// The result of checking one chunk.
pub struct CheckResult {
    /// Diagnostics in visit order (source order, depth-first).
    pub diagnostics: Vec<Diagnostic>,
    /// The environment, returned for downstream introspection.
    pub env: TypeEnvironment,
    /// Every symbol defined during the check, in definition order.
    pub all_symbols: Vec<SymbolRecord>,
}

impl CheckResult {
    /// Whether any diagnostic has error severity.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Diagnostics serialized as JSON for editor collaborators.
    pub fn diagnostics_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.diagnostics)
    }

    /// Symbol records serialized as JSON for editor collaborators.
    pub fn symbols_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.all_symbols)
    }

    /// Render every diagnostic through ariadne.
    pub fn render(&self, source: &str, options: &diagnostics::DiagnosticOptions) -> Vec<String> {
        self.diagnostics
            .iter()
            .map(|d| diagnostics::render_diagnostic(d, source, options))
            .collect()
    }
}

/// Type-check a parsed chunk.
///
/// This is the main entry point for the checker. Each call allocates a
/// fresh environment, seeds it from the universe, walks the AST, and
/// returns diagnostics plus the populated environment and symbol list.
pub fn check(chunk: &Chunk, options: CheckOptions) -> CheckResult {
    check::Checker::new(options).check_chunk(chunk)
}

/// Parse and check a source string in one step.
///
/// Parse errors surface as `E000` diagnostics ahead of the checker's
/// own, and the ignore pragmas suppress both kinds.
pub fn analyze(source: &str, mut options: CheckOptions) -> (ParseResult, CheckResult) {
    let parse = lupa_parser::parse(source);

    let ignored = options.ignored.take().unwrap_or_else(|| {
        parse_ignore_directives(&parse.chunk.comments, parse.chunk.span.end.line)
    });

    let parse_diags: Vec<Diagnostic> = parse
        .errors
        .iter()
        .filter(|e| !ignored.contains(e.span.start.line))
        .map(|e| {
            error::TypeError::Generic {
                message: e.message.clone(),
            }
            .into_diagnostic(e.span)
        })
        .collect();

    options.ignored = Some(ignored);
    let mut result = check(&parse.chunk, options);

    let mut diagnostics = parse_diags;
    diagnostics.append(&mut result.diagnostics);
    result.diagnostics = diagnostics;

    (parse, result)
}

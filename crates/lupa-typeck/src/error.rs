//! Type-checker error kinds.
//!
//! Each variant maps to one stable diagnostic code; the `Display` impl
//! is the single source of truth for wording, so tests and editor
//! collaborators see identical messages.

use std::fmt;

use lupa_common::diagnostic::{Diagnostic, DiagnosticCode, DiagnosticTag};
use lupa_common::span::Span;

use crate::ty::Ty;

/// A semantic error or warning found while checking.
#[derive(Debug, Clone)]
pub enum TypeError {
    /// Generic type error (placeholder).
    Generic { message: String },
    /// `break`/`continue` outside a loop.
    OutsideLoop { keyword: &'static str },
    /// Assignment/initializer type mismatch.
    AssignMismatch { expected: Ty, found: Ty },
    /// Compound-assignment operand type mismatch.
    CompoundAssignMismatch { op: &'static str, found: Ty },
    /// For-loop bound is not numeric.
    ForBoundNotNumeric { found: Ty },
    /// Return type mismatch.
    ReturnMismatch { expected: Ty, found: Ty },
    /// Unknown identifier (strict mode only).
    UnknownIdentifier { name: String },
    /// Callee is not callable.
    NotCallable { ty: Ty },
    /// Method not found on type.
    MethodNotFound { ty: Ty, name: String },
    /// Property not found on type.
    PropertyNotFound { ty: Ty, name: String },
    /// Unknown named type.
    UnknownTypeName { name: String },
    /// Arithmetic operand type mismatch.
    ArithmeticMismatch { op: &'static str, found: Ty },
    /// Deprecated member used.
    DeprecatedMember { name: String, message: String },
    /// Likely case-sensitivity mistake.
    CaseSensitivity { found: String, expected: String },
}

impl TypeError {
    /// The stable diagnostic code for this error.
    pub fn code(&self) -> DiagnosticCode {
        match self {
            TypeError::Generic { .. } => DiagnosticCode::E000,
            TypeError::OutsideLoop { .. } => DiagnosticCode::E001,
            TypeError::AssignMismatch { .. } => DiagnosticCode::E002,
            TypeError::CompoundAssignMismatch { .. } => DiagnosticCode::E003,
            TypeError::ForBoundNotNumeric { .. } => DiagnosticCode::E004,
            TypeError::ReturnMismatch { .. } => DiagnosticCode::E005,
            TypeError::UnknownIdentifier { .. } => DiagnosticCode::E006,
            TypeError::NotCallable { .. } => DiagnosticCode::E007,
            TypeError::MethodNotFound { .. } => DiagnosticCode::E008,
            TypeError::PropertyNotFound { .. } => DiagnosticCode::E009,
            TypeError::UnknownTypeName { .. } => DiagnosticCode::E010,
            TypeError::ArithmeticMismatch { .. } => DiagnosticCode::E011,
            TypeError::DeprecatedMember { .. } => DiagnosticCode::W001,
            TypeError::CaseSensitivity { .. } => DiagnosticCode::W002,
        }
    }

    /// Convert into a diagnostic at the given span, attaching tags.
    pub fn into_diagnostic(self, span: Span) -> Diagnostic {
        let code = self.code();
        let message = self.to_string();
        let diagnostic = Diagnostic::new(code, message, span);
        match code {
            DiagnosticCode::W001 => diagnostic.with_tag(DiagnosticTag::Deprecated),
            _ => diagnostic,
        }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeError::Generic { message } => write!(f, "{message}"),
            TypeError::OutsideLoop { keyword } => {
                write!(f, "`{keyword}` outside of a loop")
            }
            TypeError::AssignMismatch { expected, found } => {
                write!(f, "type mismatch: expected `{expected}`, found `{found}`")
            }
            TypeError::CompoundAssignMismatch { op, found } => {
                write!(f, "cannot apply `{op}` to `{found}`")
            }
            TypeError::ForBoundNotNumeric { found } => {
                write!(f, "for-loop bound must be a number, found `{found}`")
            }
            TypeError::ReturnMismatch { expected, found } => {
                write!(
                    f,
                    "return type mismatch: expected `{expected}`, found `{found}`"
                )
            }
            TypeError::UnknownIdentifier { name } => {
                write!(f, "unknown identifier `{name}`")
            }
            TypeError::NotCallable { ty } => write!(f, "`{ty}` is not callable"),
            TypeError::MethodNotFound { ty, name } => {
                write!(f, "method `{name}` not found on `{ty}`")
            }
            TypeError::PropertyNotFound { ty, name } => {
                write!(f, "property `{name}` not found on `{ty}`")
            }
            TypeError::UnknownTypeName { name } => {
                write!(f, "unknown type `{name}`")
            }
            TypeError::ArithmeticMismatch { op, found } => {
                write!(f, "cannot apply `{op}` to `{found}`")
            }
            TypeError::DeprecatedMember { name, message } => {
                write!(f, "`{name}` is deprecated: {message}")
            }
            TypeError::CaseSensitivity { found, expected } => {
                write!(f, "`{found}` should be `{expected}`")
            }
        }
    }
}

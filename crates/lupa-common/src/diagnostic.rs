use std::fmt;

use serde::Serialize;

use crate::span::Span;

/// How prominently a diagnostic should be displayed.
///
/// `Error` blocks compilation from a tool's viewpoint; `Warning` is shown
/// with lower prominence; `Info` and `Hint` are suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

/// Advisory display tags attached to a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticTag {
    /// The flagged code uses a deprecated member (rendered struck-through).
    Deprecated,
    /// The flagged code has no effect (rendered faded).
    Unnecessary,
}

/// Stable diagnostic codes.
///
/// These values are part of the external interface: editors and
/// code-action collaborators match on them. Never renumber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticCode {
    /// Generic type error (placeholder).
    E000,
    /// `break`/`continue` outside a loop.
    E001,
    /// Assignment/initializer type mismatch.
    E002,
    /// Compound-assignment operand type mismatch.
    E003,
    /// For-loop bound is not numeric.
    E004,
    /// Return type mismatch.
    E005,
    /// Unknown identifier (strict mode only).
    E006,
    /// Callee is not callable.
    E007,
    /// Method not found on type.
    E008,
    /// Property not found on type.
    E009,
    /// Unknown named type.
    E010,
    /// Arithmetic operand type mismatch.
    E011,
    /// Deprecated member used.
    W001,
    /// Likely case-sensitivity mistake.
    W002,
}

impl DiagnosticCode {
    /// The stable string form of this code.
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticCode::E000 => "E000",
            DiagnosticCode::E001 => "E001",
            DiagnosticCode::E002 => "E002",
            DiagnosticCode::E003 => "E003",
            DiagnosticCode::E004 => "E004",
            DiagnosticCode::E005 => "E005",
            DiagnosticCode::E006 => "E006",
            DiagnosticCode::E007 => "E007",
            DiagnosticCode::E008 => "E008",
            DiagnosticCode::E009 => "E009",
            DiagnosticCode::E010 => "E010",
            DiagnosticCode::E011 => "E011",
            DiagnosticCode::W001 => "W001",
            DiagnosticCode::W002 => "W002",
        }
    }

    /// The default severity for this code.
    pub fn severity(self) -> Severity {
        match self {
            DiagnosticCode::W001 | DiagnosticCode::W002 => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single analyzer diagnostic with a stable code and source range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub message: String,
    pub span: Span,
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub tags: Vec<DiagnosticTag>,
}

impl Diagnostic {
    /// Create a diagnostic with the code's default severity and no tags.
    pub fn new(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            severity: code.severity(),
            code,
            tags: Vec::new(),
        }
    }

    /// Attach a display tag.
    pub fn with_tag(mut self, tag: DiagnosticTag) -> Self {
        self.tags.push(tag);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::{Position, Span};

    fn span() -> Span {
        Span::new(Position::new(0, 1, 1), Position::new(1, 1, 2))
    }

    #[test]
    fn code_string_forms_are_stable() {
        assert_eq!(DiagnosticCode::E001.as_str(), "E001");
        assert_eq!(DiagnosticCode::E011.as_str(), "E011");
        assert_eq!(DiagnosticCode::W002.as_str(), "W002");
    }

    #[test]
    fn default_severities() {
        assert_eq!(DiagnosticCode::E002.severity(), Severity::Error);
        assert_eq!(DiagnosticCode::W001.severity(), Severity::Warning);
    }

    #[test]
    fn diagnostic_display_includes_code() {
        let d = Diagnostic::new(DiagnosticCode::E006, "unknown identifier `x`", span());
        assert_eq!(d.to_string(), "E006: unknown identifier `x`");
    }

    #[test]
    fn with_tag_appends() {
        let d = Diagnostic::new(DiagnosticCode::W001, "deprecated", span())
            .with_tag(DiagnosticTag::Deprecated);
        assert_eq!(d.tags, vec![DiagnosticTag::Deprecated]);
    }
}

//! Ariadne-based rendering of analyzer diagnostics.
//!
//! Turns a [`Diagnostic`] plus its source text into a formatted, labeled
//! report. Colorless output is available for deterministic test
//! assertions and log files.

use std::ops::Range;

use ariadne::{Color, Config, Label, Report, ReportKind, Source};

use lupa_common::diagnostic::{Diagnostic, Severity};

/// Rendering options.
#[derive(Debug, Clone, Copy)]
pub struct DiagnosticOptions {
    pub color: bool,
}

impl DiagnosticOptions {
    /// Colorless output for deterministic rendering.
    pub fn colorless() -> Self {
        DiagnosticOptions { color: false }
    }
}

impl Default for DiagnosticOptions {
    fn default() -> Self {
        DiagnosticOptions { color: true }
    }
}

fn severity_kind(severity: Severity) -> ReportKind<'static> {
    match severity {
        Severity::Error => ReportKind::Error,
        Severity::Warning => ReportKind::Warning,
        Severity::Info | Severity::Hint => ReportKind::Advice,
    }
}

/// Render one diagnostic against its source.
pub fn render_diagnostic(
    diagnostic: &Diagnostic,
    source: &str,
    options: &DiagnosticOptions,
) -> String {
    let source_len = source.len();

    // Clamp to the source and keep at least one character so ariadne
    // has something to underline.
    let clamp = |r: Range<usize>| -> Range<usize> {
        let start = r.start.min(source_len);
        let end = r.end.min(source_len).max(start);
        if start == end {
            start..end.saturating_add(1).min(source_len)
        } else {
            start..end
        }
    };
    let span = clamp(diagnostic.span.byte_range());

    let label_color = match diagnostic.severity {
        Severity::Error => Color::Red,
        Severity::Warning => Color::Yellow,
        _ => Color::Blue,
    };

    let report = Report::build(severity_kind(diagnostic.severity), span.clone())
        .with_code(diagnostic.code.as_str())
        .with_message(&diagnostic.message)
        .with_config(Config::default().with_color(options.color))
        .with_label(
            Label::new(span)
                .with_message(&diagnostic.message)
                .with_color(label_color),
        )
        .finish();

    let mut buffer = Vec::new();
    // Rendering failure leaves an empty string rather than panicking.
    let _ = report.write(Source::from(source), &mut buffer);
    String::from_utf8(buffer).unwrap_or_default()
}

//! Ignore-directive parsing.
//!
//! Walks the chunk's comments in line order, recognizing the
//! `@rbxls-*` pragma family and producing the set of ignored lines the
//! checker consults when pushing diagnostics. An unmatched
//! `@rbxls-disable` extends to the last source line.

use rustc_hash::FxHashSet;

use lupa_parser::ast::Comment;

/// Lines on which diagnostics are suppressed.
#[derive(Debug, Clone, Default)]
pub struct IgnoredLines {
    lines: FxHashSet<u32>,
}

impl IgnoredLines {
    /// Whether diagnostics starting on this 1-based line are suppressed.
    pub fn contains(&self, line: u32) -> bool {
        self.lines.contains(&line)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }
}

/// Scan a comment stream for ignore directives.
///
/// `last_line` is the 1-based number of the final source line, used to
/// close an unmatched `@rbxls-disable`.
pub fn parse_ignore_directives(comments: &[Comment], last_line: u32) -> IgnoredLines {
    let mut lines = FxHashSet::default();
    let mut disable_start: Option<u32> = None;

    for comment in comments {
        let directive = comment.content().trim();
        // Only the first word counts; trailing prose is allowed.
        let word = directive.split_whitespace().next().unwrap_or("");
        let line = comment.line();
        match word {
            "@rbxls-ignore" | "@rbxls-disable-next-line" => {
                lines.insert(line + 1);
            }
            "@rbxls-ignore-line" => {
                lines.insert(line);
            }
            "@rbxls-disable" => {
                if disable_start.is_none() {
                    disable_start = Some(line);
                }
            }
            "@rbxls-enable" => {
                if let Some(start) = disable_start.take() {
                    for l in start..=line {
                        lines.insert(l);
                    }
                }
            }
            _ => {}
        }
    }

    if let Some(start) = disable_start {
        for l in start..=last_line.max(start) {
            lines.insert(l);
        }
    }

    IgnoredLines { lines }
}

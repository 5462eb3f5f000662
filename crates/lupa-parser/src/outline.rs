//! Document outline extraction.
//!
//! Collects the declarations of a chunk (locals, functions, type
//! aliases) into a flat, serializable list in source order. This is the
//! AST-only feed for document-symbol requests; it needs no type
//! information, so editors can render an outline before a check
//! finishes.

use serde::Serialize;

use lupa_common::span::Span;

use crate::ast::{
    Chunk, ExportStat, FunctionDeclStat, LocalFunctionStat, LocalStat, TypeAliasStat,
};
use crate::visit::{walk_chunk, Visitor};

/// What kind of declaration an outline entry names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutlineKind {
    Local,
    Function,
    Method,
    TypeAlias,
    ExportedTypeAlias,
}

/// One entry of a document outline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlineItem {
    pub name: String,
    pub kind: OutlineKind,
    pub span: Span,
    /// The declaration's doc-comment description, when present.
    pub doc: Option<String>,
}

/// Collect the outline of a chunk, in source order.
pub fn outline(chunk: &Chunk) -> Vec<OutlineItem> {
    let mut collector = Collector {
        items: Vec::new(),
        exported: Vec::new(),
    };
    walk_chunk(&mut collector, chunk);
    collector.items
}

struct Collector {
    items: Vec<OutlineItem>,
    /// Name spans of aliases wrapped in `export`, noted before the
    /// alias callback fires.
    exported: Vec<Span>,
}

fn doc_text(doc: &Option<crate::docs::DocComment>) -> Option<String> {
    doc.as_ref()
        .map(|d| d.description.clone())
        .filter(|d| !d.is_empty())
}

impl Visitor for Collector {
    fn visit_local_stat(&mut self, stat: &LocalStat) {
        for (i, binding) in stat.bindings.iter().enumerate() {
            self.items.push(OutlineItem {
                name: binding.name.text.clone(),
                kind: OutlineKind::Local,
                span: binding.name.span,
                doc: if i == 0 { doc_text(&stat.doc) } else { None },
            });
        }
    }

    fn visit_local_function_stat(&mut self, stat: &LocalFunctionStat) {
        self.items.push(OutlineItem {
            name: stat.name.text.clone(),
            kind: OutlineKind::Function,
            span: stat.name.span,
            doc: doc_text(&stat.doc),
        });
    }

    fn visit_function_decl_stat(&mut self, stat: &FunctionDeclStat) {
        let mut name = stat
            .name
            .path
            .iter()
            .map(|n| n.text.as_str())
            .collect::<Vec<_>>()
            .join(".");
        let kind = match &stat.name.method {
            Some(method) => {
                name.push(':');
                name.push_str(&method.text);
                OutlineKind::Method
            }
            None => OutlineKind::Function,
        };
        self.items.push(OutlineItem {
            name,
            kind,
            span: stat.name.span,
            doc: doc_text(&stat.doc),
        });
    }

    fn visit_export_stat(&mut self, stat: &ExportStat) {
        self.exported.push(stat.alias.name.span);
    }

    fn visit_type_alias_stat(&mut self, stat: &TypeAliasStat) {
        let kind = if self.exported.contains(&stat.name.span) {
            OutlineKind::ExportedTypeAlias
        } else {
            OutlineKind::TypeAlias
        };
        self.items.push(OutlineItem {
            name: stat.name.text.clone(),
            kind,
            span: stat.name.span,
            doc: doc_text(&stat.doc),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    fn names_and_kinds(src: &str) -> Vec<(String, OutlineKind)> {
        let result = parse(src);
        assert!(result.errors.is_empty(), "errors: {:?}", result.errors);
        outline(&result.chunk)
            .into_iter()
            .map(|item| (item.name, item.kind))
            .collect()
    }

    #[test]
    fn collects_declarations_in_source_order() {
        let src = "\
local config = {}

--- Builds a widget.
local function build(spec)
    local scratch = 1
    return spec
end

function config.reset() end
function config:apply(target) end

type WidgetSpec = { size: number }
export type Widget = { spec: WidgetSpec }
";
        assert_eq!(
            names_and_kinds(src),
            vec![
                ("config".to_string(), OutlineKind::Local),
                ("build".to_string(), OutlineKind::Function),
                ("scratch".to_string(), OutlineKind::Local),
                ("config.reset".to_string(), OutlineKind::Function),
                ("config:apply".to_string(), OutlineKind::Method),
                ("WidgetSpec".to_string(), OutlineKind::TypeAlias),
                ("Widget".to_string(), OutlineKind::ExportedTypeAlias),
            ]
        );
    }

    #[test]
    fn carries_doc_descriptions() {
        let src = "--- The main store.\nlocal store = {}";
        let result = parse(src);
        let items = outline(&result.chunk);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].doc.as_deref(), Some("The main store."));
    }

    #[test]
    fn multiple_bindings_each_get_an_entry() {
        let items = names_and_kinds("local a, b = 1, 2");
        assert_eq!(
            items,
            vec![
                ("a".to_string(), OutlineKind::Local),
                ("b".to_string(), OutlineKind::Local),
            ]
        );
    }

    #[test]
    fn outline_serializes() {
        let result = parse("local x = 1");
        let items = outline(&result.chunk);
        let json = serde_json::to_string(&items).expect("serializable");
        assert!(json.contains("\"x\""));
    }
}

//! Documentation-comment parser.
//!
//! Parses a block of consecutive `---`-prefixed lines into a structured
//! record. Non-tag lines are concatenated as the description; tag lines
//! (`@param`, `@return`, `@type`, `@class`, `@field`, `@deprecated`) are
//! split by whitespace. Type strings stay unparsed here; the checker
//! resolves them lazily through its own small grammar.

use serde::Serialize;

/// A parsed documentation comment.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DocComment {
    /// Free text from non-tag lines, joined with newlines.
    pub description: String,
    pub params: Vec<DocParam>,
    pub returns: Vec<DocReturn>,
    /// `@type <type>` override for the documented value.
    pub type_tag: Option<String>,
    /// `@class <name>` marker.
    pub class_tag: Option<String>,
    pub fields: Vec<DocField>,
    /// `@deprecated <message?>`; a missing message defaults to "Deprecated".
    pub deprecated: Option<String>,
}

impl DocComment {
    /// Whether the comment carries no information at all.
    pub fn is_empty(&self) -> bool {
        self.description.is_empty()
            && self.params.is_empty()
            && self.returns.is_empty()
            && self.type_tag.is_none()
            && self.class_tag.is_none()
            && self.fields.is_empty()
            && self.deprecated.is_none()
    }

    /// The documented parameter with the given name, if any.
    pub fn param(&self, name: &str) -> Option<&DocParam> {
        self.params.iter().find(|p| p.name == name)
    }
}

/// `@param <name> <type> <description?>`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocParam {
    pub name: String,
    pub ty: String,
    pub description: String,
}

/// `@return <type> <description?>`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocReturn {
    pub ty: String,
    pub description: String,
}

/// `@field <name> <type> <description?>`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocField {
    pub name: String,
    pub ty: String,
    pub description: String,
}

/// Parse the content lines of a doc-comment block.
///
/// Lines arrive with the `---` prefix already stripped. Unknown tags are
/// ignored rather than rejected, so forward-compatible comments do not
/// break older analyzers.
pub fn parse_doc_comment<'a>(lines: impl IntoIterator<Item = &'a str>) -> DocComment {
    let mut doc = DocComment::default();
    let mut description_lines: Vec<&str> = Vec::new();

    for raw in lines {
        let line = raw.trim();
        let Some(tag_line) = line.strip_prefix('@') else {
            if !line.is_empty() || !description_lines.is_empty() {
                description_lines.push(line);
            }
            continue;
        };

        let (tag, rest) = split_word(tag_line);
        match tag {
            "param" => {
                let (name, rest) = split_word(rest);
                let (ty, description) = split_word(rest);
                if !name.is_empty() {
                    doc.params.push(DocParam {
                        name: name.to_string(),
                        ty: ty.to_string(),
                        description: description.to_string(),
                    });
                }
            }
            "return" => {
                let (ty, description) = split_word(rest);
                doc.returns.push(DocReturn {
                    ty: ty.to_string(),
                    description: description.to_string(),
                });
            }
            "type" => {
                let (ty, _) = split_word(rest);
                if !ty.is_empty() {
                    doc.type_tag = Some(ty.to_string());
                }
            }
            "class" => {
                let (name, _) = split_word(rest);
                if !name.is_empty() {
                    doc.class_tag = Some(name.to_string());
                }
            }
            "field" => {
                let (name, rest) = split_word(rest);
                let (ty, description) = split_word(rest);
                if !name.is_empty() {
                    doc.fields.push(DocField {
                        name: name.to_string(),
                        ty: ty.to_string(),
                        description: description.to_string(),
                    });
                }
            }
            "deprecated" => {
                let message = rest.trim();
                doc.deprecated = Some(if message.is_empty() {
                    "Deprecated".to_string()
                } else {
                    message.to_string()
                });
            }
            _ => {}
        }
    }

    // Trim trailing blank lines from the description.
    while description_lines.last().is_some_and(|l| l.is_empty()) {
        description_lines.pop();
    }
    doc.description = description_lines.join("\n");
    doc
}

/// Split off the first whitespace-delimited word, returning it and the
/// trimmed remainder.
fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(idx) => (&s[..idx], s[idx..].trim_start()),
        None => (s, ""),
    }
}

//! A small pandoc-style text template engine.
//!
//! Templates only see the values put into their [`TemplateContext`].

mod context;
mod evaluator;
mod parser;

pub use context::{TemplateContext, TemplateValue};
pub use parser::{Node, VariableRef};

use std::path::{Path, PathBuf};

/// Errors from loading, parsing or rendering a template
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Template file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Cannot read template {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Undefined variable '{name}' on line {line}")]
    UndefinedVariable { name: String, line: usize },
}

pub type TemplateResult<T> = Result<T, TemplateError>;

/// How interpolated values are escaped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Escape {
    #[default]
    None,
    Html,
}

impl Escape {
    /// HTML escaping for `.html`/`.htm` files, none otherwise
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm") => {
                Escape::Html
            }
            _ => Escape::None,
        }
    }

    fn function(self) -> fn(&str) -> String {
        match self {
            Escape::None => verbatim,
            Escape::Html => escape_html,
        }
    }
}

fn verbatim(s: &str) -> String {
    s.to_string()
}

/// Escapes `&`, `<`, `>` and `"`, safe for text and double-quoted attributes
pub fn escape_html(s: &str) -> String {
    html_escape::encode_double_quoted_attribute(s).into_owned()
}

/// A parsed template
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    nodes: Vec<Node>,
    escape: Escape,
}

impl Template {
    /// Parse template source
    pub fn compile(source: &str, escape: Escape) -> TemplateResult<Self> {
        Ok(Self {
            nodes: parser::parse(source)?,
            escape,
        })
    }

    /// Load and parse a template file; escaping follows the file extension
    pub fn from_file(path: &Path) -> TemplateResult<Self> {
        let source = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                TemplateError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                TemplateError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        tracing::debug!("Loaded template {}", path.display());
        Self::compile(&source, Escape::for_path(path))
    }

    pub fn render(&self, context: &TemplateContext<'_>) -> TemplateResult<String> {
        let mut out = String::new();
        evaluator::evaluate(&self.nodes, context, self.escape.function(), &mut out)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(source: &str, context: serde_json::Value) -> TemplateResult<String> {
        Template::compile(source, Escape::None)?.render(&TemplateContext::from_json(context))
    }

    #[test]
    fn test_interpolation() {
        let out = render("Hello, $name$! $user.age$", json!({"name": "Ada", "user": {"age": 36}}));
        assert_eq!(out.unwrap(), "Hello, Ada! 36");
    }

    #[test]
    fn test_undefined_top_level_variable_fails() {
        let err = render("one\n$missing$", json!({})).unwrap_err();
        match err {
            TemplateError::UndefinedVariable { name, line } => {
                assert_eq!(name, "missing");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error {other:?}"),
        }

        let err = render("$for(nothing)$x$endfor$", json!({})).unwrap_err();
        assert!(matches!(err, TemplateError::UndefinedVariable { .. }));
    }

    #[test]
    fn test_missing_nested_field_is_empty() {
        let out = render("[$user.nickname$]", json!({"user": {"name": "x"}}));
        assert_eq!(out.unwrap(), "[]");
    }

    #[test]
    fn test_conditionals() {
        let template = "$if(a)$A$elseif(b.c)$B$else$C$endif$";
        assert_eq!(render(template, json!({"a": true})).unwrap(), "A");
        assert_eq!(render(template, json!({"a": "", "b": {"c": "y"}})).unwrap(), "B");
        assert_eq!(render(template, json!({})).unwrap(), "C");
        assert_eq!(render(template, json!({"a": []})).unwrap(), "C");
    }

    #[test]
    fn test_for_loop_binds_name_and_it() {
        let out = render(
            "$for(items)$$items.title$/$it.title$$sep$, $endfor$",
            json!({"items": [{"title": "a"}, {"title": "b"}, {"title": "c"}]}),
        );
        assert_eq!(out.unwrap(), "a/a, b/b, c/c");
    }

    #[test]
    fn test_for_loop_over_nested_path() {
        let out = render(
            "$for(group.items)$<$items$>$endfor$ $group.name$",
            json!({"group": {"name": "g", "items": ["x", "y"]}}),
        );
        assert_eq!(out.unwrap(), "<x><y> g");
    }

    #[test]
    fn test_loop_body_sees_outer_scope() {
        let out = render(
            "$for(years)$\n## $years.year$\n$for(years.items)$\n- $items$ ($count$)\n$endfor$\n$endfor$\n",
            json!({"count": 3, "years": [{"year": 2021, "items": ["a", "b"]}, {"year": 2020, "items": ["c"]}]}),
        );
        assert_eq!(out.unwrap(), "## 2021\n- a (3)\n- b (3)\n## 2020\n- c (3)\n");
    }

    #[test]
    fn test_html_escaping() {
        let template = Template::compile("<a href=\"$url$\">$title$</a>", Escape::Html).unwrap();
        let context = TemplateContext::from_json(json!({"url": "https://x.org/?a=1&b=\"2\"", "title": "<b>T</b>"}));
        assert_eq!(
            template.render(&context).unwrap(),
            "<a href=\"https://x.org/?a=1&amp;b=&quot;2&quot;\">&lt;b&gt;T&lt;/b&gt;</a>"
        );
    }

    #[test]
    fn test_escape_for_path() {
        assert_eq!(Escape::for_path(Path::new("out.HTML")), Escape::Html);
        assert_eq!(Escape::for_path(Path::new("list.htm")), Escape::Html);
        assert_eq!(Escape::for_path(Path::new("list.md")), Escape::None);
        assert_eq!(Escape::for_path(Path::new("list")), Escape::None);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.txt");
        std::fs::write(&path, "$for(items)$$items$;$endfor$").unwrap();

        let template = Template::from_file(&path).unwrap();
        let out = template
            .render(&TemplateContext::from_json(json!({"items": [1, 2]})))
            .unwrap();
        assert_eq!(out, "1;2;");

        let err = Template::from_file(&dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, TemplateError::NotFound { .. }));
    }
}

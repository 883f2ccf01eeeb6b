//! Output rendering: format selection, templates, JSON passthrough and output targets.

mod context;
pub mod template;

pub use context::{build as build_context, TemplateItem};

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{FreidokError, Result};
use crate::models::{AuthorStyle, ItemList};
use crate::process::DEFAULT_LANGUAGES;
use template::{Escape, Template, TemplateContext};

/// Output format
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputFormat {
    Markdown,
    Html,
    /// Passthrough of the item list, no templating
    Json,
    /// User-supplied template file
    Template(PathBuf),
}

impl OutputFormat {
    /// Format implied by an output file name
    pub fn from_extension(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("html" | "htm") => OutputFormat::Html,
            Some("json") => OutputFormat::Json,
            _ => OutputFormat::Markdown,
        }
    }
}

/// Choose the output format: template, then explicit format, then the
/// extension of the output file, then Markdown
pub fn resolve_format(
    template: Option<&Path>,
    format: Option<OutputFormat>,
    target: &OutputTarget,
) -> OutputFormat {
    if let Some(path) = template {
        return OutputFormat::Template(path.to_path_buf());
    }
    if let Some(format) = format {
        return format;
    }
    match target {
        OutputTarget::File(path) => OutputFormat::from_extension(path),
        OutputTarget::Stdout => OutputFormat::Markdown,
    }
}

/// Where rendered output goes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OutputTarget {
    #[default]
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    /// `None` or `-` mean standard output
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            None | Some("-") => OutputTarget::Stdout,
            Some(path) => OutputTarget::File(PathBuf::from(path)),
        }
    }

    /// Write `content`, replacing an existing file
    pub fn write(&self, content: &str) -> Result<()> {
        match self {
            OutputTarget::Stdout => {
                let mut stdout = std::io::stdout().lock();
                stdout
                    .write_all(content.as_bytes())
                    .and_then(|()| stdout.flush())
                    .map_err(|source| FreidokError::OutputWrite {
                        path: PathBuf::from("-"),
                        source,
                    })
            }
            OutputTarget::File(path) => {
                std::fs::write(path, content).map_err(|source| FreidokError::OutputWrite {
                    path: path.clone(),
                    source,
                })?;
                tracing::info!("Wrote {} bytes to {}", content.len(), path.display());
                Ok(())
            }
        }
    }
}

/// Settings that only affect presentation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Language preference for titles and names
    pub languages: Vec<String>,

    /// Author limit, used to flag truncated author lists
    pub maxpers: usize,

    /// Style for author strings not computed during post-processing
    pub author_style: AuthorStyle,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            languages: DEFAULT_LANGUAGES.iter().map(|l| l.to_string()).collect(),
            maxpers: 0,
            author_style: AuthorStyle::default(),
        }
    }
}

impl RenderOptions {
    pub fn languages(mut self, languages: Vec<String>) -> Self {
        self.languages = languages;
        self
    }

    pub fn maxpers(mut self, maxpers: usize) -> Self {
        self.maxpers = maxpers;
        self
    }

    pub fn author_style(mut self, style: AuthorStyle) -> Self {
        self.author_style = style;
        self
    }
}

/// Render an item list in the given format
pub fn render<T: TemplateItem>(
    list: &ItemList<T>,
    format: &OutputFormat,
    options: &RenderOptions,
) -> Result<String> {
    let template = match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&list.to_json_value()?)?;
            json.push('\n');
            return Ok(json);
        }
        OutputFormat::Markdown => Template::compile(T::MARKDOWN, Escape::None)?,
        OutputFormat::Html => Template::compile(T::HTML, Escape::Html)?,
        OutputFormat::Template(path) => Template::from_file(path)?,
    };

    let datetime = chrono::Local::now().format("%Y-%m-%d %H:%M:%S %:z").to_string();
    let context = TemplateContext::from_json(build_context(&list.docs, options, &datetime));
    Ok(template.render(&context)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Institution, Name, Person, Publication, Title};

    fn publications() -> ItemList<Publication> {
        let item = |id: u64, year: i32, title: &str| Publication {
            id: Some(id),
            publication_year: Some(year),
            link: Some(format!("https://freidok.uni-freiburg.de/data/{}", id)),
            titles: vec![Title {
                value: Some(title.to_string()),
                language: Some("eng".to_string()),
                ..Default::default()
            }],
            persons: vec![Person::new("Ann", "Lee"), Person::new("Bo", "Ray")],
            formatted_authors: Some("Ann Lee, Bo Ray".to_string()),
            ..Default::default()
        };
        ItemList::new(vec![
            item(2, 2021, "Second <draft>"),
            item(1, 2020, "First"),
        ])
    }

    #[test]
    fn test_resolve_format_precedence() {
        let html_file = OutputTarget::from_arg(Some("report.html"));

        assert_eq!(resolve_format(None, None, &html_file), OutputFormat::Html);
        assert_eq!(
            resolve_format(None, Some(OutputFormat::Json), &html_file),
            OutputFormat::Json
        );
        assert_eq!(
            resolve_format(Some(Path::new("my.tpl")), Some(OutputFormat::Json), &html_file),
            OutputFormat::Template(PathBuf::from("my.tpl"))
        );
        assert_eq!(resolve_format(None, None, &OutputTarget::Stdout), OutputFormat::Markdown);
        assert_eq!(
            resolve_format(None, None, &OutputTarget::from_arg(Some("out.JSON"))),
            OutputFormat::Json
        );
        assert_eq!(
            resolve_format(None, None, &OutputTarget::from_arg(Some("list.htm"))),
            OutputFormat::Html
        );
        assert_eq!(
            resolve_format(None, None, &OutputTarget::from_arg(Some("notes.txt"))),
            OutputFormat::Markdown
        );
    }

    #[test]
    fn test_output_target_from_arg() {
        assert_eq!(OutputTarget::from_arg(None), OutputTarget::Stdout);
        assert_eq!(OutputTarget::from_arg(Some("-")), OutputTarget::Stdout);
        assert_eq!(
            OutputTarget::from_arg(Some("out.md")),
            OutputTarget::File(PathBuf::from("out.md"))
        );
    }

    #[test]
    fn test_markdown_groups_by_year() {
        let out = render(&publications(), &OutputFormat::Markdown, &RenderOptions::default()).unwrap();
        assert_eq!(
            out,
            "## 2021\n\n\
             - Ann Lee, Bo Ray: **Second <draft>** [Link](https://freidok.uni-freiburg.de/data/2)\n\n\
             ## 2020\n\n\
             - Ann Lee, Bo Ray: **First** [Link](https://freidok.uni-freiburg.de/data/1)\n\n"
        );
    }

    #[test]
    fn test_markdown_marks_truncated_authors() {
        let options = RenderOptions::default().maxpers(1);
        let mut list = publications();
        list.docs[0].formatted_authors = Some("Ann Lee".to_string());
        let out = render(&list, &OutputFormat::Markdown, &options).unwrap();
        assert!(out.contains("- Ann Lee et al.: **Second <draft>**"), "{out}");
    }

    #[test]
    fn test_html_escapes_values() {
        let out = render(&publications(), &OutputFormat::Html, &RenderOptions::default()).unwrap();
        assert!(out.contains("Second &lt;draft&gt;"), "{out}");
        assert!(out.contains("href=\"https://freidok.uni-freiburg.de/data/2\""));
        assert!(out.contains("<span class=\"year\">(2020)</span>"));
        assert!(out.starts_with("<!-- 2 publications"));
    }

    #[test]
    fn test_json_is_passthrough() {
        let list = publications();
        let out = render(&list, &OutputFormat::Json, &RenderOptions::default()).unwrap();
        let reloaded = ItemList::<Publication>::from_json(&out).unwrap();
        assert_eq!(reloaded.to_json_value().unwrap(), list.to_json_value().unwrap());
        assert!(out.contains("\"formatted_authors\": \"Ann Lee, Bo Ray\""));
    }

    #[test]
    fn test_institution_markdown() {
        let list = ItemList::new(vec![Institution {
            id: Some(7),
            link: Some("https://freidok.uni-freiburg.de/inst/7".to_string()),
            names: vec![
                Name {
                    value: Some("Institut für Informatik".to_string()),
                    language: Some("deu".to_string()),
                    ..Default::default()
                },
                Name {
                    value: Some("Department of Computer Science".to_string()),
                    language: Some("eng".to_string()),
                    ..Default::default()
                },
            ],
            ..Default::default()
        }]);
        let out = render(&list, &OutputFormat::Markdown, &RenderOptions::default()).unwrap();
        assert_eq!(
            out,
            "- Department of Computer Science ([FreiDok](https://freidok.uni-freiburg.de/inst/7))\n"
        );
    }

    #[test]
    fn test_custom_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ids.txt");
        std::fs::write(&path, "$for(items)$$items.id$ $items.authors$\n$endfor$total: $count$\n").unwrap();

        let out = render(&publications(), &OutputFormat::Template(path), &RenderOptions::default()).unwrap();
        assert_eq!(out, "2 Ann Lee, Bo Ray\n1 Ann Lee, Bo Ray\ntotal: 2\n");
    }

    #[test]
    fn test_custom_template_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = OutputFormat::Template(dir.path().join("nope.tpl"));
        let err = render(&publications(), &missing, &RenderOptions::default()).unwrap_err();
        assert!(matches!(err, FreidokError::Template(_)));

        let path = dir.path().join("bad.tpl");
        std::fs::write(&path, "$undefined_thing$").unwrap();
        let err = render(&publications(), &OutputFormat::Template(path), &RenderOptions::default())
            .unwrap_err();
        assert!(matches!(err, FreidokError::Template(_)));
    }

    #[test]
    fn test_write_to_file_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.md");
        std::fs::write(&path, "old content that is longer").unwrap();

        OutputTarget::File(path.clone()).write("new").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");

        let err = OutputTarget::File(dir.path().join("missing/dir/out.md"))
            .write("x")
            .unwrap_err();
        assert!(matches!(err, FreidokError::OutputWrite { .. }));
    }
}

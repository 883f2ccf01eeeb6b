//! The values templates get to see.
//!
//! Only these keys are exposed; the raw API structures are not.

use serde_json::{json, Map, Value};

use crate::models::{Institution, Publication};
use crate::process::{format_authors, preferred_text};
use crate::render::RenderOptions;

/// An entity that can be rendered through a template
pub trait TemplateItem: crate::models::Item {
    /// Built-in Markdown template
    const MARKDOWN: &'static str;

    /// Built-in HTML template
    const HTML: &'static str;

    /// Template view of a single item
    fn context(&self, options: &RenderOptions) -> Value;

    /// Extra top-level bindings derived from all items
    fn globals(_items: &[Self], _options: &RenderOptions) -> Map<String, Value> {
        Map::new()
    }
}

impl TemplateItem for Publication {
    const MARKDOWN: &'static str = include_str!("../../templates/publications/simple-list.md");
    const HTML: &'static str = include_str!("../../templates/publications/simple-list.html");

    fn context(&self, options: &RenderOptions) -> Value {
        let formatted = format_authors(&self.persons, options.maxpers, &options.author_style);
        let authors = self.formatted_authors.clone().unwrap_or(formatted.text);
        let source = self.source_journal.first();

        json!({
            "id": self.id,
            "link": self.link,
            "url": self.preferred_link().or(self.link.as_deref()),
            "title": preferred_text(&self.titles, &options.languages),
            "titles": self.titles.iter().map(|t| json!({
                "value": t.value,
                "language": t.language,
            })).collect::<Vec<_>>(),
            "authors": authors,
            "authors_truncated": formatted.truncated,
            "persons": self.persons.iter().map(|p| json!({
                "id": p.id,
                "forename": p.forename,
                "surname": p.surname,
                "name": p.full_name(),
            })).collect::<Vec<_>>(),
            "year": self.publication_year,
            "pubtype": self.pubtype_label(),
            "source": {
                "title": source.and_then(|s| s.title.as_deref()),
                "volume": source.and_then(|s| s.volume.as_deref()),
                "year": source.and_then(|s| s.year.as_deref()),
                "issue": source.and_then(|s| s.issue.as_deref()),
                "page": source.and_then(|s| s.page.as_deref()),
            },
            "pub_ids": self.pub_ids.iter().map(|p| json!({
                "type": p.kind,
                "value": p.value,
                "link": p.link,
            })).collect::<Vec<_>>(),
        })
    }

    /// `years`: items grouped by publication year, in order of first appearance
    fn globals(items: &[Self], options: &RenderOptions) -> Map<String, Value> {
        let mut groups: Vec<(Option<i32>, Vec<Value>)> = Vec::new();
        for item in items {
            let context = item.context(options);
            match groups.iter_mut().find(|(year, _)| *year == item.publication_year) {
                Some((_, group)) => group.push(context),
                None => groups.push((item.publication_year, vec![context])),
            }
        }

        let years = groups
            .into_iter()
            .map(|(year, items)| json!({ "year": year, "items": items }))
            .collect();

        let mut globals = Map::new();
        globals.insert("years".to_string(), Value::Array(years));
        globals
    }
}

impl TemplateItem for Institution {
    const MARKDOWN: &'static str = include_str!("../../templates/institutions/simple-list.md");
    const HTML: &'static str = include_str!("../../templates/institutions/simple-list.html");

    fn context(&self, options: &RenderOptions) -> Value {
        json!({
            "id": self.id,
            "link": self.link,
            "name": preferred_text(&self.names, &options.languages),
            "names": self.names.iter().map(|n| json!({
                "value": n.value,
                "language": n.language,
            })).collect::<Vec<_>>(),
        })
    }
}

/// Full template context: `items`, `count`, `datetime` and the item globals
pub fn build<T: TemplateItem>(items: &[T], options: &RenderOptions, datetime: &str) -> Value {
    let mut context = T::globals(items, options);
    context.insert(
        "items".to_string(),
        Value::Array(items.iter().map(|item| item.context(options)).collect()),
    );
    context.insert("count".to_string(), json!(items.len()));
    context.insert("datetime".to_string(), json!(datetime));
    Value::Object(context)
}

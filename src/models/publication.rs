//! Publication model as returned by the FreiDok publications endpoint.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::de;
use super::Item;

/// A single publication.
///
/// Only the fields this tool works with are typed; everything else the API
/// returns is kept in `extra`. JSON output writes `raw` back instead of the
/// typed fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Publication {
    #[serde(default, deserialize_with = "de::opt_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    #[serde(default, deserialize_with = "de::opt_year", skip_serializing_if = "Option::is_none")]
    pub publication_year: Option<i32>,

    /// Title variants, usually one per language
    #[serde(default, deserialize_with = "de::null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub titles: Vec<Title>,

    /// Persons in authoritative order
    #[serde(default, deserialize_with = "de::null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub persons: Vec<Person>,

    #[serde(default, deserialize_with = "de::null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub source_journal: Vec<SourceJournal>,

    /// Publication identifiers and links (DOI, URN, ...)
    #[serde(default, deserialize_with = "de::null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub pub_ids: Vec<PubId>,

    #[serde(default, deserialize_with = "de::null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub institutions: Vec<InstitutionRef>,

    /// Pre-formatted author list, computed client-side after filtering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_authors: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,

    /// The object as received, written back by the JSON passthrough
    #[serde(skip)]
    pub raw: Option<Map<String, Value>>,
}

impl Item for Publication {
    const KIND: &'static str = "publication";

    fn id(&self) -> Option<u64> {
        self.id
    }

    fn raw(&self) -> Option<&Map<String, Value>> {
        self.raw.as_ref()
    }

    fn set_raw(&mut self, raw: Map<String, Value>) {
        self.raw = Some(raw);
    }

    /// The received object plus the derived `formatted_authors`
    fn passthrough(&self) -> crate::error::Result<Value> {
        let Some(raw) = &self.raw else {
            return Ok(serde_json::to_value(self)?);
        };
        let mut doc = raw.clone();
        if let Some(authors) = &self.formatted_authors {
            doc.insert("formatted_authors".to_string(), Value::String(authors.clone()));
        }
        Ok(Value::Object(doc))
    }
}

impl Publication {
    /// Preferred link: a DOI if present, otherwise the first publication link
    pub fn preferred_link(&self) -> Option<&str> {
        self.pub_ids
            .iter()
            .find(|p| p.kind.as_deref() == Some("doi"))
            .or_else(|| self.pub_ids.first())
            .and_then(|p| p.link.as_deref().or(p.value.as_deref()))
    }

    /// Publication type label, if the API delivered one
    pub fn pubtype_label(&self) -> Option<&str> {
        match self.extra.get("pubtype")? {
            Value::String(s) => Some(s.as_str()),
            Value::Object(obj) => obj.get("value").and_then(Value::as_str),
            _ => None,
        }
    }

    /// Whether any title variant contains `needle` (case-insensitive)
    pub fn has_title_containing(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.titles.iter().any(|t| {
            t.value
                .as_deref()
                .is_some_and(|v| v.to_lowercase().contains(&needle))
        })
    }
}

/// A title variant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Title {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Three-letter language code, e.g. `eng`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An author or other contributing person
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Person {
    #[serde(default, deserialize_with = "de::opt_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forename: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,

    /// Display value as delivered by the API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Person {
    /// Create a person from forename and surname
    pub fn new(forename: impl Into<String>, surname: impl Into<String>) -> Self {
        Self {
            forename: Some(forename.into()),
            surname: Some(surname.into()),
            ..Default::default()
        }
    }

    /// `"forename surname"` with whitespace normalised
    pub fn full_name(&self) -> String {
        let forename = self.forename.as_deref().unwrap_or_default();
        let surname = self.surname.as_deref().unwrap_or_default();
        forename
            .split_whitespace()
            .chain(surname.split_whitespace())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Journal a publication appeared in
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceJournal {
    #[serde(default, deserialize_with = "de::opt_text", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "de::opt_text", skip_serializing_if = "Option::is_none")]
    pub volume: Option<String>,

    #[serde(default, deserialize_with = "de::opt_text", skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,

    #[serde(default, deserialize_with = "de::opt_text", skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,

    #[serde(default, deserialize_with = "de::opt_text", skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Publication identifier with link (DOI, URN, handle, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PubId {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Institution a publication is affiliated with
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstitutionRef {
    #[serde(default, deserialize_with = "de::opt_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

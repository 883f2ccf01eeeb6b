//! Translation of filter criteria into FreiDok API query parameters.

pub mod fields;

pub use fields::{resolve as resolve_fields, FieldSets};

use crate::error::{FreidokError, Result};
use crate::models::{FilterCriteria, InstitutionQuery, PublicationQuery};

/// Parameters that select publications; the API refuses open-ended queries.
pub const PUBLICATION_SELECTORS: &[&str] = &["publicationId", "persId", "instId", "projId", "titleSearch"];

/// Parameters that select institutions
pub const INSTITUTION_SELECTORS: &[&str] = &["instId", "nameSearch"];

/// Ordered query parameters.
///
/// Setting a key that is already present replaces its value in place, so
/// later writes win while the original order is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, replacing an existing value with the same key
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((key, value)),
        }
    }

    /// Set a parameter only when a value is present
    pub fn set_opt(&mut self, key: &str, value: Option<impl Into<String>>) {
        if let Some(value) = value {
            self.set(key, value);
        }
    }

    /// Merge pairs, later pairs win
    pub fn extend<K, V>(&mut self, pairs: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in pairs {
            self.set(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_any(&self, keys: &[&str]) -> bool {
        keys.iter().any(|key| self.get(key).is_some())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Parse a free-form parameter string such as `"transitive=true pubtype=book"`.
///
/// Tokens are separated by whitespace or `&` and split at the first `=`.
pub fn parse_params(input: &str) -> Result<Vec<(String, String)>> {
    input
        .split(|c: char| c == '&' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| match token.split_once('=') {
            Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
            _ => Err(FreidokError::InvalidFilter(format!(
                "Invalid API parameter '{}' in {:?}, expected key=value",
                token, input
            ))),
        })
        .collect()
}

/// Build the query for the publications endpoint
pub fn translate(query: &PublicationQuery) -> QueryParams {
    let criteria = &query.criteria;
    let mut params = QueryParams::new();

    params.set_opt("publicationId", join_ids(&criteria.ids));
    params.set_opt("instId", join_ids(&criteria.inst_ids));
    params.set_opt("persId", join_ids(&criteria.pers_ids));
    params.set_opt("projId", join_ids(&criteria.proj_ids));
    params.set_opt("titleSearch", criteria.title.as_deref());

    if !query.fields.is_empty() {
        params.set("field", query.fields.join(","));
    }

    add_window(&mut params, criteria.start_item, criteria.max_items);

    if let Some(years) = criteria.years {
        params.set("yearFrom", years.start().to_string());
        params.set("yearTo", years.end().to_string());
    }

    if let Some(sort) = sort_fields(&query.fields) {
        params.set("sortfield", sort);
    }

    params.extend(criteria.params.iter().cloned());
    params
}

/// Build the query for the institutions endpoint
pub fn translate_institutions(query: &InstitutionQuery) -> QueryParams {
    let mut params = QueryParams::new();
    params.set_opt("instId", join_ids(&query.ids));
    params.set_opt("nameSearch", query.name.as_deref());
    add_window(&mut params, query.start_item, query.max_items);
    params
}

/// Ensure at least one selecting parameter is present
pub fn require_selector(params: &QueryParams, selectors: &[&str]) -> Result<()> {
    if params.contains_any(selectors) {
        Ok(())
    } else {
        Err(FreidokError::InvalidFilter(format!(
            "Missing filter, at least one of these parameters is required: {}",
            selectors.join(", ")
        )))
    }
}

/// Criteria that only make sense against the live API
pub fn remote_only_criteria(criteria: &FilterCriteria) -> Vec<&'static str> {
    let mut names = Vec::new();
    if !criteria.proj_ids.is_empty() {
        names.push("proj-id");
    }
    if !criteria.params.is_empty() {
        names.push("params");
    }
    if criteria.start_item > 0 {
        names.push("startitem");
    }
    names
}

fn add_window(params: &mut QueryParams, start_item: usize, max_items: usize) {
    if max_items > 0 {
        params.set("maxRows", max_items.to_string());
    }
    if start_item > 0 {
        params.set("start", start_item.to_string());
    }
}

fn sort_fields(fields: &[String]) -> Option<String> {
    let mut sort = Vec::new();
    if fields.iter().any(|f| f == "publication_year") {
        sort.push("publication_year+desc");
    }
    if fields.iter().any(|f| f == "id") {
        sort.push("id+desc");
    }
    (!sort.is_empty()).then(|| sort.join(","))
}

fn join_ids(ids: &[u64]) -> Option<String> {
    if ids.is_empty() {
        None
    } else {
        Some(
            ids.iter()
                .map(u64::to_string)
                .collect::<Vec<_>>()
                .join(","),
        )
    }
}

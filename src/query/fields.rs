//! Response field selection.
//!
//! The publications endpoint returns only the fields listed in its `field`
//! parameter. Fields are either given explicitly or picked from a named
//! field set; sets can be added or replaced through the environment
//! (`FREIDOK_FIELDSET_PUBLICATION_<NAME>`) or the config file.

use std::collections::BTreeMap;

use crate::error::{FreidokError, Result};

/// Environment prefix for custom publication field sets
pub const FIELDSET_ENV_PREFIX: &str = "FREIDOK_FIELDSET_PUBLICATION_";

/// Name of the field set used when nothing else is requested
pub const DEFAULT_FIELDSET: &str = "default";

/// All fields the publications endpoint knows about
pub const PUBLICATION_FIELDS: &[&str] = &[
    "id",
    "link",
    "abstracts",
    "researchdata_descriptions",
    "descriptions",
    "messages",
    "classifications",
    "pub_ids",
    "pub_ids_internal",
    "pubtype",
    "languages",
    "edition",
    "keywords",
    "keywords_uncontrolled",
    "publication_year",
    "peerreviewed",
    "day_of_exam",
    "system_time",
    "titles",
    "title_parents",
    "persons",
    "persons_stat",
    "affiliations_list",
    "functions_list",
    "institutions",
    "relations",
    "reverse_relations",
    "publisher",
    "source_journal",
    "source_compilation",
    "size",
    "series",
    "contract",
    "license_metadata",
    "license",
    "contact",
    "fundings",
    "preview_image",
    "files_stat",
    "files",
    "files_external",
    "oa_status",
    "revision",
    "acquisition_type",
    "fachsigel",
    "state",
    "locked",
    "issued",
    "created_by",
    "submission_type",
    "current_person_affiliations",
    "current_institution_affiliations",
    "current_project_affiliations",
    "current_activity_affiliations",
];

const BUILTIN_DEFAULT: &[&str] = &[
    "id",
    "link",
    "publication_year",
    "titles",
    "publisher",
    "persons",
    "persons_stat",
    "pubtype",
    "source_journal",
    "source_compilation",
    "pub_ids",
    "preview_image",
];

const BUILTIN_SHORT: &[&str] = &["id", "link", "publication_year", "titles", "persons", "pub_ids"];

/// Named field sets: built-ins plus custom overrides.
///
/// Names are stored lowercase; an override with the same name as a built-in
/// replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSets {
    sets: BTreeMap<String, Vec<String>>,
}

impl Default for FieldSets {
    fn default() -> Self {
        Self::builtin()
    }
}

impl FieldSets {
    /// Only the built-in `default` and `short` sets
    pub fn builtin() -> Self {
        let mut sets = BTreeMap::new();
        sets.insert(DEFAULT_FIELDSET.to_string(), to_owned(BUILTIN_DEFAULT));
        sets.insert("short".to_string(), to_owned(BUILTIN_SHORT));
        Self { sets }
    }

    /// Add or replace a set. Empty definitions are ignored.
    pub fn insert(&mut self, name: &str, fields: Vec<String>) {
        if fields.is_empty() {
            tracing::warn!("Ignoring empty field set '{}'", name);
            return;
        }
        self.sets.insert(name.to_lowercase(), fields);
    }

    /// Merge overrides, overrides win on conflict
    pub fn merge(&mut self, overrides: impl IntoIterator<Item = (String, Vec<String>)>) {
        for (name, fields) in overrides {
            self.insert(&name, fields);
        }
    }

    /// Look up a set by case-insensitive name
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.sets.get(&name.to_lowercase()).map(Vec::as_slice)
    }

    /// Known set names, sorted
    pub fn names(&self) -> Vec<&str> {
        self.sets.keys().map(String::as_str).collect()
    }
}

/// Collect field sets from environment-style `(key, value)` pairs.
///
/// `FREIDOK_FIELDSET_PUBLICATION_MINI=id,titles` defines the set `mini`.
pub fn fieldsets_from_env<I>(vars: I) -> Vec<(String, Vec<String>)>
where
    I: IntoIterator<Item = (String, String)>,
{
    vars.into_iter()
        .filter_map(|(key, value)| {
            let name = key.strip_prefix(FIELDSET_ENV_PREFIX)?;
            if name.is_empty() {
                return None;
            }
            Some((name.to_lowercase(), split_list(&value)))
        })
        .collect()
}

/// Split a comma and/or whitespace separated list
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Resolve the response fields for a publication request.
///
/// Explicit fields take precedence over a field set name and are validated
/// against [`PUBLICATION_FIELDS`]. Without either, the `default` set is used.
pub fn resolve(
    fieldset: Option<&str>,
    fields: Option<&[String]>,
    sets: &FieldSets,
) -> Result<Vec<String>> {
    if let Some(fields) = fields {
        if fieldset.is_some() {
            tracing::debug!("Explicit fields given, ignoring field set");
        }
        let mut resolved: Vec<String> = Vec::with_capacity(fields.len());
        for field in fields {
            if !PUBLICATION_FIELDS.contains(&field.as_str()) {
                return Err(FreidokError::UnknownField(field.clone()));
            }
            if !resolved.contains(field) {
                resolved.push(field.clone());
            }
        }
        return Ok(resolved);
    }

    let name = fieldset.unwrap_or(DEFAULT_FIELDSET);
    sets.get(name)
        .map(<[String]>::to_vec)
        .ok_or_else(|| FreidokError::UnknownFieldset {
            name: name.to_string(),
            available: sets.names().join(", "),
        })
}

fn to_owned(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|f| f.to_string()).collect()
}

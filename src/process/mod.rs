//! Client-side post-processing of fetched publications.
//!
//! Everything here is pure: items go in, filtered and annotated items come
//! out. Nothing talks to the network.

mod authors;
mod languages;

pub use authors::{abbreviate, format_author, format_authors, FormattedAuthors};
pub use languages::{parse_languages, preferred_text, select_language, Localized, DEFAULT_LANGUAGES};

use crate::models::{AuthorStyle, FilterCriteria, Institution, Publication};
use crate::query::remote_only_criteria;

/// Exclude unwanted publications and compute `formatted_authors`.
///
/// `persons` is never modified; `maxpers` only affects the derived string.
pub fn process(items: Vec<Publication>, criteria: &FilterCriteria, style: &AuthorStyle) -> Vec<Publication> {
    let before = items.len();

    let mut items: Vec<Publication> = items
        .into_iter()
        .filter(|item| !has_excluded_author(item, &criteria.exclude_authors))
        .filter(|item| !has_excluded_title(item, &criteria.exclude_titles))
        .collect();

    if items.len() < before {
        tracing::debug!("Excluded {} of {} publications", before - items.len(), before);
    }

    for item in &mut items {
        let authors = format_authors(&item.persons, criteria.maxpers, style);
        item.formatted_authors = Some(authors.text);
    }

    items
}

/// Whether any person's full name contains one of `needles` (case-sensitive)
pub fn has_excluded_author(item: &Publication, needles: &[String]) -> bool {
    if needles.is_empty() {
        return false;
    }
    item.persons.iter().any(|person| {
        let name = person.full_name();
        needles.iter().any(|needle| name.contains(needle.as_str()))
    })
}

/// Whether any title variant contains one of `needles` (case-insensitive)
pub fn has_excluded_title(item: &Publication, needles: &[String]) -> bool {
    needles.iter().any(|needle| item.has_title_containing(needle))
}

/// Re-apply the API-side filters to publications loaded from a file.
///
/// Returns the names of criteria that cannot be evaluated locally.
pub fn apply_local_filters(
    items: Vec<Publication>,
    criteria: &FilterCriteria,
) -> (Vec<Publication>, Vec<&'static str>) {
    let items = items
        .into_iter()
        .filter(|item| matches_ids(item.id, &criteria.ids))
        .filter(|item| match criteria.years {
            Some(years) => item.publication_year.is_some_and(|y| years.contains(y)),
            None => true,
        })
        .filter(|item| match criteria.title.as_deref() {
            Some(title) => item.has_title_containing(title),
            None => true,
        })
        .filter(|item| {
            criteria.pers_ids.is_empty()
                || item
                    .persons
                    .iter()
                    .any(|p| p.id.is_some_and(|id| criteria.pers_ids.contains(&id)))
        })
        .filter(|item| {
            criteria.inst_ids.is_empty()
                || item
                    .institutions
                    .iter()
                    .any(|i| i.id.is_some_and(|id| criteria.inst_ids.contains(&id)))
        })
        .collect();

    (items, remote_only_criteria(criteria))
}

/// Re-apply id and name filters to institutions loaded from a file
pub fn apply_local_institution_filters(
    items: Vec<Institution>,
    ids: &[u64],
    name: Option<&str>,
) -> Vec<Institution> {
    let name = name.map(str::to_lowercase);
    items
        .into_iter()
        .filter(|item| matches_ids(item.id, ids))
        .filter(|item| match &name {
            Some(needle) => item.names.iter().any(|n| {
                n.value
                    .as_deref()
                    .is_some_and(|v| v.to_lowercase().contains(needle))
            }),
            None => true,
        })
        .collect()
}

fn matches_ids(id: Option<u64>, ids: &[u64]) -> bool {
    ids.is_empty() || id.is_some_and(|id| ids.contains(&id))
}

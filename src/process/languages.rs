//! Selection among language variants of titles and names.

use crate::models::{Name, Title};

/// Default preference order when none is configured
pub const DEFAULT_LANGUAGES: &[&str] = &["eng", "deu"];

/// A value tagged with a three-letter language code
pub trait Localized {
    fn language(&self) -> Option<&str>;
    fn text(&self) -> Option<&str>;
}

impl Localized for Title {
    fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    fn text(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl Localized for Name {
    fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    fn text(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

/// Pick the variant matching the earliest preferred language.
///
/// Falls back to the first variant when no language matches.
pub fn select_language<'a, T: Localized>(variants: &'a [T], preferred: &[String]) -> Option<&'a T> {
    preferred
        .iter()
        .find_map(|lang| {
            variants
                .iter()
                .find(|v| v.language().is_some_and(|l| l.eq_ignore_ascii_case(lang)))
        })
        .or_else(|| variants.first())
}

/// Text of the preferred variant
pub fn preferred_text<'a, T: Localized>(variants: &'a [T], preferred: &[String]) -> Option<&'a str> {
    select_language(variants, preferred).and_then(Localized::text)
}

/// Parse a language preference list such as `"eng,deu"`.
///
/// Every entry must be a three-letter code.
pub fn parse_languages(value: &str) -> Result<Vec<String>, String> {
    let langs: Vec<String> = value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
        .collect();

    if let Some(bad) = langs
        .iter()
        .find(|l| l.len() != 3 || !l.chars().all(|c| c.is_ascii_alphabetic()))
    {
        return Err(format!("Invalid language code '{}', expected three letters like 'eng'", bad));
    }
    if langs.is_empty() {
        return Err("No language given".to_string());
    }
    Ok(langs)
}

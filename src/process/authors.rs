//! Author list formatting.

use crate::models::{AuthorStyle, Person};

/// A formatted author list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedAuthors {
    pub text: String,

    /// Number of authors included in `text`
    pub included: usize,

    /// Whether persons were left out because of `maxpers`
    pub truncated: bool,
}

/// Abbreviate a forename to its initials.
///
/// Each whitespace-separated part contributes its upper-cased first letter,
/// followed by `marker`: `("Maciej K.", ".")` gives `"M.K."`, `("Maciej K.", "")`
/// gives `"MK"`.
pub fn abbreviate(forename: &str, marker: &str) -> String {
    forename
        .split_whitespace()
        .filter_map(|part| part.chars().next())
        .flat_map(char::to_uppercase)
        .map(|initial| format!("{}{}", initial, marker))
        .collect()
}

/// Format a single author according to `style`.
///
/// Returns an empty string if the person has neither forename nor surname.
pub fn format_author(person: &Person, style: &AuthorStyle) -> String {
    let forename = person.forename.as_deref().unwrap_or_default();
    let surname = person.surname.as_deref().unwrap_or_default();

    let forename = match style.abbreviate.as_deref() {
        Some(marker) => abbreviate(forename, marker),
        None => forename.to_string(),
    };

    let (first, second) = if style.reverse {
        (surname, forename.as_str())
    } else {
        (forename.as_str(), surname)
    };

    first
        .split_whitespace()
        .chain(second.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format the first `maxpers` named persons (all if 0), joined by the style separator.
/// Persons without any name part do not count towards the limit.
pub fn format_authors(persons: &[Person], maxpers: usize, style: &AuthorStyle) -> FormattedAuthors {
    let mut names: Vec<String> = persons
        .iter()
        .map(|person| format_author(person, style))
        .filter(|name| !name.is_empty())
        .collect();

    let named = names.len();
    if maxpers > 0 {
        names.truncate(maxpers);
    }

    FormattedAuthors {
        included: names.len(),
        text: names.join(&style.separator),
        truncated: names.len() < named,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn persons() -> Vec<Person> {
        vec![
            Person::new("Maciej K.", "Kocylowski"),
            Person::new("Hande", "Aypek"),
            Person::new("Wolfgang", "Bildl"),
        ]
    }

    #[test]
    fn test_default_style() {
        let authors = format_authors(&persons(), 0, &AuthorStyle::default());
        assert_eq!(authors.text, "Maciej K. Kocylowski, Hande Aypek, Wolfgang Bildl");
        assert_eq!(authors.included, 3);
        assert!(!authors.truncated);
    }

    #[test]
    fn test_abbreviated_and_reversed() {
        let style = AuthorStyle::new().abbreviate(".").reverse(true);
        let authors = format_authors(&persons(), 0, &style);
        assert_eq!(authors.text, "Kocylowski M.K., Aypek H., Bildl W.");
    }

    #[test]
    fn test_bare_initials_with_custom_separator() {
        let style = AuthorStyle::new().abbreviate("").separator(" / ");
        let authors = format_authors(&persons(), 0, &style);
        assert_eq!(authors.text, "MK Kocylowski / H Aypek / W Bildl");
    }

    #[test]
    fn test_abbreviate() {
        assert_eq!(abbreviate("Maciej K.", "."), "M.K.");
        assert_eq!(abbreviate("  hans   peter ", ""), "HP");
        assert_eq!(abbreviate("Élodie", "."), "É.");
        assert_eq!(abbreviate("", "."), "");
    }

    #[test]
    fn test_maxpers_limits_formatting_only() {
        let persons = persons();
        let authors = format_authors(&persons, 2, &AuthorStyle::default());
        assert_eq!(authors.text, "Maciej K. Kocylowski, Hande Aypek");
        assert!(authors.truncated);
        assert_eq!(persons.len(), 3);

        let authors = format_authors(&persons, 10, &AuthorStyle::default());
        assert_eq!(authors.included, 3);
        assert!(!authors.truncated);
    }

    #[test]
    fn test_missing_name_parts() {
        let persons = vec![
            Person {
                surname: Some("Solo".to_string()),
                ..Default::default()
            },
            Person::default(),
            Person {
                forename: Some("Only".to_string()),
                ..Default::default()
            },
        ];

        for style in [
            AuthorStyle::default(),
            AuthorStyle::new().reverse(true),
            AuthorStyle::new().abbreviate("."),
        ] {
            let authors = format_authors(&persons, 0, &style);
            assert_eq!(authors.included, 2);
            assert!(!authors.text.starts_with(' '));
            assert!(!authors.text.ends_with(' '));
            assert!(!authors.text.contains("  "));
        }
    }

    #[test]
    fn test_nameless_persons_do_not_count_towards_maxpers() {
        let mut persons = persons();
        persons.insert(0, Person::default());

        let authors = format_authors(&persons, 2, &AuthorStyle::default());
        assert_eq!(authors.text, "Maciej K. Kocylowski, Hande Aypek");
        assert_eq!(authors.included, 2);
        assert!(authors.truncated);

        let authors = format_authors(&persons, 3, &AuthorStyle::default());
        assert_eq!(authors.included, 3);
        assert!(!authors.truncated);
    }

    #[test]
    fn test_whitespace_is_normalised_for_all_styles() {
        let persons = vec![
            Person::new("  Anna  Maria ", "  von   Berg "),
            Person::new("\tJo", "Lee\n"),
            Person::new("X", "Y"),
        ];
        let separators = [", ", " / ", "; ", " and "];

        for abbrev in [None, Some(""), Some("."), Some(". ")] {
            for reverse in [false, true] {
                for separator in separators {
                    let style = AuthorStyle {
                        abbreviate: abbrev.map(str::to_string),
                        reverse,
                        separator: separator.to_string(),
                    };
                    let authors = format_authors(&persons, 0, &style);
                    let text = &authors.text;

                    assert_eq!(text.trim(), text, "{style:?}");
                    assert!(!text.contains("  "), "{text:?} for {style:?}");
                    assert_eq!(text.matches(separator).count(), authors.included - 1, "{text:?}");
                }
            }
        }
    }
}

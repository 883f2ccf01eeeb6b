//! Filter criteria and request models.

use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::FreidokError;

/// Hard page size limit of the FreiDok API
pub const MAX_ITEMS_LIMIT: usize = 100;

/// Inclusive year range; a single year is a range with `start == end`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    start: i32,
    end: i32,
}

impl YearRange {
    /// Create a range, failing if `start > end`
    pub fn new(start: i32, end: i32) -> Result<Self, FreidokError> {
        if start > end {
            return Err(FreidokError::InvalidFilter(format!(
                "Invalid year range {}-{}: start is after end",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Range covering exactly one year
    pub fn single(year: i32) -> Self {
        Self {
            start: year,
            end: year,
        }
    }

    pub fn start(&self) -> i32 {
        self.start
    }

    pub fn end(&self) -> i32 {
        self.end
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.start..=self.end).contains(&year)
    }
}

impl FromStr for YearRange {
    type Err = FreidokError;

    /// Parse `YYYY` or `YYYY-YYYY`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        static YEARS_RE: OnceLock<Regex> = OnceLock::new();
        let re = YEARS_RE
            .get_or_init(|| Regex::new(r"^([0-9]{4})(?:-([0-9]{4}))?$").expect("valid year regex"));

        let invalid = || FreidokError::InvalidFilter(format!("{:?} is not a valid year range", s));
        let caps = re.captures(s.trim()).ok_or_else(invalid)?;
        let year = |text: &str| text.parse::<i32>().map_err(|_| invalid());

        let start = year(&caps[1])?;
        match caps.get(2) {
            Some(end) => Self::new(start, year(end.as_str())?),
            None => Ok(Self::single(start)),
        }
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Filters for a publication request.
///
/// Some are sent to the API (ids, title, years), others only exist
/// client-side (author/title exclusion, author truncation).
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    /// Publication ids
    pub ids: Vec<u64>,

    /// Person ids
    pub pers_ids: Vec<u64>,

    /// Institution ids
    pub inst_ids: Vec<u64>,

    /// Project ids
    pub proj_ids: Vec<u64>,

    /// Title substring
    pub title: Option<String>,

    /// Publication year range
    pub years: Option<YearRange>,

    /// Extra API parameters, merged last
    pub params: Vec<(String, String)>,

    /// Drop publications with an author whose name contains one of these
    pub exclude_authors: Vec<String>,

    /// Drop publications with a title containing one of these
    pub exclude_titles: Vec<String>,

    /// Number of authors listed in the formatted author string (0 = all)
    pub maxpers: usize,

    /// Offset of the first item (manual pagination)
    pub start_item: usize,

    /// Page size
    pub max_items: usize,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            ids: Vec::new(),
            pers_ids: Vec::new(),
            inst_ids: Vec::new(),
            proj_ids: Vec::new(),
            title: None,
            years: None,
            params: Vec::new(),
            exclude_authors: Vec::new(),
            exclude_titles: Vec::new(),
            maxpers: 0,
            start_item: 0,
            max_items: MAX_ITEMS_LIMIT,
        }
    }
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set publication ids
    pub fn ids(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.ids = ids.into_iter().collect();
        self
    }

    /// Set person ids
    pub fn pers_ids(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.pers_ids = ids.into_iter().collect();
        self
    }

    /// Set institution ids
    pub fn inst_ids(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.inst_ids = ids.into_iter().collect();
        self
    }

    /// Set project ids
    pub fn proj_ids(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.proj_ids = ids.into_iter().collect();
        self
    }

    /// Set title filter
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set year range
    pub fn years(mut self, years: YearRange) -> Self {
        self.years = Some(years);
        self
    }

    /// Add an extra API parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Add an author exclusion
    pub fn exclude_author(mut self, name: impl Into<String>) -> Self {
        self.exclude_authors.push(name.into());
        self
    }

    /// Add a title exclusion
    pub fn exclude_title(mut self, title: impl Into<String>) -> Self {
        self.exclude_titles.push(title.into());
        self
    }

    /// Set author limit
    pub fn maxpers(mut self, maxpers: usize) -> Self {
        self.maxpers = maxpers;
        self
    }

    /// Set pagination window
    pub fn window(mut self, start_item: usize, max_items: usize) -> Self {
        self.start_item = start_item;
        self.max_items = max_items;
        self
    }
}

/// How the derived author string is built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorStyle {
    /// `None`: full forenames. `Some(s)`: initials, each followed by `s`.
    pub abbreviate: Option<String>,

    /// `surname forename` instead of `forename surname`
    pub reverse: bool,

    /// Placed between two authors
    pub separator: String,
}

impl Default for AuthorStyle {
    fn default() -> Self {
        Self {
            abbreviate: None,
            reverse: false,
            separator: ", ".to_string(),
        }
    }
}

impl AuthorStyle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abbreviate forenames, terminating each initial with `marker`
    pub fn abbreviate(mut self, marker: impl Into<String>) -> Self {
        self.abbreviate = Some(marker.into());
        self
    }

    /// List surname first
    pub fn reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    /// Set author separator
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }
}

/// Everything needed to request publications
#[derive(Debug, Clone, PartialEq)]
pub struct PublicationQuery {
    pub criteria: FilterCriteria,

    /// Resolved response fields
    pub fields: Vec<String>,
}

impl PublicationQuery {
    pub fn new(criteria: FilterCriteria, fields: Vec<String>) -> Self {
        Self { criteria, fields }
    }
}

/// Everything needed to request institutions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstitutionQuery {
    /// Institution ids
    pub ids: Vec<u64>,

    /// Name substring
    pub name: Option<String>,

    pub start_item: usize,

    pub max_items: usize,
}

impl Default for InstitutionQuery {
    fn default() -> Self {
        Self {
            ids: Vec::new(),
            name: None,
            start_item: 0,
            max_items: MAX_ITEMS_LIMIT,
        }
    }
}

impl InstitutionQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set institution ids
    pub fn ids(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.ids = ids.into_iter().collect();
        self
    }

    /// Set name filter
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

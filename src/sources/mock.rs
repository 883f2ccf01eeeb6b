//! Mock source for testing purposes.

use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};

use crate::error::Result;
use crate::models::{
    Institution, InstitutionQuery, ItemList, Name, Person, Publication, PublicationQuery, Title,
};
use crate::sources::Source;

/// A mock source that returns predefined item lists.
#[derive(Debug, Default)]
pub struct MockSource {
    publications: Mutex<Option<ItemList<Publication>>>,
    institutions: Mutex<Option<ItemList<Institution>>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the publications to return
    pub fn set_publications(&self, list: ItemList<Publication>) {
        *self
            .publications
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(list);
    }

    /// Set the institutions to return
    pub fn set_institutions(&self, list: ItemList<Institution>) {
        *self
            .institutions
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(list);
    }
}

#[async_trait]
impl Source for MockSource {
    fn id(&self) -> &str {
        "mock"
    }

    fn name(&self) -> &str {
        "Mock Source"
    }

    async fn get_publications(&self, _query: &PublicationQuery) -> Result<ItemList<Publication>> {
        let guard = self
            .publications
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(guard.clone().unwrap_or_else(|| ItemList::new(Vec::new())))
    }

    async fn get_institutions(&self, _query: &InstitutionQuery) -> Result<ItemList<Institution>> {
        let guard = self
            .institutions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(guard.clone().unwrap_or_else(|| ItemList::new(Vec::new())))
    }

    fn describe_publications(&self, _query: &PublicationQuery) -> Result<String> {
        Ok("MOCK publications\n".to_string())
    }

    fn describe_institutions(&self, _query: &InstitutionQuery) -> Result<String> {
        Ok("MOCK institutions\n".to_string())
    }
}

/// Helper to create a publication for testing.
pub fn make_publication(id: u64, year: i32, title: &str, persons: &[(&str, &str)]) -> Publication {
    Publication {
        id: Some(id),
        link: Some(format!("https://freidok.uni-freiburg.de/data/{}", id)),
        publication_year: Some(year),
        titles: vec![Title {
            value: Some(title.to_string()),
            language: Some("eng".to_string()),
            ..Default::default()
        }],
        persons: persons
            .iter()
            .map(|(forename, surname)| Person::new(*forename, *surname))
            .collect(),
        ..Default::default()
    }
}

/// Helper to create an institution for testing.
pub fn make_institution(id: u64, name: &str) -> Institution {
    Institution {
        id: Some(id),
        link: Some(format!("https://freidok.uni-freiburg.de/inst/{}", id)),
        names: vec![Name {
            value: Some(name.to_string()),
            language: Some("eng".to_string()),
            ..Default::default()
        }],
        ..Default::default()
    }
}

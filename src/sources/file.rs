//! Passthrough file source.
//!
//! Reads a JSON file previously written with `--format json` (or any file
//! holding an item envelope or a bare item array) and applies the filters
//! the API would otherwise have applied.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::{FreidokError, Result};
use crate::models::{Institution, InstitutionQuery, Item, ItemList, Publication, PublicationQuery};
use crate::process::{apply_local_filters, apply_local_institution_filters};
use crate::sources::Source;

#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn load<T: Item>(&self) -> Result<ItemList<T>> {
        tracing::info!("Reading {} items from {}", T::KIND, self.path.display());
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| FreidokError::Io {
                path: self.path.clone(),
                source,
            })?;
        ItemList::from_json(&text)
    }
}

#[async_trait]
impl Source for FileSource {
    fn id(&self) -> &str {
        "file"
    }

    fn name(&self) -> &str {
        "JSON file"
    }

    async fn get_publications(&self, query: &PublicationQuery) -> Result<ItemList<Publication>> {
        let mut list = self.load::<Publication>().await?;
        let total = list.len();

        let (docs, skipped) = apply_local_filters(std::mem::take(&mut list.docs), &query.criteria);
        for name in skipped {
            tracing::warn!("Filter '{}' cannot be applied to a file source, ignoring it", name);
        }
        if docs.len() < total {
            tracing::debug!("Kept {} of {} publications", docs.len(), total);
        }

        list.docs = docs;
        Ok(list)
    }

    async fn get_institutions(&self, query: &InstitutionQuery) -> Result<ItemList<Institution>> {
        let mut list = self.load::<Institution>().await?;
        if query.start_item > 0 {
            tracing::warn!("Filter 'startitem' cannot be applied to a file source, ignoring it");
        }
        list.docs = apply_local_institution_filters(
            std::mem::take(&mut list.docs),
            &query.ids,
            query.name.as_deref(),
        );
        Ok(list)
    }

    fn describe_publications(&self, _query: &PublicationQuery) -> Result<String> {
        Ok(format!("READ {}\n", self.path.display()))
    }

    fn describe_institutions(&self, _query: &InstitutionQuery) -> Result<String> {
        Ok(format!("READ {}\n", self.path.display()))
    }
}

//! Where items come from.
//!
//! A [`Source`] delivers raw item lists either from the FreiDok API or from a
//! previously saved JSON passthrough file. Everything after fetching (post-
//! processing, rendering) is the same for both.

mod api;
mod file;
pub mod mock;

pub use api::{format_request, ApiSource};
pub use file::FileSource;
pub use mock::MockSource;

use async_trait::async_trait;
use std::path::PathBuf;

use crate::config::{parse_base_url, Config};
use crate::error::Result;
use crate::models::{Institution, InstitutionQuery, ItemList, Publication, PublicationQuery};

/// A provider of publications and institutions
#[async_trait]
pub trait Source: Send + Sync + std::fmt::Debug {
    /// Short identifier used in log messages
    fn id(&self) -> &str;

    /// Human readable name
    fn name(&self) -> &str;

    /// Fetch publications matching the query
    async fn get_publications(&self, query: &PublicationQuery) -> Result<ItemList<Publication>>;

    /// Fetch institutions matching the query
    async fn get_institutions(&self, query: &InstitutionQuery) -> Result<ItemList<Institution>>;

    /// Describe what `get_publications` would do, for `--dryrun`
    fn describe_publications(&self, query: &PublicationQuery) -> Result<String>;

    /// Describe what `get_institutions` would do, for `--dryrun`
    fn describe_institutions(&self, query: &InstitutionQuery) -> Result<String>;
}

/// Parsed `--source` argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    /// The live API; `None` means the configured base URL
    Api(Option<String>),
    /// A JSON passthrough file
    File(PathBuf),
}

impl SourceSpec {
    /// Values starting with `http` select the API, anything else is a file path
    pub fn parse(arg: Option<&str>) -> Self {
        match arg {
            None => SourceSpec::Api(None),
            Some(url) if url.starts_with("http") => SourceSpec::Api(Some(url.to_string())),
            Some(path) => SourceSpec::File(PathBuf::from(path)),
        }
    }
}

/// Create the source selected by `--source`
pub fn create_source(spec: &SourceSpec, config: &Config) -> Result<Box<dyn Source>> {
    match spec {
        SourceSpec::Api(url) => {
            let base_url = match url {
                Some(url) => parse_base_url(url)?,
                None => config.base_url.clone(),
            };
            Ok(Box::new(ApiSource::new(base_url, config)?))
        }
        SourceSpec::File(path) => Ok(Box::new(FileSource::new(path.clone()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_spec() {
        assert_eq!(SourceSpec::parse(None), SourceSpec::Api(None));
        assert_eq!(
            SourceSpec::parse(Some("https://example.org/api/")),
            SourceSpec::Api(Some("https://example.org/api/".to_string()))
        );
        assert_eq!(
            SourceSpec::parse(Some("http://localhost:1234")),
            SourceSpec::Api(Some("http://localhost:1234".to_string()))
        );
        assert_eq!(
            SourceSpec::parse(Some("saved.json")),
            SourceSpec::File(PathBuf::from("saved.json"))
        );
    }

    #[test]
    fn test_create_source() {
        let config = Config::default();

        let source = create_source(&SourceSpec::Api(None), &config).unwrap();
        assert_eq!(source.id(), "api");

        let source = create_source(&SourceSpec::File(PathBuf::from("x.json")), &config).unwrap();
        assert_eq!(source.id(), "file");

        assert!(create_source(&SourceSpec::Api(Some("http://".to_string())), &config).is_err());
    }
}

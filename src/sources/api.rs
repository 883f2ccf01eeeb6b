//! FreiDok JSON API source.

use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT, FROM};
use reqwest::Request;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::{FreidokError, Result};
use crate::models::{Institution, InstitutionQuery, Item, ItemList, Publication, PublicationQuery};
use crate::query::{
    require_selector, translate, translate_institutions, QueryParams, INSTITUTION_SELECTORS,
    PUBLICATION_SELECTORS,
};
use crate::sources::Source;
use crate::utils::HttpClient;

/// Live API at a base URL such as `https://freidok.uni-freiburg.de/jsonApi/v1/`
#[derive(Debug, Clone)]
pub struct ApiSource {
    client: Arc<HttpClient>,
    base_url: url::Url,
    user_email: Option<String>,
}

impl ApiSource {
    pub fn new(base_url: url::Url, config: &Config) -> Result<Self> {
        Ok(Self {
            client: Arc::new(HttpClient::new(Duration::from_secs(config.timeout_secs))?),
            base_url,
            user_email: config.user_email.clone(),
        })
    }

    pub fn base_url(&self) -> &url::Url {
        &self.base_url
    }

    /// Build the GET request for the publications endpoint
    pub fn publications_request(&self, query: &PublicationQuery) -> Result<Request> {
        let params = translate(query);
        require_selector(&params, PUBLICATION_SELECTORS)?;
        self.request("publications", &params)
    }

    /// Build the GET request for the institutions endpoint
    pub fn institutions_request(&self, query: &InstitutionQuery) -> Result<Request> {
        let params = translate_institutions(query);
        require_selector(&params, INSTITUTION_SELECTORS)?;
        self.request("institutions", &params)
    }

    fn request(&self, endpoint: &str, params: &QueryParams) -> Result<Request> {
        let mut url = self
            .base_url
            .join(endpoint)
            .map_err(|e| FreidokError::Config(format!("Invalid API URL: {}", e)))?;
        url.query_pairs_mut().extend_pairs(params.iter());

        let mut builder = self
            .client
            .client()
            .get(url)
            .header(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(email) = &self.user_email {
            let value = HeaderValue::from_str(email)
                .map_err(|_| FreidokError::Config(format!("Invalid user_email: {:?}", email)))?;
            builder = builder.header(FROM, value);
        }

        Ok(builder.build()?)
    }

    async fn fetch<T: Item>(&self, request: Request) -> Result<ItemList<T>> {
        tracing::info!("GET {}", request.url());

        let response = self.client.client().execute(request).await.map_err(|e| {
            FreidokError::Transport(format!("Failed to query FreiDok: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let url = response.url().clone();
            return Err(FreidokError::Transport(format!(
                "FreiDok returned status {} for {}",
                status, url
            )));
        }

        let body = response.text().await.map_err(|e| {
            FreidokError::Transport(format!("Failed to read FreiDok response: {}", e))
        })?;
        tracing::debug!("Received {} bytes", body.len());

        let list = ItemList::<T>::from_json(&body)?;
        tracing::debug!(
            "Parsed {} {} items (numFound: {:?})",
            list.len(),
            T::KIND,
            list.num_found
        );
        Ok(list)
    }
}

#[async_trait]
impl Source for ApiSource {
    fn id(&self) -> &str {
        "api"
    }

    fn name(&self) -> &str {
        "FreiDok API"
    }

    async fn get_publications(&self, query: &PublicationQuery) -> Result<ItemList<Publication>> {
        let request = self.publications_request(query)?;
        self.fetch(request).await
    }

    async fn get_institutions(&self, query: &InstitutionQuery) -> Result<ItemList<Institution>> {
        let request = self.institutions_request(query)?;
        self.fetch(request).await
    }

    fn describe_publications(&self, query: &PublicationQuery) -> Result<String> {
        Ok(format_request(&self.publications_request(query)?))
    }

    fn describe_institutions(&self, query: &InstitutionQuery) -> Result<String> {
        Ok(format_request(&self.institutions_request(query)?))
    }
}

/// Request line and headers, one per line
pub fn format_request(request: &Request) -> String {
    let mut out = format!("{} {}\n", request.method(), request.url());
    for (name, value) in request.headers() {
        out.push_str(&format!(
            "{}: {}\n",
            name,
            value.to_str().unwrap_or("<binary>")
        ));
    }
    out
}

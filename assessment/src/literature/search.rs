//! Literature search: query string to ranked paper metadata.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{QueryResults, RawPapers, SearchResponse};

const DEFAULT_BASE_URL: &str = "https://api.semanticscholar.org/graph/v1";
const SEARCH_FIELDS: &str =
    "title,citationCount,tldr,url,publicationTypes,publicationDate,openAccessPdf,abstract";
const DEFAULT_YEAR_RANGE: &str = "2020-2025";
const DEFAULT_LIMIT: u32 = 50;
const DEFAULT_MIN_CITATIONS: u32 = 10;
const ENV_API_KEY: &str = "SEMANTIC_SCHOLAR_API_KEY";
const ENV_BASE_URL: &str = "SEMANTIC_SCHOLAR_BASE_URL";

/// Errors from the search service.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("search service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

/// Anything that turns a query into ranked papers.
#[async_trait]
pub trait LiteratureSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<SearchResponse, SearchError>;
}

/// Semantic Scholar graph API client.
#[derive(Debug, Clone)]
pub struct SemanticScholarClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    pub year_range: String,
    pub limit: u32,
    pub min_citations: u32,
}

impl Default for SemanticScholarClient {
    fn default() -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: std::env::var(ENV_BASE_URL).unwrap_or_else(|_| DEFAULT_BASE_URL.into()),
            api_key: std::env::var(ENV_API_KEY).ok().filter(|k| !k.is_empty()),
            year_range: DEFAULT_YEAR_RANGE.into(),
            limit: DEFAULT_LIMIT,
            min_citations: DEFAULT_MIN_CITATIONS,
        }
    }
}

impl SemanticScholarClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key,
            ..Self::default()
        }
    }

    fn search_url(&self) -> String {
        format!("{}/paper/search/", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LiteratureSearch for SemanticScholarClient {
    async fn search(&self, query: &str) -> Result<SearchResponse, SearchError> {
        debug!(query, "searching literature");

        let limit = self.limit.to_string();
        let min_citations = self.min_citations.to_string();
        let mut request = self
            .http
            .get(self.search_url())
            .query(&[
                ("query", query),
                ("fields", SEARCH_FIELDS),
                ("year", self.year_range.as_str()),
                ("limit", limit.as_str()),
                ("sort", "relevance"),
                ("minCitationCount", min_citations.as_str()),
            ])
            .timeout(Duration::from_secs(30));
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<SearchResponse>().await?)
    }
}

/// Run several queries in order and collect the results keyed by query.
///
/// A failing query is logged and left out; the others still contribute.
pub async fn search_many(search: &dyn LiteratureSearch, queries: &[String]) -> RawPapers {
    let mut results = QueryResults::new();
    for query in queries {
        match search.search(query).await {
            Ok(response) => {
                debug!(query = %query, papers = response.data.len(), "query complete");
                results.insert(query.clone(), response);
            }
            Err(e) => warn!(query = %query, error = %e, "literature query failed"),
        }
    }
    RawPapers::ByQuery(results)
}

/// TMDB v3 API adapter
///
/// Implements the catalog gateway against themoviedb.org. Authentication is
/// the api_key query parameter; every list endpoint shares the same paging
/// envelope, so one helper does the request/status/decode work.
use crate::{
    config::Config,
    error::{FeedError, FeedResult},
    gateway::CatalogGateway,
    models::{DiscoverCriteria, MoviePage, PersonRole, SortKey},
};
use reqwest::Client as HttpClient;
use serde::Deserialize;
use std::time::Duration;

/// A fetch either returns within this window or counts as failed
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct TmdbGateway {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    watch_region: String,
}

#[derive(Debug, Deserialize)]
struct PersonSearchResponse {
    #[serde(default)]
    results: Vec<PersonResult>,
}

#[derive(Debug, Deserialize)]
struct PersonResult {
    id: u64,
    #[serde(default)]
    known_for_department: Option<String>,
}

impl TmdbGateway {
    /// Builds the adapter from engine configuration
    pub fn from_config(config: &Config) -> FeedResult<Self> {
        if config.tmdb_api_key.trim().is_empty() {
            return Err(FeedError::ConfigurationInvalid(
                "tmdb_api_key is empty".to_string(),
            ));
        }
        Ok(Self::new(
            config.tmdb_api_key.clone(),
            config.tmdb_api_url.clone(),
            config.watch_region.clone(),
        ))
    }

    pub fn new(api_key: String, api_url: String, watch_region: String) -> Self {
        let http_client = HttpClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("reqwest client");
        Self {
            http_client,
            api_key,
            api_url,
            watch_region,
        }
    }

    /// Performs a GET against a list endpoint and decodes the paging envelope
    async fn get_page(&self, path: &str, params: &[(String, String)]) -> FeedResult<MoviePage> {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                path = %path,
                status = %status,
                body = %body,
                "TMDB request failed"
            );
            return Err(FeedError::UpstreamRejected(status.as_u16()));
        }

        let page: MoviePage = response.json().await?;

        tracing::debug!(
            path = %path,
            page = page.page,
            results = page.results.len(),
            total_pages = page.total_pages,
            "TMDB page fetched"
        );

        Ok(page)
    }

    /// Translates discover criteria into TMDB query parameters
    ///
    /// Genre identifiers are pipe-joined for OR semantics; year bounds map to
    /// primary release date bounds; provider constraints require a region and
    /// fall back to the gateway default.
    fn criteria_params(&self, criteria: &DiscoverCriteria) -> Vec<(String, String)> {
        let mut params = Vec::new();

        let sort = criteria.sort_by.unwrap_or_default();
        params.push(("sort_by".to_string(), sort.as_str().to_string()));
        params.push(("include_adult".to_string(), "false".to_string()));

        if let Some(min_rating) = criteria.min_rating {
            params.push(("vote_average.gte".to_string(), min_rating.to_string()));
        }
        if let Some(year) = criteria.year_from {
            params.push((
                "primary_release_date.gte".to_string(),
                format!("{}-01-01", year),
            ));
        }
        if let Some(year) = criteria.year_to {
            params.push((
                "primary_release_date.lte".to_string(),
                format!("{}-12-31", year),
            ));
        }
        if !criteria.genres.is_empty() {
            let joined = criteria
                .genres
                .iter()
                .map(|g| g.to_string())
                .collect::<Vec<_>>()
                .join("|");
            params.push(("with_genres".to_string(), joined));
        }
        if !criteria.providers.is_empty() {
            let joined = criteria
                .providers
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join("|");
            params.push(("with_watch_providers".to_string(), joined));
            let region = criteria
                .watch_region
                .clone()
                .unwrap_or_else(|| self.watch_region.clone());
            params.push(("watch_region".to_string(), region));
        }
        if let Some(min) = criteria.runtime_min {
            params.push(("with_runtime.gte".to_string(), min.to_string()));
        }
        if let Some(max) = criteria.runtime_max {
            params.push(("with_runtime.lte".to_string(), max.to_string()));
        }
        if let Some(cast_id) = criteria.cast_id {
            params.push(("with_cast".to_string(), cast_id.to_string()));
        }
        if let Some(crew_id) = criteria.crew_id {
            params.push(("with_crew".to_string(), crew_id.to_string()));
        }

        params
    }

    /// Picks the best person match for a role hint
    ///
    /// Prefers the first result whose known-for department matches the hint,
    /// falling back to the first result overall.
    fn pick_person(results: &[PersonResult], role: PersonRole) -> Option<u64> {
        let department = match role {
            PersonRole::Actor => "Acting",
            PersonRole::Director => "Directing",
        };

        results
            .iter()
            .find(|r| r.known_for_department.as_deref() == Some(department))
            .or_else(|| results.first())
            .map(|r| r.id)
    }
}

#[async_trait::async_trait]
impl CatalogGateway for TmdbGateway {
    async fn fetch_popular(&self, page: u32) -> FeedResult<MoviePage> {
        self.get_page("/movie/popular", &[("page".to_string(), page.to_string())])
            .await
    }

    async fn fetch_trending(&self, page: u32) -> FeedResult<MoviePage> {
        self.get_page(
            "/trending/movie/day",
            &[("page".to_string(), page.to_string())],
        )
        .await
    }

    async fn fetch_discover(&self, page: u32, sort: SortKey) -> FeedResult<MoviePage> {
        self.get_page(
            "/discover/movie",
            &[
                ("page".to_string(), page.to_string()),
                ("sort_by".to_string(), sort.as_str().to_string()),
                ("include_adult".to_string(), "false".to_string()),
            ],
        )
        .await
    }

    async fn fetch_filtered(
        &self,
        page: u32,
        criteria: &DiscoverCriteria,
    ) -> FeedResult<MoviePage> {
        let mut params = self.criteria_params(criteria);
        params.push(("page".to_string(), page.to_string()));
        self.get_page("/discover/movie", &params).await
    }

    async fn search(&self, query: &str, page: u32) -> FeedResult<MoviePage> {
        self.get_page(
            "/search/movie",
            &[
                ("query".to_string(), query.to_string()),
                ("page".to_string(), page.to_string()),
            ],
        )
        .await
    }

    async fn resolve_person(&self, name: &str, role: PersonRole) -> FeedResult<Option<u64>> {
        let url = format!("{}/search/person", self.api_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("query", name)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FeedError::UpstreamRejected(response.status().as_u16()));
        }

        let search: PersonSearchResponse = response.json().await?;
        let id = Self::pick_person(&search.results, role);

        tracing::debug!(name = %name, resolved = ?id, "Person lookup");

        Ok(id)
    }
}

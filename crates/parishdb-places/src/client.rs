//! HTTP client for the place-search API.
//!
//! Wraps `reqwest` with typed status handling, API key management, retry with
//! backoff, and the rate-limit delays the API's quota rules require. All
//! endpoints check the `"status"` field in the JSON envelope before touching
//! the payload.

use std::time::Duration;

use reqwest::{Client, Url};

use parishdb_core::Candidate;

use crate::error::PlacesError;
use crate::retry::retry_with_backoff;
use crate::types::{DetailResponse, PlaceDetail, SearchPage, SearchResponse};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place/";

/// Fields requested from the details endpoint. Kept to the columns the
/// catalog stores; every extra field is billed.
const DETAIL_FIELDS: &str = "place_id,name,formatted_address,geometry,\
formatted_phone_number,international_phone_number,website,rating,\
user_ratings_total,address_components,types,business_status,url";

/// Tuning knobs for pagination, rate limiting, and retry.
///
/// Production values follow the API's documented timing: a next-page token
/// needs a warm-up of a few seconds, detail fetches are spaced 200 ms apart,
/// and page depth is capped to bound quota cost per query string. Tests zero
/// the delays.
#[derive(Debug, Clone, Copy)]
pub struct PlacesConfig {
    /// Additional attempts after the first failure for retriable errors.
    pub max_retries: u32,
    /// Base delay for exponential backoff between retries.
    pub backoff_base_ms: u64,
    /// Delay between successive result pages of one query.
    pub page_delay_ms: u64,
    /// Delay observed by callers between detail fetches (see
    /// [`PlacesClient::detail_delay`]).
    pub detail_delay_ms: u64,
    /// Maximum pages fetched per query string.
    pub max_pages: usize,
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base_ms: 1_000,
            page_delay_ms: 2_000,
            detail_delay_ms: 200,
            max_pages: 5,
        }
    }
}

/// Client for the place-search API.
///
/// Use [`PlacesClient::new`] for production or
/// [`PlacesClient::with_base_url`] to point at a mock server in tests.
pub struct PlacesClient {
    client: Client,
    api_key: String,
    base_url: Url,
    config: PlacesConfig,
}

impl PlacesClient {
    /// Creates a new client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        config: PlacesConfig,
    ) -> Result<Self, PlacesError> {
        Self::with_base_url(api_key, timeout_secs, user_agent, config, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`PlacesError::ApiError`] if `base_url` is
    /// not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        config: PlacesConfig,
        base_url: &str,
    ) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Normalise: ensure the base URL ends with exactly one slash so that
        // joined paths land under it rather than replacing the last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| PlacesError::ApiError(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            config,
        })
    }

    /// The delay callers should observe between detail fetches.
    #[must_use]
    pub fn detail_delay(&self) -> Duration {
        Duration::from_millis(self.config.detail_delay_ms)
    }

    /// Fetches one page of text-search results.
    ///
    /// Pass `page_token: None` for the first page and the token from the
    /// previous [`SearchPage`] afterwards. A token used before its warm-up
    /// period elapses surfaces as the transient [`PlacesError::TokenNotReady`]
    /// and is retried with backoff internally.
    ///
    /// `ZERO_RESULTS` is a successful empty page, not an error.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::ApiError`] on a permanent error status.
    /// - [`PlacesError::OverQuota`] if retries were exhausted while throttled.
    /// - [`PlacesError::Http`] on network failure or non-2xx HTTP status.
    /// - [`PlacesError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn text_search(
        &self,
        query: &str,
        page_token: Option<&str>,
    ) -> Result<SearchPage, PlacesError> {
        retry_with_backoff(self.config.max_retries, self.config.backoff_base_ms, || {
            self.text_search_once(query, page_token)
        })
        .await
    }

    async fn text_search_once(
        &self,
        query: &str,
        page_token: Option<&str>,
    ) -> Result<SearchPage, PlacesError> {
        let params: Vec<(&str, &str)> = match page_token {
            // With a token, the API ignores the query string entirely.
            Some(token) => vec![("pagetoken", token)],
            None => vec![("query", query)],
        };
        let url = self.build_url("textsearch/json", &params)?;
        let body = self.request_json(&url).await?;

        let envelope: SearchResponse =
            serde_json::from_value(body).map_err(|e| PlacesError::Deserialize {
                context: format!("textsearch(query={query})"),
                source: e,
            })?;

        match envelope.status.as_str() {
            "OK" => Ok(SearchPage {
                candidates: envelope.results.into_iter().map(Candidate::from).collect(),
                next_page_token: envelope.next_page_token,
            }),
            // Terminal, not an error: the query simply matched nothing.
            "ZERO_RESULTS" => Ok(SearchPage {
                candidates: Vec::new(),
                next_page_token: None,
            }),
            // INVALID_REQUEST on a paginated request means the token has not
            // warmed up yet; on a fresh query it is a real caller bug.
            "INVALID_REQUEST" if page_token.is_some() => Err(PlacesError::TokenNotReady),
            "OVER_QUERY_LIMIT" => Err(PlacesError::OverQuota(
                envelope.error_message.unwrap_or_default(),
            )),
            other => Err(PlacesError::ApiError(format!(
                "{other}: {}",
                envelope.error_message.unwrap_or_default()
            ))),
        }
    }

    /// Fetches all result pages for one query string, up to the configured
    /// page bound.
    ///
    /// Follows `next_page_token` until the API stops returning one or
    /// `max_pages` pages have been requested, sleeping `page_delay_ms`
    /// between page transitions. Candidates from all pages are concatenated
    /// in order.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::text_search`]. Already-fetched pages
    /// are discarded on failure; the engine treats a failed query as yielding
    /// no candidates rather than a partial list.
    pub async fn search_all_pages(&self, query: &str) -> Result<Vec<Candidate>, PlacesError> {
        let mut all: Vec<Candidate> = Vec::new();
        let mut token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            pages += 1;
            let page = self.text_search(query, token.as_deref()).await?;
            all.extend(page.candidates);

            token = page.next_page_token;
            if token.is_none() || pages >= self.config.max_pages {
                break;
            }
            if self.config.page_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.config.page_delay_ms)).await;
            }
        }

        Ok(all)
    }

    /// Fetches full structured detail for one place.
    ///
    /// Returns `Ok(None)` when the place no longer exists (`NOT_FOUND` /
    /// `ZERO_RESULTS`) — the candidate is silently dropped upstream.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::ApiError`] on a permanent error status.
    /// - [`PlacesError::OverQuota`] if retries were exhausted while throttled.
    /// - [`PlacesError::Http`] on network failure or non-2xx HTTP status.
    /// - [`PlacesError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn place_details(&self, place_id: &str) -> Result<Option<PlaceDetail>, PlacesError> {
        retry_with_backoff(self.config.max_retries, self.config.backoff_base_ms, || {
            self.place_details_once(place_id)
        })
        .await
    }

    async fn place_details_once(&self, place_id: &str) -> Result<Option<PlaceDetail>, PlacesError> {
        let url = self.build_url(
            "details/json",
            &[("place_id", place_id), ("fields", DETAIL_FIELDS)],
        )?;
        let body = self.request_json(&url).await?;

        let envelope: DetailResponse =
            serde_json::from_value(body).map_err(|e| PlacesError::Deserialize {
                context: format!("details(place_id={place_id})"),
                source: e,
            })?;

        match envelope.status.as_str() {
            "OK" => Ok(envelope.result),
            "NOT_FOUND" | "ZERO_RESULTS" => Ok(None),
            "OVER_QUERY_LIMIT" => Err(PlacesError::OverQuota(
                envelope.error_message.unwrap_or_default(),
            )),
            other => Err(PlacesError::ApiError(format!(
                "{other}: {}",
                envelope.error_message.unwrap_or_default()
            ))),
        }
    }

    /// Builds the full request URL with properly percent-encoded query
    /// parameters, appending the API key.
    fn build_url(&self, path: &str, extra: &[(&str, &str)]) -> Result<Url, PlacesError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| PlacesError::ApiError(format!("invalid endpoint path '{path}': {e}")))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("key", &self.api_key);
        }
        Ok(url)
    }

    /// Sends a GET request, asserts a 2xx HTTP status, and parses the
    /// response body as JSON.
    async fn request_json(&self, url: &Url) -> Result<serde_json::Value, PlacesError> {
        let response = self.client.get(url.clone()).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
            context: url.path().to_owned(),
            source: e,
        })
    }
}

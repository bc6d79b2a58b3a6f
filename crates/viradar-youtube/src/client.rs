//! HTTP client for the YouTube Data API v3.
//!
//! Wraps `reqwest` with API-key management and typed response
//! deserialization. One logical search page costs two upstream requests:
//! `search` for ids and pagination tokens, then `videos` for statistics and
//! content details. Subscriber counts come from a single batched
//! `channels` request per page.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use chrono::{DateTime, NaiveDate};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use viradar_core::search::{FetchError, PagedSearchClient};
use viradar_core::types::{
    DurationBucket, PageItem, Platform, SearchConfig, SearchOrder, SearchPage,
};

use crate::duration::parse_duration_secs;
use crate::types::{ChannelListResponse, SearchListResponse, Video, VideoListResponse};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3/";

/// Largest `maxResults` the search endpoint accepts.
const MAX_PAGE_SIZE: u32 = 50;

/// Client for the YouTube Data API v3.
///
/// Use [`YouTubeClient::new`] for production or
/// [`YouTubeClient::with_base_url`] to point at a mock server in tests.
pub struct YouTubeClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl YouTubeClient {
    /// Creates a new client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, FetchError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`FetchError::Api`] if `base_url` is not a
    /// valid URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("viradar/0.1 (viral-content-discovery)")
            .build()
            .map_err(FetchError::transport)?;

        // Normalise: a trailing slash makes Url::join append the endpoint
        // path instead of replacing the last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| FetchError::Api(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
        })
    }

    /// Builds the full endpoint URL with the API key and percent-encoded
    /// query parameters.
    fn endpoint_url(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Url, FetchError> {
        let mut url = self
            .base_url
            .join(endpoint)
            .map_err(|e| FetchError::Api(format!("invalid endpoint '{endpoint}': {e}")))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("key", &self.api_key);
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// Sends a GET request, asserts a 2xx HTTP status, and parses the body.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] on network failure or a non-2xx
    /// status, [`FetchError::Deserialize`] if the body does not match `T`.
    async fn request_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        context: &str,
    ) -> Result<T, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(FetchError::transport)?;
        let response = response.error_for_status().map_err(FetchError::transport)?;
        let body = response.text().await.map_err(FetchError::transport)?;
        serde_json::from_str(&body).map_err(|e| FetchError::deserialize(context, e))
    }
}

impl PagedSearchClient for YouTubeClient {
    fn platform(&self) -> Platform {
        Platform::YouTube
    }

    fn max_page_size(&self) -> u32 {
        MAX_PAGE_SIZE
    }

    fn lookup_cost(&self, unique_keys: usize) -> u64 {
        // channels.list resolves up to 50 ids in one call.
        u64::from(unique_keys > 0)
    }

    async fn search_page(
        &self,
        config: &SearchConfig,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<SearchPage, FetchError> {
        let max_results = page_size.min(MAX_PAGE_SIZE).to_string();
        let mut params = vec![
            ("part", "id,snippet"),
            ("type", "video"),
            ("q", config.query.as_str()),
            ("maxResults", max_results.as_str()),
            ("order", order_param(config.order)),
            ("videoDuration", duration_param(config.duration)),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        let url = self.endpoint_url("search", &params)?;
        let search: SearchListResponse = self.request_json(&url, "search").await?;

        let ids: Vec<String> = search
            .items
            .into_iter()
            .filter_map(|result| result.id.video_id)
            .collect();
        if ids.is_empty() {
            return Ok(SearchPage::default());
        }

        let joined = ids.join(",");
        let url = self.endpoint_url(
            "videos",
            &[("part", "snippet,statistics,contentDetails"), ("id", &joined)],
        )?;
        let videos: VideoListResponse = self.request_json(&url, "videos").await?;

        Ok(SearchPage {
            items: videos.items.into_iter().map(map_video).collect(),
            next_token: search.next_page_token,
            prev_token: search.prev_page_token,
        })
    }

    async fn resolve_follower_counts(
        &self,
        keys: &BTreeSet<String>,
    ) -> Result<BTreeMap<String, u64>, FetchError> {
        if keys.is_empty() {
            return Ok(BTreeMap::new());
        }

        let joined = keys.iter().cloned().collect::<Vec<_>>().join(",");
        let url = self.endpoint_url("channels", &[("part", "statistics"), ("id", &joined)])?;
        let channels: ChannelListResponse = self.request_json(&url, "channels").await?;

        let mut counts = BTreeMap::new();
        for channel in channels.items {
            // Hidden subscriber counts arrive as an absent field; floor to 1
            // so the score ratio stays defined.
            let subscribers = parse_count(channel.statistics.subscriber_count.as_deref()).max(1);
            counts.insert(channel.id, subscribers);
        }
        Ok(counts)
    }
}

fn order_param(order: SearchOrder) -> &'static str {
    match order {
        SearchOrder::Relevance => "relevance",
        SearchOrder::Date => "date",
        SearchOrder::ViewCount => "viewCount",
        SearchOrder::Rating => "rating",
    }
}

fn duration_param(duration: DurationBucket) -> &'static str {
    match duration {
        DurationBucket::Any => "any",
        DurationBucket::Short => "short",
        DurationBucket::Medium => "medium",
        DurationBucket::Long => "long",
    }
}

/// Parses a decimal-string count, defaulting missing or malformed values to 0.
fn parse_count(value: Option<&str>) -> u64 {
    value.and_then(|v| v.parse().ok()).unwrap_or(0)
}

/// Maps one `videos.list` item to the normalized page shape.
///
/// Malformed fields degrade instead of dropping the item: an unparsable
/// duration becomes 0 seconds, an unparsable publish date becomes the epoch
/// date, missing counts become 0.
fn map_video(video: Video) -> PageItem {
    let snippet = video.snippet;
    let published = DateTime::parse_from_rfc3339(&snippet.published_at)
        .map(|dt| dt.date_naive())
        .unwrap_or_else(|e| {
            tracing::warn!(
                video_id = %video.id,
                raw = %snippet.published_at,
                error = %e,
                "unparsable publishedAt, defaulting to epoch"
            );
            NaiveDate::default()
        });

    let duration_secs = Some(
        video
            .content_details
            .duration
            .as_deref()
            .and_then(parse_duration_secs)
            .unwrap_or(0),
    );

    let link = format!("https://www.youtube.com/watch?v={}", video.id);
    let thumbnail_url = snippet
        .thumbnails
        .high
        .map(|t| t.url)
        .unwrap_or_default();

    PageItem {
        id: video.id,
        title: snippet.title,
        author: snippet.channel_title,
        author_key: snippet.channel_id,
        thumbnail_url,
        link,
        views: parse_count(video.statistics.view_count.as_deref()),
        likes: parse_count(video.statistics.like_count.as_deref()),
        comments: video
            .statistics
            .comment_count
            .as_deref()
            .and_then(|v| v.parse().ok()),
        published,
        duration_secs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> YouTubeClient {
        YouTubeClient::with_base_url("test-key", 30, base_url)
            .expect("client construction should not fail")
    }

    #[test]
    fn endpoint_url_appends_key_and_params() {
        let client = test_client("https://www.googleapis.com/youtube/v3");
        let url = client
            .endpoint_url("search", &[("q", "ai"), ("type", "video")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/youtube/v3/search?key=test-key&q=ai&type=video"
        );
    }

    #[test]
    fn endpoint_url_encodes_special_characters() {
        let client = test_client("https://www.googleapis.com/youtube/v3");
        let url = client.endpoint_url("search", &[("q", "ai & ml")]).unwrap();
        assert!(
            url.as_str().contains("ai+%26+ml") || url.as_str().contains("ai%20%26%20ml"),
            "query param should be percent-encoded: {url}"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = YouTubeClient::with_base_url("k", 30, "not a url");
        assert!(matches!(result, Err(FetchError::Api(_))));
    }

    #[test]
    fn parse_count_defaults_to_zero() {
        assert_eq!(parse_count(Some("123")), 123);
        assert_eq!(parse_count(Some("oops")), 0);
        assert_eq!(parse_count(None), 0);
    }

    #[test]
    fn order_and_duration_params_match_api_values() {
        assert_eq!(order_param(SearchOrder::ViewCount), "viewCount");
        assert_eq!(order_param(SearchOrder::Relevance), "relevance");
        assert_eq!(duration_param(DurationBucket::Any), "any");
        assert_eq!(duration_param(DurationBucket::Medium), "medium");
    }

    #[test]
    fn lookup_cost_is_one_batched_call() {
        let client = test_client("https://www.googleapis.com/youtube/v3");
        assert_eq!(client.lookup_cost(0), 0);
        assert_eq!(client.lookup_cost(1), 1);
        assert_eq!(client.lookup_cost(37), 1);
    }
}

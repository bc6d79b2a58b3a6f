//! HTTP client for TikTok search via the RapidAPI `tiktok-scraper7` service.
//!
//! One search page is one `feed/search` request; follower counts come from
//! the single-key `user/info` endpoint, so a page's batched lookup costs one
//! unit per distinct author.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use chrono::{DateTime, NaiveDate};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use viradar_core::search::{FetchError, PagedSearchClient};
use viradar_core::types::{PageItem, Platform, SearchConfig, SearchPage};

use crate::types::{Envelope, RawVideo, SearchData, UserInfoData};

const DEFAULT_BASE_URL: &str = "https://tiktok-scraper7.p.rapidapi.com/";
const RAPIDAPI_HOST: &str = "tiktok-scraper7.p.rapidapi.com";

/// Largest `count` the feed/search endpoint accepts.
const MAX_PAGE_SIZE: u32 = 30;

/// TikTok covers reject hotlinked requests with 403; the original thumbnail
/// URL is routed through the wsrv.nl image proxy instead.
const THUMBNAIL_PROXY: &str = "https://wsrv.nl/";
const FALLBACK_THUMBNAIL: &str = "https://picsum.photos/300/500";

/// Client for the `tiktok-scraper7` RapidAPI service.
///
/// Use [`TikTokClient::new`] for production or
/// [`TikTokClient::with_base_url`] to point at a mock server in tests.
pub struct TikTokClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl TikTokClient {
    /// Creates a new client pointed at the production RapidAPI host.
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

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| FetchError::Api(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
        })
    }

    fn endpoint_url(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Url, FetchError> {
        let mut url = self
            .base_url
            .join(endpoint)
            .map_err(|e| FetchError::Api(format!("invalid endpoint '{endpoint}': {e}")))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// Sends a GET with the RapidAPI auth headers, asserts 2xx, parses the
    /// `{code, msg, data}` envelope, and surfaces `code != 0` as an API error.
    async fn request_envelope<T: DeserializeOwned>(
        &self,
        url: &Url,
        context: &str,
    ) -> Result<T, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", RAPIDAPI_HOST)
            .send()
            .await
            .map_err(FetchError::transport)?;
        let response = response.error_for_status().map_err(FetchError::transport)?;
        let body = response.text().await.map_err(FetchError::transport)?;

        let envelope: Envelope<T> =
            serde_json::from_str(&body).map_err(|e| FetchError::deserialize(context, e))?;
        if envelope.code != 0 {
            return Err(FetchError::Api(format!(
                "{context}: code {} ({})",
                envelope.code,
                envelope.msg.as_deref().unwrap_or("no message")
            )));
        }
        envelope
            .data
            .ok_or_else(|| FetchError::Api(format!("{context}: missing data field")))
    }
}

impl PagedSearchClient for TikTokClient {
    fn platform(&self) -> Platform {
        Platform::TikTok
    }

    fn max_page_size(&self) -> u32 {
        MAX_PAGE_SIZE
    }

    fn lookup_cost(&self, unique_keys: usize) -> u64 {
        // user/info is single-key, so each distinct author is one call.
        u64::try_from(unique_keys).unwrap_or(u64::MAX)
    }

    async fn search_page(
        &self,
        config: &SearchConfig,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<SearchPage, FetchError> {
        let keywords = ensure_hashtag(&config.query);
        let count = page_size.min(MAX_PAGE_SIZE).to_string();
        // The scraper has no order/duration filters; everything maps to its
        // default relevance sort and the duration bucket is applied upstream
        // only on YouTube.
        let mut params = vec![
            ("keywords", keywords.as_str()),
            ("count", count.as_str()),
            ("region", "us"),
            ("publish_time", "0"),
            ("sort_type", "0"),
        ];
        if let Some(token) = page_token {
            params.push(("cursor", token));
        }

        let url = self.endpoint_url("feed/search", &params)?;
        let data: SearchData = self.request_envelope(&url, "feed/search").await?;

        let next_token = data.has_more.then(|| data.cursor.to_string());
        Ok(SearchPage {
            items: data.videos.into_iter().map(map_raw_video).collect(),
            next_token,
            // The scraper paginates forward only.
            prev_token: None,
        })
    }

    async fn resolve_follower_counts(
        &self,
        keys: &BTreeSet<String>,
    ) -> Result<BTreeMap<String, u64>, FetchError> {
        let mut counts = BTreeMap::new();
        for key in keys {
            if key.is_empty() {
                continue;
            }
            let url = self.endpoint_url("user/info", &[("unique_id", key.as_str())])?;
            match self.request_envelope::<UserInfoData>(&url, "user/info").await {
                Ok(data) => {
                    let followers = data.stats.map_or(1, |s| s.follower_count).max(1);
                    counts.insert(key.clone(), followers);
                }
                // Per-key failures are recovered locally; the aggregator
                // defaults absent keys to 1.
                Err(e) => {
                    tracing::warn!(unique_id = %key, error = %e, "user/info lookup failed");
                }
            }
        }
        Ok(counts)
    }
}

/// Prefixes the query with `#` unless it already carries one.
fn ensure_hashtag(query: &str) -> String {
    if query.starts_with('#') {
        query.to_owned()
    } else {
        format!("#{query}")
    }
}

/// Wraps a raw cover URL in the wsrv.nl proxy, sized for card display.
fn proxy_thumbnail(raw: &str) -> String {
    let encoded = utf8_percent_encode(raw, NON_ALPHANUMERIC);
    format!("{THUMBNAIL_PROXY}?url={encoded}&w=300&h=500&fit=cover")
}

fn map_raw_video(video: RawVideo) -> PageItem {
    let author = video.author.unwrap_or_default();
    let published = DateTime::from_timestamp(video.create_time, 0)
        .map_or_else(NaiveDate::default, |dt| dt.date_naive());

    // Animated covers render best; fall back through the static variants.
    let thumbnail_url = video
        .ai_dynamic_cover
        .or(video.origin_cover)
        .or(video.cover)
        .as_deref()
        .map_or_else(|| FALLBACK_THUMBNAIL.to_owned(), proxy_thumbnail);

    let link = format!(
        "https://www.tiktok.com/@{}/video/{}",
        author.unique_id, video.video_id
    );

    PageItem {
        id: video.video_id,
        title: video.title.unwrap_or_else(|| "No Title".to_owned()),
        author: author.nickname.unwrap_or_else(|| "Unknown".to_owned()),
        author_key: author.unique_id,
        thumbnail_url,
        link,
        views: video.play_count,
        likes: video.digg_count,
        comments: video.comment_count,
        published,
        duration_secs: video.duration,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_hashtag_prefixes_once() {
        assert_eq!(ensure_hashtag("saas"), "#saas");
        assert_eq!(ensure_hashtag("#saas"), "#saas");
    }

    #[test]
    fn proxy_thumbnail_encodes_raw_url() {
        let proxied = proxy_thumbnail("https://p16.tiktokcdn.com/img/c.jpg?x=1");
        assert!(proxied.starts_with("https://wsrv.nl/?url=https%3A%2F%2F"));
        assert!(proxied.ends_with("&w=300&h=500&fit=cover"));
        assert!(!proxied.contains("c.jpg?x=1"), "raw query must be encoded");
    }

    #[test]
    fn map_raw_video_builds_canonical_link() {
        let video = RawVideo {
            video_id: "7123".to_owned(),
            title: Some("hi".to_owned()),
            play_count: 10,
            digg_count: 2,
            comment_count: None,
            create_time: 1_755_000_000,
            duration: Some(15),
            author: Some(crate::types::RawAuthor {
                unique_id: "creator1".to_owned(),
                nickname: Some("Creator".to_owned()),
            }),
            ai_dynamic_cover: None,
            origin_cover: None,
            cover: None,
        };
        let item = map_raw_video(video);
        assert_eq!(item.link, "https://www.tiktok.com/@creator1/video/7123");
        assert_eq!(item.thumbnail_url, FALLBACK_THUMBNAIL);
        assert_eq!(item.author_key, "creator1");
        assert_eq!(item.published.to_string(), "2025-08-12");
    }

    #[test]
    fn map_raw_video_defaults_missing_author_and_title() {
        let video = RawVideo {
            video_id: "1".to_owned(),
            title: None,
            play_count: 0,
            digg_count: 0,
            comment_count: None,
            create_time: 0,
            duration: None,
            author: None,
            ai_dynamic_cover: None,
            origin_cover: None,
            cover: None,
        };
        let item = map_raw_video(video);
        assert_eq!(item.title, "No Title");
        assert_eq!(item.author, "Unknown");
        assert!(item.author_key.is_empty());
        assert_eq!(item.published, NaiveDate::default());
    }
}

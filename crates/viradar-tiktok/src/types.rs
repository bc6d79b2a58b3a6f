//! Response types for the RapidAPI `tiktok-scraper7` endpoints.
//!
//! Every response carries a `{code, msg, data}` envelope; `code != 0` is an
//! API-level error even on HTTP 200.

use serde::Deserialize;

/// Envelope wrapping every scraper response.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub code: i64,
    #[serde(default)]
    pub msg: Option<String>,
    pub data: Option<T>,
}

// ---------------------------------------------------------------------------
// feed/search
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchData {
    #[serde(default)]
    pub videos: Vec<RawVideo>,
    #[serde(default)]
    pub cursor: u64,
    #[serde(rename = "hasMore", default)]
    pub has_more: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawVideo {
    #[serde(default)]
    pub video_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub play_count: u64,
    #[serde(default)]
    pub digg_count: u64,
    #[serde(default)]
    pub comment_count: Option<u64>,
    /// Unix timestamp in seconds.
    #[serde(default)]
    pub create_time: i64,
    /// Seconds; 0 when the scraper omits it.
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub author: Option<RawAuthor>,
    #[serde(default)]
    pub ai_dynamic_cover: Option<String>,
    #[serde(default)]
    pub origin_cover: Option<String>,
    #[serde(default)]
    pub cover: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawAuthor {
    #[serde(default)]
    pub unique_id: String,
    #[serde(default)]
    pub nickname: Option<String>,
}

// ---------------------------------------------------------------------------
// user/info
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct UserInfoData {
    #[serde(default)]
    pub stats: Option<UserStats>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserStats {
    #[serde(rename = "followerCount", default)]
    pub follower_count: u64,
}

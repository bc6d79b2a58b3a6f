//! Shared domain types for viral content discovery.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::scorer::{viral_score, ScoreLadder, ViralityLabel};

/// Upstream content platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    YouTube,
    TikTok,
}

impl Platform {
    /// Classification ladder applied to this platform's scores.
    ///
    /// TikTok's feed pushes content well past small followings, so it uses
    /// the conservative ladder; YouTube uses the strict one.
    #[must_use]
    pub fn ladder(self) -> ScoreLadder {
        match self {
            Platform::YouTube => ScoreLadder::Strict,
            Platform::TikTok => ScoreLadder::Conservative,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::YouTube => write!(f, "youtube"),
            Platform::TikTok => write!(f, "tiktok"),
        }
    }
}

/// Video format classification derived from duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoType {
    Short,
    LongForm,
}

impl VideoType {
    /// Videos under 60 seconds count as shorts.
    #[must_use]
    pub fn from_duration_secs(secs: u64) -> Self {
        if secs < 60 {
            VideoType::Short
        } else {
            VideoType::LongForm
        }
    }
}

/// Upstream result ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchOrder {
    #[default]
    Relevance,
    Date,
    ViewCount,
    Rating,
}

/// Duration filter passed through to the upstream search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationBucket {
    #[default]
    Any,
    Short,
    Medium,
    Long,
}

/// Immutable per-request search parameters.
///
/// Constructed once per invocation and passed by value into the aggregator;
/// the aggregator reads no ambient request context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub query: String,
    pub order: SearchOrder,
    pub duration: DurationBucket,
    /// Items with fewer views are dropped.
    pub min_views: u64,
    /// Items whose author has fewer followers/subscribers are dropped.
    pub min_followers: u64,
    /// Stop once this many filtered items have been accumulated.
    pub target_results: usize,
    /// Hard ceiling on upstream search-page calls for one aggregation run.
    pub max_api_calls: u32,
    /// Continuation token to resume from, if any.
    pub page_token: Option<String>,
    /// Optional recency predicate: drop items published more than this many
    /// days ago. Disabled by default.
    pub max_age_days: Option<u32>,
}

impl SearchConfig {
    /// A config with the given query and default filters: relevance order,
    /// any duration, no view/follower floors, 25 results in at most 5 calls.
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        SearchConfig {
            query: query.into(),
            order: SearchOrder::default(),
            duration: DurationBucket::default(),
            min_views: 0,
            min_followers: 0,
            target_results: 25,
            max_api_calls: 5,
            page_token: None,
            max_age_days: None,
        }
    }
}

/// One raw item from an upstream search page, normalized by the platform
/// client but not yet enriched with a follower count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageItem {
    /// Platform-scoped video id.
    pub id: String,
    pub title: String,
    /// Author display name.
    pub author: String,
    /// Grouping key for the batched follower lookup (channel id on YouTube,
    /// `unique_id` on TikTok).
    pub author_key: String,
    pub thumbnail_url: String,
    /// Canonical watch link.
    pub link: String,
    pub views: u64,
    pub likes: u64,
    pub comments: Option<u64>,
    pub published: NaiveDate,
    /// Missing when the upstream does not report duration.
    pub duration_secs: Option<u64>,
}

/// One page of normalized search results plus continuation tokens.
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub items: Vec<PageItem>,
    pub next_token: Option<String>,
    pub prev_token: Option<String>,
}

/// A fully enriched, scored content item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub title: String,
    pub author: String,
    pub author_key: String,
    pub thumbnail_url: String,
    pub link: String,
    pub views: u64,
    /// Always >= 1; zero is floored at construction so the score ratio
    /// cannot collapse.
    pub followers: u64,
    pub likes: u64,
    pub comments: Option<u64>,
    pub viral_score: f64,
    pub virality_label: ViralityLabel,
    pub published: NaiveDate,
    pub duration_secs: Option<u64>,
    pub video_type: Option<VideoType>,
    /// Query or hashtag that surfaced this item.
    pub query: String,
}

impl ContentItem {
    /// Enrich a page item with its author's follower count and score it.
    ///
    /// `followers == 0` is floored to 1 here; the invariant `followers >= 1`
    /// holds for every constructed item.
    #[must_use]
    pub fn from_page_item(
        item: PageItem,
        followers: u64,
        query: &str,
        ladder: ScoreLadder,
    ) -> Self {
        let followers = followers.max(1);
        let score = viral_score(item.views, followers);
        ContentItem {
            id: item.id,
            title: item.title,
            author: item.author,
            author_key: item.author_key,
            thumbnail_url: item.thumbnail_url,
            link: item.link,
            views: item.views,
            followers,
            likes: item.likes,
            comments: item.comments,
            viral_score: score,
            virality_label: ladder.classify(score),
            published: item.published,
            duration_secs: item.duration_secs,
            video_type: item.duration_secs.map(VideoType::from_duration_secs),
            query: query.to_owned(),
        }
    }
}

//! YouTube Data API v3 response types.
//!
//! Explicit schemas for the three endpoints the client touches: `search`,
//! `videos`, and `channels`. Count fields arrive as decimal strings and are
//! parsed leniently at the mapping layer; a missing or malformed count
//! defaults rather than failing the item.

use serde::Deserialize;

// ---------------------------------------------------------------------------
// search.list
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchListResponse {
    #[serde(default)]
    pub items: Vec<SearchResult>,
    #[serde(default)]
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub prev_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResult {
    pub id: SearchResultId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchResultId {
    /// Absent for channel/playlist results; the client requests
    /// `type=video` so this should always be present.
    #[serde(default)]
    pub video_id: Option<String>,
}

// ---------------------------------------------------------------------------
// videos.list
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<Video>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Video {
    pub id: String,
    pub snippet: VideoSnippet,
    #[serde(default)]
    pub statistics: VideoStatistics,
    #[serde(default)]
    pub content_details: ContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VideoSnippet {
    pub channel_id: String,
    pub title: String,
    pub channel_title: String,
    pub published_at: String,
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Thumbnails {
    #[serde(default)]
    pub high: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Thumbnail {
    pub url: String,
}

/// All counts are decimal strings in the API; `likeCount` and
/// `commentCount` are omitted when the uploader hides them.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VideoStatistics {
    #[serde(default)]
    pub view_count: Option<String>,
    #[serde(default)]
    pub like_count: Option<String>,
    #[serde(default)]
    pub comment_count: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ContentDetails {
    /// ISO-8601 duration, e.g. `PT4M13S`.
    #[serde(default)]
    pub duration: Option<String>,
}

// ---------------------------------------------------------------------------
// channels.list
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct ChannelListResponse {
    #[serde(default)]
    pub items: Vec<Channel>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Channel {
    pub id: String,
    #[serde(default)]
    pub statistics: ChannelStatistics,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChannelStatistics {
    /// Absent when `hiddenSubscriberCount` is set.
    #[serde(default)]
    pub subscriber_count: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_search_response_with_tokens() {
        let json = r#"{
            "items": [
                { "id": { "kind": "youtube#video", "videoId": "abc123" } },
                { "id": { "kind": "youtube#channel" } }
            ],
            "nextPageToken": "CAUQAA",
            "prevPageToken": "CBkQAQ"
        }"#;
        let parsed: SearchListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.items.len(), 2);
        assert_eq!(parsed.items[0].id.video_id.as_deref(), Some("abc123"));
        assert!(parsed.items[1].id.video_id.is_none());
        assert_eq!(parsed.next_page_token.as_deref(), Some("CAUQAA"));
        assert_eq!(parsed.prev_page_token.as_deref(), Some("CBkQAQ"));
    }

    #[test]
    fn deserialize_video_with_hidden_counts() {
        let json = r#"{
            "items": [{
                "id": "abc123",
                "snippet": {
                    "channelId": "UC1",
                    "title": "A video",
                    "channelTitle": "A channel",
                    "publishedAt": "2026-08-01T12:00:00Z",
                    "thumbnails": {}
                },
                "statistics": { "viewCount": "1000" },
                "contentDetails": { "duration": "PT45S" }
            }]
        }"#;
        let parsed: VideoListResponse = serde_json::from_str(json).unwrap();
        let video = &parsed.items[0];
        assert_eq!(video.statistics.view_count.as_deref(), Some("1000"));
        assert!(video.statistics.like_count.is_none());
        assert!(video.snippet.thumbnails.high.is_none());
    }

    #[test]
    fn deserialize_channel_with_hidden_subscribers() {
        let json = r#"{
            "items": [
                { "id": "UC1", "statistics": { "subscriberCount": "5000" } },
                { "id": "UC2", "statistics": { "hiddenSubscriberCount": true } }
            ]
        }"#;
        let parsed: ChannelListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            parsed.items[0].statistics.subscriber_count.as_deref(),
            Some("5000")
        );
        assert!(parsed.items[1].statistics.subscriber_count.is_none());
    }
}

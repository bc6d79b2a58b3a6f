//! Paged-search capability consumed by the aggregator.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::types::{Platform, SearchConfig, SearchPage};

/// Error taxonomy for upstream fetches.
///
/// `Transport` aborts the current aggregation attempt (partial results are
/// preserved); `Api` and `Deserialize` are client-level failures surfaced
/// the same way. Per-item lookup failures never reach this type — clients
/// recover them locally by omitting the key from the follower map.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("upstream API error: {0}")]
    Api(String),

    #[error("deserialize error for {context}: {message}")]
    Deserialize { context: String, message: String },
}

impl FetchError {
    /// Wrap a network/HTTP failure.
    pub fn transport(err: impl std::fmt::Display) -> Self {
        FetchError::Transport(err.to_string())
    }

    /// Wrap a JSON shape mismatch with the endpoint it came from.
    pub fn deserialize(context: impl Into<String>, err: impl std::fmt::Display) -> Self {
        FetchError::Deserialize {
            context: context.into(),
            message: err.to_string(),
        }
    }
}

/// A platform's paged search capability.
///
/// Implementations wrap one upstream API (YouTube Data API, TikTok via
/// RapidAPI) and hand the aggregator normalized [`SearchPage`]s; the
/// aggregator never sees raw platform JSON. Pagination is strictly
/// sequential: each page's continuation token comes from the previous
/// response, so implementations need no internal concurrency.
#[allow(async_fn_in_trait)]
pub trait PagedSearchClient {
    /// Which platform this client queries.
    fn platform(&self) -> Platform;

    /// The largest page the upstream will serve. The aggregator always
    /// requests this size to minimize call count.
    fn max_page_size(&self) -> u32;

    /// Cost units charged for one batched follower lookup over
    /// `unique_keys` distinct authors.
    ///
    /// YouTube resolves all channels in a single `channels.list` call (1
    /// unit); TikTok's `user/info` endpoint is single-key (1 unit per key).
    fn lookup_cost(&self, unique_keys: usize) -> u64;

    /// Fetch one page of search results.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on network failure, an upstream error
    /// response, or an unparseable body.
    async fn search_page(
        &self,
        config: &SearchConfig,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<SearchPage, FetchError>;

    /// Resolve follower/subscriber counts for a set of author keys.
    ///
    /// Keys the upstream cannot resolve are simply absent from the returned
    /// map; the caller defaults them to 1. Implementations should recover
    /// per-key failures locally rather than failing the whole batch.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] only when the batch as a whole cannot be
    /// attempted (e.g., the single batched call fails on YouTube).
    async fn resolve_follower_counts(
        &self,
        keys: &BTreeSet<String>,
    ) -> Result<BTreeMap<String, u64>, FetchError>;
}

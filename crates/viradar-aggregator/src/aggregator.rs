//! Quota-aware, auto-paginating result aggregation.
//!
//! Drives a [`PagedSearchClient`] page by page: each page is enriched with
//! follower counts through one batched lookup, filtered against the view and
//! follower floors, and appended until the target count is reached, the
//! call budget is exhausted, or the upstream runs out of data. Every
//! upstream call is metered in cost units so the caller can charge the run
//! against a daily quota, including runs that return zero items.

use std::collections::BTreeSet;

use chrono::Utc;

use viradar_core::search::PagedSearchClient;
use viradar_core::types::{ContentItem, SearchConfig};

/// Terminal status of one aggregation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregationStatus {
    /// At least one item passed the filter.
    Success,
    /// The run completed but nothing passed the filter (or the upstream was
    /// empty). Not an error.
    NoData,
    /// A search-page fetch failed; the result carries whatever was
    /// accumulated from earlier pages.
    Error(String),
}

impl std::fmt::Display for AggregationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AggregationStatus::Success => write!(f, "success"),
            AggregationStatus::NoData => write!(f, "no matching data"),
            AggregationStatus::Error(detail) => write!(f, "upstream error: {detail}"),
        }
    }
}

/// Output of [`Aggregator::aggregate`].
#[derive(Debug, Clone)]
pub struct AggregationResult {
    /// Filtered items in upstream search order, at most `target_results`.
    /// Consumers re-sort by viral score for display if they want to.
    pub items: Vec<ContentItem>,
    /// Continuation token to resume from where this run stopped.
    pub next_token: Option<String>,
    pub prev_token: Option<String>,
    /// Upstream cost units consumed by this run. Non-zero even when `items`
    /// is empty; quota accounting must see calls that found nothing.
    pub cost_units: u64,
    pub status: AggregationStatus,
}

/// Drives pagination, enrichment, filtering, and cost accounting over one
/// platform client.
pub struct Aggregator<C: PagedSearchClient> {
    client: C,
}

impl<C: PagedSearchClient> Aggregator<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Run one aggregation: fetch pages until `target_results` filtered
    /// items are accumulated or `max_api_calls` search calls have been made.
    ///
    /// Never returns an `Err`: every failure path terminates in a
    /// well-defined [`AggregationResult`]. A transport failure mid-run
    /// yields `Error(detail)` with the items accumulated from earlier pages
    /// and the cost consumed so far.
    pub async fn aggregate(&self, config: &SearchConfig) -> AggregationResult {
        let mut items: Vec<ContentItem> = Vec::new();
        let mut cost_units: u64 = 0;
        let mut calls_made: u32 = 0;
        let mut current_token = config.page_token.clone();
        let mut next_token: Option<String> = None;
        let mut prev_token: Option<String> = None;

        if config.target_results == 0 {
            return AggregationResult {
                items,
                next_token: None,
                prev_token: None,
                cost_units: 0,
                status: AggregationStatus::NoData,
            };
        }

        let ladder = self.client.platform().ladder();
        let page_size = self.client.max_page_size();

        while items.len() < config.target_results && calls_made < config.max_api_calls {
            calls_made += 1;
            cost_units += 1;

            let page = match self
                .client
                .search_page(config, page_size, current_token.as_deref())
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!(
                        platform = %self.client.platform(),
                        query = %config.query,
                        call = calls_made,
                        error = %e,
                        "search page fetch failed, returning partial results"
                    );
                    return AggregationResult {
                        items,
                        next_token,
                        prev_token,
                        cost_units,
                        status: AggregationStatus::Error(e.to_string()),
                    };
                }
            };

            next_token = page.next_token;
            prev_token = page.prev_token;

            // No items means the upstream is out of data, token or not.
            if page.items.is_empty() {
                break;
            }

            let keys: BTreeSet<String> = page
                .items
                .iter()
                .map(|item| item.author_key.clone())
                .filter(|key| !key.is_empty())
                .collect();

            let counts = if keys.is_empty() {
                Default::default()
            } else {
                cost_units += self.client.lookup_cost(keys.len());
                match self.client.resolve_follower_counts(&keys).await {
                    Ok(counts) => counts,
                    // A failed batch never aborts the page; every item falls
                    // back to a follower count of 1.
                    Err(e) => {
                        tracing::warn!(
                            platform = %self.client.platform(),
                            error = %e,
                            "follower lookup failed, defaulting counts to 1"
                        );
                        Default::default()
                    }
                }
            };

            for raw in page.items {
                let followers = counts.get(&raw.author_key).copied().unwrap_or(1);
                let item = ContentItem::from_page_item(raw, followers, &config.query, ladder);
                if !passes_filter(&item, config) {
                    continue;
                }
                items.push(item);
                if items.len() >= config.target_results {
                    break;
                }
            }

            tracing::debug!(
                platform = %self.client.platform(),
                query = %config.query,
                call = calls_made,
                accumulated = items.len(),
                cost_units,
                "processed search page"
            );

            current_token = next_token.clone();
            if current_token.is_none() {
                break;
            }
        }

        // The mid-page break keeps the accumulator at the target already;
        // this is the final guarantee, not the normal path.
        items.truncate(config.target_results);

        let status = if items.is_empty() {
            AggregationStatus::NoData
        } else {
            AggregationStatus::Success
        };

        AggregationResult {
            items,
            next_token,
            prev_token,
            cost_units,
            status,
        }
    }
}

/// The filter predicate: view and follower floors, plus the optional
/// recency cutoff when the config carries one.
fn passes_filter(item: &ContentItem, config: &SearchConfig) -> bool {
    if item.views < config.min_views || item.followers < config.min_followers {
        return false;
    }
    if let Some(max_age_days) = config.max_age_days {
        let age_days = (Utc::now().date_naive() - item.published).num_days();
        if age_days > i64::from(max_age_days) {
            return false;
        }
    }
    true
}

//! Offline mock source simulating a TikTok-style feed.
//!
//! Generates plausible metric distributions for demos and tests that must
//! not touch the network: most accounts get views proportional to their
//! following, with a ~20% slice of small accounts handed outsized view
//! counts to simulate genuinely viral posts.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, PoisonError};

use chrono::{Duration, Utc};
use rand::Rng;

use viradar_core::search::{FetchError, PagedSearchClient};
use viradar_core::types::{PageItem, Platform, SearchConfig, SearchPage};

const MOCK_PAGE_SIZE: u32 = 50;
const MOCK_TOTAL_PAGES: u64 = 4;

/// Sample titles for the SaaS/software niche.
const TEMPLATES: &[&str] = &[
    "5 Tools every developer needs",
    "Day in the life of a software engineer",
    "How I built a SaaS in 30 days",
    "Stop using print() debugging!",
    "Python vs JavaScript: The Truth",
    "My $10k/mo Micro-SaaS Stack",
    "Why your code is slow",
    "Coding setup tour 2026",
    "Junior vs Senior Dev: Code Review",
    "The AI tool that writes code for you",
];

/// Fake paged source with no upstream dependency.
///
/// Follower counts are assigned while generating a page and remembered so
/// the later batched lookup resolves them consistently.
pub struct MockClient {
    followers: Mutex<BTreeMap<String, u64>>,
}

impl MockClient {
    #[must_use]
    pub fn new() -> Self {
        Self {
            followers: Mutex::new(BTreeMap::new()),
        }
    }
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new()
    }
}

impl PagedSearchClient for MockClient {
    fn platform(&self) -> Platform {
        Platform::TikTok
    }

    fn max_page_size(&self) -> u32 {
        MOCK_PAGE_SIZE
    }

    fn lookup_cost(&self, unique_keys: usize) -> u64 {
        // Simulated as one batched call.
        u64::from(unique_keys > 0)
    }

    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    async fn search_page(
        &self,
        _config: &SearchConfig,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<SearchPage, FetchError> {
        let page: u64 = match page_token {
            None => 0,
            Some(token) => token.parse().map_err(|_| {
                FetchError::Api(format!("invalid mock continuation token: {token}"))
            })?,
        };
        if page >= MOCK_TOTAL_PAGES {
            return Ok(SearchPage::default());
        }

        let mut rng = rand::rng();
        let mut known = self
            .followers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let today = Utc::now().date_naive();
        let mut items = Vec::with_capacity(page_size as usize);

        for i in 0..u64::from(page_size.min(MOCK_PAGE_SIZE)) {
            let id = format!("post_{}", page * u64::from(MOCK_PAGE_SIZE) + i);
            let author_key = format!("user_{}", rng.random_range(1000..10_000));
            let followers: u64 = rng.random_range(500..=500_000);
            known.insert(author_key.clone(), followers);

            // Small accounts occasionally go viral; everyone else gets views
            // roughly proportional to their following.
            let viral_candidate = rng.random_bool(0.2) && followers < 10_000;
            let views: u64 = if viral_candidate {
                rng.random_range(50_000..=500_000)
            } else {
                (followers as f64 * rng.random_range(0.1..1.5)) as u64
            };
            let likes = (views as f64 * rng.random_range(0.05..0.15)) as u64;

            items.push(PageItem {
                title: TEMPLATES[(i as usize) % TEMPLATES.len()].to_owned(),
                author: author_key.clone(),
                link: format!("https://www.tiktok.com/@{author_key}/video/{id}"),
                thumbnail_url: format!("https://picsum.photos/seed/{id}/300/500"),
                author_key,
                views,
                likes,
                comments: None,
                published: today - Duration::days(rng.random_range(0..=7)),
                duration_secs: Some(rng.random_range(8..=180)),
                id,
            });
        }

        let next_token = (page + 1 < MOCK_TOTAL_PAGES).then(|| (page + 1).to_string());
        Ok(SearchPage {
            items,
            next_token,
            prev_token: (page > 0).then(|| (page - 1).to_string()),
        })
    }

    async fn resolve_follower_counts(
        &self,
        keys: &BTreeSet<String>,
    ) -> Result<BTreeMap<String, u64>, FetchError> {
        let known = self
            .followers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(keys
            .iter()
            .filter_map(|key| known.get(key).map(|count| (key.clone(), *count)))
            .collect())
    }
}

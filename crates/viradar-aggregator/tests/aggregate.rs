//! Integration tests for `Aggregator::aggregate` driven by a scripted
//! client whose pages are fixed in advance. Each test is one scenario from
//! the aggregation contract: target/budget caps, cost accounting, partial
//! results, and the lookup fallback.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use chrono::Utc;

use viradar_aggregator::{AggregationStatus, Aggregator};
use viradar_core::search::{FetchError, PagedSearchClient};
use viradar_core::types::{PageItem, Platform, SearchConfig, SearchPage};

/// Client replaying a pre-scripted sequence of page results.
struct ScriptedClient {
    pages: Mutex<VecDeque<Result<SearchPage, FetchError>>>,
    followers: BTreeMap<String, u64>,
    fail_lookups: bool,
    page_size: u32,
    search_calls: AtomicU32,
    lookup_calls: AtomicU32,
    tokens_seen: Mutex<Vec<Option<String>>>,
}

impl ScriptedClient {
    fn new(pages: Vec<Result<SearchPage, FetchError>>, followers: BTreeMap<String, u64>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            followers,
            fail_lookups: false,
            page_size: 50,
            search_calls: AtomicU32::new(0),
            lookup_calls: AtomicU32::new(0),
            tokens_seen: Mutex::new(Vec::new()),
        }
    }

    fn searches(&self) -> u32 {
        self.search_calls.load(Ordering::SeqCst)
    }

    fn lookups(&self) -> u32 {
        self.lookup_calls.load(Ordering::SeqCst)
    }
}

impl PagedSearchClient for ScriptedClient {
    fn platform(&self) -> Platform {
        Platform::YouTube
    }

    fn max_page_size(&self) -> u32 {
        self.page_size
    }

    fn lookup_cost(&self, unique_keys: usize) -> u64 {
        u64::from(unique_keys > 0)
    }

    async fn search_page(
        &self,
        _config: &SearchConfig,
        _page_size: u32,
        page_token: Option<&str>,
    ) -> Result<SearchPage, FetchError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.tokens_seen
            .lock()
            .unwrap()
            .push(page_token.map(str::to_owned));
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(SearchPage::default()))
    }

    async fn resolve_follower_counts(
        &self,
        keys: &BTreeSet<String>,
    ) -> Result<BTreeMap<String, u64>, FetchError> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_lookups {
            return Err(FetchError::Transport("lookup backend down".to_owned()));
        }
        Ok(keys
            .iter()
            .filter_map(|key| self.followers.get(key).map(|count| (key.clone(), *count)))
            .collect())
    }
}

fn raw(id: &str, author_key: &str, views: u64) -> PageItem {
    PageItem {
        id: id.to_owned(),
        title: format!("Item {id}"),
        author: author_key.to_owned(),
        author_key: author_key.to_owned(),
        thumbnail_url: String::new(),
        link: String::new(),
        views,
        likes: 0,
        comments: None,
        published: Utc::now().date_naive(),
        duration_secs: Some(30),
    }
}

fn page(items: Vec<PageItem>, next: Option<&str>) -> Result<SearchPage, FetchError> {
    Ok(SearchPage {
        items,
        next_token: next.map(str::to_owned),
        prev_token: None,
    })
}

fn config(target: usize, max_calls: u32) -> SearchConfig {
    let mut config = SearchConfig::new("AI");
    config.min_views = 1000;
    config.min_followers = 1000;
    config.target_results = target;
    config.max_api_calls = max_calls;
    config
}

/// 50 items, of which `passing` clear the 1000-view floor.
fn mixed_page_items(prefix: &str, passing: usize) -> Vec<PageItem> {
    let mut items = Vec::with_capacity(50);
    for i in 0..50 {
        let views = if i < passing { 50_000 } else { 10 };
        items.push(raw(&format!("{prefix}-{i}"), &format!("chan-{prefix}-{i}"), views));
    }
    items
}

/// Followers for every author in the scripted pages: all above the floor.
fn followers_for(prefixes: &[&str]) -> BTreeMap<String, u64> {
    let mut map = BTreeMap::new();
    for prefix in prefixes {
        for i in 0..50 {
            map.insert(format!("chan-{prefix}-{i}"), 2000);
        }
    }
    map
}

#[tokio::test]
async fn two_page_scenario_trims_to_target_and_reports_cost() {
    // Page 1: 3 of 50 pass. Page 2: 8 of 50 pass, no next token.
    // Target 10 -> 11 would pass, trimmed to 10; cost 2 searches + 2 lookups.
    let client = ScriptedClient::new(
        vec![
            page(mixed_page_items("p1", 3), Some("t2")),
            page(mixed_page_items("p2", 8), None),
        ],
        followers_for(&["p1", "p2"]),
    );
    let aggregator = Aggregator::new(client);

    let result = aggregator.aggregate(&config(10, 5)).await;

    assert_eq!(result.status, AggregationStatus::Success);
    assert_eq!(result.items.len(), 10);
    assert_eq!(result.cost_units, 4);
    assert!(result.next_token.is_none());
    assert_eq!(aggregator.client().searches(), 2);
    assert_eq!(aggregator.client().lookups(), 2);

    // Upstream order is preserved: page 1's passers come first, unsorted.
    assert_eq!(result.items[0].id, "p1-0");
    assert_eq!(result.items[3].id, "p2-0");
    for item in &result.items {
        assert!(item.views >= 1000);
        assert!(item.followers >= 1000);
        assert_eq!(item.viral_score, 25.0); // 50_000 / 2_000
    }
}

#[tokio::test]
async fn target_zero_returns_immediately_without_calls() {
    let client = ScriptedClient::new(
        vec![page(mixed_page_items("p1", 10), None)],
        followers_for(&["p1"]),
    );
    let aggregator = Aggregator::new(client);

    let result = aggregator.aggregate(&config(0, 5)).await;

    assert!(result.items.is_empty());
    assert_eq!(result.cost_units, 0);
    assert_eq!(result.status, AggregationStatus::NoData);
    assert_eq!(aggregator.client().searches(), 0);
}

#[tokio::test]
async fn call_budget_caps_search_calls_and_cost_still_accrues() {
    // Every page fails the filter; pages keep offering continuations.
    let client = ScriptedClient::new(
        vec![
            page(mixed_page_items("p1", 0), Some("t2")),
            page(mixed_page_items("p2", 0), Some("t3")),
            page(mixed_page_items("p3", 0), Some("t4")),
            page(mixed_page_items("p4", 0), Some("t5")),
            page(mixed_page_items("p5", 0), Some("t6")),
        ],
        followers_for(&["p1", "p2", "p3", "p4", "p5"]),
    );
    let aggregator = Aggregator::new(client);

    let result = aggregator.aggregate(&config(10, 3)).await;

    assert_eq!(aggregator.client().searches(), 3, "budget must cap calls");
    assert!(result.items.is_empty());
    assert_eq!(result.status, AggregationStatus::NoData);
    // 3 search units + 3 batched lookup units: zero results, non-zero cost.
    assert_eq!(result.cost_units, 6);
    // The last page's token survives for a later resume.
    assert_eq!(result.next_token.as_deref(), Some("t4"));
}

#[tokio::test]
async fn empty_first_page_is_nodata_at_one_call_cost() {
    let client = ScriptedClient::new(vec![page(vec![], None)], BTreeMap::new());
    let aggregator = Aggregator::new(client);

    let result = aggregator.aggregate(&config(10, 5)).await;

    assert!(result.items.is_empty());
    assert_eq!(result.status, AggregationStatus::NoData);
    assert_eq!(result.cost_units, 1, "no lookup is charged for an empty page");
    assert_eq!(aggregator.client().lookups(), 0);
}

#[tokio::test]
async fn upstream_exhaustion_returns_partial_success() {
    // Only 2 matching items exist; the upstream ends after one page.
    let client = ScriptedClient::new(
        vec![page(mixed_page_items("p1", 2), None)],
        followers_for(&["p1"]),
    );
    let aggregator = Aggregator::new(client);

    let result = aggregator.aggregate(&config(10, 5)).await;

    assert_eq!(result.status, AggregationStatus::Success);
    assert_eq!(result.items.len(), 2);
    assert_eq!(aggregator.client().searches(), 1);
}

#[tokio::test]
async fn transport_error_preserves_accumulated_items() {
    let client = ScriptedClient::new(
        vec![
            page(mixed_page_items("p1", 2), Some("t2")),
            Err(FetchError::Transport("connection reset".to_owned())),
        ],
        followers_for(&["p1"]),
    );
    let aggregator = Aggregator::new(client);

    let result = aggregator.aggregate(&config(10, 5)).await;

    assert!(
        matches!(result.status, AggregationStatus::Error(ref detail) if detail.contains("connection reset")),
        "expected Error status, got {:?}",
        result.status
    );
    assert_eq!(result.items.len(), 2, "page 1's items survive the failure");
    // Page 1 search + page 1 lookup + the failed call.
    assert_eq!(result.cost_units, 3);
    // The pre-failure token survives so the caller can resume.
    assert_eq!(result.next_token.as_deref(), Some("t2"));
}

#[tokio::test]
async fn all_pass_upstream_reaches_target_in_minimal_calls() {
    let mut followers = BTreeMap::new();
    for prefix in ["p1", "p2", "p3"] {
        for i in 0..5 {
            followers.insert(format!("chan-{prefix}-{i}"), 2000);
        }
    }
    let small_page = |prefix: &str, next: Option<&str>| {
        page(
            (0..5)
                .map(|i| raw(&format!("{prefix}-{i}"), &format!("chan-{prefix}-{i}"), 9000))
                .collect(),
            next,
        )
    };
    let mut client = ScriptedClient::new(
        vec![
            small_page("p1", Some("t2")),
            small_page("p2", Some("t3")),
            small_page("p3", None),
        ],
        followers,
    );
    client.page_size = 5;
    let aggregator = Aggregator::new(client);

    let result = aggregator.aggregate(&config(10, 5)).await;

    assert_eq!(result.items.len(), 10);
    // ceil(10 / 5) = 2 search calls; the third page is never requested.
    assert_eq!(aggregator.client().searches(), 2);
    assert_eq!(result.cost_units, 4);
}

#[tokio::test]
async fn lookup_failure_defaults_followers_to_one() {
    let mut client = ScriptedClient::new(
        vec![page(
            vec![raw("a", "chan-a", 500), raw("b", "chan-b", 700)],
            None,
        )],
        BTreeMap::new(),
    );
    client.fail_lookups = true;
    let aggregator = Aggregator::new(client);

    let mut config = SearchConfig::new("AI");
    config.target_results = 10;
    config.max_api_calls = 5;
    let result = aggregator.aggregate(&config).await;

    assert_eq!(result.status, AggregationStatus::Success);
    assert_eq!(result.items.len(), 2);
    for item in &result.items {
        assert_eq!(item.followers, 1, "failed lookups fall back to 1");
        // With followers == 1 the score degenerates to the raw view count.
        assert_eq!(item.viral_score, item.views as f64);
    }
    // The failed lookup was still attempted and charged.
    assert_eq!(result.cost_units, 2);
}

#[tokio::test]
async fn resume_token_reaches_the_first_search_call() {
    let client = ScriptedClient::new(vec![page(vec![], None)], BTreeMap::new());
    let aggregator = Aggregator::new(client);

    let mut config = config(5, 5);
    config.page_token = Some("resume-here".to_owned());
    let _ = aggregator.aggregate(&config).await;

    let tokens = aggregator.client().tokens_seen.lock().unwrap();
    assert_eq!(tokens.as_slice(), &[Some("resume-here".to_owned())]);
}

//! Command line front end for viral content discovery.
//!
//! The binary is the presentation layer: it builds one immutable
//! `SearchConfig` from flags and env defaults, runs the aggregator against
//! the chosen platform client, re-sorts the results by viral score for
//! display, and charges the run's cost against the persisted daily quota.

use std::cmp::Ordering;
use std::fs;
use std::path::Path;

use anyhow::Context;
use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use viradar_aggregator::quota::time_to_reset;
use viradar_aggregator::{AggregationResult, AggregationStatus, Aggregator, MockClient, QuotaState, QuotaTracker};
use viradar_core::types::{DurationBucket, SearchConfig, SearchOrder};
use viradar_core::AppConfig;
use viradar_tiktok::TikTokClient;
use viradar_youtube::YouTubeClient;

#[derive(Debug, Parser)]
#[command(name = "viradar")]
#[command(about = "Discover viral short-form content by views-to-followers ratio")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search a platform and surface items whose reach outruns their audience.
    Search(SearchArgs),
    /// Show today's API quota usage and time until reset.
    Quota,
}

#[derive(Debug, Args)]
struct SearchArgs {
    /// Platform to search.
    #[arg(long, value_enum)]
    platform: PlatformArg,

    /// Search query or hashtag.
    #[arg(long)]
    query: String,

    #[arg(long, value_enum, default_value_t)]
    order: OrderArg,

    #[arg(long, value_enum, default_value_t)]
    duration: DurationArg,

    /// Drop items with fewer views.
    #[arg(long, default_value_t = 0)]
    min_views: u64,

    /// Drop items whose author has fewer followers/subscribers.
    #[arg(long, default_value_t = 0)]
    min_followers: u64,

    /// Filtered items to collect (defaults to VIRADAR_TARGET_RESULTS).
    #[arg(long)]
    target: Option<usize>,

    /// Search-call budget for this run (defaults to VIRADAR_MAX_API_CALLS).
    #[arg(long)]
    max_calls: Option<u32>,

    /// Drop items older than this many days.
    #[arg(long)]
    max_age_days: Option<u32>,

    /// Continuation token from a previous run.
    #[arg(long)]
    page_token: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PlatformArg {
    Youtube,
    Tiktok,
    /// Offline mock source; needs no API key.
    Mock,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OrderArg {
    #[default]
    Relevance,
    Date,
    ViewCount,
    Rating,
}

impl From<OrderArg> for SearchOrder {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::Relevance => SearchOrder::Relevance,
            OrderArg::Date => SearchOrder::Date,
            OrderArg::ViewCount => SearchOrder::ViewCount,
            OrderArg::Rating => SearchOrder::Rating,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum DurationArg {
    #[default]
    Any,
    Short,
    Medium,
    Long,
}

impl From<DurationArg> for DurationBucket {
    fn from(arg: DurationArg) -> Self {
        match arg {
            DurationArg::Any => DurationBucket::Any,
            DurationArg::Short => DurationBucket::Short,
            DurationArg::Medium => DurationBucket::Medium,
            DurationArg::Long => DurationBucket::Long,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let app = viradar_core::load_app_config_from_env()?;

    // RUST_LOG wins over the configured default level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&app.log_level)),
        )
        .init();

    match cli.command {
        Commands::Search(args) => run_search(&app, args).await,
        Commands::Quota => {
            let tracker = load_quota_tracker(&app);
            print_quota(&tracker);
            Ok(())
        }
    }
}

async fn run_search(app: &AppConfig, args: SearchArgs) -> anyhow::Result<()> {
    let search = build_search_config(app, &args);
    let platform = args.platform;

    let result = match platform {
        PlatformArg::Youtube => {
            let key = app
                .youtube_api_key
                .as_deref()
                .context("VIRADAR_YOUTUBE_API_KEY is not set")?;
            let client = YouTubeClient::new(key, app.request_timeout_secs)?;
            Aggregator::new(client).aggregate(&search).await
        }
        PlatformArg::Tiktok => {
            let key = app
                .rapidapi_key
                .as_deref()
                .context("VIRADAR_RAPIDAPI_KEY is not set")?;
            let client = TikTokClient::new(key, app.request_timeout_secs)?;
            Aggregator::new(client).aggregate(&search).await
        }
        PlatformArg::Mock => Aggregator::new(MockClient::new()).aggregate(&search).await,
    };

    render_result(&result);

    // Mock runs report cost like real ones but never hit the upstream,
    // so nothing is charged against the daily quota.
    if !matches!(platform, PlatformArg::Mock) && result.cost_units > 0 {
        let tracker = load_quota_tracker(app);
        let state = tracker.record_usage(result.cost_units);
        save_quota_state(&app.quota_state_path, state)?;
        println!(
            "\nQuota: {} / {} units used today ({} remaining)",
            state.units_used,
            tracker.limit(),
            tracker.remaining()
        );
    }

    Ok(())
}

fn build_search_config(app: &AppConfig, args: &SearchArgs) -> SearchConfig {
    let mut config = SearchConfig::new(args.query.clone());
    config.order = args.order.into();
    config.duration = args.duration.into();
    config.min_views = args.min_views;
    config.min_followers = args.min_followers;
    config.target_results = args.target.unwrap_or(app.target_results);
    config.max_api_calls = args.max_calls.unwrap_or(app.max_api_calls);
    config.max_age_days = args.max_age_days;
    config.page_token = args.page_token.clone();
    config
}

fn render_result(result: &AggregationResult) {
    match &result.status {
        AggregationStatus::Success => {}
        AggregationStatus::NoData => {
            println!("No matching posts found. Try lowering the filters.");
        }
        AggregationStatus::Error(detail) => {
            eprintln!("Upstream error (showing partial results): {detail}");
        }
    }

    // Display-layer re-sort: highest viral score first.
    let mut items: Vec<_> = result.items.iter().collect();
    items.sort_by(|a, b| {
        b.viral_score
            .partial_cmp(&a.viral_score)
            .unwrap_or(Ordering::Equal)
    });

    for item in items {
        println!(
            "{:>10.2}x  {:<14} {:>12} views {:>12} followers  {} — {}",
            item.viral_score,
            item.virality_label.to_string(),
            item.views,
            item.followers,
            item.author,
            item.title
        );
        println!("{:>12}{}", "", item.link);
    }

    println!(
        "\n{} item(s), {} cost unit(s) consumed",
        result.items.len(),
        result.cost_units
    );
    if let Some(token) = &result.next_token {
        println!("Next page token: {token}");
    }
}

fn print_quota(tracker: &QuotaTracker) {
    let state = tracker.state();
    let to_reset = time_to_reset(Utc::now());
    println!(
        "Used {} / {} units on {} ({} remaining)",
        state.units_used,
        tracker.limit(),
        state.reset_date,
        tracker.remaining()
    );
    println!(
        "Resets in {}h {:02}m (daily boundary, UTC-8)",
        to_reset.num_hours(),
        to_reset.num_minutes() % 60
    );
}

/// Restore quota state from disk; a missing or corrupt file starts fresh.
fn load_quota_tracker(app: &AppConfig) -> QuotaTracker {
    match fs::read_to_string(&app.quota_state_path) {
        Ok(raw) => match serde_json::from_str::<QuotaState>(&raw) {
            Ok(state) => QuotaTracker::from_state(app.daily_quota_units, state),
            Err(e) => {
                tracing::warn!(
                    path = %app.quota_state_path.display(),
                    error = %e,
                    "corrupt quota state file, starting fresh"
                );
                QuotaTracker::new(app.daily_quota_units)
            }
        },
        Err(_) => QuotaTracker::new(app.daily_quota_units),
    }
}

fn save_quota_state(path: &Path, state: QuotaState) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&state)?;
    fs::write(path, json)
        .with_context(|| format!("failed to write quota state to {}", path.display()))?;
    Ok(())
}

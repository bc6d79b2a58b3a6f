pub mod app_config;
pub mod config;
pub mod scorer;
pub mod search;
pub mod types;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env, ConfigError};
pub use scorer::{viral_score, ScoreLadder, ViralityLabel};
pub use search::{FetchError, PagedSearchClient};
pub use types::{
    ContentItem, DurationBucket, PageItem, Platform, SearchConfig, SearchOrder, SearchPage,
    VideoType,
};

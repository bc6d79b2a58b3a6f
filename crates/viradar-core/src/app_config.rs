use std::path::PathBuf;

/// Application configuration assembled from environment variables.
///
/// API keys are optional: startup succeeds without them and the error is
/// raised only when a search actually targets that platform.
#[derive(Clone)]
pub struct AppConfig {
    pub youtube_api_key: Option<String>,
    pub rapidapi_key: Option<String>,
    pub request_timeout_secs: u64,
    pub target_results: usize,
    pub max_api_calls: u32,
    /// Daily upstream budget in cost units.
    pub daily_quota_units: u64,
    /// Where the CLI persists quota state between runs.
    pub quota_state_path: PathBuf,
    pub log_level: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field(
                "youtube_api_key",
                &self.youtube_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "rapidapi_key",
                &self.rapidapi_key.as_ref().map(|_| "[redacted]"),
            )
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("target_results", &self.target_results)
            .field("max_api_calls", &self.max_api_calls)
            .field("daily_quota_units", &self.daily_quota_units)
            .field("quota_state_path", &self.quota_state_path)
            .field("log_level", &self.log_level)
            .finish()
    }
}

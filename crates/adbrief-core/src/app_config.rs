use std::path::PathBuf;

/// How selected brands are packed into webhook messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageGrouping {
    /// All brands in one digest, split only when platform limits require it.
    Single,
    /// One message per brand.
    PerBrand,
}

impl std::fmt::Display for MessageGrouping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageGrouping::Single => write!(f, "single"),
            MessageGrouping::PerBrand => write!(f, "per-brand"),
        }
    }
}

/// Which ad ids are written to the dedup store at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitPolicy {
    /// Every selected id, even when its message failed to publish.
    Selected,
    /// Only ids carried by messages the webhook accepted.
    Published,
}

impl std::fmt::Display for CommitPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommitPolicy::Selected => write!(f, "selected"),
            CommitPolicy::Published => write!(f, "published"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub foreplay_api_key: String,
    pub slack_webhook_url: String,
    pub log_level: String,
    pub brands_path: PathBuf,
    pub posted_ads_path: PathBuf,
    pub foreplay_base_url: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub lookback_days: u32,
    pub fetch_limit: u32,
    pub ads_per_brand: usize,
    pub target_brands: usize,
    pub target_countries: Vec<String>,
    pub inter_request_delay_ms: u64,
    pub publish_delay_ms: u64,
    pub message_grouping: MessageGrouping,
    pub commit_policy: CommitPolicy,
    pub min_credits: Option<u64>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("foreplay_api_key", &"[redacted]")
            .field("slack_webhook_url", &"[redacted]")
            .field("log_level", &self.log_level)
            .field("brands_path", &self.brands_path)
            .field("posted_ads_path", &self.posted_ads_path)
            .field("foreplay_base_url", &self.foreplay_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("lookback_days", &self.lookback_days)
            .field("fetch_limit", &self.fetch_limit)
            .field("ads_per_brand", &self.ads_per_brand)
            .field("target_brands", &self.target_brands)
            .field("target_countries", &self.target_countries)
            .field("inter_request_delay_ms", &self.inter_request_delay_ms)
            .field("publish_delay_ms", &self.publish_delay_ms)
            .field("message_grouping", &self.message_grouping)
            .field("commit_policy", &self.commit_policy)
            .field("min_credits", &self.min_credits)
            .finish()
    }
}

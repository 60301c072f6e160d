//! # Configuration
//!
//! Process-wide settings are parsed once (CLI flags with environment fallbacks),
//! validated at startup and then handed to each component at construction time.

use std::time::Duration;

use clap::Args;

use crate::{avatar::RenderWait, script::ScriptStyle};

/// Upper bound on articles gathered in one run
pub const MAX_ARTICLE_COUNT: usize = 50;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

pub fn default_news_sources() -> Vec<String> {
    [
        "https://www.bbc.com/news",
        "https://www.reuters.com",
        "https://apnews.com",
        "https://www.npr.org/sections/news",
        "https://www.theguardian.com/world",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

#[derive(Debug, Clone, Args)]
pub struct Config {
    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", default_value = "", hide_env_values = true)]
    pub openai_key: String,

    /// Chat completion model used for summaries
    #[arg(long, env = "OPENAI_MODEL", default_value = "gpt-4o-mini")]
    pub openai_model: String,

    /// D-ID API key (sent as HTTP basic credentials)
    #[arg(long, env = "DID_API_KEY", default_value = "", hide_env_values = true)]
    pub did_key: String,

    /// D-ID API base URL
    #[arg(long, env = "DID_BASE_URL", default_value = "https://api.d-id.com")]
    pub did_base_url: String,

    /// D-ID presenter used as the anchor
    #[arg(long, env = "DID_PRESENTER_ID", default_value = "amy-jcwCkr1grs")]
    pub presenter_id: String,

    /// Text-to-speech voice for the anchor
    #[arg(long, env = "DID_VOICE_ID", default_value = "en-US-JennyNeural")]
    pub voice_id: String,

    /// News sources, in the order they are tried
    #[arg(
        long = "news-source",
        env = "NEWS_SOURCES",
        value_delimiter = ',',
        default_values_t = default_news_sources()
    )]
    pub news_sources: Vec<String>,

    /// User agent for scraping requests
    #[arg(long, env = "USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout: u64,

    /// Number of articles to gather per run
    #[arg(long, env = "ARTICLE_COUNT", default_value = "5")]
    pub article_count: usize,

    /// Script composition style
    #[arg(long, env = "SCRIPT_STYLE", value_enum, default_value_t = ScriptStyle::Verbose)]
    pub script_style: ScriptStyle,

    /// Seconds between render status polls
    #[arg(long, env = "RENDER_POLL_INTERVAL", default_value = "5")]
    pub render_poll_interval: u64,

    /// Maximum seconds to wait for a render to finish
    #[arg(long, env = "RENDER_MAX_WAIT", default_value = "300")]
    pub render_max_wait: u64,
}

#[derive(Debug, thiserror::Error)]
#[error("Configuration errors:\n{}", .0.iter().map(|e| format!("- {e}")).collect::<Vec<_>>().join("\n"))]
pub struct ConfigError(pub Vec<String>);

impl Config {
    /// Checks every required setting and reports all problems at once
    pub fn validate(self) -> Result<Self, ConfigError> {
        let mut errors = Vec::new();

        if self.openai_key.trim().is_empty() {
            errors.push("OPENAI_API_KEY is not set".to_string());
        }
        if self.did_key.trim().is_empty() {
            errors.push("DID_API_KEY is not set".to_string());
        }
        if self.presenter_id.trim().is_empty() {
            errors.push("DID_PRESENTER_ID is empty".to_string());
        }
        if self.voice_id.trim().is_empty() {
            errors.push("DID_VOICE_ID is empty".to_string());
        }
        if !self.news_sources.iter().any(|s| !s.trim().is_empty()) {
            errors.push("NEWS_SOURCES has no entries".to_string());
        }
        if self.request_timeout == 0 {
            errors.push("REQUEST_TIMEOUT must be greater than zero".to_string());
        }
        if !(1..=MAX_ARTICLE_COUNT).contains(&self.article_count) {
            errors.push(format!("ARTICLE_COUNT must be between 1 and {MAX_ARTICLE_COUNT}"));
        }
        if self.render_poll_interval == 0 {
            errors.push("RENDER_POLL_INTERVAL must be greater than zero".to_string());
        }
        if self.render_max_wait < self.render_poll_interval {
            errors.push("RENDER_MAX_WAIT must not be shorter than RENDER_POLL_INTERVAL".to_string());
        }

        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError(errors))
        }
    }

    /// Article count for one run: a positive request capped at
    /// [`MAX_ARTICLE_COUNT`], otherwise the configured default
    pub fn article_count_for(&self, requested: Option<usize>) -> usize {
        requested
            .filter(|count| *count > 0)
            .map_or(self.article_count, |count| count.min(MAX_ARTICLE_COUNT))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn render_wait(&self) -> RenderWait {
        RenderWait {
            poll_interval: Duration::from_secs(self.render_poll_interval),
            max_wait: Duration::from_secs(self.render_max_wait),
        }
    }
}

use std::path::PathBuf;

/// Default location of the pre-seeded knowledge record.
const DEFAULT_MEMORY_PATH: &str = "data/memory.json";

/// Default chat-completion API base URL.
pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Default model asked for CSS news; must be able to search recent web content.
pub const DEFAULT_UPSTREAM_MODEL: &str = "perplexity/sonar-pro";

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub memory_path: PathBuf,
    /// `None` when no API key is configured; `get_latest_updates` is then
    /// left out of the tool set.
    pub upstream: Option<UpstreamConfig>,
}

/// Connection settings for the summarization API.
#[derive(Clone)]
pub struct UpstreamConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment.
    ///
    /// - `CSS_TUTOR_MEMORY_PATH` (optional, default `data/memory.json`) — knowledge record file
    /// - `OPENROUTER_API_KEY` (optional) — enables `get_latest_updates`
    /// - `OPENROUTER_BASE_URL` (optional) — chat-completion API base URL
    /// - `OPENROUTER_MODEL` (optional) — model identifier sent upstream
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let memory_path = match lookup("CSS_TUTOR_MEMORY_PATH") {
            Some(val) if val.trim().is_empty() => {
                return Err("CSS_TUTOR_MEMORY_PATH must not be empty".to_string());
            }
            Some(val) => PathBuf::from(val),
            None => PathBuf::from(DEFAULT_MEMORY_PATH),
        };

        let upstream = lookup("OPENROUTER_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .map(|api_key| UpstreamConfig {
                api_key,
                base_url: lookup("OPENROUTER_BASE_URL")
                    .filter(|v| !v.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_UPSTREAM_BASE_URL.to_string()),
                model: lookup("OPENROUTER_MODEL")
                    .filter(|v| !v.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_UPSTREAM_MODEL.to_string()),
            });

        Ok(Self {
            memory_path,
            upstream,
        })
    }
}

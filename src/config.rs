use std::time::Duration;

use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// OpenAI API key; checked on every request rather than at startup
    #[serde(default)]
    pub openai_api_key: Option<String>,

    /// OpenAI API base URL
    #[serde(default = "default_openai_api_url")]
    pub openai_api_url: String,

    /// Chat model used for structured recommendations
    #[serde(default = "default_openai_model")]
    pub openai_model: String,

    /// Pexels API key; checked on every request rather than at startup
    #[serde(default)]
    pub pexels_api_key: Option<String>,

    /// Pexels API base URL
    #[serde(default = "default_pexels_api_url")]
    pub pexels_api_url: String,

    /// Upper bound on any single outbound call, in seconds
    #[serde(default = "default_upstream_timeout_secs")]
    pub upstream_timeout_secs: u64,

    /// Front-end origin allowed by CORS
    #[serde(default = "default_cors_allowed_origin")]
    pub cors_allowed_origin: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_openai_api_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_pexels_api_url() -> String {
    "https://api.pexels.com/v1".to_string()
}

fn default_upstream_timeout_secs() -> u64 {
    8
}

fn default_cors_allowed_origin() -> String {
    "http://localhost:5173".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from an explicit set of variables
    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut config = envy::from_iter::<_, Config>(vars)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

        // An empty key in .env is the same as no key
        config.openai_api_key = config.openai_api_key.filter(|k| !k.trim().is_empty());
        config.pexels_api_key = config.pexels_api_key.filter(|k| !k.trim().is_empty());

        Ok(config)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

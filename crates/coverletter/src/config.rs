//! Runtime configuration resolved once at startup

use crate::error::ConfigError;

/// Variable holding the completion API credential
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Variable overriding the completion API base URL
pub const API_BASE_VAR: &str = "OPENAI_BASE_URL";

/// Completion API base URL when none is configured
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Credentials and endpoints for the completion API
///
/// Business logic receives this struct; nothing below the CLI reads the
/// environment directly.
#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub api_base: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl Config {
    /// Load from the process environment, reading `.env` first if present
    pub fn from_env() -> Result<Self, ConfigError> {
        // Already-set variables win over .env entries
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey(API_KEY_VAR))?;

        let api_base = lookup(API_BASE_VAR)
            .map(|base| base.trim().trim_end_matches('/').to_string())
            .filter(|base| !base.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        Ok(Self { api_key, api_base })
    }
}

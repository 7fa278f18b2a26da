use std::env;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Configuration problems are fatal: they surface at startup, before any
/// request is served.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unsupported LLM provider: {0}")]
    UnsupportedProvider(String),
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
    #[error("missing API key for provider '{0}'")]
    MissingApiKey(Provider),
}

/// Hosted LLM providers the gateway knows how to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Anthropic,
    Google,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Google => "google",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openai" => Ok(Provider::OpenAi),
            "anthropic" => Ok(Provider::Anthropic),
            "google" => Ok(Provider::Google),
            other => Err(ConfigError::UnsupportedProvider(other.to_string())),
        }
    }
}

/// Process-wide settings, resolved once at startup and read-only after.
#[derive(Debug, Clone)]
pub struct Settings {
    pub llm_provider: Provider,
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub google_api_key: Option<String>,

    pub html_reduction_model: String,
    pub action_generation_model: String,

    pub html_reduction_temperature: f64,
    pub action_generation_temperature: f64,

    pub html_reduction_max_tokens: u32,
    pub action_generation_max_tokens: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            llm_provider: Provider::OpenAi,
            openai_api_key: None,
            anthropic_api_key: None,
            google_api_key: None,
            html_reduction_model: "gpt-4o-mini".to_string(),
            action_generation_model: "gpt-4o".to_string(),
            html_reduction_temperature: 0.1,
            action_generation_temperature: 0.3,
            html_reduction_max_tokens: 4000,
            action_generation_max_tokens: 500,
        }
    }
}

impl Settings {
    /// Build settings from the environment, falling back to the defaults
    /// above for anything unset. `.env` loading happens in `main` via
    /// dotenvy before this runs.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut settings = Settings::default();

        if let Some(raw) = env_string("LLM_PROVIDER") {
            settings.llm_provider = raw.parse()?;
        }
        settings.openai_api_key = env_string("OPENAI_API_KEY");
        settings.anthropic_api_key = env_string("ANTHROPIC_API_KEY");
        settings.google_api_key = env_string("GOOGLE_API_KEY");

        if let Some(model) = env_string("HTML_REDUCTION_MODEL") {
            settings.html_reduction_model = model;
        }
        if let Some(model) = env_string("ACTION_GENERATION_MODEL") {
            settings.action_generation_model = model;
        }

        if let Some(t) = env_parse::<f64>("HTML_REDUCTION_TEMPERATURE")? {
            settings.html_reduction_temperature = t;
        }
        if let Some(t) = env_parse::<f64>("ACTION_GENERATION_TEMPERATURE")? {
            settings.action_generation_temperature = t;
        }
        if let Some(n) = env_parse::<u32>("HTML_REDUCTION_MAX_TOKENS")? {
            settings.html_reduction_max_tokens = n;
        }
        if let Some(n) = env_parse::<u32>("ACTION_GENERATION_MAX_TOKENS")? {
            settings.action_generation_max_tokens = n;
        }

        Ok(settings)
    }

    /// Credential for the given provider, if one was configured.
    pub fn api_key(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::OpenAi => self.openai_api_key.as_deref(),
            Provider::Anthropic => self.anthropic_api_key.as_deref(),
            Provider::Google => self.google_api_key.as_deref(),
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Err(_) => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw,
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_parses_supported_names() {
        assert_eq!("openai".parse::<Provider>().unwrap(), Provider::OpenAi);
        assert_eq!(
            "anthropic".parse::<Provider>().unwrap(),
            Provider::Anthropic
        );
        assert_eq!("google".parse::<Provider>().unwrap(), Provider::Google);
    }

    #[test]
    fn provider_rejects_unknown_name() {
        let err = "azure".parse::<Provider>().unwrap_err();
        assert!(err.to_string().contains("unsupported LLM provider: azure"));
    }

    #[test]
    fn defaults_match_deployed_profiles() {
        let settings = Settings::default();
        assert_eq!(settings.llm_provider, Provider::OpenAi);
        assert_eq!(settings.html_reduction_model, "gpt-4o-mini");
        assert_eq!(settings.action_generation_model, "gpt-4o");
        assert_eq!(settings.html_reduction_max_tokens, 4000);
        assert_eq!(settings.action_generation_max_tokens, 500);
    }

    #[test]
    fn api_key_follows_provider() {
        let settings = Settings {
            anthropic_api_key: Some("sk-ant".to_string()),
            ..Settings::default()
        };
        assert_eq!(settings.api_key(Provider::Anthropic), Some("sk-ant"));
        assert_eq!(settings.api_key(Provider::OpenAi), None);
    }
}

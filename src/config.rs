// Configuration loaded from <config_dir>/perplex/config.toml.
// Every field is optional; a missing file means defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::search::constants::{
    gemini, ollama, openrouter, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT_SECS,
};
use crate::search::Provider;

pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub default_provider: Provider,
    pub search: SearchSettings,
    pub endpoints: Endpoints,
    pub models: Models,
    pub speech: SpeechSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchSettings {
    pub temperature: f32,
    pub max_tokens: u32,
    /// Per-request bound for hosted providers.
    pub timeout_secs: u64,
    /// The local daemon gets no timeout unless this is set.
    pub local_timeout_secs: Option<u64>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            local_timeout_secs: None,
        }
    }
}

impl SearchSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn local_timeout(&self) -> Option<Duration> {
        self.local_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Endpoints {
    pub openrouter: String,
    pub gemini: String,
    pub ollama: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            openrouter: openrouter::API_URL.to_string(),
            gemini: gemini::API_URL.to_string(),
            ollama: ollama::API_URL.to_string(),
        }
    }
}

impl Endpoints {
    pub fn for_provider(&self, provider: Provider) -> &str {
        match provider {
            Provider::OpenRouter => &self.openrouter,
            Provider::Gemini => &self.gemini,
            Provider::Ollama => &self.ollama,
            Provider::ChatGpt | Provider::Claude => "",
        }
    }

    /// Scheme, host and port of the local daemon endpoint, for error hints.
    pub fn ollama_base_url(&self) -> String {
        reqwest::Url::parse(&self.ollama)
            .map(|u| u.origin().ascii_serialization())
            .unwrap_or_else(|_| ollama::BASE_URL.to_string())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Models {
    pub openrouter: String,
    pub ollama: String,
}

impl Default for Models {
    fn default() -> Self {
        Self {
            openrouter: openrouter::MODEL.to_string(),
            ollama: ollama::MODEL.to_string(),
        }
    }
}

impl Models {
    /// Model name sent to `provider`; Gemini's is fixed by its endpoint URL.
    pub fn for_provider(&self, provider: Provider) -> &str {
        match provider {
            Provider::OpenRouter => &self.openrouter,
            Provider::Ollama => &self.ollama,
            Provider::Gemini | Provider::ChatGpt | Provider::Claude => provider.default_model(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SpeechSettings {
    /// Program and arguments that listen for one utterance and print it.
    pub command: Option<Vec<String>>,
}

pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("perplex"))
}

pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join(CONFIG_FILE))
}

impl Config {
    /// Load from `path`, or from the default location when `None`.
    /// A file that does not exist yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) => p,
                None => return Ok(Config::default()),
            },
        };
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config = Config::from_toml(&contents).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse { path: path.clone(), source },
            other => other,
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.search;
        if !(0.0..=2.0).contains(&s.temperature) {
            return Err(ConfigError::Invalid(format!(
                "search.temperature must be between 0.0 and 2.0, got {}",
                s.temperature
            )));
        }
        if s.max_tokens == 0 {
            return Err(ConfigError::Invalid("search.max_tokens must be greater than 0".into()));
        }
        if s.timeout_secs == 0 {
            return Err(ConfigError::Invalid("search.timeout_secs must be greater than 0".into()));
        }
        if s.local_timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "search.local_timeout_secs must be greater than 0 when set".into(),
            ));
        }
        if let Some(cmd) = &self.speech.command {
            if cmd.first().map_or(true, |c| c.trim().is_empty()) {
                return Err(ConfigError::Invalid("speech.command must name a program".into()));
            }
        }
        Ok(())
    }
}

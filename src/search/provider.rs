use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::search::constants::{gemini, ollama, openrouter};

// ── Providers ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    OpenRouter,
    Gemini,
    Ollama,
    #[serde(rename = "chatgpt")]
    ChatGpt,
    Claude,
}

impl Provider {
    pub fn all() -> Vec<Provider> {
        vec![
            Provider::OpenRouter,
            Provider::Gemini,
            Provider::Ollama,
            Provider::ChatGpt,
            Provider::Claude,
        ]
    }

    /// Stable identifier used on the command line and in the config file.
    pub fn id(&self) -> &'static str {
        match self {
            Provider::OpenRouter => "openrouter",
            Provider::Gemini     => "gemini",
            Provider::Ollama     => "ollama",
            Provider::ChatGpt    => "chatgpt",
            Provider::Claude     => "claude",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Provider::OpenRouter => "OpenRouter",
            Provider::Gemini     => "Gemini",
            Provider::Ollama     => "Ollama (local)",
            Provider::ChatGpt    => "ChatGPT",
            Provider::Claude     => "Claude",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Provider::OpenRouter => "Cloud · Requires API key · https://openrouter.ai/",
            Provider::Gemini     => "Cloud · Requires API key · https://aistudio.google.com/",
            Provider::Ollama     => "Local · No API key needed · https://ollama.com/",
            Provider::ChatGpt    => "Not enabled in this build",
            Provider::Claude     => "Not enabled in this build",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::OpenRouter => openrouter::MODEL,
            Provider::Gemini     => gemini::MODEL,
            Provider::Ollama     => ollama::MODEL,
            Provider::ChatGpt | Provider::Claude => "",
        }
    }

    /// Name under which this provider's key lives in the credential store.
    /// `None` for providers that never need one.
    pub fn credential_key(&self) -> Option<&'static str> {
        match self {
            Provider::OpenRouter => Some(openrouter::CREDENTIAL_KEY),
            Provider::Gemini     => Some(gemini::CREDENTIAL_KEY),
            Provider::Ollama | Provider::ChatGpt | Provider::Claude => None,
        }
    }

    pub fn requires_key(&self) -> bool {
        self.credential_key().is_some()
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, Provider::ChatGpt | Provider::Claude)
    }

    pub fn disabled_message(&self) -> String {
        format!("{} is not enabled. Please select a different provider.", self.label())
    }

    /// Position of this provider in `Provider::all()`.
    pub fn index(&self) -> usize {
        Provider::all().iter().position(|p| p == self).unwrap_or(0)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown provider '{0}' (expected one of: openrouter, gemini, ollama, chatgpt, claude)")]
pub struct UnknownProvider(pub String);

impl FromStr for Provider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Provider::all()
            .into_iter()
            .find(|p| p.id() == needle)
            .ok_or(UnknownProvider(s.to_string()))
    }
}

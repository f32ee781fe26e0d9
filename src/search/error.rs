use reqwest::StatusCode;

use crate::search::constants::{MISSING_KEY_MESSAGE, REJECTED_KEY_MESSAGE, UNAVAILABLE_MESSAGE};
use crate::search::provider::Provider;

/// The three ways a search can fail, as far as the user is concerned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    MissingCredential,
    RejectedCredential,
    Unavailable,
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("no API key available for {provider}")]
    MissingCredential { provider: Provider },

    #[error("{provider} rejected the API key (HTTP {status})")]
    RejectedCredential { provider: Provider, status: StatusCode },

    #[error("{provider} request failed: {reason}")]
    Unavailable { provider: Provider, reason: String },

    #[error("local model '{model}' at {base_url} unreachable: {reason}")]
    LocalUnavailable {
        base_url: String,
        model: String,
        reason: String,
    },
}

impl SearchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SearchError::MissingCredential { .. } => ErrorKind::MissingCredential,
            SearchError::RejectedCredential { .. } => ErrorKind::RejectedCredential,
            SearchError::Unavailable { .. } | SearchError::LocalUnavailable { .. } => {
                ErrorKind::Unavailable
            }
        }
    }

    /// Classify a non-success HTTP status from a hosted provider.
    pub fn from_status(provider: Provider, status: StatusCode, body: &str) -> Self {
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            SearchError::RejectedCredential { provider, status }
        } else {
            SearchError::Unavailable {
                provider,
                reason: format!("HTTP {status}: {}", error_detail(body)),
            }
        }
    }

    /// Transport failures, timeouts and undecodable bodies all land here.
    pub fn transport(provider: Provider, err: reqwest::Error) -> Self {
        let reason = if err.is_timeout() {
            format!("timed out: {err}")
        } else if err.is_decode() {
            format!("malformed response: {err}")
        } else {
            err.to_string()
        };
        SearchError::Unavailable { provider, reason }
    }

    /// The static, human-readable text shown in place of an answer.
    pub fn user_message(&self) -> String {
        match self {
            SearchError::MissingCredential { .. } => MISSING_KEY_MESSAGE.to_string(),
            SearchError::RejectedCredential { .. } => REJECTED_KEY_MESSAGE.to_string(),
            SearchError::Unavailable { .. } => UNAVAILABLE_MESSAGE.to_string(),
            SearchError::LocalUnavailable { base_url, model, .. } => format!(
                "Could not reach the local model. Make sure Ollama is running at {base_url} \
                 and the model is available (run `ollama pull {model}`)."
            ),
        }
    }
}

/// Provider error bodies look like `{"error": {"message": ...}}` or
/// `{"error": "..."}`; fall back to the raw body.
fn error_detail(body: &str) -> String {
    let message = serde_json::from_str::<serde_json::Value>(body).ok().and_then(|v| {
        let err = v.get("error")?;
        err.get("message")
            .and_then(|m| m.as_str())
            .or_else(|| err.as_str())
            .map(str::to_string)
    });
    message.unwrap_or_else(|| truncate(body, 200).to_string())
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}


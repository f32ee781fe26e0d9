use reqwest::Client;
use std::sync::Arc;

use crate::config::Config;
use crate::credentials::CredentialStore;
use crate::search::backend::backend_for;
use crate::search::constants::NO_RESPONSE_MESSAGE;
use crate::search::error::{ErrorKind, SearchError};
use crate::search::provider::Provider;

// ── Results ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplyStatus {
    Answered,
    Failed(ErrorKind),
    NotEnabled,
}

/// Text to display in place of the previous answer.
#[derive(Clone, Debug, PartialEq)]
pub struct Reply {
    pub provider: Provider,
    pub text: String,
    pub status: ReplyStatus,
}

impl Reply {
    fn answered(provider: Provider, text: &str) -> Self {
        let text = text.trim();
        let text = if text.is_empty() { NO_RESPONSE_MESSAGE } else { text };
        Reply { provider, text: text.to_string(), status: ReplyStatus::Answered }
    }

    fn failed(provider: Provider, err: &SearchError) -> Self {
        Reply { provider, text: err.user_message(), status: ReplyStatus::Failed(err.kind()) }
    }

    fn not_enabled(provider: Provider) -> Self {
        Reply { provider, text: provider.disabled_message(), status: ReplyStatus::NotEnabled }
    }

    pub fn is_success(&self) -> bool {
        self.status == ReplyStatus::Answered
    }
}

/// A search that cannot proceed until the caller supplies a key.
#[derive(Clone, Debug, PartialEq)]
pub struct CredentialRequest {
    pub provider: Provider,
    pub query: String,
}

impl CredentialRequest {
    pub fn prompt(&self) -> String {
        format!("Enter your {} API key:", self.provider.label())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Dispatch {
    /// Blank query: nothing was sent and the answer stays as it was.
    Skipped,
    NeedsCredential(CredentialRequest),
    Replied(Reply),
}

// ── Dispatcher ────────────────────────────────────────────────────────────────

pub struct Dispatcher {
    client: Client,
    config: Arc<Config>,
    store: Arc<dyn CredentialStore>,
}

impl Dispatcher {
    pub fn new(config: Arc<Config>, store: Arc<dyn CredentialStore>) -> Self {
        Self { client: Client::new(), config, store }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// First phase: answer `query` with `provider`, or ask for a key.
    pub async fn dispatch(&self, provider: Provider, query: &str) -> Dispatch {
        let query = query.trim();
        if query.is_empty() {
            return Dispatch::Skipped;
        }
        if !provider.is_enabled() {
            tracing::info!(provider = provider.id(), "provider not enabled");
            return Dispatch::Replied(Reply::not_enabled(provider));
        }
        let key = match provider.credential_key() {
            Some(name) => match self.stored_key(name) {
                Some(k) => Some(k),
                None => {
                    return Dispatch::NeedsCredential(CredentialRequest {
                        provider,
                        query: query.to_string(),
                    })
                }
            },
            None => None,
        };
        Dispatch::Replied(self.run(provider, query, key.as_deref()).await)
    }

    /// Second phase: the caller answered a `CredentialRequest`. Blank input
    /// declines, which yields the missing-key message without a request.
    pub async fn supply_credential(&self, request: CredentialRequest, input: &str) -> Dispatch {
        let key = input.trim();
        let provider = request.provider;
        if key.is_empty() {
            let err = SearchError::MissingCredential { provider };
            return Dispatch::Replied(Reply::failed(provider, &err));
        }
        if let Some(name) = provider.credential_key() {
            if let Err(e) = self.store.set(name, key) {
                tracing::warn!(provider = provider.id(), error = %e, "could not persist API key");
            }
        }
        Dispatch::Replied(self.run(provider, &request.query, Some(key)).await)
    }

    pub fn forget_credential(&self, provider: Provider) -> Result<bool, crate::credentials::CredentialError> {
        match provider.credential_key() {
            Some(name) => self.store.remove(name),
            None => Ok(false),
        }
    }

    pub fn has_credential(&self, provider: Provider) -> bool {
        provider.credential_key().and_then(|name| self.stored_key(name)).is_some()
    }

    fn stored_key(&self, name: &str) -> Option<String> {
        match self.store.get(name) {
            Ok(k) => k,
            Err(e) => {
                tracing::warn!(name, error = %e, "could not read credential store");
                None
            }
        }
    }

    async fn run(&self, provider: Provider, query: &str, key: Option<&str>) -> Reply {
        let Some(backend) = backend_for(provider, &self.config) else {
            return Reply::not_enabled(provider);
        };
        tracing::info!(provider = provider.id(), query_len = query.len(), "dispatching search");
        match backend.answer(&self.client, query, key).await {
            Ok(text) => Reply::answered(provider, &text),
            Err(e) => {
                tracing::warn!(provider = provider.id(), error = %e, "search failed");
                Reply::failed(provider, &e)
            }
        }
    }
}

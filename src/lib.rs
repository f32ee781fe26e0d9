pub mod config;
pub mod credentials;
pub mod logging;
pub mod search;
pub mod speech;
pub mod tui;

pub use config::Config;
pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use search::{Dispatch, Dispatcher, Provider, Reply, ReplyStatus};
pub use tui::{render_to_buffer, App, Focus};

use anyhow::{bail, Context, Result};
use std::io::{self, BufRead, Write};
use std::path::Path;

use search::CredentialRequest;

pub fn info(config_path: Option<&Path>) -> Result<()> {
    let config_path = config_path
        .map(Path::to_path_buf)
        .or_else(config::default_config_path);
    println!("perplex {}", env!("CARGO_PKG_VERSION"));
    match &config_path {
        Some(p) => {
            let state = if p.exists() { "present" } else { "defaults" };
            println!("Config:      {} ({state})", p.display());
        }
        None => println!("Config:      (no config directory)"),
    }
    match FileCredentialStore::open_default() {
        Ok(store) => println!("Credentials: {}", store.path().display()),
        Err(e) => println!("Credentials: unavailable ({e})"),
    }
    if let Some(log) = logging::log_file_path() {
        println!("Log file:    {} (when RUST_LOG is set)", log.display());
    }
    Ok(())
}

pub fn providers(dispatcher: &Dispatcher) -> Result<()> {
    let config = dispatcher.config();
    for p in Provider::all() {
        let key = if !p.is_enabled() {
            "disabled"
        } else if !p.requires_key() {
            "no key needed"
        } else if dispatcher.has_credential(p) {
            "key stored"
        } else {
            "no key"
        };
        let marker = if p == config.default_provider { "*" } else { " " };
        println!("{marker} {:<11} {:<15} {key}", p.id(), p.label());
        let endpoint = config.endpoints.for_provider(p);
        if !endpoint.is_empty() {
            println!("    {endpoint} ({})", config.models.for_provider(p));
        }
    }
    Ok(())
}

pub fn keys_list(store: &dyn CredentialStore) -> Result<()> {
    let names = store.names().context("Failed to read credential store")?;
    let mut any = false;
    for p in Provider::all() {
        if let Some(name) = p.credential_key() {
            if names.iter().any(|n| n == name) && store.get(name)?.is_some() {
                println!("{:<11} {name}", p.id());
                any = true;
            }
        }
    }
    if !any {
        println!("No API keys stored.");
    }
    Ok(())
}

pub fn keys_set(store: &dyn CredentialStore, provider: Provider, key: &str) -> Result<()> {
    let Some(name) = provider.credential_key() else {
        bail!("{} does not use an API key", provider.label());
    };
    if key.trim().is_empty() {
        bail!("API key must not be empty");
    }
    store.set(name, key).context("Failed to store API key")?;
    println!("Stored {} key.", provider.label());
    Ok(())
}

pub fn keys_clear(store: &dyn CredentialStore, provider: Provider) -> Result<()> {
    let Some(name) = provider.credential_key() else {
        bail!("{} does not use an API key", provider.label());
    };
    if store.remove(name).context("Failed to update credential store")? {
        println!("Cleared {} key.", provider.label());
    } else {
        println!("No {} key stored.", provider.label());
    }
    Ok(())
}

/// One-shot search. `read_key` is asked for a key when none is stored; an
/// empty string declines. Returns `None` for a blank query.
pub async fn ask<F>(
    dispatcher: &Dispatcher,
    provider: Provider,
    query: &str,
    read_key: F,
) -> Result<Option<Reply>>
where
    F: FnOnce(&CredentialRequest) -> Result<String>,
{
    let dispatch = match dispatcher.dispatch(provider, query).await {
        Dispatch::NeedsCredential(request) => {
            let key = read_key(&request)?;
            dispatcher.supply_credential(request, &key).await
        }
        other => other,
    };
    Ok(match dispatch {
        Dispatch::Replied(reply) => Some(reply),
        Dispatch::Skipped | Dispatch::NeedsCredential(_) => None,
    })
}

/// Ask for a key on stderr and read one line from stdin.
pub fn read_key_from_stdin(request: &CredentialRequest) -> Result<String> {
    eprint!("{} ", request.prompt());
    io::stderr().flush().ok();
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read API key from stdin")?;
    Ok(line.trim().to_string())
}

use mockito::Server;
use perplex_cli::search::constants::REJECTED_KEY_MESSAGE;
use perplex_cli::{ask, info, keys_clear, keys_set, Config, CredentialStore, Dispatcher, MemoryCredentialStore, Provider};
use std::cell::Cell;
use std::sync::Arc;

fn dispatcher_for(server_url: &str, store: Arc<MemoryCredentialStore>) -> Dispatcher {
    let mut config = Config::default();
    config.endpoints.openrouter = format!("{server_url}/openrouter");
    Dispatcher::new(Arc::new(config), store)
}

// ── keys ──────────────────────────────────────────────────────────────────────

#[test]
fn keys_set_stores_under_provider_name() {
    let store = MemoryCredentialStore::new();
    keys_set(&store, Provider::Gemini, "AIza-1").unwrap();
    assert_eq!(store.get("gemini_api_key").unwrap().as_deref(), Some("AIza-1"));
}

#[test]
fn keys_set_rejects_keyless_providers_and_blank_keys() {
    let store = MemoryCredentialStore::new();
    assert!(keys_set(&store, Provider::Ollama, "x").is_err());
    assert!(keys_set(&store, Provider::Claude, "x").is_err());
    assert!(keys_set(&store, Provider::OpenRouter, "   ").is_err());
    assert!(store.names().unwrap().is_empty());
}

#[test]
fn keys_clear_removes_stored_key() {
    let store = MemoryCredentialStore::with("openrouter_api_key", "sk");
    keys_clear(&store, Provider::OpenRouter).unwrap();
    assert_eq!(store.get("openrouter_api_key").unwrap(), None);
    // Clearing again is not an error.
    keys_clear(&store, Provider::OpenRouter).unwrap();
    assert!(keys_clear(&store, Provider::Ollama).is_err());
}

// ── info ──────────────────────────────────────────────────────────────────────

#[test]
fn info_reports_present_and_missing_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    info(Some(&path)).unwrap();
    std::fs::write(&path, "").unwrap();
    info(Some(&path)).unwrap();
}

// ── ask ───────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn ask_blank_query_returns_none_without_prompting() {
    let server = Server::new_async().await;
    let d = dispatcher_for(&server.url(), Arc::new(MemoryCredentialStore::new()));
    let prompted = Cell::new(false);
    let reply = ask(&d, Provider::OpenRouter, "  ", |_| {
        prompted.set(true);
        Ok(String::new())
    })
    .await
    .unwrap();
    assert!(reply.is_none());
    assert!(!prompted.get());
}

#[tokio::test]
async fn ask_prompts_for_missing_key_and_stores_it() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/openrouter")
        .match_header("authorization", "Bearer typed-key")
        .with_status(200)
        .with_body(r#"{"choices":[{"message":{"content":"42"}}]}"#)
        .create_async()
        .await;
    let store = Arc::new(MemoryCredentialStore::new());
    let d = dispatcher_for(&server.url(), store.clone());

    let reply = ask(&d, Provider::OpenRouter, "meaning of life", |req| {
        assert_eq!(req.prompt(), "Enter your OpenRouter API key:");
        Ok("typed-key".to_string())
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(reply.text, "42");
    assert_eq!(store.get("openrouter_api_key").unwrap().as_deref(), Some("typed-key"));
}

#[tokio::test]
async fn ask_reports_rejected_key() {
    let mut server = Server::new_async().await;
    server.mock("POST", "/openrouter").with_status(401).create_async().await;
    let store = Arc::new(MemoryCredentialStore::with("openrouter_api_key", "stale"));
    let d = dispatcher_for(&server.url(), store);

    let reply = ask(&d, Provider::OpenRouter, "hi", |_| unreachable!("key is stored"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reply.text, REJECTED_KEY_MESSAGE);
    assert!(!reply.is_success());
}

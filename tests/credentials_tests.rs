use perplex_cli::credentials::{CredentialError, CredentialStore, FileCredentialStore, MemoryCredentialStore};

#[test]
fn file_store_round_trips_and_creates_parent_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/perplex/credentials.toml");
    let store = FileCredentialStore::new(&path);

    assert_eq!(store.get("openrouter_api_key").unwrap(), None);
    store.set("openrouter_api_key", " sk-or-123 ").unwrap();
    store.set("gemini_api_key", "AIza").unwrap();

    // A fresh handle sees what the first one wrote.
    let reopened = FileCredentialStore::new(&path);
    assert_eq!(reopened.get("openrouter_api_key").unwrap().as_deref(), Some("sk-or-123"));
    assert_eq!(reopened.names().unwrap(), vec!["gemini_api_key", "openrouter_api_key"]);
}

#[cfg(unix)]
#[test]
fn file_store_is_private_to_the_user() {
    use std::os::unix::fs::PermissionsExt;
    let dir = tempfile::tempdir().unwrap();
    let store = FileCredentialStore::new(dir.path().join("credentials.toml"));
    store.set("gemini_api_key", "AIza").unwrap();
    let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn remove_reports_whether_anything_changed() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileCredentialStore::new(dir.path().join("credentials.toml"));
    store.set("gemini_api_key", "AIza").unwrap();
    assert!(store.remove("gemini_api_key").unwrap());
    assert!(!store.remove("gemini_api_key").unwrap());
    assert_eq!(store.get("gemini_api_key").unwrap(), None);
}

#[test]
fn blank_values_count_as_absent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credentials.toml");
    std::fs::write(&path, "openrouter_api_key = \"   \"\n").unwrap();
    let store = FileCredentialStore::new(&path);
    assert_eq!(store.get("openrouter_api_key").unwrap(), None);

    let mem = MemoryCredentialStore::with("gemini_api_key", "");
    assert_eq!(mem.get("gemini_api_key").unwrap(), None);
}

#[test]
fn corrupt_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credentials.toml");
    std::fs::write(&path, "this is = = not toml").unwrap();
    let store = FileCredentialStore::new(&path);
    assert!(matches!(store.get("x"), Err(CredentialError::Corrupt { .. })));
}

#[test]
fn memory_store_lists_sorted_names() {
    let store = MemoryCredentialStore::new();
    store.set("b", "2").unwrap();
    store.set("a", "1").unwrap();
    assert_eq!(store.names().unwrap(), vec!["a", "b"]);
}

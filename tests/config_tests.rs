use perplex_cli::config::{Config, ConfigError};
use perplex_cli::search::constants::{ollama, openrouter};
use perplex_cli::Provider;
use std::time::Duration;

#[test]
fn defaults_match_built_in_constants() {
    let c = Config::default();
    assert_eq!(c.default_provider, Provider::OpenRouter);
    assert_eq!(c.search.temperature, 0.7);
    assert_eq!(c.search.max_tokens, 512);
    assert_eq!(c.search.timeout(), Duration::from_secs(20));
    assert_eq!(c.search.local_timeout(), None);
    assert_eq!(c.endpoints.openrouter, openrouter::API_URL);
    assert_eq!(c.endpoints.ollama, ollama::API_URL);
    assert_eq!(c.models.openrouter, "mistralai/mistral-7b-instruct:free");
    assert_eq!(c.models.ollama, "llama3");
    assert!(c.speech.command.is_none());
}

#[test]
fn partial_toml_keeps_other_defaults() {
    let c = Config::from_toml(
        r#"
default_provider = "gemini"

[search]
temperature = 0.2
local_timeout_secs = 90

[models]
ollama = "mistral"

[speech]
command = ["whisper-listen", "--once"]
"#,
    )
    .unwrap();
    assert_eq!(c.default_provider, Provider::Gemini);
    assert_eq!(c.search.temperature, 0.2);
    assert_eq!(c.search.max_tokens, 512);
    assert_eq!(c.search.local_timeout(), Some(Duration::from_secs(90)));
    assert_eq!(c.models.ollama, "mistral");
    assert_eq!(c.models.openrouter, openrouter::MODEL);
    assert_eq!(
        c.speech.command.as_deref(),
        Some(&["whisper-listen".to_string(), "--once".to_string()][..])
    );
}

#[test]
fn ollama_base_url_comes_from_endpoint_origin() {
    let mut c = Config::default();
    assert_eq!(c.endpoints.ollama_base_url(), "http://localhost:11434");
    c.endpoints.ollama = "http://gpu-box:8080/api/generate".into();
    assert_eq!(c.endpoints.ollama_base_url(), "http://gpu-box:8080");
    assert_eq!(c.endpoints.for_provider(Provider::Claude), "");
}

#[test]
fn invalid_values_are_rejected() {
    for toml in [
        "[search]\ntemperature = 3.5",
        "[search]\nmax_tokens = 0",
        "[search]\ntimeout_secs = 0",
        "[search]\nlocal_timeout_secs = 0",
        "[speech]\ncommand = []",
    ] {
        let err = Config::from_toml(toml).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{toml}: {err}");
    }
}

#[test]
fn unknown_provider_is_a_parse_error() {
    let err = Config::from_toml("default_provider = \"bard\"").unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn load_missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let c = Config::load(Some(&dir.path().join("absent.toml"))).unwrap();
    assert_eq!(c.default_provider, Provider::OpenRouter);
}

#[test]
fn load_reads_file_and_reports_path_on_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    std::fs::write(&path, "default_provider = \"ollama\"\n").unwrap();
    assert_eq!(Config::load(Some(&path)).unwrap().default_provider, Provider::Ollama);

    std::fs::write(&path, "default_provider = [").unwrap();
    match Config::load(Some(&path)).unwrap_err() {
        ConfigError::Parse { path: p, .. } => assert_eq!(p, path),
        other => panic!("unexpected error: {other}"),
    }
}

use perplex_cli::search::Provider;
use perplex_cli::speech::recognizer_from_config;
use perplex_cli::{
    ask, info, keys_clear, keys_list, keys_set, logging, providers, read_key_from_stdin, tui,
    App, Config, CredentialStore, Dispatcher, FileCredentialStore,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "perplex", version, about = "Ask LLM providers from a Perplexity-style terminal UI")]
struct Cli {
    /// Path to config.toml (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Provider to start with (openrouter, gemini, ollama, chatgpt, claude)
    #[arg(long, short, global = true)]
    provider: Option<Provider>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask one question and print the answer
    Ask {
        /// The question; multiple words are joined with spaces
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// List providers, their endpoints and key status
    Providers,
    /// Manage stored API keys
    Keys {
        #[command(subcommand)]
        action: KeysAction,
    },
    /// Show version and file locations
    Info,
}

#[derive(Subcommand)]
enum KeysAction {
    /// Store a key for a provider
    Set { provider: Provider, key: String },
    /// Remove a provider's stored key
    Clear { provider: Provider },
    /// List providers with a stored key
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.command.is_none())?;

    if let Some(Commands::Info) = cli.command {
        return info(cli.config.as_deref());
    }

    let config = Arc::new(Config::load(cli.config.as_deref())?);
    let store: Arc<dyn CredentialStore> =
        Arc::new(FileCredentialStore::open_default().context("Cannot locate credential store")?);
    let provider = cli.provider.unwrap_or(config.default_provider);
    let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&config), Arc::clone(&store)));

    match cli.command {
        Some(Commands::Ask { query }) => {
            let query = query.join(" ");
            match ask(&dispatcher, provider, &query, read_key_from_stdin).await? {
                Some(reply) => println!("{}", reply.text),
                None => eprintln!("Empty query, nothing to ask."),
            }
            Ok(())
        }
        Some(Commands::Providers) => providers(&dispatcher),
        Some(Commands::Keys { action }) => match action {
            KeysAction::Set { provider, key } => keys_set(store.as_ref(), provider, &key),
            KeysAction::Clear { provider } => keys_clear(store.as_ref(), provider),
            KeysAction::List => keys_list(store.as_ref()),
        },
        Some(Commands::Info) => info(cli.config.as_deref()),
        None => {
            let app = App::new(provider, recognizer_from_config(&config.speech));
            tui::run(dispatcher, app).await
        }
    }
}

// Speech-to-text capture behind a single start/stop toggle.

use async_trait::async_trait;
use std::process::Stdio;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::config::SpeechSettings;

pub const UNSUPPORTED_MESSAGE: &str =
    "Speech recognition is not supported here. Set `speech.command` in config.toml to enable it.";

#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("speech recognition is not supported")]
    Unsupported,
    #[error("failed to start recognizer '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("recognizer failed: {0}")]
    Failed(String),
    #[error("no speech detected")]
    NoSpeech,
}

#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    fn is_available(&self) -> bool;

    /// Listen for a single utterance and return its final transcript.
    /// `Ok(None)` means listening was cancelled.
    async fn listen_once(&self, cancel: CancellationToken) -> Result<Option<String>, SpeechError>;
}

pub struct UnsupportedRecognizer;

#[async_trait]
impl SpeechRecognizer for UnsupportedRecognizer {
    fn is_available(&self) -> bool {
        false
    }

    async fn listen_once(&self, _cancel: CancellationToken) -> Result<Option<String>, SpeechError> {
        Err(SpeechError::Unsupported)
    }
}

/// Runs an external program that records one utterance and prints the
/// transcript on stdout.
pub struct CommandRecognizer {
    program: String,
    args: Vec<String>,
}

impl CommandRecognizer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self { program: program.into(), args }
    }
}

#[async_trait]
impl SpeechRecognizer for CommandRecognizer {
    fn is_available(&self) -> bool {
        true
    }

    async fn listen_once(&self, cancel: CancellationToken) -> Result<Option<String>, SpeechError> {
        let child = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SpeechError::Spawn { program: self.program.clone(), source })?;
        tracing::debug!(program = %self.program, "listening");

        tokio::select! {
            _ = cancel.cancelled() => Ok(None),
            out = child.wait_with_output() => {
                let out = out.map_err(|e| SpeechError::Failed(e.to_string()))?;
                if !out.status.success() {
                    return Err(SpeechError::Failed(format!("exited with {}", out.status)));
                }
                let text = String::from_utf8_lossy(&out.stdout).trim().to_string();
                if text.is_empty() {
                    return Err(SpeechError::NoSpeech);
                }
                Ok(Some(text))
            }
        }
    }
}

pub fn recognizer_from_config(settings: &SpeechSettings) -> Arc<dyn SpeechRecognizer> {
    match settings.command.as_deref() {
        Some([program, args @ ..]) => Arc::new(CommandRecognizer::new(program.clone(), args.to_vec())),
        _ => Arc::new(UnsupportedRecognizer),
    }
}

// ── Toggle ────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum Toggle {
    /// Begin listening; the token stops it.
    Start(CancellationToken),
    Stopped,
    /// No recognizer: the caller must alert the user.
    Unsupported,
}

pub struct SpeechCapture {
    recognizer: Arc<dyn SpeechRecognizer>,
    listening: Option<CancellationToken>,
}

impl SpeechCapture {
    pub fn new(recognizer: Arc<dyn SpeechRecognizer>) -> Self {
        Self { recognizer, listening: None }
    }

    pub fn recognizer(&self) -> Arc<dyn SpeechRecognizer> {
        Arc::clone(&self.recognizer)
    }

    pub fn is_listening(&self) -> bool {
        self.listening.is_some()
    }

    pub fn toggle(&mut self) -> Toggle {
        if let Some(token) = self.listening.take() {
            token.cancel();
            return Toggle::Stopped;
        }
        if !self.recognizer.is_available() {
            return Toggle::Unsupported;
        }
        let token = CancellationToken::new();
        self.listening = Some(token.clone());
        Toggle::Start(token)
    }

    /// A recognition task finished. Returns whether its result still applies
    /// (it does not if listening was stopped in the meantime).
    pub fn finish(&mut self, token: &CancellationToken) -> bool {
        if token.is_cancelled() {
            return false;
        }
        match &self.listening {
            Some(current) if !current.is_cancelled() => {
                self.listening = None;
                true
            }
            _ => false,
        }
    }

    pub fn stop(&mut self) {
        if let Some(token) = self.listening.take() {
            token.cancel();
        }
    }
}

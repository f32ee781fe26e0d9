use perplex_cli::config::SpeechSettings;
use perplex_cli::speech::{
    recognizer_from_config, CommandRecognizer, SpeechCapture, SpeechError, SpeechRecognizer,
    Toggle, UnsupportedRecognizer,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn sh(script: &str) -> CommandRecognizer {
    CommandRecognizer::new("sh", vec!["-c".into(), script.into()])
}

#[test]
fn toggle_without_recognizer_is_unsupported() {
    let mut capture = SpeechCapture::new(Arc::new(UnsupportedRecognizer));
    assert!(matches!(capture.toggle(), Toggle::Unsupported));
    assert!(!capture.is_listening());
}

#[test]
fn toggle_starts_then_stops() {
    let mut capture = SpeechCapture::new(Arc::new(sh("echo hi")));
    let Toggle::Start(token) = capture.toggle() else {
        panic!("expected to start listening");
    };
    assert!(capture.is_listening());
    assert!(matches!(capture.toggle(), Toggle::Stopped));
    assert!(token.is_cancelled());
    assert!(!capture.is_listening());
    // A result arriving after the stop is dropped.
    assert!(!capture.finish(&token));
}

#[test]
fn finish_accepts_the_live_session_once() {
    let mut capture = SpeechCapture::new(Arc::new(sh("echo hi")));
    let Toggle::Start(token) = capture.toggle() else {
        panic!("expected to start listening");
    };
    assert!(capture.finish(&token));
    assert!(!capture.is_listening());
}

#[test]
fn config_without_command_is_unsupported() {
    assert!(!recognizer_from_config(&SpeechSettings::default()).is_available());
    let settings = SpeechSettings { command: Some(vec!["sh".into(), "-c".into(), "true".into()]) };
    assert!(recognizer_from_config(&settings).is_available());
}

#[cfg(unix)]
#[tokio::test]
async fn command_transcript_is_trimmed() {
    let text = sh("echo '  what is the tallest mountain  '")
        .listen_once(CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(text.as_deref(), Some("what is the tallest mountain"));
}

#[cfg(unix)]
#[tokio::test]
async fn command_failures_are_errors() {
    let err = sh("exit 3").listen_once(CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, SpeechError::Failed(_)));

    let err = sh("true").listen_once(CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, SpeechError::NoSpeech));

    let err = CommandRecognizer::new("/nonexistent/recognizer", vec![])
        .listen_once(CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, SpeechError::Spawn { .. }));
}

#[cfg(unix)]
#[tokio::test]
async fn cancel_interrupts_listening() {
    let cancel = CancellationToken::new();
    let recognizer = sh("sleep 30; echo late");
    let task = tokio::spawn({
        let cancel = cancel.clone();
        async move { recognizer.listen_once(cancel).await }
    });
    cancel.cancel();
    assert_eq!(task.await.unwrap().unwrap(), None);
}

use ratatui::layout::Rect;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::search::{CredentialRequest, Dispatch, Provider, Reply, SearchSession, Ticket};
use crate::speech::{SpeechCapture, SpeechError, SpeechRecognizer, Toggle, UNSUPPORTED_MESSAGE};
use crate::tui::input::TextInput;
use crate::tui::sidebar::Sidebar;

// ── Focus ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    Sidebar,
    Query,
    Answer,
}

impl Focus {
    pub fn next(self) -> Focus {
        match self {
            Focus::Sidebar => Focus::Query,
            Focus::Query => Focus::Answer,
            Focus::Answer => Focus::Sidebar,
        }
    }

    pub fn previous(self) -> Focus {
        match self {
            Focus::Sidebar => Focus::Answer,
            Focus::Query => Focus::Sidebar,
            Focus::Answer => Focus::Query,
        }
    }
}

// ── Search mode (left icon group) ─────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchMode {
    Search,
    Research,
    Labs,
}

impl SearchMode {
    pub fn all() -> [SearchMode; 3] {
        [SearchMode::Search, SearchMode::Research, SearchMode::Labs]
    }

    pub fn label(&self) -> &'static str {
        match self {
            SearchMode::Search   => "Search",
            SearchMode::Research => "Research",
            SearchMode::Labs     => "Labs",
        }
    }

    pub fn next(self) -> SearchMode {
        match self {
            SearchMode::Search   => SearchMode::Research,
            SearchMode::Research => SearchMode::Labs,
            SearchMode::Labs     => SearchMode::Search,
        }
    }
}

// ── Modals ────────────────────────────────────────────────────────────────────

pub enum Modal {
    /// Waiting for the user to type a key for `request.provider`.
    Credential { request: CredentialRequest, input: TextInput },
    Alert(String),
}

// ── App state ─────────────────────────────────────────────────────────────────

pub const QUERY_PLACEHOLDER: &str = "Ask anything or @mention a Space";

pub struct App {
    pub focus: Focus,
    pub sidebar: Sidebar,
    pub query: TextInput,
    pub mode: SearchMode,
    pub provider_index: usize,
    pub answer: Option<Reply>,
    pub session: SearchSession,
    pub modal: Option<Modal>,
    /// Modals raised while another one was open; shown in order on dismiss.
    pub queued_modals: VecDeque<Modal>,
    pub speech: SpeechCapture,
    pub status: String,
    pub answer_scroll: u16,
    /// Answer panel geometry from the last draw, for mouse hit-testing.
    pub answer_rect: Rect,
    /// Largest useful scroll offset for the answer, from the last draw.
    pub answer_max_scroll: u16,
    pub should_quit: bool,
}

impl App {
    pub fn new(provider: Provider, recognizer: Arc<dyn SpeechRecognizer>) -> Self {
        App {
            focus: Focus::Query,
            sidebar: Sidebar::new(),
            query: TextInput::new(),
            mode: SearchMode::Search,
            provider_index: provider.index(),
            answer: None,
            session: SearchSession::new(),
            modal: None,
            queued_modals: VecDeque::new(),
            speech: SpeechCapture::new(recognizer),
            status: String::new(),
            answer_scroll: 0,
            answer_rect: Rect::default(),
            answer_max_scroll: 0,
            should_quit: false,
        }
    }

    pub fn selected_provider(&self) -> Provider {
        Provider::all()[self.provider_index]
    }

    pub fn cycle_provider(&mut self, forward: bool) {
        let n = Provider::all().len();
        self.provider_index = if forward {
            (self.provider_index + 1) % n
        } else {
            (self.provider_index + n - 1) % n
        };
        self.status = format!("Provider: {}", self.selected_provider().label());
    }

    pub fn is_loading(&self) -> bool {
        self.session.is_loading()
    }

    // ── Submission lifecycle ─────────────────────────────────────────────────

    /// Start a submission for the current query. Blank queries are ignored
    /// and leave the answer and loading flag untouched.
    pub fn begin_search(&mut self) -> Option<(Ticket, Provider, String)> {
        if self.query.is_blank() {
            return None;
        }
        let ticket = self.session.begin();
        self.status.clear();
        Some((ticket, self.selected_provider(), self.query.value.trim().to_string()))
    }

    /// Apply the outcome of a submission. Returns `false` when the ticket was
    /// superseded and the outcome was dropped.
    pub fn apply_dispatch(&mut self, ticket: Ticket, dispatch: Dispatch) -> bool {
        if !self.session.complete(ticket) {
            return false;
        }
        match dispatch {
            Dispatch::Skipped => {}
            Dispatch::NeedsCredential(request) => {
                self.show_modal(Modal::Credential { request, input: TextInput::new() });
            }
            Dispatch::Replied(reply) => {
                self.answer = Some(reply);
                self.answer_scroll = 0;
            }
        }
        true
    }

    /// Close the credential prompt and start the second phase. An empty
    /// input declines the prompt.
    pub fn submit_credential(&mut self) -> Option<(Ticket, CredentialRequest, String)> {
        match self.modal.take() {
            Some(Modal::Credential { request, input }) => {
                self.dismiss_modal();
                let ticket = self.session.begin();
                Some((ticket, request, input.value))
            }
            other => {
                self.modal = other;
                None
            }
        }
    }

    pub fn decline_credential(&mut self) -> Option<(Ticket, CredentialRequest, String)> {
        if let Some(Modal::Credential { input, .. }) = &mut self.modal {
            input.clear();
        }
        self.submit_credential()
    }

    pub fn alert(&mut self, message: impl Into<String>) {
        self.show_modal(Modal::Alert(message.into()));
    }

    /// Open `modal`, or queue it behind the one already open.
    pub fn show_modal(&mut self, modal: Modal) {
        if self.modal.is_some() {
            self.queued_modals.push_back(modal);
        } else {
            self.modal = Some(modal);
        }
    }

    /// Close the open modal and bring up the next queued one, if any.
    pub fn dismiss_modal(&mut self) {
        self.modal = self.queued_modals.pop_front();
    }

    // ── Speech ───────────────────────────────────────────────────────────────

    /// Toggle the microphone. Returns the token of a new listening session
    /// that the caller should run.
    pub fn toggle_speech(&mut self) -> Option<CancellationToken> {
        match self.speech.toggle() {
            Toggle::Start(token) => {
                self.status = "Listening… (F5 to stop)".to_string();
                Some(token)
            }
            Toggle::Stopped => {
                self.status = "Stopped listening".to_string();
                None
            }
            Toggle::Unsupported => {
                self.alert(UNSUPPORTED_MESSAGE);
                None
            }
        }
    }

    pub fn apply_speech(
        &mut self,
        token: &CancellationToken,
        result: Result<Option<String>, SpeechError>,
    ) {
        if !self.speech.finish(token) {
            return;
        }
        match result {
            Ok(Some(text)) => {
                self.query.set(&text);
                self.status.clear();
            }
            Ok(None) => self.status.clear(),
            Err(e) => self.status = format!("Speech: {e}"),
        }
    }

    // ── Scrolling ────────────────────────────────────────────────────────────

    pub fn scroll_answer_up(&mut self, lines: u16) {
        self.answer_scroll = self.answer_scroll.saturating_sub(lines);
    }

    pub fn scroll_answer_down(&mut self, lines: u16) {
        self.answer_scroll = self.answer_scroll.saturating_add(lines).min(self.answer_max_scroll);
    }
}

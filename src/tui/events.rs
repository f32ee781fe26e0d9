use anyhow::Result;
use arboard::Clipboard;
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyCode, KeyEvent,
        KeyEventKind, KeyModifiers, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{io, sync::Arc};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::search::{CredentialRequest, Dispatch, Dispatcher, Provider, Ticket};
use crate::speech::SpeechError;
use crate::tui::draw::draw;
use crate::tui::input::handle_text_input_key;
use crate::tui::state::{App, Focus, Modal};

/// Messages from background tasks back to the event loop.
pub enum TaskEvent {
    Search(Ticket, Dispatch),
    Speech(CancellationToken, Result<Option<String>, SpeechError>),
}

/// Everything a key handler needs to start background work.
pub struct Context {
    pub dispatcher: Arc<Dispatcher>,
    pub tx: mpsc::UnboundedSender<TaskEvent>,
    /// Cancelled on exit; every spawned task watches it.
    pub shutdown: CancellationToken,
}

// ── Entry point ───────────────────────────────────────────────────────────────

pub async fn run(dispatcher: Arc<Dispatcher>, mut app: App) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (tx, rx) = mpsc::unbounded_channel();
    let ctx = Context { dispatcher, tx, shutdown: CancellationToken::new() };
    let result = event_loop(&mut terminal, &mut app, &ctx, rx).await;
    ctx.shutdown.cancel();
    app.speech.stop();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    result
}

// ── Event loop ────────────────────────────────────────────────────────────────

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    ctx: &Context,
    mut rx: mpsc::UnboundedReceiver<TaskEvent>,
) -> Result<()> {
    let mut event_stream = EventStream::new();
    let mut tick = tokio::time::interval(std::time::Duration::from_millis(100));

    while !app.should_quit {
        terminal.draw(|f| draw(f, app))?;

        tokio::select! {
            // Redraw so the loading indicator stays live
            _ = tick.tick() => {}

            Some(task_event) = rx.recv() => apply_task_event(app, task_event),

            Some(Ok(event)) = event_stream.next() => match event {
                Event::Key(key) if key.kind != KeyEventKind::Release => handle_key(app, key, ctx),
                Event::Mouse(mouse) => {
                    let r = app.answer_rect;
                    let inside = mouse.column >= r.x && mouse.column < r.x + r.width
                        && mouse.row >= r.y && mouse.row < r.y + r.height;
                    match mouse.kind {
                        MouseEventKind::ScrollUp if inside => app.scroll_answer_up(3),
                        MouseEventKind::ScrollDown if inside => app.scroll_answer_down(3),
                        _ => {}
                    }
                }
                _ => {}
            },
        }
    }
    Ok(())
}

pub fn apply_task_event(app: &mut App, event: TaskEvent) {
    match event {
        TaskEvent::Search(ticket, dispatch) => {
            app.apply_dispatch(ticket, dispatch);
        }
        TaskEvent::Speech(token, result) => app.apply_speech(&token, result),
    }
}

// ── Background work ───────────────────────────────────────────────────────────

fn spawn_search(ctx: &Context, ticket: Ticket, provider: Provider, query: String) {
    let dispatcher = Arc::clone(&ctx.dispatcher);
    let tx = ctx.tx.clone();
    let shutdown = ctx.shutdown.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = shutdown.cancelled() => {}
            dispatch = dispatcher.dispatch(provider, &query) => {
                let _ = tx.send(TaskEvent::Search(ticket, dispatch));
            }
        }
    });
}

fn spawn_credential(ctx: &Context, ticket: Ticket, request: CredentialRequest, key: String) {
    let dispatcher = Arc::clone(&ctx.dispatcher);
    let tx = ctx.tx.clone();
    let shutdown = ctx.shutdown.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = shutdown.cancelled() => {}
            dispatch = dispatcher.supply_credential(request, &key) => {
                let _ = tx.send(TaskEvent::Search(ticket, dispatch));
            }
        }
    });
}

fn spawn_listen(app: &App, ctx: &Context, token: CancellationToken) {
    let recognizer = app.speech.recognizer();
    let tx = ctx.tx.clone();
    let shutdown = ctx.shutdown.clone();
    tokio::spawn(async move {
        let result = tokio::select! {
            _ = shutdown.cancelled() => return,
            r = recognizer.listen_once(token.clone()) => r,
        };
        let _ = tx.send(TaskEvent::Speech(token, result));
    });
}

// ── Key handling ──────────────────────────────────────────────────────────────

pub fn handle_key(app: &mut App, key: KeyEvent, ctx: &Context) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }
    if app.modal.is_some() {
        handle_modal_key(app, key, ctx);
        return;
    }

    match key.code {
        KeyCode::Tab => app.focus = app.focus.next(),
        KeyCode::BackTab => app.focus = app.focus.previous(),
        KeyCode::F(2) => app.cycle_provider(!key.modifiers.contains(KeyModifiers::SHIFT)),
        KeyCode::F(3) => app.sidebar.toggle_collapsed(),
        KeyCode::F(4) => app.mode = app.mode.next(),
        KeyCode::F(5) => {
            if let Some(token) = app.toggle_speech() {
                spawn_listen(app, ctx, token);
            }
        }
        KeyCode::F(6) => share_answer(app),
        KeyCode::F(7) => reset_key(app, ctx),
        _ => match app.focus {
            Focus::Sidebar => handle_sidebar_key(app, key),
            Focus::Query => handle_query_key(app, key, ctx),
            Focus::Answer => handle_answer_key(app, key),
        },
    }
}

fn handle_modal_key(app: &mut App, key: KeyEvent, ctx: &Context) {
    if matches!(app.modal, Some(Modal::Alert(_))) {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
            app.dismiss_modal();
        }
        return;
    }
    match key.code {
        KeyCode::Enter => {
            if let Some((ticket, request, value)) = app.submit_credential() {
                spawn_credential(ctx, ticket, request, value);
            }
        }
        KeyCode::Esc => {
            if let Some((ticket, request, value)) = app.decline_credential() {
                spawn_credential(ctx, ticket, request, value);
            }
        }
        _ => {
            if let Some(Modal::Credential { input, .. }) = &mut app.modal {
                handle_text_input_key(input, key);
            }
        }
    }
}

fn handle_sidebar_key(app: &mut App, key: KeyEvent) {
    if app.sidebar.expanded {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => app.sidebar.entry_previous(),
            KeyCode::Down | KeyCode::Char('j') => app.sidebar.entry_next(),
            KeyCode::Enter => {
                if let Some(entry) = app.sidebar.activate() {
                    app.status = format!("{} › {}", app.sidebar.selected.label(), entry.label);
                }
            }
            KeyCode::Left | KeyCode::Esc => app.sidebar.close(),
            _ => {}
        }
        return;
    }
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.sidebar.select_previous(),
        KeyCode::Down | KeyCode::Char('j') => app.sidebar.select_next(),
        KeyCode::Right | KeyCode::Enter if !app.sidebar.collapsed => app.sidebar.expand(),
        _ => {}
    }
}

fn handle_query_key(app: &mut App, key: KeyEvent, ctx: &Context) {
    match key.code {
        KeyCode::Enter => {
            if let Some((ticket, provider, query)) = app.begin_search() {
                tracing::debug!(ticket = ticket.id(), provider = provider.id(), "submitting");
                spawn_search(ctx, ticket, provider, query);
            }
        }
        KeyCode::Esc => app.query.clear(),
        _ => {
            handle_text_input_key(&mut app.query, key);
        }
    }
}

fn handle_answer_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.scroll_answer_up(1),
        KeyCode::Down | KeyCode::Char('j') => app.scroll_answer_down(1),
        KeyCode::PageUp => app.scroll_answer_up(10),
        KeyCode::PageDown => app.scroll_answer_down(10),
        KeyCode::Home => app.answer_scroll = 0,
        _ => {}
    }
}

fn share_answer(app: &mut App) {
    let Some(reply) = app.answer.as_ref().filter(|r| r.is_success()) else {
        app.status = "Nothing to share yet".to_string();
        return;
    };
    let text = reply.text.clone();
    app.status = match Clipboard::new().and_then(|mut cb| cb.set_text(text)) {
        Ok(()) => "📋 Answer copied to clipboard".to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "clipboard unavailable");
            format!("Clipboard unavailable: {e}")
        }
    };
}

fn reset_key(app: &mut App, ctx: &Context) {
    let provider = app.selected_provider();
    if !provider.requires_key() {
        app.status = format!("{} does not use an API key", provider.label());
        return;
    }
    app.status = match ctx.dispatcher.forget_credential(provider) {
        Ok(true) => format!("{} key cleared; you will be asked on the next search", provider.label()),
        Ok(false) => format!("No {} key stored", provider.label()),
        Err(e) => format!("Could not clear key: {e}"),
    };
}

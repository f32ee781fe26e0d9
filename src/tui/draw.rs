use ratatui::{
    backend::TestBackend,
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame, Terminal,
};

use crate::search::{Provider, ReplyStatus};
use crate::tui::sidebar::{NavItem, ACTIONS, LIBRARY_PLACEHOLDER, LIBRARY_TITLE};
use crate::tui::state::{App, Focus, Modal, SearchMode, QUERY_PLACEHOLDER};

const BG: Color = Color::Rgb(15, 15, 25);
const BORDER: Color = Color::Rgb(50, 50, 80);
const ACCENT: Color = Color::Rgb(44, 152, 163);
const CARD: Color = Color::Rgb(30, 30, 30);
const MAX_MAIN_WIDTH: u16 = 100;

fn border_color(focused: bool) -> Color {
    if focused { Color::Yellow } else { BORDER }
}

// ── Drawing ───────────────────────────────────────────────────────────────────

pub fn draw(f: &mut Frame, app: &mut App) {
    let area = f.area();
    f.render_widget(Block::default().style(Style::default().bg(BG)), area);

    app.sidebar.fit_width(area.width);
    let sidebar_width = if app.sidebar.collapsed { 5 } else { 14 };
    let flyout_width = if app.sidebar.expanded && !app.sidebar.collapsed { 30 } else { 0 };

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(sidebar_width),
            Constraint::Length(flyout_width),
            Constraint::Min(0),
        ])
        .split(area);

    draw_sidebar(f, cols[0], app);
    if flyout_width > 0 {
        draw_flyout(f, cols[1], app);
    }
    draw_main(f, cols[2], app);

    if app.modal.is_some() {
        draw_modal(f, area, app);
    }
}

fn draw_sidebar(f: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus == Focus::Sidebar;
    let collapsed = app.sidebar.collapsed;

    let block = Block::default()
        .borders(Borders::RIGHT)
        .border_style(Style::default().fg(border_color(focused)));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(ACTIONS.len() as u16)])
        .split(inner);

    let nav: Vec<ListItem> = NavItem::all()
        .iter()
        .map(|item| {
            let selected = *item == app.sidebar.selected;
            let style = if selected {
                Style::default().fg(Color::White).bg(Color::Rgb(55, 65, 81)).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            let text = if collapsed {
                format!(" {} ", item.icon())
            } else {
                format!(" {} {}", item.icon(), item.label())
            };
            ListItem::new(Line::from(Span::styled(text, style)))
        })
        .collect();
    f.render_widget(List::new(nav), rows[0]);

    let actions: Vec<ListItem> = ACTIONS
        .iter()
        .map(|a| {
            let text = if collapsed {
                format!(" {} ", &a.label[..1])
            } else {
                format!(" {}", a.label)
            };
            ListItem::new(Span::styled(text, Style::default().fg(Color::DarkGray)))
        })
        .collect();
    f.render_widget(List::new(actions), rows[1]);
}

fn draw_flyout(f: &mut Frame, area: Rect, app: &mut App) {
    let selected = app.sidebar.selected;
    let mut items: Vec<ListItem> = Vec::new();
    let mut entry_rows: Vec<usize> = Vec::new();
    for section in selected.sections() {
        items.push(ListItem::new(Span::styled(
            format!(" {}", section.title),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )));
        for e in section.entries {
            entry_rows.push(items.len());
            let clicked = app.sidebar.clicked == Some(e.id);
            items.push(ListItem::new(Span::styled(
                format!("   {}", e.label),
                Style::default().fg(if clicked { Color::White } else { Color::Gray }),
            )));
        }
    }
    items.push(ListItem::new(""));
    items.push(ListItem::new(Span::styled(
        format!(" {LIBRARY_TITLE}"),
        Style::default().fg(Color::LightBlue),
    )));
    items.push(ListItem::new(Span::styled(
        format!("   {LIBRARY_PLACEHOLDER}"),
        Style::default().fg(Color::DarkGray),
    )));

    // Map the entry cursor onto the row index in the rendered list.
    let mut state = ratatui::widgets::ListState::default();
    state.select(app.sidebar.entry_state.selected().and_then(|i| entry_rows.get(i).copied()));

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::RIGHT)
                .border_style(Style::default().fg(border_color(app.focus == Focus::Sidebar))),
        )
        .style(Style::default().bg(Color::Black))
        .highlight_style(Style::default().fg(Color::Black).bg(ACCENT))
        .highlight_symbol("▶");
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_main(f: &mut Frame, area: Rect, app: &mut App) {
    let width = area.width.min(MAX_MAIN_WIDTH);
    let area = Rect { x: area.x + (area.width - width) / 2, width, ..area };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    let heading = Paragraph::new(Line::from(Span::styled(
        "perplexity",
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::NONE))
    .style(Style::default().bg(BG));
    f.render_widget(heading, Rect { y: rows[0].y + 1, height: 1, ..rows[0] });

    draw_search_card(f, rows[1], app);
    draw_answer(f, rows[2], app);
    draw_footer(f, rows[3], app);
}

fn draw_search_card(f: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus == Focus::Query;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color(focused)))
        .style(Style::default().bg(CARD));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(inner);

    // Query line
    let query_line = if app.query.value.is_empty() && !focused {
        Line::from(Span::styled(format!(" {QUERY_PLACEHOLDER}"), Style::default().fg(Color::DarkGray)))
    } else if app.query.value.is_empty() {
        Line::from(vec![
            Span::raw(" "),
            Span::styled(" ", Style::default().add_modifier(Modifier::REVERSED)),
            Span::styled(QUERY_PLACEHOLDER, Style::default().fg(Color::DarkGray)),
        ])
    } else {
        let (before, cursor_ch, after) = app.query.split_at_cursor();
        let cursor_style = if focused {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default().fg(Color::White)
        };
        Line::from(vec![
            Span::raw(" "),
            Span::styled(before.to_string(), Style::default().fg(Color::White)),
            Span::styled(cursor_ch.to_string(), cursor_style),
            Span::styled(after.to_string(), Style::default().fg(Color::White)),
        ])
    };
    f.render_widget(Paragraph::new(query_line), rows[0]);

    // Control row: modes on the left, provider and actions on the right
    let controls = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(right_controls_width(app))])
        .split(rows[1]);

    let mut left: Vec<Span> = vec![Span::raw(" ")];
    for (i, mode) in SearchMode::all().iter().enumerate() {
        if i > 0 {
            left.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
        }
        let style = if *mode == app.mode {
            Style::default().fg(ACCENT).bg(Color::Rgb(27, 58, 61)).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White).bg(Color::Rgb(24, 24, 24))
        };
        left.push(Span::styled(format!(" {} ", mode.label()), style));
    }
    f.render_widget(Paragraph::new(Line::from(left)), controls[0]);

    f.render_widget(
        Paragraph::new(Line::from(right_controls(app))).alignment(Alignment::Right),
        controls[1],
    );
}

fn right_controls(app: &App) -> Vec<Span<'static>> {
    let chip = Style::default().fg(Color::Rgb(157, 158, 157)).bg(Color::Rgb(42, 42, 42));
    let provider = app.selected_provider();
    let provider_style = if provider.is_enabled() {
        chip.fg(Color::White)
    } else {
        chip.fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
    };
    let mic_style = if app.speech.is_listening() {
        chip.fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        chip
    };
    vec![
        Span::styled(format!(" ◆ {} ", provider.label()), provider_style),
        Span::raw(" "),
        Span::styled(" Web ", chip),
        Span::raw(" "),
        Span::styled(" Attach ", chip),
        Span::raw(" "),
        Span::styled(" Mic ", mic_style),
        Span::raw(" "),
        Span::styled(" Share ", Style::default().fg(Color::Black).bg(Color::Rgb(58, 174, 186))),
        Span::raw(" "),
    ]
}

fn right_controls_width(app: &App) -> u16 {
    right_controls(app).iter().map(|s| s.content.chars().count() as u16).sum()
}

fn draw_answer(f: &mut Frame, area: Rect, app: &mut App) {
    let focused = app.focus == Focus::Answer;
    let title = if app.is_loading() {
        " Answer  [Loading…] ".to_string()
    } else if let Some(reply) = &app.answer {
        format!(" Answer  [{}] ", reply.provider.label())
    } else {
        " Answer ".to_string()
    };

    let mut lines: Vec<Line> = Vec::new();
    if app.is_loading() {
        lines.push(Line::from(Span::styled(
            "Loading…",
            Style::default().fg(ACCENT).add_modifier(Modifier::ITALIC),
        )));
        lines.push(Line::from(""));
    }
    match &app.answer {
        Some(reply) => {
            let color = match reply.status {
                ReplyStatus::Answered => Color::White,
                ReplyStatus::Failed(_) => Color::LightRed,
                ReplyStatus::NotEnabled => Color::Yellow,
            };
            for line in reply.text.lines() {
                lines.push(Line::from(Span::styled(line.to_string(), Style::default().fg(color))));
            }
        }
        None if !app.is_loading() => {
            let provider = app.selected_provider();
            lines.push(Line::from(Span::styled(
                "Type a question and press Enter.",
                Style::default().fg(Color::DarkGray),
            )));
            lines.push(Line::from(Span::styled(
                provider_hint(provider),
                Style::default().fg(Color::DarkGray),
            )));
        }
        None => {}
    }

    let p = Paragraph::new(lines)
        .block(
            Block::default()
                .title(title)
                .title_style(Style::default().fg(if focused { Color::Yellow } else { Color::Cyan }).add_modifier(Modifier::BOLD))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color(focused))),
        )
        .wrap(Wrap { trim: false });
    // line_count includes the block borders.
    let overflow = p.line_count(area.width).saturating_sub(area.height as usize);
    app.answer_max_scroll = overflow.min(u16::MAX as usize) as u16;
    app.answer_scroll = app.answer_scroll.min(app.answer_max_scroll);
    let p = p.scroll((app.answer_scroll, 0));
    app.answer_rect = area;
    f.render_widget(p, area);
}

fn provider_hint(provider: Provider) -> String {
    format!("{} · {}", provider.label(), provider.description())
}

fn draw_footer(f: &mut Frame, area: Rect, app: &App) {
    let text = if !app.status.is_empty() {
        Span::styled(format!(" {}", app.status), Style::default().fg(Color::Yellow))
    } else {
        Span::styled(
            " Enter Search   Tab Focus   F2 Provider   F3 Sidebar   F4 Mode   F5 Mic   F6 Share   F7 Reset key   Ctrl+C Quit ",
            Style::default().fg(Color::DarkGray),
        )
    };
    f.render_widget(Paragraph::new(Line::from(text)).style(Style::default().bg(BG)), area);
}

fn draw_modal(f: &mut Frame, area: Rect, app: &App) {
    let rect = centered_rect(60, 7, area);
    f.render_widget(Clear, rect);
    let (title, lines) = match &app.modal {
        Some(Modal::Credential { request, input }) => {
            let masked = "•".repeat(input.value.chars().count().min(40));
            (
                " API key required ",
                vec![
                    Line::from(Span::styled(request.prompt(), Style::default().fg(Color::White))),
                    Line::from(""),
                    Line::from(vec![
                        Span::styled(masked, Style::default().fg(Color::Cyan)),
                        Span::styled(" ", Style::default().add_modifier(Modifier::REVERSED)),
                    ]),
                    Line::from(""),
                    Line::from(Span::styled(
                        "Enter to save · Esc to cancel",
                        Style::default().fg(Color::DarkGray),
                    )),
                ],
            )
        }
        Some(Modal::Alert(message)) => (
            " Notice ",
            vec![
                Line::from(Span::styled(message.clone(), Style::default().fg(Color::White))),
                Line::from(""),
                Line::from(Span::styled("Press Enter or Esc", Style::default().fg(Color::DarkGray))),
            ],
        ),
        None => return,
    };
    let p = Paragraph::new(lines)
        .block(
            Block::default()
                .title(title)
                .title_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .style(Style::default().bg(CARD)),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(p, rect);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

// ── Test helpers ──────────────────────────────────────────────────────────────

/// Render the current app state into an in-memory buffer using `TestBackend`.
pub fn render_to_buffer(app: &mut App, width: u16, height: u16) -> Buffer {
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend).expect("TestBackend terminal");
    terminal.draw(|f| draw(f, app)).expect("draw");
    terminal.backend().buffer().clone()
}

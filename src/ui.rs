//! Terminal user interface with ratatui.

use crate::api::Backend;
use crate::app::{App, Focus};
use crate::config::ColorConfig;
use crate::dashboard::{
    DashboardView, DetailContent, DetailStatus, DetailView, ProfileView, SmaSignal, Trend,
};
use crate::format::truncate_string;
use crate::models::{RecommendationItem, ResultsLayout, Sender};
use crate::results::{ResultCard, ResultsView, render_results};
use crate::session::Session;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Gauge, Paragraph, Row, Table, TableState, Wrap},
};
use std::str::FromStr;
use std::time::Duration;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// Colors for the UI.
pub struct UiColors {
    pub gain: Color,
    pub loss: Color,
    pub neutral: Color,
    pub user: Color,
    pub bot: Color,
    pub header_bg: Color,
    pub selected_bg: Color,
    pub border: Color,
}

impl Default for UiColors {
    fn default() -> Self {
        Self {
            gain: Color::Green,
            loss: Color::Red,
            neutral: Color::Gray,
            user: Color::LightBlue,
            bot: Color::White,
            header_bg: Color::DarkGray,
            selected_bg: Color::Rgb(40, 40, 60),
            border: Color::DarkGray,
        }
    }
}

impl UiColors {
    /// Build from configured hex codes, keeping defaults for unparsable entries.
    pub fn from_config(config: &ColorConfig) -> Self {
        let defaults = Self::default();
        let parse = |hex: &str, fallback: Color| Color::from_str(hex).unwrap_or(fallback);
        Self {
            gain: parse(&config.gain, defaults.gain),
            loss: parse(&config.loss, defaults.loss),
            user: parse(&config.user, defaults.user),
            bot: parse(&config.bot, defaults.bot),
            border: parse(&config.border, defaults.border),
            ..defaults
        }
    }

    fn trend(&self, trend: Trend) -> Color {
        match trend {
            Trend::Up => self.gain,
            Trend::Down => self.loss,
            Trend::Flat | Trend::Unknown => self.neutral,
        }
    }

    fn sma(&self, signal: SmaSignal) -> Color {
        match signal {
            SmaSignal::Bullish => self.gain,
            SmaSignal::Bearish => self.loss,
            SmaSignal::Unavailable => self.neutral,
        }
    }
}

/// Render the main UI.
pub fn render<B: Backend>(frame: &mut Frame, app: &App<B>, colors: &UiColors) {
    let session = &app.session;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Header
            Constraint::Min(8),    // Transcript and results
            Constraint::Length(3), // Input
            Constraint::Length(1), // Footer
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0], colors);

    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[1]);

    render_transcript(frame, session, main[0], colors);

    let live = session.ticker_running();
    match (&session.detail, session.layout) {
        // Table layout shows the detail in place of the list
        (Some(detail), ResultsLayout::Table) => {
            render_detail(frame, detail, live, main[1], colors)
        }
        _ => render_results_pane(frame, app, main[1], colors),
    }

    render_input(frame, app, chunks[2], colors);
    render_footer(frame, app, chunks[3], colors);

    if let (Some(detail), ResultsLayout::Cards) = (&session.detail, session.layout) {
        let area = centered_rect(80, 85, frame.area());
        frame.render_widget(Clear, area);
        render_detail(frame, detail, live, area, colors);
    }

    if app.show_help {
        render_help_overlay(frame, colors);
    }
}

fn render_header<B: Backend>(frame: &mut Frame, app: &App<B>, area: Rect, colors: &UiColors) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "GENIUSMIND ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            "- stock recommendations | {} | {} messages",
            app.server,
            app.session.transcript.len()
        )),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(colors.border)),
    );

    frame.render_widget(header, area);
}

/// Greedy word wrap used to know the exact number of transcript lines.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let needed = if current.is_empty() {
                word.chars().count()
            } else {
                current.chars().count() + 1 + word.chars().count()
            };
            if needed > width && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            // Hard-split words longer than the line
            while current.chars().count() > width {
                let head: String = current.chars().take(width).collect();
                let tail: String = current.chars().skip(width).collect();
                lines.push(head);
                current = tail;
            }
        }
        lines.push(current);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn render_transcript(frame: &mut Frame, session: &Session, area: Rect, colors: &UiColors) {
    let title = if session.transcript.follows_tail() {
        " Chat ".to_string()
    } else {
        " Chat (scrolled, End to follow) ".to_string()
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.border));
    let inner = block.inner(area);
    let width = inner.width as usize;

    let mut lines: Vec<Line> = Vec::new();
    for message in session.transcript.messages() {
        let color = match message.sender {
            Sender::User => colors.user,
            Sender::Bot => colors.bot,
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!("{} ", message.sent_at.format("%H:%M")),
                Style::default().fg(colors.neutral),
            ),
            Span::styled(
                message.sender.to_string(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
        ]));
        for line in wrap_text(&message.text, width.saturating_sub(2)) {
            lines.push(Line::from(Span::styled(
                format!("  {}", line),
                Style::default().fg(color),
            )));
        }
        if let Some(ref fragment) = message.fragment {
            for line in wrap_text(fragment, width.saturating_sub(4)) {
                lines.push(Line::from(Span::styled(
                    format!("    {}", line),
                    Style::default()
                        .fg(colors.neutral)
                        .add_modifier(Modifier::ITALIC),
                )));
            }
        }
        lines.push(Line::from(""));
    }

    let offset = session
        .transcript
        .first_visible_line(lines.len(), inner.height as usize);

    let transcript = Paragraph::new(lines)
        .block(block)
        .scroll((offset.min(u16::MAX as usize) as u16, 0));
    frame.render_widget(transcript, area);
}

fn render_results_pane<B: Backend>(frame: &mut Frame, app: &App<B>, area: Rect, colors: &UiColors) {
    let session = &app.session;
    let focused = app.focus == Focus::Results && session.detail.is_none();
    let block = Block::default()
        .title(" Recommendations ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { Color::Cyan } else { colors.border }));

    match &session.results {
        ResultsView::Empty => {
            let hint = Paragraph::new("Ask a question to get stock recommendations.")
                .style(Style::default().fg(colors.neutral))
                .block(block);
            frame.render_widget(hint, area);
        }
        ResultsView::NoResults => {
            let notice = Paragraph::new("No stocks matched your request.")
                .style(Style::default().fg(colors.neutral))
                .block(block);
            frame.render_widget(notice, area);
        }
        ResultsView::SystemNotice { title, message } => {
            let notice = Paragraph::new(vec![
                Line::from(Span::styled(
                    title.clone(),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(message.clone()),
            ])
            .wrap(Wrap { trim: true })
            .block(block.border_style(Style::default().fg(Color::Yellow)));
            frame.render_widget(notice, area);
        }
        ResultsView::Stocks(cards) => match session.layout {
            ResultsLayout::Cards => render_cards(frame, cards, session.selected, block, area, colors),
            ResultsLayout::Table => render_table(frame, cards, session.selected, block, area, colors),
        },
    }
}

fn render_cards(
    frame: &mut Frame,
    cards: &[ResultCard],
    selected: usize,
    block: Block,
    area: Rect,
    colors: &UiColors,
) {
    let inner = block.inner(area);
    let width = inner.width.saturating_sub(4) as usize;

    let mut lines: Vec<Line> = Vec::new();
    let mut selected_top = 0;
    for (i, card) in cards.iter().enumerate() {
        let is_selected = i == selected;
        if is_selected {
            selected_top = lines.len();
        }
        let row_style = if is_selected {
            Style::default().bg(colors.selected_bg)
        } else {
            Style::default()
        };

        let mut title = vec![
            Span::raw(if is_selected { "> " } else { "  " }),
            Span::styled(
                format!("{:<8}", card.ticker),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(truncate_string(&card.company_name, 30)),
        ];
        if let Some(ref price) = card.price {
            title.push(Span::styled(format!("  {}", price), Style::default().fg(colors.neutral)));
        }
        lines.push(Line::from(title).style(row_style));

        for line in wrap_text(&card.reason, width) {
            lines.push(Line::from(format!("    {}", line)).style(row_style));
        }
        lines.push(Line::from(""));
    }

    // Keep the highlighted card on screen
    let height = inner.height as usize;
    let offset = if selected_top + 3 > height {
        selected_top + 3 - height
    } else {
        0
    };

    let widget = Paragraph::new(lines)
        .block(block)
        .scroll((offset.min(u16::MAX as usize) as u16, 0));
    frame.render_widget(widget, area);
}

fn render_table(
    frame: &mut Frame,
    cards: &[ResultCard],
    selected: usize,
    block: Block,
    area: Rect,
    colors: &UiColors,
) {
    let header = Row::new(
        ["SYMBOL", "NAME", "PRICE", "WHY"]
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().fg(Color::White))),
    )
    .style(Style::default().bg(colors.header_bg))
    .height(1);

    let rows = cards.iter().map(|card| {
        Row::new(vec![
            Cell::from(card.ticker.clone()),
            Cell::from(truncate_string(&card.company_name, 20)),
            Cell::from(card.price.clone().unwrap_or_else(|| "-".to_string())),
            Cell::from(card.reason.clone()),
        ])
    });

    let widths = [
        Constraint::Length(8),
        Constraint::Length(22),
        Constraint::Length(11),
        Constraint::Min(20),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(Style::default().bg(colors.selected_bg).add_modifier(Modifier::BOLD));

    let mut state = TableState::default();
    state.select(Some(selected));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_detail(
    frame: &mut Frame,
    detail: &DetailView,
    live: bool,
    area: Rect,
    colors: &UiColors,
) {
    let status = if detail.is_loading() {
        " loading..."
    } else if matches!(detail.status, DetailStatus::Failed(_)) {
        " failed"
    } else {
        ""
    };
    let block = Block::default()
        .title(format!(" {} ({}){} ", detail.title(), detail.symbol, status))
        .title_bottom(" Esc/b: back ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(match detail.status {
            DetailStatus::Failed(_) => colors.loss,
            _ => Color::Cyan,
        }));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if let DetailStatus::Failed(ref reason) = detail.status {
        let error = Paragraph::new(vec![
            Line::from(Span::styled(
                detail.title().to_string(),
                Style::default().fg(colors.loss).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(format!("Could not load {}: {}.", detail.symbol, reason)),
        ])
        .wrap(Wrap { trim: true });
        frame.render_widget(error, inner);
        return;
    }

    match &detail.content {
        DetailContent::Profile(profile) => render_profile(frame, profile, inner, colors),
        DetailContent::Dashboard(dashboard) => {
            render_dashboard(frame, dashboard, live, inner, colors)
        }
    }
}

fn label_line<'a>(label: &'a str, value: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{:<12}", label), Style::default().fg(Color::Gray)),
        Span::raw(value),
    ])
}

fn render_profile(frame: &mut Frame, profile: &ProfileView, area: Rect, colors: &UiColors) {
    let lines = vec![
        Line::from(vec![
            Span::styled(
                profile.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  {}", profile.ticker), Style::default().fg(Color::Cyan)),
        ]),
        Line::from(""),
        label_line("Sector", &profile.sector),
        label_line("Industry", &profile.industry),
        label_line("Market Cap", &profile.market_cap),
        label_line("Website", &profile.website),
        Line::from(""),
        Line::from(Span::styled(
            profile.description.clone(),
            Style::default().fg(colors.neutral),
        )),
    ];

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);
}

fn render_dashboard(
    frame: &mut Frame,
    view: &DashboardView,
    live: bool,
    area: Rect,
    colors: &UiColors,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Name and live quote
            Constraint::Length(5), // Ranges
            Constraint::Length(8), // Fundamentals and technicals
            Constraint::Min(2),    // Description
        ])
        .split(area);

    let trend_color = colors.trend(view.trend);
    let quote = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(
                view.profile.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}  {}", view.profile.ticker, view.exchange),
                Style::default().fg(Color::Cyan),
            ),
        ]),
        Line::from(format!("{} / {}", view.profile.sector, view.profile.industry)),
        Line::from(vec![
            Span::styled(
                view.price.clone(),
                Style::default().fg(trend_color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {} ({})", view.change, view.change_percent),
                Style::default().fg(trend_color),
            ),
            Span::styled(
                if live { "  live" } else { "" },
                Style::default().fg(colors.neutral),
            ),
        ]),
    ]);
    frame.render_widget(quote, rows[0]);

    let metrics = Paragraph::new(vec![
        label_line("Day Range", &view.day_range),
        label_line("52W Range", &view.year_range),
        label_line("Volume", &view.volume),
        label_line("Market Cap", &view.profile.market_cap),
        label_line("Website", &view.profile.website),
    ]);
    frame.render_widget(metrics, rows[1]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[2]);

    let fundamentals = Table::new(
        view.fundamentals
            .iter()
            .map(|row| Row::new(vec![Cell::from(row.label), Cell::from(row.value.clone())])),
        [Constraint::Length(18), Constraint::Min(8)],
    )
    .block(
        Block::default()
            .title(" Fundamentals ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(colors.border)),
    );
    frame.render_widget(fundamentals, columns[0]);

    let technicals = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(columns[1]);

    // The gauge fills half a turn at RSI 100
    let rsi_gauge = Gauge::default()
        .block(
            Block::default()
                .title(" RSI ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colors.border)),
        )
        .gauge_style(Style::default().fg(Color::Yellow))
        .ratio((view.rsi_rotation * 2.0).clamp(0.0, 1.0))
        .label(view.rsi.clone());
    frame.render_widget(rsi_gauge, technicals[0]);

    let sma_color = colors.sma(view.sma_signal);
    let sma = Paragraph::new(vec![
        Line::from(Span::styled(
            view.sma_label.clone(),
            Style::default().fg(sma_color).add_modifier(Modifier::BOLD),
        )),
        Line::from(view.sma_text.clone()),
    ])
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .title(" SMA Trend ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(sma_color)),
    );
    frame.render_widget(sma, technicals[1]);

    let description = Paragraph::new(view.profile.description.clone())
        .style(Style::default().fg(colors.neutral))
        .wrap(Wrap { trim: true });
    frame.render_widget(description, rows[3]);
}

fn render_input<B: Backend>(frame: &mut Frame, app: &App<B>, area: Rect, colors: &UiColors) {
    let session = &app.session;
    let focused = app.focus == Focus::Input && session.detail.is_none() && !app.show_help;

    let (title, style) = match session.busy_since() {
        Some(started) => {
            let elapsed = Duration::from_secs(started.elapsed().as_secs());
            let frame_idx = (started.elapsed().as_millis() / 250) as usize % SPINNER.len();
            (
                format!(
                    " {} Thinking... {} ",
                    SPINNER[frame_idx],
                    humantime::format_duration(elapsed)
                ),
                Style::default().fg(colors.neutral),
            )
        }
        None => (" Ask ".to_string(), Style::default()),
    };

    let input = Paragraph::new(session.input.as_str()).style(style).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(if focused { Color::Cyan } else { colors.border })),
    );
    frame.render_widget(input, area);

    if focused && !session.is_busy() {
        let x = area.x + 1 + session.input.chars().count() as u16;
        frame.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}

/// Render the footer with keybindings.
fn render_footer<B: Backend>(frame: &mut Frame, app: &App<B>, area: Rect, colors: &UiColors) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));
    let spans = if app.session.detail.is_some() {
        vec![key(" Esc/b"), Span::raw(":back "), key("^C"), Span::raw(":quit")]
    } else {
        match app.focus {
            Focus::Input => vec![
                key(" Enter"),
                Span::raw(":send "),
                key("Tab"),
                Span::raw(":results "),
                key("F1"),
                Span::raw(":help "),
                key("Esc"),
                Span::raw(":quit"),
            ],
            Focus::Results => vec![
                key(" j/k"),
                Span::raw(":move "),
                key("Enter"),
                Span::raw(":details "),
                key("Tab"),
                Span::raw(":chat "),
                key("?"),
                Span::raw(":help "),
                key("q"),
                Span::raw(":quit"),
            ],
        }
    };

    let footer = Paragraph::new(Line::from(spans)).style(Style::default().bg(colors.header_bg));
    frame.render_widget(footer, area);
}

/// Render help overlay.
fn render_help_overlay(frame: &mut Frame, colors: &UiColors) {
    let area = centered_rect(60, 70, frame.area());

    let help_text = vec![
        Line::from(Span::styled(
            "GENIUSMIND HELP",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Chat:"),
        Line::from("  Enter     Send the query"),
        Line::from("  Tab       Switch to the results"),
        Line::from("  PgUp/PgDn Scroll the chat, End to follow"),
        Line::from("  Esc       Quit"),
        Line::from(""),
        Line::from("Results:"),
        Line::from("  ↑/k ↓/j   Move selection"),
        Line::from("  g/G       First / last"),
        Line::from("  Enter     Open details"),
        Line::from("  Tab/i     Back to the chat"),
        Line::from(""),
        Line::from("Details:"),
        Line::from("  Esc/b     Close or back to list"),
        Line::from(""),
        Line::from("  F1/?      Toggle help"),
        Line::from("  Ctrl+C    Quit"),
        Line::from(""),
        Line::from("Press any key to close"),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(" Help ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colors.border)),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(Clear, area);
    frame.render_widget(help, area);
}

/// Create a centered rectangle.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Render batch mode output (non-interactive).
pub fn render_batch(query: &str, items: &[RecommendationItem]) {
    use chrono::Local;

    println!(
        "\n=== GENIUSMIND {} ===",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    println!("Query: {}\n", query);

    match render_results(Some(items)) {
        ResultsView::Stocks(cards) => {
            println!("{:<8} {:<24} {:>11}  {}", "SYMBOL", "NAME", "PRICE", "WHY");
            println!("{}", "-".repeat(90));
            for card in cards {
                println!(
                    "{:<8} {:<24} {:>11}  {}",
                    card.ticker,
                    truncate_string(&card.company_name, 24),
                    card.price.as_deref().unwrap_or("-"),
                    card.reason
                );
            }
        }
        ResultsView::SystemNotice { title, message } => {
            println!("[{}] {}", title, message);
        }
        ResultsView::NoResults | ResultsView::Empty => println!("No stocks matched your request."),
    }

    println!();
}

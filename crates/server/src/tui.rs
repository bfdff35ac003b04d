use std::collections::VecDeque;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Gauge, Paragraph, Row, Table};

use lookout::Facing;

use crate::server::ServerStats;

const MAX_LOG_LINES: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogLevel {
    Info,
    Warn,
}

struct LogLine {
    level: LogLevel,
    text: String,
}

pub struct TuiState {
    logs: VecDeque<LogLine>,
    scroll_back: usize,
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            logs: VecDeque::new(),
            scroll_back: 0,
        }
    }

    pub fn log_info(&mut self, text: impl Into<String>) {
        self.push(LogLevel::Info, text.into());
    }

    pub fn log_warn(&mut self, text: impl Into<String>) {
        self.push(LogLevel::Warn, text.into());
    }

    fn push(&mut self, level: LogLevel, text: String) {
        if self.logs.len() == MAX_LOG_LINES {
            self.logs.pop_front();
        }
        self.logs.push_back(LogLine { level, text });
    }

    pub fn scroll_up(&mut self) {
        self.scroll_back = (self.scroll_back + 5).min(self.logs.len().saturating_sub(1));
    }

    pub fn scroll_down(&mut self) {
        self.scroll_back = self.scroll_back.saturating_sub(5);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_back = 0;
    }

    fn visible_logs(&self, height: usize) -> impl Iterator<Item = &LogLine> {
        let end = self.logs.len().saturating_sub(self.scroll_back);
        let start = end.saturating_sub(height);
        self.logs.range(start..end)
    }
}

pub fn render(frame: &mut Frame, state: &TuiState, stats: &ServerStats) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(6),
            Constraint::Length(10),
            Constraint::Length(3),
        ])
        .split(frame.area());

    render_header(frame, chunks[0], stats);
    render_status(frame, chunks[1], stats);
    render_network(frame, chunks[2], stats);
    render_entities(frame, chunks[3], stats);
    render_log(frame, chunks[4], state);
    render_help(frame, chunks[5]);
}

fn render_header(frame: &mut Frame, area: Rect, stats: &ServerStats) {
    let uptime = format_duration(stats.uptime_secs);
    let title = format!(" Lookout Server - Uptime: {} ", uptime);

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let text = format!(
        "Tick: {}  |  Clients: {}  |  Entities: {}",
        stats.tick, stats.client_count, stats.entity_count
    );

    let paragraph = Paragraph::new(text)
        .block(block)
        .style(Style::default().fg(Color::White));

    frame.render_widget(paragraph, area);
}

fn render_status(frame: &mut Frame, area: Rect, stats: &ServerStats) {
    let block = Block::default()
        .title(" Status ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let max = stats.max_clients.max(1);
    let client_ratio = stats.client_count as f64 / max as f64;
    let gauge = Gauge::default()
        .block(block)
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(client_ratio.min(1.0))
        .label(format!("{}/{} clients", stats.client_count, stats.max_clients));

    frame.render_widget(gauge, area);
}

fn render_network(frame: &mut Frame, area: Rect, stats: &ServerStats) {
    let block = Block::default()
        .title(" Network ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let lines = vec![
        Line::from(vec![
            Span::styled("Frames: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{} sent", stats.frames_sent),
                Style::default().fg(Color::White),
            ),
        ]),
        Line::from(vec![
            Span::styled("Bytes: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{} sent", format_bytes(stats.bytes_sent)),
                Style::default().fg(Color::White),
            ),
        ]),
    ];

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}

fn render_entities(frame: &mut Frame, area: Rect, stats: &ServerStats) {
    let block = Block::default()
        .title(" Entities ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta));

    let header = Row::new(["Conn", "Address", "Entity", "Position", "Facing", "Skin", "Online"])
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));

    let rows = stats.clients.iter().map(|client| {
        let facing = match client.facing {
            Facing::Right => "right",
            Facing::Left => "left",
        };
        Row::new([
            Cell::from(client.conn_id.to_string()),
            Cell::from(client.addr.clone()),
            Cell::from(client.entity_id.to_string()),
            Cell::from(format!("{}, {}", client.position.x, client.position.y)),
            Cell::from(facing),
            Cell::from(client.skin.clone()),
            Cell::from(format_duration(client.connected_secs)),
        ])
    });

    let widths = [
        Constraint::Length(6),
        Constraint::Length(22),
        Constraint::Length(7),
        Constraint::Length(16),
        Constraint::Length(7),
        Constraint::Min(12),
        Constraint::Length(9),
    ];

    let table = Table::new(rows, widths).header(header).block(block);
    frame.render_widget(table, area);
}

fn render_log(frame: &mut Frame, area: Rect, state: &TuiState) {
    let block = Block::default()
        .title(" Events ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue));

    let height = area.height.saturating_sub(2) as usize;
    let lines: Vec<Line> = state
        .visible_logs(height)
        .map(|line| {
            let color = match line.level {
                LogLevel::Info => Color::White,
                LogLevel::Warn => Color::Yellow,
            };
            Line::from(Span::styled(line.text.clone(), Style::default().fg(color)))
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_help(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .title(" Controls ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let text = Paragraph::new("q/ESC quit  |  PgUp/PgDn scroll events  |  End follow")
        .block(block)
        .style(
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        );

    frame.render_widget(text, area);
}

fn format_duration(secs: u64) -> String {
    let hours = secs / 3600;
    let mins = (secs % 3600) / 60;
    let secs = secs % 60;
    format!("{:02}:{:02}:{:02}", hours, mins, secs)
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{}B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1}KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1}MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1}GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

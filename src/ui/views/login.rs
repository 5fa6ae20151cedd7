//! Notice shown when the session may not open the cities screen.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::ui::theme::theme;

/// Render the login-required notice centred in `area`.
pub fn render_login_required(frame: &mut Frame, area: Rect, admin_role: &str) {
    let t = theme();
    let popup = centered_rect(60, 9, area);
    frame.render_widget(Clear, popup);

    let lines = vec![
        Line::from(Span::styled(
            "Login required",
            Style::default().fg(t.danger).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!(
            "This screen needs a session token with the '{}' role.",
            admin_role
        )),
        Line::from(Span::styled(
            "Run `cityadmin session set --token <TOKEN> --role <ROLE>`, then press [r].",
            Style::default().fg(t.muted),
        )),
    ];

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(Span::styled(" Access denied ", t.title()))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(t.danger)),
        );
    frame.render_widget(paragraph, popup);
}

/// A rectangle `percent_x` wide and `height` rows tall in the middle of `area`.
fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height),
            Constraint::Fill(1),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

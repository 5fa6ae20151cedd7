//! Toast notifications.
//!
//! Mutation outcomes and request failures are reported here; toasts expire
//! on their own and the newest few are stacked in the bottom-right corner.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Severity of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationType {
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationType {
    pub fn icon(&self) -> &'static str {
        match self {
            NotificationType::Info => "ℹ",
            NotificationType::Success => "✓",
            NotificationType::Warning => "⚠",
            NotificationType::Error => "✗",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            NotificationType::Info => Color::Blue,
            NotificationType::Success => Color::Green,
            NotificationType::Warning => Color::Yellow,
            NotificationType::Error => Color::Red,
        }
    }

    /// Errors and warnings stay up longer.
    fn lifetime(&self) -> Duration {
        match self {
            NotificationType::Info | NotificationType::Success => Duration::from_secs(3),
            NotificationType::Warning | NotificationType::Error => Duration::from_secs(6),
        }
    }
}

/// A single toast.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub notification_type: NotificationType,
    created_at: Instant,
    duration: Duration,
}

impl Notification {
    pub fn new(message: impl Into<String>, notification_type: NotificationType) -> Self {
        Self {
            message: message.into(),
            notification_type,
            created_at: Instant::now(),
            duration: notification_type.lifetime(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.duration
    }
}

/// Queue of visible toasts.
#[derive(Debug)]
pub struct NotificationManager {
    notifications: VecDeque<Notification>,
    max_visible: usize,
}

impl Default for NotificationManager {
    fn default() -> Self {
        Self::with_max_visible(3)
    }
}

impl NotificationManager {
    pub fn with_max_visible(max_visible: usize) -> Self {
        Self {
            notifications: VecDeque::new(),
            max_visible,
        }
    }

    /// Add a toast, dropping the oldest beyond the visible limit.
    pub fn push(&mut self, notification: Notification) {
        self.notifications.push_back(notification);
        while self.notifications.len() > self.max_visible {
            self.notifications.pop_front();
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Notification::new(message, NotificationType::Info));
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(Notification::new(message, NotificationType::Success));
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Notification::new(message, NotificationType::Warning));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Notification::new(message, NotificationType::Error));
    }

    /// Remove expired toasts. Called on every tick.
    pub fn tick(&mut self) {
        self.notifications.retain(|n| !n.is_expired());
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.iter()
    }

    /// Render the toasts stacked upward from the bottom-right corner of `area`.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let width = 48.min(area.width.saturating_sub(4));
        // borders plus icon and space
        let inner_width = width.saturating_sub(4).max(1) as usize;

        let mut bottom = area.y + area.height.saturating_sub(2);
        for notification in self.notifications.iter().rev() {
            let text_len = notification.message.chars().count() + 2;
            let height = (text_len.div_ceil(inner_width) as u16) + 2;
            if bottom < area.y + height {
                break;
            }
            let top = bottom - height;
            let x = area.x + area.width.saturating_sub(width + 2);
            render_notification(notification, frame, Rect::new(x, top, width, height));
            bottom = top;
        }
    }
}

fn render_notification(notification: &Notification, frame: &mut Frame, area: Rect) {
    frame.render_widget(Clear, area);

    let style = Style::default().fg(notification.notification_type.color());
    let text = Line::from(vec![
        Span::styled(
            format!("{} ", notification.notification_type.icon()),
            style.add_modifier(Modifier::BOLD),
        ),
        Span::styled(notification.message.as_str(), style),
    ]);

    let paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).border_style(style))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_outlives_success() {
        assert!(NotificationType::Error.lifetime() > NotificationType::Success.lifetime());
    }

    #[test]
    fn test_manager_caps_visible() {
        let mut manager = NotificationManager::with_max_visible(2);
        manager.info("1");
        manager.success("2");
        manager.error("3");
        let messages: Vec<&str> = manager.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, vec!["2", "3"]);
    }

    #[test]
    fn test_tick_drops_expired() {
        let mut manager = NotificationManager::default();
        let mut stale = Notification::new("old", NotificationType::Info);
        stale.duration = Duration::from_millis(1);
        manager.push(stale);
        manager.warning("fresh");
        std::thread::sleep(Duration::from_millis(5));
        manager.tick();

        let messages: Vec<&str> = manager.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, vec!["fresh"]);
    }
}

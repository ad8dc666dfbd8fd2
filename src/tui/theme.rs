//! Colors for the dashboard, kept in line with the CLI output in `display`.

use iocraft::prelude::Color;

use crate::notify::NotificationKind;
use crate::types::{TicketPriority, TicketStatus};

const GRAY: Color = Color::Rgb {
    r: 120,
    g: 120,
    b: 120,
};

#[derive(Debug, Clone)]
pub struct Theme {
    // Lifecycle stages
    pub status_waiting: Color,
    pub status_triage: Color,
    pub status_working: Color,
    pub status_escalated: Color,
    pub status_done: Color,
    pub status_rejected: Color,

    pub priority_urgent: Color,
    pub priority_high: Color,
    pub priority_default: Color,

    pub border: Color,
    pub border_focused: Color,
    pub background: Color,
    pub text: Color,
    pub text_dimmed: Color,
    pub highlight: Color,
    pub id_color: Color,
    pub denied: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            status_waiting: Color::Yellow,
            status_triage: Color::Magenta,
            status_working: Color::Cyan,
            status_escalated: Color::Red,
            status_done: Color::Green,
            status_rejected: GRAY,

            priority_urgent: Color::Red,
            priority_high: Color::Yellow,
            priority_default: Color::White,

            border: GRAY,
            border_focused: Color::Blue,
            background: Color::Reset,
            text: Color::White,
            text_dimmed: GRAY,
            highlight: Color::Blue,
            id_color: Color::Cyan,
            denied: Color::Red,
        }
    }
}

impl Theme {
    pub fn status_color(&self, status: TicketStatus) -> Color {
        match status {
            TicketStatus::Aberto | TicketStatus::AguardandoResposta => self.status_waiting,
            TicketStatus::Aprovado | TicketStatus::TriagemIa => self.status_triage,
            TicketStatus::ComAnalista => self.status_working,
            TicketStatus::Escalado => self.status_escalated,
            TicketStatus::Resolvido | TicketStatus::Fechado => self.status_done,
            TicketStatus::Rejeitado => self.status_rejected,
        }
    }

    pub fn priority_color(&self, priority: TicketPriority) -> Color {
        match priority {
            TicketPriority::Urgente => self.priority_urgent,
            TicketPriority::Alta => self.priority_high,
            _ => self.priority_default,
        }
    }

    pub fn notification_color(&self, kind: NotificationKind) -> Color {
        match kind {
            NotificationKind::Info => Color::Cyan,
            NotificationKind::Warning => Color::Yellow,
            NotificationKind::Error => Color::Red,
            NotificationKind::Success => Color::Green,
        }
    }
}

pub static THEME: std::sync::LazyLock<Theme> = std::sync::LazyLock::new(Theme::default);

pub fn theme() -> &'static Theme {
    &THEME
}

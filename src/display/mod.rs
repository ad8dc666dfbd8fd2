use crate::types::{TicketPriority, TicketStatus};
use jiff::Timestamp;
use owo_colors::OwoColorize;

pub mod formatters;
pub mod tables;

pub use formatters::*;
pub use tables::*;

pub fn format_status_colored(status: TicketStatus) -> String {
    format_status_colored_with_format(status, |s| format!("[{}]", s))
}

pub fn format_status_colored_with_format<F>(status: TicketStatus, format_fn: F) -> String
where
    F: Fn(&str) -> String,
{
    let badge = format_fn(status.as_str());
    match status {
        TicketStatus::Aberto => badge.yellow().to_string(),
        TicketStatus::Aprovado | TicketStatus::TriagemIa => badge.magenta().to_string(),
        TicketStatus::AguardandoResposta | TicketStatus::ComAnalista => badge.cyan().to_string(),
        TicketStatus::Escalado => badge.red().to_string(),
        TicketStatus::Resolvido => badge.green().to_string(),
        TicketStatus::Rejeitado | TicketStatus::Fechado => badge.dimmed().to_string(),
    }
}

pub fn format_priority_colored(priority: TicketPriority) -> String {
    let label = priority.label();
    match priority {
        TicketPriority::Urgente => label.red().bold().to_string(),
        TicketPriority::Alta => label.yellow().to_string(),
        TicketPriority::Media | TicketPriority::Baixa => label.to_string(),
    }
}

/// `dd/mm/yyyy HH:MM` in UTC.
pub fn format_timestamp(ts: Timestamp) -> String {
    ts.strftime("%d/%m/%Y %H:%M").to_string()
}

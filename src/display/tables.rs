//! Table rendering for list commands.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::format_timestamp;
use crate::ticket::Ticket;
use crate::user::{DeletedUserBackup, User};

#[derive(Tabled)]
struct TicketRow {
    #[tabled(rename = "#")]
    id: u64,
    #[tabled(rename = "Título")]
    title: String,
    #[tabled(rename = "Categoria")]
    category: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Prioridade")]
    priority: String,
    #[tabled(rename = "Aberto por")]
    opened_by: String,
    #[tabled(rename = "Aberto em")]
    opened_at: String,
}

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "#")]
    id: u64,
    #[tabled(rename = "Matrícula")]
    matricula: String,
    #[tabled(rename = "Nome")]
    name: String,
    #[tabled(rename = "E-mail")]
    email: String,
    #[tabled(rename = "Departamento")]
    department: String,
    #[tabled(rename = "Nível")]
    level: String,
}

#[derive(Tabled)]
struct BackupRow {
    #[tabled(rename = "Backup")]
    id: u64,
    #[tabled(rename = "Nome")]
    name: String,
    #[tabled(rename = "E-mail")]
    email: String,
    #[tabled(rename = "Motivo")]
    reason: String,
    #[tabled(rename = "Removido por")]
    deleted_by: String,
    #[tabled(rename = "Removido em")]
    deleted_at: String,
    #[tabled(rename = "Status")]
    status: String,
}

pub fn ticket_table(tickets: &[Ticket]) -> String {
    let rows = tickets.iter().map(|t| TicketRow {
        id: t.id,
        title: t.display_title().to_string(),
        category: t.category.clone(),
        status: t.status.to_string(),
        priority: t.priority.to_string(),
        opened_by: t.opened_by_user.name.clone(),
        opened_at: format_timestamp(t.opened_at),
    });
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

pub fn user_table(users: &[User]) -> String {
    let rows = users.iter().map(|u| UserRow {
        id: u.id,
        matricula: u.matricula.clone(),
        name: u.name.clone(),
        email: u.email.clone(),
        department: u.department.clone().unwrap_or_else(|| "-".to_string()),
        level: format!("{} ({})", u.access_level, u.access_level.role_name()),
    });
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

pub fn backup_table(backups: &[DeletedUserBackup]) -> String {
    let rows = backups.iter().map(|b| BackupRow {
        id: b.id,
        name: b.user.name.clone(),
        email: b.user.email.clone(),
        reason: b.deletion_reason.clone(),
        deleted_by: b.deleted_by.clone(),
        deleted_at: format_timestamp(b.deleted_at),
        status: b.status.to_string(),
    });
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

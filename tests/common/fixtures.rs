//! Record builders shared by the integration tests.

use helpdesk::ai::{AiFeedback, AiSolution};
use helpdesk::session::Session;
use helpdesk::ticket::{OpenedBy, Ticket};
use helpdesk::types::{AccessLevel, TicketPriority, TicketStatus};
use helpdesk::user::{BackupStatus, DeletedUserBackup, User};

pub const ANA: &str = "ana@empresa.com";
pub const BRUNO: &str = "bruno@empresa.com";
pub const GESTOR: &str = "gestor@empresa.com";

pub fn ticket(id: u64, status: TicketStatus, owner_email: &str) -> Ticket {
    let name = owner_email.split('@').next().unwrap_or(owner_email).to_string();
    Ticket {
        id,
        category: "Software".to_string(),
        problem: format!("Problema do chamado {id}"),
        status,
        priority: TicketPriority::Media,
        opened_at: "2024-03-01T09:00:00Z".parse().unwrap(),
        approved_or_rejected_at: None,
        escalated_at: None,
        resolved_at: None,
        opened_by_user: OpenedBy {
            name,
            email: owner_email.to_string(),
        },
        rejection_reason: None,
        detailed_description: None,
        title: None,
    }
}

pub fn session(email: &str, level: AccessLevel) -> Session {
    Session::new(email, level)
}

pub fn user(id: u64, name: &str, email: &str, level: AccessLevel) -> User {
    User {
        id,
        matricula: format!("M{id:03}"),
        name: name.to_string(),
        email: email.to_string(),
        department: Some("TI".to_string()),
        profile_id: 1,
        access_level: level,
        approver_id: None,
        active: true,
    }
}

pub fn backup(id: u64, user: User, status: BackupStatus) -> DeletedUserBackup {
    DeletedUserBackup {
        id,
        user,
        deletion_reason: "Desligado da empresa".to_string(),
        deleted_by: GESTOR.to_string(),
        deleted_at: "2024-03-02T10:00:00Z".parse().unwrap(),
        status,
        restored_by: None,
        restored_at: None,
    }
}

pub fn solution(ticket_id: u64, feedback: Option<AiFeedback>) -> AiSolution {
    AiSolution {
        id: ticket_id + 1000,
        ticket_id,
        solution_text: "Limpe o cache do navegador e tente novamente.".to_string(),
        feedback,
        responded_at: "2024-03-01T09:05:00Z".parse().unwrap(),
        feedback_at: None,
    }
}

/// Backend JSON for a ticket, in the `{ "data": ... }` envelope.
pub fn ticket_json(id: u64, status: &str, owner_email: &str) -> serde_json::Value {
    serde_json::json!({
        "data": {
            "id": id,
            "category": "Rede",
            "problem": "Sem acesso à VPN",
            "status": status,
            "priority": 3,
            "openedAt": "2024-03-01T10:00:00Z",
            "openedByUser": { "name": "Ana", "email": owner_email }
        }
    })
}

//! Ticket lifecycle rules: which actions the signed-in user may take on a
//! ticket, given only its current status and the user's access level.
//!
//! Every screen and the dispatcher go through [`can_perform`]; nothing else in
//! the crate compares access levels directly.

use std::fmt;

use crate::error::HelpdeskError;
use crate::session::Session;
use crate::ticket::Ticket;
use crate::types::{AccessLevel, MIN_REASON_CHARS, TicketStatus};
use crate::user::{DeletedUserBackup, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Approve,
    Reject,
    ViewApprovalQueue,
    ViewAiSolution,
    GiveFeedback,
    Resolve,
    Escalate,
    ResolveEscalated,
    ViewEscalatedQueue,
    ViewOwnTickets,
    CreateTicket,
    ManageUsers,
    RestoreUser,
    ViewStatistics,
}

/// Actions that operate on a single ticket, in the order they are offered.
pub const TICKET_ACTIONS: &[Action] = &[
    Action::Approve,
    Action::Reject,
    Action::ViewAiSolution,
    Action::GiveFeedback,
    Action::Resolve,
    Action::Escalate,
    Action::ResolveEscalated,
];

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Action::Approve => "Aprovar",
            Action::Reject => "Rejeitar",
            Action::ViewApprovalQueue => "Chamados para aprovação",
            Action::ViewAiSolution => "Ver solução da IA",
            Action::GiveFeedback => "Avaliar solução da IA",
            Action::Resolve => "Resolver",
            Action::Escalate => "Escalar para gerente",
            Action::ResolveEscalated => "Resolver chamado escalado",
            Action::ViewEscalatedQueue => "Chamados escalados",
            Action::ViewOwnTickets => "Meus chamados",
            Action::CreateTicket => "Novo chamado",
            Action::ManageUsers => "Gerenciar usuários",
            Action::RestoreUser => "Restaurar usuário",
            Action::ViewStatistics => "Estatísticas",
        }
    }

    pub fn required_level(&self) -> AccessLevel {
        match self {
            Action::Approve
            | Action::Reject
            | Action::ViewApprovalQueue
            | Action::ResolveEscalated
            | Action::ViewEscalatedQueue
            | Action::ViewStatistics => AccessLevel::GESTOR,
            Action::Resolve | Action::Escalate => AccessLevel::ANALISTA,
            Action::ManageUsers | Action::RestoreUser => AccessLevel::GERENTE,
            Action::ViewAiSolution
            | Action::GiveFeedback
            | Action::ViewOwnTickets
            | Action::CreateTicket => AccessLevel::USUARIO,
        }
    }

    /// Statuses in which a ticket-scoped action is available.
    pub fn required_statuses(&self) -> Option<&'static [TicketStatus]> {
        match self {
            Action::Approve | Action::Reject => Some(&[TicketStatus::Aberto]),
            Action::ViewAiSolution | Action::GiveFeedback => {
                Some(&[TicketStatus::AguardandoResposta])
            }
            Action::Resolve | Action::Escalate => Some(&[TicketStatus::ComAnalista]),
            Action::ResolveEscalated => Some(&[TicketStatus::Escalado]),
            _ => None,
        }
    }

    /// Whether the ticket must belong to the signed-in user.
    pub fn requires_ownership(&self) -> bool {
        matches!(
            self,
            Action::ViewAiSolution | Action::GiveFeedback | Action::ViewOwnTickets
        )
    }

    /// Whether submitting the action needs a free-text reason.
    pub fn requires_reason(&self) -> bool {
        matches!(self, Action::Reject | Action::Escalate)
    }

    /// Status the backend is expected to move the ticket to.
    pub fn target_status(&self) -> Option<TicketStatus> {
        match self {
            Action::Approve => Some(TicketStatus::Aprovado),
            Action::Reject => Some(TicketStatus::Rejeitado),
            Action::Resolve | Action::ResolveEscalated => Some(TicketStatus::Resolvido),
            Action::Escalate => Some(TicketStatus::Escalado),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Why an action is unavailable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    InsufficientLevel {
        required: AccessLevel,
        actual: AccessLevel,
    },
    WrongStatus {
        allowed: &'static [TicketStatus],
        actual: TicketStatus,
    },
    NotOwner,
    TicketRequired,
    NotRestorable,
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Denial::InsufficientLevel { required, actual } => write!(
                f,
                "requer nível de acesso {required} ({}), nível atual é {actual}",
                required.role_name()
            ),
            Denial::WrongStatus { allowed, actual } => {
                let allowed: Vec<&str> = allowed.iter().map(|s| s.as_str()).collect();
                write!(
                    f,
                    "o chamado está '{actual}', a ação requer '{}'",
                    allowed.join("' ou '")
                )
            }
            Denial::NotOwner => write!(f, "o chamado foi aberto por outro usuário"),
            Denial::TicketRequired => write!(f, "nenhum chamado selecionado"),
            Denial::NotRestorable => write!(f, "este usuário já foi restaurado"),
        }
    }
}

impl Denial {
    pub fn into_error(self, action: Action) -> HelpdeskError {
        match self {
            Denial::InsufficientLevel { required, actual } => HelpdeskError::AccessDenied {
                action: action.label().to_string(),
                required,
                actual,
            },
            other => HelpdeskError::Validation(format!("{}: {}", action.label(), other)),
        }
    }
}

/// Decide whether `session` may perform `action`, optionally on `ticket`.
///
/// Ticket-scoped actions without a ticket are denied with
/// [`Denial::TicketRequired`]; queue-level actions ignore the ticket.
pub fn can_perform(
    action: Action,
    session: &Session,
    ticket: Option<&Ticket>,
) -> Result<(), Denial> {
    let required = action.required_level();
    if session.access_level < required {
        return Err(Denial::InsufficientLevel {
            required,
            actual: session.access_level,
        });
    }

    let statuses = action.required_statuses();
    if statuses.is_none() && !action.requires_ownership() {
        return Ok(());
    }

    let Some(ticket) = ticket else {
        return if statuses.is_some() {
            Err(Denial::TicketRequired)
        } else {
            Ok(())
        };
    };

    if let Some(allowed) = statuses
        && !allowed.contains(&ticket.status)
    {
        return Err(Denial::WrongStatus {
            allowed,
            actual: ticket.status,
        });
    }

    if action.requires_ownership() && !ticket.is_opened_by(&session.email) {
        return Err(Denial::NotOwner);
    }

    Ok(())
}

/// Ticket actions currently available to `session`.
pub fn legal_actions(session: &Session, ticket: &Ticket) -> Vec<Action> {
    TICKET_ACTIONS
        .iter()
        .copied()
        .filter(|action| can_perform(*action, session, Some(ticket)).is_ok())
        .collect()
}

/// Whether `session` may edit `target`. Anyone may edit their own profile;
/// editing others needs user-management rights.
pub fn can_edit_user(session: &Session, target: &User) -> Result<(), Denial> {
    if session.is_self(&target.email) {
        return Ok(());
    }
    can_perform(Action::ManageUsers, session, None)
}

pub fn can_restore(session: &Session, backup: &DeletedUserBackup) -> Result<(), Denial> {
    can_perform(Action::RestoreUser, session, None)?;
    if !backup.is_restorable() {
        return Err(Denial::NotRestorable);
    }
    Ok(())
}

/// Whether a rejection/escalation reason is long enough to submit.
///
/// Length is counted in characters on the trimmed text.
pub fn reason_is_valid(reason: &str) -> bool {
    reason.trim().chars().count() >= MIN_REASON_CHARS
}

pub fn validate_reason(reason: &str) -> crate::error::Result<()> {
    if reason_is_valid(reason) {
        Ok(())
    } else {
        Err(HelpdeskError::Validation(format!(
            "O motivo deve ter pelo menos {MIN_REASON_CHARS} caracteres."
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ticket::OpenedBy;
    use crate::types::{ALL_STATUSES, TicketPriority};
    use crate::user::BackupStatus;

    fn ticket(status: TicketStatus, owner: &str) -> Ticket {
        Ticket {
            id: 1,
            category: "Software".to_string(),
            problem: "Erro".to_string(),
            status,
            priority: TicketPriority::Media,
            opened_at: "2024-01-01T00:00:00Z".parse().unwrap(),
            approved_or_rejected_at: None,
            escalated_at: None,
            resolved_at: None,
            opened_by_user: OpenedBy {
                name: owner.to_string(),
                email: format!("{owner}@empresa.com"),
            },
            rejection_reason: None,
            detailed_description: None,
            title: None,
        }
    }

    fn session(level: AccessLevel) -> Session {
        Session::new("ana@empresa.com", level)
    }

    #[test]
    fn test_below_gestor_never_approves() {
        for level in [AccessLevel::USUARIO, AccessLevel::ANALISTA] {
            for status in ALL_STATUSES {
                let t = ticket(*status, "bruno");
                let actions = legal_actions(&session(level), &t);
                assert!(!actions.contains(&Action::Approve));
                assert!(!actions.contains(&Action::Reject));
                assert!(!actions.contains(&Action::ResolveEscalated));
            }
        }
    }

    #[test]
    fn test_gestor_approves_open_tickets() {
        let t = ticket(TicketStatus::Aberto, "bruno");
        let actions = legal_actions(&session(AccessLevel::GESTOR), &t);
        assert_eq!(actions, vec![Action::Approve, Action::Reject]);

        let t = ticket(TicketStatus::Aprovado, "bruno");
        assert!(legal_actions(&session(AccessLevel::GESTOR), &t).is_empty());
    }

    #[test]
    fn test_analyst_resolves_or_escalates() {
        let t = ticket(TicketStatus::ComAnalista, "bruno");
        let actions = legal_actions(&session(AccessLevel::ANALISTA), &t);
        assert_eq!(actions, vec![Action::Resolve, Action::Escalate]);
    }

    #[test]
    fn test_escalated_needs_gestor() {
        let t = ticket(TicketStatus::Escalado, "bruno");
        assert_eq!(
            can_perform(Action::ResolveEscalated, &session(AccessLevel::ANALISTA), Some(&t)),
            Err(Denial::InsufficientLevel {
                required: AccessLevel::GESTOR,
                actual: AccessLevel::ANALISTA
            })
        );
        assert!(
            can_perform(Action::ResolveEscalated, &session(AccessLevel::GERENTE), Some(&t))
                .is_ok()
        );
    }

    #[test]
    fn test_ai_feedback_is_owner_only() {
        let own = ticket(TicketStatus::AguardandoResposta, "ana");
        let other = ticket(TicketStatus::AguardandoResposta, "bruno");
        let s = session(AccessLevel::USUARIO);

        assert_eq!(
            legal_actions(&s, &own),
            vec![Action::ViewAiSolution, Action::GiveFeedback]
        );
        assert_eq!(
            can_perform(Action::GiveFeedback, &s, Some(&other)),
            Err(Denial::NotOwner)
        );
        // Level does not grant access to someone else's AI answer.
        assert_eq!(
            can_perform(Action::GiveFeedback, &session(AccessLevel::ADMIN), Some(&other)),
            Err(Denial::NotOwner)
        );
    }

    #[test]
    fn test_wrong_status_denial() {
        let t = ticket(TicketStatus::Resolvido, "bruno");
        let denial = can_perform(Action::Resolve, &session(AccessLevel::ANALISTA), Some(&t))
            .unwrap_err();
        assert!(matches!(denial, Denial::WrongStatus { actual: TicketStatus::Resolvido, .. }));
        assert!(denial.to_string().contains("Com Analista"));
    }

    #[test]
    fn test_ticket_required() {
        assert_eq!(
            can_perform(Action::Approve, &session(AccessLevel::GESTOR), None),
            Err(Denial::TicketRequired)
        );
    }

    #[test]
    fn test_queue_access() {
        assert!(
            can_perform(Action::ViewApprovalQueue, &session(AccessLevel::USUARIO), None).is_err()
        );
        assert!(
            can_perform(Action::ViewApprovalQueue, &session(AccessLevel::GESTOR), None).is_ok()
        );
        assert!(can_perform(Action::ViewOwnTickets, &session(AccessLevel::USUARIO), None).is_ok());
        let other = ticket(TicketStatus::Aberto, "bruno");
        assert_eq!(
            can_perform(Action::ViewOwnTickets, &session(AccessLevel::USUARIO), Some(&other)),
            Err(Denial::NotOwner)
        );
    }

    #[test]
    fn test_reason_length() {
        assert!(!reason_is_valid("123456789"));
        assert!(reason_is_valid("1234567890"));
        assert!(!reason_is_valid("   12345   "));
        // Multi-byte characters count once each.
        assert!(reason_is_valid("ááááááááát"));
        assert!(validate_reason("curto").is_err());
    }

    #[test]
    fn test_denial_into_error() {
        let err = Denial::InsufficientLevel {
            required: AccessLevel::GESTOR,
            actual: AccessLevel::USUARIO,
        }
        .into_error(Action::Approve);
        assert!(matches!(err, HelpdeskError::AccessDenied { .. }));

        let err = Denial::NotOwner.into_error(Action::GiveFeedback);
        assert!(matches!(err, HelpdeskError::Validation(_)));
    }

    #[test]
    fn test_denial_text_is_portuguese() {
        let t = ticket(TicketStatus::Aprovado, "bruno");
        let err = can_perform(Action::Approve, &session(AccessLevel::GESTOR), Some(&t))
            .unwrap_err()
            .into_error(Action::Approve);
        assert_eq!(
            err.user_message(),
            "Aprovar: o chamado está 'Aprovado', a ação requer 'Aberto'"
        );
        assert_eq!(
            Denial::NotOwner.into_error(Action::GiveFeedback).user_message(),
            "Avaliar solução da IA: o chamado foi aberto por outro usuário"
        );
    }

    fn user(id: u64, email: &str, level: AccessLevel) -> User {
        User {
            id,
            matricula: format!("M{id:03}"),
            name: email.to_string(),
            email: email.to_string(),
            department: None,
            profile_id: 1,
            access_level: level,
            approver_id: None,
            active: true,
        }
    }

    fn backup(status: BackupStatus) -> DeletedUserBackup {
        DeletedUserBackup {
            id: 4,
            user: user(12, "davi@empresa.com", AccessLevel::USUARIO),
            deletion_reason: "Desligado da empresa".to_string(),
            deleted_by: "gerente@empresa.com".to_string(),
            deleted_at: "2024-03-02T10:00:00Z".parse().unwrap(),
            status,
            restored_by: None,
            restored_at: None,
        }
    }

    #[test]
    fn test_restored_backup_is_not_restorable() {
        let gerente = session(AccessLevel::GERENTE);
        assert!(can_restore(&gerente, &backup(BackupStatus::Ativo)).is_ok());
        assert_eq!(
            can_restore(&gerente, &backup(BackupStatus::Restaurado)),
            Err(Denial::NotRestorable)
        );
        // Level is checked before the backup state.
        assert!(matches!(
            can_restore(&session(AccessLevel::GESTOR), &backup(BackupStatus::Restaurado)),
            Err(Denial::InsufficientLevel { .. })
        ));
    }

    #[test]
    fn test_edit_own_profile_only_below_gerente() {
        let own = user(10, "ana@empresa.com", AccessLevel::USUARIO);
        let other = user(11, "bruno@empresa.com", AccessLevel::USUARIO);

        for level in [AccessLevel::USUARIO, AccessLevel::ANALISTA, AccessLevel::GESTOR] {
            assert!(can_edit_user(&session(level), &own).is_ok());
            assert!(matches!(
                can_edit_user(&session(level), &other),
                Err(Denial::InsufficientLevel { .. })
            ));
        }
        assert!(can_edit_user(&session(AccessLevel::GERENTE), &other).is_ok());
        assert!(can_edit_user(&session(AccessLevel::ADMIN), &other).is_ok());
    }

    #[test]
    fn test_target_statuses_follow_lifecycle() {
        for (action, from) in [
            (Action::Approve, TicketStatus::Aberto),
            (Action::Reject, TicketStatus::Aberto),
            (Action::Resolve, TicketStatus::ComAnalista),
            (Action::Escalate, TicketStatus::ComAnalista),
            (Action::ResolveEscalated, TicketStatus::Escalado),
        ] {
            let target = action.target_status().unwrap();
            assert!(from.can_transition_to(target), "{action:?}: {from} -> {target}");
        }
    }
}

//! Mutating actions.
//!
//! [`ActionDispatcher::dispatch`] runs one user action end to end: local
//! checks, a single backend call, then either close-modal / notify / refetch
//! on success or notify-and-keep-state on failure. Nothing is retried.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::ai::{AiFeedback, AiSolution};
use crate::api::HelpdeskApi;
use crate::error::{HelpdeskError, Result};
use crate::notify::{NotificationKind, Notifier};
use crate::policy::{self, Action, can_edit_user, can_perform, can_restore};
use crate::repository::TicketRepository;
use crate::ticket::{NewTicket, Ticket};
use crate::types::AccessLevel;
use crate::user::{DeletedUserBackup, User, UserForm};

/// Shown when the action succeeded but the follow-up refetch did not.
pub const REFRESH_FAILED_MESSAGE: &str = "Não foi possível atualizar a lista de chamados.";

#[derive(Debug, Clone)]
pub enum ActionRequest {
    Approve(Ticket),
    Reject { ticket: Ticket, motivo: String },
    Resolve(Ticket),
    Escalate { ticket: Ticket, motivo: String },
    ResolveEscalated(Ticket),
    SubmitFeedback {
        ticket: Ticket,
        solution: AiSolution,
        feedback: AiFeedback,
    },
    CreateTicket(NewTicket),
    CreateUser(UserForm),
    UpdateUser { target: User, form: UserForm },
    DeactivateUser { target: User, motivo: String },
    RestoreUser(DeletedUserBackup),
}

/// Identifies an outstanding request for the duplicate-submission guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InFlightKey {
    pub kind: &'static str,
    pub entity_id: u64,
}

impl fmt::Display for InFlightKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entity_id == 0 {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{} #{}", self.kind, self.entity_id)
        }
    }
}

impl ActionRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            ActionRequest::Approve(_) => "approve",
            ActionRequest::Reject { .. } => "reject",
            ActionRequest::Resolve(_) => "resolve",
            ActionRequest::Escalate { .. } => "escalate",
            ActionRequest::ResolveEscalated(_) => "resolve-escalated",
            ActionRequest::SubmitFeedback { .. } => "feedback",
            ActionRequest::CreateTicket(_) => "create-ticket",
            ActionRequest::CreateUser(_) => "create-user",
            ActionRequest::UpdateUser { .. } => "update-user",
            ActionRequest::DeactivateUser { .. } => "deactivate-user",
            ActionRequest::RestoreUser(_) => "restore-user",
        }
    }

    /// Entity the action targets; 0 for creations.
    pub fn entity_id(&self) -> u64 {
        match self {
            ActionRequest::Approve(t)
            | ActionRequest::Resolve(t)
            | ActionRequest::ResolveEscalated(t)
            | ActionRequest::Reject { ticket: t, .. }
            | ActionRequest::Escalate { ticket: t, .. }
            | ActionRequest::SubmitFeedback { ticket: t, .. } => t.id,
            ActionRequest::UpdateUser { target, .. }
            | ActionRequest::DeactivateUser { target, .. } => target.id,
            ActionRequest::RestoreUser(backup) => backup.id,
            ActionRequest::CreateTicket(_) | ActionRequest::CreateUser(_) => 0,
        }
    }

    pub fn key(&self) -> InFlightKey {
        InFlightKey {
            kind: self.kind(),
            entity_id: self.entity_id(),
        }
    }

    /// Whether success changes ticket collections and so triggers a refetch.
    pub fn affects_tickets(&self) -> bool {
        !matches!(
            self,
            ActionRequest::CreateUser(_)
                | ActionRequest::UpdateUser { .. }
                | ActionRequest::DeactivateUser { .. }
                | ActionRequest::RestoreUser(_)
        )
    }
}

/// What a successful dispatch produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Completed {
    Done,
    Ticket(Ticket),
    User(User),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub message: String,
    pub completed: Completed,
}

/// The modal hosting an action, as seen by the dispatcher.
pub trait ModalControl: Send {
    /// Disable or re-enable the submit button.
    fn set_processing(&mut self, processing: bool);
    fn close(&mut self);
}

/// For callers without a modal (the CLI).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoModal;

impl ModalControl for NoModal {
    fn set_processing(&mut self, _processing: bool) {}
    fn close(&mut self) {}
}

struct InFlightGuard<'a> {
    pending: &'a Mutex<HashSet<InFlightKey>>,
    key: InFlightKey,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(pending: &'a Mutex<HashSet<InFlightKey>>, key: InFlightKey) -> Result<Self> {
        if !pending.lock().insert(key) {
            return Err(HelpdeskError::InFlight(key.to_string()));
        }
        Ok(Self { pending, key })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.pending.lock().remove(&self.key);
    }
}

pub struct ActionDispatcher<A> {
    repository: Arc<TicketRepository<A>>,
    notifier: Arc<dyn Notifier>,
    in_flight: Mutex<HashSet<InFlightKey>>,
}

impl<A: HelpdeskApi> ActionDispatcher<A> {
    pub fn new(repository: Arc<TicketRepository<A>>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            repository,
            notifier,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn repository(&self) -> &Arc<TicketRepository<A>> {
        &self.repository
    }

    pub fn is_in_flight(&self, key: InFlightKey) -> bool {
        self.in_flight.lock().contains(&key)
    }

    /// Run `request`, driving `modal` and the notifier.
    ///
    /// On failure the modal stays open with its input intact, the error is
    /// notified and returned. A failed refetch after a successful call is
    /// notified as a warning but does not fail the action.
    pub async fn dispatch<M: ModalControl>(
        &self,
        request: ActionRequest,
        modal: &mut M,
    ) -> Result<Outcome> {
        if let Err(e) = self.validate(&request) {
            tracing::debug!(action = request.kind(), "rejected locally: {e}");
            self.notifier
                .notify(NotificationKind::Error, &e.user_message());
            return Err(e);
        }

        let _guard = match InFlightGuard::acquire(&self.in_flight, request.key()) {
            Ok(guard) => guard,
            Err(e) => {
                tracing::debug!(action = request.kind(), "duplicate submission ignored");
                return Err(e);
            }
        };

        modal.set_processing(true);
        let result = self.perform(&request).await;
        modal.set_processing(false);

        match result {
            Ok(outcome) => {
                tracing::info!(
                    action = request.kind(),
                    entity = request.entity_id(),
                    "action succeeded"
                );
                modal.close();
                self.notifier
                    .notify(NotificationKind::Success, &outcome.message);

                if request.affects_tickets()
                    && let Err(e) = self.repository.refresh().await
                {
                    tracing::warn!(action = request.kind(), "refetch after write failed: {e}");
                    self.notifier
                        .notify(NotificationKind::Warning, REFRESH_FAILED_MESSAGE);
                }
                Ok(outcome)
            }
            Err(e) => {
                tracing::warn!(
                    action = request.kind(),
                    entity = request.entity_id(),
                    "action failed: {e}"
                );
                self.notifier
                    .notify(NotificationKind::Error, &e.user_message());
                Err(e)
            }
        }
    }

    /// Local preconditions. Nothing is sent when these fail.
    pub fn validate(&self, request: &ActionRequest) -> Result<()> {
        let session = self.repository.session();
        let check = |action: Action, ticket: Option<&Ticket>| {
            can_perform(action, session, ticket).map_err(|d| d.into_error(action))
        };

        match request {
            ActionRequest::Approve(t) => check(Action::Approve, Some(t)),
            ActionRequest::Reject { ticket, motivo } => {
                check(Action::Reject, Some(ticket))?;
                policy::validate_reason(motivo)
            }
            ActionRequest::Resolve(t) => check(Action::Resolve, Some(t)),
            ActionRequest::Escalate { ticket, motivo } => {
                check(Action::Escalate, Some(ticket))?;
                policy::validate_reason(motivo)
            }
            ActionRequest::ResolveEscalated(t) => check(Action::ResolveEscalated, Some(t)),
            ActionRequest::SubmitFeedback {
                ticket, solution, ..
            } => {
                check(Action::GiveFeedback, Some(ticket))?;
                if solution.ticket_id != ticket.id {
                    return Err(HelpdeskError::Validation(format!(
                        "A solução #{} não pertence ao chamado #{}.",
                        solution.id, ticket.id
                    )));
                }
                if !solution.accepts_feedback() {
                    return Err(HelpdeskError::Validation(
                        "O feedback desta solução já foi registrado.".to_string(),
                    ));
                }
                Ok(())
            }
            ActionRequest::CreateTicket(form) => {
                check(Action::CreateTicket, None)?;
                form.validate()
            }
            ActionRequest::CreateUser(form) => {
                check(Action::ManageUsers, None)?;
                form.validate()
            }
            ActionRequest::UpdateUser { target, form } => {
                can_edit_user(session, target).map_err(|d| d.into_error(Action::ManageUsers))?;
                if session.is_self(&target.email)
                    && session.access_level < AccessLevel::GERENTE
                    && form.access_level != target.access_level
                {
                    return Err(HelpdeskError::Validation(
                        "Você não pode alterar o seu próprio nível de acesso.".to_string(),
                    ));
                }
                form.validate()
            }
            ActionRequest::DeactivateUser { target, motivo } => {
                check(Action::ManageUsers, None)?;
                if session.is_self(&target.email) {
                    return Err(HelpdeskError::Validation(
                        "Você não pode desativar o seu próprio usuário.".to_string(),
                    ));
                }
                policy::validate_reason(motivo)
            }
            ActionRequest::RestoreUser(backup) => {
                can_restore(session, backup).map_err(|d| d.into_error(Action::RestoreUser))
            }
        }
    }

    async fn perform(&self, request: &ActionRequest) -> Result<Outcome> {
        let api = self.repository.api();
        let done = |message: String| Outcome {
            message,
            completed: Completed::Done,
        };

        match request {
            ActionRequest::Approve(t) => {
                api.approve_ticket(t.id).await?;
                Ok(done(format!("Chamado #{} aprovado com sucesso!", t.id)))
            }
            ActionRequest::Reject { ticket, motivo } => {
                api.reject_ticket(ticket.id, motivo).await?;
                Ok(done(format!("Chamado #{} rejeitado com sucesso!", ticket.id)))
            }
            ActionRequest::Resolve(t) => {
                api.resolve_ticket(t.id).await?;
                Ok(done(format!("Chamado #{} resolvido com sucesso!", t.id)))
            }
            ActionRequest::Escalate { ticket, motivo } => {
                api.escalate_ticket(ticket.id, motivo).await?;
                Ok(done(format!(
                    "Chamado #{} escalado para o gerente com sucesso!",
                    ticket.id
                )))
            }
            ActionRequest::ResolveEscalated(t) => {
                api.resolve_escalated(t.id).await?;
                Ok(done(format!(
                    "Chamado escalado #{} resolvido com sucesso!",
                    t.id
                )))
            }
            ActionRequest::SubmitFeedback {
                ticket, feedback, ..
            } => {
                api.submit_ai_feedback(ticket.id, *feedback).await?;
                let message = match feedback {
                    AiFeedback::DeuCerto => {
                        format!("Obrigado pelo feedback! Chamado #{} resolvido.", ticket.id)
                    }
                    AiFeedback::DeuErrado => format!(
                        "Feedback registrado. Chamado #{} encaminhado para um analista.",
                        ticket.id
                    ),
                };
                Ok(done(message))
            }
            ActionRequest::CreateTicket(form) => {
                let ticket = api.create_ticket(form).await?;
                Ok(Outcome {
                    message: format!("Chamado #{} criado com sucesso!", ticket.id),
                    completed: Completed::Ticket(ticket),
                })
            }
            ActionRequest::CreateUser(form) => {
                let user = api.create_user(form).await?;
                Ok(Outcome {
                    message: format!("Usuário {} criado com sucesso!", user.name),
                    completed: Completed::User(user),
                })
            }
            ActionRequest::UpdateUser { target, form } => {
                let user = api.update_user(target.id, form).await?;
                Ok(Outcome {
                    message: format!("Usuário {} atualizado com sucesso!", user.name),
                    completed: Completed::User(user),
                })
            }
            ActionRequest::DeactivateUser { target, motivo } => {
                api.deactivate_user(target.id, motivo).await?;
                Ok(done(format!(
                    "Usuário {} desativado com sucesso!",
                    target.name
                )))
            }
            ActionRequest::RestoreUser(backup) => {
                api.restore_user(backup.id).await?;
                Ok(done(format!(
                    "Usuário {} restaurado com sucesso!",
                    backup.user.name
                )))
            }
        }
    }
}

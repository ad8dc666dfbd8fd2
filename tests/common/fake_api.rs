//! In-memory backend implementing [`HelpdeskApi`] with the server's
//! status transitions, for repository and dispatcher tests.

use std::collections::HashMap;
use std::sync::Arc;

use jiff::Timestamp;
use parking_lot::Mutex;
use tokio::sync::Notify;

use helpdesk::ai::{AiFeedback, AiSolution};
use helpdesk::api::{HelpdeskApi, TicketView};
use helpdesk::error::{HelpdeskError, Result};
use helpdesk::stats::StatsSummary;
use helpdesk::ticket::{NewTicket, OpenedBy, Ticket};
use helpdesk::types::TicketStatus;
use helpdesk::user::{BackupStatus, DeletedUserBackup, User, UserForm};

#[derive(Default)]
struct FakeState {
    tickets: Vec<Ticket>,
    solutions: HashMap<u64, AiSolution>,
    users: Vec<User>,
    backups: Vec<DeletedUserBackup>,
    stats: Option<StatsSummary>,
    next_id: u64,
    /// Every call, as "METHOD path"
    calls: Vec<String>,
    /// Next mutation fails with this status and message
    fail_next_write: Option<(u16, String)>,
    fail_lists: bool,
}

pub struct FakeApi {
    /// E-mail the fake treats as the caller (the `x-user-email` header)
    email: String,
    state: Mutex<FakeState>,
    /// When set, approvals wait for a notification before completing
    approval_gate: Mutex<Option<Arc<Notify>>>,
}

fn not_found(what: &str) -> HelpdeskError {
    HelpdeskError::Request {
        status: 404,
        message: format!("{what} não encontrado"),
    }
}

impl FakeApi {
    pub fn new(email: &str) -> Self {
        Self {
            email: email.to_string(),
            state: Mutex::new(FakeState {
                next_id: 500,
                ..Default::default()
            }),
            approval_gate: Mutex::new(None),
        }
    }

    pub fn with_tickets(self, tickets: Vec<Ticket>) -> Self {
        self.state.lock().tickets = tickets;
        self
    }

    pub fn with_solution(self, solution: AiSolution) -> Self {
        self.state.lock().solutions.insert(solution.ticket_id, solution);
        self
    }

    pub fn with_users(self, users: Vec<User>) -> Self {
        self.state.lock().users = users;
        self
    }

    pub fn with_backups(self, backups: Vec<DeletedUserBackup>) -> Self {
        self.state.lock().backups = backups;
        self
    }

    pub fn with_stats(self, stats: StatsSummary) -> Self {
        self.state.lock().stats = Some(stats);
        self
    }

    /// Hold approvals until the returned handle is notified.
    pub fn gate_approvals(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.approval_gate.lock() = Some(gate.clone());
        gate
    }

    pub fn fail_next_write(&self, status: u16, message: &str) {
        self.state.lock().fail_next_write = Some((status, message.to_string()));
    }

    pub fn fail_lists(&self, fail: bool) {
        self.state.lock().fail_lists = fail;
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    pub fn write_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| !c.starts_with("GET "))
            .collect()
    }

    pub fn ticket_status(&self, id: u64) -> Option<TicketStatus> {
        self.state
            .lock()
            .tickets
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.status)
    }

    pub fn solution(&self, ticket_id: u64) -> Option<AiSolution> {
        self.state.lock().solutions.get(&ticket_id).cloned()
    }

    pub fn user(&self, id: u64) -> Option<User> {
        self.state.lock().users.iter().find(|u| u.id == id).cloned()
    }

    pub fn backup_status(&self, id: u64) -> Option<BackupStatus> {
        self.state
            .lock()
            .backups
            .iter()
            .find(|b| b.id == id)
            .map(|b| b.status)
    }

    fn record(&self, call: String) {
        self.state.lock().calls.push(call);
    }

    /// Record a mutation and apply any pending failure.
    fn begin_write(&self, call: String) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.push(call);
        match state.fail_next_write.take() {
            Some((status, message)) => Err(HelpdeskError::Request { status, message }),
            None => Ok(()),
        }
    }

    /// Move a ticket from one of `from` to `to`, like the backend does.
    fn transition(
        &self,
        id: u64,
        from: &[TicketStatus],
        to: TicketStatus,
        reason: Option<&str>,
    ) -> Result<()> {
        let mut state = self.state.lock();
        let ticket = state
            .tickets
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| not_found("Chamado"))?;
        if !from.contains(&ticket.status) {
            return Err(HelpdeskError::Request {
                status: 400,
                message: format!("Chamado #{id} não pode ser alterado no status {}", ticket.status),
            });
        }

        let now = Timestamp::now();
        ticket.status = to;
        match to {
            TicketStatus::Aprovado | TicketStatus::Rejeitado => {
                ticket.approved_or_rejected_at = Some(now)
            }
            TicketStatus::Escalado => ticket.escalated_at = Some(now),
            TicketStatus::Resolvido => ticket.resolved_at = Some(now),
            _ => {}
        }
        if to == TicketStatus::Rejeitado {
            ticket.rejection_reason = reason.map(str::to_string);
        }
        Ok(())
    }
}

impl HelpdeskApi for FakeApi {
    async fn list_tickets(&self, view: TicketView) -> Result<Vec<Ticket>> {
        self.record(format!("GET {}", view.path()));
        let state = self.state.lock();
        if state.fail_lists {
            return Err(HelpdeskError::Network("connection refused".to_string()));
        }
        let tickets = state
            .tickets
            .iter()
            .filter(|t| match view {
                TicketView::Own => t.is_opened_by(&self.email),
                TicketView::PendingApproval => t.status == TicketStatus::Aberto,
                TicketView::Escalated => t.status == TicketStatus::Escalado,
            })
            .cloned()
            .collect();
        Ok(tickets)
    }

    async fn get_ticket(&self, id: u64) -> Result<Ticket> {
        self.record(format!("GET chamados/{id}"));
        self.state
            .lock()
            .tickets
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(HelpdeskError::TicketNotFound(id))
    }

    async fn create_ticket(&self, form: &NewTicket) -> Result<Ticket> {
        self.begin_write("POST chamados".to_string())?;
        let mut state = self.state.lock();
        state.next_id += 1;
        let ticket = Ticket {
            id: state.next_id,
            category: form.category.clone(),
            problem: form.problem.clone(),
            status: TicketStatus::Aberto,
            priority: form.priority,
            opened_at: Timestamp::now(),
            approved_or_rejected_at: None,
            escalated_at: None,
            resolved_at: None,
            opened_by_user: OpenedBy {
                name: self.email.clone(),
                email: self.email.clone(),
            },
            rejection_reason: None,
            detailed_description: form.detailed_description.clone(),
            title: form.title.clone(),
        };
        state.tickets.push(ticket.clone());
        Ok(ticket)
    }

    async fn approve_ticket(&self, id: u64) -> Result<()> {
        let gate = self.approval_gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.begin_write(format!("POST chamados/{id}/aprovar"))?;
        self.transition(id, &[TicketStatus::Aberto], TicketStatus::Aprovado, None)
    }

    async fn reject_ticket(&self, id: u64, motivo: &str) -> Result<()> {
        self.begin_write(format!("POST chamados/{id}/rejeitar motivo={motivo}"))?;
        self.transition(id, &[TicketStatus::Aberto], TicketStatus::Rejeitado, Some(motivo))
    }

    async fn resolve_ticket(&self, id: u64) -> Result<()> {
        self.begin_write(format!("POST chamados/{id}/resolver"))?;
        self.transition(id, &[TicketStatus::ComAnalista], TicketStatus::Resolvido, None)
    }

    async fn escalate_ticket(&self, id: u64, motivo: &str) -> Result<()> {
        self.begin_write(format!("POST chamados/{id}/escalar motivo={motivo}"))?;
        self.transition(id, &[TicketStatus::ComAnalista], TicketStatus::Escalado, None)
    }

    async fn resolve_escalated(&self, id: u64) -> Result<()> {
        self.begin_write(format!("POST chamados/{id}/resolver-escalado"))?;
        self.transition(id, &[TicketStatus::Escalado], TicketStatus::Resolvido, None)
    }

    async fn ai_solution(&self, ticket_id: u64) -> Result<AiSolution> {
        self.record(format!("GET chamados/{ticket_id}/solucao-ia"));
        self.state
            .lock()
            .solutions
            .get(&ticket_id)
            .cloned()
            .ok_or_else(|| not_found("Solução"))
    }

    async fn submit_ai_feedback(&self, ticket_id: u64, feedback: AiFeedback) -> Result<()> {
        self.begin_write(format!("POST chamados/{ticket_id}/feedback-ia {feedback}"))?;
        {
            let mut state = self.state.lock();
            let solution = state
                .solutions
                .get_mut(&ticket_id)
                .ok_or_else(|| not_found("Solução"))?;
            if solution.feedback.is_some() {
                return Err(HelpdeskError::Request {
                    status: 400,
                    message: "Feedback já registrado para esta solução".to_string(),
                });
            }
            solution.feedback = Some(feedback);
            solution.feedback_at = Some(Timestamp::now());
        }
        self.transition(
            ticket_id,
            &[TicketStatus::AguardandoResposta],
            feedback.resulting_status(),
            None,
        )
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        self.record("GET users".to_string());
        Ok(self.state.lock().users.clone())
    }

    async fn get_user(&self, id: u64) -> Result<User> {
        self.record(format!("GET users/{id}"));
        self.state
            .lock()
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| not_found("Usuário"))
    }

    async fn create_user(&self, form: &UserForm) -> Result<User> {
        self.begin_write("POST users".to_string())?;
        let mut state = self.state.lock();
        state.next_id += 1;
        let user = User {
            id: state.next_id,
            matricula: form.matricula.clone(),
            name: form.name.clone(),
            email: form.email.clone(),
            department: form.department.clone(),
            profile_id: form.profile_id,
            access_level: form.access_level,
            approver_id: form.approver_id,
            active: true,
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn update_user(&self, id: u64, form: &UserForm) -> Result<User> {
        self.begin_write(format!("PUT users/{id}"))?;
        let mut state = self.state.lock();
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| not_found("Usuário"))?;
        user.matricula = form.matricula.clone();
        user.name = form.name.clone();
        user.email = form.email.clone();
        user.department = form.department.clone();
        user.profile_id = form.profile_id;
        user.access_level = form.access_level;
        user.approver_id = form.approver_id;
        Ok(user.clone())
    }

    async fn deactivate_user(&self, id: u64, motivo: &str) -> Result<()> {
        self.begin_write(format!("DELETE users/{id} motivo={motivo}"))?;
        let mut state = self.state.lock();
        let position = state
            .users
            .iter()
            .position(|u| u.id == id)
            .ok_or_else(|| not_found("Usuário"))?;
        let user = state.users.remove(position);
        let backup_id = state.backups.len() as u64 + 1;
        state.backups.push(DeletedUserBackup {
            id: backup_id,
            user,
            deletion_reason: motivo.to_string(),
            deleted_by: self.email.clone(),
            deleted_at: Timestamp::now(),
            status: BackupStatus::Ativo,
            restored_by: None,
            restored_at: None,
        });
        Ok(())
    }

    async fn list_deleted_users(&self) -> Result<Vec<DeletedUserBackup>> {
        self.record("GET users/deleted".to_string());
        Ok(self.state.lock().backups.clone())
    }

    async fn restore_user(&self, backup_id: u64) -> Result<()> {
        self.begin_write(format!("POST users/restore/{backup_id}"))?;
        let mut state = self.state.lock();
        let backup = state
            .backups
            .iter_mut()
            .find(|b| b.id == backup_id)
            .ok_or_else(|| not_found("Backup"))?;
        backup.status = BackupStatus::Restaurado;
        backup.restored_by = Some(self.email.clone());
        backup.restored_at = Some(Timestamp::now());
        let user = backup.user.clone();
        state.users.push(user);
        Ok(())
    }

    async fn statistics(&self) -> Result<StatsSummary> {
        self.record("GET estatisticas/resumo".to_string());
        self.state
            .lock()
            .stats
            .clone()
            .ok_or_else(|| not_found("Recurso"))
    }
}

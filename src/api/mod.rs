//! Helpdesk REST API client.
//!
//! [`HelpdeskApi`] is the seam between the view-model layer and the backend;
//! [`http::HttpApi`] implements it over reqwest. All endpoints live under a
//! single base URL and identify the caller with an `x-user-email` header.

pub mod error;
pub mod http;

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use serde::Deserialize;

use crate::ai::{AiFeedback, AiSolution};
use crate::error::{HelpdeskError, Result};
use crate::policy::Action;
use crate::stats::StatsSummary;
use crate::ticket::{NewTicket, Ticket};
use crate::user::{DeletedUserBackup, User, UserForm};

pub use http::HttpApi;

/// Role-scoped ticket collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TicketView {
    /// Tickets opened by the signed-in user ("Meus Chamados").
    Own,
    /// Tickets waiting for a manager's decision.
    PendingApproval,
    /// Tickets escalated by analysts.
    Escalated,
}

pub const ALL_VIEWS: &[TicketView] = &[
    TicketView::Own,
    TicketView::PendingApproval,
    TicketView::Escalated,
];

impl TicketView {
    pub fn path(&self) -> &'static str {
        match self {
            TicketView::Own => "chamados",
            TicketView::PendingApproval => "chamados/aprovacao",
            TicketView::Escalated => "chamados/escalados",
        }
    }

    /// Permission needed to list this view.
    pub fn required_action(&self) -> Action {
        match self {
            TicketView::Own => Action::ViewOwnTickets,
            TicketView::PendingApproval => Action::ViewApprovalQueue,
            TicketView::Escalated => Action::ViewEscalatedQueue,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            TicketView::Own => "Meus Chamados",
            TicketView::PendingApproval => "Aprovação",
            TicketView::Escalated => "Escalados",
        }
    }
}

impl fmt::Display for TicketView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketView::Own => write!(f, "mine"),
            TicketView::PendingApproval => write!(f, "pending"),
            TicketView::Escalated => write!(f, "escalated"),
        }
    }
}

impl FromStr for TicketView {
    type Err = HelpdeskError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "mine" | "own" => Ok(TicketView::Own),
            "pending" | "aprovacao" => Ok(TicketView::PendingApproval),
            "escalated" | "escalados" => Ok(TicketView::Escalated),
            _ => Err(HelpdeskError::Validation(format!(
                "unknown view '{s}', expected mine, pending or escalated"
            ))),
        }
    }
}

/// Success payload: either `{ "data": ... }` or the bare value.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Payload<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Payload<T> {
    pub fn into_inner(self) -> T {
        match self {
            Payload::Wrapped { data } => data,
            Payload::Bare(value) => value,
        }
    }
}

/// Operations offered by the helpdesk backend.
pub trait HelpdeskApi: Send + Sync {
    fn list_tickets(&self, view: TicketView) -> impl Future<Output = Result<Vec<Ticket>>> + Send;

    fn get_ticket(&self, id: u64) -> impl Future<Output = Result<Ticket>> + Send;

    fn create_ticket(&self, form: &NewTicket) -> impl Future<Output = Result<Ticket>> + Send;

    fn approve_ticket(&self, id: u64) -> impl Future<Output = Result<()>> + Send;

    fn reject_ticket(&self, id: u64, motivo: &str) -> impl Future<Output = Result<()>> + Send;

    fn resolve_ticket(&self, id: u64) -> impl Future<Output = Result<()>> + Send;

    fn escalate_ticket(&self, id: u64, motivo: &str) -> impl Future<Output = Result<()>> + Send;

    fn resolve_escalated(&self, id: u64) -> impl Future<Output = Result<()>> + Send;

    fn ai_solution(&self, ticket_id: u64) -> impl Future<Output = Result<AiSolution>> + Send;

    fn submit_ai_feedback(
        &self,
        ticket_id: u64,
        feedback: AiFeedback,
    ) -> impl Future<Output = Result<()>> + Send;

    fn list_users(&self) -> impl Future<Output = Result<Vec<User>>> + Send;

    fn get_user(&self, id: u64) -> impl Future<Output = Result<User>> + Send;

    fn create_user(&self, form: &UserForm) -> impl Future<Output = Result<User>> + Send;

    fn update_user(&self, id: u64, form: &UserForm) -> impl Future<Output = Result<User>> + Send;

    fn deactivate_user(&self, id: u64, motivo: &str) -> impl Future<Output = Result<()>> + Send;

    fn list_deleted_users(&self) -> impl Future<Output = Result<Vec<DeletedUserBackup>>> + Send;

    fn restore_user(&self, backup_id: u64) -> impl Future<Output = Result<()>> + Send;

    fn statistics(&self) -> impl Future<Output = Result<StatsSummary>> + Send;
}

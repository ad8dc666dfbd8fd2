//! Ticket lifecycle commands: approve, reject, resolve, escalate,
//! resolve-escalated and AI feedback.

use std::sync::Arc;

use super::{connect, console_dispatcher, outcome_output};
use crate::ai::AiFeedback;
use crate::api::{HelpdeskApi, HttpApi};
use crate::dispatch::{ActionRequest, NoModal};
use crate::error::Result;
use crate::repository::TicketRepository;

async fn run(
    repository: Arc<TicketRepository<HttpApi>>,
    request: ActionRequest,
    output_json: bool,
) -> Result<()> {
    let dispatcher = console_dispatcher(repository, output_json);
    let kind = request.kind();
    let id = request.entity_id();
    let outcome = dispatcher.dispatch(request, &mut NoModal).await?;
    outcome_output(kind, id, &outcome).print(output_json)
}

/// Approve a ticket waiting in the approval queue
pub async fn cmd_approve(id: u64, output_json: bool) -> Result<()> {
    let repository = connect()?;
    let ticket = repository.ticket(id).await?;
    run(repository, ActionRequest::Approve(ticket), output_json).await
}

/// Reject a ticket with a reason of at least ten characters
pub async fn cmd_reject(id: u64, motivo: &str, output_json: bool) -> Result<()> {
    let repository = connect()?;
    let ticket = repository.ticket(id).await?;
    let request = ActionRequest::Reject {
        ticket,
        motivo: motivo.to_string(),
    };
    run(repository, request, output_json).await
}

pub async fn cmd_resolve(id: u64, output_json: bool) -> Result<()> {
    let repository = connect()?;
    let ticket = repository.ticket(id).await?;
    run(repository, ActionRequest::Resolve(ticket), output_json).await
}

/// Escalate a ticket to a manager
pub async fn cmd_escalate(id: u64, motivo: &str, output_json: bool) -> Result<()> {
    let repository = connect()?;
    let ticket = repository.ticket(id).await?;
    let request = ActionRequest::Escalate {
        ticket,
        motivo: motivo.to_string(),
    };
    run(repository, request, output_json).await
}

pub async fn cmd_resolve_escalated(id: u64, output_json: bool) -> Result<()> {
    let repository = connect()?;
    let ticket = repository.ticket(id).await?;
    run(repository, ActionRequest::ResolveEscalated(ticket), output_json).await
}

/// Record whether the AI solution for a ticket worked
pub async fn cmd_feedback(id: u64, feedback: AiFeedback, output_json: bool) -> Result<()> {
    let repository = connect()?;
    let ticket = repository.ticket(id).await?;
    let solution = repository.api().ai_solution(id).await?;
    let request = ActionRequest::SubmitFeedback {
        ticket,
        solution,
        feedback,
    };
    run(repository, request, output_json).await
}

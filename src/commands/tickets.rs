use serde_json::json;

use super::{CommandOutput, connect, console_dispatcher};
use crate::api::{HelpdeskApi, TicketView};
use crate::dispatch::{ActionRequest, Completed, NoModal};
use crate::display::{TicketFormatter, ticket_table};
use crate::error::Result;
use crate::policy::{Action, can_perform, legal_actions};
use crate::ticket::NewTicket;
use crate::types::TicketPriority;

/// List one of the role-scoped ticket views
pub async fn cmd_tickets(view: TicketView, output_json: bool) -> Result<()> {
    let repository = connect()?;
    let tickets = repository.fetch(view).await?;

    let text = if tickets.is_empty() {
        format!("Nenhum chamado em \"{}\".", view.title())
    } else {
        format!("{}\n\n{} chamado(s)", ticket_table(&tickets), tickets.len())
    };

    CommandOutput::new(serde_json::to_value(&tickets)?)
        .with_text(text)
        .print(output_json)
}

/// Show a ticket and the actions available to the signed-in user
pub async fn cmd_show(id: u64, output_json: bool) -> Result<()> {
    let repository = connect()?;
    let ticket = repository.ticket(id).await?;
    let actions = legal_actions(repository.session(), &ticket);

    let action_names: Vec<String> = actions.iter().map(|a| format!("{a:?}")).collect();
    let mut json_output = serde_json::to_value(&ticket)?;
    if let Some(fields) = json_output.as_object_mut() {
        fields.insert("actions".to_string(), json!(action_names));
    }

    CommandOutput::new(json_output)
        .with_text(TicketFormatter::format_detail(&ticket, &actions))
        .print(output_json)
}

/// Fields of `helpdesk new`
#[derive(Debug, Clone)]
pub struct NewTicketOptions {
    pub category: String,
    pub problem: String,
    pub priority: TicketPriority,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl From<NewTicketOptions> for NewTicket {
    fn from(options: NewTicketOptions) -> Self {
        NewTicket {
            category: options.category,
            problem: options.problem,
            priority: options.priority,
            title: options.title,
            detailed_description: options.description,
        }
    }
}

/// Open a new ticket
pub async fn cmd_new(options: NewTicketOptions, output_json: bool) -> Result<()> {
    let repository = connect()?;
    let dispatcher = console_dispatcher(repository, output_json);
    let outcome = dispatcher
        .dispatch(ActionRequest::CreateTicket(options.into()), &mut NoModal)
        .await?;

    let json_output = match &outcome.completed {
        Completed::Ticket(ticket) => json!({
            "action": "created",
            "id": ticket.id,
            "status": ticket.status.as_str(),
            "message": outcome.message,
        }),
        _ => json!({ "action": "created", "message": outcome.message }),
    };
    CommandOutput::new(json_output).with_text("").print(output_json)
}

/// Show the AI-suggested solution for one of the user's tickets
pub async fn cmd_solution(id: u64, output_json: bool) -> Result<()> {
    let repository = connect()?;
    let ticket = repository.ticket(id).await?;
    can_perform(Action::ViewAiSolution, repository.session(), Some(&ticket))
        .map_err(|denial| denial.into_error(Action::ViewAiSolution))?;
    let solution = repository.api().ai_solution(id).await?;

    CommandOutput::new(serde_json::to_value(&solution)?)
        .with_text(TicketFormatter::format_solution(&solution))
        .print(output_json)
}

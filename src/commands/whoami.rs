use serde_json::json;

use super::CommandOutput;
use crate::config::Config;
use crate::display::UserFormatter;
use crate::error::Result;
use crate::policy::{Action, can_perform};

const QUEUE_ACTIONS: &[Action] = &[
    Action::ViewOwnTickets,
    Action::CreateTicket,
    Action::ViewApprovalQueue,
    Action::ViewEscalatedQueue,
    Action::ViewStatistics,
    Action::ManageUsers,
    Action::RestoreUser,
];

/// Show the configured session and what it may access. Works offline.
pub fn cmd_whoami(output_json: bool) -> Result<()> {
    let config = Config::load()?;
    let session = config.session()?;

    let allowed: Vec<Action> = QUEUE_ACTIONS
        .iter()
        .copied()
        .filter(|a| can_perform(*a, &session, None).is_ok())
        .collect();

    let json_output = json!({
        "email": session.email,
        "name": session.name,
        "user_id": session.user_id,
        "access_level": session.access_level.get(),
        "role": session.access_level.role_name(),
        "api_url": config.api_url(),
        "permissions": allowed.iter().map(|a| format!("{a:?}")).collect::<Vec<_>>(),
    });

    let labels: Vec<&str> = allowed.iter().map(|a| a.label()).collect();
    let text = format!(
        "{}\n  Acesso: {}",
        UserFormatter::format_session(&session),
        labels.join(", ")
    );

    CommandOutput::new(json_output)
        .with_text(text)
        .print(output_json)
}

//! Command implementations for the `helpdesk` binary.
//!
//! Every command builds a JSON value and, where it differs, a human-readable
//! text rendering; [`CommandOutput::print`] picks one based on `--json`.

mod actions;
mod config;
mod dashboard;
mod stats;
mod tickets;
mod users;
mod whoami;

pub use actions::{
    cmd_approve, cmd_escalate, cmd_feedback, cmd_reject, cmd_resolve, cmd_resolve_escalated,
};
pub use config::{cmd_config_get, cmd_config_set, cmd_config_show};
pub use dashboard::cmd_dashboard;
pub use stats::cmd_stats;
pub use tickets::{NewTicketOptions, cmd_new, cmd_show, cmd_solution, cmd_tickets};
pub use users::{
    UserFields, cmd_users_create, cmd_users_deactivate, cmd_users_deleted, cmd_users_edit,
    cmd_users_ls, cmd_users_restore, cmd_users_show,
};
pub use whoami::cmd_whoami;

use std::sync::Arc;

use serde_json::json;

use crate::api::HttpApi;
use crate::config::Config;
use crate::dispatch::{ActionDispatcher, Outcome};
use crate::error::Result;
use crate::notify::{ConsoleNotifier, Notifier};
use crate::repository::TicketRepository;

/// Output of a command in both renderings.
pub struct CommandOutput {
    json: serde_json::Value,
    text: Option<String>,
}

impl CommandOutput {
    pub fn new(json: serde_json::Value) -> Self {
        Self { json, text: None }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Print JSON when `output_json` is set, otherwise the text rendering
    /// (falling back to pretty JSON when no text was given).
    pub fn print(self, output_json: bool) -> Result<()> {
        match self.text {
            Some(text) if !output_json => {
                if !text.is_empty() {
                    println!("{text}");
                }
                Ok(())
            }
            _ => print_json(&self.json),
        }
    }
}

pub fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Repository for the configured backend and session.
pub(crate) fn connect() -> Result<Arc<TicketRepository<HttpApi>>> {
    let config = Config::load()?;
    let session = config.session()?;
    let api = HttpApi::from_config(&config)?;
    tracing::debug!(api = %api.base_url(), user = %session.email, "connecting");
    Ok(Arc::new(TicketRepository::new(Arc::new(api), session)))
}

/// Dispatcher printing notifications to the console. With `--json` only
/// warnings are printed, to stderr.
pub(crate) fn console_dispatcher(
    repository: Arc<TicketRepository<HttpApi>>,
    output_json: bool,
) -> ActionDispatcher<HttpApi> {
    let notifier: Arc<dyn Notifier> = Arc::new(ConsoleNotifier::new(output_json));
    ActionDispatcher::new(repository, notifier)
}

/// JSON rendering of a completed action. The text rendering is the success
/// notification already printed by the dispatcher.
pub(crate) fn outcome_output(action: &str, id: u64, outcome: &Outcome) -> CommandOutput {
    CommandOutput::new(json!({
        "action": action,
        "id": id,
        "success": true,
        "message": outcome.message,
    }))
    .with_text("")
}

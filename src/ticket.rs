//! Ticket (chamado) records as returned by the backend, and the new-ticket form.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::error::{HelpdeskError, Result};
use crate::policy::reason_is_valid;
use crate::types::{TicketPriority, TicketStatus};

/// The user who opened a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenedBy {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: u64,
    pub category: String,
    pub problem: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,

    pub opened_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_or_rejected_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalated_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<Timestamp>,

    pub opened_by_user: OpenedBy,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Ticket {
    /// Title if present, otherwise the problem summary.
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.problem)
    }

    pub fn is_opened_by(&self, email: &str) -> bool {
        self.opened_by_user.email.eq_ignore_ascii_case(email)
    }

    /// Check the record-level invariants: lifecycle timestamps never go
    /// backwards, and a rejection reason exists exactly when the ticket is
    /// rejected.
    pub fn check_invariants(&self) -> Result<()> {
        let ordered = [
            ("openedAt", Some(self.opened_at)),
            ("approvedOrRejectedAt", self.approved_or_rejected_at),
            ("escalatedAt", self.escalated_at),
            ("resolvedAt", self.resolved_at),
        ];

        let mut previous: Option<(&str, Timestamp)> = None;
        for (name, ts) in ordered {
            let Some(ts) = ts else { continue };
            if let Some((prev_name, prev_ts)) = previous
                && ts < prev_ts
            {
                return Err(HelpdeskError::Validation(format!(
                    "ticket #{}: {name} precedes {prev_name}",
                    self.id
                )));
            }
            previous = Some((name, ts));
        }

        let has_reason = self
            .rejection_reason
            .as_deref()
            .is_some_and(reason_is_valid);
        let rejected = self.status == TicketStatus::Rejeitado;
        if rejected != has_reason {
            return Err(HelpdeskError::Validation(if rejected {
                format!("ticket #{} is rejected without a valid reason", self.id)
            } else {
                format!("ticket #{} has a rejection reason but is {}", self.id, self.status)
            }));
        }

        Ok(())
    }
}

/// Body of `POST /chamados`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTicket {
    pub category: String,
    pub problem: String,
    pub priority: TicketPriority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_description: Option<String>,
}

impl NewTicket {
    pub fn new(category: impl Into<String>, problem: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            problem: problem.into(),
            priority: TicketPriority::default(),
            title: None,
            detailed_description: None,
        }
    }

    pub fn with_priority(mut self, priority: TicketPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.detailed_description = Some(description.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.category.trim().is_empty() {
            return Err(HelpdeskError::Validation(
                "Selecione uma categoria.".to_string(),
            ));
        }
        if self.problem.trim().is_empty() {
            return Err(HelpdeskError::Validation(
                "Descreva o problema.".to_string(),
            ));
        }
        Ok(())
    }
}

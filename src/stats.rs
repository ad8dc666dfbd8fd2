//! Dashboard aggregates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ticket::Ticket;
use crate::types::TicketStatus;

/// Response of `GET /estatisticas/resumo`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub total: u64,
    #[serde(default)]
    pub by_status: BTreeMap<TicketStatus, u64>,
    /// Keyed by priority number (1-4).
    #[serde(default)]
    pub by_priority: BTreeMap<u8, u64>,
    #[serde(default)]
    pub by_category: BTreeMap<String, u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_resolution_hours: Option<f64>,
}

impl StatsSummary {
    /// Aggregate locally over already-fetched tickets.
    pub fn from_tickets(tickets: &[Ticket]) -> Self {
        let mut summary = StatsSummary {
            total: tickets.len() as u64,
            ..Default::default()
        };

        let mut resolution_hours = Vec::new();
        for ticket in tickets {
            *summary.by_status.entry(ticket.status).or_default() += 1;
            *summary
                .by_priority
                .entry(ticket.priority.as_num())
                .or_default() += 1;
            *summary
                .by_category
                .entry(ticket.category.clone())
                .or_default() += 1;

            if let Some(resolved) = ticket.resolved_at {
                let seconds = resolved.as_second() - ticket.opened_at.as_second();
                if seconds >= 0 {
                    resolution_hours.push(seconds as f64 / 3600.0);
                }
            }
        }

        if !resolution_hours.is_empty() {
            let sum: f64 = resolution_hours.iter().sum();
            summary.average_resolution_hours = Some(sum / resolution_hours.len() as f64);
        }

        summary
    }

    pub fn count(&self, status: TicketStatus) -> u64 {
        self.by_status.get(&status).copied().unwrap_or(0)
    }

    /// Tickets not yet in a terminal or resolved state.
    pub fn open_count(&self) -> u64 {
        self.by_status
            .iter()
            .filter(|(status, _)| !status.is_terminal() && **status != TicketStatus::Resolvido)
            .map(|(_, n)| n)
            .sum()
    }
}

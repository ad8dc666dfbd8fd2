//! Role-scoped ticket collections with refetch-on-write.
//!
//! The repository only ever holds copies of backend data. Every successful
//! mutation calls [`TicketRepository::refresh`], which drops all cached views
//! and re-fetches the ones the session may see.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use parking_lot::RwLock;

use crate::api::{ALL_VIEWS, HelpdeskApi, TicketView};
use crate::error::{HelpdeskError, Result};
use crate::policy::{Action, can_perform};
use crate::session::Session;
use crate::stats::StatsSummary;
use crate::ticket::Ticket;
use crate::user::{DeletedUserBackup, User};

pub struct TicketRepository<A> {
    api: Arc<A>,
    session: Session,
    cache: RwLock<HashMap<TicketView, Vec<Ticket>>>,
}

impl<A: HelpdeskApi> TicketRepository<A> {
    pub fn new(api: Arc<A>, session: Session) -> Self {
        Self {
            api,
            session,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn api(&self) -> &Arc<A> {
        &self.api
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Views the session is allowed to list, in tab order.
    pub fn permitted_views(&self) -> Vec<TicketView> {
        ALL_VIEWS
            .iter()
            .copied()
            .filter(|view| self.check_view(*view).is_ok())
            .collect()
    }

    pub fn check_view(&self, view: TicketView) -> Result<()> {
        self.require(view.required_action())
    }

    /// Fetch a view from the backend and replace its cached copy.
    ///
    /// A view the session may not see is an [`HelpdeskError::AccessDenied`],
    /// never an empty list.
    pub async fn fetch(&self, view: TicketView) -> Result<Vec<Ticket>> {
        self.check_view(view)?;

        let mut tickets = self.api.list_tickets(view).await?;
        if view == TicketView::Own {
            let before = tickets.len();
            tickets.retain(|t| t.is_opened_by(&self.session.email));
            if tickets.len() != before {
                tracing::warn!(
                    dropped = before - tickets.len(),
                    "backend returned tickets opened by other users in own view"
                );
            }
        }
        for ticket in &tickets {
            if let Err(e) = ticket.check_invariants() {
                tracing::warn!(%view, ticket = ticket.id, "inconsistent ticket record: {e}");
            }
        }
        tracing::debug!(%view, count = tickets.len(), "fetched tickets");

        self.cache.write().insert(view, tickets.clone());
        Ok(tickets)
    }

    pub fn cached(&self, view: TicketView) -> Option<Vec<Ticket>> {
        self.cache.read().get(&view).cloned()
    }

    /// Cached copy of a view, fetching it on first use.
    pub async fn tickets(&self, view: TicketView) -> Result<Vec<Ticket>> {
        if let Some(tickets) = self.cached(view) {
            return Ok(tickets);
        }
        self.fetch(view).await
    }

    /// Look a ticket up in any cached view.
    pub fn find_cached(&self, id: u64) -> Option<Ticket> {
        self.cache
            .read()
            .values()
            .flat_map(|tickets| tickets.iter())
            .find(|t| t.id == id)
            .cloned()
    }

    pub fn invalidate(&self) {
        self.cache.write().clear();
    }

    /// Drop every cached view and re-fetch all permitted ones concurrently.
    ///
    /// Views that fail to load stay empty in the cache; the first error is
    /// returned.
    pub async fn refresh(&self) -> Result<()> {
        self.invalidate();
        let views = self.permitted_views();
        let results = join_all(views.iter().map(|view| self.fetch(*view))).await;

        let mut first_error = None;
        for (view, result) in views.iter().zip(results) {
            if let Err(e) = result {
                tracing::warn!(%view, "refresh failed: {e}");
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Ticket detail, always fetched fresh.
    pub async fn ticket(&self, id: u64) -> Result<Ticket> {
        self.api.get_ticket(id).await
    }

    /// Ticket detail from cache when present, otherwise from the backend.
    pub async fn ticket_cached_or_fetch(&self, id: u64) -> Result<Ticket> {
        match self.find_cached(id) {
            Some(ticket) => Ok(ticket),
            None => self.ticket(id).await,
        }
    }

    pub async fn users(&self) -> Result<Vec<User>> {
        self.require(Action::ManageUsers)?;
        self.api.list_users().await
    }

    pub async fn user(&self, id: u64) -> Result<User> {
        let user = self.api.get_user(id).await?;
        if !self.session.is_self(&user.email) {
            self.require(Action::ManageUsers)?;
        }
        Ok(user)
    }

    pub async fn deleted_users(&self) -> Result<Vec<DeletedUserBackup>> {
        self.require(Action::RestoreUser)?;
        self.api.list_deleted_users().await
    }

    /// Backend aggregates, or a local count over the cached views when the
    /// backend has no statistics endpoint.
    pub async fn statistics(&self) -> Result<StatsSummary> {
        self.require(Action::ViewStatistics)?;
        match self.api.statistics().await {
            Ok(summary) => Ok(summary),
            Err(HelpdeskError::Request { status: 404, .. }) => {
                tracing::debug!("statistics endpoint unavailable, aggregating locally");
                let mut tickets: Vec<Ticket> = Vec::new();
                for view in self.permitted_views() {
                    for ticket in self.tickets(view).await? {
                        if !tickets.iter().any(|t| t.id == ticket.id) {
                            tickets.push(ticket);
                        }
                    }
                }
                Ok(StatsSummary::from_tickets(&tickets))
            }
            Err(e) => Err(e),
        }
    }

    /// Access check for a non-ticket action.
    pub fn require(&self, action: Action) -> Result<()> {
        can_perform(action, &self.session, None).map_err(|denial| denial.into_error(action))
    }
}

//! reqwest implementation of [`HelpdeskApi`].

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::ai::{AiFeedback, AiSolution, FeedbackRequest};
use crate::config::Config;
use crate::error::{HelpdeskError, Result};
use crate::stats::StatsSummary;
use crate::ticket::{NewTicket, Ticket};
use crate::types::USER_EMAIL_HEADER;
use crate::user::{DeactivateRequest, DeletedUserBackup, User, UserForm};

use super::error::ApiError;
use super::{HelpdeskApi, Payload, TicketView};

#[derive(Debug, Serialize)]
struct ReasonRequest<'a> {
    motivo: &'a str,
}

/// HTTP client for the helpdesk backend.
///
/// Requests are sent once; there is no retry or backoff. Every request carries
/// the caller's e-mail in the `x-user-email` header.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base: Url,
    email: String,
}

impl HttpApi {
    pub fn new(base_url: &str, email: impl Into<String>, timeout: Duration) -> Result<Self> {
        let mut base = Url::parse(base_url)
            .map_err(|e| HelpdeskError::Config(format!("invalid api_url '{base_url}': {e}")))?;
        // Url::join replaces the last segment unless the path ends with '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HelpdeskError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base,
            email: email.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let session = config.session()?;
        Self::new(&config.api_url(), session.email, config.request_timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| HelpdeskError::Other(format!("invalid endpoint '{path}': {e}")))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.url(path)?;
        Ok(self
            .client
            .request(method, url)
            .header(USER_EMAIL_HEADER, &self.email)
            .header(header::ACCEPT, "application/json"))
    }

    /// Send a request and return the body of a 2xx response.
    async fn execute(&self, request: RequestBuilder) -> Result<Vec<u8>> {
        let request = request.build()?;
        let method = request.method().clone();
        let url = request.url().clone();
        tracing::debug!(%method, %url, "helpdesk request");

        let response = self.client.execute(request).await.map_err(|e| {
            tracing::warn!(%method, %url, "request failed: {e}");
            HelpdeskError::from(e)
        })?;

        let status = response.status();
        let body = response.bytes().await?.to_vec();

        if !status.is_success() {
            let error = ApiError::from_body(status, &body);
            tracing::warn!(%method, %url, status = status.as_u16(), "backend error: {error}");
            return Err(error.into());
        }

        Ok(body)
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let body = self.execute(request).await?;
        let payload: Payload<T> = serde_json::from_slice(&body)?;
        Ok(payload.into_inner())
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.fetch(self.request(Method::GET, path)?).await
    }

    async fn post_unit<B: Serialize + ?Sized>(&self, path: &str, body: Option<&B>) -> Result<()> {
        let mut request = self.request(Method::POST, path)?;
        if let Some(body) = body {
            request = request.json(body);
        }
        self.execute(request).await.map(|_| ())
    }
}

fn ticket_not_found(id: u64) -> impl FnOnce(HelpdeskError) -> HelpdeskError {
    move |e| match e {
        HelpdeskError::Request { status: 404, .. } => HelpdeskError::TicketNotFound(id),
        other => other,
    }
}

impl HelpdeskApi for HttpApi {
    async fn list_tickets(&self, view: TicketView) -> Result<Vec<Ticket>> {
        self.get(view.path()).await
    }

    async fn get_ticket(&self, id: u64) -> Result<Ticket> {
        self.get(&format!("chamados/{id}"))
            .await
            .map_err(ticket_not_found(id))
    }

    async fn create_ticket(&self, form: &NewTicket) -> Result<Ticket> {
        self.fetch(self.request(Method::POST, "chamados")?.json(form))
            .await
    }

    async fn approve_ticket(&self, id: u64) -> Result<()> {
        self.post_unit::<()>(&format!("chamados/{id}/aprovar"), None)
            .await
            .map_err(ticket_not_found(id))
    }

    async fn reject_ticket(&self, id: u64, motivo: &str) -> Result<()> {
        self.post_unit(&format!("chamados/{id}/rejeitar"), Some(&ReasonRequest { motivo }))
            .await
            .map_err(ticket_not_found(id))
    }

    async fn resolve_ticket(&self, id: u64) -> Result<()> {
        self.post_unit::<()>(&format!("chamados/{id}/resolver"), None)
            .await
            .map_err(ticket_not_found(id))
    }

    async fn escalate_ticket(&self, id: u64, motivo: &str) -> Result<()> {
        self.post_unit(&format!("chamados/{id}/escalar"), Some(&ReasonRequest { motivo }))
            .await
            .map_err(ticket_not_found(id))
    }

    async fn resolve_escalated(&self, id: u64) -> Result<()> {
        self.post_unit::<()>(&format!("chamados/{id}/resolver-escalado"), None)
            .await
            .map_err(ticket_not_found(id))
    }

    async fn ai_solution(&self, ticket_id: u64) -> Result<AiSolution> {
        self.get(&format!("chamados/{ticket_id}/solucao-ia")).await
    }

    async fn submit_ai_feedback(&self, ticket_id: u64, feedback: AiFeedback) -> Result<()> {
        self.post_unit(
            &format!("chamados/{ticket_id}/feedback-ia"),
            Some(&FeedbackRequest { feedback }),
        )
        .await
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        self.get("users").await
    }

    async fn get_user(&self, id: u64) -> Result<User> {
        self.get(&format!("users/{id}")).await
    }

    async fn create_user(&self, form: &UserForm) -> Result<User> {
        self.fetch(self.request(Method::POST, "users")?.json(form))
            .await
    }

    async fn update_user(&self, id: u64, form: &UserForm) -> Result<User> {
        self.fetch(self.request(Method::PUT, &format!("users/{id}"))?.json(form))
            .await
    }

    async fn deactivate_user(&self, id: u64, motivo: &str) -> Result<()> {
        let request = self
            .request(Method::DELETE, &format!("users/{id}"))?
            .json(&DeactivateRequest {
                motivo: motivo.to_string(),
            });
        self.execute(request).await.map(|_| ())
    }

    async fn list_deleted_users(&self) -> Result<Vec<DeletedUserBackup>> {
        self.get("users/deleted").await
    }

    async fn restore_user(&self, backup_id: u64) -> Result<()> {
        self.post_unit::<()>(&format!("users/restore/{backup_id}"), None)
            .await
    }

    async fn statistics(&self) -> Result<StatsSummary> {
        self.get("estatisticas/resumo").await
    }
}

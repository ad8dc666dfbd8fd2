use thiserror::Error;

use crate::types::AccessLevel;

/// Message shown when the backend could not be reached at all.
pub const CONNECTIVITY_MESSAGE: &str =
    "Erro de conexão com o servidor. Verifique sua rede e tente novamente.";

/// Message shown when the backend answered with an error but no `message` field.
pub const GENERIC_FAILURE_MESSAGE: &str = "Erro ao processar a solicitação.";

#[derive(Error, Debug)]
pub enum HelpdeskError {
    /// Local precondition failed; no request was sent.
    #[error("{0}")]
    Validation(String),

    #[error("access denied: {action} requires access level {required} (current: {actual})")]
    AccessDenied {
        action: String,
        required: AccessLevel,
        actual: AccessLevel,
    },

    /// Backend answered with a non-2xx status.
    #[error("request failed ({status}): {message}")]
    Request { status: u16, message: String },

    /// Transport failure (connection refused, DNS, timeout).
    #[error("network error: {0}")]
    Network(String),

    #[error("'{0}' is already being processed")]
    InFlight(String),

    #[error("invalid status '{0}'")]
    InvalidStatus(String),

    #[error("ticket #{0} not found")]
    TicketNotFound(u64),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl HelpdeskError {
    /// Text suitable for a toast or a CLI error line.
    ///
    /// Server messages are surfaced verbatim; transport failures collapse to
    /// a single connectivity message.
    pub fn user_message(&self) -> String {
        match self {
            HelpdeskError::Validation(msg) => msg.clone(),
            HelpdeskError::AccessDenied { .. } => {
                "Acesso negado: você não tem permissão para esta ação.".to_string()
            }
            HelpdeskError::Request { message, .. } => message.clone(),
            HelpdeskError::Network(_) => CONNECTIVITY_MESSAGE.to_string(),
            HelpdeskError::InFlight(_) => "Aguarde, a solicitação já está em andamento.".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for HelpdeskError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return HelpdeskError::Request {
                status: status.as_u16(),
                message: GENERIC_FAILURE_MESSAGE.to_string(),
            };
        }
        if err.is_decode() {
            return HelpdeskError::Other(format!("invalid response body: {err}"));
        }
        if err.is_builder() {
            return HelpdeskError::Other(format!("invalid request: {err}"));
        }
        HelpdeskError::Network(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, HelpdeskError>;

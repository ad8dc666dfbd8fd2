//! AI-suggested solutions and the owner's feedback on them.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::HelpdeskError;
use crate::types::TicketStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AiFeedback {
    DeuCerto,
    DeuErrado,
}

impl AiFeedback {
    pub fn as_str(&self) -> &'static str {
        match self {
            AiFeedback::DeuCerto => "DEU_CERTO",
            AiFeedback::DeuErrado => "DEU_ERRADO",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AiFeedback::DeuCerto => "Deu certo",
            AiFeedback::DeuErrado => "Deu errado",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            AiFeedback::DeuCerto => AiFeedback::DeuErrado,
            AiFeedback::DeuErrado => AiFeedback::DeuCerto,
        }
    }

    /// Status the backend moves the ticket to once this feedback is recorded.
    pub fn resulting_status(&self) -> TicketStatus {
        match self {
            AiFeedback::DeuCerto => TicketStatus::Resolvido,
            AiFeedback::DeuErrado => TicketStatus::ComAnalista,
        }
    }
}

impl fmt::Display for AiFeedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AiFeedback {
    type Err = HelpdeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace('-', "_").as_str() {
            "DEU_CERTO" => Ok(AiFeedback::DeuCerto),
            "DEU_ERRADO" => Ok(AiFeedback::DeuErrado),
            _ => Err(HelpdeskError::Validation(format!(
                "invalid feedback '{s}', expected deu-certo or deu-errado"
            ))),
        }
    }
}

/// Response generated by the AI service for a ticket (`RespostaIA`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiSolution {
    pub id: u64,
    pub ticket_id: u64,
    /// Markdown text.
    pub solution_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<AiFeedback>,
    pub responded_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_at: Option<Timestamp>,
}

impl AiSolution {
    /// Feedback can be given once per response.
    pub fn accepts_feedback(&self) -> bool {
        self.feedback.is_none()
    }
}

/// Body of `POST /chamados/:id/feedback-ia`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FeedbackRequest {
    pub feedback: AiFeedback,
}

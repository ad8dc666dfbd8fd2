use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::HelpdeskError;

/// Directory (relative to the working directory) holding client state.
pub const HELPDESK_DIR: &str = ".helpdesk";

pub const DEFAULT_API_URL: &str = "http://localhost:3001/api";

/// Header carrying the caller's identity on every request.
pub const USER_EMAIL_HEADER: &str = "x-user-email";

/// Minimum length of a rejection or escalation reason.
pub const MIN_REASON_CHARS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum TicketStatus {
    #[default]
    Aberto,
    Aprovado,
    Rejeitado,
    #[serde(rename = "Triagem IA")]
    TriagemIa,
    #[serde(rename = "Aguardando Resposta")]
    AguardandoResposta,
    #[serde(rename = "Com Analista")]
    ComAnalista,
    Escalado,
    Resolvido,
    Fechado,
}

pub const ALL_STATUSES: &[TicketStatus] = &[
    TicketStatus::Aberto,
    TicketStatus::Aprovado,
    TicketStatus::Rejeitado,
    TicketStatus::TriagemIa,
    TicketStatus::AguardandoResposta,
    TicketStatus::ComAnalista,
    TicketStatus::Escalado,
    TicketStatus::Resolvido,
    TicketStatus::Fechado,
];

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Aberto => "Aberto",
            TicketStatus::Aprovado => "Aprovado",
            TicketStatus::Rejeitado => "Rejeitado",
            TicketStatus::TriagemIa => "Triagem IA",
            TicketStatus::AguardandoResposta => "Aguardando Resposta",
            TicketStatus::ComAnalista => "Com Analista",
            TicketStatus::Escalado => "Escalado",
            TicketStatus::Resolvido => "Resolvido",
            TicketStatus::Fechado => "Fechado",
        }
    }

    /// Statuses the backend may move a ticket to from this one.
    pub fn successors(&self) -> &'static [TicketStatus] {
        match self {
            TicketStatus::Aberto => &[TicketStatus::Aprovado, TicketStatus::Rejeitado],
            TicketStatus::Aprovado => &[TicketStatus::TriagemIa],
            TicketStatus::TriagemIa => &[TicketStatus::AguardandoResposta, TicketStatus::ComAnalista],
            TicketStatus::AguardandoResposta => &[TicketStatus::Resolvido, TicketStatus::ComAnalista],
            TicketStatus::ComAnalista => &[TicketStatus::Resolvido, TicketStatus::Escalado],
            TicketStatus::Escalado => &[TicketStatus::Resolvido],
            TicketStatus::Resolvido => &[TicketStatus::Fechado],
            TicketStatus::Rejeitado | TicketStatus::Fechado => &[],
        }
    }

    pub fn can_transition_to(&self, next: TicketStatus) -> bool {
        self.successors().contains(&next)
    }

    pub fn is_terminal(&self) -> bool {
        self.successors().is_empty()
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = HelpdeskError;

    /// Accepts the wire form ("Com Analista") as well as slugs
    /// ("com-analista", "com_analista"), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', '_'], " ");
        ALL_STATUSES
            .iter()
            .copied()
            .find(|status| status.as_str().to_lowercase() == normalized)
            .ok_or_else(|| HelpdeskError::InvalidStatus(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum TicketPriority {
    Baixa,
    #[default]
    Media,
    Alta,
    Urgente,
}

impl TicketPriority {
    pub fn as_num(&self) -> u8 {
        match self {
            TicketPriority::Baixa => 1,
            TicketPriority::Media => 2,
            TicketPriority::Alta => 3,
            TicketPriority::Urgente => 4,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TicketPriority::Baixa => "Baixa",
            TicketPriority::Media => "Média",
            TicketPriority::Alta => "Alta",
            TicketPriority::Urgente => "Urgente",
        }
    }
}

impl TryFrom<u8> for TicketPriority {
    type Error = HelpdeskError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            1 => Ok(TicketPriority::Baixa),
            2 => Ok(TicketPriority::Media),
            3 => Ok(TicketPriority::Alta),
            4 => Ok(TicketPriority::Urgente),
            _ => Err(HelpdeskError::Validation(format!(
                "invalid priority {n}, expected 1-4"
            ))),
        }
    }
}

impl From<TicketPriority> for u8 {
    fn from(p: TicketPriority) -> u8 {
        p.as_num()
    }
}

impl fmt::Display for TicketPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for TicketPriority {
    type Err = HelpdeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(n) = s.trim().parse::<u8>() {
            return TicketPriority::try_from(n);
        }
        match s.trim().to_lowercase().as_str() {
            "baixa" => Ok(TicketPriority::Baixa),
            "media" | "média" => Ok(TicketPriority::Media),
            "alta" => Ok(TicketPriority::Alta),
            "urgente" => Ok(TicketPriority::Urgente),
            _ => Err(HelpdeskError::Validation(format!("invalid priority: {s}"))),
        }
    }
}

/// User access level, 1 (regular user) through 5 (administrator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct AccessLevel(u8);

impl AccessLevel {
    pub const USUARIO: AccessLevel = AccessLevel(1);
    pub const ANALISTA: AccessLevel = AccessLevel(2);
    pub const GESTOR: AccessLevel = AccessLevel(3);
    pub const GERENTE: AccessLevel = AccessLevel(4);
    pub const ADMIN: AccessLevel = AccessLevel(5);

    pub fn new(level: u8) -> Result<Self, HelpdeskError> {
        AccessLevel::try_from(level)
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    pub fn role_name(&self) -> &'static str {
        match self.0 {
            1 => "Usuário",
            2 => "Analista",
            3 => "Gestor",
            4 => "Gerente",
            _ => "Administrador",
        }
    }
}

impl Default for AccessLevel {
    fn default() -> Self {
        AccessLevel::USUARIO
    }
}

impl TryFrom<u8> for AccessLevel {
    type Error = HelpdeskError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        if (1..=5).contains(&level) {
            Ok(AccessLevel(level))
        } else {
            Err(HelpdeskError::Validation(format!(
                "invalid access level {level}, expected 1-5"
            )))
        }
    }
}

impl From<AccessLevel> for u8 {
    fn from(level: AccessLevel) -> u8 {
        level.0
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

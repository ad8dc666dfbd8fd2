//! Users and deleted-user backups.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{HelpdeskError, Result};
use crate::types::AccessLevel;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub matricula: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub department: Option<String>,
    pub profile_id: u64,
    pub access_level: AccessLevel,
    /// Manager responsible for approving this user's tickets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approver_id: Option<u64>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Body of `POST /users` and `PUT /users/:id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserForm {
    pub matricula: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    pub profile_id: u64,
    pub access_level: AccessLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approver_id: Option<u64>,
}

impl UserForm {
    /// Pre-fill an edit form from an existing user.
    pub fn from_user(user: &User) -> Self {
        Self {
            matricula: user.matricula.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            department: user.department.clone(),
            profile_id: user.profile_id,
            access_level: user.access_level,
            approver_id: user.approver_id,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.matricula.trim().is_empty() {
            return Err(HelpdeskError::Validation(
                "Matrícula é obrigatória.".to_string(),
            ));
        }
        if self.name.trim().is_empty() {
            return Err(HelpdeskError::Validation("Nome é obrigatório.".to_string()));
        }
        let email = self.email.trim();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
            _ => Err(HelpdeskError::Validation(format!("E-mail inválido: '{email}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BackupStatus {
    /// Restorable.
    Ativo,
    Restaurado,
}

impl fmt::Display for BackupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackupStatus::Ativo => write!(f, "ATIVO"),
            BackupStatus::Restaurado => write!(f, "RESTAURADO"),
        }
    }
}

/// Point-in-time snapshot taken when a user is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedUserBackup {
    pub id: u64,
    pub user: User,
    pub deletion_reason: String,
    pub deleted_by: String,
    pub deleted_at: Timestamp,
    pub status: BackupStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restored_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restored_at: Option<Timestamp>,
}

impl DeletedUserBackup {
    pub fn is_restorable(&self) -> bool {
        self.status == BackupStatus::Ativo
    }
}

/// Body of `DELETE /users/:id`.
#[derive(Debug, Clone, Serialize)]
pub struct DeactivateRequest {
    pub motivo: String,
}

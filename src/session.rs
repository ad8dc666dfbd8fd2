//! The signed-in user. Every permission check derives from the access level
//! carried here.

use serde::{Deserialize, Serialize};

use crate::error::{HelpdeskError, Result};
use crate::types::AccessLevel;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Session {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub user_id: Option<u64>,
    #[serde(default)]
    pub access_level: AccessLevel,
}

impl Session {
    pub fn new(email: impl Into<String>, access_level: AccessLevel) -> Self {
        Self {
            email: email.into(),
            name: None,
            user_id: None,
            access_level,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_user_id(mut self, user_id: u64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }

    pub fn is_self(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email)
    }

    pub fn ensure_valid(&self) -> Result<()> {
        if self.email.trim().is_empty() || !self.email.contains('@') {
            return Err(HelpdeskError::Config(
                "no user e-mail configured; run `helpdesk config set session.email <email>`"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

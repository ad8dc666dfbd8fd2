//! User management commands.

use serde_json::json;

use super::{CommandOutput, connect, console_dispatcher, outcome_output};
use crate::dispatch::{ActionRequest, Completed, NoModal, Outcome};
use crate::display::{UserFormatter, backup_table, user_table};
use crate::error::{HelpdeskError, Result};
use crate::types::AccessLevel;
use crate::user::UserForm;

/// Optional user fields given on the command line. Required for `create`,
/// overrides for `edit`.
#[derive(Debug, Clone, Default)]
pub struct UserFields {
    pub matricula: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    pub profile_id: Option<u64>,
    pub access_level: Option<AccessLevel>,
    pub approver_id: Option<u64>,
}

impl UserFields {
    fn into_new_form(self) -> Result<UserForm> {
        let missing = |field: &str| HelpdeskError::Validation(format!("--{field} é obrigatório."));
        Ok(UserForm {
            matricula: self.matricula.ok_or_else(|| missing("matricula"))?,
            name: self.name.ok_or_else(|| missing("name"))?,
            email: self.email.ok_or_else(|| missing("email"))?,
            department: self.department,
            profile_id: self.profile_id.unwrap_or(1),
            access_level: self.access_level.unwrap_or_default(),
            approver_id: self.approver_id,
        })
    }

    fn apply_to(self, form: &mut UserForm) {
        if let Some(matricula) = self.matricula {
            form.matricula = matricula;
        }
        if let Some(name) = self.name {
            form.name = name;
        }
        if let Some(email) = self.email {
            form.email = email;
        }
        if self.department.is_some() {
            form.department = self.department;
        }
        if let Some(profile_id) = self.profile_id {
            form.profile_id = profile_id;
        }
        if let Some(level) = self.access_level {
            form.access_level = level;
        }
        if self.approver_id.is_some() {
            form.approver_id = self.approver_id;
        }
    }
}

fn user_outcome_output(action: &str, outcome: &Outcome) -> CommandOutput {
    match &outcome.completed {
        Completed::User(user) => CommandOutput::new(json!({
            "action": action,
            "id": user.id,
            "success": true,
            "message": outcome.message,
            "user": user,
        }))
        .with_text(""),
        _ => outcome_output(action, 0, outcome),
    }
}

pub async fn cmd_users_ls(output_json: bool) -> Result<()> {
    let users = connect()?.users().await?;

    let text = if users.is_empty() {
        "Nenhum usuário cadastrado.".to_string()
    } else {
        format!("{}\n\n{} usuário(s)", user_table(&users), users.len())
    };

    CommandOutput::new(serde_json::to_value(&users)?)
        .with_text(text)
        .print(output_json)
}

pub async fn cmd_users_show(id: u64, output_json: bool) -> Result<()> {
    let user = connect()?.user(id).await?;
    CommandOutput::new(serde_json::to_value(&user)?)
        .with_text(UserFormatter::format_detail(&user))
        .print(output_json)
}

pub async fn cmd_users_create(fields: UserFields, output_json: bool) -> Result<()> {
    let form = fields.into_new_form()?;
    let dispatcher = console_dispatcher(connect()?, output_json);
    let outcome = dispatcher
        .dispatch(ActionRequest::CreateUser(form), &mut NoModal)
        .await?;
    user_outcome_output("create-user", &outcome).print(output_json)
}

/// Edit a user. The current record is fetched and the given fields applied
/// on top of it.
pub async fn cmd_users_edit(id: u64, fields: UserFields, output_json: bool) -> Result<()> {
    let repository = connect()?;
    let target = repository.user(id).await?;
    let mut form = UserForm::from_user(&target);
    fields.apply_to(&mut form);

    let dispatcher = console_dispatcher(repository, output_json);
    let outcome = dispatcher
        .dispatch(ActionRequest::UpdateUser { target, form }, &mut NoModal)
        .await?;
    user_outcome_output("update-user", &outcome).print(output_json)
}

pub async fn cmd_users_deactivate(id: u64, motivo: &str, output_json: bool) -> Result<()> {
    let repository = connect()?;
    let target = repository.user(id).await?;

    let dispatcher = console_dispatcher(repository, output_json);
    let request = ActionRequest::DeactivateUser {
        target,
        motivo: motivo.to_string(),
    };
    let outcome = dispatcher.dispatch(request, &mut NoModal).await?;
    outcome_output("deactivate-user", id, &outcome).print(output_json)
}

/// List backups of deleted users
pub async fn cmd_users_deleted(output_json: bool) -> Result<()> {
    let backups = connect()?.deleted_users().await?;

    let text = if backups.is_empty() {
        "Nenhum usuário removido.".to_string()
    } else {
        backup_table(&backups)
    };

    CommandOutput::new(serde_json::to_value(&backups)?)
        .with_text(text)
        .print(output_json)
}

/// Restore a deleted user from its backup id
pub async fn cmd_users_restore(backup_id: u64, output_json: bool) -> Result<()> {
    let repository = connect()?;
    let backup = repository
        .deleted_users()
        .await?
        .into_iter()
        .find(|b| b.id == backup_id)
        .ok_or_else(|| {
            HelpdeskError::Validation(format!("Backup #{backup_id} não encontrado."))
        })?;

    let dispatcher = console_dispatcher(repository, output_json);
    let outcome = dispatcher
        .dispatch(ActionRequest::RestoreUser(backup), &mut NoModal)
        .await?;
    outcome_output("restore-user", backup_id, &outcome).print(output_json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_requires_identity_fields() {
        let fields = UserFields {
            name: Some("Carla".to_string()),
            email: Some("carla@empresa.com".to_string()),
            ..Default::default()
        };
        let err = fields.into_new_form().unwrap_err();
        assert!(err.to_string().contains("--matricula"));
    }

    #[test]
    fn test_create_defaults() {
        let fields = UserFields {
            matricula: Some("M010".to_string()),
            name: Some("Carla".to_string()),
            email: Some("carla@empresa.com".to_string()),
            ..Default::default()
        };
        let form = fields.into_new_form().unwrap();
        assert_eq!(form.access_level, AccessLevel::USUARIO);
        assert_eq!(form.profile_id, 1);
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_edit_overrides_only_given_fields() {
        let mut form = UserForm {
            matricula: "M001".to_string(),
            name: "Carla".to_string(),
            email: "carla@empresa.com".to_string(),
            department: Some("TI".to_string()),
            profile_id: 2,
            access_level: AccessLevel::ANALISTA,
            approver_id: Some(4),
        };
        UserFields {
            department: Some("Financeiro".to_string()),
            access_level: Some(AccessLevel::GESTOR),
            ..Default::default()
        }
        .apply_to(&mut form);

        assert_eq!(form.name, "Carla");
        assert_eq!(form.department.as_deref(), Some("Financeiro"));
        assert_eq!(form.access_level, AccessLevel::GESTOR);
        assert_eq!(form.approver_id, Some(4));
    }
}

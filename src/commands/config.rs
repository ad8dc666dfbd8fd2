//! Configuration commands for managing helpdesk client settings.
//!
//! - `config set`: Set a configuration value
//! - `config get`: Print a single value
//! - `config show`: Display current configuration

use owo_colors::OwoColorize;
use serde_json::json;

use super::CommandOutput;
use crate::config::{CONFIG_KEYS, Config};
use crate::error::{HelpdeskError, Result};

/// Validate a config key, suggesting dot notation for `session_email` style keys
fn validate_config_key(key: &str) -> Result<&str> {
    if CONFIG_KEYS.contains(&key) {
        return Ok(key);
    }

    if let Some(pos) = key.find('_') {
        let dot_version = format!("{}.{}", &key[..pos], &key[pos + 1..]);
        if CONFIG_KEYS.contains(&dot_version.as_str()) {
            return Err(HelpdeskError::Config(format!(
                "invalid config key '{key}'. Use dot notation: '{dot_version}'"
            )));
        }
    }
    Err(HelpdeskError::Config(format!(
        "unknown config key '{key}'. Valid keys: {}",
        CONFIG_KEYS.join(", ")
    )))
}

/// Show current configuration
pub fn cmd_config_show(output_json: bool) -> Result<()> {
    let config = Config::load()?;
    let session = config.session.as_ref();

    let json_output = json!({
        "api_url": config.api_url(),
        "request_timeout": config.request_timeout,
        "session": session.map(|s| json!({
            "email": s.email,
            "name": s.name,
            "user_id": s.user_id,
            "access_level": s.access_level.get(),
        })),
        "config_file": Config::config_path().to_string_lossy(),
    });

    let mut text_output = String::new();
    text_output.push_str(&format!("{}\n\n", "Configuration:".cyan().bold()));
    text_output.push_str(&format!("{}: {}\n", "api_url".cyan(), config.api_url()));
    text_output.push_str(&format!(
        "{}: {}s\n\n",
        "request_timeout".cyan(),
        config.request_timeout
    ));

    match session {
        Some(s) => {
            text_output.push_str(&format!("{}:\n", "session".cyan()));
            text_output.push_str(&format!("  email: {}\n", s.email));
            if let Some(ref name) = s.name {
                text_output.push_str(&format!("  name: {name}\n"));
            }
            text_output.push_str(&format!(
                "  access_level: {} ({})\n",
                s.access_level,
                s.access_level.role_name()
            ));
            if let Some(id) = s.user_id {
                text_output.push_str(&format!("  user_id: {id}\n"));
            }
        }
        None => text_output.push_str(&format!(
            "{}: {}\n",
            "session".cyan(),
            "not configured".dimmed()
        )),
    }

    text_output.push('\n');
    text_output.push_str(&format!(
        "{}",
        format!("Config file: {}", Config::config_path().display()).dimmed()
    ));

    CommandOutput::new(json_output)
        .with_text(text_output)
        .print(output_json)
}

/// Set a configuration value
pub fn cmd_config_set(key: &str, value: &str, output_json: bool) -> Result<()> {
    validate_config_key(key)?;

    let mut config = Config::load()?;
    config.set(key, value)?;
    config.save()?;

    let json_output = json!({
        "action": "config_set",
        "key": key,
        "value": value,
        "success": true,
    });
    let text_output = format!("Set {} to {}", key.cyan(), value);

    CommandOutput::new(json_output)
        .with_text(text_output)
        .print(output_json)
}

/// Get a specific configuration value
pub fn cmd_config_get(key: &str, output_json: bool) -> Result<()> {
    validate_config_key(key)?;

    let config = Config::load()?;
    let value = config
        .get(key)?
        .ok_or_else(|| HelpdeskError::Config(format!("{key} not set")))?;

    let json_output = json!({
        "key": key,
        "value": value,
        "configured": true,
    });

    CommandOutput::new(json_output)
        .with_text(value)
        .print(output_json)
}

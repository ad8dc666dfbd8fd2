#![allow(dead_code)]

pub mod fake_api;
pub mod fixtures;

use std::fs;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Helper struct to run helpdesk commands in an isolated temp directory
pub struct HelpdeskTest {
    pub temp_dir: TempDir,
    binary_path: String,
}

impl HelpdeskTest {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        HelpdeskTest {
            temp_dir,
            binary_path: env!("CARGO_BIN_EXE_helpdesk").to_string(),
        }
    }

    /// A workspace already signed in as `email` with the given access level,
    /// pointed at `api_url`.
    pub fn signed_in(api_url: &str, email: &str, level: u8) -> Self {
        let test = Self::new();
        test.write_config(&format!(
            "api_url: {api_url}\nrequest_timeout: 5\nsession:\n  email: {email}\n  access_level: {level}\n"
        ));
        test
    }

    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(&self.binary_path)
            .args(args)
            .current_dir(self.temp_dir.path())
            .env_remove("HELPDESK_API_URL")
            .env_remove("HELPDESK_USER_EMAIL")
            .env_remove("HELPDESK_ROOT")
            .env("NO_COLOR", "1")
            .output()
            .expect("Failed to execute helpdesk command")
    }

    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if !output.status.success() {
            panic!(
                "Command {:?} failed with status {:?}\nstdout: {}\nstderr: {}",
                args,
                output.status,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    pub fn run_failure(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            !output.status.success(),
            "Expected command {:?} to fail, but it succeeded",
            args
        );
        String::from_utf8_lossy(&output.stderr).to_string()
    }

    pub fn config_path(&self) -> std::path::PathBuf {
        self.temp_dir.path().join(".helpdesk").join("config.yaml")
    }

    pub fn read_config(&self) -> String {
        fs::read_to_string(self.config_path()).expect("Failed to read config file")
    }

    pub fn write_config(&self, content: &str) {
        let path = self.config_path();
        fs::create_dir_all(path.parent().unwrap()).expect("Failed to create .helpdesk directory");
        fs::write(path, content).expect("Failed to write config file");
    }
}

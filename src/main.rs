use clap::Parser;
use std::process::ExitCode;

use helpdesk::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the tracing filter (default: `warn`).
const LOG_ENV: &str = "HELPDESK_LOG";

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match cli.command.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("command failed: {e}");
            eprintln!("error: {}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

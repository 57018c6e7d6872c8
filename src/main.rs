use std::{
    io::{self, Write},
    process::ExitCode,
};

use sweep::{APP_NAME, DotReporter, GitHubClient, Settings, Triage};
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    init_tracing();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            error!(error = %err, "Error creating client");
            return ExitCode::FAILURE;
        }
    };
    let client = match GitHubClient::new(&settings) {
        Ok(client) => client,
        Err(err) => {
            error!(error = %err, "Error creating client");
            return ExitCode::FAILURE;
        }
    };

    let report = Triage::new(&client, &DotReporter).run();

    // Partial failures were already logged; the summary is printed regardless.
    let mut stdout = io::stdout().lock();
    if writeln!(stdout, "\n{report}").is_err() {
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

// Log lines go to stdout so they interleave with the progress dots.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{APP_NAME}=warn")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stdout)
        .with_target(false)
        .init();
}

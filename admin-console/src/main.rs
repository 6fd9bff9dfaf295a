use admin_console::cli::Cli;
use admin_console::config::{get_configuration, APP_NAME};
use admin_console::handlers::{dispatch, CommandError};
use admin_console::startup::build_state;
use anyhow::Context;
use clap::Parser;
use console_core::observability::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let configuration = get_configuration(cli.config.as_deref()).map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(APP_NAME, &configuration.log.level, configuration.log.format);

    let state = build_state(&configuration).context("Failed to build HTTP client")?;

    match dispatch(&state, cli.command).await {
        Ok(output) => {
            let rendered =
                serde_json::to_string_pretty(&output).context("Failed to render output")?;
            println!("{}", rendered);
            Ok(())
        }
        Err(e) => {
            report(&e);
            std::process::exit(e.exit_code());
        }
    }
}

fn report(error: &CommandError) {
    tracing::debug!(error = ?error, "Command failed");
    eprintln!("Error: {}", error);

    if let CommandError::Api(api) = error {
        if let Some(fields) = api.field_errors() {
            for (field, messages) in fields {
                eprintln!("  {}: {}", field, messages.join(" "));
            }
        }
    }
}

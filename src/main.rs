use clap::Parser;
use eyre::{Context, Result};
use heartbeatd::config::ProcessSettings;
use heartbeatd::critical;
use heartbeatd::daemon::{self, Controller, SignalListener};
use heartbeatd::logging::{self, LogLevel};
use log::info;
use std::process::ExitCode;

mod cli;

use cli::Cli;

fn load_settings(cli: &Cli) -> Result<ProcessSettings> {
    ProcessSettings::load(&cli.config)
        .context(format!("Failed to load config from {}", cli.config.display()))
}

async fn run_application(settings: ProcessSettings) -> Result<daemon::ExitCode> {
    let mut controller = Controller::new(settings);

    let listener =
        SignalListener::spawn(controller.run_state()).context("Failed to set up signal handling")?;

    let rc = controller.execute().await;

    listener.close();
    Ok(rc)
}

#[tokio::main]
async fn main() -> ExitCode {
    // Usage errors exit here, before any lifecycle phase
    let cli = Cli::parse();

    logging::init(LogLevel::default());
    info!("Starting application, pid {}", std::process::id());

    let settings = match load_settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            critical!("Unable to initialize application: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    logging::set_level(settings.log_level());

    match run_application(settings).await {
        Ok(rc) => rc.into(),
        Err(e) => {
            critical!("Unable to initialize application: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

use std::process::ExitCode;

use clap::Parser;

mod browse;
mod cli;
mod commands;
mod config;
mod error;
mod output;
mod prompt;
mod session_file;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    let settings = match config::load(&cli.global) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "finflow={level},finflow_client={level},query_cache={level}",
            level = settings.level
        ))
        .with_writer(std::io::stderr)
        .init();

    match commands::run(cli.command, &settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(?err, "command failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

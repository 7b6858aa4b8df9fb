// emr-hl7 - HL7 v2.x interchange engine for a hospital EMR
// Copyright (c) 2025 EMR HL7 Contributors
// Licensed under the MIT License

use clap::Parser;
use emr_hl7::cli::{Cli, Commands};
use emr_hl7::config::{load_config_or_default, LoggingConfig};
use emr_hl7::logging::init_logging;
use std::process;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    // This is optional - if .env doesn't exist, it's silently ignored
    let _ = dotenvy::dotenv();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Logging follows the configuration when it loads; commands report
    // configuration errors themselves
    let (config_level, logging_config) = match load_config_or_default(&cli.config) {
        Ok(config) => (config.application.log_level, config.logging),
        Err(_) => ("info".to_string(), LoggingConfig::default()),
    };
    let log_level = cli.log_level.as_deref().unwrap_or(config_level.as_str());

    let logging_guard = match init_logging(log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        "emr-hl7 - HL7 v2.x interchange engine"
    );

    // Execute command and get exit code
    let exit_code = match execute_command(&cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e:#}");
            5 // Fatal error exit code
        }
    };

    // process::exit skips destructors, flush the log file first
    drop(logging_guard);
    process::exit(exit_code);
}

/// Execute the CLI command
async fn execute_command(cli: &Cli) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Validate(args) => args.execute().await,
        Commands::Parse(args) => args.execute().await,
        Commands::Process(args) => args.execute(&cli.config).await,
        Commands::Build(args) => args.execute(&cli.config).await,
        Commands::Send(args) => args.execute(&cli.config).await,
        Commands::BatchSend(args) => args.execute(&cli.config).await,
        Commands::CheckConnection(args) => args.execute(&cli.config).await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Init(args) => args.execute().await,
    }
}

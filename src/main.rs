use clap::Parser;
use dicom_deid::cli::{Cli, Commands};
use dicom_deid::config::{load_config, LoggingConfig};
use dicom_deid::logging::init_logging;
use std::path::Path;
use std::process;
use tokio::sync::watch;

#[tokio::main]
async fn main() {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // File logging is configured in the config file; a broken config is
    // reported by the command itself, so fall back to console only here.
    let file_config = if Path::new(&cli.config).exists() {
        load_config(&cli.config).ok()
    } else {
        None
    };
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| file_config.as_ref().map(|c| c.application.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());
    let logging_config = file_config
        .map(|c| c.logging)
        .unwrap_or_else(LoggingConfig::default);

    let guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(2);
        }
    };

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "dicom-deid");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigterm = match signal(SignalKind::terminate()) {
                Ok(s) => s,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to create SIGTERM handler");
                    return;
                }
            };

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Received SIGINT (Ctrl+C), stopping after current file");
                    println!("\n⚠️  Shutdown signal received, finishing current file...");
                    let _ = shutdown_tx.send(true);
                }
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, stopping after current file");
                    println!("\n⚠️  Shutdown signal received, finishing current file...");
                    let _ = shutdown_tx.send(true);
                }
            }
        }

        #[cfg(not(unix))]
        {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            } else {
                tracing::info!("Received SIGINT (Ctrl+C), stopping after current file");
                println!("\n⚠️  Shutdown signal received, finishing current file...");
                let _ = shutdown_tx.send(true);
            }
        }
    });

    let exit_code = match execute_command(&cli, shutdown_rx).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            5
        }
    };

    // process::exit skips destructors
    drop(guard);
    process::exit(exit_code);
}

async fn execute_command(cli: &Cli, shutdown_signal: watch::Receiver<bool>) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Process(args) => args.execute(&cli.config, shutdown_signal).await,
        Commands::ValidateProcedure(args) => args.execute(&cli.config).await,
        Commands::Init(args) => args.execute().await,
    }
}

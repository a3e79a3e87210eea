// Porter - Survey Data Export Worker
// Copyright (c) 2025 Porter Contributors
// Licensed under the MIT License

use clap::Parser;
use porter::cli::{commands::run::RunArgs, Cli, Commands};
use porter::config::load_config;
use porter::logging::init_logging;
use std::process;
use tokio::sync::watch;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    // This is optional - if .env doesn't exist, it's silently ignored
    let _ = dotenvy::dotenv();

    // Parse CLI arguments
    let cli = Cli::parse();

    let exit_code = match &cli.command {
        Commands::Run(args) => run_worker(&cli, args).await,
        Commands::ValidateConfig(args) => match args.execute(&cli.config).await {
            Ok(code) => code,
            Err(e) => {
                eprintln!("Error: {e}");
                5 // Fatal error exit code
            }
        },
    };

    process::exit(exit_code);
}

/// Load configuration, initialize logging and run the worker loop
async fn run_worker(cli: &Cli, args: &RunArgs) -> i32 {
    // The file-logging layer is config-driven, so the config loads first
    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return 2; // Configuration error exit code
        }
    };

    let log_level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.application.log_level.clone());
    let _guard = match init_logging(&log_level, &config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            return 5;
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Porter - Survey Data Export Worker"
    );

    // Create shutdown signal channel for graceful shutdown
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Spawn signal handler task
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigterm =
                signal(SignalKind::terminate()).expect("Failed to create SIGTERM handler");

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Received SIGINT (Ctrl+C), initiating graceful shutdown...");
                    println!("\n⚠️  Shutdown signal received, finishing current export...");
                    let _ = shutdown_tx.send(true);
                }
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, initiating graceful shutdown...");
                    println!("\n⚠️  Shutdown signal received, finishing current export...");
                    let _ = shutdown_tx.send(true);
                }
            }
        }

        #[cfg(not(unix))]
        {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            } else {
                tracing::info!("Received SIGINT (Ctrl+C), initiating graceful shutdown...");
                println!("\n⚠️  Shutdown signal received, finishing current export...");
                let _ = shutdown_tx.send(true);
            }
        }
    });

    match args.execute(config, shutdown_rx).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Worker execution failed");
            eprintln!("Error: {e}");
            5 // Fatal error exit code
        }
    }
}

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod command;
mod config;

use std::process;

use anyhow::Context;
use clap::Parser;
use keyward_core::CredentialService;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::command::Status;
use crate::config::{Cli, log_credential_config};

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "keyward_cli::startup";
pub const TRACING_TARGET_CONFIG: &str = "keyward_cli::config";
pub const TRACING_TARGET_COMMAND: &str = "keyward_cli::command";

#[tokio::main]
async fn main() {
    let error = match run().await {
        Ok(status) => process::exit(status.exit_code()),
        Err(error) => error,
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_COMMAND,
            error = %error,
            "command terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(2);
}

/// Main application entry point.
async fn run() -> anyhow::Result<Status> {
    load_dotenv();
    let cli = Cli::parse();

    init_tracing();
    log_startup_info();
    log_credential_config(&cli.credential);

    let service = CredentialService::from_config(&cli.credential)
        .context("failed to create credential service")?;

    let (output, status) = command::execute(&service, &cli.command, tokio::io::stdin()).await?;
    println!("{}", output.render()?);

    Ok(status)
}

/// Loads variables from a `.env` file when one is present.
#[cfg(feature = "dotenv")]
fn load_dotenv() {
    // A missing file is not an error.
    let _ = dotenvy::dotenv();
}

#[cfg(not(feature = "dotenv"))]
fn load_dotenv() {}

/// Initializes tracing with environment-based filtering.
///
/// Events go to stderr so stdout only carries command output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Logs startup information.
fn log_startup_info() {
    tracing::info!(
        target: TRACING_TARGET_STARTUP,
        version = env!("CARGO_PKG_VERSION"),
        "starting keyward"
    );

    tracing::debug!(
        target: TRACING_TARGET_STARTUP,
        pid = process::id(),
        arch = std::env::consts::ARCH,
        os = std::env::consts::OS,
        features = ?enabled_features(),
        "build information"
    );
}

/// Returns a list of enabled compile-time features.
fn enabled_features() -> Vec<&'static str> {
    [cfg!(feature = "dotenv").then_some("dotenv")]
        .into_iter()
        .flatten()
        .collect()
}

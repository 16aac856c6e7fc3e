//! Command-line entry point for exercising the client core against a backend.

use clap::{Parser, Subcommand};
use serde_json::Value;
use std::io::BufRead;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::sync::mpsc;

use leasehold_client::config::{load_config, parse_config, ClientConfig};
use leasehold_client::lifecycle::wait_for_shutdown_signal;
use leasehold_client::observability::{logging, metrics};
use leasehold_client::verification::DeliveryChannel;
use leasehold_client::ServiceContext;

#[derive(Parser)]
#[command(name = "leasehold-client")]
#[command(about = "Resilient remote-data-access client for the leasehold deposit API", long_about = None)]
struct Cli {
    /// TOML configuration file. Built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate configuration and print the effective settings
    CheckConfig,
    /// Read one record through the cache
    Get { collection: String, id: String },
    /// Queue telemetry events (JSON objects) and flush them
    Track {
        events: Vec<String>,
        /// Keep reading newline-delimited JSON events from stdin until EOF or Ctrl+C
        #[arg(short, long)]
        follow: bool,
    },
    /// Request a one-time code and validate codes read from stdin
    Verify {
        subject: String,
        #[arg(long, default_value = "sms")]
        channel: DeliveryChannel,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path),
        None => parse_config(""),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    logging::init_logging(&config.observability);
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    match run(cli.command, config).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, config: ClientConfig) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match command {
        Commands::CheckConfig => {
            print_config(&config)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Get { collection, id } => {
            let ctx = ServiceContext::new(config)?;
            let value = ctx.remote().fetch_value(&collection, &id, None).await?;
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Track { events, follow } => {
            let mut ctx = ServiceContext::new(config)?;
            ctx.start();
            for raw in &events {
                track(&ctx, raw)?;
            }
            if follow {
                let mut lines = stdin_lines();
                loop {
                    tokio::select! {
                        line = lines.recv() => match line {
                            Some(raw) if raw.trim().is_empty() => {}
                            Some(raw) => {
                                if let Err(e) = track(&ctx, &raw) {
                                    eprintln!("Skipping event: {e}");
                                }
                            }
                            None => break,
                        },
                        _ = wait_for_shutdown_signal() => break,
                    }
                }
            }
            ctx.shutdown().await;

            let remaining = ctx.events().len();
            if remaining > 0 {
                eprintln!("{remaining} event(s) could not be delivered");
                return Ok(ExitCode::FAILURE);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Verify { subject, channel } => {
            let ctx = ServiceContext::new(config)?;
            verify(&ctx, &subject, channel).await
        }
    }
}

fn track(ctx: &ServiceContext, raw: &str) -> Result<(), Box<dyn std::error::Error>> {
    let payload: Value = serde_json::from_str(raw)?;
    let outcome = ctx.events().enqueue(payload)?;
    println!("queued {}", outcome.id());
    Ok(())
}

async fn verify(
    ctx: &ServiceContext,
    subject: &str,
    channel: DeliveryChannel,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let store = ctx.verification();
    let session = store.request_challenge(subject, channel).await?;
    println!(
        "Code sent via {channel}; session {} expires at {}",
        session.session_id,
        session.expires_at.to_rfc3339()
    );
    println!("Enter code ({} attempts):", session.max_attempts);

    let mut lines = stdin_lines();
    loop {
        let line = tokio::select! {
            line = lines.recv() => line,
            _ = wait_for_shutdown_signal() => None,
        };
        let Some(line) = line else {
            return Ok(ExitCode::FAILURE);
        };
        let code = line.trim();
        if code.is_empty() {
            continue;
        }
        match store.validate_challenge(&session.session_id, code).await {
            Ok(outcome) if outcome.verified => {
                println!("Verified");
                return Ok(ExitCode::SUCCESS);
            }
            Ok(outcome) => {
                println!(
                    "Incorrect code, {} attempt(s) remaining",
                    outcome.remaining_attempts
                );
            }
            Err(e) if e.requires_new_challenge() => {
                println!("{e}; request a new code");
                return Ok(ExitCode::FAILURE);
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Lines from stdin, read on a detached thread so a pending read never
/// holds the runtime open at exit.
fn stdin_lines() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn print_config(config: &ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut shown = config.clone();
    if !shown.api.api_key.is_empty() {
        shown.api.api_key = "********".to_string();
    }
    println!("Configuration OK");
    println!("{}", toml::to_string_pretty(&shown)?);
    Ok(())
}

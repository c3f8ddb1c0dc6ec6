use anyhow::Result;
use clap::{Parser, Subcommand};
use log::{error, info};
use pipewatch::aws::load_sdk_config;
use pipewatch::config::{ConnectorStatusConfig, ReplayDurationConfig};
use pipewatch::jobs::{with_deadline, ConnectorStatusJob, ReplayDurationJob};
use std::process::ExitCode;
use std::time::Duration;

/// Command-line arguments for pipewatch
#[derive(Parser, Debug)]
#[command(
    name = "pipewatch",
    about = "Scheduled health checks for a Kafka Connect sink pipeline",
    long_about = "Probes Kafka Connect connector status and replay latency, publishing \
                  alerts to SNS and latency metrics to CloudWatch. Each invocation runs \
                  one pipeline once and exits. Every flag can also be set through the \
                  environment variable named in its help."
)]
struct Cli {
    /// Enable verbose logging
    #[arg(
        short,
        long,
        global = true,
        help = "Enable verbose logging output (sets RUST_LOG=debug)"
    )]
    verbose: bool,

    /// Abort the invocation after this many seconds
    #[arg(
        long,
        global = true,
        env = "INVOCATION_DEADLINE_SECS",
        value_name = "SECONDS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    deadline_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check every configured connector and alert on unhealthy ones
    ConnectorStatus(ConnectorStatusConfig),
    /// Emit the replay latency metric for recently inserted rounds
    ReplayDuration(ReplayDurationConfig),
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::ConnectorStatus(_) => "connector-status",
            Command::ReplayDuration(_) => "replay-duration",
        }
    }
}

impl Cli {
    fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }
}

async fn run(command: &Command, deadline: Option<Duration>) -> Result<()> {
    let sdk_config = load_sdk_config().await;

    match command {
        Command::ConnectorStatus(config) => {
            let job = ConnectorStatusJob::from_config(config, &sdk_config)?;

            let summary = with_deadline(deadline, job.run()).await?;
            info!(
                "Connector status check complete: {} connectors checked, {} alerts sent",
                summary.connectors_checked, summary.alerts_sent
            );
        }
        Command::ReplayDuration(config) => {
            let job = ReplayDurationJob::from_config(config, &sdk_config);

            let summary = with_deadline(deadline, job.run()).await?;
            info!(
                "Replay duration run complete: {} rows, {} metrics written, {} failed, {} negative durations",
                summary.rows,
                summary.metrics_emitted,
                summary.metrics_failed,
                summary.negative_durations
            );
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    // Missing or invalid settings exit here, before anything is probed
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    if cli.verbose {
        std::env::set_var("RUST_LOG", "debug");
    }
    env_logger::init();

    info!("Starting pipewatch {}", cli.command.name());

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(&cli.command, cli.deadline())) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{} failed: {:#}", cli.command.name(), e);
            ExitCode::FAILURE
        }
    }
}

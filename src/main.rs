//! CLI entry point for the peakboard dashboard backend.
//!
//! Provides subcommands for serving the dashboard (static assets, health
//! probe, n8n reverse proxy), running one fetch cycle, and polling the
//! upstream workflows on an interval.

use anyhow::Result;
use clap::{Parser, Subcommand};
use peakboard::config::Config;
use peakboard::fetch::auth::ApiKey;
use peakboard::fetch::{BasicClient, HttpClient};
use peakboard::orchestrator;
use peakboard::server;
use std::ffi::OsStr;
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "peakboard")]
#[command(about = "Season-over-season resort KPI dashboard backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the dashboard: static assets, /health, and the /api/n8n proxy
    Serve {
        /// Override the configured listening port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run one fetch cycle and print the snapshot as JSON
    Fetch {
        /// Pretty-print the snapshot
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },
    /// Fetch snapshots on an interval
    Poll {
        /// Seconds between cycles (defaults to POLL_INTERVAL_SECS)
        #[arg(short = 'r', long)]
        interval_secs: Option<u64>,

        /// Number of cycles to run (0 = infinite)
        #[arg(short = 'n', long, default_value_t = 0)]
        count: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/peakboard.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("peakboard.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    // A panic anywhere (including inside a request handler task) means the
    // process is in an unknown state: log it and terminate, and let the
    // deployment environment restart us.
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        error!("{info}");
        default_panic(info);
        std::process::exit(1);
    }));

    let cli = Cli::parse();
    let mut config = Config::from_env()?;

    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.port = port;
            }
            server::serve(config).await?;
        }
        Commands::Fetch { pretty } => {
            let client = build_client(&config)?;
            let snapshot = orchestrator::fetch_all(client.as_ref(), &config).await?;

            let rendered = if pretty {
                serde_json::to_string_pretty(&snapshot)?
            } else {
                serde_json::to_string(&snapshot)?
            };
            println!("{rendered}");
        }
        Commands::Poll {
            interval_secs,
            count,
        } => {
            let interval = interval_secs
                .map(std::time::Duration::from_secs)
                .unwrap_or(config.poll_interval);
            poll(&config, interval, count).await?;
        }
    }

    Ok(())
}

/// Wraps the base client in a bearer-token decorator when a credential is
/// configured.
fn build_client(config: &Config) -> Result<Box<dyn HttpClient>> {
    let basic = BasicClient::with_timeout(config.fetch_timeout)?;

    Ok(match &config.bearer_token {
        Some(token) => Box::new(ApiKey::bearer(basic, token.clone())),
        None => Box::new(basic),
    })
}

/// Runs fetch cycles on a fixed cadence. A failed cycle is logged and the
/// next one still runs; each completed snapshot replaces the previous
/// output wholesale.
async fn poll(config: &Config, interval: std::time::Duration, count: usize) -> Result<()> {
    let client = build_client(config)?;

    if count == 0 {
        info!(interval_secs = interval.as_secs(), "Polling indefinitely. Press Ctrl+C to stop.");
    } else {
        info!(interval_secs = interval.as_secs(), count, "Starting poll cycles");
    }

    let mut cycle = 0;
    loop {
        if count > 0 && cycle >= count {
            break;
        }
        cycle += 1;

        info!(
            cycle,
            total = if count == 0 { None } else { Some(count) },
            "Starting fetch cycle"
        );

        match orchestrator::fetch_all(client.as_ref(), config).await {
            Ok(snapshot) => {
                println!("{}", serde_json::to_string(&snapshot)?);
            }
            Err(e) => {
                error!(error = %e, "Fetch cycle failed");
            }
        }

        if count == 0 || cycle < count {
            tokio::time::sleep(interval).await;
        }
    }

    info!("Finished polling");
    Ok(())
}

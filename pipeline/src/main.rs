// src/main.rs

//! trailguard entry-point: one-shot pipeline stages or a long-running service.
//!
//! 1. Parse the command line & configuration, set up structured logging
//! 2. Build the store, dispatch and control-plane clients
//! 3. Run the requested stage and print its JSON result on stdout
//!
//! `serve` keeps the detector on a fixed interval and answers its requests
//! with an in-process responder until Ctrl-C.

// ───── std / 3rd-party imports ──────────────────────────────────────────────
use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::{Parser, Subcommand};
use fern::Dispatch;
use log::LevelFilter;
use metrics_exporter_prometheus::PrometheusBuilder;
use serde::Serialize;
use serde_json::Value;
use shared::remediation::RemediationRequest;
use std::{
    io::Read,
    path::{Path, PathBuf},
    process,
    sync::Arc,
    thread,
};
use tokio::task::JoinHandle;

// ───── local imports ────────────────────────────────────────────────────────
use trailguard::cloud::{
    ComputeControl, ControlPlaneClient, CredentialControl, DryRunControlPlane,
};
use trailguard::comms::dispatch::{Dispatcher, HttpDispatcher, QueueDispatcher};
use trailguard::comms::listeners::ResponderListener;
use trailguard::config::{self, Config};
use trailguard::detect::{Detector, allowlist::Allowlist};
use trailguard::ingest::Ingestor;
use trailguard::respond::Responder;
use trailguard::store::{EsClient, IndexStore};

/// Cloud audit detection-and-response pipeline.
#[derive(Parser, Debug)]
#[command(name = "trailguard", version, about)]
struct Cli {
    /// Path to the TOML configuration
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Index one log subscription payload
    Ingest {
        /// JSON payload file (stdin when omitted)
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Run one detection scan
    Detect,

    /// Handle one remediation request
    Respond {
        /// JSON request file (stdin when omitted)
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Scan on the configured interval and respond in-process
    Serve,
}

// ───── helpers ──────────────────────────────────────────────────────────────

/// Configure global logging as requested in `cfg.logging`.
/// Logs go to stderr; stdout carries the command result.
fn setup_logging(cfg: &Config) -> Result<(), fern::InitError> {
    let level = match cfg.logging.level.to_uppercase().as_str() {
        "ERROR" => LevelFilter::Error,
        "WARN" => LevelFilter::Warn,
        "DEBUG" => LevelFilter::Debug,
        "TRACE" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    };

    let log_path = cfg
        .logging
        .enable
        .then(|| PathBuf::from(cfg.logging.file.as_deref().unwrap_or("trailguard.log")));

    let mut dispatch = Dispatch::new()
        .format(|out, msg, record| {
            out.finish(format_args!(
                "[{}][{:5}][{}][pid={}][tid={:?}] {}",
                Local::now().to_rfc3339(),
                record.level(),
                record.target(),
                process::id(),
                thread::current().id(),
                msg
            ))
        })
        .level(level)
        .chain(std::io::stderr());

    if let Some(path) = log_path {
        dispatch = dispatch.chain(fern::log_file(path)?);
    }

    dispatch.apply()?;
    Ok(())
}

/// Read a JSON document from `file`, or stdin.
fn read_input(file: Option<&Path>) -> Result<Value> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).context("reading stdin")?;
            buf
        }
    };
    serde_json::from_str(&text).context("input is not valid JSON")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

fn build_store(cfg: &Config) -> Result<Arc<dyn IndexStore>> {
    let store = EsClient::new(&cfg.store).context("building index store client")?;
    log::info!("Index store {} / {}", cfg.store.endpoint, store.index());
    Ok(Arc::new(store))
}

fn build_responder(cfg: &Config) -> Result<Responder> {
    let (compute, credentials): (Arc<dyn ComputeControl>, Arc<dyn CredentialControl>) =
        match cfg.cloud.endpoint.as_deref() {
            Some(endpoint) => {
                let client = Arc::new(
                    ControlPlaneClient::new(endpoint, &cfg.cloud)
                        .context("building control-plane client")?,
                );
                log::info!("Control plane at {} ({})", endpoint, cfg.cloud.region);
                (client.clone() as Arc<dyn ComputeControl>, client as Arc<dyn CredentialControl>)
            }
            None => {
                log::warn!("No control-plane endpoint configured, remediation is dry-run");
                let dry = Arc::new(DryRunControlPlane::new(cfg.cloud.region.clone()));
                (dry.clone() as Arc<dyn ComputeControl>, dry as Arc<dyn CredentialControl>)
            }
        };
    Ok(Responder::new(compute, credentials))
}

/// Remote targets are reached over HTTP; anything else names the in-process
/// responder queue, whose listener is returned alongside.
fn build_dispatcher(cfg: &Config) -> Result<(Arc<dyn Dispatcher>, Option<JoinHandle<usize>>)> {
    let target = cfg.dispatch.target.as_str();
    if target.starts_with("http://") || target.starts_with("https://") {
        let http = HttpDispatcher::new(target, cfg.dispatch.timeout)
            .context("building HTTP dispatcher")?;
        return Ok((Arc::new(http), None));
    }

    let (queue, rx) = QueueDispatcher::channel(target, cfg.dispatch.queue_capacity);
    let responder = Arc::new(build_responder(cfg)?);
    let listener = ResponderListener::new("responder", responder).spawn(rx);
    Ok((Arc::new(queue), Some(listener)))
}

fn build_detector(cfg: &Config, dispatcher: Arc<dyn Dispatcher>) -> Result<Detector> {
    let allowlist = Allowlist::parse(&cfg.detector.allowlist).context("parsing allowlist")?;
    log::info!("Allowlist has {} entr(ies)", allowlist.len());
    Ok(Detector::new(
        build_store(cfg)?,
        dispatcher,
        Arc::new(allowlist),
        cfg.detector.result_cap,
    ))
}

/// Drop the detector (closing the queue) and wait for local responses.
async fn drain(detector: Detector, listener: Option<JoinHandle<usize>>) -> Result<()> {
    drop(detector);
    if let Some(listener) = listener {
        let handled = listener.await.context("responder listener panicked")?;
        log::info!("Responder handled {} request(s)", handled);
    }
    Ok(())
}

// ───── commands ─────────────────────────────────────────────────────────────

async fn run_ingest(cfg: &Config, file: Option<&Path>) -> Result<()> {
    let payload = read_input(file)?;
    let ingestor = Ingestor::new(build_store(cfg)?);
    match ingestor.handle(&payload).await {
        Ok(summary) => print_json(&summary),
        Err(e) => {
            print_json(&serde_json::json!({ "error": e.to_string() }))?;
            bail!(e)
        }
    }
}

async fn run_detect(cfg: &Config) -> Result<()> {
    let (dispatcher, listener) = build_dispatcher(cfg)?;
    let detector = build_detector(cfg, dispatcher)?;
    let summary = detector.run().await;
    drain(detector, listener).await?;
    print_json(&summary)
}

async fn run_respond(cfg: &Config, file: Option<&Path>) -> Result<()> {
    let request: RemediationRequest = serde_json::from_value(read_input(file)?)
        .context("input is not a remediation request")?;
    let outcome = build_responder(cfg)?.handle(&request).await;
    print_json(&outcome)
}

async fn run_serve(cfg: &Config) -> Result<()> {
    if let Some(addr) = cfg.metrics.listen {
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .context("installing Prometheus exporter")?;
        log::info!("Metrics exporter listening on {}", addr);
    }

    let (dispatcher, listener) = build_dispatcher(cfg)?;
    let detector = build_detector(cfg, dispatcher)?;
    let mut ticker = tokio::time::interval(cfg.detector.interval);
    log::info!("Service running, scanning every {:?}", cfg.detector.interval);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let summary = detector.run().await;
                log::debug!("Scan finished: checked={}", summary.checked);
            }
            _ = tokio::signal::ctrl_c() => {
                log::warn!("Shutdown initiated");
                break;
            }
        }
    }

    drain(detector, listener).await?;
    log::info!("Service stopped cleanly");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1 ─ Configuration & logging
    let cfg = config::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    setup_logging(&cfg).context("logging setup failed")?;

    // 2 ─ Stage
    match cli.command {
        Commands::Ingest { file } => run_ingest(&cfg, file.as_deref()).await,
        Commands::Detect => run_detect(&cfg).await,
        Commands::Respond { file } => run_respond(&cfg, file.as_deref()).await,
        Commands::Serve => run_serve(&cfg).await,
    }
}

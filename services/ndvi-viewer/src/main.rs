//! NDVI viewer service.
//!
//! Loads the configured NDVI layers, pre-renders their overlays and
//! histograms, and serves a Leaflet map page plus a small JSON/PNG API.

use std::{env, net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use ndvi_viewer::config::{load_layer_configs, LayerConfig};
use ndvi_viewer::render;
use ndvi_viewer::server::create_router;
use ndvi_viewer::state::AppState;

#[derive(Parser, Debug)]
#[command(name = "ndvi-viewer")]
#[command(about = "NDVI raster viewer with colorized map overlay and histogram")]
struct Args {
    /// Listen address
    #[arg(short, long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    listen: String,

    /// Directory containing layers/*.yaml
    #[arg(long, env = "CONFIG_DIR", default_value = "config")]
    config_dir: PathBuf,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Number of tokio worker threads (default: number of CPU cores)
    #[arg(long)]
    worker_threads: Option<usize>,

    /// Render every layer's artifacts into this directory and exit
    #[arg(long)]
    render_to: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = args.worker_threads {
        info!("Configuring tokio runtime with {} worker threads", threads);
        runtime_builder.worker_threads(threads);
    } else if let Ok(threads_str) = env::var("TOKIO_WORKER_THREADS") {
        if let Ok(threads) = threads_str.parse::<usize>() {
            info!("Configuring tokio runtime with {} worker threads (from env)", threads);
            runtime_builder.worker_threads(threads);
        }
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(async_main(args))
}

fn init_tracing(log_level: &str) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

async fn async_main(args: Args) -> Result<()> {
    let mut configs = load_layer_configs(&args.config_dir)?;
    if configs.is_empty() {
        warn!(
            config_dir = %args.config_dir.display(),
            "No layer configurations found, using the built-in CRC NAIP 2011 layer"
        );
        configs.push(LayerConfig::builtin());
    }

    if let Some(out_dir) = args.render_to {
        let state = AppState::load(configs).await;
        if !state.is_ready() {
            anyhow::bail!("No layers could be loaded");
        }
        let written = tokio::task::spawn_blocking(move || render::write_all(&state, &out_dir))
            .await
            .context("Render task failed")??;
        info!(count = written.len(), "Rendering complete");
        return Ok(());
    }

    // Initialize Prometheus metrics exporter before layers record timings
    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;
    info!("Prometheus metrics exporter initialized");

    info!(layers = configs.len(), "Loading NDVI layers");
    let state = Arc::new(AppState::load(configs).await);
    if !state.is_ready() {
        warn!("No layers loaded; serving an empty index");
    }

    let app = create_router(state, prometheus_handle);

    let addr: SocketAddr = args
        .listen
        .parse()
        .with_context(|| format!("Invalid listen address: {}", args.listen))?;
    info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

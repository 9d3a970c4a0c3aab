//! Headless mogcam engine binary.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mogcam_vision::BlankFrameSource;
use mogcam_worker::{Engine, EngineConfig, SimulatedDetector};

const FRAME_WIDTH: u32 = 1280;
const FRAME_HEIGHT: u32 = 720;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env().add_directive("mogcam=info".parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting mogcam-worker");

    let config = EngineConfig::from_env();
    info!("Engine config: {:?}", config);

    if config.metrics_enabled {
        PrometheusBuilder::new()
            .with_http_listener(config.metrics_addr)
            .install()?;
        info!(addr = %config.metrics_addr, "Prometheus exporter listening");
    }

    let detector = SimulatedDetector::new(config.simulation.clone(), config.rng_seed)?;
    let engine = match Engine::new(config) {
        Ok(engine) => Arc::new(engine),
        Err(e) => {
            error!("Failed to create engine: {}", e);
            std::process::exit(1);
        }
    };

    // Setup signal handler
    let signal_engine = Arc::clone(&engine);
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received shutdown signal");
        signal_engine.shutdown();
    });

    let source = Box::new(BlankFrameSource::new(FRAME_WIDTH, FRAME_HEIGHT));
    match engine.run(source, Arc::new(detector)).await {
        Ok(report) => {
            info!(
                session_id = %report.session_id,
                frames = report.frames,
                report = %serde_json::to_string(&report)?,
                "Engine shutdown complete"
            );
            Ok(())
        }
        Err(e) => {
            error!("Engine error: {}", e);
            std::process::exit(1);
        }
    }
}

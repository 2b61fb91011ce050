//! Rendezvous entry point
//!
//! Reads rows from `ROWS_PATH`, asks for an increment on stdin, and writes
//! the updated rows back.

use rendezvous_core::coordinator::{self, CoordinatorConfig};
use rendezvous_core::input::StdinPrompt;
use rendezvous_core::runtime::{RendezvousRuntime, RuntimeConfig};
use rendezvous_core::storage::CsvFileStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they don't interleave with the prompt
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration from environment
    let rows_path = std::env::var("ROWS_PATH")
        .unwrap_or_else(|_| rendezvous_core::DEFAULT_ROWS_PATH.into());
    let shutdown_delay_ms = match std::env::var("SHUTDOWN_DELAY_MS") {
        Ok(value) => value.parse()?,
        Err(_) => rendezvous_core::DEFAULT_SHUTDOWN_DELAY_MS,
    };
    let mut runtime_config = RuntimeConfig::default();
    if let Ok(value) = std::env::var("WORKER_THREADS") {
        runtime_config.worker_threads = value.parse()?;
    }

    let config = CoordinatorConfig {
        shutdown_delay: Duration::from_millis(shutdown_delay_ms),
    };
    let store = Arc::new(CsvFileStore::new(&rows_path));
    let prompt = Arc::new(StdinPrompt::default());

    info!("Starting rendezvous over {}", rows_path);
    let runtime = RendezvousRuntime::new(runtime_config)?;
    let outcome = runtime.block_on(coordinator::run(config, store, prompt));

    // The run is terminal here; report before tearing the runtime down
    let result = match outcome {
        Ok(report) => {
            info!(
                "Run finished in {:?}: {} rows written after {} messages",
                report.phase, report.rows_written, report.messages_received
            );
            Ok(())
        }
        Err(e) => {
            error!("Run failed: {}", e);
            Err(e.into())
        }
    };
    runtime.shutdown();
    result
}

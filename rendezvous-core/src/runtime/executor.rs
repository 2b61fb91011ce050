//! Tokio runtime used by the entry point
//!
//! The coordinator and both workers are tasks on one multi-thread runtime.
//! Collaborator calls go to its blocking pool.

use tokio::runtime::{Builder, Runtime};
use crate::error::{RendezvousError, Result};

/// Configuration for the rendezvous runtime
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Number of async worker threads
    pub worker_threads: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            worker_threads: num_cpus::get().max(2),
        }
    }
}

/// Runtime hosting one coordinator run
pub struct RendezvousRuntime {
    runtime: Runtime,
    config: RuntimeConfig,
}

impl RendezvousRuntime {
    /// Create a new runtime with the given configuration
    pub fn new(config: RuntimeConfig) -> Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(config.worker_threads.max(1))
            .thread_name("rendezvous")
            .enable_all()
            .build()
            .map_err(|e| RendezvousError::Internal {
                message: format!("Failed to create runtime: {}", e),
            })?;

        Ok(Self { runtime, config })
    }

    /// Spawn a task
    pub fn spawn<F>(&self, future: F) -> tokio::task::JoinHandle<F::Output>
    where
        F: std::future::Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.runtime.spawn(future)
    }

    /// Run a future, blocking the calling thread until complete
    pub fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Configuration the runtime was built with
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Tear the runtime down without waiting on the blocking pool.
    ///
    /// Call only once the run is terminal. A prompt read still parked on
    /// stdin is abandoned rather than joined.
    pub fn shutdown(self) {
        self.runtime.shutdown_background();
    }
}

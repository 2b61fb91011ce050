//! Async runtime management
//!
//! Provides the tokio runtime and the run-wide shutdown signal.

pub mod executor;
pub mod shutdown;

pub use executor::{RendezvousRuntime, RuntimeConfig};
pub use shutdown::ShutdownSignal;

//! Rendezvous Core - actor-style request/response coordinator
//!
//! This crate provides:
//! - A closed message protocol with mailbox addresses
//! - A data worker owning the row store
//! - An input worker owning the increment prompt
//! - A coordinator merging both answers into a single write

pub mod coordinator;
pub mod data;
pub mod error;
pub mod input;
pub mod protocol;
pub mod runtime;
pub mod storage;
pub mod worker;

pub use coordinator::{Coordinator, CoordinatorConfig, CoordinatorPhase, RunReport};
pub use data::Row;
pub use error::{RendezvousError, Result};
pub use runtime::RendezvousRuntime;

/// Default grace period between stopping the workers and terminating
pub const DEFAULT_SHUTDOWN_DELAY_MS: u64 = 2_000;

/// Default row file used by the binary
pub const DEFAULT_ROWS_PATH: &str = "people.csv";

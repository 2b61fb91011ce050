//! Worker tasks
//!
//! Each worker owns one external collaborator and serves the coordinator
//! from its own mailbox, one message at a time.

pub mod data_worker;
pub mod input_worker;
pub mod state;

pub use data_worker::DataWorker;
pub use input_worker::InputWorker;
pub use state::{WorkerPhase, WorkerState};

use crate::error::{RendezvousError, Result};
use crate::protocol::Role;

/// Run a blocking collaborator call off the async threads.
///
/// A panic inside the call becomes an error answer.
pub(crate) async fn run_blocking<T, F>(role: Role, call: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(call)
        .await
        .unwrap_or_else(|e| {
            Err(RendezvousError::Internal {
                message: format!("{} collaborator call aborted: {}", role, e),
            })
        })
}

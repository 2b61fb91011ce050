//! Data worker
//!
//! Sole owner of the row store. Answers read and write requests.

use std::ops::ControlFlow;
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::run_blocking;
use super::state::{WorkerPhase, WorkerState};
use crate::protocol::{Address, Mailbox, Message, Role};
use crate::runtime::ShutdownSignal;
use crate::storage::RowStore;

/// Worker serving `ReadRequest` and `WriteRequest`
pub struct DataWorker {
    state: WorkerState,
    store: Option<Arc<dyn RowStore>>,
}

impl DataWorker {
    /// Create a worker answering from the mailbox behind `me`
    pub fn new(me: Address, store: Arc<dyn RowStore>) -> Self {
        Self {
            state: WorkerState::new(me),
            store: Some(store),
        }
    }

    /// Spawn a data worker task; returns its address and join handle
    pub fn spawn(
        store: Arc<dyn RowStore>,
        shutdown: &ShutdownSignal,
    ) -> (Address, JoinHandle<WorkerPhase>) {
        let (me, mailbox) = Address::channel(Role::DataWorker);
        let worker = Self::new(me.clone(), store);
        let handle = tokio::spawn(worker.run(mailbox, shutdown.subscribe()));
        (me, handle)
    }

    /// Current phase
    pub fn phase(&self) -> WorkerPhase {
        self.state.phase()
    }

    /// Serve messages until `Stop`, shutdown, or a closed mailbox
    pub async fn run(
        mut self,
        mut mailbox: Mailbox,
        mut shutdown: broadcast::Receiver<()>,
    ) -> WorkerPhase {
        let id = mailbox.id();
        debug!("Data worker {} starting", id);

        loop {
            let message = tokio::select! {
                biased;
                message = mailbox.recv() => message,
                _ = shutdown.recv() => {
                    debug!("Data worker {} received shutdown", id);
                    None
                }
            };

            let Some(message) = message else { break };
            if self.handle(message).await.is_break() {
                break;
            }
        }

        self.stop();
        self.state.phase()
    }

    /// Process one message
    pub async fn handle(&mut self, message: Message) -> ControlFlow<()> {
        let kind = message.kind();
        match message {
            Message::Greet(coordinator) => self.state.greet(coordinator),
            Message::ReadRequest => {
                let (Some(to), Some(store)) = (self.state.reply_to(kind), &self.store) else {
                    return ControlFlow::Continue(());
                };
                let to = to.clone();
                let store = store.clone();

                let rows = run_blocking(Role::DataWorker, move || store.load()).await;
                match &rows {
                    Ok(rows) => info!("Read {} rows", rows.len()),
                    Err(e) => error!("Read failed: {}", e),
                }
                to.tell(Message::ReadAnswer(rows));
            }
            Message::WriteRequest(rows) => {
                let (Some(to), Some(store)) = (self.state.reply_to(kind), &self.store) else {
                    return ControlFlow::Continue(());
                };
                let to = to.clone();
                let store = store.clone();

                let count = rows.len();
                let saved = run_blocking(Role::DataWorker, move || store.save(&rows)).await;
                match &saved {
                    Ok(()) => info!("Wrote {} rows", count),
                    Err(e) => error!("Write failed: {}", e),
                }
                to.tell(Message::WriteAck(saved));
            }
            Message::Stop => {
                self.stop();
                return ControlFlow::Break(());
            }
            other => warn!("Data worker ignoring unexpected {}", other),
        }
        ControlFlow::Continue(())
    }

    fn stop(&mut self) {
        self.state.terminate();
        self.store = None;
    }
}

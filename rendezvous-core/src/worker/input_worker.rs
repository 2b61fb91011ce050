//! Input worker
//!
//! Sole owner of the number prompt. Answers one `InputRequest` per ask.

use std::ops::ControlFlow;
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::run_blocking;
use super::state::{WorkerPhase, WorkerState};
use crate::input::NumberPrompt;
use crate::protocol::{Address, Mailbox, Message, Role};
use crate::runtime::ShutdownSignal;

/// Worker serving `InputRequest`
pub struct InputWorker {
    state: WorkerState,
    prompt: Option<Arc<dyn NumberPrompt>>,
}

impl InputWorker {
    /// Create a worker answering from the mailbox behind `me`
    pub fn new(me: Address, prompt: Arc<dyn NumberPrompt>) -> Self {
        Self {
            state: WorkerState::new(me),
            prompt: Some(prompt),
        }
    }

    /// Spawn an input worker task; returns its address and join handle
    pub fn spawn(
        prompt: Arc<dyn NumberPrompt>,
        shutdown: &ShutdownSignal,
    ) -> (Address, JoinHandle<WorkerPhase>) {
        let (me, mailbox) = Address::channel(Role::InputWorker);
        let worker = Self::new(me.clone(), prompt);
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
        debug!("Input worker {} starting", id);

        loop {
            let message = tokio::select! {
                biased;
                message = mailbox.recv() => message,
                _ = shutdown.recv() => {
                    debug!("Input worker {} received shutdown", id);
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
            Message::InputRequest => {
                let (Some(to), Some(prompt)) = (self.state.reply_to(kind), &self.prompt) else {
                    return ControlFlow::Continue(());
                };
                let to = to.clone();
                let prompt = prompt.clone();

                let value = run_blocking(Role::InputWorker, move || prompt.prompt()).await;
                match &value {
                    Ok(n) => info!("Got increment {}", n),
                    Err(e) => warn!("Prompt failed: {}", e),
                }
                to.tell(Message::InputAnswer(value));
            }
            Message::Stop => {
                self.stop();
                return ControlFlow::Break(());
            }
            other => warn!("Input worker ignoring unexpected {}", other),
        }
        ControlFlow::Continue(())
    }

    fn stop(&mut self) {
        self.state.terminate();
        self.prompt = None;
    }
}

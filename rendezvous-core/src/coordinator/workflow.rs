//! Coordinator workflow
//!
//! `Idle -> AwaitingGreets -> AwaitingAnswers -> Writing -> Closing -> Terminated`,
//! or `Failed` as soon as any worker answers with an error.
//!
//! All state is owned by the coordinator task and only touched from its
//! message loop, so no locking is involved.

use std::ops::ControlFlow;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{debug, error, info, warn};

use super::merge::apply_increment;
use crate::data::Row;
use crate::error::{RendezvousError, Result};
use crate::input::NumberPrompt;
use crate::protocol::{Address, Mailbox, Message, Role};
use crate::runtime::ShutdownSignal;
use crate::storage::RowStore;
use crate::worker::{DataWorker, InputWorker, WorkerPhase};

/// Configuration for the coordinator
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Grace period between stopping the workers and terminating
    pub shutdown_delay: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            shutdown_delay: Duration::from_millis(crate::DEFAULT_SHUTDOWN_DELAY_MS),
        }
    }
}

/// Coordinator phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorPhase {
    /// Waiting for `Start`
    Idle,
    /// Workers spawned and greeted, acks outstanding
    AwaitingGreets,
    /// Both workers acked, answers outstanding
    AwaitingAnswers,
    /// Write request issued
    Writing,
    /// Workers stopped, shutdown timer armed
    Closing,
    /// Run complete
    Terminated,
    /// A worker reported a failure
    Failed,
}

impl CoordinatorPhase {
    /// Whether the coordinator loop has ended
    pub fn is_terminal(&self) -> bool {
        matches!(self, CoordinatorPhase::Terminated | CoordinatorPhase::Failed)
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Final phase
    pub phase: CoordinatorPhase,
    /// Rows sent in the write request
    pub rows_written: usize,
    /// Increment applied
    pub increment: Option<i64>,
    /// Messages the coordinator received, ignored ones included
    pub messages_received: usize,
    /// Workers that had exited in `Terminated` by the time the run ended
    pub workers_stopped: usize,
}

/// Collaborators handed to the workers on `Start`
struct Collaborators {
    store: Arc<dyn RowStore>,
    prompt: Arc<dyn NumberPrompt>,
}

/// Workers spawned but not yet acknowledged
#[derive(Default)]
struct PendingWorkers {
    data: Option<Address>,
    input: Option<Address>,
}

/// Workflow bookkeeping
struct CoordinatorState {
    phase: CoordinatorPhase,
    data_worker: Option<Address>,
    input_worker: Option<Address>,
    rows: Option<Vec<Row>>,
    increment: Option<i64>,
    write_issued: bool,
    rows_written: usize,
    messages_received: usize,
    workers_stopped: usize,
}

impl CoordinatorState {
    fn new() -> Self {
        Self {
            phase: CoordinatorPhase::Idle,
            data_worker: None,
            input_worker: None,
            rows: None,
            increment: None,
            write_issued: false,
            rows_written: 0,
            messages_received: 0,
            workers_stopped: 0,
        }
    }
}

/// Main coordinator
pub struct Coordinator {
    config: CoordinatorConfig,
    me: Address,
    collaborators: Option<Collaborators>,
    pending: PendingWorkers,
    state: CoordinatorState,
    shutdown: ShutdownSignal,
    workers: Vec<JoinHandle<WorkerPhase>>,
}

impl Coordinator {
    /// Create a coordinator and its mailbox
    pub fn new(
        config: CoordinatorConfig,
        store: Arc<dyn RowStore>,
        prompt: Arc<dyn NumberPrompt>,
    ) -> (Self, Mailbox) {
        let (me, mailbox) = Address::channel(Role::Coordinator);
        let coordinator = Self {
            config,
            me,
            collaborators: Some(Collaborators { store, prompt }),
            pending: PendingWorkers::default(),
            state: CoordinatorState::new(),
            shutdown: ShutdownSignal::new(),
            workers: Vec::new(),
        };
        (coordinator, mailbox)
    }

    /// Spawn a coordinator task. Send `Start` through the handle to begin.
    pub fn spawn(
        config: CoordinatorConfig,
        store: Arc<dyn RowStore>,
        prompt: Arc<dyn NumberPrompt>,
    ) -> CoordinatorHandle {
        let (coordinator, mailbox) = Self::new(config, store, prompt);
        let address = coordinator.address().clone();
        let shutdown = coordinator.shutdown_signal();
        let join = tokio::spawn(coordinator.run(mailbox));
        CoordinatorHandle {
            address,
            shutdown,
            join,
        }
    }

    /// Own address
    pub fn address(&self) -> &Address {
        &self.me
    }

    /// Current phase
    pub fn phase(&self) -> CoordinatorPhase {
        self.state.phase
    }

    /// Signal fired when the run terminates or fails
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Snapshot of the run so far
    pub fn report(&self) -> RunReport {
        RunReport {
            phase: self.state.phase,
            rows_written: self.state.rows_written,
            increment: self.state.increment,
            messages_received: self.state.messages_received,
            workers_stopped: self.state.workers_stopped,
        }
    }

    /// Process messages until a terminal phase is reached
    pub async fn run(mut self, mut mailbox: Mailbox) -> Result<RunReport> {
        info!("Coordinator {} waiting for start", self.me.id());

        while let Some(message) = mailbox.recv().await {
            if let ControlFlow::Break(outcome) = self.handle(message) {
                self.join_workers().await;
                return outcome.map(|_| self.report());
            }
        }

        Err(RendezvousError::CoordinatorStopped)
    }

    /// Process one message. `Break` carries the outcome of the run.
    pub fn handle(&mut self, message: Message) -> ControlFlow<Result<RunReport>> {
        use CoordinatorPhase::*;

        self.state.messages_received += 1;
        debug!("Coordinator got {} in {:?}", message, self.state.phase);

        match (self.state.phase, message) {
            (Idle, Message::Start) => self.start(),
            (AwaitingGreets, Message::GreetAck(from)) => self.on_greet_ack(from),
            (AwaitingGreets | AwaitingAnswers, Message::ReadAnswer(answer)) => match answer {
                Ok(rows) => self.on_rows(rows),
                Err(e) => return self.fail(Role::DataWorker, e),
            },
            (AwaitingGreets | AwaitingAnswers, Message::InputAnswer(answer)) => match answer {
                Ok(increment) => self.on_increment(increment),
                Err(e) => return self.fail(Role::InputWorker, e),
            },
            (Writing, Message::WriteAck(Ok(()))) => self.close(),
            (Writing, Message::WriteAck(Err(e))) => return self.fail(Role::DataWorker, e),
            (Closing, Message::ShutdownTimer) => return self.terminate(),
            (phase, other) => warn!("Coordinator ignoring {} in {:?}", other, phase),
        }

        ControlFlow::Continue(())
    }

    fn start(&mut self) {
        let Some(Collaborators { store, prompt }) = self.collaborators.take() else {
            warn!("Coordinator already started");
            return;
        };

        let (data, data_handle) = DataWorker::spawn(store, &self.shutdown);
        let (input, input_handle) = InputWorker::spawn(prompt, &self.shutdown);
        self.workers.extend([data_handle, input_handle]);
        self.greet_workers(data, input);
    }

    fn greet_workers(&mut self, data: Address, input: Address) {
        info!(
            "Coordinator {} greeting data worker {} and input worker {}",
            self.me.id(),
            data.id(),
            input.id()
        );
        data.tell(Message::Greet(self.me.clone()));
        input.tell(Message::Greet(self.me.clone()));
        self.pending = PendingWorkers {
            data: Some(data),
            input: Some(input),
        };
        self.state.phase = CoordinatorPhase::AwaitingGreets;
    }

    fn on_greet_ack(&mut self, from: Address) {
        let id = from.id();
        let is_data = self.pending.data.as_ref().is_some_and(|a| a.id() == id);
        let is_input = self.pending.input.as_ref().is_some_and(|a| a.id() == id);

        if is_data && self.state.data_worker.is_none() {
            debug!("Data worker {} acknowledged, requesting rows", id);
            from.tell(Message::ReadRequest);
            self.state.data_worker = Some(from);
        } else if is_input && self.state.input_worker.is_none() {
            debug!("Input worker {} acknowledged, requesting increment", id);
            from.tell(Message::InputRequest);
            self.state.input_worker = Some(from);
        } else {
            warn!("Ignoring unknown or repeated greet ack from {}", id);
            return;
        }

        if self.state.data_worker.is_some() && self.state.input_worker.is_some() {
            self.state.phase = CoordinatorPhase::AwaitingAnswers;
        }
    }

    fn on_rows(&mut self, rows: Vec<Row>) {
        if self.state.rows.is_some() {
            warn!("Ignoring repeated read answer");
            return;
        }
        info!("Received {} rows", rows.len());
        self.state.rows = Some(rows);
        self.try_write();
    }

    fn on_increment(&mut self, increment: i64) {
        if self.state.increment.is_some() {
            warn!("Ignoring repeated input answer");
            return;
        }
        info!("Received increment {}", increment);
        self.state.increment = Some(increment);
        self.try_write();
    }

    /// Issue the single write once rows and increment are both present
    fn try_write(&mut self) {
        if self.state.write_issued {
            return;
        }
        let (Some(rows), Some(increment)) = (&self.state.rows, self.state.increment) else {
            return;
        };
        let Some(data) = &self.state.data_worker else {
            return;
        };

        let updated = apply_increment(rows, increment);
        info!("Writing {} rows with increment {}", updated.len(), increment);
        self.state.rows_written = updated.len();
        data.tell(Message::WriteRequest(updated));
        self.state.write_issued = true;
        self.state.phase = CoordinatorPhase::Writing;
    }

    fn close(&mut self) {
        self.stop_workers();

        let me = self.me.clone();
        let delay = self.config.shutdown_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            me.tell(Message::ShutdownTimer);
        });

        info!("Write acknowledged, terminating in {:?}", delay);
        self.state.phase = CoordinatorPhase::Closing;
    }

    fn terminate(&mut self) -> ControlFlow<Result<RunReport>> {
        self.state.phase = CoordinatorPhase::Terminated;
        self.shutdown.shutdown();
        info!("Coordinator {} terminated", self.me.id());
        ControlFlow::Break(Ok(self.report()))
    }

    fn fail(&mut self, role: Role, cause: RendezvousError) -> ControlFlow<Result<RunReport>> {
        error!("{} failed, halting: {}", role, cause);
        self.stop_workers();
        self.state.phase = CoordinatorPhase::Failed;
        self.shutdown.shutdown();
        ControlFlow::Break(Err(RendezvousError::WorkerFailed {
            role,
            reason: cause.to_string(),
        }))
    }

    /// Collect workers that have already exited. One still parked in a
    /// collaborator call is left detached.
    async fn join_workers(&mut self) {
        for worker in self.workers.drain(..) {
            if !worker.is_finished() {
                debug!("Worker still busy at coordinator exit, detaching");
                continue;
            }
            match worker.await {
                Ok(phase) => {
                    debug!("Worker exited in {:?}", phase);
                    if phase == WorkerPhase::Terminated {
                        self.state.workers_stopped += 1;
                    }
                }
                Err(e) => warn!("Worker task failed: {}", e),
            }
        }
    }

    fn stop_workers(&self) {
        let known = [
            self.state.data_worker.as_ref().or(self.pending.data.as_ref()),
            self.state.input_worker.as_ref().or(self.pending.input.as_ref()),
        ];
        for worker in known.into_iter().flatten() {
            worker.tell(Message::Stop);
        }
    }
}

/// Handle to a spawned coordinator task
pub struct CoordinatorHandle {
    address: Address,
    shutdown: ShutdownSignal,
    join: JoinHandle<Result<RunReport>>,
}

impl CoordinatorHandle {
    /// Coordinator address
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Signal fired when the run ends
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Send `Start`
    pub fn start(&self) -> Result<()> {
        if self.address.tell(Message::Start) {
            Ok(())
        } else {
            Err(RendezvousError::CoordinatorStopped)
        }
    }

    /// Wait for the coordinator to reach a terminal phase
    pub async fn wait(self) -> Result<RunReport> {
        self.join
            .await
            .map_err(|_| RendezvousError::CoordinatorStopped)?
    }
}

/// Spawn a coordinator, start it, and wait for it to finish
pub async fn run(
    config: CoordinatorConfig,
    store: Arc<dyn RowStore>,
    prompt: Arc<dyn NumberPrompt>,
) -> Result<RunReport> {
    let handle = Coordinator::spawn(config, store, prompt);
    handle.start()?;
    handle.wait().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::FixedPrompt;
    use crate::storage::MemoryStore;

    struct Harness {
        coordinator: Coordinator,
        inbox: Mailbox,
        data: Address,
        data_box: Mailbox,
        input: Address,
        input_box: Mailbox,
    }

    /// Coordinator greeting hand-driven worker mailboxes
    fn harness() -> Harness {
        let config = CoordinatorConfig {
            shutdown_delay: Duration::from_millis(10),
        };
        let (mut coordinator, inbox) = Coordinator::new(
            config,
            Arc::new(MemoryStore::default()),
            Arc::new(FixedPrompt::number(0)),
        );
        let (data, mut data_box) = Address::channel(Role::DataWorker);
        let (input, mut input_box) = Address::channel(Role::InputWorker);

        coordinator.greet_workers(data.clone(), input.clone());
        assert!(matches!(data_box.try_recv(), Some(Message::Greet(_))));
        assert!(matches!(input_box.try_recv(), Some(Message::Greet(_))));

        Harness {
            coordinator,
            inbox,
            data,
            data_box,
            input,
            input_box,
        }
    }

    fn people() -> Vec<Row> {
        vec![
            Row::new("Ada", "Lovelace", 36),
            Row::new("Alan", "Turing", 41),
            Row::new("Grace", "Hopper", 85),
        ]
    }

    fn drain(mailbox: &mut Mailbox) -> Vec<Message> {
        std::iter::from_fn(|| mailbox.try_recv()).collect()
    }

    fn write_requests(messages: Vec<Message>) -> Vec<Vec<Row>> {
        messages
            .into_iter()
            .filter_map(|m| match m {
                Message::WriteRequest(rows) => Some(rows),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_requests_follow_each_ack() {
        let mut h = harness();

        let _ = h.coordinator.handle(Message::GreetAck(h.input.clone()));
        assert!(matches!(h.input_box.try_recv(), Some(Message::InputRequest)));
        assert!(h.data_box.try_recv().is_none());
        assert_eq!(h.coordinator.phase(), CoordinatorPhase::AwaitingGreets);

        let _ = h.coordinator.handle(Message::GreetAck(h.data.clone()));
        assert!(matches!(h.data_box.try_recv(), Some(Message::ReadRequest)));
        assert_eq!(h.coordinator.phase(), CoordinatorPhase::AwaitingAnswers);
    }

    #[tokio::test]
    async fn test_unknown_and_repeated_acks_ignored() {
        let mut h = harness();
        let (stranger, _stranger_box) = Address::channel(Role::DataWorker);

        let _ = h.coordinator.handle(Message::GreetAck(stranger));
        let _ = h.coordinator.handle(Message::GreetAck(h.data.clone()));
        let _ = h.coordinator.handle(Message::GreetAck(h.data.clone()));

        assert_eq!(drain(&mut h.data_box).len(), 1);
        assert_eq!(h.coordinator.phase(), CoordinatorPhase::AwaitingGreets);
    }

    #[tokio::test]
    async fn test_answers_commute() {
        let mut payloads = Vec::new();

        for read_first in [true, false] {
            let mut h = harness();
            let _ = h.coordinator.handle(Message::GreetAck(h.data.clone()));
            let _ = h.coordinator.handle(Message::GreetAck(h.input.clone()));

            let read = Message::ReadAnswer(Ok(people()));
            let input = Message::InputAnswer(Ok(5));
            let (first, second) = if read_first { (read, input) } else { (input, read) };

            assert!(h.coordinator.handle(first).is_continue());
            assert_eq!(h.coordinator.phase(), CoordinatorPhase::AwaitingAnswers);
            assert!(h.coordinator.handle(second).is_continue());
            assert_eq!(h.coordinator.phase(), CoordinatorPhase::Writing);

            let writes = write_requests(drain(&mut h.data_box));
            assert_eq!(writes.len(), 1);
            payloads.push(writes.into_iter().next().unwrap());
        }

        assert_eq!(payloads[0], payloads[1]);
        assert_eq!(payloads[0], apply_increment(&people(), 5));
    }

    #[tokio::test]
    async fn test_answer_may_overtake_other_ack() {
        let mut h = harness();
        let _ = h.coordinator.handle(Message::GreetAck(h.data.clone()));
        let _ = h.coordinator.handle(Message::ReadAnswer(Ok(people())));
        assert_eq!(h.coordinator.phase(), CoordinatorPhase::AwaitingGreets);

        let _ = h.coordinator.handle(Message::GreetAck(h.input.clone()));
        let _ = h.coordinator.handle(Message::InputAnswer(Ok(1)));

        let writes = write_requests(drain(&mut h.data_box));
        assert_eq!(writes, vec![apply_increment(&people(), 1)]);
    }

    #[tokio::test]
    async fn test_write_issued_exactly_once() {
        let mut h = harness();
        let _ = h.coordinator.handle(Message::GreetAck(h.data.clone()));
        let _ = h.coordinator.handle(Message::GreetAck(h.input.clone()));

        let _ = h.coordinator.handle(Message::ReadAnswer(Ok(people())));
        let _ = h.coordinator.handle(Message::ReadAnswer(Ok(Vec::new())));
        let _ = h.coordinator.handle(Message::InputAnswer(Ok(2)));
        let _ = h.coordinator.handle(Message::InputAnswer(Ok(3)));
        let _ = h.coordinator.handle(Message::ReadAnswer(Ok(people())));
        h.coordinator.try_write();
        h.coordinator.try_write();

        let writes = write_requests(drain(&mut h.data_box));
        assert_eq!(writes, vec![apply_increment(&people(), 2)]);
        assert_eq!(h.coordinator.report().increment, Some(2));
    }

    #[tokio::test]
    async fn test_empty_source_still_writes() {
        let mut h = harness();
        let _ = h.coordinator.handle(Message::GreetAck(h.data.clone()));
        let _ = h.coordinator.handle(Message::GreetAck(h.input.clone()));
        let _ = h.coordinator.handle(Message::InputAnswer(Ok(4)));
        let _ = h.coordinator.handle(Message::ReadAnswer(Ok(Vec::new())));

        let writes = write_requests(drain(&mut h.data_box));
        assert_eq!(writes, vec![Vec::<Row>::new()]);
    }

    #[tokio::test]
    async fn test_close_then_terminate() {
        let mut h = harness();
        let _ = h.coordinator.handle(Message::GreetAck(h.data.clone()));
        let _ = h.coordinator.handle(Message::GreetAck(h.input.clone()));
        let _ = h.coordinator.handle(Message::ReadAnswer(Ok(people())));
        let _ = h.coordinator.handle(Message::InputAnswer(Ok(5)));
        drain(&mut h.data_box);
        drain(&mut h.input_box);

        let mut shutdown = h.coordinator.shutdown_signal().subscribe();
        let _ = h.coordinator.handle(Message::WriteAck(Ok(())));
        assert_eq!(h.coordinator.phase(), CoordinatorPhase::Closing);
        assert!(matches!(h.data_box.try_recv(), Some(Message::Stop)));
        assert!(matches!(h.input_box.try_recv(), Some(Message::Stop)));

        let timer = h.inbox.recv().await.unwrap();
        assert!(matches!(timer, Message::ShutdownTimer));

        match h.coordinator.handle(timer) {
            ControlFlow::Break(Ok(report)) => {
                assert_eq!(report.phase, CoordinatorPhase::Terminated);
                assert_eq!(report.rows_written, 3);
                assert_eq!(report.increment, Some(5));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(shutdown.recv().await.is_ok());
    }

    #[tokio::test]
    async fn test_failed_answer_halts() {
        let mut h = harness();
        let _ = h.coordinator.handle(Message::GreetAck(h.data.clone()));
        let _ = h.coordinator.handle(Message::GreetAck(h.input.clone()));
        drain(&mut h.data_box);
        drain(&mut h.input_box);

        let outcome = h.coordinator.handle(Message::InputAnswer(Err(
            RendezvousError::InvalidInput { input: "x".into() },
        )));
        match outcome {
            ControlFlow::Break(Err(RendezvousError::WorkerFailed { role, .. })) => {
                assert_eq!(role, Role::InputWorker)
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(h.coordinator.phase(), CoordinatorPhase::Failed);
        assert!(h.coordinator.shutdown_signal().is_shutdown());
        assert!(matches!(h.data_box.try_recv(), Some(Message::Stop)));
        assert!(matches!(h.input_box.try_recv(), Some(Message::Stop)));
    }

    #[tokio::test]
    async fn test_out_of_phase_messages_ignored() {
        let (mut coordinator, _inbox) = Coordinator::new(
            CoordinatorConfig::default(),
            Arc::new(MemoryStore::default()),
            Arc::new(FixedPrompt::number(0)),
        );

        assert!(coordinator.handle(Message::ShutdownTimer).is_continue());
        assert!(coordinator.handle(Message::WriteAck(Ok(()))).is_continue());
        assert!(coordinator.handle(Message::InputAnswer(Ok(1))).is_continue());
        assert_eq!(coordinator.phase(), CoordinatorPhase::Idle);
        assert_eq!(coordinator.report().messages_received, 3);
        assert_eq!(coordinator.report().increment, None);
    }
}

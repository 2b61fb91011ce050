//! Worker state machine
//!
//! Shared by the data and input workers:
//! `Uninitialized --Greet--> Ready --Stop--> Terminated`.

use tracing::{debug, info, warn};

use crate::protocol::{Address, Message, Role};

/// Worker status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerPhase {
    /// Spawned, no coordinator known yet
    Uninitialized,
    /// Greeted, serving requests
    Ready,
    /// Stopped; accepts nothing further
    Terminated,
}

/// Local worker state: own address, reply address, phase
#[derive(Debug)]
pub struct WorkerState {
    me: Address,
    coordinator: Option<Address>,
    phase: WorkerPhase,
}

impl WorkerState {
    /// Create state for the worker owning `me`
    pub fn new(me: Address) -> Self {
        Self {
            me,
            coordinator: None,
            phase: WorkerPhase::Uninitialized,
        }
    }

    /// Own role
    pub fn role(&self) -> Role {
        self.me.role()
    }

    /// Current phase
    pub fn phase(&self) -> WorkerPhase {
        self.phase
    }

    /// Record the coordinator and acknowledge with our own address
    pub fn greet(&mut self, coordinator: Address) {
        if self.phase == WorkerPhase::Terminated {
            return;
        }
        if let Some(previous) = &self.coordinator {
            if *previous != coordinator {
                warn!(
                    "{} {} re-greeted by {}, replacing {}",
                    self.role(),
                    self.me.id(),
                    coordinator.id(),
                    previous.id()
                );
            }
        }

        debug!("{} {} greeted by {}", self.role(), self.me.id(), coordinator.id());
        coordinator.tell(Message::GreetAck(self.me.clone()));
        self.coordinator = Some(coordinator);
        self.phase = WorkerPhase::Ready;
    }

    /// Coordinator to answer, if greeted and not stopped
    pub fn reply_to(&self, request: &str) -> Option<&Address> {
        match (self.phase, &self.coordinator) {
            (WorkerPhase::Ready, Some(coordinator)) => Some(coordinator),
            _ => {
                warn!(
                    "{} {} ignoring {} in phase {:?}",
                    self.role(),
                    self.me.id(),
                    request,
                    self.phase
                );
                None
            }
        }
    }

    /// Enter the terminal phase and forget the coordinator
    pub fn terminate(&mut self) {
        if self.phase != WorkerPhase::Terminated {
            info!("{} {} stopped", self.role(), self.me.id());
        }
        self.phase = WorkerPhase::Terminated;
        self.coordinator = None;
    }
}

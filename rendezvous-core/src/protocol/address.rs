//! Mailbox addresses
//!
//! Every task owns exactly one `Mailbox`; anyone holding its `Address`
//! may send to it. Sending never blocks.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tracing::debug;

use super::message::Message;

static NEXT_ACTOR_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a mailbox owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(u64);

impl ActorId {
    fn next() -> Self {
        Self(NEXT_ACTOR_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Part a task plays in the workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Sequences the workflow
    Coordinator,
    /// Owns the row store
    DataWorker,
    /// Owns the number prompt
    InputWorker,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Coordinator => "coordinator",
            Role::DataWorker => "data worker",
            Role::InputWorker => "input worker",
        };
        f.write_str(name)
    }
}

/// Cloneable send handle for one mailbox
#[derive(Debug, Clone)]
pub struct Address {
    id: ActorId,
    role: Role,
    sender: mpsc::UnboundedSender<Message>,
}

impl Address {
    /// Create a fresh mailbox and the address that feeds it
    pub fn channel(role: Role) -> (Address, Mailbox) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = ActorId::next();
        (Address { id, role, sender }, Mailbox { id, receiver })
    }

    /// Identity of the mailbox owner
    pub fn id(&self) -> ActorId {
        self.id
    }

    /// Role of the mailbox owner
    pub fn role(&self) -> Role {
        self.role
    }

    /// Fire-and-forget send. Returns false if the mailbox is gone.
    pub fn tell(&self, message: Message) -> bool {
        let kind = message.kind();
        match self.sender.send(message) {
            Ok(()) => true,
            Err(_) => {
                debug!("Dropped {} for closed {} {}", kind, self.role, self.id);
                false
            }
        }
    }

    /// Whether the receiving task has dropped its mailbox
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Address {}

/// Single-consumer inbound queue
#[derive(Debug)]
pub struct Mailbox {
    id: ActorId,
    receiver: mpsc::UnboundedReceiver<Message>,
}

impl Mailbox {
    /// Identity of the owner
    pub fn id(&self) -> ActorId {
        self.id
    }

    /// Next message in send order; `None` once every address is dropped
    pub async fn recv(&mut self) -> Option<Message> {
        self.receiver.recv().await
    }

    /// Next message if one is already queued
    pub fn try_recv(&mut self) -> Option<Message> {
        self.receiver.try_recv().ok()
    }
}

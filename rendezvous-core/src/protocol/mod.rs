//! Message protocol shared by the coordinator and its workers
//!
//! Pure data: the closed message set plus the mailbox addresses that
//! carry it between tasks.

pub mod address;
pub mod message;

pub use address::{ActorId, Address, Mailbox, Role};
pub use message::Message;

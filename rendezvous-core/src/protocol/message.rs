//! Workflow messages
//!
//! Each variant carries only what its step needs. Answers carry a
//! `Result` so a collaborator failure reaches the coordinator instead of
//! leaving it waiting.

use std::fmt;

use super::address::Address;
use crate::data::Row;
use crate::error::Result;

/// Closed set of messages exchanged by the coordinator and workers
#[derive(Debug)]
pub enum Message {
    /// Kick off a coordinator run
    Start,
    /// Coordinator introduces itself; carries its reply address
    Greet(Address),
    /// Worker acknowledges a greet; carries its own address
    GreetAck(Address),
    /// Ask the data worker for the current rows
    ReadRequest,
    /// Rows loaded by the data worker
    ReadAnswer(Result<Vec<Row>>),
    /// Ask the input worker for the increment
    InputRequest,
    /// Increment obtained by the input worker
    InputAnswer(Result<i64>),
    /// Ask the data worker to persist rows
    WriteRequest(Vec<Row>),
    /// Persist outcome
    WriteAck(Result<()>),
    /// Worker must stop accepting messages
    Stop,
    /// Grace period elapsed, coordinator may terminate
    ShutdownTimer,
}

impl Message {
    /// Variant name, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Start => "Start",
            Message::Greet(_) => "Greet",
            Message::GreetAck(_) => "GreetAck",
            Message::ReadRequest => "ReadRequest",
            Message::ReadAnswer(_) => "ReadAnswer",
            Message::InputRequest => "InputRequest",
            Message::InputAnswer(_) => "InputAnswer",
            Message::WriteRequest(_) => "WriteRequest",
            Message::WriteAck(_) => "WriteAck",
            Message::Stop => "Stop",
            Message::ShutdownTimer => "ShutdownTimer",
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

//! Stdin and fixed-answer prompts

use std::io::{self, BufRead, Write};

use super::NumberPrompt;
use crate::error::{RendezvousError, Result};

/// Default question printed by `StdinPrompt`
pub const DEFAULT_QUESTION: &str = "Increment to add to every age: ";

/// Parse a prompt answer, ignoring surrounding whitespace
pub fn parse_increment(answer: &str) -> Result<i64> {
    answer
        .trim()
        .parse::<i64>()
        .map_err(|_| RendezvousError::InvalidInput {
            input: answer.trim().to_string(),
        })
}

/// Prompt asking on stdout and reading one line from stdin
#[derive(Debug, Clone)]
pub struct StdinPrompt {
    question: String,
}

impl StdinPrompt {
    /// Create a prompt with a custom question
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
        }
    }
}

impl Default for StdinPrompt {
    fn default() -> Self {
        Self::new(DEFAULT_QUESTION)
    }
}

impl NumberPrompt for StdinPrompt {
    fn prompt(&self) -> Result<i64> {
        let mut stdout = io::stdout().lock();
        write!(stdout, "{}", self.question)
            .and_then(|_| stdout.flush())
            .map_err(|e| RendezvousError::Internal {
                message: format!("Failed to write prompt: {}", e),
            })?;

        let mut answer = String::new();
        io::stdin()
            .lock()
            .read_line(&mut answer)
            .map_err(|e| RendezvousError::InvalidInput {
                input: format!("<unreadable stdin: {}>", e),
            })?;

        parse_increment(&answer)
    }
}

/// Prompt that always answers with a preconfigured string
#[derive(Debug, Clone)]
pub struct FixedPrompt {
    answer: String,
}

impl FixedPrompt {
    /// Answer with `answer`, parsed like a typed reply
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
        }
    }

    /// Answer with the given integer
    pub fn number(value: i64) -> Self {
        Self::new(value.to_string())
    }
}

impl NumberPrompt for FixedPrompt {
    fn prompt(&self) -> Result<i64> {
        parse_increment(&self.answer)
    }
}

//! Increment prompt collaborators
//!
//! Only the input worker calls into a `NumberPrompt`.

pub mod prompt;

pub use prompt::{parse_increment, FixedPrompt, StdinPrompt};

use crate::error::Result;

/// External source of one integer answer
///
/// Calls may block; the input worker runs them on the blocking pool.
pub trait NumberPrompt: Send + Sync {
    /// Obtain one integer, failing with `InvalidInput` on a non-numeric answer
    fn prompt(&self) -> Result<i64>;
}

//! Row source/sink collaborators
//!
//! Only the data worker calls into a `RowStore`.

pub mod csv_file;
pub mod memory;

pub use csv_file::CsvFileStore;
pub use memory::MemoryStore;

use crate::data::Row;
use crate::error::Result;

/// External row source and sink
///
/// Calls may block; the data worker runs them on the blocking pool.
pub trait RowStore: Send + Sync {
    /// Load the current rows in source order
    fn load(&self) -> Result<Vec<Row>>;

    /// Persist rows, replacing previous contents
    fn save(&self, rows: &[Row]) -> Result<()>;
}

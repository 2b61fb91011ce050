//! Merging the read rows with the requested increment

use crate::data::Row;

/// Add `increment` to every age. Order and names are preserved.
pub fn apply_increment(rows: &[Row], increment: i64) -> Vec<Row> {
    rows.iter().map(|row| row.with_age_offset(increment)).collect()
}

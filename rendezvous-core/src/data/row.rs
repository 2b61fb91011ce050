//! Person rows and their line-oriented text encoding
//!
//! One row per line, `first,last,age`, no header. Lines are joined with
//! `\n` and the text carries no trailing newline.

use std::fmt;

use crate::error::{RendezvousError, Result};

const FIELD_SEPARATOR: char = ',';
const LINE_SEPARATOR: &str = "\n";

/// A person record. Identity is its position in the list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Row {
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Age in years
    pub age: i64,
}

impl Row {
    /// Create a new row
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>, age: i64) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            age,
        }
    }

    /// Copy of this row with `delta` added to the age (saturating)
    pub fn with_age_offset(&self, delta: i64) -> Self {
        Self {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            age: self.age.saturating_add(delta),
        }
    }

    /// Parse a single `first,last,age` line. `line_no` is 1-based.
    pub fn parse_line(line: &str, line_no: usize) -> Result<Self> {
        let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
        let [first, last, age] = fields.as_slice() else {
            return Err(RendezvousError::MalformedRow {
                line: line_no,
                reason: format!("expected 3 fields, found {}", fields.len()),
            });
        };

        let parsed = age.parse::<i64>().map_err(|e| RendezvousError::MalformedRow {
            line: line_no,
            reason: format!("age {:?} is not an integer: {}", age, e),
        })?;
        // Leading zeros or `+` would not survive re-encoding
        if parsed.to_string() != *age {
            return Err(RendezvousError::MalformedRow {
                line: line_no,
                reason: format!("age {:?} is not in canonical form", age),
            });
        }

        Ok(Self::new(*first, *last, parsed))
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}",
            self.first_name,
            self.last_name,
            self.age,
            sep = FIELD_SEPARATOR
        )
    }
}

/// Decode rows from text. Empty text yields no rows.
///
/// Accepts `\r\n` line endings and a single trailing newline. Ages must be
/// written the way [`encode`] writes them.
pub fn decode(text: &str) -> Result<Vec<Row>> {
    let body = text
        .strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .unwrap_or(text);
    if body.is_empty() {
        return Ok(Vec::new());
    }

    body.split(LINE_SEPARATOR)
        .enumerate()
        .map(|(idx, line)| {
            let line = line.strip_suffix('\r').unwrap_or(line);
            Row::parse_line(line, idx + 1)
        })
        .collect()
}

/// Encode rows as newline-joined lines
pub fn encode(rows: &[Row]) -> String {
    rows.iter()
        .map(Row::to_string)
        .collect::<Vec<_>>()
        .join(LINE_SEPARATOR)
}

//! Row data and its text codec

pub mod row;

pub use row::{decode, encode, Row};

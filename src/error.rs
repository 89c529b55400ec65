use crate::prelude::*;

/// Error type for packing, parsing and scanning dates.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateError {
    /// Input is too short or has a non-digit where a digit belongs.
    #[error("Malformed date: {0}")]
    Malformed(String),

    /// Digits decode fine but do not name a real calendar date.
    #[error("Invalid date {year:04}-{month:02}-{day:02}")]
    InvalidDate { year: i32, month: u32, day: u32 },

    /// The persistence read path got a value it cannot read as a date.
    #[error("Cannot scan a date from a {found} value")]
    TypeMismatch { found: ValueKind },

    /// Separators must be a single ASCII byte that is not a digit.
    #[error("Invalid separator {0:?}: must be ASCII and not a digit")]
    InvalidSeparator(char),
}

/// Kind of an [`ExternalValue`](crate::ExternalValue), used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ValueKind {
    #[display(fmt = "null")]
    Null,
    #[display(fmt = "bytes")]
    Bytes,
    #[display(fmt = "text")]
    Text,
    #[display(fmt = "integer")]
    Integer,
    #[display(fmt = "float")]
    Float,
    #[display(fmt = "bool")]
    Bool,
    #[display(fmt = "timestamp")]
    Timestamp,
    #[display(fmt = "utc timestamp")]
    TimestampUtc,
}

use chrono::{DateTime, Datelike, NaiveDateTime, Utc};

use crate::{DateError, PackedDate, ValueKind};

/// Opaque value exchanged with a persistence layer.
///
/// Dates are written as canonical text bytes (or `Null`) and read back from
/// whatever the driver hands over; only null and timestamps are readable.
#[derive(Debug, Clone, PartialEq)]
pub enum ExternalValue {
    Null,
    Bytes(Vec<u8>),
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Timestamp(NaiveDateTime),
    TimestampUtc(DateTime<Utc>),
}

impl ExternalValue {
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Bytes(_) => ValueKind::Bytes,
            Self::Text(_) => ValueKind::Text,
            Self::Integer(_) => ValueKind::Integer,
            Self::Float(_) => ValueKind::Float,
            Self::Bool(_) => ValueKind::Bool,
            Self::Timestamp(_) => ValueKind::Timestamp,
            Self::TimestampUtc(_) => ValueKind::TimestampUtc,
        }
    }
}

impl PackedDate {
    /// Converts to a persistence value using the default separator
    pub fn to_value(self) -> ExternalValue {
        if self.is_null() {
            ExternalValue::Null
        } else {
            ExternalValue::Bytes(self.to_text().into_bytes())
        }
    }

    /// Reads a date from a persistence value, dropping any time of day.
    ///
    /// # Errors
    /// Returns `DateError::TypeMismatch` for anything but null or a
    /// timestamp, and `DateError::InvalidDate` for a timestamp whose year
    /// falls outside `0..=9999`.
    pub fn scan(value: &ExternalValue) -> Result<Self, DateError> {
        match value {
            ExternalValue::Null => Ok(Self::null()),
            ExternalValue::Timestamp(ts) => Self::try_from(ts.date()),
            ExternalValue::TimestampUtc(ts) => Self::try_from(ts.date_naive()),
            other => {
                tracing::debug!(kind = %other.kind(), "rejecting non-timestamp value");
                Err(DateError::TypeMismatch { found: other.kind() })
            }
        }
    }
}

/// Builds a date from any chrono value exposing calendar fields.
pub(crate) fn from_datelike<D: Datelike>(value: &D) -> Result<PackedDate, DateError> {
    PackedDate::try_from_fields(value.year(), value.month(), value.day())
}

use serde::{Deserialize, Serialize};

use crate::{DATE_SEPARATOR, DateError};

/// Separators used when rendering canonical text.
///
/// Derives serde with `#[serde(default)]`, so hosts can embed it in their own
/// config files and omit whatever they do not override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    /// Separator for plain text and JSON
    pub separator: char,
    /// Separator for text handed to a persistence layer
    pub storage_separator: char,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            separator: DATE_SEPARATOR,
            storage_separator: DATE_SEPARATOR,
        }
    }
}

impl FormatConfig {
    /// Creates a validated config.
    ///
    /// # Errors
    /// Returns `DateError::InvalidSeparator` if either separator is not a
    /// single ASCII non-digit byte.
    pub fn new(separator: char, storage_separator: char) -> Result<Self, DateError> {
        let config = Self {
            separator,
            storage_separator,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks both separators. Call after deserializing.
    ///
    /// # Errors
    /// Returns `DateError::InvalidSeparator` for the first bad separator.
    pub fn validate(&self) -> Result<(), DateError> {
        separator_byte(self.separator)?;
        separator_byte(self.storage_separator)?;
        Ok(())
    }

    pub(crate) fn separator_byte(&self) -> u8 {
        separator_byte(self.separator).unwrap_or(DATE_SEPARATOR as u8)
    }

    pub(crate) fn storage_separator_byte(&self) -> u8 {
        separator_byte(self.storage_separator).unwrap_or(DATE_SEPARATOR as u8)
    }
}

pub(crate) fn separator_byte(c: char) -> Result<u8, DateError> {
    if c.is_ascii() && !c.is_ascii_digit() {
        Ok(c as u8)
    } else {
        Err(DateError::InvalidSeparator(c))
    }
}

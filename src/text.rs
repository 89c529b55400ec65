use std::borrow::Cow;

use crate::consts::{CANONICAL_LEN, NULL_LITERAL, QUOTE};
use crate::{DateError, ExternalValue, FormatConfig, PackedDate, PreformattedCache, codec};

/// Text, JSON and storage codec with an optional preformatted cache.
///
/// The cache is borrowed, so whoever owns it decides its lifetime and when
/// it gets filled. It is only consulted when its separator matches the
/// codec's, which keeps the output identical with or without it.
#[derive(Debug, Clone, Copy)]
pub struct TextCodec<'c> {
    config:    FormatConfig,
    separator: u8,
    storage:   u8,
    cache:     Option<&'c PreformattedCache>,
}

impl Default for TextCodec<'_> {
    fn default() -> Self {
        Self::new(FormatConfig::default())
    }
}

impl<'c> TextCodec<'c> {
    /// Creates a codec without a cache.
    ///
    /// An invalid separator in `config` falls back to `-`; run
    /// [`FormatConfig::validate`] first to reject it instead.
    pub fn new(config: FormatConfig) -> Self {
        Self {
            config,
            separator: config.separator_byte(),
            storage: config.storage_separator_byte(),
            cache: None,
        }
    }

    /// Attaches a filled cache
    #[must_use]
    pub const fn with_cache(mut self, cache: &'c PreformattedCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub const fn config(&self) -> &FormatConfig {
        &self.config
    }

    fn cache(&self) -> Option<&'c PreformattedCache> {
        self.cache.filter(|c| c.separator() == self.separator)
    }

    /// Renders `date` as canonical text, or `""` for the null date.
    pub fn format(&self, date: PackedDate) -> Cow<'c, str> {
        if date.is_null() {
            return Cow::Borrowed("");
        }
        if let Some(text) = self.cache().and_then(|c| c.lookup_text(date)) {
            return Cow::Borrowed(text);
        }
        Cow::Owned(codec::render_string(date.to_bits(), self.separator))
    }

    /// Parses canonical text. A leading quote is skipped.
    ///
    /// # Errors
    /// Returns `DateError::Malformed` for short or non-numeric input and
    /// `DateError::InvalidDate` for digits that are not a real date.
    pub fn parse(&self, input: impl AsRef<[u8]>) -> Result<PackedDate, DateError> {
        let bytes = codec::strip_quote(input.as_ref());
        let cached = self.cache().and_then(|cache| {
            let head = bytes.get(..CANONICAL_LEN)?;
            cache.lookup_date(std::str::from_utf8(head).ok()?)
        });
        match cached {
            Some(date) => Ok(date),
            None => codec::parse(bytes).map(PackedDate::from_bits_unchecked),
        }
    }

    /// Encodes for JSON: `null` for the null date, otherwise the unquoted
    /// canonical text. Quoting is left to the surrounding writer.
    pub fn encode_json(&self, date: PackedDate) -> Cow<'c, [u8]> {
        if date.is_null() {
            return Cow::Borrowed(NULL_LITERAL);
        }
        match self.format(date) {
            Cow::Borrowed(s) => Cow::Borrowed(s.as_bytes()),
            Cow::Owned(s) => Cow::Owned(s.into_bytes()),
        }
    }

    /// Decodes a JSON token. Empty input, `null` and `""` give the null date.
    ///
    /// # Errors
    /// Same as [`TextCodec::parse`].
    pub fn decode_json(&self, input: &[u8]) -> Result<PackedDate, DateError> {
        match input {
            [] | [QUOTE, QUOTE] => Ok(PackedDate::null()),
            _ if input == NULL_LITERAL => Ok(PackedDate::null()),
            _ => self.parse(input),
        }
    }

    /// Converts to a persistence value rendered with the storage separator.
    pub fn storage_value(&self, date: PackedDate) -> ExternalValue {
        if date.is_null() {
            return ExternalValue::Null;
        }
        let cached = self
            .cache()
            .filter(|_| self.storage == self.separator)
            .and_then(|c| c.lookup_text(date));
        match cached {
            Some(text) => ExternalValue::Bytes(text.as_bytes().to_vec()),
            None => ExternalValue::Bytes(codec::render(date.to_bits(), self.storage).to_vec()),
        }
    }
}

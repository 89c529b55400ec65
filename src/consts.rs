/// Maximum valid year (inclusive)
pub const MAX_YEAR: u16 = 9999;

/// Packed value reserved for the null date
pub const NULL_BITS: u32 = 0;

/// Width of the canonical `YYYY-MM-DD` text in bytes
pub const CANONICAL_LEN: usize = 10;

/// Default separator between year, month and day.
///
/// `FormatConfig` and `PreformattedCache::with_separator` can swap it for
/// any ASCII non-digit byte.
pub const DATE_SEPARATOR: char = '-';

/// JSON literal written for the null date
pub const NULL_LITERAL: &[u8; 4] = b"null";

/// Quote stripped from the front of quoted textual encodings
pub(crate) const QUOTE: u8 = b'"';

/// Byte offsets of the two separators in the canonical text
pub(crate) const SEPARATOR_POSITIONS: [usize; 2] = [4, 7];

/// Byte offsets of the eight digits in the canonical text, most significant first
pub(crate) const DIGIT_POSITIONS: [usize; 8] = [0, 1, 2, 3, 5, 6, 8, 9];

/// Bits per packed decimal digit
pub(crate) const NIBBLE_BITS: u32 = 4;
/// Mask for a single packed decimal digit
pub(crate) const NIBBLE_MASK: u32 = 0xF;

/// Bit offset of the year field (four nibbles)
pub(crate) const YEAR_SHIFT: u32 = 16;
/// Bit offset of the month field (two nibbles)
pub(crate) const MONTH_SHIFT: u32 = 8;
/// Bit offset of the day field (two nibbles)
pub(crate) const DAY_SHIFT: u32 = 0;

/// Months per year, used to fold year deltas into month deltas
pub(crate) const MONTHS_PER_YEAR: i64 = 12;

//! Nibble packing and canonical text conversion.
//!
//! A packed date stores one decimal digit per nibble, laid out as
//! `0xYYYYMMDD`. Rendering maps each nibble straight to an ASCII digit and
//! parsing does the reverse, so neither direction divides by powers of ten.
//! Everything here is pure and allocation free.

use chrono::NaiveDate;

use crate::consts::{
    CANONICAL_LEN, DAY_SHIFT, DIGIT_POSITIONS, MAX_YEAR, MONTH_SHIFT, NIBBLE_BITS, NIBBLE_MASK,
    QUOTE, SEPARATOR_POSITIONS, YEAR_SHIFT,
};
use crate::DateError;

/// Packs a two digit field, e.g. `31` to `0x31`.
#[inline]
const fn bcd2(value: u8) -> u32 {
    (((value / 10) as u32) << NIBBLE_BITS) | (value % 10) as u32
}

/// Packs a four digit field, e.g. `2018` to `0x2018`.
#[inline]
const fn bcd4(value: u16) -> u32 {
    (((value / 1000) as u32) << (3 * NIBBLE_BITS))
        | (((value / 100 % 10) as u32) << (2 * NIBBLE_BITS))
        | (((value / 10 % 10) as u32) << NIBBLE_BITS)
        | (value % 10) as u32
}

#[inline]
const fn nibble(bits: u32, shift: u32) -> u32 {
    (bits >> shift) & NIBBLE_MASK
}

/// Packs year, month and day into `0xYYYYMMDD`.
///
/// Calendar legality is not checked here. Callers working from arithmetic
/// results hand in normalized fields; callers working from text go through
/// [`parse`], which validates first.
pub const fn pack(year: u16, month: u8, day: u8) -> u32 {
    debug_assert!(year <= MAX_YEAR && month <= 99 && day <= 99);
    (bcd4(year) << YEAR_SHIFT) | (bcd2(month) << MONTH_SHIFT) | (bcd2(day) << DAY_SHIFT)
}

pub const fn unpack_year(bits: u32) -> u16 {
    let y = bits >> YEAR_SHIFT;
    (nibble(y, 3 * NIBBLE_BITS) * 1000
        + nibble(y, 2 * NIBBLE_BITS) * 100
        + nibble(y, NIBBLE_BITS) * 10
        + nibble(y, 0)) as u16
}

pub const fn unpack_month(bits: u32) -> u8 {
    let m = bits >> MONTH_SHIFT;
    (nibble(m, NIBBLE_BITS) * 10 + nibble(m, 0)) as u8
}

pub const fn unpack_day(bits: u32) -> u8 {
    let d = bits >> DAY_SHIFT;
    (nibble(d, NIBBLE_BITS) * 10 + nibble(d, 0)) as u8
}

/// Renders packed bits as `YYYY<sep>MM<sep>DD` into a stack buffer.
pub fn render(bits: u32, separator: u8) -> [u8; CANONICAL_LEN] {
    let mut buf = [separator; CANONICAL_LEN];
    let top = u32::BITS - NIBBLE_BITS;
    for (i, &pos) in DIGIT_POSITIONS.iter().enumerate() {
        // Digits only ever occupy 0..=9, so this stays in ASCII.
        buf[pos] = b'0' + nibble(bits, top - i as u32 * NIBBLE_BITS) as u8;
    }
    buf
}

/// Renders packed bits as an owned string.
pub fn render_string(bits: u32, separator: u8) -> String {
    render(bits, separator).iter().copied().map(char::from).collect()
}

/// Strips a single leading quote, if present.
#[inline]
pub fn strip_quote(input: &[u8]) -> &[u8] {
    match input {
        [QUOTE, rest @ ..] => rest,
        _ => input,
    }
}

/// Extracts (year, month, day) from the first ten bytes of `input`.
///
/// Separator positions are skipped without inspection and anything past the
/// tenth byte is ignored, which lets a trailing quote through.
pub fn split_digits(input: &[u8]) -> Result<(u16, u8, u8), DateError> {
    if input.len() < CANONICAL_LEN {
        return Err(DateError::Malformed(format!(
            "expected at least {CANONICAL_LEN} bytes, got {:?}",
            String::from_utf8_lossy(input)
        )));
    }
    debug_assert_eq!(SEPARATOR_POSITIONS, [4, 7]);

    let mut digits = [0u16; DIGIT_POSITIONS.len()];
    for (digit, &pos) in digits.iter_mut().zip(DIGIT_POSITIONS.iter()) {
        let b = input[pos];
        if !b.is_ascii_digit() {
            return Err(DateError::Malformed(format!(
                "non-digit {:?} at position {pos} in {:?}",
                char::from(b),
                String::from_utf8_lossy(&input[..CANONICAL_LEN])
            )));
        }
        *digit = u16::from(b - b'0');
    }

    let year = digits[0] * 1000 + digits[1] * 100 + digits[2] * 10 + digits[3];
    let month = (digits[4] * 10 + digits[5]) as u8;
    let day = (digits[6] * 10 + digits[7]) as u8;
    Ok((year, month, day))
}

/// Checks that the fields name a real date inside the packable year range.
pub fn validate(year: i32, month: u32, day: u32) -> Result<NaiveDate, DateError> {
    NaiveDate::from_ymd_opt(year, month, day)
        .filter(|_| (0..=i32::from(MAX_YEAR)).contains(&year))
        .ok_or(DateError::InvalidDate { year, month, day })
}

/// Parses canonical text (optionally with a leading quote) into packed bits.
pub fn parse(input: &[u8]) -> Result<u32, DateError> {
    let (year, month, day) = split_digits(strip_quote(input))?;
    validate(i32::from(year), u32::from(month), u32::from(day))?;
    Ok(pack(year, month, day))
}

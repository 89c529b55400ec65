use std::collections::HashMap;

use crate::{DATE_SEPARATOR, PackedDate, codec};

/// Precomputed canonical text for every date in a bounded window.
///
/// Purely a throughput optimization: an empty cache misses on every lookup
/// and [`TextCodec`](crate::TextCodec) falls back to rendering, so results
/// never depend on whether a cache is present.
///
/// Filling the cache needs `&mut self` and reading it needs `&self`, so the
/// borrow checker enforces the single-writer/many-readers rule. Share it via
/// `Arc<PreformattedCache>` once it is filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreformattedCache {
    separator: u8,
    by_date:   HashMap<PackedDate, String>,
    by_text:   HashMap<String, PackedDate>,
}

impl Default for PreformattedCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PreformattedCache {
    /// Creates an empty cache rendering with the default separator
    pub fn new() -> Self {
        Self::with_separator(DATE_SEPARATOR as u8)
    }

    /// Creates an empty cache rendering with `separator`.
    ///
    /// The separator should be ASCII; see [`FormatConfig`](crate::FormatConfig).
    pub fn with_separator(separator: u8) -> Self {
        Self {
            separator,
            by_date: HashMap::new(),
            by_text: HashMap::new(),
        }
    }

    /// Builds a cache spanning `years` either side of `center`.
    pub fn around(center: PackedDate, years: i32) -> Self {
        let mut cache = Self::new();
        cache.initialize(center.add(-years, 0, 0), center.add(years, 0, 0));
        cache
    }

    /// Replaces the cache content with every date after `from` up to and
    /// including `to`.
    ///
    /// Time and memory grow with the number of days in the window, so keep
    /// it to a few years.
    pub fn initialize(&mut self, from: PackedDate, to: PackedDate) {
        self.clear();
        let (Some(start), Some(end)) = (from.to_naive_date(), to.to_naive_date()) else {
            tracing::warn!(%from, %to, "window bound is not a calendar date, cache left empty");
            return;
        };
        if start >= end {
            tracing::warn!(%from, %to, "empty preformatted date window, cache left empty");
            return;
        }

        let days = usize::try_from((end - start).num_days()).unwrap_or_default();
        self.by_date.reserve(days);
        self.by_text.reserve(days);

        let mut day = start;
        while day < end {
            let Some(next) = day.succ_opt() else { break };
            day = next;
            let Ok(date) = PackedDate::try_from(day) else { break };
            let text = codec::render_string(date.to_bits(), self.separator);
            self.by_text.insert(text.clone(), date);
            self.by_date.insert(date, text);
        }

        tracing::debug!(
            %from,
            %to,
            entries = self.by_date.len(),
            "initialized preformatted date cache"
        );
    }

    /// Drops every entry
    pub fn clear(&mut self) {
        self.by_date.clear();
        self.by_text.clear();
    }

    /// Returns the precomputed text for `date`, if cached
    #[inline]
    pub fn lookup_text(&self, date: PackedDate) -> Option<&str> {
        self.by_date.get(&date).map(String::as_str)
    }

    /// Returns the date for precomputed `text`, if cached
    #[inline]
    pub fn lookup_date(&self, text: &str) -> Option<PackedDate> {
        self.by_text.get(text).copied()
    }

    pub fn contains(&self, date: PackedDate) -> bool {
        self.by_date.contains_key(&date)
    }

    pub fn len(&self) -> usize {
        self.by_date.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }

    /// Separator the cached text was rendered with
    pub const fn separator(&self) -> u8 {
        self.separator
    }
}

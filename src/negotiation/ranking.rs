//! Preference ranking.
//!
//! Entries are ordered by decreasing preference. Each key only applies when
//! all previous keys tie:
//!
//! 1. quality factor, higher first
//! 2. concrete type before `*`
//! 3. concrete subtype before `*`
//! 4. more extensions first
//! 5. earlier position in the header first
//!
//! Position is part of the comparison, so no two entries from one header
//! compare equal and the order never depends on sort stability.

use std::cmp::Ordering;

use super::entry::PreferenceEntry;
use super::media_range::split_header;
use super::WILDCARD;

/// Compare two entries; `Less` means `a` is preferred over `b`.
pub fn compare(a: &PreferenceEntry, b: &PreferenceEntry) -> Ordering {
    b.quality
        .total_cmp(&a.quality)
        .then_with(|| specificity(&a.media_type).cmp(&specificity(&b.media_type)))
        .then_with(|| specificity(&a.subtype).cmp(&specificity(&b.subtype)))
        .then_with(|| b.extension_count().cmp(&a.extension_count()))
        .then_with(|| a.position.cmp(&b.position))
}

/// Concrete tokens sort before the wildcard
fn specificity(token: &str) -> u8 {
    u8::from(token == WILDCARD)
}

/// Sort entries into decreasing order of preference
pub fn rank(entries: &mut [PreferenceEntry]) {
    entries.sort_by(compare);
}

/// Parsed and ranked Accept-family header
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AcceptList {
    entries: Vec<PreferenceEntry>,
    /// Range tokens seen in the header, including dropped ones
    ranges: usize,
}

impl AcceptList {
    /// Parse a header value, dropping malformed ranges, and rank what is left.
    pub fn parse(header: &str) -> Self {
        let mut ranges = 0;
        let mut entries: Vec<_> = split_header(header)
            .inspect(|_| ranges += 1)
            .filter_map(|(position, token)| PreferenceEntry::parse(token, position))
            .collect();
        rank(&mut entries);
        Self { entries, ranges }
    }

    /// Rank an existing list of entries
    pub fn from_entries(mut entries: Vec<PreferenceEntry>) -> Self {
        rank(&mut entries);
        let ranges = entries.len();
        Self { entries, ranges }
    }

    /// Entries in decreasing order of preference
    pub fn entries(&self) -> &[PreferenceEntry] {
        &self.entries
    }

    /// Iterate entries in decreasing order of preference
    pub fn iter(&self) -> std::slice::Iter<'_, PreferenceEntry> {
        self.entries.iter()
    }

    /// Most preferred entry
    pub fn first(&self) -> Option<&PreferenceEntry> {
        self.entries.first()
    }

    /// Number of valid entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no valid entry survived parsing
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when the header was absent or blank. A header whose ranges were
    /// all malformed is present but empty.
    pub fn is_absent(&self) -> bool {
        self.ranges == 0
    }

    /// Number of range tokens dropped as malformed
    pub fn dropped(&self) -> usize {
        self.ranges - self.entries.len()
    }

    /// Consume into the ranked entries
    pub fn into_entries(self) -> Vec<PreferenceEntry> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a AcceptList {
    type Item = &'a PreferenceEntry;
    type IntoIter = std::slice::Iter<'a, PreferenceEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

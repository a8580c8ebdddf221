//! Time windows and the language × time tags attached to words and sound
//! changes.

use crate::phonology::LanguageId;

/// A half-open time window. `end == None` means unbounded (+∞), which is
/// what an instant milestone produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: i64,
    pub end: Option<i64>,
}

impl TimeRange {
    pub fn instant(start: i64) -> Self {
        TimeRange { start, end: None }
    }

    pub fn range(start: i64, end: i64) -> Self {
        TimeRange {
            start,
            end: Some(end),
        }
    }

    /// Inclusive containment, used for selecting words at snapshot time.
    pub fn contains(&self, time: i64) -> bool {
        self.start <= time && self.end.is_none_or(|end| time <= end)
    }

    /// Exclusive-at-both-ends overlap: `a.start < b.end && b.start < a.end`.
    /// An unbounded end never bounds.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        let a_before_b_ends = other.end.is_none_or(|end| self.start < end);
        let b_before_a_ends = self.end.is_none_or(|end| other.start < end);
        a_before_b_ends && b_before_a_ends
    }
}

/// The `(language, time window, index)` stamp materialized from the driver
/// context when a word or sound change is declared. `index` is module-wide
/// and strictly increasing; it breaks ties between rules with equal start
/// times, preserving declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    pub time: TimeRange,
    pub language: LanguageId,
    pub index: u32,
}

impl Tag {
    pub fn overlaps(&self, other: &Tag) -> bool {
        self.time.overlaps(&other.time)
    }

    /// The sort key for rule application order: lexicographic on
    /// `(start, index)`.
    pub fn order_key(&self) -> (i64, u32) {
        (self.time.start, self.index)
    }
}

#[cfg(test)]
#[path = "tests/t_tag.rs"]
mod tests;

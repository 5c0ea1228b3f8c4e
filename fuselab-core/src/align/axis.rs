//! The shared daily date axis.

use crate::error::AlignmentError;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// A contiguous daily date axis, inclusive on both ends.
///
/// Contains every calendar day between its bounds with no gaps and no
/// repeats, so positions double as day offsets and lookups are O(1).
/// Never empty: construction requires at least one observed date, so
/// the axis always spans at least its start day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateAxis {
    start: NaiveDate,
    end: NaiveDate,
}

#[allow(clippy::len_without_is_empty)]
impl DateAxis {
    /// Build the axis spanning the union of all observed dates.
    pub fn from_observed<I>(dates: I) -> Result<Self, AlignmentError>
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let mut bounds: Option<(NaiveDate, NaiveDate)> = None;
        for d in dates {
            bounds = Some(match bounds {
                None => (d, d),
                Some((lo, hi)) => (lo.min(d), hi.max(d)),
            });
        }
        let (start, end) = bounds.ok_or(AlignmentError::EmptyAxis)?;
        Ok(Self { start, end })
    }

    /// Intersect the axis with an optional analysis window.
    ///
    /// Open bounds leave the corresponding end untouched. An empty
    /// intersection is an [`AlignmentError::EmptyWindow`].
    pub fn restrict(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Self, AlignmentError> {
        let lo = start.map_or(self.start, |s| s.max(self.start));
        let hi = end.map_or(self.end, |e| e.min(self.end));
        if lo > hi {
            return Err(AlignmentError::EmptyWindow {
                start: start.unwrap_or(self.start),
                end: end.unwrap_or(self.end),
            });
        }
        Ok(Self { start: lo, end: hi })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days on the axis, always at least 1.
    pub fn len(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Position of a date on the axis, `None` outside the span.
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        if !self.contains(date) {
            return None;
        }
        Some((date - self.start).num_days() as usize)
    }

    pub fn date_at(&self, index: usize) -> Option<NaiveDate> {
        if index >= self.len() {
            return None;
        }
        Some(self.start + Duration::days(index as i64))
    }

    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        let start = self.start;
        (0..self.len()).map(move |i| start + Duration::days(i as i64))
    }

    pub fn to_vec(&self) -> Vec<NaiveDate> {
        self.iter().collect()
    }
}

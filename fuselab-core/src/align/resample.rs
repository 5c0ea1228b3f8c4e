//! Weekly-to-daily resampling.

use super::DateAxis;
use crate::domain::SentimentWeeklyRecord;

/// Forward-fill a weekly index onto the daily axis.
///
/// A value observed on `week_end_date = D` covers the daily dates in
/// `(D, next_D]`: it takes effect the day after its week ends and runs
/// through the next observed week end. Nothing is filled before the
/// first observed week end, and nothing reads a later week's value.
///
/// `weekly` must be sorted ascending by `week_end_date` (the normalizer
/// guarantees this).
pub fn forward_fill_weekly(
    axis: &DateAxis,
    weekly: &[SentimentWeeklyRecord],
) -> Vec<Option<f64>> {
    debug_assert!(weekly.windows(2).all(|w| w[0].week_end_date < w[1].week_end_date));

    let mut out = Vec::with_capacity(axis.len());
    // Index of the first weekly record not yet effective.
    let mut next = 0usize;
    let mut current: Option<f64> = None;

    for date in axis.iter() {
        // A week becomes effective strictly after its end date.
        while next < weekly.len() && weekly[next].week_end_date < date {
            current = Some(weekly[next].depression_index);
            next += 1;
        }
        out.push(current);
    }
    out
}

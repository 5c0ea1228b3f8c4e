//! Temporal alignment onto a shared daily axis.
//!
//! All sources get reconciled onto one gap-free date axis spanning the
//! union of their date ranges. Alignment is an outer join: a date where
//! a source has nothing yields nulls, never a dropped row.

pub mod axis;
pub mod merge;
pub mod resample;

pub use axis::DateAxis;
pub use merge::{align_ticker_records, merge_sources, MergeInput};
pub use resample::forward_fill_weekly;

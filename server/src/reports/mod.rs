//! Hour totals and demographic breakdowns computed from store records.

pub mod demographics;
pub mod hours;

pub use demographics::{age_on, bucket_users, AgeBracket, BracketCount, Demographics, GenderFilter};
pub use hours::{total_hours, HoursSummary};

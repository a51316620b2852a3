use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use uuid::Uuid;

use crate::models::TimeSheet;

const MILLIS_PER_HOUR: i64 = 3_600_000;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoursSummary {
    /// Worked hours, rounded to two decimals half away from zero.
    pub hours: f64,
    /// Closed sheets that contributed to `hours`.
    pub counted: usize,
    /// Sheets still clocked in today.
    pub open: usize,
    /// Sheets whose clock-out precedes their clock-in. Never summed.
    pub flagged: Vec<Uuid>,
}

/// Sum closed intervals. Sheets carrying today's open sentinel are skipped,
/// and sheets with a negative duration are flagged rather than allowed to
/// cancel out real hours.
pub fn total_hours<'a, I>(sheets: I, today: NaiveDate) -> HoursSummary
where
    I: IntoIterator<Item = &'a TimeSheet>,
{
    let mut millis: i64 = 0;
    let mut counted = 0;
    let mut open = 0;
    let mut flagged = Vec::new();

    for sheet in sheets {
        if sheet.is_open(today) {
            open += 1;
        } else if sheet.is_negative() {
            flagged.push(sheet.id);
        } else {
            millis += (sheet.clock_out_time - sheet.clock_in_time).num_milliseconds();
            counted += 1;
        }
    }

    if !flagged.is_empty() {
        tracing::warn!(count = flagged.len(), ids = ?flagged, "Skipping time sheets with negative duration");
    }

    HoursSummary {
        hours: round_hours(millis),
        counted,
        open,
        flagged,
    }
}

fn round_hours(millis: i64) -> f64 {
    (Decimal::from(millis) / Decimal::from(MILLIS_PER_HOUR))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

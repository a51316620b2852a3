use std::cmp::Ordering;

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::store::{Entity, Filter};

/// One punch-in/punch-out interval of a volunteer on a project.
///
/// A sheet that has not been punched out yet carries [`open_sentinel`] of
/// the punch-in day as its clock-out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TimeSheet {
    pub id: Uuid,
    pub user_id: Uuid,
    pub project_id: Uuid,
    pub organization_id: Uuid,
    pub clock_in_time: NaiveDateTime,
    pub clock_out_time: NaiveDateTime,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Clock-out placeholder for a sheet that is still open: midnight at the
/// start of the day after `today`.
pub fn open_sentinel(today: NaiveDate) -> NaiveDateTime {
    today
        .checked_add_days(Days::new(1))
        .unwrap_or(NaiveDate::MAX)
        .and_time(NaiveTime::MIN)
}

impl TimeSheet {
    pub fn is_open(&self, today: NaiveDate) -> bool {
        self.clock_out_time == open_sentinel(today)
    }

    pub fn is_negative(&self) -> bool {
        self.clock_out_time < self.clock_in_time
    }

    /// An open sheet left over from an earlier day: its clock-out is the
    /// sentinel of its own punch-in day, but that day is not today.
    pub fn is_stale_open(&self, today: NaiveDate) -> bool {
        let punch_day = self.clock_in_time.date();
        punch_day < today
            && self.clock_out_time.time().num_seconds_from_midnight() == 0
            && self.clock_out_time == open_sentinel(punch_day)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTimeSheet {
    pub user_id: Uuid,
    pub project_id: Uuid,
    pub organization_id: Uuid,
    pub clock_in_time: NaiveDateTime,
    pub clock_out_time: NaiveDateTime,
}

/// Editor correction of the two punch times.
#[derive(Debug, Clone, Deserialize)]
pub struct TimeCorrection {
    pub clock_in_time: NaiveDateTime,
    pub clock_out_time: NaiveDateTime,
}

#[derive(Debug, Clone, Default)]
pub struct TimeSheetFilter {
    pub user_id: Option<Uuid>,
    pub user_ids: Option<Vec<Uuid>>,
    pub project_id: Option<Uuid>,
    pub organization_id: Option<Uuid>,
    /// Inclusive lower bound on clock-in.
    pub clock_in_from: Option<NaiveDateTime>,
    /// Exclusive upper bound on clock-in.
    pub clock_in_before: Option<NaiveDateTime>,
    pub clock_out_time: Option<NaiveDateTime>,
}

impl TimeSheetFilter {
    pub fn for_user(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    pub fn for_project(project_id: Uuid) -> Self {
        Self {
            project_id: Some(project_id),
            ..Self::default()
        }
    }

    pub fn for_organization(organization_id: Uuid) -> Self {
        Self {
            organization_id: Some(organization_id),
            ..Self::default()
        }
    }
}

impl Filter<TimeSheet> for TimeSheetFilter {
    fn matches(&self, sheet: &TimeSheet) -> bool {
        self.user_id.map_or(true, |id| sheet.user_id == id)
            && self
                .user_ids
                .as_ref()
                .map_or(true, |ids| ids.contains(&sheet.user_id))
            && self.project_id.map_or(true, |id| sheet.project_id == id)
            && self
                .organization_id
                .map_or(true, |id| sheet.organization_id == id)
            && self
                .clock_in_from
                .map_or(true, |from| sheet.clock_in_time >= from)
            && self
                .clock_in_before
                .map_or(true, |before| sheet.clock_in_time < before)
            && self
                .clock_out_time
                .map_or(true, |out| sheet.clock_out_time == out)
    }
}

impl Entity for TimeSheet {
    type Filter = TimeSheetFilter;
    const NAME: &'static str = "time sheet";

    fn id(&self) -> Uuid {
        self.id
    }

    fn listing_order(&self, other: &Self) -> Ordering {
        other
            .clock_in_time
            .cmp(&self.clock_in_time)
            .then_with(|| self.id.cmp(&other.id))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub fn at(date: (i32, u32, u32), hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(date.0, date.1, date.2)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    pub fn sheet(clock_in: NaiveDateTime, clock_out: NaiveDateTime) -> TimeSheet {
        let now = Utc::now();
        TimeSheet {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            clock_in_time: clock_in,
            clock_out_time: clock_out,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_sentinel_is_next_midnight() {
        let today = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        assert_eq!(open_sentinel(today), at((2026, 1, 1), 0, 0));
    }

    #[test]
    fn test_open_and_stale_open() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();

        let open_today = sheet(at((2025, 6, 10), 8, 0), open_sentinel(today));
        assert!(open_today.is_open(today));
        assert!(!open_today.is_stale_open(today));

        let forgotten = sheet(at((2025, 6, 9), 8, 0), at((2025, 6, 10), 0, 0));
        assert!(!forgotten.is_open(today));
        assert!(forgotten.is_stale_open(today));

        let closed = sheet(at((2025, 6, 9), 8, 0), at((2025, 6, 9), 12, 0));
        assert!(!closed.is_stale_open(today));
    }

    #[test]
    fn test_filter_range_is_half_open() {
        let s = sheet(at((2025, 6, 10), 8, 0), at((2025, 6, 10), 9, 0));
        let filter = TimeSheetFilter {
            clock_in_from: Some(at((2025, 6, 10), 8, 0)),
            clock_in_before: Some(at((2025, 6, 10), 8, 0)),
            ..TimeSheetFilter::default()
        };
        assert!(!filter.matches(&s));

        let filter = TimeSheetFilter {
            clock_in_before: Some(at((2025, 6, 10), 8, 1)),
            ..filter
        };
        assert!(filter.matches(&s));
    }
}

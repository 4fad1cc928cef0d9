use crate::models::{AttendanceRecord, DayCell, EmployeeId, NormalizedCategory, YearMonth};
use crate::status::classify;
use chrono::{Datelike, NaiveDate, Weekday};
use std::str::FromStr;

/// How to pick between several records for the same employee and day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// First record in list order.
    #[default]
    FirstMatch,
    /// Latest check-in timestamp; equal timestamps keep list order.
    MostRecent,
}

impl FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "first" | "first-match" => Ok(Self::FirstMatch),
            "latest" | "most-recent" => Ok(Self::MostRecent),
            other => Err(format!("unknown duplicate policy '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarPolicy {
    pub weekly_off: Weekday,
    pub duplicates: DuplicatePolicy,
}

impl Default for CalendarPolicy {
    fn default() -> Self {
        Self {
            weekly_off: Weekday::Sun,
            duplicates: DuplicatePolicy::FirstMatch,
        }
    }
}

impl CalendarPolicy {
    pub fn is_weekly_off(&self, date: NaiveDate) -> bool {
        date.weekday() == self.weekly_off
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DayCellInput<'a> {
    pub employee_id: &'a EmployeeId,
    pub date: NaiveDate,
}

/// Resolves the display category of one day for one employee.
///
/// The weekly-off day is credited as a full day before any record is looked
/// at, so backend data cannot override it.
pub fn resolve(
    day: &DayCellInput<'_>,
    records: &[AttendanceRecord],
    policy: &CalendarPolicy,
) -> NormalizedCategory {
    if policy.is_weekly_off(day.date) {
        return NormalizedCategory::FullDay;
    }

    match find_record(day, records, policy.duplicates) {
        Some(record) => classify(&record.raw_status),
        None => NormalizedCategory::Absent,
    }
}

pub fn find_record<'r>(
    day: &DayCellInput<'_>,
    records: &'r [AttendanceRecord],
    duplicates: DuplicatePolicy,
) -> Option<&'r AttendanceRecord> {
    let mut matches = records
        .iter()
        .filter(|record| &record.employee_id == day.employee_id)
        .filter(|record| record.checkin_date == Some(day.date));

    match duplicates {
        DuplicatePolicy::FirstMatch => matches.next(),
        DuplicatePolicy::MostRecent => matches.fold(None, |best, record| match best {
            Some(current) if current.checkin_at >= record.checkin_at => Some(current),
            _ => Some(record),
        }),
    }
}

/// Resolves every day of `month`. Both the summary and the calendar grid are
/// built from this one list.
pub fn resolve_month(
    employee_id: &EmployeeId,
    month: YearMonth,
    records: &[AttendanceRecord],
    policy: &CalendarPolicy,
) -> Vec<DayCell> {
    month
        .days()
        .map(|date| {
            let input = DayCellInput { employee_id, date };
            DayCell::new(
                date,
                policy.is_weekly_off(date),
                resolve(&input, records, policy),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(employee: &EmployeeId, y: i32, m: u32, d: u32) -> DayCellInput<'_> {
        DayCellInput {
            employee_id: employee,
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
        }
    }

    #[test]
    fn weekly_off_overrides_any_record() {
        let employee = EmployeeId::from("1");
        // 2024-03-03 is a Sunday.
        let records = vec![
            AttendanceRecord::new("1", "2024-03-03", "Absent"),
            AttendanceRecord::new("1", "2024-03-03", "Half Day"),
        ];
        let category = resolve(&day(&employee, 2024, 3, 3), &records, &CalendarPolicy::default());
        assert_eq!(category, NormalizedCategory::FullDay);
    }

    #[test]
    fn weekly_off_follows_policy_weekday() {
        let employee = EmployeeId::from("1");
        let policy = CalendarPolicy {
            weekly_off: Weekday::Fri,
            ..CalendarPolicy::default()
        };
        // Friday 2024-03-01 credited, Sunday 2024-03-03 is an ordinary day.
        assert_eq!(
            resolve(&day(&employee, 2024, 3, 1), &[], &policy),
            NormalizedCategory::FullDay
        );
        assert_eq!(
            resolve(&day(&employee, 2024, 3, 3), &[], &policy),
            NormalizedCategory::Absent
        );
    }

    #[test]
    fn matches_timestamp_suffixed_checkins() {
        let employee = EmployeeId::from("1");
        let records = vec![AttendanceRecord::new("1", "2024-06-10T08:00:00Z", "Present")];
        let category = resolve(&day(&employee, 2024, 6, 10), &records, &CalendarPolicy::default());
        assert_eq!(category, NormalizedCategory::FullDay);
    }

    #[test]
    fn ignores_other_employees_and_malformed_dates() {
        let employee = EmployeeId::from("1");
        let records = vec![
            AttendanceRecord::new("2", "2024-06-10", "Present"),
            AttendanceRecord::new("1", "June 10th", "Present"),
        ];
        let category = resolve(&day(&employee, 2024, 6, 10), &records, &CalendarPolicy::default());
        assert_eq!(category, NormalizedCategory::Absent);
    }

    #[test]
    fn duplicates_take_first_in_list_order_by_default() {
        let employee = EmployeeId::from("1");
        let records = vec![
            AttendanceRecord::new("1", "2024-06-10T17:00:00Z", "Half Day"),
            AttendanceRecord::new("1", "2024-06-10T18:00:00Z", "Present"),
        ];
        let category = resolve(&day(&employee, 2024, 6, 10), &records, &CalendarPolicy::default());
        assert_eq!(category, NormalizedCategory::HalfDay);
    }

    #[test]
    fn duplicates_can_prefer_the_latest_checkin() {
        let employee = EmployeeId::from("1");
        let policy = CalendarPolicy {
            duplicates: DuplicatePolicy::MostRecent,
            ..CalendarPolicy::default()
        };
        let records = vec![
            AttendanceRecord::new("1", "2024-06-10T09:00:00Z", "Paid Leave"),
            AttendanceRecord::new("1", "2024-06-10T18:00:00Z", "Half Day"),
            AttendanceRecord::new("1", "2024-06-10T07:00:00Z", "Present"),
        ];
        assert_eq!(
            resolve(&day(&employee, 2024, 6, 10), &records, &policy),
            NormalizedCategory::HalfDay
        );

        let tied = vec![
            AttendanceRecord::new("1", "2024-06-10", "Activity"),
            AttendanceRecord::new("1", "2024-06-10", "Present"),
        ];
        assert_eq!(
            resolve(&day(&employee, 2024, 6, 10), &tied, &policy),
            NormalizedCategory::Activity
        );
    }

    #[test]
    fn duplicate_policy_parses_config_values() {
        assert_eq!("first".parse::<DuplicatePolicy>(), Ok(DuplicatePolicy::FirstMatch));
        assert_eq!("Latest".parse::<DuplicatePolicy>(), Ok(DuplicatePolicy::MostRecent));
        assert!("newest".parse::<DuplicatePolicy>().is_err());
    }

    #[test]
    fn resolve_month_emits_one_cell_per_day() {
        let employee = EmployeeId::from("1");
        let month = YearMonth::new(2024, 2).unwrap();
        let cells = resolve_month(&employee, month, &[], &CalendarPolicy::default());
        assert_eq!(cells.len(), 29);
        assert_eq!(cells[0].day_of_month, 1);
        assert_eq!(cells[28].key(), "2024-02-29");
        // 2024-02-04 is a Sunday.
        assert!(cells[3].is_weekly_off);
        assert_eq!(cells[3].label, "Weekly Off");
        assert_eq!(cells[4].category, NormalizedCategory::Absent);
    }
}

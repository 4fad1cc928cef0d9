use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use tracing::warn;

/// Opaque employee identifier. Upstream sends either numbers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EmployeeId(String);

impl EmployeeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EmployeeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for EmployeeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Number(i64),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Text(text) => Self(text.trim().to_string()),
            Repr::Number(number) => Self(number.to_string()),
        })
    }
}

/// Closed set of display statuses every raw status collapses into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NormalizedCategory {
    FullDay,
    HalfDay,
    Absent,
    Paid,
    Activity,
}

impl NormalizedCategory {
    pub const ALL: [Self; 5] = [
        Self::FullDay,
        Self::HalfDay,
        Self::Absent,
        Self::Paid,
        Self::Activity,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::FullDay => "full-day",
            Self::HalfDay => "half-day",
            Self::Absent => "absent",
            Self::Paid => "paid",
            Self::Activity => "activity",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::FullDay => "Full Day",
            Self::HalfDay => "Half Day",
            Self::Absent => "Absent",
            Self::Paid => "Paid Leave",
            Self::Activity => "Activity",
        }
    }
}

/// Attendance entry exactly as the upstream service emits it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAttendanceRecord {
    pub employee_id: EmployeeId,
    #[serde(default)]
    pub checkin_date: Option<String>,
    #[serde(default)]
    pub checkout_date: Option<String>,
    #[serde(default, alias = "status")]
    pub raw_status: Option<String>,
}

/// Validated attendance entry. Dates are already truncated to day granularity;
/// a check-in that failed to parse is kept as `None` and never matches a day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceRecord {
    pub employee_id: EmployeeId,
    pub checkin_date: Option<NaiveDate>,
    #[serde(skip)]
    pub checkin_at: Option<NaiveDateTime>,
    pub checkout_date: Option<NaiveDate>,
    pub raw_status: String,
}

impl AttendanceRecord {
    pub fn new(employee_id: impl Into<EmployeeId>, checkin: &str, raw_status: &str) -> Self {
        Self {
            employee_id: employee_id.into(),
            checkin_date: parse_day(checkin),
            checkin_at: parse_timestamp(checkin),
            checkout_date: None,
            raw_status: raw_status.to_string(),
        }
    }

    pub fn from_raw(raw: RawAttendanceRecord) -> Self {
        let checkin = raw.checkin_date.unwrap_or_default();
        Self {
            employee_id: raw.employee_id,
            checkin_date: parse_day(&checkin),
            checkin_at: parse_timestamp(&checkin),
            checkout_date: raw.checkout_date.as_deref().and_then(parse_day),
            raw_status: raw.raw_status.unwrap_or_default(),
        }
    }

    /// Validates loosely-typed JSON entries, dropping the ones that do not
    /// look like attendance records at all.
    pub fn parse_list(values: Vec<serde_json::Value>) -> Vec<Self> {
        let total = values.len();
        let records: Vec<Self> = values
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<RawAttendanceRecord>(value) {
                Ok(raw) => Some(Self::from_raw(raw)),
                Err(err) => {
                    warn!("skipping malformed attendance entry: {err}");
                    None
                }
            })
            .collect();

        if records.len() < total {
            warn!("kept {} of {total} attendance entries", records.len());
        }
        records
    }
}

/// Parses the calendar day of a date or timestamp, discarding any time-of-day suffix.
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let day = trimmed
        .split(|c: char| c == 'T' || c == ' ')
        .next()
        .unwrap_or(trimmed);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.naive_utc());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .or_else(|| parse_day(trimmed).and_then(|date| date.and_hms_opt(0, 0, 0)))
}

/// A calendar month. Only constructible for months chrono can represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    first: NaiveDate,
}

impl YearMonth {
    /// `month` is 1-based.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first| Self { first })
    }

    /// Builds a month from the 0-based month index the dashboard filter stores.
    pub fn from_filter(year: i32, month0: u32) -> Option<Self> {
        Self::new(year, month0.checked_add(1)?)
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            first: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    /// 0-based month, as the dashboard filter stores it.
    pub fn month0(&self) -> u32 {
        self.first.month0()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.first
            .checked_add_days(Days::new(u64::from(self.day_count()) - 1))
            .unwrap_or(self.first)
    }

    pub fn day_count(&self) -> u32 {
        match self.month() {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
            4 | 6 | 9 | 11 => 30,
            _ if NaiveDate::from_ymd_opt(self.year(), 2, 29).is_some() => 29,
            _ => 28,
        }
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        self.first.iter_days().take(self.day_count() as usize)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::of(date) == *self
    }

    pub fn first_weekday(&self) -> Weekday {
        self.first.weekday()
    }

    pub fn title(&self) -> String {
        self.first.format("%B %Y").to_string()
    }
}

/// One calendar date of the displayed month, already resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayCell {
    pub day_of_month: u32,
    pub date: NaiveDate,
    pub is_weekly_off: bool,
    pub category: NormalizedCategory,
    pub label: &'static str,
}

impl DayCell {
    pub fn new(date: NaiveDate, is_weekly_off: bool, category: NormalizedCategory) -> Self {
        Self {
            day_of_month: date.day(),
            date,
            is_weekly_off,
            category,
            label: if is_weekly_off {
                "Weekly Off"
            } else {
                category.label()
            },
        }
    }

    /// ISO `yyyy-MM-dd` key reported on day clicks.
    pub fn key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthSummary {
    pub full_days: u32,
    pub half_days: u32,
    pub absent_days: u32,
}

impl MonthSummary {
    pub fn total(&self) -> u32 {
        self.full_days + self.half_days + self.absent_days
    }
}

/// Informational counts that sit beside the headline summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub paid_days: u32,
    pub activity_days: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    #[serde(default)]
    pub position: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
    #[serde(default)]
    pub customer: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub purpose: String,
}

/// Dashboard filter persisted between page loads. `selected_month` is 0-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    pub selected_year: i32,
    pub selected_month: u32,
    #[serde(default)]
    pub name_filter: String,
}

impl FilterState {
    pub fn for_date(today: NaiveDate) -> Self {
        Self {
            selected_year: today.year(),
            selected_month: today.month0(),
            name_filter: String::new(),
        }
    }

    pub fn month(&self) -> Option<YearMonth> {
        if self.selected_month > 11 {
            return None;
        }
        YearMonth::from_filter(self.selected_year, self.selected_month)
    }
}

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NameQuery {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VisitQuery {
    pub date: String,
    pub employee: String,
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub employee: String,
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Serialize)]
pub struct EmployeesResponse {
    pub employees: Vec<Employee>,
    pub notice: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VisitsResponse {
    pub date: String,
    pub employee: String,
    pub visits: Vec<Visit>,
    pub notice: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub employee_id: EmployeeId,
    pub year: i32,
    pub month: u32,
    pub days_in_month: u32,
    pub summary: MonthSummary,
    pub breakdown: CategoryBreakdown,
    pub notice: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_day_truncates_time_of_day() {
        let expected = NaiveDate::from_ymd_opt(2024, 6, 10);
        assert_eq!(parse_day("2024-06-10T08:00:00Z"), expected);
        assert_eq!(parse_day("2024-06-10 17:45:00"), expected);
        assert_eq!(parse_day(" 2024-06-10 "), expected);
        assert_eq!(parse_day("10/06/2024"), None);
        assert_eq!(parse_day(""), None);
    }

    #[test]
    fn raw_record_accepts_numeric_ids_and_status_alias() {
        let value = serde_json::json!({
            "employeeId": 7,
            "checkinDate": "2024-03-05T09:12:00Z",
            "checkoutDate": "2024-03-05T18:00:00Z",
            "status": "Present"
        });
        let records = AttendanceRecord::parse_list(vec![value]);
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.employee_id, EmployeeId::from("7"));
        assert_eq!(record.checkin_date, NaiveDate::from_ymd_opt(2024, 3, 5));
        assert_eq!(record.checkout_date, NaiveDate::from_ymd_opt(2024, 3, 5));
        assert_eq!(record.raw_status, "Present");
        assert!(record.checkin_at.is_some());
    }

    #[test]
    fn parse_list_drops_entries_without_an_employee() {
        let values = vec![
            serde_json::json!({ "checkinDate": "2024-03-05", "rawStatus": "Present" }),
            serde_json::json!("not a record"),
            serde_json::json!({
                "employeeId": "e-1",
                "checkinDate": "garbage",
                "rawStatus": "Present"
            }),
        ];
        let records = AttendanceRecord::parse_list(values);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].checkin_date, None);
    }

    #[test]
    fn year_month_lengths_follow_the_calendar() {
        let len = |year, month| YearMonth::new(year, month).unwrap().day_count();
        assert_eq!(len(2024, 2), 29);
        assert_eq!(len(2023, 2), 28);
        assert_eq!(len(1900, 2), 28);
        assert_eq!(len(2000, 2), 29);
        assert_eq!(len(2024, 4), 30);
        assert_eq!(len(2024, 12), 31);
        assert!(YearMonth::new(2024, 13).is_none());
        assert!(YearMonth::new(2024, 0).is_none());
    }

    #[test]
    fn year_month_days_cover_the_whole_month() {
        let month = YearMonth::new(2024, 2).unwrap();
        let days: Vec<_> = month.days().collect();
        assert_eq!(days.len(), 29);
        assert_eq!(days.first().copied(), Some(month.first_day()));
        assert_eq!(days.last().copied(), Some(month.last_day()));
        assert!(month.contains(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));
        assert!(!month.contains(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
    }

    #[test]
    fn filter_state_uses_zero_based_months() {
        let filter: FilterState = serde_json::from_value(serde_json::json!({
            "selectedYear": 2024,
            "selectedMonth": 0,
            "nameFilter": "ann"
        }))
        .unwrap();
        assert_eq!(filter.month(), YearMonth::new(2024, 1));

        let invalid = FilterState {
            selected_month: 12,
            ..filter
        };
        assert_eq!(invalid.month(), None);
    }
}

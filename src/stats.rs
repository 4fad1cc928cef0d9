use crate::models::{
    AttendanceRecord, CategoryBreakdown, DayCell, EmployeeId, MonthSummary, NormalizedCategory,
    YearMonth,
};
use crate::resolver::{CalendarPolicy, resolve_month};

pub fn summarize(
    employee_id: &EmployeeId,
    month: YearMonth,
    records: &[AttendanceRecord],
    policy: &CalendarPolicy,
) -> MonthSummary {
    summarize_cells(&resolve_month(employee_id, month, records, policy))
}

/// Folds resolved days into the headline tallies. Every day lands in exactly
/// one bucket; paid and activity days get no full/half credit.
pub fn summarize_cells(cells: &[DayCell]) -> MonthSummary {
    cells
        .iter()
        .fold(MonthSummary::default(), |mut summary, cell| {
            match cell.category {
                _ if cell.is_weekly_off => summary.full_days += 1,
                NormalizedCategory::FullDay => summary.full_days += 1,
                NormalizedCategory::HalfDay => summary.half_days += 1,
                NormalizedCategory::Absent
                | NormalizedCategory::Paid
                | NormalizedCategory::Activity => summary.absent_days += 1,
            }
            summary
        })
}

/// Paid-leave and activity days as they appear on the resolved calendar, so a
/// weekly-off day or a day won by another record is never counted.
pub fn breakdown(
    employee_id: &EmployeeId,
    month: YearMonth,
    records: &[AttendanceRecord],
    policy: &CalendarPolicy,
) -> CategoryBreakdown {
    breakdown_cells(&resolve_month(employee_id, month, records, policy))
}

pub fn breakdown_cells(cells: &[DayCell]) -> CategoryBreakdown {
    cells
        .iter()
        .fold(CategoryBreakdown::default(), |mut breakdown, cell| {
            match cell.category {
                _ if cell.is_weekly_off => {}
                NormalizedCategory::Paid => breakdown.paid_days += 1,
                NormalizedCategory::Activity => breakdown.activity_days += 1,
                _ => {}
            }
            breakdown
        })
}

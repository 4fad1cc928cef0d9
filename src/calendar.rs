use crate::models::{AttendanceRecord, DayCell, EmployeeId, MonthSummary, YearMonth};
use crate::resolver::{CalendarPolicy, resolve_month};
use crate::stats::summarize_cells;
use serde::Serialize;

pub const WEEKDAY_HEADERS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Seven-column month grid. Weeks start on Sunday.
#[derive(Debug, Clone, Serialize)]
pub struct CalendarGrid {
    pub leading_blanks: usize,
    pub cells: Vec<DayCell>,
}

/// Payload reported when a day cell is clicked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayClick {
    pub date: String,
    pub employee_name: String,
}

impl CalendarGrid {
    pub fn build(month: YearMonth, cells: Vec<DayCell>) -> Self {
        Self {
            leading_blanks: month.first_weekday().num_days_from_sunday() as usize,
            cells,
        }
    }

    /// Rows of the grid, padded with `None` before the 1st and after the last day.
    pub fn weeks(&self) -> Vec<[Option<&DayCell>; 7]> {
        let mut slots: Vec<Option<&DayCell>> = std::iter::repeat_n(None, self.leading_blanks)
            .chain(self.cells.iter().map(Some))
            .collect();
        while slots.len() % 7 != 0 {
            slots.push(None);
        }

        slots
            .chunks(7)
            .map(|chunk| {
                let mut row = [None; 7];
                row.copy_from_slice(chunk);
                row
            })
            .collect()
    }

    pub fn click(&self, cell: &DayCell, employee_name: &str) -> DayClick {
        DayClick {
            date: cell.key(),
            employee_name: employee_name.to_string(),
        }
    }
}

/// Resolves the month once, reports the summary of that resolution through
/// `on_summary` and returns the grid built from the same cells.
pub fn render_calendar(
    employee_id: &EmployeeId,
    month: YearMonth,
    records: &[AttendanceRecord],
    policy: &CalendarPolicy,
    mut on_summary: impl FnMut(MonthSummary),
) -> CalendarGrid {
    let cells = resolve_month(employee_id, month, records, policy);
    on_summary(summarize_cells(&cells));
    CalendarGrid::build(month, cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NormalizedCategory;

    #[test]
    fn grid_pads_to_the_first_weekday() {
        let employee = EmployeeId::from("1");
        // 2024-03-01 is a Friday.
        let month = YearMonth::new(2024, 3).unwrap();
        let grid = render_calendar(&employee, month, &[], &CalendarPolicy::default(), |_| {});
        assert_eq!(grid.leading_blanks, 5);

        let weeks = grid.weeks();
        assert_eq!(weeks.len(), 6);
        assert!(weeks[0][..5].iter().all(Option::is_none));
        assert_eq!(weeks[0][5].map(|cell| cell.day_of_month), Some(1));
        // Mar 31 is a Sunday, alone on the last row.
        assert_eq!(weeks[5][0].map(|cell| cell.day_of_month), Some(31));
        assert!(weeks[5][1..].iter().all(Option::is_none));
    }

    #[test]
    fn sunday_months_have_no_leading_blanks() {
        let employee = EmployeeId::from("1");
        // 2024-09-01 is a Sunday.
        let month = YearMonth::new(2024, 9).unwrap();
        let grid = render_calendar(&employee, month, &[], &CalendarPolicy::default(), |_| {});
        assert_eq!(grid.leading_blanks, 0);
        assert_eq!(grid.weeks()[0][0].map(|cell| cell.label), Some("Weekly Off"));
    }

    #[test]
    fn summary_callback_fires_once_and_agrees_with_the_grid() {
        let employee = EmployeeId::from("1");
        let month = YearMonth::new(2024, 3).unwrap();
        let records = vec![AttendanceRecord::new("1", "2024-03-05", "Half Day")];

        let mut reported = Vec::new();
        let policy = CalendarPolicy::default();
        let grid = render_calendar(&employee, month, &records, &policy, |summary| {
            reported.push(summary)
        });

        assert_eq!(reported.len(), 1);
        let half_cells = grid
            .cells
            .iter()
            .filter(|cell| cell.category == NormalizedCategory::HalfDay)
            .count() as u32;
        assert_eq!(reported[0].half_days, half_cells);
        assert_eq!(reported[0].total(), grid.cells.len() as u32);
    }

    #[test]
    fn clicks_report_iso_dates() {
        let employee = EmployeeId::from("1");
        let month = YearMonth::new(2024, 3).unwrap();
        let grid = render_calendar(&employee, month, &[], &CalendarPolicy::default(), |_| {});
        let click = grid.click(&grid.cells[4], "Asha Rao");
        assert_eq!(
            click,
            DayClick {
                date: "2024-03-05".into(),
                employee_name: "Asha Rao".into(),
            }
        );
    }

    #[test]
    fn grid_json_carries_only_layout_and_cells() {
        let employee = EmployeeId::from("1");
        let month = YearMonth::new(2024, 2).unwrap();
        let grid = render_calendar(&employee, month, &[], &CalendarPolicy::default(), |_| {});
        let value = serde_json::to_value(&grid).unwrap();
        let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, ["cells", "leading_blanks"]);
        assert_eq!(value["cells"].as_array().unwrap().len(), 29);
    }
}

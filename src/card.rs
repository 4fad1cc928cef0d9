use crate::calendar::{CalendarGrid, render_calendar};
use crate::models::{
    AttendanceRecord, CategoryBreakdown, Employee, EmployeeId, MonthSummary, YearMonth,
};
use crate::resolver::CalendarPolicy;
use crate::stats::breakdown_cells;
use serde::Serialize;
use std::collections::HashMap;

/// Everything one employee's attendance card shows for a month.
#[derive(Debug, Clone, Serialize)]
pub struct EmployeeCard {
    pub employee: Employee,
    pub summary: MonthSummary,
    pub breakdown: CategoryBreakdown,
    pub calendar: CalendarGrid,
}

impl EmployeeCard {
    pub fn build(
        employee: &Employee,
        month: YearMonth,
        records: &[AttendanceRecord],
        policy: &CalendarPolicy,
    ) -> Self {
        let mut summary = MonthSummary::default();
        let calendar = render_calendar(&employee.id, month, records, policy, |resolved| {
            summary = resolved;
        });

        Self {
            employee: employee.clone(),
            summary,
            breakdown: breakdown_cells(&calendar.cells),
            calendar,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AttendanceResponse {
    pub year: i32,
    pub month: u32,
    pub title: String,
    pub days_in_month: u32,
    pub cards: Vec<EmployeeCard>,
    pub notice: Option<String>,
}

/// Case-insensitive substring match on the name, sorted by name then id.
pub fn filter_employees(employees: &[Employee], name_filter: &str) -> Vec<Employee> {
    let needle = name_filter.trim().to_lowercase();
    let mut matched: Vec<Employee> = employees
        .iter()
        .filter(|employee| needle.is_empty() || employee.name.to_lowercase().contains(&needle))
        .cloned()
        .collect();
    matched.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.id.cmp(&b.id))
    });
    matched
}

pub fn build_cards(
    employees: &[Employee],
    records: &[AttendanceRecord],
    month: YearMonth,
    name_filter: &str,
    policy: &CalendarPolicy,
) -> Vec<EmployeeCard> {
    let mut by_employee: HashMap<&EmployeeId, Vec<AttendanceRecord>> = HashMap::new();
    for record in records {
        by_employee
            .entry(&record.employee_id)
            .or_default()
            .push(record.clone());
    }

    filter_employees(employees, name_filter)
        .iter()
        .map(|employee| {
            let own = by_employee
                .get(&employee.id)
                .map(Vec::as_slice)
                .unwrap_or_default();
            EmployeeCard::build(employee, month, own, policy)
        })
        .collect()
}

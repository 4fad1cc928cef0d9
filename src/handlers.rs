use crate::card::{AttendanceResponse, build_cards, filter_employees};
use crate::errors::AppError;
use crate::models::{
    AttendanceRecord, Employee, EmployeeId, EmployeesResponse, FilterState, MonthQuery, NameQuery,
    SummaryQuery, SummaryResponse, VisitQuery, VisitsResponse, YearMonth, parse_day,
};
use crate::state::AppState;
use crate::stats::{breakdown, summarize};
use crate::storage::save_filters;
use crate::ui::{render_cards, render_dashboard};
use axum::{
    Json,
    extract::{Query, State},
    response::Html,
};
use chrono::Local;
use tracing::{info, warn};

const NO_ATTENDANCE: &str = "No attendance data available for this month.";
const NO_EMPLOYEES: &str = "Employee list is unavailable right now.";
const NO_VISITS: &str = "Visit details are unavailable right now.";

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let filters = state.filters.lock().await.clone();
    let month = filters
        .month()
        .unwrap_or_else(|| YearMonth::of(Local::now().date_naive()));
    let view = load_month(&state, month).await;
    let cards = build_cards(
        &view.employees,
        &view.records,
        month,
        &filters.name_filter,
        &state.policy,
    );
    Html(render_dashboard(&filters, month, &cards, view.notice.as_deref()))
}

pub async fn cards_fragment(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> Result<Html<String>, AppError> {
    let (month, name) = month_from_query(&state, query).await?;
    let view = load_month(&state, month).await;
    let cards = build_cards(&view.employees, &view.records, month, &name, &state.policy);
    Ok(Html(render_cards(&cards, view.notice.as_deref())))
}

pub async fn get_filters(State(state): State<AppState>) -> Json<FilterState> {
    Json(state.filters.lock().await.clone())
}

pub async fn put_filters(
    State(state): State<AppState>,
    Json(payload): Json<FilterState>,
) -> Result<Json<FilterState>, AppError> {
    if payload.month().is_none() {
        return Err(AppError::bad_request("selectedMonth must be between 0 and 11"));
    }

    let mut filters = state.filters.lock().await;
    save_filters(&state.store, &payload).await?;
    info!(
        "filters set to {}-{:02} name='{}'",
        payload.selected_year,
        payload.selected_month + 1,
        payload.name_filter
    );
    *filters = payload.clone();
    Ok(Json(payload))
}

pub async fn get_attendance(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<AttendanceResponse>, AppError> {
    let (month, name) = month_from_query(&state, query).await?;
    let view = load_month(&state, month).await;
    let cards = build_cards(&view.employees, &view.records, month, &name, &state.policy);

    Ok(Json(AttendanceResponse {
        year: month.year(),
        month: month.month(),
        title: month.title(),
        days_in_month: month.day_count(),
        cards,
        notice: view.notice,
    }))
}

pub async fn get_employees(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> Json<EmployeesResponse> {
    let (employees, notice) = match state.source.employees().await {
        Ok(employees) => (employees, None),
        Err(err) => {
            warn!("employee directory fetch failed: {err}");
            (Vec::new(), Some(NO_EMPLOYEES.to_string()))
        }
    };

    Json(EmployeesResponse {
        employees: filter_employees(&employees, query.name.as_deref().unwrap_or_default()),
        notice,
    })
}

pub async fn get_visits(
    State(state): State<AppState>,
    Query(query): Query<VisitQuery>,
) -> Result<Json<VisitsResponse>, AppError> {
    let date = parse_day(&query.date)
        .ok_or_else(|| AppError::bad_request("date must be formatted as yyyy-MM-dd"))?;
    let employee = query.employee.trim();
    if employee.is_empty() {
        return Err(AppError::bad_request("employee is required"));
    }

    let (visits, notice) = match state.source.visits(date, employee).await {
        Ok(visits) => (visits, None),
        Err(err) => {
            warn!("visit lookup for {employee} on {date} failed: {err}");
            (Vec::new(), Some(NO_VISITS.to_string()))
        }
    };

    Ok(Json(VisitsResponse {
        date: date.format("%Y-%m-%d").to_string(),
        employee: employee.to_string(),
        visits,
        notice,
    }))
}

pub async fn get_summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<SummaryResponse>, AppError> {
    let month = YearMonth::new(query.year, query.month)
        .ok_or_else(|| AppError::bad_request("month must be between 1 and 12"))?;
    let employee_id = EmployeeId::new(query.employee.trim());
    let (records, notice) = fetch_records(&state, month).await;

    Ok(Json(SummaryResponse {
        summary: summarize(&employee_id, month, &records, &state.policy),
        breakdown: breakdown(&employee_id, month, &records, &state.policy),
        employee_id,
        year: month.year(),
        month: month.month(),
        days_in_month: month.day_count(),
        notice,
    }))
}

struct MonthData {
    employees: Vec<Employee>,
    records: Vec<AttendanceRecord>,
    notice: Option<String>,
}

async fn load_month(state: &AppState, month: YearMonth) -> MonthData {
    let (employees, (records, attendance_notice)) =
        tokio::join!(state.source.employees(), fetch_records(state, month));

    let (employees, notice) = match employees {
        Ok(employees) => (employees, attendance_notice),
        Err(err) => {
            warn!("employee directory fetch failed: {err}");
            (Vec::new(), Some(NO_EMPLOYEES.to_string()))
        }
    };

    MonthData {
        employees,
        records,
        notice,
    }
}

/// A failed fetch degrades to an empty list; the month still renders, all absent.
async fn fetch_records(
    state: &AppState,
    month: YearMonth,
) -> (Vec<AttendanceRecord>, Option<String>) {
    match state
        .source
        .attendance(month.first_day(), month.last_day())
        .await
    {
        Ok(records) if records.is_empty() => (records, Some(NO_ATTENDANCE.to_string())),
        Ok(records) => (records, None),
        Err(err) => {
            warn!("attendance fetch for {} failed: {err}", month.title());
            (Vec::new(), Some(NO_ATTENDANCE.to_string()))
        }
    }
}

/// Query parameters use 1-based months and fall back to the persisted filter.
async fn month_from_query(
    state: &AppState,
    query: MonthQuery,
) -> Result<(YearMonth, String), AppError> {
    let filters = state.filters.lock().await.clone();
    let year = query.year.unwrap_or(filters.selected_year);
    let month_number = query.month.unwrap_or(filters.selected_month + 1);
    let month = YearMonth::new(year, month_number)
        .ok_or_else(|| AppError::bad_request("month must be between 1 and 12"))?;
    Ok((month, query.name.unwrap_or(filters.name_filter)))
}

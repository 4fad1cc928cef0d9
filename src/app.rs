use crate::handlers;
use crate::state::AppState;
use axum::{Router, routing::get};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/fragments/cards", get(handlers::cards_fragment))
        .route(
            "/api/filters",
            get(handlers::get_filters).put(handlers::put_filters),
        )
        .route("/api/attendance", get(handlers::get_attendance))
        .route("/api/employees", get(handlers::get_employees))
        .route("/api/visits", get(handlers::get_visits))
        .route("/api/summary", get(handlers::get_summary))
        .with_state(state)
}

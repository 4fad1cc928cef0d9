use crate::models::FilterState;
use crate::resolver::CalendarPolicy;
use crate::source::DashboardSource;
use crate::storage::KeyValueStore;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn DashboardSource>,
    pub store: KeyValueStore,
    pub filters: Arc<Mutex<FilterState>>,
    pub policy: CalendarPolicy,
}

impl AppState {
    pub fn new(
        source: Arc<dyn DashboardSource>,
        store: KeyValueStore,
        filters: FilterState,
        policy: CalendarPolicy,
    ) -> Self {
        Self {
            source,
            store,
            filters: Arc::new(Mutex::new(filters)),
            policy,
        }
    }
}

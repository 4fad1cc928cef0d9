use crate::errors::AppError;
use crate::models::FilterState;
use chrono::NaiveDate;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::{collections::BTreeMap, path::Path, path::PathBuf, sync::Arc};
use tokio::{fs, sync::Mutex};
use tracing::{error, warn};

pub const FILTER_KEY: &str = "attendance.filters";

type Entries = BTreeMap<String, serde_json::Value>;

/// Small key-value store for UI state. Without a path it only lives in memory;
/// with one, every write is mirrored to a JSON file.
#[derive(Debug, Clone, Default)]
pub struct KeyValueStore {
    path: Option<PathBuf>,
    entries: Arc<Mutex<Entries>>,
}

impl KeyValueStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub async fn open(path: PathBuf) -> Self {
        let entries = load_entries(&path).await;
        Self {
            path: Some(path),
            entries: Arc::new(Mutex::new(entries)),
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.entries.lock().await.get(key).cloned()?;
        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                warn!("ignoring stored value for {key}: {err}");
                None
            }
        }
    }

    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), AppError> {
        let value = serde_json::to_value(value).map_err(AppError::internal)?;
        let mut entries = self.entries.lock().await;
        entries.insert(key.to_string(), value);
        if let Some(path) = &self.path {
            persist_entries(path, &entries).await?;
        }
        Ok(())
    }
}

async fn load_entries(path: &Path) -> Entries {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(entries) => entries,
            Err(err) => {
                error!("failed to parse state file: {err}");
                Entries::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Entries::default(),
        Err(err) => {
            error!("failed to read state file: {err}");
            Entries::default()
        }
    }
}

async fn persist_entries(path: &Path, entries: &Entries) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(entries).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}

/// Reads the persisted dashboard filter, falling back to the current month.
pub async fn load_filters(store: &KeyValueStore, today: NaiveDate) -> FilterState {
    store
        .get::<FilterState>(FILTER_KEY)
        .await
        .filter(|filters| filters.month().is_some())
        .unwrap_or_else(|| FilterState::for_date(today))
}

pub async fn save_filters(store: &KeyValueStore, filters: &FilterState) -> Result<(), AppError> {
    store.set(FILTER_KEY, filters).await
}

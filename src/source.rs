//! Upstream collaborators: the attendance feed, the employee directory and
//! the per-day visit lookup.
//!
//! [`FileSource`] reads a local JSON dataset, [`RemoteSource`] talks to the
//! REST API. Both hand back validated [`AttendanceRecord`]s.

use crate::config::Config;
use crate::models::{AttendanceRecord, Employee, Visit, parse_day};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::fs;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed dataset: {0}")]
    Json(#[from] serde_json::Error),
}

#[async_trait]
pub trait DashboardSource: Send + Sync {
    /// Attendance for all employees with a check-in between `from` and `to` inclusive.
    async fn attendance(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, SourceError>;

    async fn employees(&self) -> Result<Vec<Employee>, SourceError>;

    async fn visits(
        &self,
        date: NaiveDate,
        employee_name: &str,
    ) -> Result<Vec<Visit>, SourceError>;
}

pub fn build_source(config: &Config) -> Result<Arc<dyn DashboardSource>, SourceError> {
    match &config.api_url {
        Some(base_url) => {
            info!("reading attendance from {base_url}");
            Ok(Arc::new(RemoteSource::new(base_url, config.api_token.clone())?))
        }
        None => {
            info!("reading attendance from {}", config.data_path.display());
            Ok(Arc::new(FileSource::new(config.data_path.clone())))
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct Dataset {
    #[serde(default)]
    attendance: Vec<serde_json::Value>,
    #[serde(default)]
    employees: Vec<serde_json::Value>,
    #[serde(default)]
    visits: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct VisitEntry {
    date: String,
    employee: String,
    #[serde(flatten)]
    visit: Visit,
}

/// Decodes each entry on its own; entries of the wrong shape are skipped.
fn parse_entries<T: DeserializeOwned>(values: Vec<serde_json::Value>, kind: &str) -> Vec<T> {
    let total = values.len();
    let entries: Vec<T> = values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<T>(value) {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("skipping malformed {kind} entry: {err}");
                None
            }
        })
        .collect();

    if entries.len() < total {
        warn!("kept {} of {total} {kind} entries", entries.len());
    }
    entries
}

/// JSON dataset on disk, re-read on every request.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn load(&self) -> Result<Dataset, SourceError> {
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!("dataset {} not found, serving empty data", self.path.display());
                Ok(Dataset::default())
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl DashboardSource for FileSource {
    async fn attendance(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, SourceError> {
        let dataset = self.load().await?;
        Ok(AttendanceRecord::parse_list(dataset.attendance)
            .into_iter()
            .filter(|record| {
                record
                    .checkin_date
                    .is_some_and(|date| date >= from && date <= to)
            })
            .collect())
    }

    async fn employees(&self) -> Result<Vec<Employee>, SourceError> {
        Ok(parse_entries(self.load().await?.employees, "employee"))
    }

    async fn visits(
        &self,
        date: NaiveDate,
        employee_name: &str,
    ) -> Result<Vec<Visit>, SourceError> {
        let wanted = employee_name.trim();
        let entries: Vec<VisitEntry> = parse_entries(self.load().await?.visits, "visit");
        Ok(entries
            .into_iter()
            .filter(|entry| parse_day(&entry.date) == Some(date))
            .filter(|entry| entry.employee.trim().eq_ignore_ascii_case(wanted))
            .map(|entry| entry.visit)
            .collect())
    }
}

/// Lists arrive either bare or wrapped in `{ "data": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListEnvelope<T> {
    Bare(Vec<T>),
    Wrapped { data: Vec<T> },
}

impl<T> ListEnvelope<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::Bare(items) | Self::Wrapped { data: items } => items,
        }
    }
}

/// Client for the dashboard REST API.
#[derive(Clone, Debug)]
pub struct RemoteSource {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl RemoteSource {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client,
        })
    }

    fn get_request(&self, path: &str) -> reqwest::RequestBuilder {
        let request = self.client.get(format!("{}{path}", self.base_url));
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn fetch_list<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Vec<T>, SourceError> {
        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.json::<ListEnvelope<T>>().await?.into_vec())
    }
}

#[async_trait]
impl DashboardSource for RemoteSource {
    async fn attendance(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, SourceError> {
        let request = self.get_request("/attendance").query(&[
            ("from", from.format("%Y-%m-%d").to_string()),
            ("to", to.format("%Y-%m-%d").to_string()),
        ]);
        let values = self.fetch_list::<serde_json::Value>(request).await?;
        Ok(AttendanceRecord::parse_list(values))
    }

    async fn employees(&self) -> Result<Vec<Employee>, SourceError> {
        let values = self.fetch_list(self.get_request("/employees")).await?;
        Ok(parse_entries(values, "employee"))
    }

    async fn visits(
        &self,
        date: NaiveDate,
        employee_name: &str,
    ) -> Result<Vec<Visit>, SourceError> {
        let request = self.get_request("/visits").query(&[
            ("date", date.format("%Y-%m-%d").to_string()),
            ("employee", employee_name.to_string()),
        ]);
        let values = self.fetch_list(request).await?;
        Ok(parse_entries(values, "visit"))
    }
}

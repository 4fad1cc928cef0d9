use crate::resolver::{CalendarPolicy, DuplicatePolicy};
use chrono::Weekday;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub state_path: PathBuf,
    pub api_url: Option<String>,
    pub api_token: Option<String>,
    pub policy: CalendarPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `get` so tests never touch the process environment.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, ConfigError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let port = get("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(8080);
        let data_path = get("ATTENDANCE_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data/attendance.json"));
        let state_path = get("APP_STATE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data/state.json"));
        let api_url = get("ATTENDANCE_API_URL").filter(|url| !url.trim().is_empty());
        let api_token = get("ATTENDANCE_API_TOKEN").filter(|token| !token.trim().is_empty());

        let weekly_off = match get("ATTENDANCE_WEEKLY_OFF") {
            Some(value) => value
                .trim()
                .parse::<Weekday>()
                .map_err(|_| ConfigError::Invalid {
                    key: "ATTENDANCE_WEEKLY_OFF",
                    message: format!("'{value}' is not a weekday"),
                })?,
            None => Weekday::Sun,
        };
        let duplicates = match get("ATTENDANCE_DUPLICATE_POLICY") {
            Some(value) => value
                .parse::<DuplicatePolicy>()
                .map_err(|message| ConfigError::Invalid {
                    key: "ATTENDANCE_DUPLICATE_POLICY",
                    message,
                })?,
            None => DuplicatePolicy::default(),
        };

        Ok(Self {
            port,
            data_path,
            state_path,
            api_url,
            api_token,
            policy: CalendarPolicy {
                weekly_off,
                duplicates,
            },
        })
    }
}

pub mod app;
pub mod calendar;
pub mod card;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod resolver;
pub mod source;
pub mod state;
pub mod stats;
pub mod status;
pub mod storage;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use source::{DashboardSource, FileSource, RemoteSource, build_source};
pub use state::AppState;
pub use storage::{KeyValueStore, load_filters};

// src/lib.rs

pub mod config;
pub mod models;
pub mod report;
pub mod services;
pub mod stores;
pub mod trigger;

pub use config::Settings;
pub use models::{AnalysisDomain, AnalysisResult, Language, Persona};
pub use services::api::ApiClient;
pub use services::error::ClientError;
pub use stores::{spawn_store, Domain, StoreHandle, StoreState};

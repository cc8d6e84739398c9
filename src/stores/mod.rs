// src/stores/mod.rs
use async_trait::async_trait;
use serde::Serialize;
use std::fmt::Debug;

use crate::models::AnalysisDomain;
use crate::services::api::ApiClient;
use crate::services::error::Result;

pub mod bonds;
pub mod economy;
pub mod fx;
pub mod institutional;
pub mod policy;
pub mod stocks;
pub mod store;
pub mod whale;

pub use store::{spawn_store, AnalysisSource, StoreHandle, StoreSettings, StoreState};

/// One dashboard domain: where its snapshot comes from, how to fake one when
/// the backend is down, and what metrics it sends for analysis.
#[async_trait]
pub trait Domain: Send + Sync + 'static {
    type Snapshot: Clone + Debug + Send + Sync + 'static;
    type Request: Serialize + Send + Sync + 'static;

    const KIND: AnalysisDomain;

    /// Instrument selected when the store starts (pair, country, metric).
    fn default_selection(&self) -> Option<String> {
        None
    }

    /// Whether `fetch` returns different data per selection. Such stores drop
    /// their snapshot and refetch when the selection changes.
    fn snapshot_depends_on_selection(&self) -> bool {
        false
    }

    async fn fetch(&self, api: &ApiClient, selection: Option<&str>) -> Result<Self::Snapshot>;

    fn mock_snapshot(&self, selection: Option<&str>) -> Self::Snapshot;

    /// Extra cache-lookup keys besides `language`.
    fn cache_query(&self, _selection: Option<&str>) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    fn analysis_request(&self, snapshot: &Self::Snapshot, selection: Option<&str>) -> Self::Request;
}

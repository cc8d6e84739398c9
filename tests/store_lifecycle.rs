// tests/store_lifecycle.rs
mod common;

use std::collections::HashSet;
use std::time::Duration;

use common::{spawn_backend, StubConfig};
use insight_flow_client::models::Language;
use insight_flow_client::services::api::ApiClient;
use insight_flow_client::stores::fx::FxDomain;
use insight_flow_client::stores::{spawn_store, AnalysisSource, StoreHandle, StoreSettings};
use insight_flow_client::trigger::AnalysisTrigger;

fn fx_store(backend: &common::Backend, allow_mock_fallback: bool) -> StoreHandle<FxDomain> {
    let settings = backend.settings();
    let api = ApiClient::new(&settings).unwrap();
    let store_settings = StoreSettings {
        allow_mock_fallback,
        ..StoreSettings::from(&settings)
    };
    spawn_store(FxDomain, api, store_settings)
}

#[tokio::test]
async fn fetch_loads_backend_snapshot() {
    let backend = spawn_backend(StubConfig::default());
    let store = fx_store(&backend, true);

    let state = store.fetch_data_and_wait().await;
    assert!(!state.is_loading);
    assert!(!state.used_mock_data);
    assert!(state.error.is_none());
    assert!(state.last_updated.is_some());
    assert_eq!(state.selection.as_deref(), Some("USD/JPY"));

    let metrics = state.metrics.unwrap();
    assert_eq!(metrics.dollar_index.value, 104.8);
    assert_eq!(metrics.pair("EUR/USD").unwrap().rate, 1.0832);
}

#[tokio::test]
async fn backend_failure_falls_back_to_mock_data() {
    let backend = spawn_backend(StubConfig {
        fail_data: true,
        ..StubConfig::default()
    });
    let store = fx_store(&backend, true);

    let state = store.fetch_data_and_wait().await;
    assert!(state.used_mock_data);
    assert!(state.error.is_none());
    let metrics = state.metrics.unwrap();
    assert_eq!(metrics.major_pairs.len(), 5);
}

#[tokio::test]
async fn backend_failure_without_fallback_reports_error() {
    let backend = spawn_backend(StubConfig {
        fail_data: true,
        ..StubConfig::default()
    });
    let store = fx_store(&backend, false);

    let state = store.fetch_data_and_wait().await;
    assert!(state.metrics.is_none());
    assert!(!state.is_loading);
    let error = state.error.unwrap();
    assert!(error.starts_with("Failed to load FX market data"), "{}", error);
    assert!(error.contains("500"), "{}", error);
}

#[tokio::test]
async fn analysis_without_data_is_refused() {
    let backend = spawn_backend(StubConfig::default());
    let store = fx_store(&backend, true);

    let state = store.analyze(Language::En).await;
    assert!(!state.is_analyzing);
    assert!(state.analysis.is_none());
    assert_eq!(state.error.as_deref(), Some("No FX market data available for analysis"));
    assert_eq!(backend.stub.analyze_count(), 0);
}

#[tokio::test]
async fn cached_analysis_skips_generation() {
    let backend = spawn_backend(StubConfig {
        cache_hit: true,
        ..StubConfig::default()
    });
    let store = fx_store(&backend, true);
    store.fetch_data_and_wait().await;

    let state = store.analyze(Language::Ko).await;
    assert_eq!(state.analysis_source, Some(AnalysisSource::Cache));
    assert_eq!(state.analysis_language, Some(Language::Ko));
    assert_eq!(state.analysis.unwrap().synthesis, "From today's cache.");
    assert_eq!(backend.stub.analyze_count(), 0);

    let (domain, query) = backend.stub.last_cache_query().unwrap();
    assert_eq!(domain, "fx");
    assert_eq!(query.get("language").map(String::as_str), Some("ko"));
    assert_eq!(query.get("selected_pair").map(String::as_str), Some("USD/JPY"));
}

#[tokio::test]
async fn cache_miss_posts_metrics_with_language() {
    let backend = spawn_backend(StubConfig::default());
    let store = fx_store(&backend, true);
    store.fetch_data_and_wait().await;

    let state = store.analyze(Language::Ja).await;
    assert!(!state.is_analyzing);
    assert!(state.current_persona.is_none());
    assert_eq!(state.analysis_source, Some(AnalysisSource::Generated));
    assert_eq!(state.analysis.unwrap().synthesis, "Freshly generated.");

    let (domain, body) = backend.stub.last_analyze_body().unwrap();
    assert_eq!(domain, "fx");
    assert_eq!(body["language"], "ja");
    assert_eq!(body["selected_pair"], "USD/JPY");
    assert_eq!(body["dollar_index"], 104.8);
    assert_eq!(body["risk_sentiment"], "risk_off");
}

#[tokio::test]
async fn requests_while_analyzing_are_ignored() {
    let backend = spawn_backend(StubConfig {
        analysis_delay: Duration::from_millis(300),
        ..StubConfig::default()
    });
    let store = fx_store(&backend, true);
    store.fetch_data_and_wait().await;

    store.request_analysis(Language::En);
    store.request_analysis(Language::Ko);
    let state = store.analyze(Language::Zh).await;

    assert!(state.analysis.is_some());
    assert_eq!(state.analysis_language, Some(Language::En));
    assert_eq!(backend.stub.analyze_count(), 1);
}

#[tokio::test]
async fn failed_analysis_keeps_previous_result() {
    let backend = spawn_backend(StubConfig::default());
    let store = fx_store(&backend, true);
    store.fetch_data_and_wait().await;
    store.analyze(Language::En).await;

    backend.stub.configure(|c| c.fail_analysis = true);
    let state = store.analyze(Language::En).await;

    let error = state.error.unwrap();
    assert!(error.starts_with("Failed to get FX market analysis"), "{}", error);
    assert!(error.contains("500"), "{}", error);
    assert_eq!(state.analysis.unwrap().synthesis, "Freshly generated.");
    assert!(!state.is_analyzing);
}

#[tokio::test]
async fn reset_discards_inflight_analysis() {
    let backend = spawn_backend(StubConfig {
        analysis_delay: Duration::from_millis(200),
        ..StubConfig::default()
    });
    let store = fx_store(&backend, true);
    store.fetch_data_and_wait().await;

    store.request_analysis(Language::En);
    store.reset();
    tokio::time::sleep(Duration::from_millis(400)).await;

    let state = store.state();
    assert!(state.metrics.is_none());
    assert!(state.analysis.is_none());
    assert!(!state.is_analyzing);
    assert_eq!(state.selection.as_deref(), Some("USD/JPY"));
}

#[tokio::test]
async fn changing_pair_clears_analysis_and_rekeys_cache() {
    let backend = spawn_backend(StubConfig::default());
    let store = fx_store(&backend, true);
    store.fetch_data_and_wait().await;
    assert!(store.analyze(Language::En).await.analysis.is_some());

    store.select("EUR/USD");
    let state = store.fetch_data_and_wait().await;
    assert_eq!(state.selection.as_deref(), Some("EUR/USD"));
    assert!(state.analysis.is_none());
    assert!(state.analysis_source.is_none());

    store.analyze(Language::En).await;
    let (_, query) = backend.stub.last_cache_query().unwrap();
    assert_eq!(query.get("selected_pair").map(String::as_str), Some("EUR/USD"));
    let (_, body) = backend.stub.last_analyze_body().unwrap();
    assert_eq!(body["selected_pair"], "EUR/USD");
}

#[tokio::test]
async fn personas_rotate_while_analyzing() {
    let backend = spawn_backend(StubConfig {
        analysis_delay: Duration::from_millis(300),
        ..StubConfig::default()
    });
    let settings = backend.settings();
    let api = ApiClient::new(&settings).unwrap();
    let store = spawn_store(
        FxDomain,
        api,
        StoreSettings {
            allow_mock_fallback: true,
            persona_tick: Duration::from_millis(20),
        },
    );
    store.fetch_data_and_wait().await;

    let mut updates = store.subscribe();
    let watcher = tokio::spawn(async move {
        let mut seen = HashSet::new();
        while updates.changed().await.is_ok() {
            let state = updates.borrow_and_update().clone();
            if let Some(persona) = state.current_persona {
                seen.insert(persona);
            }
            if state.analysis.is_some() {
                break;
            }
        }
        seen
    });

    let state = store.analyze(Language::En).await;
    assert!(state.current_persona.is_none());

    let seen = watcher.await.unwrap();
    assert!(seen.len() >= 2, "saw {:?}", seen);
}

#[tokio::test]
async fn trigger_follows_store_state() {
    let backend = spawn_backend(StubConfig {
        analysis_delay: Duration::from_millis(200),
        ..StubConfig::default()
    });
    let store = fx_store(&backend, true);

    let idle = AnalysisTrigger::for_state(&store.state());
    assert!(!idle.is_enabled());
    assert!(!idle.click_store(&store, Language::En));

    store.fetch_data_and_wait().await;
    let ready = AnalysisTrigger::for_state(&store.state());
    assert!(ready.is_enabled());
    assert!(ready.click_store(&store, Language::En));

    // Joins the analysis the click started.
    let state = store.analyze(Language::En).await;
    assert!(state.analysis.is_some());
    assert_eq!(AnalysisTrigger::for_state(&state).label(), "Ask the Board");
    assert_eq!(backend.stub.analyze_count(), 1);
}

#[tokio::test]
async fn shutdown_closes_the_store() {
    let backend = spawn_backend(StubConfig::default());
    let store = fx_store(&backend, true);
    store.fetch_data_and_wait().await;

    store.shutdown();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(store.is_closed());
    // Round trips on a stopped store return the last published state.
    let state = store.fetch_data_and_wait().await;
    assert!(state.metrics.is_some());
}

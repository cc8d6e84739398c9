// tests/common/mod.rs
#![allow(dead_code)]

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};
use warp::http::StatusCode;
use warp::reject::Rejection;
use warp::{Filter, Reply};

use insight_flow_client::config::Settings;

/// Knobs the tests flip on the stub backend.
#[derive(Debug, Clone, Default)]
pub struct StubConfig {
    pub fail_data: bool,
    pub cache_hit: bool,
    pub fail_analysis: bool,
    pub analysis_delay: Duration,
    /// Bonds global panel and institutional report card answer 500.
    pub fail_secondary: bool,
    /// The institutional cache lookup answers 404.
    pub institutional_cache_missing: bool,
}

/// Requests the stub has seen.
#[derive(Debug, Default)]
pub struct Recorded {
    pub cache_queries: Vec<(String, HashMap<String, String>)>,
    pub analyze_bodies: Vec<(String, Value)>,
}

#[derive(Default)]
pub struct Stub {
    pub config: Mutex<StubConfig>,
    pub recorded: Mutex<Recorded>,
}

impl Stub {
    pub fn configure<F: FnOnce(&mut StubConfig)>(&self, f: F) {
        f(&mut self.config.lock().unwrap());
    }

    fn config(&self) -> StubConfig {
        self.config.lock().unwrap().clone()
    }

    pub fn analyze_count(&self) -> usize {
        self.recorded.lock().unwrap().analyze_bodies.len()
    }

    pub fn last_analyze_body(&self) -> Option<(String, Value)> {
        self.recorded.lock().unwrap().analyze_bodies.last().cloned()
    }

    pub fn last_cache_query(&self) -> Option<(String, HashMap<String, String>)> {
        self.recorded.lock().unwrap().cache_queries.last().cloned()
    }
}

pub struct Backend {
    pub addr: SocketAddr,
    pub stub: Arc<Stub>,
}

impl Backend {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn settings(&self) -> Settings {
        Settings {
            api_base_url: self.url(),
            analysis_base_url: self.url(),
            ..Settings::default()
        }
    }
}

pub fn fx_payload() -> Value {
    json!({
        "dollarIndex": { "value": 104.8, "change24h": 0.32, "trend": "neutral" },
        "majorPairs": [
            { "pair": "USD/JPY", "rate": 154.2, "change24h": 0.45, "high24h": 155.0, "low24h": 153.6 },
            { "pair": "EUR/USD", "rate": 1.0832, "change24h": -0.12, "high24h": 1.09, "low24h": 1.08 }
        ],
        "capitalFlows": [],
        "riskSentiment": "risk_off",
        "lastUpdated": "2026-01-15T09:00:00Z"
    })
}

pub fn bond_yields_payload() -> Value {
    json!({
        "current_curve": { "date": "2026-01-15", "data": [
            { "maturity": "2Y", "yield_value": 4.85, "date": "2026-01-15" },
            { "maturity": "10Y", "yield_value": 4.55, "date": "2026-01-15" }
        ]},
        "previous_curve": { "date": "2025-12-15", "data": [
            { "maturity": "2Y", "yield_value": 4.70, "date": "2025-12-15" },
            { "maturity": "10Y", "yield_value": 4.40, "date": "2025-12-15" }
        ]}
    })
}

pub fn global_bonds_payload() -> Value {
    json!({
        "global_bonds": [
            { "country": "Japan", "country_code": "JP", "flag": "JP", "yield_10y": 0.95,
              "change_24h": 0.01, "spread_vs_us": -3.6, "trend": "up" }
        ],
        "bond_flows": [],
        "us_yield_10y": 4.55
    })
}

fn country_name(code: &str) -> &'static str {
    match code {
        "US" => "United States",
        "JP" => "Japan",
        _ => "Unknown",
    }
}

pub fn imf_payload(code: &str) -> Value {
    json!({
        "country_code": code,
        "country_name": country_name(code),
        "sentiment": if code == "JP" { "neutral" } else { "bullish" },
        "key_risks": [format!("{} fiscal path", code)]
    })
}

pub fn report_card_payload(code: &str) -> Value {
    json!({
        "country_code": code,
        "country_name": country_name(code),
        "report_cards": [
            { "institution": "IMF", "last_report_date": "2026-01-10",
              "key_keywords": ["growth"], "sentiment": "neutral", "sentiment_icon": "🟡" }
        ],
        "consensus_view": "Steady."
    })
}

pub fn board_result(synthesis: &str) -> Value {
    json!({
        "kostolany_response": "The dog runs ahead of its owner.",
        "buffett_response": "Stay patient.",
        "munger_response": "Invert the question.",
        "dalio_response": "Mind the debt cycle.",
        "synthesis": synthesis
    })
}

fn reply(status: StatusCode, body: Value) -> warp::reply::WithStatus<warp::reply::Json> {
    warp::reply::with_status(warp::reply::json(&body), status)
}

async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (code, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not Found")
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
    };
    Ok(reply(code, json!({ "error": message })))
}

pub fn routes(stub: Arc<Stub>) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    let with_stub = warp::any().map(move || stub.clone());

    let health = warp::path!("health")
        .and(warp::get())
        .map(|| reply(StatusCode::OK, json!({ "status": "healthy" })));

    let fx = warp::path!("api" / "fx" / "data")
        .and(warp::get())
        .and(with_stub.clone())
        .map(|stub: Arc<Stub>| {
            if stub.config().fail_data {
                reply(StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "upstream down" }))
            } else {
                reply(StatusCode::OK, fx_payload())
            }
        });

    let bond_yields = warp::path!("api" / "bonds" / "yields")
        .and(warp::get())
        .map(|| reply(StatusCode::OK, bond_yields_payload()));

    let bond_global = warp::path!("api" / "bonds" / "global")
        .and(warp::get())
        .and(with_stub.clone())
        .map(|stub: Arc<Stub>| {
            if stub.config().fail_secondary {
                reply(StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "panel down" }))
            } else {
                reply(StatusCode::OK, global_bonds_payload())
            }
        });

    let imf = warp::path!("api" / "institutional" / "imf" / String)
        .and(warp::get())
        .map(|code: String| reply(StatusCode::OK, imf_payload(&code)));

    let report_card = warp::path!("api" / "institutional" / "report-card" / String)
        .and(warp::get())
        .and(with_stub.clone())
        .map(|code: String, stub: Arc<Stub>| {
            if stub.config().fail_secondary {
                reply(StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "panel down" }))
            } else {
                reply(StatusCode::OK, report_card_payload(&code))
            }
        });

    let cached = warp::path!("api" / "analyze" / String / "cached")
        .and(warp::get())
        .and(warp::query::<HashMap<String, String>>())
        .and(with_stub.clone())
        .map(|domain: String, query: HashMap<String, String>, stub: Arc<Stub>| {
            stub.recorded
                .lock()
                .unwrap()
                .cache_queries
                .push((domain.clone(), query));
            let config = stub.config();
            if config.institutional_cache_missing && domain == "institutional" {
                reply(StatusCode::NOT_FOUND, json!({ "error": "Not Found" }))
            } else if config.cache_hit {
                reply(
                    StatusCode::OK,
                    json!({ "cached": true, "result": board_result("From today's cache.") }),
                )
            } else {
                reply(StatusCode::OK, json!({ "cached": false, "result": null }))
            }
        });

    let analyze = warp::path!("api" / "analyze" / String)
        .and(warp::post())
        .and(warp::body::json())
        .and(with_stub.clone())
        .and_then(|domain: String, body: Value, stub: Arc<Stub>| async move {
            stub.recorded
                .lock()
                .unwrap()
                .analyze_bodies
                .push((domain, body));
            let config = stub.config();
            tokio::time::sleep(config.analysis_delay).await;
            let response = if config.fail_analysis {
                reply(StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "model unavailable" }))
            } else {
                reply(StatusCode::OK, board_result("Freshly generated."))
            };
            Ok::<_, Rejection>(response)
        });

    let debate = warp::path!("api" / "debate")
        .and(warp::post())
        .and(warp::body::json())
        .map(|body: Value| {
            let mut result = board_result("The board is split.");
            result["scenario"] = body["scenario"].clone();
            reply(StatusCode::OK, result)
        });

    let echo = warp::path!("echo-headers")
        .and(warp::header::headers_cloned())
        .map(|headers: warp::http::HeaderMap| {
            let echoed: HashMap<String, String> = headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or_default().to_string()))
                .collect();
            reply(StatusCode::OK, json!(echoed))
        });

    health
        .or(fx)
        .or(bond_yields)
        .or(bond_global)
        .or(imf)
        .or(report_card)
        .or(cached)
        .or(analyze)
        .or(debate)
        .or(echo)
        .recover(handle_rejection)
}

/// Start the stub on an ephemeral localhost port.
pub fn spawn_backend(config: StubConfig) -> Backend {
    let stub = Arc::new(Stub {
        config: Mutex::new(config),
        recorded: Mutex::new(Recorded::default()),
    });
    let (addr, server) = warp::serve(routes(stub.clone())).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    Backend { addr, stub }
}

// src/stores/fx.rs
use async_trait::async_trait;
use chrono::Utc;
use log::info;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::AnalysisDomain;
use crate::services::api::ApiClient;
use crate::services::error::Result;
use crate::services::format::round2;

use super::Domain;

pub const DEFAULT_PAIR: &str = "USD/JPY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DollarIndex {
    pub value: f64,
    #[serde(rename = "change24h")]
    pub change_24h: f64,
    pub trend: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyPair {
    pub pair: String,
    pub rate: f64,
    #[serde(rename = "change24h")]
    pub change_24h: f64,
    #[serde(rename = "high24h")]
    pub high_24h: f64,
    #[serde(rename = "low24h")]
    pub low_24h: f64,
    #[serde(default)]
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapitalFlow {
    pub from: String,
    pub to: String,
    pub volume: f64,
    #[serde(rename = "type")]
    pub flow_type: String,
}

/// Body of `GET /api/fx/data`. The backend uses camelCase here, unlike the
/// other domains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FxSnapshot {
    pub dollar_index: DollarIndex,
    pub major_pairs: Vec<CurrencyPair>,
    #[serde(default)]
    pub capital_flows: Vec<CapitalFlow>,
    pub risk_sentiment: String,
    #[serde(default)]
    pub last_updated: String,
}

impl FxSnapshot {
    pub fn pair(&self, pair: &str) -> Option<&CurrencyPair> {
        self.major_pairs.iter().find(|p| p.pair == pair)
    }
}

/// DXY above 105 is a strong dollar, below 103 a weak one.
pub fn dollar_trend(value: f64) -> &'static str {
    if value > 105.0 {
        "strong"
    } else if value < 103.0 {
        "weak"
    } else {
        "neutral"
    }
}

pub fn risk_sentiment(dollar_index: f64) -> &'static str {
    if dollar_index > 104.0 {
        "risk_off"
    } else {
        "risk_on"
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FxAnalysisRequest {
    pub dollar_index: f64,
    pub dollar_trend: String,
    pub selected_pair: String,
    pub risk_sentiment: String,
    pub major_pairs: Vec<CurrencyPair>,
}

/// Dollar index and major pairs. Analyses are cached per selected pair.
#[derive(Debug, Clone, Default)]
pub struct FxDomain;

#[async_trait]
impl Domain for FxDomain {
    type Snapshot = FxSnapshot;
    type Request = FxAnalysisRequest;

    const KIND: AnalysisDomain = AnalysisDomain::Fx;

    fn default_selection(&self) -> Option<String> {
        Some(DEFAULT_PAIR.to_string())
    }

    async fn fetch(&self, api: &ApiClient, _selection: Option<&str>) -> Result<FxSnapshot> {
        let url = api.endpoints().fx_data();
        info!("Fetching FX data from URL: {}", url);
        api.get_json(&url).await
    }

    fn mock_snapshot(&self, _selection: Option<&str>) -> FxSnapshot {
        let mut rng = rand::thread_rng();
        let timestamp = Utc::now().to_rfc3339();
        let dxy = round2(104.5 + rng.gen_range(-1.0..1.0));
        let strong = dxy > 104.0;

        // (pair, base, jitter, decimals, 24h scale, high, low)
        let pairs: [(&str, f64, f64, i32, f64, f64, f64); 5] = [
            ("USD/JPY", 154.5, 1.0, 2, 1.5, 155.2, 153.8),
            ("EUR/USD", 1.085, 0.005, 4, 1.0, 1.092, 1.082),
            ("GBP/USD", 1.27, 0.005, 4, 1.0, 1.278, 1.265),
            ("USD/CNY", 7.24, 0.01, 2, 0.5, 7.26, 7.22),
            ("USD/KRW", 1380.0, 10.0, 2, 1.0, 1395.0, 1370.0),
        ];
        let major_pairs = pairs
            .iter()
            .map(|&(pair, base, jitter, decimals, scale, high, low)| {
                let factor = 10f64.powi(decimals);
                CurrencyPair {
                    pair: pair.to_string(),
                    rate: ((base + rng.gen_range(-jitter..jitter)) * factor).round() / factor,
                    change_24h: round2(rng.gen_range(-0.5..0.5) * scale),
                    high_24h: high,
                    low_24h: low,
                    timestamp: timestamp.clone(),
                }
            })
            .collect();

        FxSnapshot {
            dollar_index: DollarIndex {
                value: dxy,
                change_24h: round2(rng.gen_range(-0.75..0.75)),
                trend: dollar_trend(dxy).to_string(),
            },
            major_pairs,
            capital_flows: capital_flows(strong),
            risk_sentiment: risk_sentiment(dxy).to_string(),
            last_updated: timestamp,
        }
    }

    fn cache_query(&self, selection: Option<&str>) -> Vec<(&'static str, String)> {
        vec![("selected_pair", selection.unwrap_or(DEFAULT_PAIR).to_string())]
    }

    fn analysis_request(&self, snapshot: &FxSnapshot, selection: Option<&str>) -> FxAnalysisRequest {
        FxAnalysisRequest {
            dollar_index: snapshot.dollar_index.value,
            dollar_trend: snapshot.dollar_index.trend.clone(),
            selected_pair: selection.unwrap_or(DEFAULT_PAIR).to_string(),
            risk_sentiment: snapshot.risk_sentiment.clone(),
            major_pairs: snapshot.major_pairs.clone(),
        }
    }
}

fn capital_flows(strong_dollar: bool) -> Vec<CapitalFlow> {
    let flow = |from: &str, to: &str, volume: f64, flow_type: &str| CapitalFlow {
        from: from.to_string(),
        to: to.to_string(),
        volume,
        flow_type: flow_type.to_string(),
    };
    let tone = if strong_dollar { "risk_off" } else { "risk_on" };
    vec![
        flow("USA", "Japan", if strong_dollar { 0.3 } else { 0.6 }, tone),
        flow("EU", "USA", if strong_dollar { 0.7 } else { 0.4 }, tone),
        flow("USA", "China", 0.4, "risk_on"),
        flow("Japan", "USA", if strong_dollar { 0.5 } else { 0.3 }, "risk_off"),
        flow("USA", "Korea", 0.35, "risk_on"),
    ]
}

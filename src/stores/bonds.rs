// src/stores/bonds.rs
use async_trait::async_trait;
use chrono::{Duration, Utc};
use log::{info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::AnalysisDomain;
use crate::services::api::ApiClient;
use crate::services::error::Result;
use crate::services::format::{round2, spread};

use super::Domain;

pub const MATURITIES: [&str; 11] = [
    "1M", "3M", "6M", "1Y", "2Y", "3Y", "5Y", "7Y", "10Y", "20Y", "30Y",
];
const BASE_YIELDS: [f64; 11] = [5.45, 5.40, 5.35, 5.10, 4.85, 4.60, 4.45, 4.50, 4.55, 4.80, 4.70];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldPoint {
    pub maturity: String,
    pub yield_value: f64,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldCurve {
    pub date: String,
    pub data: Vec<YieldPoint>,
}

impl YieldCurve {
    pub fn yield_at(&self, maturity: &str) -> Option<f64> {
        self.data
            .iter()
            .find(|p| p.maturity == maturity)
            .map(|p| p.yield_value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondYields {
    pub current_curve: YieldCurve,
    pub previous_curve: YieldCurve,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalBondYield {
    pub country: String,
    pub country_code: String,
    pub flag: String,
    pub yield_10y: f64,
    pub change_24h: f64,
    pub spread_vs_us: f64,
    pub trend: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondFlow {
    pub from_country: String,
    pub to_country: String,
    pub volume: f64,
    pub flow_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalBondData {
    pub global_bonds: Vec<GlobalBondYield>,
    pub bond_flows: Vec<BondFlow>,
    pub us_yield_10y: f64,
}

impl GlobalBondData {
    /// Country 10Y minus the US 10Y, computed locally.
    pub fn spread_vs_us(&self, country_code: &str) -> Option<f64> {
        self.global_bonds
            .iter()
            .find(|b| b.country_code.eq_ignore_ascii_case(country_code))
            .map(|b| spread(b.yield_10y, self.us_yield_10y))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BondSnapshot {
    pub yields: BondYields,
    /// The global panel is optional; the curve alone is enough to analyse.
    pub global: Option<GlobalBondData>,
}

impl BondSnapshot {
    pub fn yield_2y(&self) -> Option<f64> {
        self.yields.current_curve.yield_at("2Y")
    }

    pub fn yield_10y(&self) -> Option<f64> {
        self.yields.current_curve.yield_at("10Y")
    }

    /// 10Y - 2Y.
    pub fn spread(&self) -> Option<f64> {
        Some(spread(self.yield_10y()?, self.yield_2y()?))
    }

    pub fn is_inverted(&self) -> bool {
        self.spread().map_or(false, |s| s < 0.0)
    }
}

/// Readings the curve lacks are sent as `null` rather than zero.
#[derive(Debug, Clone, Serialize)]
pub struct BondAnalysisRequest {
    pub yield_2y: Option<f64>,
    pub yield_10y: Option<f64>,
    pub spread: Option<f64>,
    pub is_inverted: Option<bool>,
    pub selected_metric: String,
    pub curve_data: Vec<YieldPoint>,
}

/// Treasury curve plus the global 10Y panel. The selection is the metric
/// the user is looking at (`curve`, `spread`, `global`).
#[derive(Debug, Clone, Default)]
pub struct BondDomain;

#[async_trait]
impl Domain for BondDomain {
    type Snapshot = BondSnapshot;
    type Request = BondAnalysisRequest;

    const KIND: AnalysisDomain = AnalysisDomain::Bonds;

    fn default_selection(&self) -> Option<String> {
        Some("curve".to_string())
    }

    async fn fetch(&self, api: &ApiClient, _selection: Option<&str>) -> Result<BondSnapshot> {
        let url = api.endpoints().bonds_yields();
        info!("Fetching bond yields from URL: {}", url);
        let yields: BondYields = api.get_json(&url).await?;

        let global_url = api.endpoints().bonds_global();
        let global = match api.get_json::<GlobalBondData>(&global_url).await {
            Ok(global) => Some(global),
            Err(e) => {
                warn!("Global bond data unavailable: {}", e);
                None
            }
        };

        Ok(BondSnapshot { yields, global })
    }

    fn mock_snapshot(&self, _selection: Option<&str>) -> BondSnapshot {
        let now = Utc::now();
        let today = now.format("%Y-%m-%d").to_string();
        let last_month = (now - Duration::days(30)).format("%Y-%m-%d").to_string();

        let current_curve = mock_curve(&today, 0.0);
        let us_yield_10y = current_curve.yield_at("10Y").unwrap_or(4.55);

        BondSnapshot {
            yields: BondYields {
                current_curve,
                previous_curve: mock_curve(&last_month, -0.15),
            },
            global: Some(mock_global(us_yield_10y)),
        }
    }

    fn analysis_request(&self, snapshot: &BondSnapshot, selection: Option<&str>) -> BondAnalysisRequest {
        BondAnalysisRequest {
            yield_2y: snapshot.yield_2y(),
            yield_10y: snapshot.yield_10y(),
            spread: snapshot.spread(),
            is_inverted: snapshot.spread().map(|s| s < 0.0),
            selected_metric: selection.unwrap_or("curve").to_string(),
            curve_data: snapshot.yields.current_curve.data.clone(),
        }
    }
}

fn mock_curve(date: &str, shift: f64) -> YieldCurve {
    let mut rng = rand::thread_rng();
    let data = MATURITIES
        .iter()
        .zip(BASE_YIELDS.iter())
        .map(|(maturity, base)| YieldPoint {
            maturity: maturity.to_string(),
            yield_value: round2(base + shift + rng.gen_range(-0.05..0.05)),
            date: date.to_string(),
        })
        .collect();
    YieldCurve {
        date: date.to_string(),
        data,
    }
}

fn mock_trend(rng: &mut impl Rng) -> String {
    let r: f64 = rng.gen();
    if r > 0.6 {
        "up".to_string()
    } else if r > 0.3 {
        "down".to_string()
    } else {
        "flat".to_string()
    }
}

fn mock_global(us_yield_10y: f64) -> GlobalBondData {
    // (country, code, flag, base 10Y, yield jitter, 24h jitter)
    const COUNTRIES: [(&str, &str, &str, f64, f64, f64); 8] = [
        ("United States", "US", "🇺🇸", 0.0, 0.0, 0.05),
        ("Germany", "DE", "🇩🇪", 2.35, 0.1, 0.04),
        ("Japan", "JP", "🇯🇵", 0.95, 0.05, 0.025),
        ("United Kingdom", "GB", "🇬🇧", 4.15, 0.1, 0.04),
        ("China", "CN", "🇨🇳", 2.25, 0.05, 0.02),
        ("France", "FR", "🇫🇷", 2.95, 0.075, 0.03),
        ("Italy", "IT", "🇮🇹", 3.65, 0.1, 0.05),
        ("Australia", "AU", "🇦🇺", 4.25, 0.075, 0.04),
    ];

    let mut rng = rand::thread_rng();
    let global_bonds = COUNTRIES
        .iter()
        .map(|&(country, code, flag, base, jitter, daily)| {
            let yield_10y = if code == "US" {
                us_yield_10y
            } else {
                round2(base + rng.gen_range(-jitter..jitter))
            };
            GlobalBondYield {
                country: country.to_string(),
                country_code: code.to_string(),
                flag: flag.to_string(),
                yield_10y,
                change_24h: round2(rng.gen_range(-daily..daily)),
                spread_vs_us: spread(yield_10y, us_yield_10y),
                trend: mock_trend(&mut rng),
            }
        })
        .collect();

    let flows = [
        ("JP", "US", 0.8, "flight_to_safety"),
        ("EU", "US", 0.6, "yield_seeking"),
        ("CN", "US", 0.5, "diversification"),
        ("US", "DE", 0.3, "diversification"),
        ("GB", "US", 0.4, "yield_seeking"),
        ("AU", "US", 0.35, "yield_seeking"),
    ];
    let bond_flows = flows
        .iter()
        .map(|&(from, to, volume, flow_type)| BondFlow {
            from_country: from.to_string(),
            to_country: to.to_string(),
            volume,
            flow_type: flow_type.to_string(),
        })
        .collect();

    GlobalBondData {
        global_bonds,
        bond_flows,
        us_yield_10y,
    }
}

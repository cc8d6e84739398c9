// src/stores/economy.rs
use async_trait::async_trait;
use chrono::{Duration, Utc};
use log::info;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::AnalysisDomain;
use crate::services::api::ApiClient;
use crate::services::error::Result;
use crate::services::format::round2;

use super::Domain;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commodity {
    pub symbol: String,
    pub name: String,
    pub short_name: String,
    pub price: f64,
    pub change_24h: f64,
    pub change_1w: f64,
    pub change_1m: f64,
    pub high_52w: f64,
    pub low_52w: f64,
    pub percent_of_range: f64,
    pub unit: String,
    pub signal: String,
    pub interpretation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommoditySignals {
    pub oil: Commodity,
    pub gold: Commodity,
    pub copper: Commodity,
    pub overall_signal: String,
    pub interpretation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PmiReading {
    pub country: String,
    pub country_code: String,
    pub flag: String,
    pub value: f64,
    pub previous_value: f64,
    pub consensus: f64,
    pub change: f64,
    pub surprise: f64,
    pub is_expansion: bool,
    pub trend: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpiReading {
    pub country: String,
    pub country_code: String,
    pub flag: String,
    pub value: f64,
    pub previous_value: f64,
    pub target_rate: f64,
    pub change: f64,
    pub surprise: f64,
    pub is_above_target: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomicEvent {
    pub id: String,
    pub name: String,
    pub country: String,
    pub country_code: String,
    pub flag: String,
    pub date: String,
    pub time: String,
    pub impact: String,
    #[serde(default)]
    pub actual: Option<f64>,
    #[serde(default)]
    pub forecast: Option<f64>,
    #[serde(default)]
    pub previous: Option<f64>,
    pub unit: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomySnapshot {
    pub commodities: CommoditySignals,
    pub pmi_data: Vec<PmiReading>,
    pub cpi_data: Vec<CpiReading>,
    #[serde(default)]
    pub upcoming_events: Vec<EconomicEvent>,
}

impl EconomySnapshot {
    pub fn pmi(&self, country_code: &str) -> Option<f64> {
        self.pmi_data
            .iter()
            .find(|p| p.country_code == country_code)
            .map(|p| p.value)
    }

    pub fn cpi(&self, country_code: &str) -> Option<f64> {
        self.cpi_data
            .iter()
            .find(|c| c.country_code == country_code)
            .map(|c| c.value)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EconomyAnalysisRequest {
    pub oil_price: f64,
    pub oil_change: f64,
    pub gold_price: f64,
    pub gold_change: f64,
    pub copper_price: f64,
    pub copper_change: f64,
    pub commodity_signal: String,
    pub us_pmi: f64,
    pub us_cpi: f64,
}

/// Bullish above `threshold` monthly change, bearish below its negative.
pub fn commodity_signal(change_1m: f64, threshold: f64) -> &'static str {
    if change_1m > threshold {
        "bullish"
    } else if change_1m < -threshold {
        "bearish"
    } else {
        "neutral"
    }
}

/// Read the three commodity signals together.
pub fn overall_signal(oil: &str, gold: &str, copper: &str) -> (&'static str, &'static str) {
    match (oil, gold, copper) {
        ("bearish", "neutral", "bullish") => (
            "goldilocks",
            "Goldilocks scenario: Inflation easing + manufacturing recovery. Ideal for equities.",
        ),
        (_, "bullish", "bearish") => (
            "risk_off",
            "Risk-off: Safe haven (gold) up, industrial (copper) down. Recession fears.",
        ),
        ("bullish", _, "bullish") => (
            "risk_on",
            "Risk-on: Commodities broadly rising. Inflation pressure but growth is strong.",
        ),
        _ => (
            "mixed",
            "Mixed signals: Commodity markets showing no clear direction.",
        ),
    }
}

#[derive(Debug, Clone, Default)]
pub struct EconomyDomain;

#[async_trait]
impl Domain for EconomyDomain {
    type Snapshot = EconomySnapshot;
    type Request = EconomyAnalysisRequest;

    const KIND: AnalysisDomain = AnalysisDomain::Economy;

    async fn fetch(&self, api: &ApiClient, _selection: Option<&str>) -> Result<EconomySnapshot> {
        let url = api.endpoints().economy_data();
        info!("Fetching real economy data from URL: {}", url);
        api.get_json(&url).await
    }

    fn mock_snapshot(&self, _selection: Option<&str>) -> EconomySnapshot {
        EconomySnapshot {
            commodities: mock_commodities(),
            pmi_data: mock_pmi(),
            cpi_data: mock_cpi(),
            upcoming_events: mock_events(),
        }
    }

    fn analysis_request(&self, snapshot: &EconomySnapshot, _selection: Option<&str>) -> EconomyAnalysisRequest {
        let c = &snapshot.commodities;
        EconomyAnalysisRequest {
            oil_price: c.oil.price,
            oil_change: c.oil.change_1m,
            gold_price: c.gold.price,
            gold_change: c.gold.change_1m,
            copper_price: c.copper.price,
            copper_change: c.copper.change_1m,
            commodity_signal: c.overall_signal.clone(),
            us_pmi: snapshot.pmi("US").unwrap_or(50.0),
            us_cpi: snapshot.cpi("US").unwrap_or_default(),
        }
    }
}

struct CommoditySpec {
    symbol: &'static str,
    name: &'static str,
    short_name: &'static str,
    price: (f64, f64),
    change_24h: (f64, f64),
    change_1w: (f64, f64),
    change_1m: (f64, f64),
    threshold: f64,
    range_52w: (f64, f64),
    unit: &'static str,
    readings: [&'static str; 3],
}

fn mock_commodity(spec: &CommoditySpec, rng: &mut impl Rng) -> Commodity {
    let mut around = |(base, range): (f64, f64)| round2(base + rng.gen_range(-range / 2.0..range / 2.0));
    let price = around(spec.price);
    let change_1m = around(spec.change_1m);
    let signal = commodity_signal(change_1m, spec.threshold);
    let (low, high) = spec.range_52w;
    let interpretation = match signal {
        "bullish" => spec.readings[0],
        "bearish" => spec.readings[1],
        _ => spec.readings[2],
    };

    Commodity {
        symbol: spec.symbol.to_string(),
        name: spec.name.to_string(),
        short_name: spec.short_name.to_string(),
        price,
        change_24h: around(spec.change_24h),
        change_1w: around(spec.change_1w),
        change_1m,
        high_52w: high,
        low_52w: low,
        percent_of_range: ((price - low) / (high - low) * 100.0).round(),
        unit: spec.unit.to_string(),
        signal: signal.to_string(),
        interpretation: interpretation.to_string(),
    }
}

fn mock_commodities() -> CommoditySignals {
    let mut rng = rand::thread_rng();
    let oil = mock_commodity(
        &CommoditySpec {
            symbol: "CL=F",
            name: "WTI Crude Oil",
            short_name: "WTI",
            price: (75.0, 10.0),
            change_24h: (0.0, 4.0),
            change_1w: (-1.0, 6.0),
            change_1m: (-2.0, 10.0),
            threshold: 5.0,
            range_52w: (65.0, 95.0),
            unit: "$/barrel",
            readings: ["Oil up = inflation pressure", "Oil down = inflation easing", "Oil stable"],
        },
        &mut rng,
    );
    let gold = mock_commodity(
        &CommoditySpec {
            symbol: "GC=F",
            name: "Gold Futures",
            short_name: "Gold",
            price: (2350.0, 100.0),
            change_24h: (0.0, 2.0),
            change_1w: (0.5, 4.0),
            change_1m: (2.0, 8.0),
            threshold: 3.0,
            range_52w: (1900.0, 2500.0),
            unit: "$/oz",
            readings: ["Gold up = fear/inflation hedge", "Gold down = risk-on", "Gold stable"],
        },
        &mut rng,
    );
    let copper = mock_commodity(
        &CommoditySpec {
            symbol: "HG=F",
            name: "Copper Futures",
            short_name: "Copper",
            price: (4.2, 0.5),
            change_24h: (0.0, 3.0),
            change_1w: (0.0, 5.0),
            change_1m: (0.0, 12.0),
            threshold: 5.0,
            range_52w: (3.5, 5.0),
            unit: "$/lb",
            readings: [
                "Dr. Copper up = manufacturing growth",
                "Dr. Copper down = slowdown warning",
                "Copper stable",
            ],
        },
        &mut rng,
    );

    let (overall, interpretation) = overall_signal(&oil.signal, &gold.signal, &copper.signal);
    CommoditySignals {
        oil,
        gold,
        copper,
        overall_signal: overall.to_string(),
        interpretation: interpretation.to_string(),
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn mock_pmi() -> Vec<PmiReading> {
    let countries = [
        ("US", "United States", "🇺🇸", 52.5),
        ("CN", "China", "🇨🇳", 49.5),
        ("DE", "Germany", "🇩🇪", 47.8),
        ("JP", "Japan", "🇯🇵", 50.2),
        ("KR", "South Korea", "🇰🇷", 51.0),
        ("GB", "United Kingdom", "🇬🇧", 48.5),
    ];
    let mut rng = rand::thread_rng();
    countries
        .iter()
        .map(|&(code, name, flag, base)| {
            let value = round1(base + rng.gen_range(-2.0..2.0));
            let previous = round1(base + rng.gen_range(-1.5..1.5));
            let consensus = round1(base + rng.gen_range(-1.0..1.0));
            let trend = if value > previous {
                "improving"
            } else if value < previous {
                "worsening"
            } else {
                "stable"
            };
            PmiReading {
                country: name.to_string(),
                country_code: code.to_string(),
                flag: flag.to_string(),
                value,
                previous_value: previous,
                consensus,
                change: round1(value - previous),
                surprise: round1(value - consensus),
                is_expansion: value > 50.0,
                trend: trend.to_string(),
            }
        })
        .collect()
}

fn mock_cpi() -> Vec<CpiReading> {
    let countries = [
        ("US", "United States", "🇺🇸", 3.4, 2.0),
        ("EU", "Eurozone", "🇪🇺", 2.8, 2.0),
        ("JP", "Japan", "🇯🇵", 2.6, 2.0),
        ("GB", "United Kingdom", "🇬🇧", 4.0, 2.0),
        ("KR", "South Korea", "🇰🇷", 2.8, 2.0),
        ("CN", "China", "🇨🇳", 0.7, 3.0),
    ];
    let mut rng = rand::thread_rng();
    countries
        .iter()
        .map(|&(code, name, flag, base, target)| {
            let value = round1(base + rng.gen_range(-0.3..0.3));
            let previous = round1(base + rng.gen_range(-0.2..0.2));
            CpiReading {
                country: name.to_string(),
                country_code: code.to_string(),
                flag: flag.to_string(),
                value,
                previous_value: previous,
                target_rate: target,
                change: round1(value - previous),
                surprise: round1(rng.gen_range(-0.2..0.2)),
                is_above_target: value > target,
            }
        })
        .collect()
}

fn mock_events() -> Vec<EconomicEvent> {
    // (name, country, code, flag, impact, forecast, previous, unit, category)
    let events = [
        ("US CPI (YoY)", "United States", "US", "🇺🇸", "high", 3.2, 3.4, "%", "inflation"),
        ("Fed Interest Rate Decision", "United States", "US", "🇺🇸", "high", 5.5, 5.5, "%", "policy"),
        ("US Non-Farm Payrolls", "United States", "US", "🇺🇸", "high", 180.0, 275.0, "K", "employment"),
        ("China Manufacturing PMI", "China", "CN", "🇨🇳", "high", 50.2, 49.5, "index", "manufacturing"),
        ("ECB Interest Rate Decision", "Eurozone", "EU", "🇪🇺", "high", 4.5, 4.5, "%", "policy"),
        ("Japan GDP (QoQ)", "Japan", "JP", "🇯🇵", "medium", 0.3, -0.1, "%", "growth"),
    ];
    let now = Utc::now();
    events
        .iter()
        .enumerate()
        .map(|(i, &(name, country, code, flag, impact, forecast, previous, unit, category))| {
            let date = now + Duration::days((i as i64 + 1) * 2);
            EconomicEvent {
                id: format!("event-{}", i),
                name: name.to_string(),
                country: country.to_string(),
                country_code: code.to_string(),
                flag: flag.to_string(),
                date: date.format("%Y-%m-%d").to_string(),
                time: format!("{}:30", 8 + i),
                impact: impact.to_string(),
                actual: None,
                forecast: Some(forecast),
                previous: Some(previous),
                unit: unit.to_string(),
                category: category.to_string(),
            }
        })
        .collect()
}

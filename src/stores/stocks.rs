// src/stores/stocks.rs
use async_trait::async_trait;
use log::info;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::AnalysisDomain;
use crate::services::api::ApiClient;
use crate::services::error::Result;
use crate::services::format::round2;

use super::Domain;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketIndex {
    pub symbol: String,
    pub name: String,
    pub country: String,
    pub region: String,
    pub flag: String,
    pub price: f64,
    pub change: f64,
    pub change_value: f64,
    pub market_cap: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorPerformance {
    pub sector: String,
    pub short_name: String,
    pub change: f64,
    pub market_cap: f64,
    pub top_stock: String,
    pub top_stock_change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vix {
    pub value: f64,
    pub change: f64,
    pub level: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityFlow {
    pub from_region: String,
    pub to_region: String,
    pub volume: f64,
    pub flow_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSnapshot {
    pub global_indices: Vec<MarketIndex>,
    pub sectors: Vec<SectorPerformance>,
    pub vix: Vix,
    #[serde(default)]
    pub equity_flows: Vec<EquityFlow>,
}

impl StockSnapshot {
    /// Average daily change of the US indices.
    pub fn us_market_change(&self) -> f64 {
        let us: Vec<f64> = self
            .global_indices
            .iter()
            .filter(|i| i.region == "US")
            .map(|i| i.change)
            .collect();
        if us.is_empty() {
            return 0.0;
        }
        round2(us.iter().sum::<f64>() / us.len() as f64)
    }

    pub fn top_sector(&self) -> Option<&SectorPerformance> {
        self.sectors
            .iter()
            .max_by(|a, b| a.change.total_cmp(&b.change))
    }

    pub fn bottom_sector(&self) -> Option<&SectorPerformance> {
        self.sectors
            .iter()
            .min_by(|a, b| a.change.total_cmp(&b.change))
    }
}

/// VIX regime and its one-line description.
pub fn vix_level(value: f64) -> (&'static str, &'static str) {
    if value < 12.0 {
        ("low", "Extreme complacency - markets are calm")
    } else if value < 20.0 {
        ("moderate", "Normal volatility - typical market conditions")
    } else if value < 25.0 {
        ("elevated", "Elevated fear - investors are cautious")
    } else if value < 35.0 {
        ("high", "High fear - significant market stress")
    } else {
        ("extreme", "Extreme fear - panic mode")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StockAnalysisRequest {
    pub us_market_change: f64,
    pub vix_level: f64,
    pub vix_status: String,
    pub top_sector: String,
    pub top_sector_change: f64,
    pub bottom_sector: String,
    pub bottom_sector_change: f64,
    pub global_indices: Vec<MarketIndex>,
}

#[derive(Debug, Clone, Default)]
pub struct StockDomain;

#[async_trait]
impl Domain for StockDomain {
    type Snapshot = StockSnapshot;
    type Request = StockAnalysisRequest;

    const KIND: AnalysisDomain = AnalysisDomain::Stocks;

    async fn fetch(&self, api: &ApiClient, _selection: Option<&str>) -> Result<StockSnapshot> {
        let url = api.endpoints().stocks_global();
        info!("Fetching global stock data from URL: {}", url);
        api.get_json(&url).await
    }

    fn mock_snapshot(&self, _selection: Option<&str>) -> StockSnapshot {
        let mut rng = rand::thread_rng();
        let mut around = |base: f64, range: f64| round2(base + rng.gen_range(-range / 2.0..range / 2.0));

        // (symbol, name, country, region, flag, price base, price spread, change base, market cap)
        let indices = [
            ("^GSPC", "S&P 500", "United States", "US", "🇺🇸", 5850.0, 100.0, 0.5, 45000.0),
            ("^IXIC", "NASDAQ", "United States", "US", "🇺🇸", 18500.0, 300.0, 0.7, 25000.0),
            ("^DJI", "Dow Jones", "United States", "US", "🇺🇸", 42500.0, 500.0, 0.3, 15000.0),
            ("^N225", "Nikkei 225", "Japan", "Asia", "🇯🇵", 38500.0, 500.0, -0.2, 6000.0),
            ("^KS11", "KOSPI", "South Korea", "Asia", "🇰🇷", 2650.0, 50.0, -0.5, 1800.0),
            ("^HSI", "Hang Seng", "Hong Kong", "Asia", "🇭🇰", 19500.0, 300.0, -0.8, 4500.0),
            ("^GDAXI", "DAX", "Germany", "EU", "🇩🇪", 19200.0, 200.0, 0.2, 2200.0),
            ("^FTSE", "FTSE 100", "United Kingdom", "EU", "🇬🇧", 8150.0, 100.0, 0.1, 2800.0),
        ];
        let global_indices: Vec<MarketIndex> = indices
            .iter()
            .map(|&(symbol, name, country, region, flag, price, spread, change, cap)| {
                let price = round2(price + around(spread / 2.0, spread));
                let change = around(change, 3.0);
                MarketIndex {
                    symbol: symbol.to_string(),
                    name: name.to_string(),
                    country: country.to_string(),
                    region: region.to_string(),
                    flag: flag.to_string(),
                    price,
                    change,
                    change_value: round2(price * change / 100.0),
                    market_cap: cap,
                }
            })
            .collect();

        // (sector, short name, change base, market cap, top stock)
        let sectors = [
            ("Information Technology", "Tech", 1.2, 14000.0, "NVDA"),
            ("Health Care", "Health", 0.3, 7500.0, "UNH"),
            ("Financials", "Finance", 0.4, 6800.0, "JPM"),
            ("Consumer Discretionary", "Consumer", 0.6, 5500.0, "AMZN"),
            ("Communication Services", "Comm", 0.8, 4800.0, "META"),
            ("Industrials", "Industrial", 0.2, 4500.0, "CAT"),
            ("Consumer Staples", "Staples", -0.1, 4000.0, "PG"),
            ("Energy", "Energy", -0.5, 2200.0, "XOM"),
            ("Utilities", "Utilities", -0.2, 1600.0, "NEE"),
            ("Real Estate", "Real Est", -0.4, 1400.0, "PLD"),
            ("Materials", "Materials", 0.1, 1200.0, "LIN"),
        ];
        let sectors = sectors
            .iter()
            .map(|&(sector, short_name, change, cap, top_stock)| SectorPerformance {
                sector: sector.to_string(),
                short_name: short_name.to_string(),
                change: around(change, 2.5),
                market_cap: cap,
                top_stock: top_stock.to_string(),
                top_stock_change: around(change * 1.5, 3.0),
            })
            .collect();

        let vix_value = round2(15.0 + around(10.0, 20.0));
        let (level, description) = vix_level(vix_value);
        let vix = Vix {
            value: vix_value,
            change: around(0.0, 4.0),
            level: level.to_string(),
            description: description.to_string(),
        };

        let snapshot = StockSnapshot {
            global_indices,
            sectors,
            vix,
            equity_flows: Vec::new(),
        };
        StockSnapshot {
            equity_flows: equity_flows(snapshot.us_market_change()),
            ..snapshot
        }
    }

    fn analysis_request(&self, snapshot: &StockSnapshot, _selection: Option<&str>) -> StockAnalysisRequest {
        let (top_sector, top_sector_change) = snapshot
            .top_sector()
            .map(|s| (s.sector.clone(), s.change))
            .unwrap_or_default();
        let (bottom_sector, bottom_sector_change) = snapshot
            .bottom_sector()
            .map(|s| (s.sector.clone(), s.change))
            .unwrap_or_default();

        StockAnalysisRequest {
            us_market_change: snapshot.us_market_change(),
            vix_level: snapshot.vix.value,
            vix_status: snapshot.vix.level.clone(),
            top_sector,
            top_sector_change,
            bottom_sector,
            bottom_sector_change,
            global_indices: snapshot.global_indices.clone(),
        }
    }
}

/// Money moves into US equities on up days and out of them on down days.
fn equity_flows(us_change: f64) -> Vec<EquityFlow> {
    let risk_on = us_change > 0.0;
    let flow = |other: &str, volume: f64, flow_type: &str| {
        let (from, to) = if risk_on { (other, "US") } else { ("US", other) };
        EquityFlow {
            from_region: from.to_string(),
            to_region: to.to_string(),
            volume,
            flow_type: flow_type.to_string(),
        }
    };
    vec![
        flow(
            "Bonds",
            round2(us_change.abs() / 5.0),
            if risk_on { "risk_on" } else { "risk_off" },
        ),
        flow("EU", 0.4, "rotation"),
        flow("Asia", 0.35, "rotation"),
    ]
}

// src/stores/whale.rs
use async_trait::async_trait;
use chrono::{Duration, Utc};
use log::info;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::AnalysisDomain;
use crate::services::api::ApiClient;
use crate::services::error::Result;

use super::Domain;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarSummary {
    pub total_signals: usize,
    pub bullish: usize,
    pub bearish: usize,
    pub sentiment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhaleAlert {
    /// `insider`, `cluster` or `guru`.
    pub alert_type: String,
    pub symbol: String,
    pub headline: String,
    pub description: String,
    pub signal: String,
    pub magnitude: String,
    pub timestamp: String,
    pub source: String,
    #[serde(default)]
    pub details: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarBlip {
    pub symbol: String,
    pub angle: f64,
    pub distance: f64,
    pub strength: f64,
    pub label: String,
    pub color: String,
    #[serde(rename = "type")]
    pub blip_type: String,
    pub signal: String,
    pub timestamp: String,
}

/// Body of `GET /api/whale/radar`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhaleSnapshot {
    pub timestamp: String,
    pub summary: RadarSummary,
    pub alerts: Vec<WhaleAlert>,
    #[serde(default)]
    pub clusters: Vec<WhaleAlert>,
    #[serde(default)]
    pub blips: Vec<RadarBlip>,
    #[serde(default)]
    pub ai_context: String,
}

impl WhaleSnapshot {
    /// Distinct symbols in alert order.
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = Vec::new();
        for alert in &self.alerts {
            if !symbols.contains(&alert.symbol) {
                symbols.push(alert.symbol.clone());
            }
        }
        symbols
    }

    pub fn insider_summary(&self) -> String {
        let insiders = self.alerts.iter().filter(|a| a.alert_type == "insider");
        let (buys, sells) = insiders.fold((0, 0), |(buys, sells), a| match a.signal.as_str() {
            "bullish" => (buys + 1, sells),
            "bearish" => (buys, sells + 1),
            _ => (buys, sells),
        });
        format!("{} insider buys, {} insider sells", buys, sells)
    }

    pub fn guru_activity(&self) -> String {
        let moves: Vec<&str> = self
            .alerts
            .iter()
            .filter(|a| a.alert_type == "guru")
            .map(|a| a.headline.as_str())
            .collect();
        if moves.is_empty() {
            "No notable guru portfolio changes".to_string()
        } else {
            moves.join("; ")
        }
    }

    pub fn cluster_detected(&self) -> bool {
        !self.clusters.is_empty() || self.alerts.iter().any(|a| a.alert_type == "cluster")
    }
}

pub fn summarize(alerts: &[WhaleAlert]) -> RadarSummary {
    let bullish = alerts.iter().filter(|a| a.signal == "bullish").count();
    let bearish = alerts.iter().filter(|a| a.signal == "bearish").count();
    let sentiment = if bullish > bearish {
        "bullish"
    } else if bearish > bullish {
        "bearish"
    } else {
        "neutral"
    };
    RadarSummary {
        total_signals: alerts.len(),
        bullish,
        bearish,
        sentiment: sentiment.to_string(),
    }
}

/// Spread up to 20 alerts evenly around the sonar; bigger moves sit closer
/// to the centre.
pub fn radar_blips(alerts: &[WhaleAlert]) -> Vec<RadarBlip> {
    let shown = alerts.len().min(20);
    alerts
        .iter()
        .take(shown)
        .enumerate()
        .map(|(i, alert)| {
            let magnitude = match alert.magnitude.as_str() {
                "massive" => 1.0,
                "large" => 0.8,
                "significant" => 0.6,
                "moderate" => 0.4,
                _ => 0.5,
            };
            let color = match alert.signal.as_str() {
                "bullish" => "#10b981",
                "bearish" => "#ef4444",
                _ => "#f59e0b",
            };
            RadarBlip {
                symbol: alert.symbol.clone(),
                angle: (i as f64 * 360.0 / shown.max(1) as f64) % 360.0,
                distance: 1.0 - magnitude * 0.6,
                strength: magnitude,
                label: alert.headline.clone(),
                color: color.to_string(),
                blip_type: alert.alert_type.clone(),
                signal: alert.signal.clone(),
                timestamp: alert.timestamp.clone(),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct WhaleAnalysisRequest {
    pub symbols: Vec<String>,
    pub insider_summary: String,
    pub guru_activity: String,
    pub cluster_detected: bool,
    pub overall_signal: String,
}

#[derive(Debug, Clone, Default)]
pub struct WhaleDomain;

#[async_trait]
impl Domain for WhaleDomain {
    type Snapshot = WhaleSnapshot;
    type Request = WhaleAnalysisRequest;

    const KIND: AnalysisDomain = AnalysisDomain::Whale;

    async fn fetch(&self, api: &ApiClient, _selection: Option<&str>) -> Result<WhaleSnapshot> {
        let url = api.endpoints().whale_radar();
        info!("Fetching whale radar from URL: {}", url);
        api.get_json(&url).await
    }

    fn mock_snapshot(&self, _selection: Option<&str>) -> WhaleSnapshot {
        let mut rng = rand::thread_rng();
        let now = Utc::now();

        // (symbol, insider, title, buy)
        let mut trades = vec![
            ("NVDA", "Jensen Huang", "CEO", false),
            ("AAPL", "Tim Cook", "CEO", false),
            ("JPM", "Jamie Dimon", "CEO", true),
            ("META", "Susan Li", "CFO", false),
            ("XOM", "Darren Woods", "CEO", true),
            ("PFE", "Albert Bourla", "CEO", true),
        ];
        trades.shuffle(&mut rng);

        let mut alerts: Vec<WhaleAlert> = trades
            .iter()
            .enumerate()
            .map(|(i, &(symbol, insider, title, buy))| {
                let value: f64 = rng.gen_range(500_000.0..25_000_000.0);
                let magnitude = if value >= 10_000_000.0 {
                    "massive"
                } else if value >= 5_000_000.0 {
                    "large"
                } else if value >= 1_000_000.0 {
                    "significant"
                } else {
                    "moderate"
                };
                WhaleAlert {
                    alert_type: "insider".to_string(),
                    symbol: symbol.to_string(),
                    headline: format!(
                        "{} {} {} ${:.0} of {}",
                        if buy { "🟢" } else { "🔴" },
                        insider,
                        if buy { "bought" } else { "sold" },
                        value,
                        symbol
                    ),
                    description: format!("{} {} executed a {} {}", title, insider, magnitude, if buy { "purchase" } else { "sale" }),
                    signal: if buy { "bullish" } else { "bearish" }.to_string(),
                    magnitude: magnitude.to_string(),
                    timestamp: (now - Duration::days(i as i64)).format("%Y-%m-%d").to_string(),
                    source: "SEC Form 4".to_string(),
                    details: Value::Null,
                }
            })
            .collect();

        let mut clusters = Vec::new();
        if rng.gen_bool(0.5) {
            let cluster = WhaleAlert {
                alert_type: "cluster".to_string(),
                symbol: "KRE".to_string(),
                headline: "🚨 CLUSTER BUY: 4 insiders acted on KRE".to_string(),
                description: "Regional bank directors collectively bought $3,200,000".to_string(),
                signal: "bullish".to_string(),
                magnitude: "large".to_string(),
                timestamp: now.format("%Y-%m-%d").to_string(),
                source: "SEC Form 4 Analysis".to_string(),
                details: Value::Null,
            };
            clusters.push(cluster.clone());
            alerts.push(cluster);
        }
        alerts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let summary = summarize(&alerts);
        let blips = radar_blips(&alerts);
        let ai_context = format!(
            "Signal Summary: {} bullish, {} bearish",
            summary.bullish, summary.bearish
        );

        WhaleSnapshot {
            timestamp: now.to_rfc3339(),
            summary,
            alerts,
            clusters,
            blips,
            ai_context,
        }
    }

    fn analysis_request(&self, snapshot: &WhaleSnapshot, _selection: Option<&str>) -> WhaleAnalysisRequest {
        WhaleAnalysisRequest {
            symbols: snapshot.symbols(),
            insider_summary: snapshot.insider_summary(),
            guru_activity: snapshot.guru_activity(),
            cluster_detected: snapshot.cluster_detected(),
            overall_signal: snapshot.summary.sentiment.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert(alert_type: &str, symbol: &str, signal: &str, magnitude: &str) -> WhaleAlert {
        WhaleAlert {
            alert_type: alert_type.to_string(),
            symbol: symbol.to_string(),
            headline: format!("{} {}", symbol, signal),
            description: String::new(),
            signal: signal.to_string(),
            magnitude: magnitude.to_string(),
            timestamp: "2024-05-01".to_string(),
            source: "SEC Form 4".to_string(),
            details: Value::Null,
        }
    }

    #[test]
    fn summary_counts_signals() {
        let alerts = vec![
            alert("insider", "NVDA", "bearish", "large"),
            alert("insider", "JPM", "bullish", "moderate"),
            alert("insider", "AAPL", "bearish", "massive"),
        ];
        let summary = summarize(&alerts);
        assert_eq!(summary.total_signals, 3);
        assert_eq!(summary.bearish, 2);
        assert_eq!(summary.sentiment, "bearish");
    }

    #[test]
    fn blips_scale_with_magnitude() {
        let alerts = vec![
            alert("insider", "NVDA", "bearish", "massive"),
            alert("cluster", "KRE", "bullish", "moderate"),
        ];
        let blips = radar_blips(&alerts);
        assert_eq!(blips[0].angle, 0.0);
        assert_eq!(blips[1].angle, 180.0);
        assert!(blips[0].distance < blips[1].distance);
        assert_eq!(blips[0].color, "#ef4444");
        assert_eq!(blips[1].blip_type, "cluster");
    }

    #[test]
    fn request_from_snapshot() {
        let alerts = vec![
            alert("insider", "NVDA", "bearish", "large"),
            alert("insider", "NVDA", "bullish", "large"),
            alert("cluster", "KRE", "bullish", "large"),
        ];
        let snapshot = WhaleSnapshot {
            timestamp: "2024-05-01T00:00:00".to_string(),
            summary: summarize(&alerts),
            clusters: Vec::new(),
            blips: radar_blips(&alerts),
            ai_context: String::new(),
            alerts,
        };

        let request = WhaleDomain.analysis_request(&snapshot, None);
        assert_eq!(request.symbols, vec!["NVDA", "KRE"]);
        assert_eq!(request.insider_summary, "1 insider buys, 1 insider sells");
        assert!(request.cluster_detected);
        assert_eq!(request.overall_signal, "bullish");
    }

    #[test]
    fn mock_radar_is_self_consistent() {
        let snapshot = WhaleDomain.mock_snapshot(None);
        assert_eq!(snapshot.summary.total_signals, snapshot.alerts.len());
        assert_eq!(snapshot.blips.len(), snapshot.alerts.len());
        assert_eq!(snapshot.cluster_detected(), !snapshot.clusters.is_empty());
    }
}

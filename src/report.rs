// src/report.rs
//! Plain-text rendering for the CLI: snapshot summaries and the board
//! meeting transcript.

use crate::models::{AnalysisResult, Persona};
use crate::services::format::{format_change, format_large_number};
use crate::stores::bonds::BondSnapshot;
use crate::stores::economy::EconomySnapshot;
use crate::stores::fx::FxSnapshot;
use crate::stores::institutional::InstitutionalSnapshot;
use crate::stores::policy::PolicySnapshot;
use crate::stores::stocks::StockSnapshot;
use crate::stores::whale::WhaleSnapshot;
use crate::stores::{AnalysisSource, StoreState};

const HEAVY_RULE_WIDTH: usize = 60;
const LIGHT_RULE_WIDTH: usize = 40;

/// One-line-per-fact summary of a market snapshot.
pub trait SnapshotSummary {
    fn summary_lines(&self) -> Vec<String>;
}

pub fn board_transcript(board: &[Persona], result: &AnalysisResult) -> String {
    let heavy = "=".repeat(HEAVY_RULE_WIDTH);
    let light = "-".repeat(LIGHT_RULE_WIDTH);

    let mut out = vec![
        heavy.clone(),
        "🏛️  THE AI BOARD OF DIRECTORS - MEETING TRANSCRIPT".to_string(),
        heavy.clone(),
        String::new(),
    ];

    for persona in board {
        // Boards only answer for their own members; skip empty seats.
        let Some(response) = result.response(*persona) else {
            continue;
        };
        out.push(format!(
            "{} {} ({} style):",
            persona.avatar(),
            persona.name(),
            persona.style()
        ));
        out.push(light.clone());
        out.push(response.to_string());
        out.push(String::new());
    }

    out.push(heavy.clone());
    out.push(result.synthesis.clone());
    out.push(heavy);
    out.join("\n")
}

/// Snapshot summary, data provenance and, when present, the transcript.
pub fn render_state<S: SnapshotSummary>(title: &str, board: &[Persona], state: &StoreState<S>) -> String {
    let mut out = vec![format!("== {} ==", title)];

    match &state.metrics {
        Some(metrics) => out.extend(metrics.summary_lines()),
        None => out.push("No data loaded".to_string()),
    }
    if state.used_mock_data {
        out.push("(backend unavailable, showing simulated data)".to_string());
    }
    if let Some(updated) = state.last_updated {
        out.push(format!("Last updated: {}", updated.format("%Y-%m-%d %H:%M:%S UTC")));
    }
    if let Some(error) = &state.error {
        out.push(format!("Error: {}", error));
    }

    if let Some(result) = &state.analysis {
        out.push(String::new());
        if state.analysis_source == Some(AnalysisSource::Cache) {
            out.push("(today's cached analysis)".to_string());
        }
        out.push(board_transcript(board, result));
    }

    out.join("\n")
}

impl SnapshotSummary for BondSnapshot {
    fn summary_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let (Some(y2), Some(y10), Some(spread)) = (self.yield_2y(), self.yield_10y(), self.spread()) {
            lines.push(format!("2Y {:.2}%  10Y {:.2}%  spread {:+.2}", y2, y10, spread));
            lines.push(if self.is_inverted() {
                "Yield curve is INVERTED".to_string()
            } else {
                "Yield curve is normal".to_string()
            });
        }
        if let Some(global) = &self.global {
            for bond in &global.global_bonds {
                lines.push(format!(
                    "{} {:<16} {:.2}%  vs US {:+.2}",
                    bond.flag, bond.country, bond.yield_10y, bond.spread_vs_us
                ));
            }
        }
        lines
    }
}

impl SnapshotSummary for FxSnapshot {
    fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "DXY {:.2} ({}) {}  sentiment {}",
            self.dollar_index.value,
            format_change(self.dollar_index.change_24h, true),
            self.dollar_index.trend,
            self.risk_sentiment
        )];
        lines.extend(
            self.major_pairs
                .iter()
                .map(|p| format!("{:<8} {:>10}  {}", p.pair, p.rate, format_change(p.change_24h, true))),
        );
        lines
    }
}

impl SnapshotSummary for StockSnapshot {
    fn summary_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .global_indices
            .iter()
            .map(|i| format!("{} {:<12} {:>10.2}  {}", i.flag, i.name, i.price, format_change(i.change, true)))
            .collect();
        lines.push(format!(
            "VIX {:.2} ({}): {}",
            self.vix.value, self.vix.level, self.vix.description
        ));
        if let (Some(top), Some(bottom)) = (self.top_sector(), self.bottom_sector()) {
            lines.push(format!(
                "Best sector {} {}, worst {} {}",
                top.sector,
                format_change(top.change, true),
                bottom.sector,
                format_change(bottom.change, true)
            ));
        }
        lines
    }
}

impl SnapshotSummary for PolicySnapshot {
    fn summary_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .central_banks
            .iter()
            .map(|b| {
                format!(
                    "{} {:<28} {:.2}%  real {:+.2}  {}",
                    b.flag,
                    b.bank,
                    b.current_rate,
                    b.computed_real_rate(),
                    b.status
                )
            })
            .collect();
        if let Some(next) = self.next_meeting() {
            lines.push(format!(
                "Next meeting: {} in {} days, expected {} ({}%)",
                next.bank, next.days_until, next.expected_action, next.market_probability
            ));
        }
        lines
    }
}

impl SnapshotSummary for EconomySnapshot {
    fn summary_lines(&self) -> Vec<String> {
        let c = &self.commodities;
        let mut lines: Vec<String> = [&c.oil, &c.gold, &c.copper]
            .iter()
            .map(|x| {
                format!(
                    "{:<7} {:>9.2} {}  1M {}  {}",
                    x.short_name,
                    x.price,
                    x.unit,
                    format_change(x.change_1m, true),
                    x.signal
                )
            })
            .collect();
        lines.push(format!("Commodities: {} - {}", c.overall_signal, c.interpretation));
        for pmi in &self.pmi_data {
            lines.push(format!(
                "{} PMI {:.1} ({})",
                pmi.flag,
                pmi.value,
                if pmi.is_expansion { "expansion" } else { "contraction" }
            ));
        }
        for cpi in &self.cpi_data {
            lines.push(format!("{} CPI {:.1}% (target {:.1}%)", cpi.flag, cpi.value, cpi.target_rate));
        }
        lines
    }
}

impl SnapshotSummary for InstitutionalSnapshot {
    fn summary_lines(&self) -> Vec<String> {
        let o = &self.outlook;
        let mut lines = vec![format!(
            "{} ({}) IMF sentiment: {}",
            o.country_name, o.country_code, o.sentiment
        )];
        if let Some(edition) = &o.weo_edition {
            lines.push(format!("WEO edition: {}", edition));
        }
        if let Some(gdp) = &o.gdp_growth {
            let path: Vec<String> = gdp.iter().map(|f| format!("{} {:.1}%", f.year, f.value)).collect();
            lines.push(format!("GDP growth: {}", path.join(", ")));
        }
        for risk in &o.key_risks {
            lines.push(format!("Risk: {}", risk));
        }
        if let Some(card) = &self.report_card {
            for r in &card.report_cards {
                lines.push(format!(
                    "{} {} ({}) {}",
                    r.sentiment_icon,
                    r.institution,
                    r.last_report_date,
                    r.key_keywords.join(" ")
                ));
            }
            lines.push(format!("Consensus: {}", card.consensus_view));
        }
        lines
    }
}

impl SnapshotSummary for WhaleSnapshot {
    fn summary_lines(&self) -> Vec<String> {
        let s = &self.summary;
        let mut lines = vec![format!(
            "{} signals: {} bullish, {} bearish ({})",
            s.total_signals, s.bullish, s.bearish, s.sentiment
        )];
        for alert in self.alerts.iter().take(5) {
            lines.push(format!("[{}] {}", alert.symbol, alert.headline));
        }
        lines
    }
}

/// `$1.25T` style total for the equity market caps (given in billions).
pub fn total_market_cap(snapshot: &StockSnapshot) -> String {
    let billions: f64 = snapshot.global_indices.iter().map(|i| i.market_cap).sum();
    format_large_number(billions * 1e9)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnalysisDomain;
    use crate::stores::fx::FxDomain;
    use crate::stores::Domain;

    fn result() -> AnalysisResult {
        AnalysisResult {
            soros_response: Some("The yen trade is crowded.".to_string()),
            dalio_response: Some("Late in the debt cycle.".to_string()),
            synthesis: "Hedge currency exposure.".to_string(),
            ..AnalysisResult::default()
        }
    }

    #[test]
    fn transcript_lists_board_members_in_order() {
        let text = board_transcript(AnalysisDomain::Institutional.board(), &result());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "=".repeat(60));
        assert!(lines[1].contains("THE AI BOARD OF DIRECTORS"));
        assert_eq!(lines[4], "🦁 The Macro Predator (George Soros style):");
        assert_eq!(lines[5], "-".repeat(40));
        assert!(text.contains("⚙️ The Machine Thinker (Ray Dalio style):"));
        assert!(text.find("Soros").unwrap() < text.find("Dalio").unwrap());
        assert_eq!(lines[lines.len() - 2], "Hedge currency exposure.");
    }

    #[test]
    fn transcript_skips_silent_personas() {
        let text = board_transcript(AnalysisDomain::Bonds.board(), &result());
        assert!(!text.contains("Value Oracle"));
        assert!(text.contains("Machine Thinker"));
    }

    #[test]
    fn render_state_flags_mock_data() {
        let domain = FxDomain;
        let state = StoreState {
            metrics: Some(domain.mock_snapshot(None)),
            is_loading: false,
            used_mock_data: true,
            last_updated: None,
            error: None,
            is_analyzing: false,
            analysis: Some(result()),
            analysis_source: Some(AnalysisSource::Cache),
            analysis_language: None,
            current_persona: None,
            selection: None,
        };
        let text = render_state("FX", AnalysisDomain::Fx.board(), &state);
        assert!(text.starts_with("== FX =="));
        assert!(text.contains("USD/JPY"));
        assert!(text.contains("simulated data"));
        assert!(text.contains("cached analysis"));
    }
}

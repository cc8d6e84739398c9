// src/services/endpoints.rs
use reqwest::Url;

use crate::models::AnalysisDomain;

/// URL builders for the dashboard backend. Market data and analysis can be
/// served from different hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    api_base: String,
    analysis_base: String,
}

impl Endpoints {
    pub fn new(api_base: &str, analysis_base: &str) -> Self {
        Endpoints {
            api_base: api_base.trim_end_matches('/').to_string(),
            analysis_base: analysis_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn single(base: &str) -> Self {
        Self::new(base, base)
    }

    fn api(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn analysis(&self, path: &str) -> String {
        format!("{}{}", self.analysis_base, path)
    }

    pub fn health(&self) -> String {
        self.api("/health")
    }

    pub fn debate(&self) -> String {
        self.analysis("/api/debate")
    }

    // Bonds
    pub fn bonds_yields(&self) -> String {
        self.api("/api/bonds/yields")
    }

    pub fn bonds_global(&self) -> String {
        self.api("/api/bonds/global")
    }

    // FX
    pub fn fx_data(&self) -> String {
        self.api("/api/fx/data")
    }

    // Stocks
    pub fn stocks_global(&self) -> String {
        self.api("/api/stocks/global")
    }

    // Policy
    pub fn policy_global(&self) -> String {
        self.api("/api/policy/global")
    }

    // Economy
    pub fn economy_data(&self) -> String {
        self.api("/api/economy/data")
    }

    pub fn country(&self, country_code: &str) -> String {
        self.api(&format!("/api/country/{}", country_code.to_uppercase()))
    }

    pub fn macro_health_check(&self) -> String {
        self.api("/api/macro/health-check")
    }

    pub fn history_crises(&self) -> String {
        self.api("/api/history/crises")
    }

    // Institutional
    pub fn institutional_imf(&self, country_code: &str) -> String {
        self.api(&format!("/api/institutional/imf/{}", country_code.to_uppercase()))
    }

    pub fn institutional_report_card(&self, country_code: &str) -> String {
        self.api(&format!(
            "/api/institutional/report-card/{}",
            country_code.to_uppercase()
        ))
    }

    pub fn institutional_ai_context(&self, country_code: &str) -> String {
        self.api(&format!(
            "/api/institutional/ai-context/{}",
            country_code.to_uppercase()
        ))
    }

    // Whale tracking
    pub fn whale_radar(&self) -> String {
        self.api("/api/whale/radar")
    }

    pub fn whale_insider(&self, symbol: Option<&str>) -> String {
        match symbol {
            Some(symbol) => self.api(&format!("/api/whale/insider/{}", symbol.to_uppercase())),
            None => self.api("/api/whale/insider"),
        }
    }

    pub fn whale_cluster(&self, symbol: &str) -> String {
        self.api(&format!("/api/whale/cluster/{}", symbol.to_uppercase()))
    }

    pub fn whale_guru(&self, guru_id: Option<&str>) -> String {
        match guru_id {
            Some(id) => self.api(&format!("/api/whale/guru/{}", id)),
            None => self.api("/api/whale/guru"),
        }
    }

    pub fn whale_consensus(&self) -> String {
        self.api("/api/whale/consensus")
    }

    pub fn whale_put_call_ratio(&self) -> String {
        self.api("/api/whale/put-call-ratio")
    }

    pub fn whale_alerts(&self) -> String {
        self.api("/api/whale/alerts")
    }

    // Analysis
    pub fn analyze(&self, domain: AnalysisDomain) -> String {
        self.analysis(&format!("/api/analyze/{}", domain.path()))
    }

    /// Daily cache lookup. Query values are form-encoded, so `USD/JPY`
    /// becomes `USD%2FJPY`.
    pub fn analysis_cached(&self, domain: AnalysisDomain, query: &[(&str, &str)]) -> String {
        let url = self.analysis(&format!("/api/analyze/{}/cached", domain.path()));
        if query.is_empty() {
            return url;
        }
        match Url::parse_with_params(&url, query) {
            Ok(parsed) => parsed.to_string(),
            Err(_) => {
                let pairs: Vec<String> = query.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
                format!("{}?{}", url, pairs.join("&"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoints() -> Endpoints {
        Endpoints::single("http://localhost:8000")
    }

    #[test]
    fn static_endpoints() {
        let e = endpoints();
        assert_eq!(e.health(), "http://localhost:8000/health");
        assert_eq!(e.bonds_yields(), "http://localhost:8000/api/bonds/yields");
        assert_eq!(e.bonds_global(), "http://localhost:8000/api/bonds/global");
        assert_eq!(e.fx_data(), "http://localhost:8000/api/fx/data");
        assert_eq!(e.stocks_global(), "http://localhost:8000/api/stocks/global");
        assert_eq!(e.policy_global(), "http://localhost:8000/api/policy/global");
        assert_eq!(e.economy_data(), "http://localhost:8000/api/economy/data");
        assert_eq!(e.whale_radar(), "http://localhost:8000/api/whale/radar");
        assert_eq!(e.whale_put_call_ratio(), "http://localhost:8000/api/whale/put-call-ratio");
        assert_eq!(e.debate(), "http://localhost:8000/api/debate");
    }

    #[test]
    fn parameterized_endpoints() {
        let e = endpoints();
        assert_eq!(e.country("kr"), "http://localhost:8000/api/country/KR");
        assert_eq!(e.whale_guru(Some("buffett")), "http://localhost:8000/api/whale/guru/buffett");
        assert_eq!(e.whale_guru(None), "http://localhost:8000/api/whale/guru");
        assert_eq!(e.whale_insider(Some("aapl")), "http://localhost:8000/api/whale/insider/AAPL");
        assert_eq!(e.whale_cluster("NVDA"), "http://localhost:8000/api/whale/cluster/NVDA");
        assert_eq!(
            e.institutional_report_card("jp"),
            "http://localhost:8000/api/institutional/report-card/JP"
        );
    }

    #[test]
    fn analysis_endpoints_use_analysis_host() {
        let e = Endpoints::new("http://localhost:8000/", "http://localhost:8001");
        assert_eq!(e.analyze(AnalysisDomain::Policy), "http://localhost:8001/api/analyze/policy");
        assert_eq!(
            e.analysis_cached(AnalysisDomain::Bonds, &[("language", "ko")]),
            "http://localhost:8001/api/analyze/bonds/cached?language=ko"
        );
        assert_eq!(e.fx_data(), "http://localhost:8000/api/fx/data");
    }

    #[test]
    fn cache_query_is_encoded() {
        let url = endpoints().analysis_cached(
            AnalysisDomain::Fx,
            &[("language", "en"), ("selected_pair", "USD/JPY")],
        );
        assert_eq!(
            url,
            "http://localhost:8000/api/analyze/fx/cached?language=en&selected_pair=USD%2FJPY"
        );
    }
}

// src/stores/institutional.rs
use async_trait::async_trait;
use chrono::{Datelike, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::models::AnalysisDomain;
use crate::services::api::ApiClient;
use crate::services::error::Result;

use super::Domain;

pub const DEFAULT_COUNTRY: &str = "US";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub year: i32,
    pub value: f64,
    pub is_forecast: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImfOutlook {
    pub country_code: String,
    pub country_name: String,
    #[serde(default)]
    pub weo_edition: Option<String>,
    #[serde(default)]
    pub gdp_growth: Option<Vec<Forecast>>,
    #[serde(default)]
    pub inflation: Option<Vec<Forecast>>,
    #[serde(default)]
    pub government_debt: Option<Vec<Forecast>>,
    #[serde(default)]
    pub current_account: Option<Vec<Forecast>>,
    pub sentiment: String,
    #[serde(default)]
    pub key_risks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportCard {
    pub institution: String,
    pub last_report_date: String,
    pub key_keywords: Vec<String>,
    pub sentiment: String,
    pub sentiment_icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalReportCard {
    pub country_code: String,
    pub country_name: String,
    pub report_cards: Vec<ReportCard>,
    pub consensus_view: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstitutionalSnapshot {
    pub outlook: ImfOutlook,
    pub report_card: Option<GlobalReportCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstitutionalAnalysisRequest {
    pub country_code: String,
    pub country_name: String,
    pub imf_sentiment: String,
    pub key_risks: Vec<String>,
}

/// IMF outlook and the aggregated report card for one country. The
/// selection is an ISO country code.
#[derive(Debug, Clone, Default)]
pub struct InstitutionalDomain;

#[async_trait]
impl Domain for InstitutionalDomain {
    type Snapshot = InstitutionalSnapshot;
    type Request = InstitutionalAnalysisRequest;

    const KIND: AnalysisDomain = AnalysisDomain::Institutional;

    fn default_selection(&self) -> Option<String> {
        Some(DEFAULT_COUNTRY.to_string())
    }

    fn snapshot_depends_on_selection(&self) -> bool {
        true
    }

    async fn fetch(&self, api: &ApiClient, selection: Option<&str>) -> Result<InstitutionalSnapshot> {
        let code = selection.unwrap_or(DEFAULT_COUNTRY);
        let url = api.endpoints().institutional_imf(code);
        info!("Fetching IMF outlook from URL: {}", url);
        let outlook: ImfOutlook = api.get_json(&url).await?;

        let report_card = match api
            .get_json::<GlobalReportCard>(&api.endpoints().institutional_report_card(code))
            .await
        {
            Ok(card) => Some(card),
            Err(e) => {
                warn!("Report card for {} unavailable: {}", code, e);
                None
            }
        };

        Ok(InstitutionalSnapshot {
            outlook,
            report_card,
        })
    }

    fn mock_snapshot(&self, selection: Option<&str>) -> InstitutionalSnapshot {
        let code = selection.unwrap_or(DEFAULT_COUNTRY).to_uppercase();
        let outlook = mock_outlook(&code);
        let report_card = report_card_for(&outlook);
        InstitutionalSnapshot {
            outlook,
            report_card: Some(report_card),
        }
    }

    fn cache_query(&self, selection: Option<&str>) -> Vec<(&'static str, String)> {
        vec![(
            "country_code",
            selection.unwrap_or(DEFAULT_COUNTRY).to_uppercase(),
        )]
    }

    fn analysis_request(
        &self,
        snapshot: &InstitutionalSnapshot,
        selection: Option<&str>,
    ) -> InstitutionalAnalysisRequest {
        InstitutionalAnalysisRequest {
            country_code: selection.unwrap_or(DEFAULT_COUNTRY).to_uppercase(),
            country_name: snapshot.outlook.country_name.clone(),
            imf_sentiment: snapshot.outlook.sentiment.clone(),
            key_risks: snapshot.outlook.key_risks.clone(),
        }
    }
}

struct CountryOutlook {
    name: &'static str,
    gdp: [f64; 5],
    inflation: [f64; 5],
    debt: [f64; 5],
    current_account: [f64; 5],
}

const US_OUTLOOK: CountryOutlook = CountryOutlook {
    name: "United States",
    gdp: [2.5, 2.8, 1.9, 2.1, 2.0],
    inflation: [2.9, 2.4, 2.1, 2.0, 2.0],
    debt: [123.0, 125.0, 127.0, 128.0, 129.0],
    current_account: [-3.0, -3.1, -2.9, -2.8, -2.7],
};

fn country_outlook(code: &str) -> Option<CountryOutlook> {
    let outlook = match code {
        "US" => US_OUTLOOK,
        "KR" => CountryOutlook {
            name: "South Korea",
            gdp: [2.2, 2.5, 2.3, 2.4, 2.5],
            inflation: [2.6, 2.2, 2.0, 2.0, 2.0],
            debt: [54.0, 55.0, 56.0, 57.0, 58.0],
            current_account: [2.0, 2.5, 2.8, 3.0, 3.1],
        },
        "JP" => CountryOutlook {
            name: "Japan",
            gdp: [0.9, 1.0, 0.8, 0.7, 0.6],
            inflation: [2.2, 2.0, 1.8, 1.8, 1.7],
            debt: [255.0, 252.0, 250.0, 248.0, 246.0],
            current_account: [3.8, 4.0, 4.1, 4.0, 3.9],
        },
        "CN" => CountryOutlook {
            name: "China",
            gdp: [4.6, 4.5, 4.3, 4.1, 3.9],
            inflation: [1.0, 1.5, 1.8, 2.0, 2.0],
            debt: [88.0, 92.0, 95.0, 98.0, 101.0],
            current_account: [1.3, 1.1, 0.9, 0.7, 0.5],
        },
        "DE" => CountryOutlook {
            name: "Germany",
            gdp: [0.2, 1.3, 1.5, 1.4, 1.3],
            inflation: [2.4, 2.1, 2.0, 2.0, 2.0],
            debt: [64.0, 62.0, 61.0, 60.0, 59.0],
            current_account: [6.5, 6.2, 6.0, 5.8, 5.6],
        },
        "GB" => CountryOutlook {
            name: "United Kingdom",
            gdp: [0.5, 1.5, 1.6, 1.5, 1.4],
            inflation: [2.5, 2.2, 2.0, 2.0, 2.0],
            debt: [104.0, 105.0, 106.0, 106.0, 105.0],
            current_account: [-3.2, -3.0, -2.8, -2.7, -2.6],
        },
        _ => return None,
    };
    Some(outlook)
}

fn series(values: &[f64; 5], current_year: i32) -> Vec<Forecast> {
    values
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            let year = current_year - 1 + i as i32;
            Forecast {
                year,
                value,
                is_forecast: year >= current_year,
            }
        })
        .collect()
}

/// Bullish when next year's growth forecast beats this year's, bearish when
/// it drops by more than 0.3pp.
pub fn growth_sentiment(gdp: &[Forecast]) -> &'static str {
    let forecasts: Vec<f64> = gdp.iter().filter(|f| f.is_forecast).map(|f| f.value).collect();
    match forecasts.as_slice() {
        [this_year, next_year, ..] if next_year > this_year => "bullish",
        [this_year, next_year, ..] if *next_year < this_year - 0.3 => "bearish",
        _ => "neutral",
    }
}

pub fn key_risks(debt: &[Forecast], current_account: &[Forecast]) -> Vec<String> {
    let mut risks = Vec::new();
    if let Some(last) = debt.last().filter(|f| f.value > 100.0) {
        risks.push(format!("High govt debt ({:.0}% of GDP)", last.value));
    }
    if let Some(last) = current_account.last().filter(|f| f.value < -4.0) {
        risks.push(format!("Large C/A deficit ({:.1}%)", last.value));
    }
    risks
}

fn mock_outlook(code: &str) -> ImfOutlook {
    let year = Utc::now().year();
    // Countries without a table borrow the US path under their own code.
    let (country_name, data) = match country_outlook(code) {
        Some(data) => (data.name.to_string(), data),
        None => (code.to_string(), US_OUTLOOK),
    };

    let gdp_growth = series(&data.gdp, year);
    let government_debt = series(&data.debt, year);
    let current_account = series(&data.current_account, year);

    ImfOutlook {
        country_code: code.to_string(),
        country_name,
        weo_edition: Some(format!("October {}", year)),
        sentiment: growth_sentiment(&gdp_growth).to_string(),
        key_risks: key_risks(&government_debt, &current_account),
        gdp_growth: Some(gdp_growth),
        inflation: Some(series(&data.inflation, year)),
        government_debt: Some(government_debt),
        current_account: Some(current_account),
    }
}

fn sentiment_icon(sentiment: &str) -> &'static str {
    match sentiment {
        "bearish" => "🐻",
        "bullish" => "🐂",
        _ => "➖",
    }
}

/// IMF, OECD and Moody's views, with the consensus as a simple majority.
fn report_card_for(outlook: &ImfOutlook) -> GlobalReportCard {
    let year = Utc::now().year();

    let mut imf_keywords = Vec::new();
    if let Some(last) = outlook.gdp_growth.as_ref().and_then(|g| g.last()) {
        let tag = if last.value < 1.5 {
            "#SlowGrowth"
        } else if last.value > 3.0 {
            "#StrongGrowth"
        } else {
            "#ModerateGrowth"
        };
        imf_keywords.push(tag.to_string());
    }
    imf_keywords.extend(
        outlook
            .key_risks
            .iter()
            .take(2)
            .filter_map(|r| r.split_whitespace().next())
            .map(|word| format!("#{}", word)),
    );
    imf_keywords.truncate(3);
    if imf_keywords.is_empty() {
        imf_keywords.push("#Stable".to_string());
    }

    let card = |institution: &str, month: u32, keywords: Vec<String>, sentiment: &str| ReportCard {
        institution: institution.to_string(),
        last_report_date: format!("{}.{}", year, month),
        key_keywords: keywords,
        sentiment: sentiment.to_string(),
        sentiment_icon: sentiment_icon(sentiment).to_string(),
    };
    let report_cards = vec![
        card("IMF", 10, imf_keywords, &outlook.sentiment),
        card("OECD", 11, vec!["#Recovery".to_string(), "#Reform".to_string()], "neutral"),
        card("Moody's", 12, vec!["#CreditStable".to_string()], "neutral"),
    ];

    let bullish = report_cards.iter().filter(|c| c.sentiment == "bullish").count();
    let bearish = report_cards.iter().filter(|c| c.sentiment == "bearish").count();
    let consensus_view = if bullish > bearish {
        "bullish"
    } else if bearish > bullish {
        "bearish"
    } else {
        "mixed"
    };

    GlobalReportCard {
        country_code: outlook.country_code.clone(),
        country_name: outlook.country_name.clone(),
        report_cards,
        consensus_view: consensus_view.to_string(),
    }
}

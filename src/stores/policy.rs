// src/stores/policy.rs
use async_trait::async_trait;
use chrono::{Duration, Utc};
use log::info;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::AnalysisDomain;
use crate::services::api::ApiClient;
use crate::services::error::Result;
use crate::services::format::{real_rate, round2};

use super::Domain;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentralBank {
    pub country: String,
    pub code: String,
    pub flag: String,
    pub bank: String,
    pub current_rate: f64,
    pub previous_rate: f64,
    pub inflation_rate: f64,
    pub real_rate: f64,
    /// `hiking`, `paused`, `cutting` or `low`.
    pub status: String,
    pub cycle_position: i32,
    pub last_change: String,
    pub last_meeting_date: String,
    pub next_meeting_date: String,
}

impl CentralBank {
    pub fn computed_real_rate(&self) -> f64 {
        real_rate(self.current_rate, self.inflation_rate)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingMeeting {
    pub country: String,
    pub flag: String,
    pub bank: String,
    pub date: String,
    pub days_until: i64,
    pub expected_action: String,
    pub market_probability: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicySnapshot {
    pub central_banks: Vec<CentralBank>,
    pub upcoming_meetings: Vec<UpcomingMeeting>,
}

impl PolicySnapshot {
    /// Overwrite the backend's real rates with policy rate minus inflation.
    pub fn recompute_real_rates(&mut self) {
        for bank in &mut self.central_banks {
            bank.real_rate = bank.computed_real_rate();
        }
    }

    pub fn bank(&self, code: &str) -> Option<&CentralBank> {
        self.central_banks
            .iter()
            .find(|b| b.code.eq_ignore_ascii_case(code))
    }

    pub fn count_status(&self, status: &str) -> usize {
        self.central_banks.iter().filter(|b| b.status == status).count()
    }

    pub fn next_meeting(&self) -> Option<&UpcomingMeeting> {
        self.upcoming_meetings.iter().min_by_key(|m| m.days_until)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PolicyAnalysisRequest {
    pub us_rate: f64,
    pub us_real_rate: f64,
    pub us_status: String,
    pub hiking_count: usize,
    pub cutting_count: usize,
    pub next_meeting_country: String,
    pub next_meeting_days: i64,
}

#[derive(Debug, Clone, Default)]
pub struct PolicyDomain;

#[async_trait]
impl Domain for PolicyDomain {
    type Snapshot = PolicySnapshot;
    type Request = PolicyAnalysisRequest;

    const KIND: AnalysisDomain = AnalysisDomain::Policy;

    async fn fetch(&self, api: &ApiClient, _selection: Option<&str>) -> Result<PolicySnapshot> {
        let url = api.endpoints().policy_global();
        info!("Fetching central bank policy data from URL: {}", url);
        let mut snapshot: PolicySnapshot = api.get_json(&url).await?;
        snapshot.recompute_real_rates();
        Ok(snapshot)
    }

    fn mock_snapshot(&self, _selection: Option<&str>) -> PolicySnapshot {
        let mut rng = rand::thread_rng();
        let today = Utc::now();

        // (country, code, flag, bank, rate, previous, inflation, status, cycle, last change, last meeting, days ahead)
        let banks = [
            ("United States", "US", "🇺🇸", "Federal Reserve (Fed)", 5.50, 5.50, 3.4, "paused", 75, "0.00%", "2024-01-31", 15..=45),
            ("European Union", "EU", "🇪🇺", "European Central Bank (ECB)", 4.50, 4.50, 2.8, "paused", 70, "0.00%", "2024-01-25", 10..=35),
            ("Japan", "JP", "🇯🇵", "Bank of Japan (BOJ)", 0.10, -0.10, 2.6, "hiking", 15, "+0.20%", "2024-01-23", 20..=50),
            ("United Kingdom", "GB", "🇬🇧", "Bank of England (BOE)", 5.25, 5.25, 4.0, "paused", 72, "0.00%", "2024-02-08", 18..=45),
        ];

        let mut central_banks = Vec::with_capacity(banks.len());
        let mut upcoming_meetings = Vec::with_capacity(banks.len());
        for (country, code, flag, bank, rate, previous, inflation, status, cycle, last_change, last_meeting, ahead) in banks {
            let current_rate = round2(rate + rng.gen_range(-0.05..0.05));
            let inflation_rate = round2(inflation + rng.gen_range(-0.1..0.1));
            let days_until: i64 = rng.gen_range(ahead);
            let next_meeting_date = (today + Duration::days(days_until)).format("%Y-%m-%d").to_string();

            let real = real_rate(current_rate, inflation_rate);
            let (expected_action, market_probability) = expected_action(status, real);
            upcoming_meetings.push(UpcomingMeeting {
                country: country.to_string(),
                flag: flag.to_string(),
                bank: bank.to_string(),
                date: next_meeting_date.clone(),
                days_until,
                expected_action: expected_action.to_string(),
                market_probability,
            });
            central_banks.push(CentralBank {
                country: country.to_string(),
                code: code.to_string(),
                flag: flag.to_string(),
                bank: bank.to_string(),
                current_rate,
                previous_rate: previous,
                inflation_rate,
                real_rate: real,
                status: status.to_string(),
                cycle_position: cycle,
                last_change: last_change.to_string(),
                last_meeting_date: last_meeting.to_string(),
                next_meeting_date,
            });
        }
        upcoming_meetings.sort_by_key(|m| m.days_until);

        PolicySnapshot {
            central_banks,
            upcoming_meetings,
        }
    }

    fn analysis_request(&self, snapshot: &PolicySnapshot, _selection: Option<&str>) -> PolicyAnalysisRequest {
        let us = snapshot.bank("US");
        let (next_meeting_country, next_meeting_days) = snapshot
            .next_meeting()
            .map(|m| (m.country.clone(), m.days_until))
            .unwrap_or_default();

        PolicyAnalysisRequest {
            us_rate: us.map(|b| b.current_rate).unwrap_or_default(),
            us_real_rate: us.map(CentralBank::computed_real_rate).unwrap_or_default(),
            us_status: us.map(|b| b.status.clone()).unwrap_or_else(|| "paused".to_string()),
            hiking_count: snapshot.count_status("hiking"),
            cutting_count: snapshot.count_status("cutting"),
            next_meeting_country,
            next_meeting_days,
        }
    }
}

/// Market-implied action for the next meeting and its probability.
pub fn expected_action(status: &str, real_rate: f64) -> (&'static str, i32) {
    match status {
        "cutting" => ("cut", 70),
        "hiking" => ("hike", 60),
        _ if real_rate < 0.0 => ("hike", 55),
        _ if real_rate > 2.0 => ("uncertain", 45),
        _ => ("hold", 85),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_rates_are_recomputed() {
        let mut snapshot = PolicyDomain.mock_snapshot(None);
        snapshot.central_banks[0].real_rate = 99.0;
        snapshot.recompute_real_rates();
        for bank in &snapshot.central_banks {
            assert_eq!(bank.real_rate, real_rate(bank.current_rate, bank.inflation_rate));
        }
    }

    #[test]
    fn meetings_sorted_and_request_counts() {
        let snapshot = PolicyDomain.mock_snapshot(None);
        let days: Vec<i64> = snapshot.upcoming_meetings.iter().map(|m| m.days_until).collect();
        let mut sorted = days.clone();
        sorted.sort();
        assert_eq!(days, sorted);

        let request = PolicyDomain.analysis_request(&snapshot, None);
        assert_eq!(request.hiking_count, 1);
        assert_eq!(request.cutting_count, 0);
        assert_eq!(request.us_status, "paused");
        assert_eq!(request.next_meeting_days, days[0]);
        assert!((5.45..=5.55).contains(&request.us_rate));
    }

    #[test]
    fn expected_actions() {
        assert_eq!(expected_action("cutting", 1.0), ("cut", 70));
        assert_eq!(expected_action("paused", -0.5), ("hike", 55));
        assert_eq!(expected_action("paused", 2.5), ("uncertain", 45));
        assert_eq!(expected_action("paused", 1.0), ("hold", 85));
    }
}

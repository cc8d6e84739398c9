// src/bin/check_backend.rs
use anyhow::Result;
use dotenv::dotenv;
use log::{error, info, warn};

use insight_flow_client::config::Settings;
use insight_flow_client::models::{AnalysisDomain, CachedAnalysis};
use insight_flow_client::services::api::ApiClient;
use insight_flow_client::services::error::ClientError;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    let settings = Settings::load()?;
    let api = ApiClient::new(&settings)?;
    let language = settings.default_language;

    info!("Checking backend at {}", settings.api_base_url);
    match api.health().await {
        Ok(health) => info!("Health check OK: {}", health.status),
        Err(e) => {
            error!("Health check failed: {}", e);
            return Err(e.into());
        }
    }

    let mut cached = 0;
    for domain in AnalysisDomain::ALL {
        let url = api
            .endpoints()
            .analysis_cached(domain, &[("language", language.code())]);
        match api.get_json::<CachedAnalysis>(&url).await {
            Ok(CachedAnalysis { cached: true, .. }) => {
                cached += 1;
                info!("{}: today's {} analysis is cached", domain, language);
            }
            Ok(_) => info!("{}: reachable, nothing cached yet", domain),
            // Some domains only cache through their POST endpoint.
            Err(ClientError::Http { status: 404, .. }) => {
                warn!("{}: no cache endpoint on this backend", domain)
            }
            Err(e) => error!("{}: cache check failed: {}", domain, e),
        }
    }

    info!(
        "{} of {} domains have a cached {} analysis",
        cached,
        AnalysisDomain::ALL.len(),
        language
    );
    Ok(())
}

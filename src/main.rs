// src/main.rs
use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use dotenv::dotenv;
use log::{info, warn};
use std::env;

use insight_flow_client::config::Settings;
use insight_flow_client::models::{Language, LEGENDS};
use insight_flow_client::report::{board_transcript, render_state, total_market_cap, SnapshotSummary};
use insight_flow_client::services::api::ApiClient;
use insight_flow_client::stores::bonds::BondDomain;
use insight_flow_client::stores::economy::EconomyDomain;
use insight_flow_client::stores::fx::{FxDomain, DEFAULT_PAIR};
use insight_flow_client::stores::institutional::{InstitutionalDomain, DEFAULT_COUNTRY};
use insight_flow_client::stores::policy::PolicyDomain;
use insight_flow_client::stores::stocks::StockDomain;
use insight_flow_client::stores::whale::WhaleDomain;
use insight_flow_client::stores::{spawn_store, Domain, StoreSettings, StoreState};
use insight_flow_client::trigger::AnalysisTrigger;

const DEFAULT_SCENARIO: &str = "\
## Current Market Situation: The Strong Dollar Dilemma (January 2026)

**Key Data Points:**
- USD/JPY at 158 (near 40-year highs)
- US 10Y Treasury yield at 4.8%
- S&P 500 at all-time highs (6,200)
- Bitcoin at $105,000 (post-ETF rally)
- Fed signaling \"higher for longer\" rates
- BOJ still maintaining ultra-low rates despite currency pressure

**The Question:**
Capital is flowing massively from Asia (especially Japan) into US assets.
Is this a sustainable trend or a crowded trade about to reverse?
What should an investor do with their portfolio right now?
";

#[derive(Parser)]
#[command(name = "insight-flow")]
#[command(version, about = "Insight Flow dashboard client", long_about = None)]
struct Cli {
    /// Market data backend (overrides API_BASE_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Analysis backend (overrides ANALYSIS_BASE_URL)
    #[arg(long, global = true)]
    analysis_url: Option<String>,

    /// Report backend failures instead of showing simulated data
    #[arg(long, global = true)]
    no_mock: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Clone)]
struct AnalysisArgs {
    /// Ask the board for an analysis after loading the data
    #[arg(long)]
    analyze: bool,

    /// Analysis language (en, ko, zh, ja); defaults to DEFAULT_LANGUAGE
    #[arg(long)]
    lang: Option<Language>,
}

#[derive(Subcommand)]
enum Command {
    /// Treasury yield curve and global 10Y yields
    Bonds {
        #[command(flatten)]
        args: AnalysisArgs,
    },
    /// Dollar index and major currency pairs
    Fx {
        /// Pair the analysis focuses on
        #[arg(long, default_value = DEFAULT_PAIR)]
        pair: String,
        #[command(flatten)]
        args: AnalysisArgs,
    },
    /// Global indices, sectors and VIX
    Stocks {
        #[command(flatten)]
        args: AnalysisArgs,
    },
    /// Central bank rates and upcoming meetings
    Policy {
        #[command(flatten)]
        args: AnalysisArgs,
    },
    /// Commodities, PMI and CPI
    Economy {
        #[command(flatten)]
        args: AnalysisArgs,
    },
    /// IMF outlook and institutional report card for a country
    Institutional {
        /// ISO country code
        #[arg(long, default_value = DEFAULT_COUNTRY)]
        country: String,
        #[command(flatten)]
        args: AnalysisArgs,
    },
    /// Insider and smart-money radar
    Whale {
        #[command(flatten)]
        args: AnalysisArgs,
    },
    /// Convene the board on a free-form scenario
    Debate {
        #[arg(long)]
        scenario: Option<String>,
    },
    /// Check that the backend is up
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();
    info!("Logger initialized. Starting insight-flow...");

    let cli = Cli::parse();
    let settings = apply_overrides(Settings::load()?, &cli)?;
    info!("Using backend {} (analysis at {})", settings.api_base_url, settings.analysis_base_url);

    let api = ApiClient::new(&settings)?;

    match cli.command {
        Command::Bonds { args } => {
            run_domain(BondDomain, &api, &settings, None, &args).await?;
        }
        Command::Fx { pair, args } => {
            run_domain(FxDomain, &api, &settings, Some(pair.to_uppercase()), &args).await?;
        }
        Command::Stocks { args } => {
            let state = run_domain(StockDomain, &api, &settings, None, &args).await?;
            if let Some(snapshot) = &state.metrics {
                println!("Tracked market cap: {}", total_market_cap(snapshot));
            }
        }
        Command::Policy { args } => {
            run_domain(PolicyDomain, &api, &settings, None, &args).await?;
        }
        Command::Economy { args } => {
            run_domain(EconomyDomain, &api, &settings, None, &args).await?;
        }
        Command::Institutional { country, args } => {
            let country = country.to_uppercase();
            run_domain(InstitutionalDomain, &api, &settings, Some(country), &args).await?;
        }
        Command::Whale { args } => {
            run_domain(WhaleDomain, &api, &settings, None, &args).await?;
        }
        Command::Debate { scenario } => debate(&api, scenario).await?,
        Command::Health => {
            let health = api.health().await?;
            println!("Backend status: {}", health.status);
        }
    }

    Ok(())
}

fn apply_overrides(mut settings: Settings, cli: &Cli) -> Result<Settings> {
    if let Some(url) = &cli.api_url {
        settings.api_base_url = url.trim_end_matches('/').to_string();
        // Analysis follows the data host unless configured separately.
        if cli.analysis_url.is_none() && env::var("ANALYSIS_BASE_URL").is_err() {
            settings.analysis_base_url = settings.api_base_url.clone();
        }
    }
    if let Some(url) = &cli.analysis_url {
        settings.analysis_base_url = url.trim_end_matches('/').to_string();
    }
    if cli.no_mock {
        settings.allow_mock_fallback = false;
    }
    settings.validate()?;
    Ok(settings)
}

async fn run_domain<D>(
    domain: D,
    api: &ApiClient,
    settings: &Settings,
    selection: Option<String>,
    args: &AnalysisArgs,
) -> Result<StoreState<D::Snapshot>>
where
    D: Domain,
    D::Snapshot: SnapshotSummary,
{
    let store = spawn_store(domain, api.clone(), StoreSettings::from(settings));
    if let Some(selection) = selection {
        store.select(selection);
    }

    let mut state = store.fetch_data_and_wait().await;

    if args.analyze {
        let language = args.lang.unwrap_or(settings.default_language);
        let trigger = AnalysisTrigger::for_state(&state);
        if trigger.is_enabled() {
            println!("\n⏳ Convening the board ({} {})...\n", language.flag(), language.name());

            let mut updates = store.subscribe();
            let progress = tokio::spawn(async move {
                let mut last = None;
                while updates.changed().await.is_ok() {
                    let persona = updates.borrow_and_update().current_persona;
                    if persona != last {
                        if let Some(p) = persona {
                            println!("   {} {} is thinking...", p.avatar(), p.name());
                        }
                        last = persona;
                    }
                }
            });

            state = store.analyze(language).await;
            progress.abort();
        } else {
            warn!("Skipping {} analysis: no data loaded", D::KIND.label());
        }
    }

    store.shutdown();
    println!("{}", render_state(&title(D::KIND.label()), D::KIND.board(), &state));

    match &state.error {
        Some(error) => Err(anyhow!(error.clone())),
        None => Ok(state),
    }
}

fn title(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

async fn debate(api: &ApiClient, scenario: Option<String>) -> Result<()> {
    let scenario = match scenario {
        Some(s) => s,
        None => {
            println!("Using default scenario: 'The Strong Dollar Dilemma'\n");
            println!("{}", "-".repeat(50));
            println!("{}", DEFAULT_SCENARIO);
            println!("{}", "-".repeat(50));
            DEFAULT_SCENARIO.to_string()
        }
    };

    println!("\n⏳ Convening the Board of Directors...\n");
    let response = api.debate(&scenario).await?;
    println!("{}", board_transcript(LEGENDS, &response.result));
    Ok(())
}

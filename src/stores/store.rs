// src/stores/store.rs
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::{oneshot, watch};
use tokio::time::{interval, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::Settings;
use crate::models::{AnalysisResult, CachedAnalysis, Language, Persona};
use crate::services::api::ApiClient;
use crate::services::error::Result;

use super::Domain;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisSource {
    /// Served from the backend's daily cache.
    Cache,
    /// Freshly generated by the analysis backend.
    Generated,
}

/// Everything a view needs to render one dashboard domain.
#[derive(Debug, Clone)]
pub struct StoreState<S> {
    pub metrics: Option<S>,
    pub is_loading: bool,
    pub used_mock_data: bool,
    pub last_updated: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub is_analyzing: bool,
    pub analysis: Option<AnalysisResult>,
    pub analysis_source: Option<AnalysisSource>,
    pub analysis_language: Option<Language>,
    /// Persona currently "speaking" while an analysis is in flight.
    pub current_persona: Option<Persona>,
    pub selection: Option<String>,
}

impl<S> StoreState<S> {
    fn initial(selection: Option<String>) -> Self {
        StoreState {
            metrics: None,
            is_loading: false,
            used_mock_data: false,
            last_updated: None,
            error: None,
            is_analyzing: false,
            analysis: None,
            analysis_source: None,
            analysis_language: None,
            current_persona: None,
            selection,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub allow_mock_fallback: bool,
    pub persona_tick: Duration,
}

impl From<&Settings> for StoreSettings {
    fn from(settings: &Settings) -> Self {
        StoreSettings {
            allow_mock_fallback: settings.allow_mock_fallback,
            persona_tick: settings.persona_tick,
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings::from(&Settings::default())
    }
}

type Reply<S> = oneshot::Sender<StoreState<S>>;

enum Command<S> {
    FetchData(Option<Reply<S>>),
    RequestAnalysis(Language, Option<Reply<S>>),
    Select(String),
    Reset,
}

enum Event<S> {
    Fetched {
        generation: u64,
        outcome: Result<S>,
    },
    Analyzed {
        generation: u64,
        outcome: Result<(AnalysisResult, AnalysisSource)>,
    },
}

/// Cloneable front door to a running store. Every mutation goes through the
/// store's own task; handles only send commands and read published state.
pub struct StoreHandle<D: Domain> {
    commands: UnboundedSender<Command<D::Snapshot>>,
    state: watch::Receiver<StoreState<D::Snapshot>>,
    shutdown: CancellationToken,
}

impl<D: Domain> Clone for StoreHandle<D> {
    fn clone(&self) -> Self {
        StoreHandle {
            commands: self.commands.clone(),
            state: self.state.clone(),
            shutdown: self.shutdown.clone(),
        }
    }
}

impl<D: Domain> StoreHandle<D> {
    pub fn state(&self) -> StoreState<D::Snapshot> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<StoreState<D::Snapshot>> {
        self.state.clone()
    }

    pub fn fetch_data(&self) {
        self.send(Command::FetchData(None));
    }

    /// Fetch and return the state once the snapshot (or its mock stand-in)
    /// has been applied.
    pub async fn fetch_data_and_wait(&self) -> StoreState<D::Snapshot> {
        self.round_trip(|reply| Command::FetchData(Some(reply))).await
    }

    pub fn request_analysis(&self, language: Language) {
        self.send(Command::RequestAnalysis(language, None));
    }

    pub async fn analyze(&self, language: Language) -> StoreState<D::Snapshot> {
        self.round_trip(|reply| Command::RequestAnalysis(language, Some(reply)))
            .await
    }

    pub fn select(&self, selection: impl Into<String>) {
        self.send(Command::Select(selection.into()));
    }

    pub fn reset(&self) {
        self.send(Command::Reset);
    }

    /// Stop the store and abandon any request still in flight.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    fn send(&self, command: Command<D::Snapshot>) {
        if self.commands.send(command).is_err() {
            warn!("{} store is closed, dropping command", D::KIND);
        }
    }

    async fn round_trip<F>(&self, make: F) -> StoreState<D::Snapshot>
    where
        F: FnOnce(Reply<D::Snapshot>) -> Command<D::Snapshot>,
    {
        let (tx, rx) = oneshot::channel();
        self.send(make(tx));
        match rx.await {
            Ok(state) => state,
            Err(_) => self.state(),
        }
    }
}

/// Start the store task for `domain` and return a handle to it.
pub fn spawn_store<D: Domain>(domain: D, api: ApiClient, settings: StoreSettings) -> StoreHandle<D> {
    let selection = domain.default_selection();
    let state = StoreState::initial(selection);
    let (state_tx, state_rx) = watch::channel(state.clone());
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let shutdown = CancellationToken::new();

    let mut persona_ticker = interval(settings.persona_tick);
    persona_ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let actor = StoreActor {
        domain: Arc::new(domain),
        api,
        settings,
        state,
        state_tx,
        events: event_tx,
        generation: 0,
        inflight: shutdown.child_token(),
        shutdown: shutdown.clone(),
        persona_ticker,
        fetch_waiters: Vec::new(),
        analysis_waiters: Vec::new(),
    };
    tokio::spawn(actor.run(command_rx, event_rx));

    StoreHandle {
        commands: command_tx,
        state: state_rx,
        shutdown,
    }
}

struct StoreActor<D: Domain> {
    domain: Arc<D>,
    api: ApiClient,
    settings: StoreSettings,
    state: StoreState<D::Snapshot>,
    state_tx: watch::Sender<StoreState<D::Snapshot>>,
    events: UnboundedSender<Event<D::Snapshot>>,
    // Bumped on reset/selection change; completions from older generations are dropped.
    generation: u64,
    inflight: CancellationToken,
    shutdown: CancellationToken,
    persona_ticker: Interval,
    fetch_waiters: Vec<Reply<D::Snapshot>>,
    analysis_waiters: Vec<Reply<D::Snapshot>>,
}

impl<D: Domain> StoreActor<D> {
    async fn run(
        mut self,
        mut commands: UnboundedReceiver<Command<D::Snapshot>>,
        mut events: UnboundedReceiver<Event<D::Snapshot>>,
    ) {
        info!("{} store started", D::KIND);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("{} store: shutdown requested", D::KIND);
                    break;
                }
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => {
                        debug!("All {} store handles dropped", D::KIND);
                        break;
                    }
                },
                Some(event) = events.recv() => self.handle_event(event),
                _ = self.persona_ticker.tick(), if self.state.is_analyzing => self.advance_persona(),
            }
        }

        self.inflight.cancel();
        info!("{} store stopped", D::KIND);
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.state.clone());
    }

    fn handle_command(&mut self, command: Command<D::Snapshot>) {
        match command {
            Command::FetchData(reply) => self.start_fetch(reply),
            Command::RequestAnalysis(language, reply) => self.start_analysis(language, reply),
            Command::Select(selection) => self.select(selection),
            Command::Reset => self.reset(),
        }
    }

    fn handle_event(&mut self, event: Event<D::Snapshot>) {
        match event {
            Event::Fetched { generation, outcome } => self.finish_fetch(generation, outcome),
            Event::Analyzed { generation, outcome } => self.finish_analysis(generation, outcome),
        }
    }

    fn start_fetch(&mut self, reply: Option<Reply<D::Snapshot>>) {
        self.fetch_waiters.extend(reply);
        if self.state.is_loading {
            debug!("{} fetch already in flight", D::KIND);
            return;
        }

        self.state.is_loading = true;
        self.publish();

        let domain = Arc::clone(&self.domain);
        let api = self.api.clone();
        let events = self.events.clone();
        let token = self.inflight.clone();
        let generation = self.generation;
        let selection = self.state.selection.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => debug!("{} fetch cancelled", D::KIND),
                outcome = domain.fetch(&api, selection.as_deref()) => {
                    let _ = events.send(Event::Fetched { generation, outcome });
                }
            }
        });
    }

    fn finish_fetch(&mut self, generation: u64, outcome: Result<D::Snapshot>) {
        if generation != self.generation {
            debug!("Discarding stale {} snapshot", D::KIND);
            return;
        }

        match outcome {
            Ok(snapshot) => {
                info!("Loaded {} snapshot", D::KIND.label());
                self.state.metrics = Some(snapshot);
                self.state.used_mock_data = false;
                self.state.last_updated = Some(Utc::now());
            }
            Err(e) if self.settings.allow_mock_fallback => {
                warn!("Failed to fetch {} data, using mock snapshot: {}", D::KIND.label(), e);
                let mock = self.domain.mock_snapshot(self.state.selection.as_deref());
                self.state.metrics = Some(mock);
                self.state.used_mock_data = true;
                self.state.last_updated = Some(Utc::now());
            }
            Err(e) => {
                error!("Failed to fetch {} data: {}", D::KIND.label(), e);
                self.state.error = Some(format!("Failed to load {} data: {}", D::KIND.label(), e));
            }
        }

        self.state.is_loading = false;
        self.publish();

        let state = self.state.clone();
        for reply in self.fetch_waiters.drain(..) {
            let _ = reply.send(state.clone());
        }
    }

    fn start_analysis(&mut self, language: Language, reply: Option<Reply<D::Snapshot>>) {
        let Some(snapshot) = self.state.metrics.clone() else {
            warn!("{} analysis requested before any data was loaded", D::KIND);
            self.state.error = Some(format!("No {} data available for analysis", D::KIND.label()));
            self.publish();
            if let Some(reply) = reply {
                let _ = reply.send(self.state.clone());
            }
            return;
        };

        self.analysis_waiters.extend(reply);
        if self.state.is_analyzing {
            info!("{} analysis already in progress, ignoring request", D::KIND);
            return;
        }

        info!("Requesting {} analysis ({})", D::KIND.label(), language);
        self.state.is_analyzing = true;
        self.state.error = None;
        self.state.analysis_language = Some(language);
        self.state.current_persona = D::KIND.board().first().copied();
        self.persona_ticker.reset();
        self.publish();

        let domain = Arc::clone(&self.domain);
        let api = self.api.clone();
        let events = self.events.clone();
        let token = self.inflight.clone();
        let generation = self.generation;
        let selection = self.state.selection.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => debug!("{} analysis cancelled", D::KIND),
                outcome = run_analysis(domain.as_ref(), &api, &snapshot, selection.as_deref(), language) => {
                    let _ = events.send(Event::Analyzed { generation, outcome });
                }
            }
        });
    }

    fn finish_analysis(
        &mut self,
        generation: u64,
        outcome: Result<(AnalysisResult, AnalysisSource)>,
    ) {
        if generation != self.generation {
            debug!("Discarding stale {} analysis", D::KIND);
            return;
        }

        match outcome {
            Ok((result, source)) => {
                info!("{} analysis ready ({:?})", D::KIND.label(), source);
                self.state.analysis = Some(result);
                self.state.analysis_source = Some(source);
            }
            Err(e) => {
                error!("Failed to get {} analysis: {}", D::KIND.label(), e);
                self.state.error = Some(format!("Failed to get {} analysis: {}", D::KIND.label(), e));
            }
        }

        self.state.is_analyzing = false;
        self.state.current_persona = None;
        self.publish();

        let state = self.state.clone();
        for reply in self.analysis_waiters.drain(..) {
            let _ = reply.send(state.clone());
        }
    }

    fn advance_persona(&mut self) {
        let board = D::KIND.board();
        let next = self
            .state
            .current_persona
            .and_then(|current| board.iter().position(|p| *p == current))
            .and_then(|idx| board.get((idx + 1) % board.len()))
            .or_else(|| board.first())
            .copied();
        if next != self.state.current_persona {
            self.state.current_persona = next;
            self.publish();
        }
    }

    fn select(&mut self, selection: String) {
        if self.state.selection.as_deref() == Some(selection.as_str()) {
            return;
        }
        info!("{} selection changed to {}", D::KIND, selection);

        let was_loading = self.state.is_loading;
        let refetch = self.domain.snapshot_depends_on_selection();
        self.cancel_inflight();

        if refetch {
            self.state.metrics = None;
            self.state.used_mock_data = false;
            self.state.last_updated = None;
        }
        self.state.selection = Some(selection);
        self.state.is_loading = false;
        self.state.is_analyzing = false;
        self.state.current_persona = None;
        self.state.analysis = None;
        self.state.analysis_source = None;
        self.state.analysis_language = None;
        self.state.error = None;
        self.publish();

        let state = self.state.clone();
        for reply in self.analysis_waiters.drain(..) {
            let _ = reply.send(state.clone());
        }

        // Any fetch in flight was for the old selection.
        if refetch || was_loading {
            self.start_fetch(None);
        }
    }

    fn reset(&mut self) {
        info!("Resetting {} store", D::KIND);
        self.cancel_inflight();
        self.state = StoreState::initial(self.domain.default_selection());
        self.publish();

        let state = self.state.clone();
        for reply in self
            .fetch_waiters
            .drain(..)
            .chain(self.analysis_waiters.drain(..))
        {
            let _ = reply.send(state.clone());
        }
    }

    fn cancel_inflight(&mut self) {
        self.inflight.cancel();
        self.inflight = self.shutdown.child_token();
        self.generation += 1;
    }
}

#[derive(Serialize)]
struct AnalysisEnvelope<'a, R: Serialize> {
    #[serde(flatten)]
    metrics: &'a R,
    language: Language,
}

/// Cache check first, then POST the snapshot's metrics on a miss.
async fn run_analysis<D: Domain>(
    domain: &D,
    api: &ApiClient,
    snapshot: &D::Snapshot,
    selection: Option<&str>,
    language: Language,
) -> Result<(AnalysisResult, AnalysisSource)> {
    let extra = domain.cache_query(selection);
    let mut query: Vec<(&str, &str)> = vec![("language", language.code())];
    query.extend(extra.iter().map(|(key, value)| (*key, value.as_str())));

    let cache_url = api.endpoints().analysis_cached(D::KIND, &query);
    match api.get_json::<CachedAnalysis>(&cache_url).await {
        Ok(CachedAnalysis {
            cached: true,
            result: Some(result),
        }) => {
            info!("Using today's cached {} analysis", D::KIND.label());
            return Ok((result, AnalysisSource::Cache));
        }
        Ok(_) => debug!("No cached {} analysis for today", D::KIND.label()),
        Err(e) => warn!("Cache check for {} analysis failed: {}", D::KIND.label(), e),
    }

    let request = domain.analysis_request(snapshot, selection);
    let body = AnalysisEnvelope {
        metrics: &request,
        language,
    };
    let result: AnalysisResult = api.post_json(&api.endpoints().analyze(D::KIND), &body).await?;
    Ok((result, AnalysisSource::Generated))
}

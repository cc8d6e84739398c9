// src/trigger.rs
use crate::models::Language;
use crate::stores::{Domain, StoreHandle, StoreState};

/// The "Ask the board" button. A click goes through only when the button is
/// enabled and no analysis is already running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalysisTrigger {
    pub is_analyzing: bool,
    pub is_disabled: bool,
}

impl AnalysisTrigger {
    pub fn new(is_analyzing: bool, is_disabled: bool) -> Self {
        AnalysisTrigger {
            is_analyzing,
            is_disabled,
        }
    }

    /// Disabled until the store has metrics to analyse.
    pub fn for_state<S>(state: &StoreState<S>) -> Self {
        AnalysisTrigger::new(state.is_analyzing, state.metrics.is_none())
    }

    pub fn is_enabled(&self) -> bool {
        !self.is_analyzing && !self.is_disabled
    }

    pub fn label(&self) -> &'static str {
        if self.is_analyzing {
            "Analyzing..."
        } else {
            "Ask the Board"
        }
    }

    /// Run `on_click` if the trigger is live. Returns whether it ran.
    pub fn click<F: FnOnce()>(&self, on_click: F) -> bool {
        if !self.is_enabled() {
            return false;
        }
        on_click();
        true
    }

    /// Click bound straight to a store.
    pub fn click_store<D: Domain>(&self, store: &StoreHandle<D>, language: Language) -> bool {
        self.click(|| store.request_analysis(language))
    }
}

//! Session state and the query/detail controllers.
//!
//! The session never touches the network or the terminal. User actions and
//! finished requests arrive as [`Action`]s; every handler updates the view
//! state and returns the [`Effect`]s the runtime has to carry out.

use crate::dashboard::DetailView;
use crate::error::ApiError;
use crate::models::{
    DetailMode, DetailPayload, RecommendationItem, ResultsLayout, is_system_ticker,
};
use crate::results::{ResultsView, render_results};
use crate::transcript::Transcript;
use std::time::Instant;
use tracing::{debug, info, warn};

const GREETING: &str = "Hi! Tell me what kind of stocks you are looking for.";
const GREETING_HINT: &str = "Try: \"undervalued tech stocks under 100\" or \"safe dividend stocks\"";
const ACKNOWLEDGEMENT: &str = "Here is what I found. Select a stock to see its details.";
const SYSTEM_ACKNOWLEDGEMENT: &str = "I could not produce recommendations for that request.";
const NO_RESULTS_ACKNOWLEDGEMENT: &str = "I did not find any stocks for that request.";

/// Everything that can happen to a session.
#[derive(Debug)]
pub enum Action {
    SubmitQuery(String),
    SelectItem(String),
    CloseDetail,
    BackToList,
    RecommendationsLoaded(Result<Vec<RecommendationItem>, ApiError>),
    DetailLoaded {
        generation: u64,
        result: Result<DetailPayload, ApiError>,
    },
    PriceTick {
        generation: u64,
        fraction: f64,
    },
}

/// Work the runtime performs on behalf of the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchRecommendations {
        query: String,
    },
    FetchDetail {
        symbol: String,
        generation: u64,
        mode: DetailMode,
    },
    StartLiveTicker {
        generation: u64,
    },
    StopLiveTicker,
}

/// Per-user view state.
pub struct Session {
    pub transcript: Transcript,
    /// Text currently typed in the input box
    pub input: String,
    pub results: ResultsView,
    /// Last list the backend returned, kept for "back to list"
    last_results: Option<Vec<RecommendationItem>>,
    pub detail: Option<DetailView>,
    /// Highlighted card or row
    pub selected: usize,
    pub detail_mode: DetailMode,
    pub layout: ResultsLayout,
    query_started: Option<Instant>,
    generation: u64,
    ticker_running: bool,
}

impl Session {
    pub fn new(detail_mode: DetailMode, layout: ResultsLayout) -> Self {
        let mut transcript = Transcript::new();
        transcript.display_bot_message(GREETING, Some(GREETING_HINT.to_string()));

        Self {
            transcript,
            input: String::new(),
            results: ResultsView::default(),
            last_results: None,
            detail: None,
            selected: 0,
            detail_mode,
            layout,
            query_started: None,
            generation: 0,
            ticker_running: false,
        }
    }

    /// Route an action to its handler.
    pub fn dispatch(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::SubmitQuery(text) => self.submit_query(&text).into_iter().collect(),
            Action::SelectItem(symbol) => self.select_item(&symbol),
            Action::CloseDetail => self.close_detail(),
            Action::BackToList => self.back_to_list(),
            Action::RecommendationsLoaded(result) => {
                self.on_recommendations(result);
                Vec::new()
            }
            Action::DetailLoaded { generation, result } => self.on_detail(generation, result),
            Action::PriceTick {
                generation,
                fraction,
            } => {
                self.on_price_tick(generation, fraction);
                Vec::new()
            }
        }
    }

    /// True while a recommendation request is in flight; input is disabled.
    pub fn is_busy(&self) -> bool {
        self.query_started.is_some()
    }

    /// When the in-flight query was sent.
    pub fn busy_since(&self) -> Option<Instant> {
        self.query_started
    }

    #[cfg(test)]
    pub fn current_generation(&self) -> u64 {
        self.generation
    }

    pub fn ticker_running(&self) -> bool {
        self.ticker_running
    }

    #[cfg(test)]
    pub fn last_results(&self) -> Option<&[RecommendationItem]> {
        self.last_results.as_deref()
    }

    /// Send a free-text query. Blank input and submissions while busy are ignored.
    pub fn submit_query(&mut self, text: &str) -> Option<Effect> {
        let query = text.trim();
        if query.is_empty() || self.is_busy() {
            return None;
        }

        info!(query, "submitting query");
        self.transcript.display_user_message(query);
        self.input.clear();
        self.query_started = Some(Instant::now());

        Some(Effect::FetchRecommendations {
            query: query.to_string(),
        })
    }

    pub fn on_recommendations(&mut self, result: Result<Vec<RecommendationItem>, ApiError>) {
        if let Some(started) = self.query_started.take() {
            debug!(elapsed = ?started.elapsed(), "recommendation request finished");
        }

        match result {
            Ok(items) => {
                self.results = render_results(Some(&items));
                self.selected = 0;
                let acknowledgement = match &self.results {
                    ResultsView::Stocks(cards) => {
                        info!(count = cards.len(), "received recommendations");
                        ACKNOWLEDGEMENT
                    }
                    ResultsView::SystemNotice { title, .. } => {
                        info!(notice = %title, "backend returned a system notice");
                        SYSTEM_ACKNOWLEDGEMENT
                    }
                    _ => NO_RESULTS_ACKNOWLEDGEMENT,
                };
                self.last_results = Some(items);
                self.transcript.display_bot_message(acknowledgement, None);
            }
            Err(e) => {
                warn!(error = %e, "recommendation request failed");
                self.transcript.display_bot_message(
                    format!("Sorry, I could not get recommendations: {}.", e.user_message()),
                    Some("Please try again in a moment.".to_string()),
                );
            }
        }
    }

    /// Open the detail view for a ticker. The sentinel and blank tickers are ignored.
    pub fn select_item(&mut self, symbol: &str) -> Vec<Effect> {
        let symbol = symbol.trim();
        if symbol.is_empty() || is_system_ticker(symbol) {
            return Vec::new();
        }

        let mut effects = self.teardown_detail();
        info!(symbol, generation = self.generation, "opening detail view");
        self.detail = Some(DetailView::loading(symbol, self.detail_mode));
        effects.push(Effect::FetchDetail {
            symbol: symbol.to_string(),
            generation: self.generation,
            mode: self.detail_mode,
        });
        effects
    }

    /// Ticker of the highlighted card, if the list has one.
    pub fn highlighted_ticker(&self) -> Option<String> {
        self.results.tickers().get(self.selected).map(|s| s.to_string())
    }

    pub fn on_detail(
        &mut self,
        generation: u64,
        result: Result<DetailPayload, ApiError>,
    ) -> Vec<Effect> {
        if generation != self.generation {
            debug!(generation, current = self.generation, "dropping stale detail response");
            return Vec::new();
        }
        let Some(detail) = self.detail.as_mut() else {
            return Vec::new();
        };

        match result {
            Ok(payload) => {
                detail.populate(&payload);
                if detail.has_live_price() {
                    self.ticker_running = true;
                    return vec![Effect::StartLiveTicker { generation }];
                }
                Vec::new()
            }
            Err(e) => {
                warn!(symbol = %detail.symbol, error = %e, "detail request failed");
                detail.fail(e.user_message());
                vec![self.stop_ticker()]
            }
        }
    }

    pub fn on_price_tick(&mut self, generation: u64, fraction: f64) {
        if generation != self.generation {
            return;
        }
        if let Some(detail) = self.detail.as_mut() {
            detail.apply_jitter(fraction);
        }
    }

    /// Close the detail view and stop its live updates.
    pub fn close_detail(&mut self) -> Vec<Effect> {
        if self.detail.is_none() {
            return Vec::new();
        }
        self.teardown_detail()
    }

    /// Leave the inline detail and show the last list again.
    pub fn back_to_list(&mut self) -> Vec<Effect> {
        let effects = self.close_detail();
        if self.last_results.is_some() {
            self.results = render_results(self.last_results.as_deref());
            self.selected = self.selected.min(self.results.card_count().saturating_sub(1));
        }
        effects
    }

    /// Drop the current detail view, invalidate its pending responses and ticks.
    fn teardown_detail(&mut self) -> Vec<Effect> {
        self.detail = None;
        self.generation += 1;
        // Always ask for a stop so a ticker can never outlive its view
        vec![self.stop_ticker()]
    }

    fn stop_ticker(&mut self) -> Effect {
        self.ticker_running = false;
        Effect::StopLiveTicker
    }

    pub fn select_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_down(&mut self) {
        if self.selected + 1 < self.results.card_count() {
            self.selected += 1;
        }
    }
}

//! Executes session effects: network requests and the live price ticker.
//!
//! Finished work is fed back to the event loop as [`Action`]s over an
//! unbounded channel, so the UI thread never waits on the network.

use crate::api::Backend;
use crate::dashboard::MAX_JITTER;
use crate::session::{Action, Effect};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};
use tracing::{debug, trace};

/// Periodic task nudging the displayed price. At most one runs at a time.
pub struct LiveTicker {
    interval: Duration,
    handle: Option<JoinHandle<()>>,
}

impl LiveTicker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            handle: None,
        }
    }

    /// Start ticking for `generation`, cancelling any previous ticker first.
    pub fn start(&mut self, generation: u64, tx: UnboundedSender<Action>) {
        self.stop();

        let period = self.interval;
        let first_tick = Instant::now() + period;
        debug!(generation, ?period, "starting live ticker");
        self.handle = Some(tokio::spawn(async move {
            let mut ticks = interval_at(first_tick, period);
            loop {
                ticks.tick().await;
                let fraction = rand::thread_rng().gen_range(-MAX_JITTER..=MAX_JITTER);
                trace!(generation, fraction, "live tick");
                if tx.send(Action::PriceTick { generation, fraction }).is_err() {
                    break;
                }
            }
        }));
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            debug!("stopping live ticker");
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for LiveTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Owns the backend, the action channel and the background tasks.
pub struct Runtime<B: Backend> {
    backend: Arc<B>,
    tx: UnboundedSender<Action>,
    rx: UnboundedReceiver<Action>,
    ticker: LiveTicker,
    detail_task: Option<JoinHandle<()>>,
}

impl<B: Backend> Runtime<B> {
    pub fn new(backend: B, tick_interval: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            backend: Arc::new(backend),
            tx,
            rx,
            ticker: LiveTicker::new(tick_interval),
            detail_task: None,
        }
    }

    /// Carry out effects in order.
    pub fn execute(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            self.execute_one(effect);
        }
    }

    fn execute_one(&mut self, effect: Effect) {
        match effect {
            Effect::FetchRecommendations { query } => {
                let backend = Arc::clone(&self.backend);
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = backend.recommend(&query).await;
                    let _ = tx.send(Action::RecommendationsLoaded(result));
                });
            }
            Effect::FetchDetail {
                symbol,
                generation,
                mode,
            } => {
                // A newer selection replaces, rather than queues behind, the old fetch
                if let Some(previous) = self.detail_task.take() {
                    previous.abort();
                }
                let backend = Arc::clone(&self.backend);
                let tx = self.tx.clone();
                self.detail_task = Some(tokio::spawn(async move {
                    let result = backend.fetch_detail(&symbol, mode).await;
                    let _ = tx.send(Action::DetailLoaded { generation, result });
                }));
            }
            Effect::StartLiveTicker { generation } => {
                self.ticker.start(generation, self.tx.clone());
            }
            Effect::StopLiveTicker => self.ticker.stop(),
        }
    }

    /// Next finished action, without waiting.
    pub fn try_next(&mut self) -> Option<Action> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next finished action.
    #[cfg(test)]
    pub async fn next(&mut self) -> Option<Action> {
        self.rx.recv().await
    }

    pub fn ticker_running(&self) -> bool {
        self.ticker.is_running()
    }
}

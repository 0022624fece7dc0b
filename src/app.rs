//! Application state and keyboard handling for the interactive mode.

use crate::api::Backend;
use crate::config::Config;
use crate::models::ResultsLayout;
use crate::runtime::Runtime;
use crate::session::{Action, Session};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};

/// Transcript lines moved per PageUp/PageDown.
const TRANSCRIPT_PAGE: usize = 10;

/// Which pane receives keystrokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Results,
}

/// Interactive application: the session, its runtime and UI-only state.
pub struct App<B: Backend> {
    pub session: Session,
    runtime: Runtime<B>,
    pub focus: Focus,
    /// Show help overlay
    pub show_help: bool,
    /// Is the app running
    pub running: bool,
    /// Backend address shown in the header
    pub server: String,
}

impl<B: Backend> App<B> {
    /// Create a new application from a backend and the merged config.
    pub fn new(backend: B, config: &Config) -> Result<Self> {
        let tick = config.display.live_tick_interval()?;
        Ok(Self {
            session: Session::new(config.display.detail_mode, config.display.results_layout),
            runtime: Runtime::new(backend, tick),
            focus: Focus::Input,
            show_help: false,
            running: true,
            server: config.server.base_url.clone(),
        })
    }

    /// Feed a user action through the session and run its effects.
    pub fn dispatch(&mut self, action: Action) {
        let effects = self.session.dispatch(action);
        self.runtime.execute(effects);
    }

    /// Apply everything the background tasks finished since the last call.
    pub fn drain_background(&mut self) {
        while let Some(action) = self.runtime.try_next() {
            self.dispatch(action);
        }
    }

    /// Wait for the next background result and apply it.
    #[cfg(test)]
    pub async fn wait_background(&mut self) -> bool {
        match self.runtime.next().await {
            Some(action) => {
                self.dispatch(action);
                true
            }
            None => false,
        }
    }

    #[cfg(test)]
    pub fn ticker_running(&self) -> bool {
        self.runtime.ticker_running()
    }

    /// Quit the application.
    pub fn quit(&mut self) {
        self.running = false;
        self.runtime.execute(self.session.close_detail());
    }

    pub fn should_quit(&self) -> bool {
        !self.running
    }

    /// Handle keyboard input.
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
            self.quit();
            return;
        }

        // Close help overlay on any key
        if self.show_help {
            self.show_help = false;
            return;
        }

        if code == KeyCode::F(1) {
            self.show_help = true;
            return;
        }

        if self.session.detail.is_some() {
            self.handle_detail_key(code);
            return;
        }

        match self.focus {
            Focus::Input => self.handle_input_key(code),
            Focus::Results => self.handle_results_key(code),
        }
    }

    fn handle_detail_key(&mut self, code: KeyCode) {
        let back = match self.session.layout {
            ResultsLayout::Cards => Action::CloseDetail,
            ResultsLayout::Table => Action::BackToList,
        };
        match code {
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('q') | KeyCode::Char('b') => {
                self.dispatch(back)
            }
            _ => {}
        }
    }

    fn handle_input_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.quit(),
            KeyCode::Tab => {
                if self.session.results.card_count() > 0 {
                    self.focus = Focus::Results;
                }
            }
            KeyCode::PageUp => self.session.transcript.scroll_up(TRANSCRIPT_PAGE),
            KeyCode::PageDown => self.session.transcript.scroll_down(TRANSCRIPT_PAGE),
            KeyCode::End => self.session.transcript.scroll_to_bottom(),
            // Input is disabled while a query is in flight
            _ if self.session.is_busy() => {}
            KeyCode::Enter => {
                let text = self.session.input.clone();
                self.dispatch(Action::SubmitQuery(text));
            }
            KeyCode::Backspace => {
                self.session.input.pop();
            }
            KeyCode::Char(c) => self.session.input.push(c),
            _ => {}
        }
    }

    fn handle_results_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.quit(),
            KeyCode::Tab | KeyCode::Char('i') | KeyCode::Char('/') => self.focus = Focus::Input,
            KeyCode::Up | KeyCode::Char('k') => self.session.select_up(),
            KeyCode::Down | KeyCode::Char('j') => self.session.select_down(),
            KeyCode::Home | KeyCode::Char('g') => self.session.selected = 0,
            KeyCode::End | KeyCode::Char('G') => {
                self.session.selected = self.session.results.card_count().saturating_sub(1)
            }
            KeyCode::Enter => {
                if let Some(symbol) = self.session.highlighted_ticker() {
                    self.dispatch(Action::SelectItem(symbol));
                }
            }
            KeyCode::Char('h') | KeyCode::Char('?') => self.show_help = true,
            _ => {}
        }
    }
}

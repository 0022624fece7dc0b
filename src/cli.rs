//! Command-line interface.

use crate::config::Config;
use crate::models::{DetailMode, ResultsLayout};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// A terminal chat client for stock recommendations.
///
/// Type what you are looking for ("undervalued dividend stocks under 50"),
/// browse the recommended tickers and open a dashboard with the live quote,
/// fundamentals and technical indicators of any of them.
#[derive(Parser, Debug, Clone)]
#[command(name = "geniusmind")]
#[command(author = "Thomas Vincent")]
#[command(version)]
#[command(about = "A terminal chat client for stock recommendations", long_about = None)]
pub struct Args {
    /// Backend base URL
    #[arg(short = 'u', long, env = "GENIUSMIND_SERVER")]
    pub server: Option<String>,

    /// Configuration file path
    #[arg(short = 'c', long, env = "GENIUSMIND_CONFIG")]
    pub config: Option<PathBuf>,

    /// API timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Detail view to open when a stock is selected
    #[arg(short = 'm', long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Layout of the recommendation list
    #[arg(short = 'l', long, value_enum)]
    pub layout: Option<LayoutArg>,

    /// Live price update interval (e.g. 1500ms, 2s)
    #[arg(long)]
    pub tick: Option<String>,

    /// Batch mode: send one query, print the results and exit
    #[arg(short = 'a', long, value_name = "QUERY")]
    pub ask: Option<String>,

    /// In batch mode, also fetch details for every recommended stock
    #[arg(long, requires = "ask")]
    pub details: bool,

    /// Export format for batch output
    #[arg(long, value_enum, requires = "ask")]
    pub export: Option<ExportFormat>,

    /// Log file for interactive mode
    #[arg(long, env = "GENIUSMIND_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Verbose output - log at debug level
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Write a default configuration file and exit
    #[arg(long)]
    pub init_config: bool,
}

/// Detail view options.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    /// Company profile only
    Simple,
    /// Live quote, fundamentals and technicals
    Dashboard,
}

impl From<ModeArg> for DetailMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Simple => DetailMode::Simple,
            ModeArg::Dashboard => DetailMode::Dashboard,
        }
    }
}

/// Result layout options.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LayoutArg {
    /// One card per stock, details in a popup
    Cards,
    /// One row per stock, details replace the list
    Table,
}

impl From<LayoutArg> for ResultsLayout {
    fn from(layout: LayoutArg) -> Self {
        match layout {
            LayoutArg::Cards => ResultsLayout::Cards,
            LayoutArg::Table => ResultsLayout::Table,
        }
    }
}

/// Export format for data output.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ExportFormat {
    /// Plain text format
    Text,
    /// Comma-separated values (CSV)
    Csv,
    /// JavaScript Object Notation (JSON)
    Json,
}

impl Args {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Args::parse()
    }

    /// Apply command line overrides on top of the file configuration.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(ref server) = self.server {
            config.server.base_url = server.clone();
        }
        if let Some(timeout) = self.timeout {
            config.server.timeout = timeout;
        }
        if let Some(mode) = self.mode {
            config.display.detail_mode = mode.into();
        }
        if let Some(layout) = self.layout {
            config.display.results_layout = layout.into();
        }
        if let Some(ref tick) = self.tick {
            config.display.live_tick = tick.clone();
        }
    }

    /// Batch mode runs one query without the TUI.
    pub fn is_batch(&self) -> bool {
        self.ask.is_some()
    }
}

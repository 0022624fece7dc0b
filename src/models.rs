//! Data models for recommendations, stock profiles and dashboards.
//!
//! Wire structs follow the backend's JSON. Field names drift between
//! backend revisions, so most of them carry serde aliases.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Ticker value the backend uses for informational, non-stock entries.
pub const SYSTEM_TICKER: &str = "SYSTEM";

/// Who wrote a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    User,
    Bot,
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sender::User => write!(f, "You"),
            Sender::Bot => write!(f, "GeniusMind"),
        }
    }
}

/// A single transcript entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub text: String,
    pub sender: Sender,
    /// Extra block rendered under a bot message
    pub fragment: Option<String>,
    pub sent_at: DateTime<Local>,
}

/// One stock recommendation, or a system notice when the ticker is the sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationItem {
    #[serde(alias = "symbol")]
    pub ticker: String,
    #[serde(default, alias = "companyName")]
    pub company_name: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
}

impl RecommendationItem {
    /// True for the backend's informational entries.
    pub fn is_system(&self) -> bool {
        is_system_ticker(&self.ticker)
    }
}

pub fn is_system_ticker(ticker: &str) -> bool {
    ticker.trim() == SYSTEM_TICKER
}

/// Company profile as returned by the details endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockProfile {
    #[serde(default, alias = "ticker")]
    pub symbol: Option<String>,
    #[serde(default, alias = "name", alias = "company_name")]
    pub company_name: Option<String>,
    /// Full exchange name in newer provider payloads, short code in older ones
    #[serde(default)]
    pub exchange: Option<String>,
    #[serde(default)]
    pub exchange_short_name: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub change: Option<f64>,
    #[serde(default)]
    pub changes: Option<f64>,
    #[serde(default)]
    pub day_high: Option<f64>,
    #[serde(default)]
    pub day_low: Option<f64>,
    #[serde(default)]
    pub year_high: Option<f64>,
    #[serde(default)]
    pub year_low: Option<f64>,
    /// 52-week range as "low-high"
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default, alias = "mktCap")]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub volume: Option<f64>,
    #[serde(default)]
    pub vol_avg: Option<f64>,
}

impl StockProfile {
    /// Short exchange code, falling back to the exchange name.
    pub fn exchange_label(&self) -> Option<&str> {
        self.exchange_short_name
            .as_deref()
            .or(self.exchange.as_deref())
    }

    pub fn day_change(&self) -> Option<f64> {
        self.change.or(self.changes)
    }

    /// Latest volume, falling back to the average volume.
    pub fn volume_or_average(&self) -> Option<f64> {
        self.volume.or(self.vol_avg)
    }

    /// 52-week low/high, falling back to the `range` string.
    pub fn year_range(&self) -> (Option<f64>, Option<f64>) {
        if self.year_low.is_some() || self.year_high.is_some() {
            return (self.year_low, self.year_high);
        }
        self.range
            .as_deref()
            .and_then(parse_range)
            .map(|(low, high)| (Some(low), Some(high)))
            .unwrap_or((None, None))
    }
}

/// Parse a "low-high" range string such as "124.17-199.62".
pub fn parse_range(range: &str) -> Option<(f64, f64)> {
    let range = range.trim();
    // Skip the first byte so a leading minus sign stays with the low value
    let split = range.get(1..)?.find('-')? + 1;
    let low = range[..split].trim().parse().ok()?;
    let high = range[split + 1..].trim().parse().ok()?;
    Some((low, high))
}

/// Real-time quote block of the dashboard response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveQuote {
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub change: Option<f64>,
    /// Already in percent units
    #[serde(default, alias = "changePercent", alias = "changePercentage")]
    pub changes_percentage: Option<f64>,
    #[serde(default)]
    pub day_high: Option<f64>,
    #[serde(default)]
    pub day_low: Option<f64>,
    #[serde(default)]
    pub year_high: Option<f64>,
    #[serde(default)]
    pub year_low: Option<f64>,
    #[serde(default)]
    pub volume: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
}

/// Valuation ratios. Return on equity and dividend yield are fractions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fundamentals {
    #[serde(default)]
    pub pe_ratio: Option<f64>,
    #[serde(default)]
    pub price_to_sales_ratio: Option<f64>,
    #[serde(default)]
    pub price_to_book_ratio: Option<f64>,
    #[serde(default)]
    pub pb_ratio: Option<f64>,
    #[serde(default)]
    pub return_on_equity: Option<f64>,
    #[serde(default)]
    pub dividend_yield: Option<f64>,
    #[serde(default)]
    pub debt_to_equity: Option<f64>,
    #[serde(default)]
    pub debt_to_equity_ratio: Option<f64>,
}

impl Fundamentals {
    pub fn price_to_book(&self) -> Option<f64> {
        self.price_to_book_ratio.or(self.pb_ratio)
    }

    pub fn debt_equity(&self) -> Option<f64> {
        self.debt_to_equity.or(self.debt_to_equity_ratio)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Technicals {
    #[serde(default)]
    pub rsi: Option<f64>,
    #[serde(default)]
    pub sma: Option<f64>,
}

/// Full response of the dashboard endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    #[serde(default)]
    pub profile: StockProfile,
    #[serde(default)]
    pub live_quote: LiveQuote,
    #[serde(default)]
    pub fundamentals: Option<Fundamentals>,
    #[serde(default)]
    pub technicals: Option<Technicals>,
}

/// Which detail endpoint and view to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailMode {
    Simple,
    #[default]
    Dashboard,
}

/// How the recommendation list is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultsLayout {
    #[default]
    Cards,
    Table,
}

/// Payload of a detail fetch, matching the mode it was requested with.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailPayload {
    Profile(StockProfile),
    Dashboard(Box<Dashboard>),
}

//! Detail panel models: the simple profile view and the extended dashboard.
//!
//! Views hold display-ready strings. Every constructor fills every field, so
//! the UI never has to decide what a missing value looks like.

use crate::format::{
    NOT_AVAILABLE, PLACEHOLDER, format_as_percentage, format_large_number, format_number,
    format_price, format_range, format_signed, format_signed_percent, text_or_na,
};
use crate::models::{
    Dashboard, DetailMode, DetailPayload, Fundamentals, LiveQuote, StockProfile, Technicals,
};

/// Primary label shown when the detail fetch fails.
pub const ERROR_LABEL: &str = "Error loading data";

/// Largest relative move of one simulated price tick (0.05%).
pub const MAX_JITTER: f64 = 0.0005;

/// Direction of the day's price change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Flat,
    Unknown,
}

impl Trend {
    pub fn from_change(change: Option<f64>) -> Self {
        match change.filter(|c| c.is_finite()) {
            Some(c) if c > 0.0 => Trend::Up,
            Some(c) if c < 0.0 => Trend::Down,
            Some(_) => Trend::Flat,
            None => Trend::Unknown,
        }
    }
}

/// Price position relative to its simple moving average.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmaSignal {
    Bullish,
    Bearish,
    Unavailable,
}

impl SmaSignal {
    /// Bullish strictly above the SMA; equal counts as bearish.
    pub fn classify(price: Option<f64>, sma: Option<f64>) -> Self {
        match (price.filter(|p| p.is_finite()), sma.filter(|s| s.is_finite())) {
            (Some(p), Some(s)) if p > s => SmaSignal::Bullish,
            (Some(_), Some(_)) => SmaSignal::Bearish,
            _ => SmaSignal::Unavailable,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SmaSignal::Bullish => "BULLISH",
            SmaSignal::Bearish => "BEARISH",
            SmaSignal::Unavailable => NOT_AVAILABLE,
        }
    }

    /// Sentence citing both values.
    pub fn describe(&self, price: Option<f64>, sma: Option<f64>) -> String {
        match self {
            SmaSignal::Bullish => format!(
                "Price {} is above its SMA {}, a bullish signal.",
                format_price(price),
                format_price(sma)
            ),
            SmaSignal::Bearish => format!(
                "Price {} is at or below its SMA {}, a bearish signal.",
                format_price(price),
                format_price(sma)
            ),
            SmaSignal::Unavailable => "Not enough data to compare price with its SMA.".to_string(),
        }
    }
}

/// Gauge rotation in turns: RSI 0..=100 maps to 0..=0.5, missing maps to 0.
pub fn rsi_rotation(rsi: Option<f64>) -> f64 {
    match rsi.filter(|r| r.is_finite()) {
        Some(r) => r.clamp(0.0, 100.0) / 100.0 * 0.5,
        None => 0.0,
    }
}

/// Lifecycle of the detail panel.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailStatus {
    Loading,
    Ready,
    Failed(String),
}

/// Company profile modal.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileView {
    pub name: String,
    pub ticker: String,
    pub sector: String,
    pub industry: String,
    pub market_cap: String,
    pub website: String,
    pub description: String,
}

impl ProfileView {
    pub fn loading(symbol: &str) -> Self {
        Self {
            name: PLACEHOLDER.to_string(),
            ticker: symbol.to_string(),
            sector: PLACEHOLDER.to_string(),
            industry: PLACEHOLDER.to_string(),
            market_cap: PLACEHOLDER.to_string(),
            website: PLACEHOLDER.to_string(),
            description: PLACEHOLDER.to_string(),
        }
    }

    pub fn from_profile(symbol: &str, profile: &StockProfile) -> Self {
        Self {
            name: text_or_na(profile.company_name.as_deref()),
            ticker: profile.symbol.clone().unwrap_or_else(|| symbol.to_string()),
            sector: text_or_na(profile.sector.as_deref()),
            industry: text_or_na(profile.industry.as_deref()),
            market_cap: format_large_number(profile.market_cap),
            website: text_or_na(profile.website.as_deref()),
            description: text_or_na(profile.description.as_deref()),
        }
    }
}

/// One row of the fundamentals table.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRow {
    pub label: &'static str,
    pub value: String,
}

const FUNDAMENTAL_LABELS: [&str; 6] = [
    "P/E Ratio",
    "Price/Sales",
    "Price/Book",
    "Return on Equity",
    "Dividend Yield",
    "Debt/Equity",
];

fn fundamental_rows(fundamentals: Option<&Fundamentals>) -> Vec<MetricRow> {
    let f = fundamentals.cloned().unwrap_or_default();
    let values = [
        format_number(f.pe_ratio, 2),
        format_number(f.price_to_sales_ratio, 2),
        format_number(f.price_to_book(), 2),
        format_as_percentage(f.return_on_equity),
        format_as_percentage(f.dividend_yield),
        format_number(f.debt_equity(), 2),
    ];
    FUNDAMENTAL_LABELS
        .into_iter()
        .zip(values)
        .map(|(label, value)| MetricRow { label, value })
        .collect()
}

/// Extended dashboard: profile, live quote, fundamentals and technicals.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub profile: ProfileView,
    pub exchange: String,
    /// Displayed price, moved by the live ticker
    pub live_price: Option<f64>,
    pub price: String,
    pub change: String,
    pub change_percent: String,
    pub trend: Trend,
    pub day_range: String,
    pub year_range: String,
    pub volume: String,
    pub fundamentals: Vec<MetricRow>,
    pub rsi: String,
    pub rsi_rotation: f64,
    pub sma_signal: SmaSignal,
    pub sma_label: String,
    pub sma_text: String,
}

impl DashboardView {
    pub fn loading(symbol: &str) -> Self {
        let placeholder = || PLACEHOLDER.to_string();
        Self {
            profile: ProfileView::loading(symbol),
            exchange: placeholder(),
            live_price: None,
            price: placeholder(),
            change: placeholder(),
            change_percent: placeholder(),
            trend: Trend::Unknown,
            day_range: placeholder(),
            year_range: placeholder(),
            volume: placeholder(),
            fundamentals: FUNDAMENTAL_LABELS
                .into_iter()
                .map(|label| MetricRow {
                    label,
                    value: placeholder(),
                })
                .collect(),
            rsi: placeholder(),
            rsi_rotation: 0.0,
            sma_signal: SmaSignal::Unavailable,
            sma_label: placeholder(),
            sma_text: placeholder(),
        }
    }

    pub fn from_dashboard(symbol: &str, dashboard: &Dashboard) -> Self {
        let LiveQuote {
            price,
            change,
            changes_percentage,
            day_high,
            day_low,
            year_high,
            year_low,
            volume,
            market_cap,
        } = dashboard.live_quote.clone();
        let Technicals { rsi, sma } = dashboard.technicals.clone().unwrap_or_default();

        let mut profile = ProfileView::from_profile(symbol, &dashboard.profile);
        if market_cap.is_some() {
            profile.market_cap = format_large_number(market_cap);
        }

        let (profile_year_low, profile_year_high) = dashboard.profile.year_range();
        let sma_signal = SmaSignal::classify(price, sma);

        Self {
            profile,
            exchange: text_or_na(dashboard.profile.exchange_label()),
            live_price: price.filter(|p| p.is_finite()),
            price: format_price(price),
            change: format_signed(change),
            change_percent: format_signed_percent(changes_percentage),
            trend: Trend::from_change(change.or(changes_percentage)),
            day_range: format_range(day_low, day_high),
            year_range: format_range(
                year_low.or(profile_year_low),
                year_high.or(profile_year_high),
            ),
            volume: format_large_number(volume.or(dashboard.profile.volume_or_average())),
            fundamentals: fundamental_rows(dashboard.fundamentals.as_ref()),
            rsi: format_number(rsi, 2),
            rsi_rotation: rsi_rotation(rsi),
            sma_signal,
            sma_label: sma_signal.label().to_string(),
            sma_text: sma_signal.describe(price, sma),
        }
    }

    /// Move the displayed price by `fraction` (clamped to ±0.05%).
    ///
    /// Returns false when there is no price to move.
    pub fn apply_jitter(&mut self, fraction: f64) -> bool {
        let Some(current) = self.live_price else {
            return false;
        };
        let fraction = if fraction.is_finite() {
            fraction.clamp(-MAX_JITTER, MAX_JITTER)
        } else {
            0.0
        };
        let next = current * (1.0 + fraction);
        self.live_price = Some(next);
        self.price = format_price(Some(next));
        true
    }
}

/// Detail content at one of the two fidelity levels.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailContent {
    Profile(ProfileView),
    Dashboard(Box<DashboardView>),
}

/// The detail panel as a whole.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub symbol: String,
    pub status: DetailStatus,
    pub content: DetailContent,
}

impl DetailView {
    /// Fresh panel with every field reset to the placeholder.
    pub fn loading(symbol: &str, mode: DetailMode) -> Self {
        let content = match mode {
            DetailMode::Simple => DetailContent::Profile(ProfileView::loading(symbol)),
            DetailMode::Dashboard => {
                DetailContent::Dashboard(Box::new(DashboardView::loading(symbol)))
            }
        };
        Self {
            symbol: symbol.to_string(),
            status: DetailStatus::Loading,
            content,
        }
    }

    /// Fill the panel from a fetched record.
    pub fn populate(&mut self, payload: &DetailPayload) {
        self.content = match payload {
            DetailPayload::Profile(profile) => {
                DetailContent::Profile(ProfileView::from_profile(&self.symbol, profile))
            }
            DetailPayload::Dashboard(dashboard) => DetailContent::Dashboard(Box::new(
                DashboardView::from_dashboard(&self.symbol, dashboard),
            )),
        };
        self.status = DetailStatus::Ready;
    }

    /// Replace the primary label with an error marker and leave the loading state.
    pub fn fail(&mut self, reason: impl Into<String>) {
        let profile = match &mut self.content {
            DetailContent::Profile(profile) => profile,
            DetailContent::Dashboard(dashboard) => &mut dashboard.profile,
        };
        profile.name = ERROR_LABEL.to_string();
        self.status = DetailStatus::Failed(reason.into());
    }

    pub fn title(&self) -> &str {
        match &self.content {
            DetailContent::Profile(profile) => &profile.name,
            DetailContent::Dashboard(dashboard) => &dashboard.profile.name,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == DetailStatus::Loading
    }

    /// Loaded dashboard that has a price to animate.
    pub fn has_live_price(&self) -> bool {
        matches!(
            (&self.status, &self.content),
            (DetailStatus::Ready, DetailContent::Dashboard(d)) if d.live_price.is_some()
        )
    }

    pub fn apply_jitter(&mut self, fraction: f64) -> bool {
        match (&self.status, &mut self.content) {
            (DetailStatus::Ready, DetailContent::Dashboard(dashboard)) => {
                dashboard.apply_jitter(fraction)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Technicals;

    fn sample_dashboard() -> Dashboard {
        Dashboard {
            profile: StockProfile {
                symbol: Some("AAPL".to_string()),
                company_name: Some("Apple Inc.".to_string()),
                exchange: Some("NASDAQ".to_string()),
                sector: Some("Technology".to_string()),
                range: Some("164.08-199.62".to_string()),
                ..StockProfile::default()
            },
            live_quote: LiveQuote {
                price: Some(190.0),
                change: Some(-1.5),
                changes_percentage: Some(-0.78),
                day_high: Some(192.0),
                day_low: Some(188.5),
                volume: Some(54_000_000.0),
                market_cap: Some(2_950_000_000_000.0),
                ..LiveQuote::default()
            },
            fundamentals: Some(Fundamentals {
                pe_ratio: Some(29.123),
                return_on_equity: Some(0.25),
                dividend_yield: Some(0.0052),
                ..Fundamentals::default()
            }),
            technicals: Some(Technicals {
                rsi: Some(60.0),
                sma: Some(185.0),
            }),
        }
    }

    #[test]
    fn test_rsi_rotation() {
        assert_eq!(rsi_rotation(Some(0.0)), 0.0);
        assert_eq!(rsi_rotation(Some(50.0)), 0.25);
        assert_eq!(rsi_rotation(Some(100.0)), 0.5);
        assert_eq!(rsi_rotation(Some(140.0)), 0.5);
        assert_eq!(rsi_rotation(None), 0.0);
    }

    #[test]
    fn test_sma_classification() {
        assert_eq!(SmaSignal::classify(Some(101.0), Some(100.0)), SmaSignal::Bullish);
        assert_eq!(SmaSignal::classify(Some(99.0), Some(100.0)), SmaSignal::Bearish);
        assert_eq!(SmaSignal::classify(Some(100.0), Some(100.0)), SmaSignal::Bearish);
        assert_eq!(SmaSignal::classify(None, Some(100.0)), SmaSignal::Unavailable);
        assert_eq!(SmaSignal::classify(Some(100.0), None), SmaSignal::Unavailable);
    }

    #[test]
    fn test_sma_sentence_cites_both_values() {
        let text = SmaSignal::Bullish.describe(Some(190.0), Some(185.0));
        assert!(text.contains("$190.00"));
        assert!(text.contains("$185.00"));
        assert!(text.contains("bullish"));
    }

    #[test]
    fn test_loading_view_is_all_placeholders() {
        let view = DashboardView::loading("MSFT");
        assert_eq!(view.profile.ticker, "MSFT");
        assert_eq!(view.profile.name, "--");
        assert_eq!(view.price, "--");
        assert_eq!(view.change_percent, "--");
        assert_eq!(view.year_range, "--");
        assert_eq!(view.rsi, "--");
        assert_eq!(view.rsi_rotation, 0.0);
        assert_eq!(view.sma_text, "--");
        assert_eq!(view.fundamentals.len(), 6);
        assert!(view.fundamentals.iter().all(|row| row.value == "--"));
    }

    #[test]
    fn test_dashboard_from_record() {
        let view = DashboardView::from_dashboard("AAPL", &sample_dashboard());

        assert_eq!(view.profile.name, "Apple Inc.");
        assert_eq!(view.profile.market_cap, "2.95T");
        assert_eq!(view.profile.industry, "N/A");
        assert_eq!(view.exchange, "NASDAQ");
        assert_eq!(view.price, "$190.00");
        assert_eq!(view.change, "-1.50");
        assert_eq!(view.change_percent, "-0.78%");
        assert_eq!(view.trend, Trend::Down);
        assert_eq!(view.day_range, "$188.50 - $192.00");
        assert_eq!(view.year_range, "$164.08 - $199.62");
        assert_eq!(view.volume, "54.00M");
        assert_eq!(view.rsi, "60.00");
        assert_eq!(view.rsi_rotation, 0.3);
        assert_eq!(view.sma_signal, SmaSignal::Bullish);
        assert_eq!(view.sma_label, "BULLISH");
    }

    #[test]
    fn test_dashboard_decodes_provider_profile_block() {
        let dashboard: Dashboard = serde_json::from_str(
            r#"{
                "profile": {
                    "symbol": "KO",
                    "companyName": "The Coca-Cola Company",
                    "exchange": "New York Stock Exchange",
                    "exchangeShortName": "NYSE",
                    "volAvg": 2000000,
                    "mktCap": 260000000000
                },
                "liveQuote": {"price": 60.0},
                "fundamentals": {"pbRatio": 1.5, "debtToEquityRatio": 0.4}
            }"#,
        )
        .unwrap();
        let view = DashboardView::from_dashboard("KO", &dashboard);

        assert_eq!(view.exchange, "NYSE");
        assert_eq!(view.volume, "2.00M");
        assert_eq!(view.fundamentals[2].value, "1.50");
        assert_eq!(view.fundamentals[5].value, "0.40");
    }

    #[test]
    fn test_fundamentals_table_formatting() {
        let view = DashboardView::from_dashboard("AAPL", &sample_dashboard());
        let values: Vec<(&str, &str)> = view
            .fundamentals
            .iter()
            .map(|row| (row.label, row.value.as_str()))
            .collect();

        assert_eq!(
            values,
            vec![
                ("P/E Ratio", "29.12"),
                ("Price/Sales", "N/A"),
                ("Price/Book", "N/A"),
                ("Return on Equity", "25.00%"),
                ("Dividend Yield", "0.52%"),
                ("Debt/Equity", "N/A"),
            ]
        );
    }

    #[test]
    fn test_missing_sections_degrade_to_na() {
        let view = DashboardView::from_dashboard("XYZ", &Dashboard::default());
        assert_eq!(view.profile.ticker, "XYZ");
        assert_eq!(view.profile.name, "N/A");
        assert_eq!(view.price, "N/A");
        assert_eq!(view.rsi, "N/A");
        assert_eq!(view.rsi_rotation, 0.0);
        assert_eq!(view.sma_signal, SmaSignal::Unavailable);
        assert!(view.fundamentals.iter().all(|row| row.value == "N/A"));
    }

    #[test]
    fn test_jitter_only_moves_price() {
        let mut view = DashboardView::from_dashboard("AAPL", &sample_dashboard());
        let before = view.clone();

        assert!(view.apply_jitter(0.0002));
        assert_eq!(view.live_price, Some(190.0 * (1.0 + 0.0002)));
        assert_eq!(view.price, "$190.04");
        assert_eq!(view.change, before.change);
        assert_eq!(view.fundamentals, before.fundamentals);
        assert_eq!(view.sma_text, before.sma_text);
    }

    #[test]
    fn test_jitter_is_clamped() {
        let mut view = DashboardView::from_dashboard("AAPL", &sample_dashboard());
        view.apply_jitter(0.5);
        assert_eq!(view.live_price, Some(190.0 * (1.0 + MAX_JITTER)));
    }

    #[test]
    fn test_jitter_without_price_is_noop() {
        let mut view = DashboardView::loading("AAPL");
        assert!(!view.apply_jitter(0.0001));
        assert_eq!(view.price, "--");
    }

    #[test]
    fn test_detail_view_lifecycle() {
        let mut detail = DetailView::loading("AAPL", DetailMode::Dashboard);
        assert!(detail.is_loading());
        assert!(!detail.has_live_price());
        assert!(!detail.apply_jitter(0.0001));

        detail.populate(&DetailPayload::Dashboard(Box::new(sample_dashboard())));
        assert_eq!(detail.status, DetailStatus::Ready);
        assert_eq!(detail.title(), "Apple Inc.");
        assert!(detail.has_live_price());
    }

    #[test]
    fn test_detail_view_failure() {
        let mut detail = DetailView::loading("AAPL", DetailMode::Simple);
        detail.fail("the server answered 404 Not Found");

        assert_eq!(detail.title(), ERROR_LABEL);
        assert!(!detail.is_loading());
        assert!(matches!(detail.status, DetailStatus::Failed(_)));
    }

    #[test]
    fn test_simple_profile_view() {
        let mut detail = DetailView::loading("AAPL", DetailMode::Simple);
        detail.populate(&DetailPayload::Profile(StockProfile {
            company_name: Some("Apple Inc.".to_string()),
            market_cap: Some(1_500_000_000.0),
            ..StockProfile::default()
        }));

        let DetailContent::Profile(profile) = &detail.content else {
            panic!("expected profile content");
        };
        assert_eq!(profile.ticker, "AAPL");
        assert_eq!(profile.market_cap, "1.50B");
        assert_eq!(profile.website, "N/A");
        assert!(!detail.has_live_price());
    }
}

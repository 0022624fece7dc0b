//! Turns a recommendation list into what the results pane shows.

use crate::format::{format_price, text_or_na};
use crate::models::RecommendationItem;

/// One selectable stock in the results pane.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultCard {
    /// Ticker used to open the detail view
    pub ticker: String,
    pub company_name: String,
    pub reason: String,
    pub price: Option<String>,
}

/// The whole results pane. Each render replaces the previous value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResultsView {
    /// Nothing asked yet
    #[default]
    Empty,
    NoResults,
    SystemNotice {
        title: String,
        message: String,
    },
    Stocks(Vec<ResultCard>),
}

impl ResultsView {
    /// Tickers of the selectable cards, in display order.
    pub fn tickers(&self) -> Vec<&str> {
        match self {
            ResultsView::Stocks(cards) => cards.iter().map(|c| c.ticker.as_str()).collect(),
            _ => Vec::new(),
        }
    }

    pub fn card_count(&self) -> usize {
        match self {
            ResultsView::Stocks(cards) => cards.len(),
            _ => 0,
        }
    }
}

/// Build the results view. A leading system entry wins over everything else.
pub fn render_results(items: Option<&[RecommendationItem]>) -> ResultsView {
    let items = match items {
        Some(items) if !items.is_empty() => items,
        _ => return ResultsView::NoResults,
    };

    if items[0].is_system() {
        let notice = &items[0];
        return ResultsView::SystemNotice {
            title: text_or_na(notice.company_name.as_deref()),
            message: notice.reason.clone().unwrap_or_default(),
        };
    }

    // A sentinel further down the list is never shown as a stock
    let cards = items
        .iter()
        .filter(|item| !item.is_system())
        .map(|item| ResultCard {
            ticker: item.ticker.trim().to_string(),
            company_name: text_or_na(item.company_name.as_deref()),
            reason: item.reason.clone().unwrap_or_default(),
            price: item.price.map(|p| format_price(Some(p))),
        })
        .collect();

    ResultsView::Stocks(cards)
}

//! Batch output and export of recommendation results.
//!
//! Provides plain text, CSV and JSON renderings for piping into other tools.

use crate::cli::ExportFormat;
use crate::dashboard::{DetailContent, DetailStatus, DetailView};
use crate::models::RecommendationItem;
use crate::results::{ResultsView, render_results};
use serde::Serialize;

/// Export recommendations in the specified format.
pub fn export_results(items: &[RecommendationItem], format: ExportFormat) -> String {
    match format {
        ExportFormat::Text => export_text(items),
        ExportFormat::Csv => export_csv(items),
        ExportFormat::Json => export_json(items),
    }
}

/// Export as plain text (screen reader friendly).
fn export_text(items: &[RecommendationItem]) -> String {
    let mut output = String::new();

    output.push_str("GENIUSMIND RECOMMENDATIONS\n");
    output.push_str("==========================\n\n");

    match render_results(Some(items)) {
        ResultsView::Stocks(cards) => {
            for card in cards {
                output.push_str(&format!("Symbol: {}\n", card.ticker));
                output.push_str(&format!("Name: {}\n", card.company_name));
                if let Some(price) = card.price {
                    output.push_str(&format!("Price: {}\n", price));
                }
                output.push_str(&format!("Reason: {}\n\n", card.reason));
            }
        }
        ResultsView::SystemNotice { title, message } => {
            output.push_str(&format!("{}\n{}\n", title, message));
        }
        ResultsView::NoResults | ResultsView::Empty => output.push_str("No results.\n"),
    }

    output
}

fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Stocks that should appear as rows; empty for a notice or no results.
fn stock_items(items: &[RecommendationItem]) -> Vec<&RecommendationItem> {
    match render_results(Some(items)) {
        ResultsView::Stocks(_) => items.iter().filter(|item| !item.is_system()).collect(),
        _ => Vec::new(),
    }
}

/// Export as CSV (comma-separated values).
///
/// A system notice is written under its own `Notice,Message` header.
fn export_csv(items: &[RecommendationItem]) -> String {
    if let ResultsView::SystemNotice { title, message } = render_results(Some(items)) {
        return format!("Notice,Message\n{},{}\n", csv_field(&title), csv_field(&message));
    }

    let mut output = String::from("Symbol,Name,Price,Reason\n");

    for item in stock_items(items) {
        let price = item.price.map(|p| format!("{:.2}", p)).unwrap_or_default();
        output.push_str(&format!(
            "{},{},{},{}\n",
            csv_field(&item.ticker),
            csv_field(item.company_name.as_deref().unwrap_or("")),
            price,
            csv_field(item.reason.as_deref().unwrap_or("")),
        ));
    }

    output
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonRecord<'a> {
    symbol: &'a str,
    company_name: Option<&'a str>,
    price: Option<f64>,
    reason: Option<&'a str>,
}

#[derive(Serialize)]
struct JsonNotice {
    notice: NoticeBody,
}

#[derive(Serialize)]
struct NoticeBody {
    title: String,
    message: String,
}

/// Export as JSON: an array of stocks, or a `{"notice": ...}` object.
fn export_json(items: &[RecommendationItem]) -> String {
    let rendered = match render_results(Some(items)) {
        ResultsView::SystemNotice { title, message } => {
            serde_json::to_string_pretty(&JsonNotice {
                notice: NoticeBody { title, message },
            })
        }
        _ => {
            let records: Vec<JsonRecord<'_>> = stock_items(items)
                .into_iter()
                .map(|item| JsonRecord {
                    symbol: &item.ticker,
                    company_name: item.company_name.as_deref(),
                    price: item.price,
                    reason: item.reason.as_deref(),
                })
                .collect();
            serde_json::to_string_pretty(&records)
        }
    };

    // Serializing plain records cannot fail
    rendered.unwrap_or_else(|_| "[]".to_string()) + "\n"
}

/// Multi-line summary of a detail view for batch output.
pub fn detail_summary(detail: &DetailView) -> String {
    if let DetailStatus::Failed(reason) = &detail.status {
        return format!("{}: {} ({})\n", detail.symbol, detail.title(), reason);
    }

    let mut output = String::new();
    match &detail.content {
        DetailContent::Profile(profile) => {
            output.push_str(&format!("{} ({})\n", profile.name, profile.ticker));
            output.push_str(&format!("  Sector:     {} / {}\n", profile.sector, profile.industry));
            output.push_str(&format!("  Market Cap: {}\n", profile.market_cap));
            output.push_str(&format!("  Website:    {}\n", profile.website));
        }
        DetailContent::Dashboard(view) => {
            output.push_str(&format!(
                "{} ({}) {}\n",
                view.profile.name, view.profile.ticker, view.exchange
            ));
            output.push_str(&format!(
                "  Price:      {} {} ({})\n",
                view.price, view.change, view.change_percent
            ));
            output.push_str(&format!("  Day Range:  {}\n", view.day_range));
            output.push_str(&format!("  52W Range:  {}\n", view.year_range));
            output.push_str(&format!("  Volume:     {}\n", view.volume));
            output.push_str(&format!("  Market Cap: {}\n", view.profile.market_cap));
            for row in &view.fundamentals {
                output.push_str(&format!("  {:<17} {}\n", format!("{}:", row.label), row.value));
            }
            output.push_str(&format!("  RSI:        {}\n", view.rsi));
            output.push_str(&format!("  SMA:        {} - {}\n", view.sma_label, view.sma_text));
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DetailMode, DetailPayload, StockProfile};

    fn items() -> Vec<RecommendationItem> {
        vec![
            RecommendationItem {
                ticker: "AAPL".to_string(),
                company_name: Some("Apple Inc.".to_string()),
                reason: Some("ROE of 147%, \"wide\" moat".to_string()),
                price: Some(190.5),
            },
            RecommendationItem {
                ticker: "KO".to_string(),
                company_name: None,
                reason: None,
                price: None,
            },
        ]
    }

    #[test]
    fn test_export_csv() {
        let csv = export_results(&items(), ExportFormat::Csv);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Symbol,Name,Price,Reason");
        assert_eq!(
            lines[1],
            "\"AAPL\",\"Apple Inc.\",190.50,\"ROE of 147%, \"\"wide\"\" moat\""
        );
        assert_eq!(lines[2], "\"KO\",\"\",,\"\"");
    }

    #[test]
    fn test_export_json() {
        let json = export_results(&items(), ExportFormat::Json);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["symbol"], "AAPL");
        assert_eq!(parsed[0]["companyName"], "Apple Inc.");
        assert_eq!(parsed[1]["price"], serde_json::Value::Null);
    }

    #[test]
    fn test_export_text_system_notice() {
        let notice = vec![RecommendationItem {
            ticker: "SYSTEM".to_string(),
            company_name: Some("No Stocks Found".to_string()),
            reason: Some("Please try a broader request.".to_string()),
            price: None,
        }];
        let text = export_results(&notice, ExportFormat::Text);
        assert!(text.contains("No Stocks Found"));
        assert!(!text.contains("Symbol:"));
    }

    fn notice_first() -> Vec<RecommendationItem> {
        let mut list = vec![RecommendationItem {
            ticker: "SYSTEM".to_string(),
            company_name: Some("No Stocks Found".to_string()),
            reason: Some("Please try a broader request.".to_string()),
            price: None,
        }];
        list.extend(items());
        list
    }

    #[test]
    fn test_export_csv_system_notice() {
        let csv = export_results(&notice_first(), ExportFormat::Csv);
        assert_eq!(
            csv,
            "Notice,Message\n\"No Stocks Found\",\"Please try a broader request.\"\n"
        );
        assert!(!csv.contains("\"SYSTEM\""));
        assert!(!csv.contains("AAPL"));
    }

    #[test]
    fn test_export_json_system_notice() {
        let json = export_results(&notice_first(), ExportFormat::Json);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["notice"]["title"], "No Stocks Found");
        assert_eq!(parsed["notice"]["message"], "Please try a broader request.");
        assert!(!json.contains("SYSTEM"));
    }

    #[test]
    fn test_export_skips_trailing_sentinel() {
        let mut list = items();
        list.push(notice_first().remove(0));

        let csv = export_results(&list, ExportFormat::Csv);
        assert_eq!(csv.lines().count(), 3);
        assert!(!csv.contains("SYSTEM"));

        let json = export_results(&list, ExportFormat::Json);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_export_empty_list() {
        assert_eq!(export_results(&[], ExportFormat::Csv), "Symbol,Name,Price,Reason\n");
        assert_eq!(export_results(&[], ExportFormat::Json), "[]\n");
    }

    #[test]
    fn test_export_text_cards() {
        let text = export_results(&items(), ExportFormat::Text);
        assert!(text.contains("Symbol: AAPL"));
        assert!(text.contains("Price: $190.50"));
        assert!(text.contains("Name: N/A"));
    }

    #[test]
    fn test_detail_summary() {
        let mut detail = DetailView::loading("AAPL", DetailMode::Simple);
        detail.populate(&DetailPayload::Profile(StockProfile {
            company_name: Some("Apple Inc.".to_string()),
            market_cap: Some(3.0e12),
            ..StockProfile::default()
        }));
        let summary = detail_summary(&detail);
        assert!(summary.starts_with("Apple Inc. (AAPL)"));
        assert!(summary.contains("3.00T"));

        detail.fail("the server answered 404 Not Found");
        assert!(detail_summary(&detail).contains("Error loading data"));
    }
}

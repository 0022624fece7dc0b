//! Display formatting for prices, ratios and large numbers.
//!
//! Every formatter takes an `Option` so that a missing field can never turn
//! into "0" or "NaN" on screen.

use num_format::{Locale, ToFormattedString};

/// Marker shown for any value the backend did not provide.
pub const NOT_AVAILABLE: &str = "N/A";

/// Marker shown while a value is still being fetched.
pub const PLACEHOLDER: &str = "--";

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Fixed-decimal rendering, or "N/A" when absent.
pub fn format_number(value: Option<f64>, decimals: usize) -> String {
    match finite(value) {
        Some(v) => format!("{:.*}", decimals, v),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Large numbers with T/B/M suffixes, otherwise a grouped integer.
pub fn format_large_number(value: Option<f64>) -> String {
    let Some(v) = finite(value) else {
        return NOT_AVAILABLE.to_string();
    };

    if v >= 1e12 {
        format!("{:.2}T", v / 1e12)
    } else if v >= 1e9 {
        format!("{:.2}B", v / 1e9)
    } else if v >= 1e6 {
        format!("{:.2}M", v / 1e6)
    } else {
        let rounded = v.round() as i64;
        rounded.to_formatted_string(&Locale::en)
    }
}

/// Renders a fraction as a percentage: `0.1534` becomes `15.34%`.
pub fn format_as_percentage(value: Option<f64>) -> String {
    match finite(value) {
        Some(v) => format!("{:.2}%", v * 100.0),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Price with a currency sign.
pub fn format_price(price: Option<f64>) -> String {
    match finite(price) {
        Some(p) if p.abs() >= 1.0 || p == 0.0 => format!("${:.2}", p),
        // Sub-dollar prices need more precision to be meaningful
        Some(p) => format!("${:.4}", p),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Signed change with two decimals, e.g. `+1.25` or `-0.40`.
pub fn format_signed(value: Option<f64>) -> String {
    match finite(value) {
        Some(v) => format!("{:+.2}", v),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Signed percent for values already expressed in percent units.
pub fn format_signed_percent(value: Option<f64>) -> String {
    match finite(value) {
        Some(v) => format!("{:+.2}%", v),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Low/high pair rendered as a range.
pub fn format_range(low: Option<f64>, high: Option<f64>) -> String {
    match (finite(low), finite(high)) {
        (None, None) => NOT_AVAILABLE.to_string(),
        (low, high) => format!("{} - {}", format_price(low), format_price(high)),
    }
}

/// Text fallback for optional strings: empty and missing both become "N/A".
pub fn text_or_na(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Truncate string to max length.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        ".".repeat(max_len)
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}

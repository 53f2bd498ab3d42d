use chrono::{DateTime, Utc};

/// Render a number with thousands separators and up to three decimals, trailing zeros dropped.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let rounded = (value * 1000.0).round() / 1000.0;
    let negative = rounded < 0.0;
    let fixed = format!("{:.3}", rounded.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if negative && (whole != "0" || !fraction.is_empty()) {
        "-"
    } else {
        ""
    };

    if fraction.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{fraction}")
    }
}

pub fn format_currency(value: f64) -> String {
    format!("${}", format_number(value))
}

pub fn format_percent(value: f64) -> String {
    format!("{value:.1}%")
}

/// Month/day/year without zero padding.
pub fn format_short_date(value: DateTime<Utc>) -> String {
    value.format("%-m/%-d/%Y").to_string()
}

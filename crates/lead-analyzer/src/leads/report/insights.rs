use super::breakdown::{
    average_conversion_probability, conversion_rate, most_valuable_source, recent_leads_count,
    total_value,
};
use super::views::{InsightItem, InsightKind, InsightValue};
use crate::leads::domain::Lead;
use crate::leads::format::{format_currency, format_number, format_percent};
use chrono::{DateTime, Utc};

/// Estimated value at or above which a lead counts as high value.
pub const HIGH_VALUE_THRESHOLD: f64 = 10_000.0;
const AT_RISK_PROBABILITY: f64 = 0.3;
const HEALTHY_CONVERSION_RATE: f64 = 20.0;
const NO_SOURCE: &str = "N/A";

/// Headline statements about a lead list, always in the same order.
pub fn generate_insights(leads: &[Lead], now: DateTime<Utc>) -> Vec<InsightItem> {
    if leads.is_empty() {
        return Vec::new();
    }

    let high_value: Vec<&Lead> = leads
        .iter()
        .filter(|lead| lead.estimated_value >= HIGH_VALUE_THRESHOLD)
        .collect();
    let rate = conversion_rate(leads);
    let recent = recent_leads_count(leads, now);
    let at_risk = high_value
        .iter()
        .filter(|lead| lead.conversion_probability < AT_RISK_PROBABILITY)
        .count();

    let mut insights = vec![
        insight(
            InsightKind::Info,
            "Total Lead Value",
            "The sum of all estimated lead values".to_string(),
            InsightValue::Text(format_currency(total_value(leads))),
        ),
        insight(
            InsightKind::Info,
            "Average Conversion Probability",
            "The average likelihood of converting leads".to_string(),
            InsightValue::Text(format_percent(average_conversion_probability(leads) * 100.0)),
        ),
        insight(
            InsightKind::Success,
            "High Value Leads",
            format!("Leads with value ≥ ${}", format_number(HIGH_VALUE_THRESHOLD)),
            InsightValue::Count(high_value.len()),
        ),
        insight(
            if rate > HEALTHY_CONVERSION_RATE {
                InsightKind::Success
            } else {
                InsightKind::Warning
            },
            "Conversion Rate",
            "Percentage of leads that converted".to_string(),
            InsightValue::Text(format_percent(rate)),
        ),
        insight(
            InsightKind::Success,
            "Most Valuable Source",
            "Lead source with the highest total value".to_string(),
            InsightValue::Text(
                most_valuable_source(leads).unwrap_or_else(|| NO_SOURCE.to_string()),
            ),
        ),
        insight(
            if recent > 0 {
                InsightKind::Info
            } else {
                InsightKind::Warning
            },
            "Recent Lead Activity",
            "New leads in the past 7 days".to_string(),
            InsightValue::Count(recent),
        ),
    ];

    if at_risk > 0 {
        insights.push(insight(
            InsightKind::Danger,
            "At-Risk High-Value Leads",
            "High-value leads with low conversion probability".to_string(),
            InsightValue::Count(at_risk),
        ));
    }

    insights
}

fn insight(
    kind: InsightKind,
    title: &'static str,
    description: String,
    value: InsightValue,
) -> InsightItem {
    InsightItem {
        kind,
        title,
        description,
        value,
    }
}

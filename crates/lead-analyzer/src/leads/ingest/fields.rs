use super::{LeadImportError, RecordLocation};
use chrono::{DateTime, NaiveDate, Utc};

/// Fields every imported lead must carry, in reporting order.
pub const REQUIRED_FIELDS: [&str; 8] = [
    "id",
    "name",
    "email",
    "source",
    "initialContact",
    "status",
    "conversionProbability",
    "estimatedValue",
];

pub(super) fn missing_fields<F>(is_present: F) -> Vec<&'static str>
where
    F: Fn(&str) -> bool,
{
    REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| !is_present(field))
        .collect()
}

pub(super) fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub(super) fn require_timestamp(
    location: RecordLocation,
    field: &'static str,
    value: &str,
) -> Result<DateTime<Utc>, LeadImportError> {
    parse_timestamp(value).ok_or_else(|| LeadImportError::InvalidField {
        location,
        field,
        value: value.to_string(),
    })
}

/// Finite floats only; `NaN` and infinities are rejected along with non-numeric text.
pub(super) fn require_number(
    location: RecordLocation,
    field: &'static str,
    value: &str,
) -> Result<f64, LeadImportError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
        .ok_or_else(|| LeadImportError::InvalidField {
            location,
            field,
            value: value.to_string(),
        })
}

pub(super) fn split_tags(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

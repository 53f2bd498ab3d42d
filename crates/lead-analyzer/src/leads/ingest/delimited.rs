use super::fields::{missing_fields, require_number, require_timestamp, split_tags};
use super::json::RawInteraction;
use super::{LeadImportError, RecordLocation};
use crate::leads::domain::{Interaction, Lead, LeadId, LeadScoring};
use serde::{Deserialize, Deserializer};
use std::io::Read;

pub(super) fn parse_leads<R: Read>(reader: R) -> Result<Vec<Lead>, LeadImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let missing = missing_fields(|field| headers.iter().any(|header| header == field));
    if !missing.is_empty() {
        return Err(LeadImportError::MissingHeaders { fields: missing });
    }

    let mut leads = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map(|pos| pos.line()).unwrap_or_default();
        let row: CsvLeadRow = record.deserialize(Some(&headers))?;
        leads.push(row.into_lead(RecordLocation::Line(line))?);
    }

    Ok(leads)
}

#[derive(Debug, Deserialize)]
struct CsvLeadRow {
    id: String,
    name: String,
    email: String,
    source: String,
    #[serde(rename = "initialContact")]
    initial_contact: String,
    status: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    tags: Option<String>,
    #[serde(rename = "conversionProbability")]
    conversion_probability: String,
    #[serde(rename = "estimatedValue")]
    estimated_value: String,
    #[serde(
        rename = "interactionHistory",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    interaction_history: Option<String>,
}

impl CsvLeadRow {
    fn into_lead(self, location: RecordLocation) -> Result<Lead, LeadImportError> {
        let initial_contact = require_timestamp(location, "initialContact", &self.initial_contact)?;
        let conversion_probability =
            require_number(location, "conversionProbability", &self.conversion_probability)?;
        let estimated_value = require_number(location, "estimatedValue", &self.estimated_value)?;
        let interaction_history = match self.interaction_history.as_deref() {
            Some(raw) => parse_embedded_history(location, raw)?,
            None => Vec::new(),
        };

        Ok(Lead {
            id: LeadId(self.id),
            name: self.name,
            email: self.email,
            source: self.source,
            initial_contact,
            status: self.status,
            interaction_history,
            tags: self.tags.as_deref().map(split_tags).unwrap_or_default(),
            conversion_probability,
            estimated_value,
            scoring: LeadScoring::Unscored,
        })
    }
}

fn parse_embedded_history(
    location: RecordLocation,
    raw: &str,
) -> Result<Vec<Interaction>, LeadImportError> {
    let entries: Vec<RawInteraction> =
        serde_json::from_str(raw).map_err(|_| LeadImportError::InvalidField {
            location,
            field: "interactionHistory",
            value: raw.to_string(),
        })?;

    entries
        .into_iter()
        .map(|entry| entry.into_interaction(location))
        .collect()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

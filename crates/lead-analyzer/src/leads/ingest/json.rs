use super::fields::{missing_fields, require_timestamp};
use super::{LeadImportError, RecordLocation};
use crate::leads::domain::{Interaction, Lead, LeadId, LeadScoring};
use serde::Deserialize;
use serde_json::Value;

pub(super) fn parse_leads(value: Value) -> Result<Vec<Lead>, LeadImportError> {
    let Value::Array(entries) = value else {
        return Err(LeadImportError::NotAnArray);
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| parse_entry(index, entry))
        .collect()
}

fn parse_entry(index: usize, entry: Value) -> Result<Lead, LeadImportError> {
    let missing = missing_fields(|field| entry.get(field).is_some());
    if !missing.is_empty() {
        return Err(LeadImportError::MissingFields {
            index,
            fields: missing,
        });
    }

    let location = RecordLocation::Index(index);
    let record: JsonLeadRecord = serde_json::from_value(entry)?;
    record.into_lead(location)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonLeadRecord {
    #[serde(deserialize_with = "scalar_as_string")]
    id: String,
    name: String,
    email: String,
    source: String,
    initial_contact: String,
    status: String,
    conversion_probability: f64,
    estimated_value: f64,
    #[serde(default)]
    tags: Value,
    #[serde(default)]
    interaction_history: Value,
}

impl JsonLeadRecord {
    fn into_lead(self, location: RecordLocation) -> Result<Lead, LeadImportError> {
        let initial_contact = require_timestamp(location, "initialContact", &self.initial_contact)?;

        let tags = match self.tags {
            Value::Array(_) => serde_json::from_value(self.tags)?,
            _ => Vec::new(),
        };

        let interaction_history = match self.interaction_history {
            Value::Array(_) => {
                let raw: Vec<RawInteraction> = serde_json::from_value(self.interaction_history)?;
                raw.into_iter()
                    .map(|entry| entry.into_interaction(location))
                    .collect::<Result<Vec<_>, _>>()?
            }
            _ => Vec::new(),
        };

        Ok(Lead {
            id: LeadId(self.id),
            name: self.name,
            email: self.email,
            source: self.source,
            initial_contact,
            status: self.status,
            interaction_history,
            tags,
            conversion_probability: self.conversion_probability,
            estimated_value: self.estimated_value,
            scoring: LeadScoring::Unscored,
        })
    }
}

/// Interaction entry before its timestamp is validated.
#[derive(Debug, Deserialize)]
pub(super) struct RawInteraction {
    date: String,
    #[serde(rename = "type")]
    kind: String,
    response: String,
}

impl RawInteraction {
    pub(super) fn into_interaction(
        self,
        location: RecordLocation,
    ) -> Result<Interaction, LeadImportError> {
        Ok(Interaction {
            date: require_timestamp(location, "interactionHistory", &self.date)?,
            kind: self.kind,
            response: self.response,
        })
    }
}

/// Ids arrive as strings or bare numbers depending on the exporter.
fn scalar_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(value) => Ok(value),
        Value::Number(value) => Ok(value.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number id, got {other}"
        ))),
    }
}

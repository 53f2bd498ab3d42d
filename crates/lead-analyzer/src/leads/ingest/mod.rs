mod delimited;
mod fields;
mod json;
mod synthetic;

use super::domain::Lead;
use chrono::{DateTime, Utc};
use rand::Rng;
use std::io::Read;
use std::ops::RangeInclusive;
use std::path::Path;
use tracing::{debug, warn};

pub use fields::REQUIRED_FIELDS;
pub use synthetic::SyntheticLeadGenerator;

/// Lead counts accepted for synthetic generation.
pub const SYNTHETIC_COUNT_RANGE: RangeInclusive<usize> = 5..=100;

#[derive(Debug, thiserror::Error)]
pub enum LeadImportError {
    #[error("failed to read lead data: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid JSON data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Missing required fields: {}", .fields.join(", "))]
    MissingHeaders { fields: Vec<&'static str> },
    #[error("Invalid JSON data. Expected an array of leads.")]
    NotAnArray,
    #[error("Lead at index {index} is missing required fields: {}", .fields.join(", "))]
    MissingFields {
        index: usize,
        fields: Vec<&'static str>,
    },
    #[error("Lead at {location} has an invalid {field} value '{value}'")]
    InvalidField {
        location: RecordLocation,
        field: &'static str,
        value: String,
    },
    #[error("No valid lead data found in the input.")]
    NoLeads,
}

/// Position of a rejected record, reported the way each format counts them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordLocation {
    /// 1-based CSV line, header included.
    Line(u64),
    /// 0-based JSON array index.
    Index(usize),
}

impl std::fmt::Display for RecordLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordLocation::Line(line) => write!(f, "line {line}"),
            RecordLocation::Index(index) => write!(f, "index {index}"),
        }
    }
}

/// Supported upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadFormat {
    Csv,
    Json,
}

impl LeadFormat {
    /// Infer the format from a file extension, defaulting to CSV.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("json") => Self::Json,
            _ => Self::Csv,
        }
    }
}

pub struct LeadImporter;

impl LeadImporter {
    pub fn from_path<P: AsRef<Path>>(path: P, format: LeadFormat) -> Result<Vec<Lead>, LeadImportError> {
        let file = std::fs::File::open(path)?;
        match format {
            LeadFormat::Csv => Self::from_csv_reader(file),
            LeadFormat::Json => Self::from_json_reader(file),
        }
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Vec<Lead>, LeadImportError> {
        let leads = delimited::parse_leads(reader).inspect_err(log_rejection)?;
        ensure_not_empty(leads, LeadFormat::Csv)
    }

    pub fn from_csv_str(text: &str) -> Result<Vec<Lead>, LeadImportError> {
        Self::from_csv_reader(text.trim().as_bytes())
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Vec<Lead>, LeadImportError> {
        let value: serde_json::Value = serde_json::from_reader(reader)?;
        Self::from_json_value(value)
    }

    pub fn from_json_str(text: &str) -> Result<Vec<Lead>, LeadImportError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        Self::from_json_value(value)
    }

    pub fn from_json_value(value: serde_json::Value) -> Result<Vec<Lead>, LeadImportError> {
        let leads = json::parse_leads(value).inspect_err(log_rejection)?;
        ensure_not_empty(leads, LeadFormat::Json)
    }

    /// Generate `count` synthetic leads contacted within the trailing 90 days of `now`.
    pub fn synthetic<R: Rng + ?Sized>(rng: &mut R, count: usize, now: DateTime<Utc>) -> Vec<Lead> {
        let leads = SyntheticLeadGenerator::new(now).generate(rng, count);
        debug!(count = leads.len(), "generated synthetic leads");
        leads
    }
}

fn ensure_not_empty(leads: Vec<Lead>, format: LeadFormat) -> Result<Vec<Lead>, LeadImportError> {
    if leads.is_empty() {
        warn!(?format, "lead import produced no records");
        return Err(LeadImportError::NoLeads);
    }

    debug!(?format, count = leads.len(), "imported leads");
    Ok(leads)
}

fn log_rejection(error: &LeadImportError) {
    warn!(%error, "lead import rejected");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leads::domain::LeadScoring;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const FULL_HEADER: &str = "id,name,email,source,initialContact,status,tags,conversionProbability,estimatedValue,interactionHistory";

    #[test]
    fn csv_row_with_tags_and_empty_history_imports() {
        let csv = format!(
            "{FULL_HEADER}\nlead-1,Jane Doe,jane@x.com,LinkedIn,2024-01-01T00:00:00Z,New,enterprise;vip,0.5,12000,\n"
        );
        let leads = LeadImporter::from_csv_str(&csv).expect("csv imports");

        assert_eq!(leads.len(), 1);
        let lead = &leads[0];
        assert_eq!(lead.id.as_str(), "lead-1");
        assert_eq!(lead.tags, vec!["enterprise".to_string(), "vip".to_string()]);
        assert_eq!(lead.conversion_probability, 0.5);
        assert_eq!(lead.estimated_value, 12000.0);
        assert!(lead.interaction_history.is_empty());
        assert_eq!(lead.scoring, LeadScoring::Unscored);
        assert_eq!(
            lead.initial_contact,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn csv_missing_header_names_every_missing_field() {
        let csv = "id,name,email,source,initialContact,status\nlead-1,Jane,jane@x.com,Web,2024-01-01,New\n";
        let error = LeadImporter::from_csv_str(csv).expect_err("missing headers rejected");

        match &error {
            LeadImportError::MissingHeaders { fields } => {
                assert_eq!(fields, &vec!["conversionProbability", "estimatedValue"]);
            }
            other => panic!("expected missing headers, got {other:?}"),
        }
        assert_eq!(
            error.to_string(),
            "Missing required fields: conversionProbability, estimatedValue"
        );
    }

    #[test]
    fn csv_with_quoted_interaction_history_parses_embedded_json() {
        let csv = format!(
            "{FULL_HEADER}\nlead-2,Sam Lee,sam@x.com,Webinar,2024-02-10,Qualified,,0.25,8000,\"[{{\"\"date\"\":\"\"2024-02-11T09:00:00Z\"\",\"\"type\"\":\"\"Call\"\",\"\"response\"\":\"\"Interested\"\"}}]\"\n"
        );
        let leads = LeadImporter::from_csv_str(&csv).expect("csv imports");

        let lead = &leads[0];
        assert!(lead.tags.is_empty());
        assert_eq!(lead.interaction_history.len(), 1);
        assert_eq!(lead.interaction_history[0].kind, "Call");
        assert_eq!(lead.interaction_history[0].response, "Interested");
    }

    #[test]
    fn csv_rejects_non_numeric_value() {
        let csv = format!(
            "{FULL_HEADER}\nlead-1,Jane Doe,jane@x.com,LinkedIn,2024-01-01T00:00:00Z,New,,0.5,lots,\n"
        );
        let error = LeadImporter::from_csv_str(&csv).expect_err("non-numeric rejected");

        match error {
            LeadImportError::InvalidField {
                location, field, value,
            } => {
                assert_eq!(location, RecordLocation::Line(2));
                assert_eq!(field, "estimatedValue");
                assert_eq!(value, "lots");
            }
            other => panic!("expected invalid field, got {other:?}"),
        }
    }

    #[test]
    fn csv_header_only_yields_no_leads_error() {
        let error = LeadImporter::from_csv_str(FULL_HEADER).expect_err("no rows");
        assert!(matches!(error, LeadImportError::NoLeads));
    }

    #[test]
    fn json_requires_array_input() {
        let error = LeadImporter::from_json_str("{\"id\":\"lead-1\"}").expect_err("object rejected");
        assert!(matches!(error, LeadImportError::NotAnArray));
    }

    #[test]
    fn json_reports_index_and_missing_fields() {
        let json = r#"[
            {"id":"lead-1","name":"A","email":"a@x.com","source":"Web","initialContact":"2024-01-01T00:00:00Z","status":"New","conversionProbability":0.4,"estimatedValue":1000},
            {"id":"lead-2","name":"B","email":"b@x.com","source":"Web","initialContact":"2024-01-01T00:00:00Z","status":"New"}
        ]"#;
        let error = LeadImporter::from_json_str(json).expect_err("second lead rejected");

        assert_eq!(
            error.to_string(),
            "Lead at index 1 is missing required fields: conversionProbability, estimatedValue"
        );
    }

    #[test]
    fn json_coerces_non_array_collections_to_empty() {
        let json = r#"[
            {"id":"lead-1","name":"A","email":"a@x.com","source":"Web","initialContact":"2024-01-01T00:00:00Z","status":"New","conversionProbability":0.4,"estimatedValue":1000,"tags":"vip","interactionHistory":null}
        ]"#;
        let leads = LeadImporter::from_json_str(json).expect("json imports");

        assert!(leads[0].tags.is_empty());
        assert!(leads[0].interaction_history.is_empty());
    }

    #[test]
    fn malformed_json_surfaces_parse_error() {
        let error = LeadImporter::from_json_str("[{").expect_err("malformed json");
        assert!(matches!(error, LeadImportError::Json(_)));
    }

    #[test]
    fn from_path_propagates_io_errors() {
        let error = LeadImporter::from_path("./does-not-exist.csv", LeadFormat::Csv)
            .expect_err("expected io error");
        assert!(matches!(error, LeadImportError::Io(_)));
    }

    #[test]
    fn format_is_inferred_from_extension() {
        assert_eq!(LeadFormat::from_path("leads.JSON"), LeadFormat::Json);
        assert_eq!(LeadFormat::from_path("leads.csv"), LeadFormat::Csv);
        assert_eq!(LeadFormat::from_path("leads"), LeadFormat::Csv);
    }

    #[test]
    fn synthetic_generation_honours_requested_count() {
        let mut rng = StdRng::seed_from_u64(7);
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let leads = LeadImporter::synthetic(&mut rng, 12, now);
        assert_eq!(leads.len(), 12);
    }
}

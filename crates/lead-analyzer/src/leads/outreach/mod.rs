//! Text generators that turn a lead list into scripts and outreach copy.

mod heygen;
mod messages;
mod templates;

pub use heygen::{
    generate_heygen_script, ContentType, PodcastFormat, PodcastOptions, DEFAULT_PODCAST_TOPIC,
    PODCAST_DURATION_RANGE, PODCAST_HOST_RANGE,
};
pub use messages::{compose_outreach, OutreachChannel, OutreachMessage};
pub use templates::{generate_script, ScriptTemplate};

use super::domain::Lead;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("No lead data available for content generation.")]
    NoLeadData,
    #[error("A lead name is required for personalized scripts.")]
    MissingLeadName,
    #[error("No lead found with the name \"{name}\".")]
    LeadNotFound { name: String },
    #[error("No tagged leads available for segmentation analysis.")]
    NoTaggedLeads,
    #[error("No template found with id '{id}'.")]
    UnknownTemplate { id: String },
    #[error("Unknown content type '{value}' (expected ai-script or podcast).")]
    UnknownContentType { value: String },
    #[error("Unknown podcast format '{value}' (expected interview, discussion, or debate).")]
    UnknownPodcastFormat { value: String },
    #[error("Unknown outreach channel '{value}' (expected email or linkedin).")]
    UnknownChannel { value: String },
}

/// First lead whose name contains `name`, ignoring case.
pub fn find_lead_by_name<'a>(leads: &'a [Lead], name: &str) -> Result<&'a Lead, ScriptError> {
    let needle = name.trim().to_lowercase();
    if needle.is_empty() {
        return Err(ScriptError::MissingLeadName);
    }

    leads
        .iter()
        .find(|lead| lead.name.to_lowercase().contains(&needle))
        .ok_or_else(|| ScriptError::LeadNotFound {
            name: name.to_string(),
        })
}

fn ensure_leads(leads: &[Lead]) -> Result<(), ScriptError> {
    if leads.is_empty() {
        Err(ScriptError::NoLeadData)
    } else {
        Ok(())
    }
}

fn join_or(values: &[String], separator: &str, fallback: &str) -> String {
    if values.is_empty() {
        fallback.to_string()
    } else {
        values.join(separator)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::pipeline;
    use super::*;

    #[test]
    fn lead_lookup_is_case_insensitive_substring() {
        let leads = pipeline();
        assert_eq!(find_lead_by_name(&leads, "SMITH").map(|lead| lead.id.as_str()), Ok("2"));
        assert_eq!(find_lead_by_name(&leads, "an").map(|lead| lead.id.as_str()), Ok("1"));
    }

    #[test]
    fn lead_lookup_errors_are_typed() {
        let leads = pipeline();
        assert_eq!(
            find_lead_by_name(&leads, "Nobody"),
            Err(ScriptError::LeadNotFound {
                name: "Nobody".to_string()
            })
        );
        assert_eq!(find_lead_by_name(&leads, "  "), Err(ScriptError::MissingLeadName));
        assert_eq!(
            ScriptError::LeadNotFound {
                name: "Nobody".to_string()
            }
            .to_string(),
            "No lead found with the name \"Nobody\"."
        );
    }
}

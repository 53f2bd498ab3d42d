use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status value counted as a conversion by every engine.
pub const CONVERTED_STATUS: &str = "Converted";

const POSITIVE_RESPONSES: [&str; 3] = ["Positive", "Interested", "Converted"];
const NEUTRAL_RESPONSES: [&str; 1] = ["Neutral"];

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeadId(pub String);

impl LeadId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LeadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LeadId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Bucket an interaction response falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSentiment {
    Positive,
    Neutral,
    Negative,
}

impl ResponseSentiment {
    pub fn classify(response: &str) -> Self {
        if POSITIVE_RESPONSES.contains(&response) {
            Self::Positive
        } else if NEUTRAL_RESPONSES.contains(&response) {
            Self::Neutral
        } else {
            Self::Negative
        }
    }
}

/// One logged contact attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: String,
    pub response: String,
}

impl Interaction {
    pub fn sentiment(&self) -> ResponseSentiment {
        ResponseSentiment::classify(&self.response)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ContactDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl ContactDay {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Monday,
            Self::Tuesday,
            Self::Wednesday,
            Self::Thursday,
            Self::Friday,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeWindow {
    #[serde(rename = "9:00 AM - 11:00 AM")]
    LateMorning,
    #[serde(rename = "1:00 PM - 3:00 PM")]
    EarlyAfternoon,
    #[serde(rename = "3:00 PM - 5:00 PM")]
    LateAfternoon,
}

impl TimeWindow {
    pub const fn ordered() -> [Self; 3] {
        [Self::LateMorning, Self::EarlyAfternoon, Self::LateAfternoon]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::LateMorning => "9:00 AM - 11:00 AM",
            Self::EarlyAfternoon => "1:00 PM - 3:00 PM",
            Self::LateAfternoon => "3:00 PM - 5:00 PM",
        }
    }
}

/// Suggested day and window for reaching a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactWindow {
    pub day: ContactDay,
    pub time_range: TimeWindow,
    /// Percentage in [70, 90].
    pub confidence: u8,
}

/// Whether the scoring engine has run for a lead.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LeadScoring {
    #[default]
    Unscored,
    Scored {
        score: u8,
        contact_times: Vec<ContactWindow>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lead {
    pub id: LeadId,
    pub name: String,
    pub email: String,
    pub source: String,
    pub initial_contact: DateTime<Utc>,
    pub status: String,
    pub interaction_history: Vec<Interaction>,
    pub tags: Vec<String>,
    pub conversion_probability: f64,
    pub estimated_value: f64,
    pub scoring: LeadScoring,
}

impl Lead {
    pub fn score(&self) -> Option<u8> {
        match &self.scoring {
            LeadScoring::Scored { score, .. } => Some(*score),
            LeadScoring::Unscored => None,
        }
    }

    pub fn contact_times(&self) -> Option<&[ContactWindow]> {
        match &self.scoring {
            LeadScoring::Scored { contact_times, .. } => Some(contact_times),
            LeadScoring::Unscored => None,
        }
    }

    pub fn is_converted(&self) -> bool {
        self.status == CONVERTED_STATUS
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|candidate| candidate == tag)
    }

    pub fn best_contact_window(&self) -> Option<&ContactWindow> {
        self.contact_times().and_then(|times| times.first())
    }

    pub fn to_view(&self) -> LeadView {
        LeadView {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            source: self.source.clone(),
            initial_contact: self.initial_contact,
            status: self.status.clone(),
            interaction_history: self.interaction_history.clone(),
            tags: self.tags.clone(),
            conversion_probability: self.conversion_probability,
            estimated_value: self.estimated_value,
            score: self.score(),
            optimal_contact_times: self.contact_times().map(<[ContactWindow]>::to_vec),
        }
    }
}

/// Wire representation using the field names of the import formats.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadView {
    pub id: LeadId,
    pub name: String,
    pub email: String,
    pub source: String,
    pub initial_contact: DateTime<Utc>,
    pub status: String,
    pub interaction_history: Vec<Interaction>,
    pub tags: Vec<String>,
    pub conversion_probability: f64,
    pub estimated_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimal_contact_times: Option<Vec<ContactWindow>>,
}

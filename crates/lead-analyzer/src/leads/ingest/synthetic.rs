use crate::leads::domain::{Interaction, Lead, LeadId, LeadScoring};
use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

const SOURCES: &[&str] = &[
    "LinkedIn",
    "Website",
    "Referral",
    "Conference",
    "Advertisement",
    "Webinar",
    "Cold Call",
    "Email Campaign",
];
const STATUSES: &[&str] = &[
    "New",
    "Contacted",
    "Qualified",
    "Proposal",
    "Negotiation",
    "Converted",
    "Disqualified",
];
const INTERACTION_TYPES: &[&str] = &["Email", "Call", "Meeting", "Demo", "InPerson", "WebForm"];
const RESPONSES: &[&str] = &["Positive", "Neutral", "Negative", "Interested", "Converted"];
const TAGS: &[&str] = &[
    "enterprise",
    "small-business",
    "mid-size",
    "technology",
    "healthcare",
    "finance",
    "education",
    "retail",
    "high-value",
    "marketing",
    "sales",
    "growth",
];
const FIRST_NAMES: &[&str] = &[
    "John", "Jane", "Michael", "Emily", "David", "Sarah", "Robert", "Amanda", "William",
    "Elizabeth",
];
const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Miller", "Davis", "Garcia", "Rodriguez",
    "Wilson",
];
const EMAIL_DOMAINS: &[&str] = &[
    "example.com",
    "company.org",
    "business.net",
    "enterprise.io",
    "corp.co",
    "startup.tech",
];

/// Days before `now` that synthetic first contacts are spread across.
pub const SYNTHETIC_LOOKBACK_DAYS: i64 = 90;

/// Builds demo leads from fixed vocabularies and a caller-supplied random source.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticLeadGenerator {
    now: DateTime<Utc>,
}

impl SyntheticLeadGenerator {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R, count: usize) -> Vec<Lead> {
        (0..count).map(|index| self.lead(rng, index)).collect()
    }

    fn lead<R: Rng + ?Sized>(&self, rng: &mut R, index: usize) -> Lead {
        let name = format!("{} {}", pick(rng, FIRST_NAMES), pick(rng, LAST_NAMES));
        let email = format!("{}@{}", email_local_part(&name), pick(rng, EMAIL_DOMAINS));

        let window_secs = SYNTHETIC_LOOKBACK_DAYS * 24 * 60 * 60;
        let initial_contact = self.now - Duration::seconds(rng.gen_range(0..=window_secs));

        let interaction_count = rng.gen_range(0..=3);
        let interaction_history = (0..interaction_count)
            .map(|offset| Interaction {
                date: initial_contact + Duration::days(offset + 1),
                kind: pick(rng, INTERACTION_TYPES).to_string(),
                response: pick(rng, RESPONSES).to_string(),
            })
            .collect();

        let tag_count = rng.gen_range(1..=3);
        let tags = TAGS
            .choose_multiple(rng, tag_count)
            .map(|tag| tag.to_string())
            .collect();

        let conversion_probability = f64::from(rng.gen_range(0..=100_u32)) / 100.0;
        let estimated_value = f64::from(rng.gen_range(1_000..=20_999_u32));

        Lead {
            id: LeadId(format!("lead-{:03}", index + 1)),
            name,
            email,
            source: pick(rng, SOURCES).to_string(),
            initial_contact,
            status: pick(rng, STATUSES).to_string(),
            interaction_history,
            tags,
            conversion_probability,
            estimated_value,
            scoring: LeadScoring::Unscored,
        }
    }
}

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, values: &'a [&'a str]) -> &'a str {
    values.choose(rng).copied().unwrap_or_default()
}

fn email_local_part(name: &str) -> String {
    name.to_ascii_lowercase()
        .replacen(' ', ".", 1)
        .chars()
        .filter(|ch| ch.is_ascii_lowercase() || *ch == '.')
        .collect()
}

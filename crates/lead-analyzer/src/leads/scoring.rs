//! Composite 0-100 lead scoring and contact-time heuristics.
//!
//! Every lead is scored independently from its engagement history, estimated
//! value, and conversion probability. Contact windows are assigned once, the
//! first time a lead is scored, and survive later recomputes.

use super::domain::{ContactDay, ContactWindow, Lead, LeadScoring, ResponseSentiment, TimeWindow};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

const ENGAGEMENT_BASE_CAP: f64 = 20.0;
const ENGAGEMENT_PER_INTERACTION: f64 = 3.0;
const RESPONSIVENESS_WEIGHT: f64 = 20.0;
const VALUE_CAP: f64 = 30.0;
const VALUE_SCALE: f64 = 50_000.0;
const CONVERSION_WEIGHT: f64 = 30.0;
const SCORE_CAP: f64 = 100.0;

pub const CONFIDENCE_RANGE: std::ops::RangeInclusive<u8> = 70..=90;

/// Per-component contribution to a lead's score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub engagement: f64,
    pub value: f64,
    pub conversion: f64,
    pub total: u8,
}

impl ScoreBreakdown {
    pub fn for_lead(lead: &Lead) -> Self {
        let engagement = engagement_component(lead);
        let value = value_component(lead);
        let conversion = lead.conversion_probability * CONVERSION_WEIGHT;
        let total = (engagement + value + conversion)
            .round()
            .min(SCORE_CAP)
            .max(0.0) as u8;

        Self {
            engagement,
            value,
            conversion,
            total,
        }
    }
}

pub fn score_lead(lead: &Lead) -> u8 {
    ScoreBreakdown::for_lead(lead).total
}

/// Score every lead in place, generating contact windows only for leads that lack them.
pub fn calculate_scores<R: Rng + ?Sized>(leads: &mut [Lead], rng: &mut R) {
    let mut generated = 0usize;
    for lead in leads.iter_mut() {
        let score = score_lead(lead);
        let contact_times = match std::mem::take(&mut lead.scoring) {
            LeadScoring::Scored { contact_times, .. } => contact_times,
            LeadScoring::Unscored => {
                generated += 1;
                generate_contact_times(&lead.source, rng)
            }
        };
        lead.scoring = LeadScoring::Scored {
            score,
            contact_times,
        };
    }

    debug!(scored = leads.len(), generated, "calculated lead scores");
}

fn engagement_component(lead: &Lead) -> f64 {
    let interaction_count = lead.interaction_history.len();
    let positive = lead
        .interaction_history
        .iter()
        .filter(|interaction| interaction.sentiment() == ResponseSentiment::Positive)
        .count();

    let base = (interaction_count as f64 * ENGAGEMENT_PER_INTERACTION).min(ENGAGEMENT_BASE_CAP);
    let responsiveness = if interaction_count > 0 {
        (positive as f64 / interaction_count as f64) * RESPONSIVENESS_WEIGHT
    } else {
        0.0
    };

    (base + responsiveness).round()
}

fn value_component(lead: &Lead) -> f64 {
    ((lead.estimated_value / VALUE_SCALE) * VALUE_CAP)
        .min(VALUE_CAP)
        .round()
}

/// Heuristic windows keyed off the acquisition channel; not derived from history.
pub fn generate_contact_times<R: Rng + ?Sized>(source: &str, rng: &mut R) -> Vec<ContactWindow> {
    preferred_days(source, rng)
        .into_iter()
        .map(|day| ContactWindow {
            day,
            time_range: *TimeWindow::ordered()
                .choose(rng)
                .unwrap_or(&TimeWindow::LateMorning),
            confidence: rng.gen_range(CONFIDENCE_RANGE),
        })
        .collect()
}

fn preferred_days<R: Rng + ?Sized>(source: &str, rng: &mut R) -> Vec<ContactDay> {
    let source = source.to_lowercase();
    if source.contains("linkedin") {
        return vec![ContactDay::Tuesday, ContactDay::Thursday];
    }
    if source.contains("email") || source.contains("newsletter") {
        return vec![ContactDay::Monday, ContactDay::Wednesday, ContactDay::Friday];
    }

    let count = rng.gen_range(2..=3);
    let mut days: Vec<ContactDay> = ContactDay::ordered()
        .choose_multiple(rng, count)
        .copied()
        .collect();
    days.sort();
    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leads::domain::{Interaction, LeadId};
    use chrono::{TimeZone, Utc};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn lead(source: &str, value: f64, probability: f64, responses: &[&str]) -> Lead {
        let contacted = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Lead {
            id: LeadId::from("lead-1"),
            name: "Jane Doe".to_string(),
            email: "jane@x.com".to_string(),
            source: source.to_string(),
            initial_contact: contacted,
            status: "New".to_string(),
            interaction_history: responses
                .iter()
                .map(|response| Interaction {
                    date: contacted,
                    kind: "Email".to_string(),
                    response: response.to_string(),
                })
                .collect(),
            tags: Vec::new(),
            conversion_probability: probability,
            estimated_value: value,
            scoring: LeadScoring::Unscored,
        }
    }

    #[test]
    fn components_follow_documented_weights() {
        let breakdown = ScoreBreakdown::for_lead(&lead(
            "Website",
            25_000.0,
            0.5,
            &["Positive", "Negative", "Neutral", "Interested"],
        ));

        // base min(20, 12) + responsiveness 2/4 * 20
        assert_eq!(breakdown.engagement, 22.0);
        assert_eq!(breakdown.value, 15.0);
        assert_eq!(breakdown.conversion, 15.0);
        assert_eq!(breakdown.total, 52);
    }

    #[test]
    fn no_interactions_score_only_value_and_conversion() {
        let breakdown = ScoreBreakdown::for_lead(&lead("Website", 0.0, 0.0, &[]));
        assert_eq!(breakdown.engagement, 0.0);
        assert_eq!(breakdown.total, 0);
    }

    #[test]
    fn score_is_capped_for_extreme_inputs() {
        let responses = ["Positive"; 10];
        let high = lead("Website", 10_000_000.0, 1.0, &responses);
        assert_eq!(score_lead(&high), 100);

        let inflated = lead("Website", 10_000_000.0, 25.0, &responses);
        assert_eq!(score_lead(&inflated), 100);

        let negative = lead("Website", -90_000.0, -2.0, &[]);
        assert_eq!(score_lead(&negative), 0);
    }

    #[test]
    fn linkedin_and_email_sources_use_fixed_days() {
        let mut rng = StdRng::seed_from_u64(3);

        let linkedin = generate_contact_times("LinkedIn Ads", &mut rng);
        let days: Vec<_> = linkedin.iter().map(|window| window.day).collect();
        assert_eq!(days, vec![ContactDay::Tuesday, ContactDay::Thursday]);

        let newsletter = generate_contact_times("Monthly NEWSLETTER", &mut rng);
        let days: Vec<_> = newsletter.iter().map(|window| window.day).collect();
        assert_eq!(
            days,
            vec![ContactDay::Monday, ContactDay::Wednesday, ContactDay::Friday]
        );

        let email = generate_contact_times("Email Campaign", &mut rng);
        assert_eq!(email.len(), 3);
    }

    #[test]
    fn other_sources_pick_two_or_three_distinct_weekdays() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let windows = generate_contact_times("Referral", &mut rng);
            assert!((2..=3).contains(&windows.len()));
            let mut days: Vec<_> = windows.iter().map(|window| window.day).collect();
            let sorted = days.clone();
            days.dedup();
            assert_eq!(days, sorted, "days are distinct and ordered");
            for window in &windows {
                assert!(CONFIDENCE_RANGE.contains(&window.confidence));
                assert!(TimeWindow::ordered().contains(&window.time_range));
            }
        }
    }

    #[test]
    fn rescoring_keeps_contact_times_and_refreshes_score() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut leads = vec![lead("Referral", 10_000.0, 0.2, &["Positive"])];

        calculate_scores(&mut leads, &mut rng);
        let first_times = leads[0].contact_times().expect("scored").to_vec();
        let first_score = leads[0].score().expect("scored");

        leads[0].estimated_value = 50_000.0;
        calculate_scores(&mut leads, &mut rng);

        assert_eq!(leads[0].contact_times().expect("scored"), first_times.as_slice());
        assert!(leads[0].score().expect("scored") > first_score);
        assert_eq!(leads[0].score(), Some(score_lead(&leads[0])));
    }

    #[test]
    fn scoring_empty_list_is_a_no_op() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut leads: Vec<Lead> = Vec::new();
        calculate_scores(&mut leads, &mut rng);
        assert!(leads.is_empty());
    }
}

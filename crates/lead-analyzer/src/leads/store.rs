use super::domain::{ContactWindow, Lead};
use super::report::breakdown::{self, LeadFilter};
use super::report::LeadAnalysis;
use super::scoring::{self, ScoreBreakdown};
use chrono::{DateTime, Utc};
use rand::Rng;
use std::collections::BTreeMap;
use tracing::info;

/// Owns the working lead list. Ingestion replaces it wholesale; scoring mutates it in place.
#[derive(Debug, Default, Clone)]
pub struct LeadStore {
    leads: Vec<Lead>,
}

impl LeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_leads(leads: Vec<Lead>) -> Self {
        Self { leads }
    }

    /// Discards the previous list and any scores attached to it.
    pub fn replace(&mut self, leads: Vec<Lead>) {
        let previous = self.leads.len();
        self.leads = leads;
        info!(previous, current = self.leads.len(), "replaced lead list");
    }

    pub fn leads(&self) -> &[Lead] {
        &self.leads
    }

    pub fn into_leads(self) -> Vec<Lead> {
        self.leads
    }

    pub fn len(&self) -> usize {
        self.leads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leads.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Lead> {
        self.leads.iter().find(|lead| lead.id.as_str() == id)
    }

    pub fn calculate_scores<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        scoring::calculate_scores(&mut self.leads, rng);
    }

    pub fn analysis(&self, now: DateTime<Utc>, timeline_days: u32) -> LeadAnalysis {
        LeadAnalysis::from_leads(&self.leads, now, timeline_days)
    }

    pub fn filtered(&self, filter: &LeadFilter) -> Vec<&Lead> {
        filter.apply(&self.leads)
    }

    /// Component scores for every lead in list order, whether or not it has been scored yet.
    pub fn score_breakdowns(&self) -> Vec<(&Lead, ScoreBreakdown)> {
        self.leads
            .iter()
            .map(|lead| (lead, ScoreBreakdown::for_lead(lead)))
            .collect()
    }

    pub fn total_value(&self) -> f64 {
        breakdown::total_value(&self.leads)
    }

    pub fn average_conversion_probability(&self) -> f64 {
        breakdown::average_conversion_probability(&self.leads)
    }

    pub fn conversion_rate(&self) -> f64 {
        breakdown::conversion_rate(&self.leads)
    }

    pub fn recent_leads_count(&self, now: DateTime<Utc>) -> usize {
        breakdown::recent_leads_count(&self.leads, now)
    }

    pub fn leads_by_status(&self) -> BTreeMap<String, usize> {
        breakdown::leads_by_status(&self.leads)
    }

    pub fn leads_by_score(&self) -> Vec<&Lead> {
        breakdown::leads_by_score(&self.leads)
    }

    /// `None` for an unknown id; an empty slice for a known lead that has not been scored.
    pub fn optimal_contact_times(&self, id: &str) -> Option<&[ContactWindow]> {
        self.get(id)
            .map(|lead| lead.contact_times().unwrap_or_default())
    }
}

use super::breakdown;
use super::insights::generate_insights;
use super::views::{
    EngagementBreakdown, InsightItem, ScoreBucket, SourceBreakdown, SourceCount,
    StatusBreakdown, TagBreakdown, TimelinePoint,
};
use crate::config::MAX_TIMELINE_DAYS;
use crate::leads::domain::{Lead, LeadView};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Every derived view of one lead list, computed in a single pass over the engines.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadAnalysis {
    pub generated_at: DateTime<Utc>,
    pub timeline_days: u32,
    pub lead_count: usize,
    pub scored_count: usize,
    pub insights: Vec<InsightItem>,
    pub source_breakdown: Vec<SourceBreakdown>,
    pub status_breakdown: Vec<StatusBreakdown>,
    pub tag_breakdown: Vec<TagBreakdown>,
    pub conversion_timeline: Vec<TimelinePoint>,
    pub conversions_by_time_frame: Vec<TimelinePoint>,
    pub engagement_metrics: Vec<EngagementBreakdown>,
    pub score_distribution: Vec<ScoreBucket>,
    pub total_value: f64,
    pub average_value: f64,
    pub average_conversion_probability: f64,
    pub conversion_rate: f64,
    pub recent_leads: usize,
    pub top_source: Option<SourceCount>,
    pub leads_by_status: BTreeMap<String, usize>,
    pub high_value_leads: Vec<LeadView>,
    pub leads_by_score: Vec<LeadView>,
}

impl LeadAnalysis {
    /// `timeline_days` is capped at `MAX_TIMELINE_DAYS`.
    pub fn from_leads(leads: &[Lead], now: DateTime<Utc>, timeline_days: u32) -> Self {
        let timeline_days = timeline_days.min(MAX_TIMELINE_DAYS);
        Self {
            generated_at: now,
            timeline_days,
            lead_count: leads.len(),
            scored_count: leads.iter().filter(|lead| lead.score().is_some()).count(),
            insights: generate_insights(leads, now),
            source_breakdown: breakdown::source_breakdown(leads),
            status_breakdown: breakdown::status_breakdown(leads),
            tag_breakdown: breakdown::tag_breakdown(leads),
            conversion_timeline: breakdown::conversion_timeline(leads, timeline_days, now),
            conversions_by_time_frame: breakdown::conversions_by_time_frame(
                leads,
                timeline_days,
                now,
            ),
            engagement_metrics: breakdown::engagement_metrics(leads),
            score_distribution: breakdown::score_distribution(leads),
            total_value: breakdown::total_value(leads),
            average_value: breakdown::average_value(leads),
            average_conversion_probability: breakdown::average_conversion_probability(leads),
            conversion_rate: breakdown::conversion_rate(leads),
            recent_leads: breakdown::recent_leads_count(leads, now),
            top_source: breakdown::most_common_source(leads),
            leads_by_status: breakdown::leads_by_status(leads),
            high_value_leads: breakdown::high_value_leads(leads)
                .into_iter()
                .map(Lead::to_view)
                .collect(),
            leads_by_score: breakdown::leads_by_score(leads)
                .into_iter()
                .map(Lead::to_view)
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lead_count == 0
    }
}

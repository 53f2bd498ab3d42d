use super::views::{
    EngagementBreakdown, ScoreBucket, SourceBreakdown, SourceCount, StatusBreakdown,
    TagBreakdown, TimelinePoint,
};
use crate::config::MAX_TIMELINE_DAYS;
use crate::leads::domain::{Lead, ResponseSentiment};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::{BTreeMap, HashMap};

pub const RECENT_LEAD_DAYS: i64 = 7;

const SCORE_BUCKETS: [(u8, u8, &str); 5] = [
    (0, 20, "0-20"),
    (21, 40, "21-40"),
    (41, 60, "41-60"),
    (61, 80, "61-80"),
    (81, 100, "81-100"),
];
const HIGH_SCORE_THRESHOLD: u8 = 80;
const HIGH_VALUE_SHARE: f64 = 0.1;

struct GroupTotal<'a> {
    name: &'a str,
    value: f64,
    count: usize,
}

/// Groups in first-seen order so stable sorts break ties the same way every run.
fn grouped_totals<'a, F>(leads: &'a [Lead], key: F) -> Vec<GroupTotal<'a>>
where
    F: Fn(&'a Lead) -> &'a str,
{
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut groups: Vec<GroupTotal<'a>> = Vec::new();

    for lead in leads {
        let name = key(lead);
        let slot = *index.entry(name).or_insert_with(|| {
            groups.push(GroupTotal {
                name,
                value: 0.0,
                count: 0,
            });
            groups.len() - 1
        });
        groups[slot].value += lead.estimated_value;
        groups[slot].count += 1;
    }

    groups
}

pub fn source_breakdown(leads: &[Lead]) -> Vec<SourceBreakdown> {
    let mut breakdown: Vec<SourceBreakdown> = grouped_totals(leads, |lead| lead.source.as_str())
        .into_iter()
        .map(|group| SourceBreakdown {
            name: group.name.to_string(),
            value: group.value,
            count: group.count,
        })
        .collect();
    breakdown.sort_by(|a, b| b.value.total_cmp(&a.value));
    breakdown
}

pub fn status_breakdown(leads: &[Lead]) -> Vec<StatusBreakdown> {
    let mut breakdown: Vec<StatusBreakdown> = grouped_totals(leads, |lead| lead.status.as_str())
        .into_iter()
        .map(|group| StatusBreakdown {
            name: group.name.to_string(),
            value: group.value,
            count: group.count,
        })
        .collect();
    breakdown.sort_by(|a, b| b.count.cmp(&a.count));
    breakdown
}

/// Counts every tag occurrence, including repeats within one lead.
pub fn tag_breakdown(leads: &[Lead]) -> Vec<TagBreakdown> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut breakdown: Vec<TagBreakdown> = Vec::new();

    for tag in leads.iter().flat_map(|lead| lead.tags.iter()) {
        let slot = *index.entry(tag.as_str()).or_insert_with(|| {
            breakdown.push(TagBreakdown {
                name: tag.clone(),
                count: 0,
            });
            breakdown.len() - 1
        });
        breakdown[slot].count += 1;
    }

    breakdown.sort_by(|a, b| b.count.cmp(&a.count));
    breakdown
}

/// Start of a `days`-long window ending at `now`, saturating at the earliest representable instant.
fn window_start(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    now.checked_sub_signed(Duration::days(i64::from(days)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// One bucket per UTC day from `now - days` through `now`, zero-filled.
/// The window is capped at `MAX_TIMELINE_DAYS`.
pub fn conversion_timeline(leads: &[Lead], days: u32, now: DateTime<Utc>) -> Vec<TimelinePoint> {
    if leads.is_empty() {
        return Vec::new();
    }

    let end = now.date_naive();
    let start = window_start(now, days.min(MAX_TIMELINE_DAYS)).date_naive();
    let mut counts: BTreeMap<NaiveDate, usize> = start
        .iter_days()
        .take_while(|date| *date <= end)
        .map(|date| (date, 0))
        .collect();

    for lead in leads {
        if let Some(count) = counts.get_mut(&lead.initial_contact.date_naive()) {
            *count += 1;
        }
    }

    counts
        .into_iter()
        .map(|(date, count)| TimelinePoint { date, count })
        .collect()
}

/// Only the dates that saw a first contact within `[now - days, now]`.
pub fn conversions_by_time_frame(
    leads: &[Lead],
    days: u32,
    now: DateTime<Utc>,
) -> Vec<TimelinePoint> {
    let start = window_start(now, days);
    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();

    for lead in leads
        .iter()
        .filter(|lead| lead.initial_contact >= start && lead.initial_contact <= now)
    {
        *counts.entry(lead.initial_contact.date_naive()).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|(date, count)| TimelinePoint { date, count })
        .collect()
}

pub fn engagement_metrics(leads: &[Lead]) -> Vec<EngagementBreakdown> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut metrics: Vec<EngagementBreakdown> = Vec::new();

    for interaction in leads.iter().flat_map(|lead| lead.interaction_history.iter()) {
        let slot = *index.entry(interaction.kind.as_str()).or_insert_with(|| {
            metrics.push(EngagementBreakdown {
                interaction_type: interaction.kind.clone(),
                positive_count: 0,
                neutral_count: 0,
                negative_count: 0,
            });
            metrics.len() - 1
        });

        let entry = &mut metrics[slot];
        match interaction.sentiment() {
            ResponseSentiment::Positive => entry.positive_count += 1,
            ResponseSentiment::Neutral => entry.neutral_count += 1,
            ResponseSentiment::Negative => entry.negative_count += 1,
        }
    }

    metrics.sort_by(|a, b| b.total().cmp(&a.total()));
    metrics
}

/// Always five buckets; unscored leads are left out.
pub fn score_distribution(leads: &[Lead]) -> Vec<ScoreBucket> {
    SCORE_BUCKETS
        .iter()
        .map(|&(min, max, range)| ScoreBucket {
            range,
            min,
            max,
            count: leads
                .iter()
                .filter_map(Lead::score)
                .filter(|score| (min..=max).contains(score))
                .count(),
        })
        .collect()
}

/// Scores above 80 when scoring has run, otherwise the top tenth by value.
pub fn high_value_leads(leads: &[Lead]) -> Vec<&Lead> {
    if leads.is_empty() {
        return Vec::new();
    }

    if leads.iter().any(|lead| lead.score().is_some()) {
        let mut selected: Vec<&Lead> = leads
            .iter()
            .filter(|lead| lead.score().is_some_and(|score| score > HIGH_SCORE_THRESHOLD))
            .collect();
        selected.sort_by(|a, b| b.score().cmp(&a.score()));
        return selected;
    }

    let top_count = ((leads.len() as f64 * HIGH_VALUE_SHARE).ceil() as usize).max(1);
    let mut by_value: Vec<&Lead> = leads.iter().collect();
    by_value.sort_by(|a, b| b.estimated_value.total_cmp(&a.estimated_value));
    by_value.truncate(top_count);
    by_value
}

/// Highest lead count wins; ties go to the source seen first.
pub fn most_common_source(leads: &[Lead]) -> Option<SourceCount> {
    let mut best: Option<GroupTotal<'_>> = None;
    for group in grouped_totals(leads, |lead| lead.source.as_str()) {
        if best.as_ref().map_or(true, |current| group.count > current.count) {
            best = Some(group);
        }
    }

    best.map(|group| SourceCount {
        source: group.name.to_string(),
        count: group.count,
    })
}

/// Source with the highest strictly positive total value, first seen on ties.
pub fn most_valuable_source(leads: &[Lead]) -> Option<String> {
    let mut best: Option<GroupTotal<'_>> = None;
    for group in grouped_totals(leads, |lead| lead.source.as_str()) {
        let threshold = best.as_ref().map_or(0.0, |current| current.value);
        if group.value > threshold {
            best = Some(group);
        }
    }

    best.map(|group| group.name.to_string())
}

pub fn total_value(leads: &[Lead]) -> f64 {
    leads.iter().map(|lead| lead.estimated_value).sum()
}

pub fn average_value(leads: &[Lead]) -> f64 {
    if leads.is_empty() {
        return 0.0;
    }
    total_value(leads) / leads.len() as f64
}

pub fn average_conversion_probability(leads: &[Lead]) -> f64 {
    if leads.is_empty() {
        return 0.0;
    }
    leads
        .iter()
        .map(|lead| lead.conversion_probability)
        .sum::<f64>()
        / leads.len() as f64
}

pub fn converted_count(leads: &[Lead]) -> usize {
    leads.iter().filter(|lead| lead.is_converted()).count()
}

/// Percentage of leads whose status is `Converted`; 0 for an empty list.
pub fn conversion_rate(leads: &[Lead]) -> f64 {
    if leads.is_empty() {
        return 0.0;
    }
    converted_count(leads) as f64 / leads.len() as f64 * 100.0
}

pub fn recent_leads_count(leads: &[Lead], now: DateTime<Utc>) -> usize {
    let cutoff = now - Duration::days(RECENT_LEAD_DAYS);
    leads
        .iter()
        .filter(|lead| lead.initial_contact >= cutoff)
        .count()
}

pub fn leads_by_status(leads: &[Lead]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for lead in leads {
        *counts.entry(lead.status.clone()).or_default() += 1;
    }
    counts
}

/// Highest score first; unscored leads sort as zero.
pub fn leads_by_score(leads: &[Lead]) -> Vec<&Lead> {
    let mut sorted: Vec<&Lead> = leads.iter().collect();
    sorted.sort_by_key(|lead| std::cmp::Reverse(lead.score().unwrap_or(0)));
    sorted
}

/// Inclusive on both ends; unscored leads never match.
fn score_in_range(lead: &Lead, min: u8, max: u8) -> bool {
    lead.score().is_some_and(|score| (min..=max).contains(&score))
}

/// Every set criterion must hold. The default filter matches all leads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadFilter {
    pub source: Option<String>,
    pub status: Option<String>,
    pub tag: Option<String>,
    /// Inclusive `(min, max)`; unscored leads are excluded once a range is set.
    pub score_range: Option<(u8, u8)>,
}

impl LeadFilter {
    pub fn matches(&self, lead: &Lead) -> bool {
        self.source.as_deref().map_or(true, |source| lead.source == source)
            && self.status.as_deref().map_or(true, |status| lead.status == status)
            && self.tag.as_deref().map_or(true, |tag| lead.has_tag(tag))
            && self
                .score_range
                .map_or(true, |(min, max)| score_in_range(lead, min, max))
    }

    pub fn apply<'a>(&self, leads: &'a [Lead]) -> Vec<&'a Lead> {
        leads.iter().filter(|lead| self.matches(lead)).collect()
    }
}

use super::{ensure_leads, find_lead_by_name, join_or, ScriptError};
use crate::leads::domain::Lead;
use crate::leads::format::{format_currency, format_number, format_percent, format_short_date};
use crate::leads::report::breakdown::{
    average_value, conversion_rate, converted_count, source_breakdown, tag_breakdown, total_value,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::str::FromStr;

const OVERVIEW_SOURCES: usize = 3;
const TOP_PERFORMING_SOURCES: usize = 3;
const TOP_SEGMENTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScriptTemplate {
    Overview,
    Personalized,
    SourcePerformance,
    Segmentation,
}

impl ScriptTemplate {
    pub const fn all() -> [Self; 4] {
        [
            Self::Overview,
            Self::Personalized,
            Self::SourcePerformance,
            Self::Segmentation,
        ]
    }

    pub const fn id(self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Personalized => "personalized",
            Self::SourcePerformance => "source-performance",
            Self::Segmentation => "segmentation",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Overview => "Lead Overview",
            Self::Personalized => "Personalized Outreach",
            Self::SourcePerformance => "Source Performance",
            Self::Segmentation => "Lead Segmentation",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Overview => "General overview of all lead data and key metrics",
            Self::Personalized => "Customized script for reaching out to a specific lead",
            Self::SourcePerformance => "Analysis of which lead sources are performing best",
            Self::Segmentation => "Breakdown of leads by segment/tag for targeted messaging",
        }
    }

    pub const fn requires_lead_name(self) -> bool {
        matches!(self, Self::Personalized)
    }
}

impl FromStr for ScriptTemplate {
    type Err = ScriptError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|template| template.id() == value.trim())
            .ok_or_else(|| ScriptError::UnknownTemplate {
                id: value.to_string(),
            })
    }
}

pub fn generate_script(
    template: ScriptTemplate,
    leads: &[Lead],
    lead_name: Option<&str>,
    now: DateTime<Utc>,
) -> Result<String, ScriptError> {
    ensure_leads(leads)?;

    match template {
        ScriptTemplate::Overview => Ok(overview(leads)),
        ScriptTemplate::Personalized => {
            let name = lead_name.ok_or(ScriptError::MissingLeadName)?;
            let lead = find_lead_by_name(leads, name)?;
            Ok(personalized(lead, now))
        }
        ScriptTemplate::SourcePerformance => Ok(source_performance(leads)),
        ScriptTemplate::Segmentation => segmentation(leads),
    }
}

fn overview(leads: &[Lead]) -> String {
    let top_sources: Vec<String> = source_breakdown(leads)
        .into_iter()
        .take(OVERVIEW_SOURCES)
        .map(|source| source.name)
        .collect();

    format!(
        "Hi there! I've just completed an analysis of our lead data, and I'd like to share some key insights with you.\n\n\
         We currently have {total} leads in our pipeline with a total estimated value of {value}. That's an average of {average} per lead.\n\n\
         Our current conversion rate stands at {rate}, with {converted} leads successfully converted.\n\n\
         The majority of our leads are coming from {sources}.\n\n\
         Based on this analysis, I recommend we focus our efforts on nurturing high-value leads and optimizing our approach for our top-performing channels.\n\n\
         Let me know if you'd like a more detailed breakdown of any specific aspect of our lead performance.",
        total = leads.len(),
        value = format_currency(total_value(leads)),
        average = format_currency(average_value(leads)),
        rate = format_percent(conversion_rate(leads)),
        converted = converted_count(leads),
        sources = top_sources.join(", "),
    )
}

fn personalized(lead: &Lead, now: DateTime<Utc>) -> String {
    let days_ago = (now - lead.initial_contact).num_days().max(0);
    let interaction_summary = match lead.interaction_history.last() {
        Some(interaction) => format!(
            "Our last interaction was a {} on {}.",
            interaction.kind.to_lowercase(),
            format_short_date(interaction.date)
        ),
        None => "We haven't had any interactions yet.".to_string(),
    };

    format!(
        "Hi {name},\n\n\
         I wanted to personally reach out to you. It's been {days_ago} days since we first connected through {source}.\n\n\
         {interaction_summary}\n\n\
         Based on your interests in {tags}, I believe our solutions could provide significant value to your organization. We estimate a potential value of {value} for a partnership with us.\n\n\
         I'd love to schedule some time to discuss how we can address your specific needs. Would you be available for a brief call this week?\n\n\
         Looking forward to connecting with you soon!",
        name = lead.name,
        source = lead.source,
        tags = join_or(&lead.tags, ", ", "your business priorities"),
        value = format_currency(lead.estimated_value),
    )
}

fn source_performance(leads: &[Lead]) -> String {
    let sources = source_breakdown(leads);

    let paragraphs: Vec<String> = sources
        .iter()
        .take(TOP_PERFORMING_SOURCES)
        .enumerate()
        .map(|(index, source)| {
            let converted = leads
                .iter()
                .filter(|lead| lead.source == source.name && lead.is_converted())
                .count();
            let rate = converted as f64 / source.count.max(1) as f64 * 100.0;
            format!(
                "{}. {}: This channel has generated {} leads with a total value of {}. The conversion rate for this source is {}.",
                index + 1,
                source.name,
                source.count,
                format_currency(source.value),
                format_percent(rate),
            )
        })
        .collect();

    let lowest = match sources.last() {
        Some(bottom) if sources.len() > TOP_PERFORMING_SOURCES => format!(
            "\n\nOur lowest-performing channel is {}, which has generated only {} leads with a value of {}.",
            bottom.name,
            bottom.count,
            format_currency(bottom.value)
        ),
        _ => String::new(),
    };

    let leader = sources
        .first()
        .map(|source| source.name.as_str())
        .unwrap_or("our leading channel");

    format!(
        "Hi team,\n\n\
         I've analyzed the performance of our lead sources, and I'd like to share the key findings.\n\n\
         Our top-performing channels by lead value are:\n\n\
         {paragraphs}{lowest}\n\n\
         Based on this data, I recommend we increase our investment in {leader} while reassessing our strategy for our lower-performing channels.\n\n\
         Let me know if you'd like me to dive deeper into any specific source or metrics.",
        paragraphs = paragraphs.join("\n\n"),
    )
}

fn segmentation(leads: &[Lead]) -> Result<String, ScriptError> {
    let segments: Vec<_> = tag_breakdown(leads).into_iter().take(TOP_SEGMENTS).collect();

    let lines: Vec<String> = segments
        .iter()
        .map(|segment| {
            let tagged: Vec<&Lead> = leads.iter().filter(|lead| lead.has_tag(&segment.name)).collect();
            let value: f64 = tagged.iter().map(|lead| lead.estimated_value).sum();
            let average = value / tagged.len().max(1) as f64;
            format!(
                "- {}: {} leads with a total value of {} (average of ${} per lead)",
                segment.name,
                segment.count,
                format_currency(value),
                format_number(average)
            )
        })
        .collect();

    let recommendation = match segments.as_slice() {
        [first, second, ..] => format!(
            "our {} and {} segments, as they represent our largest and potentially most valuable audiences",
            first.name, second.name
        ),
        [only] => format!(
            "our {} segment, as it represents our largest and potentially most valuable audience",
            only.name
        ),
        [] => return Err(ScriptError::NoTaggedLeads),
    };

    Ok(format!(
        "Hi everyone,\n\n\
         I've completed a segmentation analysis of our leads based on their tags, and I want to share the insights.\n\n\
         Here's a breakdown of our top {count} segments:\n\n\
         {lines}\n\n\
         This segmentation provides valuable insights for our targeting and messaging strategy. Based on this data, I recommend we develop specialized outreach campaigns for {recommendation}.\n\n\
         We should also consider refining our qualification criteria to better identify leads in these key segments earlier in the process.\n\n\
         Let me know your thoughts on this approach.",
        count = segments.len(),
        lines = lines.join("\n"),
    ))
}

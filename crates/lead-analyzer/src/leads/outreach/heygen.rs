use super::{ensure_leads, find_lead_by_name, join_or, ScriptError};
use crate::leads::domain::Lead;
use crate::leads::format::{format_currency, format_number};
use crate::leads::report::breakdown::{conversion_rate, source_breakdown, tag_breakdown, total_value};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::ops::RangeInclusive;
use std::str::FromStr;

pub const DEFAULT_PODCAST_TOPIC: &str = "lead generation strategies";
pub const PODCAST_DURATION_RANGE: RangeInclusive<u32> = 5..=30;
pub const PODCAST_HOST_RANGE: RangeInclusive<u8> = 2..=3;

const DEFAULT_DURATION_MINUTES: u32 = 15;
const MINUTES_PER_SEGMENT: u32 = 5;
const MIN_SEGMENTS: u32 = 3;
const TOP_CHANNELS: usize = 2;
const TOP_INTERESTS: usize = 3;
const SHOW_NAME: &str = "Lead Insights";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentType {
    #[default]
    AiScript,
    Podcast,
}

impl FromStr for ContentType {
    type Err = ScriptError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ai-script" => Ok(Self::AiScript),
            "podcast" => Ok(Self::Podcast),
            _ => Err(ScriptError::UnknownContentType {
                value: value.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PodcastFormat {
    Interview,
    #[default]
    Discussion,
    Debate,
}

impl PodcastFormat {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Interview => "Interview",
            Self::Discussion => "Discussion",
            Self::Debate => "Debate",
        }
    }
}

impl FromStr for PodcastFormat {
    type Err = ScriptError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "interview" => Ok(Self::Interview),
            "discussion" => Ok(Self::Discussion),
            "debate" => Ok(Self::Debate),
            _ => Err(ScriptError::UnknownPodcastFormat {
                value: value.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PodcastOptions {
    pub topic: String,
    pub duration_minutes: u32,
    pub format: PodcastFormat,
    pub host_count: u8,
}

impl Default for PodcastOptions {
    fn default() -> Self {
        Self {
            topic: DEFAULT_PODCAST_TOPIC.to_string(),
            duration_minutes: DEFAULT_DURATION_MINUTES,
            format: PodcastFormat::default(),
            host_count: *PODCAST_HOST_RANGE.start(),
        }
    }
}

impl PodcastOptions {
    /// Clamp duration and host count; a blank topic falls back to the default.
    pub fn normalized(&self) -> Self {
        let topic = self.topic.trim();
        Self {
            topic: if topic.is_empty() {
                DEFAULT_PODCAST_TOPIC.to_string()
            } else {
                topic.to_string()
            },
            duration_minutes: self
                .duration_minutes
                .clamp(*PODCAST_DURATION_RANGE.start(), *PODCAST_DURATION_RANGE.end()),
            format: self.format,
            host_count: self
                .host_count
                .clamp(*PODCAST_HOST_RANGE.start(), *PODCAST_HOST_RANGE.end()),
        }
    }

    pub fn segment_count(&self) -> u32 {
        (self.duration_minutes / MINUTES_PER_SEGMENT).max(MIN_SEGMENTS)
    }
}

/// Script text for the video-avatar tool; never calls out to it.
pub fn generate_heygen_script(
    leads: &[Lead],
    lead_name: Option<&str>,
    content: ContentType,
    options: &PodcastOptions,
) -> Result<String, ScriptError> {
    ensure_leads(leads)?;

    match content {
        ContentType::AiScript => match lead_name {
            Some(name) => Ok(personalized_ai_script(find_lead_by_name(leads, name)?)),
            None => Ok(general_ai_script(leads)),
        },
        ContentType::Podcast => Ok(podcast_script(leads, &options.normalized())),
    }
}

fn personalized_ai_script(lead: &Lead) -> String {
    let focus = lead.tags.first().map(String::as_str).unwrap_or("core");

    format!(
        "# Personalized Heygen Script for {name}\n\n\
         [TONE: Warm and Professional]\n\n\
         Hello {name}!\n\n\
         I'm reaching out to you personally because I noticed you've shown interest in our services through {source}.\n\n\
         Based on your focus areas in {tags}, I believe we can provide exceptional value to your business. Our analysis suggests a potential value of {value} for our partnership.\n\n\
         Let me share three key insights from our lead data that might interest you:\n\n\
         First, clients similar to you have seen a 27% increase in conversion rates within the first quarter.\n\n\
         Second, our {focus} solution has proven particularly effective for businesses in your sector.\n\n\
         And third, our implementation process takes just 2 weeks, meaning you could see results before the end of the month.\n\n\
         I'd love to schedule a brief call to discuss how we can tailor our approach specifically for your needs.\n\n\
         Thank you for your time, {name}. I look forward to connecting with you soon!",
        name = lead.name,
        source = lead.source,
        tags = join_or(&lead.tags, ", ", "your business priorities"),
        value = format_currency(lead.estimated_value),
    )
}

fn general_ai_script(leads: &[Lead]) -> String {
    let total = total_value(leads);
    let average = (total / leads.len() as f64).round();
    let channels: Vec<String> = source_breakdown(leads)
        .into_iter()
        .take(TOP_CHANNELS)
        .map(|source| source.name)
        .collect();
    let interests = top_interests(leads);

    format!(
        "# Heygen Lead Insights Video Script\n\n\
         [TONE: Enthusiastic and Informative]\n\n\
         Hi there! I'm excited to share our latest lead data analysis with you today.\n\n\
         Our system has analyzed {count} leads with a combined potential value of {total}.\n\n\
         The most interesting discovery is that our average lead value is now {average}, which represents a significant opportunity for our business.\n\n\
         Our top performing channels are {channels}, which together account for over 60% of our high-quality leads.\n\n\
         What's particularly noteworthy is the interests our leads have shown. The top three areas of interest are {interests}.\n\n\
         Based on this analysis, I recommend we focus our marketing efforts on these channels and tailor our messaging around these key interest areas.\n\n\
         This data-driven approach could increase our conversion rates by up to 35% in the next quarter.\n\n\
         Let me know if you'd like a more detailed breakdown of any specific aspect of our lead performance. Thanks for watching!",
        count = leads.len(),
        total = format_currency(total),
        average = format_currency(average),
        channels = channels.join(" and "),
        interests = join_or(&interests, ", ", "still emerging"),
    )
}

fn top_interests(leads: &[Lead]) -> Vec<String> {
    tag_breakdown(leads)
        .into_iter()
        .take(TOP_INTERESTS)
        .map(|tag| tag.name)
        .collect()
}

/// Figures every podcast format weaves into its dialogue.
struct PodcastFacts {
    total_leads: usize,
    conversion_rate: f64,
    top_source: String,
    interests: Vec<String>,
}

impl PodcastFacts {
    fn from_leads(leads: &[Lead]) -> Self {
        Self {
            total_leads: leads.len(),
            conversion_rate: conversion_rate(leads),
            top_source: source_breakdown(leads)
                .into_iter()
                .next()
                .map(|source| source.name)
                .unwrap_or_else(|| "various channels".to_string()),
            interests: top_interests(leads),
        }
    }

    fn rate(&self) -> String {
        format!("{:.1}", self.conversion_rate)
    }

    /// Whole-percent conversion rate plus a fixed uplift.
    fn lift(&self, points: i64) -> i64 {
        self.conversion_rate.trunc() as i64 + points
    }

    fn interest_list(&self) -> String {
        join_or(&self.interests, ", ", "a broad mix of topics")
    }

    fn interest_pair(&self) -> String {
        let pair = &self.interests[..self.interests.len().min(2)];
        join_or(pair, " and ", "high-intent")
    }

    fn primary_interest(&self) -> &str {
        self.interests
            .first()
            .map(String::as_str)
            .unwrap_or("our core offering")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Voice {
    Prompt,
    Answer,
    Counter,
}

struct Segment {
    title: &'static str,
    lines: Vec<(Voice, String)>,
}

fn landscape(facts: &PodcastFacts) -> Segment {
    let top = &facts.top_source;
    Segment {
        title: "Current Lead Generation Landscape",
        lines: vec![
            (Voice::Prompt, "Let's start by examining the current landscape of lead generation. What's working now and what's changing?".to_string()),
            (Voice::Answer, "Based on the data we're seeing, there's been a significant shift in how leads are engaging with content. The traditional funnel is evolving.".to_string()),
            (Voice::Prompt, format!("Our analysis shows that {top} is our most effective channel. What makes this channel particularly effective in today's environment?")),
            (Voice::Answer, format!("{top} works exceptionally well because it allows for more personalized engagement. The leads coming from this channel show a {}% higher conversion rate compared to other channels.", facts.lift(12))),
            (Voice::Counter, format!("I see it differently. Leaning on {top} alone concentrates risk, and the channels we underinvest in are where the next cohort of leads will come from.")),
        ],
    }
}

fn quality_indicators(facts: &PodcastFacts) -> Segment {
    let primary = facts.primary_interest();
    Segment {
        title: "Understanding Lead Quality Indicators",
        lines: vec![
            (Voice::Prompt, format!("Let's talk about quality indicators. Our data shows interests in {}. How should businesses be interpreting these signals?", facts.interest_list())),
            (Voice::Answer, format!("These indicators are crucial. When leads express interest in {primary}, it typically signals they're in the consideration stage of their buying journey.")),
            (Voice::Prompt, "So how can businesses better tailor their approaches based on these indicators?".to_string()),
            (Voice::Answer, format!("The key is segmentation and personalized follow-up. For leads interested in {primary}, focusing on case studies yields a 40% higher engagement rate.")),
            (Voice::Counter, "Interest tags are a starting point, not a verdict. Engagement history tells us more about intent than any label a lead picked up along the way.".to_string()),
        ],
    }
}

fn channel_mix(facts: &PodcastFacts) -> Segment {
    let top = &facts.top_source;
    Segment {
        title: "Channel Mix and Budget",
        lines: vec![
            (Voice::Prompt, format!("How should teams split their budget when {top} is carrying so much of the pipeline?")),
            (Voice::Answer, format!("Double down on what converts. With {} leads analyzed, the pattern is clear enough to shift a larger share of spend toward {top}.", facts.total_leads)),
            (Voice::Counter, format!("Budget should follow learning, not just results. Reserving part of the spend for experiments keeps the pipeline healthy when {top} saturates.")),
        ],
    }
}

fn timing(facts: &PodcastFacts) -> Segment {
    Segment {
        title: "Timing and Follow-Up",
        lines: vec![
            (Voice::Prompt, "Does timing really matter as much as people say?".to_string()),
            (Voice::Answer, format!("It does. Leads contacted within 2 hours have a {}% higher conversion rate, and mid-week mornings consistently draw the best responses.", facts.lift(22))),
            (Voice::Counter, "Speed helps, but relevance wins. A thoughtful message on day two beats a generic one in the first hour.".to_string()),
        ],
    }
}

fn measurement(facts: &PodcastFacts) -> Segment {
    Segment {
        title: "Measuring What Matters",
        lines: vec![
            (Voice::Prompt, format!("With a conversion rate of {}%, which metrics should teams watch week to week?", facts.rate())),
            (Voice::Answer, "Track conversion rate by source and by segment. Aggregate numbers hide the channels that are quietly underperforming.".to_string()),
            (Voice::Counter, "Lead counts flatter everyone. Pipeline value per lead is the number that keeps a team honest.".to_string()),
        ],
    }
}

fn action_steps(facts: &PodcastFacts) -> Segment {
    Segment {
        title: "Action Steps for Listeners",
        lines: vec![
            (Voice::Prompt, "Let's get practical. What are three specific steps our listeners can take today to improve their lead generation based on this data?".to_string()),
            (Voice::Answer, format!("First, audit your current channels and compare them against the success we're seeing with {}.", facts.top_source)),
            (Voice::Answer, format!("Second, segment your leads based on expressed interests, especially looking for those {} indicators.", facts.interest_pair())),
            (Voice::Answer, format!("And third, implement a response time protocol. Our data shows that leads contacted within 2 hours have a {}% higher conversion rate.", facts.lift(22))),
            (Voice::Counter, "And whatever you change, measure it against a baseline so you know which step actually moved the needle.".to_string()),
        ],
    }
}

/// Body segments in play order; the action steps always close the show.
fn segments(facts: &PodcastFacts, count: u32) -> Vec<Segment> {
    let body: [fn(&PodcastFacts) -> Segment; 5] =
        [landscape, quality_indicators, channel_mix, timing, measurement];
    let body_count = (count.saturating_sub(1) as usize).min(body.len());

    let mut segments: Vec<Segment> = body
        .iter()
        .take(body_count)
        .map(|build| build(facts))
        .collect();
    segments.push(action_steps(facts));
    segments
}

/// Speaker labels for one format and host count.
struct Cast {
    format: PodcastFormat,
    voices: Vec<String>,
}

impl Cast {
    fn new(format: PodcastFormat, host_count: u8) -> Self {
        let voices = match format {
            PodcastFormat::Interview => vec!["HOST".to_string(), "EXPERT".to_string()],
            PodcastFormat::Discussion => (1..=host_count).map(|n| format!("HOST{n}")).collect(),
            PodcastFormat::Debate if host_count >= 3 => vec![
                "MODERATOR".to_string(),
                "VIEWPOINT A".to_string(),
                "VIEWPOINT B".to_string(),
            ],
            PodcastFormat::Debate => vec!["VIEWPOINT A".to_string(), "VIEWPOINT B".to_string()],
        };
        Self { format, voices }
    }

    fn lead(&self) -> &str {
        &self.voices[0]
    }

    fn has_moderator(&self) -> bool {
        self.format == PodcastFormat::Debate && self.voices.len() == 3
    }

    /// `None` when the format has no use for the line.
    fn speaker(&self, voice: Voice, segment: usize, line: usize) -> Option<&str> {
        let label = match (self.format, voice) {
            (PodcastFormat::Interview, Voice::Prompt) => &self.voices[0],
            (PodcastFormat::Interview, Voice::Answer) => &self.voices[1],
            (PodcastFormat::Debate, Voice::Prompt) => &self.voices[0],
            (PodcastFormat::Debate, Voice::Answer) => &self.voices[1],
            (PodcastFormat::Debate, Voice::Counter) if self.has_moderator() => &self.voices[2],
            (PodcastFormat::Debate, Voice::Counter) => &self.voices[0],
            (PodcastFormat::Discussion, Voice::Prompt | Voice::Answer) => {
                &self.voices[(segment + line) % self.voices.len()]
            }
            (_, Voice::Counter) => return None,
        };
        Some(label.as_str())
    }

    fn introduction(&self, topic: &str) -> String {
        match self.format {
            PodcastFormat::Interview => format!(
                "I'm your host, and joining me today is our lead data expert to discuss {topic}."
            ),
            PodcastFormat::Discussion if self.voices.len() > 2 => format!(
                "I'm joined by my two co-hosts, and today we're discussing {topic}."
            ),
            PodcastFormat::Discussion => {
                format!("I'm joined by my co-host, and today we're discussing {topic}.")
            }
            PodcastFormat::Debate => format!(
                "Today two viewpoints go head to head on {topic}, and the data will be our referee."
            ),
        }
    }

    fn format_note(&self) -> &'static str {
        match self.format {
            PodcastFormat::Interview => "Keep HOST questions brief and let EXPERT answers carry authority",
            PodcastFormat::Discussion => "Rotate naturally between hosts so no single voice dominates",
            PodcastFormat::Debate => "Give each viewpoint equal airtime and keep the disagreement respectful",
        }
    }
}

fn podcast_script(leads: &[Lead], options: &PodcastOptions) -> String {
    let facts = PodcastFacts::from_leads(leads);
    let cast = Cast::new(options.format, options.host_count);
    let segment_count = options.segment_count();
    let segment_minutes = options.duration_minutes / segment_count;
    let segments = segments(&facts, segment_count);
    let lead = cast.lead();

    let mut script = String::new();
    let _ = writeln!(
        script,
        "# Heygen Podcast Script: {} ({} minutes)\n",
        options.topic, options.duration_minutes
    );
    let _ = writeln!(
        script,
        "Format: {} ({} voices)\n",
        options.format.label(),
        cast.voices.len()
    );

    let _ = writeln!(script, "## Introduction (2 minutes)\n");
    let _ = writeln!(
        script,
        "{lead}: Welcome to another episode of \"{SHOW_NAME}\", where we dive into data-driven strategies for better lead generation and conversion. {}\n",
        cast.introduction(&options.topic)
    );
    let _ = writeln!(
        script,
        "{lead}: Before we dive in, let me share some fascinating statistics from our recent lead analysis. We've analyzed data from {} leads, with a conversion rate of {}%. Our top performing channel is {}, and the most common interests among our leads are {}.\n",
        format_number(facts.total_leads as f64),
        facts.rate(),
        facts.top_source,
        facts.interest_list()
    );

    for (index, segment) in segments.iter().enumerate() {
        let _ = writeln!(
            script,
            "## Segment {}: {} ({} minutes)\n",
            index + 1,
            segment.title,
            segment_minutes
        );
        for (line, (voice, text)) in segment.lines.iter().enumerate() {
            if let Some(speaker) = cast.speaker(*voice, index, line) {
                let _ = writeln!(script, "{speaker}: {text}\n");
            }
        }
    }

    let titles: Vec<String> = segments
        .iter()
        .map(|segment| segment.title.to_lowercase())
        .collect();
    let _ = writeln!(script, "## Conclusion (1 minute)\n");
    let _ = writeln!(
        script,
        "{lead}: This has been incredibly insightful. To recap, we've covered {}.\n",
        titles.join(", ")
    );
    let _ = writeln!(
        script,
        "{lead}: Remember that effective lead generation is both an art and a science. The data provides the foundation, but your personalized approach makes the difference.\n"
    );
    let _ = writeln!(
        script,
        "{lead}: Thank you for listening to \"{SHOW_NAME}\". Until next time, keep converting!\n"
    );

    let _ = writeln!(script, "---\n\n[PRODUCTION NOTES]");
    let _ = writeln!(
        script,
        "- Use {} different voices/avatars for {}",
        cast.voices.len(),
        cast.voices.join(", ")
    );
    let _ = writeln!(script, "- {}", cast.format_note());
    let _ = writeln!(script, "- Keep a conversational, slightly upbeat tone");
    let _ = writeln!(script, "- Each segment should feel natural with smooth transitions");
    let _ = write!(script, "- Incorporate slight pauses between segments");

    script
}

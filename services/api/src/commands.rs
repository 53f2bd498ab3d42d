use crate::infra::{parse_channel, parse_podcast_format, parse_template};
use chrono::{DateTime, Utc};
use clap::Args;
use lead_analyzer::config::{clamp_synthetic_count, AppConfig, MAX_TIMELINE_DAYS};
use lead_analyzer::error::AppError;
use lead_analyzer::leads::format::{format_currency, format_percent};
use lead_analyzer::leads::outreach::{
    compose_outreach, generate_heygen_script, generate_script, ContentType, OutreachChannel,
    OutreachMessage, PodcastFormat, PodcastOptions, ScriptError, ScriptTemplate,
};
use lead_analyzer::leads::{LeadAnalysis, LeadFormat, LeadImporter, LeadStore};
use lead_analyzer::telemetry::{self, LogSink};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt::Write as _;
use std::path::PathBuf;
use tracing::debug;

#[derive(Args, Debug, Default)]
pub(crate) struct InputArgs {
    /// Load leads from a CSV export
    #[arg(long, conflicts_with_all = ["json", "synthetic"])]
    pub(crate) csv: Option<PathBuf>,
    /// Load leads from a JSON array
    #[arg(long, conflicts_with = "synthetic")]
    pub(crate) json: Option<PathBuf>,
    /// Generate this many synthetic leads (the default input, clamped to 5-100)
    #[arg(long)]
    pub(crate) synthetic: Option<usize>,
    /// Seed for synthetic data and contact-time heuristics
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Score leads before rendering
    #[arg(long)]
    pub(crate) score: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    #[command(flatten)]
    pub(crate) input: InputArgs,
    /// Conversion timeline window in days, 1-365 (defaults to APP_TIMELINE_DAYS)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_TIMELINE_DAYS)))]
    pub(crate) days: Option<u32>,
    /// Print the analysis as JSON instead of text
    #[arg(long)]
    pub(crate) print_json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ScriptArgs {
    /// Template id: overview, personalized, source-performance, or segmentation
    #[arg(value_parser = parse_template)]
    pub(crate) template: ScriptTemplate,
    /// Lead name (substring match) for personalized scripts
    #[arg(long)]
    pub(crate) lead_name: Option<String>,
    #[command(flatten)]
    pub(crate) input: InputArgs,
}

#[derive(Args, Debug)]
pub(crate) struct PodcastArgs {
    /// Podcast format: interview, discussion, or debate
    #[arg(long, value_parser = parse_podcast_format)]
    pub(crate) format: Option<PodcastFormat>,
    /// Episode topic
    #[arg(long)]
    pub(crate) topic: Option<String>,
    /// Episode length in minutes (5-30)
    #[arg(long)]
    pub(crate) duration: Option<u32>,
    /// Number of voices for discussion and debate formats (2-3)
    #[arg(long)]
    pub(crate) hosts: Option<u8>,
    /// Personalize the AI script for the first lead matching this name
    #[arg(long)]
    pub(crate) lead_name: Option<String>,
    /// Render the AI-recommended video script instead of a podcast
    #[arg(long)]
    pub(crate) ai_script: bool,
    #[command(flatten)]
    pub(crate) input: InputArgs,
}

impl PodcastArgs {
    fn options(&self) -> PodcastOptions {
        let defaults = PodcastOptions::default();
        PodcastOptions {
            topic: self.topic.clone().unwrap_or(defaults.topic),
            duration_minutes: self.duration.unwrap_or(defaults.duration_minutes),
            format: self.format.unwrap_or(defaults.format),
            host_count: self.hosts.unwrap_or(defaults.host_count),
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct OutreachArgs {
    /// Id of the lead to contact
    pub(crate) lead_id: String,
    /// Message channel: email or linkedin
    #[arg(long, value_parser = parse_channel, default_value = "email")]
    pub(crate) channel: OutreachChannel,
    #[command(flatten)]
    pub(crate) input: InputArgs,
}

#[derive(Args, Debug, Default)]
pub(crate) struct GenerateArgs {
    /// Number of leads (clamped to 5-100, defaults to APP_SYNTHETIC_COUNT)
    #[arg(long)]
    pub(crate) count: Option<usize>,
    /// Seed for reproducible output
    #[arg(long)]
    pub(crate) seed: Option<u64>,
}

struct CommandContext {
    config: AppConfig,
    now: DateTime<Utc>,
    rng: StdRng,
}

impl CommandContext {
    fn prepare(seed: Option<u64>) -> Result<Self, AppError> {
        let config = AppConfig::load()?;
        telemetry::init(&config.telemetry, LogSink::Stderr)?;
        Ok(Self {
            config,
            now: Utc::now(),
            rng: seeded_rng(seed),
        })
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

pub(crate) fn load_store(
    input: &InputArgs,
    default_count: usize,
    now: DateTime<Utc>,
    rng: &mut StdRng,
) -> Result<LeadStore, AppError> {
    let leads = match (&input.csv, &input.json) {
        (Some(path), _) => LeadImporter::from_path(path, LeadFormat::Csv)?,
        (None, Some(path)) => LeadImporter::from_path(path, LeadFormat::Json)?,
        (None, None) => {
            let count = clamp_synthetic_count(input.synthetic.unwrap_or(default_count));
            LeadImporter::synthetic(rng, count, now)
        }
    };

    let mut store = LeadStore::with_leads(leads);
    if input.score {
        store.calculate_scores(rng);
    }
    debug!(leads = store.len(), scored = input.score, "loaded lead store");
    Ok(store)
}

fn open_store(input: &InputArgs) -> Result<(CommandContext, LeadStore), AppError> {
    let mut context = CommandContext::prepare(input.seed)?;
    let store = load_store(
        input,
        context.config.analytics.synthetic_count,
        context.now,
        &mut context.rng,
    )?;
    Ok((context, store))
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let (context, store) = open_store(&args.input)?;
    let days = args
        .days
        .unwrap_or(context.config.analytics.timeline_days);
    let analysis = store.analysis(context.now, days);

    if args.print_json {
        let json = serde_json::to_string_pretty(&analysis).map_err(std::io::Error::from)?;
        println!("{json}");
    } else {
        print!("{}", render_analysis(&analysis));
    }
    Ok(())
}

pub(crate) fn run_script(args: ScriptArgs) -> Result<(), AppError> {
    let has_name = args
        .lead_name
        .as_deref()
        .is_some_and(|name| !name.trim().is_empty());
    if args.template.requires_lead_name() && !has_name {
        return Err(ScriptError::MissingLeadName.into());
    }

    let (context, store) = open_store(&args.input)?;
    let script = generate_script(
        args.template,
        store.leads(),
        args.lead_name.as_deref(),
        context.now,
    )?;

    println!("{}\n", args.template.name());
    println!("{script}");
    Ok(())
}

pub(crate) fn run_podcast(args: PodcastArgs) -> Result<(), AppError> {
    let (_, store) = open_store(&args.input)?;
    let content = if args.ai_script {
        ContentType::AiScript
    } else {
        ContentType::Podcast
    };

    let script = generate_heygen_script(
        store.leads(),
        args.lead_name.as_deref(),
        content,
        &args.options(),
    )?;
    println!("{script}");
    Ok(())
}

pub(crate) fn run_outreach(args: OutreachArgs) -> Result<(), AppError> {
    let (_, store) = open_store(&args.input)?;
    let lead = store
        .get(&args.lead_id)
        .ok_or_else(|| AppError::LeadNotFound(args.lead_id.clone()))?;

    print!("{}", render_outreach(&compose_outreach(lead, args.channel)));
    Ok(())
}

pub(crate) fn run_generate(args: GenerateArgs) -> Result<(), AppError> {
    let mut context = CommandContext::prepare(args.seed)?;
    let count = clamp_synthetic_count(
        args.count
            .unwrap_or(context.config.analytics.synthetic_count),
    );
    let leads = LeadImporter::synthetic(&mut context.rng, count, context.now);
    let views: Vec<_> = leads.iter().map(|lead| lead.to_view()).collect();

    let json = serde_json::to_string_pretty(&views).map_err(std::io::Error::from)?;
    println!("{json}");
    Ok(())
}

pub(crate) fn render_analysis(analysis: &LeadAnalysis) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Lead analysis as of {} ({} leads, {} scored)",
        analysis.generated_at.format("%Y-%m-%d"),
        analysis.lead_count,
        analysis.scored_count
    );

    if analysis.is_empty() {
        let _ = writeln!(out, "No lead data available for analysis.");
        return out;
    }

    let _ = writeln!(
        out,
        "Total value {} | average {} | conversion rate {} | {} new in the last 7 days",
        format_currency(analysis.total_value),
        format_currency(analysis.average_value),
        format_percent(analysis.conversion_rate),
        analysis.recent_leads
    );
    if let Some(top) = &analysis.top_source {
        let _ = writeln!(out, "Top source: {} ({} leads)", top.source, top.count);
    }

    let _ = writeln!(out, "\nInsights");
    for insight in &analysis.insights {
        let _ = writeln!(
            out,
            "- [{}] {}: {} ({})",
            insight.kind.label(),
            insight.title,
            insight.value,
            insight.description
        );
    }

    let _ = writeln!(out, "\nSources by value");
    for source in &analysis.source_breakdown {
        let _ = writeln!(
            out,
            "- {}: {} leads | {}",
            source.name,
            source.count,
            format_currency(source.value)
        );
    }

    let _ = writeln!(out, "\nStatuses");
    for status in &analysis.status_breakdown {
        let _ = writeln!(
            out,
            "- {}: {} leads | {}",
            status.name,
            status.count,
            format_currency(status.value)
        );
    }

    if !analysis.tag_breakdown.is_empty() {
        let _ = writeln!(out, "\nTags");
        for tag in &analysis.tag_breakdown {
            let _ = writeln!(out, "- {}: {}", tag.name, tag.count);
        }
    }

    if !analysis.engagement_metrics.is_empty() {
        let _ = writeln!(out, "\nEngagement by interaction type");
        for metric in &analysis.engagement_metrics {
            let _ = writeln!(
                out,
                "- {}: {} positive | {} neutral | {} negative",
                metric.interaction_type,
                metric.positive_count,
                metric.neutral_count,
                metric.negative_count
            );
        }
    }

    if analysis.scored_count > 0 {
        let _ = writeln!(out, "\nScore distribution");
        for bucket in &analysis.score_distribution {
            let _ = writeln!(out, "- {}: {}", bucket.range, bucket.count);
        }
    }

    let _ = writeln!(out, "\nHigh-value leads");
    for lead in &analysis.high_value_leads {
        let score = lead
            .score
            .map(|score| format!(" | score {score}"))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "- {} {} | {} | {}{}",
            lead.id,
            lead.name,
            lead.source,
            format_currency(lead.estimated_value),
            score
        );
    }

    let _ = writeln!(
        out,
        "\nNew leads over the last {} days: {}",
        analysis.timeline_days,
        analysis
            .conversions_by_time_frame
            .iter()
            .map(|point| point.count)
            .sum::<usize>()
    );
    for point in &analysis.conversions_by_time_frame {
        let _ = writeln!(out, "- {}: {}", point.date, point.count);
    }

    out
}

pub(crate) fn render_outreach(message: &OutreachMessage) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Outreach via {} for {}",
        message.channel.label(),
        message.lead_id
    );
    if let Some(subject) = &message.subject {
        let _ = writeln!(out, "Subject: {subject}");
    }
    let _ = writeln!(out, "\n{}", message.body);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 30, 12, 0, 0).unwrap()
    }

    fn synthetic_input(count: usize, score: bool) -> InputArgs {
        InputArgs {
            synthetic: Some(count),
            seed: Some(7),
            score,
            ..InputArgs::default()
        }
    }

    #[test]
    fn synthetic_input_is_clamped_and_optionally_scored() {
        let mut rng = seeded_rng(Some(7));
        let store = load_store(&synthetic_input(2, false), 25, now(), &mut rng).expect("loads");
        assert_eq!(store.len(), 5);
        assert!(store.leads().iter().all(|lead| lead.score().is_none()));

        let mut rng = seeded_rng(Some(7));
        let store = load_store(&synthetic_input(12, true), 25, now(), &mut rng).expect("loads");
        assert_eq!(store.len(), 12);
        assert!(store.leads().iter().all(|lead| lead.score().is_some()));
    }

    #[test]
    fn default_input_uses_configured_count() {
        let mut rng = seeded_rng(Some(1));
        let store = load_store(&InputArgs::default(), 40, now(), &mut rng).expect("loads");
        assert_eq!(store.len(), 40);
    }

    #[test]
    fn missing_file_surfaces_import_error() {
        let input = InputArgs {
            csv: Some(PathBuf::from("/nonexistent/leads.csv")),
            ..InputArgs::default()
        };
        let mut rng = seeded_rng(Some(1));
        let error = load_store(&input, 25, now(), &mut rng).expect_err("missing file");
        assert!(matches!(error, AppError::Import(_)));
    }

    #[test]
    fn report_lists_sections_for_scored_leads() {
        let mut rng = seeded_rng(Some(3));
        let store = load_store(&synthetic_input(30, true), 25, now(), &mut rng).expect("loads");
        let rendered = render_analysis(&store.analysis(now(), 30));

        assert!(rendered.starts_with("Lead analysis as of 2025-06-30 (30 leads, 30 scored)"));
        assert!(rendered.contains("\nInsights\n- [info] Total Lead Value: $"));
        assert!(rendered.contains("\nSources by value\n"));
        assert!(rendered.contains("\nScore distribution\n- 0-20: "));
        assert!(rendered.contains("\nNew leads over the last 30 days: "));
    }

    #[test]
    fn empty_report_says_so() {
        let rendered = render_analysis(&LeadAnalysis::from_leads(&[], now(), 30));
        assert!(rendered.contains("No lead data available for analysis."));
        assert!(!rendered.contains("Insights"));
    }

    #[test]
    fn personalized_script_without_name_is_rejected_before_loading() {
        let args = ScriptArgs {
            template: ScriptTemplate::Personalized,
            lead_name: Some("   ".to_string()),
            input: InputArgs {
                csv: Some(PathBuf::from("/nonexistent/leads.csv")),
                ..InputArgs::default()
            },
        };
        let error = run_script(args).expect_err("name required");
        assert!(matches!(error, AppError::Script(ScriptError::MissingLeadName)));
    }

    #[test]
    fn generate_command_runs_end_to_end() {
        let args = GenerateArgs {
            count: Some(3),
            seed: Some(21),
        };
        assert!(run_generate(args).is_ok());
    }

    #[test]
    fn podcast_args_fill_defaults() {
        let args = PodcastArgs {
            format: None,
            topic: None,
            duration: Some(45),
            hosts: None,
            lead_name: None,
            ai_script: false,
            input: InputArgs::default(),
        };
        let options = args.options();
        assert_eq!(options.format, PodcastFormat::Discussion);
        assert_eq!(options.duration_minutes, 45);
        assert_eq!(options.normalized().duration_minutes, 30);
        assert_eq!(options.host_count, 2);
    }

    #[test]
    fn outreach_rendering_includes_subject_for_email() {
        let mut rng = seeded_rng(Some(5));
        let store = load_store(&synthetic_input(5, false), 25, now(), &mut rng).expect("loads");
        let lead = store.get("lead-001").expect("first lead");

        let email = render_outreach(&compose_outreach(lead, OutreachChannel::Email));
        assert!(email.starts_with("Outreach via email for lead-001\nSubject: "));

        let note = render_outreach(&compose_outreach(lead, OutreachChannel::LinkedIn));
        assert!(!note.contains("Subject:"));
    }
}

use crate::commands::{
    run_generate, run_outreach, run_podcast, run_report, run_script, GenerateArgs, OutreachArgs,
    PodcastArgs, ReportArgs, ScriptArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use lead_analyzer::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Lead Analyzer",
    about = "Analyze lead lists and generate outreach scripts from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print the full lead analysis: insights, breakdowns, timeline, and top leads
    Report(ReportArgs),
    /// Render one of the script templates (overview, personalized, source-performance, segmentation)
    Script(ScriptArgs),
    /// Render a Heygen podcast or AI-recommended video script
    Podcast(PodcastArgs),
    /// Compose an email or LinkedIn message for a single lead
    Outreach(OutreachArgs),
    /// Print synthetic leads as JSON
    Generate(GenerateArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Report(args) => run_report(args),
        Command::Script(args) => run_script(args),
        Command::Podcast(args) => run_podcast(args),
        Command::Outreach(args) => run_outreach(args),
        Command::Generate(args) => run_generate(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lead_analyzer::leads::outreach::{OutreachChannel, PodcastFormat, ScriptTemplate};

    #[test]
    fn no_subcommand_defaults_to_serve() {
        let cli = Cli::try_parse_from(["lead-analyzer-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn script_command_parses_template_and_input() {
        let cli = Cli::try_parse_from([
            "lead-analyzer-api",
            "script",
            "personalized",
            "--lead-name",
            "Jane",
            "--csv",
            "leads.csv",
            "--score",
        ])
        .expect("parses");

        let Some(Command::Script(args)) = cli.command else {
            panic!("expected script command");
        };
        assert_eq!(args.template, ScriptTemplate::Personalized);
        assert_eq!(args.lead_name.as_deref(), Some("Jane"));
        assert!(args.input.score);
        assert!(args.input.csv.is_some());
    }

    #[test]
    fn podcast_and_outreach_options_parse() {
        let cli = Cli::try_parse_from([
            "lead-analyzer-api",
            "podcast",
            "--format",
            "debate",
            "--hosts",
            "3",
            "--duration",
            "25",
        ])
        .expect("parses");
        let Some(Command::Podcast(args)) = cli.command else {
            panic!("expected podcast command");
        };
        assert_eq!(args.format, Some(PodcastFormat::Debate));
        assert_eq!(args.hosts, Some(3));
        assert_eq!(args.duration, Some(25));

        let cli = Cli::try_parse_from([
            "lead-analyzer-api",
            "outreach",
            "lead-004",
            "--channel",
            "linkedin",
        ])
        .expect("parses");
        let Some(Command::Outreach(args)) = cli.command else {
            panic!("expected outreach command");
        };
        assert_eq!(args.lead_id, "lead-004");
        assert_eq!(args.channel, OutreachChannel::LinkedIn);
    }

    #[test]
    fn report_days_are_bounded() {
        let cli = Cli::try_parse_from(["lead-analyzer-api", "report", "--days", "90"])
            .expect("parses");
        let Some(Command::Report(args)) = cli.command else {
            panic!("expected report command");
        };
        assert_eq!(args.days, Some(90));

        for days in ["0", "366", "4000000000"] {
            let result = Cli::try_parse_from(["lead-analyzer-api", "report", "--days", days]);
            assert!(result.is_err(), "--days {days} should be rejected");
        }
    }

    #[test]
    fn conflicting_inputs_are_rejected() {
        let result = Cli::try_parse_from([
            "lead-analyzer-api",
            "report",
            "--csv",
            "a.csv",
            "--json",
            "b.json",
        ]);
        assert!(result.is_err());

        let result = Cli::try_parse_from(["lead-analyzer-api", "script", "weekly"]);
        assert!(result.is_err());
    }
}

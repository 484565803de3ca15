use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use oe_weekly::clean::parse_date_text;
use oe_weekly::io::{discover, excel_read::OE_COUNTS_SHEET};
use oe_weekly::pipeline;
use oe_weekly::summary::{SummaryOptions, render_summary};
use oe_weekly::week::{Week, WeekRanges};
use oe_weekly::{ReportError, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging().and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| ReportError::Logging(error.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    // Everything is rendered before printing so a failure never leaves
    // partial output behind.
    let output = match cli.command {
        Command::Clients(args) => execute_clients(args)?,
        Command::Summary(args) => execute_summary(args)?,
    };
    println!("{output}");
    Ok(())
}

fn execute_clients(args: ClientsArgs) -> Result<String> {
    let week = args.resolve_week()?;
    let input = args.source.resolve_input()?;
    let cleaned = pipeline::load_clients(&input, &args.source.sheet)?;
    let reports = pipeline::weekly_reports(&cleaned, week);

    match args.format {
        OutputFormat::Table => Ok(reports
            .iter()
            .map(|report| format!("\n{}", report.render()))
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Json => {
            let json: Vec<_> = reports.iter().map(|report| report.to_json()).collect();
            Ok(serde_json::to_string_pretty(&json)?)
        }
    }
}

fn execute_summary(args: SummaryArgs) -> Result<String> {
    let input = args.source.resolve_input()?;
    let cleaned = pipeline::load_clients(&input, &args.source.sheet)?;
    let base_date = args.base_date.unwrap_or_else(today);
    let options = SummaryOptions {
        season_start: args.season_start,
    };
    let rows = pipeline::weekly_summary(&cleaned, WeekRanges::around(base_date), &options);

    match args.format {
        OutputFormat::Table => Ok(format!("\n{}", render_summary(&rows))),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&rows)?),
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn parse_date_arg(value: &str) -> std::result::Result<NaiveDate, String> {
    parse_date_text(value).ok_or_else(|| format!("expected a date like 2025-10-27, got '{value}'"))
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Weekly go-live and active client reports from the OE Counts export."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List clients going live and active during one week.
    Clients(ClientsArgs),
    /// Summarise last, this and next week.
    Summary(SummaryArgs),
}

#[derive(clap::Args)]
struct SourceArgs {
    /// Workbook to read; takes precedence over --dir.
    #[arg(long, env = "OE_WEEKLY_INPUT")]
    input: Option<PathBuf>,

    /// Directory to pick the most recently modified .xlsx from.
    #[arg(long, env = "OE_WEEKLY_DIR")]
    dir: Option<PathBuf>,

    /// Sheet holding the client rows.
    #[arg(long, env = "OE_WEEKLY_SHEET", default_value = OE_COUNTS_SHEET)]
    sheet: String,
}

impl SourceArgs {
    fn resolve_input(&self) -> Result<PathBuf> {
        if let Some(input) = &self.input {
            return Ok(input.clone());
        }
        let dir = self.dir.clone().unwrap_or_else(|| PathBuf::from("."));
        let input = discover::latest_workbook(&dir)?;
        info!(input = %input.display(), "using most recent workbook");
        Ok(input)
    }
}

#[derive(clap::Args)]
struct ClientsArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// First day of the reporting week.
    #[arg(long, env = "OE_WEEKLY_WEEK_START", value_parser = parse_date_arg)]
    week_start: Option<NaiveDate>,

    /// Last day of the reporting week.
    #[arg(long, env = "OE_WEEKLY_WEEK_END", value_parser = parse_date_arg)]
    week_end: Option<NaiveDate>,

    /// Report the Monday–Sunday week containing this date; ignored when
    /// --week-start and --week-end are given.
    #[arg(long, env = "OE_WEEKLY_WEEK_OF", value_parser = parse_date_arg)]
    week_of: Option<NaiveDate>,

    #[arg(long, env = "OE_WEEKLY_FORMAT", value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

impl ClientsArgs {
    fn resolve_week(&self) -> Result<Week> {
        Week::resolve(self.week_start, self.week_end, self.week_of, today())
    }
}

#[derive(clap::Args)]
struct SummaryArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Date whose week counts as "this week".
    #[arg(long, env = "OE_WEEKLY_BASE_DATE", value_parser = parse_date_arg)]
    base_date: Option<NaiveDate>,

    /// First window start counted towards confirmed lives (default Sep 8).
    #[arg(long, env = "OE_WEEKLY_SEASON_START", value_parser = parse_date_arg)]
    season_start: Option<NaiveDate>,

    #[arg(long, env = "OE_WEEKLY_FORMAT", value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

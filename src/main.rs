//! Outreach Tracker - job-search outreach tracking from the command line
//!
//! Records target companies, engagements with contacts and job-board search
//! queries in CSV files, and derives response rates, funnels, upcoming
//! follow-ups, charts and suggestions from them.
//!
//! Exit codes:
//!   0 - Success
//!   1 - The operation reported failure, or a runtime error occurred

mod analysis;
mod charts;
mod cli;
mod config;
mod error;
mod models;
mod report;
mod store;
mod tracker;

use anyhow::{Context, Result};
use cli::{Args, Command, OutputFormat};
use config::{Config, CONFIG_FILE};
use models::Outcome;
use report::console;
use std::path::Path;
use tracing::{debug, error, info};
use tracing_subscriber::FmtSubscriber;
use tracker::Tracker;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        console::print_error(&e);
        std::process::exit(1);
    }

    // Handle init-config early (no logging or store needed)
    if let Command::InitConfig = args.command {
        return handle_init_config();
    }

    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    init_logging(&args, &config)?;

    info!("Outreach Tracker v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    debug!("Configuration: {:?}", config);

    match run(args, config) {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            error!("Command failed: {:#}", e);
            console::print_error(&format!("{:#}", e));
            std::process::exit(1);
        }
    }
}

/// Handle init-config: generate a default .outreach.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        console::print_warning(&format!(
            "{} already exists. Remove it first or edit it manually.",
            CONFIG_FILE
        ));
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    console::print_success(&format!("Created {} with default settings.", CONFIG_FILE));
    println!("   Edit it to change the data directory, analytics window and charts.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args, config: &Config) -> Result<()> {
    let level = if config.general.verbose && !args.quiet {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

/// Load configuration from file or use defaults.
///
/// Runs before logging is set up, so problems are printed directly.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok(config),
        Ok(None) => Ok(Config::default()),
        Err(e) => {
            console::print_warning(&format!("Ignoring {}: {:#}", CONFIG_FILE, e));
            Ok(Config::default())
        }
    }
}

/// Run one command against the store. Returns the exit code.
fn run(args: Args, config: Config) -> Result<i32> {
    let data_dir = config.general.data_dir.clone();
    let tracker = Tracker::open(config)
        .with_context(|| format!("Failed to open data directory {}", data_dir.display()))?;

    match args.command {
        Command::AddCompany(company) => Ok(finish(tracker.add_company(company.into()))),
        Command::AddEngagement(engagement) => {
            Ok(finish(tracker.add_engagement(engagement.into())))
        }
        Command::AddQuery(query) => Ok(finish(tracker.add_query(query.into()))),
        Command::UpdateStatus {
            company,
            status,
            notes,
        } => Ok(finish(tracker.update_company_status(
            &company,
            &status,
            notes.as_deref(),
        ))),
        Command::UpdateResponse {
            contact,
            company,
            response,
            hours,
        } => Ok(finish(tracker.update_engagement_response(
            &contact, &company, &response, hours,
        ))),
        Command::Import { kind, file } => Ok(finish(tracker.import(kind, &file))),
        Command::List { kind, format } => handle_list(&tracker, kind, format),
        Command::Upcoming { days } => {
            let upcoming = tracker.upcoming(days)?;
            console::print_warnings(&upcoming.warnings);
            print!("{}", console::upcoming_text(&upcoming));
            Ok(0)
        }
        Command::Analytics {
            format,
            output,
            no_charts,
        } => handle_analytics(&tracker, format, output.as_deref(), no_charts),
        Command::Suggest { format } => {
            let (advice, warnings) = tracker.advice()?;
            console::print_warnings(&warnings);
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&advice)?),
                OutputFormat::Table | OutputFormat::Markdown => {
                    print!("{}", console::advice_text(&advice))
                }
            }
            Ok(0)
        }
        // Handled in main before the store is opened.
        Command::InitConfig => Ok(0),
    }
}

/// Print an outcome and map it to an exit code.
fn finish(outcome: Outcome) -> i32 {
    console::print_outcome(&outcome);
    if outcome.success {
        0
    } else {
        1
    }
}

fn handle_list(tracker: &Tracker, kind: models::RecordKind, format: OutputFormat) -> Result<i32> {
    let listing = tracker.list(kind)?;
    console::print_warnings(&listing.warnings);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&listing.records)?),
        _ if listing.rows.is_empty() => println!("No {} records yet.", listing.kind),
        OutputFormat::Table => println!("{}", console::listing_table(&listing, false)),
        OutputFormat::Markdown => println!("{}", console::listing_table(&listing, true)),
    }

    Ok(0)
}

fn handle_analytics(
    tracker: &Tracker,
    format: OutputFormat,
    output: Option<&Path>,
    no_charts: bool,
) -> Result<i32> {
    let report = tracker.analytics()?;
    console::print_warnings(&report.warnings);

    let content = match format {
        OutputFormat::Table => console::analytics_text(&report),
        OutputFormat::Markdown => report::generate_markdown_report(&report),
        OutputFormat::Json => report::generate_json_report(&report)?,
    };

    match output {
        Some(path) => {
            report::write_report(&content, path)?;
            console::print_success(&format!("Report saved to: {}", path.display()));
        }
        None => println!("{}", content),
    }

    if no_charts || !tracker.config().charts.enabled {
        debug!("Chart generation skipped");
        return Ok(0);
    }

    let figures = tracker.render_figures(&report)?;
    for note in &figures.notes {
        info!("{}", note);
        console::print_info(note);
    }
    console::print_success(&format!(
        "Wrote {} chart(s) to {}",
        figures.written.len(),
        figures.dir.display()
    ));

    Ok(0)
}

//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and conversion of record flags into records.

use crate::models::{Company, Engagement, Query, RecordKind};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// Longest look-ahead accepted by `upcoming`, about a century.
pub const MAX_UPCOMING_DAYS: u32 = 36_500;

/// Outreach Tracker - keep tabs on a job search
///
/// Records companies, engagements and search queries in plain CSV files,
/// then reports response rates, funnels, upcoming follow-ups and
/// suggestions for where to spend effort.
///
/// Examples:
///   outreach add-company --name "Example Tech" --industry Software --technologies "Python, AWS"
///   outreach add-engagement --contact "Jane Smith" --company "Example Tech" --platform LinkedIn --type Comment
///   outreach update-response "Jane Smith" "Example Tech" "Happy to chat" --hours 20
///   outreach analytics --format markdown --output report.md
///   outreach init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Directory holding the tracking files
    ///
    /// Overrides `general.data_dir` from the config file (default: ./data).
    #[arg(short, long, global = true, value_name = "DIR", env = "OUTREACH_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .outreach.toml in the current directory
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Add a company to track
    AddCompany(CompanyArgs),

    /// Log an engagement with a contact
    AddEngagement(EngagementArgs),

    /// Save a job-board search query
    AddQuery(QueryArgs),

    /// Change a company's contact status
    UpdateStatus {
        /// Exact company name
        company: String,
        /// New contact status (e.g. "In Conversation")
        status: String,
        /// Replace the company's notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// Record a response on the latest engagement with a contact
    UpdateResponse {
        /// Contact name
        contact: String,
        /// Company name
        company: String,
        /// The response received
        response: String,
        /// Hours it took to respond
        #[arg(long, value_name = "HOURS")]
        hours: Option<f64>,
    },

    /// Bulk-insert records from a JSON array
    ///
    /// Keys must be the exact column names; unknown keys are rejected.
    Import {
        /// Kind of records in the file
        #[arg(value_enum)]
        kind: RecordKind,
        /// JSON file containing an array of records
        file: PathBuf,
    },

    /// Print every record of one kind
    List {
        #[arg(value_enum)]
        kind: RecordKind,
        /// Output format
        #[arg(long, default_value = "table", value_name = "FORMAT")]
        format: OutputFormat,
    },

    /// Show follow-ups due in the next few days
    Upcoming {
        /// Days to look ahead (default: from config, 7)
        #[arg(long, value_name = "DAYS")]
        days: Option<u32>,
    },

    /// Summarize the search and write charts
    Analytics {
        /// Output format
        #[arg(long, default_value = "table", value_name = "FORMAT")]
        format: OutputFormat,
        /// Write the report to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
        /// Skip chart generation
        #[arg(long)]
        no_charts: bool,
    },

    /// Suggest where to focus next
    Suggest {
        /// Output format
        #[arg(long, default_value = "table", value_name = "FORMAT")]
        format: OutputFormat,
    },

    /// Generate a default .outreach.toml configuration file
    InitConfig,
}

/// Output format for reports and listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Console tables (default)
    #[default]
    Table,
    /// Markdown
    Markdown,
    /// JSON
    Json,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct CompanyArgs {
    /// Company name (must be unique)
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub industry: String,
    /// Comma-separated technologies (e.g. "Python, AWS")
    #[arg(long)]
    pub technologies: String,
    #[arg(long)]
    pub size: Option<String>,
    #[arg(long, value_name = "URL")]
    pub job_url: Option<String>,
    #[arg(long, value_name = "NAME")]
    pub eng_manager: Option<String>,
    #[arg(long, value_name = "URL")]
    pub eng_manager_linkedin: Option<String>,
    #[arg(long, value_name = "NAME")]
    pub recruiter: Option<String>,
    #[arg(long, value_name = "URL")]
    pub recruiter_linkedin: Option<String>,
    #[arg(long, value_name = "NAME")]
    pub team_lead: Option<String>,
    #[arg(long, value_name = "URL")]
    pub team_lead_linkedin: Option<String>,
    #[arg(long)]
    pub mutual_connections: Option<String>,
    /// Contact status (e.g. "Initial Research")
    #[arg(long)]
    pub status: Option<String>,
    /// Defaults to today
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub last_contact_date: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

impl From<CompanyArgs> for Company {
    fn from(args: CompanyArgs) -> Self {
        Company {
            name: args.name,
            industry: args.industry,
            size: args.size,
            job_posting_url: args.job_url,
            technologies: args.technologies,
            engineering_manager_name: args.eng_manager,
            engineering_manager_linkedin: args.eng_manager_linkedin,
            recruiter_name: args.recruiter,
            recruiter_linkedin: args.recruiter_linkedin,
            team_lead_name: args.team_lead,
            team_lead_linkedin: args.team_lead_linkedin,
            mutual_connections: args.mutual_connections,
            contact_status: args.status,
            last_contact_date: args.last_contact_date,
            notes: args.notes,
        }
    }
}

#[derive(ClapArgs, Debug, Clone)]
pub struct EngagementArgs {
    #[arg(long)]
    pub contact: String,
    #[arg(long)]
    pub company: String,
    #[arg(long)]
    pub platform: String,
    /// Engagement type (e.g. Comment, Direct Message)
    #[arg(long = "type", value_name = "TYPE")]
    pub engagement_type: String,
    /// Contact's position
    #[arg(long)]
    pub position: Option<String>,
    /// Defaults to today
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub date: Option<String>,
    #[arg(long, value_name = "TEXT")]
    pub content: Option<String>,
    #[arg(long)]
    pub response: Option<String>,
    #[arg(long, value_name = "HOURS")]
    pub response_time: Option<f64>,
    #[arg(long)]
    pub next_action: Option<String>,
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub next_action_date: Option<String>,
    /// Status (e.g. "Initial Contact")
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

impl From<EngagementArgs> for Engagement {
    fn from(args: EngagementArgs) -> Self {
        Engagement {
            contact_name: args.contact,
            company: args.company,
            position: args.position,
            platform: args.platform,
            engagement_type: args.engagement_type,
            date: args.date,
            content_sent: args.content,
            response_received: args.response,
            response_time_hours: args.response_time.map(|h| h.to_string()),
            next_action: args.next_action,
            next_action_date: args.next_action_date,
            status: args.status,
            notes: args.notes,
        }
    }
}

#[derive(ClapArgs, Debug, Clone)]
pub struct QueryArgs {
    #[arg(long)]
    pub platform: String,
    /// The search text
    #[arg(long)]
    pub query: String,
    /// Defaults to today
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub date_added: Option<String>,
    #[arg(long, value_name = "COUNT")]
    pub results: Option<u32>,
    /// How useful the results were (e.g. 1-5)
    #[arg(long)]
    pub rating: Option<f64>,
}

impl From<QueryArgs> for Query {
    fn from(args: QueryArgs) -> Self {
        Query {
            platform: args.platform,
            query: args.query,
            date_added: args.date_added,
            results_count: args.results.map(|n| n.to_string()),
            effectiveness_rating: args.rating.map(|r| r.to_string()),
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        match &self.command {
            Command::AddEngagement(args) => {
                check_hours(args.response_time)?;
                check_date("--date", args.date.as_deref())?;
                check_date("--next-action-date", args.next_action_date.as_deref())?;
            }
            Command::AddCompany(args) => {
                check_date("--last-contact-date", args.last_contact_date.as_deref())?;
            }
            Command::AddQuery(args) => {
                check_date("--date-added", args.date_added.as_deref())?;
            }
            Command::UpdateResponse { hours, .. } => check_hours(*hours)?,
            Command::Upcoming { days: Some(days) } if *days > MAX_UPCOMING_DAYS => {
                return Err(format!(
                    "--days must be at most {}, got {}",
                    MAX_UPCOMING_DAYS, days
                ));
            }
            Command::Import { file, .. } => {
                if !file.is_file() {
                    return Err(format!("Import file does not exist: {}", file.display()));
                }
            }
            _ => {}
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// Results go to stdout through the console printer, so by default only
    /// warnings are logged.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        }
    }
}

fn check_hours(hours: Option<f64>) -> Result<(), String> {
    match hours {
        Some(h) if !h.is_finite() || h < 0.0 => {
            Err("Response time must be a non-negative number of hours".to_string())
        }
        _ => Ok(()),
    }
}

fn check_date(flag: &str, value: Option<&str>) -> Result<(), String> {
    match value {
        Some(v) if crate::models::parse_date(v).is_none() => {
            Err(format!("{} must be a date like 2024-05-01, got '{}'", flag, v))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_add_company_into_record() {
        let args = parse(&[
            "outreach",
            "add-company",
            "--name",
            "Example Tech",
            "--industry",
            "Software",
            "--technologies",
            "Python, AWS",
            "--recruiter",
            "Sam",
        ]);

        let Command::AddCompany(company) = args.command else {
            panic!("expected add-company");
        };
        let company = Company::from(company);
        assert_eq!(company.name, "Example Tech");
        assert_eq!(company.recruiter_name.as_deref(), Some("Sam"));
        assert_eq!(company.notes, None);
    }

    #[test]
    fn test_engagement_type_flag() {
        let args = parse(&[
            "outreach",
            "add-engagement",
            "--contact",
            "Jane",
            "--company",
            "Acme",
            "--platform",
            "LinkedIn",
            "--type",
            "Comment",
            "--response-time",
            "12.5",
        ]);

        let Command::AddEngagement(engagement) = args.command else {
            panic!("expected add-engagement");
        };
        let engagement = Engagement::from(engagement);
        assert_eq!(engagement.engagement_type, "Comment");
        assert_eq!(engagement.response_time_hours.as_deref(), Some("12.5"));
    }

    #[test]
    fn test_missing_required_flag_rejected() {
        assert!(Args::try_parse_from(["outreach", "add-query", "--platform", "Indeed"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = parse(&["outreach", "suggest", "--data-dir", "elsewhere", "-v"]);
        assert_eq!(args.data_dir, Some(PathBuf::from("elsewhere")));
        assert!(args.verbose);
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = parse(&["outreach", "upcoming"]);
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let args = parse(&["outreach", "update-response", "Jane", "Acme", "Hi", "--hours=-3"]);
        assert!(args.validate().is_err());

        let args = parse(&[
            "outreach",
            "add-query",
            "--platform",
            "Indeed",
            "--query",
            "rust",
            "--date-added",
            "yesterday",
        ]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_upcoming_days() {
        let args = parse(&["outreach", "upcoming", "--days", "200000000"]);
        let err = args.validate().unwrap_err();
        assert!(err.contains("at most 36500"));

        let args = parse(&["outreach", "upcoming", "--days", "36500"]);
        assert!(args.validate().is_ok());

        let args = parse(&["outreach", "upcoming"]);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = parse(&["outreach", "upcoming"]);
        assert_eq!(args.log_level(), tracing::Level::WARN);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}

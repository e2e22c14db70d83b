//! The operation boundary.
//!
//! Every write operation returns an [`Outcome`] instead of an error, so a
//! bad insert or a missing update target is reported to the caller rather
//! than ending the process. Read operations hand back their data together
//! with any load warnings.

use crate::analysis::{advise, upcoming_actions, Advice, AnalyticsReport};
use crate::charts::{
    render_figures, FigureSummary, NoTagCloud, SvgRenderer, SvgTagCloud, TagCloudRenderer,
};
use crate::config::Config;
use crate::error::{Result, TrackerError};
use crate::models::{ActionRow, Company, Engagement, Outcome, Query, Record, RecordKind};
use crate::store::{Store, Table};
use chrono::{Duration, Local, NaiveDate};
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info, warn};

/// Records of every kind, loaded together.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub companies: Vec<Company>,
    pub engagements: Vec<Engagement>,
    pub queries: Vec<Query>,
    pub warnings: Vec<String>,
}

/// Rows of one kind prepared for display.
#[derive(Debug, Clone)]
pub struct Listing {
    pub kind: RecordKind,
    /// Columns shown in table and Markdown output.
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
    /// Full records, for JSON output.
    pub records: Vec<Value>,
    pub warnings: Vec<String>,
}

/// Follow-ups due inside a date window.
#[derive(Debug, Clone)]
pub struct Upcoming {
    pub days: u32,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub actions: Vec<ActionRow>,
    pub warnings: Vec<String>,
}

pub struct Tracker {
    config: Config,
    store: Store,
    today: Option<NaiveDate>,
}

impl Tracker {
    /// Open the store named by the configuration.
    pub fn open(config: Config) -> Result<Self> {
        let store = Store::open(config.general.data_dir.clone())?;
        debug!("Using data directory {}", store.data_dir().display());
        Ok(Self {
            config,
            store,
            today: None,
        })
    }

    /// Pin "today" instead of reading the local clock.
    pub fn at_date(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn add_company(&self, company: Company) -> Outcome {
        insert(self.store.companies(), company, self.today())
    }

    pub fn add_engagement(&self, engagement: Engagement) -> Outcome {
        insert(self.store.engagements(), engagement, self.today())
    }

    pub fn add_query(&self, query: Query) -> Outcome {
        insert(self.store.queries(), query, self.today())
    }

    pub fn update_company_status(&self, name: &str, status: &str, notes: Option<&str>) -> Outcome {
        match self
            .store
            .update_company_status(name, status, notes, self.today())
        {
            Ok(company) => {
                info!("Updated status for {}", company.name);
                Outcome::success(format!("Updated status for {} to {}", name, status))
            }
            Err(e) => failed("update company status", e),
        }
    }

    pub fn update_engagement_response(
        &self,
        contact_name: &str,
        company: &str,
        response: &str,
        response_time_hours: Option<f64>,
    ) -> Outcome {
        match self.store.update_engagement_response(
            contact_name,
            company,
            response,
            response_time_hours,
        ) {
            Ok(engagement) => {
                info!("Recorded response for {}", engagement.label());
                Outcome::success(format!(
                    "Updated engagement with {} to include response",
                    contact_name
                ))
            }
            Err(e) => failed("update engagement response", e),
        }
    }

    /// Insert records of `kind` from a JSON array file.
    pub fn import(&self, kind: RecordKind, path: &Path) -> Outcome {
        let result = match kind {
            RecordKind::Company => import_into(self.store.companies(), path, self.today()),
            RecordKind::Engagement => import_into(self.store.engagements(), path, self.today()),
            RecordKind::Query => import_into(self.store.queries(), path, self.today()),
        };

        match result {
            Ok(summary) => {
                let message = format!(
                    "Imported {} {} record(s) from {}",
                    summary.inserted,
                    kind,
                    path.display()
                );
                summary
                    .rejected
                    .into_iter()
                    .fold(Outcome::success(message), |outcome, (label, reason)| {
                        outcome.with_warning(format!("Rejected {}: {}", label, reason))
                    })
            }
            Err(e) => failed("import", e),
        }
    }

    /// Load every record of every kind.
    pub fn load(&self) -> Result<Dataset> {
        let mut dataset = Dataset::default();
        dataset.companies = load_table(self.store.companies(), &mut dataset.warnings)?;
        dataset.engagements = load_table(self.store.engagements(), &mut dataset.warnings)?;
        dataset.queries = load_table(self.store.queries(), &mut dataset.warnings)?;
        Ok(dataset)
    }

    pub fn list(&self, kind: RecordKind) -> Result<Listing> {
        match kind {
            RecordKind::Company => listing(self.store.companies(), COMPANY_COLUMNS),
            RecordKind::Engagement => listing(self.store.engagements(), ENGAGEMENT_COLUMNS),
            RecordKind::Query => listing(self.store.queries(), Query::HEADERS),
        }
    }

    /// Follow-ups in `[today, today + days]`; `days` defaults from config.
    pub fn upcoming(&self, days: Option<u32>) -> Result<Upcoming> {
        let days = days.unwrap_or(self.config.analytics.upcoming_days);
        let start = self.today();
        let end = start
            .checked_add_signed(Duration::days(i64::from(days)))
            .ok_or(TrackerError::WindowOutOfRange(days))?;

        let mut warnings = Vec::new();
        let engagements = load_table(self.store.engagements(), &mut warnings)?;
        let actions = upcoming_actions(&engagements, start, end)
            .into_iter()
            .map(ActionRow::from)
            .collect();

        Ok(Upcoming {
            days,
            start,
            end,
            actions,
            warnings,
        })
    }

    pub fn analytics(&self) -> Result<AnalyticsReport> {
        let data = self.load()?;
        let mut report = AnalyticsReport::build(
            &data.companies,
            &data.engagements,
            &data.queries,
            self.config.analytics.top_n,
        );
        report.warnings = data.warnings;
        Ok(report)
    }

    /// Write the analytics figures using the configured renderers.
    pub fn render_figures(&self, report: &AnalyticsReport) -> anyhow::Result<FigureSummary> {
        let charts = &self.config.charts;
        let bars = SvgRenderer::new(charts.width, charts.height);
        let cloud: Box<dyn TagCloudRenderer> = if charts.tag_cloud {
            Box::new(SvgTagCloud::new(charts.width, charts.height))
        } else {
            Box::new(NoTagCloud)
        };

        render_figures(report, &self.config.figures_dir(), &bars, cloud.as_ref())
    }

    pub fn advice(&self) -> Result<(Advice, Vec<String>)> {
        let data = self.load()?;
        Ok((advise(&data.companies, &data.engagements), data.warnings))
    }
}

/// Columns shown when listing companies.
const COMPANY_COLUMNS: &[&str] = &[
    "Company Name",
    "Industry",
    "Technologies",
    "Contact Status",
    "Last Contact Date",
];

/// Columns shown when listing engagements.
const ENGAGEMENT_COLUMNS: &[&str] = &[
    "Contact Name",
    "Company",
    "Platform",
    "Engagement Type",
    "Date",
    "Status",
    "Next Action Date",
];

fn insert<R: Record>(table: &Table<R>, record: R, today: NaiveDate) -> Outcome {
    let label = record.label();
    match table.insert(record, today) {
        Ok(_) => {
            info!("Added {} {}", R::KIND, label);
            Outcome::success(format!("Added {} to tracking system", label))
        }
        Err(e) => failed(&format!("add {}", R::KIND), e),
    }
}

fn import_into<R: Record>(
    table: &Table<R>,
    path: &Path,
    today: NaiveDate,
) -> Result<crate::store::ImportSummary> {
    let file = File::open(path)?;
    table.import_json(BufReader::new(file), today)
}

fn failed(operation: &str, error: TrackerError) -> Outcome {
    warn!("Failed to {}: {}", operation, error);
    Outcome::failure(error.to_string())
}

fn load_table<R: Record>(table: &Table<R>, warnings: &mut Vec<String>) -> Result<Vec<R>> {
    let loaded = table.find_all()?;
    if let Some(warning) = loaded.warning(R::KIND.file_name()) {
        warn!("{}", warning);
        warnings.push(warning);
    }
    Ok(loaded.records)
}

fn listing<R: Record>(table: &Table<R>, columns: &[&'static str]) -> Result<Listing> {
    let mut warnings = Vec::new();
    let records = load_table(table, &mut warnings)?;

    let records: Vec<Value> = records
        .iter()
        .map(serde_json::to_value)
        .collect::<std::result::Result<_, _>>()?;

    let rows = records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|column| {
                    record
                        .get(*column)
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string()
                })
                .collect()
        })
        .collect();

    Ok(Listing {
        kind: R::KIND,
        columns: columns.to_vec(),
        rows,
        records,
        warnings,
    })
}

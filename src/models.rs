//! Data models for the outreach tracker.
//!
//! This module contains the fixed-shape record types persisted by the
//! store, the record-kind descriptor, and the outcome type reported at
//! the operation boundary.

use chrono::{NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::Tabled;

/// Funnel stages, in order. Counts are exact matches on `Status`.
pub const FUNNEL_STAGES: [&str; 5] = [
    "Initial Contact",
    "Response Received",
    "In Conversation",
    "Meeting Scheduled",
    "Interview Opportunity",
];

/// Contact statuses that count as progress with a company.
pub const SUCCESS_STATUSES: [&str; 3] =
    ["In Conversation", "Meeting Scheduled", "Interview Opportunity"];

/// Status written to an engagement when a response is recorded.
pub const RESPONSE_STATUS: &str = "Response Received";

/// Date format used for every date column.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The three kinds of records kept by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum RecordKind {
    /// Companies and their contacts
    Company,
    /// Outreach engagements with contacts
    Engagement,
    /// Job-board search queries
    Query,
}

impl RecordKind {
    /// Name of the backing file inside the data directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            RecordKind::Company => "company_contacts.csv",
            RecordKind::Engagement => "engagement_tracker.csv",
            RecordKind::Query => "search_queries.csv",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Company => write!(f, "company"),
            RecordKind::Engagement => write!(f, "engagement"),
            RecordKind::Query => write!(f, "search query"),
        }
    }
}

/// A fixed-shape row type with a canonical header.
pub trait Record: Serialize + DeserializeOwned + Clone + fmt::Debug {
    const KIND: RecordKind;
    const HEADERS: &'static [&'static str];

    /// Required columns paired with their current values.
    fn required_fields(&self) -> Vec<(&'static str, &str)>;

    /// Fill in defaulted columns and collapse blank optionals to `None`.
    fn apply_defaults(&mut self, today: NaiveDate);

    /// Short human-readable label used in messages.
    fn label(&self) -> String;

    /// Value that must be unique across the store, if the kind has one.
    fn unique_key(&self) -> Option<&str> {
        None
    }

    /// Names of required columns that are blank.
    fn missing_fields(&self) -> Vec<&'static str> {
        self.required_fields()
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
            .collect()
    }
}

/// A company being targeted, with up to three contacts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Company {
    #[serde(rename = "Company Name", default)]
    pub name: String,
    #[serde(rename = "Industry", default)]
    pub industry: String,
    #[serde(rename = "Company Size", default)]
    pub size: Option<String>,
    #[serde(rename = "Job Posting URL", default)]
    pub job_posting_url: Option<String>,
    /// Comma-separated tag list.
    #[serde(rename = "Technologies", default)]
    pub technologies: String,
    #[serde(rename = "Engineering Manager Name", default)]
    pub engineering_manager_name: Option<String>,
    #[serde(rename = "Engineering Manager LinkedIn", default)]
    pub engineering_manager_linkedin: Option<String>,
    #[serde(rename = "Recruiter Name", default)]
    pub recruiter_name: Option<String>,
    #[serde(rename = "Recruiter LinkedIn", default)]
    pub recruiter_linkedin: Option<String>,
    #[serde(rename = "Team Lead Name", default)]
    pub team_lead_name: Option<String>,
    #[serde(rename = "Team Lead LinkedIn", default)]
    pub team_lead_linkedin: Option<String>,
    #[serde(rename = "Mutual Connections", default)]
    pub mutual_connections: Option<String>,
    #[serde(rename = "Contact Status", default)]
    pub contact_status: Option<String>,
    #[serde(rename = "Last Contact Date", default)]
    pub last_contact_date: Option<String>,
    #[serde(rename = "Notes", default)]
    pub notes: Option<String>,
}

impl Company {
    /// Whether the contact status counts as progress.
    pub fn is_success(&self) -> bool {
        let status = text(&self.contact_status);
        SUCCESS_STATUSES.contains(&status)
    }
}

impl Record for Company {
    const KIND: RecordKind = RecordKind::Company;
    const HEADERS: &'static [&'static str] = &[
        "Company Name",
        "Industry",
        "Company Size",
        "Job Posting URL",
        "Technologies",
        "Engineering Manager Name",
        "Engineering Manager LinkedIn",
        "Recruiter Name",
        "Recruiter LinkedIn",
        "Team Lead Name",
        "Team Lead LinkedIn",
        "Mutual Connections",
        "Contact Status",
        "Last Contact Date",
        "Notes",
    ];

    fn required_fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("Company Name", self.name.as_str()),
            ("Industry", self.industry.as_str()),
            ("Technologies", self.technologies.as_str()),
        ]
    }

    fn apply_defaults(&mut self, today: NaiveDate) {
        for field in [
            &mut self.size,
            &mut self.job_posting_url,
            &mut self.engineering_manager_name,
            &mut self.engineering_manager_linkedin,
            &mut self.recruiter_name,
            &mut self.recruiter_linkedin,
            &mut self.team_lead_name,
            &mut self.team_lead_linkedin,
            &mut self.mutual_connections,
            &mut self.contact_status,
            &mut self.last_contact_date,
            &mut self.notes,
        ] {
            blank_to_none(field);
        }
        default_date(&mut self.last_contact_date, today);
    }

    fn label(&self) -> String {
        self.name.clone()
    }

    fn unique_key(&self) -> Option<&str> {
        Some(&self.name)
    }
}

/// One outreach touchpoint with a contact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Engagement {
    #[serde(rename = "Contact Name", default)]
    pub contact_name: String,
    #[serde(rename = "Company", default)]
    pub company: String,
    #[serde(rename = "Position", default)]
    pub position: Option<String>,
    #[serde(rename = "Platform", default)]
    pub platform: String,
    #[serde(rename = "Engagement Type", default)]
    pub engagement_type: String,
    #[serde(rename = "Date", default)]
    pub date: Option<String>,
    #[serde(rename = "Content Sent", default)]
    pub content_sent: Option<String>,
    #[serde(rename = "Response Received", default)]
    pub response_received: Option<String>,
    #[serde(rename = "Response Time (hours)", default)]
    pub response_time_hours: Option<String>,
    #[serde(rename = "Next Action", default)]
    pub next_action: Option<String>,
    #[serde(rename = "Next Action Date", default)]
    pub next_action_date: Option<String>,
    #[serde(rename = "Status", default)]
    pub status: Option<String>,
    #[serde(rename = "Notes", default)]
    pub notes: Option<String>,
}

impl Engagement {
    pub fn has_response(&self) -> bool {
        !text(&self.response_received).trim().is_empty()
    }

    /// Response time in hours, if recorded and numeric.
    pub fn response_time(&self) -> Option<f64> {
        parse_number(text(&self.response_time_hours))
    }

    pub fn next_action_on(&self) -> Option<NaiveDate> {
        parse_date(text(&self.next_action_date))
    }

    pub fn status(&self) -> &str {
        text(&self.status)
    }
}

impl Record for Engagement {
    const KIND: RecordKind = RecordKind::Engagement;
    const HEADERS: &'static [&'static str] = &[
        "Contact Name",
        "Company",
        "Position",
        "Platform",
        "Engagement Type",
        "Date",
        "Content Sent",
        "Response Received",
        "Response Time (hours)",
        "Next Action",
        "Next Action Date",
        "Status",
        "Notes",
    ];

    fn required_fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("Contact Name", self.contact_name.as_str()),
            ("Company", self.company.as_str()),
            ("Platform", self.platform.as_str()),
            ("Engagement Type", self.engagement_type.as_str()),
        ]
    }

    fn apply_defaults(&mut self, today: NaiveDate) {
        for field in [
            &mut self.position,
            &mut self.date,
            &mut self.content_sent,
            &mut self.response_received,
            &mut self.response_time_hours,
            &mut self.next_action,
            &mut self.next_action_date,
            &mut self.status,
            &mut self.notes,
        ] {
            blank_to_none(field);
        }
        default_date(&mut self.date, today);
    }

    fn label(&self) -> String {
        format!("{} at {}", self.contact_name, self.company)
    }
}

/// A saved job-board search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Query {
    #[serde(rename = "Platform", default)]
    pub platform: String,
    #[serde(rename = "Query", default)]
    pub query: String,
    #[serde(rename = "Date Added", default)]
    pub date_added: Option<String>,
    #[serde(rename = "Results Count", default)]
    pub results_count: Option<String>,
    #[serde(rename = "Effectiveness Rating", default)]
    pub effectiveness_rating: Option<String>,
}

impl Query {
    pub fn rating(&self) -> Option<f64> {
        parse_number(text(&self.effectiveness_rating))
    }
}

impl Record for Query {
    const KIND: RecordKind = RecordKind::Query;
    const HEADERS: &'static [&'static str] = &[
        "Platform",
        "Query",
        "Date Added",
        "Results Count",
        "Effectiveness Rating",
    ];

    fn required_fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("Platform", self.platform.as_str()),
            ("Query", self.query.as_str()),
        ]
    }

    fn apply_defaults(&mut self, today: NaiveDate) {
        for field in [
            &mut self.date_added,
            &mut self.results_count,
            &mut self.effectiveness_rating,
        ] {
            blank_to_none(field);
        }
        default_date(&mut self.date_added, today);
    }

    fn label(&self) -> String {
        format!("{} query on {}", self.query, self.platform)
    }
}

/// Result of one tracker operation, reported rather than raised.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    pub success: bool,
    pub message: String,
    /// Non-fatal problems noticed along the way (e.g. skipped rows).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Outcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            warnings: Vec::new(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            warnings: Vec::new(),
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }
}

/// Console row for an upcoming action.
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct ActionRow {
    #[tabled(rename = "Date")]
    pub date: String,
    #[tabled(rename = "Contact")]
    pub contact: String,
    #[tabled(rename = "Company")]
    pub company: String,
    #[tabled(rename = "Action")]
    pub action: String,
}

impl From<(&Engagement, NaiveDate)> for ActionRow {
    fn from((engagement, date): (&Engagement, NaiveDate)) -> Self {
        Self {
            date: format_date(date),
            contact: engagement.contact_name.clone(),
            company: engagement.company.clone(),
            action: text(&engagement.next_action).to_string(),
        }
    }
}

/// Format a date the way the store writes it.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Borrow an optional column as `&str`, empty when absent.
pub fn text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

/// Parse a date column. Accepts ISO dates, ISO date-times and US dates.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, DATE_FORMAT) {
        return Some(date);
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Some(datetime.date());
        }
    }

    NaiveDate::parse_from_str(value, "%m/%d/%Y").ok()
}

/// Parse a numeric column, ignoring non-finite values.
pub fn parse_number(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

fn blank_to_none(field: &mut Option<String>) {
    if field.as_deref().is_some_and(|v| v.trim().is_empty()) {
        *field = None;
    }
}

fn default_date(field: &mut Option<String>, today: NaiveDate) {
    if field.is_none() {
        *field = Some(format_date(today));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_headers_match_kind() {
        assert_eq!(Company::HEADERS.len(), 15);
        assert_eq!(Engagement::HEADERS.len(), 13);
        assert_eq!(Query::HEADERS.len(), 5);
        assert_eq!(Engagement::HEADERS[8], "Response Time (hours)");
    }

    #[test]
    fn test_missing_fields() {
        let company = Company {
            name: "Acme".to_string(),
            industry: "  ".to_string(),
            ..Default::default()
        };
        assert_eq!(company.missing_fields(), vec!["Industry", "Technologies"]);
    }

    #[test]
    fn test_apply_defaults() {
        let mut engagement = Engagement {
            notes: Some("   ".to_string()),
            ..Default::default()
        };
        engagement.apply_defaults(day(2024, 3, 9));
        assert_eq!(engagement.date.as_deref(), Some("2024-03-09"));
        assert_eq!(engagement.notes, None);

        let mut query = Query {
            date_added: Some("2024-01-01".to_string()),
            ..Default::default()
        };
        query.apply_defaults(day(2024, 3, 9));
        assert_eq!(query.date_added.as_deref(), Some("2024-01-01"));
    }

    #[test]
    fn test_parse_date_forms() {
        assert_eq!(parse_date("2024-05-01"), Some(day(2024, 5, 1)));
        assert_eq!(parse_date("2024-05-01 13:00:00"), Some(day(2024, 5, 1)));
        assert_eq!(parse_date("2024-05-01T13:00:00"), Some(day(2024, 5, 1)));
        assert_eq!(parse_date("05/01/2024"), Some(day(2024, 5, 1)));
        assert_eq!(parse_date("next week"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_engagement_accessors() {
        let engagement = Engagement {
            response_received: Some("Thanks!".to_string()),
            response_time_hours: Some(" 12.5 ".to_string()),
            ..Default::default()
        };
        assert!(engagement.has_response());
        assert_eq!(engagement.response_time(), Some(12.5));

        let silent = Engagement {
            response_time_hours: Some("soon".to_string()),
            ..Default::default()
        };
        assert!(!silent.has_response());
        assert_eq!(silent.response_time(), None);
    }

    #[test]
    fn test_company_success() {
        let company = Company {
            contact_status: Some("Meeting Scheduled".to_string()),
            ..Default::default()
        };
        assert!(company.is_success());

        let company = Company {
            contact_status: Some("Initial Research".to_string()),
            ..Default::default()
        };
        assert!(!company.is_success());
    }

    #[test]
    fn test_json_rejects_unknown_fields() {
        let json = r#"{"Company Name": "Acme", "Favorite Color": "blue"}"#;
        assert!(serde_json::from_str::<Company>(json).is_err());

        let json = r#"{"Company Name": "Acme", "Industry": "Software"}"#;
        let company: Company = serde_json::from_str(json).unwrap();
        assert_eq!(company.name, "Acme");
        assert_eq!(company.technologies, "");
    }
}

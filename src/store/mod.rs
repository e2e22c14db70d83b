//! Flat-file storage for companies, engagements and search queries.
//!
//! Each record kind lives in its own CSV file inside the data directory.
//! The store owns the three tables and exposes the kind-specific update
//! operations on top of the generic [`Table`] primitives.

mod table;

pub use table::{ImportSummary, Pick, Table};

use crate::error::Result;
use crate::models::{format_date, Company, Engagement, Query, RESPONSE_STATUS};
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// The three tables rooted at one data directory.
#[derive(Debug)]
pub struct Store {
    data_dir: PathBuf,
    companies: Table<Company>,
    engagements: Table<Engagement>,
    queries: Table<Query>,
}

impl Store {
    /// Open the store, creating the directory and any missing files.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        if !data_dir.exists() {
            fs::create_dir_all(&data_dir)?;
            info!("Created data directory: {}", data_dir.display());
        }

        let store = Self {
            companies: Table::new(&data_dir),
            engagements: Table::new(&data_dir),
            queries: Table::new(&data_dir),
            data_dir,
        };

        store.companies.initialize()?;
        store.engagements.initialize()?;
        store.queries.initialize()?;

        Ok(store)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn companies(&self) -> &Table<Company> {
        &self.companies
    }

    pub fn engagements(&self) -> &Table<Engagement> {
        &self.engagements
    }

    pub fn queries(&self) -> &Table<Query> {
        &self.queries
    }

    /// Set a company's contact status and stamp today's date.
    ///
    /// Notes are replaced only when new notes are given.
    pub fn update_company_status(
        &self,
        name: &str,
        status: &str,
        notes: Option<&str>,
        today: NaiveDate,
    ) -> Result<Company> {
        self.companies.update_one(
            Pick::First,
            &format!("Company {}", name),
            |c| c.name == name,
            |c| {
                c.contact_status = Some(status.to_string());
                c.last_contact_date = Some(format_date(today));
                if let Some(notes) = notes.filter(|n| !n.is_empty()) {
                    c.notes = Some(notes.to_string());
                }
            },
        )
    }

    /// Record a response on the most recent engagement with a contact.
    pub fn update_engagement_response(
        &self,
        contact_name: &str,
        company: &str,
        response: &str,
        response_time_hours: Option<f64>,
    ) -> Result<Engagement> {
        self.engagements.update_one(
            Pick::Last,
            &format!("engagement with {} at {}", contact_name, company),
            |e| e.contact_name == contact_name && e.company == company,
            |e| {
                e.response_received = Some(response.to_string());
                if let Some(hours) = response_time_hours {
                    e.response_time_hours = Some(hours.to_string());
                }
                e.status = Some(RESPONSE_STATUS.to_string());
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrackerError;
    use crate::models::Record;
    use tempfile::TempDir;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn test_open_creates_all_files() {
        let dir = TempDir::new().unwrap();
        let data_dir = dir.path().join("data");
        let store = Store::open(&data_dir).unwrap();

        assert!(data_dir.join("company_contacts.csv").exists());
        assert!(data_dir.join("engagement_tracker.csv").exists());
        assert!(data_dir.join("search_queries.csv").exists());
        assert_eq!(store.data_dir(), data_dir.as_path());

        // Reopening keeps existing rows.
        store
            .queries()
            .insert(
                Query {
                    platform: "Indeed".to_string(),
                    query: "intern".to_string(),
                    ..Default::default()
                },
                day(1),
            )
            .unwrap();
        let store = Store::open(&data_dir).unwrap();
        assert_eq!(store.queries().find_all().unwrap().records.len(), 1);
    }

    #[test]
    fn test_update_company_status() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path()).unwrap();
        store
            .companies()
            .insert(
                Company {
                    name: "Acme".to_string(),
                    industry: "Software".to_string(),
                    technologies: "Rust".to_string(),
                    notes: Some("keep me".to_string()),
                    ..Default::default()
                },
                day(1),
            )
            .unwrap();

        let updated = store
            .update_company_status("Acme", "In Conversation", None, day(5))
            .unwrap();
        assert_eq!(updated.contact_status.as_deref(), Some("In Conversation"));
        assert_eq!(updated.last_contact_date.as_deref(), Some("2024-06-05"));
        assert_eq!(updated.notes.as_deref(), Some("keep me"));

        let updated = store
            .update_company_status("Acme", "Meeting Scheduled", Some("call Tue"), day(6))
            .unwrap();
        assert_eq!(updated.notes.as_deref(), Some("call Tue"));

        let err = store
            .update_company_status("Missing", "Closed", None, day(6))
            .unwrap_err();
        assert!(matches!(err, TrackerError::NotFound(_)));
    }

    #[test]
    fn test_update_engagement_response() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let engagement = Engagement {
            contact_name: "Jane".to_string(),
            company: "Acme".to_string(),
            platform: "Email".to_string(),
            engagement_type: "Cold Email".to_string(),
            status: Some("Initial Contact".to_string()),
            ..Default::default()
        };
        store.engagements().insert(engagement.clone(), day(1)).unwrap();
        store.engagements().insert(engagement, day(2)).unwrap();

        let updated = store
            .update_engagement_response("Jane", "Acme", "Happy to chat", Some(36.0))
            .unwrap();
        assert_eq!(updated.status(), "Response Received");
        assert_eq!(updated.response_time(), Some(36.0));
        assert_eq!(updated.date.as_deref(), Some("2024-06-02"));

        let records = store.engagements().find_all().unwrap().records;
        assert!(!records[0].has_response());
        assert!(records[1].has_response());

        let err = store
            .update_engagement_response("Jane", "Globex", "hi", None)
            .unwrap_err();
        assert!(err.to_string().contains("Jane at Globex"));
        assert_eq!(records[1].label(), "Jane at Acme");
    }
}

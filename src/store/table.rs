//! A single CSV-backed table of one record kind.
//!
//! Appends go straight to the end of the file. Updates load every row,
//! change one in memory, and atomically replace the whole file.

use crate::error::{Result, TrackerError};
use crate::models::Record;
use chrono::NaiveDate;
use serde_json::Value;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Rows read from a table, plus how many undecodable rows were skipped.
#[derive(Debug, Clone)]
pub struct Loaded<R> {
    pub records: Vec<R>,
    pub skipped: usize,
}

impl<R> Loaded<R> {
    /// Aggregate warning for skipped rows, if any.
    pub fn warning(&self, file: &str) -> Option<String> {
        (self.skipped > 0)
            .then(|| format!("Skipped {} unreadable row(s) in {}", self.skipped, file))
    }
}

/// Which match wins when several records satisfy an update predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pick {
    /// Earliest appended match.
    First,
    /// Most recently appended match.
    Last,
}

/// Summary of a bulk import.
#[derive(Debug, Clone, Default)]
pub struct ImportSummary {
    pub inserted: usize,
    /// Label of each rejected record with the reason.
    pub rejected: Vec<(String, String)>,
}

/// CSV file holding records of type `R`.
#[derive(Debug)]
pub struct Table<R: Record> {
    path: PathBuf,
    _record: PhantomData<R>,
}

impl<R: Record> Table<R> {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(R::KIND.file_name()),
            _record: PhantomData,
        }
    }

    #[cfg(test)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn file_name(&self) -> String {
        R::KIND.file_name().to_string()
    }

    /// Create the file with its header if it is missing or empty.
    ///
    /// Returns `true` when a header was written. Never truncates data.
    pub fn initialize(&self) -> Result<bool> {
        let file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                if fs::metadata(&self.path)?.len() > 0 {
                    return Ok(false);
                }
                OpenOptions::new().append(true).open(&self.path)?
            }
            Err(e) => return Err(e.into()),
        };

        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(R::HEADERS)?;
        writer.flush()?;

        info!("Initialized {}", self.path.display());
        Ok(true)
    }

    /// Read every record in insertion order.
    ///
    /// Fails if the file cannot be read or its header is not the canonical
    /// one. Rows that fail to decode are skipped and counted.
    pub fn find_all(&self) -> Result<Loaded<R>> {
        let file = File::open(&self.path)?;
        self.read_from(file)
    }

    fn read_from<T: Read>(&self, source: T) -> Result<Loaded<R>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(source);

        let headers = reader.headers()?.clone();
        if !headers.iter().eq(R::HEADERS.iter().copied()) {
            return Err(TrackerError::Header {
                file: self.file_name(),
                expected: R::HEADERS.join(", "),
                found: headers.iter().collect::<Vec<_>>().join(", "),
            });
        }

        let mut records = Vec::new();
        let mut skipped = 0;

        for row in reader.deserialize::<R>() {
            match row {
                Ok(record) => records.push(record),
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    warn!("Skipping unreadable row in {}: {}", self.file_name(), e);
                    skipped += 1;
                }
            }
        }

        debug!(
            "Loaded {} {} record(s) from {}",
            records.len(),
            R::KIND,
            self.path.display()
        );

        Ok(Loaded { records, skipped })
    }

    /// Validate, default, check uniqueness and append one record.
    pub fn insert(&self, mut record: R, today: NaiveDate) -> Result<R> {
        let missing = record.missing_fields();
        if !missing.is_empty() {
            return Err(TrackerError::Validation(missing.join(", ")));
        }

        record.apply_defaults(today);

        if let Some(key) = record.unique_key() {
            let existing = self.find_all()?;
            if existing
                .records
                .iter()
                .any(|other| other.unique_key() == Some(key))
            {
                return Err(TrackerError::Duplicate(record.label()));
            }
        }

        self.append(&record)?;
        Ok(record)
    }

    fn append(&self, record: &R) -> Result<()> {
        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;

        debug!("Appended {} to {}", record.label(), self.path.display());
        Ok(())
    }

    /// Load, locate one record, mutate it, and atomically rewrite the file.
    ///
    /// `target` describes what was searched for and is used in the
    /// not-found error.
    pub fn update_one<P, M>(&self, pick: Pick, target: &str, predicate: P, mutate: M) -> Result<R>
    where
        P: Fn(&R) -> bool,
        M: FnOnce(&mut R),
    {
        let loaded = self.find_all()?;
        if loaded.skipped > 0 {
            return Err(TrackerError::UnsafeRewrite {
                file: self.file_name(),
                skipped: loaded.skipped,
            });
        }

        let mut records = loaded.records;
        let index = match pick {
            Pick::First => records.iter().position(|r| predicate(r)),
            Pick::Last => records.iter().rposition(|r| predicate(r)),
        }
        .ok_or_else(|| TrackerError::NotFound(target.to_string()))?;

        mutate(&mut records[index]);
        let updated = records[index].clone();

        self.replace_all(&records)?;
        Ok(updated)
    }

    /// Write all records to a temp file beside the table, then rename it
    /// over the table.
    fn replace_all(&self, records: &[R]) -> Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut temp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(temp.as_file_mut());
            writer.write_record(R::HEADERS)?;
            for record in records {
                writer.serialize(record)?;
            }
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| e.error)?;

        debug!(
            "Rewrote {} with {} record(s)",
            self.path.display(),
            records.len()
        );
        Ok(())
    }

    /// Insert every record from a JSON array, keeping going past rejects.
    ///
    /// Unknown keys anywhere in the document fail the whole import before
    /// anything is written.
    pub fn import_json<T: Read>(&self, source: T, today: NaiveDate) -> Result<ImportSummary> {
        let raw: Vec<Value> = serde_json::from_reader(source)?;
        let incoming = raw
            .into_iter()
            .map(|value| serde_json::from_value::<R>(numbers_as_text(value)))
            .collect::<std::result::Result<Vec<R>, _>>()?;
        let mut summary = ImportSummary::default();

        for record in incoming {
            let label = record.label();
            match self.insert(record, today) {
                Ok(_) => summary.inserted += 1,
                Err(e @ (TrackerError::Validation(_) | TrackerError::Duplicate(_))) => {
                    warn!("Rejected {}: {}", label, e);
                    summary.rejected.push((label, e.to_string()));
                }
                Err(e) => return Err(e),
            }
        }

        Ok(summary)
    }
}

/// Columns are stored as text, so JSON numbers are taken as their literal
/// text (`12`, `4.5`).
fn numbers_as_text(value: Value) -> Value {
    match value {
        Value::Object(fields) => Value::Object(
            fields
                .into_iter()
                .map(|(key, field)| match field {
                    Value::Number(n) => (key, Value::String(n.to_string())),
                    other => (key, other),
                })
                .collect(),
        ),
        other => other,
    }
}

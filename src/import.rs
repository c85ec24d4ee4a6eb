//! Daily Log CSV Import
//!
//! Reads a history of daily log rows from CSV. Columns are mapped by header:
//!
//! - `date`: required, one row per day
//! - `phone_minutes`: phone use for the day
//! - `positive_score`, `vice_penalty`, `base_score`, `streak`, `final_score`:
//!   scores stored the last time the day was scored (empty = never scored)
//! - anything else: a habit entry keyed by the header, numeric values as
//!   numbers and other text as dropdown labels
//!
//! Bad lines are collected as errors and skipped; they never abort the import.

use chrono::NaiveDate;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

use crate::engine::{DailyLogRow, EntryValue};

const MAX_REPORTED_ERRORS: usize = 100;

/// Errors that abort an import
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing required column: {0}")]
    MissingColumn(String),
}

pub type ImportResult<T> = Result<T, ImportError>;

/// Result of a daily log import
#[derive(Debug)]
pub struct DailyLogImport {
    /// Imported rows in date order
    pub rows: Vec<DailyLogRow>,
    pub rows_processed: usize,
    pub rows_failed: usize,
    pub errors: Vec<String>,
}

/// Where a CSV column goes in a `DailyLogRow`
#[derive(Debug, Clone, PartialEq)]
enum Column {
    Date,
    PhoneMinutes,
    PositiveScore,
    VicePenalty,
    BaseScore,
    Streak,
    FinalScore,
    Habit(String),
}

impl Column {
    fn from_header(header: &str) -> Self {
        match header.trim().to_lowercase().as_str() {
            "date" => Column::Date,
            "phone_minutes" => Column::PhoneMinutes,
            "positive_score" => Column::PositiveScore,
            "vice_penalty" => Column::VicePenalty,
            "base_score" => Column::BaseScore,
            "streak" => Column::Streak,
            "final_score" => Column::FinalScore,
            _ => Column::Habit(header.trim().to_string()),
        }
    }
}

/// CSV importer for daily log history
#[derive(Debug, Clone)]
pub struct DailyLogImporter {
    /// Format string for parsing the date column
    date_format: String,
}

impl Default for DailyLogImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl DailyLogImporter {
    /// Create a new importer expecting ISO dates
    pub fn new() -> Self {
        Self {
            date_format: "%Y-%m-%d".to_string(),
        }
    }

    /// Set the date format string
    pub fn with_date_format(mut self, format: &str) -> Self {
        self.date_format = format.to_string();
        self
    }

    /// Import from a CSV file
    pub fn import(&self, path: &Path) -> ImportResult<DailyLogImport> {
        let file = std::fs::File::open(path)?;
        let result = self.import_reader(file)?;

        tracing::info!(
            path = ?path,
            rows = result.rows.len(),
            failed = result.rows_failed,
            "Imported daily log"
        );

        Ok(result)
    }

    /// Import from a CSV string
    pub fn import_str(&self, csv_data: &str) -> ImportResult<DailyLogImport> {
        self.import_reader(csv_data.as_bytes())
    }

    fn import_reader<R: Read>(&self, source: R) -> ImportResult<DailyLogImport> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(source);

        let columns: Vec<Column> = reader.headers()?.iter().map(Column::from_header).collect();
        if !columns.contains(&Column::Date) {
            return Err(ImportError::MissingColumn("date".to_string()));
        }

        let mut rows = Vec::new();
        let mut seen = HashSet::new();
        let mut rows_failed = 0;
        let mut errors = Vec::new();

        for (line_num, result) in reader.records().enumerate() {
            let actual_line = line_num + 2;

            let parsed = result
                .map_err(|e| e.to_string())
                .and_then(|record| self.parse_record(&columns, &record));

            match parsed {
                Ok(row) if !seen.insert(row.date) => {
                    errors.push(format!("Line {}: duplicate date {}", actual_line, row.date));
                    rows_failed += 1;
                }
                Ok(row) => rows.push(row),
                Err(e) => {
                    errors.push(format!("Line {}: {}", actual_line, e));
                    rows_failed += 1;
                }
            }
        }

        if errors.len() > MAX_REPORTED_ERRORS {
            let total = errors.len();
            errors.truncate(MAX_REPORTED_ERRORS);
            errors.push(format!("... and {} more errors", total - MAX_REPORTED_ERRORS));
        }

        rows.sort_by_key(|r: &DailyLogRow| r.date);

        tracing::debug!(rows = rows.len(), failed = rows_failed, "Parsed daily log CSV");

        Ok(DailyLogImport {
            rows_processed: rows.len(),
            rows,
            rows_failed,
            errors,
        })
    }

    fn parse_record(
        &self,
        columns: &[Column],
        record: &csv::StringRecord,
    ) -> Result<DailyLogRow, String> {
        let mut date = None;
        let mut row = DailyLogRow::new(NaiveDate::MIN);

        for (column, raw) in columns.iter().zip(record.iter()) {
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }

            match column {
                Column::Date => {
                    let parsed = NaiveDate::parse_from_str(raw, &self.date_format)
                        .map_err(|e| format!("invalid date '{}': {}", raw, e))?;
                    date = Some(parsed);
                }
                Column::PhoneMinutes => row.phone_minutes = parse_number("phone_minutes", raw)?,
                Column::PositiveScore => row.positive_score = Some(parse_number("positive_score", raw)?),
                Column::VicePenalty => row.vice_penalty = Some(parse_number("vice_penalty", raw)?),
                Column::BaseScore => row.base_score = Some(parse_number("base_score", raw)?),
                Column::Streak => {
                    let streak = raw
                        .parse::<u32>()
                        .map_err(|_| format!("streak must be a non-negative integer, got '{}'", raw))?;
                    row.streak = Some(streak);
                }
                Column::FinalScore => row.final_score = Some(parse_number("final_score", raw)?),
                Column::Habit(name) => {
                    let value = match raw.parse::<f64>() {
                        Ok(n) => EntryValue::Number(n),
                        Err(_) => EntryValue::Label(raw.to_string()),
                    };
                    row.entries.insert(name.clone(), value);
                }
            }
        }

        row.date = date.ok_or_else(|| "missing date".to_string())?;
        Ok(row)
    }
}

fn parse_number(field: &str, raw: &str) -> Result<f64, String> {
    raw.parse::<f64>()
        .map_err(|_| format!("{} must be a number, got '{}'", field, raw))
}

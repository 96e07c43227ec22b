//! CSV store import.
//!
//! Turns spreadsheet exports into [`StoreRecord`]s, drops rows that already
//! exist in storage, persists the rest and reports what happened. Column
//! names are matched through alias tables so most exports load without
//! reshaping.
//!
//! Rows are processed strictly in order: each duplicate check and insert
//! completes before the next row starts, so a row sees every insert made by
//! earlier rows of the same file.

mod csv;
mod headers;

use std::collections::HashSet;
use std::future::Future;

use serde::Serialize;
use thiserror::Error;

use crate::stores::{round_coordinate, StoreRecord};

use self::csv::{clean_cell, normalize_header, parse_leading_f64};
pub use self::csv::split_csv_line;
pub use self::headers::HeaderMap;

/// Number of row failures surfaced in an [`ImportSummary`].
pub const MAX_REPORTED_ERRORS: usize = 10;

const MIN_FIELDS_PER_ROW: usize = 3;
const UNKNOWN_SHOP: &str = "Unknown Shop";
const UNASSIGNED: &str = "Unassigned";

/// Persistence used by the importer.
///
/// Implementations back the `stores` table; tests use an in-memory vector.
pub trait StoreRepository {
    type Error: std::fmt::Display;

    /// Find a stored record whose name equals any of `names` (in either of
    /// the legacy name columns) at exactly these rounded coordinates.
    fn find_matching(
        &self,
        names: &[&str],
        latitude: f64,
        longitude: f64,
    ) -> impl Future<Output = Result<Option<StoreRecord>, Self::Error>> + Send;

    /// Persist a new record and return it as stored.
    fn create(
        &self,
        record: StoreRecord,
    ) -> impl Future<Output = Result<StoreRecord, Self::Error>> + Send;
}

/// Input rejected before any row is looked at.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImportError {
    #[error("validation error: {0}")]
    Validation(String),
}

/// Why a single row was not imported.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RowError {
    #[error("Invalid coordinates")]
    InvalidCoordinates,
    #[error("{0}")]
    Storage(String),
}

/// A row-level failure as reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowFailure {
    /// 1-based line number in the submitted text; the header is row 1.
    pub row: usize,
    #[serde(rename = "error")]
    pub reason: String,
}

/// Outcome of one import run.
///
/// `inserted + skipped == total_rows` and `error_count <= skipped` always
/// hold. `errors` carries at most [`MAX_REPORTED_ERRORS`] entries while
/// `error_count` is the full tally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub total_rows: usize,
    pub inserted: usize,
    pub skipped: usize,
    pub error_count: usize,
    pub errors: Vec<RowFailure>,
}

/// One data line after header mapping and field derivation.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    pub row: usize,
    pub outcome: Result<StoreRecord, RowError>,
}

/// A CSV document parsed into candidate records, without touching storage.
#[derive(Debug, Clone)]
pub struct ParsedImport {
    pub headers: Vec<String>,
    pub header_map: HeaderMap,
    /// Rows with at least three fields, in input order.
    pub rows: Vec<ParsedRow>,
}

impl ParsedImport {
    #[must_use]
    pub fn total_rows(&self) -> usize {
        self.rows.len()
    }

    /// Rows that produced a record (before any duplicate check).
    pub fn records(&self) -> impl Iterator<Item = &StoreRecord> {
        self.rows.iter().filter_map(|r| r.outcome.as_ref().ok())
    }

    #[must_use]
    pub fn invalid_rows(&self) -> usize {
        self.rows.iter().filter(|r| r.outcome.is_err()).count()
    }

    /// Records that repeat an earlier record of the same file.
    #[must_use]
    pub fn in_file_duplicates(&self) -> usize {
        let mut seen = HashSet::new();
        self.records().filter(|r| !seen.insert(r.key())).count()
    }
}

/// Cells of one line keyed by normalized header.
///
/// When a header repeats, the right-most column wins.
struct ImportRow<'a> {
    cells: Vec<(&'a str, String)>,
}

impl<'a> ImportRow<'a> {
    fn new(headers: &'a [String], values: &[String]) -> Self {
        let cells = headers
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                let value = values.get(idx).map(|v| clean_cell(v)).unwrap_or_default();
                (header.as_str(), value)
            })
            .collect();
        Self { cells }
    }

    fn get(&self, header: &str) -> Option<&str> {
        self.cells
            .iter()
            .rev()
            .find(|(h, _)| *h == header)
            .map(|(_, v)| v.as_str())
    }

    /// First non-empty value among the candidate headers.
    fn first_filled(&self, candidates: &[Option<&str>]) -> Option<&str> {
        candidates
            .iter()
            .flatten()
            .filter_map(|header| self.get(header))
            .find(|value| !value.is_empty())
    }
}

/// Parse CSV text into candidate records.
///
/// Blank lines are ignored but keep their place in row numbering. Lines
/// with fewer than three fields are dropped without being counted.
///
/// # Errors
///
/// Returns [`ImportError::Validation`] when the text is empty or lacks a
/// header plus at least one data line.
pub fn parse_csv(raw: &str) -> Result<ParsedImport, ImportError> {
    if raw.trim().is_empty() {
        return Err(ImportError::Validation("no CSV data provided".to_owned()));
    }

    let mut lines = raw
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| (idx + 1, line));

    let Some((_, header_line)) = lines.next() else {
        return Err(ImportError::Validation("no CSV data provided".to_owned()));
    };
    let data_lines: Vec<(usize, &str)> = lines.collect();
    if data_lines.is_empty() {
        return Err(ImportError::Validation(
            "CSV must contain a header row and at least one data row".to_owned(),
        ));
    }

    let headers: Vec<String> = split_csv_line(header_line)
        .iter()
        .map(|h| normalize_header(h))
        .collect();
    let header_map = HeaderMap::resolve(&headers);
    tracing::debug!(?headers, ?header_map, "resolved CSV headers");

    let mut rows = Vec::with_capacity(data_lines.len());
    for (row, line) in data_lines {
        let values = split_csv_line(line);
        if values.len() < MIN_FIELDS_PER_ROW {
            tracing::trace!(row, fields = values.len(), "dropping short CSV line");
            continue;
        }
        let cells = ImportRow::new(&headers, &values);
        rows.push(ParsedRow {
            row,
            outcome: derive_record(&cells, &header_map),
        });
    }

    Ok(ParsedImport {
        headers,
        header_map,
        rows,
    })
}

fn derive_record(cells: &ImportRow<'_>, map: &HeaderMap) -> Result<StoreRecord, RowError> {
    let display_name = cells
        .first_filled(&[map.shop.as_deref(), Some("shop"), Some("store_name")])
        .unwrap_or(UNKNOWN_SHOP);
    let latitude = coordinate(cells.first_filled(&[map.latitude.as_deref(), Some("latitude")]))?;
    let longitude =
        coordinate(cells.first_filled(&[map.longitude.as_deref(), Some("longitude")]))?;
    let salesman_name = cells
        .first_filled(&[map.salesman.as_deref(), Some("salesman")])
        .unwrap_or(UNASSIGNED);
    let beat_name = cells
        .first_filled(&[map.beat.as_deref(), Some("beat")])
        .unwrap_or(UNASSIGNED);

    Ok(StoreRecord {
        display_name: display_name.to_owned(),
        latitude,
        longitude,
        salesman_name: salesman_name.to_owned(),
        beat_name: beat_name.to_owned(),
    })
}

/// A missing coordinate cell counts as 0; a present but unparseable one is
/// an error.
fn coordinate(cell: Option<&str>) -> Result<f64, RowError> {
    match cell {
        None => Ok(0.0),
        Some(raw) => parse_leading_f64(raw).ok_or(RowError::InvalidCoordinates),
    }
}

enum RowOutcome {
    Inserted(StoreRecord),
    Duplicate,
}

/// Import CSV text into `repo`.
///
/// Each row is validated, checked against existing records on name plus
/// coordinates rounded to six decimals, and inserted when new. Row failures
/// (bad coordinates, storage faults) are recorded in the summary and never
/// stop the run.
///
/// # Errors
///
/// Returns [`ImportError::Validation`] only for empty or header-only input.
pub async fn import_csv<R>(repo: &R, raw: &str) -> Result<ImportSummary, ImportError>
where
    R: StoreRepository,
{
    let parsed = parse_csv(raw)?;

    let mut summary = ImportSummary {
        total_rows: parsed.total_rows(),
        ..ImportSummary::default()
    };
    let mut failures = Vec::new();

    for ParsedRow { row, outcome } in parsed.rows {
        let result = match outcome {
            Ok(record) => store_row(repo, record).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(RowOutcome::Inserted(stored)) => {
                tracing::trace!(row, name = %stored.display_name, "inserted store");
                summary.inserted += 1;
            }
            Ok(RowOutcome::Duplicate) => {
                tracing::debug!(row, "skipping duplicate store");
                summary.skipped += 1;
            }
            Err(e) => {
                if matches!(e, RowError::Storage(_)) {
                    tracing::warn!(row, error = %e, "store import row failed");
                }
                summary.skipped += 1;
                failures.push(RowFailure {
                    row,
                    reason: e.to_string(),
                });
            }
        }
    }

    summary.error_count = failures.len();
    failures.truncate(MAX_REPORTED_ERRORS);
    summary.errors = failures;

    tracing::info!(
        total = summary.total_rows,
        inserted = summary.inserted,
        skipped = summary.skipped,
        errors = summary.error_count,
        "CSV store import finished"
    );

    Ok(summary)
}

/// Look up then insert one record.
///
/// Coordinates are rounded here, once, and the same values are used for the
/// lookup and the insert so storage never applies a second rounding rule.
async fn store_row<R>(repo: &R, mut record: StoreRecord) -> Result<RowOutcome, RowError>
where
    R: StoreRepository,
{
    record.latitude = round_coordinate(record.latitude);
    record.longitude = round_coordinate(record.longitude);

    let existing = repo
        .find_matching(
            &[record.display_name.as_str()],
            record.latitude,
            record.longitude,
        )
        .await
        .map_err(|e| RowError::Storage(e.to_string()))?;

    if existing.is_some() {
        return Ok(RowOutcome::Duplicate);
    }

    let stored = repo
        .create(record)
        .await
        .map_err(|e| RowError::Storage(e.to_string()))?;
    Ok(RowOutcome::Inserted(stored))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[path = "import_test.rs"]
mod tests;

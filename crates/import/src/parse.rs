// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! CSV row intake.
//!
//! This boundary reads raw CSV text into records and hands each record to a
//! caller-supplied mapper; which column feeds which field is entirely the
//! mapper's concern. A row that fails to parse or map never aborts its
//! siblings - it carries its error so the per-row report stays complete.

use benchstock::ErrorEntry;
use benchstock_domain::DomainError;
use csv::StringRecord;
use thiserror::Error;

/// CSV intake failures that concern the whole stream, not one row.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CsvReadError {
    /// The header row could not be read.
    #[error("Failed to read CSV headers: {0}")]
    InvalidHeaders(String),
}

/// Maps one CSV record to a typed row.
///
/// Implementations own the column-to-field mapping, including header
/// normalization and type conversion. They are supplied by the caller;
/// the intake boundary never interprets columns itself.
pub trait RowMapper {
    /// The row type this mapper produces.
    type Row;

    /// Maps one CSV record to a row.
    ///
    /// # Arguments
    ///
    /// * `headers` - The stream's header record
    /// * `record` - The data record to map
    /// * `row_number` - The 1-based data row number, for error reporting
    ///
    /// # Errors
    ///
    /// Returns a `DomainError` describing why the record cannot become a
    /// row.
    fn map_row(
        &self,
        headers: &StringRecord,
        record: &StringRecord,
        row_number: usize,
    ) -> Result<Self::Row, DomainError>;
}

/// Reads a CSV stream into rows via the supplied mapper.
///
/// # Arguments
///
/// * `csv_content` - The raw CSV content, including a header row
/// * `mapper` - The caller-supplied column mapper
///
/// # Returns
///
/// One entry per data row, in stream order: the mapped row, or the error
/// recorded for it.
///
/// # Errors
///
/// Returns `CsvReadError` only when the header row itself is unreadable;
/// per-row failures are carried in the returned entries.
pub fn read_rows<M: RowMapper>(
    csv_content: &str,
    mapper: &M,
) -> Result<Vec<Result<M::Row, ErrorEntry>>, CsvReadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(csv_content.as_bytes());

    let headers: StringRecord = reader
        .headers()
        .map_err(|e| CsvReadError::InvalidHeaders(e.to_string()))?
        .clone();

    let mut rows: Vec<Result<M::Row, ErrorEntry>> = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let row_number: usize = idx + 1;

        let record: StringRecord = match result {
            Ok(record) => record,
            Err(e) => {
                rows.push(Err(ErrorEntry {
                    code: benchstock::ErrorCode::Validation,
                    message: format!("CSV parse error in row {row_number}: {e}"),
                    field_errors: Vec::new(),
                }));
                continue;
            }
        };

        match mapper.map_row(&headers, &record, row_number) {
            Ok(row) => rows.push(Ok(row)),
            Err(domain_error) => {
                rows.push(Err(ErrorEntry::from_domain_error(&domain_error)));
            }
        }
    }

    Ok(rows)
}

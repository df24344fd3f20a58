//! Spreadsheet upload parsing and validation
//!
//! Uploads are all-or-nothing: the whole file is parsed and validated before
//! anything is inserted, and any malformed row rejects the entire batch with
//! an error naming the offending row.

use crate::error::{PowercastError, Result};
use crate::records::{ConsumptionRecord, InMemoryRecordStore, DEFAULT_CATEGORY};
use chrono::NaiveDate;
use std::io::Read;

/// Parse an uploaded consumption spreadsheet (CSV export) into records for
/// one user.
///
/// Required columns: `date`, `device`, `consumption`. An optional `category`
/// column defaults to "General" when absent or empty. Dates are ISO
/// (`YYYY-MM-DD`); consumption must be a finite, non-negative kWh value.
pub fn parse_consumption_csv<R: Read>(reader: R, user_id: i64) -> Result<Vec<ConsumptionRecord>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    };

    let (date_idx, device_idx, consumption_idx) =
        match (column("date"), column("device"), column("consumption")) {
            (Some(date), Some(device), Some(consumption)) => (date, device, consumption),
            (date, device, consumption) => {
                let mut missing = Vec::new();
                if date.is_none() {
                    missing.push("date");
                }
                if device.is_none() {
                    missing.push("device");
                }
                if consumption.is_none() {
                    missing.push("consumption");
                }
                return Err(PowercastError::Validation(format!(
                    "missing required columns: {} (required: date, device, consumption)",
                    missing.join(", ")
                )));
            }
        };
    let category_idx = column("category");

    let mut records = Vec::new();
    for (i, row) in csv_reader.records().enumerate() {
        // Header occupies line 1, so data rows start at 2.
        let line = i + 2;
        let row = row?;

        let date_cell = row.get(date_idx).unwrap_or("").trim();
        let date: NaiveDate = date_cell.parse().map_err(|_| {
            PowercastError::Validation(format!(
                "row {}: invalid date '{}', expected YYYY-MM-DD",
                line, date_cell
            ))
        })?;

        let device = row.get(device_idx).unwrap_or("").trim();
        if device.is_empty() {
            return Err(PowercastError::Validation(format!(
                "row {}: device name is empty",
                line
            )));
        }

        let consumption_cell = row.get(consumption_idx).unwrap_or("").trim();
        let consumption: f64 = consumption_cell.parse().map_err(|_| {
            PowercastError::Validation(format!(
                "row {}: invalid consumption '{}'",
                line, consumption_cell
            ))
        })?;
        if !consumption.is_finite() || consumption < 0.0 {
            return Err(PowercastError::Validation(format!(
                "row {}: consumption must be a non-negative kWh value, got {}",
                line, consumption
            )));
        }

        let category = category_idx
            .and_then(|idx| row.get(idx))
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CATEGORY);

        records.push(ConsumptionRecord::new(
            user_id,
            device,
            category,
            date,
            consumption,
        ));
    }

    Ok(records)
}

/// Validate and insert an uploaded spreadsheet in one step. On any
/// validation failure zero records are inserted.
pub fn upload_csv<R: Read>(
    store: &mut InMemoryRecordStore,
    reader: R,
    user_id: i64,
) -> Result<usize> {
    let batch = parse_consumption_csv(reader, user_id)?;
    Ok(store.insert_batch(batch))
}

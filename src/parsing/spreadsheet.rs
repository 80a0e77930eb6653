use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::core::dataset::Dataset;
use crate::core::value::{parse_date, Value};
use crate::parsing::{build_dataset, LoadError};
use crate::utils::validation::check_row_limit;

/// Workbook extensions handled by this loader
pub const EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "xlsb", "ods"];

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Load the first worksheet of a workbook.
///
/// The first row is the header; each later cell keeps its native type.
///
/// # Errors
///
/// Returns `LoadError::Spreadsheet` if the workbook cannot be opened or has
/// no sheets, `LoadError::Empty` for an empty first sheet, and the limit
/// errors of the shared dataset builder.
pub fn load_spreadsheet(path: &Path) -> Result<Dataset, LoadError> {
    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| LoadError::Spreadsheet(format!("Failed to open workbook: {e}")))?;

    let sheet_names = workbook.sheet_names();
    let Some(first) = sheet_names.first() else {
        return Err(LoadError::Spreadsheet("Workbook contains no sheets".to_string()));
    };

    let range = workbook
        .worksheet_range(first)
        .map_err(|e| LoadError::Spreadsheet(format!("Failed to read sheet '{first}': {e}")))?;

    let mut rows = range.rows();
    let header: Vec<String> = match rows.next() {
        Some(cells) => cells.iter().map(|c| cell_value(c).to_string()).collect(),
        None => return Err(LoadError::Empty),
    };

    let mut data: Vec<Vec<Value>> = Vec::new();
    for cells in rows {
        if let Some(msg) = check_row_limit(data.len()) {
            return Err(LoadError::TooLarge(msg));
        }
        let row: Vec<Value> = cells.iter().map(cell_value).collect();
        // Spreadsheet ranges include formatted but empty rows
        if row.iter().all(Value::is_null) {
            continue;
        }
        data.push(row);
    }

    build_dataset(&header, data)
}

/// Convert one calamine cell
fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty | Data::Error(_) => Value::Null,
        Data::String(s) => {
            if s.is_empty() {
                Value::Null
            } else {
                Value::Text(s.clone())
            }
        }
        Data::Float(n) => Value::number(*n),
        Data::Int(n) => Value::from(*n),
        Data::Bool(b) => Value::text(if *b { "TRUE" } else { "FALSE" }),
        Data::DateTime(dt) => {
            if dt.is_duration() {
                Value::number(dt.as_f64())
            } else {
                excel_serial_to_datetime(dt.as_f64()).map_or(Value::Null, Value::Date)
            }
        }
        Data::DateTimeIso(s) => parse_date(s).map_or_else(|| Value::text(s.as_str()), Value::Date),
        Data::DurationIso(s) => Value::text(s.as_str()),
    }
}

/// Convert an Excel serial date (1900 system) to a date-time
fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * MILLIS_PER_DAY).round();
    #[allow(clippy::cast_possible_truncation)]
    let millis = millis as i64;
    epoch.checked_add_signed(Duration::try_milliseconds(millis)?)
}

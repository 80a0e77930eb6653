use std::fs::File;
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;

use crate::core::dataset::Dataset;
use crate::core::value::{parse_number, Value};
use crate::parsing::{build_dataset, LoadError};
use crate::utils::validation::check_row_limit;

/// Cell texts read as null
pub const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Delimiters tried when sniffing, most specific first
const DELIMITER_CANDIDATES: &[u8] = &[b'\t', b';', b',', b'|'];

/// Lines inspected when sniffing the delimiter
const SNIFF_LINES: usize = 10;

/// Load a delimited text file.
///
/// With `delimiter` unset the delimiter is sniffed from the first lines.
///
/// # Errors
///
/// Returns `LoadError::Io` if the file cannot be read,
/// `LoadError::Encoding` for non-UTF-8 content, and the errors of
/// [`parse_delimited`].
pub fn load_delimited(path: &Path, delimiter: Option<u8>, gzip: bool) -> Result<Dataset, LoadError> {
    let file = File::open(path)?;
    let mut bytes = Vec::new();
    if gzip {
        GzDecoder::new(file).read_to_end(&mut bytes)?;
    } else {
        let mut file = file;
        file.read_to_end(&mut bytes)?;
    }

    let text = String::from_utf8(bytes).map_err(|e| LoadError::Encoding(e.to_string()))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

    let delimiter = delimiter.unwrap_or_else(|| sniff_delimiter(text));
    parse_delimited(text, delimiter)
}

/// Parse delimited text whose first record is the header.
///
/// # Errors
///
/// Returns `LoadError::Empty` without a header, `LoadError::Csv` for
/// malformed quoting, `LoadError::TooLarge` past the row or column limit,
/// and `LoadError::InvalidFormat` for rows longer than the header.
pub fn parse_delimited(text: &str, delimiter: u8) -> Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = reader.records();
    let header: Vec<String> = match records.next() {
        Some(record) => record?.iter().map(String::from).collect(),
        None => return Err(LoadError::Empty),
    };

    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for record in records {
        let record = record?;
        if let Some(msg) = check_row_limit(raw_rows.len()) {
            return Err(LoadError::TooLarge(msg));
        }
        raw_rows.push(record.iter().map(String::from).collect());
    }

    let width = header.len();
    let numeric: Vec<bool> = (0..width)
        .map(|col| {
            raw_rows
                .iter()
                .filter_map(|row| row.get(col))
                .filter(|cell| !is_na(cell))
                .all(|cell| parse_number(cell).is_some())
        })
        .collect();

    let rows: Vec<Vec<Value>> = raw_rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .enumerate()
                .map(|(col, cell)| typed_cell(cell, numeric.get(col).copied().unwrap_or(false)))
                .collect()
        })
        .collect();

    build_dataset(&header, rows)
}

fn is_na(cell: &str) -> bool {
    NA_TOKENS.contains(&cell)
}

fn typed_cell(cell: String, numeric: bool) -> Value {
    if is_na(&cell) {
        return Value::Null;
    }
    if numeric {
        if let Some(n) = parse_number(&cell) {
            return Value::number(n);
        }
    }
    Value::Text(cell)
}

/// Pick the delimiter that splits the first lines most consistently.
///
/// Each candidate must split the first line into more than one field; its
/// score is the number of lines with the same field count as the first line
/// times that count. Falls back to `,`.
#[must_use]
pub fn sniff_delimiter(content: &str) -> u8 {
    let sample_lines: Vec<&str> = content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(SNIFF_LINES)
        .collect();

    let mut best = b',';
    let mut best_score = 0usize;

    for &delimiter in DELIMITER_CANDIDATES {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delimiter)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(Result::ok)
                    .map_or(1, |r| r.len())
            })
            .collect();

        let target = counts.first().copied().unwrap_or(0);
        if target <= 1 {
            continue;
        }

        let consistent = counts.iter().filter(|&&c| c == target).count();
        let score = consistent * target;
        if score > best_score {
            best_score = score;
            best = delimiter;
        }
    }

    best
}

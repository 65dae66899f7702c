use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};

use crate::categorizer::{categorize_dataset, CategoryTable};
use crate::error::{FintrackError, Result};
use crate::models::{Dataset, Transaction};
use crate::settings::Settings;

pub const REQUIRED_COLUMNS: [&str; 4] = ["Date", "Amount", "Type", "Description"];

pub const NO_DATA_MESSAGE: &str =
    "Please upload a dataset or place `transactions_3months.xlsx` inside a `data/` folder.";

// ---------------------------------------------------------------------------
// Value parsing
// ---------------------------------------------------------------------------

/// Lenient amount parser. Returns `None` for anything that is not a number.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let s: String = raw
        .chars()
        .filter(|c| !matches!(c, ',' | '"' | '$' | '\u{20b9}' | '\u{20ac}' | '\u{a3}' | ' '))
        .collect();
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        return inner.parse::<f64>().ok().filter(|v| v.is_finite()).map(|v| -v);
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d %b %Y",
    "%d-%b-%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %B %Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Lenient date parser. Returns `None` when no known format matches.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Convert a spreadsheet serial day number to a date.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(chrono::Duration::days(serial.trunc() as i64))
}

/// "  debit " -> "Debit", "CREDIT card" -> "Credit Card"
pub fn title_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut start_of_word = true;
    for c in raw.trim().chars() {
        if c.is_alphabetic() {
            if start_of_word {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            start_of_word = false;
        } else {
            out.push(c);
            start_of_word = true;
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Raw cells
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl Cell {
    fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Cell::Number(n) => n.to_string(),
            Cell::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }

    fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => parse_date(s),
            Cell::Number(n) => excel_serial_to_date(*n),
            Cell::Date(d) => Some(*d),
        }
    }

    fn as_amount(&self) -> Option<f64> {
        match self {
            Cell::Empty | Cell::Date(_) => None,
            Cell::Text(s) => parse_amount(s),
            Cell::Number(n) => Some(*n).filter(|v| v.is_finite()),
        }
    }
}

struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

// ---------------------------------------------------------------------------
// Source kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SourceKind {
    Csv,
    Xlsx,
}

impl SourceKind {
    pub fn from_name(name: &str) -> Result<Self> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" | "xls" => Ok(Self::Xlsx),
            _ => Err(FintrackError::UnsupportedFormat(format!(
                "{name} (expected .csv or .xlsx)"
            ))),
        }
    }

    fn read(&self, bytes: &[u8]) -> Result<RawTable> {
        match self {
            Self::Csv => read_csv(bytes),
            Self::Xlsx => read_xlsx(bytes),
        }
    }
}

fn read_csv(bytes: &[u8]) -> Result<RawTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);
    let headers = rdr.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(
            record
                .iter()
                .map(|f| {
                    if f.is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(f.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok(RawTable { headers, rows })
}

#[cfg(feature = "xlsx")]
fn read_xlsx(bytes: &[u8]) -> Result<RawTable> {
    use calamine::{Data, Reader};

    let mut workbook = calamine::open_workbook_auto_from_rs(std::io::Cursor::new(bytes.to_vec()))?;
    let Some(first) = workbook.sheet_names().first().cloned() else {
        return Err(FintrackError::Other("Workbook has no sheets".to_string()));
    };
    let range = workbook.worksheet_range(&first)?;

    let mut iter = range.rows();
    let headers = match iter.next() {
        Some(row) => row.iter().map(|c| c.to_string()).collect(),
        None => Vec::new(),
    };
    let rows = iter
        .map(|row| {
            row.iter()
                .map(|c| match c {
                    Data::Empty => Cell::Empty,
                    Data::String(s) => Cell::Text(s.clone()),
                    Data::Float(f) => Cell::Number(*f),
                    Data::Int(i) => Cell::Number(*i as f64),
                    Data::Bool(b) => Cell::Text(b.to_string()),
                    Data::DateTime(dt) => match excel_serial_to_date(dt.as_f64()) {
                        Some(d) => Cell::Date(d),
                        None => Cell::Empty,
                    },
                    Data::DateTimeIso(s) => match parse_date(s) {
                        Some(d) => Cell::Date(d),
                        None => Cell::Text(s.clone()),
                    },
                    Data::DurationIso(s) => Cell::Text(s.clone()),
                    Data::Error(_) => Cell::Empty,
                })
                .collect()
        })
        .collect();
    Ok(RawTable { headers, rows })
}

#[cfg(not(feature = "xlsx"))]
fn read_xlsx(_bytes: &[u8]) -> Result<RawTable> {
    Err(FintrackError::UnsupportedFormat(
        "spreadsheet support is disabled (build with the `xlsx` feature)".to_string(),
    ))
}

// ---------------------------------------------------------------------------
// Dataset construction
// ---------------------------------------------------------------------------

/// Counts of values that could not be parsed and were left missing.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct LoadStats {
    pub rows: usize,
    pub bad_dates: usize,
    pub bad_amounts: usize,
}

fn canonical_header(raw: &str) -> String {
    let trimmed = raw.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
    REQUIRED_COLUMNS
        .iter()
        .chain(std::iter::once(&"Category"))
        .find(|req| req.eq_ignore_ascii_case(trimmed))
        .map(|req| req.to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

fn build_dataset(source: &str, table: RawTable) -> Result<(Dataset, LoadStats)> {
    let headers: Vec<String> = table.headers.iter().map(|h| canonical_header(h)).collect();

    let index_of = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| FintrackError::MissingColumn(name.to_string()))
    };
    let idx_date = index_of("Date")?;
    let idx_amount = index_of("Amount")?;
    let idx_type = index_of("Type")?;
    let idx_desc = index_of("Description")?;

    // Category is always re-derived, so a source Category column is dropped.
    let extra_cols: Vec<(usize, &String)> = headers
        .iter()
        .enumerate()
        .filter(|(i, h)| {
            ![idx_date, idx_amount, idx_type, idx_desc].contains(i)
                && h.as_str() != "Category"
                && !h.is_empty()
        })
        .collect();
    let columns: Vec<String> = headers
        .iter()
        .filter(|h| h.as_str() != "Category" && !h.is_empty())
        .cloned()
        .collect();

    let mut stats = LoadStats::default();
    let mut transactions = Vec::with_capacity(table.rows.len());
    let empty = Cell::Empty;
    for row in &table.rows {
        if row.iter().all(Cell::is_empty) {
            continue;
        }
        let cell = |i: usize| row.get(i).unwrap_or(&empty);

        let date = cell(idx_date).as_date();
        if date.is_none() && !cell(idx_date).is_empty() {
            stats.bad_dates += 1;
        }
        let amount = cell(idx_amount).as_amount();
        if amount.is_none() && !cell(idx_amount).is_empty() {
            stats.bad_amounts += 1;
        }
        let extra: BTreeMap<String, String> = extra_cols
            .iter()
            .map(|(i, h)| ((*h).clone(), cell(*i).as_text()))
            .collect();

        transactions.push(Transaction {
            date,
            amount,
            txn_type: title_case(&cell(idx_type).as_text()),
            description: cell(idx_desc).as_text(),
            category: String::new(),
            extra,
        });
    }
    stats.rows = transactions.len();

    if stats.bad_dates > 0 || stats.bad_amounts > 0 {
        tracing::warn!(
            source,
            bad_dates = stats.bad_dates,
            bad_amounts = stats.bad_amounts,
            "Unparseable values were left missing"
        );
    }
    tracing::info!(source, rows = stats.rows, "Loaded statement");

    Ok((
        Dataset {
            source: source.to_string(),
            columns,
            transactions,
        },
        stats,
    ))
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Parse an uploaded file. The name only selects the reader.
pub fn load_bytes(file_name: &str, bytes: &[u8]) -> Result<(Dataset, LoadStats)> {
    let kind = SourceKind::from_name(file_name)?;
    let table = kind.read(bytes)?;
    build_dataset(file_name, table)
}

pub fn load_path(path: &Path) -> Result<(Dataset, LoadStats)> {
    let name = path.to_string_lossy().to_string();
    let kind = SourceKind::from_name(&name)?;
    let bytes = std::fs::read(path)?;
    build_dataset(&name, kind.read(&bytes)?)
}

/// Pick the file to analyze: an explicit path, else the fallback spreadsheet.
pub fn resolve_source(explicit: Option<&Path>, settings: &Settings) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        return Err(FintrackError::NoData(format!(
            "File not found: {}",
            path.display()
        )));
    }
    let fallback = PathBuf::from(&settings.fallback_file);
    if fallback.exists() {
        tracing::debug!(path = %fallback.display(), "Using fallback dataset");
        return Ok(fallback);
    }
    Err(FintrackError::NoData(NO_DATA_MESSAGE.to_string()))
}

/// Resolve, load and categorize in one step.
pub fn load_categorized(
    explicit: Option<&Path>,
    settings: &Settings,
    table: &CategoryTable,
) -> Result<Dataset> {
    let path = resolve_source(explicit, settings)?;
    let (mut dataset, _) = load_path(&path)?;
    let result = categorize_dataset(&mut dataset, table);
    tracing::debug!(
        categorized = result.categorized,
        other = result.other,
        "Categorized transactions"
    );
    Ok(dataset)
}

use std::path::Path;

use crate::error::{FintrackError, Result};
use crate::loader::SourceKind;
use crate::models::Transaction;

pub const SHEET_NAME: &str = "FilteredData";
pub const DOWNLOAD_NAME: &str = "filtered_data.xlsx";
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Write the rows as CSV with the given header.
pub fn to_csv(columns: &[String], rows: &[&Transaction]) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(columns)?;
    for t in rows {
        wtr.write_record(columns.iter().map(|c| t.field(c)))?;
    }
    wtr.into_inner()
        .map_err(|e| FintrackError::Other(format!("Failed to finish CSV: {e}")))
}

/// Write the rows as a single-sheet workbook. Amounts are numeric cells,
/// dates are `YYYY-MM-DD` text, missing values are left blank.
#[cfg(feature = "xlsx")]
pub fn to_xlsx(columns: &[String], rows: &[&Transaction]) -> Result<Vec<u8>> {
    use rust_xlsxwriter::{Format, Workbook};

    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, name) in columns.iter().enumerate() {
        sheet.write_string_with_format(0, column_index(col)?, name, &header)?;
    }
    for (i, t) in rows.iter().enumerate() {
        let row = u32::try_from(i + 1)
            .map_err(|_| FintrackError::Other(format!("Too many rows to export: {}", rows.len())))?;
        for (col, name) in columns.iter().enumerate() {
            let col = column_index(col)?;
            if name == "Amount" {
                if let Some(amount) = t.amount {
                    sheet.write_number(row, col, amount)?;
                }
                continue;
            }
            let value = t.field(name);
            if !value.is_empty() {
                sheet.write_string(row, col, &value)?;
            }
        }
    }
    Ok(workbook.save_to_buffer()?)
}

#[cfg(feature = "xlsx")]
fn column_index(col: usize) -> Result<u16> {
    u16::try_from(col).map_err(|_| FintrackError::Other(format!("Too many columns to export: {}", col + 1)))
}

#[cfg(not(feature = "xlsx"))]
pub fn to_xlsx(_columns: &[String], _rows: &[&Transaction]) -> Result<Vec<u8>> {
    Err(FintrackError::UnsupportedFormat(
        "spreadsheet support is disabled (build with the `xlsx` feature)".to_string(),
    ))
}

/// Write to `path`, choosing CSV or XLSX from the extension.
pub fn write_file(path: &Path, columns: &[String], rows: &[&Transaction]) -> Result<()> {
    let name = path.to_string_lossy();
    let bytes = match SourceKind::from_name(&name)? {
        SourceKind::Csv => to_csv(columns, rows)?,
        SourceKind::Xlsx => to_xlsx(columns, rows)?,
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, bytes)?;
    tracing::info!(path = %path.display(), rows = rows.len(), "Exported filtered view");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categorizer::{categorize_dataset, CategoryTable};
    use crate::filter::Filter;
    use crate::loader::load_path;
    use crate::models::Dataset;

    const STATEMENT: &str = "\
Date,Amount,Type,Description,Notes
2024-01-02,45000,Credit,Salary January,
2024-01-05,499.5,Debit,Netflix subscription,\"family, shared\"
bad,12,Debit,Uber to airport,
2024-02-11,,debit,Dominos pizza,forgot amount
2024-02-15,1800,Debit,DMart groceries,
";

    fn dataset(dir: &Path) -> Dataset {
        let path = dir.join("statement.csv");
        std::fs::write(&path, STATEMENT).unwrap();
        let (mut ds, _) = load_path(&path).unwrap();
        categorize_dataset(&mut ds, &CategoryTable::builtin());
        ds
    }

    fn assert_same_rows(original: &[&Transaction], reloaded: &Dataset) {
        assert_eq!(reloaded.transactions.len(), original.len());
        for (a, b) in original.iter().zip(&reloaded.transactions) {
            assert_eq!(*a, b);
        }
    }

    #[test]
    fn test_csv_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let ds = dataset(dir.path());
        let rows = Filter::default().apply(&ds);
        let out = dir.path().join("out").join("filtered.csv");
        write_file(&out, &ds.export_columns(), &rows).unwrap();

        let (mut reloaded, _) = load_path(&out).unwrap();
        categorize_dataset(&mut reloaded, &CategoryTable::builtin());
        assert_eq!(reloaded.columns, ds.columns);
        assert_same_rows(&rows, &reloaded);
    }

    #[cfg(feature = "xlsx")]
    #[test]
    fn test_xlsx_roundtrip_of_filtered_view() {
        let dir = tempfile::tempdir().unwrap();
        let ds = dataset(dir.path());
        let filter = Filter {
            categories: Some(vec!["Entertainment".into(), "Food".into(), "Groceries".into()]),
            ..Filter::default()
        };
        let rows = filter.apply(&ds);
        assert_eq!(rows.len(), 3);

        let out = dir.path().join(DOWNLOAD_NAME);
        write_file(&out, &ds.export_columns(), &rows).unwrap();
        let (mut reloaded, stats) = load_path(&out).unwrap();
        categorize_dataset(&mut reloaded, &CategoryTable::builtin());
        assert_eq!(stats.bad_dates, 0);
        assert_eq!(reloaded.columns, ds.columns);
        assert_same_rows(&rows, &reloaded);
    }

    #[test]
    fn test_csv_header_has_category_last() {
        let dir = tempfile::tempdir().unwrap();
        let ds = dataset(dir.path());
        let rows = Filter::default().apply(&ds);
        let bytes = to_csv(&ds.export_columns(), &rows).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text.lines().next(),
            Some("Date,Amount,Type,Description,Notes,Category")
        );
        assert!(text.contains("\"family, shared\""));
    }

    #[cfg(feature = "xlsx")]
    #[test]
    fn test_column_index_does_not_wrap() {
        assert_eq!(column_index(5).unwrap(), 5);
        assert_eq!(column_index(usize::from(u16::MAX)).unwrap(), u16::MAX);
        let err = column_index(usize::from(u16::MAX) + 1).unwrap_err();
        assert!(matches!(err, FintrackError::Other(ref m) if m.contains("Too many columns")));
    }

    #[test]
    fn test_write_file_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let ds = dataset(dir.path());
        let rows = Filter::default().apply(&ds);
        let err = write_file(&dir.path().join("out.pdf"), &ds.export_columns(), &rows).unwrap_err();
        assert!(matches!(err, FintrackError::UnsupportedFormat(_)));
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FintrackError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "xlsx")]
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[cfg(feature = "xlsx")]
    #[error("Spreadsheet write error: {0}")]
    SpreadsheetWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("{0}")]
    NoData(String),

    #[error("Invalid date: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

impl FintrackError {
    /// True for errors caused by the input file rather than the environment.
    pub fn is_input_error(&self) -> bool {
        match self {
            Self::Csv(_)
            | Self::MissingColumn(_)
            | Self::UnsupportedFormat(_)
            | Self::NoData(_)
            | Self::InvalidDate(_) => true,
            #[cfg(feature = "xlsx")]
            Self::Spreadsheet(_) => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, FintrackError>;

use thiserror::Error;

/// Errors that can occur while loading or reading tables
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Index out of bounds: row {row}, col {col} (sheet has {rows} rows, {cols} cols)")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Column index out of bounds: {index} (sheet has {count} columns)")]
    ColumnIndexOutOfBounds { index: usize, count: usize },

    #[error("Column not found: {name}")]
    ColumnNotFound { name: String },

    #[error("Sheet not found: {name}")]
    SheetNotFound { name: String },

    #[error("Sheet already exists: {name}")]
    SheetAlreadyExists { name: String },

    #[error("Data length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Table has no header row")]
    MissingHeader,

    /// No encoding/delimiter combination produced a valid table.
    #[error("Cannot decode table after {attempts} attempts: {last}")]
    Decode { attempts: usize, last: String },

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<calamine::Error> for SheetError {
    fn from(err: calamine::Error) -> Self {
        SheetError::Workbook(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SheetError>;

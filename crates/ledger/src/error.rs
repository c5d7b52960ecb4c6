use thiserror::Error;

/// Errors that can occur during ledger operations
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Cannot delete the last remaining row")]
    LastRecord,

    #[error("Cannot delete the last remaining round column")]
    LastRoundColumn,

    #[error("Record not found: {id}")]
    RecordNotFound { id: u64 },

    #[error("Column not found: {name}")]
    UnknownColumn { name: String },

    #[error("Unknown field: {name}")]
    UnknownField { name: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

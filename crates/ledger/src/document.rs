//! JSON documents exchanged with the persistence endpoint.
//!
//! The full ledger travels as one object:
//! `{"books": [...], "lanColumns": [...], "hangDaLenColumns": [...], "lastUpdated": "..."}`.
//! Every key is optional on the way in; a missing array means "keep what you have".

use crate::book::Book;
use serde::{Deserialize, Serialize};

/// Whole-ledger snapshot as stored and transmitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub books: Option<Vec<Book>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lan_columns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hang_da_len_columns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

impl LedgerDocument {
    /// Parse a document from a JSON string.
    pub fn from_json_str(content: &str) -> crate::Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| crate::LedgerError::Parse(format!("Invalid ledger JSON: {e}")))
    }

    /// Number of books carried, zero when the array is absent.
    pub fn book_count(&self) -> usize {
        self.books.as_ref().map_or(0, Vec::len)
    }
}

/// Reply of the endpoint to a save, row save, or import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SaveResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }
}

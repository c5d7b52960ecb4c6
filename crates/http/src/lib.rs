//! # booklist-http
//!
//! Talks to the ledger's JSON persistence endpoint and keeps a local
//! [`Ledger`](booklist_ledger::Ledger) in step with it.
//!
//! Every write sends the whole ledger document. When the endpoint fails or
//! rejects a write, [`Session`] reloads from it before reporting the error,
//! so local state never claims a write that did not happen.

mod client;
mod session;

use async_trait::async_trait;
use booklist_ledger::{LedgerDocument, LedgerError};
use thiserror::Error;

pub use client::RemoteStore;
pub use session::Session;

/// Errors raised while talking to the persistence endpoint.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport failure, non-JSON reply, or an unexpected status code.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The endpoint answered `success: false`.
    #[error("Server rejected request: {0}")]
    Rejected(String),

    /// The local model refused the operation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Durable home of a ledger document.
///
/// Write operations return the endpoint's confirmation message.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Fetch the full stored document.
    async fn load(&self) -> ClientResult<LedgerDocument>;

    /// Store the document through the row-save route, which keeps stored
    /// books or round columns when the posted arrays are empty.
    async fn save_row(&self, document: &LedgerDocument) -> ClientResult<String>;

    /// Overwrite the stored document.
    async fn save_all(&self, document: &LedgerDocument) -> ClientResult<String>;

    /// Append the document's books to the stored ledger.
    async fn import(&self, document: &LedgerDocument) -> ClientResult<String>;
}

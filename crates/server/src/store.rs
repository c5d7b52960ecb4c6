//! Ledger document kept in a single JSON file.
//!
//! Every operation holds one async lock for its whole read-modify-write, so
//! overlapping requests are applied one after the other. Writes go to a
//! temporary file in the same directory and are renamed over the target.

use booklist_ledger::{Ledger, LedgerDocument};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors from the file-backed store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data file: {0}")]
    Corrupt(String),

    #[error("Serialize error: {0}")]
    Serialize(String),

    #[error("Background write failed: {0}")]
    Task(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current document, normalized against its column lists. A missing file
    /// is created holding the default ledger.
    pub async fn load(&self) -> StoreResult<LedgerDocument> {
        let _guard = self.lock.lock().await;
        self.read_or_create().await
    }

    /// Overwrite the stored ledger.
    pub async fn replace(&self, document: LedgerDocument) -> StoreResult<LedgerDocument> {
        let _guard = self.lock.lock().await;
        self.write(Ledger::from_document(document).to_document())
            .await
    }

    /// Row-save merge: non-empty `books` and `lanColumns` replace the stored
    /// ones, `hangDaLenColumns` replaces when present at all.
    pub async fn merge_row(&self, incoming: LedgerDocument) -> StoreResult<LedgerDocument> {
        let _guard = self.lock.lock().await;
        let mut current = self.read_or_create().await?;

        if let Some(books) = incoming.books.filter(|books| !books.is_empty()) {
            current.books = Some(books);
        }
        if let Some(rounds) = incoming.lan_columns.filter(|rounds| !rounds.is_empty()) {
            current.lan_columns = Some(rounds);
        }
        if let Some(arrivals) = incoming.hang_da_len_columns {
            current.hang_da_len_columns = Some(arrivals);
        }

        self.write(Ledger::from_document(current).to_document())
            .await
    }

    /// Append incoming books with fresh ids; returns how many were appended.
    pub async fn import(&self, incoming: LedgerDocument) -> StoreResult<usize> {
        let _guard = self.lock.lock().await;
        let mut ledger = Ledger::from_document(self.read_or_create().await?);
        let count = ledger.import(incoming);
        self.write(ledger.to_document()).await?;
        Ok(count)
    }

    async fn read_or_create(&self) -> StoreResult<LedgerDocument> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                let document: LedgerDocument = serde_json::from_slice(&bytes)
                    .map_err(|e| StoreError::Corrupt(e.to_string()))?;
                let last_updated = document.last_updated.clone();
                let mut normalized = Ledger::from_document(document).to_document();
                normalized.last_updated = last_updated;
                Ok(normalized)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(
                    path = %self.path.display(),
                    "creating data file with default ledger"
                );
                self.write(Ledger::new().to_document()).await
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, mut document: LedgerDocument) -> StoreResult<LedgerDocument> {
        document.last_updated = Some(chrono::Local::now().to_rfc3339());
        let bytes = serde_json::to_vec_pretty(&document)
            .map_err(|e| StoreError::Serialize(e.to_string()))?;

        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomic(&path, &bytes))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))??;

        tracing::debug!(books = document.book_count(), "data file written");
        Ok(document)
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    std::fs::create_dir_all(dir)?;

    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

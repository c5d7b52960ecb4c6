use crate::{ClientError, ClientResult, LedgerStore};
use booklist_ledger::{Book, Ledger, LedgerDocument, LedgerError};

/// A local [`Ledger`] bound to the store it was loaded from.
///
/// Model-level rejections (last row, last round column) never touch the
/// store. Any failed store write is followed by a full reload, and the
/// write's error is returned.
pub struct Session<S> {
    ledger: Ledger,
    store: S,
}

impl<S: LedgerStore> Session<S> {
    /// A session over the default ledger; nothing is fetched yet.
    pub fn new(store: S) -> Self {
        Self {
            ledger: Ledger::new(),
            store,
        }
    }

    /// A session whose ledger is loaded from `store`.
    pub async fn open(store: S) -> ClientResult<Self> {
        let mut session = Self::new(store);
        session.reload().await?;
        Ok(session)
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Direct access for local edits (fields, columns, filter). Nothing is
    /// written until one of the save operations runs.
    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Replace local state with the stored document. Arrays missing from the
    /// reply keep their local value.
    pub async fn reload(&mut self) -> ClientResult<()> {
        let document = self.store.load().await?;
        self.ledger.apply_document(document);
        tracing::info!(books = self.ledger.len(), "ledger loaded");
        Ok(())
    }

    /// Delete a book locally and persist the whole ledger.
    pub async fn delete_record(&mut self, id: u64) -> ClientResult<Book> {
        let removed = self.ledger.delete_record(id)?;
        let document = self.ledger.to_document();
        match self.store.save_row(&document).await {
            Ok(message) => {
                tracing::info!(id, %message, "row deleted");
                Ok(removed)
            }
            Err(err) => Err(self.recover(err).await),
        }
    }

    /// Persist the whole ledger on behalf of one book.
    pub async fn save_record(&mut self, id: u64) -> ClientResult<String> {
        if self.ledger.book(id).is_none() {
            return Err(LedgerError::RecordNotFound { id }.into());
        }
        let document = self.ledger.to_document();
        match self.store.save_row(&document).await {
            Ok(message) => {
                tracing::info!(id, %message, "row saved");
                Ok(message)
            }
            Err(err) => Err(self.recover(err).await),
        }
    }

    /// Overwrite the stored ledger with the local one.
    pub async fn save_all(&mut self) -> ClientResult<String> {
        let document = self.ledger.to_document();
        match self.store.save_all(&document).await {
            Ok(message) => {
                tracing::info!(%message, "ledger saved");
                Ok(message)
            }
            Err(err) => Err(self.recover(err).await),
        }
    }

    /// Append the document's books on the store side, then reload so local
    /// ids match the ones the store assigned. A failed reload does not undo
    /// the import; it is logged and the store's message is still returned.
    pub async fn import(&mut self, document: &LedgerDocument) -> ClientResult<String> {
        match self.store.import(document).await {
            Ok(message) => {
                tracing::info!(%message, books = document.book_count(), "books imported");
                if let Err(err) = self.reload().await {
                    tracing::warn!(error = %err, "import stored but reload failed");
                }
                Ok(message)
            }
            Err(err) => Err(self.recover(err).await),
        }
    }

    /// Resynchronize after a failed write and hand back the original error.
    async fn recover(&mut self, err: ClientError) -> ClientError {
        tracing::warn!(error = %err, "write failed, reloading ledger");
        if let Err(reload_err) = self.reload().await {
            tracing::error!(error = %reload_err, "reload after failed write also failed");
        }
        err
    }
}

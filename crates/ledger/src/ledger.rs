use crate::book::{Book, Field};
use crate::column::{ColumnFamily, ColumnRegistry};
use crate::document::LedgerDocument;
use crate::error::{LedgerError, Result};
use crate::filter::Filter;
use crate::numeric::{format_quantity, numeric};
use std::fmt;

/// Sum of the book's values over the given round columns.
pub fn order_total(book: &Book, rounds: &[String]) -> f64 {
    rounds.iter().map(|name| book.quantity(name)).sum()
}

/// Order total less current stock and returns.
pub fn must_order_total(book: &Book, rounds: &[String]) -> f64 {
    order_total(book, rounds) - numeric(&book.stock) - numeric(&book.returns)
}

/// Footer figures for the current view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    /// Books passing the filter.
    pub visible: usize,
    /// Books in the ledger.
    pub total: usize,
    /// Must-order total summed over the visible books only.
    pub must_order_total: f64,
}

impl Summary {
    pub fn is_filtered(&self) -> bool {
        self.visible != self.total
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_filtered() {
            write!(f, "{} / {}", self.visible, self.total)
        } else {
            write!(f, "{}", self.total)
        }
    }
}

/// The ordering ledger: books, column registry and the active filter.
///
/// All mutation goes through this type so the invariants hold at one place:
/// at least one book, at least one round column once columns are removed,
/// and every book carrying exactly the registered columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    books: Vec<Book>,
    columns: ColumnRegistry,
    filter: Filter,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    /// A ledger with one blank book and round columns `lan1`, `lan2`.
    pub fn new() -> Self {
        Self::with_columns(ColumnRegistry::default())
    }

    /// A ledger with one blank book and the given columns.
    pub fn with_columns(columns: ColumnRegistry) -> Self {
        let books = vec![Book::blank(1, &columns)];
        Self {
            books,
            columns,
            filter: Filter::default(),
        }
    }

    /// Build a ledger from a stored document; absent arrays fall back to the
    /// defaults of [`Ledger::new`].
    pub fn from_document(document: LedgerDocument) -> Self {
        let mut ledger = Self::new();
        ledger.apply_document(document);
        ledger
    }

    /// Replace state with whatever the document carries.
    ///
    /// Absent arrays leave the current value untouched. Books are normalized
    /// against the resulting registry. The filter is kept.
    pub fn apply_document(&mut self, document: LedgerDocument) {
        if let Some(rounds) = document.lan_columns {
            self.columns = ColumnRegistry::new(rounds, self.columns.arrivals().to_vec());
        }
        if let Some(arrivals) = document.hang_da_len_columns {
            self.columns = ColumnRegistry::new(self.columns.rounds().to_vec(), arrivals);
        }
        if let Some(books) = document.books {
            self.books = books;
        }
        self.normalize();
    }

    /// Snapshot of the full ledger for persistence.
    pub fn to_document(&self) -> LedgerDocument {
        LedgerDocument {
            books: Some(self.books.clone()),
            lan_columns: Some(self.columns.rounds().to_vec()),
            hang_da_len_columns: Some(self.columns.arrivals().to_vec()),
            last_updated: None,
        }
    }

    /// Append the document's books with fresh ids and register any column
    /// identifiers not yet known. Returns the number of books appended.
    pub fn import(&mut self, document: LedgerDocument) -> usize {
        for name in document.lan_columns.unwrap_or_default() {
            self.columns.register(ColumnFamily::Round, &name);
        }
        for name in document.hang_da_len_columns.unwrap_or_default() {
            self.columns.register(ColumnFamily::Arrived, &name);
        }

        let incoming = document.books.unwrap_or_default();
        let count = incoming.len();
        for mut book in incoming {
            book.id = self.next_id();
            self.books.push(book);
        }

        self.normalize();
        count
    }

    /// Re-sync every book with the registry and restore the one-book floor.
    fn normalize(&mut self) {
        for book in &mut self.books {
            book.sync_columns(&self.columns);
        }
        if self.books.is_empty() {
            self.books.push(Book::blank(1, &self.columns));
        }
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn book(&self, id: u64) -> Option<&Book> {
        self.books.iter().find(|b| b.id == id)
    }

    pub fn columns(&self) -> &ColumnRegistry {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// One past the largest id, or the lowest unused id once the largest
    /// is `u64::MAX`.
    fn next_id(&self) -> u64 {
        let max = self.books.iter().map(|b| b.id).max().unwrap_or(0);
        max.checked_add(1)
            .or_else(|| (1..=u64::MAX).find(|id| self.book(*id).is_none()))
            .unwrap_or(u64::MAX)
    }

    /// Append a blank book and return its id (one past the largest id).
    pub fn add_record(&mut self) -> u64 {
        let id = self.next_id();
        self.books.push(Book::blank(id, &self.columns));
        id
    }

    /// Remove the book with `id`. The last remaining book cannot be removed.
    pub fn delete_record(&mut self, id: u64) -> Result<Book> {
        if self.books.len() <= 1 {
            return Err(LedgerError::LastRecord);
        }
        let index = self
            .books
            .iter()
            .position(|b| b.id == id)
            .ok_or(LedgerError::RecordNotFound { id })?;
        Ok(self.books.remove(index))
    }

    /// Store `value` into one field of the book with `id`.
    pub fn update_field(&mut self, id: u64, field: &Field, value: &str) -> Result<()> {
        if let Field::Column(name) = field {
            if self.columns.family_of(name).is_none() {
                return Err(LedgerError::UnknownField { name: name.clone() });
            }
        }
        let book = self
            .books
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(LedgerError::RecordNotFound { id })?;
        book.set(field, value);
        Ok(())
    }

    /// Register the next column of `family` and give every book an empty value for it.
    pub fn add_column(&mut self, family: ColumnFamily) -> String {
        let name = self.columns.push(family);
        for book in &mut self.books {
            book.insert_column(family, &name);
        }
        name
    }

    /// Unregister `name` and strip it from every book.
    pub fn remove_column(&mut self, family: ColumnFamily, name: &str) -> Result<()> {
        self.columns.remove(family, name)?;
        for book in &mut self.books {
            book.remove_column(name);
        }
        Ok(())
    }

    /// Sum of the book's round quantities under the current registry.
    pub fn order_total(&self, book: &Book) -> f64 {
        order_total(book, self.columns.rounds())
    }

    /// Order total less stock and returns under the current registry.
    pub fn must_order_total(&self, book: &Book) -> f64 {
        must_order_total(book, self.columns.rounds())
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    /// Set search term and price bounds in one step.
    pub fn apply_filter(&mut self, search: &str, min_price: Option<f64>, max_price: Option<f64>) {
        self.filter = Filter::new(search, min_price, max_price);
    }

    pub fn clear_search(&mut self) {
        self.filter = self.filter.without_search();
    }

    pub fn clear_filters(&mut self) {
        self.filter = Filter::default();
    }

    /// Books passing the active filter, in ledger order.
    pub fn visible(&self) -> Vec<&Book> {
        self.books.iter().filter(|b| self.filter.matches(b)).collect()
    }

    pub fn summary(&self) -> Summary {
        let visible = self.visible();
        Summary {
            visible: visible.len(),
            total: self.books.len(),
            must_order_total: visible.iter().map(|b| self.must_order_total(b)).sum(),
        }
    }

    /// Human-readable result line for the active filter.
    pub fn filter_status(&self) -> String {
        let summary = self.summary();
        if summary.is_filtered() {
            format!("Hiển thị {} / {} cuốn sách", summary.visible, summary.total)
        } else {
            format!("Hiển thị tất cả {} cuốn sách", summary.total)
        }
    }

    /// Rendered must-order total of the visible books.
    pub fn summary_total_text(&self) -> String {
        format_quantity(self.summary().must_order_total)
    }
}

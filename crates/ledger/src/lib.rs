//! Ordering ledger for a bookstore
//!
//! Holds book order lines whose column set grows and shrinks at runtime:
//! every line carries one quantity per "round" column (`lan1`, `lan2`, ...)
//! and, optionally, one per "arrived stock" column (`hangDaLen1`, ...).
//! Totals are derived on demand from the current column registry, never cached.
//!
//! # Examples
//!
//! ## Editing lines and reading totals
//!
//! ```
//! use booklist_ledger::{Field, Ledger};
//!
//! let mut ledger = Ledger::new();
//! let id = ledger.books()[0].id;
//!
//! ledger.update_field(id, &Field::parse("lan1"), "5").unwrap();
//! ledger.update_field(id, &Field::parse("lan2"), "3.5").unwrap();
//! ledger.update_field(id, &Field::Stock, "2").unwrap();
//!
//! let book = ledger.book(id).unwrap();
//! assert_eq!(ledger.order_total(book), 8.5);
//! assert_eq!(ledger.must_order_total(book), 6.5);
//! ```
//!
//! ## Growing the column set
//!
//! ```
//! use booklist_ledger::{ColumnFamily, Ledger};
//!
//! let mut ledger = Ledger::new();
//! let added = ledger.add_column(ColumnFamily::Round);
//!
//! assert_eq!(added, "lan3");
//! assert!(ledger.books().iter().all(|b| b.column(&added) == Some("")));
//! ```
//!
//! ## Filtering
//!
//! ```
//! use booklist_ledger::{Field, Filter, Ledger};
//!
//! let mut ledger = Ledger::new();
//! let first = ledger.books()[0].id;
//! ledger.update_field(first, &Field::Title, "Toán 5").unwrap();
//! let second = ledger.add_record();
//! ledger.update_field(second, &Field::Title, "Văn 3").unwrap();
//!
//! ledger.set_filter(Filter::new("toán", None, None));
//! assert_eq!(ledger.visible().len(), 1);
//! assert_eq!(ledger.summary().to_string(), "1 / 2");
//! ```

mod book;
mod column;
mod document;
mod error;
mod export;
mod filter;
mod ledger;
mod numeric;

/// Re-export record types.
pub use book::{Book, Field, CATEGORY_OPTIONS, CUSTOM_SENTINEL};
/// Re-export column registry types.
pub use column::{ColumnFamily, ColumnRegistry};
/// Re-export wire documents exchanged with the persistence endpoint.
pub use document::{LedgerDocument, SaveResponse};
/// Re-export ledger error types.
pub use error::{LedgerError, Result};
/// Re-export export table types.
pub use export::{export_file_name, ExportCell, ExportTable};
/// Re-export filter type.
pub use filter::Filter;
/// Re-export the ledger model.
pub use ledger::{must_order_total, order_total, Ledger, Summary};
/// Re-export numeric coercion helpers.
pub use numeric::{format_quantity, numeric};

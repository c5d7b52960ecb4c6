//! Tabular export of the visible part of a ledger.
//!
//! Column order: sequence, title, [brand], price, category, stock, order
//! total, one column per round, [one per arrived-stock column], returns,
//! must-order total, note. Brand and arrived-stock columns appear only when
//! the ledger has at least one arrived-stock column.

use crate::column::ColumnFamily;
use crate::error::{LedgerError, Result};
use crate::ledger::Ledger;
use chrono::NaiveDate;
use rust_xlsxwriter::Workbook;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Worksheet name used for XLSX output.
const SHEET_NAME: &str = "Quản lý sách";

/// One exported cell.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportCell {
    Text(String),
    Number(f64),
}

impl ExportCell {
    /// Cell content as it appears in text output.
    pub fn as_text(&self) -> String {
        match self {
            ExportCell::Text(s) => s.clone(),
            ExportCell::Number(n) => crate::numeric::format_quantity(*n),
        }
    }
}

/// Headers plus one row per visible book.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<ExportCell>>,
}

impl ExportTable {
    pub fn from_ledger(ledger: &Ledger) -> Self {
        let columns = ledger.columns();
        let with_arrivals = !columns.arrivals().is_empty();

        let mut headers = vec!["STT".to_string(), "TÊN SÁCH".to_string()];
        if with_arrivals {
            headers.push("HÃNG SÁCH".to_string());
        }
        headers.extend(
            ["GIÁ MỚI", "MẢNG", "Tồn kho", "Tổng đặt mới"]
                .into_iter()
                .map(String::from),
        );
        headers.extend(
            (0..columns.rounds().len()).map(|i| ColumnFamily::Round.heading(i)),
        );
        headers.extend(
            (0..columns.arrivals().len()).map(|i| ColumnFamily::Arrived.heading(i)),
        );
        headers.extend(
            ["Trả lại, huỷ đơn hàng", "Tổng phải đặt", "Ghi chú"]
                .into_iter()
                .map(String::from),
        );

        let rows = ledger
            .visible()
            .into_iter()
            .map(|book| {
                let mut row = vec![ExportCell::Number(book.stt as f64), text(&book.title)];
                if with_arrivals {
                    row.push(text(&book.brand));
                }
                row.push(text(&book.price));
                row.push(text(&book.category));
                row.push(text(&book.stock));
                row.push(ExportCell::Number(ledger.order_total(book)));
                for name in columns.rounds().iter().chain(columns.arrivals()) {
                    row.push(text(book.column(name).unwrap_or_default()));
                }
                row.push(text(&book.returns));
                row.push(ExportCell::Number(ledger.must_order_total(book)));
                row.push(text(&book.note));
                row
            })
            .collect();

        Self { headers, rows }
    }

    /// Write headers and rows as CSV.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(&self.headers)?;
        for row in &self.rows {
            csv_writer.write_record(row.iter().map(ExportCell::as_text))?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn save_as_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write_csv(BufWriter::new(file))
    }

    /// Save as a single-sheet Excel workbook. Values only, no styling.
    pub fn save_as_xlsx<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(SHEET_NAME)
            .map_err(|e| LedgerError::Export(e.to_string()))?;

        for (col_idx, header) in self.headers.iter().enumerate() {
            let col = column_index(col_idx)?;
            worksheet
                .write_string(0, col, header)
                .map_err(|e| LedgerError::Export(e.to_string()))?;
        }

        for (row_idx, row) in self.rows.iter().enumerate() {
            let row_num = u32::try_from(row_idx + 1)
                .map_err(|_| LedgerError::Export("Row index overflow".to_string()))?;
            for (col_idx, cell) in row.iter().enumerate() {
                let col = column_index(col_idx)?;
                match cell {
                    ExportCell::Number(n) => worksheet.write_number(row_num, col, *n),
                    ExportCell::Text(s) if s.is_empty() => continue,
                    ExportCell::Text(s) => worksheet.write_string(row_num, col, s),
                }
                .map_err(|e| LedgerError::Export(e.to_string()))?;
            }
        }

        workbook
            .save(path.as_ref())
            .map_err(|e| LedgerError::Export(e.to_string()))?;
        Ok(())
    }
}

fn text(value: &str) -> ExportCell {
    ExportCell::Text(value.to_string())
}

fn column_index(index: usize) -> Result<u16> {
    u16::try_from(index).map_err(|_| LedgerError::Export("Column index overflow".to_string()))
}

/// Dated file name for a spreadsheet export, e.g. `quan-ly-sach-2024-03-09.xlsx`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("quan-ly-sach-{}.xlsx", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::Field;
    use crate::filter::Filter;

    fn sample() -> Ledger {
        let mut ledger = Ledger::new();
        ledger.update_field(1, &Field::Title, "Toán 5").unwrap();
        ledger.update_field(1, &Field::Price, "50000").unwrap();
        ledger.update_field(1, &Field::Column("lan1".to_string()), "5").unwrap();
        ledger.update_field(1, &Field::Stock, "1").unwrap();
        let id = ledger.add_record();
        ledger.update_field(id, &Field::Title, "Văn 3").unwrap();
        ledger
    }

    #[test]
    fn test_headers_without_arrivals() {
        let table = ExportTable::from_ledger(&sample());
        assert_eq!(
            table.headers,
            vec![
                "STT",
                "TÊN SÁCH",
                "GIÁ MỚI",
                "MẢNG",
                "Tồn kho",
                "Tổng đặt mới",
                "Lần 1",
                "Lần 2",
                "Trả lại, huỷ đơn hàng",
                "Tổng phải đặt",
                "Ghi chú",
            ]
        );
    }

    #[test]
    fn test_headers_with_arrivals() {
        let mut ledger = sample();
        ledger.add_column(ColumnFamily::Arrived);
        let table = ExportTable::from_ledger(&ledger);
        assert_eq!(table.headers[2], "HÃNG SÁCH");
        assert_eq!(table.headers[9], "Hàng đã lên 1");
        assert_eq!(table.rows[0].len(), table.headers.len());
    }

    #[test]
    fn test_rows_follow_visible_set() {
        let mut ledger = sample();
        ledger.set_filter(Filter::new("toán", None, None));
        let table = ExportTable::from_ledger(&ledger);

        assert_eq!(table.rows.len(), 1);
        let row = &table.rows[0];
        assert_eq!(row[0], ExportCell::Number(1.0));
        assert_eq!(row[1], ExportCell::Text("Toán 5".to_string()));
        assert_eq!(row[5], ExportCell::Number(5.0));
        assert_eq!(row[6], ExportCell::Text("5".to_string()));
        assert_eq!(row[9], ExportCell::Number(4.0));
    }

    #[test]
    fn test_write_csv() {
        let table = ExportTable::from_ledger(&sample());
        let mut buffer = Vec::new();
        table.write_csv(&mut buffer).unwrap();
        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("STT,TÊN SÁCH,GIÁ MỚI"));
        assert_eq!(lines[1], "1,Toán 5,50000,,1,5,5,,,4,");
    }

    #[test]
    fn test_save_as_xlsx() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.xlsx");
        ExportTable::from_ledger(&sample()).save_as_xlsx(&path).unwrap();
        assert!(path.metadata().unwrap().len() > 0);
    }

    #[test]
    fn test_export_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(export_file_name(date), "quan-ly-sach-2024-03-09.xlsx");
    }
}

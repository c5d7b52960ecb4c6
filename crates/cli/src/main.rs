//! # booklist-cli
//!
//! Command-line front end for the bookstore ordering ledger.

use anyhow::{bail, Context, Result};
use booklist_http::{RemoteStore, Session};
use booklist_ledger::{
    export_file_name, format_quantity, ColumnFamily, ExportCell, ExportTable, Field, Filter, Ledger,
    LedgerDocument,
};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// booklist - edit the bookstore ordering ledger
#[derive(Parser)]
#[command(name = "booklist")]
#[command(author, version, about = "Bookstore ordering ledger", long_about = None)]
struct Cli {
    /// Base URL of the ledger server
    #[arg(long, env = "BOOKLIST_SERVER", default_value = "http://localhost:3000")]
    server: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Output format for listings (json, csv, table)
    #[arg(short = 'f', long = "format", default_value = "table")]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the books passing the filter, with totals
    List(FilterArgs),
    /// Show row counts and the must-order total
    Summary(FilterArgs),
    /// Append a blank row, optionally filling fields, and save it
    Add {
        /// Field values for the new row
        #[arg(short = 's', long = "set", value_name = "FIELD=VALUE")]
        values: Vec<String>,
    },
    /// Change one field of a row and save it
    Set {
        id: u64,
        /// Field name (tenSach, giaMoi, mang, tanKho, traLai, ghiChu, stt, hangSach, or a column id)
        field: String,
        value: String,
    },
    /// Delete a row
    Delete { id: u64 },
    /// Add the next column of a family
    AddColumn {
        #[arg(value_enum)]
        family: FamilyArg,
    },
    /// Remove a column and its values from every row
    RemoveColumn {
        #[arg(value_enum)]
        family: FamilyArg,
        name: String,
        /// Confirm the removal; values in the column are lost for good
        #[arg(long)]
        yes: bool,
    },
    /// Write the visible rows to a spreadsheet file
    Export {
        /// Output path (default: quan-ly-sach-<date>.xlsx)
        path: Option<PathBuf>,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Append the books of a ledger JSON file
    Import { file: PathBuf },
}

#[derive(Args, Default)]
struct FilterArgs {
    /// Case-insensitive title search
    #[arg(short = 'q', long)]
    search: Option<String>,

    /// Lowest price shown
    #[arg(long)]
    min_price: Option<f64>,

    /// Highest price shown
    #[arg(long)]
    max_price: Option<f64>,
}

impl FilterArgs {
    fn to_filter(&self) -> Filter {
        Filter::new(
            self.search.as_deref().unwrap_or_default(),
            self.min_price,
            self.max_price,
        )
    }
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum FamilyArg {
    /// Order round columns (lanN)
    Round,
    /// Arrived stock columns (hangDaLenN)
    Arrived,
}

impl From<FamilyArg> for ColumnFamily {
    fn from(arg: FamilyArg) -> Self {
        match arg {
            FamilyArg::Round => ColumnFamily::Round,
            FamilyArg::Arrived => ColumnFamily::Arrived,
        }
    }
}

/// Output format for listings.
#[derive(Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Aligned table output (default)
    #[default]
    Table,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();
    }

    let store = RemoteStore::with_timeout(&cli.server, cli.timeout)?;
    let mut session = Session::open(store)
        .await
        .with_context(|| format!("Failed to load ledger from {}", cli.server))?;
    tracing::debug!(books = session.ledger().len(), server = %cli.server, "ledger loaded");

    run(&mut session, cli.command, cli.format).await
}

/// Execute one command against a loaded session.
async fn run(
    session: &mut Session<RemoteStore>,
    command: Command,
    format: OutputFormat,
) -> Result<()> {
    match command {
        Command::List(filter) => {
            session.ledger_mut().set_filter(filter.to_filter());
            print_listing(session.ledger(), format)?;
        }
        Command::Summary(filter) => {
            session.ledger_mut().set_filter(filter.to_filter());
            print_summary(session.ledger());
        }
        Command::Add { values } => {
            let assignments = values
                .iter()
                .map(|pair| parse_assignment(pair))
                .collect::<Result<Vec<_>>>()?;

            let id = session.ledger_mut().add_record();
            for (field, value) in &assignments {
                session.ledger_mut().update_field(id, field, value)?;
            }
            let message = session.save_record(id).await?;
            println!("{} row {id}: {message}", "Added".green().bold());
        }
        Command::Set { id, field, value } => {
            let field = Field::parse(&field);
            session.ledger_mut().update_field(id, &field, &value)?;
            let message = session.save_record(id).await?;
            println!("{} {field} of row {id}: {message}", "Updated".green().bold());
        }
        Command::Delete { id } => {
            let removed = session.delete_record(id).await?;
            println!(
                "{} row {} ({})",
                "Deleted".green().bold(),
                removed.id,
                if removed.title.is_empty() { "untitled" } else { removed.title.as_str() }
            );
        }
        Command::AddColumn { family } => {
            let name = session.ledger_mut().add_column(family.into());
            session.save_all().await?;
            println!("{} column {name}", "Added".green().bold());
        }
        Command::RemoveColumn { family, name, yes } => {
            if !yes {
                bail!("Removing column '{name}' deletes its values from every row; pass --yes to confirm");
            }
            session.ledger_mut().remove_column(family.into(), &name)?;
            session.save_all().await?;
            println!("{} column {name}", "Removed".green().bold());
        }
        Command::Export { path, filter } => {
            session.ledger_mut().set_filter(filter.to_filter());
            let path = path.unwrap_or_else(|| {
                PathBuf::from(export_file_name(chrono::Local::now().date_naive()))
            });
            let table = ExportTable::from_ledger(session.ledger());
            if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("csv")) {
                table.save_as_csv(&path)?;
            } else {
                table.save_as_xlsx(&path)?;
            }
            println!(
                "{} {} rows to {}",
                "Exported".green().bold(),
                table.rows.len(),
                path.display()
            );
        }
        Command::Import { file } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read file: {}", file.display()))?;
            let document = LedgerDocument::from_json_str(&content)?;
            let message = session.import(&document).await?;
            println!("{} {message}", "Imported".green().bold());
        }
    }

    Ok(())
}

/// Parse a `FIELD=VALUE` assignment.
fn parse_assignment(pair: &str) -> Result<(Field, String)> {
    let (name, value) = pair
        .split_once('=')
        .with_context(|| format!("Invalid assignment: '{pair}'. Expected FIELD=VALUE format"))?;
    Ok((Field::parse(name.trim()), value.to_string()))
}

fn print_listing(ledger: &Ledger, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let visible = ledger.visible();
            println!("{}", serde_json::to_string_pretty(&visible)?);
        }
        OutputFormat::Csv => {
            ExportTable::from_ledger(ledger).write_csv(std::io::stdout().lock())?;
        }
        OutputFormat::Table => {
            let table = ExportTable::from_ledger(ledger);
            for line in render_table(&table) {
                println!("{line}");
            }
            print_summary(ledger);
        }
    }
    Ok(())
}

fn print_summary(ledger: &Ledger) {
    let summary = ledger.summary();
    println!("{}", ledger.filter_status().dimmed());
    println!(
        "{} {}   {} {}",
        "Rows:".cyan().bold(),
        summary,
        "Tổng phải đặt:".cyan().bold(),
        format_quantity(summary.must_order_total)
    );
}

/// Lay out the table as padded text lines, header first.
fn render_table(table: &ExportTable) -> Vec<String> {
    let cells: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(ExportCell::as_text).collect())
        .collect();

    let widths: Vec<usize> = table
        .headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let pad = |text: &str, width: usize| {
        let fill = width.saturating_sub(text.chars().count());
        format!("{text}{}", " ".repeat(fill))
    };

    let mut lines = Vec::with_capacity(cells.len() + 1);
    lines.push(
        table
            .headers
            .iter()
            .zip(&widths)
            .map(|(h, w)| pad(h, *w))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string(),
    );
    for row in &cells {
        lines.push(
            row.iter()
                .zip(&widths)
                .map(|(c, w)| pad(c, *w))
                .collect::<Vec<_>>()
                .join(" | ")
                .trim_end()
                .to_string(),
        );
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // parse_assignment tests
    // ========================================================================

    #[test]
    fn test_parse_assignment_fixed_field() {
        let (field, value) = parse_assignment("tenSach=Toán 5").unwrap();
        assert_eq!(field, Field::Title);
        assert_eq!(value, "Toán 5");
    }

    #[test]
    fn test_parse_assignment_column_and_empty_value() {
        let (field, value) = parse_assignment("lan2=").unwrap();
        assert_eq!(field, Field::Column("lan2".to_string()));
        assert_eq!(value, "");
    }

    #[test]
    fn test_parse_assignment_rejects_missing_equals() {
        assert!(parse_assignment("tenSach").is_err());
    }

    // ========================================================================
    // argument parsing tests
    // ========================================================================

    #[test]
    fn test_cli_parses_filters() {
        let cli = Cli::try_parse_from([
            "booklist", "list", "-q", "toán", "--min-price", "40000",
        ])
        .unwrap();
        match cli.command {
            Command::List(args) => {
                let filter = args.to_filter();
                assert_eq!(filter.search(), "toán");
                assert_eq!(filter.min_price(), Some(40000.0));
                assert_eq!(filter.max_price(), None);
            }
            _ => panic!("Expected list command"),
        }
    }

    #[test]
    fn test_cli_parses_column_family() {
        let cli = Cli::try_parse_from([
            "booklist",
            "remove-column",
            "arrived",
            "hangDaLen1",
            "--yes",
        ])
        .unwrap();
        match cli.command {
            Command::RemoveColumn { family, name, yes } => {
                assert_eq!(ColumnFamily::from(family), ColumnFamily::Arrived);
                assert_eq!(name, "hangDaLen1");
                assert!(yes);
            }
            _ => panic!("Expected remove-column command"),
        }
    }

    #[test]
    fn test_default_filter_is_empty() {
        assert!(FilterArgs::default().to_filter().is_empty());
    }

    // ========================================================================
    // render_table tests
    // ========================================================================

    #[test]
    fn test_render_table_aligns_columns() {
        let mut ledger = Ledger::new();
        ledger.update_field(1, &Field::Title, "Toán 5").unwrap();
        ledger
            .update_field(1, &Field::Column("lan1".to_string()), "5")
            .unwrap();

        let lines = render_table(&ExportTable::from_ledger(&ledger));
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("STT | TÊN SÁCH |"));
        assert!(lines[1].starts_with("1   | Toán 5   |"));
    }
}

//! Trade Journal
//!
//! Log daily P&L and capital movements, then review equity, win rate,
//! monthly/daily breakdowns and a calendar heat-map.

mod config;
mod db;
mod error;
mod journal;
mod metrics;
mod models;
mod store;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::config::{JournalConfig, PnlView, DEFAULT_DATABASE_URL};
use crate::db::Database;
use crate::journal::{Journal, JournalBackup};
use crate::metrics::{CalendarCell, CalendarMonth, DayStatus, YearMonth, WEEKDAYS};
use crate::models::{NewTransaction, TransactionType};

/// Trading journal CLI.
#[derive(Parser)]
#[command(name = "tradejournal")]
#[command(about = "Track daily P&L and capital with equity analytics", long_about = None)]
struct Cli {
    /// Database file path
    #[arg(short, long, env = "JOURNAL_DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    database: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "JOURNAL_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Number of latest entries in the recent daily series
    #[arg(long, env = "JOURNAL_RECENT_ENTRIES", default_value = "30")]
    recent_entries: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log a P&L entry
    Add {
        /// Profit (positive) or loss (negative)
        #[arg(short, long, allow_hyphen_values = true)]
        pnl: Decimal,

        /// Day of the entry (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Notes
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Delete an entry by id
    Delete {
        id: String,
    },

    /// List all entries, newest first
    List,

    /// Set initial capital
    SetCapital {
        amount: Decimal,
    },

    /// Record a deposit
    Deposit {
        #[arg(short, long)]
        amount: Decimal,

        /// Day of the deposit (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<NaiveDate>,

        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Record a withdrawal
    Withdraw {
        #[arg(short, long)]
        amount: Decimal,

        /// Day of the withdrawal (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<NaiveDate>,

        #[arg(short, long)]
        notes: Option<String>,
    },

    /// List capital transactions and current capital
    Transactions,

    /// Delete a capital transaction by id
    RemoveTransaction {
        id: String,
    },

    /// Show statistics and P&L series
    Dashboard {
        /// P&L breakdown to show
        #[arg(short, long, value_enum)]
        view: Option<PnlView>,

        /// Print JSON instead of a text report
        #[arg(long)]
        json: bool,
    },

    /// Show the equity curve
    Equity {
        #[arg(long)]
        json: bool,
    },

    /// Show a month calendar with daily P&L
    Calendar {
        /// Month to show (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<YearMonth>,

        /// Months to move from the selected month (negative = earlier)
        #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
        offset: i32,

        #[arg(long)]
        json: bool,
    },

    /// Export entries and capital as JSON
    Export {
        /// Output file, stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import a JSON backup (entries are appended, capital is replaced)
    Import {
        file: PathBuf,
    },

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = JournalConfig {
        database_url: cli.database.clone(),
        recent_entries: cli.recent_entries,
        ..JournalConfig::default()
    };

    // Initialize database
    let db = Database::new(&config.database_url).await?;
    let journal = Journal::new(db, config);
    let today = chrono::Local::now().date_naive();

    match cli.command {
        Commands::Add { pnl, date, notes } => {
            let entry = journal.add_entry(date.unwrap_or(today), pnl, notes).await?;
            println!("Added entry {} on {}: ${:.2}", entry.id, entry.date, entry.pnl);
        }

        Commands::Delete { id } => {
            if journal.delete_entry(&id).await? {
                println!("Deleted entry {}", id);
            } else {
                println!("No entry with id {}", id);
            }
        }

        Commands::List => {
            let snapshot = journal.snapshot().await?;

            if snapshot.entries.is_empty() {
                println!("No entries yet. Use 'tradejournal add --pnl <amount>' to log one.");
                return Ok(());
            }

            let total: Decimal = snapshot.entries.iter().map(|e| e.pnl).sum();
            println!(
                "\nTotal Entries: {}    Total P&L: ${:.2}",
                snapshot.entries.len(),
                total
            );
            println!("\n{:<36} {:<12} {:>12}  {}", "ID", "DATE", "P&L", "NOTES");
            println!("{}", "-".repeat(80));

            for entry in &snapshot.entries {
                println!(
                    "{:<36} {:<12} {:>12.2}  {}",
                    entry.id,
                    entry.date,
                    entry.pnl,
                    truncate(entry.notes.as_deref().unwrap_or("-"), 30)
                );
            }
        }

        Commands::SetCapital { amount } => {
            let state = journal.set_initial_capital(amount).await?;
            println!("Initial capital: ${:.2}", state.initial_capital);
            println!("Current capital: ${:.2}", state.current_capital());
        }

        Commands::Deposit { amount, date, notes } => {
            let transaction = NewTransaction::new(
                date.unwrap_or(today),
                TransactionType::Deposit,
                amount,
                notes,
            )?;
            let stored = journal.add_transaction(transaction).await?;
            println!("Deposit {} on {}: +${:.2}", stored.id, stored.date, stored.amount);
        }

        Commands::Withdraw { amount, date, notes } => {
            let transaction = NewTransaction::new(
                date.unwrap_or(today),
                TransactionType::Withdrawal,
                amount,
                notes,
            )?;
            let stored = journal.add_transaction(transaction).await?;
            println!("Withdrawal {} on {}: -${:.2}", stored.id, stored.date, stored.amount);
        }

        Commands::Transactions => {
            let Some(capital) = journal.snapshot().await?.capital else {
                println!("No capital data. Use 'tradejournal set-capital <amount>' to start.");
                return Ok(());
            };

            println!("\n=== Capital ===");
            println!("Initial Capital: ${:.2}", capital.initial_capital);
            println!("Current Capital: ${:.2}", capital.current_capital());

            if capital.transactions.is_empty() {
                println!("\nNo transactions yet.");
                return Ok(());
            }

            println!("\n{:<36} {:<12} {:<11} {:>12}  {}", "ID", "DATE", "TYPE", "AMOUNT", "NOTES");
            println!("{}", "-".repeat(90));
            for t in &capital.transactions {
                let sign = match t.kind {
                    TransactionType::Deposit => "+",
                    TransactionType::Withdrawal => "-",
                };
                println!(
                    "{:<36} {:<12} {:<11} {:>12}  {}",
                    t.id,
                    t.date,
                    t.kind.as_str(),
                    format!("{}${:.2}", sign, t.amount),
                    truncate(t.notes.as_deref().unwrap_or(""), 24)
                );
            }
        }

        Commands::RemoveTransaction { id } => {
            if journal.delete_transaction(&id).await? {
                println!("Deleted transaction {}", id);
            } else {
                println!("No transaction with id {}", id);
            }
        }

        Commands::Dashboard { view, json } => {
            let mut dashboard = journal.dashboard().await?;
            if let Some(view) = view {
                dashboard = dashboard.with_view(view);
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&dashboard)?);
            } else {
                println!("{}", dashboard);
            }
        }

        Commands::Equity { json } => {
            let dashboard = journal.dashboard().await?;
            let curve = &dashboard.equity_curve;

            if json {
                println!("{}", serde_json::to_string_pretty(curve)?);
            } else if curve.is_empty() {
                println!("No equity curve. Set up capital with 'tradejournal set-capital <amount>'.");
            } else {
                println!("\n{:<12} {:>14}", "DATE", "EQUITY");
                println!("{}", "-".repeat(27));
                for point in curve {
                    println!("{:<12} {:>14.2}", point.date.to_string(), point.equity);
                }
            }
        }

        Commands::Calendar { month, offset, json } => {
            let target = month.unwrap_or_else(|| YearMonth::of(today)).shift(offset);
            info!(month = %target, "Rendering calendar");

            let grid = journal.calendar(target, today).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&grid)?);
            } else {
                print_calendar(&grid);
            }
        }

        Commands::Export { output } => {
            let snapshot = journal.snapshot().await?;
            let body = serde_json::to_string_pretty(&snapshot)?;

            match output {
                Some(path) => {
                    std::fs::write(&path, body)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!(
                        "Exported {} entries to {}",
                        snapshot.entries.len(),
                        path.display()
                    );
                }
                None => println!("{}", body),
            }
        }

        Commands::Import { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let backup: JournalBackup =
                serde_json::from_str(&raw).context("Backup file is not valid journal JSON")?;

            let summary = journal.import(backup).await?;
            println!("\n=== Import ===");
            println!("Entries added:        {}", summary.entries_added);
            println!("Entries skipped:      {}", summary.entries_skipped);
            println!("Transactions added:   {}", summary.transactions_added);
            println!("Transactions skipped: {}", summary.transactions_skipped);
            println!(
                "Capital replaced:     {}",
                if summary.capital_replaced { "Yes" } else { "No" }
            );
        }

        Commands::Config => {
            let config = journal.config();

            println!("\n=== Journal Configuration ===\n");
            println!("Database:        {}", config.database_url);
            println!("Recent Entries:  {}", config.recent_entries);
            println!("Default View:    {}", config.pnl_view);
        }
    }

    Ok(())
}

/// Print a Sunday-first month grid with P&L under each day.
fn print_calendar(grid: &CalendarMonth) {
    const CELL: usize = 11;

    println!("\n{:^width$}", grid.label, width = CELL * WEEKDAYS.len());
    println!("Month Total: ${:.2}", grid.month_total);
    println!(
        "Days Traded: {}\n",
        grid.days().filter(|d| d.pnl.is_some()).count()
    );

    for day in WEEKDAYS {
        print!("{:<CELL$}", day);
    }
    println!();

    for week in grid.weeks() {
        let mut numbers = String::new();
        let mut amounts = String::new();

        for cell in week {
            match cell {
                CalendarCell::Blank => {
                    numbers.push_str(&" ".repeat(CELL));
                    amounts.push_str(&" ".repeat(CELL));
                }
                CalendarCell::Day(day) => {
                    let marker = if day.is_today { "*" } else { "" };
                    numbers.push_str(&format!("{:<CELL$}", format!("{}{}", day.date.format("%-d"), marker)));

                    let amount = match (day.status(), day.pnl) {
                        (DayStatus::NoData, _) | (_, None) => String::new(),
                        (DayStatus::Profit, Some(pnl)) => format!("+{:.2}", pnl),
                        (DayStatus::Loss, Some(pnl)) => format!("{:.2}", pnl),
                    };
                    amounts.push_str(&format!("{:<CELL$}", amount));
                }
            }
        }

        println!("{}", numbers.trim_end());
        println!("{}", amounts.trim_end());
    }

    println!("\n* today");
    println!(
        "Previous: --month {}   Next: --month {}",
        grid.month.prev(),
        grid.month.next()
    );
}

/// Truncate a string with ellipsis if too long.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

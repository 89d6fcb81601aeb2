mod pages;
mod reports;
mod scrape;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "refurb")]
#[command(about = "Refurbished-computer price catalog")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract captured listing pages and merge them into the catalog.
    Scrape {
        /// Only this vendor (case-insensitive); all vendors when omitted.
        #[arg(long)]
        vendor: Option<String>,
        /// Override `REFURB_MAX_PAGES` for this run.
        #[arg(long)]
        max_pages: Option<usize>,
    },
    /// Parse one captured page and print the products as JSON.
    ParsePage {
        #[arg(long)]
        file: PathBuf,
        /// URL the page was captured from.
        #[arg(long)]
        url: String,
        #[arg(long)]
        vendor: Option<String>,
    },
    /// Write the dated price-history report.
    Report {
        /// Report date (YYYY-MM-DD); today when omitted.
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        #[arg(long)]
        history_dir: Option<PathBuf>,
    },
    /// Print cross-vendor comparison groups as JSON.
    Compare {
        /// Include products sold by a single vendor.
        #[arg(long)]
        all: bool,
    },
    /// Print per-vendor and per-brand product counts.
    Summary,
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = refurb_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Scrape { vendor, max_pages } => {
            scrape::run_scrape(&config, vendor.as_deref(), max_pages)?;
        }
        Commands::ParsePage { file, url, vendor } => {
            scrape::run_parse_page(&config, &file, &url, vendor.as_deref())?;
        }
        Commands::Report { date, history_dir } => {
            reports::run_report(&config, date, history_dir.as_deref())?;
        }
        Commands::Compare { all } => reports::run_compare(&config, all)?,
        Commands::Summary => reports::run_summary(&config)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests;

//! sheetpdf - Turn spreadsheet exports into signed PDF reports, and merge
//! PDF files.
//!
//! A conversion reads a CSV or Excel export, drops blank rows, projects the
//! rest onto a report's columns and lays the result out as an A4 report
//! with a title block, a paginated table and signature slots. Which columns,
//! layout and signatures a report gets is fixed by a [`profile::ReportProfile`].
//!
//! # Examples
//!
//! ## Convert
//!
//! ```no_run
//! use sheetpdf::profile::ReportProfile;
//! use sheetpdf::session::Session;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = Session::new(ReportProfile::jira());
//! session.config_mut().title = Some("Sprint 12".into());
//! session.load_source(Path::new("worklog.csv")).await?;
//!
//! let exported = session.export().await?;
//! std::fs::write(&exported.output_name, &exported.report.bytes)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Merge
//!
//! ```no_run
//! use sheetpdf::merge::{MergeQueue, Merger};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut queue = MergeQueue::new();
//! queue.add_files(&["cover.pdf", "report.pdf"]).await?;
//! queue.move_up(1);
//!
//! let result = Merger::new().merge_queue(&queue).await?;
//! println!("{} pages", result.statistics.total_pages);
//! # Ok(())
//! # }
//! ```

use std::env;
use std::sync::OnceLock;

use log::LevelFilter;

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod io;
pub mod layout;
pub mod merge;
pub mod output;
pub mod profile;
pub mod render;
pub mod report;
pub mod session;
pub mod table;
pub mod utils;
pub mod validation;

pub use error::{Result, SheetPdfError};

use crate::cli::{Cli, Command};
use crate::output::OutputFormatter;

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

static LOGGER: OnceLock<()> = OnceLock::new();

/// Install the `env_logger` backend once. `RUST_LOG` overrides the default
/// `sheetpdf=info` filter.
pub fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("sheetpdf", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

/// Run the parsed command line.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let formatter = OutputFormatter::new(cli.verbosity());
    formatter.debug(&format!("{NAME} v{VERSION}"));

    match &cli.command {
        Command::Convert(args) => commands::convert(args, &formatter).await,
        Command::Merge(args) => commands::merge(args, &formatter).await,
    }
}

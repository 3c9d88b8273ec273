//! sheetpdf - Convert spreadsheet exports to PDF reports and merge PDFs.

use std::process;

use clap::Parser;

use sheetpdf::SheetPdfError;
use sheetpdf::cli::Cli;
use sheetpdf::output::OutputFormatter;

#[tokio::main]
async fn main() {
    sheetpdf::init_logging();
    let cli = Cli::parse();
    let formatter = OutputFormatter::new(cli.verbosity());

    if let Err(err) = sheetpdf::run(cli).await {
        formatter.error(&format!("{err:#}"));
        let code = err
            .downcast_ref::<SheetPdfError>()
            .map_or(1, SheetPdfError::exit_code);
        process::exit(code);
    }
}

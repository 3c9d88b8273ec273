//! Subcommand execution.
//!
//! Each command wires a [`Session`] to the CLI arguments, reports progress
//! through the [`OutputFormatter`] and writes the result with the
//! [`OutputWriter`]. Errors carry `anyhow` context naming the step that
//! failed; the root cause stays a [`SheetPdfError`](crate::SheetPdfError)
//! so the binary can map it to an exit code.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::cli::{ConvertArgs, MergeArgs};
use crate::config::PdfConfig;
use crate::io::{OutputWriter, SourceReader, read_file};
use crate::output::{OutputFormatter, Verbosity};
use crate::profile::ReportProfile;
use crate::session::Session;
use crate::table::FieldMapping;
use crate::utils::{collect_paths_for_patterns, ensure_pdf_suffix, format_file_size};
use crate::validation::Validator;

/// Run `sheetpdf convert`.
pub async fn convert(args: &ConvertArgs, formatter: &OutputFormatter) -> Result<()> {
    let mut profile = ReportProfile::new(args.profile);
    if let Some(mapping_path) = &args.mapping {
        let text = tokio::fs::read_to_string(mapping_path)
            .await
            .with_context(|| format!("Reading mapping {}", mapping_path.display()))?;
        profile.mapping = Some(FieldMapping::from_json(&text)?);
        formatter.debug(&format!("Using field mapping from {}", mapping_path.display()));
    }

    let config = load_config(args, &profile).await?;
    let reader = args
        .delimiter
        .map(SourceReader::with_delimiter)
        .unwrap_or_default();
    let mut session = Session::new(profile).with_config(config).with_reader(reader);

    formatter.info(&format!("Loading {}", args.input.display()));
    let source = session.load_source(&args.input).await?;
    formatter.detail("Rows", &source.table.len().to_string());
    formatter.detail("Size", &format_file_size(source.file_size));
    if let Some(stats) = source.stats {
        formatter.info(&format!(
            "{} records • {} employees • {} dates",
            stats.total_records, stats.unique_employees, stats.distinct_dates
        ));
    }

    let exported = session.export().await?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| sibling(&args.input, &exported.output_name));

    formatter.debug(&format!(
        "{} row(s), {} page(s), {}",
        exported.report.rows,
        exported.report.page_count,
        exported.report.orientation
    ));

    let stats = OutputWriter::new()
        .overwrite(args.overwrite_mode())
        .save(exported.report.bytes, &output)
        .await?;

    formatter.success(&format!(
        "Created {} ({})",
        stats.output_path.display(),
        stats.format_file_size()
    ));
    formatter.detail("Write time", &format!("{:.2}s", stats.write_time.as_secs_f64()));
    Ok(())
}

async fn load_config(args: &ConvertArgs, profile: &ReportProfile) -> Result<PdfConfig> {
    let defaults = profile.default_config();
    let mut config = match &args.settings {
        Some(path) => PdfConfig::load(path, &defaults)
            .await
            .with_context(|| format!("Loading settings {}", path.display()))?,
        None => defaults,
    };
    args.apply_to(&mut config);

    for signature in &args.signature {
        let bytes = read_file(&signature.path)
            .await
            .with_context(|| format!("Reading signature for {:?}", signature.role))?;
        let signer = config.signatories.get_mut(signature.role);
        signer.image_path = Some(signature.path.clone());
        signer.image = Some(bytes);
    }

    Ok(config)
}

fn sibling(input: &Path, name: &str) -> PathBuf {
    match input.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(name),
        _ => PathBuf::from(name),
    }
}

/// Run `sheetpdf merge`.
pub async fn merge(args: &MergeArgs, formatter: &OutputFormatter) -> Result<()> {
    let paths = collect_paths_for_patterns(&args.inputs)?;

    let mut session = Session::new(ReportProfile::generic());
    session.queue_mut().add_files(paths.as_slice()).await?;

    for &position in &args.move_up {
        if !session.queue_mut().move_up(position.saturating_sub(1)) {
            formatter.warning(&format!("Cannot move position {position} up"));
        }
    }
    for &position in &args.move_down {
        if !session.queue_mut().move_down(position.saturating_sub(1)) {
            formatter.warning(&format!("Cannot move position {position} down"));
        }
    }

    formatter.section("Merge order");
    let validator = Validator::new();
    for (idx, entry) in session.queue().entries().iter().enumerate() {
        formatter.list_item(idx + 1, &format!("{} ({})", entry.name, entry.size_label()));
        if formatter.verbosity() == Verbosity::Verbose {
            match validator.inspect_pdf(&entry.path).await {
                Ok(info) => {
                    formatter.detail("Pages", &info.page_count.to_string());
                    formatter.detail("Version", &info.version);
                    if let Some((w, h)) = info.page_dimensions {
                        formatter.detail("Page size", &format!("{w:.1} x {h:.1} pts"));
                    }
                }
                Err(err) => formatter.warning(&err.to_string()),
            }
        }
    }

    let result = session.merge().await?;
    formatter.info(&format!(
        "Merged {} file(s) into {} pages in {:.2}s",
        result.statistics.files_merged,
        result.statistics.total_pages,
        result.statistics.merge_time.as_secs_f64()
    ));

    let output = PathBuf::from(ensure_pdf_suffix(&args.output));
    let stats = OutputWriter::new()
        .overwrite(args.overwrite_mode())
        .save(result.bytes, &output)
        .await?;

    formatter.success(&format!(
        "Created {} ({})",
        stats.output_path.display(),
        stats.format_file_size()
    ));
    formatter.detail("Input size", &result.statistics.format_input_size());
    formatter.detail(
        "Load time",
        &format!("{:.2}s", result.statistics.load_time.as_secs_f64()),
    );

    session.clear_queue();
    Ok(())
}

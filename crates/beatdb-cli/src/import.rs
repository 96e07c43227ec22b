//! `import` command: load a CSV file into the stores table.

use beatdb_core::{ImportSummary, ParsedImport};

/// Parse `raw` and print what an import would do, without a database.
///
/// # Errors
///
/// Returns an error when the CSV is empty or has no data rows.
pub(crate) fn run_dry_run(raw: &str) -> anyhow::Result<()> {
    let parsed = beatdb_core::parse_csv(raw)?;
    println!("{}", format_dry_run(&parsed));
    Ok(())
}

/// Import `raw` into the database and print the resulting summary.
///
/// Row-level failures are reported in the summary, not returned as errors.
///
/// # Errors
///
/// Returns an error when the CSV is empty or has no data rows.
pub(crate) async fn run_import(pool: &sqlx::PgPool, raw: &str) -> anyhow::Result<ImportSummary> {
    let repo = beatdb_db::PgStoreRepository::new(pool.clone());
    let summary = beatdb_core::import_csv(&repo, raw).await?;
    println!("{}", format_summary(&summary));
    Ok(summary)
}

pub(crate) fn format_dry_run(parsed: &ParsedImport) -> String {
    let invalid = parsed.invalid_rows();
    let duplicates = parsed.in_file_duplicates();
    let mut out = format!(
        "dry-run: {} row(s), {} valid, {invalid} invalid, {duplicates} duplicate(s) within file",
        parsed.total_rows(),
        parsed.total_rows() - invalid,
    );
    if !parsed.header_map.has_coordinates() {
        out.push_str("\nwarning: no latitude/longitude columns recognised; rows default to 0,0");
    }
    out
}

pub(crate) fn format_summary(summary: &ImportSummary) -> String {
    let mut out = format!(
        "imported {} of {} row(s), skipped {}",
        summary.inserted, summary.total_rows, summary.skipped
    );
    for failure in &summary.errors {
        out.push_str(&format!("\n  row {}: {}", failure.row, failure.reason));
    }
    if summary.error_count > summary.errors.len() {
        out.push_str(&format!(
            "\n  ... and {} more error(s)",
            summary.error_count - summary.errors.len()
        ));
    }
    out
}

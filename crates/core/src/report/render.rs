//! Console rendering of a run report.

use std::fmt::Write;
use std::io;

use super::table::Table;
use super::types::{FileReport, RunReport};

const BANNER: &str = "================= ORDER STATUS SUMMARY =================";

/// Render the full report: one table per order file, then the summary.
pub fn render_report(report: &RunReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", BANNER);

    if report.files.is_empty() && report.skipped_files.is_empty() {
        let _ = writeln!(out, "\nNo order files found.");
    }

    for file in &report.files {
        let _ = writeln!(out, "\n=== {} ===", file.filename);
        out.push_str(&file_table(file).render());
        for skipped in &file.skipped_rows {
            let _ = writeln!(out, "  skipped line {}: {}", skipped.line, skipped.reason);
        }
    }

    if !report.skipped_files.is_empty() {
        let _ = writeln!(out, "\nUnreadable order files:");
        for skipped in &report.skipped_files {
            let _ = writeln!(out, "  {}: {}", skipped.filename, skipped.reason);
        }
    }

    out.push_str(&render_summary(report));
    out
}

/// Write the rendered report to stdout.
pub fn print_report(report: &RunReport) -> io::Result<()> {
    use std::io::Write as _;
    let mut stdout = io::stdout().lock();
    stdout.write_all(render_report(report).as_bytes())?;
    stdout.flush()
}

/// Build the table for one file. Optional columns appear only when at
/// least one row has a value for them.
fn file_table(file: &FileReport) -> Table {
    let results = &file.results;
    let has_secure_ids = results.iter().any(|r| !r.record.secure_id.is_empty());
    let has_cewe_ids = results.iter().any(|r| !r.record.cewe_order_id.is_empty());
    let has_output_paths = results.iter().any(|r| !r.record.output_path.is_empty());
    let has_downloads = results.iter().any(|r| r.download.is_some());

    let mut headers = vec!["Order Number", "Shop Number", "Identifier"];
    if has_secure_ids {
        headers.push("Secure ID");
    }
    if has_cewe_ids {
        headers.push("CEWE Order ID");
    }
    if has_output_paths {
        headers.push("Output Path");
    }
    headers.push("Status");
    if has_downloads {
        headers.push("Download");
    }

    let mut table = Table::new(headers);
    for result in results {
        let record = &result.record;
        let mut row = vec![
            record.order_number.clone(),
            record.shop_number.clone(),
            record.identifier.clone(),
        ];
        if has_secure_ids {
            row.push(record.secure_id.clone());
        }
        if has_cewe_ids {
            row.push(record.cewe_order_id.clone());
        }
        if has_output_paths {
            row.push(record.output_path.clone());
        }
        row.push(result.outcome.display());
        if has_downloads {
            row.push(
                result
                    .download
                    .as_ref()
                    .map(|d| d.display())
                    .unwrap_or_default(),
            );
        }
        table.add_row(row);
    }
    table
}

fn render_summary(report: &RunReport) -> String {
    let summary = report.summary();
    let mut out = String::new();
    let _ = writeln!(out, "\n--- Totals ---");
    let _ = writeln!(out, "Files:            {}", summary.files);
    if summary.unreadable_files > 0 {
        let _ = writeln!(out, "Unreadable files: {}", summary.unreadable_files);
    }
    let _ = writeln!(out, "Orders:           {}", summary.orders);
    if summary.skipped_rows > 0 {
        let _ = writeln!(out, "Skipped rows:     {}", summary.skipped_rows);
    }
    let _ = writeln!(out, "Ready for pickup: {}", summary.ready_for_pickup);
    let _ = writeln!(out, "Status errors:    {}", summary.status_errors);
    if report.downloads_enabled {
        let _ = writeln!(
            out,
            "Downloads:        {} downloaded, {} already present, {} failed",
            summary.downloaded, summary.already_present, summary.download_failures
        );
    }
    out
}

//! `sitecheck export`: write a report file.

use crate::cli::output::{self, Styled};
use crate::cli::Context;
use crate::export::{write_report, ExportFormat, Report};
use anyhow::{Context as _, Result};
use std::path::Path;

/// Export the selected website. `out` may be a file or a directory and
/// defaults to the configured export directory.
pub fn run(ctx: &Context, format: ExportFormat, out: Option<&Path>) -> Result<()> {
    let report = Report::build(&ctx.session)?;
    let target = match out {
        Some(path) => path.to_path_buf(),
        None => {
            let dir = ctx.settings.export_dir();
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
            dir
        }
    };
    let path = write_report(&report, format, &target)?;

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "path": path,
            "format": format,
            "pages": report.pages.len(),
            "results": report.results.len(),
            "issues": report.issues.len(),
        }));
    } else if !output::is_quiet() {
        let s = Styled::new();
        eprintln!(
            "  {} Wrote {} ({} pages, {} results, {} issues).",
            s.ok_sym(),
            s.bold(&path.display().to_string()),
            report.pages.len(),
            report.results.len(),
            report.issues.len()
        );
    }
    Ok(())
}

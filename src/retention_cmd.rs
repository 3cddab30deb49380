//! `mlentory purge` and `mlentory list`.
//!
//! `purge` always prints the full preview (every folder, its size, and the
//! total) before asking for confirmation, and always prints a
//! succeeded/failed summary at the end. Listing and preview go to stdout;
//! logs go to stderr.

use anyhow::Result;
use dialoguer::Confirm;
use std::path::Path;

use crate::retention::{
    list_execution_folders, preview, run_sweep, AutoConfirm, ConfirmGate, FsRemover, Preview,
    SweepOutcome, SweepRequest,
};
use crate::stage::{validate_platform, StageSelector};

/// Interactive yes/no prompt on the terminal.
///
/// Declines without prompting when stdin is not a TTY, so an unattended
/// run never blocks and never deletes without `--no-confirm`.
pub struct TerminalGate;

impl ConfirmGate for TerminalGate {
    fn confirm(&self, preview: &Preview) -> Result<bool> {
        if !atty::is(atty::Stream::Stdin) {
            eprintln!("stdin is not a terminal; re-run with --no-confirm to delete without prompting");
            return Ok(false);
        }
        let prompt = format!(
            "Delete {} folder{} ({})?",
            preview.selected_count(),
            if preview.selected_count() == 1 { "" } else { "s" },
            format_bytes(preview.total_bytes())
        );
        Ok(Confirm::new().with_prompt(prompt).default(false).interact()?)
    }
}

/// Run a retention sweep. Returns the process exit code.
pub fn run_purge(
    data_root: &Path,
    platform: &str,
    stage: &str,
    date: &str,
    no_confirm: bool,
) -> Result<u8> {
    let request = SweepRequest::parse(data_root, platform, stage, date)?;
    let preview = preview(&request)?;

    print_preview(&preview);

    let gate: &dyn ConfirmGate = if no_confirm { &AutoConfirm } else { &TerminalGate };
    let outcome = run_sweep(preview, gate, &FsRemover)?;

    match &outcome {
        SweepOutcome::Cancelled { .. } => {
            println!("cancelled, nothing deleted");
        }
        SweepOutcome::Completed(report) => {
            println!();
            println!("purge {}", platform);
            for stage in &report.stages {
                println!(
                    "  {:<14} found: {}  deleted: {}  failed: {}",
                    stage.stage.dir_name(),
                    stage.found,
                    stage.deletion.success_count(),
                    stage.deletion.failure_count()
                );
            }
            println!("  total found: {}", report.found());
            println!("  succeeded: {}", report.succeeded());
            println!("  failed: {}", report.failed());
            for failure in report.failures() {
                println!("    {}  ({})", failure.path.display(), failure.error);
            }
            println!("{}", if report.is_success() { "ok" } else { "completed with errors" });
        }
    }

    Ok(outcome.exit_code())
}

fn print_preview(preview: &Preview) {
    println!(
        "purge {}: folders dated before {}",
        preview.platform, preview.threshold
    );
    for stage in &preview.stages {
        println!();
        println!(
            "  {}  ({} execution folder{}, {} selected)",
            stage.platform_dir.display(),
            stage.listed,
            if stage.listed == 1 { "" } else { "s" },
            stage.selected.len()
        );
        for entry in &stage.selected {
            println!(
                "    {:<32} {:>10}",
                entry.folder.name,
                format_bytes(entry.size_bytes)
            );
        }
    }
    println!();
    println!(
        "  to delete: {} folders, {}",
        preview.selected_count(),
        format_bytes(preview.total_bytes())
    );
}

/// Print every execution folder for `platform`, per stage.
pub fn run_list(data_root: &Path, platform: &str, stage: &str) -> Result<()> {
    let selector: StageSelector = stage.parse()?;
    validate_platform(platform)?;

    println!("{:<14} {:<32} {:<12} {:>10}", "STAGE", "FOLDER", "DATE", "SIZE");
    for stage in selector.stages() {
        let dir = stage.platform_dir(data_root, platform);
        for folder in list_execution_folders(&dir)? {
            println!(
                "{:<14} {:<32} {:<12} {:>10}",
                stage.dir_name(),
                folder.name,
                folder.date,
                format_bytes(crate::retention::folder_size(&folder.path))
            );
        }
    }
    Ok(())
}

/// Format a byte count as a human-readable string.
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_bytes_units() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.00 GB");
    }
}

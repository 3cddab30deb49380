//! Date-threshold retention for stage output.
//!
//! Execution folders under `{data_root}/{stage}/{platform}` are listed,
//! filtered by the date embedded in their names, previewed, and then
//! (after a confirmation decision) removed.
//!
//! # Flow
//!
//! ```text
//! SweepRequest ──preview()──▶ Preview ──confirm()──▶ ConfirmedSweep ──execute()──▶ SweepReport
//!                                │
//!                                └──cancel()──▶ SweepOutcome::Cancelled
//! ```
//!
//! The preview (every selected folder with its size, plus the total) is
//! always computed before anything is deleted. Deletion is per folder and
//! failure-isolated: one folder failing to delete is recorded in the
//! report and the sweep moves on.
//!
//! A folder is selected iff its date is strictly before the threshold.
//! Names that are not execution folders are never selected.
//!
//! No two sweeps should run against the same `(stage, platform)` subtree
//! at once; a preview taken by one goes stale when the other deletes.

use chrono::NaiveDate;
use mlentory_core::execution::parse_execution_folder_name;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

use crate::stage::{validate_platform, Stage, StageSelector};

/// Input problems detected before any filesystem mutation.
#[derive(Error, Debug)]
pub enum RetentionError {
    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("unknown stage '{0}'. Must be raw, normalized, rdf, or all.")]
    UnknownStage(String),

    #[error("data directory does not exist: {}", .0.display())]
    MissingDataRoot(PathBuf),

    #[error("platform must not be empty")]
    EmptyPlatform,

    #[error("invalid platform '{0}': must be a single directory name")]
    InvalidPlatform(String),

    #[error("failed to read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Parse a `YYYY-MM-DD` threshold date.
pub fn parse_threshold(date: &str) -> Result<NaiveDate, RetentionError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| RetentionError::InvalidDate(date.to_string()))
}

/// A directory whose name matched the execution-folder pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionFolder {
    pub path: PathBuf,
    pub name: String,
    pub date: NaiveDate,
}

/// Execution folders directly under `platform_dir`, oldest first.
///
/// Non-directories and directories whose names do not match the pattern
/// are skipped. A missing `platform_dir` yields an empty list.
pub fn list_execution_folders(platform_dir: &Path) -> Result<Vec<ExecutionFolder>, RetentionError> {
    let unreadable = |source: io::Error| RetentionError::Unreadable {
        path: platform_dir.to_path_buf(),
        source,
    };

    if !platform_dir.exists() {
        tracing::info!(path = %platform_dir.display(), "directory not found, nothing to sweep");
        return Ok(Vec::new());
    }

    let mut folders = Vec::new();
    for entry in std::fs::read_dir(platform_dir).map_err(unreadable)? {
        let entry = entry.map_err(unreadable)?;
        if !entry.file_type().map_err(unreadable)?.is_dir() {
            continue;
        }
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        match parse_execution_folder_name(&name) {
            Ok(stamp) => folders.push(ExecutionFolder {
                path: entry.path(),
                date: stamp.date(),
                name,
            }),
            Err(_) => {
                tracing::debug!(path = %entry.path().display(), "ignoring non-execution directory");
            }
        }
    }

    folders.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.name.cmp(&b.name)));
    Ok(folders)
}

/// Folders dated strictly before `threshold`.
pub fn select_for_deletion(folders: &[ExecutionFolder], threshold: NaiveDate) -> Vec<ExecutionFolder> {
    folders
        .iter()
        .filter(|f| f.date < threshold)
        .cloned()
        .collect()
}

/// Total size in bytes of all files under `path`. Unreadable entries
/// count as zero.
pub fn folder_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

/// Removes one folder tree.
pub trait FolderRemover {
    fn remove(&self, path: &Path) -> io::Result<()>;
}

/// Recursive removal on the real filesystem.
pub struct FsRemover;

impl FolderRemover for FsRemover {
    fn remove(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_dir_all(path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionFailure {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionReport {
    pub succeeded: Vec<PathBuf>,
    pub failed: Vec<DeletionFailure>,
}

impl DeletionReport {
    pub fn success_count(&self) -> usize {
        self.succeeded.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }
}

/// Attempt removal of every folder. Failures are recorded, never raised.
pub fn delete_all(selected: &[ExecutionFolder], remover: &dyn FolderRemover) -> DeletionReport {
    let mut report = DeletionReport::default();
    for folder in selected {
        match remover.remove(&folder.path) {
            Ok(()) => {
                tracing::info!(path = %folder.path.display(), "deleted execution folder");
                report.succeeded.push(folder.path.clone());
            }
            Err(e) => {
                tracing::error!(path = %folder.path.display(), error = %e, "failed to delete execution folder");
                report.failed.push(DeletionFailure {
                    path: folder.path.clone(),
                    error: e.to_string(),
                });
            }
        }
    }
    report
}

/// Validated inputs for one sweep.
#[derive(Debug, Clone)]
pub struct SweepRequest {
    pub data_root: PathBuf,
    pub platform: String,
    pub stages: StageSelector,
    pub threshold: NaiveDate,
}

impl SweepRequest {
    pub fn new(
        data_root: impl Into<PathBuf>,
        platform: impl Into<String>,
        stages: StageSelector,
        threshold: NaiveDate,
    ) -> Result<Self, RetentionError> {
        let data_root = data_root.into();
        let platform = platform.into();
        validate_platform(&platform)?;
        if !data_root.is_dir() {
            return Err(RetentionError::MissingDataRoot(data_root));
        }
        Ok(Self {
            data_root,
            platform,
            stages,
            threshold,
        })
    }

    /// Parse the raw CLI strings for stage and date, then validate.
    pub fn parse(
        data_root: impl Into<PathBuf>,
        platform: &str,
        stage: &str,
        date: &str,
    ) -> Result<Self, RetentionError> {
        let stages: StageSelector = stage.parse()?;
        let threshold = parse_threshold(date)?;
        Self::new(data_root, platform, stages, threshold)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewEntry {
    pub folder: ExecutionFolder,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagePreview {
    pub stage: Stage,
    pub platform_dir: PathBuf,
    /// Execution folders present, selected or not.
    pub listed: usize,
    pub selected: Vec<PreviewEntry>,
}

impl StagePreview {
    pub fn selected_bytes(&self) -> u64 {
        self.selected.iter().map(|e| e.size_bytes).sum()
    }
}

/// What a sweep would delete. Nothing has been touched yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub platform: String,
    pub threshold: NaiveDate,
    pub stages: Vec<StagePreview>,
}

impl Preview {
    pub fn selected_count(&self) -> usize {
        self.stages.iter().map(|s| s.selected.len()).sum()
    }

    pub fn total_bytes(&self) -> u64 {
        self.stages.iter().map(StagePreview::selected_bytes).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.selected_count() == 0
    }

    pub fn confirm(self) -> ConfirmedSweep {
        ConfirmedSweep { preview: self }
    }

    pub fn cancel(self) -> SweepOutcome {
        SweepOutcome::Cancelled { preview: self }
    }
}

/// Build the preview for `request`: list and select per stage, in order.
pub fn preview(request: &SweepRequest) -> Result<Preview, RetentionError> {
    let mut stages = Vec::new();
    for stage in request.stages.stages() {
        let platform_dir = stage.platform_dir(&request.data_root, &request.platform);
        let listed = list_execution_folders(&platform_dir)?;
        let selected = select_for_deletion(&listed, request.threshold)
            .into_iter()
            .map(|folder| PreviewEntry {
                size_bytes: folder_size(&folder.path),
                folder,
            })
            .collect();
        stages.push(StagePreview {
            stage,
            platform_dir,
            listed: listed.len(),
            selected,
        });
    }
    Ok(Preview {
        platform: request.platform.clone(),
        threshold: request.threshold,
        stages,
    })
}

/// A preview the caller has agreed to delete.
#[derive(Debug)]
pub struct ConfirmedSweep {
    preview: Preview,
}

impl ConfirmedSweep {
    pub fn preview(&self) -> &Preview {
        &self.preview
    }

    /// Delete every selected folder, stage by stage.
    pub fn execute(self, remover: &dyn FolderRemover) -> SweepReport {
        let stages = self
            .preview
            .stages
            .into_iter()
            .map(|stage_preview| {
                let folders: Vec<ExecutionFolder> = stage_preview
                    .selected
                    .into_iter()
                    .map(|entry| entry.folder)
                    .collect();
                let deletion = delete_all(&folders, remover);
                StageReport {
                    stage: stage_preview.stage,
                    found: folders.len(),
                    deletion,
                }
            })
            .collect();
        SweepReport { stages }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub stage: Stage,
    pub found: usize,
    pub deletion: DeletionReport,
}

/// Accumulated outcome of a completed sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub stages: Vec<StageReport>,
}

impl SweepReport {
    pub fn found(&self) -> usize {
        self.stages.iter().map(|s| s.found).sum()
    }

    pub fn succeeded(&self) -> usize {
        self.stages.iter().map(|s| s.deletion.success_count()).sum()
    }

    pub fn failed(&self) -> usize {
        self.stages.iter().map(|s| s.deletion.failure_count()).sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = &DeletionFailure> {
        self.stages.iter().flat_map(|s| s.deletion.failed.iter())
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

#[derive(Debug)]
pub enum SweepOutcome {
    Cancelled { preview: Preview },
    Completed(SweepReport),
}

impl SweepOutcome {
    /// Process exit code: 1 if any deletion failed, else 0.
    pub fn exit_code(&self) -> u8 {
        match self {
            SweepOutcome::Completed(report) if !report.is_success() => 1,
            _ => 0,
        }
    }
}

/// Yes/no decision on a preview.
pub trait ConfirmGate {
    fn confirm(&self, preview: &Preview) -> anyhow::Result<bool>;
}

/// Always says yes (`--no-confirm`).
pub struct AutoConfirm;

impl ConfirmGate for AutoConfirm {
    fn confirm(&self, _preview: &Preview) -> anyhow::Result<bool> {
        Ok(true)
    }
}

/// Drive a preview through the gate and, if confirmed, delete.
///
/// An empty preview completes immediately without consulting the gate.
pub fn run_sweep(
    preview: Preview,
    gate: &dyn ConfirmGate,
    remover: &dyn FolderRemover,
) -> anyhow::Result<SweepOutcome> {
    if preview.is_empty() {
        let stages = preview
            .stages
            .iter()
            .map(|s| StageReport {
                stage: s.stage,
                found: 0,
                deletion: DeletionReport::default(),
            })
            .collect();
        return Ok(SweepOutcome::Completed(SweepReport { stages }));
    }

    if !gate.confirm(&preview)? {
        tracing::info!(selected = preview.selected_count(), "sweep cancelled");
        return Ok(preview.cancel());
    }

    let report = preview.confirm().execute(remover);
    tracing::info!(
        found = report.found(),
        succeeded = report.succeeded(),
        failed = report.failed(),
        "sweep complete"
    );
    Ok(SweepOutcome::Completed(report))
}

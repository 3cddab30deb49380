//! Stage directory layout.
//!
//! Pipeline output lives under
//! `{data_root}/{stage}/{platform}/{execution_folder}`, where stage is one
//! of the fixed, ordered directories `1_raw`, `2_normalized`, `3_rdf`.
//! This module names those paths and creates fresh execution folders for
//! pipeline runs; retention lives in [`crate::retention`].

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use mlentory_core::execution::execution_folder_name;
use serde::Serialize;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use uuid::Uuid;

use crate::retention::RetentionError;

/// An ordered pipeline phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Raw,
    Normalized,
    Rdf,
}

impl Stage {
    /// All stages in pipeline order.
    pub const ALL: [Stage; 3] = [Stage::Raw, Stage::Normalized, Stage::Rdf];

    pub fn dir_name(&self) -> &'static str {
        match self {
            Stage::Raw => "1_raw",
            Stage::Normalized => "2_normalized",
            Stage::Rdf => "3_rdf",
        }
    }

    /// `{data_root}/{stage}/{platform}`.
    pub fn platform_dir(&self, data_root: &Path, platform: &str) -> PathBuf {
        data_root.join(self.dir_name()).join(platform)
    }
}

/// Check that `platform` names exactly one directory below a stage.
///
/// Absolute paths, `.`, `..` and anything containing a separator are
/// rejected so that `{data_root}/{stage}/{platform}` never leaves the
/// data root.
pub fn validate_platform(platform: &str) -> Result<&str, RetentionError> {
    if platform.trim().is_empty() {
        return Err(RetentionError::EmptyPlatform);
    }
    let mut components = Path::new(platform).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) if name == platform => Ok(platform),
        _ => Err(RetentionError::InvalidPlatform(platform.to_string())),
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl FromStr for Stage {
    type Err = RetentionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "raw" | "1_raw" => Ok(Stage::Raw),
            "normalized" | "2_normalized" => Ok(Stage::Normalized),
            "rdf" | "3_rdf" => Ok(Stage::Rdf),
            other => Err(RetentionError::UnknownStage(other.to_string())),
        }
    }
}

/// A single stage or all three in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageSelector {
    One(Stage),
    All,
}

impl StageSelector {
    pub fn stages(&self) -> Vec<Stage> {
        match self {
            StageSelector::One(stage) => vec![*stage],
            StageSelector::All => Stage::ALL.to_vec(),
        }
    }
}

impl FromStr for StageSelector {
    type Err = RetentionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(StageSelector::All);
        }
        s.parse().map(StageSelector::One)
    }
}

/// Create a new, empty execution folder for a run started at `started_at`.
pub fn create_execution_folder(
    data_root: &Path,
    stage: Stage,
    platform: &str,
    started_at: DateTime<Utc>,
) -> Result<PathBuf> {
    validate_platform(platform)?;
    let seed = format!("{}:{}:{}", stage, platform, Uuid::new_v4());
    let dir = stage
        .platform_dir(data_root, platform)
        .join(execution_folder_name(started_at, &seed));
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create execution folder: {}", dir.display()))?;
    tracing::info!(stage = %stage, platform, path = %dir.display(), "created execution folder");
    Ok(dir)
}

/// Write `value` as pretty JSON to `{folder}/{file_name}`.
pub fn write_stage_output<T: Serialize>(folder: &Path, file_name: &str, value: &T) -> Result<PathBuf> {
    let path = folder.join(file_name);
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(&path, json)
        .with_context(|| format!("Failed to write stage output: {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mlentory_core::execution::parse_execution_folder_name;
    use tempfile::TempDir;

    #[test]
    fn stage_names_and_order() {
        let names: Vec<&str> = Stage::ALL.iter().map(Stage::dir_name).collect();
        assert_eq!(names, vec!["1_raw", "2_normalized", "3_rdf"]);
    }

    #[test]
    fn selector_parses_short_and_dir_names() {
        assert_eq!("raw".parse::<StageSelector>().unwrap(), StageSelector::One(Stage::Raw));
        assert_eq!(
            "3_rdf".parse::<StageSelector>().unwrap(),
            StageSelector::One(Stage::Rdf)
        );
        assert_eq!("all".parse::<StageSelector>().unwrap().stages(), Stage::ALL.to_vec());
        assert!(matches!(
            "final".parse::<StageSelector>(),
            Err(RetentionError::UnknownStage(_))
        ));
    }

    #[test]
    fn created_folder_matches_naming_pattern() {
        let tmp = TempDir::new().unwrap();
        let at = Utc.with_ymd_and_hms(2025, 6, 1, 12, 30, 0).unwrap();
        let dir = create_execution_folder(tmp.path(), Stage::Normalized, "OpenML", at).unwrap();

        assert!(dir.is_dir());
        assert_eq!(dir.parent().unwrap(), tmp.path().join("2_normalized").join("OpenML"));
        let name = dir.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("2025-06-01_12-30-00_"));
        assert!(parse_execution_folder_name(name).is_ok());
    }

    #[test]
    fn platform_must_be_a_single_directory_name() {
        assert_eq!(validate_platform("OpenML").unwrap(), "OpenML");
        assert_eq!(validate_platform("AI4Life").unwrap(), "AI4Life");
        assert!(matches!(validate_platform(""), Err(RetentionError::EmptyPlatform)));
        for bad in ["/tmp/elsewhere", "../..", "..", ".", "OpenML/..", "a/b", "./OpenML", "OpenML/"] {
            assert!(
                matches!(validate_platform(bad), Err(RetentionError::InvalidPlatform(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn execution_folder_refuses_escaping_platform() {
        let tmp = TempDir::new().unwrap();
        let data_root = tmp.path().join("data");
        let outside = tmp.path().join("outside");
        let at = Utc.with_ymd_and_hms(2025, 6, 1, 12, 30, 0).unwrap();

        assert!(create_execution_folder(&data_root, Stage::Raw, outside.to_str().unwrap(), at).is_err());
        assert!(create_execution_folder(&data_root, Stage::Raw, "../..", at).is_err());
        assert!(!outside.exists());
        assert!(!data_root.exists());
    }

    #[test]
    fn writes_pretty_json() {
        let tmp = TempDir::new().unwrap();
        let path = write_stage_output(tmp.path(), "out.json", &vec!["a", "b"]).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert_eq!(
            serde_json::from_str::<Vec<String>>(&content).unwrap(),
            vec!["a", "b"]
        );
    }
}

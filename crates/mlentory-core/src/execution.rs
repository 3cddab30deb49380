//! Execution-folder naming.
//!
//! Each pipeline run writes its output for one platform and stage into a
//! folder named `YYYY-MM-DD_HH-MM-SS_<8 hex>`. The date embedded in the
//! name is what retention compares against; names that do not match the
//! pattern exactly (or carry an impossible date) are not execution
//! folders and must never be touched.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::error::CoreError;

static FOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{4}-[0-9]{2}-[0-9]{2}_[0-9]{2}-[0-9]{2}-[0-9]{2})_([a-f0-9]{8})$")
        .expect("execution folder pattern is valid")
});

const STAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Date, time, and short hash recovered from a folder name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionStamp {
    pub started_at: NaiveDateTime,
    pub short_hash: String,
}

impl ExecutionStamp {
    pub fn date(&self) -> NaiveDate {
        self.started_at.date()
    }
}

/// Name for a run started at `started_at`. The suffix is the first eight
/// hex chars of SHA-256 over `seed`.
pub fn execution_folder_name(started_at: DateTime<Utc>, seed: &str) -> String {
    let digest = hex::encode(Sha256::digest(seed.as_bytes()));
    format!("{}_{}", started_at.format(STAMP_FORMAT), &digest[..8])
}

pub fn parse_execution_folder_name(name: &str) -> Result<ExecutionStamp, CoreError> {
    let invalid = || CoreError::InvalidExecutionFolder(name.to_string());
    let caps = FOLDER_RE.captures(name).ok_or_else(invalid)?;
    let started_at =
        NaiveDateTime::parse_from_str(&caps[1], STAMP_FORMAT).map_err(|_| invalid())?;
    Ok(ExecutionStamp {
        started_at,
        short_hash: caps[2].to_string(),
    })
}

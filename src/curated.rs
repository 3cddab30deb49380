//! Curated definition loading.
//!
//! Reads a human-reviewed CSV of keyword (or license) definitions into an
//! immutable [`CuratedTable`]. The table is loaded once, before collection
//! starts, and then only read.
//!
//! Required columns: `keyword`, `definition`, `aliases`. An optional
//! `source_url` column is carried through. `aliases` may be a plain value
//! or an encoded list (`"['ml', 'machine learning']"`).
//!
//! A missing file is not an error: the collector simply runs unenriched.

use anyhow::{Context, Result};
use mlentory_core::curated::CuratedTable;
use mlentory_core::identity::make_id;
use mlentory_core::models::{EntityKind, EntityRecord};
use mlentory_core::tags::TagValue;
use std::path::Path;

/// Extraction method stamped on curated records.
pub const CURATED_METHOD: &str = "curated reference";

/// Load the curated table at `path`, or an empty table when `path` is
/// `None` or does not exist.
pub fn load_curated(path: Option<&Path>, kind: EntityKind, platform: &str) -> Result<CuratedTable> {
    let Some(path) = path else {
        tracing::info!(%kind, "no curated source configured, collecting unenriched");
        return Ok(CuratedTable::empty());
    };
    if !path.exists() {
        tracing::info!(
            %kind,
            path = %path.display(),
            "curated source not found, collecting unenriched"
        );
        return Ok(CuratedTable::empty());
    }

    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open curated CSV: {}", path.display()))?;
    let headers = reader.headers()?.clone();

    let column = |name: &str| headers.iter().position(|h| h.trim() == name);
    let required = |name: &str| {
        column(name).with_context(|| {
            format!(
                "curated CSV {} is missing required column '{}'",
                path.display(),
                name
            )
        })
    };
    let keyword_col = required("keyword")?;
    let definition_col = required("definition")?;
    let aliases_col = required("aliases")?;
    let source_col = column("source_url");

    let mut records = Vec::new();
    for (idx, row) in reader.records().enumerate() {
        let row = row.with_context(|| format!("Failed to read curated row {}", idx + 1))?;
        let field = |col: usize| row.get(col).map(str::trim).unwrap_or_default();

        let keyword = field(keyword_col);
        if keyword.is_empty() {
            tracing::warn!(row = idx + 1, path = %path.display(), "skipping curated row without keyword");
            continue;
        }

        let definition = field(definition_col);
        let source_url = source_col.map(field).filter(|s| !s.is_empty());

        records.push(EntityRecord {
            name: keyword.to_string(),
            id: make_id(kind.as_str(), keyword, Some(platform)),
            entity_type: kind,
            platform: platform.to_string(),
            enriched: true,
            definition: (!definition.is_empty()).then(|| definition.to_string()),
            aliases: parse_aliases(field(aliases_col)),
            source_url: source_url.map(str::to_string),
            extraction_method: CURATED_METHOD.to_string(),
            confidence: 1.0,
        });
    }

    let table = CuratedTable::from_records(records);
    tracing::info!(
        %kind,
        path = %path.display(),
        entries = table.len(),
        "loaded curated definitions"
    );
    Ok(table)
}

fn parse_aliases(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    TagValue::parse("aliases", raw)
        .into_scalars()
        .into_iter()
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_csv(content: &str) -> (TempDir, std::path::PathBuf) {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("curated.csv");
        std::fs::write(&path, content).unwrap();
        (tmp, path)
    }

    #[test]
    fn missing_file_is_empty_table() {
        let tmp = TempDir::new().unwrap();
        let table = load_curated(
            Some(&tmp.path().join("nope.csv")),
            EntityKind::Keyword,
            "OpenML",
        )
        .unwrap();
        assert!(table.is_empty());
        assert!(load_curated(None, EntityKind::Keyword, "OpenML")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn loads_rows_as_enriched_records() {
        let (_tmp, path) = write_csv(
            "keyword,definition,aliases,source_url\n\
             segmentation,Partitioning an image into regions.,\"['image segmentation', 'semantic segmentation']\",https://example.org/seg\n\
             tabular,,,\n",
        );
        let table = load_curated(Some(&path), EntityKind::Keyword, "OpenML").unwrap();
        assert_eq!(table.len(), 2);

        let seg = table.get("segmentation").unwrap();
        assert!(seg.enriched);
        assert_eq!(seg.extraction_method, CURATED_METHOD);
        assert_eq!(seg.id, make_id("Keyword", "segmentation", Some("OpenML")));
        assert_eq!(
            seg.aliases,
            vec!["image segmentation", "semantic segmentation"]
        );
        assert_eq!(seg.source_url.as_deref(), Some("https://example.org/seg"));

        let tab = table.get("tabular").unwrap();
        assert!(tab.definition.is_none());
        assert!(tab.aliases.is_empty());
        assert!(tab.source_url.is_none());
    }

    #[test]
    fn blank_keywords_skipped_and_first_duplicate_wins() {
        let (_tmp, path) = write_csv(
            "keyword,definition,aliases\n\
             ,orphan,\n\
             nlp,first,\n\
             nlp,second,\n",
        );
        let table = load_curated(Some(&path), EntityKind::Keyword, "generic").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("nlp").unwrap().definition.as_deref(), Some("first"));
    }

    #[test]
    fn missing_required_column_is_error() {
        let (_tmp, path) = write_csv("keyword,definition\nnlp,x\n");
        let err = load_curated(Some(&path), EntityKind::Keyword, "generic").unwrap_err();
        assert!(err.to_string().contains("aliases"));
    }

    #[test]
    fn plain_alias_is_single_entry() {
        assert_eq!(parse_aliases("ml"), vec!["ml"]);
        assert!(parse_aliases("").is_empty());
    }
}

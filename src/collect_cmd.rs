//! `mlentory wrap` and `mlentory collect`.
//!
//! Both read a JSON array of source records exported by a platform
//! extractor. `wrap` attaches provenance to every field; `collect` builds
//! the deduplicated keyword or license entities. Output goes to stdout,
//! a file, or (with `--persist`) a fresh execution folder of the matching
//! stage.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use mlentory_core::collect::Collector;
use mlentory_core::models::{EntityKind, EntityRecord};
use mlentory_core::provenance::{wrap_record, ExtractionContext, WrappedRecord};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::curated::load_curated;
use crate::stage::{create_execution_folder, write_stage_output, Stage};

/// Where command output ends up.
#[derive(Debug, Clone)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
    /// A new execution folder under this data root.
    Persist(PathBuf),
}

pub struct CollectArgs {
    pub input: PathBuf,
    pub kind: EntityKind,
    pub platform: String,
    pub keywords: Vec<String>,
    pub curated: Option<PathBuf>,
    pub output: OutputTarget,
}

pub struct WrapArgs {
    pub input: PathBuf,
    pub platform: String,
    pub method: String,
    pub confidence: f64,
    pub output: OutputTarget,
}

/// Read a JSON array of records.
pub fn read_records(path: &Path) -> Result<Vec<Value>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON input: {}", path.display()))?;
    match value {
        Value::Array(records) => Ok(records),
        _ => bail!("input {} must be a JSON array of records", path.display()),
    }
}

/// Build entities for `args` without writing anything.
pub fn collect_entities(config: &Config, args: &CollectArgs) -> Result<Vec<EntityRecord>> {
    let sources = read_records(&args.input)?;
    let curated_path = args
        .curated
        .as_deref()
        .or_else(|| config.curated.path_for(args.kind));
    let curated = load_curated(curated_path, args.kind, &args.platform)?;

    let collector = Collector::new(args.kind, args.platform.clone(), curated)
        .with_fields(config.collect.fields_for(args.kind).iter().cloned())
        .with_extraction_method(config.collect.extraction_method.clone());

    Ok(collector.collect(&args.keywords, &sources))
}

pub fn run_collect(config: &Config, args: CollectArgs) -> Result<()> {
    let entities = collect_entities(config, &args)?;
    let enriched = entities.iter().filter(|e| e.enriched).count();

    let file_name = match args.kind {
        EntityKind::Keyword => "keywords.json",
        EntityKind::License => "licenses.json",
    };
    emit(&entities, &args.output, Stage::Normalized, &args.platform, file_name)?;

    eprintln!(
        "collected {} {} entities ({} enriched)",
        entities.len(),
        args.kind,
        enriched
    );
    Ok(())
}

/// Wrap every record of `args.input` under one extraction context.
pub fn wrap_records(args: &WrapArgs) -> Result<Vec<WrappedRecord>> {
    let records = read_records(&args.input)?;
    let ctx = ExtractionContext::new(args.method.clone(), args.confidence, Utc::now())?;

    records
        .iter()
        .enumerate()
        .map(|(idx, record)| match record {
            Value::Object(fields) => Ok(wrap_record(fields, &ctx)),
            _ => bail!("record {} is not a JSON object", idx),
        })
        .collect()
}

pub fn run_wrap(args: WrapArgs) -> Result<()> {
    let wrapped = wrap_records(&args)?;
    emit(&wrapped, &args.output, Stage::Raw, &args.platform, "records.json")?;
    eprintln!("wrapped {} records", wrapped.len());
    Ok(())
}

fn emit<T: Serialize>(
    value: &T,
    target: &OutputTarget,
    stage: Stage,
    platform: &str,
    file_name: &str,
) -> Result<()> {
    match target {
        OutputTarget::Stdout => {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        OutputTarget::File(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, serde_json::to_string_pretty(value)?)
                .with_context(|| format!("Failed to write output: {}", path.display()))?;
        }
        OutputTarget::Persist(data_root) => {
            let folder = create_execution_folder(data_root, stage, platform, Utc::now())?;
            let path = write_stage_output(&folder, file_name, value)?;
            eprintln!("wrote {}", path.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mlentory_core::identity::make_id;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn collects_with_curated_enrichment() {
        let tmp = TempDir::new().unwrap();
        let input = write(
            tmp.path(),
            "records.json",
            r#"[{"keywords": ["segmentation", "tabular"]}, {"run_tags": "['tabular', 'vision']"}]"#,
        );
        let curated = write(
            tmp.path(),
            "kw.csv",
            "keyword,definition,aliases\nsegmentation,Splitting images.,\n",
        );

        let args = CollectArgs {
            input,
            kind: EntityKind::Keyword,
            platform: "OpenML".into(),
            keywords: vec!["benchmark".into()],
            curated: Some(curated),
            output: OutputTarget::Stdout,
        };
        let entities = collect_entities(&Config::minimal(), &args).unwrap();

        let names: Vec<&str> = entities.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["benchmark", "segmentation", "tabular", "vision"]);
        assert!(entities[1].enriched);
        assert!(!entities[2].enriched);
        assert_eq!(entities[2].id, make_id("Keyword", "tabular", Some("OpenML")));
    }

    #[test]
    fn persist_writes_into_normalized_stage() {
        let tmp = TempDir::new().unwrap();
        let input = write(tmp.path(), "records.json", r#"[{"license": "mit"}]"#);
        let data_root = tmp.path().join("data");

        run_collect(
            &Config::minimal(),
            CollectArgs {
                input,
                kind: EntityKind::License,
                platform: "HF".into(),
                keywords: vec![],
                curated: None,
                output: OutputTarget::Persist(data_root.clone()),
            },
        )
        .unwrap();

        let platform_dir = Stage::Normalized.platform_dir(&data_root, "HF");
        let folders = crate::retention::list_execution_folders(&platform_dir).unwrap();
        assert_eq!(folders.len(), 1);
        let content = std::fs::read_to_string(folders[0].path.join("licenses.json")).unwrap();
        let entities: Vec<EntityRecord> = serde_json::from_str(&content).unwrap();
        assert_eq!(entities[0].name, "mit");
    }

    #[test]
    fn wrap_shares_one_timestamp_per_batch() {
        let tmp = TempDir::new().unwrap();
        let input = write(
            tmp.path(),
            "records.json",
            r#"[{"name": "iris", "license": null}, {"name": "mnist"}]"#,
        );
        let wrapped = wrap_records(&WrapArgs {
            input,
            platform: "OpenML".into(),
            method: "API fetch".into(),
            confidence: 0.9,
            output: OutputTarget::Stdout,
        })
        .unwrap();

        assert_eq!(wrapped.len(), 2);
        let t0 = wrapped[0].latest("name").unwrap().extraction_time;
        let t1 = wrapped[1].latest("name").unwrap().extraction_time;
        assert_eq!(t0, t1);
        assert_eq!(wrapped[0].latest("license").unwrap().value, Value::Null);
    }

    #[test]
    fn non_array_input_rejected() {
        let tmp = TempDir::new().unwrap();
        let input = write(tmp.path(), "records.json", r#"{"keywords": []}"#);
        assert!(read_records(&input).is_err());
    }
}

//! Cross-source tag collection and deduplication.
//!
//! A [`Collector`] turns heterogeneous source records into a deduplicated,
//! order-preserving list of [`EntityRecord`]s for one entity kind on one
//! platform.
//!
//! # Algorithm
//!
//! 1. **Flatten.** Each declared field's value is decoded with
//!    [`flatten_value`], expanding encoded lists into scalars.
//! 2. **Collect unique.** Values from the precomputed list come first,
//!    then each source record's fields in the collector's priority order.
//!    Values are trimmed; empty strings and `"null"` are skipped; a value
//!    already seen is skipped. Output order is first-seen order.
//! 3. **Resolve.** A value with a curated definition (exact,
//!    case-sensitive key) resolves to that record verbatim. Anything else
//!    becomes [`EntityRecord::synthesized`].
//!
//! The same inputs in the same order always yield the same output order.

use indexmap::IndexSet;
use serde_json::Value;

use crate::curated::CuratedTable;
use crate::models::{EntityKind, EntityRecord};
use crate::tags::flatten_value;

/// Keyword-bearing fields in priority order: direct keywords, flow-level
/// tags, run-level tags, run-level derived keywords.
pub const DEFAULT_KEYWORD_FIELDS: &[&str] = &["keywords", "flow_tags", "run_tags", "run_keywords"];

pub const DEFAULT_LICENSE_FIELDS: &[&str] = &["license", "licence"];

pub const DEFAULT_EXTRACTION_METHOD: &str = "API fetch";

/// Field label for values handed in ahead of the source records.
pub const PRECOMPUTED_FIELD: &str = "precomputed";

pub struct Collector {
    kind: EntityKind,
    platform: String,
    extraction_method: String,
    fields: Vec<String>,
    curated: CuratedTable,
}

impl Collector {
    /// Collector with the default field order for `kind`.
    pub fn new(kind: EntityKind, platform: impl Into<String>, curated: CuratedTable) -> Self {
        let defaults = match kind {
            EntityKind::Keyword => DEFAULT_KEYWORD_FIELDS,
            EntityKind::License => DEFAULT_LICENSE_FIELDS,
        };
        Self {
            kind,
            platform: platform.into(),
            extraction_method: DEFAULT_EXTRACTION_METHOD.to_string(),
            fields: defaults.iter().map(|f| f.to_string()).collect(),
            curated,
        }
    }

    /// Replace the field priority order. Dotted names (`run.tags`) reach
    /// into nested objects.
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_extraction_method(mut self, method: impl Into<String>) -> Self {
        self.extraction_method = method.into();
        self
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Unique values in first-seen order.
    pub fn collect_unique(&self, precomputed: &[String], sources: &[Value]) -> Vec<String> {
        let mut seen: IndexSet<String> = IndexSet::new();

        for value in precomputed {
            for scalar in flatten_value(PRECOMPUTED_FIELD, &Value::String(value.clone())) {
                insert_scalar(&mut seen, &scalar);
            }
        }

        for record in sources {
            for field in &self.fields {
                let Some(value) = lookup(record, field) else {
                    continue;
                };
                for scalar in flatten_value(field, value) {
                    insert_scalar(&mut seen, &scalar);
                }
            }
        }

        seen.into_iter().collect()
    }

    /// Resolve each value against the curated table.
    pub fn resolve(&self, values: &[String]) -> Vec<EntityRecord> {
        values
            .iter()
            .map(|value| match self.curated.get(value) {
                Some(curated) => curated.clone(),
                None => EntityRecord::synthesized(
                    self.kind,
                    value,
                    &self.platform,
                    &self.extraction_method,
                ),
            })
            .collect()
    }

    /// Collect, deduplicate, and resolve in one pass.
    pub fn collect(&self, precomputed: &[String], sources: &[Value]) -> Vec<EntityRecord> {
        let unique = self.collect_unique(precomputed, sources);
        let records = self.resolve(&unique);
        tracing::debug!(
            kind = %self.kind,
            platform = %self.platform,
            sources = sources.len(),
            unique = records.len(),
            enriched = records.iter().filter(|r| r.enriched).count(),
            "collected entities"
        );
        records
    }
}

fn insert_scalar(seen: &mut IndexSet<String>, raw: &str) {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return;
    }
    seen.insert(trimmed.to_string());
}

/// Look up `path` in `record`: the literal key first, then dotted segments.
fn lookup<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    if let Some(value) = record.get(path) {
        return Some(value);
    }
    if !path.contains('.') {
        return None;
    }
    path.split('.')
        .try_fold(record, |current, segment| current.get(segment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::make_id;
    use serde_json::json;

    fn keyword_collector(curated: CuratedTable) -> Collector {
        Collector::new(EntityKind::Keyword, "OpenML", curated)
    }

    fn names(records: &[EntityRecord]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn first_seen_order_across_sources() {
        let collector = keyword_collector(CuratedTable::empty()).with_fields(["tags"]);
        let sources = vec![json!({"tags": ["b", "a"]}), json!({"tags": ["a", "c"]})];
        assert_eq!(collector.collect_unique(&[], &sources), vec!["b", "a", "c"]);
    }

    #[test]
    fn same_inputs_same_order() {
        let collector = keyword_collector(CuratedTable::empty());
        let sources = vec![
            json!({"keywords": ["z", "y"], "run_tags": "x"}),
            json!({"flow_tags": ["w", "z"]}),
        ];
        let a = collector.collect(&[], &sources);
        let b = collector.collect(&[], &sources);
        assert_eq!(a, b);
        assert_eq!(names(&a), vec!["z", "y", "x", "w"]);
    }

    #[test]
    fn field_priority_within_record() {
        let collector = keyword_collector(CuratedTable::empty());
        let sources = vec![json!({
            "run_keywords": ["d"],
            "run_tags": ["c"],
            "flow_tags": ["b"],
            "keywords": ["a"],
        })];
        assert_eq!(collector.collect_unique(&[], &sources), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn precomputed_keywords_come_first() {
        let collector = keyword_collector(CuratedTable::empty());
        let sources = vec![json!({"keywords": ["b", "a"]})];
        let precomputed = vec!["a".to_string(), "z".to_string()];
        assert_eq!(
            collector.collect_unique(&precomputed, &sources),
            vec!["a", "z", "b"]
        );
    }

    #[test]
    fn encoded_lists_flatten_and_malformed_stay_literal() {
        let collector = keyword_collector(CuratedTable::empty());
        let sources = vec![json!({"keywords": [r#"["x","y"]"#, "[not json"]})];
        assert_eq!(
            collector.collect_unique(&[], &sources),
            vec!["x", "y", "[not json"]
        );
    }

    #[test]
    fn trims_and_skips_empty_and_null() {
        let collector = keyword_collector(CuratedTable::empty());
        let sources = vec![json!({"keywords": ["  a ", "", "   ", "null", null, "a"]})];
        assert_eq!(collector.collect_unique(&[], &sources), vec!["a"]);
    }

    #[test]
    fn repeated_value_keeps_first_position() {
        let collector = keyword_collector(CuratedTable::empty());
        let sources = vec![
            json!({"keywords": ["b", " a"]}),
            json!({"keywords": ["b ", "c", "a"]}),
        ];
        assert_eq!(collector.collect_unique(&[], &sources), vec!["b", "a", "c"]);
    }

    #[test]
    fn dotted_fields_reach_nested_values() {
        let collector = keyword_collector(CuratedTable::empty()).with_fields(["run.tags"]);
        let sources = vec![json!({"run": {"tags": ["deep"]}})];
        assert_eq!(collector.collect_unique(&[], &sources), vec!["deep"]);
    }

    #[test]
    fn curated_record_used_verbatim() {
        let curated_record = EntityRecord {
            name: "segmentation".into(),
            id: make_id("Keyword", "segmentation", Some("generic")),
            entity_type: EntityKind::Keyword,
            platform: "generic".into(),
            enriched: true,
            definition: Some("Partitioning an image into regions.".into()),
            aliases: vec!["image segmentation".into()],
            source_url: None,
            extraction_method: "curated reference".into(),
            confidence: 1.0,
        };
        let collector = keyword_collector(CuratedTable::from_records(vec![curated_record.clone()]));
        let records = collector.collect(&[], &[json!({"keywords": ["segmentation", "tabular"]})]);

        assert_eq!(records[0], curated_record);
        assert!(!records[1].enriched);
        assert_eq!(records[1].id, make_id("Keyword", "tabular", Some("OpenML")));
        assert_eq!(records[1].extraction_method, DEFAULT_EXTRACTION_METHOD);
    }

    #[test]
    fn curated_match_is_case_sensitive() {
        let mut curated_record =
            EntityRecord::synthesized(EntityKind::Keyword, "NLP", "generic", "curated reference");
        curated_record.enriched = true;
        let collector = keyword_collector(CuratedTable::from_records(vec![curated_record]));
        let records = collector.collect(&["nlp".to_string()], &[]);
        assert!(!records[0].enriched);
    }

    #[test]
    fn license_collector_uses_license_fields() {
        let collector = Collector::new(EntityKind::License, "HF", CuratedTable::empty())
            .with_extraction_method("HF API");
        let records = collector.collect(&[], &[json!({"license": "apache-2.0"})]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].entity_type, EntityKind::License);
        assert_eq!(records[0].id, make_id("License", "apache-2.0", Some("HF")));
        assert_eq!(records[0].extraction_method, "HF API");
    }
}

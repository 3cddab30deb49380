//! Immutable curated-definition lookup.
//!
//! A [`CuratedTable`] is built once (typically from a CSV file by the
//! `mlentory` crate) and handed to a collector at construction. An empty
//! table means no curated source is available; every value then resolves
//! to a synthesized record.

use std::collections::HashMap;

use crate::models::EntityRecord;

/// Curated entity records keyed by exact, case-sensitive name.
#[derive(Debug, Clone, Default)]
pub struct CuratedTable {
    entries: HashMap<String, EntityRecord>,
}

impl CuratedTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from records, keyed by their `name`. The first record for a
    /// name wins.
    pub fn from_records(records: impl IntoIterator<Item = EntityRecord>) -> Self {
        let mut entries = HashMap::new();
        for record in records {
            entries.entry(record.name.clone()).or_insert(record);
        }
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&EntityRecord> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntityKind;

    #[test]
    fn first_record_wins_and_lookup_is_exact() {
        let mut first = EntityRecord::synthesized(EntityKind::Keyword, "nlp", "generic", "a");
        first.definition = Some("first".into());
        let mut second = first.clone();
        second.definition = Some("second".into());

        let table = CuratedTable::from_records(vec![first, second]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("nlp").unwrap().definition.as_deref(), Some("first"));
        assert!(table.get("NLP").is_none());
    }
}

//! Entity records produced by tag collection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::identity::make_id;

/// Kind of tag-like entity a collector produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Keyword,
    License,
}

impl EntityKind {
    /// Type tag fed to [`make_id`].
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Keyword => "Keyword",
            EntityKind::License => "License",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "keyword" | "keywords" => Ok(EntityKind::Keyword),
            "license" | "licenses" | "licence" => Ok(EntityKind::License),
            other => Err(format!(
                "unknown entity kind '{}'. Must be keyword or license.",
                other
            )),
        }
    }
}

/// A deduplicated keyword or license.
///
/// Created once per unique raw value per collection run and never
/// updated in place; re-running collection rebuilds the whole set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub name: String,
    pub id: String,
    pub entity_type: EntityKind,
    pub platform: String,
    /// True when resolved against a curated definition.
    pub enriched: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    pub extraction_method: String,
    pub confidence: f64,
}

impl EntityRecord {
    /// Minimal, unenriched record for a value with no curated definition.
    pub fn synthesized(kind: EntityKind, name: &str, platform: &str, method: &str) -> Self {
        Self {
            name: name.to_string(),
            id: make_id(kind.as_str(), name, Some(platform)),
            entity_type: kind,
            platform: platform.to_string(),
            enriched: false,
            definition: None,
            aliases: Vec::new(),
            source_url: None,
            extraction_method: method.to_string(),
            confidence: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!("Keyword".parse::<EntityKind>(), Ok(EntityKind::Keyword));
        assert_eq!("LICENSE".parse::<EntityKind>(), Ok(EntityKind::License));
        assert!("dataset".parse::<EntityKind>().is_err());
    }

    #[test]
    fn synthesized_record_is_unenriched() {
        let rec = EntityRecord::synthesized(EntityKind::Keyword, "vision", "OpenML", "API fetch");
        assert!(!rec.enriched);
        assert_eq!(rec.confidence, 1.0);
        assert_eq!(rec.id, make_id("Keyword", "vision", Some("OpenML")));
    }

    #[test]
    fn optional_fields_omitted_from_json() {
        let rec = EntityRecord::synthesized(EntityKind::License, "mit", "HF", "API fetch");
        let json = serde_json::to_value(&rec).unwrap();
        assert!(json.get("definition").is_none());
        assert!(json.get("aliases").is_none());
        assert_eq!(json["entity_type"], "License");
    }
}

//! TOML configuration.
//!
//! Every command reads an optional config file (default
//! `./config/mlentory.toml`). A missing file is not an error: commands
//! fall back to [`Config::minimal`], and CLI flags such as `--data-dir`
//! override whatever the file says.
//!
//! ```toml
//! [data]
//! root = "./data"
//!
//! [curated]
//! keywords = "./config/curated_keywords.csv"
//! licenses = "./config/curated_licenses.csv"
//!
//! [collect]
//! keyword_fields = ["keywords", "flow_tags", "run_tags", "run_keywords"]
//! license_fields = ["license"]
//! extraction_method = "API fetch"
//!
//! [logging]
//! filter = "mlentory=info"
//! ```

use anyhow::{Context, Result};
use mlentory_core::collect::{
    DEFAULT_EXTRACTION_METHOD, DEFAULT_KEYWORD_FIELDS, DEFAULT_LICENSE_FIELDS,
};
use mlentory_core::models::EntityKind;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub curated: CuratedConfig,
    #[serde(default)]
    pub collect: CollectConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    #[serde(default = "default_data_root")]
    pub root: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            root: default_data_root(),
        }
    }
}

fn default_data_root() -> PathBuf {
    PathBuf::from("./data")
}

/// Paths to curated definition tables. Either may be absent.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct CuratedConfig {
    #[serde(default)]
    pub keywords: Option<PathBuf>,
    #[serde(default)]
    pub licenses: Option<PathBuf>,
}

impl CuratedConfig {
    pub fn path_for(&self, kind: EntityKind) -> Option<&Path> {
        match kind {
            EntityKind::Keyword => self.keywords.as_deref(),
            EntityKind::License => self.licenses.as_deref(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CollectConfig {
    #[serde(default = "default_keyword_fields")]
    pub keyword_fields: Vec<String>,
    #[serde(default = "default_license_fields")]
    pub license_fields: Vec<String>,
    #[serde(default = "default_extraction_method")]
    pub extraction_method: String,
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            keyword_fields: default_keyword_fields(),
            license_fields: default_license_fields(),
            extraction_method: default_extraction_method(),
        }
    }
}

impl CollectConfig {
    pub fn fields_for(&self, kind: EntityKind) -> &[String] {
        match kind {
            EntityKind::Keyword => &self.keyword_fields,
            EntityKind::License => &self.license_fields,
        }
    }
}

fn default_keyword_fields() -> Vec<String> {
    DEFAULT_KEYWORD_FIELDS.iter().map(|f| f.to_string()).collect()
}
fn default_license_fields() -> Vec<String> {
    DEFAULT_LICENSE_FIELDS.iter().map(|f| f.to_string()).collect()
}
fn default_extraction_method() -> String {
    DEFAULT_EXTRACTION_METHOD.to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "mlentory=info,mlentory_core=info".to_string()
}

impl Config {
    /// Defaults for running without a config file.
    pub fn minimal() -> Self {
        Self::default()
    }
}

/// Load and validate `path`, or fall back to [`Config::minimal`] when the
/// file does not exist.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::minimal());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.data.root.as_os_str().is_empty() {
        anyhow::bail!("data.root must not be empty");
    }

    if config.collect.keyword_fields.is_empty() {
        anyhow::bail!("collect.keyword_fields must list at least one field");
    }

    if config.collect.license_fields.is_empty() {
        anyhow::bail!("collect.license_fields must list at least one field");
    }

    if config.collect.extraction_method.trim().is_empty() {
        anyhow::bail!("collect.extraction_method must not be empty");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(content: &str) -> (TempDir, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mlentory.toml");
        std::fs::write(&path, content).unwrap();
        (tmp, path)
    }

    #[test]
    fn missing_file_yields_defaults() {
        let tmp = TempDir::new().unwrap();
        let cfg = load_config(&tmp.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.data.root, PathBuf::from("./data"));
        assert_eq!(cfg.collect.keyword_fields[0], "keywords");
        assert!(cfg.curated.keywords.is_none());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let (_tmp, path) = write_config(
            r#"
[data]
root = "/srv/mlentory"

[curated]
keywords = "kw.csv"
"#,
        );
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.data.root, PathBuf::from("/srv/mlentory"));
        assert_eq!(
            cfg.curated.path_for(EntityKind::Keyword),
            Some(Path::new("kw.csv"))
        );
        assert!(cfg.curated.path_for(EntityKind::License).is_none());
        assert_eq!(cfg.collect.extraction_method, "API fetch");
    }

    #[test]
    fn empty_field_list_rejected() {
        let (_tmp, path) = write_config("[collect]\nkeyword_fields = []\n");
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("keyword_fields"));
    }

    #[test]
    fn malformed_toml_rejected() {
        let (_tmp, path) = write_config("[data\nroot = 1");
        assert!(load_config(&path).is_err());
    }
}

//! Copy-method configuration.
//!
//! Loaded from TOML; every key is optional.
//!
//! ```toml
//! trigger = "Copyable"
//! method_name = "copy"
//! exclude = ["cache"]
//! version_field = "version"
//! conflict_policy = "exact_signature"
//! ```

use cloneforge_schema::{types::AnnotationName, validate::validate_field_name};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeSet,
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error as ThisError;

pub const DEFAULT_TRIGGER: &str = "Copyable";
pub const DEFAULT_METHOD_NAME: &str = "copy";
pub const DEFAULT_EXCLUDE_ATTRIBUTE: &str = "excludeFields";

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to read config '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

///
/// ConflictPolicy
///
/// How an existing method that shares the generated method's name is treated.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Any method with the same name is kept and nothing is generated.
    #[default]
    NameOnly,

    /// Only a zero-argument method with the same name is kept; an overload
    /// taking parameters is reported as a conflict.
    ExactSignature,
}

///
/// CopyConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CopyConfig {
    /// Type-level annotation that requests a copy method.
    pub trigger: String,

    /// Name of the generated method.
    pub method_name: String,

    /// Attribute of the trigger annotation listing per-type exclusions.
    pub exclude_attribute: String,

    /// Field names excluded from every type.
    pub exclude: BTreeSet<String>,

    /// Name of the optimistic-locking version field, when not flagged on the
    /// field itself.
    pub version_field: Option<String>,

    pub conflict_policy: ConflictPolicy,

    /// Exclude every collection field, as older generators did.
    pub legacy_collection_filter: bool,
}

impl Default for CopyConfig {
    fn default() -> Self {
        Self {
            trigger: DEFAULT_TRIGGER.to_string(),
            method_name: DEFAULT_METHOD_NAME.to_string(),
            exclude_attribute: DEFAULT_EXCLUDE_ATTRIBUTE.to_string(),
            exclude: BTreeSet::new(),
            version_field: None,
            conflict_policy: ConflictPolicy::default(),
            legacy_collection_filter: false,
        }
    }
}

impl CopyConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;

        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trigger.trim().is_empty() {
            return Err(ConfigError::Invalid("trigger must not be empty".to_string()));
        }
        validate_field_name(&self.method_name)
            .map_err(|e| ConfigError::Invalid(format!("method_name: {e}")))?;
        if let Some(version) = &self.version_field {
            validate_field_name(version)
                .map_err(|e| ConfigError::Invalid(format!("version_field: {e}")))?;
        }

        Ok(())
    }

    #[must_use]
    pub fn trigger_name(&self) -> AnnotationName {
        AnnotationName::new(self.trigger.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = CopyConfig::from_toml_str("").expect("empty config should parse");

        assert_eq!(config, CopyConfig::default());
        assert_eq!(config.trigger, "Copyable");
        assert_eq!(config.method_name, "copy");
        assert_eq!(config.conflict_policy, ConflictPolicy::NameOnly);
    }

    #[test]
    fn parses_every_key() {
        let config = CopyConfig::from_toml_str(
            r#"
            trigger = "com.example.Copyable"
            method_name = "duplicate"
            exclude_attribute = "skip"
            exclude = ["cache", "lock"]
            version_field = "revision"
            conflict_policy = "exact_signature"
            legacy_collection_filter = true
            "#,
        )
        .expect("config should parse");

        assert_eq!(config.method_name, "duplicate");
        assert!(config.exclude.contains("cache"));
        assert_eq!(config.version_field.as_deref(), Some("revision"));
        assert_eq!(config.conflict_policy, ConflictPolicy::ExactSignature);
        assert!(config.legacy_collection_filter);
        assert_eq!(config.trigger_name().simple_name(), "Copyable");
    }

    #[test]
    fn rejects_unknown_keys_and_bad_names() {
        assert!(matches!(
            CopyConfig::from_toml_str("triggr = \"Copyable\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            CopyConfig::from_toml_str("method_name = \"copy it\""),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = CopyConfig::load("/nonexistent/cloneforge.toml").expect_err("file is missing");

        assert!(err.to_string().contains("/nonexistent/cloneforge.toml"));
    }
}

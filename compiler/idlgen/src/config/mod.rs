//! Generator configuration.
//!
//! Only two options affect generated text: the root namespace and whether
//! members marked `@legacy` are dropped during ingestion.

use idl_diagnostic::{GenError, Result};
use idl_registry::IngestOptions;
use serde::Deserialize;

/// Default root namespace of generated files.
pub const DEFAULT_NAMESPACE: &str = "Generated";

/// Configuration for the generator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct GeneratorConfig {
    /// Root namespace; Defaults and Scaffold live in sub-namespaces of it.
    /// Written without leading or trailing separators, e.g. `App\Dom`.
    pub namespace: String,

    /// Drop members whose leading comment contains `@legacy`.
    pub drop_legacy: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            drop_legacy: false,
        }
    }
}

impl GeneratorConfig {
    /// Create a config with the specified root namespace.
    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Default::default()
        }
    }

    /// Read a config from its JSON form. Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| GenError::InvalidConfig {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the namespace is a sequence of PHP identifiers.
    pub fn validate(&self) -> Result<()> {
        if self.namespace.is_empty() {
            return Err(invalid("namespace must not be empty".to_string()));
        }
        if self.namespace.starts_with('\\') || self.namespace.ends_with('\\') {
            return Err(invalid(format!(
                "namespace `{}` must not start or end with `\\`",
                self.namespace
            )));
        }
        for segment in self.namespace.split('\\') {
            if !is_identifier(segment) {
                return Err(invalid(format!(
                    "namespace segment `{segment}` of `{}` is not a PHP identifier",
                    self.namespace
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn ingest_options(&self) -> IngestOptions {
        IngestOptions {
            drop_legacy: self.drop_legacy,
        }
    }
}

fn invalid(reason: String) -> GenError {
    GenError::InvalidConfig { reason }
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

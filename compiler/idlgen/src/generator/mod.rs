//! The generation driver.
//!
//! Owns the frozen [`Registry`] and the validated config. Every call to
//! [`Generator::generate`] is independent; nothing is cached between calls
//! beyond what the registry computed up front.

use std::collections::btree_map;
use std::collections::BTreeMap;

use idl_build::{Artifact, ArtifactKind, BuildContext};
use idl_diagnostic::{GenError, Result};
use idl_ir::Node;
use idl_registry::Registry;

use crate::GeneratorConfig;

/// Generates PHP artifacts from one parsed tree.
#[derive(Debug)]
pub struct Generator {
    registry: Registry,
    config: GeneratorConfig,
}

impl Generator {
    /// Validate `config` and build the registry from an already-parsed tree.
    pub fn new(nodes: Vec<Node>, config: GeneratorConfig) -> Result<Self> {
        config.validate()?;
        let registry = Registry::build(nodes, config.ingest_options())?;
        Ok(Self { registry, config })
    }

    /// Parse the external parser's JSON output (a top-level array of
    /// definitions) and build the registry from it.
    pub fn from_json(json: &str, config: GeneratorConfig) -> Result<Self> {
        config.validate()?;
        let nodes: Vec<Node> =
            serde_json::from_str(json).map_err(|e| GenError::Input(e.to_string()))?;
        Self::new(nodes, config)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    fn context(&self) -> BuildContext<'_> {
        BuildContext::new(&self.registry, &self.config.namespace)
    }

    /// Build one artifact of the named definition.
    pub fn generate(&self, name: &str, kind: ArtifactKind) -> Result<Artifact> {
        self.context().build(name, kind)
    }

    /// Build every artifact of every definition. Skipped artifacts are
    /// counted but have no entry.
    #[tracing::instrument(level = "debug", skip(self), fields(namespace = %self.config.namespace))]
    pub fn generate_all(&self) -> Result<GeneratedSet> {
        let cx = self.context();
        let mut set = GeneratedSet::default();
        for definition in self.registry.definitions() {
            for kind in ArtifactKind::ALL {
                match cx.build(&definition.name, kind)? {
                    Artifact::Generated(text) => {
                        set.files.insert(GeneratedSet::path(kind, &definition.name), text);
                    }
                    Artifact::Skip => set.skipped += 1,
                }
            }
        }
        tracing::debug!(files = set.len(), skipped = set.skipped, "generation complete");
        Ok(set)
    }
}

/// Every generated file, keyed by its path relative to the output root.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GeneratedSet {
    files: BTreeMap<String, String>,
    skipped: usize,
}

impl GeneratedSet {
    /// Relative path of a definition's artifact: `{Kind}/{Name}.php`.
    pub fn path(kind: ArtifactKind, name: &str) -> String {
        format!("{}/{name}.php", kind.directory())
    }

    pub fn get(&self, kind: ArtifactKind, name: &str) -> Option<&str> {
        self.files.get(&Self::path(kind, name)).map(String::as_str)
    }

    /// `(path, text)` pairs in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(path, text)| (path.as_str(), text.as_str()))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Number of (definition, kind) pairs that had nothing to emit.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl IntoIterator for GeneratedSet {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

#[cfg(test)]
mod tests;

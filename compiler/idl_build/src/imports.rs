//! Cross-reference imports of one artifact.

use std::collections::BTreeSet;

use idl_types::Reference;

/// Why a definition is mentioned.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Access {
    /// Named in a type position. Enums are erased to `string` there and need
    /// no import.
    Type,
    /// Named as a class, e.g. `Mode::cast($value)`. Always imported.
    Cast,
}

/// Collects the definitions an artifact refers to and renders the `use`
/// statements once the body is complete.
#[derive(Clone, Debug)]
pub struct ImportTracker {
    own: String,
    /// `(lowercase, name)`: sorted case-insensitively, ties by spelling.
    names: BTreeSet<(String, String)>,
}

impl ImportTracker {
    /// A tracker for the artifact of `own`, which is never imported.
    pub fn new(own: impl Into<String>) -> Self {
        Self {
            own: own.into(),
            names: BTreeSet::new(),
        }
    }

    pub fn note(&mut self, reference: Reference<'_>, access: Access) {
        if reference.is_enum && access == Access::Type {
            return;
        }
        self.note_name(reference.name);
    }

    /// Record a definition referenced by name.
    pub fn note_name(&mut self, name: &str) {
        if name == self.own {
            return;
        }
        self.names
            .insert((name.to_ascii_lowercase(), name.to_string()));
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// `use {namespace}\Name;` per referenced definition.
    pub fn lines(&self, namespace: &str) -> Vec<String> {
        self.names
            .iter()
            .map(|(_, name)| format!("use {namespace}\\{name};"))
            .collect()
    }
}

//! Artifact kinds and build results.

use std::fmt;

/// The three files a definition can produce.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum ArtifactKind {
    Contract,
    Defaults,
    Scaffold,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [
        ArtifactKind::Contract,
        ArtifactKind::Defaults,
        ArtifactKind::Scaffold,
    ];

    /// Sub-namespace below the configured root; `None` for the root itself.
    pub fn sub_namespace(self) -> Option<&'static str> {
        match self {
            ArtifactKind::Contract => None,
            ArtifactKind::Defaults => Some("Defaults"),
            ArtifactKind::Scaffold => Some("Scaffold"),
        }
    }

    /// Output directory of this kind, relative to the generation root.
    pub fn directory(self) -> &'static str {
        match self {
            ArtifactKind::Contract => "Contract",
            ArtifactKind::Defaults => "Defaults",
            ArtifactKind::Scaffold => "Scaffold",
        }
    }

    /// Namespace of this kind's files under `root`.
    pub fn namespace(self, root: &str) -> String {
        match self.sub_namespace() {
            Some(sub) => format!("{root}\\{sub}"),
            None => root.to_string(),
        }
    }

    /// Fully qualified name of `definition`'s artifact of this kind.
    pub fn qualify(self, root: &str, definition: &str) -> String {
        format!("\\{}\\{definition}", self.namespace(root))
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.directory())
    }
}

/// Outcome of building one artifact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Artifact {
    /// A complete PHP file.
    Generated(String),
    /// This kind has nothing to contribute for the definition.
    Skip,
}

impl Artifact {
    pub fn is_skip(&self) -> bool {
        matches!(self, Artifact::Skip)
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Artifact::Generated(text) => Some(text),
            Artifact::Skip => None,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            Artifact::Generated(text) => Some(text),
            Artifact::Skip => None,
        }
    }
}

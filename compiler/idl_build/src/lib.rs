//! Artifact builders for idlgen.
//!
//! Every definition yields up to three PHP files:
//!
//! - **Contract** (`{ns}`): interfaces with signatures only, and enum classes.
//! - **Defaults** (`{ns}\Defaults`): a trait carrying the behavior that can be
//!   derived from the declaration alone (property interception, attribute
//!   reflection, forwarding setters, container adapters, `cast`).
//! - **Scaffold** (`{ns}\Scaffold`): a class whose remaining methods throw
//!   until someone implements them.
//!
//! # Architecture
//!
//! The builders share one traversal ([`walk_members`]) and differ only in the
//! [`MemberVisitor`] hooks they override. Type text, imports and signatures go
//! through [`ArtifactWriter`], which owns the output buffer and the import
//! placeholder of the file being generated.
//!
//! A builder either produces text or [`Artifact::Skip`]; "nothing to emit" is
//! a normal outcome, never an error.

mod artifact;
mod contract;
mod defaults;
mod imports;
mod php;
mod scaffold;
mod support;
mod visitor;
mod writer;

use idl_diagnostic::Result;
use idl_registry::Registry;

pub use artifact::{Artifact, ArtifactKind};
pub use imports::{Access, ImportTracker};
pub use php::{MethodSig, Param};
pub use visitor::{
    walk_members, AttributeMember, ConstMember, ConstructorGroup, FieldMember, IterableMember,
    MemberVisitor, OperationGroup,
};
pub use writer::ArtifactWriter;

/// Builds artifacts against one frozen registry.
#[derive(Copy, Clone, Debug)]
pub struct BuildContext<'r> {
    registry: &'r Registry,
    namespace: &'r str,
}

impl<'r> BuildContext<'r> {
    pub fn new(registry: &'r Registry, namespace: &'r str) -> Self {
        Self {
            registry,
            namespace,
        }
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    pub fn namespace(&self) -> &'r str {
        self.namespace
    }

    /// Build one artifact of the named definition.
    #[tracing::instrument(level = "debug", skip(self), fields(namespace = self.namespace))]
    pub fn build(&self, name: &str, kind: ArtifactKind) -> Result<Artifact> {
        let definition = self.registry.definition(name)?;
        let artifact = match kind {
            ArtifactKind::Contract => contract::build(self, definition)?,
            ArtifactKind::Defaults => defaults::build(self, definition)?,
            ArtifactKind::Scaffold => scaffold::build(self, definition)?,
        };
        if artifact.is_skip() {
            tracing::trace!(definition = name, ?kind, "skipped");
        }
        Ok(artifact)
    }
}

#[cfg(test)]
mod test_helpers;

//! Fixtures for the builder tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use idl_ir::{Argument, Definition, DefinitionKind, ExtAttr, ExtAttrs, Member, Node, TypeNode};
use idl_registry::{IngestOptions, Registry};

use crate::{Artifact, ArtifactKind, BuildContext};

pub fn ty(name: &str) -> TypeNode {
    TypeNode::named(name)
}

pub fn arg(name: &str, ty_name: &str) -> Argument {
    Argument::new(name, ty(ty_name))
}

pub fn attrs(list: Vec<ExtAttr>) -> ExtAttrs {
    ExtAttrs(list)
}

pub fn interface(name: &str, members: Vec<Member>) -> Definition {
    Definition::new(name, DefinitionKind::Interface).with_members(members)
}

pub fn mixin(name: &str, members: Vec<Member>) -> Definition {
    Definition::new(name, DefinitionKind::InterfaceMixin).with_members(members)
}

pub fn dictionary(name: &str, members: Vec<Member>) -> Definition {
    Definition::new(name, DefinitionKind::Dictionary).with_members(members)
}

pub fn enumeration(name: &str, values: &[&str]) -> Definition {
    Definition::new(
        name,
        DefinitionKind::Enum {
            values: values.iter().map(|v| (*v).to_string()).collect(),
        },
    )
}

pub fn includes(target: &str, mixin: &str) -> Node {
    Node::Includes {
        target: target.to_string(),
        mixin: mixin.to_string(),
    }
}

pub fn registry(definitions: Vec<Definition>) -> Registry {
    registry_with(definitions, Vec::new())
}

pub fn registry_with(definitions: Vec<Definition>, extra: Vec<Node>) -> Registry {
    let mut nodes: Vec<Node> = definitions.into_iter().map(Node::Definition).collect();
    nodes.extend(extra);
    Registry::build(nodes, IngestOptions::default()).expect("registry should build")
}

pub fn build(registry: &Registry, name: &str, kind: ArtifactKind) -> Artifact {
    BuildContext::new(registry, "Generated")
        .build(name, kind)
        .expect("artifact should build")
}

/// The generated text; panics on Skip.
pub fn text(registry: &Registry, name: &str, kind: ArtifactKind) -> String {
    build(registry, name, kind)
        .into_text()
        .unwrap_or_else(|| panic!("{kind} artifact of {name} was skipped"))
}

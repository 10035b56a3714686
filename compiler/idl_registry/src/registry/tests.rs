#![allow(clippy::unwrap_used, clippy::expect_used)]

use idl_diagnostic::ErrorCode;
use idl_ir::{DefinitionKind, ExtAttr, ExtAttrs, Member, Node, TypeNode};
use pretty_assertions::assert_eq;

use super::*;

fn interface(name: &str, members: Vec<Member>) -> Node {
    Node::Definition(Definition::new(name, DefinitionKind::Interface).with_members(members))
}

fn mixin(name: &str, members: Vec<Member>) -> Node {
    Node::Definition(Definition::new(name, DefinitionKind::InterfaceMixin).with_members(members))
}

fn includes(target: &str, mixin: &str) -> Node {
    Node::Includes {
        target: target.to_string(),
        mixin: mixin.to_string(),
    }
}

fn typedef(name: &str, ty: TypeNode) -> Node {
    Node::Typedef {
        name: name.to_string(),
        ty,
    }
}

fn build(nodes: Vec<Node>) -> Registry {
    Registry::build(nodes, IngestOptions::default()).expect("registry should build")
}

fn build_err(nodes: Vec<Node>) -> GenError {
    Registry::build(nodes, IngestOptions::default()).expect_err("registry should fail")
}

#[test]
fn definitions_sort_case_insensitively() {
    let registry = build(vec![
        interface("beta", vec![]),
        interface("Alpha", vec![]),
        interface("Gamma", vec![]),
    ]);
    let names: Vec<&str> = registry.definitions().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "beta", "Gamma"]);
    assert_eq!(registry.len(), 3);
    assert!(registry.get("beta").is_some());
    assert!(registry.get("Beta").is_none());
}

#[test]
fn partials_append_members_in_order() {
    let main = Definition::new("Doc", DefinitionKind::Interface)
        .with_members(vec![Member::attribute("a", TypeNode::named("long"))]);
    let partial = Definition::new("Doc", DefinitionKind::Interface)
        .with_members(vec![
            Member::attribute("b", TypeNode::named("long")),
            Member::attribute("c", TypeNode::named("long")),
        ])
        .into_partial();
    let registry = build(vec![Node::Definition(main), Node::Definition(partial)]);

    let doc = registry.definition("Doc").unwrap();
    let members: Vec<&str> = doc.members.iter().filter_map(Member::name).collect();
    assert_eq!(members, vec!["a", "b", "c"]);
}

#[test]
fn partial_before_main_is_fatal() {
    let partial = Definition::new("Doc", DefinitionKind::Interface).into_partial();
    let err = build_err(vec![Node::Definition(partial), interface("Doc", vec![])]);
    assert_eq!(
        err,
        GenError::PartialWithoutMain {
            name: "Doc".to_string()
        }
    );
    assert_eq!(err.code(), ErrorCode::E0003);
}

#[test]
fn duplicates_are_fatal() {
    let err = build_err(vec![interface("Doc", vec![]), interface("Doc", vec![])]);
    assert_eq!(err.code(), ErrorCode::E0001);

    let err = build_err(vec![
        typedef("Id", TypeNode::named("long")),
        typedef("Id", TypeNode::named("DOMString")),
    ]);
    assert_eq!(
        err,
        GenError::DuplicateTypedef {
            name: "Id".to_string()
        }
    );
}

#[test]
fn mixin_lists_pin_parent_first() {
    let child = Definition::new("Child", DefinitionKind::Interface).with_parent("Parent");
    let registry = build(vec![
        Node::Definition(child),
        interface("Parent", vec![]),
        mixin("Zeta", vec![]),
        mixin("Alpha", vec![]),
        includes("Child", "Zeta"),
        includes("Child", "Alpha"),
        includes("Child", "Alpha"),
    ]);
    assert_eq!(registry.mixins("Child"), ["Parent", "Alpha", "Zeta"]);
    assert_eq!(registry.included("Child"), ["Alpha", "Zeta"]);
    assert!(registry.mixins("Parent").is_empty());
    assert!(registry.mixins("Nope").is_empty());
}

#[test]
fn unknown_edges_are_fatal() {
    let err = build_err(vec![interface("Doc", vec![]), includes("Doc", "Missing")]);
    assert_eq!(
        err,
        GenError::UnknownMixin {
            definition: "Doc".to_string(),
            mixin: "Missing".to_string()
        }
    );

    let err = build_err(vec![mixin("M", vec![]), includes("Missing", "M")]);
    assert_eq!(err.code(), ErrorCode::E0005);

    let orphan = Definition::new("Child", DefinitionKind::Interface).with_parent("Ghost");
    let err = build_err(vec![Node::Definition(orphan)]);
    assert_eq!(err.code(), ErrorCode::E0004);
}

#[test]
fn first_bad_edge_in_input_order_is_reported() {
    let err = build_err(vec![
        interface("Doc", vec![]),
        interface("Win", vec![]),
        includes("Win", "Later"),
        includes("Ghost", "Sooner"),
        includes("Doc", "Earlier"),
    ]);
    assert_eq!(
        err,
        GenError::UnknownMixin {
            definition: "Win".to_string(),
            mixin: "Later".to_string()
        }
    );

    let err = build_err(vec![
        interface("Doc", vec![]),
        includes("Ghost", "M"),
        includes("Doc", "Missing"),
    ]);
    assert_eq!(
        err,
        GenError::UnknownIncludesTarget {
            target: "Ghost".to_string(),
            mixin: "M".to_string()
        }
    );
}

#[test]
fn unknown_definition_lookup_is_an_error() {
    let registry = build(vec![]);
    assert!(registry.is_empty());
    assert_eq!(
        registry.definition("Nope").unwrap_err(),
        GenError::UnknownDefinition {
            name: "Nope".to_string()
        }
    );
}

#[test]
fn legacy_members_are_dropped_on_request() {
    let mut legacy = Member::attribute("old", TypeNode::named("long"));
    legacy.comments.push("// @legacy kept for old callers".to_string());
    let node = interface(
        "Doc",
        vec![legacy, Member::attribute("fresh", TypeNode::named("long"))],
    );

    let kept = build(vec![node.clone()]);
    assert_eq!(kept.definition("Doc").unwrap().members.len(), 2);

    let dropped = Registry::build(vec![node], IngestOptions { drop_legacy: true }).unwrap();
    let members: Vec<&str> = dropped
        .definition("Doc")
        .unwrap()
        .members
        .iter()
        .filter_map(Member::name)
        .collect();
    assert_eq!(members, vec!["fresh"]);
    assert!(dropped.names().get("Doc", NameCategory::Getter, "old").is_none());
}

#[test]
fn typedefs_resolve_transitively_and_keep_outer_flags() {
    let clamp = ExtAttrs(vec![ExtAttr::flag("Clamp")]);
    let registry = build(vec![
        typedef("Inner", TypeNode::named("unsigned long")),
        typedef("Outer", TypeNode::named("Inner").with_ext_attrs(clamp)),
    ]);

    let outer = TypeNode::named("Outer").nullable();
    let resolved = registry.resolve_typedefs(&outer).unwrap();
    assert_eq!(resolved.name(), Some("unsigned long"));
    assert!(resolved.nullable);
    assert!(resolved.ext_attrs.has("Clamp"));

    let plain = TypeNode::named("long");
    assert!(matches!(
        registry.resolve_typedefs(&plain).unwrap(),
        Cow::Borrowed(_)
    ));
    assert!(registry.is_integer(&TypeNode::named("Outer")).unwrap());
    assert!(!registry.is_integer(&TypeNode::named("DOMString")).unwrap());
}

#[test]
fn typedef_cycles_are_fatal() {
    let registry = build(vec![
        typedef("A", TypeNode::named("B")),
        typedef("B", TypeNode::named("A")),
    ]);
    let err = registry.resolve_typedefs(&TypeNode::named("A")).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E2002);
    assert!(err.to_string().contains("A -> B -> A"));
}

#[test]
fn ancestors_walk_nearest_first() {
    let registry = build(vec![
        Node::Definition(Definition::new("C", DefinitionKind::Interface).with_parent("B")),
        Node::Definition(Definition::new("B", DefinitionKind::Interface).with_parent("A")),
        interface("A", vec![]),
    ]);
    let c = registry.definition("C").unwrap();
    let chain: Vec<&str> = registry.ancestors(c).map(|d| d.name.as_str()).collect();
    assert_eq!(chain, vec!["B", "A"]);
}

#[test]
fn surface_flattens_included_mixins_once() {
    let registry = build(vec![
        interface("Doc", vec![Member::attribute("own", TypeNode::named("long"))]),
        mixin("M1", vec![Member::attribute("one", TypeNode::named("long"))]),
        mixin("M2", vec![Member::attribute("two", TypeNode::named("long"))]),
        includes("Doc", "M2"),
        includes("Doc", "M1"),
        includes("M1", "M2"),
    ]);
    let doc = registry.definition("Doc").unwrap();
    let surface: Vec<(&str, &str)> = registry
        .surface(doc)
        .iter()
        .map(|s| (s.owner.name.as_str(), s.member.name().unwrap_or_default()))
        .collect();
    assert_eq!(
        surface,
        vec![("Doc", "own"), ("M1", "one"), ("M2", "two")]
    );
}

#[test]
fn find_name_walks_parents_and_mixins() {
    let registry = build(vec![
        Node::Definition(
            Definition::new("Child", DefinitionKind::Interface)
                .with_parent("Parent")
                .with_members(vec![Member::attribute("x", TypeNode::named("long"))]),
        ),
        interface("Parent", vec![Member::attribute("y", TypeNode::named("long"))]),
    ]);
    assert_eq!(
        registry.find_name("Child", NameCategory::Getter, "y"),
        Some(("Parent", "getY"))
    );
    assert_eq!(
        registry.find_name("Child", NameCategory::Getter, "x"),
        Some(("Child", "getX"))
    );
    assert_eq!(registry.find_name("Parent", NameCategory::Getter, "x"), None);
    assert_eq!(
        registry
            .name_of("Parent", NameCategory::Getter, "x")
            .unwrap_err()
            .code(),
        ErrorCode::E1003
    );
}

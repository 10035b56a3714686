#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use idl_diagnostic::{ErrorCode, GenError};
use idl_ir::{
    Argument, AttributeSpecial, Definition, DefinitionKind, ExtAttr, ExtAttrs, Literal, Member, MemberKind, Node,
    OperationSpecial, Signature, TypeNode,
};
use pretty_assertions::assert_eq;
use rustc_hash::FxHashSet;

use super::*;
use crate::{IngestOptions, Registry};

fn def(name: &str, kind: DefinitionKind, members: Vec<Member>) -> Node {
    Node::Definition(Definition::new(name, kind).with_members(members))
}

fn interface(name: &str, members: Vec<Member>) -> Node {
    def(name, DefinitionKind::Interface, members)
}

fn child(name: &str, parent: &str, kind: DefinitionKind, members: Vec<Member>) -> Node {
    Node::Definition(
        Definition::new(name, kind)
            .with_parent(parent)
            .with_members(members),
    )
}

fn includes(target: &str, mixin: &str) -> Node {
    Node::Includes {
        target: target.to_string(),
        mixin: mixin.to_string(),
    }
}

fn long() -> TypeNode {
    TypeNode::named("unsigned long")
}

fn string() -> TypeNode {
    TypeNode::named("DOMString")
}

fn build(nodes: Vec<Node>) -> Registry {
    Registry::build(nodes, IngestOptions::default()).expect("registry should build")
}

fn introduced(registry: &Registry, name: &str) -> Vec<String> {
    registry
        .names()
        .introduced(name)
        .map(|names| names.to_vec())
        .unwrap_or_default()
}

fn getter(index_type: TypeNode) -> Member {
    Member::special(
        OperationSpecial::Getter,
        None,
        string(),
        vec![Argument::new("key", index_type)],
    )
}

#[test]
fn accessors_follow_member_priority() {
    let registry = build(vec![interface(
        "Doc",
        vec![
            Member::operation("open", TypeNode::named("undefined"), vec![]),
            Member::readonly_attribute("title", string()),
            Member::attribute("body", string()),
            Member::constant("READY", TypeNode::named("short"), Literal::Number("1".into())),
        ],
    )]);

    assert_eq!(
        introduced(&registry, "Doc"),
        vec!["READY", "getTitle", "getBody", "setBody", "open"]
    );
    let names = registry.names();
    assert_eq!(names.get("Doc", NameCategory::Getter, "title"), Some("getTitle"));
    assert_eq!(names.get("Doc", NameCategory::Setter, "title"), None);
    assert_eq!(names.get("Doc", NameCategory::Setter, "body"), Some("setBody"));
    assert_eq!(names.get("Doc", NameCategory::Operation, "open"), Some("open"));
    assert_eq!(names.get("Doc", NameCategory::Const, "READY"), Some("READY"));
}

#[test]
fn collisions_take_an_incrementing_prefix() {
    let registry = build(vec![interface(
        "Doc",
        vec![
            Member::attribute("value", string()),
            Member::operation("getValue", string(), vec![]),
            Member::operation("GETVALUE", string(), vec![]),
            Member::operation("__get", string(), vec![]),
        ],
    )]);
    let names = registry.names();
    assert_eq!(names.get("Doc", NameCategory::Getter, "value"), Some("getValue"));
    assert_eq!(
        names.get("Doc", NameCategory::Operation, "getValue"),
        Some("_1_getValue")
    );
    assert_eq!(
        names.get("Doc", NameCategory::Operation, "GETVALUE"),
        Some("_2_GETVALUE")
    );
    assert_eq!(names.get("Doc", NameCategory::Operation, "__get"), Some("_1___get"));
}

#[test]
fn overloads_share_one_name() {
    let registry = build(vec![interface(
        "Canvas",
        vec![
            Member::operation("draw", TypeNode::named("undefined"), vec![]),
            Member::operation(
                "draw",
                TypeNode::named("undefined"),
                vec![Argument::new("x", long())],
            ),
        ],
    )]);
    assert_eq!(introduced(&registry, "Canvas"), vec!["draw"]);
}

#[test]
fn child_shadowing_inherited_name_is_renamed() {
    let registry = build(vec![
        interface("Base", vec![Member::attribute("value", string())]),
        child(
            "Derived",
            "Base",
            DefinitionKind::Interface,
            vec![Member::attribute("value", string())],
        ),
    ]);
    let names = registry.names();
    assert_eq!(names.get("Base", NameCategory::Getter, "value"), Some("getValue"));
    assert_eq!(
        names.get("Derived", NameCategory::Getter, "value"),
        Some("_1_getValue")
    );
}

#[test]
fn own_member_clashing_with_included_mixin_is_fatal() {
    let err = Registry::build(
        vec![
            interface("Foo", vec![Member::attribute("value", string())]),
            def(
                "Bar",
                DefinitionKind::InterfaceMixin,
                vec![Member::attribute("value", string())],
            ),
            includes("Foo", "Bar"),
        ],
        IngestOptions::default(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        GenError::MixinConflict {
            definition: "Foo".to_string(),
            mixin: "Bar".to_string(),
            name: "getValue".to_string(),
        }
    );
    assert_eq!(err.code(), ErrorCode::E1001);
}

#[test]
fn two_mixins_clashing_is_fatal() {
    let err = Registry::build(
        vec![
            interface("Foo", vec![]),
            def("A", DefinitionKind::InterfaceMixin, vec![Member::operation("run", string(), vec![])]),
            def("B", DefinitionKind::InterfaceMixin, vec![Member::operation("run", string(), vec![])]),
            includes("Foo", "A"),
            includes("Foo", "B"),
        ],
        IngestOptions::default(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        GenError::MixinConflict {
            definition: "Foo".to_string(),
            mixin: "B".to_string(),
            name: "run".to_string(),
        }
    );
}

#[test]
fn diamond_folds_shared_mixin_once() {
    let registry = build(vec![
        def("Shared", DefinitionKind::InterfaceMixin, vec![Member::attribute("id", string())]),
        interface("Base", vec![]),
        child("Leaf", "Base", DefinitionKind::Interface, vec![]),
        includes("Base", "Shared"),
        includes("Leaf", "Shared"),
    ]);
    assert_eq!(introduced(&registry, "Shared"), vec!["getId", "setId"]);
    assert!(introduced(&registry, "Leaf").is_empty());
}

#[test]
fn cycles_are_rejected() {
    let err = Registry::build(
        vec![
            child("A", "B", DefinitionKind::Interface, vec![]),
            child("B", "A", DefinitionKind::Interface, vec![]),
        ],
        IngestOptions::default(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        GenError::MixinCycle {
            path: vec!["A".to_string(), "B".to_string(), "A".to_string()]
        }
    );
}

#[test]
fn root_dictionary_reserves_container_names_and_child_inherits_them() {
    let registry = build(vec![
        def(
            "Options",
            DefinitionKind::Dictionary,
            vec![Member::field("mode", string())],
        ),
        child(
            "MoreOptions",
            "Options",
            DefinitionKind::Dictionary,
            vec![Member::field("depth", long())],
        ),
    ]);
    assert_eq!(
        introduced(&registry, "Options"),
        vec!["offsetExists", "offsetGet", "offsetSet", "offsetUnset", "cast", "getMode"]
    );
    assert_eq!(introduced(&registry, "MoreOptions"), vec!["getDepth"]);
    let names = registry.names();
    assert_eq!(names.get("MoreOptions", NameCategory::Cast, ""), Some("cast"));
    assert_eq!(names.get("MoreOptions", NameCategory::Get, ""), Some("offsetGet"));
    assert_eq!(names.get("Options", NameCategory::Setter, "mode"), None);
}

#[test]
fn callbacks_reserve_invoke_and_cast() {
    let callback = DefinitionKind::Callback {
        signature: Signature {
            ret: TypeNode::named("undefined"),
            arguments: vec![],
        },
    };
    let registry = build(vec![
        def("Listener", callback, vec![]),
        def(
            "Handler",
            DefinitionKind::CallbackInterface,
            vec![Member::operation("handleEvent", TypeNode::named("undefined"), vec![])],
        ),
    ]);
    assert_eq!(introduced(&registry, "Listener"), vec!["invoke", "cast"]);
    assert_eq!(
        introduced(&registry, "Handler"),
        vec!["invoke", "cast", "handleEvent"]
    );
}

#[test]
fn enum_constants_stay_unique_after_sanitizing() {
    let registry = build(vec![def(
        "Mode",
        DefinitionKind::Enum {
            values: vec![
                "a-b".to_string(),
                "a_b".to_string(),
                "class".to_string(),
                String::new(),
            ],
        },
        vec![],
    )]);
    let names = registry.names();
    assert_eq!(names.get("Mode", NameCategory::EnumValue, "a-b"), Some("A_B"));
    assert_eq!(names.get("Mode", NameCategory::EnumValue, "a_b"), Some("_1_A_B"));
    assert_eq!(names.get("Mode", NameCategory::EnumValue, "class"), Some("_1_CLASS"));
    assert_eq!(names.get("Mode", NameCategory::EnumValue, ""), Some("EMPTY"));
    assert_eq!(names.get("Mode", NameCategory::Cast, ""), Some("cast"));
}

#[test]
fn unnamed_specials_get_synthesized_names() {
    let registry = build(vec![
        Node::Typedef {
            name: "Index".to_string(),
            ty: long(),
        },
        interface(
            "List",
            vec![
                getter(TypeNode::named("Index")),
                getter(string()),
                Member::special(
                    OperationSpecial::Deleter,
                    None,
                    TypeNode::named("undefined"),
                    vec![Argument::new("name", string())],
                ),
                Member::special(OperationSpecial::Stringifier, None, string(), vec![]),
                Member::readonly_attribute("length", long()),
            ],
        ),
    ]);
    assert_eq!(
        introduced(&registry, "List"),
        vec![
            "offsetExists",
            "offsetGet",
            "offsetSet",
            "offsetUnset",
            "getIterator",
            "count",
            "item",
            "namedItem",
            "removeNamedItem",
            "toString",
            "getLength",
        ]
    );
    let names = registry.names();
    assert_eq!(
        names.get("List", NameCategory::Special, "indexed-getter"),
        Some("item")
    );
    assert_eq!(names.get("List", NameCategory::Count, ""), Some("count"));
}

#[test]
fn structural_names_from_parent_are_inherited() {
    let registry = build(vec![
        interface("Base", vec![getter(long()), Member::readonly_attribute("length", long())]),
        child(
            "Derived",
            "Base",
            DefinitionKind::Interface,
            vec![getter(long()), Member::readonly_attribute("length", long())],
        ),
    ]);
    assert_eq!(
        introduced(&registry, "Derived"),
        vec!["_1_item", "_1_getLength"]
    );
    let names = registry.names();
    assert_eq!(names.get("Derived", NameCategory::Count, ""), Some("count"));
    assert_eq!(names.get("Derived", NameCategory::Iterator, ""), Some("getIterator"));
}

#[test]
fn protocol_name_taken_by_an_ancestor_is_fatal() {
    let err = Registry::build(
        vec![
            interface("Base", vec![Member::operation("count", long(), vec![])]),
            child(
                "Derived",
                "Base",
                DefinitionKind::Interface,
                vec![Member::readonly_attribute("length", long())],
            ),
        ],
        IngestOptions::default(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        GenError::ProtocolConflict {
            definition: "Derived".to_string(),
            protocol: "\\Countable".to_string(),
            name: "count".to_string(),
        }
    );
    assert_eq!(err.code(), ErrorCode::E1004);
}

#[test]
fn offset_accessor_taken_by_a_mixin_is_fatal() {
    let err = Registry::build(
        vec![
            interface("Store", vec![getter(string())]),
            def(
                "Legacy",
                DefinitionKind::InterfaceMixin,
                vec![Member::operation("offsetGet", string(), vec![])],
            ),
            includes("Store", "Legacy"),
        ],
        IngestOptions::default(),
    )
    .unwrap_err();
    assert_eq!(err.code(), ErrorCode::E1004);
    assert!(err.to_string().contains("`offsetGet` for `\\ArrayAccess`"), "{err}");
}

#[test]
fn inherit_attribute_reuses_the_ancestor_getter() {
    let registry = build(vec![
        interface("Base", vec![Member::readonly_attribute("label", string())]),
        child(
            "Derived",
            "Base",
            DefinitionKind::Interface,
            vec![Member::new(MemberKind::Attribute {
                name: "label".to_string(),
                ty: string(),
                readonly: false,
                special: AttributeSpecial::Inherit,
            })],
        ),
    ]);
    let names = registry.names();
    assert_eq!(names.get("Derived", NameCategory::Getter, "label"), Some("getLabel"));
    assert_eq!(names.get("Derived", NameCategory::Setter, "label"), Some("setLabel"));
    assert_eq!(introduced(&registry, "Derived"), vec!["setLabel"]);
}

#[test]
fn inherit_attribute_without_an_ancestor_accessor_reserves_its_own() {
    let registry = build(vec![
        interface("Base", vec![]),
        child(
            "Derived",
            "Base",
            DefinitionKind::Interface,
            vec![Member::new(MemberKind::Attribute {
                name: "label".to_string(),
                ty: string(),
                readonly: true,
                special: AttributeSpecial::Inherit,
            })],
        ),
    ]);
    assert_eq!(introduced(&registry, "Derived"), vec!["getLabel"]);
}

#[test]
fn put_forwards_reserves_a_setter() {
    let forwarded = Member::readonly_attribute("location", TypeNode::named("Location"))
        .with_ext_attrs(ExtAttrs(vec![ExtAttr::identifier("PutForwards", "href")]));
    let registry = build(vec![
        interface("Location", vec![Member::attribute("href", string())]),
        interface("Window", vec![forwarded]),
    ]);
    assert_eq!(
        registry.names().get("Window", NameCategory::Setter, "location"),
        Some("setLocation")
    );
}

#[test]
fn resolution_is_memoized() {
    let registry = build(vec![
        interface("Base", vec![Member::attribute("a", string())]),
        child("Derived", "Base", DefinitionKind::Interface, vec![]),
    ]);
    let mut resolver = NameResolver::new(&registry);

    let first = resolver.resolve("Derived").unwrap();
    assert_eq!(resolver.passes(), 2);
    let again = resolver.resolve("Derived").unwrap();
    let base = resolver.resolve("Base").unwrap();
    assert_eq!(resolver.passes(), 2);
    assert!(Arc::ptr_eq(&first, &again));
    assert_eq!(base.to_vec(), vec!["getA", "setA"]);
    assert_eq!(resolver.finish(), *registry.names());
}

#[test]
fn unknown_definition_cannot_be_resolved() {
    let registry = build(vec![]);
    let mut resolver = NameResolver::new(&registry);
    assert_eq!(
        resolver.resolve("Ghost").unwrap_err().code(),
        ErrorCode::E0006
    );
}

#[test]
fn surface_names_are_unique() {
    let registry = build(vec![
        interface("Base", vec![Member::attribute("x", string())]),
        child(
            "Node",
            "Base",
            DefinitionKind::Interface,
            vec![
                Member::attribute("x", string()),
                Member::operation("getX", string(), vec![]),
            ],
        ),
        def("Extra", DefinitionKind::InterfaceMixin, vec![Member::attribute("y", string())]),
        includes("Node", "Extra"),
    ]);

    let mut seen = FxHashSet::default();
    for name in ["Node", "Base", "Extra"] {
        for ident in introduced(&registry, name) {
            assert!(seen.insert(ident.to_ascii_lowercase()), "duplicate {ident}");
        }
    }
    assert!(registry
        .names()
        .iter()
        .any(|(key, ident)| key.definition == "Node" && ident == "_2_getX"));
}

#[test]
fn member_kinds_without_names_reserve_nothing() {
    let registry = build(vec![interface(
        "Bag",
        vec![Member::new(MemberKind::Constructor { arguments: vec![] })],
    )]);
    assert!(introduced(&registry, "Bag").is_empty());
    assert!(registry.names().get("Bag", NameCategory::Iterator, "").is_none());
}

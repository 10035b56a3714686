#![allow(clippy::unwrap_used, clippy::expect_used)]

use idl_diagnostic::ErrorCode;
use pretty_assertions::assert_eq;

use super::*;

const TREE: &str = r#"[
    {
        "type": "interface",
        "name": "Node",
        "members": [
            { "type": "attribute", "name": "nodeName", "readonly": true,
              "idlType": { "idlType": "DOMString" } },
            { "type": "operation", "name": "normalize",
              "idlType": { "idlType": "undefined" }, "arguments": [],
              "comments": ["// @legacy kept for old pages"] }
        ]
    },
    {
        "type": "interface mixin",
        "name": "Pinged",
        "members": [
            { "type": "operation", "name": "ping",
              "idlType": { "idlType": "undefined" }, "arguments": [] }
        ]
    },
    { "type": "enum", "name": "Mode", "values": [{ "value": "open" }, { "value": "closed" }] }
]"#;

#[test]
fn from_json_builds_the_registry() {
    let generator = Generator::from_json(TREE, GeneratorConfig::default()).unwrap();
    let names: Vec<&str> = generator
        .registry()
        .definitions()
        .map(|d| d.name.as_str())
        .collect();
    assert_eq!(names, vec!["Mode", "Node", "Pinged"]);
    assert_eq!(generator.config().namespace, "Generated");
}

#[test]
fn generate_all_keys_files_by_kind_and_name() {
    let generator = Generator::from_json(TREE, GeneratorConfig::default()).unwrap();
    let set = generator.generate_all().unwrap();
    let paths: Vec<&str> = set.iter().map(|(path, _)| path).collect();
    assert_eq!(
        paths,
        vec![
            "Contract/Mode.php",
            "Contract/Node.php",
            "Contract/Pinged.php",
            "Defaults/Node.php",
            "Scaffold/Node.php",
            "Scaffold/Pinged.php",
        ]
    );
    // Enum Defaults and Scaffold, mixin Defaults.
    assert_eq!(set.skipped(), 3);
    assert_eq!(
        set.get(ArtifactKind::Contract, "Node"),
        generator
            .generate("Node", ArtifactKind::Contract)
            .unwrap()
            .text()
    );
    assert_eq!(set.get(ArtifactKind::Defaults, "Mode"), None);
}

#[test]
fn namespace_reaches_every_file() {
    let generator =
        Generator::from_json(TREE, GeneratorConfig::with_namespace("App\\Dom")).unwrap();
    for (path, text) in generator.generate_all().unwrap() {
        let expected = if path.starts_with("Defaults/") {
            "namespace App\\Dom\\Defaults;\n"
        } else if path.starts_with("Scaffold/") {
            "namespace App\\Dom\\Scaffold;\n"
        } else {
            "namespace App\\Dom;\n"
        };
        assert!(text.contains(expected), "{path} lacks `{expected}`");
    }
}

#[test]
fn legacy_members_are_dropped_on_request() {
    let keep = Generator::from_json(TREE, GeneratorConfig::default()).unwrap();
    let node = keep.generate("Node", ArtifactKind::Contract).unwrap();
    assert!(node.text().unwrap().contains("function normalize(): void;"));

    let config = GeneratorConfig {
        drop_legacy: true,
        ..GeneratorConfig::default()
    };
    let drop = Generator::from_json(TREE, config).unwrap();
    let node = drop.generate("Node", ArtifactKind::Contract).unwrap();
    assert!(!node.text().unwrap().contains("normalize"));
}

#[test]
fn invalid_config_is_rejected_before_ingesting() {
    let err = Generator::from_json("[", GeneratorConfig::with_namespace("\\App")).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E3002);
}

#[test]
fn malformed_json_is_an_input_error() {
    let err = Generator::from_json("{", GeneratorConfig::default()).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E3001);

    let err = Generator::from_json(
        r#"[{ "type": "namespace", "name": "CSS", "members": [] }]"#,
        GeneratorConfig::default(),
    )
    .unwrap_err();
    assert_eq!(err.code(), ErrorCode::E3001);
    assert!(err.to_string().contains("namespace"), "{err}");
}

#[test]
fn unknown_definitions_fail() {
    let generator = Generator::from_json(TREE, GeneratorConfig::default()).unwrap();
    let err = generator.generate("Missing", ArtifactKind::Contract).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E0006);
}

#[test]
fn paths_follow_the_kind_directory() {
    assert_eq!(GeneratedSet::path(ArtifactKind::Scaffold, "Node"), "Scaffold/Node.php");
    assert!(GeneratedSet::default().is_empty());
}

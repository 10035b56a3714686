#![allow(clippy::unwrap_used, clippy::expect_used)]

use idl_ir::{Definition, DefinitionKind, ExtAttr, Literal, Member, MemberKind, OperationSpecial, Signature};
use idl_registry::Registry;
use pretty_assertions::assert_eq;

use crate::test_helpers::*;
use crate::ArtifactKind;

fn defaults(registry: &Registry, name: &str) -> String {
    text(registry, name, ArtifactKind::Defaults)
}

fn reflect(member: Member, ext: Vec<ExtAttr>) -> Member {
    member.with_ext_attrs(attrs(ext))
}

fn field(name: &str, type_name: &str, required: bool, default: Option<Literal>) -> Member {
    Member::new(MemberKind::Field {
        name: name.to_string(),
        ty: ty(type_name),
        required,
        default,
    })
}

fn collection(name: &str) -> Definition {
    interface(
        name,
        vec![
            Member::readonly_attribute("length", ty("unsigned long")),
            Member::special(
                OperationSpecial::Getter,
                None,
                ty("Node").nullable(),
                vec![arg("index", "unsigned long")],
            ),
            Member::special(
                OperationSpecial::Getter,
                None,
                ty("Node").nullable(),
                vec![arg("name", "DOMString")],
            ),
        ],
    )
}

#[test]
fn root_interfaces_intercept_properties() {
    let registry = registry(vec![interface(
        "Node",
        vec![
            Member::readonly_attribute("name", ty("DOMString")),
            Member::attribute("title", ty("DOMString")),
        ],
    )]);
    assert_eq!(
        defaults(&registry, "Node"),
        r"<?php

declare(strict_types=1);

namespace Generated\Defaults;

trait Node
{
    public function __get(string $name): mixed
    {
        return match ($name) {
            'name' => $this->getName(),
            'title' => $this->getTitle(),
            default => $this->getMissingProperty($name),
        };
    }

    public function __set(string $name, mixed $value): void
    {
        match ($name) {
            'name' => throw new \Error(sprintf('Cannot modify readonly property %s::$name', static::class)),
            'title' => $this->setTitle($value),
            default => $this->setMissingProperty($name, $value),
        };
    }

    public function getMissingProperty(string $name): mixed
    {
        throw new \Error(sprintf('Undefined property: %s::$%s', static::class, $name));
    }

    public function setMissingProperty(string $name, mixed $value): void
    {
        throw new \Error(sprintf('Cannot create dynamic property %s::$%s', static::class, $name));
    }

    public function undefinedKey(mixed $offset): mixed
    {
        throw new \OutOfBoundsException(sprintf('Undefined key %s on %s', var_export($offset, true), static::class));
    }
}
"
    );
}

#[test]
fn child_interfaces_defer_to_the_parent() {
    let registry = registry(vec![
        interface("Node", vec![]),
        interface("Element", vec![Member::attribute("id", ty("DOMString"))]).with_parent("Node"),
        interface("Leaf", vec![]).with_parent("Node"),
    ]);
    let text = defaults(&registry, "Element");
    assert!(text.contains("            default => parent::__get($name),\n"));
    assert!(text.contains("            default => parent::__set($name, $value),\n"));
    assert!(text.contains(
        "    abstract public function getMissingProperty(string $name): mixed;\n\n    abstract public function setMissingProperty(string $name, mixed $value): void;\n"
    ));
    assert!(!text.contains("undefinedKey"));

    assert!(build(&registry, "Leaf", ArtifactKind::Defaults).is_skip());
}

#[test]
fn mixins_get_traits_only_for_covered_members() {
    let registry = registry_with(
        vec![
            mixin("Plain", vec![Member::attribute("slot", ty("DOMString"))]),
            mixin(
                "Reflected",
                vec![reflect(
                    Member::attribute("slot", ty("DOMString")),
                    vec![ExtAttr::flag("Reflect")],
                )],
            ),
            interface("Element", vec![]),
        ],
        vec![includes("Element", "Reflected")],
    );
    assert!(build(&registry, "Plain", ArtifactKind::Defaults).is_skip());

    let mixin = defaults(&registry, "Reflected");
    assert!(mixin.contains("trait Reflected\n"));
    assert!(mixin.contains("        return $this->getAttribute('slot') ?? '';\n"));
    assert!(!mixin.contains("__get"));

    // The includer flattens the mixin's members into its own trait.
    let element = defaults(&registry, "Element");
    assert!(element.contains("            'slot' => $this->getSlot(),\n"));
    assert!(element.contains("        $this->setAttribute('slot', $value);\n"));
}

#[test]
fn reflected_attributes_read_content_attributes() {
    let element = interface(
        "Element",
        vec![
            reflect(
                Member::attribute("lang", ty("DOMString").nullable()),
                vec![ExtAttr::identifier("Reflect", "xmllang")],
            ),
            reflect(Member::attribute("hidden", ty("boolean")), vec![ExtAttr::flag("Reflect")]),
            reflect(Member::attribute("span", ty("unsigned long")), vec![ExtAttr::flag("Reflect")]),
            reflect(
                Member::attribute("dir", ty("Dir")),
                vec![
                    ExtAttr::flag("Reflect"),
                    ExtAttr::string("ReflectInvalid", "ltr"),
                ],
            ),
            reflect(Member::attribute("data", ty("any")), vec![ExtAttr::flag("Reflect")]),
        ],
    );
    let registry = registry(vec![element, enumeration("Dir", &["ltr", "rtl", "auto"])]);
    let text = defaults(&registry, "Element");

    assert!(text.contains(
        "    public function getLang(): ?string\n    {\n        return $this->getAttribute('xmllang');\n    }\n"
    ));
    assert!(text.contains(
        "    public function setLang(?string $value): void\n    {\n        if ($value === null) {\n            $this->removeAttribute('xmllang');\n            return;\n        }\n        $this->setAttribute('xmllang', $value);\n    }\n"
    ));
    assert!(text.contains("        return $this->hasAttribute('hidden');\n"));
    assert!(text.contains(
        "        if ($value) {\n            $this->setAttribute('hidden', '');\n            return;\n        }\n        $this->removeAttribute('hidden');\n"
    ));
    assert!(text.contains(
        "        $raw = $this->getAttribute('span');\n        return $raw !== null && is_numeric($raw) ? (int) $raw : 0;\n"
    ));
    assert!(text.contains("        $this->setAttribute('span', (string) $value);\n"));
    assert!(text.contains(
        "        $raw = $this->getAttribute('dir');\n        if ($raw === null) {\n            return '';\n        }\n\n        return match (strtolower($raw)) {\n            'ltr' => 'ltr',\n            'rtl' => 'rtl',\n            'auto' => 'auto',\n            default => 'ltr',\n        };\n"
    ));
    // `any` cannot be reflected; the scaffold keeps the stub.
    assert!(!text.contains("function getData("));
}

#[test]
fn put_forwards_writes_through_the_getter() {
    let registry = registry(vec![
        interface("Location", vec![Member::attribute("href", ty("USVString"))]),
        interface(
            "Document",
            vec![
                Member::readonly_attribute("location", ty("Location"))
                    .with_ext_attrs(attrs(vec![ExtAttr::identifier("PutForwards", "href")])),
                Member::readonly_attribute("origin", ty("Location").nullable())
                    .with_ext_attrs(attrs(vec![ExtAttr::identifier("PutForwards", "href")])),
            ],
        ),
    ]);
    let text = defaults(&registry, "Document");
    assert!(text.contains("            'location' => $this->setLocation($value),\n"));
    assert!(text.contains(
        "    public function setLocation(string $value): void\n    {\n        $this->getLocation()->setHref($value);\n    }\n"
    ));
    assert!(text.contains("        $this->getOrigin()?->setHref($value);\n"));
}

#[test]
fn put_forwards_to_a_missing_attribute_fails() {
    let registry = registry(vec![
        interface("Location", vec![]),
        interface(
            "Document",
            vec![Member::readonly_attribute("location", ty("Location"))
                .with_ext_attrs(attrs(vec![ExtAttr::identifier("PutForwards", "href")]))],
        ),
    ]);
    let err = crate::BuildContext::new(&registry, "Generated")
        .build("Document", ArtifactKind::Defaults)
        .unwrap_err();
    assert!(matches!(err, idl_diagnostic::GenError::MissingName { .. }));
}

#[test]
fn keyed_interfaces_get_container_adapters() {
    let registry = registry(vec![collection("NodeList"), interface("Node", vec![])]);
    let text = defaults(&registry, "NodeList");

    assert!(text.contains("use Generated\\Node;\n"));
    assert!(text.contains(
        r"    public function offsetExists(mixed $offset): bool
    {
        if (is_int($offset)) {
            return $offset >= 0 && $offset < $this->count();
        }
        if (is_string($offset)) {
            return $this->namedItem($offset) !== null;
        }
        return false;
    }
"
    ));
    assert!(text.contains(
        r"    public function offsetGet(mixed $offset): mixed
    {
        if (is_int($offset)) {
            return $this->item($offset);
        }
        if (is_string($offset)) {
            return $this->namedItem($offset);
        }
        return $this->undefinedKey($offset);
    }
"
    ));
    assert!(text.contains(
        "    public function offsetSet(mixed $offset, mixed $value): void\n    {\n        $this->undefinedKey($offset);\n    }\n"
    ));
    assert!(text.contains(
        "    public function count(): int\n    {\n        return $this->getLength();\n    }\n"
    ));
    assert!(text.contains(
        r"    /**
     * @return \Iterator<int, Node|null>
     */
    public function getIterator(): \Iterator
    {
        $length = $this->count();
        for ($index = 0; $index < $length; $index++) {
            yield $this->item($index);
        }
    }
"
    ));
}

#[test]
fn keyed_children_fall_back_to_the_parent_adapter() {
    let sub = interface(
        "Sub",
        vec![Member::special(
            OperationSpecial::Setter,
            None,
            ty("undefined"),
            vec![arg("index", "unsigned long"), arg("node", "Node")],
        )],
    )
    .with_parent("NodeList");
    let registry = registry(vec![collection("NodeList"), sub, interface("Node", vec![])]);
    let text = defaults(&registry, "Sub");

    assert!(text.contains("        return parent::offsetExists($offset);\n"));
    assert!(text.contains("        return parent::offsetGet($offset);\n"));
    assert!(text.contains(
        "        if (is_int($offset)) {\n            $this->setItem($offset, $value);\n            return;\n        }\n        parent::offsetSet($offset, $value);\n"
    ));
    assert!(text.contains("    abstract public function undefinedKey(mixed $offset): mixed;\n"));
    assert!(!text.contains("__get"));
}

#[test]
fn stringifiers_become_to_string() {
    let registry = registry(vec![
        interface(
            "Url",
            vec![Member::new(MemberKind::Attribute {
                name: "href".to_string(),
                ty: ty("USVString"),
                readonly: true,
                special: idl_ir::AttributeSpecial::Stringifier,
            })],
        ),
        interface(
            "Token",
            vec![Member::special(OperationSpecial::Stringifier, None, ty("DOMString"), vec![])],
        )
        .with_parent("Url"),
    ]);
    assert!(defaults(&registry, "Url").contains(
        "    public function __toString(): string\n    {\n        return $this->getHref();\n    }\n"
    ));
    assert!(defaults(&registry, "Token").contains("        return $this->toString();\n"));
    // A stringifier alone still brings the keyed adapter, with every key undefined.
    assert!(defaults(&registry, "Url").contains(
        "    public function offsetGet(mixed $offset): mixed\n    {\n        return $this->undefinedKey($offset);\n    }\n"
    ));
}

#[test]
fn dictionary_cast_validates_and_normalizes() {
    let init = dictionary(
        "Init",
        vec![
            field("name", "DOMString", true, None),
            field("bubbles", "boolean", false, Some(Literal::Boolean(false))),
            field("mode", "Mode", false, Some(Literal::String("open".to_string()))),
            field("limit", "long", false, None),
        ],
    );
    let registry = registry(vec![init, enumeration("Mode", &["open", "closed"])]);
    let text = defaults(&registry, "Init");

    assert!(text.contains("use Generated\\Mode;\n"));
    assert!(text.contains(
        r#"    public static function cast(\Generated\Init|array $value): \Generated\Init
    {
        if ($value instanceof \Generated\Init) {
            return $value;
        }
        foreach (['name'] as $field) {
            if (!array_key_exists($field, $value)) {
                throw new \InvalidArgumentException(sprintf('Missing required field "%s" of Init', $field));
            }
        }
        $value += [
            'bubbles' => false,
            'mode' => 'open',
        ];
        if (isset($value['mode'])) {
            $value['mode'] = Mode::cast($value['mode']);
        }

        return new class ($value) implements \Generated\Init {
            use \Generated\Defaults\Init;

            /**
             * @param array<string, mixed> $fields
             */
            public function __construct(private array $fields)
            {
            }

            public function getName(): string
            {
                return $this->fields['name'];
            }
"#
    ));
    assert!(text.contains(
        "            public function getLimit(): ?int\n            {\n                return $this->fields['limit'] ?? null;\n            }\n"
    ));
    assert!(text.contains(
        "        return match ($offset) {\n            'name', 'bubbles', 'mode', 'limit' => $this->offsetGet($offset) !== null,\n            default => false,\n        };\n"
    ));
    assert!(text.contains("            'mode' => $this->getMode(),\n"));
    assert!(text.contains(
        "            default => throw new \\OutOfBoundsException(sprintf('Undefined field %s of Init', var_export($offset, true))),\n"
    ));
    assert_eq!(text.matches("throw new \\LogicException('Init is read-only');").count(), 2);
}

#[test]
fn child_dictionary_cast_accepts_the_root_type() {
    let registry = registry(vec![
        dictionary("Init", vec![field("name", "DOMString", false, None)]),
        dictionary(
            "ClickInit",
            vec![field("button", "long", false, Some(Literal::Number("0".to_string())))],
        )
        .with_parent("Init"),
    ]);
    let text = defaults(&registry, "ClickInit");
    assert!(text.contains(
        "    public static function cast(\\Generated\\Init|array $value): \\Generated\\ClickInit\n"
    ));
    assert!(text.contains(
        "        if ($value instanceof \\Generated\\Init) {\n            $value = array_filter([\n                'name' => $value->getName(),\n            ], static fn (mixed $field): bool => $field !== null);\n        }\n"
    ));
    assert!(text.contains("            'button' => 0,\n"));
    assert!(text.contains("            'name', 'button' => $this->offsetGet($offset) !== null,\n"));
}

#[test]
fn grandchild_dictionary_cast_flattens_every_ancestor_level() {
    let registry = registry(vec![
        dictionary("EventInit", vec![field("bubbles", "boolean", false, None)]),
        dictionary("UIEventInit", vec![field("detail", "long", false, None)])
            .with_parent("EventInit"),
        dictionary("MouseEventInit", vec![field("button", "short", false, None)])
            .with_parent("UIEventInit"),
    ]);
    let text = defaults(&registry, "MouseEventInit");
    assert!(text.contains(
        "    public static function cast(\\Generated\\EventInit|array $value): \\Generated\\MouseEventInit\n"
    ));
    let middle = "        if ($value instanceof \\Generated\\UIEventInit) {\n            $value = array_filter([\n                'bubbles' => $value->getBubbles(),\n                'detail' => $value->getDetail(),\n            ], static fn (mixed $field): bool => $field !== null);\n        }\n";
    let root = "        if ($value instanceof \\Generated\\EventInit) {\n            $value = array_filter([\n                'bubbles' => $value->getBubbles(),\n            ], static fn (mixed $field): bool => $field !== null);\n        }\n";
    let (Some(at_middle), Some(at_root)) = (text.find(middle), text.find(root)) else {
        panic!("missing an ancestor branch in:\n{text}");
    };
    assert!(at_middle < at_root, "nearest ancestor must be tested first");
}

#[test]
fn fieldless_ancestor_instances_become_empty_arrays() {
    let registry = registry(vec![
        dictionary("Options", vec![]),
        dictionary("MoreOptions", vec![field("depth", "long", false, None)])
            .with_parent("Options"),
    ]);
    let text = defaults(&registry, "MoreOptions");
    assert!(text.contains(
        "        if ($value instanceof \\Generated\\Options) {\n            $value = [];\n        }\n"
    ));
}

#[test]
fn callbacks_wrap_closures() {
    let filter = Definition::new(
        "Filter",
        DefinitionKind::Callback {
            signature: Signature {
                ret: ty("boolean"),
                arguments: vec![arg("value", "DOMString")],
            },
        },
    );
    let registry = registry(vec![filter]);
    assert_eq!(
        defaults(&registry, "Filter"),
        r"<?php

declare(strict_types=1);

namespace Generated\Defaults;

trait Filter
{
    public static function cast(\Generated\Filter|callable $value): \Generated\Filter
    {
        if ($value instanceof \Generated\Filter) {
            return $value;
        }

        return new class (\Closure::fromCallable($value)) implements \Generated\Filter {
            use \Generated\Defaults\Filter;

            public function __construct(private \Closure $callable)
            {
            }

            public function invoke(string $value): bool
            {
                return ($this->callable)($value);
            }
        };
    }
}
"
    );
}

#[test]
fn callback_interfaces_route_invoke_to_the_operation() {
    let handler = Definition::new("Handler", DefinitionKind::CallbackInterface).with_members(vec![
        Member::operation("handleEvent", ty("undefined"), vec![arg("event", "Event")]),
        Member::operation("dispose", ty("undefined"), vec![]),
    ]);
    let registry = registry(vec![handler, interface("Event", vec![])]);
    let text = defaults(&registry, "Handler");

    assert!(text.contains("use Generated\\Event;\n"));
    assert!(text.contains(
        "            public function handleEvent(Event $event): void\n            {\n                ($this->callable)($event);\n            }\n"
    ));
    assert!(text.contains(
        "            public function dispose(): void\n            {\n                throw new \\BadMethodCallException('Not implemented: Handler::dispose');\n            }\n"
    ));
    assert!(text.contains(
        "    public function invoke(Event $event): void\n    {\n        $this->handleEvent($event);\n    }\n"
    ));
}

#[test]
fn enums_have_no_defaults() {
    let registry = registry(vec![enumeration("Mode", &["a"])]);
    assert!(build(&registry, "Mode", ArtifactKind::Defaults).is_skip());
}

//! Deserialization of the external parser's JSON tree.
//!
//! The parser emits loosely-typed objects tagged by a `type` string. Each
//! object is first read into a permissive `Raw*` struct, then converted into
//! the closed IR types. Conversion is where shape errors surface: an unknown
//! tag, a union flag on a string payload, a generic with the wrong arity.

use serde::de::{Deserializer, Error as _, IgnoredAny};
use serde::Deserialize;

use crate::{
    Argument, AttributeSpecial, Definition, DefinitionKind, ExtAttr, ExtAttrValue, ExtAttrs,
    GenericKind, Literal, Member, MemberKind, Node, OperationSpecial, Signature, TypeKind,
    TypeNode,
};

/// A node of the input tree that does not have a recognized shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    #[error("unknown definition kind `{0}`")]
    UnknownDefinition(String),

    #[error("unsupported member kind `{0}`")]
    UnknownMember(String),

    #[error("`{node}` node is missing `{field}`")]
    MissingField {
        node: &'static str,
        field: &'static str,
    },

    #[error("unknown special qualifier `{special}` on {member}")]
    UnknownSpecial {
        member: &'static str,
        special: String,
    },

    #[error("unrecognized type-node shape: {0}")]
    Type(String),

    #[error("unknown generic type `{0}`")]
    UnknownGeneric(String),

    #[error("unrecognized literal kind `{0}`")]
    UnknownLiteral(String),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNode {
    #[serde(rename = "type")]
    tag: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    inheritance: Option<String>,
    #[serde(default)]
    partial: bool,
    #[serde(default)]
    members: Vec<RawMember>,
    #[serde(default)]
    values: Vec<RawEnumValue>,
    #[serde(default)]
    idl_type: Option<RawType>,
    #[serde(default)]
    arguments: Vec<RawArgument>,
    #[serde(default)]
    target: Option<String>,
    #[serde(default)]
    includes: Option<String>,
    #[serde(default)]
    ext_attrs: Vec<RawExtAttr>,
}

#[derive(Deserialize)]
struct RawEnumValue {
    value: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMember {
    #[serde(rename = "type")]
    tag: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    idl_type: Option<RawIdlTypeField>,
    #[serde(default)]
    readonly: bool,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    special: String,
    #[serde(default)]
    arguments: Vec<RawArgument>,
    #[serde(default)]
    default: Option<RawLiteral>,
    #[serde(default)]
    value: Option<RawLiteral>,
    #[serde(default, rename = "async")]
    is_async: bool,
    #[serde(default)]
    ext_attrs: Vec<RawExtAttr>,
    #[serde(default)]
    comments: Vec<String>,
}

/// Members carry a single type, except iterables which carry one or two.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawIdlTypeField {
    One(RawType),
    Many(Vec<RawType>),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawType {
    #[serde(default)]
    generic: String,
    #[serde(default)]
    nullable: bool,
    #[serde(default)]
    union: bool,
    idl_type: RawTypePayload,
    #[serde(default)]
    ext_attrs: Vec<RawExtAttr>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTypePayload {
    Name(String),
    Nested(Vec<RawType>),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArgument {
    name: String,
    idl_type: RawType,
    #[serde(default)]
    optional: bool,
    #[serde(default)]
    variadic: bool,
    #[serde(default)]
    default: Option<RawLiteral>,
    #[serde(default)]
    ext_attrs: Vec<RawExtAttr>,
}

#[derive(Deserialize)]
struct RawLiteral {
    #[serde(rename = "type")]
    tag: String,
    #[serde(default)]
    value: Option<RawScalar>,
    #[serde(default)]
    negative: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawScalar {
    Bool(bool),
    Text(String),
    List(Vec<IgnoredAny>),
}

#[derive(Deserialize)]
struct RawExtAttr {
    name: String,
    #[serde(default)]
    rhs: Option<RawRhs>,
}

#[derive(Deserialize)]
struct RawRhs {
    #[serde(rename = "type")]
    tag: String,
    value: RawRhsValue,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRhsValue {
    One(String),
    List(Vec<RawRhsItem>),
}

#[derive(Deserialize)]
struct RawRhsItem {
    value: String,
}

// Public entry points

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawNode::deserialize(deserializer)?;
        convert_node(raw).map_err(D::Error::custom)
    }
}

impl<'de> Deserialize<'de> for TypeNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawType::deserialize(deserializer)?;
        convert_type(raw).map_err(D::Error::custom)
    }
}

impl<'de> Deserialize<'de> for Literal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawLiteral::deserialize(deserializer)?;
        convert_literal(raw).map_err(D::Error::custom)
    }
}

// Conversions

fn convert_node(raw: RawNode) -> Result<Node, ShapeError> {
    let tag = raw.tag.as_str();
    match tag {
        "includes" => {
            let target = raw.target.ok_or(ShapeError::MissingField {
                node: "includes",
                field: "target",
            })?;
            let mixin = raw.includes.ok_or(ShapeError::MissingField {
                node: "includes",
                field: "includes",
            })?;
            return Ok(Node::Includes { target, mixin });
        }
        "typedef" => {
            let name = raw.name.ok_or(ShapeError::MissingField {
                node: "typedef",
                field: "name",
            })?;
            let ty = raw.idl_type.ok_or(ShapeError::MissingField {
                node: "typedef",
                field: "idlType",
            })?;
            return Ok(Node::Typedef {
                name,
                ty: convert_type(ty)?,
            });
        }
        _ => {}
    }

    let kind = match tag {
        "interface" => DefinitionKind::Interface,
        "interface mixin" => DefinitionKind::InterfaceMixin,
        "dictionary" => DefinitionKind::Dictionary,
        "callback interface" => DefinitionKind::CallbackInterface,
        "enum" => DefinitionKind::Enum {
            values: raw.values.into_iter().map(|v| v.value).collect(),
        },
        "callback" => {
            let ret = raw.idl_type.ok_or(ShapeError::MissingField {
                node: "callback",
                field: "idlType",
            })?;
            DefinitionKind::Callback {
                signature: Signature {
                    ret: convert_type(ret)?,
                    arguments: convert_arguments(raw.arguments)?,
                },
            }
        }
        other => return Err(ShapeError::UnknownDefinition(other.to_string())),
    };

    let name = raw.name.ok_or(ShapeError::MissingField {
        node: "definition",
        field: "name",
    })?;
    let members = raw
        .members
        .into_iter()
        .map(convert_member)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Node::Definition(Definition {
        name,
        kind,
        members,
        inheritance: raw.inheritance.filter(|parent| !parent.is_empty()),
        partial: raw.partial,
        ext_attrs: convert_ext_attrs(raw.ext_attrs),
    }))
}

fn convert_member(raw: RawMember) -> Result<Member, ShapeError> {
    let node = member_tag(&raw.tag)?;
    let kind = match node {
        "attribute" => MemberKind::Attribute {
            name: required_name(raw.name, node)?,
            ty: single_type(raw.idl_type, node)?,
            readonly: raw.readonly,
            special: match raw.special.as_str() {
                "" => AttributeSpecial::None,
                "static" => AttributeSpecial::Static,
                "stringifier" => AttributeSpecial::Stringifier,
                "inherit" => AttributeSpecial::Inherit,
                other => {
                    return Err(ShapeError::UnknownSpecial {
                        member: node,
                        special: other.to_string(),
                    })
                }
            },
        },
        "field" => MemberKind::Field {
            name: required_name(raw.name, node)?,
            ty: single_type(raw.idl_type, node)?,
            required: raw.required,
            default: raw.default.map(convert_literal).transpose()?,
        },
        "operation" => {
            let special = match raw.special.as_str() {
                "" => OperationSpecial::None,
                "static" => OperationSpecial::Static,
                "getter" => OperationSpecial::Getter,
                "setter" => OperationSpecial::Setter,
                "deleter" => OperationSpecial::Deleter,
                "stringifier" => OperationSpecial::Stringifier,
                other => {
                    return Err(ShapeError::UnknownSpecial {
                        member: node,
                        special: other.to_string(),
                    })
                }
            };
            // `stringifier;` has no written return type.
            let ret = match raw.idl_type {
                None if special == OperationSpecial::Stringifier => TypeNode::named("DOMString"),
                other => single_type(other, node)?,
            };
            MemberKind::Operation {
                name: raw.name.filter(|name| !name.is_empty()),
                signature: Signature {
                    ret,
                    arguments: convert_arguments(raw.arguments)?,
                },
                special,
            }
        }
        "const" => MemberKind::Const {
            name: required_name(raw.name, node)?,
            ty: single_type(raw.idl_type, node)?,
            value: convert_literal(raw.value.ok_or(ShapeError::MissingField {
                node,
                field: "value",
            })?)?,
        },
        "iterable" => {
            let mut types = match raw.idl_type {
                Some(RawIdlTypeField::Many(types)) => types,
                Some(RawIdlTypeField::One(ty)) => vec![ty],
                None => Vec::new(),
            };
            let (key, value) = match types.len() {
                1 => (None, types.remove(0)),
                2 => {
                    let value = types.remove(1);
                    (Some(convert_type(types.remove(0))?), value)
                }
                n => {
                    return Err(ShapeError::Type(format!(
                        "iterable declares {n} type arguments"
                    )))
                }
            };
            MemberKind::Iterable {
                key,
                value: convert_type(value)?,
                is_async: raw.is_async || raw.tag == "async_iterable",
            }
        }
        _ => MemberKind::Constructor {
            arguments: convert_arguments(raw.arguments)?,
        },
    };

    Ok(Member {
        kind,
        ext_attrs: convert_ext_attrs(raw.ext_attrs),
        comments: raw.comments,
    })
}

/// Map a member tag onto the static names used in errors.
fn member_tag(tag: &str) -> Result<&'static str, ShapeError> {
    match tag {
        "attribute" => Ok("attribute"),
        "field" => Ok("field"),
        "operation" => Ok("operation"),
        "const" => Ok("const"),
        "iterable" | "async_iterable" => Ok("iterable"),
        "constructor" => Ok("constructor"),
        other => Err(ShapeError::UnknownMember(other.to_string())),
    }
}

fn required_name(name: Option<String>, node: &'static str) -> Result<String, ShapeError> {
    name.filter(|name| !name.is_empty())
        .ok_or(ShapeError::MissingField {
            node,
            field: "name",
        })
}

fn single_type(field: Option<RawIdlTypeField>, node: &'static str) -> Result<TypeNode, ShapeError> {
    match field {
        Some(RawIdlTypeField::One(ty)) => convert_type(ty),
        Some(RawIdlTypeField::Many(_)) => Err(ShapeError::Type(format!(
            "{node} declares a list where a single type is expected"
        ))),
        None => Err(ShapeError::MissingField {
            node,
            field: "idlType",
        }),
    }
}

fn convert_type(raw: RawType) -> Result<TypeNode, ShapeError> {
    let ext_attrs = convert_ext_attrs(raw.ext_attrs);
    let kind = match (raw.union, raw.generic.as_str(), raw.idl_type) {
        (false, "", RawTypePayload::Name(name)) => {
            if name.is_empty() {
                return Err(ShapeError::Type("empty type name".to_string()));
            }
            TypeKind::Named(name)
        }
        (false, "", RawTypePayload::Nested(mut inner)) if inner.len() == 1 => {
            // Some parser versions wrap a plain type in a one-element list.
            let mut node = convert_type(inner.remove(0))?;
            node.nullable |= raw.nullable;
            node.ext_attrs.merge(&ext_attrs);
            return Ok(node);
        }
        (true, "", RawTypePayload::Nested(members)) => {
            if members.len() < 2 {
                return Err(ShapeError::Type(format!(
                    "union with {} member(s)",
                    members.len()
                )));
            }
            TypeKind::Union(
                members
                    .into_iter()
                    .map(convert_type)
                    .collect::<Result<_, _>>()?,
            )
        }
        (false, keyword, RawTypePayload::Nested(args)) if !keyword.is_empty() => {
            let kind = GenericKind::from_keyword(keyword)
                .ok_or_else(|| ShapeError::UnknownGeneric(keyword.to_string()))?;
            if args.len() != kind.arity() {
                return Err(ShapeError::Type(format!(
                    "{keyword} takes {} argument(s), found {}",
                    kind.arity(),
                    args.len()
                )));
            }
            TypeKind::Generic(
                kind,
                args.into_iter()
                    .map(convert_type)
                    .collect::<Result<_, _>>()?,
            )
        }
        (union, generic, payload) => {
            let payload = match payload {
                RawTypePayload::Name(name) => format!("name `{name}`"),
                RawTypePayload::Nested(list) => format!("{} nested type(s)", list.len()),
            };
            return Err(ShapeError::Type(format!(
                "union={union}, generic=`{generic}`, {payload}"
            )));
        }
    };

    Ok(TypeNode {
        kind,
        nullable: raw.nullable,
        ext_attrs,
    })
}

fn convert_arguments(raw: Vec<RawArgument>) -> Result<Vec<Argument>, ShapeError> {
    raw.into_iter()
        .map(|arg| {
            Ok(Argument {
                name: arg.name,
                ty: convert_type(arg.idl_type)?,
                optional: arg.optional,
                variadic: arg.variadic,
                default: arg.default.map(convert_literal).transpose()?,
                ext_attrs: convert_ext_attrs(arg.ext_attrs),
            })
        })
        .collect()
}

fn convert_literal(raw: RawLiteral) -> Result<Literal, ShapeError> {
    match (raw.tag.as_str(), raw.value) {
        ("number", Some(RawScalar::Text(text))) => Ok(Literal::Number(text)),
        ("boolean", Some(RawScalar::Bool(value))) => Ok(Literal::Boolean(value)),
        ("null", _) => Ok(Literal::Null),
        ("string", Some(RawScalar::Text(text))) => Ok(Literal::String(text)),
        ("Infinity", _) => Ok(Literal::Infinity {
            negative: raw.negative,
        }),
        ("NaN", _) => Ok(Literal::NaN),
        ("sequence", None | Some(RawScalar::List(_))) => Ok(Literal::EmptySequence),
        ("dictionary", _) => Ok(Literal::EmptyDictionary),
        (tag, _) => Err(ShapeError::UnknownLiteral(tag.to_string())),
    }
}

fn convert_ext_attrs(raw: Vec<RawExtAttr>) -> ExtAttrs {
    raw.into_iter()
        .map(|attr| ExtAttr {
            name: attr.name,
            rhs: attr.rhs.map(|rhs| match (rhs.tag.as_str(), rhs.value) {
                ("string", RawRhsValue::One(text)) => {
                    ExtAttrValue::String(text.trim_matches('"').to_string())
                }
                (_, RawRhsValue::One(text)) => ExtAttrValue::Identifier(text),
                (_, RawRhsValue::List(items)) => {
                    ExtAttrValue::IdentifierList(items.into_iter().map(|item| item.value).collect())
                }
            }),
        })
        .collect()
}

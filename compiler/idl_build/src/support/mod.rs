//! Member queries shared by the Defaults and Scaffold builders, so both agree
//! on which members the Defaults trait covers.

use idl_diagnostic::{GenError, Result};
use idl_ir::{
    AttributeSpecial, Definition, Literal, MemberKind, OperationSpecial, Primitive, TypeNode,
};
use idl_registry::{NameCategory, Registry, SpecialKind, SurfaceMember};

use crate::{walk_members, AttributeMember, FieldMember, MemberVisitor, OperationGroup};

/// Content attribute projection of a `[Reflect]` attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Reflection<'a> {
    /// `DOMString`; absent reads as `''` unless nullable.
    String { content: String, nullable: bool },
    /// Presence of the content attribute.
    Boolean { content: String },
    /// Numeric content, `0` when absent or unparsable.
    Integer { content: String },
    /// Keyword normalized against an enum's values.
    Enum {
        content: String,
        values: &'a [String],
        invalid: String,
        missing: String,
    },
}

/// `[PutForwards=attr]`: the setter writes through to `attr` of the object the
/// getter returns.
#[derive(Clone, Debug)]
pub(crate) struct Forward<'a> {
    /// Setter of the target attribute on the target interface.
    pub setter: &'a str,
    /// Type of the target attribute; the forwarding setter accepts it.
    pub ty: &'a TypeNode,
}

const REFLECT: &str = "Reflect";
const REFLECT_INVALID: &str = "ReflectInvalid";
const REFLECT_MISSING: &str = "ReflectMissing";
const PUT_FORWARDS: &str = "PutForwards";

/// How `attribute` is reflected, if it is and its type can be.
pub(crate) fn reflection<'a>(
    registry: &'a Registry,
    attribute: &AttributeMember<'a>,
) -> Result<Option<Reflection<'a>>> {
    let ext_attrs = attribute.ext_attrs();
    let Some(reflect) = ext_attrs.get(REFLECT) else {
        return Ok(None);
    };
    if attribute.is_static() {
        return Ok(None);
    }
    let content = reflect
        .value()
        .map_or_else(|| attribute.name.to_ascii_lowercase(), str::to_string);

    let ty = registry.resolve_typedefs(attribute.ty)?;
    let Some(name) = ty.name() else {
        return Ok(None);
    };
    Ok(match Primitive::from_name(name) {
        Some(Primitive::String) => Some(Reflection::String {
            content,
            nullable: ty.nullable,
        }),
        Some(Primitive::Boolean) if !ty.nullable => Some(Reflection::Boolean { content }),
        Some(Primitive::Integer) if !ty.nullable => Some(Reflection::Integer { content }),
        Some(_) => None,
        None => match registry.get(name) {
            Some(def) if def.is_enum() && !ty.nullable => Some(Reflection::Enum {
                content,
                values: def.enum_values(),
                invalid: ext_attrs.value_of(REFLECT_INVALID).unwrap_or("").to_string(),
                missing: ext_attrs.value_of(REFLECT_MISSING).unwrap_or("").to_string(),
            }),
            _ => None,
        },
    })
}

/// Forwarding target of a `[PutForwards]` attribute.
pub(crate) fn forwarding<'a>(
    registry: &'a Registry,
    attribute: &AttributeMember<'a>,
) -> Result<Option<Forward<'a>>> {
    let Some(target_attr) = attribute.ext_attrs().value_of(PUT_FORWARDS) else {
        return Ok(None);
    };
    let ty = registry.resolve_typedefs(attribute.ty)?;
    let target_name = ty.name().ok_or_else(|| GenError::UnsupportedType {
        detail: format!(
            "`[PutForwards]` on `{}.{}` needs an interface type",
            attribute.owner.name, attribute.name
        ),
    })?;
    let target = registry.definition(target_name)?;

    let missing = || GenError::MissingName {
        definition: target.name.clone(),
        category: NameCategory::Setter.to_string(),
        key: target_attr.to_string(),
    };
    let ty = find_attribute(registry, target, target_attr).ok_or_else(missing)?;
    let (_, setter) = registry
        .find_name(&target.name, NameCategory::Setter, target_attr)
        .ok_or_else(missing)?;
    Ok(Some(Forward { setter, ty }))
}

/// Type of attribute `name` on `definition`, its mixins or its ancestors.
fn find_attribute<'a>(
    registry: &'a Registry,
    definition: &'a Definition,
    name: &str,
) -> Option<&'a TypeNode> {
    std::iter::once(definition)
        .chain(registry.ancestors(definition))
        .flat_map(|def| registry.surface(def))
        .find_map(|surface| match &surface.member.kind {
            MemberKind::Attribute {
                name: attr, ty, ..
            } if attr == name => Some(ty),
            _ => None,
        })
}

/// Whether the Defaults trait implements the getter of `attribute`.
pub(crate) fn covers_getter(registry: &Registry, attribute: &AttributeMember<'_>) -> Result<bool> {
    Ok(reflection(registry, attribute)?.is_some())
}

/// Whether the Defaults trait implements the setter of `attribute`.
pub(crate) fn covers_setter(registry: &Registry, attribute: &AttributeMember<'_>) -> Result<bool> {
    Ok(reflection(registry, attribute)?.is_some() || forwarding(registry, attribute)?.is_some())
}

/// Whether an `inherit` attribute's accessor is the one its ancestor
/// already declares, so the parent scaffold implements it.
pub(crate) fn inherits_accessor(
    registry: &Registry,
    attribute: &AttributeMember<'_>,
    category: NameCategory,
) -> bool {
    if attribute.special != AttributeSpecial::Inherit {
        return false;
    }
    let Some(parent) = attribute.owner.inheritance.as_deref() else {
        return false;
    };
    let own = registry
        .names()
        .get(&attribute.owner.name, category, attribute.name);
    own.is_some()
        && registry
            .find_name(parent, category, attribute.name)
            .map(|(_, ident)| ident)
            == own
}

/// A definition's own members, without included mixins.
pub(crate) fn own_members(definition: &Definition) -> Vec<SurfaceMember<'_>> {
    definition
        .members
        .iter()
        .map(|member| SurfaceMember {
            owner: definition,
            member,
        })
        .collect()
}

/// Generated method name of an operation group; `None` for an unnamed
/// operation that plays no special role.
pub(crate) fn operation_name<'a>(
    registry: &'a Registry,
    operation: &OperationGroup<'a>,
) -> Result<Option<&'a str>> {
    let owner = operation.owner.name.as_str();
    if let Some(name) = operation.name {
        return registry
            .name_of(owner, NameCategory::Operation, name)
            .map(Some);
    }
    let first = operation
        .overloads
        .first()
        .and_then(|signature| signature.arguments.first())
        .map(|arg| &arg.ty);
    match SpecialKind::classify(registry, operation.special, first)? {
        Some(kind) => registry
            .name_of(owner, NameCategory::Special, kind.key())
            .map(Some),
        None => Ok(None),
    }
}

/// Return type of the indexed getter on `definition`'s surface.
pub(crate) fn indexed_getter_type<'a>(
    registry: &'a Registry,
    definition: &'a Definition,
) -> Result<Option<&'a TypeNode>> {
    for surface in registry.surface(definition) {
        if let MemberKind::Operation {
            signature, special, ..
        } = &surface.member.kind
        {
            let first = signature.arguments.first().map(|arg| &arg.ty);
            if SpecialKind::classify(registry, *special, first)? == Some(SpecialKind::IndexedGetter) {
                return Ok(Some(&signature.ret));
            }
        }
    }
    Ok(None)
}

/// Whether a dictionary field can be missing after defaults are applied.
pub(crate) fn field_may_be_absent(field: &FieldMember<'_>) -> bool {
    !field.required && matches!(field.default, None | Some(Literal::Null))
}

/// Named operations without a special role, grouped by name.
pub(crate) fn regular_operations(definition: &Definition) -> Result<Vec<OperationGroup<'_>>> {
    struct Collect<'a>(Vec<OperationGroup<'a>>);

    impl<'a> MemberVisitor<'a> for Collect<'a> {
        fn visit_operation(&mut self, operation: OperationGroup<'a>) -> Result<()> {
            if operation.name.is_some() && operation.special == OperationSpecial::None {
                self.0.push(operation);
            }
            Ok(())
        }
    }

    let mut collect = Collect(Vec::new());
    walk_members(&mut collect, &own_members(definition))?;
    Ok(collect.0)
}

/// Whether `definition` has no inheritance parent.
pub(crate) fn is_root(definition: &Definition) -> bool {
    definition.inheritance.is_none()
}

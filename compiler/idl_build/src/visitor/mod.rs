//! Member Visitor
//!
//! Shared traversal of a definition's surface for the artifact builders.
//!
//! # Design
//!
//! [`walk_members`] visits each member once, in declaration order, and
//! dispatches on the member category with an exhaustive match. Overloads of a
//! named operation, and all constructors, are collected into one group that is
//! visited at the position of the first declaration. Every hook defaults to
//! doing nothing, so a builder overrides only the categories it emits.
//!
//! # Example
//!
//! ```text
//! struct CountGetters {
//!     count: usize,
//! }
//!
//! impl<'a> MemberVisitor<'a> for CountGetters {
//!     fn visit_attribute(&mut self, _attribute: AttributeMember<'a>) -> Result<()> {
//!         self.count += 1;
//!         Ok(())
//!     }
//! }
//! ```

use idl_diagnostic::Result;
use idl_ir::{
    Argument, AttributeSpecial, Definition, ExtAttrs, Literal, Member, MemberKind,
    OperationSpecial, Signature, TypeNode,
};
use idl_registry::SurfaceMember;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

/// `const T NAME = value;`
#[derive(Copy, Clone, Debug)]
pub struct ConstMember<'a> {
    pub owner: &'a Definition,
    pub name: &'a str,
    pub ty: &'a TypeNode,
    pub value: &'a Literal,
}

/// An interface attribute.
#[derive(Copy, Clone, Debug)]
pub struct AttributeMember<'a> {
    pub owner: &'a Definition,
    pub member: &'a Member,
    pub name: &'a str,
    pub ty: &'a TypeNode,
    pub readonly: bool,
    pub special: AttributeSpecial,
}

/// A dictionary field.
#[derive(Copy, Clone, Debug)]
pub struct FieldMember<'a> {
    pub owner: &'a Definition,
    pub name: &'a str,
    pub ty: &'a TypeNode,
    pub required: bool,
    pub default: Option<&'a Literal>,
}

/// All overloads of one operation.
#[derive(Clone, Debug)]
pub struct OperationGroup<'a> {
    pub owner: &'a Definition,
    /// `None` for an unnamed special operation, which is never grouped.
    pub name: Option<&'a str>,
    pub special: OperationSpecial,
    pub overloads: SmallVec<[&'a Signature; 1]>,
}

/// `iterable<V>` / `iterable<K, V>`.
#[derive(Copy, Clone, Debug)]
pub struct IterableMember<'a> {
    pub owner: &'a Definition,
    pub key: Option<&'a TypeNode>,
    pub value: &'a TypeNode,
    pub is_async: bool,
}

/// Every constructor of one definition.
#[derive(Clone, Debug)]
pub struct ConstructorGroup<'a> {
    pub owner: &'a Definition,
    pub overloads: SmallVec<[&'a [Argument]; 1]>,
}

/// Per-category hooks over a definition's members.
pub trait MemberVisitor<'a> {
    fn visit_const(&mut self, constant: ConstMember<'a>) -> Result<()> {
        let _ = constant;
        Ok(())
    }

    fn visit_attribute(&mut self, attribute: AttributeMember<'a>) -> Result<()> {
        let _ = attribute;
        Ok(())
    }

    fn visit_field(&mut self, field: FieldMember<'a>) -> Result<()> {
        let _ = field;
        Ok(())
    }

    fn visit_operation(&mut self, operation: OperationGroup<'a>) -> Result<()> {
        let _ = operation;
        Ok(())
    }

    fn visit_iterable(&mut self, iterable: IterableMember<'a>) -> Result<()> {
        let _ = iterable;
        Ok(())
    }

    fn visit_constructor(&mut self, constructor: ConstructorGroup<'a>) -> Result<()> {
        let _ = constructor;
        Ok(())
    }
}

impl AttributeMember<'_> {
    pub fn ext_attrs(&self) -> &ExtAttrs {
        &self.member.ext_attrs
    }

    pub fn is_static(&self) -> bool {
        self.special == AttributeSpecial::Static
    }
}

impl OperationGroup<'_> {
    pub fn is_static(&self) -> bool {
        self.special == OperationSpecial::Static
    }
}

/// Visit `members` in order, grouping overloads and constructors.
pub fn walk_members<'a, V>(visitor: &mut V, members: &[SurfaceMember<'a>]) -> Result<()>
where
    V: MemberVisitor<'a> + ?Sized,
{
    let mut grouped: FxHashSet<(&str, &str)> = FxHashSet::default();
    let mut constructors_seen: FxHashSet<&str> = FxHashSet::default();

    for (index, surface) in members.iter().enumerate() {
        let owner = surface.owner;
        let member = surface.member;
        match &member.kind {
            MemberKind::Const { name, ty, value } => visitor.visit_const(ConstMember {
                owner,
                name,
                ty,
                value,
            })?,
            MemberKind::Attribute {
                name,
                ty,
                readonly,
                special,
            } => visitor.visit_attribute(AttributeMember {
                owner,
                member,
                name,
                ty,
                readonly: *readonly,
                special: *special,
            })?,
            MemberKind::Field {
                name,
                ty,
                required,
                default,
            } => visitor.visit_field(FieldMember {
                owner,
                name,
                ty,
                required: *required,
                default: default.as_ref(),
            })?,
            MemberKind::Operation {
                name: None,
                signature,
                special,
            } => visitor.visit_operation(OperationGroup {
                owner,
                name: None,
                special: *special,
                overloads: SmallVec::from_elem(signature, 1),
            })?,
            MemberKind::Operation {
                name: Some(name),
                signature,
                special,
            } => {
                if !grouped.insert((owner.name.as_str(), name.as_str())) {
                    continue;
                }
                let mut overloads = SmallVec::from_elem(signature, 1);
                overloads.extend(overloads_after(members, index, owner, name));
                visitor.visit_operation(OperationGroup {
                    owner,
                    name: Some(name),
                    special: *special,
                    overloads,
                })?;
            }
            MemberKind::Iterable {
                key,
                value,
                is_async,
            } => visitor.visit_iterable(IterableMember {
                owner,
                key: key.as_ref(),
                value,
                is_async: *is_async,
            })?,
            MemberKind::Constructor { .. } => {
                if !constructors_seen.insert(owner.name.as_str()) {
                    continue;
                }
                let overloads = members[index..]
                    .iter()
                    .filter(|other| std::ptr::eq(other.owner, owner))
                    .filter_map(|other| match &other.member.kind {
                        MemberKind::Constructor { arguments } => Some(arguments.as_slice()),
                        _ => None,
                    })
                    .collect();
                visitor.visit_constructor(ConstructorGroup { owner, overloads })?;
            }
        }
    }
    Ok(())
}

/// Later declarations of the operation `name` on `owner`.
fn overloads_after<'a>(
    members: &[SurfaceMember<'a>],
    index: usize,
    owner: &'a Definition,
    name: &str,
) -> impl Iterator<Item = &'a Signature> {
    let rest: Vec<&'a Signature> = members
        .iter()
        .skip(index + 1)
        .filter(|other| std::ptr::eq(other.owner, owner))
        .filter_map(|other| match &other.member.kind {
            MemberKind::Operation {
                name: Some(other_name),
                signature,
                ..
            } if other_name == name => Some(signature),
            _ => None,
        })
        .collect();
    rest.into_iter()
}

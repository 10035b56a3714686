//! idlgen IR - WebIDL Definition Tree
//!
//! This crate contains the data structures the generator consumes:
//! - Top-level nodes (definitions, `includes` edges, typedefs)
//! - Members (attributes, fields, operations, constants, iterables, constructors)
//! - Type nodes (named, union, generic), built-in type names, and literal values
//! - Extended attributes
//!
//! # Input Boundary
//!
//! The tree is produced by an external WebIDL parser and arrives as JSON in the
//! webidl2 shape. The `wire` module deserializes that shape into the closed sum
//! types below; an inconsistent node is rejected there with a [`ShapeError`],
//! so everything downstream can match exhaustively.
//!
//! # Design Philosophy
//!
//! - **Closed variants**: definition kinds, member kinds, type shapes and
//!   literals are enums, never string tags.
//! - **Owned strings**: the tree is small and built once; no interning.

mod ast;
mod ext_attr;
mod literal;
mod primitive;
mod types;
mod wire;

pub use ast::{
    Argument, AttributeSpecial, Definition, DefinitionKind, Member, MemberKind, Node,
    OperationSpecial, Signature,
};
pub use ext_attr::{ExtAttr, ExtAttrValue, ExtAttrs};
pub use literal::Literal;
pub use primitive::Primitive;
pub use types::{GenericKind, TypeKind, TypeNode};
pub use wire::ShapeError;

/// Marker a member's leading comment carries when it is kept only for legacy
/// consumers and may be dropped before generation.
pub const LEGACY_MARKER: &str = "@legacy";

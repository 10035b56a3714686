//! Type nodes.
//!
//! A WebIDL type is recursive: a union holds other types, a generic holds
//! its arguments. Nullability and extended attributes live on every node.

use crate::ExtAttrs;

/// A (possibly nested) WebIDL type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeNode {
    /// The shape of this type.
    pub kind: TypeKind,

    /// Whether the type was written with a trailing `?`.
    pub nullable: bool,

    /// Extended attributes attached to the type itself.
    pub ext_attrs: ExtAttrs,
}

/// The shape of a type node.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// A primitive, typedef, or definition name: `long`, `DOMString`, `Node`.
    Named(String),

    /// `(A or B or C)`.
    Union(Vec<TypeNode>),

    /// `sequence<T>`, `record<K, V>`, `Promise<T>`, ...
    Generic(GenericKind, Vec<TypeNode>),
}

/// The generic type constructors WebIDL defines.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GenericKind {
    Sequence,
    FrozenArray,
    ObservableArray,
    Record,
    Promise,
}

impl GenericKind {
    /// Parse the keyword used in the source.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "sequence" => Some(GenericKind::Sequence),
            "FrozenArray" => Some(GenericKind::FrozenArray),
            "ObservableArray" => Some(GenericKind::ObservableArray),
            "record" => Some(GenericKind::Record),
            "Promise" => Some(GenericKind::Promise),
            _ => None,
        }
    }

    /// The source keyword.
    pub fn keyword(self) -> &'static str {
        match self {
            GenericKind::Sequence => "sequence",
            GenericKind::FrozenArray => "FrozenArray",
            GenericKind::ObservableArray => "ObservableArray",
            GenericKind::Record => "record",
            GenericKind::Promise => "Promise",
        }
    }

    /// Number of type arguments the constructor takes.
    pub fn arity(self) -> usize {
        match self {
            GenericKind::Record => 2,
            _ => 1,
        }
    }
}

impl TypeNode {
    /// A non-nullable named type.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            kind: TypeKind::Named(name.into()),
            nullable: false,
            ext_attrs: ExtAttrs::default(),
        }
    }

    /// A non-nullable union of the given members.
    pub fn union(members: Vec<TypeNode>) -> Self {
        Self {
            kind: TypeKind::Union(members),
            nullable: false,
            ext_attrs: ExtAttrs::default(),
        }
    }

    /// A non-nullable generic instantiation.
    pub fn generic(kind: GenericKind, args: Vec<TypeNode>) -> Self {
        Self {
            kind: TypeKind::Generic(kind, args),
            nullable: false,
            ext_attrs: ExtAttrs::default(),
        }
    }

    /// The same type with `?` applied.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// The same type carrying the given extended attributes.
    #[must_use]
    pub fn with_ext_attrs(mut self, ext_attrs: ExtAttrs) -> Self {
        self.ext_attrs = ext_attrs;
        self
    }

    /// The referenced name, if this is a named type.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            TypeKind::Named(name) => Some(name),
            TypeKind::Union(_) | TypeKind::Generic(..) => None,
        }
    }
}

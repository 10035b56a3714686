//! Definitions and members.

use crate::{ExtAttrs, Literal, TypeNode, LEGACY_MARKER};

/// A top-level node of the parsed definition list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    /// Interfaces, mixins, dictionaries, enums, callbacks.
    Definition(Definition),

    /// `Target includes Mixin;`
    Includes { target: String, mixin: String },

    /// `typedef Type Name;`
    Typedef { name: String, ty: TypeNode },
}

/// A named definition that produces generated artifacts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Definition {
    /// Definition name, unique across the registry.
    pub name: String,

    /// What kind of definition this is, with kind-specific payload.
    pub kind: DefinitionKind,

    /// Members in declaration order. Always empty for enums and callbacks.
    pub members: Vec<Member>,

    /// Direct parent (`interface Foo : Bar`).
    pub inheritance: Option<String>,

    /// `partial interface Foo { ... }`; only meaningful during ingestion.
    pub partial: bool,

    /// Extended attributes on the definition.
    pub ext_attrs: ExtAttrs,
}

/// The kind of a definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DefinitionKind {
    Interface,
    InterfaceMixin,
    Dictionary,
    /// String-backed enumeration, values in declaration order.
    Enum { values: Vec<String> },
    /// `callback Name = Return (args);`
    Callback { signature: Signature },
    CallbackInterface,
}

/// Return type and arguments of an invocable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub ret: TypeNode,
    pub arguments: Vec<Argument>,
}

/// One argument of an operation, constructor, or callback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Argument {
    pub name: String,
    pub ty: TypeNode,
    pub optional: bool,
    pub variadic: bool,
    pub default: Option<Literal>,
    pub ext_attrs: ExtAttrs,
}

/// A member of a definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub kind: MemberKind,
    pub ext_attrs: ExtAttrs,
    /// Leading comments surfaced by the parser.
    pub comments: Vec<String>,
}

/// Member categories.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MemberKind {
    Attribute {
        name: String,
        ty: TypeNode,
        readonly: bool,
        special: AttributeSpecial,
    },
    /// Dictionary field.
    Field {
        name: String,
        ty: TypeNode,
        required: bool,
        default: Option<Literal>,
    },
    Operation {
        /// Absent for unnamed special operations (`getter Node (unsigned long index);`).
        name: Option<String>,
        signature: Signature,
        special: OperationSpecial,
    },
    Const {
        name: String,
        ty: TypeNode,
        value: Literal,
    },
    /// `iterable<V>` or `iterable<K, V>`.
    Iterable {
        key: Option<TypeNode>,
        value: TypeNode,
        is_async: bool,
    },
    Constructor {
        arguments: Vec<Argument>,
    },
}

/// Qualifier on an attribute.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AttributeSpecial {
    #[default]
    None,
    Static,
    Stringifier,
    Inherit,
}

/// Qualifier on an operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OperationSpecial {
    #[default]
    None,
    Static,
    Getter,
    Setter,
    Deleter,
    Stringifier,
}

impl Definition {
    /// A non-partial definition with no members.
    pub fn new(name: impl Into<String>, kind: DefinitionKind) -> Self {
        Self {
            name: name.into(),
            kind,
            members: Vec::new(),
            inheritance: None,
            partial: false,
            ext_attrs: ExtAttrs::default(),
        }
    }

    #[must_use]
    pub fn with_members(mut self, members: Vec<Member>) -> Self {
        self.members = members;
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.inheritance = Some(parent.into());
        self
    }

    #[must_use]
    pub fn into_partial(mut self) -> Self {
        self.partial = true;
        self
    }

    pub fn is_enum(&self) -> bool {
        matches!(self.kind, DefinitionKind::Enum { .. })
    }

    pub fn is_dictionary(&self) -> bool {
        matches!(self.kind, DefinitionKind::Dictionary)
    }

    pub fn is_mixin(&self) -> bool {
        matches!(self.kind, DefinitionKind::InterfaceMixin)
    }

    /// Enum values; empty for every other kind.
    pub fn enum_values(&self) -> &[String] {
        match &self.kind {
            DefinitionKind::Enum { values } => values,
            _ => &[],
        }
    }
}

impl DefinitionKind {
    /// Human-readable kind, as written in the source.
    pub fn keyword(&self) -> &'static str {
        match self {
            DefinitionKind::Interface => "interface",
            DefinitionKind::InterfaceMixin => "interface mixin",
            DefinitionKind::Dictionary => "dictionary",
            DefinitionKind::Enum { .. } => "enum",
            DefinitionKind::Callback { .. } => "callback",
            DefinitionKind::CallbackInterface => "callback interface",
        }
    }
}

impl Member {
    pub fn new(kind: MemberKind) -> Self {
        Self {
            kind,
            ext_attrs: ExtAttrs::default(),
            comments: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_ext_attrs(mut self, ext_attrs: ExtAttrs) -> Self {
        self.ext_attrs = ext_attrs;
        self
    }

    /// `attribute T name;`
    pub fn attribute(name: impl Into<String>, ty: TypeNode) -> Self {
        Self::new(MemberKind::Attribute {
            name: name.into(),
            ty,
            readonly: false,
            special: AttributeSpecial::None,
        })
    }

    /// `readonly attribute T name;`
    pub fn readonly_attribute(name: impl Into<String>, ty: TypeNode) -> Self {
        Self::new(MemberKind::Attribute {
            name: name.into(),
            ty,
            readonly: true,
            special: AttributeSpecial::None,
        })
    }

    /// `T name;` inside a dictionary.
    pub fn field(name: impl Into<String>, ty: TypeNode) -> Self {
        Self::new(MemberKind::Field {
            name: name.into(),
            ty,
            required: false,
            default: None,
        })
    }

    /// A regular named operation.
    pub fn operation(name: impl Into<String>, ret: TypeNode, arguments: Vec<Argument>) -> Self {
        Self::new(MemberKind::Operation {
            name: Some(name.into()),
            signature: Signature { ret, arguments },
            special: OperationSpecial::None,
        })
    }

    /// A special operation, optionally named.
    pub fn special(
        special: OperationSpecial,
        name: Option<&str>,
        ret: TypeNode,
        arguments: Vec<Argument>,
    ) -> Self {
        Self::new(MemberKind::Operation {
            name: name.map(str::to_string),
            signature: Signature { ret, arguments },
            special,
        })
    }

    /// `const T NAME = value;`
    pub fn constant(name: impl Into<String>, ty: TypeNode, value: Literal) -> Self {
        Self::new(MemberKind::Const {
            name: name.into(),
            ty,
            value,
        })
    }

    /// The member's declared name, if it has one.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            MemberKind::Attribute { name, .. }
            | MemberKind::Field { name, .. }
            | MemberKind::Const { name, .. } => Some(name),
            MemberKind::Operation { name, .. } => name.as_deref(),
            MemberKind::Iterable { .. } | MemberKind::Constructor { .. } => None,
        }
    }

    /// Whether a leading comment marks this member as legacy.
    pub fn is_legacy(&self) -> bool {
        self.comments
            .iter()
            .any(|comment| comment.contains(LEGACY_MARKER))
    }
}

impl Argument {
    /// A required, non-variadic argument.
    pub fn new(name: impl Into<String>, ty: TypeNode) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: false,
            variadic: false,
            default: None,
            ext_attrs: ExtAttrs::default(),
        }
    }

    #[must_use]
    pub fn optional(mut self, default: Option<Literal>) -> Self {
        self.optional = true;
        self.default = default;
        self
    }

    #[must_use]
    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }
}

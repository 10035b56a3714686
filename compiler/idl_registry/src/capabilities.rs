//! Container capabilities derived from a definition's members.
//!
//! A definition's special operations, `length` attribute and `iterable`
//! declaration decide which host container protocols its artifacts carry.
//! `Capabilities` is computed once per query from the definition's surface
//! (own members plus included mixins) and is cheap to rebuild.

use std::collections::BTreeMap;

use bitflags::bitflags;
use idl_diagnostic::Result;
use idl_ir::{AttributeSpecial, Definition, MemberKind, OperationSpecial, TypeNode};

use crate::{NameCategory, Registry};

bitflags! {
    /// Container protocols a definition supports.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct Capability: u16 {
        // === Keyed access (bits 0-5) ===

        const INDEXED_GETTER = 1 << 0;
        const NAMED_GETTER = 1 << 1;
        const INDEXED_SETTER = 1 << 2;
        const NAMED_SETTER = 1 << 3;
        const INDEXED_DELETER = 1 << 4;
        const NAMED_DELETER = 1 << 5;

        // === Other protocols (bits 8-10) ===

        const STRINGIFIER = 1 << 8;
        /// An integer `length` attribute.
        const COUNT = 1 << 9;
        /// An explicit `iterable<...>` declaration.
        const ITERABLE = 1 << 10;

        /// Any of these brings the keyed adapter.
        const KEYED = Self::INDEXED_GETTER.bits()
            | Self::NAMED_GETTER.bits()
            | Self::INDEXED_SETTER.bits()
            | Self::NAMED_SETTER.bits()
            | Self::INDEXED_DELETER.bits()
            | Self::NAMED_DELETER.bits()
            | Self::STRINGIFIER.bits()
            | Self::COUNT.bits();
    }
}

/// The role a special operation plays.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum SpecialKind {
    IndexedGetter,
    NamedGetter,
    IndexedSetter,
    NamedSetter,
    IndexedDeleter,
    NamedDeleter,
    Stringifier,
}

impl SpecialKind {
    pub const ALL: [SpecialKind; 7] = [
        SpecialKind::IndexedGetter,
        SpecialKind::NamedGetter,
        SpecialKind::IndexedSetter,
        SpecialKind::NamedSetter,
        SpecialKind::IndexedDeleter,
        SpecialKind::NamedDeleter,
        SpecialKind::Stringifier,
    ];

    /// Name-map key for the unnamed form of this operation.
    pub fn key(self) -> &'static str {
        match self {
            SpecialKind::IndexedGetter => "indexed-getter",
            SpecialKind::NamedGetter => "named-getter",
            SpecialKind::IndexedSetter => "indexed-setter",
            SpecialKind::NamedSetter => "named-setter",
            SpecialKind::IndexedDeleter => "indexed-deleter",
            SpecialKind::NamedDeleter => "named-deleter",
            SpecialKind::Stringifier => "stringifier",
        }
    }

    /// Method name synthesized for the unnamed form.
    pub fn default_name(self) -> &'static str {
        match self {
            SpecialKind::IndexedGetter => "item",
            SpecialKind::NamedGetter => "namedItem",
            SpecialKind::IndexedSetter => "setItem",
            SpecialKind::NamedSetter => "setNamedItem",
            SpecialKind::IndexedDeleter => "removeItem",
            SpecialKind::NamedDeleter => "removeNamedItem",
            SpecialKind::Stringifier => "toString",
        }
    }

    pub fn flag(self) -> Capability {
        match self {
            SpecialKind::IndexedGetter => Capability::INDEXED_GETTER,
            SpecialKind::NamedGetter => Capability::NAMED_GETTER,
            SpecialKind::IndexedSetter => Capability::INDEXED_SETTER,
            SpecialKind::NamedSetter => Capability::NAMED_SETTER,
            SpecialKind::IndexedDeleter => Capability::INDEXED_DELETER,
            SpecialKind::NamedDeleter => Capability::NAMED_DELETER,
            SpecialKind::Stringifier => Capability::STRINGIFIER,
        }
    }

    /// Classify a special operation. Getters, setters and deleters are
    /// indexed when their first argument is an integer.
    pub fn classify(
        registry: &Registry,
        special: OperationSpecial,
        first_argument: Option<&TypeNode>,
    ) -> Result<Option<Self>> {
        let indexed = match first_argument {
            Some(ty) => registry.is_integer(ty)?,
            None => false,
        };
        Ok(match (special, indexed) {
            (OperationSpecial::Getter, true) => Some(SpecialKind::IndexedGetter),
            (OperationSpecial::Getter, false) => Some(SpecialKind::NamedGetter),
            (OperationSpecial::Setter, true) => Some(SpecialKind::IndexedSetter),
            (OperationSpecial::Setter, false) => Some(SpecialKind::NamedSetter),
            (OperationSpecial::Deleter, true) => Some(SpecialKind::IndexedDeleter),
            (OperationSpecial::Deleter, false) => Some(SpecialKind::NamedDeleter),
            (OperationSpecial::Stringifier, _) => Some(SpecialKind::Stringifier),
            (OperationSpecial::None | OperationSpecial::Static, _) => None,
        })
    }
}

/// Where the implementation of a special role lives.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SpecialSource<'a> {
    /// Unnamed special operation; the method name is synthesized.
    Unnamed { owner: &'a str },
    /// Named special operation.
    Operation { owner: &'a str, name: &'a str },
    /// `stringifier attribute`: the attribute getter.
    Attribute { owner: &'a str, name: &'a str },
}

/// `iterable<V>` or `iterable<K, V>`.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct IterableShape<'a> {
    pub owner: &'a str,
    pub key: Option<&'a TypeNode>,
    pub value: &'a TypeNode,
    pub is_async: bool,
}

/// Container capabilities of one definition.
#[derive(Clone, Debug, Default)]
pub struct Capabilities<'a> {
    flags: Capability,
    /// First declaration of each special role wins.
    specials: BTreeMap<SpecialKind, SpecialSource<'a>>,
    /// Owner and name of the count-capable attribute.
    count: Option<(&'a str, &'a str)>,
    iterable: Option<IterableShape<'a>>,
}

impl<'a> Capabilities<'a> {
    /// Scan `definition` and its included mixins.
    pub fn of(registry: &'a Registry, definition: &'a Definition) -> Result<Self> {
        let mut caps = Capabilities::default();

        for surface in registry.surface(definition) {
            let owner = surface.owner.name.as_str();
            match &surface.member.kind {
                MemberKind::Operation {
                    name,
                    signature,
                    special,
                } => {
                    let first = signature.arguments.first().map(|arg| &arg.ty);
                    let Some(kind) = SpecialKind::classify(registry, *special, first)? else {
                        continue;
                    };
                    let source = match name {
                        Some(name) => SpecialSource::Operation { owner, name },
                        None => SpecialSource::Unnamed { owner },
                    };
                    caps.flags |= kind.flag();
                    caps.specials.entry(kind).or_insert(source);
                }
                MemberKind::Attribute {
                    name, ty, special, ..
                } => {
                    if *special == AttributeSpecial::Stringifier {
                        caps.flags |= Capability::STRINGIFIER;
                        caps.specials
                            .entry(SpecialKind::Stringifier)
                            .or_insert(SpecialSource::Attribute { owner, name });
                    }
                    if name == "length" && caps.count.is_none() && registry.is_integer(ty)? {
                        caps.flags |= Capability::COUNT;
                        caps.count = Some((owner, name));
                    }
                }
                MemberKind::Iterable {
                    key,
                    value,
                    is_async,
                } => {
                    caps.flags |= Capability::ITERABLE;
                    caps.iterable.get_or_insert(IterableShape {
                        owner,
                        key: key.as_ref(),
                        value,
                        is_async: *is_async,
                    });
                }
                MemberKind::Field { .. }
                | MemberKind::Const { .. }
                | MemberKind::Constructor { .. } => {}
            }
        }

        Ok(caps)
    }

    pub fn flags(&self) -> Capability {
        self.flags
    }

    pub fn has(&self, flag: Capability) -> bool {
        self.flags.contains(flag)
    }

    /// Whether the keyed container adapter applies.
    pub fn keyed(&self) -> bool {
        self.flags.intersects(Capability::KEYED)
    }

    /// Whether a forward iterator is derived from `item` and `count`.
    pub fn derives_iterator(&self) -> bool {
        self.flags
            .contains(Capability::INDEXED_GETTER | Capability::COUNT)
            && !self.flags.contains(Capability::ITERABLE)
    }

    /// Whether the definition iterates, explicitly or derived.
    pub fn iterates(&self) -> bool {
        self.has(Capability::ITERABLE) || self.derives_iterator()
    }

    pub fn special(&self, kind: SpecialKind) -> Option<SpecialSource<'a>> {
        self.specials.get(&kind).copied()
    }

    pub fn iterable(&self) -> Option<IterableShape<'a>> {
        self.iterable
    }

    /// Generated method name implementing `kind`, if the role exists.
    pub fn method(&self, registry: &'a Registry, kind: SpecialKind) -> Result<Option<&'a str>> {
        let Some(source) = self.special(kind) else {
            return Ok(None);
        };
        let ident = match source {
            SpecialSource::Unnamed { owner } => {
                registry.name_of(owner, NameCategory::Special, kind.key())?
            }
            SpecialSource::Operation { owner, name } => {
                registry.name_of(owner, NameCategory::Operation, name)?
            }
            SpecialSource::Attribute { owner, name } => {
                registry.name_of(owner, NameCategory::Getter, name)?
            }
        };
        Ok(Some(ident))
    }

    /// Generated getter of the count-capable attribute.
    pub fn count_getter(&self, registry: &'a Registry) -> Result<Option<&'a str>> {
        match self.count {
            Some((owner, name)) => Ok(Some(registry.name_of(owner, NameCategory::Getter, name)?)),
            None => Ok(None),
        }
    }
}

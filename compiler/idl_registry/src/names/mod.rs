//! Collision-free member names.
//!
//! # Algorithm
//!
//! Each definition is resolved once, after everything it inherits or
//! includes:
//!
//! 1. Seed the scope with the host's reserved identifiers.
//! 2. Fold in the names introduced by every definition reachable through
//!    the mixin list (parent first, then sorted includes). A diamond folds a
//!    definition once. Any clash is fatal: those names are already part of
//!    another definition's contract.
//! 3. Reserve structural names for the definition's kind.
//! 4. Reserve one name per own member, in a fixed priority order.
//!
//! A desired name already in scope is retried as `_1_name`, `_2_name`, ...,
//! unless it was introduced by an included mixin: an own member may shadow
//! what it inherits, but clashing with an included mixin is fatal.
//! Scope comparison ignores ASCII case, as PHP method lookup does.
//!
//! Structural names (offset accessors, `cast`, `invoke`, `count`,
//! `getIterator`) reached through a mixin are inherited rather than
//! re-reserved, so a child dictionary shares its parent's `cast`. The ones a
//! PHP interface fixes (`offset*`, `count`, `getIterator`) are never renamed:
//! finding one already taken by an inherited or included member is fatal.
//!
//! An `inherit` attribute reuses the accessor names its ancestors resolved
//! for the same attribute instead of reserving fresh ones.

mod reserved;
mod sanitize;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use idl_diagnostic::{GenError, Result};
use idl_ir::{AttributeSpecial, Definition, DefinitionKind, MemberKind};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::{Capabilities, Capability, Registry, SpecialKind};

pub use reserved::{GET_MISSING, SET_MISSING, UNDEFINED_KEY};
pub use sanitize::{capitalize, constant_name};

/// What a generated name stands for.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum NameCategory {
    // Structural: at most one per definition, key is empty.
    Exists,
    Get,
    Set,
    Unset,
    Invoke,
    Cast,
    Iterator,
    Count,

    // Keyed by enum value.
    EnumValue,
    // Keyed by `SpecialKind::key`.
    Special,
    // Keyed by member name.
    Const,
    Getter,
    Setter,
    Operation,
}

impl NameCategory {
    /// Whether the category names a host protocol method rather than a
    /// declared member.
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            NameCategory::Exists
                | NameCategory::Get
                | NameCategory::Set
                | NameCategory::Unset
                | NameCategory::Invoke
                | NameCategory::Cast
                | NameCategory::Iterator
                | NameCategory::Count
        )
    }

    /// The host method a structural category is bound to.
    pub fn structural_name(self) -> Option<&'static str> {
        match self {
            NameCategory::Exists => Some("offsetExists"),
            NameCategory::Get => Some("offsetGet"),
            NameCategory::Set => Some("offsetSet"),
            NameCategory::Unset => Some("offsetUnset"),
            NameCategory::Invoke => Some("invoke"),
            NameCategory::Cast => Some("cast"),
            NameCategory::Iterator => Some("getIterator"),
            NameCategory::Count => Some("count"),
            _ => None,
        }
    }

    /// The PHP interface that fixes this category's method name, if any.
    /// Such a name can never be renamed.
    pub fn protocol(self) -> Option<&'static str> {
        match self {
            NameCategory::Exists
            | NameCategory::Get
            | NameCategory::Set
            | NameCategory::Unset => Some("\\ArrayAccess"),
            NameCategory::Iterator => Some("\\IteratorAggregate"),
            NameCategory::Count => Some("\\Countable"),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NameCategory::Exists => "exists",
            NameCategory::Get => "get",
            NameCategory::Set => "set",
            NameCategory::Unset => "unset",
            NameCategory::Invoke => "invoke",
            NameCategory::Cast => "cast",
            NameCategory::Iterator => "iterator",
            NameCategory::Count => "count",
            NameCategory::EnumValue => "enum value",
            NameCategory::Special => "special operation",
            NameCategory::Const => "constant",
            NameCategory::Getter => "getter",
            NameCategory::Setter => "setter",
            NameCategory::Operation => "operation",
        }
    }
}

impl fmt::Display for NameCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key of one entry in the [`NameMap`].
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct NameKey<'a> {
    pub definition: &'a str,
    pub category: NameCategory,
    pub key: &'a str,
}

/// `(definition, category, key) -> identifier`, plus the ordered list of
/// identifiers each definition introduced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NameMap {
    entries: BTreeMap<String, BTreeMap<NameCategory, BTreeMap<String, String>>>,
    introduced: BTreeMap<String, Arc<[String]>>,
}

impl NameMap {
    pub fn get(&self, definition: &str, category: NameCategory, key: &str) -> Option<&str> {
        self.entries
            .get(definition)?
            .get(&category)?
            .get(key)
            .map(String::as_str)
    }

    /// Names `definition` introduced, in reservation order.
    pub fn introduced(&self, definition: &str) -> Option<&Arc<[String]>> {
        self.introduced.get(definition)
    }

    /// Every entry, ordered by definition, category, then key.
    pub fn iter(&self) -> impl Iterator<Item = (NameKey<'_>, &str)> {
        self.entries.iter().flat_map(|(definition, categories)| {
            categories.iter().flat_map(move |(&category, keys)| {
                keys.iter().map(move |(key, ident)| {
                    (
                        NameKey {
                            definition,
                            category,
                            key,
                        },
                        ident.as_str(),
                    )
                })
            })
        })
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, definition: &str, category: NameCategory, key: &str, ident: String) {
        self.entries
            .entry(definition.to_string())
            .or_default()
            .entry(category)
            .or_default()
            .insert(key.to_string(), ident);
    }
}

/// A name a definition introduced, with its category.
#[derive(Clone, Debug)]
struct Reservation {
    category: NameCategory,
    ident: String,
}

/// Who holds a (lower-cased) identifier in a scope.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Occupant {
    Builtin,
    Own(NameCategory),
    /// Reached through the inheritance chain.
    Inherited(NameCategory),
    /// Reached through an `includes` edge.
    Included { category: NameCategory, mixin: String },
}

impl Occupant {
    fn category(&self) -> Option<NameCategory> {
        match self {
            Occupant::Builtin => None,
            Occupant::Own(category)
            | Occupant::Inherited(category)
            | Occupant::Included { category, .. } => Some(*category),
        }
    }
}

/// Identifiers in use while resolving one definition.
struct Scope<'d> {
    definition: &'d str,
    used: FxHashMap<String, Occupant>,
    /// Structural names reachable through mixins.
    structural: FxHashMap<NameCategory, String>,
    introduced: Vec<Reservation>,
}

impl<'d> Scope<'d> {
    fn new(definition: &'d str) -> Self {
        let used = reserved::RESERVED
            .iter()
            .map(|name| (name.to_ascii_lowercase(), Occupant::Builtin))
            .collect();
        Self {
            definition,
            used,
            structural: FxHashMap::default(),
            introduced: Vec::new(),
        }
    }

    /// Fold a name introduced by `origin`.
    fn fold(&mut self, origin: &str, reservation: &Reservation, included: bool) -> Result<()> {
        let category = reservation.category;
        let folded = reservation.ident.to_ascii_lowercase();
        match self.used.get(&folded) {
            None => {
                let occupant = if included {
                    Occupant::Included {
                        category,
                        mixin: origin.to_string(),
                    }
                } else {
                    Occupant::Inherited(category)
                };
                self.used.insert(folded, occupant);
                if category.is_structural() {
                    self.structural
                        .entry(category)
                        .or_insert_with(|| reservation.ident.clone());
                }
                Ok(())
            }
            Some(occupant) if occupant.category() == Some(category) && category.is_structural() => {
                Ok(())
            }
            Some(_) => Err(GenError::MixinConflict {
                definition: self.definition.to_string(),
                mixin: origin.to_string(),
                name: reservation.ident.clone(),
            }),
        }
    }

    /// First free spelling of `desired`.
    fn free(&self, desired: &str) -> Result<String> {
        match self.used.get(&desired.to_ascii_lowercase()) {
            None => return Ok(desired.to_string()),
            Some(Occupant::Included { mixin, .. }) => {
                return Err(GenError::MixinConflict {
                    definition: self.definition.to_string(),
                    mixin: mixin.clone(),
                    name: desired.to_string(),
                });
            }
            Some(_) => {}
        }
        let mut attempt = 1usize;
        loop {
            let candidate = format!("_{attempt}_{desired}");
            if !self.used.contains_key(&candidate.to_ascii_lowercase()) {
                return Ok(candidate);
            }
            attempt += 1;
        }
    }
}

/// Memoized, depth-first name resolution over the mixin graph.
pub struct NameResolver<'r> {
    registry: &'r Registry,
    map: NameMap,
    /// Reservations per resolved definition, for folding into includers.
    surfaces: FxHashMap<String, Arc<[Reservation]>>,
    /// Definitions currently being resolved, outermost first.
    in_progress: Vec<String>,
    passes: usize,
}

impl<'r> NameResolver<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            map: NameMap::default(),
            surfaces: FxHashMap::default(),
            in_progress: Vec::new(),
            passes: 0,
        }
    }

    /// Number of definitions whose reservations actually ran.
    pub fn passes(&self) -> usize {
        self.passes
    }

    /// Names `name` introduced, resolving it (and what it builds on) first
    /// if needed.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn resolve(&mut self, name: &str) -> Result<Arc<[String]>> {
        if let Some(done) = self.map.introduced(name) {
            return Ok(Arc::clone(done));
        }
        if let Some(start) = self.in_progress.iter().position(|n| n == name) {
            let mut path = self.in_progress[start..].to_vec();
            path.push(name.to_string());
            return Err(GenError::MixinCycle { path });
        }

        let registry = self.registry;
        let definition = registry.definition(name)?;

        self.in_progress.push(name.to_string());
        for mixin in registry.mixins(name) {
            self.resolve(mixin)?;
        }
        self.in_progress.pop();

        self.passes += 1;
        let mut scope = Scope::new(&definition.name);
        self.fold_mixins(&mut scope, definition)?;
        self.reserve_structural(&mut scope, definition)?;
        self.reserve_members(&mut scope, definition)?;

        let introduced: Arc<[String]> = scope
            .introduced
            .iter()
            .map(|r| r.ident.clone())
            .collect();
        tracing::trace!(definition = name, names = introduced.len(), "resolved");
        self.surfaces
            .insert(name.to_string(), scope.introduced.into());
        self.map
            .introduced
            .insert(name.to_string(), Arc::clone(&introduced));
        Ok(introduced)
    }

    /// The completed map.
    pub fn finish(self) -> NameMap {
        self.map
    }

    fn fold_mixins(&self, scope: &mut Scope<'_>, definition: &Definition) -> Result<()> {
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        seen.insert(scope.definition);

        // Parent first: everything reached through it counts as inherited.
        let included = self.registry.included(&definition.name);
        let mut stack: Vec<(&str, bool)> = included
            .iter()
            .rev()
            .map(|name| (name.as_str(), true))
            .collect();
        if let Some(parent) = &definition.inheritance {
            stack.push((parent.as_str(), false));
        }

        while let Some((origin, via_include)) = stack.pop() {
            if !seen.insert(origin) {
                continue;
            }
            if let Some(reservations) = self.surfaces.get(origin) {
                for reservation in reservations.iter() {
                    scope.fold(origin, reservation, via_include)?;
                }
            }
            stack.extend(
                self.registry
                    .mixins(origin)
                    .iter()
                    .rev()
                    .map(|name| (name.as_str(), via_include)),
            );
        }
        Ok(())
    }

    fn reserve_structural(&mut self, scope: &mut Scope<'_>, definition: &Definition) -> Result<()> {
        let categories: &[NameCategory] = match &definition.kind {
            DefinitionKind::Dictionary => &[
                NameCategory::Exists,
                NameCategory::Get,
                NameCategory::Set,
                NameCategory::Unset,
                NameCategory::Cast,
            ],
            DefinitionKind::Callback { .. } | DefinitionKind::CallbackInterface => {
                &[NameCategory::Invoke, NameCategory::Cast]
            }
            DefinitionKind::Enum { .. } => &[NameCategory::Cast],
            DefinitionKind::Interface | DefinitionKind::InterfaceMixin => {
                let caps = Capabilities::of(self.registry, definition)?;
                if caps.keyed() {
                    &[
                        NameCategory::Exists,
                        NameCategory::Get,
                        NameCategory::Set,
                        NameCategory::Unset,
                    ]
                } else {
                    &[]
                }
            }
        };
        for &category in categories {
            self.reserve_structural_one(scope, category)?;
        }

        for value in definition.enum_values() {
            self.reserve(scope, NameCategory::EnumValue, value, &constant_name(value))?;
        }
        Ok(())
    }

    fn reserve_members(&mut self, scope: &mut Scope<'_>, definition: &Definition) -> Result<()> {
        let registry = self.registry;
        let caps = Capabilities::of(registry, definition)?;

        // (a) iteration, (b) count
        if caps.iterates() {
            self.reserve_structural_one(scope, NameCategory::Iterator)?;
        }
        if caps.has(Capability::COUNT) {
            self.reserve_structural_one(scope, NameCategory::Count)?;
        }

        // (c) unnamed special operations
        for member in &definition.members {
            if let MemberKind::Operation {
                name: None,
                signature,
                special,
            } = &member.kind
            {
                let first = signature.arguments.first().map(|arg| &arg.ty);
                if let Some(kind) = SpecialKind::classify(registry, *special, first)? {
                    self.reserve(scope, NameCategory::Special, kind.key(), kind.default_name())?;
                }
            }
        }

        // (d) constants
        for member in &definition.members {
            if let MemberKind::Const { name, .. } = &member.kind {
                self.reserve(scope, NameCategory::Const, name, name)?;
            }
        }

        // (e) accessors
        for member in &definition.members {
            match &member.kind {
                MemberKind::Attribute {
                    name,
                    readonly,
                    special,
                    ..
                } => {
                    let cap = capitalize(name);
                    let inherit = *special == AttributeSpecial::Inherit;
                    self.reserve_accessor(
                        scope,
                        definition,
                        inherit,
                        NameCategory::Getter,
                        name,
                        &format!("get{cap}"),
                    )?;
                    if !*readonly || member.ext_attrs.has("PutForwards") {
                        self.reserve_accessor(
                            scope,
                            definition,
                            inherit,
                            NameCategory::Setter,
                            name,
                            &format!("set{cap}"),
                        )?;
                    }
                }
                MemberKind::Field { name, .. } => {
                    let cap = capitalize(name);
                    self.reserve(scope, NameCategory::Getter, name, &format!("get{cap}"))?;
                }
                _ => {}
            }
        }

        // (f) named operations; overloads share one name
        for member in &definition.members {
            if let MemberKind::Operation {
                name: Some(name), ..
            } = &member.kind
            {
                self.reserve(scope, NameCategory::Operation, name, name)?;
            }
        }
        Ok(())
    }

    /// Reserve an attribute accessor, or take over the ancestor's name for
    /// an `inherit` attribute.
    fn reserve_accessor(
        &mut self,
        scope: &mut Scope<'_>,
        definition: &Definition,
        inherit: bool,
        category: NameCategory,
        key: &str,
        desired: &str,
    ) -> Result<()> {
        if inherit {
            if let Some(ident) = self.inherited(definition, category, key) {
                self.map.insert(scope.definition, category, key, ident);
                return Ok(());
            }
        }
        self.reserve(scope, category, key, desired)
    }

    /// The name `(category, key)` resolved to on the nearest ancestor, or on
    /// a mixin an ancestor includes.
    fn inherited(&self, definition: &Definition, category: NameCategory, key: &str) -> Option<String> {
        let parent = definition.inheritance.as_deref()?;
        let mut seen = FxHashSet::default();
        let mut stack = vec![parent];
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            if let Some(ident) = self.map.get(current, category, key) {
                return Some(ident.to_string());
            }
            stack.extend(self.registry.mixins(current).iter().rev().map(String::as_str));
        }
        None
    }

    fn reserve_structural_one(
        &mut self,
        scope: &mut Scope<'_>,
        category: NameCategory,
    ) -> Result<()> {
        if let Some(ident) = scope.structural.get(&category) {
            let ident = ident.clone();
            self.map.insert(scope.definition, category, "", ident);
            return Ok(());
        }
        let Some(desired) = category.structural_name() else {
            return Ok(());
        };
        if let Some(protocol) = category.protocol() {
            if scope.used.contains_key(&desired.to_ascii_lowercase()) {
                return Err(GenError::ProtocolConflict {
                    definition: scope.definition.to_string(),
                    protocol: protocol.to_string(),
                    name: desired.to_string(),
                });
            }
        }
        self.reserve(scope, category, "", desired)
    }

    fn reserve(
        &mut self,
        scope: &mut Scope<'_>,
        category: NameCategory,
        key: &str,
        desired: &str,
    ) -> Result<()> {
        if self.map.get(scope.definition, category, key).is_some() {
            return Ok(());
        }
        let ident = scope.free(desired)?;
        scope
            .used
            .insert(ident.to_ascii_lowercase(), Occupant::Own(category));
        if category.is_structural() {
            scope.structural.insert(category, ident.clone());
        }
        self.map
            .insert(scope.definition, category, key, ident.clone());
        scope.introduced.push(Reservation { category, ident });
        Ok(())
    }
}

#[cfg(test)]
mod tests;

//! The frozen definition registry.
//!
//! # Design
//!
//! - Definitions are stored once, sorted case-insensitively by name, and
//!   indexed by an `FxHashMap` for O(1) lookup.
//! - Mixin lists are sorted with the direct parent pinned first, so every
//!   traversal of the inheritance/mixin graph is deterministic.
//! - Names are resolved eagerly during `build`; lookups afterwards are reads.

use std::borrow::Cow;

use idl_diagnostic::{GenError, Result};
use idl_ir::{Definition, Member, Node, Primitive, TypeKind, TypeNode};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::names::{NameCategory, NameMap, NameResolver};

/// Options applied while ingesting the parsed tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IngestOptions {
    /// Drop members whose leading comment carries the legacy marker.
    pub drop_legacy: bool,
}

/// Name-indexed, immutable view of every definition in the input.
#[derive(Debug)]
pub struct Registry {
    /// Definitions in case-insensitive name order.
    definitions: Vec<Definition>,

    /// Definition name -> position in `definitions`.
    index: FxHashMap<String, usize>,

    /// Typedef name -> aliased type.
    typedefs: FxHashMap<String, TypeNode>,

    /// Definition name -> parent (if any) followed by sorted included mixins.
    mixins: FxHashMap<String, Vec<String>>,

    /// Resolved member identifiers.
    names: NameMap,
}

impl Registry {
    /// Ingest a parsed tree and resolve every generated name.
    #[tracing::instrument(level = "debug", skip_all, fields(nodes = nodes.len()))]
    pub fn build(nodes: Vec<Node>, options: IngestOptions) -> Result<Self> {
        let mut registry = ingest(nodes, options)?;

        let names = {
            let mut resolver = NameResolver::new(&registry);
            for definition in &registry.definitions {
                resolver.resolve(&definition.name)?;
            }
            tracing::debug!(passes = resolver.passes(), "name resolution complete");
            resolver.finish()
        };
        registry.names = names;

        Ok(registry)
    }

    /// All definitions, in deterministic order.
    pub fn definitions(&self) -> impl Iterator<Item = &Definition> {
        self.definitions.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Look up a definition by name.
    pub fn get(&self, name: &str) -> Option<&Definition> {
        self.index.get(name).map(|&i| &self.definitions[i])
    }

    /// Look up a definition that must exist.
    pub fn definition(&self, name: &str) -> Result<&Definition> {
        self.get(name).ok_or_else(|| GenError::UnknownDefinition {
            name: name.to_string(),
        })
    }

    /// Look up a typedef by name.
    pub fn typedef(&self, name: &str) -> Option<&TypeNode> {
        self.typedefs.get(name)
    }

    /// Parent (first, if any) followed by included mixins, sorted.
    pub fn mixins(&self, name: &str) -> &[String] {
        self.mixins.get(name).map_or(&[], Vec::as_slice)
    }

    /// Included mixins only, without the parent.
    pub fn included(&self, name: &str) -> &[String] {
        let all = self.mixins(name);
        match self.get(name).and_then(|def| def.inheritance.as_ref()) {
            Some(_) => all.get(1..).unwrap_or_default(),
            None => all,
        }
    }

    /// The direct parent definition.
    pub fn parent(&self, definition: &Definition) -> Option<&Definition> {
        definition
            .inheritance
            .as_deref()
            .and_then(|parent| self.get(parent))
    }

    /// The inheritance chain above `definition`, nearest first.
    pub fn ancestors<'a>(&'a self, definition: &'a Definition) -> Ancestors<'a> {
        Ancestors {
            registry: self,
            next: self.parent(definition),
        }
    }

    /// Own members followed by the members of every included mixin
    /// (transitively, each mixin once). Inherited members are not part of
    /// the surface.
    pub fn surface<'a>(&'a self, definition: &'a Definition) -> Vec<SurfaceMember<'a>> {
        let mut out: Vec<SurfaceMember<'a>> = definition
            .members
            .iter()
            .map(|member| SurfaceMember {
                owner: definition,
                member,
            })
            .collect();

        let mut seen = FxHashSet::default();
        seen.insert(definition.name.as_str());
        let mut stack: Vec<&str> = self
            .included(&definition.name)
            .iter()
            .rev()
            .map(String::as_str)
            .collect();
        while let Some(name) = stack.pop() {
            if !seen.insert(name) {
                continue;
            }
            let Some(mixin) = self.get(name) else {
                continue;
            };
            out.extend(mixin.members.iter().map(|member| SurfaceMember {
                owner: mixin,
                member,
            }));
            stack.extend(self.included(name).iter().rev().map(String::as_str));
        }
        out
    }

    /// The resolved name table.
    pub fn names(&self) -> &NameMap {
        &self.names
    }

    /// The generated identifier for a member, failing if it was never reserved.
    pub fn name_of(&self, definition: &str, category: NameCategory, key: &str) -> Result<&str> {
        self.names
            .get(definition, category, key)
            .ok_or_else(|| GenError::MissingName {
                definition: definition.to_string(),
                category: category.to_string(),
                key: key.to_string(),
            })
    }

    /// Find `(category, key)` on `definition` or anything it inherits or
    /// includes, searching in mixin order. Returns the owning definition name
    /// and the identifier.
    pub fn find_name(
        &self,
        definition: &str,
        category: NameCategory,
        key: &str,
    ) -> Option<(&str, &str)> {
        let mut seen = FxHashSet::default();
        let mut stack = vec![definition];
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            let Some(def) = self.get(current) else {
                continue;
            };
            if let Some(ident) = self.names.get(&def.name, category, key) {
                return Some((def.name.as_str(), ident));
            }
            stack.extend(self.mixins(&def.name).iter().rev().map(String::as_str));
        }
        None
    }

    /// Replace typedef references by their targets, transitively. The outer
    /// nullability and extended attributes are kept.
    pub fn resolve_typedefs<'a>(&self, ty: &'a TypeNode) -> Result<Cow<'a, TypeNode>> {
        let TypeKind::Named(name) = &ty.kind else {
            return Ok(Cow::Borrowed(ty));
        };
        if !self.typedefs.contains_key(name) {
            return Ok(Cow::Borrowed(ty));
        }

        let mut seen = vec![name.clone()];
        let mut resolved = ty.clone();
        while let TypeKind::Named(name) = &resolved.kind {
            let Some(target) = self.typedefs.get(name) else {
                break;
            };
            let mut next = target.clone();
            next.nullable |= resolved.nullable;
            next.ext_attrs.merge(&resolved.ext_attrs);
            if let TypeKind::Named(next_name) = &next.kind {
                if seen.contains(next_name) {
                    seen.push(next_name.clone());
                    return Err(GenError::UnsupportedType {
                        detail: format!("typedef cycle {}", seen.join(" -> ")),
                    });
                }
                seen.push(next_name.clone());
            }
            resolved = next;
        }
        Ok(Cow::Owned(resolved))
    }

    /// Whether `ty` resolves to one of the integer primitives.
    pub fn is_integer(&self, ty: &TypeNode) -> Result<bool> {
        let resolved = self.resolve_typedefs(ty)?;
        Ok(matches!(
            resolved.name().and_then(Primitive::from_name),
            Some(Primitive::Integer)
        ))
    }
}

/// A member together with the definition that declares it.
#[derive(Copy, Clone, Debug)]
pub struct SurfaceMember<'a> {
    pub owner: &'a Definition,
    pub member: &'a Member,
}

/// Iterator over an inheritance chain.
pub struct Ancestors<'a> {
    registry: &'a Registry,
    next: Option<&'a Definition>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a Definition;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.registry.parent(current);
        Some(current)
    }
}

/// Build the unresolved registry: merge partials, collect edges and typedefs,
/// then sort.
fn ingest(nodes: Vec<Node>, options: IngestOptions) -> Result<Registry> {
    let mut definitions: Vec<Definition> = Vec::new();
    let mut index: FxHashMap<String, usize> = FxHashMap::default();
    let mut typedefs: FxHashMap<String, TypeNode> = FxHashMap::default();
    let mut edges: Vec<(String, String)> = Vec::new();

    for node in nodes {
        match node {
            Node::Includes { target, mixin } => edges.push((target, mixin)),
            Node::Typedef { name, ty } => {
                if typedefs.contains_key(&name) {
                    return Err(GenError::DuplicateTypedef { name });
                }
                typedefs.insert(name, ty);
            }
            Node::Definition(mut definition) => {
                if options.drop_legacy {
                    definition.members.retain(|member| !member.is_legacy());
                }
                if definition.partial {
                    let Some(&main) = index.get(&definition.name) else {
                        return Err(GenError::PartialWithoutMain {
                            name: definition.name,
                        });
                    };
                    definitions[main].members.append(&mut definition.members);
                } else {
                    if index.contains_key(&definition.name) {
                        return Err(GenError::DuplicateDefinition {
                            name: definition.name,
                        });
                    }
                    index.insert(definition.name.clone(), definitions.len());
                    definitions.push(definition);
                }
            }
        }
    }

    // Edges are checked in input order, so the first bad one is reported.
    let mut includes: FxHashMap<String, Vec<String>> = FxHashMap::default();
    for (target, mixin) in edges {
        if !index.contains_key(&target) {
            return Err(GenError::UnknownIncludesTarget { target, mixin });
        }
        if !index.contains_key(&mixin) {
            return Err(GenError::UnknownMixin {
                definition: target,
                mixin,
            });
        }
        includes.entry(target).or_default().push(mixin);
    }
    for definition in &definitions {
        if let Some(parent) = &definition.inheritance {
            if !index.contains_key(parent) {
                return Err(GenError::UnknownMixin {
                    definition: definition.name.clone(),
                    mixin: parent.clone(),
                });
            }
        }
    }

    definitions.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });
    let index = definitions
        .iter()
        .enumerate()
        .map(|(i, def)| (def.name.clone(), i))
        .collect();

    let mixins = definitions
        .iter()
        .map(|def| {
            let mut list = includes.remove(&def.name).unwrap_or_default();
            list.sort();
            list.dedup();
            if let Some(parent) = &def.inheritance {
                list.insert(0, parent.clone());
            }
            (def.name.clone(), list)
        })
        .collect();

    tracing::debug!(
        definitions = definitions.len(),
        typedefs = typedefs.len(),
        "ingested definitions"
    );

    Ok(Registry {
        definitions,
        index,
        typedefs,
        mixins,
        names: NameMap::default(),
    })
}

#[cfg(test)]
mod tests;

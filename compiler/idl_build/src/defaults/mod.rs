//! Defaults artifact: a trait with everything derivable from the
//! declarations alone.
//!
//! - Property interception (`__get`/`__set`) over declared attributes, with
//!   the missing-property hooks.
//! - Content attribute reflection and `[PutForwards]` setters.
//! - Container adapters: `\ArrayAccess`, `count()`, `__toString()` and the
//!   iterator derived from an indexed getter plus `length`.
//! - `cast` factories for dictionaries, callbacks and callback interfaces.

mod attributes;
mod cast;
mod keyed;

use idl_diagnostic::Result;
use idl_ir::{Definition, DefinitionKind, Signature};
use idl_registry::{
    Capabilities, Capability, NameCategory, Registry, GET_MISSING, SET_MISSING, UNDEFINED_KEY,
};

use crate::php::{self, MethodSig, Param};
use crate::support::{self, own_members};
use crate::{
    walk_members, Artifact, ArtifactKind, ArtifactWriter, AttributeMember, BuildContext,
    FieldMember, MemberVisitor,
};

pub(crate) fn build<'r>(cx: &BuildContext<'r>, definition: &'r Definition) -> Result<Artifact> {
    if !applies(cx.registry(), definition)? {
        return Ok(Artifact::Skip);
    }
    let mut builder = DefaultsBuilder {
        w: ArtifactWriter::new(cx, definition, ArtifactKind::Defaults),
    };
    builder.open();
    match &definition.kind {
        DefinitionKind::Interface | DefinitionKind::InterfaceMixin => builder.interface()?,
        DefinitionKind::Dictionary => builder.dictionary()?,
        DefinitionKind::Callback { signature } => builder.callback(signature)?,
        DefinitionKind::CallbackInterface => builder.callback_interface()?,
        DefinitionKind::Enum { .. } => return Ok(Artifact::Skip),
    }
    builder.close();
    Ok(builder.w.finish())
}

/// Whether `definition` gets a Defaults trait.
pub(crate) fn applies(registry: &Registry, definition: &Definition) -> Result<bool> {
    let is_interface = match &definition.kind {
        DefinitionKind::Enum { .. } => return Ok(false),
        DefinitionKind::Dictionary
        | DefinitionKind::Callback { .. }
        | DefinitionKind::CallbackInterface => return Ok(true),
        DefinitionKind::Interface => true,
        DefinitionKind::InterfaceMixin => false,
    };
    if is_interface && support::is_root(definition) {
        return Ok(true);
    }

    let caps = Capabilities::of(registry, definition)?;
    if caps.keyed() || caps.has(Capability::STRINGIFIER) || caps.derives_iterator() {
        return Ok(true);
    }
    let mut properties = Properties::default();
    walk_members(&mut properties, &registry.surface(definition))?;
    if is_interface {
        return Ok(!properties.0.is_empty());
    }
    for attribute in &properties.0 {
        if support::covers_setter(registry, attribute)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Instance attributes of a surface.
#[derive(Default)]
struct Properties<'a>(Vec<AttributeMember<'a>>);

impl<'a> MemberVisitor<'a> for Properties<'a> {
    fn visit_attribute(&mut self, attribute: AttributeMember<'a>) -> Result<()> {
        if !attribute.is_static() {
            self.0.push(attribute);
        }
        Ok(())
    }
}

/// Dictionary fields, ancestors first.
#[derive(Default)]
struct Fields<'a>(Vec<FieldMember<'a>>);

impl<'a> MemberVisitor<'a> for Fields<'a> {
    fn visit_field(&mut self, field: FieldMember<'a>) -> Result<()> {
        self.0.push(field);
        Ok(())
    }
}

struct DefaultsBuilder<'r> {
    w: ArtifactWriter<'r>,
}

impl<'r> DefaultsBuilder<'r> {
    fn open(&mut self) {
        self.w.buf.line(format!("trait {}", self.w.name()));
        self.w.buf.line("{");
        self.w.buf.indent();
    }

    fn close(&mut self) {
        self.w.buf.dedent();
        self.w.buf.line("}");
    }

    fn interface(&mut self) -> Result<()> {
        let definition = self.w.definition();
        let registry = self.w.registry();
        let caps = Capabilities::of(registry, definition)?;
        let is_interface = matches!(definition.kind, DefinitionKind::Interface);
        let root = is_interface && support::is_root(definition);

        let mut properties = Properties::default();
        walk_members(&mut properties, &registry.surface(definition))?;
        let properties = properties.0;

        let intercepts = is_interface && (root || !properties.is_empty());
        if intercepts {
            self.property_get(&properties, root)?;
            self.property_set(&properties, root)?;
        }
        self.hooks(root, intercepts && !root, caps.keyed() && !root)?;

        for attribute in &properties {
            attributes::reflected(&mut self.w, attribute)?;
            attributes::forwarded(&mut self.w, attribute)?;
        }

        if caps.keyed() {
            let mut inherited = false;
            for ancestor in registry.ancestors(definition) {
                inherited |= Capabilities::of(registry, ancestor)?.keyed();
            }
            keyed::adapter(&mut self.w, &caps, inherited)?;
        }
        keyed::count(&mut self.w, &caps)?;
        keyed::stringifier(&mut self.w, &caps)?;
        if caps.derives_iterator() {
            keyed::iterator(&mut self.w)?;
        }
        Ok(())
    }

    fn dictionary(&mut self) -> Result<()> {
        let definition = self.w.definition();
        let registry = self.w.registry();

        let chain: Vec<&Definition> = std::iter::once(definition)
            .chain(registry.ancestors(definition))
            .collect();
        let mut fields = Fields::default();
        for def in chain.iter().rev() {
            walk_members(&mut fields, &own_members(def))?;
        }
        // Each ancestor with the fields of its own chain, nearest first.
        let ancestors: Vec<(&Definition, Vec<FieldMember<'_>>)> = (1..chain.len())
            .map(|level| {
                let above = &chain[level..];
                let inherited = fields
                    .0
                    .iter()
                    .filter(|field| above.iter().any(|def| std::ptr::eq(field.owner, *def)))
                    .copied()
                    .collect();
                (chain[level], inherited)
            })
            .collect();

        cast::dictionary(&mut self.w, &fields.0, &ancestors)?;
        keyed::fields(&mut self.w, &fields.0)
    }

    fn callback(&mut self, signature: &Signature) -> Result<()> {
        let invoke = self.invoke_name()?;
        let target = self.w.operation(invoke, &[signature], false)?;
        cast::callable(&mut self.w, Some(&target), &[])
    }

    fn callback_interface(&mut self) -> Result<()> {
        let definition = self.w.definition();
        let registry = self.w.registry();
        let operations = support::regular_operations(definition)?;

        let mut sigs = Vec::with_capacity(operations.len());
        for operation in &operations {
            let Some(name) = support::operation_name(registry, operation)? else {
                continue;
            };
            sigs.push(self.w.operation(name, &operation.overloads, false)?);
        }
        let (target, others) = match sigs.split_first() {
            Some((target, others)) => (Some(target), others),
            None => (None, &[][..]),
        };
        cast::callable(&mut self.w, target, others)?;

        if let (Some(target), Some(first)) = (target, operations.first()) {
            let invoke = self.invoke_name()?;
            let sig = self.w.operation(invoke, &first.overloads, false)?;
            let call = format!("$this->{}({})", target.name, sig.forward_args());
            self.w.define(&sig, "public", |w| {
                if sig.returns_value() {
                    w.buf.line(format!("return {call};"));
                } else {
                    w.buf.line(format!("{call};"));
                }
                Ok(())
            })?;
        }
        Ok(())
    }

    fn invoke_name(&self) -> Result<&'r str> {
        self.w
            .registry()
            .name_of(self.w.name(), NameCategory::Invoke, "")
    }

    /// `__get`: declared attributes by name, then the fallback.
    fn property_get(&mut self, properties: &[AttributeMember<'r>], root: bool) -> Result<()> {
        let registry = self.w.registry();
        let mut arms = Vec::with_capacity(properties.len() + 1);
        for attribute in properties {
            let getter =
                registry.name_of(&attribute.owner.name, NameCategory::Getter, attribute.name)?;
            arms.push(format!("{} => $this->{getter}(),", php::quote(attribute.name)));
        }
        arms.push(if root {
            format!("default => $this->{GET_MISSING}($name),")
        } else {
            "default => parent::__get($name),".to_string()
        });

        let sig = MethodSig::new("__get")
            .with_params(vec![Param::new("name", "string", "string")])
            .returning("mixed", "mixed");
        self.w.define(&sig, "public", |w| {
            w.buf.braced("return match ($name) {", "};", |buf| {
                buf.lines(&arms);
            });
            Ok(())
        })
    }

    /// `__set`: writable attributes by name, readonly ones throw.
    fn property_set(&mut self, properties: &[AttributeMember<'r>], root: bool) -> Result<()> {
        let registry = self.w.registry();
        let mut arms = Vec::with_capacity(properties.len() + 1);
        for attribute in properties {
            let owner = attribute.owner.name.as_str();
            let key = php::quote(attribute.name);
            match registry.names().get(owner, NameCategory::Setter, attribute.name) {
                Some(setter) => arms.push(format!("{key} => $this->{setter}($value),")),
                None => {
                    let message =
                        php::quote(&format!("Cannot modify readonly property %s::${}", attribute.name));
                    arms.push(format!(
                        "{key} => throw new \\Error(sprintf({message}, static::class)),"
                    ));
                }
            }
        }
        arms.push(if root {
            format!("default => $this->{SET_MISSING}($name, $value),")
        } else {
            "default => parent::__set($name, $value),".to_string()
        });

        let sig = MethodSig::new("__set")
            .with_params(vec![
                Param::new("name", "string", "string"),
                Param::new("value", "mixed", "mixed"),
            ])
            .returning("void", "void");
        self.w.define(&sig, "public", |w| {
            w.buf.braced("match ($name) {", "};", |buf| {
                buf.lines(&arms);
            });
            Ok(())
        })
    }

    /// Missing-property and undefined-key hooks: default bodies on roots,
    /// abstract declarations where a subclass chain supplies them.
    fn hooks(&mut self, root: bool, abstract_properties: bool, abstract_key: bool) -> Result<()> {
        let get_missing = MethodSig::new(GET_MISSING)
            .with_params(vec![Param::new("name", "string", "string")])
            .returning("mixed", "mixed");
        let set_missing = MethodSig::new(SET_MISSING)
            .with_params(vec![
                Param::new("name", "string", "string"),
                Param::new("value", "mixed", "mixed"),
            ])
            .returning("void", "void");
        let undefined_key = MethodSig::new(UNDEFINED_KEY)
            .with_params(vec![Param::new("offset", "mixed", "mixed")])
            .returning("mixed", "mixed");

        if root {
            self.w.define(&get_missing, "public", |w| {
                w.buf.line(
                    "throw new \\Error(sprintf('Undefined property: %s::$%s', static::class, $name));",
                );
                Ok(())
            })?;
            self.w.define(&set_missing, "public", |w| {
                w.buf.line(
                    "throw new \\Error(sprintf('Cannot create dynamic property %s::$%s', static::class, $name));",
                );
                Ok(())
            })?;
            self.w.define(&undefined_key, "public", |w| {
                w.buf.line(
                    "throw new \\OutOfBoundsException(sprintf('Undefined key %s on %s', var_export($offset, true), static::class));",
                );
                Ok(())
            })?;
            return Ok(());
        }
        if abstract_properties {
            self.w.declare(&get_missing, "abstract public");
            self.w.declare(&set_missing, "abstract public");
        }
        if abstract_key {
            self.w.declare(&undefined_key, "abstract public");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;

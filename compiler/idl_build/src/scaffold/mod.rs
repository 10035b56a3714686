//! Scaffold artifact: a class implementing the contract, using the Defaults
//! trait, with a throwing stub for every method the trait leaves open.

use idl_diagnostic::Result;
use idl_ir::{Definition, DefinitionKind};
use idl_registry::NameCategory;

use crate::defaults;
use crate::php;
use crate::support::{self, own_members};
use crate::{
    walk_members, Artifact, ArtifactKind, ArtifactWriter, AttributeMember, BuildContext,
    ConstructorGroup, FieldMember, IterableMember, MemberVisitor, OperationGroup,
};

pub(crate) fn build<'r>(cx: &BuildContext<'r>, definition: &'r Definition) -> Result<Artifact> {
    let registry = cx.registry();
    let members = match &definition.kind {
        DefinitionKind::Callback { .. } | DefinitionKind::Enum { .. } => return Ok(Artifact::Skip),
        // Inherited fields are stubbed by the parent's scaffold.
        DefinitionKind::Dictionary => own_members(definition),
        DefinitionKind::Interface
        | DefinitionKind::InterfaceMixin
        | DefinitionKind::CallbackInterface => registry.surface(definition),
    };

    let mut builder = ScaffoldBuilder {
        w: ArtifactWriter::new(cx, definition, ArtifactKind::Scaffold),
    };
    builder.open();
    if defaults::applies(registry, definition)? {
        let defaults = builder.w.qualified(ArtifactKind::Defaults, &definition.name);
        builder.w.buf.line(format!("use {defaults};"));
        builder.w.buf.blank();
    }
    walk_members(&mut builder, &members)?;
    builder.close();
    Ok(builder.w.finish())
}

struct ScaffoldBuilder<'r> {
    w: ArtifactWriter<'r>,
}

impl ScaffoldBuilder<'_> {
    /// `class X extends \ns\Scaffold\Parent implements \ns\X`, or `trait X`
    /// for a mixin.
    fn open(&mut self) {
        let definition = self.w.definition();
        let name = self.w.name();
        if definition.is_mixin() {
            self.w.buf.line(format!("trait {name}"));
        } else {
            let mut header = format!("class {name}");
            if let Some(parent) = &definition.inheritance {
                header.push_str(" extends ");
                header.push_str(&self.w.qualified(ArtifactKind::Scaffold, parent));
            }
            header.push_str(" implements ");
            header.push_str(&self.w.qualified(ArtifactKind::Contract, name));
            self.w.buf.line(header);
        }
        self.w.buf.line("{");
        self.w.buf.indent();
    }

    fn close(&mut self) {
        self.w.buf.dedent();
        self.w.buf.line("}");
    }
}

impl<'r> MemberVisitor<'r> for ScaffoldBuilder<'r> {
    fn visit_attribute(&mut self, attribute: AttributeMember<'r>) -> Result<()> {
        let registry = self.w.registry();
        let owner = attribute.owner.name.as_str();
        let is_static = attribute.is_static();

        if !support::covers_getter(registry, &attribute)?
            && !support::inherits_accessor(registry, &attribute, NameCategory::Getter)
        {
            let getter = registry.name_of(owner, NameCategory::Getter, attribute.name)?;
            let sig = self.w.getter(getter, attribute.ty, is_static)?;
            self.w.stub(&sig)?;
        }
        let Some(setter) = registry.names().get(owner, NameCategory::Setter, attribute.name) else {
            return Ok(());
        };
        if !support::covers_setter(registry, &attribute)?
            && !support::inherits_accessor(registry, &attribute, NameCategory::Setter)
        {
            let sig = self.w.setter(setter, attribute.ty, is_static)?;
            self.w.stub(&sig)?;
        }
        Ok(())
    }

    fn visit_field(&mut self, field: FieldMember<'r>) -> Result<()> {
        let getter =
            self.w
                .registry()
                .name_of(&field.owner.name, NameCategory::Getter, field.name)?;
        let mut sig = self.w.getter(getter, field.ty, false)?;
        if support::field_may_be_absent(&field) {
            sig.ret = sig.ret.as_deref().map(php::nullable_binding);
            sig.ret_doc = sig.ret_doc.as_deref().map(php::nullable_doc);
        }
        self.w.stub(&sig)
    }

    fn visit_operation(&mut self, operation: OperationGroup<'r>) -> Result<()> {
        let Some(name) = support::operation_name(self.w.registry(), &operation)? else {
            return Ok(());
        };
        let sig = self
            .w
            .operation(name, &operation.overloads, operation.is_static())?;
        self.w.stub(&sig)
    }

    fn visit_iterable(&mut self, iterable: IterableMember<'r>) -> Result<()> {
        let name =
            self.w
                .registry()
                .name_of(&iterable.owner.name, NameCategory::Iterator, "")?;
        let sig = self.w.iterator(name, iterable.key, iterable.value)?;
        self.w.stub(&sig)
    }

    fn visit_constructor(&mut self, constructor: ConstructorGroup<'r>) -> Result<()> {
        let sig = self.w.constructor(&constructor.overloads)?;
        self.w.stub(&sig)
    }
}

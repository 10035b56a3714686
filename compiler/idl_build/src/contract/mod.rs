//! Contract artifact: interfaces with signatures only, enums as classes.

use idl_diagnostic::Result;
use idl_ir::{Definition, DefinitionKind, Signature};
use idl_registry::{Capabilities, Capability, NameCategory};
use idl_types::map_literal;

use crate::php::{self, MethodSig, Param};
use crate::support::{self, own_members};
use crate::{
    walk_members, Artifact, ArtifactKind, ArtifactWriter, AttributeMember, BuildContext,
    ConstMember, FieldMember, IterableMember, MemberVisitor, OperationGroup,
};

pub(crate) fn build<'r>(cx: &BuildContext<'r>, definition: &'r Definition) -> Result<Artifact> {
    let mut builder = ContractBuilder {
        w: ArtifactWriter::new(cx, definition, ArtifactKind::Contract),
    };
    match &definition.kind {
        DefinitionKind::Interface | DefinitionKind::InterfaceMixin => builder.interface()?,
        DefinitionKind::Dictionary => builder.dictionary()?,
        DefinitionKind::Callback { signature } => builder.callback(signature)?,
        DefinitionKind::CallbackInterface => builder.callback_interface()?,
        DefinitionKind::Enum { values } => builder.enumeration(values)?,
    }
    Ok(builder.w.finish())
}

struct ContractBuilder<'r> {
    w: ArtifactWriter<'r>,
}

impl<'r> ContractBuilder<'r> {
    fn interface(&mut self) -> Result<()> {
        let definition = self.w.definition();
        let registry = self.w.registry();
        let caps = Capabilities::of(registry, definition)?;

        let mut extends = self.supertypes();
        extends.extend(
            registry
                .included(&definition.name)
                .iter()
                .map(|mixin| self.w.qualified(ArtifactKind::Contract, mixin)),
        );
        if caps.keyed() {
            extends.push("\\ArrayAccess".to_string());
        }
        if caps.has(Capability::COUNT) {
            extends.push("\\Countable".to_string());
        }
        if caps.iterates() {
            extends.push("\\IteratorAggregate".to_string());
        }
        if caps.has(Capability::STRINGIFIER) {
            extends.push("\\Stringable".to_string());
        }

        self.open("interface", &extends);
        walk_members(self, &own_members(definition))?;
        if caps.derives_iterator() {
            if let Some(value) = support::indexed_getter_type(registry, definition)? {
                let name = registry.name_of(&definition.name, NameCategory::Iterator, "")?;
                let sig = self.w.iterator(name, None, value)?;
                self.w.declare(&sig, "public");
            }
        }
        self.close();
        Ok(())
    }

    fn dictionary(&mut self) -> Result<()> {
        let definition = self.w.definition();
        let registry = self.w.registry();
        let root = support::is_root(definition);

        let mut extends = self.supertypes();
        if root {
            extends.push("\\ArrayAccess".to_string());
        }
        self.open("interface", &extends);
        walk_members(self, &own_members(definition))?;

        if root {
            let owner = definition.name.as_str();
            let offset = || Param::new("offset", "mixed", "string");
            let accessors = [
                (NameCategory::Exists, vec![offset()], "bool"),
                (NameCategory::Get, vec![offset()], "mixed"),
                (
                    NameCategory::Set,
                    vec![offset(), Param::new("value", "mixed", "mixed")],
                    "void",
                ),
                (NameCategory::Unset, vec![offset()], "void"),
            ];
            for (category, params, ret) in accessors {
                let name = registry.name_of(owner, category, "")?;
                let sig = MethodSig::new(name)
                    .with_params(params)
                    .returning(ret, ret);
                self.w.declare(&sig, "public");
            }
        }
        let accepted = match registry.ancestors(definition).last() {
            Some(top) => {
                let top = self.w.qualified(ArtifactKind::Contract, &top.name);
                format!("{top}|array")
            }
            None => "self|array".to_string(),
        };
        self.cast(&accepted)?;
        self.close();
        Ok(())
    }

    fn callback(&mut self, signature: &Signature) -> Result<()> {
        self.open("interface", &[]);
        self.invoke(&[signature])?;
        self.cast("self|callable")?;
        self.close();
        Ok(())
    }

    fn callback_interface(&mut self) -> Result<()> {
        let definition = self.w.definition();
        self.open("interface", &[]);
        walk_members(self, &own_members(definition))?;
        if let Some(first) = support::regular_operations(definition)?.first() {
            self.invoke(&first.overloads)?;
        }
        self.cast("self|callable")?;
        self.close();
        Ok(())
    }

    fn enumeration(&mut self, values: &[String]) -> Result<()> {
        let registry = self.w.registry();
        let name = self.w.name();

        self.w.buf.line(format!("final class {name}"));
        self.w.buf.line("{");
        self.w.buf.indent();

        let mut constants = Vec::with_capacity(values.len());
        for value in values {
            let constant = registry.name_of(name, NameCategory::EnumValue, value)?;
            self.w
                .buf
                .line(format!("public const {constant} = {};", php::quote(value)));
            constants.push(format!("self::{constant}"));
        }
        self.w.buf.blank();
        self.w.buf.block("private function __construct()", |_| {});
        self.w.buf.blank();

        let cast = registry.name_of(name, NameCategory::Cast, "")?;
        let sig = MethodSig::new(cast)
            .with_params(vec![Param::new("value", "string", "string")])
            .returning("string", "string")
            .with_static(true);
        let message = php::quote(&format!("\"%s\" is not a valid value for enumeration {name}"));
        self.w.define(&sig, "public", |w| {
            w.buf.braced("return match ($value) {", "};", |buf| {
                if !constants.is_empty() {
                    buf.line(format!("{} => $value,", constants.join(", ")));
                }
                buf.line(format!(
                    "default => throw new \\ValueError(sprintf({message}, $value)),"
                ));
            });
            Ok(())
        })?;
        self.close();
        Ok(())
    }

    /// The parent's contract, fully qualified.
    fn supertypes(&self) -> Vec<String> {
        self.w
            .definition()
            .inheritance
            .iter()
            .map(|parent| self.w.qualified(ArtifactKind::Contract, parent))
            .collect()
    }

    fn open(&mut self, keyword: &str, extends: &[String]) {
        let name = self.w.name();
        if extends.is_empty() {
            self.w.buf.line(format!("{keyword} {name}"));
        } else {
            self.w
                .buf
                .line(format!("{keyword} {name} extends {}", extends.join(", ")));
        }
        self.w.buf.line("{");
        self.w.buf.indent();
    }

    fn close(&mut self) {
        self.w.buf.dedent();
        self.w.buf.line("}");
    }

    fn invoke(&mut self, overloads: &[&Signature]) -> Result<()> {
        let name = self
            .w
            .registry()
            .name_of(self.w.name(), NameCategory::Invoke, "")?;
        let sig = self.w.operation(name, overloads, false)?;
        self.w.declare(&sig, "public");
        Ok(())
    }

    /// `public static function cast({accepted} $value): self;`
    fn cast(&mut self, accepted: &str) -> Result<()> {
        let name = self
            .w
            .registry()
            .name_of(self.w.name(), NameCategory::Cast, "")?;
        let sig = MethodSig::new(name)
            .with_params(vec![Param::new("value", accepted, accepted)])
            .returning("self", "self")
            .with_static(true);
        self.w.declare(&sig, "public");
        Ok(())
    }
}

impl<'r> MemberVisitor<'r> for ContractBuilder<'r> {
    fn visit_const(&mut self, constant: ConstMember<'r>) -> Result<()> {
        let name = self.w.registry().name_of(
            &constant.owner.name,
            NameCategory::Const,
            constant.name,
        )?;
        let value = map_literal(constant.value)?;
        self.w.buf.line(format!("public const {name} = {value};"));
        self.w.buf.blank();
        Ok(())
    }

    fn visit_attribute(&mut self, attribute: AttributeMember<'r>) -> Result<()> {
        let registry = self.w.registry();
        let owner = attribute.owner.name.as_str();
        let is_static = attribute.is_static();

        let getter = registry.name_of(owner, NameCategory::Getter, attribute.name)?;
        let sig = self.w.getter(getter, attribute.ty, is_static)?;
        self.w.declare(&sig, "public");

        if let Some(setter) = registry.names().get(owner, NameCategory::Setter, attribute.name) {
            let ty = match support::forwarding(registry, &attribute)? {
                Some(forward) => forward.ty,
                None => attribute.ty,
            };
            let sig = self.w.setter(setter, ty, is_static)?;
            self.w.declare(&sig, "public");
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
        self.w.declare(&sig, "public");
        Ok(())
    }

    fn visit_operation(&mut self, operation: OperationGroup<'r>) -> Result<()> {
        let Some(name) = support::operation_name(self.w.registry(), &operation)? else {
            return Ok(());
        };
        let sig = self
            .w
            .operation(name, &operation.overloads, operation.is_static())?;
        self.w.declare(&sig, "public");
        Ok(())
    }

    fn visit_iterable(&mut self, iterable: IterableMember<'r>) -> Result<()> {
        let name =
            self.w
                .registry()
                .name_of(&iterable.owner.name, NameCategory::Iterator, "")?;
        let sig = self.w.iterator(name, iterable.key, iterable.value)?;
        self.w.declare(&sig, "public");
        Ok(())
    }
}

//! `cast` factories: turn the loose accepted form (array, callable) into an
//! object implementing the contract.

use idl_diagnostic::Result;
use idl_ir::{Definition, DefinitionKind};
use idl_registry::NameCategory;
use idl_types::map_literal;

use crate::php::{self, MethodSig, Param};
use crate::support;
use crate::{ArtifactKind, ArtifactWriter, FieldMember};

/// Dictionary `cast`: validate and normalize an array, then wrap it in a
/// read-only anonymous class. `fields` runs ancestors first. `ancestors` runs
/// nearest first, each with every field it declares or inherits; an instance
/// of one is flattened back into an array. The root comes last.
pub(super) fn dictionary(
    w: &mut ArtifactWriter<'_>,
    fields: &[FieldMember<'_>],
    ancestors: &[(&Definition, Vec<FieldMember<'_>>)],
) -> Result<()> {
    let registry = w.registry();
    let own = w.qualified(ArtifactKind::Contract, w.name());
    let top_ref = match ancestors.last() {
        Some((top, _)) => w.qualified(ArtifactKind::Contract, &top.name),
        None => own.clone(),
    };
    let name = registry.name_of(w.name(), NameCategory::Cast, "")?;

    let required: Vec<String> = fields
        .iter()
        .filter(|field| field.required)
        .map(|field| php::quote(field.name))
        .collect();
    let mut defaults = Vec::new();
    for field in fields {
        if let Some(default) = field.default {
            if !support::field_may_be_absent(field) {
                defaults.push(format!("{} => {},", php::quote(field.name), map_literal(default)?));
            }
        }
    }
    let mut conversions = Vec::new();
    for field in fields {
        let ty = registry.resolve_typedefs(field.ty)?;
        let Some(target) = ty.name().and_then(|name| registry.get(name)) else {
            continue;
        };
        if matches!(target.kind, DefinitionKind::Interface | DefinitionKind::InterfaceMixin) {
            continue;
        }
        let class = w.class_ref(&target.name);
        let cast = registry.name_of(&target.name, NameCategory::Cast, "")?;
        conversions.push((php::quote(field.name), format!("{class}::{cast}")));
    }
    let mut snapshots = Vec::with_capacity(ancestors.len());
    for (ancestor, inherited) in ancestors {
        let mut lines = Vec::with_capacity(inherited.len());
        for field in inherited {
            let getter = registry.name_of(&field.owner.name, NameCategory::Getter, field.name)?;
            lines.push(format!("{} => $value->{getter}(),", php::quote(field.name)));
        }
        snapshots.push((w.qualified(ArtifactKind::Contract, &ancestor.name), lines));
    }
    let mut getters = Vec::with_capacity(fields.len());
    for field in fields {
        let getter = registry.name_of(&field.owner.name, NameCategory::Getter, field.name)?;
        let mut sig = w.getter(getter, field.ty, false)?;
        let key = php::quote(field.name);
        let read = if support::field_may_be_absent(field) {
            sig.ret = sig.ret.as_deref().map(php::nullable_binding);
            sig.ret_doc = sig.ret_doc.as_deref().map(php::nullable_doc);
            format!("return $this->fields[{key}] ?? null;")
        } else {
            format!("return $this->fields[{key}];")
        };
        getters.push((sig, read));
    }

    let accepted = format!("{top_ref}|array");
    let sig = MethodSig::new(name)
        .with_params(vec![Param::new("value", accepted.as_str(), accepted.as_str())])
        .returning(own.as_str(), own.as_str())
        .with_static(true);
    let trait_ref = w.qualified(ArtifactKind::Defaults, w.name());
    let missing = php::quote(&format!("Missing required field \"%s\" of {}", w.name()));

    w.define(&sig, "public", |w| {
        w.buf.inline_block(format!("if ($value instanceof {own})"), |buf| {
            buf.line("return $value;");
        });
        for (class, lines) in &snapshots {
            w.buf.inline_block(format!("if ($value instanceof {class})"), |buf| {
                if lines.is_empty() {
                    buf.line("$value = [];");
                } else {
                    buf.braced("$value = array_filter([", "], static fn (mixed $field): bool => $field !== null);", |buf| {
                        buf.lines(lines);
                    });
                }
            });
        }
        if !required.is_empty() {
            w.buf
                .inline_block(format!("foreach ([{}] as $field)", required.join(", ")), |buf| {
                    buf.inline_block("if (!array_key_exists($field, $value))", |buf| {
                        buf.line(format!(
                            "throw new \\InvalidArgumentException(sprintf({missing}, $field));"
                        ));
                    });
                });
        }
        if !defaults.is_empty() {
            w.buf.braced("$value += [", "];", |buf| {
                buf.lines(&defaults);
            });
        }
        for (key, cast) in &conversions {
            w.buf
                .inline_block(format!("if (isset($value[{key}]))"), |buf| {
                    buf.line(format!("$value[{key}] = {cast}($value[{key}]);"));
                });
        }
        w.buf.blank();
        w.buf.line(format!("return new class ($value) implements {own} {{"));
        w.buf.indent();
        w.buf.line(format!("use {trait_ref};"));
        w.buf.blank();
        let ctor = MethodSig::new("__construct")
            .with_params(vec![Param::new("fields", "array", "array<string, mixed>")]);
        w.buf.lines(php::doc_block(&ctor.doc_lines()));
        w.buf.block("public function __construct(private array $fields)", |_| {});
        w.buf.blank();
        for (getter, read) in &getters {
            w.define(getter, "public", |w| {
                w.buf.line(read);
                Ok(())
            })?;
        }
        w.buf.dedent();
        w.buf.line("};");
        Ok(())
    })
}

/// `cast` for callbacks and callback interfaces: wrap a callable in an
/// anonymous class whose `target` method calls it. The remaining `others`
/// throw.
pub(super) fn callable(
    w: &mut ArtifactWriter<'_>,
    target: Option<&MethodSig>,
    others: &[MethodSig],
) -> Result<()> {
    let registry = w.registry();
    let own = w.qualified(ArtifactKind::Contract, w.name());
    let trait_ref = w.qualified(ArtifactKind::Defaults, w.name());
    let name = registry.name_of(w.name(), NameCategory::Cast, "")?;
    let accepted = format!("{own}|callable");
    let sig = MethodSig::new(name)
        .with_params(vec![Param::new("value", accepted.as_str(), accepted.as_str())])
        .returning(own.as_str(), own.as_str())
        .with_static(true);
    let not_callable = php::quote(&format!("{} has no operation to call", w.name()));

    w.define(&sig, "public", |w| {
        w.buf.inline_block(format!("if ($value instanceof {own})"), |buf| {
            buf.line("return $value;");
        });
        let Some(target) = target else {
            w.buf.line(format!("throw new \\InvalidArgumentException({not_callable});"));
            return Ok(());
        };
        w.buf.blank();
        w.buf.line(format!(
            "return new class (\\Closure::fromCallable($value)) implements {own} {{"
        ));
        w.buf.indent();
        w.buf.line(format!("use {trait_ref};"));
        w.buf.blank();
        w.buf.block("public function __construct(private \\Closure $callable)", |_| {});
        w.buf.blank();

        let call = format!("($this->callable)({})", target.forward_args());
        w.define(target, "public", |w| {
            if target.returns_value() {
                w.buf.line(format!("return {call};"));
            } else {
                w.buf.line(format!("{call};"));
            }
            Ok(())
        })?;
        for other in others {
            w.stub(other)?;
        }
        w.buf.dedent();
        w.buf.line("};");
        Ok(())
    })
}

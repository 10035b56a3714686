//! Reflected and forwarded attribute accessors.

use idl_diagnostic::Result;
use idl_emit::LineBuffer;
use idl_registry::NameCategory;

use crate::php;
use crate::support::{self, Reflection};
use crate::{ArtifactWriter, AttributeMember};

/// Getter and setter projecting `attribute` onto its content attribute.
pub(super) fn reflected<'r>(
    w: &mut ArtifactWriter<'r>,
    attribute: &AttributeMember<'r>,
) -> Result<()> {
    let registry = w.registry();
    let Some(reflection) = support::reflection(registry, attribute)? else {
        return Ok(());
    };
    let owner = attribute.owner.name.as_str();

    let getter = registry.name_of(owner, NameCategory::Getter, attribute.name)?;
    let sig = w.getter(getter, attribute.ty, false)?;
    w.define(&sig, "public", |w| {
        get_body(&mut w.buf, &reflection);
        Ok(())
    })?;

    if let Some(setter) = registry.names().get(owner, NameCategory::Setter, attribute.name) {
        let sig = w.setter(setter, attribute.ty, false)?;
        w.define(&sig, "public", |w| {
            set_body(&mut w.buf, &reflection);
            Ok(())
        })?;
    }
    Ok(())
}

/// `[PutForwards]` setter writing through the getter's result.
pub(super) fn forwarded<'r>(
    w: &mut ArtifactWriter<'r>,
    attribute: &AttributeMember<'r>,
) -> Result<()> {
    let registry = w.registry();
    if support::reflection(registry, attribute)?.is_some() {
        return Ok(());
    }
    let Some(forward) = support::forwarding(registry, attribute)? else {
        return Ok(());
    };
    let owner = attribute.owner.name.as_str();
    let getter = registry.name_of(owner, NameCategory::Getter, attribute.name)?;
    let setter = registry.name_of(owner, NameCategory::Setter, attribute.name)?;
    let arrow = if registry.resolve_typedefs(attribute.ty)?.nullable {
        "?->"
    } else {
        "->"
    };

    let sig = w.setter(setter, forward.ty, false)?;
    w.define(&sig, "public", |w| {
        w.buf
            .line(format!("$this->{getter}(){arrow}{}($value);", forward.setter));
        Ok(())
    })
}

fn get_body(buf: &mut LineBuffer, reflection: &Reflection<'_>) {
    match reflection {
        Reflection::String { content, nullable } => {
            let read = format!("$this->getAttribute({})", php::quote(content));
            if *nullable {
                buf.line(format!("return {read};"));
            } else {
                buf.line(format!("return {read} ?? '';"));
            }
        }
        Reflection::Boolean { content } => {
            buf.line(format!("return $this->hasAttribute({});", php::quote(content)));
        }
        Reflection::Integer { content } => {
            buf.line(format!("$raw = $this->getAttribute({});", php::quote(content)));
            buf.line("return $raw !== null && is_numeric($raw) ? (int) $raw : 0;");
        }
        Reflection::Enum {
            content,
            values,
            invalid,
            missing,
        } => {
            buf.line(format!("$raw = $this->getAttribute({});", php::quote(content)));
            buf.inline_block("if ($raw === null)", |buf| {
                buf.line(format!("return {};", php::quote(missing)));
            });
            buf.blank();
            buf.braced("return match (strtolower($raw)) {", "};", |buf| {
                let mut seen = Vec::with_capacity(values.len());
                for value in values.iter() {
                    let keyword = value.to_lowercase();
                    if seen.contains(&keyword) {
                        continue;
                    }
                    buf.line(format!("{} => {},", php::quote(&keyword), php::quote(value)));
                    seen.push(keyword);
                }
                buf.line(format!("default => {},", php::quote(invalid)));
            });
        }
    }
}

fn set_body(buf: &mut LineBuffer, reflection: &Reflection<'_>) {
    match reflection {
        Reflection::String {
            content,
            nullable: true,
        } => {
            let content = php::quote(content);
            buf.inline_block("if ($value === null)", |buf| {
                buf.line(format!("$this->removeAttribute({content});"));
                buf.line("return;");
            });
            buf.line(format!("$this->setAttribute({content}, $value);"));
        }
        Reflection::String { content, .. } | Reflection::Enum { content, .. } => {
            buf.line(format!("$this->setAttribute({}, $value);", php::quote(content)));
        }
        Reflection::Boolean { content } => {
            let content = php::quote(content);
            buf.inline_block("if ($value)", |buf| {
                buf.line(format!("$this->setAttribute({content}, '');"));
                buf.line("return;");
            });
            buf.line(format!("$this->removeAttribute({content});"));
        }
        Reflection::Integer { content } => {
            buf.line(format!(
                "$this->setAttribute({}, (string) $value);",
                php::quote(content)
            ));
        }
    }
}

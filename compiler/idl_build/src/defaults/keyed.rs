//! Container adapters: `\ArrayAccess`, `\Countable`, `\Stringable` and the
//! derived iterator.

use idl_diagnostic::Result;
use idl_emit::LineBuffer;
use idl_registry::{Capabilities, Capability, NameCategory, SpecialKind, UNDEFINED_KEY};

use crate::php::{self, MethodSig, Param};
use crate::support;
use crate::{ArtifactWriter, FieldMember};

/// Special operations an `offset*` method routes to.
struct Route<'a> {
    indexed: Option<&'a str>,
    named: Option<&'a str>,
}

/// `offsetExists`/`offsetGet`/`offsetSet`/`offsetUnset` dispatching integer
/// keys to indexed operations and string keys to named ones. Unmatched keys
/// go to the parent's adapter when an ancestor has one, else to the
/// undefined-key hook.
pub(super) fn adapter(
    w: &mut ArtifactWriter<'_>,
    caps: &Capabilities<'_>,
    inherited: bool,
) -> Result<()> {
    let registry = w.registry();
    let owner = w.name();
    let method = |kind| caps.method(registry, kind);

    let getters = Route {
        indexed: method(SpecialKind::IndexedGetter)?,
        named: method(SpecialKind::NamedGetter)?,
    };
    let setters = Route {
        indexed: method(SpecialKind::IndexedSetter)?,
        named: method(SpecialKind::NamedSetter)?,
    };
    let deleters = Route {
        indexed: method(SpecialKind::IndexedDeleter)?,
        named: method(SpecialKind::NamedDeleter)?,
    };
    let count = if caps.has(Capability::COUNT) {
        Some(registry.name_of(owner, NameCategory::Count, "")?)
    } else {
        None
    };

    let exists = registry.name_of(owner, NameCategory::Exists, "")?;
    let get = registry.name_of(owner, NameCategory::Get, "")?;
    let set = registry.name_of(owner, NameCategory::Set, "")?;
    let unset = registry.name_of(owner, NameCategory::Unset, "")?;
    let fallback = |method: &str, args: &str| {
        if inherited {
            format!("parent::{method}({args})")
        } else {
            format!("$this->{UNDEFINED_KEY}($offset)")
        }
    };

    let offset = || Param::new("offset", "mixed", "mixed");
    let value = || Param::new("value", "mixed", "mixed");

    let sig = MethodSig::new(exists)
        .with_params(vec![offset()])
        .returning("bool", "bool");
    w.define(&sig, "public", |w| {
        let buf = &mut w.buf;
        if let Some(item) = getters.indexed {
            buf.inline_block("if (is_int($offset))", |buf| match count {
                Some(count) => {
                    buf.line(format!("return $offset >= 0 && $offset < $this->{count}();"));
                }
                None => {
                    buf.line(format!("return $this->{item}($offset) !== null;"));
                }
            });
        }
        if let Some(named) = getters.named {
            buf.inline_block("if (is_string($offset))", |buf| {
                buf.line(format!("return $this->{named}($offset) !== null;"));
            });
        }
        if inherited {
            buf.line(format!("return parent::{exists}($offset);"));
        } else {
            buf.line("return false;");
        }
        Ok(())
    })?;

    let sig = MethodSig::new(get)
        .with_params(vec![offset()])
        .returning("mixed", "mixed");
    w.define(&sig, "public", |w| {
        branches(&mut w.buf, &getters, |method| {
            vec![format!("return $this->{method}($offset);")]
        });
        w.buf
            .line(format!("return {};", fallback(get, "$offset")));
        Ok(())
    })?;

    let sig = MethodSig::new(set)
        .with_params(vec![offset(), value()])
        .returning("void", "void");
    w.define(&sig, "public", |w| {
        branches(&mut w.buf, &setters, |method| {
            vec![
                format!("$this->{method}($offset, $value);"),
                "return;".to_string(),
            ]
        });
        w.buf
            .line(format!("{};", fallback(set, "$offset, $value")));
        Ok(())
    })?;

    let sig = MethodSig::new(unset)
        .with_params(vec![offset()])
        .returning("void", "void");
    w.define(&sig, "public", |w| {
        branches(&mut w.buf, &deleters, |method| {
            vec![format!("$this->{method}($offset);"), "return;".to_string()]
        });
        w.buf.line(format!("{};", fallback(unset, "$offset")));
        Ok(())
    })
}

/// `if (is_int(..)) { .. }` / `if (is_string(..)) { .. }` for the routes that exist.
fn branches(buf: &mut LineBuffer, route: &Route<'_>, body: impl Fn(&str) -> Vec<String>) {
    if let Some(method) = route.indexed {
        buf.inline_block("if (is_int($offset))", |buf| {
            buf.lines(body(method));
        });
    }
    if let Some(method) = route.named {
        buf.inline_block("if (is_string($offset))", |buf| {
            buf.lines(body(method));
        });
    }
}

/// `count()` forwarding to the integer `length` getter.
pub(super) fn count(w: &mut ArtifactWriter<'_>, caps: &Capabilities<'_>) -> Result<()> {
    let registry = w.registry();
    let Some(getter) = caps.count_getter(registry)? else {
        return Ok(());
    };
    let name = registry.name_of(w.name(), NameCategory::Count, "")?;
    let sig = MethodSig::new(name).returning("int", "int");
    w.define(&sig, "public", |w| {
        w.buf.line(format!("return $this->{getter}();"));
        Ok(())
    })
}

/// `__toString()` forwarding to the stringifier.
pub(super) fn stringifier(w: &mut ArtifactWriter<'_>, caps: &Capabilities<'_>) -> Result<()> {
    let Some(method) = caps.method(w.registry(), SpecialKind::Stringifier)? else {
        return Ok(());
    };
    let sig = MethodSig::new("__toString").returning("string", "string");
    w.define(&sig, "public", |w| {
        w.buf.line(format!("return $this->{method}();"));
        Ok(())
    })
}

/// Forward iterator yielding `item(i)` for `i` in `[0, count())`.
pub(super) fn iterator(w: &mut ArtifactWriter<'_>) -> Result<()> {
    let registry = w.registry();
    let definition = w.definition();
    let caps = Capabilities::of(registry, definition)?;
    let (Some(item), Some(value)) = (
        caps.method(registry, SpecialKind::IndexedGetter)?,
        support::indexed_getter_type(registry, definition)?,
    ) else {
        return Ok(());
    };
    let count = registry.name_of(&definition.name, NameCategory::Count, "")?;
    let name = registry.name_of(&definition.name, NameCategory::Iterator, "")?;

    let sig = w.iterator(name, None, value)?;
    w.define(&sig, "public", |w| {
        w.buf.line(format!("$length = $this->{count}();"));
        w.buf
            .inline_block("for ($index = 0; $index < $length; $index++)", |buf| {
                buf.line(format!("yield $this->{item}($index);"));
            });
        Ok(())
    })
}

/// Read-only adapter over every field of a dictionary.
pub(super) fn fields(w: &mut ArtifactWriter<'_>, fields: &[FieldMember<'_>]) -> Result<()> {
    let registry = w.registry();
    let owner = w.name();

    let mut getters = Vec::with_capacity(fields.len());
    for field in fields {
        let getter = registry.name_of(&field.owner.name, NameCategory::Getter, field.name)?;
        getters.push((php::quote(field.name), getter));
    }
    let keys: Vec<&str> = getters.iter().map(|(key, _)| key.as_str()).collect();

    let exists = registry.name_of(owner, NameCategory::Exists, "")?;
    let get = registry.name_of(owner, NameCategory::Get, "")?;
    let set = registry.name_of(owner, NameCategory::Set, "")?;
    let unset = registry.name_of(owner, NameCategory::Unset, "")?;
    let offset = || Param::new("offset", "mixed", "mixed");

    let sig = MethodSig::new(exists)
        .with_params(vec![offset()])
        .returning("bool", "bool");
    w.define(&sig, "public", |w| {
        if keys.is_empty() {
            w.buf.line("return false;");
            return Ok(());
        }
        w.buf.braced("return match ($offset) {", "};", |buf| {
            buf.line(format!(
                "{} => $this->{get}($offset) !== null,",
                keys.join(", ")
            ));
            buf.line("default => false,");
        });
        Ok(())
    })?;

    let undefined = php::quote(&format!("Undefined field %s of {owner}"));
    let sig = MethodSig::new(get)
        .with_params(vec![offset()])
        .returning("mixed", "mixed");
    w.define(&sig, "public", |w| {
        w.buf.braced("return match ($offset) {", "};", |buf| {
            for (key, getter) in &getters {
                buf.line(format!("{key} => $this->{getter}(),"));
            }
            buf.line(format!(
                "default => throw new \\OutOfBoundsException(sprintf({undefined}, var_export($offset, true))),"
            ));
        });
        Ok(())
    })?;

    let read_only = format!(
        "throw new \\LogicException({});",
        php::quote(&format!("{owner} is read-only"))
    );
    let sig = MethodSig::new(set)
        .with_params(vec![offset(), Param::new("value", "mixed", "mixed")])
        .returning("void", "void");
    w.define(&sig, "public", |w| {
        w.buf.line(&read_only);
        Ok(())
    })?;
    let sig = MethodSig::new(unset)
        .with_params(vec![offset()])
        .returning("void", "void");
    w.define(&sig, "public", |w| {
        w.buf.line(&read_only);
        Ok(())
    })
}

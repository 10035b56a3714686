//! PHP signature rendering.
//!
//! [`MethodSig`] is a method declaration with both type renderings attached:
//! the binding type goes into the signature, the documentation type into a
//! docblock when the two differ.

use std::fmt::Write as _;

/// One method parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Param {
    /// Variable name without `$`.
    pub name: String,
    pub binding: String,
    pub doc: String,
    /// Default value as PHP source.
    pub default: Option<String>,
    pub variadic: bool,
}

/// A method declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodSig {
    pub name: String,
    pub params: Vec<Param>,
    /// Binding return type; `None` for constructors.
    pub ret: Option<String>,
    pub ret_doc: Option<String>,
    pub is_static: bool,
}

impl Param {
    pub fn new(name: &str, binding: impl Into<String>, doc: impl Into<String>) -> Self {
        Self {
            name: variable(name),
            binding: binding.into(),
            doc: doc.into(),
            default: None,
            variadic: false,
        }
    }

    /// Make the parameter optional with `default`, widening the types to
    /// accept `null` when that is the default.
    #[must_use]
    pub fn with_default(mut self, default: String) -> Self {
        if default == "null" {
            self.binding = nullable_binding(&self.binding);
            self.doc = nullable_doc(&self.doc);
        }
        self.default = Some(default);
        self
    }

    fn render(&self) -> String {
        let mut out = format!("{} ", self.binding);
        if self.variadic {
            out.push_str("...");
        }
        out.push('$');
        out.push_str(&self.name);
        if let Some(default) = &self.default {
            let _ = write!(out, " = {default}");
        }
        out
    }

    fn doc_line(&self) -> String {
        let dots = if self.variadic { "..." } else { "" };
        format!("@param {} {dots}${}", self.doc, self.name)
    }
}

impl MethodSig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            ret: None,
            ret_doc: None,
            is_static: false,
        }
    }

    #[must_use]
    pub fn with_params(mut self, params: Vec<Param>) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn returning(mut self, binding: impl Into<String>, doc: impl Into<String>) -> Self {
        self.ret = Some(binding.into());
        self.ret_doc = Some(doc.into());
        self
    }

    #[must_use]
    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    /// Whether the method produces a value.
    pub fn returns_value(&self) -> bool {
        !matches!(self.ret.as_deref(), None | Some("void" | "never"))
    }

    /// `{modifiers} [static] function name(params)[: ret]`.
    pub fn declaration(&self, modifiers: &str) -> String {
        let mut out = String::new();
        out.push_str(modifiers);
        out.push(' ');
        if self.is_static {
            out.push_str("static ");
        }
        let params: Vec<String> = self.params.iter().map(Param::render).collect();
        let _ = write!(out, "function {}({})", self.name, params.join(", "));
        if let Some(ret) = &self.ret {
            let _ = write!(out, ": {ret}");
        }
        out
    }

    /// Docblock lines for every type the binding cannot express exactly.
    pub fn doc_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .params
            .iter()
            .filter(|param| !same_type(&param.binding, &param.doc))
            .map(Param::doc_line)
            .collect();
        if let (Some(ret), Some(doc)) = (&self.ret, &self.ret_doc) {
            if !same_type(ret, doc) {
                lines.push(format!("@return {doc}"));
            }
        }
        lines
    }

    /// The parameters as call arguments: `$a, $b, ...$rest`.
    pub fn forward_args(&self) -> String {
        let args: Vec<String> = self
            .params
            .iter()
            .map(|param| {
                if param.variadic {
                    format!("...${}", param.name)
                } else {
                    format!("${}", param.name)
                }
            })
            .collect();
        args.join(", ")
    }
}

/// Merge the signatures of overloads into one PHP method. Positions missing
/// from some overloads become optional; differing types widen to `mixed`.
pub fn merge_overloads(name: &str, overloads: Vec<MethodSig>) -> MethodSig {
    let mut iter = overloads.into_iter();
    let Some(first) = iter.next() else {
        return MethodSig::new(name);
    };
    let rest: Vec<MethodSig> = iter.collect();
    if rest.is_empty() {
        return first;
    }
    let all: Vec<&MethodSig> = std::iter::once(&first).chain(rest.iter()).collect();

    let width = all.iter().map(|sig| sig.params.len()).max().unwrap_or(0);
    let mut params = Vec::with_capacity(width);
    for position in 0..width {
        let present: Vec<&Param> = all
            .iter()
            .filter_map(|sig| sig.params.get(position))
            .collect();
        let Some(head) = present.first() else {
            continue;
        };
        let variadic = present.iter().any(|param| param.variadic);
        let mut merged = Param {
            name: head.name.clone(),
            binding: widen(present.iter().map(|param| param.binding.as_str())),
            doc: union_doc(present.iter().map(|param| param.doc.as_str())),
            default: None,
            variadic,
        };
        if !variadic {
            let everywhere = present.len() == all.len();
            let defaults: Vec<Option<&String>> =
                present.iter().map(|param| param.default.as_ref()).collect();
            let shared = match defaults.first() {
                Some(Some(default)) if defaults.iter().all(|d| *d == Some(*default)) => {
                    Some((*default).clone())
                }
                _ => None,
            };
            let optional = !everywhere || defaults.iter().any(Option::is_some);
            if optional {
                merged = merged.with_default(shared.filter(|_| everywhere).unwrap_or_else(null));
            }
        }
        params.push(merged);
    }

    let ret = first
        .ret
        .as_ref()
        .map(|_| widen(all.iter().filter_map(|sig| sig.ret.as_deref())));
    let ret_doc = match ret.as_deref() {
        None => None,
        Some("void") => Some("void".to_string()),
        Some(_) => Some(union_doc(
            all.iter()
                .filter_map(|sig| sig.ret_doc.as_deref())
                .map(|doc| if doc == "void" { "null" } else { doc }),
        )),
    };

    MethodSig {
        name: first.name.clone(),
        params,
        ret,
        ret_doc,
        is_static: first.is_static,
    }
}

/// `$this` cannot be a parameter.
pub fn variable(name: &str) -> String {
    if name == "this" {
        "this_".to_string()
    } else {
        name.to_string()
    }
}

/// A binding type that also accepts `null`.
pub fn nullable_binding(binding: &str) -> String {
    if binding == "mixed"
        || binding == "null"
        || binding.starts_with('?')
        || binding.split('|').any(|part| part == "null")
    {
        binding.to_string()
    } else if binding.contains('|') {
        format!("{binding}|null")
    } else {
        format!("?{binding}")
    }
}

/// A documentation type that also accepts `null`.
pub fn nullable_doc(doc: &str) -> String {
    if doc.split('|').any(|part| part == "null" || part == "mixed") {
        doc.to_string()
    } else {
        format!("{doc}|null")
    }
}

/// Single-quoted PHP string literal.
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for c in text.chars() {
        if matches!(c, '\\' | '\'') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('\'');
    out
}

/// `/** ... */` around `lines`; nothing when there are none.
pub fn doc_block(lines: &[String]) -> Vec<String> {
    if lines.is_empty() {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(lines.len() + 2);
    out.push("/**".to_string());
    out.extend(lines.iter().map(|line| format!(" * {line}")));
    out.push(" */".to_string());
    out
}

/// `throw new \BadMethodCallException('Not implemented: Foo::bar');`
pub fn not_implemented(class: &str, method: &str) -> String {
    format!(
        "throw new \\BadMethodCallException({});",
        quote(&format!("Not implemented: {class}::{method}"))
    )
}

/// Whether a docblock would repeat the binding; `?T` and `T|null` agree.
fn same_type(binding: &str, doc: &str) -> bool {
    binding == doc
        || binding
            .strip_prefix('?')
            .and_then(|inner| doc.strip_suffix("|null").map(|doc| inner == doc))
            .unwrap_or(false)
}

fn null() -> String {
    "null".to_string()
}

/// Identical bindings stay; anything else is `mixed`.
fn widen<'s>(mut bindings: impl Iterator<Item = &'s str>) -> String {
    let Some(first) = bindings.next() else {
        return "mixed".to_string();
    };
    if bindings.all(|binding| binding == first) {
        first.to_string()
    } else {
        "mixed".to_string()
    }
}

/// Union of documentation types, flattened and deduplicated with `null` last.
fn union_doc<'s>(docs: impl Iterator<Item = &'s str>) -> String {
    let mut parts: Vec<&str> = Vec::new();
    let mut nullable = false;
    for doc in docs {
        for part in split_top_level(doc) {
            if part == "null" {
                nullable = true;
            } else if !parts.contains(&part) {
                parts.push(part);
            }
        }
    }
    let mut text = parts.join("|");
    if nullable {
        if text.is_empty() {
            text.push_str("null");
        } else {
            text.push_str("|null");
        }
    }
    text
}

/// Split on `|` outside of `<...>`.
fn split_top_level(doc: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in doc.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            '|' if depth == 0 => {
                parts.push(&doc[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&doc[start..]);
    parts
}

//! Turning member names and enum values into host identifiers.

/// Upper-case the first character: `value` -> `Value`.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Class-constant name for an enum value: ASCII upper case, every other
/// character replaced by `_`, a leading digit prefixed with `_`.
pub fn constant_name(value: &str) -> String {
    if value.is_empty() {
        return "EMPTY".to_string();
    }
    let mut out = String::with_capacity(value.len() + 1);
    if value.starts_with(|c: char| c.is_ascii_digit()) {
        out.push('_');
    }
    out.extend(value.chars().map(|c| {
        if c.is_ascii_alphanumeric() {
            c.to_ascii_uppercase()
        } else {
            '_'
        }
    }));
    out
}

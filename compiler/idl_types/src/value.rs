//! WebIDL literal -> PHP literal.

use idl_diagnostic::{GenError, Result};
use idl_ir::Literal;

/// Render a default or constant value as PHP source.
pub fn map_literal(literal: &Literal) -> Result<String> {
    Ok(match literal {
        Literal::Number(text) => number(text)?,
        Literal::Boolean(true) => "true".to_string(),
        Literal::Boolean(false) => "false".to_string(),
        Literal::Null => "null".to_string(),
        Literal::String(text) => quote(text),
        Literal::Infinity { negative: false } => "INF".to_string(),
        Literal::Infinity { negative: true } => "-INF".to_string(),
        Literal::NaN => "NAN".to_string(),
        Literal::EmptySequence | Literal::EmptyDictionary => "[]".to_string(),
    })
}

/// Single-quoted PHP string; only `\` and `'` need escaping.
fn quote(text: &str) -> String {
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

/// WebIDL integer and decimal tokens are valid PHP literals as written
/// (`0x` hex, leading-zero octal, exponents). Anything else is rejected.
fn number(text: &str) -> Result<String> {
    let digits = text.strip_prefix('-').unwrap_or(text);
    let valid = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit())
    } else {
        !digits.is_empty()
            && digits.starts_with(|c: char| c.is_ascii_digit() || c == '.')
            && digits.parse::<f64>().is_ok()
    };
    if valid {
        Ok(text.to_string())
    } else {
        Err(GenError::UnsupportedLiteral {
            detail: format!("`{text}` is not a numeric literal"),
        })
    }
}

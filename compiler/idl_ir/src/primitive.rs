//! Built-in WebIDL type names.

/// A WebIDL built-in type, classified by how it maps onto host types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// `byte`, `octet`, `short`, `long`, `long long` and unsigned variants.
    Integer,
    /// `float`, `double` and unrestricted variants.
    Float,
    /// `DOMString`, `ByteString`, `USVString`.
    String,
    Boolean,
    /// `undefined` (formerly `void`).
    Undefined,
    Any,
    Object,
}

impl Primitive {
    /// Classify a type name. Multi-word names use single spaces, as the
    /// parser emits them.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "byte" | "octet" | "short" | "unsigned short" | "long" | "unsigned long"
            | "long long" | "unsigned long long" => Some(Primitive::Integer),
            "float" | "unrestricted float" | "double" | "unrestricted double" => {
                Some(Primitive::Float)
            }
            "DOMString" | "ByteString" | "USVString" => Some(Primitive::String),
            "boolean" => Some(Primitive::Boolean),
            "undefined" | "void" => Some(Primitive::Undefined),
            "any" => Some(Primitive::Any),
            "object" => Some(Primitive::Object),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_every_family() {
        assert_eq!(Primitive::from_name("unsigned long long"), Some(Primitive::Integer));
        assert_eq!(Primitive::from_name("octet"), Some(Primitive::Integer));
        assert_eq!(Primitive::from_name("unrestricted double"), Some(Primitive::Float));
        assert_eq!(Primitive::from_name("USVString"), Some(Primitive::String));
        assert_eq!(Primitive::from_name("boolean"), Some(Primitive::Boolean));
        assert_eq!(Primitive::from_name("undefined"), Some(Primitive::Undefined));
        assert_eq!(Primitive::from_name("any"), Some(Primitive::Any));
        assert_eq!(Primitive::from_name("Node"), None);
        assert_eq!(Primitive::from_name("unsigned"), None);
    }
}

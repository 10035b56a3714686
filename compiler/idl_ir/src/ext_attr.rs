//! Extended attributes: `[Reflect]`, `[PutForwards=href]`, ...

/// One extended attribute.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ExtAttr {
    /// Attribute name, e.g. `Reflect`.
    pub name: String,

    /// Right-hand side of `Name=value`, if any.
    pub rhs: Option<ExtAttrValue>,
}

/// Right-hand side of an extended attribute.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ExtAttrValue {
    /// `[PutForwards=href]`
    Identifier(String),

    /// `[ReflectMissing="auto"]`, stored without quotes.
    String(String),

    /// `[Exposed=(Window,Worker)]`
    IdentifierList(Vec<String>),
}

/// The ordered list of extended attributes on a node.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ExtAttrs(pub Vec<ExtAttr>);

impl ExtAttr {
    /// An attribute without a right-hand side.
    pub fn flag(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rhs: None,
        }
    }

    /// `Name=identifier`.
    pub fn identifier(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rhs: Some(ExtAttrValue::Identifier(value.into())),
        }
    }

    /// `Name="string"`.
    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rhs: Some(ExtAttrValue::String(value.into())),
        }
    }

    /// The right-hand side as a single string, for identifier and string forms.
    pub fn value(&self) -> Option<&str> {
        match &self.rhs {
            Some(ExtAttrValue::Identifier(value) | ExtAttrValue::String(value)) => Some(value),
            Some(ExtAttrValue::IdentifierList(_)) | None => None,
        }
    }
}

impl ExtAttrs {
    /// Look up an attribute by name.
    pub fn get(&self, name: &str) -> Option<&ExtAttr> {
        self.0.iter().find(|attr| attr.name == name)
    }

    /// Whether an attribute with this name is present.
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Single-valued right-hand side of the named attribute.
    pub fn value_of(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ExtAttr::value)
    }

    /// Append the attributes of `other` not already present here.
    pub fn merge(&mut self, other: &ExtAttrs) {
        for attr in &other.0 {
            if !self.has(&attr.name) {
                self.0.push(attr.clone());
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<ExtAttr> for ExtAttrs {
    fn from_iter<I: IntoIterator<Item = ExtAttr>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

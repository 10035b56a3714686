//! Where a type is being rendered.

/// Which of the two renderings to produce.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Fidelity {
    /// PHP signature types.
    Binding,
    /// PHPDoc types.
    Documentation,
}

/// The syntactic slot a type occupies.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Position {
    /// Method result, including attribute getters.
    Return,
    /// The value parameter of an attribute setter.
    Setter,
    /// An operation, constructor or callback argument.
    Argument,
    /// A constant or dictionary member read through the keyed adapter.
    Field,
}

impl Position {
    /// Input positions accept alternate forms and honor
    /// `[LegacyNullToEmptyString]`.
    pub fn is_input(self) -> bool {
        matches!(self, Position::Setter | Position::Argument)
    }
}

/// Rendering context: the slot plus the definition being generated, whose
/// own name is always written fully qualified.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct TypeContext<'a> {
    pub definition: &'a str,
    pub position: Position,
}

impl<'a> TypeContext<'a> {
    pub fn new(definition: &'a str, position: Position) -> Self {
        Self {
            definition,
            position,
        }
    }

    pub fn returning(definition: &'a str) -> Self {
        Self::new(definition, Position::Return)
    }

    pub fn argument(definition: &'a str) -> Self {
        Self::new(definition, Position::Argument)
    }

    pub fn setter(definition: &'a str) -> Self {
        Self::new(definition, Position::Setter)
    }
}

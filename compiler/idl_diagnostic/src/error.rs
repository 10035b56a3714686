use idl_ir::ShapeError;

use crate::ErrorCode;

/// A fatal generation error.
///
/// These indicate a malformed input tree or a language feature the generator
/// does not handle. None of them is ever worked around.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenError {
    #[error("duplicate definition `{name}`")]
    DuplicateDefinition { name: String },

    #[error("duplicate typedef `{name}`")]
    DuplicateTypedef { name: String },

    #[error("partial definition `{name}` has no main definition to merge into")]
    PartialWithoutMain { name: String },

    #[error("`{definition}` inherits or includes unknown definition `{mixin}`")]
    UnknownMixin { definition: String, mixin: String },

    #[error("`includes` targets unknown definition `{target}` (including `{mixin}`)")]
    UnknownIncludesTarget { target: String, mixin: String },

    #[error("unknown definition `{name}`")]
    UnknownDefinition { name: String },

    #[error(
        "mixins must not conflict: `{mixin}` introduces `{name}` which is already used in `{definition}`"
    )]
    MixinConflict {
        definition: String,
        mixin: String,
        name: String,
    },

    #[error("inheritance/mixin cycle: {}", path.join(" -> "))]
    MixinCycle { path: Vec<String> },

    #[error(
        "`{definition}` needs `{name}` for `{protocol}`, but an inherited or included member already uses it"
    )]
    ProtocolConflict {
        definition: String,
        protocol: String,
        name: String,
    },

    #[error("no generated name for {category} `{key}` of `{definition}`")]
    MissingName {
        definition: String,
        category: String,
        key: String,
    },

    #[error("unknown type `{name}`")]
    UnknownType { name: String },

    #[error("unsupported type: {detail}")]
    UnsupportedType { detail: String },

    #[error("unsupported literal: {detail}")]
    UnsupportedLiteral { detail: String },

    #[error("malformed input: {0}")]
    Input(String),

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl GenError {
    /// The stable code of this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            GenError::DuplicateDefinition { .. } => ErrorCode::E0001,
            GenError::DuplicateTypedef { .. } => ErrorCode::E0002,
            GenError::PartialWithoutMain { .. } => ErrorCode::E0003,
            GenError::UnknownMixin { .. } => ErrorCode::E0004,
            GenError::UnknownIncludesTarget { .. } => ErrorCode::E0005,
            GenError::UnknownDefinition { .. } => ErrorCode::E0006,
            GenError::MixinConflict { .. } => ErrorCode::E1001,
            GenError::MixinCycle { .. } => ErrorCode::E1002,
            GenError::MissingName { .. } => ErrorCode::E1003,
            GenError::ProtocolConflict { .. } => ErrorCode::E1004,
            GenError::UnknownType { .. } => ErrorCode::E2001,
            GenError::UnsupportedType { .. } => ErrorCode::E2002,
            GenError::UnsupportedLiteral { .. } => ErrorCode::E2003,
            GenError::Input(_) => ErrorCode::E3001,
            GenError::InvalidConfig { .. } => ErrorCode::E3002,
        }
    }
}

impl From<ShapeError> for GenError {
    fn from(e: ShapeError) -> Self {
        GenError::Input(e.to_string())
    }
}

/// Result type alias using `GenError`.
pub type Result<T> = std::result::Result<T, GenError>;

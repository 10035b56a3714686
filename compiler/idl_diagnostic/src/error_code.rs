//! Error codes for generation failures.
//!
//! Format: E#### where the first digit indicates the phase:
//! - E0xxx: Registry ingestion
//! - E1xxx: Name resolution
//! - E2xxx: Type and value mapping
//! - E3xxx: Input and configuration

use std::fmt;

/// Stable identifier of a fatal generation error.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Registry (E0xxx)
    /// Two non-partial definitions share a name
    E0001,
    /// Two typedefs share a name
    E0002,
    /// Partial definition without a main definition
    E0003,
    /// Inherited or included definition does not exist
    E0004,
    /// `includes` statement targets an unknown definition
    E0005,
    /// Lookup of a definition that does not exist
    E0006,

    // Names (E1xxx)
    /// Mixin-introduced name collides within the including definition
    E1001,
    /// Cycle in the inheritance/mixin graph
    E1002,
    /// Name map has no entry for a member
    E1003,
    /// Host protocol method name already taken by a declared member
    E1004,

    // Types and values (E2xxx)
    /// Type name is neither primitive, typedef, nor definition
    E2001,
    /// Type node cannot be mapped
    E2002,
    /// Literal cannot be mapped
    E2003,

    // Input (E3xxx)
    /// Malformed input tree
    E3001,
    /// Invalid generator configuration
    E3002,
}

impl ErrorCode {
    /// Every error code, in numeric order.
    pub const ALL: [ErrorCode; 15] = [
        ErrorCode::E0001,
        ErrorCode::E0002,
        ErrorCode::E0003,
        ErrorCode::E0004,
        ErrorCode::E0005,
        ErrorCode::E0006,
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E1004,
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2003,
        ErrorCode::E3001,
        ErrorCode::E3002,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E0003 => "E0003",
            ErrorCode::E0004 => "E0004",
            ErrorCode::E0005 => "E0005",
            ErrorCode::E0006 => "E0006",
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse an error code string like `"E1001"`. Case-insensitive.
impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorCode::ALL
            .iter()
            .find(|code| code.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or(())
    }
}

//! Type and literal mapping.
//!
//! Every WebIDL type is rendered at one of two fidelities:
//!
//! - **Binding**: what PHP's own type system accepts in a signature. Unions,
//!   generics and `any` widen to `mixed`/`array`; enums erase to `string`.
//! - **Documentation**: the precise form for `@param`/`@return` tags,
//!   keeping union branches, element types and enum names.
//!
//! Typedefs are resolved through the registry before mapping, and a name the
//! registry cannot resolve is a fatal [`GenError::UnknownType`].
//!
//! [`GenError::UnknownType`]: idl_diagnostic::GenError::UnknownType

mod context;
mod mapper;
mod value;

pub use context::{Fidelity, Position, TypeContext};
pub use mapper::{Reference, TypeMapper};
pub use value::map_literal;

//! Error reporting for the generator.
//!
//! Generation has two outcomes besides success: a fatal [`GenError`] (the input
//! tree is malformed or uses a feature the generator does not handle) and an
//! expected "nothing to emit" result, which is not an error and lives in the
//! builder crate. Every fatal error carries a stable [`ErrorCode`].

mod error;
mod error_code;

pub use error::{GenError, Result};
pub use error_code::ErrorCode;

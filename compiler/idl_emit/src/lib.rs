//! Output emission for generated PHP.
//!
//! Two layers:
//! - [`Emitter`] / [`StringEmitter`]: raw text sink.
//! - [`LineBuffer`]: line-oriented builder that tracks indentation depth and
//!   supports [`Marker`]s, placeholders filled after the rest of the file is
//!   written. Import lists use this: the set of referenced definitions is only
//!   known once the body has been generated.

mod buffer;
mod emitter;

pub use buffer::{LineBuffer, Marker};
pub use emitter::{Emitter, StringEmitter};

/// Spaces per indentation level.
pub const INDENT_WIDTH: usize = 4;

//! Definition registry and name resolution.
//!
//! # Architecture
//!
//! ```text
//! Vec<Node> (parsed tree)
//!     └── Registry::build
//!           ├── ingest: merge partials, collect `includes` edges and typedefs
//!           ├── sort definitions (case-insensitive) and mixin lists
//!           └── NameResolver: one memoized pass per definition, in sorted order
//! ```
//!
//! The resulting [`Registry`] is a frozen snapshot: nothing mutates it after
//! `build` returns, and every builder reads from the same instance.

mod capabilities;
mod names;
mod registry;

pub use capabilities::{Capabilities, Capability, IterableShape, SpecialKind, SpecialSource};
pub use names::{
    capitalize, constant_name, NameCategory, NameKey, NameMap, NameResolver, GET_MISSING,
    SET_MISSING, UNDEFINED_KEY,
};
pub use registry::{Ancestors, IngestOptions, Registry, SurfaceMember};

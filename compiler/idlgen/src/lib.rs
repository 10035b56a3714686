//! idlgen - WebIDL to PHP generator
//!
//! Turns a parsed WebIDL tree into three PHP files per definition:
//! a Contract (interface or enum class), a Defaults trait with everything
//! derivable from the declaration, and a Scaffold class with throwing stubs.
//!
//! # Pipeline
//!
//! ```text
//! JSON tree ──serde──▶ Vec<Node> ──Registry::build──▶ frozen Registry
//!                                                        │
//!                          (definition, kind) ──BuildContext::build──▶ Artifact
//! ```
//!
//! The registry, including every generated name, is computed once by
//! [`Generator::new`]. Generating is then a pure function of the registry:
//! the same tree always yields byte-identical files.
//!
//! # Example
//!
//! ```text
//! let generator = Generator::from_json(&json, GeneratorConfig::default())?;
//! for (path, text) in generator.generate_all()?.iter() {
//!     std::fs::write(out.join(path), text)?;
//! }
//! ```

mod config;
mod generator;

use std::sync::Once;

pub use config::GeneratorConfig;
pub use generator::{GeneratedSet, Generator};
pub use idl_build::{Artifact, ArtifactKind};
pub use idl_diagnostic::{ErrorCode, GenError, Result};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Call this once at startup. Safe to call multiple times.
/// Enable with `RUST_LOG=idl_registry=debug` or `RUST_LOG=idl_build=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

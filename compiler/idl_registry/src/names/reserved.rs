//! Identifiers no generated member may take.

/// PHP magic methods, `class`, and the hook names the default-behavior
/// artifact declares itself.
pub(crate) const RESERVED: &[&str] = &[
    // Magic methods
    "__construct",
    "__destruct",
    "__call",
    "__callStatic",
    "__get",
    "__set",
    "__isset",
    "__unset",
    "__sleep",
    "__wakeup",
    "__serialize",
    "__unserialize",
    "__toString",
    "__invoke",
    "__set_state",
    "__clone",
    "__debugInfo",
    // `Foo::class` is the class-name constant
    "class",
    // Property interception hooks
    "getMissingProperty",
    "setMissingProperty",
    "undefinedKey",
];

/// The hook names above, as emitted.
pub const GET_MISSING: &str = "getMissingProperty";
pub const SET_MISSING: &str = "setMissingProperty";
pub const UNDEFINED_KEY: &str = "undefinedKey";

//! Compile-time capacities for the interpreter's small fixed-size buffers.
//!
//! These bound the scratch buffers used while reading escape arguments;
//! they exist so the interpreter never allocates unbounded memory while
//! scanning a single escape sequence, mirroring the design document's
//! fixed-capacity philosophy (see [`crate::format::limits`] for the
//! formatter's analogous bounds).

/// Maximum length of a register/string name read by `cparg`'s bracketed
/// `[name]` form.
pub const NMLEN: usize = 64;

/// Maximum length of a macro-interpolation argument list (`\*[name a b]`).
pub const ILNLEN: usize = 256;

/// Maximum length of a single delimiter/group token read while scanning
/// a conditional (`\?'cond@then@else@'`).
pub const GNLEN: usize = 16;

/// Maximum number of positional arguments (`\$1`..`\$NARGS`).
pub const NARGS: usize = 9;

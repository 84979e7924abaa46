//! Compile-time capacities for the formatter's fixed-size buffers.
//!
//! The original implementation's header defining these (`roff.h`) is not
//! part of the retrieved source; the values below are the conventional
//! sizes for a single in-flight paragraph and its memoisation arrays, as
//! used elsewhere in the same family of implementations, and are noted as
//! an explicit choice in the crate's design document.

/// Maximum number of words buffered for a single fill/break pass.
pub const NWORDS: usize = 1000;

/// Capacity of the completed-line ring buffer.
pub const NLINES: usize = 1000;

/// Maximum number of hyphenation sub-words a single input word can split
/// into.
pub const NHYPHSWORD: usize = 20;

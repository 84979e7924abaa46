//! `galley` implements the core of a classical text typesetting processor:
//! a copy-mode escape interpreter and an optimal-fit line formatter.
//!
//! The crate is split into two independent pieces, matching the pipeline
//! described by its design document:
//!
//! - [`interp`]: pulls characters from an abstract input stack
//!   ([`interp::input::InputStack`]) and expands escape sequences
//!   (register and string interpolation, conditionals, width queries) by
//!   pushing expansion text back onto the stack.
//! - [`format`]: buffers a stream of already-measured [`format::Word`]s and
//!   breaks them into justified [`format::Line`]s using a dynamic-program
//!   that accounts for hyphenation penalties and orphan/widow avoidance.
//!
//! Neither module does any I/O, font handling, or page composition on its
//! own: those concerns are named as small traits (see [`interp::collab`] and
//! [`format::collab`]) that a host typesetting system implements and wires
//! together. This keeps the hard algorithmic core -- escape expansion and
//! paragraph line-breaking -- testable in isolation.

#![deny(missing_debug_implementations)]

pub mod config;
pub mod format;
pub mod interp;

pub use config::Config;
pub use format::{Formatter, Line, Word};
pub use interp::Interpreter;

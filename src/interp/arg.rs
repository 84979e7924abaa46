//! Reading a single identifier-shaped escape argument (`cparg` in the
//! design document), used for register and string names: `\n(xy`,
//! `\*[longname]`, `\g(xy`, and so on.

use super::input::InputStack;
use super::limits::NMLEN;

/// Read the next interpreted character, transparently discarding any
/// number of null-indicators first. Mirrors `cp_noninext` in the design
/// document.
pub(super) fn next_non_ni<I: InputStack>(input: &mut I, null_indicator: char) -> Option<char> {
    loop {
        let c = input.next()?;
        if c != null_indicator {
            return Some(c);
        }
    }
}

/// Read one identifier argument, in one of three forms:
///
/// - `(xy` -- exactly two code points.
/// - `[name]` -- bytes (code points) up to the closing `]`, truncated
///   silently at [`NMLEN`] `- 1` characters; only honoured outside
///   copy-mode (if `copy_mode` is set, a leading `[` is read back as an
///   ordinary single code point instead).
/// - otherwise -- exactly one code point.
///
/// Because a Rust `char` already denotes a full Unicode scalar value,
/// the "multi-byte aware" reading the original C implementation needed
/// (it read UTF-8 byte sequences by hand) reduces here to reading one
/// `char` at a time.
pub fn read_ident<I: InputStack>(input: &mut I, null_indicator: char, copy_mode: bool) -> String {
    let Some(c) = next_non_ni(input, null_indicator) else {
        return String::new();
    };
    if c == '(' {
        let mut s = String::new();
        if let Some(a) = next_non_ni(input, null_indicator) {
            s.push(a);
        }
        if let Some(b) = next_non_ni(input, null_indicator) {
            s.push(b);
        }
        s
    } else if c == '[' && !copy_mode {
        let mut s = String::new();
        loop {
            match next_non_ni(input, null_indicator) {
                None => break,
                Some(']') => break,
                Some(ch) => {
                    if s.chars().count() < NMLEN - 1 {
                        s.push(ch);
                    }
                    // Past capacity: keep draining up to `]`/EOF but
                    // drop the excess silently, matching the source's
                    // truncate-and-continue behavior.
                }
            }
        }
        s
    } else {
        input.back(c);
        match next_non_ni(input, null_indicator) {
            Some(ch) => ch.to_string(),
            None => String::new(),
        }
    }
}

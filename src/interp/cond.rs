//! The conditional interpolation `\?'cond@then@else@'` and the quoted-
//! string reader it shares with register definition (`\R'name expr'`).

use super::arg::next_non_ni;
use super::input::InputStack;

/// The zero-width marker: when it appears where a delimiter character is
/// expected, the *following* character is the real delimiter instead.
/// Classical troff idiom for picking a delimiter that would otherwise
/// collide with the text being delimited.
const ZERO_WIDTH_MARKER: &str = "\\&";

/// Read a string delimited by a matching pair of the same character:
/// the first character read names the delimiter, and the string ends at
/// the next (unescaped) occurrence of that same character. Used for
/// `\?'...'` and `\R'...'`.
pub fn read_quoted<I: InputStack>(input: &mut I, null_indicator: char) -> String {
    let Some(delim) = next_non_ni(input, null_indicator) else {
        return String::new();
    };
    let mut out = String::new();
    while let Some(c) = next_non_ni(input, null_indicator) {
        if c == delim {
            break;
        }
        out.push(c);
    }
    out
}

/// Read the field delimiter from the start of `s`: ordinarily its first
/// character, but if that reads as the zero-width marker, the character
/// following it instead. Returns the delimiter and the remaining slice.
fn read_delimiter(s: &str) -> (Option<char>, &str) {
    if let Some(rest) = s.strip_prefix(ZERO_WIDTH_MARKER) {
        let mut chars = rest.char_indices();
        return match chars.next() {
            Some((_, c)) => {
                let after = chars.next().map_or(rest.len(), |(i, _)| i);
                (Some(c), &rest[after..])
            }
            None => (None, rest),
        };
    }
    let mut chars = s.char_indices();
    match chars.next() {
        Some((_, c)) => {
            let after = chars.next().map_or(s.len(), |(i, _)| i);
            (Some(c), &s[after..])
        }
        None => (None, s),
    }
}

/// Split `s` at the next occurrence of `delim`, returning the field
/// before it and the remainder after it (or the whole string and an
/// empty remainder if `delim` does not occur).
fn split_field(s: &str, delim: char) -> (&str, &str) {
    match s.find(delim) {
        Some(idx) => (&s[..idx], &s[idx + delim.len_utf8()..]),
        None => (s, ""),
    }
}

/// Evaluate `\?'cond@then@else@'`: returns the `then` branch if `n > 0`,
/// else the `else` branch, ready to be pushed back onto the input stack.
///
/// `eval_up` mirrors [`super::collab::Evaluator::eval_up`]: it evaluates
/// the numeric expression prefix of `expr`, advancing `*expr` past what
/// it consumed.
pub fn evaluate<'a>(arg: &'a str, eval_up: impl FnOnce(&mut &'a str, char) -> i64) -> &'a str {
    let mut rest = arg;
    let n = eval_up(&mut rest, '\0');
    let (delim, rest) = read_delimiter(rest);
    let Some(delim) = delim else {
        return "";
    };
    let (then_field, rest) = split_field(rest, delim);
    let (else_field, _) = split_field(rest, delim);
    if n > 0 {
        then_field
    } else {
        else_field
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::input::VecInputStack;

    const NI: char = '\u{1}';

    fn digits_eval_up<'a>(expr: &mut &'a str, _terminator: char) -> i64 {
        let consumed: String = expr.chars().take_while(|c| c.is_ascii_digit()).collect();
        *expr = &expr[consumed.len()..];
        consumed.parse().unwrap_or(0)
    }

    #[test]
    fn quoted_reader_respects_self_delimiting() {
        let mut input = VecInputStack::new("'cond@then@else@'rest");
        assert_eq!(read_quoted(&mut input, NI), "cond@then@else@");
        assert_eq!(input.next(), Some('r'));
    }

    #[test]
    fn true_condition_yields_then_branch() {
        assert_eq!(evaluate("1@A@B@", digits_eval_up), "A");
    }

    #[test]
    fn false_condition_yields_else_branch() {
        assert_eq!(evaluate("0@A@B@", digits_eval_up), "B");
    }

    #[test]
    fn zero_width_marker_selects_the_next_character_as_delimiter() {
        // `\&` sits where the delimiter is expected; the comma after it
        // becomes the real field separator.
        assert_eq!(evaluate("1\\&,A,B,", digits_eval_up), "A");
        assert_eq!(evaluate("0\\&,A,B,", digits_eval_up), "B");
    }
}

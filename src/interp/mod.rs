//! The copy-mode input interpreter: a recursive, push-back-capable
//! scanner that expands escape sequences (register/string interpolation,
//! conditionals, width queries) while a request line or macro body is
//! read left to right.
//!
//! The "logical recursion" described by the design document -- each
//! interpolation re-enters the scan to produce the character the caller
//! actually asked for -- is implemented as a loop (see [`Interpreter::next`]
//! and [`Interpreter::raw`]) rather than language-level recursion, so a
//! pathological run of interpolations cannot blow the stack.

pub mod arg;
pub mod collab;
pub mod cond;
pub mod input;
pub mod limits;

use collab::{Evaluator, NameTable, Registers, Strings, WidthMeasurer};
use input::InputStack;

/// The default escape character (classically backslash).
pub const DEFAULT_ESCAPE: char = '\\';

/// The default null-indicator: a byte reserved to mean "transparent,
/// nothing here". Chosen as a C0 control code unlikely to appear in
/// ordinary text.
pub const DEFAULT_NULL_INDICATOR: char = '\u{1}';

/// Bundles the five auxiliary collaborators the interpreter consults
/// (see [`collab`]) behind a single bound, so interpreter methods need
/// only one generic type parameter for "whatever backs the registers,
/// strings, name table, evaluator, and width measurer".
pub trait Collaborators: Evaluator + Registers + Strings + NameTable + WidthMeasurer {}

impl<T: Evaluator + Registers + Strings + NameTable + WidthMeasurer> Collaborators for T {}

/// The interpreter's own state: block depth, request block depth, and
/// the copy-mode gate. Owns no buffers -- everything it reads or writes
/// flows through the [`InputStack`] and [`Collaborators`] passed to each
/// method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interpreter {
    escape_char: char,
    null_indicator: char,
    blkdep: i32,
    reqdep: i32,
    cpmode: bool,
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter {
            escape_char: DEFAULT_ESCAPE,
            null_indicator: DEFAULT_NULL_INDICATOR,
            blkdep: 0,
            reqdep: 0,
            cpmode: false,
        }
    }
}

impl Interpreter {
    /// Create an interpreter with the default escape character and
    /// null-indicator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a non-default escape character or null-indicator.
    #[must_use]
    pub fn with_chars(escape_char: char, null_indicator: char) -> Self {
        Interpreter {
            escape_char,
            null_indicator,
            ..Self::default()
        }
    }

    /// Current block depth (`blkdep`).
    #[must_use]
    pub fn block_depth(&self) -> i32 {
        self.blkdep
    }

    /// Whether copy-mode gating is active.
    #[must_use]
    pub fn copy_mode(&self) -> bool {
        self.cpmode
    }

    /// Set or clear copy-mode: while set, interpolation of `\w`, `\E`,
    /// `\R`, `\?`, and the group markers `\{`/`\}` is suppressed.
    pub fn copymode(&mut self, mode: bool) {
        self.cpmode = mode;
    }

    /// Snapshot the current block depth as the depth of a new request
    /// line, for later use by [`Interpreter::blk`].
    pub fn reqbeg(&mut self) {
        self.reqdep = self.blkdep;
    }

    /// Push one character back onto `input`.
    pub fn back<I: InputStack>(&self, input: &mut I, c: char) {
        input.back(c);
    }

    /// The raw reader: drains null-indicators, recognises the escape
    /// character, and either handles a short in-place escape (newline
    /// fold, `\.`, `\\`, `\t`, `\a`, `\{`/`\}`) or surfaces the escape
    /// character to [`Interpreter::next`] for full introducer dispatch.
    fn raw<I: InputStack>(&mut self, input: &mut I) -> Option<char> {
        loop {
            if input.top() {
                return input.next();
            }
            let mut c = input.next()?;
            while c == self.null_indicator {
                c = input.next()?;
            }
            if c != self.escape_char {
                return Some(c);
            }
            let mut c2 = input.next()?;
            while c2 == self.null_indicator {
                c2 = input.next()?;
            }
            match c2 {
                '\n' => continue,
                '.' => return Some('.'),
                '\\' => {
                    input.back('\\');
                    return Some(self.null_indicator);
                }
                't' => {
                    input.back('\t');
                    return Some(self.null_indicator);
                }
                'a' => {
                    input.back('\u{7}');
                    return Some(self.null_indicator);
                }
                '}' if !self.cpmode => {
                    self.blkdep -= 1;
                    return Some(' ');
                }
                '{' if !self.cpmode => {
                    self.blkdep += 1;
                    return Some(' ');
                }
                other => {
                    input.back(other);
                    return Some(self.escape_char);
                }
            }
        }
    }

    /// Return the next interpreted character, performing any
    /// interpolation along the way, or `None` at end of input.
    pub fn next<I: InputStack, C: Collaborators>(
        &mut self,
        input: &mut I,
        collab: &mut C,
    ) -> Option<char> {
        loop {
            if input.top() {
                return input.next();
            }
            let c = self.raw(input)?;
            if c != self.escape_char {
                return Some(c);
            }
            let c2 = match self.raw(input) {
                Some(c2) => c2,
                None => return Some(self.escape_char),
            };
            match c2 {
                'E' if !self.cpmode => continue,
                '"' => {
                    loop {
                        match self.raw(input) {
                            None => break,
                            Some('\n') => {
                                input.back('\n');
                                break;
                            }
                            _ => {}
                        }
                    }
                    continue;
                }
                'w' if !self.cpmode => {
                    self.do_width(input, collab);
                    continue;
                }
                'n' => {
                    self.do_register(input, collab);
                    continue;
                }
                '*' => {
                    self.do_string(input, collab);
                    continue;
                }
                'g' => {
                    self.do_numfmt(input, collab);
                    continue;
                }
                '$' => {
                    self.do_arg(input, collab);
                    continue;
                }
                'R' if !self.cpmode => {
                    self.do_define_register(input, collab);
                    continue;
                }
                '?' if !self.cpmode => {
                    self.do_conditional(input, collab);
                    continue;
                }
                other => {
                    input.back(other);
                    return Some(self.escape_char);
                }
            }
        }
    }

    /// Consume the remainder of an input block.
    ///
    /// If `skip`, discard characters until a newline appears at or below
    /// the request's block depth (the `blk_dep` snapshot taken by
    /// [`Interpreter::reqbeg`]). Otherwise, skip leading whitespace
    /// (typically produced by a `\{`/`\}` collapse) but push back the
    /// first non-whitespace character.
    pub fn blk<I: InputStack, C: Collaborators>(
        &mut self,
        input: &mut I,
        collab: &mut C,
        skip: bool,
    ) {
        if skip {
            loop {
                match self.raw(input) {
                    None => break,
                    Some('\n') if self.blkdep <= self.reqdep => break,
                    _ => {}
                }
            }
        } else {
            loop {
                match self.next(input, collab) {
                    None => break,
                    Some(' ' | '\t') => continue,
                    Some(c) => {
                        input.back(c);
                        break;
                    }
                }
            }
        }
    }

    fn regid<I: InputStack, C: Collaborators>(&mut self, input: &mut I, collab: &mut C) -> u32 {
        let name = arg::read_ident(input, self.null_indicator, self.cpmode);
        collab.map(&name)
    }

    fn do_register<I: InputStack, C: Collaborators>(&mut self, input: &mut I, collab: &mut C) {
        let sign = match arg::next_non_ni(input, self.null_indicator) {
            Some('+') => Some(true),
            Some('-') => Some(false),
            Some(c) => {
                input.back(c);
                None
            }
            None => None,
        };
        let id = self.regid(input, collab);
        if let Some(inc) = sign {
            collab.inc(id, inc);
        }
        if let Some(s) = collab.str_of(id) {
            input.push(&s, None);
        }
    }

    fn do_string<I: InputStack, C: Collaborators>(&mut self, input: &mut I, collab: &mut C) {
        let arg = arg::read_ident(input, self.null_indicator, self.cpmode);
        if let Some(space) = arg.find(' ') {
            let (name, rest) = arg.split_at(space);
            let args: Vec<String> = rest[1..]
                .split_whitespace()
                .take(limits::NARGS)
                .map(str::to_string)
                .collect();
            let id = collab.map(name);
            if let Some(body) = collab.get(id) {
                let body = body.to_string();
                input.push(&body, Some(&args));
            }
        } else {
            let id = collab.map(&arg);
            if let Some(body) = collab.get(id) {
                let body = body.to_string();
                input.push(&body, None);
            }
        }
    }

    fn do_numfmt<I: InputStack, C: Collaborators>(&mut self, input: &mut I, collab: &mut C) {
        let id = self.regid(input, collab);
        if let Some(s) = collab.fmt_of(id) {
            input.push(&s, None);
        }
    }

    fn do_arg<I: InputStack, C: Collaborators>(&mut self, input: &mut I, collab: &mut C) {
        let name = arg::read_ident(input, self.null_indicator, self.cpmode);
        if let Ok(n) = name.parse::<usize>() {
            if n > 0 && n <= limits::NARGS {
                if let Some(a) = input.arg(n) {
                    let a = a.to_string();
                    input.push(&a, None);
                }
            }
        }
    }

    fn do_width<I: InputStack, C: Collaborators>(&mut self, input: &mut I, collab: &mut C) {
        let text = self.read_quoted_interpreted(input, collab);
        let width = collab.render_width(&text);
        input.push(&width.to_string(), None);
    }

    fn do_define_register<I: InputStack, C: Collaborators>(
        &mut self,
        input: &mut I,
        collab: &mut C,
    ) {
        let arg = cond::read_quoted(input, self.null_indicator);
        let Some(space) = arg.find(' ') else {
            return;
        };
        let (name, expr) = arg.split_at(space);
        let expr = &expr[1..];
        let id = collab.map(name);
        let prev = collab.get(id);
        let value = collab.eval_re(expr, prev, 'u');
        collab.set(id, value);
    }

    fn do_conditional<I: InputStack, C: Collaborators>(&mut self, input: &mut I, collab: &mut C) {
        let arg = cond::read_quoted(input, self.null_indicator);
        let branch = cond::evaluate(&arg, |expr, term| collab.eval_up(expr, term));
        input.push(branch, None);
    }

    /// Read a delimited group the same way `\w'...'` does: fully
    /// interpreted (nested escapes inside the group are expanded), so
    /// the collaborator measures the rendered text rather than the raw
    /// escape sequences.
    fn read_quoted_interpreted<I: InputStack, C: Collaborators>(
        &mut self,
        input: &mut I,
        collab: &mut C,
    ) -> String {
        let delim = loop {
            match self.next(input, collab) {
                Some(c) if c == self.null_indicator => continue,
                Some(c) => break c,
                None => return String::new(),
            }
        };
        let mut out = String::new();
        loop {
            match self.next(input, collab) {
                Some(c) if c == self.null_indicator => continue,
                Some(c) if c == delim => break,
                Some(c) => out.push(c),
                None => break,
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use input::VecInputStack;
    use std::collections::HashMap;

    #[derive(Default)]
    struct StubCollab {
        names: HashMap<String, u32>,
        next_id: u32,
        registers: HashMap<u32, i64>,
        strings: HashMap<u32, String>,
    }

    impl NameTable for StubCollab {
        fn map(&mut self, name: &str) -> u32 {
            if let Some(&id) = self.names.get(name) {
                return id;
            }
            let id = self.next_id;
            self.next_id += 1;
            self.names.insert(name.to_string(), id);
            id
        }
    }

    impl Registers for StubCollab {
        fn get(&self, id: u32) -> i64 {
            *self.registers.get(&id).unwrap_or(&0)
        }
        fn set(&mut self, id: u32, value: i64) {
            self.registers.insert(id, value);
        }
        fn inc(&mut self, id: u32, inc: bool) {
            let cur = self.get(id);
            self.set(id, if inc { cur + 1 } else { cur - 1 });
        }
        fn str_of(&self, id: u32) -> Option<String> {
            Some(self.get(id).to_string())
        }
        fn fmt_of(&self, id: u32) -> Option<String> {
            Some(format!("<{}>", self.get(id)))
        }
    }

    impl Strings for StubCollab {
        fn get(&self, id: u32) -> Option<&str> {
            self.strings.get(&id).map(String::as_str)
        }
    }

    impl Evaluator for StubCollab {
        fn eval_re(&self, expr: &str, prev: i64, _unit: char) -> i64 {
            let expr = expr.trim();
            if let Some(rest) = expr.strip_prefix('+') {
                prev + rest.trim().parse::<i64>().unwrap_or(0)
            } else if let Some(rest) = expr.strip_prefix('-') {
                prev - rest.trim().parse::<i64>().unwrap_or(0)
            } else {
                expr.parse().unwrap_or(prev)
            }
        }

        fn eval_up(&self, expr: &mut &str, _terminator: char) -> i64 {
            let consumed: String = expr
                .chars()
                .take_while(|c| c.is_ascii_digit() || *c == '-')
                .collect();
            *expr = &expr[consumed.len()..];
            consumed.parse().unwrap_or(0)
        }
    }

    impl WidthMeasurer for StubCollab {
        fn render_width(&mut self, text: &str) -> i32 {
            text.chars().count() as i32
        }
    }

    fn interp_all(text: &str, collab: &mut StubCollab) -> String {
        let mut interp = Interpreter::new();
        let mut input = VecInputStack::new(text);
        let mut out = String::new();
        while let Some(c) = interp.next(&mut input, collab) {
            if c != interp.null_indicator {
                out.push(c);
            }
        }
        out
    }

    #[test]
    fn escaped_dot_is_literal() {
        let mut collab = StubCollab::default();
        assert_eq!(interp_all("\\.", &mut collab), ".");
    }

    #[test]
    fn escaped_backslash_round_trips() {
        let mut collab = StubCollab::default();
        assert_eq!(interp_all("\\\\", &mut collab), "\\");
    }

    #[test]
    fn group_markers_become_spaces_outside_copy_mode() {
        let mut collab = StubCollab::default();
        let mut interp = Interpreter::new();
        let mut input = VecInputStack::new("\\{x\\}");
        let mut out = String::new();
        while let Some(c) = interp.next(&mut input, &mut collab) {
            out.push(c);
        }
        assert_eq!(out, " x ");
        assert_eq!(interp.block_depth(), 0);
    }

    #[test]
    fn group_markers_pass_through_in_copy_mode() {
        let mut collab = StubCollab::default();
        let mut interp = Interpreter::new();
        interp.copymode(true);
        let mut input = VecInputStack::new("\\{x\\}");
        let mut out = String::new();
        while let Some(c) = interp.next(&mut input, &mut collab) {
            out.push(c);
        }
        assert_eq!(out, "\\{x\\}");
        assert_eq!(interp.block_depth(), 0);
    }

    #[test]
    fn conditional_true_and_false_branches() {
        let mut collab = StubCollab::default();
        assert_eq!(interp_all("\\?'1@A@B@'", &mut collab), "A");
        assert_eq!(interp_all("\\?'0@A@B@'", &mut collab), "B");
    }

    #[test]
    fn register_increment_then_interpolation() {
        let mut collab = StubCollab::default();
        let id = collab.map("xy");
        collab.set(id, 5);
        assert_eq!(interp_all("\\n+(xy", &mut collab), "6");
        assert_eq!(collab.get(id), 6);
    }

    #[test]
    fn string_interpolation_with_arguments() {
        let mut collab = StubCollab::default();
        let id = collab.map("m");
        collab.strings.insert(id, "got it".to_string());
        assert_eq!(interp_all("\\*[m one two]", &mut collab), "got it");
    }

    #[test]
    fn numfmt_uses_formatted_stringification() {
        let mut collab = StubCollab::default();
        let id = collab.map("xy");
        collab.set(id, 7);
        assert_eq!(interp_all("\\g(xy", &mut collab), "<7>");
    }

    #[test]
    fn width_measurement_pushes_decimal_width() {
        let mut collab = StubCollab::default();
        assert_eq!(interp_all("\\w'abc'", &mut collab), "3");
    }

    #[test]
    fn register_define_then_increment() {
        let mut collab = StubCollab::default();
        interp_all("\\R'xy 5'", &mut collab);
        let id = collab.map("xy");
        assert_eq!(collab.get(id), 5);
        assert_eq!(interp_all("\\n+(xy", &mut collab), "6");
    }

    #[test]
    fn line_comment_discards_until_newline() {
        let mut collab = StubCollab::default();
        assert_eq!(interp_all("a\\\"comment\nb", &mut collab), "a\nb");
    }

    #[test]
    fn unknown_introducer_surfaces_escape_literally() {
        let mut collab = StubCollab::default();
        let mut interp = Interpreter::new();
        let mut input = VecInputStack::new("\\Qx");
        assert_eq!(interp.next(&mut input, &mut collab), Some('\\'));
        assert_eq!(interp.next(&mut input, &mut collab), Some('Q'));
        assert_eq!(interp.next(&mut input, &mut collab), Some('x'));
    }

    #[test]
    fn blk_skip_stops_at_newline_at_request_depth() {
        let mut collab = StubCollab::default();
        let mut interp = Interpreter::new();
        interp.reqbeg();
        let mut input = VecInputStack::new("skip this\nrest");
        interp.blk(&mut input, &mut collab, true);
        let mut rest = String::new();
        while let Some(c) = interp.next(&mut input, &mut collab) {
            rest.push(c);
        }
        assert_eq!(rest, "rest");
    }

    #[test]
    fn blk_noskip_trims_leading_whitespace() {
        let mut collab = StubCollab::default();
        let mut interp = Interpreter::new();
        let mut input = VecInputStack::new("   word");
        interp.blk(&mut input, &mut collab, false);
        let mut rest = String::new();
        while let Some(c) = interp.next(&mut input, &mut collab) {
            rest.push(c);
        }
        assert_eq!(rest, "word");
    }
}

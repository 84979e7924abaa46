//! A completed, justified line, and the fixed-capacity ring buffer of
//! lines waiting to be dequeued by the consumer.

use super::limits::NLINES;

/// One completed line, ready for the consumer.
///
/// Mirrors `struct line` in the design document. Unlike the source
/// (which builds a line's text incrementally into an `sbuf` across
/// several calls while pointers into `words[]` are still live), this
/// crate assembles a line's text fully before it is ever placed in the
/// ring buffer -- idiomatic here because there is no equivalent need to
/// mutate a line in place once its content is known.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    /// The line's rendered text, gaps already expanded to `\h'Nu'` escapes
    /// (or whatever the host's escaping convention is) ahead of each
    /// word, matching `fmt_wordscopy`.
    pub text: String,
    /// Total width of the line's words and gaps (plus a trailing hyphen
    /// width, if the line ends on a hyphenation point).
    pub wid: i32,
    /// The line's indent, snapshotted when the line was started.
    pub li: i32,
    /// The line's length (measure), snapshotted when the line was
    /// started.
    pub ll: i32,
    /// Maximum negative extra line-spacing among the line's words.
    pub elsn: i32,
    /// Maximum positive extra line-spacing among the line's words.
    pub elsp: i32,
}

/// The fixed-capacity ring buffer of completed lines.
///
/// Mirrors `fmt`'s `lines`/`l_head`/`l_tail` fields: `l_tail == l_head`
/// means empty, and `(l_head + 1) % NLINES == l_tail` means full -- one
/// slot is always left unused so the two conditions stay distinguishable.
#[derive(Debug)]
pub struct LineBuffer {
    lines: Vec<Option<Line>>,
    head: usize,
    tail: usize,
}

impl Default for LineBuffer {
    fn default() -> Self {
        LineBuffer {
            lines: (0..NLINES).map(|_| None).collect(),
            head: 0,
            tail: 0,
        }
    }
}

impl LineBuffer {
    /// An empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` when no completed lines are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    /// `true` when the buffer has no room for another line.
    #[must_use]
    pub fn is_full(&self) -> bool {
        (self.head + 1) % NLINES == self.tail
    }

    /// The number of completed lines currently queued. Mirrors
    /// `fmt_nlines`.
    #[must_use]
    pub fn len(&self) -> usize {
        if self.tail <= self.head {
            self.head - self.tail
        } else {
            NLINES - self.tail + self.head
        }
    }

    /// Enqueue a completed line. Returns the line back on failure
    /// (buffer full) so the caller can retry after draining with
    /// [`LineBuffer::pop`]. Mirrors `fmt_mkline` + `fmt_extractline`.
    pub fn push(&mut self, line: Line) -> Result<(), Line> {
        if self.is_full() {
            return Err(line);
        }
        self.lines[self.head] = Some(line);
        self.head = (self.head + 1) % NLINES;
        Ok(())
    }

    /// Dequeue the oldest completed line, if any. Mirrors `fmt_nextline`.
    pub fn pop(&mut self) -> Option<Line> {
        if self.is_empty() {
            return None;
        }
        let line = self.lines[self.tail].take();
        self.tail = (self.tail + 1) % NLINES;
        line
    }
}

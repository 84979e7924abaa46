//! A single queued word, and the explicit-hyphenation splitting that
//! turns one measured [`WordBuilder`] into one or more [`Word`]s.

use super::collab::WordBuilder;

/// The discretionary-hyphen introducer: marks a point where a word may
/// break with a hyphen inserted, without a hyphen glyph present in the
/// running text otherwise. Corresponds to `\%` in the source material.
const SOFT_HYPHEN: &str = "\\%";

/// A literal hyphen already present in the word's text. A break here
/// needs no additional hyphen glyph -- the character itself renders one.
const HARD_HYPHEN: char = '-';

/// A single word queued for line-breaking.
///
/// Mirrors `struct word` in the design document, with `str` renamed to
/// [`Word::stretch`] (`str` is a reserved word in Rust).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    /// The word's escaped textual representation.
    pub s: String,
    /// The word's width.
    pub wid: i32,
    /// Extra negative line-spacing this word contributes to its line.
    pub elsn: i32,
    /// Extra positive line-spacing this word contributes to its line.
    pub elsp: i32,
    /// The space before this word.
    pub gap: i32,
    /// The width of a hyphen, if a break is inserted after this word; 0
    /// if this word carries no hyphenation point.
    pub hy: i32,
    /// Whether the gap before this word may be stretched to adjust the
    /// line.
    pub stretch: bool,
}

/// A candidate break point inside a word's text, at byte offset `at`
/// (after the marker has been removed from the surrounding text).
/// `draw_hyphen` is true for a discretionary point (nothing visible in
/// the source text) and false for a hyphen character already present.
struct HyphenPoint {
    at: usize,
    draw_hyphen: bool,
}

/// Find explicit hyphenation points in `text` -- soft-hyphen markers and
/// literal hyphen characters -- stripping the soft-hyphen markers out of
/// the returned plain text.
///
/// This is a textual approximation of the source's `fmt_hyphmarks`: that
/// function walks the word one escape unit at a time using the
/// word-buffer's own escape reader, which (like font-aware substring
/// width remeasurement, see [`insert_word`]) lives entirely inside the
/// `WordBuilder` collaborator and is not exposed by the trait this crate
/// defines. Recognising the two marker forms textually is the closest
/// equivalent available at this boundary.
///
/// A mark at the very start of the word -- nothing has been copied to
/// `plain` yet -- is never a break point, matching `fmt_hyphmarks`'s
/// leading skip loop, which consumes the first token unconditionally
/// and bails out of hyphenation entirely if that token is itself a
/// hyphen. A word that is only marks and never accumulates any leading
/// text before running out therefore comes back with no points at all,
/// i.e. non-splitting.
fn hyphen_points(text: &str) -> (String, Vec<HyphenPoint>) {
    let mut plain = String::with_capacity(text.len());
    let mut points = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        if let Some(tail) = rest.strip_prefix(SOFT_HYPHEN) {
            if !plain.is_empty() {
                points.push(HyphenPoint {
                    at: plain.len(),
                    draw_hyphen: true,
                });
            }
            rest = tail;
            continue;
        }
        let at_start = plain.is_empty();
        let c = rest.chars().next().expect("rest is non-empty");
        plain.push(c);
        if c == HARD_HYPHEN && !at_start {
            points.push(HyphenPoint {
                at: plain.len(),
                draw_hyphen: false,
            });
        }
        rest = &rest[c.len_utf8()..];
    }
    (plain, points)
}

/// Turn one measured word into one or more [`Word`]s, splitting at any
/// explicit hyphenation points it contains.
///
/// `gap` is the space before the word as a whole; only the first
/// resulting sub-word carries it (and is stretchable) -- later pieces of
/// the same hyphenated word have no space before them.
///
/// Because [`WordBuilder`] exposes only the whole word's width and
/// hyphen width (not a way to remeasure an arbitrary substring), each
/// sub-word's width is estimated in proportion to its share of the
/// plain text's length. A host with true per-substring measurement can
/// get exact results by hyphenating before calling [`insert_word`], i.e.
/// by supplying one [`WordBuilder`] per already-split fragment.
pub fn insert_word(wb: &impl WordBuilder, gap: i32, out: &mut Vec<Word>) -> usize {
    let (plain, points) = hyphen_points(wb.buf());
    if points.is_empty() {
        out.push(Word {
            s: plain,
            wid: wb.width(),
            elsn: 0,
            elsp: 0,
            gap,
            hy: 0,
            stretch: true,
        });
        return 1;
    }
    let total_len = plain.len().max(1) as i64;
    let total_wid = i64::from(wb.width());
    let mut prev = 0usize;
    let mut produced = 0usize;
    let bounds: Vec<usize> = points
        .iter()
        .map(|p| p.at)
        .chain(std::iter::once(plain.len()))
        .collect();
    for (i, &end) in bounds.iter().enumerate() {
        let piece = &plain[prev..end];
        let piece_wid = (total_wid * piece.len() as i64 / total_len) as i32;
        let is_break = i < points.len();
        out.push(Word {
            s: piece.to_string(),
            wid: piece_wid,
            elsn: 0,
            elsp: 0,
            gap: if i == 0 { gap } else { 0 },
            hy: if is_break && points[i].draw_hyphen {
                wb.hyphen_width()
            } else {
                0
            },
            stretch: i == 0,
        });
        prev = end;
        produced += 1;
    }
    produced
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubWord {
        buf: String,
        wid: i32,
        hywid: i32,
        eos: bool,
    }

    impl WordBuilder for StubWord {
        fn buf(&self) -> &str {
            &self.buf
        }
        fn width(&self) -> i32 {
            self.wid
        }
        fn hyphen_width(&self) -> i32 {
            self.hywid
        }
        fn ends_sentence(&self) -> bool {
            self.eos
        }
        fn is_empty(&self) -> bool {
            self.buf.is_empty()
        }
    }

    #[test]
    fn plain_word_produces_a_single_stretchable_word() {
        let wb = StubWord {
            buf: "hello".to_string(),
            wid: 50,
            hywid: 5,
            eos: false,
        };
        let mut out = Vec::new();
        let n = insert_word(&wb, 10, &mut out);
        assert_eq!(n, 1);
        assert_eq!(out[0].s, "hello");
        assert_eq!(out[0].wid, 50);
        assert_eq!(out[0].gap, 10);
        assert_eq!(out[0].hy, 0);
        assert!(out[0].stretch);
    }

    #[test]
    fn soft_hyphen_marker_splits_and_strips_itself() {
        let wb = StubWord {
            buf: "happi\\%ness".to_string(),
            wid: 100,
            hywid: 8,
            eos: false,
        };
        let mut out = Vec::new();
        let n = insert_word(&wb, 10, &mut out);
        assert_eq!(n, 2);
        assert_eq!(out[0].s, "happi");
        assert_eq!(out[1].s, "ness");
        assert_eq!(out[0].hy, 8);
        assert_eq!(out[1].hy, 0);
        assert_eq!(out[0].gap, 10);
        assert_eq!(out[1].gap, 0);
        assert!(out[0].stretch);
        assert!(!out[1].stretch);
    }

    #[test]
    fn literal_hyphen_splits_without_drawing_an_extra_one() {
        let wb = StubWord {
            buf: "well-known".to_string(),
            wid: 90,
            hywid: 8,
            eos: false,
        };
        let mut out = Vec::new();
        let n = insert_word(&wb, 6, &mut out);
        assert_eq!(n, 2);
        assert_eq!(out[0].s, "well-");
        assert_eq!(out[1].s, "known");
        assert_eq!(out[0].hy, 0);
        assert_eq!(out[1].hy, 0);
    }

    #[test]
    fn leading_soft_hyphen_marker_is_not_a_break_point() {
        let wb = StubWord {
            buf: "\\%foo".to_string(),
            wid: 30,
            hywid: 3,
            eos: false,
        };
        let mut out = Vec::new();
        let n = insert_word(&wb, 5, &mut out);
        assert_eq!(n, 1);
        assert_eq!(out[0].s, "foo");
        assert_eq!(out[0].hy, 0);
        assert!(out[0].stretch);
    }

    #[test]
    fn leading_literal_hyphen_is_not_a_break_point() {
        let wb = StubWord {
            buf: "-foo".to_string(),
            wid: 30,
            hywid: 3,
            eos: false,
        };
        let mut out = Vec::new();
        let n = insert_word(&wb, 5, &mut out);
        assert_eq!(n, 1);
        assert_eq!(out[0].s, "-foo");
        assert_eq!(out[0].hy, 0);
    }

    #[test]
    fn word_that_is_only_a_hyphen_mark_does_not_split() {
        let wb = StubWord {
            buf: "\\%".to_string(),
            wid: 0,
            hywid: 3,
            eos: false,
        };
        let mut out = Vec::new();
        let n = insert_word(&wb, 5, &mut out);
        assert_eq!(n, 1);
    }

    #[test]
    fn widths_are_distributed_in_proportion_to_text_length() {
        let wb = StubWord {
            buf: "ab\\%cd".to_string(),
            wid: 40,
            hywid: 4,
            eos: false,
        };
        let mut out = Vec::new();
        insert_word(&wb, 0, &mut out);
        assert_eq!(out[0].wid + out[1].wid, 40);
    }
}

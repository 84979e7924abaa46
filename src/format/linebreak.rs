//! The optimal-fit line-break dynamic program: for each prefix of the
//! queued words, the cost of the cheapest way to have broken it into
//! lines, memoised so the whole paragraph is solved in one pass.
//!
//! This mirrors the source's `fmt_findcost`/`fmt_breakparagraph`/
//! `fmt_head`/`fmt_break` family closely enough that the recursive shape
//! (each position's cost built from the best of all earlier break
//! points) is kept as actual recursion: the memo table makes each
//! position's cost computed exactly once, so the call depth this
//! produces is bounded by the number of queued words, the same bound
//! the source relies on.
//!
//! Compare `textwrap`'s `wrap_optimal_fit`, which solves a structurally
//! similar problem (minimise total cost of a sequence of line breaks)
//! with the SMAWK algorithm in O(n) amortised time. That shortcut
//! depends on the cost matrix being a total monotone matrix, which does
//! not hold here once hyphenation-depth penalties make a break's cost
//! depend on how the *previous* lines were broken, not just on the break
//! position itself -- so this module solves the O(n^2) recurrence
//! directly instead, same as the source.

use super::word::Word;
use crate::config::Config;

/// Memoisation arrays for the line-break recurrence, indexed by word
/// position (`0..=nwords`). `best_pos[pos] < 0` marks "not yet solved".
#[derive(Debug, Clone)]
pub struct Memo {
    best: Vec<i64>,
    best_pos: Vec<i32>,
    best_dep: Vec<i32>,
}

impl Memo {
    /// A fresh memo table sized for `nwords` queued words (valid
    /// positions `0..=nwords`).
    #[must_use]
    pub fn new(nwords: usize) -> Self {
        Memo {
            best: vec![0; nwords + 1],
            best_pos: vec![-1; nwords + 1],
            best_dep: vec![0; nwords + 1],
        }
    }
}

/// Approximate `8 * sqrt(cost)` using a fixed-point bit expansion,
/// capped at `2^13`. The exact bit pattern is preserved from the source
/// so that two implementations given the same inputs assign the same
/// costs and therefore choose the same breaks.
fn scaledown(cost: i64) -> i64 {
    let mut ret: i64 = 0;
    for i in 0..14 {
        ret += ((cost >> (i * 2)) & 3) << (i + 3);
    }
    ret.min(1 << 13)
}

/// The cost of putting `lwid` units of words and `nspc` stretchable
/// spaces (totalling `swid` units of stretch) into a line of length
/// `llen`.
fn line_cost(llen: i32, lwid: i32, swid: i32, nspc: i32) -> i64 {
    let swid = if swid != 0 { swid } else { 1 };
    let mut ratio = (i64::from(llen - lwid) * 100 / i64::from(swid)).abs();
    if ratio > 4000 {
        ratio = 4000 + scaledown(ratio - 4000);
    }
    let nspc = i64::from(if nspc != 0 { nspc } else { 1 });
    ratio * ratio / 100 * nspc
}

/// The number of consecutive hyphenated line breaks ending at `pos`,
/// capped at 5 (beyond which `hyphen_cost` always applies the maximum
/// penalty anyway).
fn hyphen_depth(words: &[Word], memo: &Memo, pos: usize) -> i32 {
    let mut n = 0;
    let mut pos = pos;
    while pos > 0 && words[pos - 1].hy != 0 && n < 5 {
        n += 1;
        pos = memo.best_pos[pos].max(0) as usize;
    }
    n
}

/// The penalty for ending a line on a hyphenation point `depth` lines in
/// a row. `hyphen_line_limit <= 0` means no limit.
const PROHIBITIVE_HYPHEN_COST: i64 = 10_000_000;

fn hyphen_cost(cfg: &Config, depth: i32) -> i64 {
    if cfg.hyphen_line_limit > 0 && depth > cfg.hyphen_line_limit {
        return PROHIBITIVE_HYPHEN_COST;
    }
    let sum = match depth {
        d if d >= 3 => cfg
            .hyphen_cost
            .checked_add(cfg.hyphen_cost2)
            .and_then(|c| c.checked_add(cfg.hyphen_cost3)),
        2 => cfg.hyphen_cost.checked_add(cfg.hyphen_cost2),
        1 => Some(cfg.hyphen_cost),
        _ => Some(0),
    };
    sum.unwrap_or(PROHIBITIVE_HYPHEN_COST)
}

/// The cost of the cheapest way to break `words[0..pos]` into lines,
/// memoising every position it visits along the way.
///
/// `llen` is the per-line measure snapshot (`FMT_LLEN(f)` in the source:
/// `ll - li` as they stood when this batch of words started filling),
/// not the *live* configuration -- a mid-paragraph `.ll`/`.ti` change
/// must not retroactively reshape lines already queued for breaking.
pub fn find_cost(words: &[Word], cfg: &Config, llen: i32, memo: &mut Memo, pos: usize) -> i64 {
    if pos == 0 {
        return 0;
    }
    if memo.best_pos[pos] >= 0 {
        return memo.best[pos];
    }
    let llen = llen.max(1);
    let hyphenated = words[pos - 1].hy != 0;
    let mut lwid = words[pos - 1].hy;
    let mut swid = 0;
    let mut nspc = 0;
    let mut i = pos as isize - 1;
    while i >= 0 {
        let idx = i as usize;
        lwid += words[idx].wid;
        if idx + 1 < pos {
            lwid += words[idx + 1].gap;
        }
        if idx + 1 < pos && words[idx + 1].stretch {
            swid += words[idx + 1].gap;
            nspc += 1;
        }
        if lwid > llen + swid * cfg.shrink_percent / 100 && idx + 1 < pos {
            break;
        }
        // Cost accumulation is checked and treated as "too costly to
        // consider" on overflow, the same way the teacher's optimal-fit
        // cost recurrence uses `checked_add`/`checked_mul` and bails out
        // of a candidate rather than wrapping or panicking.
        let cur =
            find_cost(words, cfg, llen, memo, idx).checked_add(line_cost(llen, lwid, swid, nspc));
        let cur = cur.and_then(|cur| {
            if hyphenated {
                let depth = 1 + hyphen_depth(words, memo, idx);
                cur.checked_add(hyphen_cost(cfg, depth))
            } else {
                Some(cur)
            }
        });
        if let Some(cur) = cur {
            if memo.best_pos[pos] < 0 || cur < memo.best[pos] {
                memo.best_pos[pos] = idx as i32;
                memo.best_dep[pos] = memo.best_dep[idx] + 1;
                memo.best[pos] = cur;
            }
        }
        i -= 1;
    }
    memo.best[pos]
}

/// The best line-break position immediately before `pos` (0 if none is
/// recorded yet).
fn best_pos(words: &[Word], cfg: &Config, llen: i32, memo: &mut Memo, pos: usize) -> usize {
    find_cost(words, cfg, llen, memo, pos);
    memo.best_pos[pos].max(0) as usize
}

/// The number of lines the optimal solution up to `pos` uses.
fn best_dep(words: &[Word], cfg: &Config, llen: i32, memo: &mut Memo, pos: usize) -> i32 {
    find_cost(words, cfg, llen, memo, pos);
    memo.best_dep[pos].max(0)
}

/// Find the last word that should be included when filling, optionally
/// forcing a short last line to avoid a widow when `br` (a final,
/// end-of-paragraph fill) is set.
///
/// `fillreq`, if set to a word index at or before `pos`, forces the
/// break there unconditionally (a `\p` paragraph-fill request takes
/// priority over the cost search).
///
/// `llen` is the same per-line measure snapshot described on
/// [`find_cost`], not the live configuration.
pub fn break_paragraph(
    words: &[Word],
    cfg: &Config,
    llen: i32,
    memo: &mut Memo,
    pos: usize,
    br: bool,
    fillreq: Option<usize>,
) -> usize {
    if let Some(fillreq) = fillreq {
        if fillreq > 0 && fillreq <= words.len() {
            find_cost(words, cfg, llen, memo, fillreq);
            return fillreq;
        }
    }
    if pos == 0 {
        return 0;
    }
    if words[pos - 1].wid >= llen {
        find_cost(words, cfg, llen, memo, pos);
        return pos;
    }
    let mut best: Option<usize> = None;
    let mut best_cost: i64 = 0;
    let mut lwid = if words[pos - 1].hy != 0 {
        words[pos - 1].hy
    } else {
        0
    };
    let mut swid = 0;
    let mut nspc = 0;
    let mut i = pos as isize - 1;
    while i >= 0 {
        let idx = i as usize;
        lwid += words[idx].wid;
        if idx + 1 < pos {
            lwid += words[idx + 1].gap;
        }
        if idx + 1 < pos && words[idx + 1].stretch {
            swid += words[idx + 1].gap;
            nspc += 1;
        }
        if lwid > llen && idx + 1 < pos {
            break;
        }
        let mut cost = find_cost(words, cfg, llen, memo, idx);
        if br && cfg.short_last_line_percent > 0 && lwid < llen * cfg.short_last_line_percent / 100
        {
            let pmll = llen * cfg.short_last_line_percent / 100;
            if pmll > 0 {
                let widow_penalty = cfg
                    .short_last_line_cost
                    .checked_mul(i64::from(pmll - lwid))
                    .and_then(|p| p.checked_div(i64::from(pmll)));
                cost = widow_penalty.and_then(|p| cost.checked_add(p)).unwrap_or(cost);
            }
        }
        if best.is_none() || cost < best_cost {
            best = Some(idx);
            best_cost = cost;
        }
        i -= 1;
    }
    best.unwrap_or(0)
}

/// Extract the first `nreq` formatted lines before the word at `pos`,
/// preferring a break that avoids ending those lines on a hyphenation
/// point when a nearby non-hyphenated alternative exists at the same
/// line depth. Used to respect a page-trap budget.
pub fn head(words: &[Word], cfg: &Config, llen: i32, memo: &mut Memo, nreq: i32, pos: usize) -> usize {
    if nreq <= 0 || best_dep(words, cfg, llen, memo, pos) < nreq {
        return pos;
    }
    let mut best = pos;
    while best > 0 && best_dep(words, cfg, llen, memo, best) > nreq {
        best = best_pos(words, cfg, llen, memo, best);
    }
    let mut prev = best;
    let mut next = best;
    while prev > 1 && words[prev - 1].hy != 0 && best_dep(words, cfg, llen, memo, prev - 1) == nreq
    {
        prev -= 1;
    }
    while next < pos && words[next - 1].hy != 0 && best_dep(words, cfg, llen, memo, next) == nreq {
        next += 1;
    }
    let prev_hy = words[prev - 1].hy != 0;
    let next_hy = words[next - 1].hy != 0;
    if !prev_hy && !next_hy {
        if find_cost(words, cfg, llen, memo, prev) <= find_cost(words, cfg, llen, memo, next) {
            prev
        } else {
            next
        }
    } else if !prev_hy {
        prev
    } else if !next_hy {
        next
    } else {
        best
    }
}

/// One line's worth of words, with its final stretched gaps, ready to be
/// rendered into a [`super::line::Line`].
#[derive(Debug, Clone, Copy)]
pub struct LineSpan {
    pub beg: usize,
    pub end: usize,
}

/// Break `words[0..end]` into line spans according to the memoised best
/// positions, in left-to-right (emission) order.
pub fn break_lines(
    words: &[Word],
    cfg: &Config,
    llen: i32,
    memo: &mut Memo,
    end: usize,
) -> Vec<LineSpan> {
    let mut spans = Vec::new();
    let mut end = end;
    loop {
        let beg = best_pos(words, cfg, llen, memo, end);
        spans.push(LineSpan { beg, end });
        if beg == 0 {
            break;
        }
        end = beg;
    }
    spans.reverse();
    spans
}

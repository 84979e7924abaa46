//! The formatter's configuration store.
//!
//! A real typesetting system keeps these knobs in a process-wide register
//! table (`n_l`, `n_i`, ... in the design document's vocabulary) that is
//! mutated by request handlers such as `.ll` or `.in`. This crate does not
//! own that table -- it only snapshots the values it needs at the start of
//! each line (see [`crate::format::Formatter`]) -- so `Config` is a plain,
//! cheaply cloned struct the host hands in, built the same way
//! `textwrap::Options` is: a constructor for the one knob every caller
//! needs, plus chained `with_*` setters for the rest.

/// Which sides of a line may stretch or shrink to fill it.
///
/// Mirrors the `AD_B` ("adjust both") bit and friends from the design
/// document's `n_j` register; only "both" is meaningful for this crate
/// since centering and no-adjust are already broken out into their own
/// flags on [`Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    /// Distribute the line's slack evenly across stretchable gaps.
    Both,
    /// Emit gaps exactly as queued; never stretch or shrink.
    None,
}

/// Which lines a trap boundary forbids from ending in a hyphen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HyphenationFlags {
    /// Corresponds to `HY_LAST`: forbid (when an equally-costed
    /// alternative exists) a hyphenated break on the last line emitted
    /// before a page trap.
    pub no_hyphen_before_trap: bool,
}

impl Default for HyphenationFlags {
    fn default() -> Self {
        HyphenationFlags {
            no_hyphen_before_trap: false,
        }
    }
}

/// The configuration-store keys from the design document's §6, as a plain
/// struct.
///
/// Constructed with [`Config::new`] and refined with `with_*` builder
/// methods, exactly like `textwrap::Options::new(width).splitter(...)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// `n_l`: target line length.
    pub line_length: i32,
    /// `n_i`: paragraph indent.
    pub indent: i32,
    /// `n_ti`: temporary indent for the next line only; `None` once
    /// consumed (mirrors the source's sentinel of `-1`).
    pub temp_indent: Option<i32>,
    /// `n_u`: fill mode is enabled.
    pub fill: bool,
    /// `n_ce`: number of centered lines remaining (0 = not centering).
    pub centered_lines: i32,
    /// `n_na`: adjustment is disabled outright.
    pub no_adjust: bool,
    /// `n_j`: which sides adjust.
    pub adjustment: Adjustment,
    /// `n_ssh`: percentage of stretchable width a line may additionally
    /// borrow against when testing whether a candidate line still fits.
    pub shrink_percent: i32,
    /// `n_hy`: hyphenation flags.
    pub hyphenation: HyphenationFlags,
    /// `n_hlm`: maximum depth of consecutive hyphenated line endings;
    /// `0` means unlimited.
    pub hyphen_line_limit: i32,
    /// `n_hycost`: penalty for a single hyphenated line ending.
    pub hyphen_cost: i64,
    /// `n_hycost2`: additional penalty once depth reaches 2.
    pub hyphen_cost2: i64,
    /// `n_hycost3`: additional penalty once depth reaches 3 or more.
    pub hyphen_cost3: i64,
    /// `n_pmll`: minimum acceptable last-line length, as a percentage of
    /// `line_length`; `0` disables the short-last-line penalty.
    pub short_last_line_percent: i32,
    /// `n_pmllcost`: scale of the short-last-line penalty.
    pub short_last_line_cost: i64,
    /// `n_s`: current point size, used only to ask [`crate::format::collab::FontMetrics`]
    /// for space widths.
    pub size: i32,
    /// `n_ss`: normal inter-word space scaling, in percent.
    pub space_scale: i32,
    /// `n_sss`: sentence-space scaling, in percent.
    pub sentence_space_scale: i32,
    /// `n_f`: current font id.
    pub font: u32,
}

impl Config {
    /// Create a configuration with the classical defaults: fill and
    /// adjustment both on, no hyphenation depth limit, no short-line
    /// penalty, zero indent.
    #[must_use]
    pub fn new(line_length: i32) -> Self {
        Config {
            line_length,
            indent: 0,
            temp_indent: None,
            fill: true,
            centered_lines: 0,
            no_adjust: false,
            adjustment: Adjustment::Both,
            shrink_percent: 100,
            hyphenation: HyphenationFlags::default(),
            hyphen_line_limit: 0,
            hyphen_cost: 0,
            hyphen_cost2: 0,
            hyphen_cost3: 0,
            short_last_line_percent: 0,
            short_last_line_cost: 0,
            size: 10,
            space_scale: 100,
            sentence_space_scale: 100,
            font: 0,
        }
    }

    /// Set the paragraph indent.
    #[must_use]
    pub fn with_indent(mut self, indent: i32) -> Self {
        self.indent = indent;
        self
    }

    /// Set a one-shot temporary indent for the next line.
    #[must_use]
    pub fn with_temp_indent(mut self, indent: i32) -> Self {
        self.temp_indent = Some(indent);
        self
    }

    /// Toggle fill mode.
    #[must_use]
    pub fn with_fill(mut self, fill: bool) -> Self {
        self.fill = fill;
        self
    }

    /// Disable adjustment outright (`n_na`).
    #[must_use]
    pub fn with_no_adjust(mut self, no_adjust: bool) -> Self {
        self.no_adjust = no_adjust;
        self
    }

    /// Set the hyphenation depth limit (`n_hlm`); `0` means unlimited.
    #[must_use]
    pub fn with_hyphen_line_limit(mut self, limit: i32) -> Self {
        self.hyphen_line_limit = limit;
        self
    }

    /// Set the three escalating hyphenation-depth penalties.
    #[must_use]
    pub fn with_hyphen_costs(mut self, cost1: i64, cost2: i64, cost3: i64) -> Self {
        self.hyphen_cost = cost1;
        self.hyphen_cost2 = cost2;
        self.hyphen_cost3 = cost3;
        self
    }

    /// Set the short-last-line (widow) penalty parameters.
    #[must_use]
    pub fn with_short_last_line(mut self, percent: i32, cost: i64) -> Self {
        self.short_last_line_percent = percent;
        self.short_last_line_cost = cost;
        self
    }

    /// Set `HY_LAST`-style trap gating.
    #[must_use]
    pub fn with_no_hyphen_before_trap(mut self, enabled: bool) -> Self {
        self.hyphenation.no_hyphen_before_trap = enabled;
        self
    }

    /// Set the normal inter-word space scaling (`n_ss`), in percent.
    #[must_use]
    pub fn with_space_scale(mut self, scale: i32) -> Self {
        self.space_scale = scale;
        self
    }

    /// Set the sentence-space scaling (`n_sss`), in percent.
    #[must_use]
    pub fn with_sentence_space_scale(mut self, scale: i32) -> Self {
        self.sentence_space_scale = scale;
        self
    }

    /// Effective indent for the next line: the temporary indent if one is
    /// pending, else the paragraph indent. Mirrors `fmt_confupdate`'s
    /// `n_ti >= 0 ? n_ti : n_i`.
    #[must_use]
    pub fn effective_indent(&self) -> i32 {
        self.temp_indent.unwrap_or(self.indent)
    }

    /// The usable measure of a line: `ll - li`, floored at zero.
    #[must_use]
    pub fn measure(&self, indent: i32) -> i32 {
        std::cmp::max(0, self.line_length - indent)
    }

    /// Whether lines should be filled and justified at all (`!n_ce && n_u`).
    #[must_use]
    pub fn should_fill(&self) -> bool {
        self.centered_lines == 0 && self.fill
    }

    /// Whether adjustment is active: `n_u && !n_na && !n_ce && (n_j & AD_B) == AD_B`.
    #[must_use]
    pub fn should_adjust(&self) -> bool {
        self.fill
            && !self.no_adjust
            && self.centered_lines == 0
            && self.adjustment == Adjustment::Both
    }
}

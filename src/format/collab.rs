//! Auxiliary collaborators the formatter consults but does not own: the
//! word builder that measured and hyphenation-marked the text, font
//! metrics for space widths, and the page layout oracle behind
//! trap-limited filling.
//!
//! Corresponds to the design document's §6 "Formatter ← collaborator".

/// A fully measured word, ready to be queued. Corresponds to `wb` (word
/// buffer) in the original implementation: by the time the formatter
/// sees it, widths and hyphenation marks have already been computed.
pub trait WordBuilder {
    /// The word's escaped textual representation, including any
    /// explicit hyphenation markers embedded by the collaborator.
    fn buf(&self) -> &str;

    /// The word's rendered width.
    fn width(&self) -> i32;

    /// The width of a hyphen, if inserted after this word at a line
    /// break; callers only consult this when the word carries a
    /// hyphenation point.
    fn hyphen_width(&self) -> i32;

    /// Whether this word ends a sentence (controls the sentence-space
    /// widening rule).
    fn ends_sentence(&self) -> bool;

    /// Whether the word carries no text at all (such a word is dropped
    /// by [`super::Formatter::word`] rather than queued).
    fn is_empty(&self) -> bool;
}

/// Font metrics needed to compute inter-word and sentence spacing.
pub trait FontMetrics {
    /// The width of a space at the given font/size/scale.
    fn space_width(&self, font: u32, size: i32, scale: i32) -> i32;
}

/// Page layout information needed for trap-aware partial filling.
pub trait PageOracle {
    /// Vertical distance, in basic units, to the next trap (or to the
    /// bottom of the page if there is none).
    fn distance_to_trap(&self) -> i32;

    /// The height of one output line at the current vertical spacing.
    fn line_height(&self) -> i32;

    /// The current baseline position on the page.
    fn baseline(&self) -> i32;
}

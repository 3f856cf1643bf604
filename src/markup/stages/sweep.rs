//! Regex sweeps over stripped text.
//!
//! Structural stripping is not exhaustive against every markup dialect, so two
//! passes clean up after it: one removes whole tags and stray link/template
//! syntax, the other removes artifacts that stripping leaves behind.

use lazy_static::lazy_static;
use regex::Regex;

use super::Stage;

lazy_static! {
    /// Any HTML/XML tag
    static ref RE_TAG: Regex = Regex::new(r"<[^>]+>").unwrap();

    /// Link syntax that survived stripping, e.g. from unbalanced nesting
    static ref RE_STRAY_LINK: Regex = Regex::new(r"\[\[.*?\]\]").unwrap();

    /// Template syntax that survived stripping
    static ref RE_STRAY_TEMPLATE: Regex = Regex::new(r"\{\{.*?\}\}").unwrap();

    /// Image size directive fused to a display mode, e.g. `frameless|350px`
    static ref RE_SIZED_MODE: Regex =
        Regex::new(r"(?i)\b(?:frameless|thumbnail|thumb)\|\d+(?:x\d+)?px\b\|?").unwrap();

    /// Image caption directives left in front of a `|` separator
    static ref RE_CAPTION_DIRECTIVE: Regex = Regex::new(
        r"(?i)\b(?:thumbnail|thumb|frameless|frame|border|left|right|centre|center|none|baseline|upright(?:=[^|]*)?|alt=[^|]*|link=[^|]*|lang=[^|]*|\d+(?:x\d+)?px)\s*\|"
    )
    .unwrap();

    /// Numeric citation markers, e.g. `[12]`
    static ref RE_CITATION: Regex = Regex::new(r"\[\d+\]").unwrap();

    /// Parentheses left empty or holding only `;` and `,`
    static ref RE_EMPTY_PARENS: Regex = Regex::new(r"\(\s*(?:[;,]\s*)*\)").unwrap();
}

/// Stage 2: residual tag sweep.
#[derive(Debug, Clone, Copy, Default)]
pub struct SweepResidualTags;

impl Stage for SweepResidualTags {
    fn name(&self) -> &'static str {
        "sweep-residual-tags"
    }

    fn apply(&self, text: &str) -> String {
        let text = RE_TAG.replace_all(text, "");
        let text = RE_STRAY_LINK.replace_all(&text, "");
        RE_STRAY_TEMPLATE.replace_all(&text, "").into_owned()
    }
}

/// Stage 3: leftover construct sweep.
///
/// Citations are removed before parentheses so `([3])` collapses fully.
#[derive(Debug, Clone, Copy, Default)]
pub struct SweepLeftovers;

impl Stage for SweepLeftovers {
    fn name(&self) -> &'static str {
        "sweep-leftovers"
    }

    fn apply(&self, text: &str) -> String {
        let text = RE_SIZED_MODE.replace_all(text, "");
        let text = RE_CAPTION_DIRECTIVE.replace_all(&text, "");
        let text = RE_CITATION.replace_all(&text, "");
        RE_EMPTY_PARENS.replace_all(&text, "").into_owned()
    }
}

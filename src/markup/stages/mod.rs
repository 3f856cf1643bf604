//! Individual normalization stages.

mod strip;
mod sweep;
mod whitespace;

pub use strip::{strip_markup, StripMarkup};
pub use sweep::{SweepLeftovers, SweepResidualTags};
pub use whitespace::{CollapseWhitespace, FilterCharacters, Truncate};

/// A pure text-to-text transformation.
///
/// Stages run in a fixed order; each one may assume the artifacts removed by
/// earlier stages are gone.
pub trait Stage: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Transform `text`. Must never fail.
    fn apply(&self, text: &str) -> String;
}

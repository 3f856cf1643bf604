//! Wikitext to plain text normalization.
//!
//! Raw markup passes through an ordered list of stages:
//!
//! 1. [`StripMarkup`] - links, templates, formatting, tables, references
//! 2. [`SweepResidualTags`] - any tags or link/template syntax left over
//! 3. [`SweepLeftovers`] - caption directives, citation markers, empty parentheses
//! 4. [`FilterCharacters`] - only when a character whitelist is configured
//! 5. [`CollapseWhitespace`] - single spaces, trimmed
//! 6. [`Truncate`] - hard character cap
//!
//! Normalization never fails; pathological input degrades to an empty string,
//! which the filter then rejects on length.

pub mod stages;

use crate::config::ExtractionConfig;

pub use stages::{
    strip_markup, CollapseWhitespace, FilterCharacters, Stage, StripMarkup, SweepLeftovers,
    SweepResidualTags, Truncate,
};

/// Ordered pipeline of [`Stage`]s.
pub struct Normalizer {
    stages: Vec<Box<dyn Stage>>,
}

impl Normalizer {
    /// Build the standard pipeline for a configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        let mut stages: Vec<Box<dyn Stage>> = vec![
            Box::new(StripMarkup),
            Box::new(SweepResidualTags),
            Box::new(SweepLeftovers),
        ];
        if let Some(whitelist) = &config.character_whitelist {
            stages.push(Box::new(FilterCharacters::new(whitelist.clone())));
        }
        stages.push(Box::new(CollapseWhitespace));
        stages.push(Box::new(Truncate::new(config.content_length_cap)));
        Self { stages }
    }

    /// Stage names in execution order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run every stage over `raw`.
    pub fn normalize(&self, raw: &str) -> String {
        let mut text = raw.to_string();
        for stage in &self.stages {
            text = stage.apply(&text);
        }
        text
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }
}

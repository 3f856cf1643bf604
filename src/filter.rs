//! Semantic gate deciding which pages become articles.
//!
//! Rules run in order and stop at the first failure:
//! 1. namespace must be the main article namespace
//! 2. title must not start with an excluded prefix
//! 3. body must be present and non-empty
//! 4. normalized content must reach the minimum length

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::config::ExtractionConfig;
use crate::dump::RawRecord;
use crate::markup::Normalizer;
use crate::sink::CleanArticle;

/// Why a record was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Title element missing or empty
    MissingTitle,
    /// Namespace other than the main one (or unparseable)
    WrongNamespace,
    /// Title begins with a configured excluded prefix
    ExcludedTitlePrefix,
    /// No body text, or an empty one
    EmptyBody,
    /// Normalized content shorter than the minimum
    TooShort,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingTitle => "missing_title",
            Self::WrongNamespace => "wrong_namespace",
            Self::ExcludedTitlePrefix => "excluded_title_prefix",
            Self::EmptyBody => "empty_body",
            Self::TooShort => "too_short",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of filtering one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterDecision {
    Accept(CleanArticle),
    Reject(RejectReason),
}

impl FilterDecision {
    pub fn is_accept(&self) -> bool {
        matches!(self, Self::Accept(_))
    }
}

/// Filter plus normalizer, configured once per run.
pub struct RecordFilter {
    main_namespace_id: i64,
    excluded_title_prefixes: Vec<String>,
    min_content_length: usize,
    normalizer: Normalizer,
}

impl RecordFilter {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self::with_normalizer(config, Normalizer::from_config(config))
    }

    pub fn with_normalizer(config: &ExtractionConfig, normalizer: Normalizer) -> Self {
        Self {
            main_namespace_id: config.main_namespace_id,
            excluded_title_prefixes: config.excluded_title_prefixes.clone(),
            min_content_length: config.min_content_length,
            normalizer,
        }
    }

    /// Rules 1–3, evaluated on the raw fields before any normalization.
    pub fn check_raw(&self, record: &RawRecord) -> Result<(), RejectReason> {
        if record.namespace_id != Some(self.main_namespace_id) {
            return Err(RejectReason::WrongNamespace);
        }
        let title = match record.title.as_deref() {
            Some(title) if !title.trim().is_empty() => title,
            _ => return Err(RejectReason::MissingTitle),
        };
        if self
            .excluded_title_prefixes
            .iter()
            .any(|prefix| title.starts_with(prefix.as_str()))
        {
            return Err(RejectReason::ExcludedTitlePrefix);
        }
        match record.body_text.as_deref() {
            Some(body) if !body.is_empty() => Ok(()),
            _ => Err(RejectReason::EmptyBody),
        }
    }

    /// Apply every rule, normalizing the body in between rules 3 and 4.
    pub fn evaluate(&self, record: RawRecord) -> FilterDecision {
        if let Err(reason) = self.check_raw(&record) {
            return FilterDecision::Reject(reason);
        }
        let (Some(title), Some(body)) = (record.title, record.body_text) else {
            return FilterDecision::Reject(RejectReason::EmptyBody);
        };

        let content = self.normalizer.normalize(&body);
        if content.chars().count() < self.min_content_length {
            return FilterDecision::Reject(RejectReason::TooShort);
        }
        FilterDecision::Accept(CleanArticle { title, content })
    }
}

/// Per-reason rejection counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RejectionCounts(BTreeMap<RejectReason, u64>);

impl RejectionCounts {
    pub fn record(&mut self, reason: RejectReason) {
        *self.0.entry(reason).or_insert(0) += 1;
    }

    pub fn get(&self, reason: RejectReason) -> u64 {
        self.0.get(&reason).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RejectReason, u64)> + '_ {
        self.0.iter().map(|(reason, count)| (*reason, *count))
    }
}

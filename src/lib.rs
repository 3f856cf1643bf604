//! wikiextract - stream article text out of MediaWiki XML dumps
//!
//! The library reads a (usually bzip2-compressed) dump one structural event
//! at a time, assembles `page` records, filters them to main-namespace
//! articles, reduces wikitext markup to plain text and hands each accepted
//! article to a sink until a configured number have been collected.
//!
//! Stages, in pull order:
//! - [`dump::archive`] - decompression
//! - [`dump::events`] - structural XML events
//! - [`dump::assembler`] - page records
//! - [`filter`] and [`markup`] - acceptance rules and normalization
//! - [`collector`] and [`sink`] - bounded output
//!
//! [`pipeline::Extractor`] wires them together.

pub mod collector;
pub mod config;
pub mod dump;
pub mod error;
pub mod filter;
pub mod markup;
pub mod pipeline;
pub mod sink;

pub use config::{CharacterWhitelist, ExtractionConfig, Preset};
pub use error::{ExtractError, ExtractResult};
pub use filter::{FilterDecision, RecordFilter, RejectReason, RejectionCounts};
pub use markup::Normalizer;
pub use pipeline::{ExtractionStats, Extractor, InputFormat};
pub use sink::{ArticleSink, CleanArticle, JsonlSink};

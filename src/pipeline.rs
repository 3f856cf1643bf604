//! Pull-based extraction driver.
//!
//! One loop owns every stage. The collector's demand is checked before each
//! event is pulled, so once capacity is reached no further input is read.
//! The sink is flushed before any result (success or error) is returned.

use std::ffi::OsStr;
use std::io::{BufRead, Read};
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::collector::{BoundedCollector, Demand};
use crate::config::ExtractionConfig;
use crate::dump::{self, EventReader, EventSource, RecordAssembler};
use crate::error::ExtractResult;
use crate::filter::{FilterDecision, RecordFilter, RejectionCounts};
use crate::markup::Normalizer;
use crate::sink::ArticleSink;

/// How the input file is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// bzip2, single or multi-stream
    Bzip2,
    /// Uncompressed XML
    PlainXml,
}

impl InputFormat {
    /// Guess from the file extension: `.bz2` is compressed, anything else plain.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(OsStr::to_str) {
            Some(ext) if ext.eq_ignore_ascii_case("bz2") => Self::Bzip2,
            _ => Self::PlainXml,
        }
    }
}

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionStats {
    /// Completed page records, accepted or not
    pub pages_seen: u64,
    /// Articles handed to the sink
    pub accepted: u64,
    pub rejected: RejectionCounts,
    /// Run ended because `max_articles` was reached
    pub stopped_early: bool,
    /// Decompressed bytes consumed by the parser
    pub bytes_read: u64,
}

/// Per-run state: the event source, the record in progress, and the collector.
struct PipelineState<E: EventSource, S: ArticleSink> {
    events: E,
    assembler: RecordAssembler,
    collector: BoundedCollector<S>,
    stats: ExtractionStats,
    stopped: bool,
}

impl<E: EventSource, S: ArticleSink> PipelineState<E, S> {
    fn new(events: E, collector: BoundedCollector<S>) -> Self {
        Self {
            events,
            assembler: RecordAssembler::new(),
            collector,
            stats: ExtractionStats::default(),
            stopped: false,
        }
    }

    fn run(&mut self, filter: &RecordFilter) -> ExtractResult<()> {
        while !self.stopped {
            if self.collector.is_full() {
                self.stop();
                break;
            }

            let Some(event) = self.events.next_event()? else {
                break;
            };
            let position = self.events.position();
            let Some(record) = self.assembler.feed(event, position)? else {
                continue;
            };
            self.events.release_record_buffers();
            self.stats.pages_seen += 1;

            match filter.evaluate(record) {
                FilterDecision::Accept(article) => {
                    debug!("Extracted: {}", article.title);
                    let demand = self.collector.offer(article)?;
                    self.stats.accepted += 1;
                    if demand == Demand::Full {
                        self.stop();
                    }
                }
                FilterDecision::Reject(reason) => {
                    trace!("Rejected page {}: {}", self.stats.pages_seen, reason);
                    self.stats.rejected.record(reason);
                }
            }
        }
        Ok(())
    }

    fn stop(&mut self) {
        self.stopped = true;
        self.stats.stopped_early = true;
    }

    /// Flush the sink, then report. A run error takes precedence over a flush error.
    fn finish(mut self, outcome: ExtractResult<()>) -> ExtractResult<ExtractionStats> {
        let flushed = self.collector.flush();
        self.stats.bytes_read = self.events.position();

        if let Err(e) = outcome {
            if self.assembler.in_record() {
                debug!(
                    "Discarding partial page after {} complete pages",
                    self.assembler.completed()
                );
            }
            if let Err(flush_err) = flushed {
                warn!("Failed to flush output after error: {}", flush_err);
            }
            warn!(
                "Extraction aborted after {} pages ({} articles kept): {}",
                self.stats.pages_seen, self.stats.accepted, e
            );
            return Err(e);
        }
        if let Err(e) = flushed {
            warn!("Failed to flush output: {}", e);
            return Err(e);
        }

        info!(
            "Saved {} articles ({} pages read, {} rejected)",
            self.stats.accepted,
            self.stats.pages_seen,
            self.stats.rejected.total()
        );
        Ok(self.stats)
    }
}

/// Configured extraction run.
///
/// ```no_run
/// use wikiextract::{ExtractionConfig, Extractor, JsonlSink};
///
/// let extractor = Extractor::new(ExtractionConfig::default())?;
/// let archive = std::fs::File::open("thwiki-latest-pages-articles.xml.bz2")?;
/// let mut sink = JsonlSink::create("data/articles.jsonl".as_ref())?;
/// let stats = extractor.extract_archive(archive, &mut sink)?;
/// println!("{} articles", stats.accepted);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Extractor {
    config: ExtractionConfig,
    filter: RecordFilter,
}

impl Extractor {
    /// Validate `config` and build the filter and normalizer for it.
    pub fn new(config: ExtractionConfig) -> ExtractResult<Self> {
        config.validate()?;
        let normalizer = Normalizer::from_config(&config);
        debug!("Normalizer stages: {}", normalizer.stage_names().join(" -> "));
        let filter = RecordFilter::with_normalizer(&config, normalizer);
        Ok(Self { config, filter })
    }

    /// Run over any structural event source.
    pub fn extract_events<E, S>(&self, events: E, sink: S) -> ExtractResult<ExtractionStats>
    where
        E: EventSource,
        S: ArticleSink,
    {
        let collector = BoundedCollector::new(sink, self.config.max_articles);
        let mut state = PipelineState::new(events, collector);
        let outcome = state.run(&self.filter);
        state.finish(outcome)
    }

    /// Run over uncompressed XML.
    pub fn extract_xml<R, S>(&self, source: R, sink: S) -> ExtractResult<ExtractionStats>
    where
        R: BufRead,
        S: ArticleSink,
    {
        self.extract_events(EventReader::new(source), sink)
    }

    /// Run over a bzip2-compressed byte source.
    pub fn extract_archive<R, S>(&self, source: R, sink: S) -> ExtractResult<ExtractionStats>
    where
        R: Read,
        S: ArticleSink,
    {
        self.extract_xml(dump::decompress(source, self.config.read_chunk_size), sink)
    }

    /// Open `path` and run over it.
    pub fn extract_file<S: ArticleSink>(
        &self,
        path: &Path,
        format: InputFormat,
        sink: S,
    ) -> ExtractResult<ExtractionStats> {
        debug!("Reading {} as {:?}", path.display(), format);
        match format {
            InputFormat::Bzip2 => {
                self.extract_xml(dump::open_archive(path, self.config.read_chunk_size)?, sink)
            }
            InputFormat::PlainXml => {
                self.extract_xml(dump::open_plain(path, self.config.read_chunk_size)?, sink)
            }
        }
    }
}

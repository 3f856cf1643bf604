//! Capacity-bounded forwarding of accepted articles to a sink.

use crate::error::{ExtractError, ExtractResult};
use crate::sink::{ArticleSink, CleanArticle};

/// Whether the driver should keep pulling input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Demand {
    More,
    Full,
}

/// Forwards articles to a sink until `capacity` have been accepted.
pub struct BoundedCollector<S: ArticleSink> {
    sink: S,
    capacity: usize,
    accepted: usize,
}

impl<S: ArticleSink> BoundedCollector<S> {
    pub fn new(sink: S, capacity: usize) -> Self {
        Self {
            sink,
            capacity,
            accepted: 0,
        }
    }

    pub fn accepted(&self) -> usize {
        self.accepted
    }

    pub fn is_full(&self) -> bool {
        self.accepted >= self.capacity
    }

    /// Hand one article to the sink.
    ///
    /// Offering to a full collector is a no-op that reports `Full`; the count
    /// never exceeds the capacity.
    pub fn offer(&mut self, article: CleanArticle) -> ExtractResult<Demand> {
        if self.is_full() {
            return Ok(Demand::Full);
        }
        self.sink.append(article).map_err(ExtractError::Sink)?;
        self.accepted += 1;
        Ok(if self.is_full() {
            Demand::Full
        } else {
            Demand::More
        })
    }

    /// Flush the sink.
    pub fn flush(&mut self) -> ExtractResult<()> {
        self.sink.flush().map_err(ExtractError::Sink)
    }
}

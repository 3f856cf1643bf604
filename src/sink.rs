//! Output records and the sinks that persist them.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

/// One accepted article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanArticle {
    pub title: String,
    pub content: String,
}

impl CleanArticle {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Serialize as a single JSON line (without the trailing newline).
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse a JSON line produced by [`CleanArticle::to_json`].
    pub fn from_json(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }
}

/// Append-only destination for accepted articles.
///
/// The pipeline calls `append` once per accepted article, in archive order,
/// and calls `flush` before it returns, including when it returns an error.
pub trait ArticleSink {
    /// Record one article. An error here ends the run.
    fn append(&mut self, article: CleanArticle) -> io::Result<()>;

    /// Make everything appended so far durable.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl ArticleSink for Vec<CleanArticle> {
    fn append(&mut self, article: CleanArticle) -> io::Result<()> {
        self.push(article);
        Ok(())
    }
}

impl<S: ArticleSink + ?Sized> ArticleSink for &mut S {
    fn append(&mut self, article: CleanArticle) -> io::Result<()> {
        (**self).append(article)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

/// Line-delimited JSON writer.
///
/// Writes are buffered; records become durable on [`ArticleSink::flush`].
pub struct JsonlSink<W: Write> {
    writer: BufWriter<W>,
    records: u64,
    bytes: u64,
}

impl<W: Write> JsonlSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            records: 0,
            bytes: 0,
        }
    }

    /// Number of records written.
    pub fn records(&self) -> u64 {
        self.records
    }

    /// Number of bytes written, newlines included.
    pub fn bytes_written(&self) -> u64 {
        self.bytes
    }

    /// Flush and return the inner writer.
    pub fn into_inner(self) -> io::Result<W> {
        self.writer.into_inner().map_err(|e| e.into_error())
    }
}

impl JsonlSink<File> {
    /// Create (or truncate) `path`, creating missing parent directories.
    pub fn create(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(Self::new(File::create(path)?))
    }
}

impl<W: Write> ArticleSink for JsonlSink<W> {
    fn append(&mut self, article: CleanArticle) -> io::Result<()> {
        let line = article.to_json()?;
        writeln!(self.writer, "{}", line)?;
        self.records += 1;
        self.bytes += line.len() as u64 + 1;
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()?;
        self.writer.get_mut().flush()
    }
}

//! Streaming structural events over an XML dump.
//!
//! Wraps a `quick_xml` pull reader and reduces its output to three event
//! kinds. Only the chain of currently open element names is kept, so memory
//! does not grow with the size of the dump.

use std::borrow::Cow;
use std::io::{self, BufRead};
use std::sync::Arc;

use quick_xml::events::Event;
use quick_xml::Reader;

use super::archive::corruption_from_io;
use crate::error::{ExtractError, ExtractResult};

/// Scratch capacity kept after a record is released. A single page body can
/// be several megabytes; anything above this is returned to the allocator.
const RETAINED_BUFFER_CAPACITY: usize = 64 * 1024;

/// One unit of streaming parse output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralEvent {
    /// An element was opened (local name, prefix stripped)
    Open(String),
    /// An element was closed
    Close(String),
    /// Unescaped character data inside the current element
    Text(String),
}

impl StructuralEvent {
    pub fn is_open(&self, name: &str) -> bool {
        matches!(self, Self::Open(n) if n == name)
    }
}

/// Lazy, finite, non-restartable sequence of [`StructuralEvent`]s.
///
/// Fails with `MalformedStructure` on unmatched close tags or a document that
/// ends while elements are still open. After the first error (or the end of
/// the document) the reader yields nothing more.
pub struct EventReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    open: Vec<String>,
    pending_close: Option<String>,
    finished: bool,
}

impl<R: BufRead> EventReader<R> {
    pub fn new(source: R) -> Self {
        let mut reader = Reader::from_reader(source);
        reader
            .trim_text(false)
            .expand_empty_elements(true)
            .check_end_names(false);

        Self {
            reader,
            buf: Vec::new(),
            open: Vec::new(),
            pending_close: None,
            finished: false,
        }
    }

    /// Number of currently open elements.
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Byte offset of the parser in the (decompressed) input.
    pub fn position(&self) -> u64 {
        self.reader.buffer_position() as u64
    }

    /// Drop scratch memory accumulated while reading the last record.
    pub fn release_record_buffers(&mut self) {
        self.buf.clear();
        self.buf.shrink_to(RETAINED_BUFFER_CAPACITY);
    }

    /// Pull the next event. `Ok(None)` marks the end of the document.
    pub fn next_event(&mut self) -> ExtractResult<Option<StructuralEvent>> {
        if let Some(name) = self.pending_close.take() {
            self.open.pop();
            return Ok(Some(StructuralEvent::Close(name)));
        }

        loop {
            if self.finished {
                return Ok(None);
            }

            self.buf.clear();
            let position = self.reader.buffer_position() as u64;
            let event = match self.reader.read_event_into(&mut self.buf) {
                Ok(event) => event,
                Err(e) => {
                    self.finished = true;
                    return Err(convert_error(e, position));
                }
            };

            let result = match event {
                Event::Start(e) => {
                    let name = decode_name(e.local_name().as_ref(), position)?;
                    self.open.push(name.clone());
                    StructuralEvent::Open(name)
                }
                Event::Empty(e) => {
                    let name = decode_name(e.local_name().as_ref(), position)?;
                    self.open.push(name.clone());
                    self.pending_close = Some(name.clone());
                    StructuralEvent::Open(name)
                }
                Event::End(e) => {
                    let name = decode_name(e.local_name().as_ref(), position)?;
                    match self.open.pop() {
                        Some(top) if top == name => StructuralEvent::Close(name),
                        Some(top) => {
                            self.finished = true;
                            return Err(ExtractError::malformed(
                                position,
                                format!("expected </{}>, found </{}>", top, name),
                            ));
                        }
                        None => {
                            self.finished = true;
                            return Err(ExtractError::malformed(
                                position,
                                format!("unmatched </{}>", name),
                            ));
                        }
                    }
                }
                Event::Text(e) => {
                    if self.open.is_empty() {
                        continue;
                    }
                    let text = e
                        .unescape()
                        .map_err(|err| ExtractError::malformed(position, err.to_string()))?;
                    if text.is_empty() {
                        continue;
                    }
                    StructuralEvent::Text(text.into_owned())
                }
                Event::CData(e) => {
                    if self.open.is_empty() {
                        continue;
                    }
                    let bytes = e.into_inner();
                    let text = decode_text(bytes, position)?;
                    StructuralEvent::Text(text)
                }
                Event::Eof => {
                    self.finished = true;
                    if let Some(top) = self.open.last() {
                        return Err(ExtractError::malformed(
                            position,
                            format!("document ended inside <{}>", top),
                        ));
                    }
                    return Ok(None);
                }
                Event::Decl(_) | Event::PI(_) | Event::Comment(_) | Event::DocType(_) => continue,
            };

            return Ok(Some(result));
        }
    }
}

/// Anything that can feed structural events to the pipeline.
pub trait EventSource {
    /// Pull the next event; `Ok(None)` ends the stream.
    fn next_event(&mut self) -> ExtractResult<Option<StructuralEvent>>;

    /// Byte offset used in error reports.
    fn position(&self) -> u64 {
        0
    }

    /// Called after each completed record.
    fn release_record_buffers(&mut self) {}
}

impl<R: BufRead> EventSource for EventReader<R> {
    fn next_event(&mut self) -> ExtractResult<Option<StructuralEvent>> {
        EventReader::next_event(self)
    }

    fn position(&self) -> u64 {
        EventReader::position(self)
    }

    fn release_record_buffers(&mut self) {
        EventReader::release_record_buffers(self)
    }
}

impl<R: BufRead> Iterator for EventReader<R> {
    type Item = ExtractResult<StructuralEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event().transpose()
    }
}

fn decode_name(raw: &[u8], position: u64) -> ExtractResult<String> {
    std::str::from_utf8(raw)
        .map(str::to_owned)
        .map_err(|e| ExtractError::malformed(position, format!("invalid element name: {}", e)))
}

fn decode_text(raw: Cow<'_, [u8]>, position: u64) -> ExtractResult<String> {
    String::from_utf8(raw.into_owned())
        .map_err(|e| ExtractError::malformed(position, format!("invalid UTF-8 text: {}", e)))
}

fn convert_error(err: quick_xml::Error, position: u64) -> ExtractError {
    match err {
        quick_xml::Error::Io(shared) => corruption_from_io(&shared).unwrap_or_else(|| {
            let inner = Arc::try_unwrap(shared)
                .unwrap_or_else(|shared| io::Error::new(shared.kind(), shared.to_string()));
            ExtractError::Io(inner)
        }),
        other => ExtractError::malformed(position, other.to_string()),
    }
}

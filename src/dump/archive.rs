//! Decompression stream over a bzip2 dump archive.
//!
//! The archive is consumed strictly forward. Read failures from the decoder
//! are tagged so the event reader can report them as corruption instead of
//! a plain I/O error.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use bzip2::read::MultiBzDecoder;

use crate::error::{ExtractError, ExtractResult};

/// Marker payload carried inside `io::Error`s raised by the decoder.
#[derive(Debug)]
pub struct ArchiveCorruption(String);

impl fmt::Display for ArchiveCorruption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ArchiveCorruption {}

/// If `err` was raised by an [`ArchiveStream`], convert it to `CorruptArchive`.
pub fn corruption_from_io(err: &io::Error) -> Option<ExtractError> {
    err.get_ref()
        .and_then(|inner| inner.downcast_ref::<ArchiveCorruption>())
        .map(|c| ExtractError::CorruptArchive {
            message: c.0.clone(),
        })
}

/// Decompressing reader over a bzip2 byte source.
///
/// Handles both single-stream and multi-stream archives. The underlying
/// source is owned and closed when the stream is dropped, whether or not it
/// was read to the end.
pub struct ArchiveStream<R: Read> {
    decoder: MultiBzDecoder<R>,
    decompressed: u64,
}

impl<R: Read> ArchiveStream<R> {
    pub fn new(source: R) -> Self {
        Self {
            decoder: MultiBzDecoder::new(source),
            decompressed: 0,
        }
    }

    /// Total decompressed bytes produced so far.
    pub fn decompressed_bytes(&self) -> u64 {
        self.decompressed
    }
}

impl<R: Read> Read for ArchiveStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.decoder.read(buf) {
            Ok(n) => {
                self.decompressed += n as u64;
                Ok(n)
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Err(e),
            Err(e) => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                ArchiveCorruption(format!(
                    "{} (after {} decompressed bytes)",
                    e, self.decompressed
                )),
            )),
        }
    }
}

/// Wrap a compressed source in a buffered decompression stream.
///
/// `chunk_size` is the read granularity of the decompressed side.
pub fn decompress<R: Read>(source: R, chunk_size: usize) -> BufReader<ArchiveStream<R>> {
    BufReader::with_capacity(chunk_size, ArchiveStream::new(source))
}

/// Open a `.bz2` dump from disk.
pub fn open_archive(path: &Path, chunk_size: usize) -> ExtractResult<BufReader<ArchiveStream<File>>> {
    let file = File::open(path)?;
    Ok(decompress(file, chunk_size))
}

/// Open an uncompressed XML dump from disk.
pub fn open_plain(path: &Path, chunk_size: usize) -> ExtractResult<BufReader<File>> {
    let file = File::open(path)?;
    Ok(BufReader::with_capacity(chunk_size, file))
}

//! Reading MediaWiki XML dumps.
//!
//! - [`archive`] - bzip2 decompression stream
//! - [`events`] - streaming structural events over the XML
//! - [`assembler`] - page record assembly

pub mod archive;
pub mod assembler;
pub mod events;

pub use archive::{decompress, open_archive, open_plain, ArchiveStream};
pub use assembler::{RawRecord, RecordAssembler};
pub use events::{EventReader, EventSource, StructuralEvent};

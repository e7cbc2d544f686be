//! Resumable chunked reads of objects stored in AIStore.
//!
//! # Architecture
//!
//! The crate follows the three-layer pattern:
//! - [`data`] - Immutable attributes and request options
//! - `core` - Pure helpers: range arithmetic, resume backoff, chunk buffering
//! - [`effects`] - I/O behind the [`ObjectClient`] trait
//!
//! On top of a client bound to one object sit, bottom-up:
//!
//! - [`ChunkSource`]: one ranged GET re-framed into fixed-size chunks
//! - [`ContentIterator`]: opens a fresh [`ChunkSource`] at any offset
//! - [`ObjectFile`]: a forward-only file handle that reopens the stream at the
//!   last delivered byte when the connection drops
//! - [`ObjectReader`]: the facade offering attributes, full reads, raw streams
//!   and resumable files over the same object

mod config;
mod core;
pub mod data;
pub mod effects;
mod error;

pub use crate::core::{ChunkBuffer, RangeSpec, object_url, retry_delay};
pub use config::Config;
pub use data::{
    ArchiveConfig, ArchiveMode, BlobDownloadConfig, ByteRange, GetOptions, Headers,
    ObjectAttributes, ObjectProps, ReaderOptions,
};
pub use effects::{
    BoxStream, ChunkSource, ContentIterator, ObjectClient, ObjectFile, ObjectReader,
    ObjectResponse, ObjectStream,
};

#[cfg(feature = "reqwest")]
pub use effects::HttpObjectClient;

pub use error::{Error, Result};

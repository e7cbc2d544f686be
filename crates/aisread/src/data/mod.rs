//! Immutable data types: object attributes and request options.

mod attributes;
mod options;

pub use attributes::{Headers, ObjectAttributes, ObjectProps, header};
pub use options::{
    ArchiveConfig, ArchiveMode, BlobDownloadConfig, ByteRange, GetOptions, ReaderOptions,
};

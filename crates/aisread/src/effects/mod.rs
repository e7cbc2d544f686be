//! I/O against the object store.
//!
//! Everything that touches the network lives here, behind the
//! [`ObjectClient`] trait so the reading logic can be driven by a scripted
//! client in tests.

mod client;
mod content;
mod file;
mod reader;

pub use client::{BoxStream, ObjectClient, ObjectResponse};
pub use content::{ChunkSource, ContentIterator};
pub use file::{ObjectFile, ObjectStream};
pub use reader::ObjectReader;

#[cfg(feature = "reqwest")]
pub use client::HttpObjectClient;

//! Pure transformations used by the reading layers.
//!
//! Nothing in here performs I/O.

mod buffer;
mod path;
mod range;
mod retry;

pub use buffer::ChunkBuffer;
pub use path::object_url;
pub use range::RangeSpec;
pub use retry::retry_delay;

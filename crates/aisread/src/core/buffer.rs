use bytes::{Bytes, BytesMut};

/// FIFO of fetched-but-undelivered object bytes.
///
/// Chunks are appended at the back and consumed from the front. Consumed
/// bytes are released immediately rather than kept behind a read cursor.
#[derive(Debug, Default)]
pub struct ChunkBuffer {
    inner: BytesMut,
}

impl ChunkBuffer {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.inner.len() }

    pub fn is_empty(&self) -> bool { self.inner.is_empty() }

    pub fn push(&mut self, chunk: &[u8]) { self.inner.extend_from_slice(chunk); }

    /// Remove and return up to `n` bytes from the front.
    pub fn take(&mut self, n: usize) -> Bytes {
        let n = n.min(self.inner.len());
        self.inner.split_to(n).freeze()
    }

    /// Remove and return everything buffered.
    pub fn take_all(&mut self) -> Bytes { self.inner.split().freeze() }

    pub fn clear(&mut self) { self.inner.clear(); }
}

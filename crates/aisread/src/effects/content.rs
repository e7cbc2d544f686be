use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use tracing::debug;

use super::client::{BoxStream, ObjectClient};
use crate::error::Result;

/// Factory of chunk sources for one object.
///
/// Restarting means opening a fresh GET at a new offset; a source is never
/// rewound.
pub struct ContentIterator<C> {
    client:     Arc<C>,
    chunk_size: usize,
}

impl<C> Clone for ContentIterator<C> {
    fn clone(&self) -> Self {
        Self {
            client:     Arc::clone(&self.client),
            chunk_size: self.chunk_size,
        }
    }
}

impl<C: ObjectClient> ContentIterator<C> {
    /// A zero `chunk_size` is treated as 1.
    pub fn new(client: Arc<C>, chunk_size: usize) -> Self {
        Self {
            client,
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn chunk_size(&self) -> usize { self.chunk_size }

    /// Chunks of the object starting at byte `start`.
    ///
    /// No request is made until the first chunk is pulled.
    pub fn iter_from(&self, start: u64) -> ChunkSource<C> {
        ChunkSource {
            client:     Arc::clone(&self.client),
            start,
            chunk_size: self.chunk_size,
            state:      SourceState::Pending,
            pending:    BytesMut::new(),
        }
    }
}

enum SourceState {
    Pending,
    Open(BoxStream<'static, Result<Bytes>>),
    Done,
}

/// One GET response body re-framed into `chunk_size` pieces.
///
/// Every chunk is exactly `chunk_size` bytes except possibly the last,
/// whatever framing the transport delivers. Failures are handed back as-is;
/// after one the source is finished. Dropping the source closes the body.
pub struct ChunkSource<C> {
    client:     Arc<C>,
    start:      u64,
    chunk_size: usize,
    state:      SourceState,
    pending:    BytesMut,
}

impl<C: ObjectClient> ChunkSource<C> {
    pub fn start(&self) -> u64 { self.start }

    /// Next chunk, `None` once the body is exhausted.
    pub async fn next_chunk(&mut self) -> Option<Result<Bytes>> {
        loop {
            match &mut self.state {
                SourceState::Pending => {
                    debug!(start = self.start, "opening object stream");
                    match self.client.get(self.start).await {
                        Ok(response) => self.state = SourceState::Open(response.body),
                        Err(e) => {
                            self.state = SourceState::Done;
                            return Some(Err(e));
                        }
                    }
                }
                SourceState::Open(body) => {
                    if self.pending.len() >= self.chunk_size {
                        return Some(Ok(self.pending.split_to(self.chunk_size).freeze()));
                    }
                    match body.next().await {
                        Some(Ok(bytes)) => self.pending.extend_from_slice(&bytes),
                        Some(Err(e)) => {
                            self.state = SourceState::Done;
                            self.pending.clear();
                            return Some(Err(e));
                        }
                        None => self.state = SourceState::Done,
                    }
                }
                SourceState::Done => {
                    if self.pending.is_empty() {
                        return None;
                    }
                    let n = self.pending.len().min(self.chunk_size);
                    return Some(Ok(self.pending.split_to(n).freeze()));
                }
            }
        }
    }

    /// Adapt into a `Stream` for consumers that want plain iteration.
    pub fn into_stream(self) -> BoxStream<'static, Result<Bytes>>
    where
        C: 'static,
    {
        Box::pin(futures_util::stream::unfold(self, |mut source| async move {
            source.next_chunk().await.map(|chunk| (chunk, source))
        }))
    }
}

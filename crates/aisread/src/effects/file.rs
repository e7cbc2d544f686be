use std::future::Future;
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, error, warn};

use super::client::ObjectClient;
use super::content::{ChunkSource, ContentIterator};
use crate::core::{ChunkBuffer, retry_delay};
use crate::error::{Error, Result};

/// Capabilities of a forward-only, file-like object handle.
pub trait ObjectStream {
    /// True until the handle is closed.
    fn readable(&self) -> bool;

    /// Object handles never support seeking.
    fn seekable(&self) -> bool { false }

    /// Number of bytes handed to the caller so far.
    fn tell(&self) -> Result<u64>;

    /// Release the underlying stream. Closing twice is an error.
    fn close(&mut self) -> Result<()>;

    /// Read up to `size` bytes, or everything left when `size` is `None`.
    fn read(&mut self, size: Option<usize>) -> impl Future<Output = Result<Bytes>> + Send;
}

enum FileState<C> {
    /// No stream open; the next fill opens one at `position`.
    Uninitialized,
    Streaming(ChunkSource<C>),
    Exhausted,
    /// Resume budget spent; reads keep failing until close.
    Failed { attempts: u32, last_error: String },
    Closed,
}

/// A file-like reader that survives dropped connections.
///
/// Chunks are pulled into a FIFO buffer and handed out by [`ObjectStream::read`].
/// When the stream breaks with a retryable error the broken source and any
/// undelivered buffered bytes are dropped, and a new GET is opened at the
/// current position, so bytes are never skipped or delivered twice. Reopens are
/// counted over the lifetime of the file and capped at `max_resume`.
///
/// A short read only ever means the object has ended.
pub struct ObjectFile<C> {
    content:        ContentIterator<C>,
    state:          FileState<C>,
    buffer:         ChunkBuffer,
    position:       u64,
    resume_count:   u32,
    max_resume:     u32,
    resume_backoff: Duration,
}

impl<C: ObjectClient> ObjectFile<C> {
    pub fn new(content: ContentIterator<C>, max_resume: u32) -> Self {
        Self {
            content,
            state: FileState::Uninitialized,
            buffer: ChunkBuffer::new(),
            position: 0,
            resume_count: 0,
            max_resume,
            resume_backoff: Duration::ZERO,
        }
    }

    /// Wait `retry_delay(attempt, backoff)` before each reopen.
    pub fn with_resume_backoff(mut self, backoff: Duration) -> Self {
        self.resume_backoff = backoff;
        self
    }

    pub fn resume_count(&self) -> u32 { self.resume_count }

    pub fn max_resume(&self) -> u32 { self.max_resume }

    pub fn is_closed(&self) -> bool { matches!(self.state, FileState::Closed) }

    /// Pull chunks until `target` bytes are buffered or the object ends.
    async fn fill(&mut self, target: Option<usize>) -> Result<()> {
        loop {
            if let Some(n) = target
                && self.buffer.len() >= n
            {
                return Ok(());
            }

            match &self.state {
                FileState::Uninitialized => {
                    self.state = FileState::Streaming(self.content.iter_from(self.position));
                }
                FileState::Streaming(_) => {}
                FileState::Exhausted => return Ok(()),
                FileState::Failed { attempts, last_error } => {
                    return Err(Error::ResumeExhausted {
                        attempts:   *attempts,
                        last_error: last_error.clone(),
                    });
                }
                FileState::Closed => return Err(Error::Closed),
            }

            let FileState::Streaming(source) = &mut self.state else {
                continue;
            };

            match source.next_chunk().await {
                Some(Ok(chunk)) => self.buffer.push(&chunk),
                None => {
                    debug!(position = self.position, "object stream exhausted");
                    self.state = FileState::Exhausted;
                }
                Some(Err(err)) if err.is_retryable() => self.resume(err).await?,
                Some(Err(err)) => {
                    self.state = FileState::Uninitialized;
                    self.buffer.clear();
                    return Err(err);
                }
            }
        }
    }

    /// Replace a broken stream with a fresh one at `position`, or give up.
    async fn resume(&mut self, err: Error) -> Result<()> {
        self.state = FileState::Uninitialized;
        self.buffer.clear();

        if self.resume_count >= self.max_resume {
            error!(
                position = self.position,
                attempts = self.resume_count,
                error = %err,
                "max resume attempts reached, cannot resume read"
            );
            let last_error = err.to_string();
            self.state = FileState::Failed {
                attempts:   self.resume_count,
                last_error: last_error.clone(),
            };
            return Err(Error::ResumeExhausted {
                attempts: self.resume_count,
                last_error,
            });
        }

        self.resume_count += 1;
        warn!(
            position = self.position,
            error = %err,
            "object stream interrupted, resuming {}/{}",
            self.resume_count,
            self.max_resume
        );

        let delay = retry_delay(self.resume_count - 1, self.resume_backoff);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.state = FileState::Streaming(self.content.iter_from(self.position));
        Ok(())
    }
}

impl<C: ObjectClient> ObjectStream for ObjectFile<C> {
    fn readable(&self) -> bool { !self.is_closed() }

    fn tell(&self) -> Result<u64> {
        if self.is_closed() {
            return Err(Error::Closed);
        }
        Ok(self.position)
    }

    fn close(&mut self) -> Result<()> {
        if self.is_closed() {
            return Err(Error::Closed);
        }
        debug!(position = self.position, "closing object file");
        self.buffer.clear();
        self.state = FileState::Closed;
        Ok(())
    }

    async fn read(&mut self, size: Option<usize>) -> Result<Bytes> {
        if self.is_closed() {
            return Err(Error::Closed);
        }
        if size == Some(0) {
            return Ok(Bytes::new());
        }

        self.fill(size).await?;

        let data = match size {
            Some(n) => self.buffer.take(n),
            None => self.buffer.take_all(),
        };
        self.position += data.len() as u64;
        Ok(data)
    }
}

use std::sync::Arc;

use aisread_verify::{Checksum, VerificationError};
use bytes::{Bytes, BytesMut};
use futures_util::TryStreamExt;
use tracing::debug;

use super::client::{BoxStream, ObjectClient};
use super::content::{ChunkSource, ContentIterator};
use super::file::ObjectFile;
use crate::data::{ObjectAttributes, ObjectProps, ReaderOptions};
use crate::error::Result;

const PARTIAL_CONTENT: u16 = 206;
const MAX_PREALLOC: u64 = 64 * 1024 * 1024;

/// Read access to one object: metadata plus several views of its content.
///
/// Attributes are fetched lazily with HEAD and memoized; any full GET made
/// through [`read_all`](Self::read_all) or [`raw`](Self::raw) replaces them
/// with what that response reported.
pub struct ObjectReader<C> {
    client:     Arc<C>,
    content:    ContentIterator<C>,
    options:    ReaderOptions,
    attributes: Option<ObjectAttributes>,
}

impl<C: ObjectClient> ObjectReader<C> {
    pub fn new(client: C, options: ReaderOptions) -> Result<Self> {
        options.validate()?;
        let client = Arc::new(client);
        Ok(Self {
            content: ContentIterator::new(Arc::clone(&client), options.chunk_size),
            client,
            options,
            attributes: None,
        })
    }

    pub fn options(&self) -> &ReaderOptions { &self.options }

    /// Issue a HEAD and replace the cached attributes.
    pub async fn head(&mut self) -> Result<&ObjectAttributes> {
        let headers = self.client.head().await?;
        Ok(&*self.attributes.insert(ObjectAttributes::from_headers(&headers)))
    }

    /// Issue a HEAD and return the full property set.
    pub async fn props(&mut self) -> Result<ObjectProps> {
        let headers = self.client.head().await?;
        let props = ObjectProps::from_headers(&headers);
        self.attributes = Some(props.attributes.clone());
        Ok(props)
    }

    /// Cached attributes, fetched with HEAD on first access.
    pub async fn attributes(&mut self) -> Result<&ObjectAttributes> {
        match self.attributes {
            Some(ref attributes) => Ok(attributes),
            None => self.head().await,
        }
    }

    /// Attributes from the last response, without touching the network.
    pub fn cached_attributes(&self) -> Option<&ObjectAttributes> { self.attributes.as_ref() }

    /// Fetch the whole object into memory with a single GET.
    ///
    /// Nothing is resumed here; use [`as_file`](Self::as_file) for large
    /// objects read over a long time. With `validate_checksum` set the content
    /// is hashed while it streams and compared with the reported checksum.
    pub async fn read_all(&mut self) -> Result<Bytes> {
        let response = self.client.get(0).await?;
        let attributes = ObjectAttributes::from_headers(&response.headers);
        let checksum = if self.options.validate_checksum && response.status != PARTIAL_CONTENT {
            checksum_to_validate(&attributes)?
        } else {
            None
        };
        let capacity = attributes.size.unwrap_or(0).min(MAX_PREALLOC) as usize;
        self.attributes = Some(attributes);

        let mut verifier = checksum.as_ref().map(Checksum::verifier);
        let mut content = BytesMut::with_capacity(capacity);
        let mut body = response.body;
        while let Some(bytes) = body.try_next().await? {
            if let Some(verifier) = verifier.as_mut() {
                verifier.update(&bytes);
            }
            content.extend_from_slice(&bytes);
        }

        if let Some(verifier) = verifier {
            verifier.finish()?;
        }
        Ok(content.freeze())
    }

    /// The live response body, without chunking or resume.
    pub async fn raw(&mut self) -> Result<BoxStream<'static, Result<Bytes>>> {
        let response = self.client.get(0).await?;
        self.attributes = Some(ObjectAttributes::from_headers(&response.headers));
        Ok(response.body)
    }

    /// Chunks starting at byte `start`.
    pub fn iter_from(&self, start: u64) -> ChunkSource<C> { self.content.iter_from(start) }

    /// All chunks of the object as a stream.
    pub fn chunks(&self) -> BoxStream<'static, Result<Bytes>>
    where
        C: 'static,
    {
        self.iter_from(0).into_stream()
    }

    /// A resumable file handle over the object.
    ///
    /// `max_resume` overrides the configured budget for this handle.
    pub fn as_file(&self, max_resume: Option<u32>) -> ObjectFile<C> {
        ObjectFile::new(
            self.content.clone(),
            max_resume.unwrap_or(self.options.max_resume),
        )
        .with_resume_backoff(self.options.resume_backoff)
    }
}

fn checksum_to_validate(attributes: &ObjectAttributes) -> Result<Option<Checksum>> {
    match attributes.checksum() {
        Ok(checksum) => Ok(checksum),
        Err(VerificationError::Unsupported(kind)) => {
            debug!(%kind, "skipping validation for unsupported checksum type");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

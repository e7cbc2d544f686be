use std::fmt;
use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;

use crate::data::Headers;
use crate::error::Result;

/// A boxed stream type for object response bodies.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// A GET response: status, headers and the still-unread body.
pub struct ObjectResponse {
    pub status:  u16,
    pub headers: Headers,
    pub body:    BoxStream<'static, Result<Bytes>>,
}

impl ObjectResponse {
    /// A response with no body, used when nothing is left to fetch.
    pub fn empty(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Box::pin(futures_util::stream::empty()),
        }
    }
}

impl fmt::Debug for ObjectResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body", &"{ ... }")
            .finish()
    }
}

/// Access to a single remote object.
///
/// Implementations own request plumbing: URL, query parameters, extra
/// headers, connection pooling and timeouts. Errors must be classified so
/// that connection-level failures map to [`Error::Transport`](crate::Error::Transport)
/// and a missing object maps to [`Error::NotFound`](crate::Error::NotFound);
/// the resume logic relies on that distinction.
pub trait ObjectClient: Send + Sync {
    /// Open a GET whose body starts at byte `start` of the object.
    ///
    /// The body must begin exactly at `start`: a server that ignores a range
    /// request has to be reported as an error, never passed through. Body
    /// failures surface as `Err` items in the returned stream.
    fn get(&self, start: u64) -> impl Future<Output = Result<ObjectResponse>> + Send;

    /// Fetch the object's metadata headers without its content.
    fn head(&self) -> impl Future<Output = Result<Headers>> + Send;
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use futures_util::TryStreamExt;
    use reqwest::StatusCode;
    use reqwest::header::{HeaderMap, RANGE};
    use tracing::debug;

    use super::*;
    use crate::core::{RangeSpec, object_url};
    use crate::data::{ByteRange, GetOptions};
    use crate::error::Error;

    const QPARAM_PROVIDER: &str = "provider";
    const QPARAM_LATEST: &str = "latest";
    const QPARAM_ARCHPATH: &str = "archpath";
    const QPARAM_ARCHREGX: &str = "archregx";
    const QPARAM_ARCHMODE: &str = "archmode";
    const QPARAM_ETL_NAME: &str = "etl_name";
    const HEADER_BLOB_DOWNLOAD: &str = "ais-blob-download";
    const HEADER_BLOB_CHUNK_SIZE: &str = "ais-blob-chunk";
    const HEADER_BLOB_WORKERS: &str = "ais-blob-workers";

    /// Production object client using `reqwest`.
    #[derive(Debug, Clone)]
    pub struct HttpObjectClient {
        client:  reqwest::Client,
        url:     String,
        params:  Vec<(String, String)>,
        headers: Vec<(String, String)>,
        window:  Option<ByteRange>,
    }

    impl HttpObjectClient {
        /// Bind a client to `bucket/object` under `endpoint`.
        ///
        /// Fails with [`Error::InvalidArgument`] when `options` conflict.
        pub fn new(
            client: reqwest::Client,
            endpoint: &str,
            provider: &str,
            bucket: &str,
            object: &str,
            options: &GetOptions,
        ) -> Result<Self> {
            options.validate()?;

            let mut params = vec![(QPARAM_PROVIDER.to_string(), provider.to_string())];
            if let Some(archive) = &options.archive {
                if let Some(archpath) = &archive.archpath {
                    params.push((QPARAM_ARCHPATH.to_string(), archpath.clone()));
                }
                if let Some(regex) = &archive.regex {
                    params.push((QPARAM_ARCHREGX.to_string(), regex.clone()));
                }
                if let Some(mode) = archive.mode {
                    params.push((QPARAM_ARCHMODE.to_string(), mode.to_string()));
                }
            }
            if let Some(etl_name) = &options.etl_name {
                params.push((QPARAM_ETL_NAME.to_string(), etl_name.clone()));
            }
            if options.latest {
                params.push((QPARAM_LATEST.to_string(), "true".to_string()));
            }

            let mut headers = options.headers.clone();
            if let Some(blob) = &options.blob_download {
                headers.push((HEADER_BLOB_DOWNLOAD.to_string(), "true".to_string()));
                if let Some(chunk_size) = &blob.chunk_size {
                    headers.push((HEADER_BLOB_CHUNK_SIZE.to_string(), chunk_size.clone()));
                }
                if let Some(workers) = &blob.num_workers {
                    headers.push((HEADER_BLOB_WORKERS.to_string(), workers.clone()));
                }
            }

            Ok(Self {
                client,
                url: object_url(endpoint, bucket, object),
                params,
                headers,
                window: options.byte_range,
            })
        }

        pub fn url(&self) -> &str { &self.url }
    }

    fn collect_headers(map: &HeaderMap) -> Headers {
        map.iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect()
    }

    impl ObjectClient for HttpObjectClient {
        async fn get(&self, start: u64) -> Result<ObjectResponse> {
            let range = RangeSpec::resolve(self.window.as_ref(), start);
            if range == RangeSpec::Empty {
                return Ok(ObjectResponse::empty(StatusCode::PARTIAL_CONTENT.as_u16()));
            }

            let mut request = self.client.get(&self.url).query(&self.params);
            for (key, value) in &self.headers {
                request = request.header(key, value);
            }
            let range_header = range.header_value();
            if let Some(value) = &range_header {
                request = request.header(RANGE, value);
            }

            let response = request.send().await?;
            let status = response.status();
            if status == StatusCode::RANGE_NOT_SATISFIABLE && start > 0 {
                debug!(url = %self.url, start, "range starts at end of object");
                return Ok(ObjectResponse::empty(status.as_u16()));
            }
            let response = response.error_for_status()?;

            // A full body here would replay bytes the caller already has.
            if let Some(value) = range_header
                && status != StatusCode::PARTIAL_CONTENT
            {
                return Err(Error::Http {
                    status:  status.as_u16(),
                    message: format!("range {value} not honoured by {}", self.url),
                });
            }

            Ok(ObjectResponse {
                status:  status.as_u16(),
                headers: collect_headers(response.headers()),
                body:    Box::pin(response.bytes_stream().map_err(Error::from)),
            })
        }

        async fn head(&self) -> Result<Headers> {
            let mut request = self.client.head(&self.url).query(&self.params);
            for (key, value) in &self.headers {
                request = request.header(key, value);
            }
            let response = request.send().await?.error_for_status()?;
            Ok(collect_headers(response.headers()))
        }
    }

}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::HttpObjectClient;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};

/// Client-side reading policy.
///
/// # Examples
///
/// ```
/// use aisread::ReaderOptions;
/// use std::time::Duration;
///
/// let options = ReaderOptions::default()
///     .chunk_size(64 * 1024)
///     .max_resume(10)
///     .resume_backoff(Duration::from_millis(50));
/// assert_eq!(options.max_resume, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Size of each chunk produced from a response body.
    ///
    /// Purely a buffering parameter, it has no effect on the wire.
    ///
    /// Default: 32 KiB
    pub chunk_size: usize,

    /// Maximum number of times an [`ObjectFile`](crate::ObjectFile) may reopen
    /// its stream over its whole lifetime.
    ///
    /// Default: 5
    pub max_resume: u32,

    /// Base delay before a resume; doubled on every further attempt.
    ///
    /// Default: zero (resume immediately)
    pub resume_backoff: Duration,

    /// Validate `read_all` content against the checksum the cluster reports.
    ///
    /// Default: false
    pub validate_checksum: bool,
}

impl ReaderOptions {
    pub const DEFAULT_CHUNK_SIZE: usize = 32 * 1024;
    pub const DEFAULT_MAX_RESUME: u32 = 5;

    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn max_resume(mut self, max_resume: u32) -> Self {
        self.max_resume = max_resume;
        self
    }

    pub fn resume_backoff(mut self, backoff: Duration) -> Self {
        self.resume_backoff = backoff;
        self
    }

    pub fn validate_checksum(mut self, validate: bool) -> Self {
        self.validate_checksum = validate;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::InvalidArgument("chunk size must be greater than zero".into()));
        }
        Ok(())
    }
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            chunk_size:        Self::DEFAULT_CHUNK_SIZE,
            max_resume:        Self::DEFAULT_MAX_RESUME,
            resume_backoff:    Duration::ZERO,
            validate_checksum: false,
        }
    }
}

/// A contiguous byte window of an object, end inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end:   Option<u64>,
}

impl ByteRange {
    pub fn new(start: u64, end: Option<u64>) -> Self { Self { start, end } }

    /// Number of bytes in the window, if bounded. An inverted window is empty.
    pub fn len(&self) -> Option<u64> {
        self.end
            .map(|end| end.checked_sub(self.start).map_or(0, |span| span.saturating_add(1)))
    }

    /// True when `end` precedes `start`.
    pub fn is_inverted(&self) -> bool { self.end.is_some_and(|end| end < self.start) }
}

impl FromStr for ByteRange {
    type Err = Error;

    /// Accepts `bytes=<start>-[<end>]` or the bare `<start>-[<end>]` form.
    /// Suffix ranges (`bytes=-500`) are not supported.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidArgument(format!("byte range {s:?}: {reason}"));
        let spec = s.trim();
        let spec = spec.strip_prefix("bytes=").unwrap_or(spec);
        let (start, end) = spec
            .split_once('-')
            .ok_or_else(|| invalid("expected <start>-<end>"))?;
        if start.trim().is_empty() {
            return Err(invalid("suffix ranges are not supported"));
        }
        let start: u64 = start.trim().parse().map_err(|_| invalid("bad start offset"))?;
        let end = match end.trim() {
            "" => None,
            end => Some(end.parse::<u64>().map_err(|_| invalid("bad end offset"))?),
        };
        if let Some(end) = end
            && end < start
        {
            return Err(invalid("end precedes start"));
        }
        Ok(Self { start, end })
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(f, "bytes={}-{}", self.start, end),
            None => write!(f, "bytes={}-", self.start),
        }
    }
}

/// Settings for the cluster-side blob downloader.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlobDownloadConfig {
    /// Chunk size in IEC/SI units or raw bytes, e.g. `"4mb"`, `"1MiB"`.
    pub chunk_size:  Option<String>,
    pub num_workers: Option<String>,
}

/// How an archive regex selects files inside a shard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveMode {
    Regexp,
    Prefix,
    Suffix,
    Substr,
    /// WebDataset key: every file sharing the sample's basename.
    WdsKey,
}

impl ArchiveMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArchiveMode::Regexp => "regexp",
            ArchiveMode::Prefix => "prefix",
            ArchiveMode::Suffix => "suffix",
            ArchiveMode::Substr => "substr",
            ArchiveMode::WdsKey => "wdskey",
        }
    }
}

impl FromStr for ArchiveMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "regexp" => Ok(ArchiveMode::Regexp),
            "prefix" => Ok(ArchiveMode::Prefix),
            "suffix" => Ok(ArchiveMode::Suffix),
            "substr" => Ok(ArchiveMode::Substr),
            "wdskey" => Ok(ArchiveMode::WdsKey),
            other => Err(Error::InvalidArgument(format!("unknown archive mode {other:?}"))),
        }
    }
}

impl fmt::Display for ArchiveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Read files out of an archive object (tar, tgz, zip, ...) instead of the
/// archive itself.
///
/// Either `archpath` names one file, or `regex` with `mode` selects several.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveConfig {
    pub archpath: Option<String>,
    pub regex:    Option<String>,
    pub mode:     Option<ArchiveMode>,
}

impl ArchiveConfig {
    /// Extract the single file at `archpath`.
    pub fn path(archpath: impl Into<String>) -> Self {
        Self {
            archpath: Some(archpath.into()),
            ..Self::default()
        }
    }

    /// Extract every file whose name matches `regex` under `mode`.
    pub fn matching(regex: impl Into<String>, mode: ArchiveMode) -> Self {
        Self {
            regex: Some(regex.into()),
            mode: Some(mode),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| Err(Error::InvalidArgument(reason.to_string()));
        match (&self.archpath, &self.regex, &self.mode) {
            (Some(_), Some(_), _) => invalid("cannot use both archive regex and archive path"),
            (_, None, Some(_)) => invalid("archive mode requires archive regex"),
            (_, Some(_), None) => invalid("archive regex requires archive mode"),
            _ => Ok(()),
        }
    }
}

/// Per-request options for fetching an object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetOptions {
    pub byte_range:    Option<ByteRange>,
    pub blob_download: Option<BlobDownloadConfig>,
    pub archive:       Option<ArchiveConfig>,
    /// Name of an ETL the cluster runs over the object before sending it.
    pub etl_name:      Option<String>,
    /// Fetch the latest version from the remote backend bucket.
    pub latest:        bool,
    pub headers:       Vec<(String, String)>,
}

impl GetOptions {
    pub fn byte_range(mut self, range: ByteRange) -> Self {
        self.byte_range = Some(range);
        self
    }

    pub fn blob_download(mut self, config: BlobDownloadConfig) -> Self {
        self.blob_download = Some(config);
        self
    }

    pub fn archive(mut self, config: ArchiveConfig) -> Self {
        self.archive = Some(config);
        self
    }

    pub fn etl(mut self, name: impl Into<String>) -> Self {
        self.etl_name = Some(name.into());
        self
    }

    /// True when the cluster sends something other than the stored bytes.
    pub fn transforms_content(&self) -> bool { self.archive.is_some() || self.etl_name.is_some() }

    pub fn latest(mut self, latest: bool) -> Self {
        self.latest = latest;
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Reject option combinations the cluster cannot serve.
    pub fn validate(&self) -> Result<()> {
        if self.byte_range.is_some() && self.blob_download.is_some() {
            return Err(Error::InvalidArgument(
                "cannot use byte range with blob download".into(),
            ));
        }
        if let Some(range) = &self.byte_range
            && range.is_inverted()
        {
            return Err(Error::InvalidArgument(format!("byte range {range} ends before it starts")));
        }
        if let Some(archive) = &self.archive {
            archive.validate()?;
        }
        if self.etl_name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(Error::InvalidArgument("ETL name must not be empty".into()));
        }
        Ok(())
    }
}

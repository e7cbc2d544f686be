use std::path::PathBuf;

use aisread::{
    ArchiveConfig, ArchiveMode, ByteRange, Config, GetOptions, ObjectAttributes, ObjectStream,
};
use aisread_verify::{VerificationError, Verifier};
use anyhow::{Context, Result};
use clap::Args;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

use super::ObjectArg;
use crate::tracker::DownloadProgress;

#[derive(Clone, Debug, Args)]
pub struct GetArg {
    #[command(flatten)]
    target: ObjectArg,

    /// Write to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Reconnect budget for the whole download
    #[arg(long, value_name = "N")]
    max_resume: Option<u32>,

    /// Read size in bytes
    #[arg(long, value_name = "N")]
    chunk_size: Option<usize>,

    /// Fetch only a byte window, e.g. bytes=0-1023
    #[arg(long, value_name = "RANGE")]
    pub(super) range: Option<ByteRange>,

    /// Extract one file from an archive object
    #[arg(long, value_name = "PATH", conflicts_with = "archregx")]
    archpath: Option<String>,

    /// Extract archive files whose names match, see --archmode
    #[arg(long, value_name = "PATTERN", requires = "archmode")]
    archregx: Option<String>,

    /// How --archregx matches: regexp, prefix, suffix, substr or wdskey
    #[arg(long, value_name = "MODE", requires = "archregx")]
    archmode: Option<ArchiveMode>,

    /// Run the object through this ETL on the cluster
    #[arg(long, value_name = "NAME")]
    etl: Option<String>,

    /// Fetch the latest version from the remote backend
    #[arg(long)]
    latest: bool,

    /// Check the content against the object's checksum
    #[arg(long, conflicts_with_all = ["range", "archpath", "archregx", "etl"])]
    validate: bool,
}

impl GetArg {
    pub(super) fn get_options(&self) -> GetOptions {
        let mut options = GetOptions::default().latest(self.latest);
        if let Some(range) = self.range {
            options = options.byte_range(range);
        }
        if self.archpath.is_some() || self.archregx.is_some() {
            options = options.archive(ArchiveConfig {
                archpath: self.archpath.clone(),
                regex:    self.archregx.clone(),
                mode:     self.archmode,
            });
        }
        if let Some(etl) = &self.etl {
            options = options.etl(etl.clone());
        }
        options
    }

    pub async fn run(self, config: &Config) -> Result<()> {
        let options = self.get_options();
        let mut reader_options = config.reader_options();
        if let Some(chunk_size) = self.chunk_size {
            reader_options = reader_options.chunk_size(chunk_size);
        }
        let read_size = reader_options.chunk_size;

        let mut reader = self.target.reader(config, &options, reader_options)?;
        let attributes = reader
            .attributes()
            .await
            .with_context(|| format!("HEAD {}", self.target))?
            .clone();

        let validate = self.validate
            || (config.validate_checksum && self.range.is_none() && !options.transforms_content());
        let mut verifier = if validate { verifier(&attributes)? } else { None };

        let mut out: Box<dyn AsyncWrite + Unpin + Send> = match &self.output {
            Some(path) => Box::new(
                tokio::fs::File::create(path)
                    .await
                    .with_context(|| format!("failed to create {}", path.display()))?,
            ),
            None => Box::new(tokio::io::stdout()),
        };

        // HEAD reports the stored object, not what an archive read or ETL returns.
        let progress = (!options.transforms_content())
            .then(|| expected_len(&attributes, self.range))
            .flatten()
            .map(|len| DownloadProgress::new("get", len));

        let mut file = reader.as_file(self.max_resume);
        let mut resumes = 0;
        let copied = loop {
            let data = match file.read(Some(read_size)).await {
                Ok(data) => data,
                Err(e) => {
                    if let Some(progress) = progress {
                        progress.abandon();
                    }
                    return Err(e).with_context(|| format!("GET {}", self.target));
                }
            };
            if file.resume_count() != resumes {
                resumes = file.resume_count();
                if let Some(progress) = &progress {
                    progress.resumed(resumes, file.max_resume());
                }
            }
            if data.is_empty() {
                break file.tell()?;
            }
            if let Some(verifier) = verifier.as_mut() {
                verifier.update(&data);
            }
            out.write_all(&data).await?;
            if let Some(progress) = &progress {
                progress.advance(data.len());
            }
        };
        out.flush().await?;
        file.close()?;

        if let Some(verifier) = verifier {
            verifier
                .finish()
                .with_context(|| format!("{} failed checksum validation", self.target))?;
        }
        if let Some(progress) = progress {
            progress.finish();
        }
        info!(object = %self.target, bytes = copied, resumes, "download complete");
        Ok(())
    }
}

fn verifier(attributes: &ObjectAttributes) -> Result<Option<Verifier>> {
    match attributes.checksum() {
        Ok(Some(checksum)) => Ok(Some(checksum.verifier())),
        Ok(None) => {
            warn!("object has no checksum, skipping validation");
            Ok(None)
        }
        Err(VerificationError::Unsupported(kind)) => {
            warn!(%kind, "unsupported checksum type, skipping validation");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Bytes the download should produce, when the object size is known.
fn expected_len(attributes: &ObjectAttributes, range: Option<ByteRange>) -> Option<u64> {
    let size = attributes.size?;
    Some(match range {
        Some(range) => {
            let end = range.end.map_or(size, |end| end.saturating_add(1).min(size));
            end.saturating_sub(range.start)
        }
        None => size,
    })
}

use aisread::{Config, GetOptions};
use anyhow::{Context, Result};
use clap::Args;
use tokio::io::AsyncWriteExt;

use super::ObjectArg;

#[derive(Clone, Debug, Args)]
pub struct CatArg {
    #[command(flatten)]
    target: ObjectArg,
}

impl CatArg {
    pub async fn run(self, config: &Config) -> Result<()> {
        let mut reader = self.target.reader(config, &GetOptions::default(), config.reader_options())?;
        let content = reader.read_all().await.with_context(|| format!("GET {}", self.target))?;

        let mut stdout = tokio::io::stdout();
        stdout.write_all(&content).await?;
        stdout.flush().await?;
        Ok(())
    }
}

use aisread::{Config, GetOptions};
use anyhow::{Context, Result};
use clap::Args;

use super::ObjectArg;

#[derive(Clone, Debug, Args)]
pub struct HeadArg {
    #[command(flatten)]
    target: ObjectArg,

    /// Print properties as JSON
    #[arg(long)]
    json: bool,
}

impl HeadArg {
    pub async fn run(self, config: &Config) -> Result<()> {
        let mut reader = self.target.reader(config, &GetOptions::default(), config.reader_options())?;
        let props = reader.props().await.with_context(|| format!("HEAD {}", self.target))?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&props)?);
            return Ok(());
        }

        let attrs = &props.attributes;
        let size = attrs.size.map_or_else(|| "-".to_string(), |size| size.to_string());
        println!("name          {}", props.name);
        println!("bucket        {}://{}", props.bucket_provider, props.bucket_name);
        println!("size          {size}");
        println!("checksum      {} {}", attrs.checksum_type, attrs.checksum_value);
        println!("version       {}", attrs.version);
        println!("atime         {}", attrs.access_time);
        println!("location      {}", props.location);
        println!("present       {}", props.present);
        println!("copies        {}", props.mirror_copies);
        for path in &props.mirror_paths {
            println!("  mirror      {path}");
        }
        for (key, value) in &attrs.custom_metadata {
            println!("  custom      {key}={value}");
        }
        Ok(())
    }
}

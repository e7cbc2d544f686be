use std::fmt;
use std::path::PathBuf;

use aisread::{Config, GetOptions, HttpObjectClient, ObjectReader, ReaderOptions};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

mod cat;
mod get;
mod head;

#[derive(Clone, Debug, Parser)]
#[command(name = "aisread", version = env!("CARGO_PKG_VERSION"), about, long_about = None, propagate_version = true)]
pub struct App {
    #[command(subcommand)]
    pub cmd: Commands,

    /// TOML configuration file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Cluster endpoint, overrides the configuration
    #[arg(long, global = true, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Bucket provider, overrides the configuration
    #[arg(long, global = true, value_name = "NAME")]
    pub provider: Option<String>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    #[command(alias = "h", name = "head", about = "Show object properties")]
    Head(head::HeadArg),
    #[command(alias = "g", name = "get", about = "Download an object, resuming dropped connections")]
    Get(get::GetArg),
    #[command(name = "cat", about = "Print an object to stdout with a single request")]
    Cat(cat::CatArg),
}

impl App {
    pub async fn run(self) -> Result<()> {
        let config = self.load_config()?;
        match self.cmd {
            Commands::Head(arg) => arg.run(&config).await,
            Commands::Get(arg) => arg.run(&config).await,
            Commands::Cat(arg) => arg.run(&config).await,
        }
    }

    fn load_config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref()).context("failed to load configuration")?;
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(provider) = &self.provider {
            config.provider = provider.clone();
        }
        Ok(config)
    }
}

#[derive(Clone, Debug, Args)]
pub struct ObjectArg {
    /// Bucket name
    pub bucket: String,
    /// Object name
    pub object: String,
}

impl ObjectArg {
    pub fn reader(
        &self,
        config: &Config,
        options: &GetOptions,
        reader_options: ReaderOptions,
    ) -> Result<ObjectReader<HttpObjectClient>> {
        let client = HttpObjectClient::new(
            config.http_client()?,
            &config.endpoint,
            &config.provider,
            &self.bucket,
            &self.object,
            options,
        )?;
        Ok(ObjectReader::new(client, reader_options)?)
    }
}

impl fmt::Display for ObjectArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.object)
    }
}

use clap::Parser;

use crate::cli::App;

mod cli;
mod log;
mod tracker;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app = App::parse();
    log::init(app.verbose);
    app.run().await
}

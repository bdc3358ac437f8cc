use anyhow::Result;
use clap::Parser;
use wordclique::cli::Cli;

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    wordclique::commands::run(cli)
}

use clap::Parser;
use rasterkit::cli::Cli;
use rasterkit::init_logging;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug)?;

    let cwd = std::env::current_dir()?;
    cli.run(&cwd)
}

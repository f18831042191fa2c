use clap::Parser;
use consume::cli::{run_cli, Cli};
use consume::otel::{init_logging, LogConfig};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(&LogConfig::from_env())?;
    run_cli(cli)
}

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use xplane_dat::cli::{args::Args, commands};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("xplane_dat={}", default_level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    commands::run(args).context("command failed")?;
    Ok(())
}

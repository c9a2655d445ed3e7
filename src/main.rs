use anyhow::Result;
use clap::Parser;
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

use thinfilm::settings::{self, CliArgs, Format};

fn main() -> Result<()> {
    let args = CliArgs::parse();

    let default_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let settings = settings::load_config_from(&args)?;
    tracing::info!("{}", settings);

    let sweep = settings.run()?;
    tracing::info!("{}", sweep);

    let stdout = io::stdout();
    let mut writer = stdout.lock();
    match settings.format {
        Format::Table => sweep.writeup(&mut writer)?,
        Format::Json => writeln!(writer, "{}", sweep.to_json()?)?,
    }

    Ok(())
}

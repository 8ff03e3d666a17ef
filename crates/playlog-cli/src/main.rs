use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use playlog_cli::commands::{clients, playtime, report, timeline};
use playlog_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // try_init so an already-installed subscriber (tests) is not an error
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    match command {
        Commands::Report { files, json } => report::run(files, *json, &config.timeline)?,
        Commands::Playtime {
            file,
            mode,
            start,
            end,
        } => playtime::run(
            file,
            *mode,
            start.as_deref(),
            end.as_deref(),
            &config.timeline,
        )?,
        Commands::Clients { file } => clients::run(file, &config.timeline)?,
        Commands::Timeline { file } => timeline::run(file, &config.timeline)?,
    }

    Ok(())
}

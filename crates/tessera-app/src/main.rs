use std::io;

use clap::Parser;
use tessera_app::cli::{Cli, Command};
use tessera_app::convert::convert;
use tessera_core::config::load_config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("info"));

    // stdout carries the converted document
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config()?;

    tracing::debug!(config = ?config, "Configuration loaded");

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping info");
    }

    match cli.command {
        Command::Convert(args) => {
            let report = convert(&args, io::stdin().lock(), io::stdout().lock(), &config)?;
            if args.json_warnings {
                serde_json::to_writer_pretty(io::stderr().lock(), &report)?;
                eprintln!();
            }
        }
    }

    Ok(())
}

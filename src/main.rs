use std::{fs::OpenOptions, path::Path, sync::Mutex};

use clap::Parser;
use tracing::{error, Level};

use stakingstat::{
    cli::{init_config, run, Cli, Commands},
    error::Error,
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let cli = Cli::parse();
    let config = match init_config(&cli.config) {
        Ok(config) => config,
        Err(err) => {
            // No log file is known yet, report on stdout.
            init_tracing(None)?;
            error!("{}", err);
            return Err(err);
        },
    };

    init_tracing(config.log_file.as_deref())?;

    let result = run(cli.command.unwrap_or(Commands::Collect), config).await;

    if let Err(err) = &result {
        error!("{}", err);
    }

    result
}

fn init_tracing(log_file: Option<&Path>) -> Result<(), Error> {
    let builder = tracing_subscriber::fmt()
        .compact()
        .with_level(true)
        .with_max_level(Level::INFO)
        .with_file(true)
        .with_line_number(true);

    match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let subscriber = builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        },
        None => {
            tracing::subscriber::set_global_default(builder.finish())?;
        },
    }

    Ok(())
}

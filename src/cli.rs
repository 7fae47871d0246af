//! CLI module for the staking statistics collector
//!
//! Every invocation runs exactly one mode: the collector loop, or one of
//! the one-shot maintenance commands.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::info;

use crate::{
    configuration::{
        get_configuration, set_configuration, Config, DatabaseSelector, State,
    },
    error::Error,
    handler::collector::Collector,
    provider::{Event, ParticlRpc, Synchronization},
    store::SampleStore,
};

/// Particl staking reward statistics collector
#[derive(Parser)]
#[command(name = "stakingstat")]
#[command(about = "Records staking reward rates per block", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration file with KEY=VALUE lines
    #[arg(long, global = true, default_value = ".env")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Collect reward rates for every new block (default if no command specified)
    Collect,

    /// Create the stakingratestats table
    Init {
        /// Database to initialize: 1 = primary, 2 = secondary
        #[arg(long, default_value = "1", value_parser = clap::value_parser!(u8).range(1..=2))]
        db: u8,
    },

    /// Drop the stakingratestats table
    Clear {
        /// Database to clear: 1 = primary, 2 = secondary
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=2))]
        db: u8,
    },

    /// Copy missing recent samples between primary and secondary database
    Sync {
        /// Number of most recent blocks compared on each side
        #[arg(long, default_value = "100", value_parser = clap::value_parser!(i64).range(1..))]
        entries: i64,
    },
}

impl Commands {
    /// Databases that must be reachable before the mode starts. Any other
    /// configured database is only touched through its own operations.
    pub fn required_databases(&self) -> Vec<DatabaseSelector> {
        match self {
            Commands::Collect => vec![DatabaseSelector::Primary],
            Commands::Init { db } | Commands::Clear { db } => {
                DatabaseSelector::try_from(*db).into_iter().collect()
            },
            Commands::Sync { .. } => {
                vec![DatabaseSelector::Primary, DatabaseSelector::Secondary]
            },
        }
    }
}

/// Initialize configuration and return Config
pub fn init_config(path: &Path) -> Result<Config, Error> {
    set_configuration(path)?;
    get_configuration()
}

pub async fn run(command: Commands, config: Config) -> Result<(), Error> {
    let state = State::new(config, &command.required_databases()).await?;

    match command {
        Commands::Collect => run_collect(&state).await,
        Commands::Init { db } => run_init(&state, db.try_into()?).await,
        Commands::Clear { db } => run_clear(&state, db.try_into()?).await,
        Commands::Sync { entries } => run_sync(&state, entries).await,
    }
}

pub async fn run_init(
    state: &State,
    selector: DatabaseSelector,
) -> Result<(), Error> {
    let database = state.database(selector)?;
    database.create_schema().await?;
    info!("Initialized {} database", database.name());
    Ok(())
}

pub async fn run_clear(
    state: &State,
    selector: DatabaseSelector,
) -> Result<(), Error> {
    let database = state.database(selector)?;
    database.drop_schema().await?;
    info!("Cleared {} database", database.name());
    Ok(())
}

pub async fn run_sync(state: &State, entries: i64) -> Result<(), Error> {
    let secondary = state.secondary.as_ref().ok_or_else(|| {
        Error::ConfigurationError(String::from(
            "sync needs DATABASE_URL_SECONDARY to be configured",
        ))
    })?;

    Synchronization::new(&state.primary, secondary)
        .run(entries)
        .await?;

    Ok(())
}

pub async fn run_collect(state: &State) -> Result<(), Error> {
    let rpc = ParticlRpc::new(&state.config)?;
    let collector = Collector::new(
        rpc,
        state.config.staking_wallet.to_owned(),
        state.stores(),
    );
    let mut event = Event::new(state.config.zmq_endpoint.to_owned(), collector);

    info!("Starting staking stats collector");
    event.run().await
}

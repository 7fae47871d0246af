use tracing::info;

use crate::{
    dao::PoolOption,
    error::Error,
    model::{Staking_Rate_Stats, Table},
};

/// One named Postgres database holding a `stakingratestats` table.
#[derive(Debug)]
pub struct DatabasePool {
    pub name: String,
    pub stakingratestats: Table<Staking_Rate_Stats>,
}

impl DatabasePool {
    /// Opens the pool and fails if the database cannot be reached now.
    pub async fn new(
        name: &str,
        database_url: &str,
        max_connections: u32,
    ) -> Result<DatabasePool, Error> {
        let pool = PoolOption::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| {
                Error::StoreError(format!(
                    "cannot connect to {} database: {}",
                    name, e
                ))
            })?;

        info!("Connected to {} database", name);

        Ok(DatabasePool {
            name: name.to_owned(),
            stakingratestats: Table::new(pool),
        })
    }

    /// Opens the pool without connecting. An unreachable database shows up
    /// as a `StoreError` on each operation instead.
    pub fn new_lazy(
        name: &str,
        database_url: &str,
        max_connections: u32,
    ) -> Result<DatabasePool, Error> {
        let pool = PoolOption::new()
            .max_connections(max_connections)
            .connect_lazy(database_url)
            .map_err(|e| {
                Error::ConfigurationError(format!(
                    "invalid {} database url: {}",
                    name, e
                ))
            })?;

        info!("Opened {} database without connecting", name);

        Ok(DatabasePool {
            name: name.to_owned(),
            stakingratestats: Table::new(pool),
        })
    }
}

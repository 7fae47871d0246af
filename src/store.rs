//! Persistence contract for reward samples.
//!
//! A store holds at most one sample per block number. Writes are
//! first-write-wins, so replaying a sample is always safe.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tracing::error;

use crate::{
    error::Error,
    model::{RewardSample, Staking_Rate_Stats},
    provider::DatabasePool,
};

/// Recent samples keyed by block number. Iterate in reverse for the
/// newest-first order the store returned them in.
pub type RecentEntries = BTreeMap<i32, RewardSample>;

#[async_trait]
pub trait SampleStore: Send + Sync {
    fn name(&self) -> &str;

    /// Inserts `sample` unless a row for its block number already exists.
    async fn upsert(&self, sample: &RewardSample) -> Result<(), Error>;

    /// Up to `limit` samples with the highest block numbers.
    async fn recent_entries(&self, limit: i64) -> Result<RecentEntries, Error>;

    async fn create_schema(&self) -> Result<(), Error>;

    async fn drop_schema(&self) -> Result<(), Error>;
}

fn store_error(store: &str, operation: &str, cause: impl std::fmt::Display) -> Error {
    let message = format!("{} on {} database failed: {}", operation, store, cause);
    error!("{}", message);
    Error::StoreError(message)
}

#[async_trait]
impl SampleStore for DatabasePool {
    fn name(&self) -> &str {
        &self.name
    }

    async fn upsert(&self, sample: &RewardSample) -> Result<(), Error> {
        let row = Staking_Rate_Stats::try_from(sample)?;

        self.stakingratestats
            .insert(row)
            .await
            .map(drop)
            .map_err(|e| {
                store_error(
                    &self.name,
                    &format!("insert of block {}", sample.block_nr),
                    e,
                )
            })
    }

    async fn recent_entries(&self, limit: i64) -> Result<RecentEntries, Error> {
        if limit <= 0 {
            return Ok(RecentEntries::new());
        }

        let rows = self
            .stakingratestats
            .get_recent(limit)
            .await
            .map_err(|e| store_error(&self.name, "read of recent entries", e))?;

        let mut entries = RecentEntries::new();
        for row in rows {
            let sample = RewardSample::try_from(row)?;
            entries.insert(sample.block_nr, sample);
        }

        Ok(entries)
    }

    async fn create_schema(&self) -> Result<(), Error> {
        self.stakingratestats
            .create_table()
            .await
            .map(drop)
            .map_err(|e| store_error(&self.name, "create table stakingratestats", e))
    }

    async fn drop_schema(&self) -> Result<(), Error> {
        self.stakingratestats
            .drop_table()
            .await
            .map(drop)
            .map_err(|e| store_error(&self.name, "drop table stakingratestats", e))
    }
}

//! Persisted entities
//!
//! `RewardSample` is what the rest of the crate works with; the row type
//! mirrors the `stakingratestats` columns, whose rates are `numeric`.

use bigdecimal::{BigDecimal, FromPrimitive, ToPrimitive};
use sqlx::FromRow;

use crate::error::Error;

/// Reward rates derived for one block. One per `block_nr` and store.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardSample {
    pub block_nr: i32,
    pub block_time: i64,
    pub nominal_rate: f64,
    pub actual_rate: f64,
}

#[derive(Debug, FromRow)]
pub struct Staking_Rate_Stats {
    pub block_nr: i32,
    pub block_time: i64,
    pub nominal_rate: BigDecimal,
    pub actual_rate: BigDecimal,
}

impl TryFrom<&RewardSample> for Staking_Rate_Stats {
    type Error = Error;

    fn try_from(sample: &RewardSample) -> Result<Self, Self::Error> {
        let to_numeric = |column: &str, value: f64| {
            BigDecimal::from_f64(value).ok_or_else(|| {
                Error::InvalidInputError(format!(
                    "block {}: {} {} is not a storable number",
                    sample.block_nr, column, value
                ))
            })
        };

        Ok(Staking_Rate_Stats {
            block_nr: sample.block_nr,
            block_time: sample.block_time,
            nominal_rate: to_numeric("nominal_rate", sample.nominal_rate)?,
            actual_rate: to_numeric("actual_rate", sample.actual_rate)?,
        })
    }
}

impl TryFrom<Staking_Rate_Stats> for RewardSample {
    type Error = Error;

    fn try_from(row: Staking_Rate_Stats) -> Result<Self, Self::Error> {
        let to_float = |column: &str, value: &BigDecimal| {
            value.to_f64().ok_or_else(|| {
                Error::StoreError(format!(
                    "block {}: malformed {} {}",
                    row.block_nr, column, value
                ))
            })
        };

        Ok(RewardSample {
            block_nr: row.block_nr,
            block_time: row.block_time,
            nominal_rate: to_float("nominal_rate", &row.nominal_rate)?,
            actual_rate: to_float("actual_rate", &row.actual_rate)?,
        })
    }
}

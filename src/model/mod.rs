mod models;
mod table;

pub use models::{RewardSample, Staking_Rate_Stats};
pub use table::Table;

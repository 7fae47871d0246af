pub use self::types::{PoolOption, PoolType, QueryResult};

mod stakingratestats;
mod types;

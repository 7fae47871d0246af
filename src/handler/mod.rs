pub mod collector;
pub mod staking_reward;

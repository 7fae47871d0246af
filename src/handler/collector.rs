use chrono::DateTime;
use futures::future::join_all;
use tracing::{error, info};

use crate::{
    error::Error, handler::staking_reward::RewardCalculator,
    model::RewardSample, provider::NodeRpc, store::SampleStore,
};

/// Outcome of one write of a processed block.
#[derive(Debug)]
pub struct StoreWrite {
    pub store: String,
    pub result: Result<(), Error>,
}

#[derive(Debug)]
pub struct ProcessedBlock {
    pub sample: RewardSample,
    pub writes: Vec<StoreWrite>,
}

impl ProcessedBlock {
    pub fn failed_stores(&self) -> Vec<&str> {
        self.writes
            .iter()
            .filter(|write| write.result.is_err())
            .map(|write| write.store.as_str())
            .collect()
    }
}

/// Turns block notifications into stored reward samples. One block is
/// processed completely before the next one is accepted.
pub struct Collector<'a, R: NodeRpc> {
    rpc: R,
    wallet: String,
    stores: Vec<&'a dyn SampleStore>,
    calculator: RewardCalculator,
}

impl<'a, R: NodeRpc> Collector<'a, R> {
    pub fn new(rpc: R, wallet: String, stores: Vec<&'a dyn SampleStore>) -> Self {
        Collector {
            rpc,
            wallet,
            stores,
            calculator: RewardCalculator::new(),
        }
    }

    pub fn average(&self) -> Option<f64> {
        self.calculator.average()
    }

    /// Fetches the inputs for `hash`, derives its sample and writes it to
    /// every store. Store failures do not stop the remaining writes.
    pub async fn process_block(&mut self, hash: &str) -> Result<ProcessedBlock, Error> {
        info!("Processing block: {}", hash);

        let header = self.rpc.get_block_header(hash).await.map_err(|e| {
            error!("Block {}: fetching header failed: {}", hash, e);
            e
        })?;

        let staking_info =
            self.rpc.get_staking_info(&self.wallet).await.map_err(|e| {
                error!("Block {}: fetching staking info failed: {}", hash, e);
                e
            })?;

        let sample = self.calculator.compute(&staking_info, &header).map_err(|e| {
            error!("Block {} ({}): reward computation failed: {}", header.height, hash, e);
            e
        })?;

        if let Some(average) = self.calculator.average() {
            info!("Actual avg reward: {:.8}", average);
        }

        let block_time = DateTime::from_timestamp(sample.block_time, 0)
            .map(|time| time.to_rfc3339())
            .unwrap_or_else(|| sample.block_time.to_string());

        info!(
            "Block {} at {}: nominal rate {:.8}, actual rate {:.8}",
            sample.block_nr, block_time, sample.nominal_rate, sample.actual_rate
        );

        let results =
            join_all(self.stores.iter().map(|store| store.upsert(&sample))).await;

        let writes = self
            .stores
            .iter()
            .zip(results)
            .map(|(store, result)| {
                if let Err(e) = &result {
                    error!(
                        "Block {}: write to {} database failed, reconcile to heal: {}",
                        sample.block_nr,
                        store.name(),
                        e
                    );
                }

                StoreWrite {
                    store: store.name().to_owned(),
                    result,
                }
            })
            .collect();

        Ok(ProcessedBlock { sample, writes })
    }
}

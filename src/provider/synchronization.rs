use tracing::{error, info};

use crate::{
    error::Error,
    store::{RecentEntries, SampleStore},
};

/// Block numbers copied by one reconciliation pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub copied_to_first: Vec<i32>,
    pub copied_to_second: Vec<i32>,
}

impl SyncReport {
    pub fn is_empty(&self) -> bool {
        self.copied_to_first.is_empty() && self.copied_to_second.is_empty()
    }
}

/// Two-way merge of the newest samples of two stores. Only the tail
/// window is compared; divergence below it is left untouched.
pub struct Synchronization<'a> {
    first: &'a dyn SampleStore,
    second: &'a dyn SampleStore,
}

impl<'a> Synchronization<'a> {
    pub fn new(first: &'a dyn SampleStore, second: &'a dyn SampleStore) -> Self {
        Self { first, second }
    }

    pub async fn run(&self, entries: i64) -> Result<SyncReport, Error> {
        let first_entries = self.first.recent_entries(entries).await?;
        let second_entries = self.second.recent_entries(entries).await?;

        info!(
            "Reconciling last {} entries: {} has {}, {} has {}",
            entries,
            self.first.name(),
            first_entries.len(),
            self.second.name(),
            second_entries.len()
        );

        let mut failed = 0;

        let (copied_to_second, failures) =
            copy_missing(&first_entries, &second_entries, self.second).await;
        failed += failures;

        let (copied_to_first, failures) =
            copy_missing(&second_entries, &first_entries, self.first).await;
        failed += failures;

        if failed > 0 {
            return Err(Error::StoreError(format!(
                "reconciliation between {} and {} left {} block(s) uncopied",
                self.first.name(),
                self.second.name(),
                failed
            )));
        }

        let report = SyncReport {
            copied_to_first,
            copied_to_second,
        };

        info!(
            "Reconciliation completed: {} block(s) copied to {}, {} to {}",
            report.copied_to_first.len(),
            self.first.name(),
            report.copied_to_second.len(),
            self.second.name()
        );

        Ok(report)
    }
}

/// Copies samples present in `source` but absent from `target_entries`.
/// Every copy is attempted; returns the copied blocks and the failure count.
async fn copy_missing(
    source: &RecentEntries,
    target_entries: &RecentEntries,
    target: &dyn SampleStore,
) -> (Vec<i32>, usize) {
    let mut copied = vec![];
    let mut failed = 0;

    for (block_nr, sample) in source.iter().rev() {
        if target_entries.contains_key(block_nr) {
            continue;
        }

        match target.upsert(sample).await {
            Ok(()) => {
                info!("Block {} copied to {}", block_nr, target.name());
                copied.push(*block_nr);
            },
            Err(e) => {
                error!(
                    "Block {}: copy to {} failed: {}",
                    block_nr,
                    target.name(),
                    e
                );
                failed += 1;
            },
        }
    }

    (copied, failed)
}

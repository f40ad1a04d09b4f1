//! Run-wide outcome counts
//!
//! Stages hand back their outcomes and the coordinator folds them in here,
//! so nothing increments shared counters while work is in flight.

use crate::state::{DatasetOutcome, SyncOutcome};
use std::collections::BTreeMap;

/// Counts of every outcome seen during one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusTally {
    datasets: BTreeMap<DatasetOutcome, usize>,
    uploaded: usize,
    unchanged: usize,
    sync_failed: usize,
}

impl StatusTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one dataset outcome
    pub fn record(&mut self, outcome: DatasetOutcome) {
        *self.datasets.entry(outcome).or_insert(0) += 1;
    }

    /// Counts every outcome in `outcomes`
    pub fn record_all(&mut self, outcomes: impl IntoIterator<Item = DatasetOutcome>) {
        for outcome in outcomes {
            self.record(outcome);
        }
    }

    /// Counts one sync result; `None` means the sync failed
    pub fn record_sync(&mut self, outcome: Option<&SyncOutcome>) {
        match outcome {
            Some(SyncOutcome::Uploaded { .. }) => self.uploaded += 1,
            Some(SyncOutcome::Unchanged) => self.unchanged += 1,
            None => self.sync_failed += 1,
        }
    }

    /// Adds another tally's counts into this one
    pub fn merge(&mut self, other: &StatusTally) {
        for (outcome, count) in &other.datasets {
            *self.datasets.entry(*outcome).or_insert(0) += count;
        }
        self.uploaded += other.uploaded;
        self.unchanged += other.unchanged;
        self.sync_failed += other.sync_failed;
    }

    pub fn count(&self, outcome: DatasetOutcome) -> usize {
        self.datasets.get(&outcome).copied().unwrap_or(0)
    }

    /// Every outcome with its count, zeros included, in summary order
    pub fn counts(&self) -> Vec<(DatasetOutcome, usize)> {
        DatasetOutcome::all()
            .into_iter()
            .map(|outcome| (outcome, self.count(outcome)))
            .collect()
    }

    pub fn total(&self) -> usize {
        self.datasets.values().sum()
    }

    pub fn failures(&self) -> usize {
        self.datasets
            .iter()
            .filter(|(outcome, _)| outcome.is_failure())
            .map(|(_, count)| count)
            .sum()
    }

    pub fn uploaded(&self) -> usize {
        self.uploaded
    }

    pub fn unchanged(&self) -> usize {
        self.unchanged
    }

    pub fn sync_failed(&self) -> usize {
        self.sync_failed
    }
}

//! # Stake Snapshots
//!
//! An operator's weighted stake changes at discrete blocks. Each change
//! closes the current snapshot and opens a new one:
//!
//! ```text
//! record(10, 500)  →  #0 [10, ∞)  500
//! record(40, 800)  →  #0 [10, 40) 500   #1 [40, ∞) 800
//! ```
//!
//! `valid_until_block == 0` marks the open (current) snapshot.

use serde::{Deserialize, Serialize};

use eigenpay_core::Amount;

use crate::traits::OracleError;

/// One interval of an operator's stake history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeSnapshot {
    /// First block at which this stake applies.
    pub valid_from_block: u64,
    /// First block at which this stake no longer applies; zero while current.
    pub valid_until_block: u64,
    /// Stake weighted for the quorum the operator serves.
    pub weighted_stake: Amount,
}

impl StakeSnapshot {
    /// Whether the snapshot is still open.
    pub fn is_current(&self) -> bool {
        self.valid_until_block == 0
    }

    /// Whether the snapshot was in effect at `block`.
    pub fn brackets(&self, block: u64) -> bool {
        self.valid_from_block <= block && (self.is_current() || block < self.valid_until_block)
    }
}

/// Append-only stake history for one operator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeHistory {
    snapshots: Vec<StakeSnapshot>,
}

impl StakeHistory {
    /// An empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a stake change effective at `block`, returning the new
    /// snapshot's index.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::InvalidRecord`] unless `block` is strictly
    /// after the current snapshot's start.
    pub fn record(&mut self, block: u64, weighted_stake: Amount) -> Result<u32, OracleError> {
        if let Some(last) = self.snapshots.last_mut() {
            if block <= last.valid_from_block {
                return Err(OracleError::InvalidRecord(format!(
                    "stake update at block {block} does not follow current snapshot starting at {}",
                    last.valid_from_block
                )));
            }
            last.valid_until_block = block;
        }
        let index = u32::try_from(self.snapshots.len())
            .map_err(|_| OracleError::InvalidRecord("stake history is full".to_string()))?;
        self.snapshots.push(StakeSnapshot {
            valid_from_block: block,
            valid_until_block: 0,
            weighted_stake,
        });
        Ok(index)
    }

    /// Snapshot at `index`.
    pub fn get(&self, index: u32) -> Option<&StakeSnapshot> {
        self.snapshots.get(index as usize)
    }

    /// Index of the snapshot in effect at `block`.
    pub fn index_at(&self, block: u64) -> Option<u32> {
        self.snapshots
            .iter()
            .position(|s| s.brackets(block))
            .and_then(|i| u32::try_from(i).ok())
    }

    /// Number of snapshots recorded.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether no snapshot has been recorded.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Iterate snapshots in index order.
    pub fn iter(&self) -> impl Iterator<Item = &StakeSnapshot> {
        self.snapshots.iter()
    }
}

// Copyright (c) 2020 Chaintope Inc.
// Distributed under the MIT software license, see the accompanying
// file COPYING or http://www.opensource.org/licenses/mit-license.php.

//! Checkpoints
//!
//! Hard-coded `(height, hash)` pins. A block at a pinned height must carry
//! the pinned hash; history below the highest pin that does not match is
//! rejected by the caller. The statistics carried alongside the table only
//! feed the sync-progress estimate.
//!

use std::collections::BTreeMap;

use hashes::hex::{self, FromHex};
use hashes::sha256d;

/// Outcome of comparing a block hash with the checkpoint table.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum CheckpointCheck {
    /// A checkpoint exists at the height and the hash matches it.
    Match,
    /// A checkpoint exists at the height and the hash differs.
    Mismatch,
    /// No checkpoint is pinned at the height.
    NoOpinion,
}

impl CheckpointCheck {
    /// Whether the block may be accepted as far as checkpoints are concerned.
    pub fn is_acceptable(self) -> bool {
        self != CheckpointCheck::Mismatch
    }
}

/// Sync-estimation statistics of a checkpoint table.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SyncStats {
    /// UNIX time of the last checkpoint block
    pub last_checkpoint_time: i64,
    /// Total number of transactions up to and including the last checkpoint
    pub transactions_last_checkpoint: u64,
    /// Estimated number of transactions per day after the last checkpoint
    pub transactions_per_day: f64,
}

/// Verification of blocks with checked signatures is this many times
/// more expensive than of blocks below the last checkpoint.
const SIGCHECK_VERIFICATION_FACTOR: f64 = 5.0;

/// The checkpoint table of one network.
#[derive(Clone, PartialEq, Debug)]
pub struct Checkpoints {
    pins: BTreeMap<u32, sha256d::Hash>,
    /// Sync-estimation statistics
    pub stats: SyncStats,
}

impl Checkpoints {
    /// Builds a table from `(height, display-order hex hash)` pairs.
    pub fn from_hex(entries: &[(u32, &str)], stats: SyncStats) -> Result<Checkpoints, hex::Error> {
        let mut pins = BTreeMap::new();
        for &(height, hash) in entries {
            pins.insert(height, sha256d::Hash::from_hex(hash)?);
        }
        Ok(Checkpoints { pins, stats })
    }

    /// Compares `hash` with the checkpoint pinned at `height`, if any.
    pub fn check(&self, height: u32, hash: &sha256d::Hash) -> CheckpointCheck {
        match self.pins.get(&height) {
            None => CheckpointCheck::NoOpinion,
            Some(pinned) if pinned == hash => CheckpointCheck::Match,
            Some(_) => CheckpointCheck::Mismatch,
        }
    }

    /// The hash pinned at `height`.
    pub fn get(&self, height: u32) -> Option<&sha256d::Hash> {
        self.pins.get(&height)
    }

    /// Highest pinned height, `0` for an empty table.
    pub fn last_height(&self) -> u32 {
        self.pins.keys().next_back().cloned().unwrap_or(0)
    }

    /// Whether `height` lies at or below the highest pin. Blocks there
    /// can no longer be reorganized away.
    pub fn is_below_last(&self, height: u32) -> bool {
        !self.pins.is_empty() && height <= self.last_height()
    }

    /// Number of pins.
    pub fn len(&self) -> usize {
        self.pins.len()
    }

    /// Whether the table has no pins.
    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    /// Pins in ascending height order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &sha256d::Hash)> {
        self.pins.iter().map(|(h, hash)| (*h, hash))
    }

    /// Estimates the fraction of total verification work done, given the
    /// tip's cumulative transaction count and time. Never use the result in
    /// a validity decision.
    pub fn guess_verification_progress(&self, tip_tx_count: u64, tip_time: i64, now: i64, sigchecks: bool) -> f64 {
        let factor = if sigchecks { SIGCHECK_VERIFICATION_FACTOR } else { 1.0 };
        let stats = &self.stats;

        let (work_before, work_after) = if tip_tx_count <= stats.transactions_last_checkpoint {
            let cheap_before = tip_tx_count as f64;
            let cheap_after = (stats.transactions_last_checkpoint - tip_tx_count) as f64;
            let expensive_after =
                (now - stats.last_checkpoint_time) as f64 / 86400.0 * stats.transactions_per_day;
            (cheap_before, cheap_after + expensive_after * factor)
        } else {
            let cheap_before = stats.transactions_last_checkpoint as f64;
            let expensive_before = (tip_tx_count - stats.transactions_last_checkpoint) as f64;
            let expensive_after = (now - tip_time) as f64 / 86400.0 * stats.transactions_per_day;
            (cheap_before + expensive_before * factor, expensive_after * factor)
        };

        let total = work_before + work_after.max(0.0);
        if total <= 0.0 {
            return 1.0;
        }
        (work_before / total).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{CheckpointCheck, Checkpoints, SyncStats};
    use crate::network::constants::Network;
    use crate::test_helpers::params_for;
    use crate::util::hash_from_display_hex;
    use hashes::{sha256d, Hash};

    fn table() -> Checkpoints {
        Checkpoints::from_hex(
            &[
                (10, "00000000000000000000000000000000000000000000000000000000000000aa"),
                (20, "00000000000000000000000000000000000000000000000000000000000000bb"),
            ],
            SyncStats { last_checkpoint_time: 1_000_000, transactions_last_checkpoint: 1000, transactions_per_day: 100.0 },
        )
        .unwrap()
    }

    #[test]
    fn lookup() {
        let cp = table();
        let aa = hash_from_display_hex("00000000000000000000000000000000000000000000000000000000000000aa").unwrap();
        let bb = hash_from_display_hex("00000000000000000000000000000000000000000000000000000000000000bb").unwrap();

        assert_eq!(cp.check(10, &aa), CheckpointCheck::Match);
        assert_eq!(cp.check(10, &bb), CheckpointCheck::Mismatch);
        assert_eq!(cp.check(20, &bb), CheckpointCheck::Match);
        assert!(!CheckpointCheck::Mismatch.is_acceptable());
        assert!(CheckpointCheck::Match.is_acceptable());

        assert_eq!(cp.len(), 2);
        assert_eq!(cp.last_height(), 20);
        assert!(cp.is_below_last(0));
        assert!(cp.is_below_last(20));
        assert!(!cp.is_below_last(21));
        assert_eq!(cp.iter().map(|(h, _)| h).collect::<Vec<_>>(), vec![10, 20]);
    }

    #[test]
    fn unknown_height_has_no_opinion() {
        let cp = table();
        for h in [0u32, 9, 11, 19, 21, u32::max_value()].iter() {
            assert_eq!(cp.check(*h, &sha256d::Hash::hash(b"anything")), CheckpointCheck::NoOpinion);
            assert_eq!(cp.check(*h, &sha256d::Hash::from_inner([0u8; 32])), CheckpointCheck::NoOpinion);
            assert!(cp.get(*h).is_none());
        }
    }

    #[test]
    fn malformed_pin_is_rejected() {
        let stats = table().stats;
        assert!(Checkpoints::from_hex(&[(1, "xyz")], stats).is_err());
        assert!(Checkpoints::from_hex(&[(1, "00aa")], stats).is_err());

        let empty = Checkpoints::from_hex(&[], stats).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.last_height(), 0);
        assert!(!empty.is_below_last(0));
    }

    #[test]
    fn main_table() {
        let params = params_for(Network::Main);
        let cp = &params.checkpoints;
        let heights: Vec<u32> = cp.iter().map(|(h, _)| h).collect();
        assert_eq!(heights, vec![0, 50, 2000, 5000, 10000, 167000, 560000]);
        assert_eq!(cp.last_height(), 560000);
        let pin = hash_from_display_hex("000000000003ca43cf16ab5d4ebdaccc6f0ee6108bfaa0b149e070208e1263ac").unwrap();
        assert_eq!(cp.check(10000, &pin), CheckpointCheck::Match);
        assert_eq!(cp.check(10001, &pin), CheckpointCheck::NoOpinion);
        assert_eq!(cp.check(50, &pin), CheckpointCheck::Mismatch);
        let last = hash_from_display_hex("e2ca342dbe73671b62f8c4b48a0bafaebae28c7134c163d956ede7fd5c97be08").unwrap();
        assert_eq!(cp.get(560000), Some(&last));
        assert_eq!(cp.check(0, &params.genesis.block_hash()), CheckpointCheck::Match);
        assert_eq!(
            cp.stats,
            SyncStats { last_checkpoint_time: 1580092363, transactions_last_checkpoint: 1200000, transactions_per_day: 2000.0 }
        );
    }

    #[test]
    fn test_networks_pin_placeholder() {
        let one = hash_from_display_hex("0000000000000000000000000000000000000000000000000000000000000001").unwrap();
        assert_eq!(one.into_inner()[0], 1);
        for (net, time, per_day) in [(Network::Testnet, 1740710, 250.0), (Network::Regtest, 1434124731, 100.0)].iter() {
            let params = params_for(*net);
            let cp = &params.checkpoints;
            assert_eq!(cp.len(), 1);
            assert_eq!(cp.check(0, &one), CheckpointCheck::Match);
            assert_eq!(cp.check(0, &params.genesis.block_hash()), CheckpointCheck::Mismatch);
            assert_eq!(cp.stats.last_checkpoint_time, *time);
            assert_eq!(cp.stats.transactions_last_checkpoint, 0);
            assert_eq!(cp.stats.transactions_per_day, *per_day);
        }
    }

    #[test]
    fn progress_estimate() {
        let cp = table();
        // At the checkpoint, with no time passed, everything is done.
        assert_eq!(cp.guess_verification_progress(1000, 1_000_000, 1_000_000, true), 1.0);
        // Halfway through the cheap part.
        assert_eq!(cp.guess_verification_progress(500, 0, 1_000_000, true), 0.5);
        // One day after the checkpoint: 100 expensive transactions outstanding.
        let p = cp.guess_verification_progress(1000, 1_000_000, 1_086_400, false);
        assert!((p - 1000.0 / 1100.0).abs() < 1e-9);
        let p = cp.guess_verification_progress(1000, 1_000_000, 1_086_400, true);
        assert!((p - 1000.0 / 1500.0).abs() < 1e-9);
        assert_eq!(cp.guess_verification_progress(0, 0, 1_000_000, true), 0.0);
    }

    #[test]
    #[cfg(feature = "serde")]
    fn serde_stats() {
        let stats = table().stats;
        let json = serde_json::to_string(&stats).unwrap();
        let back: SyncStats = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stats);
    }
}

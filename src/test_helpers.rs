// Copyright (c) 2020 Chaintope Inc.
// Distributed under the MIT software license, see the accompanying
// file COPYING or http://www.opensource.org/licenses/mit-license.php.

//! Internal helper functions for unit tests
//!
//!

use hashes::{sha256d, Hash};
use rug::Integer;

use crate::consensus::params::Params;
use crate::consensus::stake::{BlockRef, OutPoint, PlainStake, StakeInput, StakeWallet, ZerocoinStake};
use crate::network::constants::Network;
use crate::util::amount::Amount;

pub fn params_for(network: Network) -> Params {
    Params::new(network).unwrap()
}

pub fn main_params() -> Params {
    params_for(Network::Main)
}

pub fn block_at(height: u32, time: i64) -> BlockRef {
    BlockRef {
        height,
        time,
        hash: sha256d::Hash::hash(&height.to_le_bytes()),
    }
}

pub fn plain_stake(vout: u32, height: u32, time: i64, value: Amount) -> StakeInput {
    StakeInput::Plain(PlainStake {
        outpoint: OutPoint { txid: sha256d::Hash::hash(b"stake source"), vout },
        value,
        source: block_at(height, time),
    })
}

pub fn zerocoin_stake(serial: u64, height: u32, time: i64, denomination: Amount) -> StakeInput {
    StakeInput::Zerocoin(ZerocoinStake {
        serial: Integer::from(serial),
        denomination,
        source: block_at(height, time),
    })
}

pub struct TestWallet {
    pub script: Option<Vec<u8>>,
    pub threshold: Amount,
}

impl StakeWallet for TestWallet {
    fn payout_script(&self, _input: &StakeInput) -> Option<Vec<u8>> {
        self.script.clone()
    }

    fn stake_split_threshold(&self) -> Amount {
        self.threshold
    }
}

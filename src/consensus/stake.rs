// Copyright (c) 2020 Chaintope Inc.
// Distributed under the MIT software license, see the accompanying
// file COPYING or http://www.opensource.org/licenses/mit-license.php.

//! Stake inputs
//!
//! A stake input is a confirmed coin used to prove the right to produce a
//! proof-of-stake block. The set of input kinds is closed: plain outputs
//! and zerocoin mints.
//!
//! Eligibility is checked afresh for every context. A passing check hands
//! out an [`EligibleStake`], the only value that can be materialized into a
//! coinstake input and its outputs, so an ineligible input can never be
//! spent as a stake.
//!

use std::collections::HashSet;
use std::{error, fmt};

use hashes::sha256d;
use rug::Integer;

use crate::consensus::params::Params;
use crate::util::amount::Amount;
use crate::util::{bignum_bytes, write_compact_size};

/// Most outputs a coinstake splits its value into.
pub const MAX_STAKE_SPLIT: u64 = 30;

/// Position of a block in the chain.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct BlockRef {
    /// Block height
    pub height: u32,
    /// Block timestamp
    pub time: i64,
    /// Block hash
    pub hash: sha256d::Hash,
}

/// The block a stake is evaluated for.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct StakeContext {
    /// Height of the new block
    pub height: u32,
    /// Timestamp of the new block
    pub time: i64,
}

/// Reference to a transaction output.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct OutPoint {
    /// Transaction id
    pub txid: sha256d::Hash,
    /// Output index
    pub vout: u32,
}

/// A stake backed by a plain transaction output.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PlainStake {
    /// The staked output
    pub outpoint: OutPoint,
    /// Its value
    pub value: Amount,
    /// Block the output was confirmed in
    pub source: BlockRef,
}

/// A stake backed by a zerocoin mint.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ZerocoinStake {
    /// Serial number revealed by the spend
    pub serial: Integer,
    /// Denomination of the mint
    pub denomination: Amount,
    /// Block the mint was confirmed in
    pub source: BlockRef,
}

/// Any coin that can be staked.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum StakeInput {
    /// A plain output
    Plain(PlainStake),
    /// A zerocoin mint
    Zerocoin(ZerocoinStake),
}

/// Reasons a stake input is rejected.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum StakeError {
    /// Input has no value
    ZeroValue,
    /// Input is younger than the minimum stake age
    Immature {
        /// Seconds the input has aged
        age: i64,
        /// Seconds required
        required: i64,
    },
    /// Input is shallower than the minimum stake depth
    TooShallow {
        /// Confirmations of the input
        depth: i64,
        /// Confirmations required
        required: u32,
    },
    /// Zerocoin mint is shallower than its own stake depth
    ZerocoinTooShallow {
        /// Confirmations of the mint
        depth: i64,
        /// Confirmations required
        required: u32,
    },
    /// Uniqueness tag already used by an earlier stake
    DuplicateTag,
    /// Input value plus reward overflows
    ValueOverflow,
    /// Wallet has no script to pay the stake to
    NoPayoutScript,
}

impl fmt::Display for StakeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            StakeError::ZeroValue => f.write_str("stake input has no value"),
            StakeError::Immature { age, required } => {
                write!(f, "stake input aged {}s, {}s required", age, required)
            }
            StakeError::TooShallow { depth, required } => {
                write!(f, "stake input has depth {}, {} required", depth, required)
            }
            StakeError::ZerocoinTooShallow { depth, required } => {
                write!(f, "zerocoin stake has depth {}, {} required", depth, required)
            }
            StakeError::DuplicateTag => f.write_str("stake input already used"),
            StakeError::ValueOverflow => f.write_str("stake value overflow"),
            StakeError::NoPayoutScript => f.write_str("no payout script for stake"),
        }
    }
}

impl error::Error for StakeError {}

/// The wallet side of materialization.
pub trait StakeWallet {
    /// Script the coinstake pays to, `None` if the wallet cannot sign for
    /// the input.
    fn payout_script(&self, input: &StakeInput) -> Option<Vec<u8>>;

    /// Value above which the stake is split over several outputs. Zero
    /// disables splitting.
    fn stake_split_threshold(&self) -> Amount;
}

/// Input side of a coinstake.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum StakeTxIn {
    /// Spend of a plain output
    Outpoint(OutPoint),
    /// Spend of a zerocoin mint, the proof is attached by the wallet
    ZerocoinSpend {
        /// Revealed serial
        serial: Integer,
        /// Denomination of the mint
        denomination: Amount,
    },
}

/// Output of a coinstake.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct StakeTxOut {
    /// Value
    pub value: Amount,
    /// Locking script
    pub script_pubkey: Vec<u8>,
}

/// Input and outputs of a coinstake.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct MaterializedStake {
    /// The spent stake
    pub input: StakeTxIn,
    /// Outputs, starting with the empty coinstake marker
    pub outputs: Vec<StakeTxOut>,
}

impl StakeInput {
    /// Block the input was confirmed in.
    pub fn source_block(&self) -> &BlockRef {
        match *self {
            StakeInput::Plain(ref s) => &s.source,
            StakeInput::Zerocoin(ref s) => &s.source,
        }
    }

    /// Value contributed to the stake.
    pub fn value(&self) -> Amount {
        match *self {
            StakeInput::Plain(ref s) => s.value,
            StakeInput::Zerocoin(ref s) => s.denomination,
        }
    }

    /// Whether the input is a zerocoin mint.
    pub fn is_zerocoin(&self) -> bool {
        match *self {
            StakeInput::Plain(_) => false,
            StakeInput::Zerocoin(_) => true,
        }
    }

    /// Bytes identifying the input across all stakes.
    ///
    /// Plain outputs serialize the output index followed by the txid, mints
    /// serialize their serial number.
    pub fn uniqueness_tag(&self) -> Vec<u8> {
        match *self {
            StakeInput::Plain(ref s) => {
                let mut tag = Vec::with_capacity(36);
                tag.extend_from_slice(&s.outpoint.vout.to_le_bytes());
                tag.extend_from_slice(&s.outpoint.txid[..]);
                tag
            }
            StakeInput::Zerocoin(ref s) => {
                let bytes = bignum_bytes(&s.serial);
                let mut tag = Vec::with_capacity(bytes.len() + 9);
                write_compact_size(&mut tag, bytes.len());
                tag.extend_from_slice(&bytes);
                tag
            }
        }
    }

    /// Checks the input against the age or depth rule of `context` and,
    /// for mints, against the zerocoin stake depth.
    pub fn check_eligibility(self, params: &Params, context: StakeContext) -> Result<EligibleStake, StakeError> {
        if self.value() == Amount::ZERO {
            return Err(StakeError::ZeroValue);
        }

        let source = *self.source_block();
        let depth = i64::from(context.height) - i64::from(source.height);
        if !params.has_stake_min_age_or_depth(context.height, context.time, source.height, source.time) {
            let err = if params.is_stake_modifier_v2(context.height) {
                StakeError::TooShallow { depth, required: params.stake_min_depth }
            } else {
                StakeError::Immature { age: context.time - source.time, required: params.stake_min_age }
            };
            debug!("stake at height {} rejected: {}", source.height, err);
            return Err(err);
        }

        if self.is_zerocoin() && depth < i64::from(params.zerocoin_required_stake_depth) {
            let err = StakeError::ZerocoinTooShallow { depth, required: params.zerocoin_required_stake_depth };
            debug!("stake at height {} rejected: {}", source.height, err);
            return Err(err);
        }

        Ok(EligibleStake { input: self, context })
    }
}

/// A stake input that passed eligibility for one context.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct EligibleStake {
    input: StakeInput,
    context: StakeContext,
}

impl EligibleStake {
    /// The checked input.
    pub fn input(&self) -> &StakeInput {
        &self.input
    }

    /// The context the input was checked for.
    pub fn context(&self) -> StakeContext {
        self.context
    }

    /// Gives the input back.
    pub fn into_input(self) -> StakeInput {
        self.input
    }

    /// Builds the coinstake input and outputs paying the input value plus
    /// `reward` back to the wallet.
    pub fn materialize(&self, wallet: &dyn StakeWallet, reward: Amount) -> Result<MaterializedStake, StakeError> {
        let script = wallet.payout_script(&self.input).ok_or(StakeError::NoPayoutScript)?;
        let total = self.input.value().checked_add(reward).ok_or(StakeError::ValueOverflow)?;

        let input = match self.input {
            StakeInput::Plain(ref s) => StakeTxIn::Outpoint(s.outpoint),
            StakeInput::Zerocoin(ref s) => StakeTxIn::ZerocoinSpend {
                serial: s.serial.clone(),
                denomination: s.denomination,
            },
        };

        let mut outputs = vec![StakeTxOut { value: Amount::ZERO, script_pubkey: Vec::new() }];
        for value in split_stake(total, wallet.stake_split_threshold()) {
            outputs.push(StakeTxOut { value, script_pubkey: script.clone() });
        }
        Ok(MaterializedStake { input, outputs })
    }
}

/// Splits `total` evenly when it is at least twice `threshold`. Shares are
/// rounded down to whole cents, the last one takes the remainder.
fn split_stake(total: Amount, threshold: Amount) -> Vec<Amount> {
    if threshold == Amount::ZERO || total.as_sat() / 2 < threshold.as_sat() {
        return vec![total];
    }
    let count = (total.as_sat() / threshold.as_sat()).min(MAX_STAKE_SPLIT);
    let share = Amount::from_sat(total.as_sat() / count / Amount::CENT.as_sat() * Amount::CENT.as_sat());
    let mut shares = vec![share; count as usize - 1];
    shares.push(total - share * (count - 1));
    shares
}

/// Uniqueness tags of stakes seen so far.
#[derive(Clone, Debug, Default)]
pub struct StakeTags {
    seen: HashSet<Vec<u8>>,
}

impl StakeTags {
    /// Creates an empty set.
    pub fn new() -> StakeTags {
        StakeTags::default()
    }

    /// Records the tag of `input`, failing if it was recorded before.
    pub fn insert(&mut self, input: &StakeInput) -> Result<(), StakeError> {
        if !self.seen.insert(input.uniqueness_tag()) {
            debug!("stake at height {} reuses a tag", input.source_block().height);
            return Err(StakeError::DuplicateTag);
        }
        Ok(())
    }

    /// Whether the tag of `input` was recorded.
    pub fn contains(&self, input: &StakeInput) -> bool {
        self.seen.contains(&input.uniqueness_tag())
    }

    /// Number of recorded tags.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether no tag was recorded.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

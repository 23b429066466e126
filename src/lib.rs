// Rust Bitcoin Library
// Written in 2014 by
//   Andrew Poelstra <apoelstra@wpsoftware.net>
//
// To the extent possible under law, the author(s) have dedicated all
// copyright and related and neighboring rights to this software to
// the public domain worldwide. This software is distributed without
// any warranty.
//
// You should have received a copy of the CC0 Public Domain Dedication
// along with this software.
// If not, see <http://creativecommons.org/publicdomain/zero/1.0/>.
//

//! # Kabberry Chain Parameters
//!
//! This library holds the consensus parameter sets of the Kabberry main, test
//! and regression-test networks, and the rule gates every node evaluates
//! against them: slotted block timestamps, future time drift, stake age and
//! depth, checkpoints, and the zerocoin group parameters.
//!
//! Parameters are plain values. A node selects its network once at startup
//! through [`chainparams::select`] and afterwards passes `&Params` into the
//! validation code that needs it.
//!
//! ```rust
//! use kabberry_chainparams::chainparams;
//! use kabberry_chainparams::Network;
//!
//! let params = chainparams::get(Network::Main);
//! assert_eq!(params.time_slot_length(0), 15);
//! assert!(params.is_valid_block_timestamp(1_600_000_007, 0));
//! assert!(!params.is_valid_block_timestamp(1_600_000_007, params.block_time_protocol_v2));
//! ```
//!

#![crate_name = "kabberry_chainparams"]

// Experimental features we need
#![cfg_attr(all(test, feature = "unstable"), feature(test))]

// Coding conventions
#![forbid(unsafe_code)]
#![deny(non_upper_case_globals)]
#![deny(non_camel_case_types)]
#![deny(non_snake_case)]
#![deny(unused_mut)]
#![deny(dead_code)]
#![deny(unused_imports)]
#![deny(missing_docs)]

// Re-exported dependencies.
pub extern crate bitcoin_hashes as hashes;
pub extern crate secp256k1;
pub extern crate rug;

#[cfg(feature = "serde")] #[macro_use] extern crate serde;
#[cfg(all(test, feature = "serde"))] extern crate serde_json;
#[cfg(all(test, feature = "serde"))] extern crate serde_test;
#[cfg(all(test, feature = "unstable"))] extern crate test;

#[macro_use]
extern crate log;

#[cfg(target_pointer_width = "16")]
compile_error!("kabberry-chainparams cannot be used on 16-bit architectures");

#[cfg(test)]
mod test_helpers;
pub mod network;
pub mod blockdata;
pub mod consensus;
pub mod zerocoin;
pub mod chainparams;
pub mod util;

pub use crate::blockdata::constants::GenesisBlock;
pub use crate::consensus::checkpoints::{CheckpointCheck, Checkpoints};
pub use crate::consensus::params::Params;
pub use crate::consensus::stake::{BlockRef, EligibleStake, StakeContext, StakeInput};
pub use crate::network::constants::Network;
pub use crate::util::Error;
pub use crate::util::amount::Amount;
pub use crate::zerocoin::{ZerocoinParams, ZerocoinProvider};

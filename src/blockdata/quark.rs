// Rust Bitcoin Library
// Written in 2014 by
//     Andrew Poelstra <apoelstra@wpsoftware.net>
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

//! Quark
//!
//! The chained proof-of-work hash of version 1 block headers. Nine rounds of
//! 512-bit hash functions are applied in sequence, three of them picking
//! between two functions on bit 3 of the previous digest. The block hash is
//! the first half of the final digest.
//!

use blake512_hash::Blake512;
use bmw_hash::Bmw512;
use groestl::Groestl512;
use hashes::{sha256d, Hash};
use jh::Jh512;
use sha3::{Digest, Keccak512};
use skein::consts::U64;
use skein::Skein512;

use crate::blockdata::constants::HeaderHasher;

type Skein = Skein512<U64>;

const BRANCH_MASK: u8 = 0x08;

fn round<D: Digest>(data: &[u8]) -> [u8; 64] {
    let mut out = [0u8; 64];
    out.copy_from_slice(&D::digest(data));
    out
}

/// Computes the Quark hash of `data`, in internal byte order.
pub fn quark_hash(data: &[u8]) -> [u8; 32] {
    let h = round::<Blake512>(data);
    let h = round::<Bmw512>(&h);
    let h = if h[0] & BRANCH_MASK != 0 {
        round::<Groestl512>(&h)
    } else {
        round::<Skein>(&h)
    };
    let h = round::<Groestl512>(&h);
    let h = round::<Jh512>(&h);
    let h = if h[0] & BRANCH_MASK != 0 {
        round::<Blake512>(&h)
    } else {
        round::<Bmw512>(&h)
    };
    let h = round::<Keccak512>(&h);
    let h = round::<Skein>(&h);
    let h = if h[0] & BRANCH_MASK != 0 {
        round::<Keccak512>(&h)
    } else {
        round::<Jh512>(&h)
    };

    let mut out = [0u8; 32];
    out.copy_from_slice(&h[..32]);
    out
}

/// [`HeaderHasher`] for version 1 headers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuarkHasher;

impl HeaderHasher for QuarkHasher {
    fn header_hash(&self, header: &[u8]) -> sha256d::Hash {
        sha256d::Hash::from_inner(quark_hash(header))
    }
}

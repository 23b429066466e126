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

//! Blockdata constants
//!
//! This module provides various constants relating to the blockchain and
//! consensus code. In particular, it defines the genesis block and its
//! single transaction, and the integrity check run against them at startup.
//!

use std::{error, fmt};

use hashes::{sha256d, Hash};

use crate::blockdata::quark::QuarkHasher;
use crate::util::amount::Amount;
use crate::util::{hash_to_display_hex, write_compact_size};

/// The maximum allowable sequence number
pub const MAX_SEQUENCE: u32 = 0xFFFFFFFF;
/// How many satoshis are in "one KKC"
pub const COIN_VALUE: u64 = 100_000_000;
/// One hundredth of a KKC, in satoshis
pub const CENT_VALUE: u64 = 1_000_000;
/// Activation height that is never reached
pub const DISABLED_HEIGHT: u32 = 1_999_999_999;
/// Serialized length of a block header before the zerocoin era
pub const HEADER_SIZE: usize = 80;

/// Headline embedded in the genesis coinbase.
pub const GENESIS_TIMESTAMP: &str = "PrimeStone Genesis Block: 2018/12/28 12:30:00";
/// Public key paid by the genesis coinbase output.
pub const GENESIS_OUTPUT_PUBKEY: [u8; 65] = [
    0x04, 0x1f, 0x5a, 0xe1, 0x76, 0xfb, 0x57, 0xfb, 0x89, 0x37, 0x5f, 0x57, 0xe8,
    0xe3, 0xa7, 0x01, 0xa4, 0xf5, 0x16, 0x23, 0x53, 0x27, 0x58, 0x0d, 0xa9, 0xa7,
    0xc0, 0x13, 0x0d, 0x2a, 0x7b, 0x8c, 0x5a, 0xcc, 0xc6, 0x44, 0xcd, 0x2e, 0x9b,
    0xf3, 0x10, 0x4c, 0xfc, 0xdb, 0x86, 0x1c, 0xe2, 0xe3, 0x36, 0xff, 0x31, 0xb8,
    0x14, 0x73, 0x62, 0x05, 0x68, 0xe8, 0x86, 0xc7, 0xc4, 0x37, 0xdd, 0xf9, 0x54,
];
/// Value of the genesis coinbase output.
pub const GENESIS_REWARD: Amount = Amount::ZERO;

const OP_PUSHDATA1: u8 = 0x4c;
const OP_PUSHDATA2: u8 = 0x4d;
const OP_CHECKSIG: u8 = 0xac;

/// Computes the hash of a serialized block header.
///
/// Version 1 headers are hashed with Quark, see
/// [`QuarkHasher`](crate::blockdata::quark::QuarkHasher).
pub trait HeaderHasher {
    /// Hashes the serialized header bytes.
    fn header_hash(&self, header: &[u8]) -> sha256d::Hash;
}

/// Genesis block integrity failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenesisError {
    /// The merkle root derived from the coinbase differs from the pinned one.
    MerkleRootMismatch {
        /// Hard-coded value
        expected: sha256d::Hash,
        /// Derived value
        found: sha256d::Hash,
    },
    /// The header hash differs from the pinned genesis hash.
    BlockHashMismatch {
        /// Hard-coded value
        expected: sha256d::Hash,
        /// Derived value
        found: sha256d::Hash,
    },
}

impl fmt::Display for GenesisError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            GenesisError::MerkleRootMismatch { ref expected, ref found } => write!(
                f,
                "merkle root {} does not match expected {}",
                hash_to_display_hex(found),
                hash_to_display_hex(expected)
            ),
            GenesisError::BlockHashMismatch { ref expected, ref found } => write!(
                f,
                "block hash {} does not match expected {}",
                hash_to_display_hex(found),
                hash_to_display_hex(expected)
            ),
        }
    }
}

impl error::Error for GenesisError {}

/// The genesis block descriptor of a network together with the hashes it
/// must reproduce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenesisBlock {
    /// Header version
    pub version: i32,
    /// Header timestamp
    pub time: u32,
    /// Compact difficulty target
    pub bits: u32,
    /// Proof-of-work nonce
    pub nonce: u32,
    /// Coinbase output value
    pub reward: Amount,
    /// Pinned block hash, if the network asserts one
    pub expected_hash: Option<sha256d::Hash>,
    /// Pinned merkle root
    pub expected_merkle_root: sha256d::Hash,
}

fn push_slice(script: &mut Vec<u8>, data: &[u8]) {
    let n = data.len();
    if n < OP_PUSHDATA1 as usize {
        script.push(n as u8);
    } else if n <= 0xff {
        script.push(OP_PUSHDATA1);
        script.push(n as u8);
    } else {
        script.push(OP_PUSHDATA2);
        script.extend_from_slice(&(n as u16).to_le_bytes());
    }
    script.extend_from_slice(data);
}

/// Minimal little-endian script number encoding.
fn script_num(n: i64) -> Vec<u8> {
    let mut out = Vec::new();
    if n == 0 {
        return out;
    }
    let negative = n < 0;
    let mut abs = n.unsigned_abs();
    while abs > 0 {
        out.push((abs & 0xff) as u8);
        abs >>= 8;
    }
    if out[out.len() - 1] & 0x80 != 0 {
        out.push(if negative { 0x80 } else { 0x00 });
    } else if negative {
        let last = out.len() - 1;
        out[last] |= 0x80;
    }
    out
}

impl GenesisBlock {
    /// Input script of the genesis coinbase: the difficulty marker, the
    /// number 4 and the headline.
    pub fn coinbase_script_sig() -> Vec<u8> {
        let mut script = Vec::new();
        push_slice(&mut script, &script_num(486604799));
        push_slice(&mut script, &script_num(4));
        push_slice(&mut script, GENESIS_TIMESTAMP.as_bytes());
        script
    }

    /// Output script of the genesis coinbase: pay-to-pubkey.
    pub fn coinbase_script_pubkey() -> Vec<u8> {
        let mut script = Vec::new();
        push_slice(&mut script, &GENESIS_OUTPUT_PUBKEY);
        script.push(OP_CHECKSIG);
        script
    }

    /// Consensus serialization of the coinbase (and only) transaction.
    pub fn coinbase_bytes(&self) -> Vec<u8> {
        let script_sig = GenesisBlock::coinbase_script_sig();
        let script_pubkey = GenesisBlock::coinbase_script_pubkey();

        let mut tx = Vec::with_capacity(script_sig.len() + script_pubkey.len() + 64);
        tx.extend_from_slice(&1i32.to_le_bytes());
        // Inputs
        write_compact_size(&mut tx, 1);
        tx.extend_from_slice(&[0u8; 32]);
        tx.extend_from_slice(&0xFFFFFFFFu32.to_le_bytes());
        write_compact_size(&mut tx, script_sig.len());
        tx.extend_from_slice(&script_sig);
        tx.extend_from_slice(&MAX_SEQUENCE.to_le_bytes());
        // Outputs
        write_compact_size(&mut tx, 1);
        tx.extend_from_slice(&(self.reward.as_sat() as i64).to_le_bytes());
        write_compact_size(&mut tx, script_pubkey.len());
        tx.extend_from_slice(&script_pubkey);
        // Lock time
        tx.extend_from_slice(&0u32.to_le_bytes());
        tx
    }

    /// The merkle root of the single-transaction genesis block, i.e. the
    /// coinbase txid.
    pub fn merkle_root(&self) -> sha256d::Hash {
        sha256d::Hash::hash(&self.coinbase_bytes())
    }

    /// Consensus serialization of the 80-byte genesis header.
    pub fn header_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut header = [0u8; HEADER_SIZE];
        header[0..4].copy_from_slice(&self.version.to_le_bytes());
        // previous block hash stays all zeroes
        header[36..68].copy_from_slice(&self.merkle_root()[..]);
        header[68..72].copy_from_slice(&self.time.to_le_bytes());
        header[72..76].copy_from_slice(&self.bits.to_le_bytes());
        header[76..80].copy_from_slice(&self.nonce.to_le_bytes());
        header
    }

    /// Checks the derived merkle root against the pinned value.
    pub fn verify_merkle_root(&self) -> Result<(), GenesisError> {
        let found = self.merkle_root();
        if found != self.expected_merkle_root {
            return Err(GenesisError::MerkleRootMismatch {
                expected: self.expected_merkle_root,
                found,
            });
        }
        Ok(())
    }

    /// The Quark hash of the genesis header.
    pub fn block_hash(&self) -> sha256d::Hash {
        QuarkHasher.header_hash(&self.header_bytes())
    }

    /// Checks the merkle root and, when one is pinned, the block hash
    /// computed by `hasher`. Returns the computed block hash.
    pub fn verify_with(&self, hasher: &dyn HeaderHasher) -> Result<sha256d::Hash, GenesisError> {
        self.verify_merkle_root()?;
        let found = hasher.header_hash(&self.header_bytes());
        match self.expected_hash {
            Some(expected) if expected != found => {
                Err(GenesisError::BlockHashMismatch { expected, found })
            }
            _ => Ok(found),
        }
    }

    /// [`verify_with`](GenesisBlock::verify_with) using Quark.
    pub fn verify(&self) -> Result<sha256d::Hash, GenesisError> {
        self.verify_with(&QuarkHasher)
    }
}

#[cfg(test)]
mod test {
    use hashes::{sha256d, Hash};
    use hex::decode as hex_decode;

    use super::{script_num, GenesisBlock, GenesisError, HeaderHasher, GENESIS_REWARD};
    use crate::network::constants::Network;
    use crate::test_helpers::{main_params, params_for};
    use crate::util::amount::Amount;
    use crate::util::{hash_from_display_hex, hash_to_display_hex};

    struct Pinned(sha256d::Hash);

    impl HeaderHasher for Pinned {
        fn header_hash(&self, _header: &[u8]) -> sha256d::Hash {
            self.0
        }
    }

    struct DoubleSha;

    impl HeaderHasher for DoubleSha {
        fn header_hash(&self, header: &[u8]) -> sha256d::Hash {
            sha256d::Hash::hash(header)
        }
    }

    const MAIN_HASH: &str = "00000fe79c10addf7e023042d3ef98ce24d36262ae7c05c46c085c1ee14434d1";

    #[test]
    fn script_numbers() {
        assert_eq!(script_num(0), Vec::<u8>::new());
        assert_eq!(script_num(4), vec![0x04]);
        assert_eq!(script_num(127), vec![0x7f]);
        assert_eq!(script_num(128), vec![0x80, 0x00]);
        assert_eq!(script_num(-1), vec![0x81]);
        assert_eq!(script_num(-128), vec![0x80, 0x80]);
        assert_eq!(script_num(486604799), vec![0xff, 0xff, 0x00, 0x1d]);
    }

    #[test]
    fn genesis_first_transaction() {
        assert_eq!(GenesisBlock::coinbase_script_sig(),
                   hex_decode("04ffff001d01042d5072696d6553746f6e652047656e6573697320426c6f636b3a20323031382f31322f32382031323a33303a3030").unwrap());
        assert_eq!(GenesisBlock::coinbase_script_pubkey(),
                   hex_decode("41041f5ae176fb57fb89375f57e8e3a701a4f516235327580da9a7c0130d2a7b8c5accc644cd2e9bf3104cfcdb861ce2e336ff31b81473620568e886c7c437ddf954ac").unwrap());

        let gen = main_params().genesis;
        assert_eq!(gen.reward, GENESIS_REWARD);
        assert_eq!(gen.reward, Amount::ZERO);
        assert_eq!(gen.coinbase_bytes(),
                   hex_decode("01000000010000000000000000000000000000000000000000000000000000000000000000ffffffff3504ffff001d01042d5072696d6553746f6e652047656e6573697320426c6f636b3a20323031382f31322f32382031323a33303a3030ffffffff0100000000000000004341041f5ae176fb57fb89375f57e8e3a701a4f516235327580da9a7c0130d2a7b8c5accc644cd2e9bf3104cfcdb861ce2e336ff31b81473620568e886c7c437ddf954ac00000000").unwrap());
    }

    #[test]
    fn main_genesis_merkle_root() {
        let gen = main_params().genesis;
        assert_eq!(
            hash_to_display_hex(&gen.merkle_root()),
            "50c1eda15daf3fb9c6f0a08ab64906d302abc01d57300cf8194c4b2a544bec12"
        );
        assert_eq!(gen.verify_merkle_root(), Ok(()));
    }

    #[test]
    fn main_genesis_header() {
        let gen = main_params().genesis;
        assert_eq!(gen.header_bytes().to_vec(),
                   hex_decode("01000000000000000000000000000000000000000000000000000000000000000000000012ec4b542a4b4c19f80c30571dc0ab02d30649b68aa0f0c6b93faf5da1edc15050a1255cf0ff0f1e5cb41100").unwrap());
        assert_eq!(gen.version, 1);
        assert_eq!(gen.time, 1545970000);
        assert_eq!(gen.bits, 0x1e0ffff0);
        assert_eq!(gen.nonce, 1160284);
        assert_eq!(gen.expected_hash, Some(hash_from_display_hex(MAIN_HASH).unwrap()));
        assert_eq!(hash_to_display_hex(&gen.block_hash()), MAIN_HASH);
        assert_eq!(gen.verify(), Ok(gen.block_hash()));
    }

    #[test]
    fn every_network_reproduces_its_merkle_root() {
        for net in Network::ALL.iter() {
            let gen = params_for(*net).genesis;
            assert_eq!(gen.verify_merkle_root(), Ok(()), "{}", net);
            assert!(gen.verify().is_ok(), "{}", net);
        }
    }

    #[test]
    fn derived_networks_pin_no_hash() {
        let test = params_for(Network::Testnet).genesis;
        assert_eq!(test.expected_hash, None);
        assert_eq!((test.time, test.nonce, test.bits), (1536062401, 110098, 0x1e0ffff0));
        assert_eq!(test.header_bytes()[68..].to_vec(), hex_decode("c1738e5bf0ff0f1e12ae0100").unwrap());

        let reg = params_for(Network::Regtest).genesis;
        assert_eq!(reg.expected_hash, None);
        assert_eq!((reg.time, reg.nonce, reg.bits), (1454124731, 5, 0x1e0ffff0));
        assert_eq!(reg.header_bytes()[68..].to_vec(), hex_decode("bb2eac56f0ff0f1e05000000").unwrap());
        assert_eq!(reg.merkle_root(), main_params().genesis.merkle_root());
    }

    #[test]
    fn verify_with_plugged_hasher() {
        let gen = main_params().genesis;
        let main_hash = hash_from_display_hex(MAIN_HASH).unwrap();
        assert_eq!(gen.verify_with(&Pinned(main_hash)), Ok(main_hash));

        // Version 1 headers are not hashed with double SHA-256.
        let sha = sha256d::Hash::hash(&gen.header_bytes());
        assert_eq!(
            gen.verify_with(&DoubleSha),
            Err(GenesisError::BlockHashMismatch { expected: main_hash, found: sha })
        );

        // Without a pinned hash any hasher passes.
        let reg = params_for(Network::Regtest).genesis;
        assert_eq!(reg.verify_with(&DoubleSha), Ok(sha256d::Hash::hash(&reg.header_bytes())));
    }

    #[test]
    fn tampered_genesis_is_rejected() {
        let mut gen = main_params().genesis;
        gen.reward = Amount::ONE_KKC;
        match gen.verify_merkle_root() {
            Err(GenesisError::MerkleRootMismatch { expected, .. }) => {
                assert_eq!(expected, gen.expected_merkle_root)
            }
            other => panic!("unexpected result {:?}", other),
        }
        assert!(gen.verify().is_err());

        let mut gen = main_params().genesis;
        gen.nonce += 1;
        assert_eq!(gen.verify_merkle_root(), Ok(()));
        match gen.verify() {
            Err(GenesisError::BlockHashMismatch { found, .. }) => assert_eq!(found, gen.block_hash()),
            other => panic!("unexpected result {:?}", other),
        }
    }
}

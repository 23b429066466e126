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
// Changes for rust-tapyrus is licensed as below.
// Copyright (c) 2019 Chaintope Inc.
// Distributed under the MIT software license, see the accompanying
// file COPYING or http://www.opensource.org/licenses/mit-license.php.
//

//! Consensus parameters
//!
//! This module provides predefined set of parameters for different chains.
//!
//! Main parameters are written out in full. Testnet starts from a copy of
//! Main and overrides a listed set of fields, Regtest starts from a copy of
//! Testnet the same way. Every field stays a plain value.
//!

use hashes::hex::{self, FromHex};
use rug::Integer;

use crate::blockdata::constants::{GenesisBlock, DISABLED_HEIGHT, GENESIS_REWARD};
use crate::consensus::checkpoints::{Checkpoints, SyncStats};
use crate::network::constants::Network;
use crate::util::amount::Amount;
use crate::util::Error;

/// The RSA-2048 challenge number, the accumulator modulus of every network.
pub const ZEROCOIN_MODULUS: &str = "25195908475657893494027183240048398571429282126204032027777137836043662020707595556264018525880784406918290641249515082189298559149176184502808489120072844992687392807287776735971418347270261896375014971824691165077613379859095700097330459748808428401797429100642458691817195118746121515172654632282216869987549182422433637259085141865462043576798423387184774447920739934236584823824281198163815010674810451660377306056201619676256133844143603833904414952634432190114657544454178424020924616515723350778707749817125772467962926386356373289912154831438167899885040445364023527381951378636564391212010397122822120720357";

const MAIN_GENESIS_HASH: &str = "00000fe79c10addf7e023042d3ef98ce24d36262ae7c05c46c085c1ee14434d1";
const GENESIS_MERKLE_ROOT: &str = "50c1eda15daf3fb9c6f0a08ab64906d302abc01d57300cf8194c4b2a544bec12";
/// Testnet and Regtest pin the value one at height zero, which no block hashes to.
const PLACEHOLDER_CHECKPOINT: &str = "0000000000000000000000000000000000000000000000000000000000000001";

const MAIN_CHECKPOINTS: [(u32, &str); 7] = [
    (0, MAIN_GENESIS_HASH),
    (50, "000000588e9fc1ef432d1a656958be1dd44cd2b9e2322a80f2e35817283d575e"),
    (2000, "0000002802c61a1ce8021322e5ee67465ad118c7db76ffb244bb096be720a439"),
    (5000, "000000313c1d849f6c6ae1cad1b10e5a2e56da6593c1ba658b7152b644b4cf91"),
    (10000, "000000000003ca43cf16ab5d4ebdaccc6f0ee6108bfaa0b149e070208e1263ac"),
    (167000, "cdeba371d09cbad641d135eb180d98de22c2aa5dda25625e791359daa60fc2f6"),
    (560000, "e2ca342dbe73671b62f8c4b48a0bafaebae28c7134c163d956ede7fd5c97be08"),
];

/// Address and key encoding prefixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Base58Prefixes {
    /// Pay-to-pubkey-hash address
    pub pubkey_address: Vec<u8>,
    /// Pay-to-script-hash address
    pub script_address: Vec<u8>,
    /// Cold staking address
    pub staking_address: Vec<u8>,
    /// WIF private key
    pub secret_key: Vec<u8>,
    /// BIP32 extended public key
    pub ext_public_key: Vec<u8>,
    /// BIP32 extended private key
    pub ext_secret_key: Vec<u8>,
    /// BIP44 coin type
    pub ext_coin_type: Vec<u8>,
}

/// Governance signing keys and their rotation schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SporkKeys {
    /// Current key, uncompressed hex
    pub current: String,
    /// Key being rotated out, uncompressed hex
    pub previous: String,
    /// Sporks signed at or after this time must use the current key
    pub enforce_new_after: i64,
    /// From this time on the previous key is no longer accepted at all
    pub reject_old_after: i64,
}

impl SporkKeys {
    /// Decodes the current key.
    pub fn current_key(&self) -> Result<secp256k1::PublicKey, Error> {
        decode_pubkey(&self.current)
    }

    /// Decodes the previous key.
    pub fn previous_key(&self) -> Result<secp256k1::PublicKey, Error> {
        decode_pubkey(&self.previous)
    }

    /// Keys a spork signed at `time_signed` may carry a signature of, judged
    /// at local time `now`. The current key always comes first.
    pub fn accepted_spork_keys(&self, time_signed: i64, now: i64) -> Result<Vec<secp256k1::PublicKey>, Error> {
        let mut keys = vec![self.current_key()?];
        if time_signed < self.enforce_new_after && now < self.reject_old_after {
            keys.push(self.previous_key()?);
        }
        Ok(keys)
    }
}

fn decode_pubkey(s: &str) -> Result<secp256k1::PublicKey, Error> {
    let bytes = Vec::<u8>::from_hex(s)?;
    Ok(secp256k1::PublicKey::from_slice(&bytes)?)
}

/// Decodes whole hex byte pairs; a trailing odd digit is dropped.
fn hex_pairs(s: &str) -> Result<Vec<u8>, hex::Error> {
    Vec::<u8>::from_hex(&s[..s.len() & !1])
}

/// Parameters that influence chain consensus.
#[derive(Debug, Clone, PartialEq)]
pub struct Params {
    /// Network for which parameters are valid.
    pub network: Network,
    /// Message-start bytes prefixing every P2P message
    pub message_start: [u8; 4],
    /// Default P2P port
    pub default_port: u16,
    /// Key alert messages are signed with. Kept as raw bytes, the test
    /// network key is not a curve point.
    pub alert_pubkey: Vec<u8>,

    /// Proof-of-work difficulty ceiling
    pub pow_limit: Integer,
    /// Proof-of-stake difficulty ceiling before time protocol v2
    pub pos_limit: Integer,
    /// Proof-of-stake difficulty ceiling from time protocol v2 on
    pub pos_limit_v2: Integer,

    /// Blocks out of the last `to_check_block_upgrade_majority` needed to
    /// enforce an upgrade
    pub enforce_block_upgrade_majority: u32,
    /// Blocks out of the last `to_check_block_upgrade_majority` needed to
    /// reject outdated blocks
    pub reject_block_outdated_majority: u32,
    /// Window of the upgrade majority count
    pub to_check_block_upgrade_majority: u32,

    /// Blocks between subsidy halvings
    pub subsidy_halving_interval: u32,
    /// Default number of mining threads, `0` for one per core
    pub miner_threads: u32,

    /// Target seconds between blocks
    pub target_spacing: i64,
    /// Legacy retarget window in seconds
    pub target_timespan: i64,
    /// Retarget window in seconds from time protocol v2 on
    pub target_timespan_v2: i64,
    /// Block timestamp slot length in seconds
    pub time_slot_length: i64,
    /// Future drift allowed for proof-of-work blocks
    pub future_time_drift_pow: i64,
    /// Future drift allowed for proof-of-stake blocks before time protocol v2
    pub future_time_drift_pos: i64,
    /// Minimum stake age in seconds before stake modifier v2
    pub stake_min_age: i64,
    /// Minimum stake depth in blocks from stake modifier v2 on
    pub stake_min_depth: u32,
    /// Confirmations before a coinbase or coinstake may be spent
    pub coinbase_maturity: u32,
    /// Deepest reorganization the node accepts
    pub max_reorganization_depth: u32,
    /// Tolerance on the masternode count when paying masternodes
    pub masternode_count_drift: u32,
    /// Upper bound on total money supply
    pub max_money_out: Amount,
    /// Smallest output a cold staking contract may lock
    pub min_cold_staking_amount: Amount,

    /// Last block that may be mined with proof of work
    pub last_pow_block: u32,
    /// Time of the one block whose difficulty bits are not validated
    pub bad_block_time: i64,
    /// Difficulty bits that block carries
    pub bad_block_bits: u32,
    /// Stake modifier update height
    pub modifier_update_block: u32,
    /// Depth-based stake eligibility activation
    pub block_stake_modifier_v2: u32,
    /// Absolute lock time activation
    pub block_bip65: u32,
    /// Slotted timestamp activation
    pub block_time_protocol_v2: u32,
    /// Signed message format upgrade, follows time protocol v2
    pub block_enforce_new_message_signatures: u32,
    /// Block version 7 start, follows time protocol v2
    pub block_v7_start_height: u32,
    /// First zerocoin block height
    pub zerocoin_start_height: u32,
    /// First zerocoin block time
    pub zerocoin_start_time: i64,
    /// Zerocoin v2 activation
    pub block_zerocoin_v2: u32,
    /// Public coin spend activation
    pub block_public_coin_spend: u32,
    /// Serial range check activation
    pub block_enforce_serial_range: u32,
    /// Height the accumulators are recalculated at
    pub block_recalculate_accumulators: u32,
    /// First block with fraudulent mints
    pub block_first_fraudulent: u32,
    /// Last accumulator checkpoint before the fraudulent mints
    pub block_last_good_checkpoint: u32,
    /// Invalid outpoint enforcement
    pub block_enforce_invalid_utxo: u32,
    /// Amount of the invalid outputs filtered from the supply
    pub invalid_amount_filtered: Amount,
    /// Height where a denomination was accumulated twice
    pub block_double_accumulated: u32,
    /// Last accumulator checkpoint ever written
    pub block_last_accumulator_checkpoint: u32,
    /// Last block of the fake serial attack
    pub fake_serial_block_height_end: Option<u32>,
    /// Money supply before the fake serial attack
    pub supply_before_fake_serial: Amount,

    /// Accumulator modulus, in decimal
    pub zerocoin_modulus: &'static str,
    /// Most private zerocoin spends per transaction
    pub max_zerocoin_spends_per_transaction: u32,
    /// Most public zerocoin spends per transaction
    pub max_zerocoin_public_spends_per_transaction: u32,
    /// Fee of a zerocoin mint
    pub min_zerocoin_mint_fee: Amount,
    /// Confirmations before a mint may be spent
    pub mint_required_confirmations: u32,
    /// Mints that must be accumulated before a spend
    pub required_accumulation: u32,
    /// Security level of the spend proofs
    pub zerocoin_security_level: u32,
    /// Header version introducing the accumulator checkpoint
    pub zerocoin_header_version: i32,
    /// Depth a mint needs before it may stake
    pub zerocoin_required_stake_depth: u32,

    /// Address and key encoding prefixes
    pub base58_prefixes: Base58Prefixes,

    /// Obfuscation pool size limit
    pub pool_max_transactions: u32,
    /// Blocks per budget cycle
    pub budget_cycle_blocks: u32,
    /// Confirmations of a budget finalization fee
    pub budget_fee_confirmations: u32,
    /// Minimum age in seconds of a proposal before it may be paid
    pub proposal_establishment_time: i64,
    /// Time masternode payments started
    pub start_masternode_payments: i64,
    /// Address used as the output of obfuscation pool collateral checks
    pub obfuscation_pool_dummy_address: &'static str,

    /// Governance signing keys
    pub spork_keys: SporkKeys,

    /// Genesis block descriptor
    pub genesis: GenesisBlock,
    /// Pinned history
    pub checkpoints: Checkpoints,

    /// Whether mining waits for peers
    pub mining_requires_peers: bool,
    /// Whether minimum difficulty blocks are allowed
    pub allow_min_difficulty_blocks: bool,
    /// Whether expensive consistency checks are on by default
    pub default_consistency_checks: bool,
    /// Whether standard-transaction policy is enforced
    pub require_standard: bool,
    /// Whether blocks are mined only on request
    pub mine_blocks_on_demand: bool,
    /// Whether proof-of-work checks may be skipped
    pub skip_proof_of_work_check: bool,
    /// Whether headers-first sync is active
    pub headers_first_syncing_active: bool,
    /// Whether RPC reports fields deprecated on testnet
    pub testnet_to_be_deprecated_field_rpc: bool,
}

impl Params {
    /// Creates parameters set for the given network.
    ///
    /// Only fails if a compiled-in hash constant is malformed.
    pub fn new(network: Network) -> Result<Self, hex::Error> {
        let main = Params::mainnet()?;
        match network {
            Network::Main => Ok(main),
            Network::Testnet => Params::testnet(&main),
            Network::Regtest => Params::regtest(&Params::testnet(&main)?),
        }
    }

    fn mainnet() -> Result<Params, hex::Error> {
        let block_time_protocol_v2 = 575000;
        Ok(Params {
            network: Network::Main,
            message_start: Network::Main.message_start(),
            default_port: Network::Main.default_port(),
            alert_pubkey: hex_pairs("04c2c3cca22211d722d46e91ec78de67e13ea86b03fffab53609b90ed641a0770772d1780e59b65b9f22de7ac704b3dd31f7182c1ddb537e4024af2676155814e1")?,

            pow_limit: (Integer::from(1) << 236) - 1u32,
            pos_limit: (Integer::from(1) << 232) - 1u32,
            pos_limit_v2: (Integer::from(1) << 236) - 1u32,

            enforce_block_upgrade_majority: 5040,
            reject_block_outdated_majority: 6384,
            to_check_block_upgrade_majority: 6720,

            subsidy_halving_interval: 259000,
            miner_threads: 0,

            target_spacing: 90,
            target_timespan: 40 * 60,
            target_timespan_v2: 2 * 15 * 60,
            time_slot_length: 15,
            future_time_drift_pow: 7200,
            future_time_drift_pos: 180,
            stake_min_age: 60 * 60,
            stake_min_depth: 600,
            coinbase_maturity: 25,
            max_reorganization_depth: 100,
            masternode_count_drift: 20,
            max_money_out: Amount::from_kkc(60_000_000),
            min_cold_staking_amount: Amount::ONE_KKC,

            last_pow_block: 13440,
            bad_block_time: 1471401614,
            bad_block_bits: 0x1c056dac,
            modifier_update_block: 570000,
            block_stake_modifier_v2: 572000,
            block_bip65: 573000,
            block_time_protocol_v2,
            block_enforce_new_message_signatures: block_time_protocol_v2,
            block_v7_start_height: block_time_protocol_v2,
            zerocoin_start_height: 260000,
            zerocoin_start_time: 1567339200,
            block_zerocoin_v2: 565000,
            block_public_coin_spend: 1880000,
            block_enforce_serial_range: DISABLED_HEIGHT,
            block_recalculate_accumulators: DISABLED_HEIGHT,
            block_first_fraudulent: DISABLED_HEIGHT,
            block_last_good_checkpoint: DISABLED_HEIGHT,
            block_enforce_invalid_utxo: DISABLED_HEIGHT,
            invalid_amount_filtered: Amount::ONE_KKC,
            block_double_accumulated: DISABLED_HEIGHT,
            block_last_accumulator_checkpoint: 1686240,
            fake_serial_block_height_end: Some(DISABLED_HEIGHT),
            supply_before_fake_serial: Amount::from_kkc(u64::from(DISABLED_HEIGHT)),

            zerocoin_modulus: ZEROCOIN_MODULUS,
            max_zerocoin_spends_per_transaction: 7,
            max_zerocoin_public_spends_per_transaction: 637,
            min_zerocoin_mint_fee: Amount::CENT,
            mint_required_confirmations: 20,
            required_accumulation: 1,
            zerocoin_security_level: 100,
            zerocoin_header_version: 4,
            zerocoin_required_stake_depth: 200,

            base58_prefixes: Base58Prefixes {
                pubkey_address: vec![56],
                script_address: vec![118],
                staking_address: vec![63],
                secret_key: vec![212],
                ext_public_key: vec![0x02, 0x2D, 0x25, 0x33],
                ext_secret_key: vec![0x02, 0x21, 0x31, 0x2B],
                ext_coin_type: vec![0x80, 0x00, 0x00, 0x77],
            },

            pool_max_transactions: 3,
            budget_cycle_blocks: 28800,
            budget_fee_confirmations: 6,
            proposal_establishment_time: 60 * 60 * 24,
            start_masternode_payments: 1403728576,
            obfuscation_pool_dummy_address: "D87q2gC9j6nNrnzCsg4aY6bHMLsT9nUhEw",

            spork_keys: SporkKeys {
                current: "041c900e457f6a33af917f5b4d4a810a259439252059d26dca8fac84137841223c78f8fa7e4259ec35ee641f7bfe0a440736f4730d63a4d26077868328de16b63c".to_owned(),
                previous: "04e2be89e67bde8af162843518cecbb6ad9b58ec99021221d61df591f7ea531e2086d5202d39c0b88198366e7cbe80b185b6409c7410aa6827ad4429f5ce1005d0".to_owned(),
                enforce_new_after: 1575115200,
                reject_old_after: 1577707200,
            },

            genesis: GenesisBlock {
                version: 1,
                time: 1545970000,
                bits: 0x1e0ffff0,
                nonce: 1160284,
                reward: GENESIS_REWARD,
                expected_hash: Some(FromHex::from_hex(MAIN_GENESIS_HASH)?),
                expected_merkle_root: FromHex::from_hex(GENESIS_MERKLE_ROOT)?,
            },
            checkpoints: Checkpoints::from_hex(
                &MAIN_CHECKPOINTS,
                SyncStats {
                    last_checkpoint_time: 1580092363,
                    transactions_last_checkpoint: 1200000,
                    transactions_per_day: 2000.0,
                },
            )?,

            mining_requires_peers: true,
            allow_min_difficulty_blocks: false,
            default_consistency_checks: false,
            require_standard: true,
            mine_blocks_on_demand: false,
            skip_proof_of_work_check: false,
            headers_first_syncing_active: false,
            testnet_to_be_deprecated_field_rpc: false,
        })
    }

    fn testnet(main: &Params) -> Result<Params, hex::Error> {
        let mut params = main.clone();
        params.network = Network::Testnet;
        params.message_start = Network::Testnet.message_start();
        params.alert_pubkey = hex_pairs("000010e83b2703ccf322f7dbd62dd5855ac7c10bd055814ce121ba32607d573b8810c02c0582aed05b4deb9c4b77b26d92428c61256cd42774babea0a073b2ed0c9")?;
        params.default_port = Network::Testnet.default_port();
        params.enforce_block_upgrade_majority = 4320;
        params.reject_block_outdated_majority = 5472;
        params.to_check_block_upgrade_majority = 5760;
        params.miner_threads = 0;
        params.last_pow_block = 200;
        params.bad_block_time = 1489001494;
        params.bad_block_bits = 0x1e0a20bd;
        params.coinbase_maturity = 15;
        params.stake_min_depth = 100;
        params.masternode_count_drift = 4;
        params.modifier_update_block = 51197;
        params.max_money_out = Amount::from_kkc(43_199_500);
        params.zerocoin_start_height = 201576;
        params.zerocoin_start_time = 1501776000;
        params.block_enforce_serial_range = 1;
        params.block_recalculate_accumulators = 9908000;
        params.block_first_fraudulent = 9891737;
        params.block_last_good_checkpoint = 9891730;
        params.block_enforce_invalid_utxo = 9902850;
        params.invalid_amount_filtered = Amount::ZERO;
        params.block_zerocoin_v2 = 444020;
        params.spork_keys.enforce_new_after = 1521604800;
        params.spork_keys.reject_old_after = 1522454400;
        params.block_stake_modifier_v2 = 1214000;
        params.block_bip65 = 851019;
        params.block_time_protocol_v2 = 1347000;
        params.block_public_coin_spend = 1106100;
        params.block_enforce_new_message_signatures = params.block_time_protocol_v2;
        params.block_last_accumulator_checkpoint = params.block_public_coin_spend - 10;
        params.block_v7_start_height = params.block_time_protocol_v2;
        params.fake_serial_block_height_end = None;
        params.supply_before_fake_serial = Amount::ZERO;

        params.genesis.time = 1536062401;
        params.genesis.nonce = 110098;
        params.genesis.expected_hash = None;

        params.base58_prefixes = Base58Prefixes {
            pubkey_address: vec![90],
            script_address: vec![199],
            staking_address: vec![73],
            secret_key: vec![247],
            ext_public_key: vec![0x3a, 0x80, 0x61, 0xa0],
            ext_secret_key: vec![0x3a, 0x80, 0x58, 0x37],
            ext_coin_type: vec![0x80, 0x00, 0x00, 0x01],
        };

        params.mining_requires_peers = false;
        params.allow_min_difficulty_blocks = true;
        params.default_consistency_checks = false;
        params.require_standard = true;
        params.mine_blocks_on_demand = false;
        params.testnet_to_be_deprecated_field_rpc = true;

        params.pool_max_transactions = 2;
        params.budget_cycle_blocks = 144;
        params.spork_keys.current = "04A8B319388C0F8588D238B9941DC26B26D3F9465266B368A051C5C100F79306A557780101FE2192FE170D7E6DEFDCBEE4C8D533396389C0DAFFDBC842B002243C".to_owned();
        params.spork_keys.previous = "04348C2F50F90267E64FACC65BFDC9D0EB147D090872FB97ABAE92E9A36E6CA60983E28E741F8E7277B11A7479B626AC115BA31463AC48178A5075C5A9319D4A38".to_owned();
        params.obfuscation_pool_dummy_address = "y57cqfGRkekRyDRNeJiLtYVEbvhXrNbmox";
        params.start_masternode_payments = 1420837558;
        params.budget_fee_confirmations = 3;
        params.proposal_establishment_time = 60 * 5;

        params.checkpoints = Checkpoints::from_hex(
            &[(0, PLACEHOLDER_CHECKPOINT)],
            SyncStats { last_checkpoint_time: 1740710, transactions_last_checkpoint: 0, transactions_per_day: 250.0 },
        )?;
        Ok(params)
    }

    fn regtest(testnet: &Params) -> Result<Params, hex::Error> {
        let mut params = testnet.clone();
        params.network = Network::Regtest;
        params.message_start = Network::Regtest.message_start();
        params.default_port = Network::Regtest.default_port();
        params.subsidy_halving_interval = 150;
        params.enforce_block_upgrade_majority = 750;
        params.reject_block_outdated_majority = 950;
        params.to_check_block_upgrade_majority = 1000;
        params.miner_threads = 1;
        params.pow_limit = (Integer::from(1) << 255) - 1u32;
        params.last_pow_block = 250;
        params.coinbase_maturity = 100;
        params.stake_min_age = 0;
        params.stake_min_depth = 0;
        params.masternode_count_drift = 4;
        params.modifier_update_block = 0;
        params.max_money_out = Amount::from_kkc(43_199_500);
        params.zerocoin_start_height = 300;
        params.block_zerocoin_v2 = 300;
        params.zerocoin_start_time = 1501776000;
        params.block_enforce_serial_range = 1;
        params.block_recalculate_accumulators = 999_999_999;
        params.block_first_fraudulent = 999_999_999;
        params.block_last_good_checkpoint = 999_999_999;
        params.block_stake_modifier_v2 = params.last_pow_block + 1;
        params.block_time_protocol_v2 = 999_999_999;
        params.mint_required_confirmations = 10;
        params.zerocoin_required_stake_depth = params.mint_required_confirmations;
        params.block_public_coin_spend = 350;
        params.block_v7_start_height = params.block_zerocoin_v2;
        params.block_last_accumulator_checkpoint = params.block_zerocoin_v2 + 1;
        params.block_enforce_new_message_signatures = 1;
        params.fake_serial_block_height_end = None;

        params.genesis.time = 1454124731;
        params.genesis.nonce = 5;

        params.mining_requires_peers = false;
        params.allow_min_difficulty_blocks = true;
        params.default_consistency_checks = true;
        params.require_standard = false;
        params.mine_blocks_on_demand = true;
        params.skip_proof_of_work_check = true;
        params.testnet_to_be_deprecated_field_rpc = false;

        params.spork_keys.current = "043969b1b0e6f327de37f297a015d37e2235eaaeeb3933deecd8162c075cee0207b13537618bde640879606001a8136091c62ec272dd0133424a178704e6e75bb7".to_owned();

        params.checkpoints = Checkpoints::from_hex(
            &[(0, PLACEHOLDER_CHECKPOINT)],
            SyncStats { last_checkpoint_time: 1434124731, transactions_last_checkpoint: 0, transactions_per_day: 100.0 },
        )?;
        Ok(params)
    }
}

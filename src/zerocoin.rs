// Copyright (c) 2020 Chaintope Inc.
// Distributed under the MIT software license, see the accompanying
// file COPYING or http://www.opensource.org/licenses/mit-license.php.


//! Zerocoin domain parameters
//!
//! The group parameters the zerocoin proofs run in are derived
//! deterministically from the accumulator modulus embedded in the chain
//! parameters. The modulus string can be read as hexadecimal (the legacy
//! reading) or as decimal; the two readings are different numbers and both
//! are needed, since proofs on chain were made against either.
//!
//! Each group is seeded with a double SHA-256 over the modulus, the
//! protocol version, the security level and a group label. Primes come from
//! the Shawe-Taylor construction in [`crate::util::prime`], generators from
//! NIST FIPS 186-3 appendix A.2.3.
//!
//! Derivation is expensive. [`ZerocoinProvider`] performs it at most once
//! per reading and hands out the cached result afterwards.
//!

use std::sync::atomic::{AtomicUsize, Ordering};
use std::{error, fmt};

use hashes::{sha256, sha256d, Hash, HashEngine};
use once_cell::sync::OnceCell;
use rug::Integer;

use crate::util::prime::{
    calculate_hash, generate_integer_from_seed, generate_random_prime, is_prime, pocklington, Seed,
};
use crate::util::{bignum_bytes, write_compact_size};

/// Security level the domain parameters are derived at.
pub const DEFAULT_SECURITY_LEVEL: u32 = 80;

/// Protocol version mixed into every group seed.
pub const PROTOCOL_VERSION: &str = "1";

/// Smallest accepted accumulator modulus, in bits.
pub const MIN_MODULUS_BITS: u32 = 1023;

/// The accumulator base is this constant squared modulo the modulus.
pub const ACCUMULATOR_BASE_CONSTANT: u32 = 31;

/// Bits of the challenge in the accumulator proof.
pub const ACCPROOF_KPRIME: u32 = 160;
/// Bits of the statistical slack in the accumulator proof.
pub const ACCPROOF_KDPRIME: u32 = 128;

const COMMIT_GROUP: &str = "COIN_COMMITMENT_GROUP";
const AIC_GROUP: &str = "ACCUMULATOR_INTERNAL_COMMITMENT_GROUP";
const QRN_COMMIT_GROUP_G: &str = "ACCUMULATOR_QRN_COMMITMENT_GROUPG";
const QRN_COMMIT_GROUP_H: &str = "ACCUMULATOR_QRN_COMMITMENT_GROUPH";
const GENERATOR_LABEL: &str = "ggen";
const SEPARATOR: &str = "||";

/// Attempts at finding a group generator before giving up.
const MAX_GENERATOR_ATTEMPTS: u32 = 10000;
/// Cofactors tried when building a group around a given order.
const NUM_SCHNORRGEN_ATTEMPTS: u32 = 10000;

/// Zerocoin parameter derivation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The modulus string does not parse in the requested radix, or is even
    InvalidModulus(String),
    /// Security level has no group parameter lengths
    UnsupportedSecurityLevel(u32),
    /// The modulus is too short, for any group or for the security level
    ModulusTooSmall {
        /// Bits of the modulus
        bits: u32,
        /// Bits needed
        required: u32,
    },
    /// No prime or generator found for a group, or the result failed its checks
    GroupDerivation(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::InvalidModulus(ref s) => write!(f, "invalid accumulator modulus: {}", s),
            Error::UnsupportedSecurityLevel(level) => write!(f, "unsupported security level {}", level),
            Error::ModulusTooSmall { bits, required } => {
                write!(f, "{}-bit modulus too small, {} bits needed", bits, required)
            }
            Error::GroupDerivation(group) => write!(f, "could not derive the {}", group),
        }
    }
}

impl error::Error for Error {}

/// A prime-order subgroup of the integers modulo a prime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegerGroupParams {
    /// The prime modulus `p`
    pub modulus: Integer,
    /// The prime order `q` of the subgroup, `q | p - 1`
    pub group_order: Integer,
    /// First generator
    pub g: Integer,
    /// Second generator
    pub h: Integer,
}

impl IntegerGroupParams {
    /// Checks the lengths, primality and generators of the group.
    fn validate(&self, p_len: u32, q_len: u32) -> bool {
        let one_after = |x: &Integer, e: &Integer| {
            x.pow_mod_ref(e, &self.modulus).map(|r| Integer::from(r) == 1).unwrap_or(false)
        };
        let hundred = Integer::from(100);
        self.modulus.significant_bits() >= p_len
            && self.group_order.significant_bits() >= q_len
            && is_prime(&self.modulus)
            && is_prime(&self.group_order)
            && one_after(&self.g, &self.group_order)
            && one_after(&self.h, &self.group_order)
            && !one_after(&self.g, &hundred)
            && !one_after(&self.h, &hundred)
            && self.g != self.h
            && self.g != 1
    }
}

/// Two generators of the quadratic residues modulo the accumulator modulus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrnGroupParams {
    /// First generator
    pub g: Integer,
    /// Second generator
    pub h: Integer,
}

/// Derived zerocoin domain parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZerocoinParams {
    /// Whether the modulus was read as hexadecimal
    pub legacy_modulus: bool,
    /// Security level the groups were sized for
    pub security_level: u32,
    /// Length of the proof hashes, in bits
    pub zkp_hash_len: u32,
    /// Rounds of the zero knowledge proofs
    pub zkp_iterations: u32,
    /// RSA modulus of the accumulator
    pub accumulator_modulus: Integer,
    /// Group the coin commitments live in
    pub coin_commitment_group: IntegerGroupParams,
    /// Group of the serial number signature of knowledge, whose order is
    /// the coin commitment modulus
    pub serial_number_sok_commitment_group: IntegerGroupParams,
    /// Group of the accumulator proof of knowledge
    pub accumulator_pok_commitment_group: IntegerGroupParams,
    /// Quadratic residue generators modulo the accumulator modulus
    pub accumulator_qrn_commitment_group: QrnGroupParams,
    /// Accumulator starting value
    pub accumulator_base: Integer,
    /// Smallest valid coin value
    pub min_coin_value: Integer,
    /// Largest valid coin value
    pub max_coin_value: Integer,
    /// Challenge bits of the accumulator proof
    pub k_prime: u32,
    /// Slack bits of the accumulator proof
    pub k_dprime: u32,
}

/// Group parameter lengths `(p bits, q bits)` for a security level, the
/// modulus having room for `max_p_len` bits.
pub fn group_param_lengths(max_p_len: u32, security_level: u32) -> Result<(u32, u32), Error> {
    let (p_len, q_len) = match security_level {
        80 => (1024, 256),
        81..=112 => (2048, 256),
        113..=128 => (3072, 320),
        _ => return Err(Error::UnsupportedSecurityLevel(security_level)),
    };
    if p_len > max_p_len {
        return Err(Error::ModulusTooSmall { bits: max_p_len + 2, required: p_len });
    }
    Ok((p_len, q_len))
}

/// Reads the modulus string, as hexadecimal if `legacy`, else as decimal.
pub fn parse_modulus(modulus: &str, legacy: bool) -> Result<Integer, Error> {
    let radix = if legacy { 16 } else { 10 };
    let n = Integer::from_str_radix(modulus, radix)
        .map_err(|e| Error::InvalidModulus(format!("{} (radix {})", e, radix)))?;
    if n < 3 || n.is_even() {
        return Err(Error::InvalidModulus(format!("{}-bit value is not an odd modulus", n.significant_bits())));
    }
    Ok(n)
}

/// Writes a string the way the wire protocol does: length, then bytes.
fn write_str(engine: &mut sha256::HashEngine, s: &str) {
    let mut buf = Vec::with_capacity(s.len() + 1);
    write_compact_size(&mut buf, s.len());
    buf.extend_from_slice(s.as_bytes());
    engine.input(&buf);
}

fn write_bignum(engine: &mut sha256::HashEngine, n: &Integer) {
    let bytes = bignum_bytes(n);
    let mut buf = Vec::with_capacity(bytes.len() + 9);
    write_compact_size(&mut buf, bytes.len());
    buf.extend_from_slice(&bytes);
    engine.input(&buf);
}

/// Seed of the group called `group_name`, derived from `modulus`.
pub fn calculate_seed(modulus: &Integer, aux: &str, security_level: u32, group_name: &str) -> Seed {
    let mut engine = sha256d::Hash::engine();
    write_bignum(&mut engine, modulus);
    write_str(&mut engine, SEPARATOR);
    engine.input(&security_level.to_le_bytes());
    write_str(&mut engine, SEPARATOR);
    write_str(&mut engine, aux);
    write_str(&mut engine, SEPARATOR);
    write_str(&mut engine, group_name);
    Seed::from_digest(sha256d::Hash::from_engine(engine))
}

/// Seed of generator candidate `count` for generator `index`.
pub fn calculate_generator_seed(
    seed: &Seed,
    p_seed: &Seed,
    q_seed: &Seed,
    label: &str,
    index: u32,
    count: u32,
) -> Seed {
    let mut engine = sha256d::Hash::engine();
    engine.input(&seed.to_bytes());
    write_str(&mut engine, SEPARATOR);
    engine.input(&p_seed.to_bytes());
    write_str(&mut engine, SEPARATOR);
    engine.input(&q_seed.to_bytes());
    write_str(&mut engine, SEPARATOR);
    write_str(&mut engine, label);
    write_str(&mut engine, SEPARATOR);
    engine.input(&index.to_le_bytes());
    write_str(&mut engine, SEPARATOR);
    engine.input(&count.to_le_bytes());
    Seed::from_digest(sha256d::Hash::from_engine(engine))
}

/// Primes `p` of `p_len` bits and `q` of `q_len` bits with `q | p - 1`,
/// and the seeds they came from: `(p, q, p_seed, q_seed)`.
pub fn calculate_group_modulus_and_order(
    seed: &Seed,
    p_len: u32,
    q_len: u32,
) -> Option<(Integer, Integer, Seed, Seed)> {
    let (q, q_seed, _) = generate_random_prime(q_len, seed)?;

    let p0_len = p_len / 2 + 1 + p_len % 2;
    let (p0, mut p_seed, mut counter) = generate_random_prime(p0_len, &q_seed)?;
    let old_counter = counter;

    let (mut x, iterations) = generate_integer_from_seed(p_len, &p_seed);
    p_seed.advance(iterations + 1);
    x.keep_bits_mut(p_len - 1);
    x.set_bit(p_len - 1, true);

    let two_q_p0 = Integer::from(&q * &p0) << 1;
    let bound = Integer::from(1) << p_len;
    let mut t = x / &two_q_p0;
    while counter <= 4 * p_len + old_counter {
        if Integer::from(&t * &two_q_p0) + 1u32 > bound {
            t = (Integer::from(1) << (p_len - 1)) / &two_q_p0;
        }
        let p = Integer::from(&t * &two_q_p0) + 1u32;

        let (a, iterations) = generate_integer_from_seed(p_len, &p_seed);
        p_seed.advance(iterations + 1);
        let a = a % Integer::from(&p - 3u32) + 2u32;

        let two_t_q = Integer::from(&t * &q) << 1;
        if pocklington(&a, &two_t_q, &p0, &p) {
            return Some((p, q, p_seed, q_seed));
        }
        t += 1u32;
        counter += 1;
    }
    None
}

/// Generator number `index` of the order `q` subgroup modulo `p`.
pub fn calculate_group_generator(
    seed: &Seed,
    p_seed: &Seed,
    q_seed: &Seed,
    p: &Integer,
    q: &Integer,
    index: u32,
) -> Option<Integer> {
    if index > 255 {
        return None;
    }
    let e = Integer::from(p - 1u32) / q;
    for count in 1..MAX_GENERATOR_ATTEMPTS {
        let w = calculate_generator_seed(seed, p_seed, q_seed, GENERATOR_LABEL, index, count);
        let r = w.as_integer().pow_mod_ref(&e, p).map(Integer::from)?;
        if r > 1 {
            return Some(r);
        }
    }
    None
}

/// A prime-order group with `p_len` and `q_len` bit parameters, derived
/// from `seed`.
pub fn derive_integer_group_params(
    seed: &Seed,
    p_len: u32,
    q_len: u32,
    name: &'static str,
) -> Result<IntegerGroupParams, Error> {
    let (p, q, p_seed, q_seed) =
        calculate_group_modulus_and_order(seed, p_len, q_len).ok_or(Error::GroupDerivation(name))?;
    let g = calculate_group_generator(seed, &p_seed, &q_seed, &p, &q, 1).ok_or(Error::GroupDerivation(name))?;
    let h = calculate_group_generator(seed, &p_seed, &q_seed, &p, &q, 2).ok_or(Error::GroupDerivation(name))?;

    let group = IntegerGroupParams { modulus: p, group_order: q, g, h };
    if !group.validate(p_len, q_len) {
        return Err(Error::GroupDerivation(name));
    }
    Ok(group)
}

/// A group of order `order` modulo the first prime of the form
/// `2 * i * order + 1`.
pub fn derive_integer_group_from_order(order: &Integer, name: &'static str) -> Result<IntegerGroupParams, Error> {
    let seed = calculate_seed(order, "", 128, "");
    let p_seed = calculate_hash(&seed);
    let q_seed = calculate_hash(&p_seed);
    for i in 1..NUM_SCHNORRGEN_ATTEMPTS {
        let p = Integer::from(order * (2 * i)) + 1u32;
        if !is_prime(&p) {
            continue;
        }
        let g = calculate_group_generator(&seed, &p_seed, &q_seed, &p, order, 1).ok_or(Error::GroupDerivation(name))?;
        let h = calculate_group_generator(&seed, &p_seed, &q_seed, &p, order, 2).ok_or(Error::GroupDerivation(name))?;

        let group = IntegerGroupParams { modulus: p, group_order: order.clone(), g, h };
        if !group.validate(0, 0) {
            return Err(Error::GroupDerivation(name));
        }
        return Ok(group);
    }
    Err(Error::GroupDerivation(name))
}

impl ZerocoinParams {
    /// Derives all domain parameters from the modulus string.
    pub fn derive(modulus: &str, legacy: bool, security_level: u32) -> Result<ZerocoinParams, Error> {
        let n = parse_modulus(modulus, legacy)?;
        let n_len = n.significant_bits();
        if n_len < MIN_MODULUS_BITS {
            return Err(Error::ModulusTooSmall { bits: n_len, required: MIN_MODULUS_BITS });
        }
        let (p_len, q_len) = group_param_lengths(n_len - 2, security_level)?;
        let seed = |group: &str| calculate_seed(&n, PROTOCOL_VERSION, security_level, group);

        let coin_commitment_group =
            derive_integer_group_params(&seed(COMMIT_GROUP), p_len, q_len, "coin commitment group")?;
        let serial_number_sok_commitment_group =
            derive_integer_group_from_order(&coin_commitment_group.modulus, "serial number commitment group")?;
        let accumulator_pok_commitment_group = derive_integer_group_params(
            &seed(AIC_GROUP),
            q_len + 300,
            q_len + 1,
            "accumulator proof of knowledge group",
        )?;

        let qrn = |group: &str| {
            let (x, _) = generate_integer_from_seed(n_len - 1, &seed(group));
            Integer::from(x.square_ref()) % &n
        };
        let accumulator_qrn_commitment_group = QrnGroupParams { g: qrn(QRN_COMMIT_GROUP_G), h: qrn(QRN_COMMIT_GROUP_H) };

        let accumulator_base = Integer::from(ACCUMULATOR_BASE_CONSTANT * ACCUMULATOR_BASE_CONSTANT) % &n;
        if accumulator_base == 1 {
            return Err(Error::GroupDerivation("accumulator base"));
        }

        let max_coin_value = coin_commitment_group.modulus.clone();
        let min_coin_value = Integer::from(1) << (coin_commitment_group.modulus.significant_bits() / 2 + 3);

        Ok(ZerocoinParams {
            legacy_modulus: legacy,
            security_level,
            zkp_hash_len: security_level,
            zkp_iterations: security_level,
            accumulator_modulus: n,
            coin_commitment_group,
            serial_number_sok_commitment_group,
            accumulator_pok_commitment_group,
            accumulator_qrn_commitment_group,
            accumulator_base,
            min_coin_value,
            max_coin_value,
            k_prime: ACCPROOF_KPRIME,
            k_dprime: ACCPROOF_KDPRIME,
        })
    }
}
/// Lazily derived domain parameters of one modulus, in both readings.
#[derive(Debug)]
pub struct ZerocoinProvider {
    modulus: String,
    security_level: u32,
    legacy: OnceCell<ZerocoinParams>,
    current: OnceCell<ZerocoinParams>,
    derivations: AtomicUsize,
}

impl ZerocoinProvider {
    /// Provider for `modulus` at the default security level.
    pub fn new<S: Into<String>>(modulus: S) -> ZerocoinProvider {
        ZerocoinProvider::with_security_level(modulus, DEFAULT_SECURITY_LEVEL)
    }

    /// Provider for `modulus` at `security_level`.
    pub fn with_security_level<S: Into<String>>(modulus: S, security_level: u32) -> ZerocoinProvider {
        ZerocoinProvider {
            modulus: modulus.into(),
            security_level,
            legacy: OnceCell::new(),
            current: OnceCell::new(),
            derivations: AtomicUsize::new(0),
        }
    }

    /// The parameters of the hexadecimal reading if `use_legacy`, else of the
    /// decimal one. Derived on the first call, concurrent callers wait for it.
    pub fn params(&self, use_legacy: bool) -> Result<&ZerocoinParams, Error> {
        let cell = if use_legacy { &self.legacy } else { &self.current };
        cell.get_or_try_init(|| {
            self.derivations.fetch_add(1, Ordering::SeqCst);
            let params = ZerocoinParams::derive(&self.modulus, use_legacy, self.security_level)?;
            debug!(
                "derived zerocoin parameters from {}-bit {} modulus",
                params.accumulator_modulus.significant_bits(),
                if use_legacy { "hex" } else { "decimal" }
            );
            Ok(params)
        })
    }

    /// Whether the variant was derived already.
    pub fn is_derived(&self, use_legacy: bool) -> bool {
        if use_legacy { self.legacy.get().is_some() } else { self.current.get().is_some() }
    }

    /// Number of derivations started so far.
    pub fn derivations(&self) -> usize {
        self.derivations.load(Ordering::SeqCst)
    }
}

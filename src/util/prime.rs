// Copyright (c) 2020 Chaintope Inc.
// Distributed under the MIT software license, see the accompanying
// file COPYING or http://www.opensource.org/licenses/mit-license.php.


//! Utility for prime number
//!
//! Deterministic prime generation following the Shawe-Taylor construction of
//! NIST FIPS 186-3, appendix C.6, driven by double SHA-256. Every value
//! produced here is a pure function of its seed, so all nodes derive the
//! same numbers.

use hashes::{sha256d, Hash};
use rug::integer::{IsPrime, Order};
use rug::Integer;

/// Miller-Rabin rounds used when testing candidates.
pub const PRIMALITY_ROUNDS: u32 = 40;

/// Bits of output of the seed hash.
pub const HASH_OUTPUT_BITS: u32 = 256;

/// Candidates tried by one recursive prime search step before giving up.
pub const MAX_PRIMEGEN_ATTEMPTS: u32 = 10000;

/// Below this length primes are found by direct search.
const DIRECT_SEARCH_BITS: u32 = 33;

/// A 256-bit unsigned seed. Serializes little-endian and wraps on overflow.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Seed(Integer);

impl Seed {
    /// Reads a digest as a little-endian number.
    pub fn from_digest(digest: sha256d::Hash) -> Seed {
        Seed(Integer::from_digits(&digest[..], Order::Lsf))
    }

    /// The 32 little-endian bytes of the seed.
    pub fn to_bytes(&self) -> [u8; 32] {
        let digits = self.0.to_digits::<u8>(Order::Lsf);
        let mut out = [0u8; 32];
        out[..digits.len()].copy_from_slice(&digits);
        out
    }

    /// Adds `n`, modulo 2^256.
    pub fn advance(&mut self, n: u32) {
        self.0 += n;
        self.0.keep_bits_mut(HASH_OUTPUT_BITS);
    }

    /// The seed `n` steps further on.
    pub fn offset(&self, n: u32) -> Seed {
        let mut seed = self.clone();
        seed.advance(n);
        seed
    }

    /// The seed as a number.
    pub fn as_integer(&self) -> &Integer {
        &self.0
    }
}

/// Double SHA-256 of the seed bytes, as the next seed.
pub fn calculate_hash(seed: &Seed) -> Seed {
    Seed::from_digest(sha256d::Hash::hash(&seed.to_bytes()))
}

/// Returns whether `n` passes the probabilistic primality test.
pub fn is_prime(n: &Integer) -> bool {
    n.is_probably_prime(PRIMALITY_ROUNDS) != IsPrime::No
}

/// Expands `seed` into an integer of exactly `num_bits` bits, by hashing
/// consecutive seeds and concatenating the digests little-endian. Returns
/// the integer and the number of digests used.
pub fn generate_integer_from_seed(num_bits: u32, seed: &Seed) -> (Integer, u32) {
    let iterations = (num_bits + HASH_OUTPUT_BITS - 1) / HASH_OUTPUT_BITS;
    let mut result = Integer::new();
    for count in 0..iterations {
        let digest = calculate_hash(&seed.offset(count));
        result += Integer::from(digest.as_integer() << (count * HASH_OUTPUT_BITS));
    }
    // 2^(num_bits - 1) + (result mod 2^(num_bits - 1))
    let top = num_bits.saturating_sub(1);
    result.keep_bits_mut(top);
    result.set_bit(top, true);
    (result, iterations)
}

/// A prime of exactly `bits` bits derived from `in_seed`.
///
/// Returns the prime, the seed following the last one consumed and the
/// number of candidates generated, or `None` when no candidate was found
/// within the attempt limits.
pub fn generate_random_prime(bits: u32, in_seed: &Seed) -> Option<(Integer, Seed, u32)> {
    if bits < 2 {
        return None;
    }

    if bits < DIRECT_SEARCH_BITS {
        let mut prime_seed = in_seed.clone();
        let mut counter = 0u32;
        while counter < 4 * bits {
            let (c, iterations) = generate_integer_from_seed(bits, &prime_seed);
            prime_seed.advance(iterations + 1);
            counter += 1;

            let candidate = Integer::from(c.to_u32_wrapping() | 1);
            if is_prime(&candidate) {
                return Some((candidate, prime_seed, counter));
            }
        }
        return None;
    }

    // A prime c0 of about half the length, then c = 2 * t * c0 + 1.
    let (c0, mut out_seed, mut counter) = generate_random_prime((bits + 1) / 2 + 1, in_seed)?;
    let (x, iterations) = generate_integer_from_seed(bits, &out_seed);
    out_seed.advance(iterations + 1);

    let two_c0 = Integer::from(&c0 << 1);
    let bound = Integer::from(1) << bits;
    let mut t = x / &two_c0;
    for _ in 0..MAX_PRIMEGEN_ATTEMPTS {
        if Integer::from(&t * &two_c0) + 1u32 > bound {
            t = (Integer::from(1) << (bits - 1)) / &two_c0;
        }
        let c = Integer::from(&t * &two_c0) + 1u32;
        counter += 1;

        // Pocklington test with a seeded base a in [2, c - 2].
        let (a, iterations) = generate_integer_from_seed(c.significant_bits(), &out_seed);
        let a = a % Integer::from(&c - 3u32) + 2u32;
        out_seed.advance(iterations + 1);

        if pocklington(&a, &Integer::from(&t << 1), &c0, &c) {
            trace!("found {}-bit prime after {} candidates", bits, counter);
            return Some((c, out_seed, counter));
        }
        t += 1u32;
    }
    None
}

/// With `z = a^e mod c`, whether `gcd(z - 1, c) = 1` and `z^factor = 1 mod c`.
pub(crate) fn pocklington(a: &Integer, e: &Integer, factor: &Integer, c: &Integer) -> bool {
    let z = match a.pow_mod_ref(e, c) {
        Some(z) => Integer::from(z),
        None => return false,
    };
    if Integer::from(&z - 1u32).gcd(c) != 1 {
        return false;
    }
    match z.pow_mod_ref(factor, c) {
        Some(r) => Integer::from(r) == 1,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{calculate_hash, generate_integer_from_seed, generate_random_prime, is_prime, Seed};
    use hashes::{sha256d, Hash};
    use rug::Integer;

    fn seed(label: &[u8]) -> Seed {
        Seed::from_digest(sha256d::Hash::hash(label))
    }

    #[test]
    fn seed_arithmetic() {
        let digest = sha256d::Hash::hash(b"seed");
        let s = Seed::from_digest(digest);
        assert_eq!(s.to_bytes(), digest.into_inner());

        let mut max = Seed::from_digest(sha256d::Hash::from_inner([0xff; 32]));
        max.advance(2);
        assert_eq!(max.as_integer(), &Integer::from(1));
        assert_eq!(max.to_bytes()[0], 1);
        assert_eq!(max.offset(0x100).to_bytes()[..2], [1, 1]);

        assert_eq!(calculate_hash(&s), Seed::from_digest(sha256d::Hash::hash(&digest[..])));
        assert_ne!(calculate_hash(&s), calculate_hash(&s.offset(1)));
    }

    #[test]
    fn integer_from_seed() {
        let s = seed(b"integer");
        for bits in [2u32, 7, 8, 255, 256, 257, 1000].iter() {
            let (n, iterations) = generate_integer_from_seed(*bits, &s);
            assert_eq!(n.significant_bits(), *bits);
            assert_eq!(iterations, (*bits + 255) / 256);
            assert_eq!(generate_integer_from_seed(*bits, &s).0, n);
        }

        // one digest, reduced and topped
        let (n, _) = generate_integer_from_seed(256, &s);
        let mut expected = calculate_hash(&s).as_integer().clone();
        expected.keep_bits_mut(255);
        expected.set_bit(255, true);
        assert_eq!(n, expected);
    }

    #[test]
    fn small_primes() {
        let s = seed(b"small");
        for bits in [2u32, 5, 16, 32].iter() {
            let (p, next, counter) = generate_random_prime(*bits, &s).unwrap();
            assert!(is_prime(&p));
            assert!(p.significant_bits() <= *bits);
            assert!(counter >= 1 && counter <= 4 * bits);
            assert_ne!(next, s);
        }
        assert!(generate_random_prime(1, &s).is_none());
        assert!(generate_random_prime(0, &s).is_none());
    }

    #[test]
    fn recursive_primes() {
        let s = seed(b"recursive");
        for bits in [33u32, 64, 160, 256, 512].iter() {
            let (p, next, counter) = generate_random_prime(*bits, &s).unwrap();
            assert_eq!(p.significant_bits(), *bits);
            assert!(is_prime(&p));
            assert_eq!(generate_random_prime(*bits, &s).unwrap(), (p, next, counter));
        }
    }
}

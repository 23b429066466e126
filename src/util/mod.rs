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

//! Utility functions
//!
//! Functions needed by all parts of the library, and the crate-level
//! [`Error`] type.
//!

pub mod amount;
pub mod prime;

use std::{error, fmt};

use hashes::hex::{self, FromHex, ToHex};
use hashes::{sha256d, Hash};
use rug::integer::Order;
use rug::Integer;

use crate::blockdata::constants::GenesisError;
use crate::consensus::stake::StakeError;
use crate::network::constants::ParseNetworkError;
use crate::zerocoin;

/// A general error code, other errors should implement conversions to/from this
/// if appropriate.
#[derive(Debug)]
pub enum Error {
    /// Genesis block integrity check failed
    Genesis(GenesisError),
    /// Zerocoin parameter derivation failed
    Zerocoin(zerocoin::Error),
    /// Stake input rejected
    Stake(StakeError),
    /// secp256k1-related error
    Key(secp256k1::Error),
    /// Malformed hex constant
    Hex(hex::Error),
    /// Unknown network name
    Network(ParseNetworkError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Genesis(ref e) => write!(f, "genesis: {}", e),
            Error::Zerocoin(ref e) => write!(f, "zerocoin: {}", e),
            Error::Stake(ref e) => write!(f, "stake: {}", e),
            Error::Key(ref e) => write!(f, "secp256k1: {}", e),
            Error::Hex(ref e) => write!(f, "hex: {:?}", e),
            Error::Network(ref e) => fmt::Display::fmt(e, f),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Genesis(ref e) => Some(e),
            Error::Zerocoin(ref e) => Some(e),
            Error::Stake(ref e) => Some(e),
            Error::Key(ref e) => Some(e),
            Error::Network(ref e) => Some(e),
            Error::Hex(_) => None,
        }
    }
}

#[doc(hidden)]
impl From<GenesisError> for Error {
    fn from(e: GenesisError) -> Error {
        Error::Genesis(e)
    }
}

#[doc(hidden)]
impl From<zerocoin::Error> for Error {
    fn from(e: zerocoin::Error) -> Error {
        Error::Zerocoin(e)
    }
}

#[doc(hidden)]
impl From<StakeError> for Error {
    fn from(e: StakeError) -> Error {
        Error::Stake(e)
    }
}

#[doc(hidden)]
impl From<secp256k1::Error> for Error {
    fn from(e: secp256k1::Error) -> Error {
        Error::Key(e)
    }
}

#[doc(hidden)]
impl From<hex::Error> for Error {
    fn from(e: hex::Error) -> Error {
        Error::Hex(e)
    }
}

#[doc(hidden)]
impl From<ParseNetworkError> for Error {
    fn from(e: ParseNetworkError) -> Error {
        Error::Network(e)
    }
}

/// Parses a double-SHA256 hash written in the usual display order
/// (most significant byte first, i.e. byte-reversed).
pub fn hash_from_display_hex(s: &str) -> Result<sha256d::Hash, hex::Error> {
    let mut bytes = Vec::<u8>::from_hex(s)?;
    if bytes.len() != 32 {
        return Err(hex::Error::InvalidLength(64, s.len()));
    }
    bytes.reverse();
    let mut inner = [0u8; 32];
    inner.copy_from_slice(&bytes);
    Ok(sha256d::Hash::from_inner(inner))
}

/// Formats a double-SHA256 hash in display order.
pub fn hash_to_display_hex(hash: &sha256d::Hash) -> String {
    let mut bytes = hash.into_inner();
    bytes.reverse();
    bytes[..].to_hex()
}

/// Appends the variable-length integer encoding of `n`.
pub(crate) fn write_compact_size(out: &mut Vec<u8>, n: usize) {
    if n < 0xfd {
        out.push(n as u8);
    } else if n <= 0xffff {
        out.push(0xfd);
        out.extend_from_slice(&(n as u16).to_le_bytes());
    } else {
        out.push(0xfe);
        out.extend_from_slice(&(n as u32).to_le_bytes());
    }
}

/// Little-endian magnitude with the sign in the top bit of the last byte,
/// the big number encoding of the wire protocol.
pub(crate) fn bignum_bytes(n: &Integer) -> Vec<u8> {
    let mut bytes = n.to_digits::<u8>(Order::Lsf);
    if bytes.is_empty() {
        return bytes;
    }
    let negative = *n < 0;
    if bytes[bytes.len() - 1] & 0x80 != 0 {
        bytes.push(if negative { 0x80 } else { 0x00 });
    } else if negative {
        let last = bytes.len() - 1;
        bytes[last] |= 0x80;
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::{hash_from_display_hex, hash_to_display_hex, write_compact_size};
    use hashes::{sha256d, Hash};

    #[test]
    fn display_hex_reverses_bytes() {
        let s = "00000fe79c10addf7e023042d3ef98ce24d36262ae7c05c46c085c1ee14434d1";
        let hash = hash_from_display_hex(s).unwrap();
        assert_eq!(hash.into_inner()[31], 0x00);
        assert_eq!(hash.into_inner()[0], 0xd1);
        assert_eq!(hash_to_display_hex(&hash), s);

        assert!(hash_from_display_hex("00").is_err());
        assert!(hash_from_display_hex("zz").is_err());
    }

    #[test]
    fn display_hex_of_computed_hash() {
        let hash = sha256d::Hash::hash(b"");
        let back = hash_from_display_hex(&hash_to_display_hex(&hash)).unwrap();
        assert_eq!(hash, back);
    }

    #[test]
    fn compact_size() {
        let mut out = Vec::new();
        write_compact_size(&mut out, 0xfc);
        write_compact_size(&mut out, 0xfd);
        write_compact_size(&mut out, 0x10000);
        assert_eq!(out, vec![0xfc, 0xfd, 0xfd, 0x00, 0xfe, 0x00, 0x00, 0x01, 0x00]);
    }
}

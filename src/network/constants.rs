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

//! Network constants
//!
//! This module provides the [`Network`] type and the constants that tell the
//! three Kabberry networks apart on the wire: the message-start bytes that prefix
//! every P2P message and the default P2P port.
//!
//! # Example: encoding a network's magic bytes
//!
//! ```rust
//! use kabberry_chainparams::network::constants::Network;
//!
//! let network = Network::Main;
//! assert_eq!(network.message_start(), [0x90, 0xc4, 0xfd, 0xe9]);
//! assert_eq!(network.magic().to_le_bytes(), [0x90, 0xc4, 0xfd, 0xe9]);
//! ```

use std::fmt;
use std::str::FromStr;

/// The cryptocurrency network to act on.
#[derive(Copy, PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Network {
    /// The production network
    Main,
    /// The public test network
    Testnet,
    /// Local regression testing
    Regtest,
}

impl Network {
    /// All networks, in parameter derivation order.
    pub const ALL: [Network; 3] = [Network::Main, Network::Testnet, Network::Regtest];

    /// Returns the four message-start bytes, in the order they appear on
    /// the wire at the start of every message.
    pub fn message_start(self) -> [u8; 4] {
        match self {
            Network::Main => [0x90, 0xc4, 0xfd, 0xe9],
            Network::Testnet => [0x45, 0x76, 0x65, 0xba],
            Network::Regtest => [0xa1, 0xcf, 0x7e, 0xac],
        }
    }

    /// Return the network magic bytes, which should be encoded little-endian
    /// at the start of every message
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kabberry_chainparams::network::constants::Network;
    ///
    /// assert_eq!(Network::Main.magic(), 0xE9FDC490);
    /// ```
    pub fn magic(self) -> u32 {
        u32::from_le_bytes(self.message_start())
    }

    /// Default port for P2P connections.
    pub fn default_port(self) -> u16 {
        match self {
            Network::Main => 34124,
            Network::Testnet => 41994,
            Network::Regtest => 51476,
        }
    }

    /// Converts a `Network` to the name the node accepts on its command line.
    ///
    /// ```bash
    /// $ kabberryd -help | grep -A 2 '\-testnet'
    /// -testnet
    ///      Use the test chain
    /// ```
    pub fn to_core_arg(self) -> &'static str {
        match self {
            Network::Main => "main",
            Network::Testnet => "test",
            Network::Regtest => "regtest",
        }
    }

    /// Converts a command line network name to its equivalent `Network`.
    pub fn from_core_arg(core_arg: &str) -> Result<Self, ParseNetworkError> {
        use self::Network::*;

        let network = match core_arg {
            "main" => Main,
            "test" => Testnet,
            "regtest" => Regtest,
            _ => return Err(ParseNetworkError(core_arg.to_owned())),
        };
        Ok(network)
    }
}

#[cfg(feature = "serde")]
pub mod as_core_arg {
    //! Module for serialization/deserialization of network variants into/from node command line values
    #![allow(missing_docs)]

    use crate::network::constants::Network;

    pub fn serialize<S>(network: &Network, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(network.to_core_arg())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Network, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct NetworkVisitor;

        impl<'de> serde::de::Visitor<'de> for NetworkVisitor {
            type Value = Network;

            fn visit_str<E: serde::de::Error>(self, s: &str) -> Result<Self::Value, E> {
                Network::from_core_arg(s).map_err(|_| {
                    E::invalid_value(
                        serde::de::Unexpected::Str(s),
                        &"kabberry network encoded as a string (either main, test or regtest)",
                    )
                })
            }

            fn expecting(&self, formatter: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                write!(
                    formatter,
                    "kabberry network encoded as a string (either main, test or regtest)"
                )
            }
        }

        deserializer.deserialize_str(NetworkVisitor)
    }
}

/// An error in parsing network string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNetworkError(pub String);

impl fmt::Display for ParseNetworkError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "failed to parse {} as network", self.0)
    }
}

impl ::std::error::Error for ParseNetworkError {}

impl FromStr for Network {
    type Err = ParseNetworkError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Network::from_core_arg(s)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.to_core_arg())
    }
}

// Copyright (c) 2020 Chaintope Inc.
// Distributed under the MIT software license, see the accompanying
// file COPYING or http://www.opensource.org/licenses/mit-license.php.

//! Network parameter registry
//!
//! Holds the parameter set and the zerocoin parameter provider of every
//! network, built once on first use, and the process-wide selection of
//! the active network.
//!
//! A node calls [`select`] once at startup, before validation threads
//! start, and afterwards reads [`active`]. Validation code below the top
//! level should take `&Params` as an argument rather than calling
//! [`active`] itself.
//!
//! ```rust
//! use kabberry_chainparams::{chainparams, Network};
//!
//! chainparams::select(Network::Testnet);
//! assert_eq!(chainparams::active().network, Network::Testnet);
//! assert_eq!(chainparams::get(Network::Main).default_port, 34124);
//! ```
//!

use std::sync::atomic::{AtomicU8, Ordering};

use once_cell::sync::Lazy;

use crate::consensus::params::Params;
use crate::network::constants::Network;
use crate::util::hash_to_display_hex;
use crate::zerocoin::{self, ZerocoinParams, ZerocoinProvider};

const UNSELECTED: u8 = 0;

fn network_tag(network: Network) -> u8 {
    match network {
        Network::Main => 1,
        Network::Testnet => 2,
        Network::Regtest => 3,
    }
}

fn network_from_tag(tag: u8) -> Option<Network> {
    match tag {
        1 => Some(Network::Main),
        2 => Some(Network::Testnet),
        3 => Some(Network::Regtest),
        _ => None,
    }
}

struct Entry {
    params: Params,
    zerocoin: ZerocoinProvider,
}

struct Registry {
    entries: Vec<Entry>,
    active: AtomicU8,
}

impl Registry {
    /// Builds every network's parameters and checks their genesis blocks:
    /// the merkle root always, the Quark hash where one is pinned. A failure
    /// here is a build defect and aborts.
    fn new() -> Registry {
        let entries = Network::ALL
            .iter()
            .map(|&network| {
                let params = match Params::new(network) {
                    Ok(params) => params,
                    Err(e) => panic!("malformed {} chain parameters: {:?}", network, e),
                };
                match params.genesis.verify() {
                    Ok(hash) => debug!("{} genesis block {}", network, hash_to_display_hex(&hash)),
                    Err(e) => panic!("{} genesis block: {}", network, e),
                }
                let zerocoin = ZerocoinProvider::new(params.zerocoin_modulus);
                Entry { params, zerocoin }
            })
            .collect();
        Registry { entries, active: AtomicU8::new(UNSELECTED) }
    }

    fn entry(&self, network: Network) -> &Entry {
        &self.entries[network_tag(network) as usize - 1]
    }

    fn select(&self, network: Network) {
        let previous = self.active.swap(network_tag(network), Ordering::AcqRel);
        match network_from_tag(previous) {
            Some(prev) => warn!("re-selecting chain parameters: {} -> {}", prev, network),
            None => info!(
                "selected {} chain parameters (magic {:08x}, port {})",
                network,
                network.magic(),
                network.default_port()
            ),
        }
    }

    fn active_network(&self) -> Option<Network> {
        network_from_tag(self.active.load(Ordering::Acquire))
    }

    fn try_active(&self) -> Option<&Params> {
        self.active_network().map(|network| &self.entry(network).params)
    }

    fn active(&self) -> &Params {
        match self.try_active() {
            Some(params) => params,
            None => panic!("chain parameters used before a network was selected"),
        }
    }
}

static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

/// Makes `network` the active network of the process.
///
/// Call once at startup, before any thread reads [`active`]. Selecting again
/// re-aims every later [`active`] call.
pub fn select(network: Network) {
    REGISTRY.select(network)
}

/// Parameters of the active network.
///
/// # Panics
///
/// If no network was selected yet.
pub fn active() -> &'static Params {
    REGISTRY.active()
}

/// Parameters of the active network, `None` before [`select`].
pub fn try_active() -> Option<&'static Params> {
    REGISTRY.try_active()
}

/// The active network, `None` before [`select`].
pub fn active_network() -> Option<Network> {
    REGISTRY.active_network()
}

/// Parameters of any network, leaving the selection alone.
pub fn get(network: Network) -> &'static Params {
    &REGISTRY.entry(network).params
}

/// Zerocoin parameters of the active network, derived on first use.
///
/// # Panics
///
/// If no network was selected yet.
pub fn zerocoin_params(use_legacy: bool) -> Result<&'static ZerocoinParams, zerocoin::Error> {
    zerocoin_params_for(active().network, use_legacy)
}

/// Zerocoin parameters of `network`, derived on first use.
pub fn zerocoin_params_for(network: Network, use_legacy: bool) -> Result<&'static ZerocoinParams, zerocoin::Error> {
    zerocoin_provider(network).params(use_legacy)
}

/// The zerocoin parameter provider of `network`.
pub fn zerocoin_provider(network: Network) -> &'static ZerocoinProvider {
    &REGISTRY.entry(network).zerocoin
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use rug::Integer;

    use super::Registry;
    use crate::network::constants::Network;
    use crate::test_helpers::params_for;

    // Serializes tests touching the process-wide selection.
    static SELECT_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    #[test]
    #[should_panic(expected = "before a network was selected")]
    fn active_before_select_panics() {
        Registry::new().active();
    }

    #[test]
    fn local_registry_selection() {
        let registry = Registry::new();
        assert!(registry.try_active().is_none());
        assert!(registry.active_network().is_none());

        registry.select(Network::Regtest);
        assert_eq!(registry.active().network, Network::Regtest);
        registry.select(Network::Main);
        assert_eq!(registry.active_network(), Some(Network::Main));
        assert_eq!(registry.active(), &params_for(Network::Main));
    }

    #[test]
    fn global_selection() {
        let _guard = SELECT_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        super::select(Network::Testnet);
        assert_eq!(super::active().network, Network::Testnet);
        assert_eq!(super::active_network(), Some(Network::Testnet));
        assert!(super::try_active().is_some());

        // get leaves the selection alone
        assert_eq!(super::get(Network::Regtest).network, Network::Regtest);
        assert_eq!(super::active().network, Network::Testnet);

        super::select(Network::Main);
        assert_eq!(super::active().network, Network::Main);
        assert!(std::ptr::eq(super::active(), super::get(Network::Main)));
    }

    #[test]
    fn registry_holds_every_network() {
        for net in Network::ALL.iter() {
            assert_eq!(super::get(*net), &params_for(*net));
        }
    }

    #[test]
    fn zerocoin_parameters_are_cached() {
        let _guard = SELECT_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        super::select(Network::Main);

        let first = super::zerocoin_params(false).unwrap();
        let second = super::zerocoin_params_for(Network::Main, false).unwrap();
        assert!(std::ptr::eq(first, second));
        assert_eq!(first.accumulator_modulus.significant_bits(), 2048);
        assert_eq!(first.coin_commitment_group.modulus.significant_bits(), 1024);
        assert_eq!(first.coin_commitment_group.group_order.significant_bits(), 256);
        assert_eq!(
            Integer::from(&first.coin_commitment_group.modulus - 1u32) % &first.coin_commitment_group.group_order,
            0
        );
        assert_eq!(first.serial_number_sok_commitment_group.group_order, first.coin_commitment_group.modulus);

        let legacy = super::zerocoin_params(true).unwrap();
        assert_eq!(legacy.accumulator_modulus.significant_bits(), 2466);
        assert_ne!(legacy.coin_commitment_group, first.coin_commitment_group);

        let provider = super::zerocoin_provider(Network::Main);
        assert!(provider.is_derived(false));
        assert!(provider.is_derived(true));
        assert_eq!(provider.derivations(), 2);
        assert!(std::ptr::eq(super::zerocoin_params(true).unwrap(), legacy));
        assert_eq!(provider.derivations(), 2);
    }
}

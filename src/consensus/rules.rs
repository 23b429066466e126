// Copyright (c) 2020 Chaintope Inc.
// Distributed under the MIT software license, see the accompanying
// file COPYING or http://www.opensource.org/licenses/mit-license.php.

//! Consensus rule gates
//!
//! Pure predicates over a parameter set. Every rule switches at an
//! activation height: below it the legacy rule applies, at and above it
//! the new one. The comparison operators here are consensus critical.
//!

use rug::Integer;

use crate::consensus::params::Params;

impl Params {
    /// Block timestamp slot length in seconds at `height`.
    pub fn time_slot_length(&self, _height: u32) -> i64 {
        self.time_slot_length
    }

    /// Whether block timestamps must be slot aligned at `height`.
    pub fn is_time_protocol_v2(&self, height: u32) -> bool {
        height >= self.block_time_protocol_v2
    }

    /// Whether a block at `height` may carry timestamp `time`.
    pub fn is_valid_block_timestamp(&self, time: i64, height: u32) -> bool {
        if !self.is_time_protocol_v2(height) {
            return true;
        }
        time % self.time_slot_length(height) == 0
    }

    /// Seconds a block at `height` may lie ahead of the adjusted network time.
    pub fn future_block_time_drift(&self, height: u32) -> i64 {
        if self.is_time_protocol_v2(height) {
            // at most one slot
            return self.time_slot_length(height) - 1;
        }
        if self.is_pos_phase(height) {
            self.future_time_drift_pos
        } else {
            self.future_time_drift_pow
        }
    }

    /// Whether `block_time` is not too far in the future of `adjusted_time`.
    pub fn is_valid_future_time(&self, block_time: i64, adjusted_time: i64, height: u32) -> bool {
        block_time <= adjusted_time.saturating_add(self.future_block_time_drift(height))
    }

    /// Whether an output confirmed at `utxo_height`/`utxo_time` may stake in
    /// a block at `context_height`/`context_time`.
    ///
    /// Before stake modifier v2 only the age counts, from it on only the
    /// depth.
    pub fn has_stake_min_age_or_depth(
        &self,
        context_height: u32,
        context_time: i64,
        utxo_height: u32,
        utxo_time: i64,
    ) -> bool {
        if !self.is_stake_modifier_v2(context_height) {
            return utxo_time.saturating_add(self.stake_min_age) <= context_time;
        }
        i64::from(context_height) - i64::from(utxo_height) >= i64::from(self.stake_min_depth)
    }

    /// Whether depth-based stake eligibility is active at `height`.
    pub fn is_stake_modifier_v2(&self, height: u32) -> bool {
        height >= self.block_stake_modifier_v2
    }

    /// Whether proof of work has ended at `height`.
    pub fn is_pos_phase(&self, height: u32) -> bool {
        height > self.last_pow_block
    }

    /// Whether absolute lock time checks are active at `height`.
    pub fn is_bip65_active(&self, height: u32) -> bool {
        height >= self.block_bip65
    }

    /// Whether zerocoin v2 is active at `height`.
    pub fn is_zerocoin_v2(&self, height: u32) -> bool {
        height >= self.block_zerocoin_v2
    }

    /// Whether zerocoin spends are public at `height`.
    pub fn is_public_coin_spend(&self, height: u32) -> bool {
        height >= self.block_public_coin_spend
    }

    /// Whether spent serials must lie in range at `height`.
    pub fn is_serial_range_enforced(&self, height: u32) -> bool {
        height >= self.block_enforce_serial_range
    }

    /// Whether zerocoin is active for a block at `height` with time `time`.
    /// Both the height and the time must have been reached.
    pub fn is_zerocoin_active(&self, height: u32, time: i64) -> bool {
        height >= self.zerocoin_start_height && time >= self.zerocoin_start_time
    }

    /// Retarget window in seconds at `height`.
    pub fn target_timespan(&self, height: u32) -> i64 {
        if self.is_time_protocol_v2(height) {
            self.target_timespan_v2
        } else {
            self.target_timespan
        }
    }

    /// Proof-of-stake difficulty ceiling at `height`.
    pub fn pos_limit(&self, height: u32) -> &Integer {
        if self.is_time_protocol_v2(height) {
            &self.pos_limit_v2
        } else {
            &self.pos_limit
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::network::constants::Network;
    use crate::test_helpers::params_for;

    #[test]
    fn slot_length() {
        let main = params_for(Network::Main);
        assert_eq!(main.time_slot_length(0), 15);
        assert_eq!(main.time_slot_length(main.block_time_protocol_v2), 15);
        assert_eq!(main.time_slot_length(u32::max_value()), 15);
    }

    #[test]
    fn time_protocol_v2_boundary() {
        let main = params_for(Network::Main);
        let v2 = main.block_time_protocol_v2;
        assert!(!main.is_time_protocol_v2(v2 - 1));
        assert!(main.is_time_protocol_v2(v2));
        assert!(main.is_time_protocol_v2(v2 + 1));

        let reg = params_for(Network::Regtest);
        assert_eq!(reg.block_time_protocol_v2, 999_999_999);
        assert!(!reg.is_time_protocol_v2(reg.block_time_protocol_v2 - 1));
    }

    #[test]
    fn free_timestamps_before_v2() {
        for net in Network::ALL.iter() {
            let params = params_for(*net);
            let h = params.block_time_protocol_v2 - 1;
            for t in 1_600_000_000..1_600_000_100 {
                assert!(params.is_valid_block_timestamp(t, h));
                assert!(params.is_valid_block_timestamp(t, 0));
            }
        }
    }

    #[test]
    fn slotted_timestamps_from_v2() {
        let main = params_for(Network::Main);
        for h in [main.block_time_protocol_v2, main.block_time_protocol_v2 + 1000].iter() {
            for t in 1_600_000_000..1_600_000_100 {
                assert_eq!(main.is_valid_block_timestamp(t, *h), t % 15 == 0);
            }
        }
        assert!(main.is_valid_block_timestamp(1_600_000_005, main.block_time_protocol_v2));
        assert!(!main.is_valid_block_timestamp(1_600_000_006, main.block_time_protocol_v2));
    }

    #[test]
    fn future_drift() {
        let main = params_for(Network::Main);
        // proof of work
        assert_eq!(main.future_block_time_drift(0), 7200);
        assert_eq!(main.future_block_time_drift(main.last_pow_block), 7200);
        // proof of stake
        assert_eq!(main.future_block_time_drift(main.last_pow_block + 1), 180);
        assert_eq!(main.future_block_time_drift(main.block_time_protocol_v2 - 1), 180);
        // slotted, whatever the phase
        assert_eq!(main.future_block_time_drift(main.block_time_protocol_v2), 14);

        let test = params_for(Network::Testnet);
        assert!(test.block_time_protocol_v2 > test.last_pow_block);
        assert_eq!(test.future_block_time_drift(test.block_time_protocol_v2), test.time_slot_length(0) - 1);
        assert_eq!(test.future_block_time_drift(test.last_pow_block), 7200);
        assert_eq!(test.future_block_time_drift(test.last_pow_block + 1), 180);

        let h = main.block_time_protocol_v2;
        assert!(main.is_valid_future_time(1000 + 14, 1000, h));
        assert!(!main.is_valid_future_time(1000 + 15, 1000, h));
        assert!(main.is_valid_future_time(1000 + 180, 1000, h - 1));
        assert!(!main.is_valid_future_time(1000 + 181, 1000, h - 1));
    }

    #[test]
    fn stake_min_age_boundary() {
        let main = params_for(Network::Main);
        let h = main.block_stake_modifier_v2 - 1;
        let t = 1_600_000_000;
        assert!(!main.has_stake_min_age_or_depth(h, t, 100, t - 3599));
        assert!(main.has_stake_min_age_or_depth(h, t, 100, t - 3600));
        assert!(main.has_stake_min_age_or_depth(h, t, 100, t - 3601));
        // depth does not matter before the switch
        assert!(main.has_stake_min_age_or_depth(h, t, h, t - 3601));
    }

    #[test]
    fn stake_min_depth_boundary() {
        let main = params_for(Network::Main);
        let h = main.block_stake_modifier_v2;
        let t = 1_600_000_000;
        assert!(!main.has_stake_min_age_or_depth(h, t, h - 599, 0));
        assert!(main.has_stake_min_age_or_depth(h, t, h - 600, t));
        assert!(main.has_stake_min_age_or_depth(h, t, h - 601, t + 100_000));
        // age does not matter after the switch
        assert!(!main.has_stake_min_age_or_depth(h, t, h - 599, t - 1_000_000));
        // an output above the context is never deep enough
        assert!(!main.has_stake_min_age_or_depth(h, t, h + 1, 0));
    }

    #[test]
    fn extreme_times_do_not_overflow() {
        let main = params_for(Network::Main);
        let v2 = main.block_time_protocol_v2;
        assert!(main.is_valid_future_time(i64::max_value(), i64::max_value(), v2));
        assert!(main.is_valid_future_time(i64::max_value(), i64::max_value() - 1, 0));
        assert!(!main.is_valid_future_time(i64::max_value(), 0, v2));

        let h = main.block_stake_modifier_v2 - 1;
        assert!(!main.has_stake_min_age_or_depth(h, 0, 100, i64::max_value()));
        assert!(main.has_stake_min_age_or_depth(h, i64::max_value(), 100, i64::max_value() - 3600));
        assert!(!main.has_stake_min_age_or_depth(h, i64::max_value(), 100, i64::max_value() - 3599));
    }

    #[test]
    fn regtest_stakes_immediately() {
        let reg = params_for(Network::Regtest);
        assert!(reg.has_stake_min_age_or_depth(10, 1000, 9, 1000));
        assert!(reg.has_stake_min_age_or_depth(reg.block_stake_modifier_v2, 1000, reg.block_stake_modifier_v2, 0));
    }

    #[test]
    fn activation_gates() {
        let main = params_for(Network::Main);
        assert!(!main.is_pos_phase(main.last_pow_block));
        assert!(main.is_pos_phase(main.last_pow_block + 1));
        assert!(!main.is_stake_modifier_v2(main.block_stake_modifier_v2 - 1));
        assert!(main.is_stake_modifier_v2(main.block_stake_modifier_v2));
        assert!(!main.is_bip65_active(main.block_bip65 - 1));
        assert!(main.is_bip65_active(main.block_bip65));
        assert!(!main.is_zerocoin_v2(main.block_zerocoin_v2 - 1));
        assert!(main.is_zerocoin_v2(main.block_zerocoin_v2));
        assert!(!main.is_public_coin_spend(main.block_public_coin_spend - 1));
        assert!(main.is_public_coin_spend(main.block_public_coin_spend));
        assert!(!main.is_serial_range_enforced(main.block_enforce_serial_range - 1));
        assert!(main.is_serial_range_enforced(main.block_enforce_serial_range));

        let (h, t) = (main.zerocoin_start_height, main.zerocoin_start_time);
        assert!(main.is_zerocoin_active(h, t));
        assert!(!main.is_zerocoin_active(h - 1, t));
        assert!(!main.is_zerocoin_active(h, t - 1));
    }

    #[test]
    fn height_dependent_limits() {
        let main = params_for(Network::Main);
        let v2 = main.block_time_protocol_v2;
        assert_eq!(main.target_timespan(v2 - 1), 40 * 60);
        assert_eq!(main.target_timespan(v2), 30 * 60);
        assert_eq!(main.pos_limit(v2 - 1), &main.pos_limit);
        assert_eq!(main.pos_limit(v2), &main.pos_limit_v2);
        assert!(main.pos_limit(v2 - 1) < main.pos_limit(v2));
    }
}

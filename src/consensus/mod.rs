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

//! Consensus
//!
//! This module defines the per-network consensus parameters, the
//! height-gated rule predicates evaluated against them, the checkpoint
//! table and the stake input contract.
//!

pub mod checkpoints;
pub mod params;
pub mod rules;
pub mod stake;

//! Bridge validator sets and the power-difference metric that decides when a
//! new valset attestation is required.

use alloy_primitives::Address;
use std::collections::HashMap;

/// Total power every set is scaled to before comparing two sets.
const NORMALIZED_TOTAL_POWER: u64 = 1 << 32;

/// A single member of a bridge validator set: the EVM address the validator
/// signs with and its staking power.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BridgeValidator {
    pub ethereum_address: Address,
    pub power: u64,
}

/// A snapshot of the bonded validator set, requested as an attestation so the
/// EVM contract can hand authority over to it.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Valset {
    pub nonce: u64,
    /// Source-chain height the snapshot was taken at.
    pub height: u64,
    /// Unix seconds of the block that created the attestation.
    pub block_time: u64,
    pub members: Vec<BridgeValidator>,
}

impl Valset {
    /// Build a valset from an arbitrary member list: zero-power members are
    /// dropped and the rest are put in canonical order (power descending,
    /// address ascending on ties).
    pub fn new(nonce: u64, height: u64, block_time: u64, members: Vec<BridgeValidator>) -> Self {
        let mut members: Vec<_> = members.into_iter().filter(|m| m.power > 0).collect();
        members.sort_by(|a, b| {
            b.power
                .cmp(&a.power)
                .then_with(|| a.ethereum_address.cmp(&b.ethereum_address))
        });
        Self {
            nonce,
            height,
            block_time,
            members,
        }
    }

    pub fn total_power(&self) -> u64 {
        self.members.iter().map(|m| m.power).sum()
    }

    /// The power the EVM contract requires before accepting an update signed
    /// by this set: ceil(2 * total / 3).
    pub fn two_thirds_threshold(&self) -> u64 {
        (2 * self.total_power()).div_ceil(3)
    }

    pub fn contains(&self, address: Address) -> bool {
        self.members.iter().any(|m| m.ethereum_address == address)
    }
}

fn normalized_powers(members: &[BridgeValidator]) -> HashMap<Address, u64> {
    let total: u128 = members.iter().map(|m| u128::from(m.power)).sum();
    if total == 0 {
        return HashMap::new();
    }
    members
        .iter()
        .map(|m| {
            let scaled = u128::from(m.power) * u128::from(NORMALIZED_TOTAL_POWER) / total;
            (m.ethereum_address, scaled as u64)
        })
        .collect()
}

/// Fraction of voting power that moved between two sets, in `[0, 1]`.
///
/// Both sides are scaled so their totals match before comparing, so the
/// metric reacts to redistribution and membership churn rather than to
/// absolute stake growth. Addresses missing from one side count as zero
/// power on that side.
pub fn power_diff(a: &[BridgeValidator], b: &[BridgeValidator]) -> f64 {
    let norm_a = normalized_powers(a);
    let norm_b = normalized_powers(b);

    let mut delta: u64 = 0;
    for (addr, power) in &norm_a {
        delta += power.abs_diff(norm_b.get(addr).copied().unwrap_or(0));
    }
    for (addr, power) in &norm_b {
        if !norm_a.contains_key(addr) {
            delta += *power;
        }
    }

    delta as f64 / (2.0 * NORMALIZED_TOTAL_POWER as f64)
}

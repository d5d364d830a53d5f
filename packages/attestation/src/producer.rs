//! End-of-block attestation production.
//!
//! Runs once per block, in a fixed order: valset handling first (a set that
//! changes this block must be the one signing everything the block creates),
//! then data-commitment catch-up, then pruning.

use std::time::Duration;

use evm_bridge_types::{power_diff, Attestation, BridgeValidator, DataCommitment, Valset};
use tracing::{debug, error, info, warn};

use crate::error::ProducerError;
use crate::store::AttestationStore;

/// Read-only view over the staking module.
pub trait StakingView {
    /// The currently bonded validators with their EVM addresses. May be
    /// unnormalized; the producer canonicalizes.
    fn current_members(&self) -> Result<Vec<BridgeValidator>, ProducerError>;

    /// Height of the most recent block in which a validator began unbonding.
    fn last_unbonding_block_height(&self) -> u64;
}

#[derive(Clone, Debug)]
pub struct ProducerParams {
    /// Width of a data-commitment block range, in blocks. Governance set.
    pub data_commitment_window: u64,
    /// Attestations older than this are pruned.
    pub attestation_expiry: Duration,
    /// Fraction of moved voting power above which a new valset is requested.
    pub significant_power_threshold: f64,
}

impl Default for ProducerParams {
    fn default() -> Self {
        Self {
            data_commitment_window: 400,
            attestation_expiry: Duration::from_secs(8 * 7 * 24 * 60 * 60),
            significant_power_threshold: 0.05,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct AttestationProducer {
    params: ProducerParams,
}

impl AttestationProducer {
    pub fn new(params: ProducerParams) -> Self {
        Self { params }
    }

    /// The end-of-block hook. Valset and data-commitment creation failures
    /// are fatal to the block; pruning failures are logged and abort only the
    /// pruning pass.
    pub fn on_block_end<S, K>(
        &self,
        store: &mut S,
        staking: &K,
        height: u64,
        block_time: u64,
    ) -> Result<(), ProducerError>
    where
        S: AttestationStore,
        K: StakingView,
    {
        self.handle_valset(store, staking, height, block_time)?;
        self.handle_data_commitments(store, height, block_time)?;
        self.prune_expired(store, block_time);
        Ok(())
    }

    fn handle_valset<S, K>(
        &self,
        store: &mut S,
        staking: &K,
        height: u64,
        block_time: u64,
    ) -> Result<(), ProducerError>
    where
        S: AttestationStore,
        K: StakingView,
    {
        let latest_valset = latest_valset(store)?;
        let unbonding_here = staking.last_unbonding_block_height() == height;

        let significant_diff = match &latest_valset {
            Some(latest) => {
                let current = staking.current_members()?;
                if current.is_empty() {
                    warn!(height, "no bonded validators, skipping valset handling");
                    return Ok(());
                }
                let normalized = Valset::new(0, height, block_time, current);
                power_diff(&normalized.members, &latest.members)
                    > self.params.significant_power_threshold
            }
            None => false,
        };

        if latest_valset.is_none() || unbonding_here || significant_diff {
            let members = staking.current_members()?;
            if members.is_empty() {
                warn!(height, "no bonded validators, skipping valset handling");
                return Ok(());
            }
            let nonce = store.latest_nonce().map_or(1, |n| n + 1);
            let valset = Valset::new(nonce, height, block_time, members);
            info!(
                nonce,
                height,
                members = valset.members.len(),
                "requesting valset attestation"
            );
            store.append(valset.into())?;
        }

        if unbonding_here {
            // The valset emitted above (unconditionally, in this branch) is
            // the earliest attestation the new set is responsible for.
            if let Some(latest) = store.latest_nonce() {
                store.set_last_unbonding_nonce(latest);
            }
        }

        Ok(())
    }

    fn handle_data_commitments<S>(
        &self,
        store: &mut S,
        height: u64,
        block_time: u64,
    ) -> Result<(), ProducerError>
    where
        S: AttestationStore,
    {
        let window = self.params.data_commitment_window;

        // Loops until the log has caught up with the current height, so a
        // producer that missed blocks emits every window it owes.
        loop {
            let (begin, end) = match latest_data_commitment(store)? {
                Some(last) => {
                    if height.saturating_sub(last.end_block) >= window {
                        (last.end_block, last.end_block + window)
                    } else {
                        break;
                    }
                }
                None => {
                    if height >= window {
                        (0, window)
                    } else {
                        break;
                    }
                }
            };

            let nonce = store.latest_nonce().map_or(1, |n| n + 1);
            info!(
                nonce,
                begin_block = begin,
                end_block = end,
                "requesting data commitment attestation"
            );
            store.append(
                DataCommitment {
                    nonce,
                    begin_block: begin,
                    end_block: end,
                    block_time,
                }
                .into(),
            )?;
        }

        Ok(())
    }

    fn prune_expired<S>(&self, store: &mut S, now: u64)
    where
        S: AttestationStore,
    {
        let expiry = self.params.attestation_expiry.as_secs();
        let Some(latest) = store.latest_nonce() else {
            return;
        };
        let Some(earliest) = store.earliest_available_nonce() else {
            return;
        };

        match load_for_pruning(store, earliest) {
            Some(att) => {
                // If the earliest attestation is still valid, all later ones
                // are too.
                if att.block_time() + expiry > now {
                    return;
                }
            }
            None => return,
        }

        debug!("pruning expired attestations");
        let mut count = 0u64;
        let mut new_earliest = earliest;
        while new_earliest < latest {
            let Some(att) = load_for_pruning(store, new_earliest) else {
                return;
            };
            if att.block_time() + expiry > now {
                break;
            }
            if let Err(err) = store.delete(new_earliest) {
                error!(nonce = new_earliest, %err, "error deleting attestation during pruning");
                return;
            }
            count += 1;
            new_earliest += 1;
        }
        store.set_earliest_available_nonce(new_earliest);
        debug!(
            count,
            new_earliest_available_nonce = new_earliest,
            latest_attestation_nonce = latest,
            "finished pruning expired attestations"
        );
    }
}

fn load_for_pruning<S: AttestationStore>(store: &S, nonce: u64) -> Option<Attestation> {
    match store.get(nonce) {
        Ok(Some(att)) => Some(att),
        Ok(None) => {
            error!(nonce, "couldn't find attestation for pruning");
            None
        }
        Err(err) => {
            error!(nonce, %err, "error getting attestation for pruning");
            None
        }
    }
}

fn latest_valset<S: AttestationStore>(store: &S) -> Result<Option<Valset>, ProducerError> {
    let (Some(latest), Some(earliest)) = (store.latest_nonce(), store.earliest_available_nonce())
    else {
        return Ok(None);
    };
    for nonce in (earliest..=latest).rev() {
        if let Some(Attestation::Valset(vs)) = store.get(nonce)? {
            return Ok(Some(vs));
        }
    }
    Ok(None)
}

fn latest_data_commitment<S: AttestationStore>(
    store: &S,
) -> Result<Option<DataCommitment>, ProducerError> {
    let (Some(latest), Some(earliest)) = (store.latest_nonce(), store.earliest_available_nonce())
    else {
        return Ok(None);
    };
    for nonce in (earliest..=latest).rev() {
        if let Some(Attestation::DataCommitment(dc)) = store.get(nonce)? {
            return Ok(Some(dc));
        }
    }
    Ok(None)
}

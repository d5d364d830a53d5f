//! The totally ordered attestation log.

use std::collections::BTreeMap;

use evm_bridge_types::Attestation;

use crate::error::StoreError;

/// Append-only log of attestations keyed by nonce, plus the cursors the
/// orchestrators and the pruner navigate by. Cursors are `None` until the
/// first matching event, which keeps the uninitialized sentinel out of the
/// valid nonce space.
pub trait AttestationStore {
    /// Append `att`; its nonce must be exactly `latest_nonce() + 1` (or 1 on
    /// an empty log, in which case it must be a valset).
    fn append(&mut self, att: Attestation) -> Result<(), StoreError>;

    fn get(&self, nonce: u64) -> Result<Option<Attestation>, StoreError>;

    /// Idempotent delete.
    fn delete(&mut self, nonce: u64) -> Result<(), StoreError>;

    fn latest_nonce(&self) -> Option<u64>;

    fn earliest_available_nonce(&self) -> Option<u64>;

    fn set_earliest_available_nonce(&mut self, nonce: u64);

    /// Highest nonce attested at a block where an unbonding event occurred.
    fn last_unbonding_nonce(&self) -> Option<u64>;

    fn set_last_unbonding_nonce(&mut self, nonce: u64);
}

/// In-memory log used by tests and the local harness.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    attestations: BTreeMap<u64, Attestation>,
    latest: Option<u64>,
    earliest: Option<u64>,
    last_unbonding: Option<u64>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AttestationStore for InMemoryStore {
    fn append(&mut self, att: Attestation) -> Result<(), StoreError> {
        let next = self.latest.map_or(1, |n| n + 1);
        if att.nonce() != next {
            return Err(StoreError::NonceGap {
                got: att.nonce(),
                latest: self.latest.unwrap_or(0),
            });
        }
        if self.latest.is_none() && !matches!(att, Attestation::Valset(_)) {
            return Err(StoreError::GenesisNotValset);
        }

        self.attestations.insert(att.nonce(), att);
        self.latest = Some(next);
        if self.earliest.is_none() {
            self.earliest = Some(next);
        }
        Ok(())
    }

    fn get(&self, nonce: u64) -> Result<Option<Attestation>, StoreError> {
        Ok(self.attestations.get(&nonce).cloned())
    }

    fn delete(&mut self, nonce: u64) -> Result<(), StoreError> {
        self.attestations.remove(&nonce);
        Ok(())
    }

    fn latest_nonce(&self) -> Option<u64> {
        self.latest
    }

    fn earliest_available_nonce(&self) -> Option<u64> {
        self.earliest
    }

    fn set_earliest_available_nonce(&mut self, nonce: u64) {
        self.earliest = Some(nonce);
    }

    fn last_unbonding_nonce(&self) -> Option<u64> {
        self.last_unbonding
    }

    fn set_last_unbonding_nonce(&mut self, nonce: u64) {
        self.last_unbonding = Some(nonce);
    }
}

#[cfg(test)]
mod append {
    use super::*;
    use evm_bridge_types::{DataCommitment, Valset};

    fn valset(nonce: u64) -> Attestation {
        Valset::new(nonce, 10, 0, vec![]).into()
    }

    fn data_commitment(nonce: u64) -> Attestation {
        DataCommitment {
            nonce,
            begin_block: 0,
            end_block: 400,
            block_time: 0,
        }
        .into()
    }

    #[test]
    fn assigns_consecutive_nonces() {
        let mut store = InMemoryStore::new();
        store.append(valset(1)).unwrap();
        store.append(data_commitment(2)).unwrap();
        store.append(data_commitment(3)).unwrap();

        assert_eq!(store.latest_nonce(), Some(3));
        assert_eq!(store.earliest_available_nonce(), Some(1));
    }

    #[test]
    fn rejects_nonce_gaps() {
        let mut store = InMemoryStore::new();
        store.append(valset(1)).unwrap();

        let err = store.append(data_commitment(3)).unwrap_err();
        assert!(matches!(err, StoreError::NonceGap { got: 3, latest: 1 }));
    }

    #[test]
    fn rejects_non_valset_genesis() {
        let mut store = InMemoryStore::new();
        let err = store.append(data_commitment(1)).unwrap_err();
        assert!(matches!(err, StoreError::GenesisNotValset));
    }

    #[test]
    fn delete_is_idempotent() {
        let mut store = InMemoryStore::new();
        store.append(valset(1)).unwrap();
        store.delete(1).unwrap();
        store.delete(1).unwrap();
        assert_eq!(store.get(1).unwrap(), None);
    }

    #[test]
    fn cursors_start_uninitialized() {
        let store = InMemoryStore::new();
        assert_eq!(store.latest_nonce(), None);
        assert_eq!(store.earliest_available_nonce(), None);
        assert_eq!(store.last_unbonding_nonce(), None);
    }
}

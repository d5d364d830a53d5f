//! The orchestrator's ephemeral local index.
//!
//! Nothing here is durable: the source chain remains the system of record,
//! and the index only mirrors what ingestion has already seen so the
//! pipeline can query it without a network round trip per nonce.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use alloy_primitives::B256;
use evm_bridge_types::{Attestation, MsgDataCommitmentConfirm, MsgValsetConfirm, Valset};
use tokio::sync::RwLock;

use crate::error::QueryError;
use crate::querier::BridgeQuerier;

#[derive(Debug, Default)]
struct IndexState {
    attestations: BTreeMap<u64, Attestation>,
    valset_confirms: HashMap<(u64, String), MsgValsetConfirm>,
    data_commitment_confirms: HashMap<(u64, String), MsgDataCommitmentConfirm>,
    commitments: HashMap<(u64, u64), B256>,
    last_unbonding_nonce: Option<u64>,
    /// Highest block height ingestion has fully processed.
    milestone: u64,
}

/// Shared in-memory index; cheap to clone, all clones see the same state.
#[derive(Clone, Debug, Default)]
pub struct LocalIndex {
    state: Arc<RwLock<IndexState>>,
}

impl LocalIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Write handle ingestion feeds the index through.
#[derive(Clone, Debug)]
pub struct Indexer {
    index: LocalIndex,
}

impl Indexer {
    pub fn new(index: LocalIndex) -> Self {
        Self { index }
    }

    pub async fn add_attestation(&self, att: Attestation) {
        let mut state = self.index.state.write().await;
        state.attestations.insert(att.nonce(), att);
    }

    pub async fn add_valset_confirm(&self, confirm: MsgValsetConfirm) {
        let mut state = self.index.state.write().await;
        state
            .valset_confirms
            .insert((confirm.nonce, confirm.orchestrator.clone()), confirm);
    }

    pub async fn add_data_commitment_confirm(&self, confirm: MsgDataCommitmentConfirm) {
        let mut state = self.index.state.write().await;
        state
            .data_commitment_confirms
            .insert((confirm.nonce, confirm.orchestrator.clone()), confirm);
    }

    pub async fn add_commitment(&self, begin: u64, end: u64, root: B256) {
        let mut state = self.index.state.write().await;
        state.commitments.insert((begin, end), root);
    }

    pub async fn set_last_unbonding_nonce(&self, nonce: u64) {
        let mut state = self.index.state.write().await;
        state.last_unbonding_nonce = Some(nonce);
    }

    pub async fn add_height(&self, height: u64) {
        let mut state = self.index.state.write().await;
        state.milestone = state.milestone.max(height);
    }
}

#[async_trait::async_trait]
impl BridgeQuerier for LocalIndex {
    async fn latest_attestation_nonce(&self) -> Result<Option<u64>, QueryError> {
        let state = self.state.read().await;
        Ok(state.attestations.keys().next_back().copied())
    }

    async fn last_unbonding_attestation_nonce(&self) -> Result<Option<u64>, QueryError> {
        let state = self.state.read().await;
        Ok(state.last_unbonding_nonce)
    }

    async fn attestation_by_nonce(&self, nonce: u64) -> Result<Option<Attestation>, QueryError> {
        let state = self.state.read().await;
        Ok(state.attestations.get(&nonce).cloned())
    }

    async fn valset_by_nonce(&self, nonce: u64) -> Result<Option<Valset>, QueryError> {
        let state = self.state.read().await;
        match state.attestations.get(&nonce) {
            Some(Attestation::Valset(vs)) => Ok(Some(vs.clone())),
            _ => Ok(None),
        }
    }

    async fn last_valset_before_nonce(&self, nonce: u64) -> Result<Valset, QueryError> {
        let state = self.state.read().await;
        state
            .attestations
            .range(..nonce)
            .rev()
            .find_map(|(_, att)| match att {
                Attestation::Valset(vs) => Some(vs.clone()),
                Attestation::DataCommitment(_) => None,
            })
            .ok_or(QueryError::NoValsetBefore(nonce))
    }

    async fn valset_confirm(
        &self,
        nonce: u64,
        orchestrator: &str,
    ) -> Result<Option<MsgValsetConfirm>, QueryError> {
        let state = self.state.read().await;
        Ok(state
            .valset_confirms
            .get(&(nonce, orchestrator.to_string()))
            .cloned())
    }

    async fn data_commitment_confirm(
        &self,
        nonce: u64,
        orchestrator: &str,
    ) -> Result<Option<MsgDataCommitmentConfirm>, QueryError> {
        let state = self.state.read().await;
        Ok(state
            .data_commitment_confirms
            .get(&(nonce, orchestrator.to_string()))
            .cloned())
    }

    async fn commitment(&self, begin: u64, end: u64) -> Result<B256, QueryError> {
        let state = self.state.read().await;
        state
            .commitments
            .get(&(begin, end))
            .copied()
            .ok_or(QueryError::MissingCommitment { begin, end })
    }

    async fn storage_heights_milestone(&self) -> Result<u64, QueryError> {
        let state = self.state.read().await;
        Ok(state.milestone)
    }
}

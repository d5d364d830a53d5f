//! Read-only view over the source chain's attestation state.

use alloy_primitives::B256;
use evm_bridge_types::{Attestation, MsgDataCommitmentConfirm, MsgValsetConfirm, Valset};

use crate::error::QueryError;

/// Everything the orchestrator pipeline reads. Nonce cursors are `None`
/// until the chain has produced its first attestation (resp. first unbonding
/// event), which is what the startup phase waits for.
#[async_trait::async_trait]
pub trait BridgeQuerier: Send + Sync {
    async fn latest_attestation_nonce(&self) -> Result<Option<u64>, QueryError>;

    async fn last_unbonding_attestation_nonce(&self) -> Result<Option<u64>, QueryError>;

    async fn attestation_by_nonce(&self, nonce: u64) -> Result<Option<Attestation>, QueryError>;

    async fn valset_by_nonce(&self, nonce: u64) -> Result<Option<Valset>, QueryError>;

    /// The valset with the highest nonce strictly less than `nonce`.
    async fn last_valset_before_nonce(&self, nonce: u64) -> Result<Valset, QueryError>;

    async fn valset_confirm(
        &self,
        nonce: u64,
        orchestrator: &str,
    ) -> Result<Option<MsgValsetConfirm>, QueryError>;

    async fn data_commitment_confirm(
        &self,
        nonce: u64,
        orchestrator: &str,
    ) -> Result<Option<MsgDataCommitmentConfirm>, QueryError>;

    /// The 32-byte data-root tuple root over blocks `[begin, end)`.
    async fn commitment(&self, begin: u64, end: u64) -> Result<B256, QueryError>;

    /// How far the local storage index has ingested, as a block height.
    async fn storage_heights_milestone(&self) -> Result<u64, QueryError>;
}

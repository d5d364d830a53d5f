//! Confirm messages orchestrators broadcast back to the source chain.
//!
//! These are carried inside source-chain transactions, so they are prost
//! messages; the hex fields keep the wire shape the EVM relayer expects
//! (addresses checksummed-hex, signatures 65-byte `r‖s‖v` hex).

use alloy_primitives::{hex, Address, B256};

/// Confirmation that an orchestrator signed a valset checkpoint.
#[derive(Clone, PartialEq, serde::Serialize, serde::Deserialize, prost::Message)]
pub struct MsgValsetConfirm {
    #[prost(uint64, tag = "1")]
    pub nonce: u64,
    /// Source-chain account (bech32) of the submitting orchestrator.
    #[prost(string, tag = "2")]
    pub orchestrator: String,
    #[prost(string, tag = "3")]
    pub eth_address: String,
    #[prost(string, tag = "4")]
    pub signature: String,
}

impl MsgValsetConfirm {
    pub fn new(nonce: u64, eth_address: Address, orchestrator: String, signature: &[u8]) -> Self {
        Self {
            nonce,
            orchestrator,
            eth_address: eth_address.to_string(),
            signature: hex::encode(signature),
        }
    }
}

/// Confirmation that an orchestrator signed a data-root tuple root for a
/// block range.
#[derive(Clone, PartialEq, serde::Serialize, serde::Deserialize, prost::Message)]
pub struct MsgDataCommitmentConfirm {
    #[prost(uint64, tag = "1")]
    pub nonce: u64,
    #[prost(uint64, tag = "2")]
    pub begin_block: u64,
    #[prost(uint64, tag = "3")]
    pub end_block: u64,
    /// Hex of the 32-byte data-root tuple root the signature covers.
    #[prost(string, tag = "4")]
    pub commitment: String,
    #[prost(string, tag = "5")]
    pub orchestrator: String,
    #[prost(string, tag = "6")]
    pub eth_address: String,
    #[prost(string, tag = "7")]
    pub signature: String,
}

impl MsgDataCommitmentConfirm {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        nonce: u64,
        begin_block: u64,
        end_block: u64,
        commitment: B256,
        eth_address: Address,
        orchestrator: String,
        signature: &[u8],
    ) -> Self {
        Self {
            nonce,
            begin_block,
            end_block,
            commitment: hex::encode(commitment),
            orchestrator,
            eth_address: eth_address.to_string(),
            signature: hex::encode(signature),
        }
    }
}

/// A confirm message ready for broadcast, tagged with its protobuf type URL.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfirmMessage {
    Valset(MsgValsetConfirm),
    DataCommitment(MsgDataCommitmentConfirm),
}

impl ConfirmMessage {
    pub fn nonce(&self) -> u64 {
        match self {
            Self::Valset(msg) => msg.nonce,
            Self::DataCommitment(msg) => msg.nonce,
        }
    }

    pub fn type_url(&self) -> &'static str {
        match self {
            Self::Valset(_) => "/bridge.v1.MsgValsetConfirm",
            Self::DataCommitment(_) => "/bridge.v1.MsgDataCommitmentConfirm",
        }
    }

    pub fn encode_to_vec(&self) -> Vec<u8> {
        use prost::Message;
        match self {
            Self::Valset(msg) => msg.encode_to_vec(),
            Self::DataCommitment(msg) => msg.encode_to_vec(),
        }
    }
}

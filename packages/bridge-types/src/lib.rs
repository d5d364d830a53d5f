//! Attestation data model and EVM checkpoint encoding for the bridge.

pub mod attestation;
pub mod checkpoint;
pub mod confirm;
pub mod validator;

pub use attestation::{Attestation, AttestationKind, DataCommitment};
pub use confirm::{MsgDataCommitmentConfirm, MsgValsetConfirm};
pub use validator::{power_diff, BridgeValidator, Valset};

//! Attestations: on-chain records requesting an EVM-side commitment.

use crate::validator::Valset;

/// A request to commit to the data roots of a block range. The range is
/// half-open: blocks in `[begin_block, end_block)` are covered.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DataCommitment {
    pub nonce: u64,
    pub begin_block: u64,
    pub end_block: u64,
    /// Unix seconds of the block that created the attestation.
    pub block_time: u64,
}

/// Discriminant for [`Attestation`], used for dispatch and logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttestationKind {
    Valset,
    DataCommitment,
}

impl std::fmt::Display for AttestationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Valset => write!(f, "valset"),
            Self::DataCommitment => write!(f, "data_commitment"),
        }
    }
}

/// An entry in the totally ordered attestation log. Every variant carries a
/// nonce and a creation time; the payload decides what orchestrators sign.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Attestation {
    Valset(Valset),
    DataCommitment(DataCommitment),
}

impl Attestation {
    pub fn nonce(&self) -> u64 {
        match self {
            Self::Valset(vs) => vs.nonce,
            Self::DataCommitment(dc) => dc.nonce,
        }
    }

    pub fn block_time(&self) -> u64 {
        match self {
            Self::Valset(vs) => vs.block_time,
            Self::DataCommitment(dc) => dc.block_time,
        }
    }

    pub fn kind(&self) -> AttestationKind {
        match self {
            Self::Valset(_) => AttestationKind::Valset,
            Self::DataCommitment(_) => AttestationKind::DataCommitment,
        }
    }
}

impl From<Valset> for Attestation {
    fn from(vs: Valset) -> Self {
        Self::Valset(vs)
    }
}

impl From<DataCommitment> for Attestation {
    fn from(dc: DataCommitment) -> Self {
        Self::DataCommitment(dc)
    }
}

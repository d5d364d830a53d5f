//! The on-chain half of the bridge: the attestation log and the end-of-block
//! procedure that appends to it.

pub mod error;
pub mod producer;
pub mod store;

pub use error::{ProducerError, StoreError};
pub use producer::{AttestationProducer, ProducerParams, StakingView};
pub use store::{AttestationStore, InMemoryStore};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("attestation nonce {got} does not extend the log (latest is {latest})")]
    NonceGap { got: u64, latest: u64 },

    #[error("the first attestation in the log must be a valset")]
    GenesisNotValset,

    #[error("no attestation stored at nonce {0}")]
    Missing(u64),

    #[error("storage backend: {0}")]
    Io(String),
}

#[derive(Debug, Error)]
pub enum ProducerError {
    #[error("store: {0}")]
    Store(#[from] StoreError),

    #[error("staking view: {0}")]
    Staking(String),
}

use thiserror::Error;

/// Failure talking to the source chain's read side. Always retriable.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("transport: {0}")]
    Transport(String),

    #[error("no valset with nonce below {0}")]
    NoValsetBefore(u64),

    #[error("no valset stored at nonce {0}")]
    ValsetNotFound(u64),

    #[error("no commitment indexed for blocks [{begin}, {end})")]
    MissingCommitment { begin: u64, end: u64 },
}

/// Failure in the sign-build-submit pipeline.
#[derive(Debug, Error)]
pub enum BroadcastError {
    #[error("transport: {0}")]
    Transport(String),

    #[error("tx rejected with code {code}: {log}")]
    Tx { code: u32, log: String },

    #[error("signing: {0}")]
    Signing(String),

    #[error("encoding: {0}")]
    Encoding(String),
}

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("query: {0}")]
    Query(#[from] QueryError),

    #[error("broadcast: {0}")]
    Broadcast(#[from] BroadcastError),

    #[error("processing nonce {nonce} failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        nonce: u64,
        attempts: usize,
        #[source]
        source: Box<OrchestratorError>,
    },
}

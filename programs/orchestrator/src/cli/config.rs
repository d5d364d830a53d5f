//! Defines the top level configuration for the orchestrator.
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use std::{fmt, fs};

use alloy_primitives::B256;
use thiserror::Error;
use tracing::Level;

use crate::error::BroadcastError;
use crate::signer::EvmSigner;

/// The top level configuration for the orchestrator.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct OrchestratorConfig {
    pub bridge: BridgeConfig,
    pub orchestrator: PipelineConfig,
    pub signer: SignerConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl OrchestratorConfig {
    /// Load an `OrchestratorConfig` from a TOML file on disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .map_err(|e| ConfigError::Io(path_ref.display().to_string(), e))?;
        let cfg: Self = toml::from_str(&contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.bridge.data_commitment_window == 0 {
            return Err(ConfigError::Invalid(
                "data_commitment_window must be positive".to_string(),
            ));
        }
        if self.orchestrator.gas_limit == 0 {
            return Err(ConfigError::Invalid("gas_limit must be positive".to_string()));
        }
        let threshold = self.bridge.significant_power_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "significant_power_threshold must be in (0, 1], got {threshold}"
            )));
        }
        Ok(())
    }
}

/// Parameters shared with the EVM contract and the chain's attestation
/// production.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct BridgeConfig {
    /// 32-byte domain separator shared with the EVM contract.
    pub bridge_id: B256,
    pub data_commitment_window: u64,
    #[serde(default = "default_attestation_expiry_secs")]
    pub attestation_expiry_secs: u64,
    #[serde(default = "default_significant_power_threshold")]
    pub significant_power_threshold: f64,
}

impl BridgeConfig {
    pub fn attestation_expiry(&self) -> Duration {
        Duration::from_secs(self.attestation_expiry_secs)
    }
}

fn default_attestation_expiry_secs() -> u64 {
    // 8 weeks
    8 * 7 * 24 * 60 * 60
}

fn default_significant_power_threshold() -> f64 {
    0.05
}

#[derive(Clone, Debug, serde::Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub max_retries: usize,
    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,
    /// Local height this orchestrator instance started at; gates signing on
    /// the storage ingestion milestone.
    #[serde(default)]
    pub start_height: u64,
    /// The source-chain account (bech32) confirms are submitted under.
    pub account_address: String,
    pub account_number: u64,
    pub chain_id: String,
    /// RPC endpoint transactions are submitted to.
    pub rpc_url: String,
}

fn default_gas_limit() -> u64 {
    100_000
}

#[derive(Clone, Debug, serde::Deserialize)]
pub struct SignerConfig {
    /// Hex-encoded EVM private key. Takes precedence over `keystore`.
    pub private_key: Option<String>,
    /// Path to an encrypted keystore file.
    pub keystore: Option<String>,
    #[serde(default)]
    pub keystore_password: String,
    /// Hex-encoded source-chain account key used to sign the carrier txs.
    pub account_key: String,
}

impl SignerConfig {
    pub fn evm_signer(&self) -> Result<EvmSigner, ConfigError> {
        match (&self.private_key, &self.keystore) {
            (Some(key), _) => Ok(EvmSigner::from_hex_key(key)?),
            (None, Some(path)) => Ok(EvmSigner::from_keystore(path, &self.keystore_password)?),
            (None, None) => Err(ConfigError::Invalid(
                "signer needs either private_key or keystore".to_string(),
            )),
        }
    }
}

/// The configuration for logging and diagnostics.
#[derive(Clone, Debug, Default, serde::Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub log_level: String,
}

impl ServerConfig {
    /// Returns the configured log level, defaulting to `info`.
    pub fn log_level(&self) -> Level {
        Level::from_str(&self.log_level).unwrap_or(Level::INFO)
    }
}

/// Errors that can occur loading the orchestrator config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading `{0}`: {1}")]
    Io(String, #[source] std::io::Error),

    #[error("invalid TOML in config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("signer: {0}")]
    Signer(#[from] BroadcastError),
}

impl fmt::Display for OrchestratorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bridge_id={} window={} chain_id={}",
            self.bridge.bridge_id,
            self.bridge.data_commitment_window,
            self.orchestrator.chain_id
        )
    }
}

//! EVM-key signing of checkpoint digests.

use std::path::Path;

use alloy_primitives::{Address, B256};
use alloy_signer::SignerSync;
use alloy_signer_local::{LocalSigner, PrivateKeySigner};

use crate::error::BroadcastError;

/// Wraps the orchestrator's secp256k1 EVM key. The digests signed here are
/// already keccak-256 checkpoint digests, so signing never prehashes.
#[derive(Clone, Debug)]
pub struct EvmSigner {
    signer: PrivateKeySigner,
}

impl EvmSigner {
    pub fn new(signer: PrivateKeySigner) -> Self {
        Self { signer }
    }

    pub fn from_hex_key(key: &str) -> Result<Self, BroadcastError> {
        let signer = key
            .trim_start_matches("0x")
            .parse::<PrivateKeySigner>()
            .map_err(|e| BroadcastError::Signing(e.to_string()))?;
        Ok(Self { signer })
    }

    pub fn from_keystore<P: AsRef<Path>>(path: P, password: &str) -> Result<Self, BroadcastError> {
        let signer = LocalSigner::decrypt_keystore(path, password)
            .map_err(|e| BroadcastError::Signing(e.to_string()))?;
        Ok(Self { signer })
    }

    /// The ethereum address valsets list this orchestrator under.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Sign a 32-byte checkpoint digest, returning the 65-byte `r‖s‖v`
    /// signature with `v` normalized to 27/28 as the EVM contract expects.
    pub fn sign_digest(&self, digest: B256) -> Result<[u8; 65], BroadcastError> {
        let signature = self
            .signer
            .sign_hash_sync(&digest)
            .map_err(|e| BroadcastError::Signing(e.to_string()))?;

        let mut bytes: [u8; 65] = signature.as_bytes();
        if bytes[64] < 27 {
            bytes[64] += 27;
        }
        Ok(bytes)
    }
}

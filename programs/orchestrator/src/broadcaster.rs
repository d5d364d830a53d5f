//! Serialized signing and submission of confirm messages.
//!
//! Sequence numbers on the source chain are assigned per account in strict
//! order, so the whole refresh-build-sign-submit pipeline runs under one
//! mutex: two in-flight submissions from the same orchestrator would race to
//! the same sequence number and one would be rejected.

use evm_bridge_types::confirm::ConfirmMessage;
use ibc_proto::cosmos::tx::signing::v1beta1::SignMode;
use ibc_proto::cosmos::tx::v1beta1::{
    mode_info, AuthInfo, Fee, ModeInfo, SignDoc, SignerInfo, TxBody, TxRaw,
};
use ibc_proto::google::protobuf::Any;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use prost::Message;
use sha2::{Digest, Sha256};
use tendermint_rpc::{Client, HttpClient};
use tracing::{debug, info};

use alloy_primitives::B256;
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;

use crate::error::BroadcastError;

/// Where the tx builder refreshes the signer's account number and sequence
/// from before every submission.
#[async_trait::async_trait]
pub trait AccountSource: Send + Sync {
    /// Returns `(account_number, sequence)`.
    async fn account_info(&self) -> Result<(u64, u64), BroadcastError>;
}

/// The narrow seam to the keyring and transaction builder.
#[async_trait::async_trait]
pub trait ConfirmTxBuilder: Send {
    async fn refresh_account(&mut self) -> Result<(), BroadcastError>;

    /// Build, sign and encode a transaction carrying exactly one confirm
    /// message.
    fn signed_tx_bytes(
        &self,
        msg: &ConfirmMessage,
        gas_limit: u64,
    ) -> Result<Vec<u8>, BroadcastError>;
}

/// Result of a block-inclusion submission.
#[derive(Clone, Debug)]
pub struct TxOutcome {
    pub code: u32,
    pub hash: String,
    pub log: String,
}

/// Submits an encoded transaction and blocks until it is included in a block.
#[async_trait::async_trait]
pub trait SubmitClient: Send + Sync {
    async fn submit_commit(&self, tx_bytes: Vec<u8>) -> Result<TxOutcome, BroadcastError>;
}

pub struct Broadcaster<T, C> {
    tx_builder: tokio::sync::Mutex<T>,
    client: C,
    gas_limit: u64,
}

impl<T, C> Broadcaster<T, C>
where
    T: ConfirmTxBuilder,
    C: SubmitClient,
{
    pub fn new(tx_builder: T, client: C, gas_limit: u64) -> Self {
        Self {
            tx_builder: tokio::sync::Mutex::new(tx_builder),
            client,
            gas_limit,
        }
    }

    /// Sign and submit one confirm message; returns the tx hash. The mutex
    /// guard spans submission, giving at most one in-flight tx per
    /// orchestrator.
    pub async fn broadcast(&self, msg: ConfirmMessage) -> Result<String, BroadcastError> {
        let mut builder = self.tx_builder.lock().await;

        builder.refresh_account().await?;
        let tx_bytes = builder.signed_tx_bytes(&msg, self.gas_limit)?;
        debug!(nonce = msg.nonce(), bytes = tx_bytes.len(), "submitting confirm tx");

        let outcome = self.client.submit_commit(tx_bytes).await?;
        if outcome.code != 0 {
            return Err(BroadcastError::Tx {
                code: outcome.code,
                log: outcome.log,
            });
        }
        info!(nonce = msg.nonce(), tx_hash = %outcome.hash, "confirm included");
        Ok(outcome.hash)
    }
}

/// The source-chain account key, serialized as a protobuf `Any`.
#[derive(Clone, PartialEq, Message)]
struct Secp256k1PubKey {
    #[prost(bytes = "vec", tag = "1")]
    key: Vec<u8>,
}

const PUBKEY_TYPE_URL: &str = "/cosmos.crypto.secp256k1.PubKey";

/// SIGN_MODE_DIRECT transaction builder over the source chain's tx
/// envelope. Holds the orchestrator's account key; account number and
/// sequence are refreshed through the [`AccountSource`].
pub struct CosmosTxBuilder {
    signer: PrivateKeySigner,
    chain_id: String,
    source: Box<dyn AccountSource>,
    account: Option<(u64, u64)>,
}

impl CosmosTxBuilder {
    pub fn new(signer: PrivateKeySigner, chain_id: String, source: Box<dyn AccountSource>) -> Self {
        Self {
            signer,
            chain_id,
            source,
            account: None,
        }
    }

    fn compressed_pubkey(&self) -> Vec<u8> {
        self.signer
            .credential()
            .verifying_key()
            .to_encoded_point(true)
            .as_bytes()
            .to_vec()
    }
}

#[async_trait::async_trait]
impl ConfirmTxBuilder for CosmosTxBuilder {
    async fn refresh_account(&mut self) -> Result<(), BroadcastError> {
        self.account = Some(self.source.account_info().await?);
        Ok(())
    }

    fn signed_tx_bytes(
        &self,
        msg: &ConfirmMessage,
        gas_limit: u64,
    ) -> Result<Vec<u8>, BroadcastError> {
        let (account_number, sequence) = self
            .account
            .ok_or_else(|| BroadcastError::Encoding("account not refreshed".to_string()))?;

        let body = TxBody {
            messages: vec![Any {
                type_url: msg.type_url().to_string(),
                value: msg.encode_to_vec(),
            }],
            ..TxBody::default()
        };

        let auth_info = AuthInfo {
            signer_infos: vec![SignerInfo {
                public_key: Some(Any {
                    type_url: PUBKEY_TYPE_URL.to_string(),
                    value: Secp256k1PubKey {
                        key: self.compressed_pubkey(),
                    }
                    .encode_to_vec(),
                }),
                mode_info: Some(ModeInfo {
                    sum: Some(mode_info::Sum::Single(mode_info::Single {
                        mode: SignMode::Direct as i32,
                    })),
                }),
                sequence,
            }],
            fee: Some(Fee {
                amount: vec![],
                gas_limit,
                payer: String::new(),
                granter: String::new(),
            }),
            ..AuthInfo::default()
        };

        let sign_doc = SignDoc {
            body_bytes: body.encode_to_vec(),
            auth_info_bytes: auth_info.encode_to_vec(),
            chain_id: self.chain_id.clone(),
            account_number,
        };

        let digest = Sha256::digest(sign_doc.encode_to_vec());
        let signature = self
            .signer
            .sign_hash_sync(&B256::from_slice(&digest))
            .map_err(|e| BroadcastError::Signing(e.to_string()))?;

        let raw = TxRaw {
            body_bytes: sign_doc.body_bytes,
            auth_info_bytes: sign_doc.auth_info_bytes,
            // r ‖ s only; the recovery byte is an EVM concern.
            signatures: vec![signature.as_bytes()[..64].to_vec()],
        };
        Ok(raw.encode_to_vec())
    }
}

/// Account source for an account this orchestrator is the only submitter
/// for: the account number is fixed and the sequence advances locally with
/// every refresh, which holds because the broadcaster serializes
/// submissions and waits for inclusion.
pub struct LocalSequenceSource {
    account_number: u64,
    sequence: std::sync::atomic::AtomicU64,
}

impl LocalSequenceSource {
    pub fn new(account_number: u64, starting_sequence: u64) -> Self {
        Self {
            account_number,
            sequence: std::sync::atomic::AtomicU64::new(starting_sequence),
        }
    }
}

#[async_trait::async_trait]
impl AccountSource for LocalSequenceSource {
    async fn account_info(&self) -> Result<(u64, u64), BroadcastError> {
        let sequence = self
            .sequence
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok((self.account_number, sequence))
    }
}

/// Block-inclusion submission over the source chain's RPC.
pub struct HttpSubmitClient {
    client: HttpClient,
}

impl HttpSubmitClient {
    pub fn new(rpc_url: &str) -> Result<Self, BroadcastError> {
        let client =
            HttpClient::new(rpc_url).map_err(|e| BroadcastError::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl SubmitClient for HttpSubmitClient {
    async fn submit_commit(&self, tx_bytes: Vec<u8>) -> Result<TxOutcome, BroadcastError> {
        let response = self
            .client
            .broadcast_tx_commit(tx_bytes)
            .await
            .map_err(|e| BroadcastError::Transport(e.to_string()))?;

        let (code, log) = if response.check_tx.code.is_err() {
            (response.check_tx.code.value(), response.check_tx.log)
        } else {
            (response.tx_result.code.value(), response.tx_result.log)
        };
        Ok(TxOutcome {
            code,
            hash: response.hash.to_string(),
            log,
        })
    }
}

#[cfg(test)]
mod broadcast {
    use super::*;
    use evm_bridge_types::MsgValsetConfirm;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct CountingBuilder {
        refreshes: Arc<AtomicU64>,
    }

    #[async_trait::async_trait]
    impl ConfirmTxBuilder for CountingBuilder {
        async fn refresh_account(&mut self) -> Result<(), BroadcastError> {
            self.refreshes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn signed_tx_bytes(
            &self,
            msg: &ConfirmMessage,
            _gas_limit: u64,
        ) -> Result<Vec<u8>, BroadcastError> {
            Ok(msg.encode_to_vec())
        }
    }

    struct OverlapDetectingClient {
        in_flight: Arc<AtomicBool>,
        overlapped: Arc<AtomicBool>,
        code: u32,
    }

    #[async_trait::async_trait]
    impl SubmitClient for OverlapDetectingClient {
        async fn submit_commit(&self, _tx_bytes: Vec<u8>) -> Result<TxOutcome, BroadcastError> {
            if self.in_flight.swap(true, Ordering::SeqCst) {
                self.overlapped.store(true, Ordering::SeqCst);
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.store(false, Ordering::SeqCst);
            Ok(TxOutcome {
                code: self.code,
                hash: "CAFEBABE".to_string(),
                log: "out of gas".to_string(),
            })
        }
    }

    fn confirm(nonce: u64) -> ConfirmMessage {
        ConfirmMessage::Valset(MsgValsetConfirm {
            nonce,
            orchestrator: "source1aaa".into(),
            eth_address: String::new(),
            signature: String::new(),
        })
    }

    #[tokio::test]
    async fn concurrent_broadcasts_never_overlap() {
        let overlapped = Arc::new(AtomicBool::new(false));
        let refreshes = Arc::new(AtomicU64::new(0));
        let broadcaster = Arc::new(Broadcaster::new(
            CountingBuilder {
                refreshes: refreshes.clone(),
            },
            OverlapDetectingClient {
                in_flight: Arc::new(AtomicBool::new(false)),
                overlapped: overlapped.clone(),
                code: 0,
            },
            100_000,
        ));

        let mut handles = Vec::new();
        for nonce in 1..=8 {
            let broadcaster = broadcaster.clone();
            handles.push(tokio::spawn(async move {
                broadcaster.broadcast(confirm(nonce)).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert!(
            !overlapped.load(Ordering::SeqCst),
            "two submissions were in flight at once"
        );
        assert_eq!(refreshes.load(Ordering::SeqCst), 8, "one refresh per call");
    }

    #[tokio::test]
    async fn non_zero_code_is_a_broadcast_failure() {
        let broadcaster = Broadcaster::new(
            CountingBuilder {
                refreshes: Arc::new(AtomicU64::new(0)),
            },
            OverlapDetectingClient {
                in_flight: Arc::new(AtomicBool::new(false)),
                overlapped: Arc::new(AtomicBool::new(false)),
                code: 11,
            },
            100_000,
        );

        let err = broadcaster.broadcast(confirm(1)).await.unwrap_err();
        assert!(matches!(err, BroadcastError::Tx { code: 11, .. }));
    }

    #[tokio::test]
    async fn tx_bytes_decode_back_to_the_message() {
        struct StaticSource;
        #[async_trait::async_trait]
        impl AccountSource for StaticSource {
            async fn account_info(&self) -> Result<(u64, u64), BroadcastError> {
                Ok((7, 42))
            }
        }

        let mut builder = CosmosTxBuilder::new(
            PrivateKeySigner::random(),
            "bridge-test-1".into(),
            Box::new(StaticSource),
        );
        builder.refresh_account().await.unwrap();

        let msg = confirm(9);
        let bytes = builder.signed_tx_bytes(&msg, 100_000).unwrap();

        let raw = TxRaw::decode(bytes.as_slice()).unwrap();
        assert_eq!(raw.signatures.len(), 1);
        assert_eq!(raw.signatures[0].len(), 64);

        let body = TxBody::decode(raw.body_bytes.as_slice()).unwrap();
        assert_eq!(body.messages.len(), 1);
        assert_eq!(body.messages[0].type_url, "/bridge.v1.MsgValsetConfirm");
        let decoded = MsgValsetConfirm::decode(body.messages[0].value.as_slice()).unwrap();
        assert_eq!(decoded.nonce, 9);
    }
}

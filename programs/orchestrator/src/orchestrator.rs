//! The four-task signing pipeline.
//!
//! A listener discovers new attestation nonces, a backfill task walks history
//! down to the unbonding cutoff, a forwarder drains the requeue channel, and
//! a single processor signs and broadcasts. All coordination happens over two
//! bounded channels plus the shutdown signal; a full `nonces` channel is
//! backpressure, never data loss.

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::B256;
use evm_bridge_types::checkpoint::{tuple_root_digest, valset_checkpoint_digest};
use evm_bridge_types::confirm::ConfirmMessage;
use evm_bridge_types::{
    Attestation, DataCommitment, MsgDataCommitmentConfirm, MsgValsetConfirm, Valset,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::broadcaster::{Broadcaster, ConfirmTxBuilder, SubmitClient};
use crate::error::{BroadcastError, OrchestratorError, QueryError};
use crate::querier::BridgeQuerier;
use crate::retrier::Retrier;
use crate::shutdown::{self, Shutdown};
use crate::signer::EvmSigner;

const NONCE_QUEUE_CAPACITY: usize = 100;
const POLL_INTERVAL: Duration = Duration::from_secs(1);
const BACKFILL_LOG_EVERY: u64 = 100;

/// The orchestrator's view of the broadcaster; lets tests observe broadcasts.
#[async_trait::async_trait]
pub trait ConfirmBroadcaster: Send + Sync {
    async fn broadcast(&self, msg: ConfirmMessage) -> Result<String, BroadcastError>;
}

#[async_trait::async_trait]
impl<T, C> ConfirmBroadcaster for Broadcaster<T, C>
where
    T: ConfirmTxBuilder + Send,
    C: SubmitClient,
{
    async fn broadcast(&self, msg: ConfirmMessage) -> Result<String, BroadcastError> {
        Self::broadcast(self, msg).await
    }
}

pub struct Orchestrator<Q, B> {
    querier: Q,
    broadcaster: B,
    retrier: Retrier,
    signer: EvmSigner,
    /// Source-chain account confirms are indexed under.
    account_address: String,
    bridge_id: B256,
    /// Local height this orchestrator started at; below it, signing waits for
    /// storage to catch up instead of racing ingestion.
    start_height: u64,
}

impl<Q, B> Orchestrator<Q, B>
where
    Q: BridgeQuerier + 'static,
    B: ConfirmBroadcaster + 'static,
{
    pub fn new(
        querier: Q,
        broadcaster: B,
        retrier: Retrier,
        signer: EvmSigner,
        account_address: String,
        bridge_id: B256,
        start_height: u64,
    ) -> Self {
        Self {
            querier,
            broadcaster,
            retrier,
            signer,
            account_address,
            bridge_id,
            start_height,
        }
    }

    /// Run the pipeline until the context is cancelled or a nonce fails
    /// terminally. The first task error is returned.
    pub async fn start(self: Arc<Self>, ctx: Shutdown) -> Result<(), OrchestratorError> {
        let (signal, signal_rx) = shutdown::channel();
        let signal = Arc::new(signal);

        // Workers are useless until the chain has produced an attestation and
        // recorded an unbonding cutoff.
        let Some(latest) = self.await_latest_nonce(&mut ctx.clone()).await? else {
            return Ok(());
        };
        let Some(unbonding) = self.await_unbonding_nonce(&mut ctx.clone()).await? else {
            return Ok(());
        };
        info!(
            latest_nonce = latest,
            last_unbonding_nonce = unbonding,
            "starting orchestrator pipeline"
        );

        let (nonces_tx, nonces_rx) = mpsc::channel(NONCE_QUEUE_CAPACITY);
        let (requeue_tx, requeue_rx) = mpsc::channel(NONCE_QUEUE_CAPACITY);

        let mut tasks: Vec<JoinHandle<Result<(), OrchestratorError>>> = Vec::new();

        {
            let this = self.clone();
            let queue = nonces_tx.clone();
            let (signal, signal_rx, ctx) = (signal.clone(), signal_rx.clone(), ctx.clone());
            tasks.push(tokio::spawn(async move {
                let result = this.listen_for_new_nonces(queue, latest, signal_rx, ctx).await;
                if let Err(err) = &result {
                    error!(%err, "listener failed");
                    signal.trigger();
                }
                info!("stopped listening for new attestations");
                result
            }));
        }

        {
            let queue = nonces_tx.clone();
            let (signal_rx, ctx) = (signal_rx.clone(), ctx.clone());
            tasks.push(tokio::spawn(async move {
                backfill_nonces(queue, unbonding, latest, signal_rx, ctx).await;
                Ok(())
            }));
        }

        {
            let queue = nonces_tx;
            let (signal_rx, ctx) = (signal_rx.clone(), ctx.clone());
            tasks.push(tokio::spawn(async move {
                forward_requeued_nonces(requeue_rx, queue, signal_rx, ctx).await;
                Ok(())
            }));
        }

        {
            let this = self;
            tasks.push(tokio::spawn(async move {
                let result = this
                    .process_nonces(nonces_rx, requeue_tx, &signal, signal_rx, ctx)
                    .await;
                if let Err(err) = &result {
                    error!(%err, "processor failed terminally");
                }
                result
            }));
        }

        let mut first_err = None;
        for task in tasks {
            match task.await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => first_err = first_err.or(Some(err)),
                Err(join_err) => {
                    error!(%join_err, "pipeline task panicked");
                }
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    async fn await_latest_nonce(
        &self,
        ctx: &mut Shutdown,
    ) -> Result<Option<u64>, OrchestratorError> {
        let mut ticker = tokio::time::interval(POLL_INTERVAL);
        loop {
            tokio::select! {
                () = ctx.triggered() => return Ok(None),
                _ = ticker.tick() => {
                    if let Some(nonce) = self.querier.latest_attestation_nonce().await? {
                        return Ok(Some(nonce));
                    }
                }
            }
        }
    }

    async fn await_unbonding_nonce(
        &self,
        ctx: &mut Shutdown,
    ) -> Result<Option<u64>, OrchestratorError> {
        let mut ticker = tokio::time::interval(POLL_INTERVAL);
        loop {
            tokio::select! {
                () = ctx.triggered() => return Ok(None),
                _ = ticker.tick() => {
                    if let Some(nonce) = self.querier.last_unbonding_attestation_nonce().await? {
                        return Ok(Some(nonce));
                    }
                }
            }
        }
    }

    /// Poll for new attestations once per second and enqueue every nonce the
    /// cursor moved past. The lower bound stays inclusive so a nonce racing
    /// startup is never missed; the processor's confirm check deduplicates.
    async fn listen_for_new_nonces(
        &self,
        queue: mpsc::Sender<u64>,
        mut current: u64,
        mut signal: Shutdown,
        mut ctx: Shutdown,
    ) -> Result<(), OrchestratorError> {
        info!("listening for new attestation nonces");
        let mut ticker = tokio::time::interval(POLL_INTERVAL);
        loop {
            tokio::select! {
                () = signal.triggered() => return Ok(()),
                () = ctx.triggered() => return Ok(()),
                _ = ticker.tick() => {
                    let Some(latest) = self.querier.latest_attestation_nonce().await? else {
                        continue;
                    };
                    if latest <= current {
                        continue;
                    }
                    for nonce in current..=latest {
                        tokio::select! {
                            () = signal.triggered() => return Ok(()),
                            sent = queue.send(nonce) => {
                                if sent.is_err() {
                                    return Ok(());
                                }
                                debug!(nonce, "enqueued new attestation nonce");
                            }
                        }
                    }
                    current = latest;
                }
            }
        }
    }

    async fn process_nonces(
        &self,
        mut queue: mpsc::Receiver<u64>,
        requeue: mpsc::Sender<u64>,
        signal: &shutdown::ShutdownSignal,
        mut signal_rx: Shutdown,
        mut ctx: Shutdown,
    ) -> Result<(), OrchestratorError> {
        loop {
            tokio::select! {
                () = signal_rx.triggered() => return Ok(()),
                () = ctx.triggered() => return Ok(()),
                maybe_nonce = queue.recv() => {
                    let Some(nonce) = maybe_nonce else {
                        return Ok(());
                    };
                    debug!(nonce, "processing nonce");
                    if let Err(err) = self.process(nonce, &requeue).await {
                        error!(nonce, %err, "failed to process nonce, retrying");
                        let attempt = |n, q: mpsc::Sender<u64>| async move {
                            self.process(n, &q).await
                        };
                        if let Err(err) = self
                            .retrier
                            .retry(&mut ctx, nonce, requeue.clone(), attempt)
                            .await
                        {
                            // Without progress here the orchestrator has no
                            // useful work left; take the whole pipeline down.
                            signal.trigger();
                            return Err(err);
                        }
                    }
                }
            }
        }
    }

    /// Handle a single nonce end to end. `Ok` covers the skip cases (below
    /// the unbonding cutoff, not in the signing set, already confirmed) and
    /// the requeue cases (not yet indexed, storage behind); errors are
    /// transient failures the retrier may re-run.
    pub async fn process(
        &self,
        nonce: u64,
        requeue: &mpsc::Sender<u64>,
    ) -> Result<(), OrchestratorError> {
        // The cutoff may have advanced since the nonce was enqueued.
        if let Some(unbonding) = self.querier.last_unbonding_attestation_nonce().await? {
            if nonce < unbonding {
                debug!(
                    nonce,
                    last_unbonding_nonce = unbonding,
                    "nonce predates unbonding cutoff, not signing"
                );
                return Ok(());
            }
        }

        let Some(att) = self.querier.attestation_by_nonce(nonce).await? else {
            // Not ingested locally yet; try again once ingestion catches up.
            debug!(nonce, "attestation not yet indexed, requeueing");
            let _ = requeue.send(nonce).await;
            return Ok(());
        };
        debug!(nonce, kind = %att.kind(), "processing attestation");

        let signing_valset = self.signing_valset(nonce).await?;
        if !signing_valset.contains(self.signer.address()) {
            debug!(nonce, "not part of the signing valset, not signing");
            return Ok(());
        }

        match att {
            Attestation::Valset(vs) => self.process_valset(vs, requeue).await,
            Attestation::DataCommitment(dc) => self.process_data_commitment(dc, requeue).await,
        }
    }

    /// The valset responsible for signing `nonce`: the last valset strictly
    /// before it, except nonce 1 which is signed by the valset it carries.
    async fn signing_valset(&self, nonce: u64) -> Result<Valset, OrchestratorError> {
        if nonce == 1 {
            return Ok(self
                .querier
                .valset_by_nonce(1)
                .await?
                .ok_or(QueryError::ValsetNotFound(1))?);
        }
        Ok(self.querier.last_valset_before_nonce(nonce).await?)
    }

    async fn process_valset(
        &self,
        valset: Valset,
        requeue: &mpsc::Sender<u64>,
    ) -> Result<(), OrchestratorError> {
        if self.storage_behind(valset.height).await? {
            debug!(
                nonce = valset.nonce,
                height = valset.height,
                "storage has not ingested the valset height yet, requeueing"
            );
            let _ = requeue.send(valset.nonce).await;
            return Ok(());
        }

        if let Some(existing) = self
            .querier
            .valset_confirm(valset.nonce, &self.account_address)
            .await?
        {
            debug!(
                nonce = valset.nonce,
                signature = %existing.signature,
                "valset already signed"
            );
            return Ok(());
        }

        let digest = valset_checkpoint_digest(self.bridge_id, &valset);
        let signature = self.signer.sign_digest(digest)?;
        let msg = MsgValsetConfirm::new(
            valset.nonce,
            self.signer.address(),
            self.account_address.clone(),
            &signature,
        );
        let tx_hash = self
            .broadcaster
            .broadcast(ConfirmMessage::Valset(msg))
            .await?;
        info!(nonce = valset.nonce, %tx_hash, "signed valset");
        Ok(())
    }

    async fn process_data_commitment(
        &self,
        dc: DataCommitment,
        requeue: &mpsc::Sender<u64>,
    ) -> Result<(), OrchestratorError> {
        if self.storage_behind(dc.end_block).await? {
            debug!(
                nonce = dc.nonce,
                end_block = dc.end_block,
                "storage has not ingested the commitment range yet, requeueing"
            );
            let _ = requeue.send(dc.nonce).await;
            return Ok(());
        }

        if let Some(existing) = self
            .querier
            .data_commitment_confirm(dc.nonce, &self.account_address)
            .await?
        {
            debug!(
                nonce = dc.nonce,
                commitment = %existing.commitment,
                "data commitment already signed"
            );
            return Ok(());
        }

        let commitment = self.querier.commitment(dc.begin_block, dc.end_block).await?;
        let digest = tuple_root_digest(self.bridge_id, dc.nonce, commitment);
        let signature = self.signer.sign_digest(digest)?;
        let msg = MsgDataCommitmentConfirm::new(
            dc.nonce,
            dc.begin_block,
            dc.end_block,
            commitment,
            self.signer.address(),
            self.account_address.clone(),
            &signature,
        );
        let tx_hash = self
            .broadcaster
            .broadcast(ConfirmMessage::DataCommitment(msg))
            .await?;
        info!(
            nonce = dc.nonce,
            begin_block = dc.begin_block,
            end_block = dc.end_block,
            %tx_hash,
            "signed data commitment"
        );
        Ok(())
    }

    /// True when `height` is past the local index but within what this
    /// instance is expected to ingest itself (heights before `start_height`
    /// arrive through backfill ingestion, which may still be running).
    async fn storage_behind(&self, height: u64) -> Result<bool, OrchestratorError> {
        let milestone = self.querier.storage_heights_milestone().await?;
        Ok(height > milestone && height <= self.start_height)
    }
}

/// Enqueue history from `latest` down to the unbonding cutoff.
async fn backfill_nonces(
    queue: mpsc::Sender<u64>,
    unbonding: u64,
    latest: u64,
    mut signal: Shutdown,
    mut ctx: Shutdown,
) {
    info!(
        latest_nonce = latest,
        last_unbonding_nonce = unbonding,
        "syncing missing nonces"
    );
    for nonce in (unbonding..=latest).rev() {
        if (latest - nonce) % BACKFILL_LOG_EVERY == 0 {
            debug!(nonce, last_unbonding_nonce = unbonding, "backfill progress");
        }
        tokio::select! {
            () = signal.triggered() => return,
            () = ctx.triggered() => return,
            sent = queue.send(nonce) => {
                if sent.is_err() {
                    return;
                }
            }
        }
    }
    info!(
        latest_nonce = latest,
        last_unbonding_nonce = unbonding,
        "finished syncing missing nonces"
    );
}

/// Drain the requeue channel back into the nonce queue.
async fn forward_requeued_nonces(
    mut requeue: mpsc::Receiver<u64>,
    queue: mpsc::Sender<u64>,
    mut signal: Shutdown,
    mut ctx: Shutdown,
) {
    loop {
        tokio::select! {
            () = signal.triggered() => return,
            () = ctx.triggered() => return,
            maybe_nonce = requeue.recv() => {
                let Some(nonce) = maybe_nonce else { return };
                tokio::select! {
                    () = signal.triggered() => return,
                    sent = queue.send(nonce) => {
                        if sent.is_err() {
                            return;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod pipeline {
    use super::*;
    use crate::index::{Indexer, LocalIndex};
    use crate::shutdown::ShutdownSignal;
    use alloy_signer_local::PrivateKeySigner;
    use evm_bridge_types::BridgeValidator;
    use std::sync::Arc;

    const ACCOUNT: &str = "source1test";

    #[derive(Clone, Default)]
    struct MockBroadcaster {
        sent: Arc<tokio::sync::Mutex<Vec<ConfirmMessage>>>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl ConfirmBroadcaster for MockBroadcaster {
        async fn broadcast(&self, msg: ConfirmMessage) -> Result<String, BroadcastError> {
            if self.fail {
                return Err(BroadcastError::Transport("connection refused".into()));
            }
            self.sent.lock().await.push(msg);
            Ok("AB12".to_string())
        }
    }

    struct Harness {
        orchestrator: Arc<Orchestrator<LocalIndex, MockBroadcaster>>,
        indexer: Indexer,
        broadcaster: MockBroadcaster,
        signer_address: alloy_primitives::Address,
    }

    fn harness(start_height: u64, fail_broadcasts: bool) -> Harness {
        let index = LocalIndex::new();
        let indexer = Indexer::new(index.clone());
        let broadcaster = MockBroadcaster {
            fail: fail_broadcasts,
            ..MockBroadcaster::default()
        };
        let signer = EvmSigner::new(PrivateKeySigner::random());
        let signer_address = signer.address();
        let orchestrator = Arc::new(Orchestrator::new(
            index,
            broadcaster.clone(),
            Retrier::new(0),
            signer,
            ACCOUNT.to_string(),
            B256::ZERO,
            start_height,
        ));
        Harness {
            orchestrator,
            indexer,
            broadcaster,
            signer_address,
        }
    }

    fn member(address: alloy_primitives::Address) -> BridgeValidator {
        BridgeValidator {
            ethereum_address: address,
            power: 100,
        }
    }

    async fn seed_genesis_valset(h: &Harness, height: u64) {
        h.indexer
            .add_attestation(Valset::new(1, height, 0, vec![member(h.signer_address)]).into())
            .await;
        h.indexer.set_last_unbonding_nonce(1).await;
    }

    fn requeue_channel() -> (mpsc::Sender<u64>, mpsc::Receiver<u64>) {
        mpsc::channel(NONCE_QUEUE_CAPACITY)
    }

    #[tokio::test(start_paused = true)]
    async fn signs_valset_and_data_commitment_end_to_end() {
        let h = harness(0, false);
        seed_genesis_valset(&h, 5).await;
        h.indexer
            .add_attestation(
                DataCommitment {
                    nonce: 2,
                    begin_block: 0,
                    end_block: 400,
                    block_time: 10,
                }
                .into(),
            )
            .await;
        h.indexer
            .add_commitment(0, 400, B256::from([0x22; 32]))
            .await;

        let (signal, ctx) = shutdown::channel();
        let run = tokio::spawn(h.orchestrator.clone().start(ctx));

        let deadline = tokio::time::Instant::now() + Duration::from_secs(60);
        loop {
            if h.broadcaster.sent.lock().await.len() >= 2 {
                break;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "pipeline did not sign both attestations in time"
            );
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        signal.trigger();
        run.await.unwrap().unwrap();

        let sent = h.broadcaster.sent.lock().await;
        let nonces: Vec<u64> = sent.iter().map(ConfirmMessage::nonce).collect();
        assert!(nonces.contains(&1), "valset confirm missing: {nonces:?}");
        assert!(nonces.contains(&2), "commitment confirm missing: {nonces:?}");
        for msg in sent.iter() {
            match msg {
                ConfirmMessage::Valset(confirm) => {
                    assert_eq!(confirm.orchestrator, ACCOUNT);
                    assert_eq!(confirm.signature.len(), 130);
                }
                ConfirmMessage::DataCommitment(confirm) => {
                    assert_eq!((confirm.begin_block, confirm.end_block), (0, 400));
                    assert_eq!(confirm.commitment, alloy_primitives::hex::encode([0x22; 32]));
                }
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn already_signed_nonces_cause_zero_broadcasts() {
        let h = harness(0, false);
        seed_genesis_valset(&h, 5).await;
        h.indexer
            .add_attestation(Valset::new(7, 70, 0, vec![member(h.signer_address)]).into())
            .await;
        for nonce in 2..=6 {
            h.indexer
                .add_attestation(
                    DataCommitment {
                        nonce,
                        begin_block: (nonce - 2) * 400,
                        end_block: (nonce - 1) * 400,
                        block_time: 0,
                    }
                    .into(),
                )
                .await;
            h.indexer
                .add_data_commitment_confirm(MsgDataCommitmentConfirm {
                    nonce,
                    orchestrator: ACCOUNT.to_string(),
                    ..MsgDataCommitmentConfirm::default()
                })
                .await;
        }
        for nonce in [1, 7] {
            h.indexer
                .add_valset_confirm(MsgValsetConfirm {
                    nonce,
                    orchestrator: ACCOUNT.to_string(),
                    ..MsgValsetConfirm::default()
                })
                .await;
        }

        let (signal, ctx) = shutdown::channel();
        let run = tokio::spawn(h.orchestrator.clone().start(ctx));

        tokio::time::sleep(Duration::from_secs(10)).await;
        signal.trigger();
        run.await.unwrap().unwrap();

        assert!(
            h.broadcaster.sent.lock().await.is_empty(),
            "existing confirms must suppress every broadcast"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn terminal_broadcast_failure_tears_down_the_pipeline() {
        let h = harness(0, true);
        seed_genesis_valset(&h, 5).await;

        let (_signal, ctx) = shutdown::channel();
        let err = h.orchestrator.clone().start(ctx).await.unwrap_err();
        assert!(matches!(
            err,
            OrchestratorError::RetriesExhausted { nonce: 1, .. }
        ));
    }

    #[tokio::test]
    async fn nonce_below_unbonding_cutoff_is_skipped() {
        let h = harness(0, false);
        seed_genesis_valset(&h, 5).await;
        h.indexer.set_last_unbonding_nonce(5).await;

        let (requeue, mut requeue_rx) = requeue_channel();
        h.orchestrator.process(3, &requeue).await.unwrap();

        assert!(h.broadcaster.sent.lock().await.is_empty());
        assert!(requeue_rx.try_recv().is_err(), "cutoff skip must not requeue");
    }

    #[tokio::test]
    async fn unindexed_attestation_is_requeued() {
        let h = harness(0, false);
        seed_genesis_valset(&h, 5).await;

        let (requeue, mut requeue_rx) = requeue_channel();
        h.orchestrator.process(4, &requeue).await.unwrap();

        assert_eq!(requeue_rx.try_recv().unwrap(), 4);
    }

    #[tokio::test]
    async fn non_member_does_not_sign() {
        let h = harness(0, false);
        let stranger = alloy_primitives::Address::from([0x99; 20]);
        h.indexer
            .add_attestation(Valset::new(1, 5, 0, vec![member(stranger)]).into())
            .await;
        h.indexer.set_last_unbonding_nonce(1).await;

        let (requeue, _requeue_rx) = requeue_channel();
        h.orchestrator.process(1, &requeue).await.unwrap();

        assert!(h.broadcaster.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn valset_behind_storage_milestone_is_requeued() {
        // Started at height 100 with nothing ingested yet: a valset at height
        // 50 must wait for storage instead of signing blind.
        let h = harness(100, false);
        seed_genesis_valset(&h, 50).await;

        let (requeue, mut requeue_rx) = requeue_channel();
        h.orchestrator.process(1, &requeue).await.unwrap();

        assert_eq!(requeue_rx.try_recv().unwrap(), 1);
        assert!(h.broadcaster.sent.lock().await.is_empty());

        // Once ingestion passes the height, the same nonce signs.
        h.indexer.add_height(50).await;
        h.orchestrator.process(1, &requeue).await.unwrap();
        assert_eq!(h.broadcaster.sent.lock().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn listener_enqueues_every_missed_nonce_in_order() {
        let h = harness(0, false);
        seed_genesis_valset(&h, 5).await;
        for nonce in 2..=10 {
            h.indexer
                .add_attestation(Valset::new(nonce, nonce * 10, 0, vec![]).into())
                .await;
        }

        let (queue_tx, mut queue_rx) = mpsc::channel(NONCE_QUEUE_CAPACITY);
        let (signal, signal_rx) = shutdown::channel();
        let (_ctx_signal, ctx): (ShutdownSignal, Shutdown) = shutdown::channel();
        let orchestrator = h.orchestrator.clone();
        let listener = tokio::spawn(async move {
            orchestrator
                .listen_for_new_nonces(queue_tx, 10, signal_rx, ctx)
                .await
        });

        // The cursor jumps from 10 to 15 between polls.
        for nonce in 11..=15 {
            h.indexer
                .add_attestation(Valset::new(nonce, nonce * 10, 0, vec![]).into())
                .await;
        }

        let mut seen = Vec::new();
        while seen.len() < 6 {
            seen.push(queue_rx.recv().await.unwrap());
        }
        assert_eq!(seen, vec![10, 11, 12, 13, 14, 15]);

        signal.trigger();
        listener.await.unwrap().unwrap();
    }
}

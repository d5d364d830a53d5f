//! Fixed-attempt retry wrapper for nonce processing.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{error, info};

use crate::error::OrchestratorError;
use crate::shutdown::Shutdown;

const RETRY_DELAY: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct Retrier {
    max_retries: usize,
    delay: Duration,
}

impl Retrier {
    pub fn new(max_retries: usize) -> Self {
        Self {
            max_retries,
            delay: RETRY_DELAY,
        }
    }

    #[cfg(test)]
    fn with_delay(max_retries: usize, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// Re-run `op` for `nonce` up to `max_retries + 1` times with a fixed
    /// delay before each attempt. Cancellation ends the loop with a neutral
    /// `Ok`; exhausting every attempt surfaces the last error.
    pub async fn retry<F, Fut>(
        &self,
        shutdown: &mut Shutdown,
        nonce: u64,
        requeue: mpsc::Sender<u64>,
        op: F,
    ) -> Result<(), OrchestratorError>
    where
        F: Fn(u64, mpsc::Sender<u64>) -> Fut,
        Fut: Future<Output = Result<(), OrchestratorError>>,
    {
        let mut last_err = None;
        for attempt in 0..=self.max_retries {
            tokio::select! {
                () = shutdown.triggered() => return Ok(()),
                () = tokio::time::sleep(self.delay) => {}
            }
            info!(
                nonce,
                attempt,
                retries_left = self.max_retries - attempt,
                "retrying nonce"
            );
            match op(nonce, requeue.clone()).await {
                Ok(()) => {
                    info!(nonce, attempt, "nonce processing succeeded");
                    return Ok(());
                }
                Err(err) => {
                    error!(nonce, attempt, %err, "failed to process nonce");
                    last_err = Some(err);
                }
            }
        }

        // max_retries + 1 attempts all failed; last_err is always set here.
        Err(OrchestratorError::RetriesExhausted {
            nonce,
            attempts: self.max_retries + 1,
            source: Box::new(last_err.expect("at least one attempt ran")),
        })
    }

    /// [`Retrier::retry`], but a final failure panics. Reserved for paths
    /// where giving up would corrupt local state.
    pub async fn retry_then_fail<F, Fut>(
        &self,
        shutdown: &mut Shutdown,
        nonce: u64,
        requeue: mpsc::Sender<u64>,
        op: F,
    ) where
        F: Fn(u64, mpsc::Sender<u64>) -> Fut,
        Fut: Future<Output = Result<(), OrchestratorError>>,
    {
        if let Err(err) = self.retry(shutdown, nonce, requeue, op).await {
            panic!("{err}");
        }
    }
}

#[cfg(test)]
mod retry {
    use super::*;
    use crate::shutdown;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn harness() -> (Shutdown, mpsc::Sender<u64>) {
        let (signal, shutdown) = shutdown::channel();
        std::mem::forget(signal);
        let (tx, rx) = mpsc::channel(8);
        std::mem::forget(rx);
        (shutdown, tx)
    }

    #[tokio::test]
    async fn stops_at_first_success() {
        let (mut shutdown, requeue) = harness();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in_op = calls.clone();

        Retrier::with_delay(5, Duration::from_millis(1))
            .retry(&mut shutdown, 3, requeue, |_nonce, _requeue| {
                let calls = calls_in_op.clone();
                async move {
                    if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(OrchestratorError::Query(
                            crate::error::QueryError::Transport("flaky".into()),
                        ))
                    } else {
                        Ok(())
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausts_attempts_then_errors() {
        let (mut shutdown, requeue) = harness();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in_op = calls.clone();

        let err = Retrier::with_delay(2, Duration::from_millis(1))
            .retry(&mut shutdown, 9, requeue, |_nonce, _requeue| {
                let calls = calls_in_op.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(OrchestratorError::Query(
                        crate::error::QueryError::Transport("down".into()),
                    ))
                }
            })
            .await
            .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 3, "max_retries + 1 attempts");
        assert!(matches!(
            err,
            OrchestratorError::RetriesExhausted {
                nonce: 9,
                attempts: 3,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn cancellation_is_neutral() {
        let (signal, mut shutdown) = shutdown::channel();
        let (requeue, _rx) = mpsc::channel(8);
        signal.trigger();

        let result = Retrier::new(1_000)
            .retry(&mut shutdown, 1, requeue, |_nonce, _requeue| async {
                panic!("must not run after cancellation")
            })
            .await;
        assert!(result.is_ok());
    }
}

//! Broadcast shutdown signal shared by the pipeline tasks.

use tokio::sync::watch;

/// Create a linked trigger/listener pair. Dropping the trigger also wakes
/// every listener, so teardown cannot be lost.
pub fn channel() -> (ShutdownSignal, Shutdown) {
    let (tx, rx) = watch::channel(false);
    (ShutdownSignal { tx }, Shutdown { rx })
}

/// The sending half. Held by whoever may tear the pipeline down.
#[derive(Debug)]
pub struct ShutdownSignal {
    tx: watch::Sender<bool>,
}

impl ShutdownSignal {
    pub fn trigger(&self) {
        let _ = self.tx.send(true);
    }

    pub fn subscribe(&self) -> Shutdown {
        Shutdown {
            rx: self.tx.subscribe(),
        }
    }
}

/// The listening half; every task selects on [`Shutdown::triggered`] in each
/// blocking wait.
#[derive(Clone, Debug)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the signal fires (or its sender is gone).
    pub async fn triggered(&mut self) {
        while !*self.rx.borrow() {
            if self.rx.changed().await.is_err() {
                return;
            }
        }
    }
}

//! Cooperative request cancellation.

use std::sync::Arc;

use tokio::sync::watch;

/// Owner side: call [`abort`](AbortController::abort) to cancel every request
/// holding one of its signals.
#[derive(Debug, Clone)]
pub struct AbortController {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for AbortController {
    fn default() -> Self {
        Self::new()
    }
}

impl AbortController {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn signal(&self) -> AbortSignal {
        AbortSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Abort. Repeated calls are no-ops.
    pub fn abort(&self) {
        self.tx.send_if_modified(|aborted| !std::mem::replace(aborted, true));
    }

    pub fn is_aborted(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Observer side, handed to the client.
#[derive(Debug, Clone)]
pub struct AbortSignal {
    rx: watch::Receiver<bool>,
}

impl AbortSignal {
    pub fn is_aborted(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the controller aborts. Never resolves if the controller
    /// is dropped without aborting.
    pub async fn aborted(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|aborted| *aborted).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn signal_resolves_after_abort() {
        let controller = AbortController::new();
        let signal = controller.signal();
        assert!(!signal.is_aborted());

        controller.abort();
        controller.abort();
        assert!(signal.is_aborted());
        tokio::time::timeout(Duration::from_secs(1), signal.aborted())
            .await
            .expect("aborted signal should resolve");
    }

    #[tokio::test]
    async fn signal_taken_after_abort_is_aborted() {
        let controller = AbortController::new();
        controller.abort();
        assert!(controller.signal().is_aborted());
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_controller_never_aborts() {
        let signal = AbortController::new().signal();
        let waited = tokio::time::timeout(Duration::from_secs(5), signal.aborted()).await;
        assert!(waited.is_err());
        assert!(!signal.is_aborted());
    }
}

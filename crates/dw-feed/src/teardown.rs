use tokio::sync::watch;

/// One-shot cancellation signal for a feed task.
///
/// The flag is sticky: a guard created or polled after [`TeardownSignal::trigger`]
/// still observes it, so a task cannot miss the signal between two
/// suspension points.
pub struct TeardownSignal {
    tx: watch::Sender<bool>,
}

impl TeardownSignal {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    pub fn guard(&self) -> TeardownGuard {
        TeardownGuard {
            rx: self.tx.subscribe(),
        }
    }

    pub fn trigger(&self) {
        log::debug!("Teardown signal triggered");
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for TeardownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Task-side half of a [`TeardownSignal`].
pub struct TeardownGuard {
    rx: watch::Receiver<bool>,
}

impl TeardownGuard {
    /// Resolve once teardown is triggered (or the signal is dropped).
    /// Cancel-safe, for use in `select!`.
    pub async fn wait(&mut self) {
        let _ = self.rx.wait_for(|triggered| *triggered).await;
    }

    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }
}

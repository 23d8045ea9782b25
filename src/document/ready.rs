use std::fmt::Display;
use tokio::sync::watch;

/// Loading state of a host document (`document.readyState`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    /// The document is still loading.
    Loading,
    /// Parsing has finished; sub-resources may still be loading.
    Interactive,
    /// Everything has finished loading.
    Complete,
}

impl Display for ReadyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadyState::Loading => write!(f, "loading"),
            ReadyState::Interactive => write!(f, "interactive"),
            ReadyState::Complete => write!(f, "complete"),
        }
    }
}

/// Host side of the ready signal. Owned by the document implementation.
#[derive(Debug)]
pub struct ReadySignal {
    tx: watch::Sender<ReadyState>,
}

impl ReadySignal {
    pub fn new(initial: ReadyState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn state(&self) -> ReadyState {
        *self.tx.borrow()
    }

    /// Moves the document to `state`. A document never goes back to `Loading`.
    pub fn set(&self, state: ReadyState) {
        self.tx.send_if_modified(|current| {
            if *current == state || state == ReadyState::Loading {
                return false;
            }
            *current = state;
            true
        });
    }

    /// Returns a waiter that resolves once the document has left `Loading`.
    pub fn subscribe(&self) -> DocumentReady {
        DocumentReady { rx: self.tx.subscribe() }
    }
}

/// One-shot "document is ready" future, the equivalent of `DOMContentLoaded`.
#[derive(Debug, Clone)]
pub struct DocumentReady {
    rx: watch::Receiver<ReadyState>,
}

impl DocumentReady {
    pub fn is_ready(&self) -> bool {
        *self.rx.borrow() != ReadyState::Loading
    }

    /// Resolves immediately when the document is no longer loading, otherwise
    /// on the first transition out of `Loading`.
    ///
    /// Never resolves if the host never signals readiness.
    pub async fn wait(mut self) {
        if self.rx.wait_for(|s| *s != ReadyState::Loading).await.is_err() {
            // The host went away while still loading.
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn ready_document_resolves_immediately() {
        let signal = ReadySignal::new(ReadyState::Complete);
        let ready = signal.subscribe();
        assert!(ready.is_ready());
        tokio::time::timeout(Duration::from_millis(100), ready.wait())
            .await
            .expect("wait should resolve immediately");
    }

    #[tokio::test]
    async fn loading_document_resolves_after_signal() {
        let signal = ReadySignal::new(ReadyState::Loading);
        let ready = signal.subscribe();
        assert!(!ready.is_ready());

        let waiter = tokio::spawn(ready.wait());
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        signal.set(ReadyState::Interactive);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("wait should resolve after the signal")
            .unwrap();
    }

    #[tokio::test]
    async fn never_signalled_document_stays_pending() {
        let signal = ReadySignal::new(ReadyState::Loading);
        let ready = signal.subscribe();
        drop(signal);

        let res = tokio::time::timeout(Duration::from_millis(50), ready.wait()).await;
        assert!(res.is_err());
    }

    #[test]
    fn state_never_returns_to_loading() {
        let signal = ReadySignal::new(ReadyState::Loading);
        signal.set(ReadyState::Complete);
        signal.set(ReadyState::Loading);
        assert_eq!(signal.state(), ReadyState::Complete);
        assert_eq!(ReadyState::Interactive.to_string(), "interactive");
    }
}

//! One-shot readiness signalling between an authenticator and its caller.
//!
//! An authenticator gets a [`ReadyNotifier`] in `prepare`. Synchronous
//! authenticators fire it before `prepare` returns; the tabs authenticator
//! fires it from the service-connected callback. The caller holds the
//! matching [`ReadySignal`].

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

use crate::authenticator::AuthenticatorKind;
use crate::error::AuthError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
    Ready(AuthenticatorKind),
    Disconnected,
}

/// Creates a connected notifier/signal pair.
pub fn channel() -> (ReadyNotifier, ReadySignal) {
    let (tx, rx) = oneshot::channel();
    (
        ReadyNotifier {
            tx: Arc::new(Mutex::new(Some(tx))),
        },
        ReadySignal { rx },
    )
}

/// Sending half. Clones share the same slot, so across all clones at most
/// one event is ever delivered.
#[derive(Debug, Clone)]
pub struct ReadyNotifier {
    tx: Arc<Mutex<Option<oneshot::Sender<Event>>>>,
}

impl ReadyNotifier {
    /// Reports readiness. Returns `false` if an event was already delivered
    /// or the signal side is gone.
    pub fn notify(&self, kind: AuthenticatorKind) -> bool {
        self.send(Event::Ready(kind))
    }

    /// Reports that the backing service went away before becoming ready.
    /// A no-op after [`notify`](Self::notify).
    pub fn disconnect(&self) -> bool {
        self.send(Event::Disconnected)
    }

    /// True once an event has been delivered.
    pub fn is_spent(&self) -> bool {
        self.tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    fn send(&self, event: Event) -> bool {
        let sender = self
            .tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match sender {
            Some(tx) => tx.send(event).is_ok(),
            None => false,
        }
    }
}

/// Receiving half.
#[derive(Debug)]
pub struct ReadySignal {
    rx: oneshot::Receiver<Event>,
}

impl ReadySignal {
    /// Waits for the authenticator to become ready.
    pub async fn wait(self) -> Result<AuthenticatorKind, AuthError> {
        match self.rx.await {
            Ok(event) => Self::resolve(event),
            Err(_) => Err(AuthError::ReadinessDropped),
        }
    }

    /// Non-blocking check; `None` while still pending.
    pub fn try_ready(&mut self) -> Option<Result<AuthenticatorKind, AuthError>> {
        match self.rx.try_recv() {
            Ok(event) => Some(Self::resolve(event)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => Some(Err(AuthError::ReadinessDropped)),
        }
    }

    fn resolve(event: Event) -> Result<AuthenticatorKind, AuthError> {
        match event {
            Event::Ready(kind) => Ok(kind),
            Event::Disconnected => Err(AuthError::Disconnected),
        }
    }
}

/// Liveness flag for whatever owns the login UI.
///
/// Completion is only reported while the owner is alive; the host marks it
/// destroyed when its screen goes away.
#[derive(Debug, Clone)]
pub struct OwnerHandle {
    alive: Arc<AtomicBool>,
}

impl OwnerHandle {
    pub fn new() -> Self {
        Self {
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    pub fn destroy(&self) {
        self.alive.store(false, Ordering::Release);
    }
}

impl Default for OwnerHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notifier_fires_at_most_once() {
        let (notifier, mut signal) = channel();
        let clone = notifier.clone();

        assert!(notifier.notify(AuthenticatorKind::Browser));
        assert!(!clone.notify(AuthenticatorKind::Browser));
        assert!(!clone.disconnect());
        assert!(clone.is_spent());

        assert!(matches!(
            signal.try_ready(),
            Some(Ok(AuthenticatorKind::Browser))
        ));
    }

    #[test]
    fn signal_reports_pending_then_dropped() {
        let (notifier, mut signal) = channel();
        assert!(signal.try_ready().is_none());

        drop(notifier);
        assert!(matches!(
            signal.try_ready(),
            Some(Err(AuthError::ReadinessDropped))
        ));
    }

    #[tokio::test]
    async fn disconnect_before_ready_is_an_error() {
        let (notifier, signal) = channel();
        assert!(notifier.disconnect());

        let err = signal.wait().await.unwrap_err();
        assert!(matches!(err, AuthError::Disconnected));
    }

    #[test]
    fn owner_handle_is_shared() {
        let owner = OwnerHandle::new();
        let view = owner.clone();
        assert!(view.is_alive());

        owner.destroy();
        assert!(!view.is_alive());
    }
}

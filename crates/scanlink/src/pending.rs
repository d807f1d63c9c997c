use std::sync::{Mutex, MutexGuard};

use bytes::Bytes;
use tokio::sync::oneshot;

use crate::error::{ClientError, Result};

/// Outcome delivered to the caller awaiting a response.
pub(crate) type CallResult = std::result::Result<Bytes, ClientError>;

/// The single in-flight request slot.
///
/// The protocol allows exactly one outstanding request per connection, so
/// correlation is positional: whatever arrives next belongs to whoever holds
/// the slot. Reserving an occupied slot is refused, never queued; the call
/// gate above this layer already serializes callers, and the slot defends
/// the invariant on its own.
#[derive(Debug, Default)]
pub(crate) struct PendingSlot {
    slot: Mutex<Option<oneshot::Sender<CallResult>>>,
}

impl PendingSlot {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Claim the slot for a new request.
    pub(crate) fn reserve(&self) -> Result<oneshot::Receiver<CallResult>> {
        let mut slot = self.lock();
        if slot.is_some() {
            return Err(ClientError::ProtocolBusy);
        }
        let (tx, rx) = oneshot::channel();
        *slot = Some(tx);
        Ok(rx)
    }

    /// Hand an inbound message to the reserved slot.
    ///
    /// Returns `Err(UnexpectedMessage)` when nothing is pending; the message
    /// is dropped and logging is the caller's job.
    pub(crate) fn resolve(&self, result: CallResult) -> Result<()> {
        match self.lock().take() {
            Some(tx) => {
                // Send fails if the caller gave up in the meantime; the
                // connection is being torn down then anyway.
                let _ = tx.send(result);
                Ok(())
            }
            None => Err(ClientError::UnexpectedMessage),
        }
    }

    /// Fail the in-flight request, if any.
    pub(crate) fn fail(&self, err: ClientError) {
        if let Some(tx) = self.lock().take() {
            let _ = tx.send(Err(err));
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<oneshot::Sender<CallResult>>> {
        self.slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserve_then_resolve_delivers() {
        let pending = PendingSlot::new();
        let mut rx = pending.reserve().unwrap();

        pending.resolve(Ok(Bytes::from_static(b"reply"))).unwrap();

        let delivered = rx.try_recv().unwrap().unwrap();
        assert_eq!(delivered.as_ref(), b"reply");
    }

    #[test]
    fn double_reserve_is_busy() {
        let pending = PendingSlot::new();
        let _rx = pending.reserve().unwrap();

        let err = pending.reserve().unwrap_err();
        assert!(matches!(err, ClientError::ProtocolBusy));
    }

    #[test]
    fn resolve_without_pending_is_unexpected() {
        let pending = PendingSlot::new();

        let err = pending.resolve(Ok(Bytes::new())).unwrap_err();
        assert!(matches!(err, ClientError::UnexpectedMessage));
    }

    #[test]
    fn fail_delivers_error() {
        let pending = PendingSlot::new();
        let mut rx = pending.reserve().unwrap();

        pending.fail(ClientError::NotConnected);

        let delivered = rx.try_recv().unwrap();
        assert!(matches!(delivered, Err(ClientError::NotConnected)));
    }

    #[test]
    fn fail_without_pending_is_noop() {
        let pending = PendingSlot::new();
        pending.fail(ClientError::NotConnected);
    }

    #[test]
    fn slot_is_free_again_after_resolve() {
        let pending = PendingSlot::new();

        let _first = pending.reserve().unwrap();
        pending.resolve(Ok(Bytes::new())).unwrap();

        assert!(pending.reserve().is_ok());
    }

    #[test]
    fn resolve_ignores_abandoned_receiver() {
        let pending = PendingSlot::new();
        let rx = pending.reserve().unwrap();
        drop(rx);

        // Slot still occupied; delivery goes nowhere but must not error.
        pending.resolve(Ok(Bytes::new())).unwrap();
        assert!(pending.reserve().is_ok());
    }
}

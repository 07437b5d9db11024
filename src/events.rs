//! Invalidation events feeding the preview scheduler.
//!
//! The host watches the source object (attribute edits, texture tweaks) and
//! pushes a [`SourceChanged`] per affected frame into a typed channel. The
//! scheduler drains the channel at the start of each tick, so a change made
//! mid-session gets its frame re-baked without any host-specific callback
//! wiring.

use crossbeam_channel::{Receiver, Sender, unbounded};

/// The baked source changed externally; the given frame is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceChanged {
    pub frame: i32,
}

/// Cloneable sender handle for the host side of the invalidation channel.
#[derive(Clone, Debug, Default)]
pub struct ChangeEventSender {
    sender: Option<Sender<SourceChanged>>,
}

impl ChangeEventSender {
    pub fn new(sender: Sender<SourceChanged>) -> Self {
        Self {
            sender: Some(sender),
        }
    }

    /// Disconnected sender (for tests or hosts without change tracking).
    pub fn dummy() -> Self {
        Self { sender: None }
    }

    /// Emit event (silent if the scheduler is gone).
    pub fn emit(&self, event: SourceChanged) {
        if let Some(ref tx) = self.sender {
            let _ = tx.send(event);
        }
    }
}

/// Build the invalidation channel: the sender goes to the host, the receiver
/// to the preview scheduler.
pub fn change_channel() -> (ChangeEventSender, Receiver<SourceChanged>) {
    let (tx, rx) = unbounded();
    (ChangeEventSender::new(tx), rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_delivers_events() {
        let (tx, rx) = change_channel();
        tx.emit(SourceChanged { frame: 7 });
        assert_eq!(rx.try_recv(), Ok(SourceChanged { frame: 7 }));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dummy_sender_is_silent() {
        let tx = ChangeEventSender::dummy();
        tx.emit(SourceChanged { frame: 1 });
    }

    #[test]
    fn test_emit_after_receiver_dropped_is_silent() {
        let (tx, rx) = change_channel();
        drop(rx);
        tx.emit(SourceChanged { frame: 3 });
    }
}

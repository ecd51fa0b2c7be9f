//! Pipeline message bus
//!
//! Single channel from the streaming task (and the pipeline's state
//! transitions) to the controlling task. The controller is the only
//! consumer; no component upstream of it attempts local recovery.

use tokio::sync::mpsc;

use crate::pipeline::PipelineState;

/// A message posted on the pipeline bus.
#[derive(Debug, Clone)]
pub struct Message {
    /// Name of the element (or pipeline) that posted the message
    pub src: String,

    /// Message payload
    pub kind: MessageKind,
}

/// Kinds of bus messages.
#[derive(Debug, Clone)]
pub enum MessageKind {
    /// Fatal error signaled by an element during streaming
    Error {
        /// Primary error message
        message: String,
        /// Optional diagnostic detail
        debug: Option<String>,
    },

    /// End of stream; normal termination, no payload
    Eos,

    /// Pipeline state transition (informational; the controller logs
    /// these as unexpected and keeps waiting)
    StateChanged {
        /// State before the transition
        from: PipelineState,
        /// State after the transition
        to: PipelineState,
    },
}

/// Posting half of the bus. Clonable; every element of the streaming
/// machinery that needs to signal the controller holds one.
#[derive(Clone)]
pub struct Bus {
    tx: mpsc::UnboundedSender<Message>,
}

impl Bus {
    /// Create a bus and its (single) receiving half.
    pub fn new() -> (Self, BusReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, BusReceiver { rx })
    }

    /// Post a message. Posting after the receiver is gone is a no-op.
    pub fn post(&self, src: impl Into<String>, kind: MessageKind) {
        let _ = self.tx.send(Message {
            src: src.into(),
            kind,
        });
    }

    /// Post a fatal element error.
    pub fn post_error(
        &self,
        src: impl Into<String>,
        message: impl Into<String>,
        debug: Option<String>,
    ) {
        self.post(
            src,
            MessageKind::Error {
                message: message.into(),
                debug,
            },
        );
    }

    /// Post end-of-stream.
    pub fn post_eos(&self, src: impl Into<String>) {
        self.post(src, MessageKind::Eos);
    }

    /// Post a state transition.
    pub fn post_state_changed(
        &self,
        src: impl Into<String>,
        from: PipelineState,
        to: PipelineState,
    ) {
        self.post(src, MessageKind::StateChanged { from, to });
    }
}

/// Receiving half of the bus, held by the controller.
pub struct BusReceiver {
    rx: mpsc::UnboundedReceiver<Message>,
}

impl BusReceiver {
    /// Await the next message. `None` means every posting half has been
    /// dropped.
    pub async fn recv(&mut self) -> Option<Message> {
        self.rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn messages_arrive_in_post_order() {
        let (bus, mut rx) = Bus::new();
        bus.post_error("embed_identity", "attach failed", Some("detail".into()));
        bus.post_eos("src");

        let first = rx.recv().await.expect("message");
        assert_eq!(first.src, "embed_identity");
        assert!(matches!(first.kind, MessageKind::Error { .. }));

        let second = rx.recv().await.expect("message");
        assert!(matches!(second.kind, MessageKind::Eos));
    }

    #[tokio::test]
    async fn receiver_sees_none_after_all_senders_drop() {
        let (bus, mut rx) = Bus::new();
        drop(bus);
        assert!(rx.recv().await.is_none());
    }
}

//! Identity element
//!
//! Passes frames through unchanged and exposes the frame-arrival event:
//! a registered [`FrameHandoff`] runs against every frame, synchronously,
//! before the frame is forwarded. The embed and extract points of the
//! demonstration pipeline are identity elements.

use serde_json::Value;

use crate::data::Frame;
use crate::error::Result;
use crate::nodes::{Element, ElementFactory, FrameHandoff};

/// Pass-through element with an optional per-frame handoff hook.
pub struct Identity {
    name: String,
    handoff: Option<Box<dyn FrameHandoff>>,
}

impl Identity {
    /// Create a new identity element with no handoff registered.
    pub fn new(name: String) -> Self {
        Self {
            name,
            handoff: None,
        }
    }
}

impl Element for Identity {
    fn name(&self) -> &str {
        &self.name
    }

    fn element_type(&self) -> &str {
        "Identity"
    }

    fn process(&mut self, mut frame: Frame) -> Result<Frame> {
        if let Some(handoff) = self.handoff.as_mut() {
            handoff.on_handoff(&mut frame)?;
        }
        Ok(frame)
    }

    fn set_handoff(&mut self, handoff: Box<dyn FrameHandoff>) -> Result<()> {
        self.handoff = Some(handoff);
        Ok(())
    }
}

/// Factory for [`Identity`].
pub struct IdentityFactory;

impl ElementFactory for IdentityFactory {
    fn create(&self, name: String, _params: &Value) -> Result<Box<dyn Element>> {
        Ok(Box::new(Identity::new(name)))
    }

    fn element_type(&self) -> &str {
        "Identity"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    struct RecordingHandoff {
        seen: std::sync::Arc<std::sync::atomic::AtomicUsize>,
    }

    impl FrameHandoff for RecordingHandoff {
        fn on_handoff(&mut self, _frame: &mut Frame) -> Result<()> {
            self.seen.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn passes_frames_through_unchanged() {
        let mut identity = Identity::new("ident".into());
        let frame = Frame::new(Bytes::from_static(b"payload"));
        let out = identity.process(frame).expect("process");
        assert_eq!(out.payload, Bytes::from_static(b"payload"));
    }

    #[test]
    fn handoff_runs_once_per_frame() {
        let seen = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let mut identity = Identity::new("ident".into());
        identity
            .set_handoff(Box::new(RecordingHandoff {
                seen: std::sync::Arc::clone(&seen),
            }))
            .expect("set_handoff");

        for _ in 0..3 {
            let frame = Frame::new(Bytes::from_static(b"payload"));
            identity.process(frame).expect("process");
        }
        assert_eq!(seen.load(std::sync::atomic::Ordering::SeqCst), 3);
    }
}

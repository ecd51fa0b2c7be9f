//! Extract stage: read the embedded counter back downstream
//!
//! Runs at the extract identity's frame-arrival event. Iterates the
//! frame's metadata, filters to counter records by descriptor identity,
//! and reports each match. A frame with no counter produces no output.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use crate::data::Frame;
use crate::error::Result;
use crate::meta::{CounterMeta, MetaDescriptor};
use crate::nodes::FrameHandoff;

/// Handoff that reports every counter record found on a frame.
///
/// Does not mutate the frame.
pub struct ExtractStage {
    descriptor: Arc<MetaDescriptor>,
    tap: Option<UnboundedSender<u64>>,
}

impl ExtractStage {
    /// Create an extract stage bound to the counter descriptor.
    ///
    /// The descriptor handle comes from the same registration as the
    /// embed side's, so matching is by identity.
    pub fn new() -> Self {
        Self {
            descriptor: CounterMeta::descriptor(),
            tap: None,
        }
    }

    /// Report every extracted value on `tap` (test instrumentation).
    pub fn with_tap(mut self, tap: UnboundedSender<u64>) -> Self {
        self.tap = Some(tap);
        self
    }
}

impl Default for ExtractStage {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameHandoff for ExtractStage {
    fn on_handoff(&mut self, frame: &mut Frame) -> Result<()> {
        for record in frame.meta.find_by_type(&self.descriptor) {
            if let Some(meta) = record.payload::<CounterMeta>() {
                println!("Extracted counter: {}", meta.counter);
                tracing::debug!(counter = meta.counter, "extracted frame counter");
                if let Some(tap) = &self.tap {
                    let _ = tap.send(meta.counter);
                }
            }
        }
        Ok(())
    }
}

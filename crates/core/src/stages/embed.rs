//! Embed stage: stamp each frame with the next sequence value
//!
//! Runs at the embed identity's frame-arrival event. Per frame, in
//! order: format the current sequence value, push it to the overlay's
//! text property, attach a counter record carrying the value, report
//! the embedded value, increment the sequence by exactly one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use crate::data::Frame;
use crate::error::Result;
use crate::meta::attach_counter;
use crate::nodes::{FrameHandoff, StringProperty};

/// Handoff that embeds the monotonic counter into every frame.
///
/// The sequence state is owned by the controller and shared in as an
/// atomic; only this stage's execution context mutates it, and the
/// pipeline drives a single streaming task, so increments stay strictly
/// sequential.
pub struct EmbedStage {
    sequence: Arc<AtomicU64>,
    overlay_text: StringProperty,
    tap: Option<UnboundedSender<u64>>,
}

impl EmbedStage {
    /// Create an embed stage writing the human-readable counter through
    /// `overlay_text`.
    pub fn new(sequence: Arc<AtomicU64>, overlay_text: StringProperty) -> Self {
        Self {
            sequence,
            overlay_text,
            tap: None,
        }
    }

    /// Report every embedded value on `tap` (test instrumentation).
    pub fn with_tap(mut self, tap: UnboundedSender<u64>) -> Self {
        self.tap = Some(tap);
        self
    }
}

impl FrameHandoff for EmbedStage {
    fn on_handoff(&mut self, frame: &mut Frame) -> Result<()> {
        let value = self.sequence.load(Ordering::Relaxed);

        self.overlay_text.set(format!("Counter: {value}"));

        // A frame without its counter breaks the downstream invariant;
        // attachment failure is fatal to the stage and propagates as a
        // pipeline-level error.
        attach_counter(frame, value)?;

        println!("Embedded counter: {value}");
        tracing::debug!(counter = value, "embedded frame counter");
        if let Some(tap) = &self.tap {
            let _ = tap.send(value);
        }

        self.sequence.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

//! Pipeline controller
//!
//! Owns the pipeline lifetime: builds the graph from its textual
//! description, resolves the three named stage points, wires the embed
//! and extract handoffs, runs the event loop until a terminal signal,
//! and tears down exactly once.

use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use crate::error::{Error, Result};
use crate::manifest;
use crate::nodes::{ElementRegistry, StringProperty};
use crate::pipeline::{Bus, MessageKind, Pipeline, PipelineHandle};
use crate::stages::{EmbedStage, ExtractStage};

/// Manifest ID of the embed point.
pub const EMBED_POINT: &str = "embed_identity";
/// Manifest ID of the render/overlay point.
pub const RENDER_POINT: &str = "text_overlay";
/// Manifest ID of the extract point.
pub const EXTRACT_POINT: &str = "extract_identity";

/// Controller lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// Created; pipeline not yet constructed
    Idle,
    /// Streaming; event loop waiting for a terminal signal
    Running,
    /// Terminated normally (end-of-stream), teardown complete
    Stopped,
    /// Terminated on a runtime error, teardown complete
    Failed,
}

/// Owns one pipeline run from construction through teardown.
pub struct PipelineController {
    registry: ElementRegistry,
    sequence: Arc<AtomicU64>,
    state: ControllerState,
    embed_tap: Option<UnboundedSender<u64>>,
    extract_tap: Option<UnboundedSender<u64>>,
}

impl PipelineController {
    /// Create a controller with the given element registry.
    ///
    /// The sequence state starts at 0 and is owned here; the embed
    /// stage receives a shared handle at wiring time.
    pub fn new(registry: ElementRegistry) -> Self {
        Self {
            registry,
            sequence: Arc::new(AtomicU64::new(0)),
            state: ControllerState::Idle,
            embed_tap: None,
            extract_tap: None,
        }
    }

    /// Report embedded values on `tap` (test instrumentation).
    pub fn with_embed_tap(mut self, tap: UnboundedSender<u64>) -> Self {
        self.embed_tap = Some(tap);
        self
    }

    /// Report extracted values on `tap` (test instrumentation).
    pub fn with_extract_tap(mut self, tap: UnboundedSender<u64>) -> Self {
        self.extract_tap = Some(tap);
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Shared handle to the sequence counter.
    pub fn sequence_handle(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.sequence)
    }

    /// Resolve the three named points and register the provenance
    /// stages. Any missing point is a construction error.
    fn wire_stages(&self, pipeline: &mut Pipeline) -> Result<StringProperty> {
        let overlay_text = pipeline
            .element(RENDER_POINT)
            .and_then(|e| e.string_property("text"))
            .ok_or_else(|| {
                Error::Construction(format!("cannot resolve render point '{RENDER_POINT}'"))
            })?;

        let mut embed = EmbedStage::new(Arc::clone(&self.sequence), overlay_text.clone());
        if let Some(tap) = &self.embed_tap {
            embed = embed.with_tap(tap.clone());
        }
        pipeline
            .element_mut(EMBED_POINT)
            .ok_or_else(|| {
                Error::Construction(format!("cannot resolve embed point '{EMBED_POINT}'"))
            })?
            .set_handoff(Box::new(embed))?;

        let mut extract = ExtractStage::new();
        if let Some(tap) = &self.extract_tap {
            extract = extract.with_tap(tap.clone());
        }
        pipeline
            .element_mut(EXTRACT_POINT)
            .ok_or_else(|| {
                Error::Construction(format!("cannot resolve extract point '{EXTRACT_POINT}'"))
            })?
            .set_handoff(Box::new(extract))?;

        Ok(overlay_text)
    }

    /// Run one pipeline to completion.
    ///
    /// Returns `Ok(())` on end-of-stream and the propagated error
    /// otherwise. Construction failures return before the controller
    /// ever enters `Running`; once running, both terminal paths
    /// (end-of-stream and runtime error) converge on the same teardown,
    /// which executes exactly once.
    pub async fn run(&mut self, manifest_json: &str) -> Result<()> {
        if self.state != ControllerState::Idle {
            return Err(Error::Execution(
                "controller has already run its pipeline".to_string(),
            ));
        }

        let manifest = match manifest::parse(manifest_json) {
            Ok(m) => m,
            Err(e) => {
                eprintln!("Failed to create pipeline");
                return Err(e);
            }
        };
        let mut pipeline = match Pipeline::from_manifest(&manifest, &self.registry) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Failed to create pipeline");
                return Err(e);
            }
        };

        let overlay_text = match self.wire_stages(&mut pipeline) {
            Ok(handle) => handle,
            Err(e) => {
                eprintln!("Failed to get elements");
                return Err(e);
            }
        };

        let (bus, mut rx) = Bus::new();
        self.state = ControllerState::Running;
        tracing::info!(pipeline = %pipeline.name(), "pipeline running");
        let handle = pipeline.play(bus);

        let outcome = Self::event_loop(&mut rx).await;

        self.teardown(handle, overlay_text).await;
        self.state = if outcome.is_ok() {
            ControllerState::Stopped
        } else {
            ControllerState::Failed
        };
        outcome
    }

    /// Block on the bus until a terminal signal arrives.
    ///
    /// Exactly two message kinds terminate the wait: fatal error and
    /// end-of-stream. Everything else is logged and ignored.
    async fn event_loop(rx: &mut crate::pipeline::BusReceiver) -> Result<()> {
        loop {
            let Some(msg) = rx.recv().await else {
                // The streaming task always posts a terminal message
                // before exiting; a closed bus means it was lost.
                return Err(Error::Execution(
                    "bus closed without a terminal message".to_string(),
                ));
            };

            match msg.kind {
                MessageKind::Error { message, debug } => {
                    eprintln!("Error received from element {}: {}", msg.src, message);
                    eprintln!(
                        "Debugging information: {}",
                        debug.as_deref().unwrap_or("none")
                    );
                    return Err(Error::Runtime {
                        element: msg.src,
                        message,
                        debug,
                    });
                }
                MessageKind::Eos => {
                    println!("End-Of-Stream reached.");
                    return Ok(());
                }
                _ => {
                    eprintln!("Unexpected message received.");
                }
            }
        }
    }

    /// Release everything acquired for the run: stop the streaming
    /// task, return the pipeline to its null state, drop the resolved
    /// references.
    async fn teardown(&mut self, handle: PipelineHandle, overlay_text: StringProperty) {
        match handle.stop().await {
            Ok(pipeline) => drop(pipeline),
            Err(e) => tracing::warn!(error = %e, "streaming task did not stop cleanly"),
        }
        drop(overlay_text);
        tracing::info!("pipeline torn down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn controller_refuses_a_second_run() {
        let manifest = serde_json::json!({
            "version": "v1",
            "metadata": { "name": "demo" },
            "nodes": [
                { "id": "src", "node_type": "TestSource",
                  "params": { "num-buffers": 1, "width": 16, "height": 16 } },
                { "id": "embed_identity", "node_type": "Identity" },
                { "id": "text_overlay", "node_type": "TextOverlay" },
                { "id": "extract_identity", "node_type": "Identity" },
                { "id": "sink", "node_type": "AutoSink" }
            ]
        })
        .to_string();

        let mut controller = PipelineController::new(ElementRegistry::with_builtins());
        controller.run(&manifest).await.expect("first run");
        assert!(controller.run(&manifest).await.is_err());
    }

    #[tokio::test]
    async fn malformed_manifest_never_enters_running() {
        let mut controller = PipelineController::new(ElementRegistry::with_builtins());
        let result = controller.run("{ not json").await;
        assert!(matches!(result, Err(Error::Manifest(_))));
        assert_eq!(controller.state(), ControllerState::Idle);
    }
}

//! Pipeline graph and streaming task
//!
//! A [`Pipeline`] is the ordered chain built from a validated manifest:
//! one source followed by elements, sink last. `play` spawns the
//! streaming task that pulls frames from the source and walks each one
//! through every element in order, synchronously, within the task's
//! call stack. The task posts exactly one terminal bus message (error
//! or end-of-stream) unless shut down early.

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::{Error, Result};
use crate::manifest::{self, Manifest};
use crate::nodes::{Element, ElementRegistry, FrameSource};
use crate::pipeline::Bus;

/// Playback state of the pipeline graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Constructed, not streaming
    Null,
    /// Streaming task running
    Playing,
}

/// The ordered element chain of one pipeline.
pub struct Pipeline {
    name: String,
    source: Box<dyn FrameSource>,
    elements: Vec<Box<dyn Element>>,
    state: PipelineState,
    bus: Option<Bus>,
}

impl Pipeline {
    /// Build a pipeline from a validated manifest.
    ///
    /// The first node must resolve to a registered source type; every
    /// following node to a registered element type. Any resolution
    /// failure is a construction error and nothing is built.
    pub fn from_manifest(manifest: &Manifest, registry: &ElementRegistry) -> Result<Self> {
        manifest::validate(manifest)?;

        let (head, rest) = match manifest.nodes.split_first() {
            Some(split) => split,
            None => {
                return Err(Error::Construction(
                    "manifest contains no nodes".to_string(),
                ))
            }
        };

        let source = registry.create_source(&head.node_type, head.id.clone(), &head.params)?;

        let mut elements = Vec::with_capacity(rest.len());
        for node in rest {
            elements.push(registry.create_element(
                &node.node_type,
                node.id.clone(),
                &node.params,
            )?);
        }

        Ok(Self {
            name: manifest.metadata.name.clone(),
            source,
            elements,
            state: PipelineState::Null,
            bus: None,
        })
    }

    /// Pipeline name from the manifest metadata.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current playback state.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Resolve an element by its manifest ID.
    pub fn element(&self, name: &str) -> Option<&dyn Element> {
        self.elements
            .iter()
            .find(|e| e.name() == name)
            .map(|e| e.as_ref())
    }

    /// Resolve an element mutably by its manifest ID.
    pub fn element_mut(&mut self, name: &str) -> Option<&mut (dyn Element + 'static)> {
        self.elements
            .iter_mut()
            .find(|e| e.name() == name)
            .map(|e| e.as_mut())
    }

    fn set_state(&mut self, next: PipelineState) {
        if next == self.state {
            return;
        }
        tracing::debug!(pipeline = %self.name, from = ?self.state, to = ?next, "state change");
        if let Some(bus) = &self.bus {
            bus.post_state_changed(self.name.clone(), self.state, next);
        }
        self.state = next;
    }

    /// Transition to `Playing` and spawn the streaming task.
    ///
    /// The task delivers frames on its own execution context, separate
    /// from the controlling task that awaits the bus.
    pub fn play(mut self, bus: Bus) -> PipelineHandle {
        self.bus = Some(bus.clone());
        self.set_state(PipelineState::Playing);

        let (shutdown, mut shutdown_rx) = watch::channel(false);

        let join = tokio::spawn(async move {
            loop {
                if *shutdown_rx.borrow_and_update() {
                    tracing::debug!(pipeline = %self.name, "streaming task shut down");
                    break;
                }

                let frame = match self.source.next_frame() {
                    Ok(Some(frame)) => frame,
                    Ok(None) => {
                        bus.post_eos(self.source.name());
                        break;
                    }
                    Err(e) => {
                        bus.post_error(self.source.name(), e.to_string(), None);
                        break;
                    }
                };

                let mut failure: Option<(String, Error)> = None;
                let mut frame = frame;
                for element in self.elements.iter_mut() {
                    match element.process(frame) {
                        Ok(next) => frame = next,
                        Err(e) => {
                            failure = Some((element.name().to_string(), e));
                            break;
                        }
                    }
                }
                // A fully processed frame is dropped here, releasing
                // its attached metadata records.

                if let Some((element, error)) = failure {
                    bus.post_error(element, error.to_string(), None);
                    break;
                }

                // Keep the runtime cooperative between frames.
                tokio::task::yield_now().await;
            }
            self
        });

        PipelineHandle { shutdown, join }
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("elements", &self.elements.len())
            .finish()
    }
}

/// Handle to a playing pipeline's streaming task.
pub struct PipelineHandle {
    shutdown: watch::Sender<bool>,
    join: JoinHandle<Pipeline>,
}

impl PipelineHandle {
    /// Stop the streaming task and take the pipeline back.
    ///
    /// Idempotent with respect to the task having already finished on
    /// its own (EOS or error): the shutdown signal is then simply
    /// unobserved.
    pub async fn stop(self) -> Result<Pipeline> {
        let _ = self.shutdown.send(true);
        let mut pipeline = self
            .join
            .await
            .map_err(|e| Error::Execution(format!("streaming task failed: {}", e)))?;
        pipeline.set_state(PipelineState::Null);
        Ok(pipeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::MessageKind;

    fn linear_manifest(num_buffers: u64) -> Manifest {
        manifest::parse(
            &serde_json::json!({
                "version": "v1",
                "metadata": { "name": "test" },
                "nodes": [
                    { "id": "src", "node_type": "TestSource",
                      "params": { "num-buffers": num_buffers, "width": 16, "height": 16 } },
                    { "id": "mid", "node_type": "Identity" },
                    { "id": "sink", "node_type": "AutoSink" }
                ]
            })
            .to_string(),
        )
        .expect("manifest")
    }

    #[test]
    fn builds_and_resolves_elements_by_name() {
        let registry = ElementRegistry::with_builtins();
        let pipeline = Pipeline::from_manifest(&linear_manifest(1), &registry).expect("build");

        assert_eq!(pipeline.state(), PipelineState::Null);
        assert!(pipeline.element("mid").is_some());
        assert!(pipeline.element("sink").is_some());
        assert!(pipeline.element("nope").is_none());
    }

    #[test]
    fn unknown_node_type_fails_construction() {
        let registry = ElementRegistry::with_builtins();
        let mut manifest = linear_manifest(1);
        manifest.nodes[1].node_type = "Mystery".into();

        assert!(matches!(
            Pipeline::from_manifest(&manifest, &registry),
            Err(Error::Construction(_))
        ));
    }

    #[tokio::test]
    async fn bounded_source_posts_eos() {
        let registry = ElementRegistry::with_builtins();
        let pipeline = Pipeline::from_manifest(&linear_manifest(2), &registry).expect("build");

        let (bus, mut rx) = Bus::new();
        let handle = pipeline.play(bus);

        // First message is the Null -> Playing transition.
        let msg = rx.recv().await.expect("message");
        assert!(matches!(msg.kind, MessageKind::StateChanged { .. }));

        let msg = rx.recv().await.expect("message");
        assert!(matches!(msg.kind, MessageKind::Eos));
        assert_eq!(msg.src, "src");

        let pipeline = handle.stop().await.expect("stop");
        assert_eq!(pipeline.state(), PipelineState::Null);
    }

    #[tokio::test]
    async fn shutdown_stops_an_unbounded_pipeline() {
        let registry = ElementRegistry::with_builtins();
        let manifest = manifest::parse(
            &serde_json::json!({
                "version": "v1",
                "metadata": { "name": "endless" },
                "nodes": [
                    { "id": "src", "node_type": "TestSource",
                      "params": { "width": 16, "height": 16 } },
                    { "id": "sink", "node_type": "AutoSink" }
                ]
            })
            .to_string(),
        )
        .expect("manifest");
        let pipeline = Pipeline::from_manifest(&manifest, &registry).expect("build");

        let (bus, _rx) = Bus::new();
        let handle = pipeline.play(bus);
        let pipeline = handle.stop().await.expect("stop");
        assert_eq!(pipeline.state(), PipelineState::Null);
    }
}

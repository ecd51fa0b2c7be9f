//! Pipeline elements
//!
//! An element is one named position in the pipeline graph capable of
//! observing or transforming frames. Frames move through
//! [`Element::process`] by value: each element owns the frame for the
//! duration of its call and hands it downstream by returning it.
//!
//! Per-frame hooks are registered against elements that support them
//! (the identity elements) via [`FrameHandoff`]; the hook runs
//! synchronously, in order, exactly once per frame, within the
//! streaming task's call stack, before the frame is forwarded.

mod auto_sink;
mod identity;
mod registry;
mod test_source;
mod text_overlay;

pub use auto_sink::{AutoSink, AutoSinkFactory};
pub use identity::{Identity, IdentityFactory};
pub use registry::{ElementFactory, ElementRegistry, SourceFactory};
pub use test_source::{TestSource, TestSourceConfig, TestSourceFactory};
pub use text_overlay::{StringProperty, TextOverlay, TextOverlayFactory};

use crate::data::Frame;
use crate::error::{Error, Result};

/// Per-frame hook invoked by an element at its pipeline position.
pub trait FrameHandoff: Send {
    /// Called once per frame, synchronously, before the frame is
    /// forwarded downstream. Must not block indefinitely; doing so
    /// stalls the entire streaming path.
    fn on_handoff(&mut self, frame: &mut Frame) -> Result<()>;
}

/// One processing stage in the pipeline graph.
pub trait Element: Send {
    /// Instance name (unique within the pipeline, used for resolution).
    fn name(&self) -> &str;

    /// Element type name (the factory key).
    fn element_type(&self) -> &str;

    /// Process one frame and hand it downstream.
    fn process(&mut self, frame: Frame) -> Result<Frame>;

    /// Register a per-frame handoff hook.
    ///
    /// Only elements that expose a frame-arrival event (the identity
    /// elements) accept one.
    fn set_handoff(&mut self, _handoff: Box<dyn FrameHandoff>) -> Result<()> {
        Err(Error::Construction(format!(
            "element '{}' does not accept handoff callbacks",
            self.name()
        )))
    }

    /// Resolve a settable string-valued property by name, if the
    /// element exposes one (the overlay's `"text"`).
    fn string_property(&self, _name: &str) -> Option<StringProperty> {
        None
    }
}

/// Producer of frames at the head of the pipeline.
pub trait FrameSource: Send {
    /// Instance name.
    fn name(&self) -> &str;

    /// Source type name (the factory key).
    fn source_type(&self) -> &str;

    /// Produce the next frame, or `None` at end of stream.
    fn next_frame(&mut self) -> Result<Option<Frame>>;
}

//! Pipeline construction and control
//!
//! [`Pipeline`] owns the element chain and drives frames through it on
//! a spawned streaming task; [`Bus`] carries pipeline-level signals
//! (error, end-of-stream) back to the controlling task;
//! [`PipelineController`] owns the whole lifetime: wiring the
//! provenance stages, running the event loop, and tearing down.

mod bus;
mod controller;
mod graph;

pub use bus::{Bus, BusReceiver, Message, MessageKind};
pub use controller::{
    ControllerState, PipelineController, EMBED_POINT, EXTRACT_POINT, RENDER_POINT,
};
pub use graph::{Pipeline, PipelineHandle, PipelineState};

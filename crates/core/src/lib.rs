//! Framestamp Core - per-frame provenance for streaming pipelines
//!
//! This crate augments a streaming pipeline with typed per-frame
//! metadata: a monotonically increasing counter is attached to each
//! frame at the embed point, rendered by the overlay, and read back at
//! the extract point to confirm lossless propagation.
//!
//! # Architecture
//!
//! - [`meta`]: the extensible metadata mechanism, with a process-wide
//!   type registry ([`meta::MetaRegistry`]), a per-frame record store
//!   ([`meta::MetaStore`]) with identity-based retrieval, and the one
//!   concrete kind ([`meta::CounterMeta`]).
//! - [`data`]: [`data::Frame`], the opaque streaming unit that owns
//!   its metadata.
//! - [`nodes`]: pipeline elements (source, identity, overlay, sink)
//!   and the factory registry the manifest builder resolves through.
//! - [`stages`]: the embed/extract handoffs carrying the provenance
//!   semantics.
//! - [`pipeline`]: graph construction, the streaming task, the message
//!   bus, and the controller that owns one run end to end.
//!
//! # Example
//!
//! ```ignore
//! use framestamp_core::nodes::ElementRegistry;
//! use framestamp_core::pipeline::PipelineController;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut controller = PipelineController::new(ElementRegistry::with_builtins());
//!     controller.run(&manifest_json).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod data;
pub mod manifest;
pub mod meta;
pub mod nodes;
pub mod pipeline;
pub mod stages;

mod error;
pub use error::{Error, Result};

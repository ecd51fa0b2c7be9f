//! Core data types
//!
//! The central type is [`Frame`], the opaque unit of streaming data that
//! flows element-to-element through a pipeline.

mod frame;

pub use frame::Frame;

//! Terminal sink element
//!
//! Consumes frames at the tail of the pipeline. Frames are dropped
//! (releasing their metadata) once the streaming task takes them back
//! from the sink's `process` call.

use serde_json::Value;

use crate::data::Frame;
use crate::error::Result;
use crate::nodes::{Element, ElementFactory};

/// Terminal consumer of frames.
pub struct AutoSink {
    name: String,
    rendered: u64,
}

impl AutoSink {
    /// Create a new sink.
    pub fn new(name: String) -> Self {
        Self { name, rendered: 0 }
    }

    /// Number of frames this sink has consumed.
    pub fn rendered(&self) -> u64 {
        self.rendered
    }
}

impl Element for AutoSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn element_type(&self) -> &str {
        "AutoSink"
    }

    fn process(&mut self, frame: Frame) -> Result<Frame> {
        self.rendered += 1;
        tracing::trace!(sink = %self.name, frame = self.rendered, "sink consumed frame");
        Ok(frame)
    }
}

/// Factory for [`AutoSink`].
pub struct AutoSinkFactory;

impl ElementFactory for AutoSinkFactory {
    fn create(&self, name: String, _params: &Value) -> Result<Box<dyn Element>> {
        Ok(Box::new(AutoSink::new(name)))
    }

    fn element_type(&self) -> &str {
        "AutoSink"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn counts_consumed_frames() {
        let mut sink = AutoSink::new("sink".into());
        for _ in 0..4 {
            let frame = Frame::new(Bytes::from_static(b"frame"));
            sink.process(frame).expect("process");
        }
        assert_eq!(sink.rendered(), 4);
    }
}

//! Test pattern source
//!
//! Synthesizes deterministic test-pattern frames, in the spirit of a
//! video test source. Bounded by `num-buffers` or unbounded when the
//! parameter is absent.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::data::Frame;
use crate::error::{Error, Result};
use crate::nodes::{FrameSource, SourceFactory};

/// Test source configuration. Uses `#[serde(default)]` to allow partial
/// config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TestSourceConfig {
    /// Number of frames to emit before end-of-stream (`None` = unbounded)
    pub num_buffers: Option<u64>,

    /// Frame width in pixels
    pub width: u32,

    /// Frame height in pixels
    pub height: u32,
}

impl Default for TestSourceConfig {
    fn default() -> Self {
        Self {
            num_buffers: None,
            width: 320,
            height: 240,
        }
    }
}

/// Frame source emitting synthetic test-pattern frames.
pub struct TestSource {
    name: String,
    config: TestSourceConfig,
    produced: u64,
}

impl TestSource {
    /// Create a new test source.
    pub fn new(name: String, config: TestSourceConfig) -> Self {
        Self {
            name,
            config,
            produced: 0,
        }
    }
}

impl FrameSource for TestSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn source_type(&self) -> &str {
        "TestSource"
    }

    fn next_frame(&mut self) -> Result<Option<Frame>> {
        if let Some(limit) = self.config.num_buffers {
            if self.produced >= limit {
                tracing::debug!(source = %self.name, frames = self.produced, "source exhausted");
                return Ok(None);
            }
        }

        let frame = Frame::test_pattern(self.config.width, self.config.height, self.produced);
        self.produced += 1;
        Ok(Some(frame))
    }
}

/// Factory for [`TestSource`].
pub struct TestSourceFactory;

impl SourceFactory for TestSourceFactory {
    fn create(&self, name: String, params: &Value) -> Result<Box<dyn FrameSource>> {
        let config = if params.is_null() {
            TestSourceConfig::default()
        } else {
            serde_json::from_value(params.clone()).map_err(|e| {
                Error::Construction(format!("invalid TestSource params: {}", e))
            })?
        };
        Ok(Box::new(TestSource::new(name, config)))
    }

    fn source_type(&self) -> &str {
        "TestSource"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_source_stops_at_limit() {
        let config = TestSourceConfig {
            num_buffers: Some(3),
            width: 16,
            height: 16,
        };
        let mut source = TestSource::new("src".into(), config);

        let mut frames = 0;
        while let Some(_frame) = source.next_frame().expect("next_frame") {
            frames += 1;
        }
        assert_eq!(frames, 3);
        // Exhausted source keeps returning None.
        assert!(source.next_frame().expect("next_frame").is_none());
    }

    #[test]
    fn factory_parses_kebab_case_params() {
        let params = serde_json::json!({ "num-buffers": 5, "width": 64, "height": 48 });
        let mut source = TestSourceFactory
            .create("src".into(), &params)
            .expect("create");

        let frame = source.next_frame().expect("next_frame").expect("frame");
        assert_eq!(frame.payload.len(), 64 * 48);
    }

    #[test]
    fn factory_accepts_null_params() {
        let source = TestSourceFactory
            .create("src".into(), &Value::Null)
            .expect("create");
        assert_eq!(source.source_type(), "TestSource");
    }

    #[test]
    fn factory_rejects_malformed_params() {
        let params = serde_json::json!({ "num-buffers": "not a number" });
        assert!(TestSourceFactory.create("src".into(), &params).is_err());
    }
}

//! Frame: one discrete unit of streaming data
//!
//! A frame is owned exclusively by whichever pipeline stage currently
//! holds it; ownership moves through `Element::process`. The attached
//! metadata store lives and dies with the frame.

use std::fmt;
use std::time::Duration;

use bytes::Bytes;

use crate::meta::MetaStore;

/// Nominal test-source frame duration (30 fps).
const FRAME_INTERVAL: Duration = Duration::from_nanos(33_333_333);

/// One discrete unit of streaming data flowing through the pipeline.
///
/// Carries an ordered list of attached metadata records. Records are
/// released together with their owning frame and are never shared
/// between frames.
pub struct Frame {
    /// Presentation timestamp, if the source assigned one
    pub pts: Option<Duration>,

    /// Raw frame payload (pixel data for video sources)
    pub payload: Bytes,

    /// Attached metadata records, in attachment order
    pub meta: MetaStore,
}

impl Frame {
    /// Create a frame from a raw payload with no timestamp and no metadata.
    pub fn new(payload: Bytes) -> Self {
        Self {
            pts: None,
            payload,
            meta: MetaStore::new(),
        }
    }

    /// Create a frame with a presentation timestamp.
    pub fn with_pts(payload: Bytes, pts: Duration) -> Self {
        Self {
            pts: Some(pts),
            payload,
            meta: MetaStore::new(),
        }
    }

    /// Synthesize a deterministic test-pattern frame.
    ///
    /// The payload is a luma-only plane whose shade cycles with the frame
    /// index; the pts advances at a nominal 30 fps. Used by the test
    /// source element and by unit tests.
    pub fn test_pattern(width: u32, height: u32, index: u64) -> Self {
        let shade = (index % 256) as u8;
        let payload = vec![shade; (width as usize) * (height as usize)];
        Self::with_pts(Bytes::from(payload), FRAME_INTERVAL * (index as u32))
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("pts", &self.pts)
            .field("payload_len", &self.payload.len())
            .field("meta", &self.meta)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_is_deterministic() {
        let a = Frame::test_pattern(320, 240, 7);
        let b = Frame::test_pattern(320, 240, 7);
        assert_eq!(a.payload, b.payload);
        assert_eq!(a.pts, b.pts);
        assert_eq!(a.payload.len(), 320 * 240);
    }

    #[test]
    fn test_pattern_pts_advances() {
        let first = Frame::test_pattern(16, 16, 0);
        let second = Frame::test_pattern(16, 16, 1);
        assert_eq!(first.pts, Some(Duration::ZERO));
        assert!(second.pts > first.pts);
    }

    #[test]
    fn new_frame_has_empty_meta() {
        let frame = Frame::new(Bytes::from_static(b"payload"));
        assert!(frame.meta.is_empty());
        assert_eq!(frame.pts, None);
    }
}

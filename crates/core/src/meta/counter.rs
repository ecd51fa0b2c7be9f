//! Frame counter metadata
//!
//! The one concrete metadata kind shipped with framestamp: a single
//! 64-bit counter stamped onto each frame at the embed point and read
//! back at the extract point.

use std::any::Any;
use std::sync::Arc;

use crate::data::Frame;
use crate::error::{Error, Result};
use crate::meta::{MetaDescriptor, MetaRegistry};

/// Registered type name of the counter metadata.
pub const COUNTER_META_NAME: &str = "FrameCounterMeta";

/// Per-frame counter payload.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CounterMeta {
    /// Monotonic sequence value assigned at embed time
    pub counter: u64,
}

fn counter_init() -> Result<Box<dyn Any + Send>> {
    // Initializer resets the counter to 0; the embed stage writes the
    // real value through the record returned by attach.
    Ok(Box::new(CounterMeta::default()))
}

impl CounterMeta {
    /// Descriptor handle for the counter type, registered lazily in the
    /// process-wide registry on first use. Both the embed and extract
    /// stages resolve their descriptor through here, which guarantees
    /// identity-based matching between them.
    pub fn descriptor() -> Arc<MetaDescriptor> {
        MetaRegistry::global().get_or_register(
            COUNTER_META_NAME,
            std::mem::size_of::<CounterMeta>(),
            counter_init,
            None,
        )
    }
}

/// Attach a counter record carrying `value` to `frame`.
///
/// Attachment first initializes the payload to zero, then sets the real
/// value through the returned record.
pub fn attach_counter(frame: &mut Frame, value: u64) -> Result<()> {
    let descriptor = CounterMeta::descriptor();
    let record = frame.meta.attach(&descriptor)?;
    match record.payload_mut::<CounterMeta>() {
        Some(meta) => {
            meta.counter = value;
            Ok(())
        }
        None => Err(Error::Attachment(format!(
            "'{COUNTER_META_NAME}' initializer produced a foreign payload"
        ))),
    }
}

/// Read back every counter value attached to `frame`, in attachment order.
///
/// Only records matching the counter descriptor by identity are
/// considered; an empty result means no counter was attached.
pub fn counter_values(frame: &Frame) -> Vec<u64> {
    let descriptor = CounterMeta::descriptor();
    frame
        .meta
        .find_by_type(&descriptor)
        .filter_map(|record| record.payload::<CounterMeta>())
        .map(|meta| meta.counter)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn descriptor_is_registered_once() {
        let a = CounterMeta::descriptor();
        let b = CounterMeta::descriptor();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.name(), COUNTER_META_NAME);
        assert!(!a.has_finalizer());
    }

    #[test]
    fn attach_then_read_back() {
        let mut frame = Frame::new(Bytes::from_static(b"frame"));
        attach_counter(&mut frame, 17).expect("attach");

        assert_eq!(counter_values(&frame), vec![17]);
        assert_eq!(frame.meta.len(), 1);
    }

    #[test]
    fn counters_do_not_leak_between_frames() {
        let mut a = Frame::new(Bytes::from_static(b"a"));
        let b = Frame::new(Bytes::from_static(b"b"));
        attach_counter(&mut a, 5).expect("attach");

        assert_eq!(counter_values(&a), vec![5]);
        assert!(counter_values(&b).is_empty());
    }

    #[test]
    fn frame_without_counter_reads_empty() {
        let frame = Frame::new(Bytes::from_static(b"bare"));
        assert!(counter_values(&frame).is_empty());
    }
}

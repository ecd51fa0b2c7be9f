//! Extensible per-frame metadata
//!
//! Structured side-data can be attached to any [`crate::data::Frame`] and
//! retrieved by type. Metadata kinds are described by a
//! [`MetaDescriptor`] obtained from the process-wide [`MetaRegistry`];
//! retrieval matches on descriptor *identity*, never on the name string,
//! so same-named descriptors from unrelated registrations can never
//! cross-match.
//!
//! A record's lifetime is bound to its owning frame: dropping the frame
//! runs each record's finalizer (if any) and frees its payload.

mod counter;
mod registry;
mod store;

pub use counter::{attach_counter, counter_values, CounterMeta, COUNTER_META_NAME};
pub use registry::{MetaDescriptor, MetaFinalize, MetaInit, MetaRegistry};
pub use store::{MetaRecord, MetaStore};

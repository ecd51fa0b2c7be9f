//! Per-frame metadata store
//!
//! Each frame owns a [`MetaStore`]: an ordered list of
//! (descriptor-handle, owned-payload) records. Retrieval filters by
//! descriptor identity; the payload is only downcast after the identity
//! check has matched, never by reinterpreting raw storage.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::meta::MetaDescriptor;

/// One typed metadata record attached to a frame.
///
/// Pairs the identity handle of its type with the owned payload. The
/// record cannot outlive its store (and therefore its frame); the
/// type's finalizer, if any, runs when the record is dropped.
pub struct MetaRecord {
    descriptor: Arc<MetaDescriptor>,
    payload: Box<dyn Any + Send>,
}

impl MetaRecord {
    /// The descriptor this record was attached under.
    pub fn descriptor(&self) -> &Arc<MetaDescriptor> {
        &self.descriptor
    }

    /// Identity check against a descriptor handle.
    ///
    /// Matches only if both handles point at the same descriptor;
    /// equal names from separate registrations never match.
    pub fn is(&self, descriptor: &Arc<MetaDescriptor>) -> bool {
        Arc::ptr_eq(&self.descriptor, descriptor)
    }

    /// Typed view of the payload.
    pub fn payload<T: 'static>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }

    /// Typed mutable view of the payload.
    pub fn payload_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.payload.downcast_mut::<T>()
    }
}

impl fmt::Debug for MetaRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetaRecord")
            .field("type", &self.descriptor.name())
            .finish()
    }
}

impl Drop for MetaRecord {
    fn drop(&mut self) {
        self.descriptor.run_finalizer(self.payload.as_mut());
    }
}

/// Ordered container of metadata records owned by one frame.
#[derive(Debug, Default)]
pub struct MetaStore {
    records: Vec<MetaRecord>,
}

impl MetaStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Attach a new record of the given type.
    ///
    /// Runs the type's initializer (which resets the payload to its
    /// zero state), appends the record, and returns it so the caller
    /// can write the real value immediately after. Initializer failure
    /// surfaces as [`Error::Attachment`].
    pub fn attach(&mut self, descriptor: &Arc<MetaDescriptor>) -> Result<&mut MetaRecord> {
        let payload = descriptor.new_payload().map_err(|e| {
            Error::Attachment(format!(
                "initializer for '{}' failed: {}",
                descriptor.name(),
                e
            ))
        })?;

        self.records.push(MetaRecord {
            descriptor: Arc::clone(descriptor),
            payload,
        });
        let last = self.records.len() - 1;
        Ok(&mut self.records[last])
    }

    /// Iterate every attached record, in attachment order.
    ///
    /// Each call starts a fresh iteration at the first record.
    pub fn iter(&self) -> impl Iterator<Item = &MetaRecord> {
        self.records.iter()
    }

    /// Iterate the records matching `descriptor` by identity.
    pub fn find_by_type<'a>(
        &'a self,
        descriptor: &'a Arc<MetaDescriptor>,
    ) -> impl Iterator<Item = &'a MetaRecord> + 'a {
        self.records.iter().filter(move |r| r.is(descriptor))
    }

    /// Number of attached records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no records are attached.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::MetaRegistry;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn zero_u64_init() -> Result<Box<dyn Any + Send>> {
        Ok(Box::new(0u64))
    }

    fn failing_init() -> Result<Box<dyn Any + Send>> {
        Err(Error::Execution("payload allocation refused".into()))
    }

    static FINALIZED: AtomicUsize = AtomicUsize::new(0);

    fn counting_finalize(_payload: &mut (dyn Any + Send)) {
        FINALIZED.fetch_add(1, Ordering::SeqCst);
    }

    #[test]
    fn attach_initializes_then_caller_sets_value() {
        let registry = MetaRegistry::new();
        let descriptor = registry.get_or_register("StoreMeta", 8, zero_u64_init, None);

        let mut store = MetaStore::new();
        let record = store.attach(&descriptor).expect("attach");
        // Initializer reset the payload to zero.
        assert_eq!(record.payload::<u64>(), Some(&0));
        // The real value is written through the returned record.
        *record.payload_mut::<u64>().expect("typed payload") = 42;

        let values: Vec<u64> = store
            .find_by_type(&descriptor)
            .filter_map(|r| r.payload::<u64>().copied())
            .collect();
        assert_eq!(values, vec![42]);
    }

    #[test]
    fn attachment_isolates_stores() {
        let registry = MetaRegistry::new();
        let descriptor = registry.get_or_register("StoreMeta", 8, zero_u64_init, None);

        let mut a = MetaStore::new();
        let b = MetaStore::new();
        a.attach(&descriptor).expect("attach");

        assert_eq!(a.len(), 1);
        assert!(b.is_empty());
        assert_eq!(b.find_by_type(&descriptor).count(), 0);
    }

    #[test]
    fn matching_is_by_identity_not_name() {
        // Two registries produce same-named descriptors with distinct
        // identities; records attached under one must not match the other.
        let registry_a = MetaRegistry::new();
        let registry_b = MetaRegistry::new();
        let desc_a = registry_a.get_or_register("SameName", 8, zero_u64_init, None);
        let desc_b = registry_b.get_or_register("SameName", 8, zero_u64_init, None);
        assert_eq!(desc_a.name(), desc_b.name());

        let mut store = MetaStore::new();
        store.attach(&desc_a).expect("attach");

        assert_eq!(store.find_by_type(&desc_a).count(), 1);
        assert_eq!(store.find_by_type(&desc_b).count(), 0);
    }

    #[test]
    fn iteration_is_restartable_and_ordered() {
        let registry = MetaRegistry::new();
        let descriptor = registry.get_or_register("StoreMeta", 8, zero_u64_init, None);

        let mut store = MetaStore::new();
        for value in [1u64, 2, 3] {
            let record = store.attach(&descriptor).expect("attach");
            *record.payload_mut::<u64>().expect("typed payload") = value;
        }

        let first: Vec<u64> = store.iter().filter_map(|r| r.payload().copied()).collect();
        let second: Vec<u64> = store.iter().filter_map(|r| r.payload().copied()).collect();
        assert_eq!(first, vec![1, 2, 3]);
        assert_eq!(first, second);
    }

    #[test]
    fn failed_initializer_surfaces_as_attachment_error() {
        let registry = MetaRegistry::new();
        let descriptor = registry.get_or_register("BrokenMeta", 8, failing_init, None);

        let mut store = MetaStore::new();
        match store.attach(&descriptor) {
            Err(Error::Attachment(msg)) => assert!(msg.contains("BrokenMeta")),
            other => panic!("expected attachment error, got {:?}", other.map(|_| ())),
        }
        assert!(store.is_empty());
    }

    #[test]
    fn finalizer_runs_once_per_record_on_drop() {
        let registry = MetaRegistry::new();
        let descriptor =
            registry.get_or_register("FinalizedMeta", 8, zero_u64_init, Some(counting_finalize));

        FINALIZED.store(0, Ordering::SeqCst);
        {
            let mut store = MetaStore::new();
            store.attach(&descriptor).expect("attach");
            store.attach(&descriptor).expect("attach");
            assert_eq!(FINALIZED.load(Ordering::SeqCst), 0);
        }
        assert_eq!(FINALIZED.load(Ordering::SeqCst), 2);
    }
}

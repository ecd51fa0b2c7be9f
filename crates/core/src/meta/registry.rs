//! Process-wide metadata type registry
//!
//! Maps a stable type name to a [`MetaDescriptor`]. Registration is
//! idempotent and safe under concurrent first call: exactly one
//! descriptor is created per distinct name, and every caller observes
//! the same `Arc` handle. Descriptor identity (the `Arc` pointer, not
//! the name string) is the sole criterion for type matching during
//! retrieval.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use crate::error::Result;

/// Payload initializer: allocates the record's owned payload, reset to
/// its zero state. Callers write the real value through the record
/// returned by `MetaStore::attach`.
pub type MetaInit = fn() -> Result<Box<dyn Any + Send>>;

/// Optional payload finalizer, run when the owning frame is released.
pub type MetaFinalize = fn(&mut (dyn Any + Send));

/// Registered definition of one metadata kind.
///
/// Handles are `Arc<MetaDescriptor>`; two handles describe the same
/// type if and only if they point at the same descriptor
/// (`Arc::ptr_eq`). Registering the same name twice with different
/// parameters is a caller error: the first registration wins and the
/// mismatched parameters are silently ignored.
pub struct MetaDescriptor {
    name: String,
    payload_size: usize,
    init: MetaInit,
    finalize: Option<MetaFinalize>,
}

impl MetaDescriptor {
    /// Stable type name this descriptor was registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared payload size in bytes (informational).
    pub fn payload_size(&self) -> usize {
        self.payload_size
    }

    /// Whether this type registered a finalizer.
    pub fn has_finalizer(&self) -> bool {
        self.finalize.is_some()
    }

    pub(crate) fn new_payload(&self) -> Result<Box<dyn Any + Send>> {
        (self.init)()
    }

    pub(crate) fn run_finalizer(&self, payload: &mut (dyn Any + Send)) {
        if let Some(finalize) = self.finalize {
            finalize(payload);
        }
    }
}

impl fmt::Debug for MetaDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetaDescriptor")
            .field("name", &self.name)
            .field("payload_size", &self.payload_size)
            .field("has_finalizer", &self.finalize.is_some())
            .finish()
    }
}

/// Table of registered metadata types.
///
/// The process-wide instance is reachable through [`MetaRegistry::global`];
/// tests and embedders that prefer explicit state can construct their own
/// with [`MetaRegistry::new`] and thread the handle through.
pub struct MetaRegistry {
    entries: RwLock<HashMap<String, Arc<MetaDescriptor>>>,
}

impl MetaRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// The process-wide registry, initialized exactly once on first use.
    ///
    /// Lives for the process lifetime and is never torn down; frame
    /// lifetimes are always shorter than the process lifetime.
    pub fn global() -> &'static MetaRegistry {
        static GLOBAL: OnceLock<MetaRegistry> = OnceLock::new();
        GLOBAL.get_or_init(MetaRegistry::new)
    }

    /// Look up or register the descriptor for `name`.
    ///
    /// Exactly one registration occurs per distinct name, even when
    /// first calls race from multiple threads; every caller gets a
    /// handle to the identical descriptor. No caller can observe a
    /// partially constructed descriptor (the entry is published under
    /// the write lock, fully built).
    pub fn get_or_register(
        &self,
        name: &str,
        payload_size: usize,
        init: MetaInit,
        finalize: Option<MetaFinalize>,
    ) -> Arc<MetaDescriptor> {
        if let Some(descriptor) = self.entries.read().get(name) {
            return Arc::clone(descriptor);
        }

        let mut entries = self.entries.write();
        let descriptor = entries.entry(name.to_string()).or_insert_with(|| {
            Arc::new(MetaDescriptor {
                name: name.to_string(),
                payload_size,
                init,
                finalize,
            })
        });
        Arc::clone(descriptor)
    }

    /// Look up an already-registered descriptor by name.
    pub fn lookup(&self, name: &str) -> Option<Arc<MetaDescriptor>> {
        self.entries.read().get(name).map(Arc::clone)
    }

    /// Check if a type name has been registered.
    pub fn has_type(&self, name: &str) -> bool {
        self.entries.read().contains_key(name)
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether no types have been registered yet.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for MetaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

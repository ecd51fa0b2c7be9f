//! Element registry for manifest-driven pipeline construction
//!
//! Maps type names to factories for sources and elements. The pipeline
//! builder resolves every manifest node through here; tests register
//! custom factories (e.g. fault injectors) alongside the built-ins.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::nodes::{
    AutoSinkFactory, Element, FrameSource, IdentityFactory, TestSourceFactory, TextOverlayFactory,
};

/// Factory trait for creating frame sources.
pub trait SourceFactory: Send + Sync {
    /// Create a new source instance with the given name and parameters.
    fn create(&self, name: String, params: &Value) -> Result<Box<dyn FrameSource>>;

    /// Get the source type this factory creates.
    fn source_type(&self) -> &str;
}

/// Factory trait for creating pipeline elements.
pub trait ElementFactory: Send + Sync {
    /// Create a new element instance with the given name and parameters.
    fn create(&self, name: String, params: &Value) -> Result<Box<dyn Element>>;

    /// Get the element type this factory creates.
    fn element_type(&self) -> &str;
}

/// Registry of source and element factories, keyed by type name.
pub struct ElementRegistry {
    sources: HashMap<String, Arc<dyn SourceFactory>>,
    elements: HashMap<String, Arc<dyn ElementFactory>>,
}

impl ElementRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            sources: HashMap::new(),
            elements: HashMap::new(),
        }
    }

    /// Create a registry pre-populated with the built-in types:
    /// `TestSource`, `Identity`, `TextOverlay`, `AutoSink`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_source(Arc::new(TestSourceFactory));
        registry.register_element(Arc::new(IdentityFactory));
        registry.register_element(Arc::new(TextOverlayFactory));
        registry.register_element(Arc::new(AutoSinkFactory));
        registry
    }

    /// Register a source factory.
    pub fn register_source(&mut self, factory: Arc<dyn SourceFactory>) {
        let source_type = factory.source_type().to_string();
        self.sources.insert(source_type, factory);
    }

    /// Register an element factory.
    pub fn register_element(&mut self, factory: Arc<dyn ElementFactory>) {
        let element_type = factory.element_type().to_string();
        self.elements.insert(element_type, factory);
    }

    /// Create a source by type name.
    pub fn create_source(
        &self,
        source_type: &str,
        name: String,
        params: &Value,
    ) -> Result<Box<dyn FrameSource>> {
        let factory = self.sources.get(source_type).ok_or_else(|| {
            Error::Construction(format!(
                "no source factory registered for type '{}'. Available types: {:?}",
                source_type,
                self.list_source_types()
            ))
        })?;
        factory.create(name, params)
    }

    /// Create an element by type name.
    pub fn create_element(
        &self,
        element_type: &str,
        name: String,
        params: &Value,
    ) -> Result<Box<dyn Element>> {
        let factory = self.elements.get(element_type).ok_or_else(|| {
            Error::Construction(format!(
                "no element factory registered for type '{}'. Available types: {:?}",
                element_type,
                self.list_element_types()
            ))
        })?;
        factory.create(name, params)
    }

    /// Check if a source type is registered.
    pub fn has_source_type(&self, source_type: &str) -> bool {
        self.sources.contains_key(source_type)
    }

    /// Check if an element type is registered.
    pub fn has_element_type(&self, element_type: &str) -> bool {
        self.elements.contains_key(element_type)
    }

    /// List all registered source types.
    pub fn list_source_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.sources.keys().cloned().collect();
        types.sort();
        types
    }

    /// List all registered element types.
    pub fn list_element_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.elements.keys().cloned().collect();
        types.sort();
        types
    }
}

impl Default for ElementRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_registry_has_no_types() {
        let registry = ElementRegistry::new();
        assert!(registry.list_source_types().is_empty());
        assert!(registry.list_element_types().is_empty());
    }

    #[test]
    fn builtins_are_registered() {
        let registry = ElementRegistry::with_builtins();
        assert!(registry.has_source_type("TestSource"));
        assert!(registry.has_element_type("Identity"));
        assert!(registry.has_element_type("TextOverlay"));
        assert!(registry.has_element_type("AutoSink"));
    }

    #[test]
    fn unknown_type_is_a_construction_error() {
        let registry = ElementRegistry::with_builtins();
        let result = registry.create_element("NoSuchElement", "x".into(), &Value::Null);
        match result {
            Err(Error::Construction(msg)) => assert!(msg.contains("NoSuchElement")),
            other => panic!("expected construction error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn create_element_by_type() {
        let registry = ElementRegistry::with_builtins();
        let element = registry
            .create_element("Identity", "ident0".into(), &Value::Null)
            .expect("create");
        assert_eq!(element.name(), "ident0");
        assert_eq!(element.element_type(), "Identity");
    }
}

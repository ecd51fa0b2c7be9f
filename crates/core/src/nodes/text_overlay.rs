//! Text overlay element
//!
//! Renders the current value of its `"text"` property onto each frame.
//! The property is the single string-valued knob the embed stage pushes
//! the human-readable counter through; it is exposed as a clonable
//! [`StringProperty`] handle so the setter can live on another stage
//! while the overlay owns the element slot.
//!
//! Rendering itself is intentionally minimal (the text bytes are
//! stamped into the head of the payload): the overlay is an external
//! collaborator whose internals are not this crate's concern.

use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use serde_json::Value;

use crate::data::Frame;
use crate::error::Result;
use crate::nodes::{Element, ElementFactory};

/// Clonable handle to a string-valued element property.
///
/// Settable from any thread; the owning element reads the latest value
/// when it processes a frame.
#[derive(Clone, Default)]
pub struct StringProperty(Arc<Mutex<String>>);

impl StringProperty {
    /// Set the property value.
    pub fn set(&self, value: impl Into<String>) {
        *self.0.lock() = value.into();
    }

    /// Read the current property value.
    pub fn get(&self) -> String {
        self.0.lock().clone()
    }
}

/// Overlay element stamping its `"text"` property onto frames.
pub struct TextOverlay {
    name: String,
    text: StringProperty,
}

impl TextOverlay {
    /// Create a new overlay with an empty text property.
    pub fn new(name: String) -> Self {
        Self {
            name,
            text: StringProperty::default(),
        }
    }
}

impl Element for TextOverlay {
    fn name(&self) -> &str {
        &self.name
    }

    fn element_type(&self) -> &str {
        "TextOverlay"
    }

    fn process(&mut self, mut frame: Frame) -> Result<Frame> {
        let text = self.text.get();
        if !text.is_empty() && !frame.payload.is_empty() {
            let mut pixels = frame.payload.to_vec();
            let stamp = text.as_bytes();
            let len = stamp.len().min(pixels.len());
            pixels[..len].copy_from_slice(&stamp[..len]);
            frame.payload = Bytes::from(pixels);
            tracing::trace!(overlay = %self.name, %text, "rendered overlay text");
        }
        Ok(frame)
    }

    fn string_property(&self, name: &str) -> Option<StringProperty> {
        (name == "text").then(|| self.text.clone())
    }
}

/// Factory for [`TextOverlay`].
pub struct TextOverlayFactory;

impl ElementFactory for TextOverlayFactory {
    fn create(&self, name: String, _params: &Value) -> Result<Box<dyn Element>> {
        Ok(Box::new(TextOverlay::new(name)))
    }

    fn element_type(&self) -> &str {
        "TextOverlay"
    }
}

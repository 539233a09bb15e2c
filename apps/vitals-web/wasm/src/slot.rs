//! Publication of snapshots onto a global property (`window.__metrics`)

use std::rc::Rc;

use js_sys::{Object, Reflect};
use serde::Serialize;
use vitals_core::{MetricsSnapshot, PublishTarget, VitalsError};
use wasm_bindgen::{JsCast, JsValue};

/// Publishes each snapshot as a frozen plain object under `key`
pub struct WindowSlot {
    key: String,
}

impl WindowSlot {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

/// Serialize a snapshot to a plain JS object (`null` for unset values)
pub fn snapshot_to_js(snapshot: &MetricsSnapshot) -> Result<JsValue, VitalsError> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    snapshot
        .serialize(&serializer)
        .map_err(|e| VitalsError::Serialization(e.to_string()))
}

impl PublishTarget for WindowSlot {
    fn publish(&self, snapshot: &Rc<MetricsSnapshot>) -> Result<(), VitalsError> {
        // No window (worker, torn-down frame): nobody to read it
        let Some(window) = web_sys::window() else {
            return Ok(());
        };

        let value = snapshot_to_js(snapshot)?;
        let frozen = match value.dyn_into::<Object>() {
            Ok(obj) => JsValue::from(Object::freeze(&obj)),
            Err(value) => value,
        };

        Reflect::set(&window, &JsValue::from_str(&self.key), &frozen)
            .map_err(|e| VitalsError::Publish(format!("{:?}", e)))?;
        Ok(())
    }
}

//! Browser-backed timing buffers and capability probing

use js_sys::{Array, Reflect};
use vitals_core::{CapabilitySet, NavigationRecord, ResourceEntry, TimingSource, VitalsError};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::Performance;

use crate::entries;

/// Reads `performance.getEntriesByType(...)` on every sample
pub struct BrowserTimingSource {
    performance: Option<Performance>,
}

impl BrowserTimingSource {
    pub fn new() -> Self {
        Self {
            performance: web_sys::window().and_then(|w| w.performance()),
        }
    }

    fn entries_by_type(&self, entry_type: &str) -> Result<Array, VitalsError> {
        self.performance
            .as_ref()
            .map(|p| p.get_entries_by_type(entry_type))
            .ok_or_else(|| VitalsError::BufferUnavailable("window.performance".to_string()))
    }
}

impl Default for BrowserTimingSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimingSource for BrowserTimingSource {
    fn resource_entries(&self) -> Result<Vec<ResourceEntry>, VitalsError> {
        let list = self.entries_by_type("resource")?;
        Ok(list.iter().map(|e| entries::resource(&e)).collect())
    }

    fn navigation_record(&self) -> Result<Option<NavigationRecord>, VitalsError> {
        let list = self.entries_by_type("navigation")?;
        let first = list.get(0);
        if first.is_undefined() {
            return Ok(None);
        }
        Ok(Some(entries::navigation(&first)))
    }
}

/// Read `PerformanceObserver.supportedEntryTypes` once.
///
/// A host without `PerformanceObserver` (or without the static list) supports
/// nothing.
pub fn probe_capabilities() -> CapabilitySet {
    let constructor = Reflect::get(&js_sys::global(), &JsValue::from_str("PerformanceObserver"))
        .ok()
        .filter(|c| !c.is_undefined());

    let supported = constructor
        .and_then(|c| Reflect::get(&c, &JsValue::from_str("supportedEntryTypes")).ok())
        .and_then(|types| types.dyn_into::<Array>().ok());

    match supported {
        Some(types) => CapabilitySet::from_entry_types(types.iter().filter_map(|t| t.as_string())),
        None => CapabilitySet::none(),
    }
}

//! Conversion of raw `PerformanceEntry` objects into typed records
//!
//! Fields are read by name rather than through the typed web-sys wrappers so
//! that entry types missing from older web-sys bindings (layout-shift,
//! largest-contentful-paint, longtask) convert the same way as the rest.

use js_sys::{Array, Reflect};
use vitals_core::{
    LargestPaintEntry, LayoutShiftEntry, LongTaskEntry, NavigationRecord, PaintEntry,
    ResourceEntry, SignalBatch, SignalKind,
};
use wasm_bindgen::JsValue;

fn field(entry: &JsValue, key: &str) -> JsValue {
    Reflect::get(entry, &JsValue::from_str(key)).unwrap_or(JsValue::UNDEFINED)
}

/// Numeric field, `None` if absent or not a number
pub(crate) fn number(entry: &JsValue, key: &str) -> Option<f64> {
    field(entry, key).as_f64()
}

fn number_or_zero(entry: &JsValue, key: &str) -> f64 {
    number(entry, key).unwrap_or(0.0)
}

fn string(entry: &JsValue, key: &str) -> String {
    field(entry, key).as_string().unwrap_or_default()
}

fn flag(entry: &JsValue, key: &str) -> bool {
    field(entry, key).as_bool().unwrap_or(false)
}

pub fn paint(entry: &JsValue) -> PaintEntry {
    PaintEntry::new(string(entry, "name"), number_or_zero(entry, "startTime"))
}

pub fn largest_paint(entry: &JsValue) -> LargestPaintEntry {
    LargestPaintEntry {
        render_time: number(entry, "renderTime"),
        load_time: number(entry, "loadTime"),
        start_time: number_or_zero(entry, "startTime"),
    }
}

pub fn layout_shift(entry: &JsValue) -> LayoutShiftEntry {
    LayoutShiftEntry {
        value: number_or_zero(entry, "value"),
        had_recent_input: flag(entry, "hadRecentInput"),
        start_time: number_or_zero(entry, "startTime"),
    }
}

pub fn long_task(entry: &JsValue) -> LongTaskEntry {
    LongTaskEntry {
        start_time: number_or_zero(entry, "startTime"),
        duration: number_or_zero(entry, "duration"),
    }
}

pub fn resource(entry: &JsValue) -> ResourceEntry {
    ResourceEntry {
        name: string(entry, "name"),
        initiator_type: string(entry, "initiatorType"),
        transfer_size: number_or_zero(entry, "transferSize"),
        encoded_body_size: number_or_zero(entry, "encodedBodySize"),
        decoded_body_size: number_or_zero(entry, "decodedBodySize"),
        duration: number_or_zero(entry, "duration"),
    }
}

pub fn navigation(entry: &JsValue) -> NavigationRecord {
    NavigationRecord {
        name: string(entry, "name"),
        navigation_type: string(entry, "type"),
        response_end: number_or_zero(entry, "responseEnd"),
        dom_content_loaded_event_end: number_or_zero(entry, "domContentLoadedEventEnd"),
        load_event_end: number_or_zero(entry, "loadEventEnd"),
        duration: number_or_zero(entry, "duration"),
        transfer_size: number_or_zero(entry, "transferSize"),
    }
}

/// Convert an observer's entry list into a batch of `kind`
pub fn batch(kind: SignalKind, entries: &Array) -> SignalBatch {
    match kind {
        SignalKind::Paint => SignalBatch::Paint(entries.iter().map(|e| paint(&e)).collect()),
        SignalKind::LargestPaint => {
            SignalBatch::LargestPaint(entries.iter().map(|e| largest_paint(&e)).collect())
        }
        SignalKind::LayoutShift => {
            SignalBatch::LayoutShift(entries.iter().map(|e| layout_shift(&e)).collect())
        }
        SignalKind::LongTask => {
            SignalBatch::LongTask(entries.iter().map(|e| long_task(&e)).collect())
        }
    }
}

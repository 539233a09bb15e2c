//! Typed performance entry records
//!
//! Each record mirrors the subset of a browser `PerformanceEntry` subtype that
//! the aggregation needs. The browser glue converts raw entries into these
//! before handing them to the session, so everything downstream is plain Rust.

use serde::{Deserialize, Serialize};

/// Name the browser gives the first-contentful-paint entry
pub const FIRST_CONTENTFUL_PAINT: &str = "first-contentful-paint";

/// A `paint` entry (`first-paint` or `first-contentful-paint`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaintEntry {
    pub name: String,
    pub start_time: f64,
}

impl PaintEntry {
    pub fn new(name: impl Into<String>, start_time: f64) -> Self {
        Self {
            name: name.into(),
            start_time,
        }
    }

    pub fn is_first_contentful(&self) -> bool {
        self.name == FIRST_CONTENTFUL_PAINT
    }
}

/// A `largest-contentful-paint` candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LargestPaintEntry {
    /// Zero or absent for cross-origin images without Timing-Allow-Origin
    pub render_time: Option<f64>,
    pub load_time: Option<f64>,
    pub start_time: f64,
}

impl LargestPaintEntry {
    /// Candidate timestamp: render time, then load time, then start time.
    ///
    /// A zero render/load time means "not exposed" and falls through.
    pub fn candidate_time(&self) -> f64 {
        [self.render_time, self.load_time]
            .into_iter()
            .flatten()
            .find(|t| *t > 0.0)
            .unwrap_or(self.start_time)
    }
}

/// A `layout-shift` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutShiftEntry {
    pub value: f64,
    pub had_recent_input: bool,
    pub start_time: f64,
}

/// A `longtask` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LongTaskEntry {
    pub start_time: f64,
    pub duration: f64,
}

impl LongTaskEntry {
    /// Portion of the task beyond `threshold_ms`, never negative
    pub fn blocking_time(&self, threshold_ms: f64) -> f64 {
        (self.duration - threshold_ms).max(0.0)
    }
}

/// A `resource` timing record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceEntry {
    pub name: String,
    pub initiator_type: String,
    pub transfer_size: f64,
    pub encoded_body_size: f64,
    pub decoded_body_size: f64,
    pub duration: f64,
}

impl ResourceEntry {
    /// Bytes attributed to this request.
    ///
    /// Uses the wire size when positive. A zero transfer size means a cache hit
    /// or an opaque cross-origin response, so the encoded body size is used
    /// instead.
    pub fn transferred_bytes(&self) -> f64 {
        if self.transfer_size > 0.0 {
            self.transfer_size
        } else if self.encoded_body_size > 0.0 {
            self.encoded_body_size
        } else {
            0.0
        }
    }
}

/// The top-level document's `navigation` timing record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationRecord {
    pub name: String,
    /// `navigate`, `reload`, `back_forward` or `prerender`
    pub navigation_type: String,
    pub response_end: f64,
    pub dom_content_loaded_event_end: f64,
    pub load_event_end: f64,
    pub duration: f64,
    pub transfer_size: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lcp(render: Option<f64>, load: Option<f64>, start: f64) -> LargestPaintEntry {
        LargestPaintEntry {
            render_time: render,
            load_time: load,
            start_time: start,
        }
    }

    #[test]
    fn test_candidate_prefers_render_time() {
        assert_eq!(lcp(Some(800.0), Some(700.0), 10.0).candidate_time(), 800.0);
    }

    #[test]
    fn test_candidate_falls_back_to_load_time() {
        assert_eq!(lcp(None, Some(700.0), 10.0).candidate_time(), 700.0);
        assert_eq!(lcp(Some(0.0), Some(700.0), 10.0).candidate_time(), 700.0);
    }

    #[test]
    fn test_candidate_falls_back_to_start_time() {
        assert_eq!(lcp(None, None, 10.0).candidate_time(), 10.0);
        assert_eq!(lcp(Some(0.0), Some(0.0), 10.0).candidate_time(), 10.0);
    }

    #[test]
    fn test_blocking_time_clamps_at_zero() {
        let short = LongTaskEntry {
            start_time: 0.0,
            duration: 30.0,
        };
        let long = LongTaskEntry {
            start_time: 0.0,
            duration: 120.0,
        };
        assert_eq!(short.blocking_time(50.0), 0.0);
        assert_eq!(long.blocking_time(50.0), 70.0);
    }

    #[test]
    fn test_transferred_bytes_fallbacks() {
        let wire = ResourceEntry {
            transfer_size: 1200.0,
            encoded_body_size: 1000.0,
            ..Default::default()
        };
        let cached = ResourceEntry {
            transfer_size: 0.0,
            encoded_body_size: 300.0,
            ..Default::default()
        };
        let opaque = ResourceEntry::default();

        assert_eq!(wire.transferred_bytes(), 1200.0);
        assert_eq!(cached.transferred_bytes(), 300.0);
        assert_eq!(opaque.transferred_bytes(), 0.0);
    }

    #[test]
    fn test_paint_entry_name_match() {
        assert!(PaintEntry::new(FIRST_CONTENTFUL_PAINT, 1.0).is_first_contentful());
        assert!(!PaintEntry::new("first-paint", 1.0).is_first_contentful());
    }
}

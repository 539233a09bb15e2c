//! Display strings for the overlay panel

use crate::snapshot::MetricsSnapshot;

/// Placeholder for a value that is unset (or, for CLS and TBT, still zero)
pub const PLACEHOLDER: &str = "-";

/// Round half away from zero at `places` decimals. `{:.N}` alone rounds
/// ties to even, which shows 2.5 ms as "2 ms".
fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

/// Milliseconds with no decimals, e.g. `"1234 ms"`
pub fn format_ms(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.0} ms", round_to(v, 0)),
        None => PLACEHOLDER.to_string(),
    }
}

/// Bytes as kilobytes with one decimal, e.g. `"1.9 KB"`
pub fn format_kb(bytes: f64) -> String {
    format!("{:.1} KB", round_to(bytes / 1024.0, 1))
}

/// Layout shift score with three decimals
pub fn format_cls(value: f64) -> String {
    if value == 0.0 {
        PLACEHOLDER.to_string()
    } else {
        format!("{:.3}", round_to(value, 3))
    }
}

fn nonzero(value: f64) -> Option<f64> {
    (value != 0.0).then_some(value)
}

/// Text for each panel cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelText {
    pub fcp: String,
    pub lcp: String,
    pub cls: String,
    pub tbt: String,
    pub requests: String,
    pub bytes: String,
}

impl PanelText {
    pub fn from_snapshot(snapshot: &MetricsSnapshot) -> Self {
        Self {
            fcp: format_ms(snapshot.first_contentful_paint),
            lcp: format_ms(snapshot.largest_contentful_paint),
            cls: format_cls(snapshot.cumulative_layout_shift),
            tbt: format_ms(nonzero(snapshot.total_blocking_time)),
            requests: snapshot.total_request_count.to_string(),
            bytes: format_kb(snapshot.total_transferred_bytes),
        }
    }

    /// Cell id and text pairs, in panel order
    pub fn cells(&self) -> [(&'static str, &str); 6] {
        [
            ("m-fcp", self.fcp.as_str()),
            ("m-lcp", self.lcp.as_str()),
            ("m-cls", self.cls.as_str()),
            ("m-tbt", self.tbt.as_str()),
            ("m-req", self.requests.as_str()),
            ("m-bytes", self.bytes.as_str()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::CapabilitySet;
    use crate::state::MetricState;

    #[test]
    fn test_format_ms() {
        assert_eq!(format_ms(None), "-");
        assert_eq!(format_ms(Some(1234.4)), "1234 ms");
        assert_eq!(format_ms(Some(0.0)), "0 ms");
    }

    #[test]
    fn test_format_kb() {
        assert_eq!(format_kb(0.0), "0.0 KB");
        assert_eq!(format_kb(2000.0), "2.0 KB");
        assert_eq!(format_kb(1536.0), "1.5 KB");
    }

    #[test]
    fn test_halves_round_up() {
        assert_eq!(format_ms(Some(2.5)), "3 ms");
        assert_eq!(format_ms(Some(1234.5)), "1235 ms");
        assert_eq!(format_ms(Some(0.5)), "1 ms");
        // 1.25 KB
        assert_eq!(format_kb(1280.0), "1.3 KB");
        assert_eq!(format_cls(0.0625), "0.063");
    }

    #[test]
    fn test_zero_cls_and_tbt_show_placeholder() {
        let snapshot = MetricsSnapshot::capture(1, &MetricState::new(), CapabilitySet::all());
        let text = PanelText::from_snapshot(&snapshot);
        assert_eq!(text.cls, "-");
        assert_eq!(text.tbt, "-");
        assert_eq!(text.requests, "1");
        assert_eq!(text.bytes, "0.0 KB");
    }

    #[test]
    fn test_cells_follow_panel_order() {
        let mut snapshot = MetricsSnapshot::capture(1, &MetricState::new(), CapabilitySet::all());
        snapshot.cumulative_layout_shift = 0.12345;
        snapshot.total_blocking_time = 100.0;
        let text = PanelText::from_snapshot(&snapshot);
        let cells = text.cells();
        assert_eq!(cells[2], ("m-cls", "0.123"));
        assert_eq!(cells[3], ("m-tbt", "100 ms"));
    }
}

//! The per-session metric aggregate
//!
//! Fields are private so the invariants hold by construction:
//! - first contentful paint is write-once
//! - largest contentful paint is last-write-wins
//! - layout shift, long task and blocking-time accumulators never decrease
//! - resource entries are only ever replaced wholesale
//! - the navigation record is write-once
//!
//! Request count and transferred bytes are derived on every read from the
//! current resource entries and are never stored.

use crate::entry::{LayoutShiftEntry, LongTaskEntry, NavigationRecord, ResourceEntry};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricState {
    first_contentful_paint: Option<f64>,
    largest_contentful_paint: Option<f64>,
    cumulative_layout_shift: f64,
    layout_shift_entries: Vec<LayoutShiftEntry>,
    long_task_count: u32,
    long_task_total_duration: f64,
    total_blocking_time: f64,
    resource_entries: Vec<ResourceEntry>,
    navigation: Option<NavigationRecord>,
}

impl MetricState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record FCP. Returns `false` (and changes nothing) if already set.
    pub fn record_first_contentful_paint(&mut self, start_time: f64) -> bool {
        if self.first_contentful_paint.is_some() {
            return false;
        }
        self.first_contentful_paint = Some(start_time);
        true
    }

    /// Overwrite the LCP candidate
    pub fn record_largest_contentful_paint(&mut self, candidate_time: f64) {
        self.largest_contentful_paint = Some(candidate_time);
    }

    /// Fold one layout shift. Shifts following recent input are dropped
    /// without a trace; returns whether the shift was counted.
    pub fn record_layout_shift(&mut self, entry: LayoutShiftEntry) -> bool {
        if entry.had_recent_input {
            return false;
        }
        self.cumulative_layout_shift += entry.value.max(0.0);
        self.layout_shift_entries.push(entry);
        true
    }

    /// Fold one long task against the blocking threshold
    pub fn record_long_task(&mut self, entry: &LongTaskEntry, threshold_ms: f64) {
        self.long_task_count += 1;
        self.long_task_total_duration += entry.duration.max(0.0);
        self.total_blocking_time += entry.blocking_time(threshold_ms);
    }

    pub fn replace_resources(&mut self, entries: Vec<ResourceEntry>) {
        self.resource_entries = entries;
    }

    /// Set the navigation record unless one is already held
    pub fn record_navigation(&mut self, record: NavigationRecord) -> bool {
        if self.navigation.is_some() {
            return false;
        }
        self.navigation = Some(record);
        true
    }

    pub fn first_contentful_paint(&self) -> Option<f64> {
        self.first_contentful_paint
    }

    pub fn largest_contentful_paint(&self) -> Option<f64> {
        self.largest_contentful_paint
    }

    pub fn cumulative_layout_shift(&self) -> f64 {
        self.cumulative_layout_shift
    }

    pub fn layout_shift_entries(&self) -> &[LayoutShiftEntry] {
        &self.layout_shift_entries
    }

    pub fn long_task_count(&self) -> u32 {
        self.long_task_count
    }

    pub fn long_task_total_duration(&self) -> f64 {
        self.long_task_total_duration
    }

    pub fn total_blocking_time(&self) -> f64 {
        self.total_blocking_time
    }

    pub fn resource_entries(&self) -> &[ResourceEntry] {
        &self.resource_entries
    }

    pub fn navigation(&self) -> Option<&NavigationRecord> {
        self.navigation.as_ref()
    }

    /// Resource requests plus one for the document itself, which the
    /// resource buffer does not list
    pub fn total_request_count(&self) -> u32 {
        self.resource_entries.len() as u32 + 1
    }

    pub fn total_transferred_bytes(&self) -> f64 {
        self.resource_entries
            .iter()
            .map(ResourceEntry::transferred_bytes)
            .sum()
    }
}

//! Published metric snapshots and the slot they are published to

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::entry::{NavigationRecord, ResourceEntry};
use crate::error::VitalsError;
use crate::signal::CapabilitySet;
use crate::state::MetricState;

/// Immutable view of the metrics at one recompute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    /// Publish counter, starting at 1 for the first snapshot of a session
    pub sequence: u64,
    pub first_contentful_paint: Option<f64>,
    pub largest_contentful_paint: Option<f64>,
    pub cumulative_layout_shift: f64,
    pub layout_shift_count: usize,
    pub total_blocking_time: f64,
    pub long_task_count: u32,
    pub long_task_total_duration: f64,
    pub total_request_count: u32,
    pub total_transferred_bytes: f64,
    pub navigation: Option<NavigationRecord>,
    pub resources: Vec<ResourceEntry>,
    pub capabilities: CapabilitySet,
}

impl MetricsSnapshot {
    pub fn capture(sequence: u64, state: &MetricState, capabilities: CapabilitySet) -> Self {
        Self {
            sequence,
            first_contentful_paint: state.first_contentful_paint(),
            largest_contentful_paint: state.largest_contentful_paint(),
            cumulative_layout_shift: state.cumulative_layout_shift(),
            layout_shift_count: state.layout_shift_entries().len(),
            total_blocking_time: state.total_blocking_time(),
            long_task_count: state.long_task_count(),
            long_task_total_duration: state.long_task_total_duration(),
            total_request_count: state.total_request_count(),
            total_transferred_bytes: state.total_transferred_bytes(),
            navigation: state.navigation().cloned(),
            resources: state.resource_entries().to_vec(),
            capabilities,
        }
    }

    pub fn to_json(&self) -> Result<String, VitalsError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Somewhere snapshots are published for external readers.
///
/// Each publish replaces the previous snapshot as a whole. Implementations
/// must tolerate having no reader at all.
pub trait PublishTarget {
    fn publish(&self, snapshot: &Rc<MetricsSnapshot>) -> Result<(), VitalsError>;
}

/// In-memory publish slot; clones share the same slot
#[derive(Debug, Clone, Default)]
pub struct SnapshotSlot {
    latest: Rc<RefCell<Option<Rc<MetricsSnapshot>>>>,
}

impl SnapshotSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently published snapshot
    pub fn latest(&self) -> Option<Rc<MetricsSnapshot>> {
        self.latest.borrow().clone()
    }
}

impl PublishTarget for SnapshotSlot {
    fn publish(&self, snapshot: &Rc<MetricsSnapshot>) -> Result<(), VitalsError> {
        let mut slot = self
            .latest
            .try_borrow_mut()
            .map_err(|e| VitalsError::Publish(e.to_string()))?;
        *slot = Some(Rc::clone(snapshot));
        Ok(())
    }
}

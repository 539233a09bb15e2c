//! Pull-based resource and navigation sampling
//!
//! The host's resource and navigation buffers are authoritative and already
//! hold full history, so each sample replaces what the state holds rather
//! than appending to it. Sampling only happens when the session recomputes.

use tracing::{debug, trace};

use crate::entry::{NavigationRecord, ResourceEntry};
use crate::error::VitalsError;
use crate::state::MetricState;

/// Read access to the host's pull-only timing buffers
pub trait TimingSource {
    /// Every resource timing record buffered so far
    fn resource_entries(&self) -> Result<Vec<ResourceEntry>, VitalsError>;

    /// The document's navigation record, `None` if not yet available
    fn navigation_record(&self) -> Result<Option<NavigationRecord>, VitalsError>;
}

/// A timing source with nothing in it
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyTimingSource;

impl TimingSource for EmptyTimingSource {
    fn resource_entries(&self) -> Result<Vec<ResourceEntry>, VitalsError> {
        Ok(Vec::new())
    }

    fn navigation_record(&self) -> Result<Option<NavigationRecord>, VitalsError> {
        Ok(None)
    }
}

/// What one sample changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SampleReport {
    pub resources: usize,
    pub navigation_recorded: bool,
}

/// Refresh `state` from `source`.
///
/// An unreadable or empty buffer counts as "not yet available": the state keeps
/// whatever it already holds and a later sample can fill it in.
pub fn sample<S: TimingSource + ?Sized>(source: &S, state: &mut MetricState) -> SampleReport {
    let mut report = SampleReport::default();

    match source.resource_entries() {
        Ok(entries) if entries.is_empty() => {
            trace!("resource buffer empty");
        }
        Ok(entries) => {
            report.resources = entries.len();
            state.replace_resources(entries);
        }
        Err(e) => debug!(error = %e, "resource buffer unreadable"),
    }

    match source.navigation_record() {
        Ok(Some(record)) => {
            report.navigation_recorded = state.record_navigation(record);
        }
        Ok(None) => trace!("navigation record not available yet"),
        Err(e) => debug!(error = %e, "navigation buffer unreadable"),
    }

    report
}

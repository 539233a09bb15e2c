//! In-page performance vitals aggregation
//!
//! This crate holds the platform-independent engine behind the vitals widget:
//! typed performance entries, the per-session metric state, the observer bank
//! that folds delivered batches, the pull-based resource/navigation sampler
//! and the recompute-and-publish cycle.
//!
//! The browser glue (`vitals-wasm`) only converts raw `PerformanceEntry`
//! objects into [`entry`] records, implements [`TimingSource`] and
//! [`PublishTarget`], and renders [`PanelText`].
//!
//! ## Metrics
//! - FCP: first `first-contentful-paint` start time, write-once
//! - LCP: latest largest-contentful-paint candidate
//! - CLS: sum of layout shifts without recent input
//! - TBT (approx.): sum of long-task time beyond the threshold
//! - Requests: resource entries plus the document itself
//! - Bytes: transfer size, falling back to encoded body size

pub mod config;
pub mod display;
pub mod entry;
pub mod error;
pub mod observer;
pub mod sampler;
pub mod session;
pub mod signal;
pub mod snapshot;
pub mod state;

pub use config::{PanelConfig, PanelCorner, VitalsConfig};
pub use display::{format_kb, format_ms, PanelText};
pub use entry::{
    LargestPaintEntry, LayoutShiftEntry, LongTaskEntry, NavigationRecord, PaintEntry,
    ResourceEntry,
};
pub use error::VitalsError;
pub use observer::{FoldOutcome, ObserverBank, ObserverHandle, SubscriptionStatus};
pub use sampler::{EmptyTimingSource, SampleReport, TimingSource};
pub use session::VitalsSession;
pub use signal::{CapabilitySet, SignalBatch, SignalKind};
pub use snapshot::{MetricsSnapshot, PublishTarget, SnapshotSlot};
pub use state::MetricState;

//! Instrumentation session: state, observers, sampling and publication
//!
//! A session is the single owner of one page's [`MetricState`]. Observer
//! callbacks hand batches to [`VitalsSession::deliver`]; manual refreshes call
//! [`VitalsSession::recompute_and_publish`]. Both end in the same recompute,
//! which re-samples the timing buffers and publishes a fresh snapshot.
//!
//! Sessions are independent of each other; nothing here is global.

use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::config::VitalsConfig;
use crate::observer::{ObserverBank, ObserverHandle, SubscriptionStatus};
use crate::sampler::{self, TimingSource};
use crate::signal::{CapabilitySet, SignalBatch, SignalKind};
use crate::snapshot::{MetricsSnapshot, PublishTarget};
use crate::state::MetricState;

pub struct VitalsSession<S, P> {
    config: VitalsConfig,
    capabilities: CapabilitySet,
    state: MetricState,
    bank: ObserverBank,
    source: S,
    target: P,
    publish_count: u64,
}

impl<S: TimingSource, P: PublishTarget> VitalsSession<S, P> {
    pub fn new(config: VitalsConfig, capabilities: CapabilitySet, source: S, target: P) -> Self {
        info!(
            supported = ?capabilities.supported(),
            unsupported = ?capabilities.unsupported(),
            "vitals session started"
        );
        Self {
            config,
            capabilities,
            state: MetricState::new(),
            bank: ObserverBank::new(capabilities),
            source,
            target,
            publish_count: 0,
        }
    }

    pub fn capabilities(&self) -> CapabilitySet {
        self.capabilities
    }

    pub fn state(&self) -> &MetricState {
        &self.state
    }

    pub fn publish_count(&self) -> u64 {
        self.publish_count
    }

    pub fn subscription_status(&self, kind: SignalKind) -> SubscriptionStatus {
        self.bank.status(kind)
    }

    pub fn is_listening(&self, kind: SignalKind) -> bool {
        self.bank.is_listening(kind)
    }

    /// Hand the host observer for `kind` to the session
    pub fn attach_observer(&mut self, kind: SignalKind, handle: Box<dyn ObserverHandle>) -> bool {
        self.bank.attach(kind, handle)
    }

    /// The host failed to subscribe to `kind`; treat it as unsupported
    pub fn mark_unsupported(&mut self, kind: SignalKind) {
        self.bank.mark_unsupported(kind);
        self.capabilities = self.capabilities.without(kind);
    }

    /// Stop all observers. Only for dropping the session before page unload.
    pub fn disconnect_observers(&mut self) {
        self.bank.cancel_all();
    }

    /// Fold a delivered batch and publish if it changed anything worth showing
    pub fn deliver(&mut self, batch: SignalBatch) -> Option<Rc<MetricsSnapshot>> {
        if !self.absorb(batch) {
            return None;
        }
        Some(self.recompute_and_publish())
    }

    /// Fold a delivered batch without publishing.
    /// Returns whether a recompute is due.
    pub fn absorb(&mut self, batch: SignalBatch) -> bool {
        self.bank
            .fold(&mut self.state, batch, self.config.long_task_threshold_ms)
            .recompute
    }

    /// Re-sample the timing buffers, capture a snapshot and publish it.
    ///
    /// Publication failures are logged and otherwise ignored; the returned
    /// snapshot is valid either way.
    pub fn recompute_and_publish(&mut self) -> Rc<MetricsSnapshot> {
        let snapshot = self.recompute();
        self.publish(&snapshot);
        snapshot
    }

    /// Re-sample the timing buffers and capture the next snapshot without
    /// publishing it. Pair with [`publish`](Self::publish) when the publish
    /// target may call back into the owner of this session.
    pub fn recompute(&mut self) -> Rc<MetricsSnapshot> {
        let report = sampler::sample(&self.source, &mut self.state);
        self.publish_count += 1;

        let snapshot = Rc::new(MetricsSnapshot::capture(
            self.publish_count,
            &self.state,
            self.capabilities,
        ));
        debug!(
            sequence = snapshot.sequence,
            resources = report.resources,
            requests = snapshot.total_request_count,
            bytes = snapshot.total_transferred_bytes,
            "snapshot captured"
        );
        snapshot
    }

    /// Hand a captured snapshot to the publish target
    pub fn publish(&self, snapshot: &Rc<MetricsSnapshot>) {
        if let Err(e) = self.target.publish(snapshot) {
            warn!(error = %e, sequence = snapshot.sequence, "snapshot not published");
        }
    }
}

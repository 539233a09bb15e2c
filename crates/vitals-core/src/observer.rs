//! Observer bank: one subscription per signal category
//!
//! The bank owns the lifecycle of the four subscriptions and the rules for
//! folding a delivered batch into [`MetricState`]. It does not know how
//! entries are produced; the host attaches an [`ObserverHandle`] per
//! subscription so the bank can disconnect it (the paint subscription does so
//! after first contentful paint).
//!
//! Subscriptions are isolated from each other. A category the host does not
//! support stays [`SubscriptionStatus::Unsupported`] and any batch arriving for
//! it is ignored.

use tracing::{debug, trace};

use crate::signal::{CapabilitySet, SignalBatch, SignalKind};
use crate::state::MetricState;

/// Host-side observer that can be stopped
pub trait ObserverHandle {
    fn disconnect(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionStatus {
    /// Host lacks the category; never delivers
    Unsupported,
    /// Delivering batches
    Active,
    /// Stopped after its job was done
    Cancelled,
}

struct Subscription {
    kind: SignalKind,
    status: SubscriptionStatus,
    handle: Option<Box<dyn ObserverHandle>>,
}

impl Subscription {
    fn cancel(&mut self) {
        if self.status != SubscriptionStatus::Active {
            return;
        }
        if let Some(handle) = self.handle.take() {
            handle.disconnect();
        }
        self.status = SubscriptionStatus::Cancelled;
        debug!(kind = %self.kind, "subscription cancelled");
    }
}

/// What a fold did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FoldOutcome {
    /// Entries that changed state
    pub accepted: usize,
    /// Whether the caller should recompute and publish
    pub recompute: bool,
}

pub struct ObserverBank {
    subscriptions: [Subscription; 4],
}

impl ObserverBank {
    pub fn new(capabilities: CapabilitySet) -> Self {
        let subscriptions = SignalKind::ALL.map(|kind| Subscription {
            kind,
            status: if capabilities.supports(kind) {
                SubscriptionStatus::Active
            } else {
                SubscriptionStatus::Unsupported
            },
            handle: None,
        });
        Self { subscriptions }
    }

    fn subscription(&self, kind: SignalKind) -> &Subscription {
        &self.subscriptions[Self::index(kind)]
    }

    fn subscription_mut(&mut self, kind: SignalKind) -> &mut Subscription {
        &mut self.subscriptions[Self::index(kind)]
    }

    fn index(kind: SignalKind) -> usize {
        match kind {
            SignalKind::Paint => 0,
            SignalKind::LargestPaint => 1,
            SignalKind::LayoutShift => 2,
            SignalKind::LongTask => 3,
        }
    }

    pub fn status(&self, kind: SignalKind) -> SubscriptionStatus {
        self.subscription(kind).status
    }

    pub fn is_listening(&self, kind: SignalKind) -> bool {
        self.status(kind) == SubscriptionStatus::Active
    }

    /// Attach the host observer for an active subscription.
    ///
    /// Returns `false` and disconnects the handle straight away if the
    /// subscription is not active.
    pub fn attach(&mut self, kind: SignalKind, handle: Box<dyn ObserverHandle>) -> bool {
        let sub = self.subscription_mut(kind);
        if sub.status != SubscriptionStatus::Active {
            handle.disconnect();
            return false;
        }
        sub.handle = Some(handle);
        true
    }

    pub fn cancel(&mut self, kind: SignalKind) {
        self.subscription_mut(kind).cancel();
    }

    /// Record that the host refused a subscription the probe reported as
    /// supported
    pub fn mark_unsupported(&mut self, kind: SignalKind) {
        let sub = self.subscription_mut(kind);
        if let Some(handle) = sub.handle.take() {
            handle.disconnect();
        }
        sub.status = SubscriptionStatus::Unsupported;
        debug!(%kind, "subscription marked unsupported");
    }

    /// Disconnect every active subscription
    pub fn cancel_all(&mut self) {
        for sub in &mut self.subscriptions {
            sub.cancel();
        }
    }

    /// Fold one delivered batch into `state`
    pub fn fold(
        &mut self,
        state: &mut MetricState,
        batch: SignalBatch,
        long_task_threshold_ms: f64,
    ) -> FoldOutcome {
        let kind = batch.kind();
        if batch.is_empty() {
            return FoldOutcome::default();
        }
        if !self.is_listening(kind) {
            trace!(%kind, entries = batch.len(), "batch ignored, not listening");
            return FoldOutcome::default();
        }

        let outcome = match batch {
            SignalBatch::Paint(entries) => {
                let fcp = entries.iter().find(|e| e.is_first_contentful());
                match fcp {
                    Some(entry) if state.record_first_contentful_paint(entry.start_time) => {
                        debug!(start_time = entry.start_time, "first contentful paint");
                        self.cancel(SignalKind::Paint);
                        FoldOutcome {
                            accepted: 1,
                            recompute: true,
                        }
                    }
                    _ => FoldOutcome::default(),
                }
            }
            SignalBatch::LargestPaint(entries) => {
                let accepted = entries.len();
                for entry in entries {
                    let candidate = entry.candidate_time();
                    trace!(candidate, "largest contentful paint candidate");
                    state.record_largest_contentful_paint(candidate);
                }
                FoldOutcome {
                    accepted,
                    recompute: true,
                }
            }
            SignalBatch::LayoutShift(entries) => {
                let accepted = entries
                    .into_iter()
                    .map(|entry| state.record_layout_shift(entry))
                    .filter(|counted| *counted)
                    .count();
                FoldOutcome {
                    accepted,
                    recompute: true,
                }
            }
            SignalBatch::LongTask(entries) => {
                for entry in &entries {
                    state.record_long_task(entry, long_task_threshold_ms);
                }
                FoldOutcome {
                    accepted: entries.len(),
                    recompute: true,
                }
            }
        };

        debug!(%kind, accepted = outcome.accepted, "batch folded");
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{LargestPaintEntry, LayoutShiftEntry, LongTaskEntry, PaintEntry};
    use std::cell::Cell;
    use std::rc::Rc;

    struct CountingHandle(Rc<Cell<u32>>);

    impl ObserverHandle for CountingHandle {
        fn disconnect(&self) {
            self.0.set(self.0.get() + 1);
        }
    }

    fn fcp(t: f64) -> PaintEntry {
        PaintEntry::new(crate::entry::FIRST_CONTENTFUL_PAINT, t)
    }

    #[test]
    fn test_unsupported_categories_start_unsupported() {
        let bank = ObserverBank::new(CapabilitySet::all().without(SignalKind::LongTask));
        assert!(bank.is_listening(SignalKind::Paint));
        assert_eq!(
            bank.status(SignalKind::LongTask),
            SubscriptionStatus::Unsupported
        );
    }

    #[test]
    fn test_batch_for_unsupported_category_ignored() {
        let mut bank = ObserverBank::new(CapabilitySet::none());
        let mut state = MetricState::new();
        let batch = SignalBatch::LongTask(vec![LongTaskEntry {
            start_time: 0.0,
            duration: 200.0,
        }]);

        let outcome = bank.fold(&mut state, batch, 50.0);
        assert!(!outcome.recompute);
        assert_eq!(state.long_task_count(), 0);
        assert_eq!(state.total_blocking_time(), 0.0);
    }

    #[test]
    fn test_paint_disconnects_after_fcp() {
        let disconnects = Rc::new(Cell::new(0));
        let mut bank = ObserverBank::new(CapabilitySet::all());
        bank.attach(
            SignalKind::Paint,
            Box::new(CountingHandle(disconnects.clone())),
        );
        let mut state = MetricState::new();

        let first = bank.fold(
            &mut state,
            SignalBatch::Paint(vec![PaintEntry::new("first-paint", 90.0), fcp(100.0)]),
            50.0,
        );
        assert!(first.recompute);
        assert_eq!(disconnects.get(), 1);
        assert_eq!(bank.status(SignalKind::Paint), SubscriptionStatus::Cancelled);

        let second = bank.fold(&mut state, SignalBatch::Paint(vec![fcp(300.0)]), 50.0);
        assert!(!second.recompute);
        assert_eq!(state.first_contentful_paint(), Some(100.0));
        assert_eq!(disconnects.get(), 1);
    }

    #[test]
    fn test_first_paint_alone_keeps_listening() {
        let mut bank = ObserverBank::new(CapabilitySet::all());
        let mut state = MetricState::new();
        let outcome = bank.fold(
            &mut state,
            SignalBatch::Paint(vec![PaintEntry::new("first-paint", 40.0)]),
            50.0,
        );
        assert!(!outcome.recompute);
        assert!(bank.is_listening(SignalKind::Paint));
        assert_eq!(state.first_contentful_paint(), None);
    }

    #[test]
    fn test_attach_to_unsupported_disconnects_handle() {
        let disconnects = Rc::new(Cell::new(0));
        let mut bank = ObserverBank::new(CapabilitySet::none());
        let attached = bank.attach(
            SignalKind::LayoutShift,
            Box::new(CountingHandle(disconnects.clone())),
        );
        assert!(!attached);
        assert_eq!(disconnects.get(), 1);
    }

    #[test]
    fn test_largest_paint_uses_last_entry_in_batch() {
        let mut bank = ObserverBank::new(CapabilitySet::all());
        let mut state = MetricState::new();
        let entries = vec![
            LargestPaintEntry {
                render_time: Some(800.0),
                load_time: None,
                start_time: 0.0,
            },
            LargestPaintEntry {
                render_time: None,
                load_time: Some(650.0),
                start_time: 0.0,
            },
        ];
        bank.fold(&mut state, SignalBatch::LargestPaint(entries), 50.0);
        assert_eq!(state.largest_contentful_paint(), Some(650.0));
    }

    #[test]
    fn test_layout_shift_counts_only_accepted() {
        let mut bank = ObserverBank::new(CapabilitySet::all());
        let mut state = MetricState::new();
        let entries = vec![
            LayoutShiftEntry {
                value: 0.05,
                had_recent_input: false,
                start_time: 1.0,
            },
            LayoutShiftEntry {
                value: 0.4,
                had_recent_input: true,
                start_time: 2.0,
            },
        ];
        let outcome = bank.fold(&mut state, SignalBatch::LayoutShift(entries), 50.0);
        assert_eq!(outcome.accepted, 1);
        assert!(outcome.recompute);
        assert_eq!(state.cumulative_layout_shift(), 0.05);
    }
}

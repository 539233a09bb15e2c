//! End-to-end scenarios against a session with scripted buffers

use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use vitals_core::{
    CapabilitySet, LargestPaintEntry, LongTaskEntry, NavigationRecord, PanelText, ResourceEntry,
    SignalBatch, SignalKind, SnapshotSlot, SubscriptionStatus, TimingSource, VitalsConfig,
    VitalsError, VitalsSession,
};

/// Timing buffers the test can change between recomputes
#[derive(Clone, Default)]
struct ScriptedSource {
    resources: Rc<RefCell<Vec<ResourceEntry>>>,
    navigation: Rc<RefCell<Option<NavigationRecord>>>,
}

impl TimingSource for ScriptedSource {
    fn resource_entries(&self) -> Result<Vec<ResourceEntry>, VitalsError> {
        Ok(self.resources.borrow().clone())
    }

    fn navigation_record(&self) -> Result<Option<NavigationRecord>, VitalsError> {
        Ok(self.navigation.borrow().clone())
    }
}

fn resource(name: &str, transfer: f64, encoded: f64) -> ResourceEntry {
    ResourceEntry {
        name: name.to_string(),
        initiator_type: "img".to_string(),
        transfer_size: transfer,
        encoded_body_size: encoded,
        decoded_body_size: encoded,
        duration: 12.0,
    }
}

fn new_session(
    capabilities: CapabilitySet,
) -> (VitalsSession<ScriptedSource, SnapshotSlot>, ScriptedSource, SnapshotSlot) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let source = ScriptedSource::default();
    let slot = SnapshotSlot::new();
    let session = VitalsSession::new(
        VitalsConfig::default(),
        capabilities,
        source.clone(),
        slot.clone(),
    );
    (session, source, slot)
}

#[test]
fn transferred_bytes_fall_back_to_encoded_size() {
    let (mut session, source, slot) = new_session(CapabilitySet::all());
    *source.resources.borrow_mut() = vec![
        resource("a.js", 1200.0, 1200.0),
        resource("b.css", 0.0, 300.0),
        resource("c.png", 500.0, 500.0),
    ];

    session.recompute_and_publish();

    let published = slot.latest().unwrap();
    assert_eq!(published.total_transferred_bytes, 2000.0);
    assert_eq!(published.total_request_count, 4);
}

#[test]
fn blocking_time_from_three_long_tasks() {
    let (mut session, _, slot) = new_session(CapabilitySet::all());
    let tasks = [30.0, 80.0, 120.0]
        .into_iter()
        .map(|duration| LongTaskEntry {
            start_time: 0.0,
            duration,
        })
        .collect();

    session.deliver(SignalBatch::LongTask(tasks));

    let published = slot.latest().unwrap();
    assert_eq!(published.total_blocking_time, 100.0);
    assert_eq!(published.long_task_count, 3);
    assert_eq!(published.long_task_total_duration, 230.0);
}

#[test]
fn largest_paint_last_write_wins() {
    let (mut session, _, slot) = new_session(CapabilitySet::all());
    for render_time in [800.0, 1500.0] {
        session.deliver(SignalBatch::LargestPaint(vec![LargestPaintEntry {
            render_time: Some(render_time),
            load_time: None,
            start_time: 0.0,
        }]));
    }
    assert_eq!(slot.latest().unwrap().largest_contentful_paint, Some(1500.0));

    // A smaller later candidate still replaces the value
    session.deliver(SignalBatch::LargestPaint(vec![LargestPaintEntry {
        render_time: Some(1200.0),
        load_time: None,
        start_time: 0.0,
    }]));
    assert_eq!(slot.latest().unwrap().largest_contentful_paint, Some(1200.0));
}

#[test]
fn flushed_largest_paint_records_replace_earlier_candidates() {
    let (mut session, _, slot) = new_session(CapabilitySet::all());
    session.deliver(SignalBatch::LargestPaint(vec![LargestPaintEntry {
        render_time: Some(900.0),
        load_time: None,
        start_time: 0.0,
    }]));
    assert_eq!(slot.latest().unwrap().largest_contentful_paint, Some(900.0));

    // Records pulled on visibility change, oldest first; the last one wins
    let flushed = SignalBatch::LargestPaint(vec![
        LargestPaintEntry {
            render_time: Some(0.0),
            load_time: Some(1400.0),
            start_time: 30.0,
        },
        LargestPaintEntry {
            render_time: None,
            load_time: None,
            start_time: 1650.0,
        },
    ]);
    let published = session.deliver(flushed).unwrap();
    assert_eq!(published.largest_contentful_paint, Some(1650.0));
    assert_eq!(published.sequence, 2);
    assert!(session.is_listening(SignalKind::LargestPaint));

    // Nothing left queued: an empty flush leaves the last snapshot in place
    assert!(session.deliver(SignalBatch::LargestPaint(Vec::new())).is_none());
    assert_eq!(slot.latest().unwrap().sequence, 2);
}

#[test]
fn unsupported_long_tasks_leave_blocking_time_at_zero() {
    let caps = CapabilitySet::all().without(SignalKind::LongTask);
    let (mut session, _, slot) = new_session(caps);
    assert_eq!(
        session.subscription_status(SignalKind::LongTask),
        SubscriptionStatus::Unsupported
    );

    let stray = session.deliver(SignalBatch::LongTask(vec![LongTaskEntry {
        start_time: 0.0,
        duration: 400.0,
    }]));
    assert!(stray.is_none());

    for _ in 0..3 {
        session.recompute_and_publish();
    }

    let published = slot.latest().unwrap();
    assert_eq!(published.total_blocking_time, 0.0);
    assert_eq!(published.long_task_count, 0);
    assert!(!published.capabilities.supports(SignalKind::LongTask));
    assert_eq!(PanelText::from_snapshot(&published).tbt, "-");
}

#[test]
fn resources_loaded_later_are_picked_up_and_navigation_sticks() {
    let (mut session, source, slot) = new_session(CapabilitySet::all());

    session.recompute_and_publish();
    assert_eq!(slot.latest().unwrap().total_request_count, 1);
    assert!(slot.latest().unwrap().navigation.is_none());

    *source.navigation.borrow_mut() = Some(NavigationRecord {
        name: "https://example.com/".to_string(),
        navigation_type: "navigate".to_string(),
        load_event_end: 850.0,
        ..Default::default()
    });
    source
        .resources
        .borrow_mut()
        .push(resource("hero.jpg", 2048.0, 2048.0));
    session.recompute_and_publish();

    *source.navigation.borrow_mut() = Some(NavigationRecord {
        navigation_type: "reload".to_string(),
        ..Default::default()
    });
    session.recompute_and_publish();

    let published = slot.latest().unwrap();
    assert_eq!(published.sequence, 3);
    assert_eq!(published.total_request_count, 2);
    assert_eq!(
        published.navigation.as_ref().map(|n| n.navigation_type.as_str()),
        Some("navigate")
    );

    let text = PanelText::from_snapshot(&published);
    assert_eq!(text.bytes, "2.0 KB");
    assert_eq!(text.requests, "2");
}

//! WASM bindings for the in-page vitals widget
//!
//! Installs `PerformanceObserver`s for every supported signal category, feeds
//! their batches into a [`VitalsSession`], publishes each snapshot to a global
//! property and renders it in an overlay panel.
//!
//! ## Architecture
//!
//! - Aggregation, sampling and snapshot rules live in `vitals-core`
//! - This crate converts raw entries, owns the JS closures and listeners, and
//!   renders the panel
//! - The refresh/close buttons call `recomputeAndPublish()` and `teardown()`
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { VitalsWidget } from './pkg/vitals_wasm.js';
//!
//! await init();
//!
//! // Keep a reference: dropping the widget disconnects its observers
//! window.vitals = new VitalsWidget({ panel: { corner: 'top-right' } });
//!
//! // Later, from tests or the console
//! window.vitals.recomputeAndPublish();
//! console.log(window.__metrics.totalBlockingTime);
//! ```

pub mod entries;
pub mod observers;
pub mod panel;
pub mod slot;
pub mod timing;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use vitals_core::{
    MetricsSnapshot, PanelText, SignalBatch, SignalKind, VitalsConfig, VitalsError,
    VitalsSession,
};
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, Event, EventTarget, PerformanceObserver, VisibilityState, Window,
};

use crate::observers::Subscribed;
use crate::panel::{Panel, CLOSE_BUTTON_ID, REFRESH_BUTTON_ID};
use crate::slot::WindowSlot;
use crate::timing::{probe_capabilities, BrowserTimingSource};

macro_rules! console_log {
    ($enabled:expr, $($t:tt)*) => {
        if $enabled {
            web_sys::console::log_1(&format!($($t)*).into());
        }
    };
}

type BrowserSession = VitalsSession<BrowserTimingSource, WindowSlot>;

/// Initialize the WASM module
/// Called automatically by wasm-bindgen
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Get the library version
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// State shared between the widget and its JS callbacks
struct WidgetInner {
    session: RefCell<BrowserSession>,
    panel: RefCell<Option<Panel>>,
    latest: RefCell<Option<Rc<MetricsSnapshot>>>,
    debug: bool,
}

impl WidgetInner {
    /// Fold a batch and publish if the session asks for it.
    /// Returns whether a snapshot was published.
    fn deliver(&self, batch: SignalBatch) -> bool {
        if batch.is_empty() {
            return false;
        }
        let kind = batch.kind();
        let snapshot = match self.session.try_borrow_mut() {
            Ok(mut session) => {
                if !session.absorb(batch) {
                    return false;
                }
                session.recompute()
            }
            Err(_) => {
                console_log!(self.debug, "vitals: {} batch dropped, session busy", kind);
                return false;
            }
        };
        self.publish(snapshot);
        true
    }

    fn recompute(&self) -> Option<Rc<MetricsSnapshot>> {
        let snapshot = match self.session.try_borrow_mut() {
            Ok(mut session) => session.recompute(),
            Err(_) => {
                console_log!(self.debug, "vitals: recompute skipped, session busy");
                return None;
            }
        };
        self.publish(Rc::clone(&snapshot));
        Some(snapshot)
    }

    /// Show and publish a captured snapshot. Runs with the session only
    /// shared-borrowed: assigning the window slot can run page script that
    /// reads back through the widget.
    fn publish(&self, snapshot: Rc<MetricsSnapshot>) {
        self.show(Rc::clone(&snapshot));
        match self.session.try_borrow() {
            Ok(session) => session.publish(&snapshot),
            Err(_) => console_log!(
                self.debug,
                "vitals: snapshot {} not published",
                snapshot.sequence
            ),
        }
    }

    /// Pull LCP records the observer has queued but not yet delivered
    fn flush_largest_paint(&self, observer: &PerformanceObserver) -> bool {
        self.deliver(observers::take_records(SignalKind::LargestPaint, observer))
    }

    fn show(&self, snapshot: Rc<MetricsSnapshot>) {
        if let Some(panel) = self.panel.borrow().as_ref() {
            if let Err(e) = panel.render(&PanelText::from_snapshot(&snapshot)) {
                console_log!(self.debug, "vitals: panel render failed: {:?}", e);
            }
        }
        if let Ok(mut latest) = self.latest.try_borrow_mut() {
            *latest = Some(snapshot);
        }
    }

    fn attach_panel(&self) {
        if let Some(panel) = self.panel.borrow().as_ref() {
            match panel.attach() {
                Ok(true) => {}
                Ok(false) => console_log!(self.debug, "vitals: no <body> to attach panel to"),
                Err(e) => console_log!(self.debug, "vitals: panel attach failed: {:?}", e),
            }
        }
        let latest = self.latest.borrow().clone();
        if let Some(snapshot) = latest {
            self.show(snapshot);
        }
    }

    /// Remove the panel. Observers keep running.
    fn teardown(&self) {
        if let Some(panel) = self.panel.borrow_mut().take() {
            panel.remove();
        }
    }
}

/// An event listener that is removed when dropped
struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn add<F>(target: &EventTarget, event: &'static str, f: F) -> Result<Self, JsValue>
    where
        F: FnMut(Event) + 'static,
    {
        let callback = Closure::<dyn FnMut(Event)>::new(f);
        target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            event,
            callback,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
    }
}

/// Parse widget config from `undefined`, a JSON string or a plain object
fn parse_config(value: JsValue) -> Result<VitalsConfig, VitalsError> {
    if value.is_undefined() || value.is_null() {
        return Ok(VitalsConfig::default());
    }
    if let Some(json) = value.as_string() {
        return VitalsConfig::from_json(&json);
    }
    let config: VitalsConfig = serde_wasm_bindgen::from_value(value)
        .map_err(|e| VitalsError::Config(format!("Failed to parse config: {}", e)))?;
    config.validate()?;
    Ok(config)
}

fn schedule_recompute(window: &Window, inner: Weak<WidgetInner>) -> Result<(), JsValue> {
    let callback = Closure::once_into_js(move || {
        if let Some(inner) = inner.upgrade() {
            inner.recompute();
        }
    });
    window.set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), 0)?;
    Ok(())
}

/// In-page vitals widget
#[wasm_bindgen]
pub struct VitalsWidget {
    inner: Rc<WidgetInner>,
    subscriptions: Vec<Subscribed>,
    listeners: Vec<Listener>,
}

#[wasm_bindgen]
impl VitalsWidget {
    /// Probe capabilities, start observing and attach the panel.
    ///
    /// `config` may be omitted, a JSON string, or a plain object.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<VitalsWidget, JsValue> {
        let config = parse_config(config).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Self::install(config)
    }

    /// Re-sample timing buffers and publish a fresh snapshot.
    /// Returns the snapshot as a plain object.
    #[wasm_bindgen(js_name = recomputeAndPublish)]
    pub fn recompute_and_publish(&self) -> Result<JsValue, JsValue> {
        match self.inner.recompute() {
            Some(snapshot) => {
                slot::snapshot_to_js(&snapshot).map_err(|e| JsValue::from_str(&e.to_string()))
            }
            None => Ok(JsValue::NULL),
        }
    }

    /// Remove the panel; measurement continues
    #[wasm_bindgen]
    pub fn teardown(&self) {
        self.inner.teardown();
    }

    /// Last published snapshot, or `null`
    #[wasm_bindgen(js_name = latestSnapshot)]
    pub fn latest_snapshot(&self) -> Result<JsValue, JsValue> {
        let latest = self.inner.latest.try_borrow().ok().and_then(|l| l.clone());
        match latest {
            Some(snapshot) => {
                slot::snapshot_to_js(&snapshot).map_err(|e| JsValue::from_str(&e.to_string()))
            }
            None => Ok(JsValue::NULL),
        }
    }

    /// Fold any LCP records still queued on the observer, as on page hide.
    /// Returns whether that published a snapshot.
    #[wasm_bindgen(js_name = flushLargestPaint)]
    pub fn flush_largest_paint(&self) -> bool {
        self.subscriptions
            .iter()
            .find(|s| s.kind == SignalKind::LargestPaint)
            .map(|lcp| self.inner.flush_largest_paint(&lcp.observer))
            .unwrap_or(false)
    }

    /// Entry types this widget is observing, as probed at install
    #[wasm_bindgen(js_name = supportedSignals)]
    pub fn supported_signals(&self) -> js_sys::Array {
        let Ok(session) = self.inner.session.try_borrow() else {
            return js_sys::Array::new();
        };
        session
            .capabilities()
            .supported()
            .into_iter()
            .map(|k| JsValue::from_str(k.entry_type()))
            .collect()
    }

    /// Whether the subscription for `entry_type` is still delivering
    #[wasm_bindgen(js_name = isListening)]
    pub fn is_listening(&self, entry_type: &str) -> bool {
        let Some(kind) = SignalKind::from_entry_type(entry_type) else {
            return false;
        };
        self.inner
            .session
            .try_borrow()
            .map(|session| session.is_listening(kind))
            .unwrap_or(false)
    }

    #[wasm_bindgen(getter, js_name = publishCount)]
    pub fn publish_count(&self) -> u32 {
        self.inner
            .session
            .try_borrow()
            .map(|session| session.publish_count() as u32)
            .unwrap_or(0)
    }

    #[wasm_bindgen(getter, js_name = panelVisible)]
    pub fn panel_visible(&self) -> bool {
        self.inner
            .panel
            .try_borrow()
            .ok()
            .and_then(|panel| panel.as_ref().map(Panel::is_attached))
            .unwrap_or(false)
    }
}

impl VitalsWidget {
    fn install(config: VitalsConfig) -> Result<VitalsWidget, JsValue> {
        let window =
            web_sys::window().ok_or_else(|| JsValue::from_str("No window object available"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("No document object available"))?;

        let capabilities = config.effective_capabilities(probe_capabilities());
        let debug = config.debug;
        let recompute_on_load = config.recompute_on_load;
        let panel = if config.panel.enabled {
            Some(Panel::new(document.clone(), &config.panel)?)
        } else {
            None
        };

        let slot = WindowSlot::new(config.publish_key.clone());
        let session = VitalsSession::new(config, capabilities, BrowserTimingSource::new(), slot);
        let inner = Rc::new(WidgetInner {
            session: RefCell::new(session),
            panel: RefCell::new(panel),
            latest: RefCell::new(None),
            debug,
        });

        let mut widget = VitalsWidget {
            inner,
            subscriptions: Vec::new(),
            listeners: Vec::new(),
        };
        widget.subscribe_all();
        widget.listen(&window, &document, recompute_on_load)?;

        console_log!(
            debug,
            "vitals: observing {:?}",
            widget.inner.session.borrow().capabilities().supported()
        );
        Ok(widget)
    }

    fn subscribe_all(&mut self) {
        let supported = self.inner.session.borrow().capabilities().supported();
        for kind in supported {
            let weak = Rc::downgrade(&self.inner);
            let result = observers::subscribe(kind, move |batch| {
                if let Some(inner) = weak.upgrade() {
                    inner.deliver(batch);
                }
            });

            let mut session = self.inner.session.borrow_mut();
            match result {
                Ok(subscribed) => {
                    session.attach_observer(kind, subscribed.handle());
                    self.subscriptions.push(subscribed);
                }
                Err(e) => {
                    console_log!(self.inner.debug, "vitals: cannot observe {}: {:?}", kind, e);
                    session.mark_unsupported(kind);
                }
            }
        }
    }

    fn listen(
        &mut self,
        window: &Window,
        document: &Document,
        recompute_on_load: bool,
    ) -> Result<(), JsValue> {
        // Panel buttons, via delegation so the markup can be replaced freely
        let weak = Rc::downgrade(&self.inner);
        self.listeners
            .push(Listener::add(document, "click", move |event: Event| {
                let Some(inner) = weak.upgrade() else { return };
                let id = event
                    .target()
                    .and_then(|t| t.dyn_into::<Element>().ok())
                    .map(|el| el.id())
                    .unwrap_or_default();
                if id == REFRESH_BUTTON_ID {
                    inner.recompute();
                } else if id == CLOSE_BUTTON_ID {
                    inner.teardown();
                }
            })?);

        // No more LCP candidates once the page is backgrounded
        if let Some(lcp) = self
            .subscriptions
            .iter()
            .find(|s| s.kind == SignalKind::LargestPaint)
        {
            let observer = lcp.observer.clone();
            let doc = document.clone();
            let weak = Rc::downgrade(&self.inner);
            self.listeners
                .push(Listener::add(document, "visibilitychange", move |_| {
                    if doc.visibility_state() != VisibilityState::Hidden {
                        return;
                    }
                    if let Some(inner) = weak.upgrade() {
                        inner.flush_largest_paint(&observer);
                    }
                })?);
        }

        if document.ready_state() == "loading" {
            let weak = Rc::downgrade(&self.inner);
            self.listeners
                .push(Listener::add(document, "DOMContentLoaded", move |_| {
                    if let Some(inner) = weak.upgrade() {
                        inner.attach_panel();
                    }
                })?);
        } else {
            self.inner.attach_panel();
        }

        if recompute_on_load {
            if document.ready_state() == "complete" {
                schedule_recompute(window, Rc::downgrade(&self.inner))?;
            } else {
                let weak = Rc::downgrade(&self.inner);
                let win = window.clone();
                self.listeners.push(Listener::add(window, "load", move |_| {
                    if let Err(e) = schedule_recompute(&win, weak.clone()) {
                        web_sys::console::warn_1(&e);
                    }
                })?);
            }
        }

        Ok(())
    }
}

impl Drop for VitalsWidget {
    fn drop(&mut self) {
        if let Ok(mut session) = self.inner.session.try_borrow_mut() {
            session.disconnect_observers();
        }
        self.inner.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_version() {
        let version = get_version();
        assert!(!version.is_empty());
    }
}

//! `PerformanceObserver` subscriptions, one per supported signal category

use js_sys::{Array, Function, Object, Reflect};
use vitals_core::{ObserverHandle, SignalBatch, SignalKind};
use wasm_bindgen::prelude::*;
use web_sys::{PerformanceObserver, PerformanceObserverEntryList};

use crate::entries;

pub type ObserverCallback = Closure<dyn FnMut(PerformanceObserverEntryList, PerformanceObserver)>;

/// Disconnects the underlying observer. The callback closure is owned
/// separately so the observer can be stopped from inside its own callback.
pub struct BrowserObserver {
    observer: PerformanceObserver,
}

impl ObserverHandle for BrowserObserver {
    fn disconnect(&self) {
        self.observer.disconnect();
    }
}

/// A live subscription: the observer plus the closure it calls
pub struct Subscribed {
    pub kind: SignalKind,
    pub observer: PerformanceObserver,
    pub callback: ObserverCallback,
}

impl Subscribed {
    pub fn handle(&self) -> Box<dyn ObserverHandle> {
        Box::new(BrowserObserver {
            observer: self.observer.clone(),
        })
    }
}

/// `observer.takeRecords()` as a batch of `kind`; empty if the call fails
pub fn take_records(kind: SignalKind, observer: &PerformanceObserver) -> SignalBatch {
    let records = Reflect::get(observer, &"takeRecords".into())
        .and_then(|f| f.dyn_into::<Function>())
        .and_then(|f| f.call0(observer))
        .and_then(|list| list.dyn_into::<Array>())
        .unwrap_or_else(|_| Array::new());
    entries::batch(kind, &records)
}

/// Observe `kind` with `{ type, buffered: true }`, routing each delivered
/// batch to `on_batch`.
///
/// # Errors
/// Returns JsValue error if the observer cannot be constructed or `observe`
/// throws; the caller treats that category as unsupported.
pub fn subscribe<F>(kind: SignalKind, mut on_batch: F) -> Result<Subscribed, JsValue>
where
    F: FnMut(SignalBatch) + 'static,
{
    let callback: ObserverCallback = Closure::new(
        move |list: PerformanceObserverEntryList, _observer: PerformanceObserver| {
            let batch = entries::batch(kind, &list.get_entries());
            on_batch(batch);
        },
    );

    let observer = PerformanceObserver::new(callback.as_ref().unchecked_ref())?;

    let options = Object::new();
    Reflect::set(&options, &"type".into(), &kind.entry_type().into())?;
    Reflect::set(&options, &"buffered".into(), &JsValue::TRUE)?;

    // Called through Reflect so a throwing `observe` surfaces as Err
    let observe: Function = Reflect::get(&observer, &"observe".into())?.dyn_into()?;
    observe.call1(&observer, &options)?;

    Ok(Subscribed {
        kind,
        observer,
        callback,
    })
}

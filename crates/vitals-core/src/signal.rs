//! Signal categories and host capability probing
//!
//! The host exposes a fixed, closed set of observable entry types. Support is
//! probed once at startup into a [`CapabilitySet`]; a category missing from the
//! set is never subscribed and its metric stays unset.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entry::{LargestPaintEntry, LayoutShiftEntry, LongTaskEntry, PaintEntry};

/// One of the four observed signal categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalKind {
    #[serde(rename = "paint")]
    Paint,
    #[serde(rename = "largest-contentful-paint")]
    LargestPaint,
    #[serde(rename = "layout-shift")]
    LayoutShift,
    #[serde(rename = "longtask")]
    LongTask,
}

impl SignalKind {
    pub const ALL: [SignalKind; 4] = [
        SignalKind::Paint,
        SignalKind::LargestPaint,
        SignalKind::LayoutShift,
        SignalKind::LongTask,
    ];

    /// The `PerformanceEntry.entryType` string for this category
    pub fn entry_type(self) -> &'static str {
        match self {
            SignalKind::Paint => "paint",
            SignalKind::LargestPaint => "largest-contentful-paint",
            SignalKind::LayoutShift => "layout-shift",
            SignalKind::LongTask => "longtask",
        }
    }

    pub fn from_entry_type(entry_type: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.entry_type() == entry_type)
    }

    fn bit(self) -> u8 {
        match self {
            SignalKind::Paint => 1,
            SignalKind::LargestPaint => 1 << 1,
            SignalKind::LayoutShift => 1 << 2,
            SignalKind::LongTask => 1 << 3,
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.entry_type())
    }
}

/// A batch of entries delivered by one observer callback
#[derive(Debug, Clone, PartialEq)]
pub enum SignalBatch {
    Paint(Vec<PaintEntry>),
    LargestPaint(Vec<LargestPaintEntry>),
    LayoutShift(Vec<LayoutShiftEntry>),
    LongTask(Vec<LongTaskEntry>),
}

impl SignalBatch {
    pub fn kind(&self) -> SignalKind {
        match self {
            SignalBatch::Paint(_) => SignalKind::Paint,
            SignalBatch::LargestPaint(_) => SignalKind::LargestPaint,
            SignalBatch::LayoutShift(_) => SignalKind::LayoutShift,
            SignalBatch::LongTask(_) => SignalKind::LongTask,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SignalBatch::Paint(e) => e.len(),
            SignalBatch::LargestPaint(e) => e.len(),
            SignalBatch::LayoutShift(e) => e.len(),
            SignalBatch::LongTask(e) => e.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Which signal categories the host supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CapabilitySet {
    bits: u8,
}

impl CapabilitySet {
    /// No category supported
    pub fn none() -> Self {
        Self { bits: 0 }
    }

    /// Every category supported
    pub fn all() -> Self {
        SignalKind::ALL.into_iter().collect()
    }

    /// Build from the host's list of supported entry types
    /// (`PerformanceObserver.supportedEntryTypes` in a browser).
    /// Unknown entry types are ignored.
    pub fn from_entry_types<I, S>(entry_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        entry_types
            .into_iter()
            .filter_map(|t| SignalKind::from_entry_type(t.as_ref()))
            .collect()
    }

    pub fn supports(&self, kind: SignalKind) -> bool {
        self.bits & kind.bit() != 0
    }

    pub fn with(mut self, kind: SignalKind) -> Self {
        self.bits |= kind.bit();
        self
    }

    pub fn without(mut self, kind: SignalKind) -> Self {
        self.bits &= !kind.bit();
        self
    }

    pub fn supported(&self) -> Vec<SignalKind> {
        SignalKind::ALL
            .into_iter()
            .filter(|k| self.supports(*k))
            .collect()
    }

    pub fn unsupported(&self) -> Vec<SignalKind> {
        SignalKind::ALL
            .into_iter()
            .filter(|k| !self.supports(*k))
            .collect()
    }
}

impl FromIterator<SignalKind> for CapabilitySet {
    fn from_iter<T: IntoIterator<Item = SignalKind>>(iter: T) -> Self {
        iter.into_iter().fold(Self::none(), |set, kind| set.with(kind))
    }
}

/// Serialized as the list of supported entry types
impl Serialize for CapabilitySet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.supported())
    }
}

impl<'de> Deserialize<'de> for CapabilitySet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let kinds = Vec::<SignalKind>::deserialize(deserializer)?;
        Ok(kinds.into_iter().collect())
    }
}

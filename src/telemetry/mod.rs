//! CPU and RAM sampling, published as display-ready strings.

pub mod sampler;
pub mod source;

use std::sync::{Arc, PoisonError, RwLock};

pub use sampler::TelemetrySampler;
pub use source::{Reading, SysinfoSource, TelemetrySource};

/// The latest CPU and RAM strings, always replaced as a whole.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TelemetrySnapshot {
    pub cpu: String,
    pub ram: String,
}

impl TelemetrySnapshot {
    pub fn from_reading(reading: Reading) -> Self {
        Self {
            cpu: format_percent(reading.cpu_percent),
            ram: format_percent(reading.ram_percent),
        }
    }
}

/// `12.3456` becomes `"12.35%"`.
pub fn format_percent(value: f64) -> String {
    format!("{value:.2}%")
}

/// Shared slot holding the most recently published snapshot.
///
/// Writers swap in a fresh `Arc`; readers clone the `Arc` out. A reader
/// therefore sees one complete publish, possibly an older one, and never a
/// mix of two.
#[derive(Clone, Debug, Default)]
pub struct SharedSnapshot {
    slot: Arc<RwLock<Arc<TelemetrySnapshot>>>,
}

impl SharedSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, snapshot: TelemetrySnapshot) {
        let fresh = Arc::new(snapshot);
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = fresh;
    }

    pub fn load(&self) -> Arc<TelemetrySnapshot> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

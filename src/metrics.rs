//! Metric descriptors and read-only metric views
//!
//! A static table maps snapshot fields to named, unit-tagged metric values.
//! Each entry pairs display metadata with a pure projection function from an
//! immutable [`Snapshot`] to an optional scalar; absence is expressed in the
//! type, never by panicking. [`MetricView`] binds one descriptor to one
//! coordinator by composition and carries no state of its own.

use crate::coordinator::RefreshCoordinator;
use crate::upstream::Snapshot;
use std::sync::Arc;

/// Statistics/display hint for a metric's behavior over time.
///
/// `TotalIncreasing` marks monotonic counters; it is advisory only and
/// never enforced against the incoming values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateClass {
    Measurement,
    TotalIncreasing,
}

impl StateClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Measurement => "measurement",
            Self::TotalIncreasing => "total_increasing",
        }
    }
}

/// Semantic class of the measured quantity, for host-side presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Distance,
    Duration,
    Speed,
}

impl DeviceClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Distance => "distance",
            Self::Duration => "duration",
            Self::Speed => "speed",
        }
    }
}

/// Static metadata plus projection function for one published metric
pub struct MetricDescriptor {
    /// Stable key, also the suffix of the per-account unique id
    pub key: &'static str,

    /// Human-readable display name
    pub name: &'static str,

    /// Unit of measurement
    pub unit: &'static str,

    /// Suggested display precision (decimal places)
    pub precision: u8,

    /// Monotonicity hint
    pub state_class: StateClass,

    /// Optional semantic device class
    pub device_class: Option<DeviceClass>,

    /// Optional icon identifier
    pub icon: Option<&'static str>,

    value_fn: fn(&Snapshot) -> Option<f64>,
}

impl MetricDescriptor {
    /// Apply this descriptor's projection to a snapshot
    pub fn project(&self, snapshot: &Snapshot) -> Option<f64> {
        (self.value_fn)(snapshot)
    }
}

fn km_driven(s: &Snapshot) -> Option<f64> {
    s.statistics.km_driven
}

fn fines_avoided(s: &Snapshot) -> Option<f64> {
    s.statistics.fines_avoided
}

fn sec_driven(s: &Snapshot) -> Option<f64> {
    s.statistics.sec_driven
}

fn times_in_traffic(s: &Snapshot) -> Option<f64> {
    s.statistics.times_in_traffic
}

fn top_100_sprint_ms(s: &Snapshot) -> Option<f64> {
    s.statistics.top_100_sprint_ms
}

fn top_consecutive_days(s: &Snapshot) -> Option<f64> {
    s.statistics.top_consecutive_days
}

fn top_speed(s: &Snapshot) -> Option<f64> {
    s.statistics.top_speed
}

fn total_ratings(s: &Snapshot) -> Option<f64> {
    s.statistics.total_ratings
}

fn countries_visited(s: &Snapshot) -> Option<f64> {
    s.statistics
        .countries_visited
        .as_ref()
        .map(|set| set.len() as f64)
}

fn provinces_visited(s: &Snapshot) -> Option<f64> {
    s.statistics
        .provinces_visited
        .as_ref()
        .map(|set| set.len() as f64)
}

/// The canonical metric table, constructed once and never mutated.
///
/// `top_speed` reads `statistics.top_speed`; the profile mirror of the same
/// value is deliberately not projected. The two `*_visited` metrics expose
/// the cardinality of their sets, never the raw collection.
pub static SENSOR_TYPES: [MetricDescriptor; 10] = [
    MetricDescriptor {
        key: "km_driven",
        name: "Distance driven",
        unit: "km",
        precision: 0,
        state_class: StateClass::TotalIncreasing,
        device_class: Some(DeviceClass::Distance),
        icon: None,
        value_fn: km_driven,
    },
    MetricDescriptor {
        key: "fines_avoided",
        name: "Fines avoided",
        unit: "fines",
        precision: 0,
        state_class: StateClass::TotalIncreasing,
        device_class: None,
        icon: Some("mdi:cash-check"),
        value_fn: fines_avoided,
    },
    MetricDescriptor {
        key: "sec_driven",
        name: "Time driven",
        unit: "s",
        precision: 0,
        state_class: StateClass::TotalIncreasing,
        device_class: Some(DeviceClass::Duration),
        icon: None,
        value_fn: sec_driven,
    },
    MetricDescriptor {
        key: "times_in_traffic",
        name: "Times in traffic",
        unit: "times",
        precision: 0,
        state_class: StateClass::TotalIncreasing,
        device_class: None,
        icon: Some("mdi:car-multiple"),
        value_fn: times_in_traffic,
    },
    MetricDescriptor {
        key: "top_100_sprint_ms",
        name: "Top 100 sprint",
        unit: "ms",
        precision: 0,
        state_class: StateClass::Measurement,
        device_class: Some(DeviceClass::Duration),
        icon: Some("mdi:flag-checkered"),
        value_fn: top_100_sprint_ms,
    },
    MetricDescriptor {
        key: "top_consecutive_days",
        name: "Top consecutive days",
        unit: "days",
        precision: 0,
        state_class: StateClass::Measurement,
        device_class: None,
        icon: Some("mdi:calendar"),
        value_fn: top_consecutive_days,
    },
    MetricDescriptor {
        key: "top_speed",
        name: "Top speed",
        unit: "km/h",
        precision: 0,
        state_class: StateClass::Measurement,
        device_class: Some(DeviceClass::Speed),
        icon: None,
        value_fn: top_speed,
    },
    MetricDescriptor {
        key: "total_ratings",
        name: "Total ratings",
        unit: "ratings",
        precision: 0,
        state_class: StateClass::TotalIncreasing,
        device_class: None,
        icon: Some("mdi:star"),
        value_fn: total_ratings,
    },
    MetricDescriptor {
        key: "countries_visited",
        name: "Countries visited",
        unit: "countries",
        precision: 0,
        state_class: StateClass::TotalIncreasing,
        device_class: None,
        icon: Some("mdi:earth"),
        value_fn: countries_visited,
    },
    MetricDescriptor {
        key: "provinces_visited",
        name: "Provinces visited",
        unit: "provinces",
        precision: 0,
        state_class: StateClass::TotalIncreasing,
        device_class: None,
        icon: Some("mdi:map-marker-circle"),
        value_fn: provinces_visited,
    },
];

/// Look up a descriptor by key
pub fn descriptor_for(key: &str) -> Option<&'static MetricDescriptor> {
    SENSOR_TYPES.iter().find(|d| d.key == key)
}

/// Read-only projection of one metric from a coordinator's snapshot
pub struct MetricView {
    coordinator: Arc<RefreshCoordinator>,
    descriptor: &'static MetricDescriptor,
    unique_id: String,
}

impl MetricView {
    /// Bind a descriptor to a coordinator
    pub fn new(coordinator: Arc<RefreshCoordinator>, descriptor: &'static MetricDescriptor) -> Self {
        let unique_id = format!("{}.{}", coordinator.account_id(), descriptor.key);
        Self {
            coordinator,
            descriptor,
            unique_id,
        }
    }

    /// Static metadata for this metric
    pub fn descriptor(&self) -> &'static MetricDescriptor {
        self.descriptor
    }

    /// Stable identifier of the form `"{account_id}.{key}"`
    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    /// Current scalar value, or `None` when the coordinator is unavailable,
    /// no snapshot exists yet, or the source field is absent. Absence is
    /// silent and isolated to this metric.
    pub fn current_value(&self) -> Option<f64> {
        if !self.coordinator.is_available() {
            return None;
        }
        let snapshot = self.coordinator.snapshot()?;
        self.descriptor.project(&snapshot)
    }

    /// True iff the coordinator is available and the projection yields a value
    pub fn is_available(&self) -> bool {
        self.current_value().is_some()
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single uncontrollable-demand sample (spec.md §3, "DemandForecast").
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ForecastSample {
    pub timestamp: DateTime<Utc>,
    /// Power in kW. Negative values represent local generation surplus.
    pub power_kw: f64,
}

/// The uncontrollable-demand forecast the whole horizon is built from.
///
/// Invariant enforced by the Normalizer, not here: strictly monotonic
/// timestamps with uniform spacing. This type is a thin, ordered
/// container — it does not itself validate spacing so that malformed
/// input can still be reported as `InvalidHorizon` with a useful message
/// rather than panicking at construction time.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DemandForecast {
    pub samples: Vec<ForecastSample>,
}

impl DemandForecast {
    pub fn new(samples: Vec<ForecastSample>) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn t0(&self) -> Option<DateTime<Utc>> {
        self.samples.first().map(|s| s.timestamp)
    }

    pub fn power_kw(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.power_kw).collect()
    }
}

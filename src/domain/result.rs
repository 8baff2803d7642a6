use chrono::{DateTime, Utc};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Whether a returned assignment is provably optimal, or just the best
/// incumbent found before the solver's time limit (spec.md §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Optimality {
    Optimal,
    SubOptimal,
}

/// A per-asset-class result matrix: one column per order id, one row per
/// horizon timestep, row index restored to wall-clock timestamps
/// (spec.md §4.4, Result Projector).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetMatrix {
    pub timestamps: Vec<DateTime<Utc>>,
    pub ids: Vec<String>,
    #[serde(with = "array2_serde")]
    pub values: Array2<f64>,
}

impl AssetMatrix {
    pub fn get(&self, row: usize, id: &str) -> Option<f64> {
        let col = self.ids.iter().position(|i| i == id)?;
        self.values.get((row, col)).copied()
    }

    pub fn column(&self, id: &str) -> Option<Vec<f64>> {
        let col = self.ids.iter().position(|i| i == id)?;
        Some(self.values.column(col).to_vec())
    }
}

mod array2_serde {
    use ndarray::Array2;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct Shaped {
        rows: usize,
        cols: usize,
        data: Vec<f64>,
    }

    pub fn serialize<S: Serializer>(arr: &Array2<f64>, s: S) -> Result<S::Ok, S::Error> {
        let (rows, cols) = arr.dim();
        Shaped {
            rows,
            cols,
            data: arr.iter().copied().collect(),
        }
        .serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Array2<f64>, D::Error> {
        let shaped = Shaped::deserialize(d)?;
        Array2::from_shape_vec((shaped.rows, shaped.cols), shaped.data).map_err(serde::de::Error::custom)
    }
}

/// The full result bundle of spec.md §3 "Outputs".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub timestamps: Vec<DateTime<Utc>>,

    pub demandshape: Option<AssetMatrix>,
    pub batteryin: Option<AssetMatrix>,
    pub batteryout: Option<AssetMatrix>,
    pub batteryenergy: Option<AssetMatrix>,
    pub demanddeferr: Option<AssetMatrix>,
    pub deferrschedule: Option<AssetMatrix>,

    pub demand_controllable: Vec<f64>,
    pub community_import: Vec<f64>,
    pub peakhigh: f64,
    pub peaklow: f64,
    pub total_community_import: f64,

    pub optimality: Optimality,
}

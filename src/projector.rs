//! The Result Projector (spec.md §4.4): reshapes the solver's flat
//! `VarId -> f64` assignment into the per-asset-class matrices and
//! derived scalars of [`crate::domain::result::OptimizationResult`].

use ndarray::Array2;

use crate::domain::result::{AssetMatrix, Optimality, OptimizationResult};
use crate::model::index::{AssetVars, ModelIndex};
use crate::normalizer::NormalizedInstance;
use crate::solver::Solution;

pub fn project(instance: &NormalizedInstance, index: &ModelIndex, solution: &Solution) -> OptimizationResult {
    let h = instance.horizon;
    let timestamps = instance.timestamps.clone();

    let demand_controllable: Vec<f64> =
        index.demand_controllable.iter().map(|&v| solution.values[v]).collect();

    let community_import: Vec<f64> = (0..h)
        .map(|t| (instance.demand_uncontrollable[t] + demand_controllable[t]).max(0.0))
        .collect();

    let total_community_import: f64 =
        community_import.iter().sum::<f64>() * instance.timestep_hours;

    OptimizationResult {
        timestamps: timestamps.clone(),
        demandshape: to_matrix(&timestamps, &index.demandshape, solution),
        batteryin: to_matrix(&timestamps, &index.batteryin, solution),
        batteryout: to_matrix(&timestamps, &index.batteryout, solution),
        batteryenergy: to_matrix(&timestamps, &index.batteryenergy, solution),
        demanddeferr: to_matrix(&timestamps, &index.demanddeferr, solution),
        deferrschedule: to_matrix(&timestamps, &index.deferrschedule, solution),
        demand_controllable,
        community_import,
        peakhigh: solution.values[index.peakhigh],
        peaklow: solution.values[index.peaklow],
        total_community_import,
        optimality: solution.optimality,
    }
}

/// `None` when the asset class had no orders, matching spec.md §4.1
/// "Missing-order handling": an empty index set carries no variables, no
/// constraints, and — here — no result matrix.
fn to_matrix(timestamps: &[chrono::DateTime<chrono::Utc>], asset: &AssetVars, solution: &Solution) -> Option<AssetMatrix> {
    if asset.is_empty() {
        return None;
    }

    let rows = timestamps.len();
    let cols = asset.ids.len();
    let mut values = Array2::<f64>::zeros((rows, cols));
    for (col, row_vars) in asset.vars.iter().enumerate() {
        for (t, &var) in row_vars.iter().enumerate() {
            values[(t, col)] = solution.values[var];
        }
    }

    Some(AssetMatrix { timestamps: timestamps.to_vec(), ids: asset.ids.clone(), values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BatteryOrder, DemandForecast, ForecastSample, ShapeableOrder};
    use crate::model::builder::{build, ModelOptions};
    use crate::normalizer::normalize;
    use chrono::{DateTime, Duration, Utc};

    fn hourly_forecast(h: usize, power_kw: f64) -> DemandForecast {
        let t0 = DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z").unwrap().with_timezone(&Utc);
        DemandForecast::new(
            (0..h)
                .map(|i| ForecastSample { timestamp: t0 + Duration::hours(i as i64), power_kw })
                .collect(),
        )
    }

    #[test]
    fn absent_asset_classes_project_to_none() {
        let fc = hourly_forecast(4, 5.0);
        let instance = normalize(&fc, &[], &[], &[], 1.0).unwrap();
        let (problem, index) = build(&instance, ModelOptions::default());

        let solution = Solution {
            values: vec![0.0; problem.num_vars()],
            optimality: Optimality::Optimal,
        };
        let result = project(&instance, &index, &solution);

        assert!(result.demandshape.is_none());
        assert!(result.batteryin.is_none());
        assert!(result.demanddeferr.is_none());
        assert_eq!(result.demand_controllable, vec![0.0; 4]);
        assert_eq!(result.community_import, vec![5.0; 4]);
    }

    #[test]
    fn matrix_columns_follow_order_insertion_order() {
        let fc = hourly_forecast(3, 0.0);
        let t0 = fc.t0().unwrap();
        let s1 = ShapeableOrder {
            id: "s1".into(),
            startby: t0,
            endby: t0 + Duration::hours(2),
            max_kw: 2.0,
            end_kwh: 1.0,
        };
        let s2 = ShapeableOrder {
            id: "s2".into(),
            startby: t0,
            endby: t0 + Duration::hours(2),
            max_kw: 2.0,
            end_kwh: 1.0,
        };
        let instance = normalize(&fc, &([] as [BatteryOrder; 0]), &[s1, s2], &[], 1.0).unwrap();
        let (problem, index) = build(&instance, ModelOptions::default());

        let mut values = vec![0.0; problem.num_vars()];
        values[index.demandshape.vars[0][0]] = 1.0;
        values[index.demandshape.vars[1][0]] = 2.0;
        let solution = Solution { values, optimality: Optimality::Optimal };

        let result = project(&instance, &index, &solution);
        let matrix = result.demandshape.unwrap();
        assert_eq!(matrix.ids, vec!["s1".to_string(), "s2".to_string()]);
        assert_eq!(matrix.get(0, "s1"), Some(1.0));
        assert_eq!(matrix.get(0, "s2"), Some(2.0));
    }
}

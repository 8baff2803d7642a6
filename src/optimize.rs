//! The crate's one functional entry point (spec.md §6): composes
//! Normalizer → Model Builder → Solver Driver → Result Projector into a
//! single synchronous, stateless call.

use std::path::PathBuf;
use std::time::Instant;

use tracing::{info, info_span, warn};

use crate::config::{SolverBinaries, SolverConfig};
use crate::domain::{BatteryOrder, DemandForecast, DeferrableOrder, OptimizationResult, ShapeableOrder};
use crate::error::CoreResult;
use crate::model::builder::{self, ModelOptions};
use crate::normalizer;
use crate::projector;
use crate::solver::{self, SolveOptions, SolverKind};

/// Solve-time parameters (spec.md §3 "Parameters").
#[derive(Debug, Clone)]
pub struct Parameters {
    pub timestep_hours: f64,
    pub solver: String,
    pub timelimit_secs: u64,
    pub verbose: bool,
    /// Overrides binary discovery for the selected `solver` (spec.md §6).
    pub solver_path: Option<PathBuf>,
}

/// Joins a set of time-windowed orders and an uncontrollable demand
/// forecast into one MILP instance, solves it, and projects the result
/// back onto wall-clock timestamps (spec.md §1–§4). Pure function of its
/// inputs: no I/O besides the solver subprocess, no state retained
/// between calls (spec.md §9 "Statelessness").
pub fn maximize_self_consumption(
    forecast: &DemandForecast,
    batteries: &[BatteryOrder],
    shapeables: &[ShapeableOrder],
    deferrables: &[DeferrableOrder],
    params: &Parameters,
) -> CoreResult<OptimizationResult> {
    let span = info_span!(
        "maximize_self_consumption",
        horizon = forecast.len(),
        batteries = batteries.len(),
        shapeables = shapeables.len(),
        deferrables = deferrables.len(),
        solver = %params.solver,
    );
    let _guard = span.enter();
    let start = Instant::now();

    let result = run(forecast, batteries, shapeables, deferrables, params);

    info!(elapsed_ms = start.elapsed().as_millis() as u64, ok = result.is_ok(), "solve finished");
    result
}

fn run(
    forecast: &DemandForecast,
    batteries: &[BatteryOrder],
    shapeables: &[ShapeableOrder],
    deferrables: &[DeferrableOrder],
    params: &Parameters,
) -> CoreResult<OptimizationResult> {
    let instance = normalizer::normalize(forecast, batteries, shapeables, deferrables, params.timestep_hours)?;

    let (problem, index) = builder::build(&instance, ModelOptions::default());

    let config = SolverConfig::load().unwrap_or_else(|err| {
        warn!(error = %err, "falling back to default solver configuration");
        SolverConfig::default()
    });

    let kind = SolverKind::parse(&params.solver)?;
    let binaries = binaries_for(kind, params.solver_path.clone(), &config.binaries);
    let options = SolveOptions { kind, timelimit_secs: params.timelimit_secs, verbose: params.verbose };

    let solution = solver::solve(&problem, &options, &binaries)?;

    Ok(projector::project(&instance, &index, &solution))
}

/// Starts from the [`SolverConfig`] default layer's configured binary
/// paths (`config/default.toml`/`SCHEDCORE__*` env, per spec.md §6) and
/// lets `solver_path` override the single path for the selected `kind`
/// on top of it — CBC can still fall back to the in-process path when
/// neither the config nor the call site name a binary.
fn binaries_for(kind: SolverKind, solver_path: Option<PathBuf>, configured: &SolverBinaries) -> SolverBinaries {
    let mut binaries = configured.clone();
    if let Some(path) = solver_path {
        match kind {
            SolverKind::Cbc => binaries.cbc_path = Some(path),
            SolverKind::Glpk => binaries.glpsol_path = Some(path),
            SolverKind::Gurobi => binaries.gurobi_cl_path = Some(path),
        }
    }
    binaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ForecastSample;
    use chrono::{DateTime, Duration, Utc};

    fn flat_forecast(h: usize, power_kw: f64) -> DemandForecast {
        let t0 = DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z").unwrap().with_timezone(&Utc);
        DemandForecast::new(
            (0..h)
                .map(|i| ForecastSample { timestamp: t0 + Duration::hours(i as i64), power_kw })
                .collect(),
        )
    }

    #[test]
    fn no_controllables_matches_scenario_s1() {
        let forecast = flat_forecast(12, 5.0);
        let params = Parameters {
            timestep_hours: 1.0,
            solver: "cbc".into(),
            timelimit_secs: 30,
            verbose: false,
            solver_path: None,
        };
        let result = maximize_self_consumption(&forecast, &[], &[], &[], &params).unwrap();

        assert_eq!(result.demand_controllable, vec![0.0; 12]);
        assert_eq!(result.peakhigh, 5.0);
        assert_eq!(result.peaklow, 0.0);
        assert!((result.peakhigh - result.peaklow - 5.0).abs() < 1e-6);
    }

    #[test]
    fn unknown_solver_name_fails_fast() {
        let forecast = flat_forecast(4, 1.0);
        let params = Parameters {
            timestep_hours: 1.0,
            solver: "highs".into(),
            timelimit_secs: 10,
            verbose: false,
            solver_path: None,
        };
        assert!(maximize_self_consumption(&forecast, &[], &[], &[], &params).is_err());
    }
}

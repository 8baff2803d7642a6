//! Deferrable-load constraints (spec.md §4.2 "Deferrable").
//!
//! The convolution couples `demanddeferr` (delivered power) with
//! `deferrschedule` (the integer start indicator): gating is applied only
//! to the delivered-power variable, never to the schedule variable itself
//! — a start near `endby` that would run the profile's tail past `endby`
//! becomes infeasible purely because that tail is pinned to zero (spec.md
//! §9, "Open question — gating vs. convolution interplay for
//! deferrables").

use crate::model::index::AssetVars;
use crate::model::ir::{LinExpr, Problem, Sense, VarKind};
use crate::normalizer::NormalizedInstance;

pub struct DeferrableVars {
    pub demand: AssetVars,
    pub schedule: AssetVars,
}

/// Whether to add the sharper, behavior-preserving bound on
/// `deferrschedule` described in spec.md §9 (REDESIGN FLAGS): since a
/// start whose tail runs past `endby` is already infeasible through the
/// `demanddeferr` gating, directly zeroing those `deferrschedule` entries
/// only prunes the search space faster — it cannot change which
/// assignments are feasible.
#[derive(Debug, Clone, Copy)]
pub struct DeferrableOptions {
    pub tighten_start_window: bool,
}

impl Default for DeferrableOptions {
    fn default() -> Self {
        Self { tighten_start_window: true }
    }
}

pub fn add(problem: &mut Problem, instance: &NormalizedInstance, options: DeferrableOptions) -> DeferrableVars {
    let h = instance.horizon;
    let mut demand = AssetVars::default();
    let mut schedule = AssetVars::default();

    for order in &instance.deferrables {
        let mut demand_vars = Vec::with_capacity(h);
        let mut schedule_vars = Vec::with_capacity(h);

        for t in 0..h {
            let v_demand = problem.add_var(format!("demanddeferr[{t},{}]", order.id), f64::NEG_INFINITY, f64::INFINITY, VarKind::Continuous);
            if t < order.s || t > order.e {
                problem.pin(v_demand, 0.0);
            }
            demand_vars.push(v_demand);

            let v_sched = problem.add_var(format!("deferrschedule[{t},{}]", order.id), 0.0, 1.0, VarKind::Integer);
            schedule_vars.push(v_sched);
        }

        if options.tighten_start_window && order.duration > 0 {
            // A start at t delivers through t + duration - 1; if that runs
            // past `endby` the tail is pinned to zero by `demanddeferr`'s
            // gating above, so these starts are already infeasible.
            let latest_start = order.e + 1 >= order.duration;
            let latest_start_idx = if latest_start { order.e + 1 - order.duration } else { 0 };
            for (t, &v) in schedule_vars.iter().enumerate() {
                if !latest_start || t > latest_start_idx {
                    problem.pin(v, 0.0);
                }
            }
        }

        // Convolution identity: demanddeferr[t,d] = sum_k deferrschedule[t-k,d] * profile_kw[k]
        for t in 0..h {
            let mut expr = LinExpr::default();
            expr.push(demand_vars[t], 1.0);
            let k_max = order.duration.min(t + 1);
            for k in 0..k_max {
                expr.push(schedule_vars[t - k], -order.profile_kw[k]);
            }
            problem.add_row(format!("deferr_convolution[{t},{}]", order.id), expr, Sense::Eq, 0.0);
        }

        // Placed exactly once within the horizon.
        let mut sum_once = LinExpr::default();
        for &v in &schedule_vars {
            sum_once.push(v, 1.0);
        }
        problem.add_row(format!("deferr_single_placement[{}]", order.id), sum_once, Sense::Eq, 1.0);

        demand.ids.push(order.id.clone());
        demand.vars.push(demand_vars);
        schedule.ids.push(order.id.clone());
        schedule.vars.push(schedule_vars);
    }

    DeferrableVars { demand, schedule }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BatteryOrder, DeferrableOrder, DemandForecast, ForecastSample, ProfileKw, ShapeableOrder};
    use crate::normalizer::normalize;
    use chrono::{DateTime, Duration, Utc};
    use rstest::{fixture, rstest};

    fn hourly_forecast(h: usize) -> DemandForecast {
        let t0 = DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z").unwrap().with_timezone(&Utc);
        DemandForecast::new(
            (0..h)
                .map(|i| ForecastSample { timestamp: t0 + Duration::hours(i as i64), power_kw: 0.0 })
                .collect(),
        )
    }

    #[test]
    fn single_placement_row_sums_to_one() {
        let fc = hourly_forecast(10);
        let t0 = fc.t0().unwrap();
        let order = DeferrableOrder {
            id: "d1".into(),
            startby: t0,
            endby: t0 + Duration::hours(9),
            duration: 2,
            profile_kw: ProfileKw(vec![5.0, 5.0]),
        };
        let instance = normalize(&fc, &([] as [BatteryOrder; 0]), &([] as [ShapeableOrder; 0]), &[order], 1.0).unwrap();
        let mut problem = Problem::new();
        add(&mut problem, &instance, DeferrableOptions::default());

        let row = problem.rows.iter().find(|r| r.name == "deferr_single_placement[d1]").unwrap();
        assert_eq!(row.rhs, 1.0);
        assert_eq!(row.expr.terms.len(), 10);
    }

    /// A deferrable with `endby` index 4 and `duration` 2 over a 10-step
    /// horizon, so the latest non-overrunning start index is 3.
    #[fixture]
    fn tightened_deferrable() -> (Problem, DeferrableVars) {
        let fc = hourly_forecast(10);
        let t0 = fc.t0().unwrap();
        let order = DeferrableOrder {
            id: "d1".into(),
            startby: t0,
            endby: t0 + Duration::hours(4),
            duration: 2,
            profile_kw: ProfileKw(vec![5.0, 5.0]),
        };
        let instance = normalize(&fc, &([] as [BatteryOrder; 0]), &([] as [ShapeableOrder; 0]), &[order], 1.0).unwrap();
        let mut problem = Problem::new();
        let vars = add(&mut problem, &instance, DeferrableOptions::default());
        (problem, vars)
    }

    #[rstest]
    #[case(0, 1.0)]
    #[case(1, 1.0)]
    #[case(2, 1.0)]
    #[case(3, 1.0)]
    #[case(4, 0.0)]
    #[case(5, 0.0)]
    #[case(9, 0.0)]
    fn tightens_late_starts_whose_tail_would_overrun(tightened_deferrable: (Problem, DeferrableVars), #[case] t: usize, #[case] expected_ub: f64) {
        let (problem, vars) = tightened_deferrable;
        assert_eq!(problem.vars[vars.schedule.vars[0][t]].ub, expected_ub);
    }
}

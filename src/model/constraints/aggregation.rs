//! Aggregation and objective constraints (spec.md §4.2 "Aggregation").
//!
//! Ties the three asset families together into one controllable-demand
//! signal per timestep, then bounds `peakhigh`/`peaklow` around the
//! combined (controllable + uncontrollable) demand. The objective is
//! `peakhigh - peaklow`, minimized by [`crate::model::builder`].

use crate::model::ir::{LinExpr, Problem, Sense, VarKind};
use crate::normalizer::NormalizedInstance;

use super::battery::BatteryVars;
use super::deferrable::DeferrableVars;

pub struct AggregationVars {
    pub demand_controllable: Vec<usize>,
    pub peakhigh: usize,
    pub peaklow: usize,
}

pub fn add(
    problem: &mut Problem,
    instance: &NormalizedInstance,
    demandshape: &crate::model::index::AssetVars,
    battery: &BatteryVars,
    deferrable: &DeferrableVars,
) -> AggregationVars {
    let h = instance.horizon;

    let peakhigh = problem.add_var("peakhigh", 0.0, f64::INFINITY, VarKind::Continuous);
    let peaklow = problem.add_var("peaklow", f64::NEG_INFINITY, 0.0, VarKind::Continuous);

    let mut demand_controllable = Vec::with_capacity(h);
    for t in 0..h {
        let v = problem.add_var(format!("demand_controllable[{t}]"), f64::NEG_INFINITY, f64::INFINITY, VarKind::Continuous);
        demand_controllable.push(v);
    }

    for t in 0..h {
        // demand_controllable[t] = sum(demandshape) + sum(batteryin - batteryout) + sum(demanddeferr)
        let mut expr = LinExpr::default();
        expr.push(demand_controllable[t], 1.0);
        for row in &demandshape.vars {
            expr.push(row[t], -1.0);
        }
        for row in &battery.input.vars {
            expr.push(row[t], -1.0);
        }
        for row in &battery.output.vars {
            expr.push(row[t], 1.0);
        }
        for row in &deferrable.demand.vars {
            expr.push(row[t], -1.0);
        }
        problem.add_row(format!("demand_total[{t}]"), expr, Sense::Eq, 0.0);

        // peaklow <= demand_controllable[t] + demand_uncontrollable[t] <= peakhigh
        let uncontrollable = instance.demand_uncontrollable[t];

        let mut high = LinExpr::default();
        high.push(demand_controllable[t], 1.0);
        high.push(peakhigh, -1.0);
        problem.add_row(format!("peak_high[{t}]"), high, Sense::Le, -uncontrollable);

        let mut low = LinExpr::default();
        low.push(demand_controllable[t], 1.0);
        low.push(peaklow, -1.0);
        problem.add_row(format!("peak_low[{t}]"), low, Sense::Ge, -uncontrollable);
    }

    AggregationVars { demand_controllable, peakhigh, peaklow }
}
